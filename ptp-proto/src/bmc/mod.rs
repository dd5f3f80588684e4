//! Best master clock selection

pub mod bmca;
pub mod dataset_comparison;
pub mod foreign_master;

pub use bmca::{state_decision, Bmc, RecommendedState, StateDecision};
pub use dataset_comparison::{ComparisonDataset, DatasetOrdering};
pub use foreign_master::{ForeignMasterRecord, ForeignMasterTable};
