//! Measurement filters used by the clock servo

mod exponential;

pub use exponential::ExponentialFilter;
