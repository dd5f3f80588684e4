//! Implementation of the [ForeignMasterTable]

use arrayvec::ArrayVec;
use getset::CopyGetters;

use super::dataset_comparison::ComparisonDataset;
use crate::{
    config::MAX_FOREIGN_RECORDS,
    datastructures::{
        common::PortIdentity,
        messages::{AnnounceMessage, Header},
    },
};

/// Announce messages with this many steps removed or more never qualify
const MAX_STEPS_REMOVED: u16 = 255;

/// A candidate master learned from its announce messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ForeignMasterRecord {
    source_port_identity: PortIdentity,
    /// Announce messages seen since the table was last cleared
    message_count: u16,
    announce: AnnounceMessage,
}

impl ForeignMasterRecord {
    pub fn header(&self) -> &Header {
        &self.announce.header
    }
}

/// The bounded set of foreign masters a port has heard from during the
/// current announce receipt window.
///
/// The capacity is fixed when the table is created. Once the table is full,
/// announce messages of new masters are dropped until the table is cleared.
#[derive(Debug, Clone)]
pub struct ForeignMasterTable {
    records: ArrayVec<ForeignMasterRecord, MAX_FOREIGN_RECORDS>,
    capacity: usize,
}

impl ForeignMasterTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: ArrayVec::new(),
            capacity: capacity.clamp(1, MAX_FOREIGN_RECORDS),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record an announce message.
    ///
    /// Returns false when the message was not stored.
    pub fn add_foreign(&mut self, announce: &AnnounceMessage) -> bool {
        if announce.steps_removed() >= MAX_STEPS_REMOVED {
            return false;
        }

        let source = announce.header().source_port_identity();

        if let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.source_port_identity == source)
        {
            record.message_count = record.message_count.saturating_add(1);
            record.announce = *announce;
            log::trace!("updated foreign master {source}");
            return true;
        }

        if self.records.len() >= self.capacity {
            log::debug!("foreign master table full, dropping announce from {source}");
            return false;
        }

        self.records.push(ForeignMasterRecord {
            source_port_identity: source,
            message_count: 1,
            announce: *announce,
        });
        log::debug!("new foreign master {source}");
        true
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, source: &PortIdentity) -> Option<&ForeignMasterRecord> {
        self.records
            .iter()
            .find(|record| record.source_port_identity == *source)
    }

    /// The records that have been heard from at least `threshold` times
    pub fn qualified(&self, threshold: u16) -> impl Iterator<Item = &ForeignMasterRecord> {
        self.records
            .iter()
            .filter(move |record| record.message_count >= threshold)
    }

    /// The best qualified record as seen by the port `receiver` (Erbest)
    ///
    /// When two records compare as equal, the one stored first wins.
    pub fn best(&self, threshold: u16, receiver: &PortIdentity) -> Option<&ForeignMasterRecord> {
        self.qualified(threshold).fold(None, |best, record| match best {
            None => Some(record),
            Some(best) => {
                let current = ComparisonDataset::from_announce_message(&best.announce, receiver);
                let candidate =
                    ComparisonDataset::from_announce_message(&record.announce, receiver);
                if candidate.compare(&current).is_better() {
                    Some(record)
                } else {
                    Some(best)
                }
            }
        })
    }
}
