//! Implementation of chapter 9.3.4 Data set comparison algorithm

use core::cmp::Ordering;

use crate::datastructures::{
    common::{ClockIdentity, ClockQuality, PortIdentity},
    datasets::DefaultDS,
    messages::AnnounceMessage,
};

/// A collection of data that is gathered from other sources (mainly announce
/// messages and the DefaultDS).
///
/// When gathered from two different sources, [`ComparisonDataset::compare`]
/// tells which source is better according to the dataset comparison
/// algorithm.
#[derive(Eq, PartialEq, Default, Debug, Clone, Copy)]
pub struct ComparisonDataset {
    gm_priority_1: u8,
    gm_identity: ClockIdentity,
    gm_clock_quality: ClockQuality,
    gm_priority_2: u8,
    steps_removed: u16,
    identity_of_senders: ClockIdentity,
    identity_of_receiver: PortIdentity,
}

impl ComparisonDataset {
    /// Create a ComparisonDataset from the data in an announce message and the
    /// port identity of the port that received the announce message
    pub fn from_announce_message(
        message: &AnnounceMessage,
        port_receiver_identity: &PortIdentity,
    ) -> Self {
        Self {
            gm_priority_1: message.grandmaster_priority_1(),
            gm_identity: message.grandmaster_identity(),
            gm_clock_quality: message.grandmaster_clock_quality(),
            gm_priority_2: message.grandmaster_priority_2(),
            steps_removed: message.steps_removed(),
            identity_of_senders: message.header().source_port_identity().clock_identity,
            identity_of_receiver: *port_receiver_identity,
        }
    }

    /// The local clock seen as a candidate master (D0)
    pub fn from_own_data(data: &DefaultDS, port_identity: &PortIdentity) -> Self {
        Self {
            gm_priority_1: data.priority_1,
            gm_identity: data.clock_identity,
            gm_clock_quality: data.clock_quality,
            gm_priority_2: data.priority_2,
            steps_removed: 0,
            identity_of_senders: data.clock_identity,
            identity_of_receiver: *port_identity,
        }
    }

    /// Returns the ordering of `self` in comparison to other.
    pub fn compare(&self, other: &Self) -> DatasetOrdering {
        if self.gm_identity == other.gm_identity {
            self.compare_topology(other)
        } else {
            self.compare_quality(other)
        }
    }

    // Figure 27: lower values win on every attribute
    fn compare_quality(&self, other: &Self) -> DatasetOrdering {
        let ordering = self
            .gm_priority_1
            .cmp(&other.gm_priority_1)
            .then_with(|| {
                self.gm_clock_quality
                    .clock_class
                    .cmp(&other.gm_clock_quality.clock_class)
            })
            .then_with(|| {
                self.gm_clock_quality
                    .clock_accuracy
                    .cmp(&other.gm_clock_quality.clock_accuracy)
            })
            .then_with(|| {
                self.gm_clock_quality
                    .offset_scaled_log_variance
                    .cmp(&other.gm_clock_quality.offset_scaled_log_variance)
            })
            .then_with(|| self.gm_priority_2.cmp(&other.gm_priority_2))
            .then_with(|| self.gm_identity.cmp(&other.gm_identity));

        match ordering {
            Ordering::Less => DatasetOrdering::Better,
            // identities differ, so the chain never ends equal
            Ordering::Equal | Ordering::Greater => DatasetOrdering::Worse,
        }
    }

    // Figure 28
    fn compare_topology(&self, other: &Self) -> DatasetOrdering {
        let steps_removed_difference = self.steps_removed as i32 - other.steps_removed as i32;

        match steps_removed_difference {
            2..=i32::MAX => DatasetOrdering::Worse,
            i32::MIN..=-2 => DatasetOrdering::Better,
            1 => match self
                .identity_of_receiver
                .clock_identity
                .cmp(&self.identity_of_senders)
            {
                Ordering::Less => DatasetOrdering::Worse,
                Ordering::Equal => DatasetOrdering::Error1,
                Ordering::Greater => DatasetOrdering::WorseByTopology,
            },
            -1 => match other
                .identity_of_receiver
                .clock_identity
                .cmp(&other.identity_of_senders)
            {
                Ordering::Less => DatasetOrdering::Better,
                Ordering::Equal => DatasetOrdering::Error1,
                Ordering::Greater => DatasetOrdering::BetterByTopology,
            },
            0 => match self.identity_of_senders.cmp(&other.identity_of_senders) {
                Ordering::Less => DatasetOrdering::BetterByTopology,
                Ordering::Equal => match self
                    .identity_of_receiver
                    .port_number
                    .cmp(&other.identity_of_receiver.port_number)
                {
                    Ordering::Less => DatasetOrdering::BetterByTopology,
                    Ordering::Equal => DatasetOrdering::Error2,
                    Ordering::Greater => DatasetOrdering::WorseByTopology,
                },
                Ordering::Greater => DatasetOrdering::WorseByTopology,
            },
        }
    }
}

/// The ordering result of the dataset comparison algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOrdering {
    /// The [ComparisonDataset] is better than the one being compared against
    Better,
    /// The [ComparisonDataset] is of equal quality as the one being compared
    /// against, but is preferred because of the network topology
    BetterByTopology,
    /// The [ComparisonDataset] is equal in quality and topology
    Error1,
    /// The [ComparisonDataset] is probably based on the same set of data
    Error2,
    /// The [ComparisonDataset] is of equal quality as the one being compared
    /// against, but is not preferred because of the network topology
    WorseByTopology,
    /// The [ComparisonDataset] is worse than the one being compared against
    Worse,
}

impl DatasetOrdering {
    pub fn is_better(&self) -> bool {
        matches!(
            self,
            DatasetOrdering::Better | DatasetOrdering::BetterByTopology
        )
    }

    pub fn is_worse(&self) -> bool {
        matches!(
            self,
            DatasetOrdering::Worse | DatasetOrdering::WorseByTopology
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockAccuracy;

    const IDENTITY_A: ClockIdentity = ClockIdentity([1, 1, 1, 1, 1, 1, 1, 1]);
    const IDENTITY_B: ClockIdentity = ClockIdentity([2, 2, 2, 2, 2, 2, 2, 2]);
    const IDENTITY_C: ClockIdentity = ClockIdentity([3, 3, 3, 3, 3, 3, 3, 3]);

    fn get_default_test_pair() -> (ComparisonDataset, ComparisonDataset) {
        Default::default()
    }

    #[test]
    fn figure_27() {
        // Start with two identical datasets
        let (mut a, mut b) = get_default_test_pair();

        // Work bottom up, flipping the winner every step so a stale result
        // cannot pass
        a.gm_identity = IDENTITY_A;
        b.gm_identity = IDENTITY_B;

        assert_eq!(a.compare(&b), DatasetOrdering::Better);
        assert_eq!(b.compare(&a), DatasetOrdering::Worse);

        a.gm_priority_2 = 1;
        b.gm_priority_2 = 0;

        assert_eq!(a.compare(&b), DatasetOrdering::Worse);
        assert_eq!(b.compare(&a), DatasetOrdering::Better);

        a.gm_clock_quality.offset_scaled_log_variance = 0;
        b.gm_clock_quality.offset_scaled_log_variance = 1;

        assert_eq!(a.compare(&b), DatasetOrdering::Better);
        assert_eq!(b.compare(&a), DatasetOrdering::Worse);

        a.gm_clock_quality.clock_accuracy = ClockAccuracy::US1;
        b.gm_clock_quality.clock_accuracy = ClockAccuracy::NS250;

        assert_eq!(a.compare(&b), DatasetOrdering::Worse);
        assert_eq!(b.compare(&a), DatasetOrdering::Better);

        a.gm_clock_quality.clock_class = 0;
        b.gm_clock_quality.clock_class = 1;

        assert_eq!(a.compare(&b), DatasetOrdering::Better);
        assert_eq!(b.compare(&a), DatasetOrdering::Worse);

        a.gm_priority_1 = 1;
        b.gm_priority_1 = 0;

        assert_eq!(a.compare(&b), DatasetOrdering::Worse);
        assert_eq!(b.compare(&a), DatasetOrdering::Better);
    }

    #[test]
    fn figure_28() {
        let (mut a, mut b) = get_default_test_pair();

        assert_eq!(a.compare(&b), DatasetOrdering::Error2);
        assert_eq!(b.compare(&a), DatasetOrdering::Error2);

        a.identity_of_receiver.port_number = 1;
        b.identity_of_receiver.port_number = 0;

        assert_eq!(a.compare(&b), DatasetOrdering::WorseByTopology);
        assert_eq!(b.compare(&a), DatasetOrdering::BetterByTopology);

        a.identity_of_senders = IDENTITY_A;
        b.identity_of_senders = IDENTITY_B;

        assert_eq!(a.compare(&b), DatasetOrdering::BetterByTopology);
        assert_eq!(b.compare(&a), DatasetOrdering::WorseByTopology);

        a.steps_removed = 0;
        a.identity_of_receiver.clock_identity = IDENTITY_A;
        b.steps_removed = 1;
        b.identity_of_receiver.clock_identity = IDENTITY_B;

        assert_eq!(a.compare(&b), DatasetOrdering::Error1);
        assert_eq!(b.compare(&a), DatasetOrdering::Error1);

        a.identity_of_receiver.clock_identity = IDENTITY_B;
        b.identity_of_receiver.clock_identity = IDENTITY_C;

        assert_eq!(a.compare(&b), DatasetOrdering::BetterByTopology);
        assert_eq!(b.compare(&a), DatasetOrdering::WorseByTopology);

        a.steps_removed = 0;
        b.steps_removed = 2;

        assert_eq!(a.compare(&b), DatasetOrdering::Better);
        assert_eq!(b.compare(&a), DatasetOrdering::Worse);
    }

    #[test]
    fn identity_breaks_ties_reproducibly() {
        let (mut a, mut b) = get_default_test_pair();
        a.gm_identity = IDENTITY_C;
        b.gm_identity = IDENTITY_B;

        for _ in 0..3 {
            assert_eq!(a.compare(&b), DatasetOrdering::Worse);
            assert_eq!(b.compare(&a), DatasetOrdering::Better);
        }
    }
}
