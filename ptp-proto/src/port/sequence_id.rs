/// Sequence ids of one outgoing message kind
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SequenceIdGenerator {
    next: u16,
}

impl SequenceIdGenerator {
    pub fn new() -> Self {
        SequenceIdGenerator { next: 0 }
    }

    /// The id the next message will carry
    pub fn peek(&self) -> u16 {
        self.next
    }

    /// Mark the message carrying [`Self::peek`] as sent
    pub fn advance(&mut self) {
        self.next = self.next.wrapping_add(1);
    }

    /// The id of the most recently sent message
    pub fn last(&self) -> u16 {
        self.next.wrapping_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_wrap() {
        let mut ids = SequenceIdGenerator::new();
        assert_eq!(ids.peek(), 0);
        assert_eq!(ids.last(), u16::MAX);

        ids.advance();
        assert_eq!(ids.last(), 0);

        ids.next = u16::MAX;
        ids.advance();
        assert_eq!(ids.peek(), 0);
        assert_eq!(ids.last(), u16::MAX);
    }
}
