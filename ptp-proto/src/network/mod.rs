//! Definitions of the abstract network types

use arrayvec::ArrayVec;

use crate::{datastructures::messages::MAX_DATA_LEN, time::TimeInternal};

/// A datagram received on one of the two ptp ports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkPacket {
    pub data: ArrayVec<u8, MAX_DATA_LEN>,
    /// The moment the datagram arrived, if the adapter could tell.
    ///
    /// Required for packets on the event port, ignored on the general port.
    pub timestamp: Option<TimeInternal>,
}

impl NetworkPacket {
    /// Copy `data` into a packet, or `None` when it exceeds [`MAX_DATA_LEN`]
    pub fn new(data: &[u8], timestamp: Option<TimeInternal>) -> Option<Self> {
        Some(Self {
            data: data.try_into().ok()?,
            timestamp,
        })
    }
}

/// Abstraction for the event (319) and general (320) ports of the clock.
///
/// None of the functions may block. Multicast membership and addressing are
/// the business of the implementation; the peer variants send to the peer
/// delay multicast group instead of the default one.
pub trait NetworkPort {
    type Error: core::fmt::Debug;

    /// Send on the event port, returning the transmit time when known
    fn send_event(&mut self, data: &[u8]) -> Result<Option<TimeInternal>, Self::Error>;

    fn send_general(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Send on the event port to the peer delay group
    fn send_peer_event(&mut self, data: &[u8]) -> Result<Option<TimeInternal>, Self::Error>;

    fn send_peer_general(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    fn recv_event(&mut self) -> Result<Option<NetworkPacket>, Self::Error>;

    fn recv_general(&mut self) -> Result<Option<NetworkPacket>, Self::Error>;

    /// Whether a datagram is waiting on either port
    fn has_pending(&self) -> bool;

    /// Bring the sockets back into a usable state. Called every time the
    /// port initializes.
    fn reinitialize(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Drop everything waiting on the event port
    fn flush_event(&mut self) -> Result<(), Self::Error> {
        while self.recv_event()?.is_some() {}
        Ok(())
    }
}
