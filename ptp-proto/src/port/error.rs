use crate::datastructures::WireFormatError;

pub type Result<T, E = PortError> = core::result::Result<T, E>;

/// Faults of the port engine.
///
/// None of these escape [`Port::do_state`](super::Port::do_state): they are
/// logged and move the port to the faulty state.
#[derive(Debug)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PortError {
    #[cfg_attr(feature = "std", error("something went wrong on the network"))]
    Network,
    #[cfg_attr(feature = "std", error("wire format error: {0}"))]
    WireFormat(WireFormatError),
    #[cfg_attr(feature = "std", error("received a message shorter than its header"))]
    ShortMessage,
}

impl From<WireFormatError> for PortError {
    fn from(v: WireFormatError) -> Self {
        Self::WireFormat(v)
    }
}
