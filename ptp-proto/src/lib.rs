//! Protocol engine of an IEEE 1588-2008 ordinary clock.
//!
//! The engine is a single [`Port`](port::Port) that owns all protocol state.
//! It talks to the outside world through three small adapter traits:
//! [`NetworkPort`](network::NetworkPort) for datagrams,
//! [`Clock`](clock::Clock) for the local time source, and
//! [`TimerProvider`](port::TimerProvider) for protocol timeouts. The caller
//! drives the engine by invoking [`Port::do_state`](port::Port::do_state)
//! whenever an adapter signals activity, and at least every 100 ms otherwise.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bmc;
pub mod clock;
pub mod config;
pub mod datastructures;
pub mod filters;
pub mod network;
pub mod port;
pub mod servo;
pub mod time;

pub use bmc::{ForeignMasterTable, RecommendedState};
pub use clock::Clock;
pub use config::{Config, DelayMechanism, InstanceConfig, PortConfig, ServoConfig};
pub use datastructures::{
    common::{ClockAccuracy, ClockIdentity, ClockQuality, PortIdentity, TimeSource},
    datasets::{CurrentDS, DefaultDS, ParentDS, PortDS, TimePropertiesDS},
    messages::{Message, MessageType, MAX_DATA_LEN},
    WireFormatError,
};
pub use network::{NetworkPacket, NetworkPort};
pub use port::{Alert, ExpiryFlags, Port, PortError, PortState, TimerId, TimerProvider};
pub use servo::Servo;
pub use time::{Interval, TimeInternal};
