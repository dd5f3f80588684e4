//! Implementation of the abstract network types for linux, on tokio sockets
//!
//! Every socket gets a receive task that timestamps incoming datagrams and
//! queues them for the engine, which picks them up without blocking.

mod interface;
mod socket;

use std::{
    collections::VecDeque,
    io::ErrorKind,
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
};

pub use interface::find_mac_address;
use ptp_proto::{Alert, Clock, NetworkPacket, NetworkPort, TimeInternal};
use socket::{open_ptp_socket, target, EVENT_PORT, GENERAL_PORT};
use tokio::{net::UdpSocket, runtime::Handle, task::JoinHandle};

use crate::{alert::AlertSignal, clock::LinuxClock};

/// Datagrams kept per socket before new ones are dropped
const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("sockets are not open")]
    NotOpen,
    #[error("network io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default)]
struct QueueState {
    packets: VecDeque<NetworkPacket>,
    error: Option<std::io::Error>,
}

/// Hand over point between a receive task and the engine
#[derive(Debug, Default)]
struct PacketQueue {
    state: Mutex<QueueState>,
}

impl PacketQueue {
    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, packet: NetworkPacket) {
        let mut state = self.lock();
        if state.packets.len() >= QUEUE_CAPACITY {
            log::warn!("receive queue full, dropping datagram");
            return;
        }
        state.packets.push_back(packet);
    }

    fn fail(&self, error: std::io::Error) {
        self.lock().error = Some(error);
    }

    /// The next datagram. A receive error is reported once, ahead of
    /// anything still queued.
    fn pop(&self) -> Result<Option<NetworkPacket>, NetworkError> {
        let mut state = self.lock();
        match state.error.take() {
            Some(error) => Err(error.into()),
            None => Ok(state.packets.pop_front()),
        }
    }

    fn is_pending(&self) -> bool {
        let state = self.lock();
        !state.packets.is_empty() || state.error.is_some()
    }

    fn is_healthy(&self) -> bool {
        self.lock().error.is_none()
    }

    fn clear(&self) {
        self.lock().packets.clear();
    }
}

async fn receive_task(
    socket: Arc<UdpSocket>,
    queue: Arc<PacketQueue>,
    clock: Option<LinuxClock>,
    alert: Arc<AlertSignal>,
) {
    let mut buffer = [0u8; 2048];

    loop {
        match socket.recv_from(&mut buffer).await {
            Ok((len, sender)) => {
                let timestamp = clock.map(|clock| clock.now());
                match NetworkPacket::new(&buffer[..len], timestamp) {
                    Some(packet) => queue.push(packet),
                    None => log::debug!("dropping datagram of {len} bytes from {sender}"),
                }
            }
            Err(error) => {
                log::error!("receive failed: {error}");
                queue.fail(error);
                alert.alert();
                return;
            }
        }

        alert.alert();
    }
}

struct Channel {
    socket: Arc<UdpSocket>,
    queue: Arc<PacketQueue>,
    task: JoinHandle<()>,
}

impl Channel {
    fn open(
        handle: &Handle,
        port: u16,
        interface: Ipv4Addr,
        clock: Option<LinuxClock>,
        alert: &Arc<AlertSignal>,
    ) -> std::io::Result<Self> {
        let socket = open_ptp_socket(port, interface)?;
        let socket = {
            let _guard = handle.enter();
            Arc::new(UdpSocket::from_std(socket)?)
        };
        let queue = Arc::new(PacketQueue::default());
        let task = handle.spawn(receive_task(
            socket.clone(),
            queue.clone(),
            clock,
            alert.clone(),
        ));

        Ok(Self {
            socket,
            queue,
            task,
        })
    }

    fn send(&self, port: u16, peer: bool, data: &[u8]) -> Result<(), NetworkError> {
        let destination = SocketAddr::V4(target(port, peer));
        match self.socket.try_send_to(data, destination) {
            Ok(_) => Ok(()),
            Err(error) if error.kind() == ErrorKind::WouldBlock => {
                log::warn!("send buffer full, dropping datagram to {destination}");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Channels {
    event: Channel,
    general: Channel,
}

/// The event and general ports of the clock on an ipv4 interface.
///
/// Transmit times are software timestamps taken right after the datagram was
/// handed to the kernel.
pub struct UdpNetwork {
    handle: Handle,
    interface: Ipv4Addr,
    clock: LinuxClock,
    alert: Arc<AlertSignal>,
    channels: Option<Channels>,
}

impl UdpNetwork {
    /// Sockets are opened when the port initializes
    pub fn new(handle: Handle, interface: Option<Ipv4Addr>, alert: Arc<AlertSignal>) -> Self {
        Self {
            handle,
            interface: interface.unwrap_or(Ipv4Addr::UNSPECIFIED),
            clock: LinuxClock::REALTIME,
            alert,
            channels: None,
        }
    }

    fn channels(&self) -> Result<&Channels, NetworkError> {
        self.channels.as_ref().ok_or(NetworkError::NotOpen)
    }

    fn send_event_to(&self, data: &[u8], peer: bool) -> Result<Option<TimeInternal>, NetworkError> {
        self.channels()?.event.send(EVENT_PORT, peer, data)?;
        Ok(Some(self.clock.now()))
    }

    fn send_general_to(&self, data: &[u8], peer: bool) -> Result<(), NetworkError> {
        self.channels()?.general.send(GENERAL_PORT, peer, data)
    }
}

impl NetworkPort for UdpNetwork {
    type Error = NetworkError;

    fn send_event(&mut self, data: &[u8]) -> Result<Option<TimeInternal>, Self::Error> {
        self.send_event_to(data, false)
    }

    fn send_general(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.send_general_to(data, false)
    }

    fn send_peer_event(&mut self, data: &[u8]) -> Result<Option<TimeInternal>, Self::Error> {
        self.send_event_to(data, true)
    }

    fn send_peer_general(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.send_general_to(data, true)
    }

    fn recv_event(&mut self) -> Result<Option<NetworkPacket>, Self::Error> {
        self.channels()?.event.queue.pop()
    }

    fn recv_general(&mut self) -> Result<Option<NetworkPacket>, Self::Error> {
        self.channels()?.general.queue.pop()
    }

    fn has_pending(&self) -> bool {
        self.channels
            .as_ref()
            .is_some_and(|channels| {
                channels.event.queue.is_pending() || channels.general.queue.is_pending()
            })
    }

    /// Healthy sockets are kept and only flushed, failed ones are reopened
    fn reinitialize(&mut self) -> Result<(), Self::Error> {
        if let Some(channels) = &self.channels {
            if channels.event.queue.is_healthy() && channels.general.queue.is_healthy() {
                channels.event.queue.clear();
                channels.general.queue.clear();
                return Ok(());
            }
        }

        self.channels = None;

        let event = Channel::open(
            &self.handle,
            EVENT_PORT,
            self.interface,
            Some(self.clock),
            &self.alert,
        )?;
        let general = Channel::open(
            &self.handle,
            GENERAL_PORT,
            self.interface,
            None,
            &self.alert,
        )?;

        log::info!("listening on ptp ports of interface {}", self.interface);
        self.channels = Some(Channels { event, general });
        Ok(())
    }

    fn flush_event(&mut self) -> Result<(), Self::Error> {
        self.channels()?.event.queue.clear();
        Ok(())
    }
}
