//! Receives control values over UDP and forwards them as `ColorEvent`s. Each datagram carries a
//! single value, either as an OSC message addressed to `/freq` or as a number in plain text (so
//! `echo 440 | nc -u 127.0.0.1 12000` works).

pub mod osc;

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs, UdpSocket},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use xyscope_core::{ColorEvent, ControlSender, SendStatus};

/// The OSC address whose argument sets the trail color.
pub const CONTROL_ADDRESS: &str = "/freq";

pub const DEFAULT_ADDR: SocketAddrV4 =
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 12000);

const BUF_SIZE: usize = 1024;

/// How long a blocking receive waits before checking whether the listener should stop.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Decode the control value in a datagram. Returns `Ok(None)` for well-formed OSC messages sent
/// to some other address.
pub fn decode_control_value(bytes: &[u8]) -> anyhow::Result<Option<f32>> {
    if bytes.first() == Some(&b'/') || bytes.first() == Some(&b'#') {
        let scalar = osc::parse_scalar(bytes)?;
        if scalar.address == CONTROL_ADDRESS {
            Ok(Some(scalar.value))
        } else {
            Ok(None)
        }
    } else {
        let text = std::str::from_utf8(bytes)?;
        Ok(Some(text.trim().parse::<f32>()?))
    }
}

pub struct ControlSocket {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl ControlSocket {
    pub fn bind<A: ToSocketAddrs>(addrs: A) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(addrs)?;
        socket.set_read_timeout(Some(POLL_TIMEOUT))?;
        log::info!("Control udp address: {:?}", socket.local_addr());
        Ok(Self {
            socket,
            buf: vec![0; BUF_SIZE],
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait up to the poll timeout for a datagram. Returns `Ok(None)` if nothing arrived or the
    /// datagram didn't contain a usable value.
    pub fn recv_event(&mut self) -> Result<Option<ColorEvent>, io::Error> {
        let size = match self.socket.recv(&mut self.buf) {
            Ok(size) => size,
            Err(error) => match error.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                    return Ok(None);
                }
                _ => return Err(error),
            },
        };
        if size >= BUF_SIZE {
            log::warn!("UDP message too long for buffer!");
            return Ok(None);
        }
        match decode_control_value(&self.buf[..size]) {
            Ok(Some(value)) => Ok(Some(ColorEvent { value })),
            Ok(None) => {
                log::debug!("Ignoring message for another address");
                Ok(None)
            }
            Err(e) => {
                log::warn!("Failed to decode control message: {e}");
                Ok(None)
            }
        }
    }
}

/// Background thread forwarding events from a `ControlSocket` into a control queue.
pub struct ControlListener {
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
}

impl ControlListener {
    pub fn spawn<A: ToSocketAddrs>(
        addrs: A,
        sender: ControlSender,
    ) -> anyhow::Result<Self> {
        let mut socket = ControlSocket::bind(addrs)?;
        let local_addr = socket.local_addr()?;
        let running = Arc::new(AtomicBool::new(true));
        let handle = thread::Builder::new()
            .name("xyscope-control".to_string())
            .spawn({
                let running = Arc::clone(&running);
                move || {
                    while running.load(Ordering::Relaxed) {
                        match socket.recv_event() {
                            Ok(Some(event)) => {
                                if sender.send(event) == SendStatus::Disconnected
                                {
                                    log::info!("Control receiver closed. Stopping listener.");
                                    break;
                                }
                            }
                            Ok(None) => (),
                            Err(e) => {
                                log::warn!("IO error reading from UDP socket: {e}");
                                thread::sleep(POLL_TIMEOUT);
                            }
                        }
                    }
                }
            })?;
        Ok(Self {
            running,
            local_addr,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("control listener thread panicked");
            }
        }
    }
}

impl Drop for ControlListener {
    fn drop(&mut self) {
        self.stop();
    }
}
