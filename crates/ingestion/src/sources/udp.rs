//! UDP source: one JSON-encoded record per datagram

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use contracts::{ContractError, TelemetryRecord, TelemetrySource};
use tracing::{info, trace};

use crate::error::{IngestionError, Result};

/// Largest datagram accepted
const MAX_DATAGRAM: usize = 64 * 1024;

/// Blocking UDP receiver
///
/// The socket read timeout is reset per call so the ingestion loop keeps a
/// bounded shutdown latency.
pub struct UdpJsonSource {
    name: String,
    socket: UdpSocket,
    local_addr: SocketAddr,
    buf: Vec<u8>,
    last_timeout: Option<Duration>,
}

impl UdpJsonSource {
    /// Bind to `addr` (e.g. `0.0.0.0:14550`)
    pub fn bind(addr: &str) -> Result<Self> {
        let socket =
            UdpSocket::bind(addr).map_err(|e| IngestionError::source_open(addr, e.to_string()))?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| IngestionError::source_open(addr, e.to_string()))?;
        info!(%local_addr, "udp source bound");

        Ok(Self {
            name: format!("udp:{local_addr}"),
            socket,
            local_addr,
            buf: vec![0; MAX_DATAGRAM],
            last_timeout: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn set_timeout(&mut self, timeout: Duration) -> std::result::Result<(), ContractError> {
        // A zero read timeout is rejected by the OS.
        let timeout = timeout.max(Duration::from_millis(1));
        if self.last_timeout != Some(timeout) {
            self.socket
                .set_read_timeout(Some(timeout))
                .map_err(|e| ContractError::transport(self.local_addr.to_string(), e.to_string()))?;
            self.last_timeout = Some(timeout);
        }
        Ok(())
    }
}

impl TelemetrySource for UdpJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn recv(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<Option<TelemetryRecord>, ContractError> {
        self.set_timeout(timeout)?;

        let (len, peer) = match self.socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(None),
            Err(e) => {
                return Err(ContractError::transport(
                    self.local_addr.to_string(),
                    e.to_string(),
                ))
            }
        };

        trace!(%peer, len, "datagram received");
        serde_json::from_slice(&self.buf[..len])
            .map(Some)
            .map_err(|e| ContractError::decode(&self.name, format!("datagram from {peer}: {e}")))
    }
}
