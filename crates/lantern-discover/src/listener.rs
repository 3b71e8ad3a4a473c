//! The beacon listening loop.
//!
//! Waits simultaneously on the discovery socket and an optional host control
//! channel. Datagrams flow through the pair tracker; completed pairs go to
//! the recognizer, which surfaces trusted-key matches through the handler.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use lantern_core::constants::{BEACON_MAX_BYTES, BEACON_MIN_BYTES};
use lantern_keystore::Keystore;

use crate::config::DiscoverConfig;
use crate::error::DiscoverError;
use crate::handler::{DiscoverHandler, HostEvent};
use crate::recognize::recognize;
use crate::shutdown::ShutdownToken;
use crate::tracker::{Observation, PairTracker};

/// Receiver and correlator of beacon pairs.
pub struct BeaconListener {
    keystore: Arc<Keystore>,
    socket: UdpSocket,
    tracker: PairTracker,
    shutdown: Arc<ShutdownToken>,
}

impl BeaconListener {
    /// Bind the discovery socket.
    ///
    /// Must be called from within a tokio runtime. The socket takes
    /// `SO_REUSEADDR` (and `SO_REUSEPORT` on unix) so an emitter or a
    /// restarted listener can share the fixed discovery port.
    pub fn bind(config: &DiscoverConfig, keystore: Arc<Keystore>) -> Result<Self, DiscoverError> {
        let socket = Self::create_socket(config.bind_addr)?;
        let socket = UdpSocket::from_std(socket)?;

        Ok(Self {
            keystore,
            socket,
            tracker: PairTracker::new(),
            shutdown: Arc::new(ShutdownToken::new()),
        })
    }

    fn create_socket(bind_addr: SocketAddr) -> io::Result<std::net::UdpSocket> {
        let socket = Socket::new(Domain::for_address(bind_addr), Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        #[cfg(unix)]
        socket.set_reuse_port(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&bind_addr.into())?;
        Ok(socket.into())
    }

    /// Handle for requesting a graceful stop from another task.
    pub fn shutdown_token(&self) -> Arc<ShutdownToken> {
        Arc::clone(&self.shutdown)
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr, DiscoverError> {
        Ok(self.socket.local_addr()?)
    }

    /// Run the listening loop until the handler or host channel asks to stop.
    ///
    /// Receive errors never propagate: an interrupted or failed read drops
    /// at most one datagram and the loop carries on.
    pub async fn run<H: DiscoverHandler>(
        mut self,
        mut handler: H,
        mut host_rx: mpsc::Receiver<HostEvent>,
    ) -> Result<(), DiscoverError> {
        let mut stop_rx = self.shutdown.subscribe();
        let mut buf = vec![0u8; BEACON_MAX_BYTES];

        info!("listening for beacons on {}", self.socket.local_addr()?);

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok((len, peer)) => {
                        if len < BEACON_MIN_BYTES {
                            continue;
                        }
                        if !self.handle_datagram(peer.ip(), &buf[..len], &mut handler) {
                            info!("handler requested stop");
                            return Ok(());
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("beacon recv error: {e}");
                        continue;
                    }
                },
                event = host_rx.recv() => match event {
                    Some(event) => {
                        if !handler.on_channel(event) {
                            info!("host channel requested stop");
                            return Ok(());
                        }
                    }
                    None => {
                        debug!("host channel closed");
                        return Ok(());
                    }
                },
                _ = stop_rx.changed() => return Ok(()),
            }
        }
    }

    /// Returns `false` when the handler asks the loop to stop.
    fn handle_datagram<H: DiscoverHandler>(
        &mut self,
        source: IpAddr,
        datagram: &[u8],
        handler: &mut H,
    ) -> bool {
        match self.tracker.observe(source, datagram, Instant::now()) {
            Observation::FirstCached => true,
            Observation::Dropped(err) => {
                trace!("dropped malformed datagram from {source}: {err}");
                true
            }
            Observation::Rejected(reason) => {
                warn!("beacon_fail:source={source}:reason={reason}");
                true
            }
            Observation::Shifted(reason) => {
                debug!("beacon_fail:source={source}:reason={reason}");
                true
            }
            Observation::Paired(pair) => recognize(&pair, source, &self.keystore, handler),
        }
    }
}
