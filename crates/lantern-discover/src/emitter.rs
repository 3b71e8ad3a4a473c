//! The beacon emission loop.
//!
//! Walks the keystore in batches, broadcasting each batch as a beacon pair:
//! datagram A, a one-second pause (the listener's proof of elapsed time),
//! then datagram B. When the mask runs dry the emitter sleeps out the rescan
//! interval and starts a fresh cycle, picking up keystore changes.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, error, info};

use lantern_core::constants::BEACON_PAIR_INTERVAL;
use lantern_keystore::{Keystore, KeystoreMask};

use crate::builder::build_beacon_pair;
use crate::config::DiscoverConfig;
use crate::error::DiscoverError;
use crate::shutdown::ShutdownToken;

/// Periodic broadcaster of beacon pairs.
pub struct BeaconEmitter {
    config: DiscoverConfig,
    keystore: Arc<Keystore>,
    socket: UdpSocket,
    shutdown: Arc<ShutdownToken>,
}

impl BeaconEmitter {
    /// Bind the broadcast socket and prepare an emitter.
    pub async fn bind(
        config: DiscoverConfig,
        keystore: Arc<Keystore>,
    ) -> Result<Self, DiscoverError> {
        let socket = UdpSocket::bind(config.emit_bind_addr).await?;
        socket.set_broadcast(true)?;
        // Loop beacons back so a listener on the same host sees us too.
        socket.set_multicast_loop_v4(true)?;

        Ok(Self {
            config,
            keystore,
            socket,
            shutdown: Arc::new(ShutdownToken::new()),
        })
    }

    /// Handle for requesting a graceful stop from another task.
    pub fn shutdown_token(&self) -> Arc<ShutdownToken> {
        Arc::clone(&self.shutdown)
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr, DiscoverError> {
        Ok(self.socket.local_addr()?)
    }

    /// Run the emission loop until stopped or a send fails.
    ///
    /// A send error is considered fatal for this loop; the caller decides
    /// whether to rebind and restart.
    pub async fn run(self) -> Result<(), DiscoverError> {
        let mut stop_rx = self.shutdown.subscribe();
        let mut mask = KeystoreMask::new();

        info!("emitting beacons to {}", self.config.broadcast_addr);

        loop {
            if self.shutdown.is_stopped() {
                return Ok(());
            }

            let pair = match build_beacon_pair(&mut mask, &self.keystore) {
                Some(pair) => pair,
                None => {
                    // Cycle complete (or nothing to advertise). Start over
                    // after the rescan delay so keystore changes get picked
                    // up.
                    mask.reset();
                    debug!(
                        "key set exhausted; rescanning keystore in {}s",
                        self.config.timesleep
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.rescan_interval()) => {}
                        _ = stop_rx.changed() => return Ok(()),
                    }
                    continue;
                }
            };

            self.send(&pair.first).await?;

            tokio::select! {
                _ = tokio::time::sleep(BEACON_PAIR_INTERVAL) => {}
                _ = stop_rx.changed() => return Ok(()),
            }

            self.send(&pair.second).await?;
        }
    }

    async fn send(&self, datagram: &[u8]) -> Result<(), DiscoverError> {
        let sent = match self
            .socket
            .send_to(datagram, self.config.broadcast_addr)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                error!("couldn't send beacon: {e}");
                return Err(e.into());
            }
        };

        if sent != datagram.len() {
            return Err(DiscoverError::TransmitFailed(format!(
                "sent {} of {} bytes",
                sent,
                datagram.len()
            )));
        }

        Ok(())
    }
}
