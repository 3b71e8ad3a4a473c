//! End-to-end discovery over loopback UDP: a real emitter paces a beacon
//! pair to a real listener, which must recognize the shared key.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use lantern_core::types::PublicKey;
use lantern_discover::{
    BeaconEmitter, BeaconListener, DiscoverConfig, DiscoverHandler, Discovery, HostEvent, logging,
};
use lantern_keystore::Keystore;

/// Forwards every discovery out of the listener task for assertions.
struct ForwardHandler {
    tx: mpsc::UnboundedSender<Discovery>,
}

impl DiscoverHandler for ForwardHandler {
    fn on_beacon(&mut self, discovery: Discovery) -> bool {
        let _ = self.tx.send(discovery);
        true
    }
}

fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

async fn start_listener(
    store: Keystore,
) -> (
    SocketAddr,
    Arc<lantern_discover::ShutdownToken>,
    mpsc::UnboundedReceiver<Discovery>,
    mpsc::Sender<HostEvent>,
    tokio::task::JoinHandle<Result<(), lantern_discover::DiscoverError>>,
) {
    let config = DiscoverConfig {
        bind_addr: loopback(0),
        ..DiscoverConfig::default()
    };
    let listener = BeaconListener::bind(&config, Arc::new(store)).unwrap();
    let addr = listener.local_addr().unwrap();
    let stop = listener.shutdown_token();

    let (discovery_tx, discovery_rx) = mpsc::unbounded_channel();
    let (host_tx, host_rx) = mpsc::channel(8);
    let task = tokio::spawn(listener.run(ForwardHandler { tx: discovery_tx }, host_rx));

    (addr, stop, discovery_rx, host_tx, task)
}

async fn start_emitter(
    store: Keystore,
    target: SocketAddr,
) -> (
    Arc<lantern_discover::ShutdownToken>,
    tokio::task::JoinHandle<Result<(), lantern_discover::DiscoverError>>,
) {
    let config = DiscoverConfig {
        emit_bind_addr: loopback(0),
        broadcast_addr: target,
        timesleep: 60,
        ..DiscoverConfig::default()
    };
    let emitter = BeaconEmitter::bind(config, Arc::new(store)).await.unwrap();
    let stop = emitter.shutdown_token();
    let task = tokio::spawn(emitter.run());
    (stop, task)
}

#[tokio::test]
async fn shared_key_is_discovered() {
    logging::init_for_tests();

    let shared_key = PublicKey::new([0x5A; 32]);

    let listener_store = Keystore::new();
    listener_store.add(shared_key, Some("peer-one".into()));
    listener_store.add(PublicKey::new([0x77; 32]), Some("someone-else".into()));
    let (addr, listener_stop, mut discoveries, _host_tx, listen_task) =
        start_listener(listener_store).await;

    let emitter_store = Keystore::new();
    emitter_store.add(shared_key, Some("self".into()));
    let (emitter_stop, emit_task) = start_emitter(emitter_store, addr).await;

    // The pair needs a real second between its datagrams; allow plenty.
    let discovery = tokio::time::timeout(Duration::from_secs(10), discoveries.recv())
        .await
        .expect("timed out waiting for discovery")
        .expect("discovery channel closed");

    // The listener reports its own keystore entry, not the wire bytes.
    assert_eq!(discovery.pubkey, shared_key);
    assert_eq!(discovery.tag.as_deref(), Some("peer-one"));
    assert!(discovery.source.is_loopback());

    emitter_stop.signal_stop();
    listener_stop.signal_stop();
    emit_task.await.unwrap().unwrap();
    listen_task.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_emitter_is_not_reported() {
    logging::init_for_tests();

    let listener_store = Keystore::new();
    listener_store.add(PublicKey::new([0x11; 32]), None);
    listener_store.add(PublicKey::new([0x22; 32]), None);
    let (addr, listener_stop, mut discoveries, _host_tx, listen_task) =
        start_listener(listener_store).await;

    let emitter_store = Keystore::new();
    emitter_store.add(PublicKey::new([0xEE; 32]), Some("stranger".into()));
    let (emitter_stop, emit_task) = start_emitter(emitter_store, addr).await;

    // Give a full pair (1 s apart) time to arrive and be validated, then
    // some slack; no discovery may surface.
    let outcome = tokio::time::timeout(Duration::from_millis(2_500), discoveries.recv()).await;
    assert!(outcome.is_err(), "unexpected discovery: {outcome:?}");

    emitter_stop.signal_stop();
    listener_stop.signal_stop();
    emit_task.await.unwrap().unwrap();
    listen_task.await.unwrap().unwrap();
}

#[tokio::test]
async fn host_channel_shutdown_stops_listener() {
    logging::init_for_tests();

    let (_, _stop, _discoveries, host_tx, listen_task) = start_listener(Keystore::new()).await;

    host_tx.send(HostEvent::Shutdown).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), listen_task)
        .await
        .expect("listener did not stop on host event")
        .unwrap()
        .unwrap();
}
