// src/transport/memory/transport.rs

//! In-memory transport implementation.
//!
//! This file contains the concrete implementations of the domain-level
//! `TransportClient` and `TransportServer` traits using in-process data
//! structures only. See the module docs for the semantics they define.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, RwLock};

use crate::{
    // ---
    ClientFactory,
    Endpoint,
    Error,
    HandlerPtr,
    Payload,
    Result,
    ServerFactory,
    Topic,
    TransportClient,
    TransportServer,
};

/// In-process message bus shared by memory clients and servers.
///
/// The bus simulates a broker entirely within the process: it holds every
/// live subscription, keyed by topic, tagged with the id of the client
/// instance that owns it so a stopped instance can be detached cleanly.
pub struct MemoryBus {
    // ---
    subscriptions: RwLock<HashMap<Topic, Vec<(u64, HandlerPtr)>>>,
    next_client_id: AtomicU64,
}

impl MemoryBus {
    // ---
    fn allocate_client_id(&self) -> u64 {
        self.next_client_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Deliver a payload to every handler subscribed to the exact topic.
    ///
    /// Handlers are called outside the subscription lock, in registration
    /// order, synchronously. This ordering defines the reference delivery
    /// semantics for the transport layer.
    async fn publish(&self, topic: &Topic, payload: Payload) {
        // ---
        let handlers: Vec<HandlerPtr> = {
            let subs = self.subscriptions.read().await;
            match subs.get(topic) {
                Some(entries) => entries.iter().map(|(_, h)| h.clone()).collect(),
                None => Vec::new(),
            }
        };

        for handler in handlers {
            handler.handle(payload.clone());
        }
    }

    async fn register(&self, client_id: u64, topic: Topic, handler: HandlerPtr) {
        // ---
        let mut subs = self.subscriptions.write().await;
        subs.entry(topic).or_default().push((client_id, handler));
    }

    /// Remove every subscription owned by one client instance.
    async fn detach_client(&self, client_id: u64) {
        // ---
        let mut subs = self.subscriptions.write().await;

        for entries in subs.values_mut() {
            entries.retain(|(id, _)| *id != client_id);
        }
        subs.retain(|_, entries| !entries.is_empty());
    }

    /// Number of live subscriptions for a topic. Test/diagnostic helper.
    pub async fn live_subscriptions(&self, topic: &Topic) -> usize {
        // ---
        let subs = self.subscriptions.read().await;
        subs.get(topic).map_or(0, Vec::len)
    }
}

/// Create a new in-memory bus.
///
/// Always available and requires no external resources. Clients and servers
/// built over the same bus see each other's traffic.
pub fn create_memory_bus() -> Arc<MemoryBus> {
    // ---
    Arc::new(MemoryBus {
        subscriptions: RwLock::new(HashMap::new()),
        next_client_id: AtomicU64::new(1),
    })
}

/// One connection's worth of client state over a [`MemoryBus`].
struct MemoryClient {
    // ---
    id: u64,
    bus: Arc<MemoryBus>,
    connected: bool,
}

#[async_trait::async_trait]
impl TransportClient for MemoryClient {
    // ---
    async fn connect(&mut self) -> Result<()> {
        // ---
        self.connected = true;
        Ok(())
    }

    async fn subscribe(&self, topic: Topic, handler: HandlerPtr) -> Result<()> {
        // ---
        if !self.connected {
            return Err(Error::Transport(
                "subscribe on unconnected memory client".into(),
            ));
        }

        self.bus.register(self.id, topic, handler).await;
        Ok(())
    }

    async fn publish(&self, topic: Topic, payload: Payload) -> Result<()> {
        // ---
        if !self.connected {
            return Err(Error::Transport(
                "publish on unconnected memory client".into(),
            ));
        }

        self.bus.publish(&topic, payload).await;
        Ok(())
    }

    /// Detach this instance from the bus.
    ///
    /// After this returns, handlers registered through this instance receive
    /// nothing further, regardless of what else happens on the bus.
    async fn stop(&mut self) -> Result<()> {
        // ---
        self.connected = false;
        self.bus.detach_client(self.id).await;
        Ok(())
    }
}

/// Server facade over a [`MemoryBus`].
///
/// `listen` parks until `stop`; publishing delivers straight through the
/// bus. There is no accept loop to simulate in-process.
struct MemoryServer {
    // ---
    bus: Arc<MemoryBus>,
    shutdown: Notify,
}

#[async_trait::async_trait]
impl TransportServer for MemoryServer {
    // ---
    async fn listen(&self) -> Result<()> {
        // ---
        self.shutdown.notified().await;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        // ---
        // notify_one stores a permit, so a stop issued before listen still
        // releases the next listen immediately.
        self.shutdown.notify_one();
        Ok(())
    }

    async fn publish(&self, topic: Topic, payload: Payload) -> Result<()> {
        // ---
        self.bus.publish(&topic, payload).await;
        Ok(())
    }
}

fn check_endpoint(endpoint: &Endpoint) -> Result<()> {
    // ---
    if endpoint.0.is_empty() {
        return Err(Error::InvalidEndpoint("empty endpoint".into()));
    }
    Ok(())
}

/// Factory producing [`MemoryBus`]-backed transport clients.
///
/// Every `create` call returns a brand-new, unconnected instance with its
/// own id, mirroring how a real transport would hand out fresh connections.
/// The endpoint is validated as non-empty and otherwise ignored.
pub struct MemoryClientFactory {
    // ---
    bus: Arc<MemoryBus>,
}

impl MemoryClientFactory {
    /// Create a factory over the given bus.
    pub fn new(bus: Arc<MemoryBus>) -> Self {
        Self { bus }
    }
}

#[async_trait::async_trait]
impl ClientFactory for MemoryClientFactory {
    // ---
    async fn create(&self, endpoint: &Endpoint) -> Result<Box<dyn TransportClient>> {
        // ---
        check_endpoint(endpoint)?;

        Ok(Box::new(MemoryClient {
            id: self.bus.allocate_client_id(),
            bus: self.bus.clone(),
            connected: false,
        }))
    }
}

/// Factory producing [`MemoryBus`]-backed transport servers.
pub struct MemoryServerFactory {
    // ---
    bus: Arc<MemoryBus>,
}

impl MemoryServerFactory {
    /// Create a factory over the given bus.
    pub fn new(bus: Arc<MemoryBus>) -> Self {
        Self { bus }
    }
}

#[async_trait::async_trait]
impl ServerFactory for MemoryServerFactory {
    // ---
    async fn bind(&self, endpoint: &Endpoint) -> Result<Box<dyn TransportServer>> {
        // ---
        check_endpoint(endpoint)?;

        Ok(Box::new(MemoryServer {
            bus: self.bus.clone(),
            shutdown: Notify::new(),
        }))
    }
}
