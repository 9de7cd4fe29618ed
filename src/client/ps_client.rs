// src/client/ps_client.rs

//! Pub/sub client implementation.
//!
//! This module contains the core [`PsClient`] type: a subscription registry
//! plus the reconnect orchestrator that drives a transport client.
//!
//! # Architecture
//!
//! The client records every `(topic, handler)` pair it is given in a
//! registry that outlives any single transport connection. Each call to
//! [`PsClient::start`] tears down the previous transport instance (if one is
//! live), builds a brand-new one through the configured [`ClientFactory`],
//! connects it, and replays the full registry against it. Reconnection is
//! therefore teardown + rebuild + full state replay: after any successful
//! `start`, the set of live subscriptions equals the registry exactly.
//!
//! # Concurrency
//!
//! The registry, the connected flag, and the current transport handle are
//! guarded by a single mutex and only ever observed or mutated as one unit.
//! A `subscribe` racing a `start` either lands before the replay snapshot
//! (and is included in it) or after `start` completes (and is applied live);
//! it is never silently dropped.
//!
//! # Blocking
//!
//! `start` and `stop` may wait on network I/O inside the transport. Neither
//! returns until the transport call (and, for `start`, the full replay) has
//! finished, so "`start` returned `Ok`" always implies "every registered
//! topic is live".

use std::collections::BTreeMap;

use tokio::sync::Mutex;

use crate::{
    // ---
    log_debug,
    log_warn,
    ClientFactoryPtr,
    Endpoint,
    Error,
    HandlerPtr,
    Payload,
    PsConfig,
    Result,
    Topic,
    TransportClient,
};

/// Reconnect-aware pub/sub client.
///
/// Remembers every subscription it has been given and re-creates all of them
/// on each (re)connect. See the module docs for the full contract.
///
/// # Example
///
/// ```
/// use resub::{create_memory_bus, MemoryClientFactory, Payload, PsClient, PsConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> resub::Result<()> {
/// let bus = create_memory_bus();
/// let factory = Arc::new(MemoryClientFactory::new(bus));
/// let client = PsClient::new(factory, PsConfig::new("worker-1"));
///
/// // Subscriptions may be registered before the first connect...
/// client.subscribe("orders", Arc::new(|p: Payload| {
///     println!("order event: {} bytes", p.body.len());
/// })).await?;
///
/// // ...and are made live (and replayed on every later reconnect) here.
/// client.start("mem://local").await?;
///
/// client.publish("orders", Payload::new(&b"created"[..])).await?;
/// client.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct PsClient {
    // ---
    factory: ClientFactoryPtr,
    config: PsConfig,
    state: Mutex<ClientState>,
}

/// Registry, connection flag and current transport handle.
///
/// Kept behind one mutex so all three are always observed together.
struct ClientState {
    // ---
    connected: bool,

    /// Current transport instance, if any.
    ///
    /// Replaced wholesale on every `start`; never mutated in place across
    /// reconnects.
    transport: Option<Box<dyn TransportClient>>,

    /// Topic → handler registry.
    ///
    /// `BTreeMap` so replay iterates topics in a deterministic order.
    /// Entries are only ever added; a stop leaves them untouched.
    registry: BTreeMap<Topic, HandlerPtr>,
}

impl PsClient {
    // ---
    /// Create a client with an empty registry, in the Disconnected state.
    ///
    /// No side effects beyond local allocation; call [`start`](Self::start)
    /// to connect.
    pub fn new(factory: ClientFactoryPtr, config: PsConfig) -> Self {
        Self {
            factory,
            config,
            state: Mutex::new(ClientState {
                connected: false,
                transport: None,
                registry: BTreeMap::new(),
            }),
        }
    }

    /// Establish (or re-establish) the transport connection.
    ///
    /// Tears down any currently live instance, builds a brand-new transport
    /// client bound to `endpoint`, connects it, and replays every registered
    /// subscription against it.
    ///
    /// # Errors
    ///
    /// - The teardown error, if stopping a previously live instance fails;
    ///   the client is left Disconnected with the old instance released, and
    ///   no new connection is attempted on top of the failed stop.
    /// - The factory or connect error, verbatim; in both cases the client
    ///   stays Disconnected and the half-built instance is discarded.
    /// - [`Error::Replay`] if a subscribe fails during replay. Replay stops
    ///   at the first failure. The client is left connected but only
    ///   partially subscribed; the registry is unchanged, so a later `start`
    ///   retries everything.
    pub async fn start(&self, endpoint: impl Into<Endpoint>) -> Result<()> {
        // ---
        let endpoint = endpoint.into();
        let mut state = self.state.lock().await;

        // The previous instance must be fully released before the new one
        // exists; two live instances must never hold subscriptions at once.
        if state.connected && state.transport.is_some() {
            if let Err(err) = Self::teardown(&mut state).await {
                log_warn!(
                    "{}: teardown before reconnect failed: {err}",
                    self.config.node_id
                );
                return Err(err);
            }
        }

        // Build from scratch because we might be reconnecting.
        let mut transport = self.factory.create(&endpoint).await?;

        // A connect failure discards the unconnected instance rather than
        // retaining a dead handle as the instance of record.
        transport.connect().await?;

        log_debug!(
            "{}: connected to {endpoint}, replaying {} subscription(s)",
            self.config.node_id,
            state.registry.len()
        );

        state.connected = true;
        let replayed = Self::replay(&state.registry, transport.as_ref()).await;
        state.transport = Some(transport);

        if let Err(ref _err) = replayed {
            log_warn!("{}: subscription replay aborted: {_err}", self.config.node_id);
        }

        replayed
    }

    /// Gracefully stop the current transport instance.
    ///
    /// The registry is untouched: subscriptions are remembered across a
    /// stop, which is the entire point of keeping the registry at all. A
    /// stopped client can always be restarted.
    ///
    /// Calling `stop` with no live instance is a no-op success.
    ///
    /// # Errors
    ///
    /// Whatever the transport's stop reports. The instance is released and
    /// the client is Disconnected even on failure.
    pub async fn stop(&self) -> Result<()> {
        // ---
        let mut state = self.state.lock().await;

        log_debug!("{}: stopping transport", self.config.node_id);
        Self::teardown(&mut state).await
    }

    /// Register `handler` for `topic`.
    ///
    /// The pair is recorded unconditionally, even while disconnected —
    /// subscribing before the first `start` is supported and those
    /// subscriptions go live on connect. If currently connected, a live
    /// transport subscribe is issued as well.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateTopic`] if the topic is already registered; the
    ///   existing registration and any live subscription are untouched.
    /// - The transport error, verbatim, if the live subscribe fails. The
    ///   registry entry is deliberately *not* rolled back: the topic stays
    ///   remembered and the next successful `start` retries it via replay.
    pub async fn subscribe(&self, topic: impl Into<Topic>, handler: HandlerPtr) -> Result<()> {
        // ---
        let topic = topic.into();
        let mut state = self.state.lock().await;

        if state.registry.contains_key(&topic) {
            return Err(Error::DuplicateTopic(topic));
        }

        state.registry.insert(topic.clone(), handler.clone());

        if state.connected {
            if let Some(transport) = state.transport.as_deref() {
                transport.subscribe(topic, handler).await?;
            }
        }

        Ok(())
    }

    /// Publish a payload to `topic`.
    ///
    /// Delegates to the current transport instance and returns its result
    /// unchanged. No queueing, no buffering, no retry.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] if the client is disconnected or holds no
    /// transport instance; no transport call is made in that case.
    pub async fn publish(&self, topic: impl Into<Topic>, payload: Payload) -> Result<()> {
        // ---
        let state = self.state.lock().await;

        match state.transport.as_deref() {
            Some(transport) if state.connected => transport.publish(topic.into(), payload).await,
            _ => Err(Error::NotConnected),
        }
    }

    /// Whether the client currently holds a connected transport instance.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connected
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &PsConfig {
        &self.config
    }

    /// Snapshot of the registered topic names, in replay order.
    pub async fn topics(&self) -> Vec<Topic> {
        // ---
        let state = self.state.lock().await;
        state.registry.keys().cloned().collect()
    }

    /// Release the current instance and mark the client Disconnected.
    ///
    /// The instance is taken out of the state before its stop is awaited, so
    /// even a failed stop leaves no handle behind.
    async fn teardown(state: &mut ClientState) -> Result<()> {
        // ---
        state.connected = false;

        match state.transport.take() {
            Some(mut transport) => transport.stop().await,
            None => Ok(()),
        }
    }

    /// Re-issue every registered subscription against a fresh instance.
    ///
    /// Aborts and reports on the first transport failure; topics after the
    /// failing one are not attempted in this call.
    async fn replay(
        registry: &BTreeMap<Topic, HandlerPtr>,
        transport: &dyn TransportClient,
    ) -> Result<()> {
        // ---
        for (topic, handler) in registry {
            if let Err(err) = transport.subscribe(topic.clone(), handler.clone()).await {
                return Err(Error::Replay {
                    topic: topic.clone(),
                    source: Box::new(err),
                });
            }
        }

        Ok(())
    }
}
