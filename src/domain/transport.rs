// src/domain/transport.rs

//! Transport domain abstractions.
//!
//! This module defines the domain-level transport interface used by the
//! client and server facades to exchange messages. It intentionally avoids
//! any reference to concrete protocols, brokers, or client libraries.
//!
//! The transport layer is responsible only for maintaining a connection,
//! holding live subscriptions, and delivering opaque payloads to the
//! registered handlers. Higher-level semantics — the subscription registry
//! and its replay across reconnects — live in [`crate::PsClient`].
//!
//! Concrete implementations of these interfaces live under `src/transport/`.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

/// A topic name.
///
/// Topics are the unit of subscription: a handler registered for a topic
/// receives every payload published to that exact topic. The domain layer
/// makes no assumptions about topic syntax, hierarchy, or wildcards; the
/// in-memory transport provides the reference semantics (exact match).
///
/// Topics are immutable, cheap to clone, and safe to share across threads.
/// `Ord` is derived so registries can iterate topics in a deterministic
/// order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Topic(pub Arc<str>);

impl<T> From<T> for Topic
where
    T: Into<Arc<str>>,
{
    fn from(value: T) -> Self {
        // ---
        Topic(value.into())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transport endpoint address.
///
/// An `Endpoint` identifies where a transport connects or binds
/// (e.g. `"tcp://127.0.0.1:9100"`). Its interpretation is entirely
/// transport-specific; this crate passes it through unmodified.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Endpoint(pub Arc<str>);

impl<T> From<T> for Endpoint
where
    T: Into<Arc<str>>,
{
    fn from(value: T) -> Self {
        // ---
        Endpoint(value.into())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque message envelope.
///
/// A `Payload` is the unit of transport between publishers and handlers.
/// It carries the message body along with optional content-type metadata.
/// Neither the facades nor the transport layer interpret the body; only
/// the application handler does, on delivery.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    // ---
    /// Opaque message bytes.
    ///
    /// The interpretation of the body is defined entirely by the
    /// application code on both ends.
    pub body: Bytes,

    /// Optional content type metadata (e.g., "application/json").
    ///
    /// This field is informational and not enforced anywhere in this
    /// crate. Transports and handlers may use it for decoding decisions.
    pub content_type: Option<Arc<str>>,
}

impl Payload {
    // ---
    /// Create a payload from raw bytes with no content-type metadata.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }

    /// Create a payload with an explicit content type.
    pub fn with_content_type(body: impl Into<Bytes>, content_type: impl Into<Arc<str>>) -> Self {
        Self {
            body: body.into(),
            content_type: Some(content_type.into()),
        }
    }
}

/// Callback capability invoked with each payload delivered for a topic.
///
/// The registry stores handlers but never calls them itself; only the
/// transport does, on delivery. Handlers must therefore be `Send + Sync`
/// and should return quickly — a slow handler stalls delivery for its
/// transport.
///
/// Any `Fn(Payload) + Send + Sync` closure is a handler:
///
/// ```
/// use resub::{HandlerPtr, Payload};
/// use std::sync::Arc;
///
/// let handler: HandlerPtr = Arc::new(|payload: Payload| {
///     println!("got {} bytes", payload.body.len());
/// });
/// ```
pub trait PayloadHandler: Send + Sync {
    /// Handle one delivered payload.
    fn handle(&self, payload: Payload);
}

impl<F> PayloadHandler for F
where
    F: Fn(Payload) + Send + Sync,
{
    fn handle(&self, payload: Payload) {
        // ---
        self(payload)
    }
}

/// Shared handler pointer.
///
/// This is an `Arc<dyn PayloadHandler>`: cheap to clone, so the registry
/// keeps one reference and every transport instance it is replayed onto
/// gets another.
pub type HandlerPtr = Arc<dyn PayloadHandler>;

/// Client side of the transport capability.
///
/// A `TransportClient` represents one connection attempt's worth of state:
/// it is built bound to an endpoint, connected once, loaded with
/// subscriptions, and eventually stopped. It is never reused across
/// reconnects — [`crate::PsClient::start`] builds a fresh instance through a
/// [`ClientFactory`] every time.
///
/// Implementations must ensure that:
/// - Once `subscribe()` returns successfully, payloads published *after*
///   that point to the topic are delivered to the handler.
/// - After `stop()` returns, the instance delivers nothing further and
///   holds no live subscriptions.
///
/// The in-memory transport serves as the reference implementation of these
/// semantics.
#[async_trait::async_trait]
pub trait TransportClient: Send + Sync {
    // ---
    /// Establish the connection to the endpoint this instance was built for.
    async fn connect(&mut self) -> Result<()>;

    /// Register a live subscription delivering to `handler`.
    async fn subscribe(&self, topic: Topic, handler: HandlerPtr) -> Result<()>;

    /// Publish a payload to the given topic.
    async fn publish(&self, topic: Topic, payload: Payload) -> Result<()>;

    /// Tear down the connection and drop all live subscriptions.
    async fn stop(&mut self) -> Result<()>;
}

/// Server side of the transport capability.
///
/// Stateless from this crate's point of view: no reconciliation logic
/// applies server-side, so the facade forwards to it without bookkeeping.
#[async_trait::async_trait]
pub trait TransportServer: Send + Sync {
    // ---
    /// Accept and serve connections. Blocks until `stop()` is called or the
    /// transport fails.
    async fn listen(&self) -> Result<()>;

    /// Stop listening and release all resources.
    async fn stop(&self) -> Result<()>;

    /// Publish a payload to the given topic.
    async fn publish(&self, topic: Topic, payload: Payload) -> Result<()>;
}

/// Factory for transport-client instances.
///
/// `start` calls this once per (re)connect; each call must return a
/// brand-new, not-yet-connected instance bound to `endpoint`.
#[async_trait::async_trait]
pub trait ClientFactory: Send + Sync {
    /// Build a new unconnected client bound to `endpoint`.
    async fn create(&self, endpoint: &Endpoint) -> Result<Box<dyn TransportClient>>;
}

/// Factory for transport-server instances.
#[async_trait::async_trait]
pub trait ServerFactory: Send + Sync {
    /// Build a server bound to `endpoint`.
    ///
    /// Fails if the address is malformed or already in use.
    async fn bind(&self, endpoint: &Endpoint) -> Result<Box<dyn TransportServer>>;
}

/// Shared client-factory pointer.
pub type ClientFactoryPtr = Arc<dyn ClientFactory>;
