// src/server/mod.rs

//! Pub/sub server facade.
//!
//! [`PsServer`] is a thin pass-through over the server side of the transport
//! capability. There is no reconnection logic server-side and no topic
//! bookkeeping: only one transport instance ever exists, owned exclusively
//! by the facade, and every operation forwards to it unchanged.

use crate::{
    // ---
    Endpoint,
    Payload,
    Result,
    ServerFactory,
    Topic,
    TransportServer,
};

/// Stateless listen/publish facade over a transport server.
///
/// `listen` blocks the calling task until the server is stopped or fails;
/// spawn it if the caller needs to do anything else concurrently.
///
/// # Example
///
/// ```
/// use resub::{create_memory_bus, MemoryServerFactory, Payload, PsServer};
///
/// # async fn example() -> resub::Result<()> {
/// let bus = create_memory_bus();
/// let server = PsServer::bind(&MemoryServerFactory::new(bus), "mem://local").await?;
///
/// server.publish("alerts", Payload::new(&b"disk full"[..])).await?;
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct PsServer {
    // ---
    transport: Box<dyn TransportServer>,
}

impl PsServer {
    // ---
    /// Build and bind a transport server at `endpoint`.
    ///
    /// # Errors
    ///
    /// Whatever the factory reports: a malformed bind address or an address
    /// already in use.
    pub async fn bind(factory: &dyn ServerFactory, endpoint: impl Into<Endpoint>) -> Result<Self> {
        // ---
        let transport = factory.bind(&endpoint.into()).await?;
        Ok(Self::with_transport(transport))
    }

    /// Wrap an already-bound transport server.
    pub fn with_transport(transport: Box<dyn TransportServer>) -> Self {
        Self { transport }
    }

    /// Begin accepting connections.
    ///
    /// Blocks until [`stop`](Self::stop) is called or the transport fails.
    pub async fn start(&self) -> Result<()> {
        self.transport.listen().await
    }

    /// Stop the server and release all resources.
    pub async fn stop(&self) -> Result<()> {
        self.transport.stop().await
    }

    /// Publish a payload to `topic` through the transport server.
    pub async fn publish(&self, topic: impl Into<Topic>, payload: Payload) -> Result<()> {
        self.transport.publish(topic.into(), payload).await
    }
}
