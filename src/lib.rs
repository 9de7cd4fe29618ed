//! Reconnect-aware pub/sub facade over an abstract messaging transport.
//!
//! This library lets application code subscribe to named topics and publish
//! messages without rebuilding its subscriptions by hand every time the
//! underlying transport connection is torn down and recreated (broker
//! restart, cluster master change, etc).
//!
//! The core is [`PsClient`]: it keeps a registry of every `(topic, handler)`
//! pair it has been given, and on each [`PsClient::start`] it replays that
//! registry against a brand-new transport instance. After any successful
//! `start`, the set of live subscriptions equals the registry exactly.
//!
//! [`PsServer`] is the matching listen/publish facade for the server side of
//! the transport; it keeps no topic state of its own.

// Import all sub modules once...
mod client;
mod domain;
mod server;
mod transport;

mod ps_config;

mod error;
mod macros;

pub(crate) use macros::{log_debug, log_warn};

// Re-export main types
pub use client::PsClient;
pub use server::PsServer;

pub use ps_config::PsConfig;

pub use error::{Error, Result};

pub use transport::{
    //
    create_memory_bus,
    MemoryBus,
    MemoryClientFactory,
    MemoryServerFactory,
};

// --- public re-exports
pub use domain::{
    //
    ClientFactory,
    ClientFactoryPtr,
    Endpoint,
    HandlerPtr,
    Payload,
    PayloadHandler,
    ServerFactory,
    Topic,
    TransportClient,
    TransportServer,
};
