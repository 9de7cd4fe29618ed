// src/transport/memory/mod.rs

//! In-memory transport implementation.
//!
//! This module provides a pure in-process implementation of the domain-level
//! transport capabilities. It is intended primarily for testing, local
//! execution, and as a reference for transport semantics.
//!
//! ## Reference Semantics
//!
//! The in-memory transport defines the **reference behavior** for the
//! transport layer. Other implementations are expected to approximate this
//! behavior as closely as their underlying systems allow and to document any
//! unavoidable deviations. In particular:
//!
//! - Once `subscribe()` returns successfully, payloads published *after*
//!   that point to the same topic are delivered to the handler.
//! - Topic matching is exact string equality.
//! - After a client's `stop()` returns, none of its handlers receive
//!   anything further, even though other clients on the same bus do.
//! - Delivery is synchronous and deterministic within a single process.
//!
//! ## Non-Goals
//!
//! This transport does not attempt to emulate the failure modes,
//! persistence, or delivery guarantees of any specific broker. It exists to
//! provide a clear, deterministic baseline against which the reconnect
//! behavior of the facades can be validated.

mod transport;

pub use transport::{create_memory_bus, MemoryBus, MemoryClientFactory, MemoryServerFactory};
