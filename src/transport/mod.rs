//! Transport implementations.
//!
//! This module provides concrete implementations of the domain-level
//! transport capabilities, exposed only through constructor functions and
//! factory types.
//!
//! Domain code must not depend on transport-specific types.

mod memory;

pub use memory::{create_memory_bus, MemoryBus, MemoryClientFactory, MemoryServerFactory};
