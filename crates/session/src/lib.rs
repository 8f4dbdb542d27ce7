//! Session store implementations for Atomia.

pub mod in_memory;

pub use in_memory::InMemorySessionStore;
