//! # Atomia Core
//!
//! Domain types, traits, and error definitions for the Atomia tutoring proxy.
//! This crate has **zero framework dependencies**: it defines the domain model
//! that the session store, providers, and gateway implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem with more than one possible implementation is a trait here.
//! Implementations live in their respective crates, so the request handler can
//! be wired with in-memory stores and mock providers in tests.

pub mod error;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SessionError};
pub use message::{Role, SessionId, Subject, Turn};
pub use provider::{GenerationRequest, GenerationResponse, Provider, Usage};
pub use session::{MAX_CONTEXT_MESSAGES, SessionStore, SessionSummary};
