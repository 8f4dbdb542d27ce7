//! Text-generation providers for Atomia.
//!
//! [`GeminiProvider`] implements `atomia_core::Provider` against Google's
//! `generateContent` API. [`GenerationClient`] sits in front of it and turns
//! every outcome, including a missing credential, into answer text.

pub mod client;
pub mod gemini;

pub use client::{Generation, GenerationClient, GenerationSettings};
pub use gemini::GeminiProvider;
