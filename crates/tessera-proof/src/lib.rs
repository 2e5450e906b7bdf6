//! Detached proofs over caller-canonicalized payloads.
//!
//! The engine never canonicalizes data itself: it signs and verifies the
//! exact bytes it is handed.

pub mod engine;
pub mod error;

pub use engine::{Proof, ProofEngine};
pub use error::ProofError;
