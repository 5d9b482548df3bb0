//! Domains module containing business logic organized by bounded contexts.
//!
//! This server exposes a single domain: tools.

pub mod tools;
