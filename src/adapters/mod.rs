//! Infrastructure adapters. Implement outbound ports.
//!
//! Storage and notification delivery. Map errors to DomainError.

pub mod notifications;
pub mod persistence;
