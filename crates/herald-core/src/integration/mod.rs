//! Integration layer - External system interfaces.
//!
//! The only external collaborator of the dispatch core is the platform
//! connection, reached through the [`Gateway`] trait. Everything else the
//! connection does (handshake, heartbeats, wire codec) stays on its side of
//! that boundary.

pub mod gateway;

pub use gateway::{BoxedGateway, Gateway, GatewayError, GatewayResult};
