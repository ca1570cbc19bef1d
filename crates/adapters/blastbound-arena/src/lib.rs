//! Arena integration for Blastbound matches.
//!
//! One HTTP surface (session init plus viewer commands) and one realtime
//! WebSocket channel that delivers boosts, item drops, encounter triggers,
//! and match lifecycle signals as [`blastbound_core::events::ArenaEvent`]s.

pub mod client;
pub mod config;
pub mod protocol;

pub use client::{ArenaClient, ArenaError, RealtimeHandle};
pub use config::ArenaClientConfig;
pub use protocol::{InitResponse, ProtocolError};
