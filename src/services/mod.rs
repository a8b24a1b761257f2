//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the remote-call and session-cache logic so route
//! handlers can stay focused on request/response translation.

pub mod auth;
pub mod data;
pub mod stats;
pub mod store;
