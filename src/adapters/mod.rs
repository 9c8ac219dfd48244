//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - dialogue and structured-output providers
//! - `storage` - in-memory repositories
//! - `postgres` - sqlx repositories
//! - `http` - axum routes and the turn WebSocket

pub mod ai;
pub mod http;
pub mod postgres;
pub mod storage;
