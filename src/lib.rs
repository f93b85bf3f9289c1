//! Caching gateway in front of a text-generation API, plus the record
//! endpoints (users, memberships, PowerPlays) that share its key-value store.
//!
//! The interesting part lives in [`gateway`] and [`normalize`]: a request is
//! answered from the store when its key is present, otherwise the prompt is
//! sent to the generator and the normalized answer is stored for next time.

pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod records;
pub mod router;
pub mod state;
pub mod store;

pub use error::GatewayError;
pub use gateway::{Gateway, GatewaySettings};
pub use router::build_router;
pub use state::{AppState, Tables};
