//! Supersede: Latest-Wins Request Lifecycle Tracking
//!
//! A request lifecycle tracker for client-side data access layers. Dispatching
//! an operation for a context can cancel everything still in flight for that
//! context, and cancelled requests are reported as aborts instead of errors.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod handle;
pub mod logging;
pub mod options;
pub mod outcome;
pub mod registry;
pub mod tracker;
pub mod transport;
pub mod types;
