//! Keeps a small fixed-resolution display device in sync with an image
//! re-served by an intermediary server. The `device` half streams, stages
//! and promotes downloads under a hard free-memory floor; the `server` half
//! periodically fetches an upstream image, rescales it and publishes the
//! result atomically for the device to poll.

pub mod config;
pub mod device;
pub mod errors;
pub mod server;

pub use errors::{PixframeError, Result};
