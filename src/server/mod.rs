//! Server half of the pipeline: a background thread pulls the upstream
//! image and republishes it at the device resolution, while the HTTP side
//! serves the scaled asset. The two share nothing but the artifact paths;
//! the atomic rename in `resample` keeps readers off half-written files.

pub mod fetch;
pub mod http;
pub mod resample;
