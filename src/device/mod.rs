//! Device half of the pipeline: a single cooperative loop that connects,
//! streams the scaled asset into a staging file under a free-memory floor,
//! promotes it and paints it. All hardware touchpoints (screen, network
//! stack, allocator accounting, button) are trait seams.

pub mod cleanup;
pub mod display;
pub mod download;
pub mod memory;
pub mod progress;
pub mod scheduler;
pub mod screen;
pub mod transport;

pub const SCREEN_WIDTH: u32 = 240;
pub const SCREEN_HEIGHT: u32 = 135;
pub const FONT_SIZE: u32 = 12;
