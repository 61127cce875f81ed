use crate::device::screen::{Color, Screen};
use crate::device::SCREEN_WIDTH;

pub const BAR_WIDTH: u32 = 160;
pub const BAR_HEIGHT: u32 = 4;
/// Just below the "Downloading..." status line.
pub const BAR_Y: i32 = 85;

const TRACK_COLOR: Color = 0x666666;
const FILL_COLOR: Color = 0x00ff00;

/// Fill width for a progress value in 0..=100.
pub fn filled_width(progress: u32) -> u32 {
    BAR_WIDTH * progress.min(100) / 100
}

/// Draw the full-width track, then a fill proportional to `progress`.
/// Pure function of its argument; redrawing with the same value paints
/// the same pixels.
pub fn draw_bar<S: Screen>(screen: &mut S, progress: u32) {
    let x = ((SCREEN_WIDTH - BAR_WIDTH) / 2) as i32;
    screen.fill_rect(x, BAR_Y, BAR_WIDTH, BAR_HEIGHT, TRACK_COLOR);
    let fill = filled_width(progress);
    if fill > 0 {
        screen.fill_rect(x, BAR_Y, fill, BAR_HEIGHT, FILL_COLOR);
    }
}

/// Cyclic per-chunk animation: the bar sweeps once every 100 chunks.
/// Completion is signalled separately with an explicit `draw_bar(_, 100)`.
pub fn draw_chunk_progress<S: Screen>(screen: &mut S, counter: u64) {
    draw_bar(screen, (counter % 100) as u32);
}
