use std::path::Path;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::device::{FONT_SIZE, SCREEN_WIDTH};
use crate::Result;

/// Packed 0xRRGGBB.
pub type Color = u32;

pub const BLACK: Color = 0x000000;
pub const WHITE: Color = 0xffffff;

/// Default baseline for status messages.
pub const STATUS_Y: i32 = 60;

const STATUS_PADDING: u32 = 4;
const STATUS_SETTLE: Duration = Duration::from_millis(100);

/// Seam for the LCD driver. `draw_image` decodes and paints in one step:
/// it either paints a complete frame or fails with `DecodeOrRender`,
/// never a partial one.
pub trait Screen {
    fn clear(&mut self);
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color);
    fn draw_text(&mut self, msg: &str, x: i32, y: i32, color: Color);
    fn draw_image(&mut self, path: &Path) -> Result<()>;
}

/// Draw `msg` centered at `y`, white on a padded black box so it stays
/// readable over whatever is on screen.
pub fn show_status<S: Screen>(screen: &mut S, msg: &str, y: i32) {
    debug!("status: {msg}");
    let w = msg.len() as u32 * FONT_SIZE;
    let x = (SCREEN_WIDTH as i32 - w as i32) / 2;
    let pad = STATUS_PADDING as i32;
    screen.fill_rect(
        x - pad,
        y - pad,
        w + STATUS_PADDING * 2,
        FONT_SIZE + STATUS_PADDING * 2,
        BLACK,
    );
    screen.draw_text(msg, x, y, WHITE);
    thread::sleep(STATUS_SETTLE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::{RecordingScreen, ScreenOp};

    #[test]
    fn status_is_centered_over_a_padded_box() {
        let mut screen = RecordingScreen::default();
        show_status(&mut screen, "Ready!", STATUS_Y);

        // 6 chars * 12 px = 72 px wide, centered on a 240 px panel.
        let x = (240 - 72) / 2;
        assert_eq!(
            screen.ops,
            vec![
                ScreenOp::Rect {
                    x: x - 4,
                    y: STATUS_Y - 4,
                    w: 72 + 8,
                    h: FONT_SIZE + 8,
                    color: BLACK,
                },
                ScreenOp::Text("Ready!".to_string()),
            ]
        );
    }
}
