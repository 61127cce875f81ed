use std::fs;
use std::path::Path;

use log::debug;

use crate::device::screen::{show_status, Screen, BLACK, STATUS_Y};
use crate::device::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::Result;

/// Promote a fully staged download to the current-image slot.
///
/// A rename on the same filesystem is all-or-nothing: the previous image is
/// either fully replaced or untouched, never half-overwritten.
pub fn promote(staging: &Path, current: &Path) -> Result<()> {
    fs::rename(staging, current)?;
    debug!("promoted {} -> {}", staging.display(), current.display());
    Ok(())
}

/// Clear the panel, paint the neutral background and decode-and-paint the
/// current image. The asset arrives pre-scaled to the exact panel
/// resolution, so no offset or scaling math happens here.
pub fn show<S: Screen>(screen: &mut S, current: &Path) -> Result<()> {
    show_status(screen, "Displaying...", STATUS_Y);
    screen.clear();
    screen.fill_rect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, BLACK);
    screen.draw_image(current)?;
    debug!("image displayed");
    Ok(())
}
