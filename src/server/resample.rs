use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::ImageFormat;
use log::debug;

use crate::Result;

/// Scale `src` to exactly `width`×`height` with nearest-neighbor sampling
/// and publish the JPEG at `dest`.
///
/// The encode goes to a sibling temp file which is renamed onto `dest`, so
/// a concurrent reader observes either the previous asset or the new one,
/// never a truncated write. On any failure `dest` keeps its previous
/// contents and the temp file is removed.
pub fn resample(src: &Path, dest: &Path, width: u32, height: u32) -> Result<()> {
    let img = image::open(src)?;
    let scaled = img.resize_exact(width, height, FilterType::Nearest);

    let tmp = temp_sibling(dest);
    if let Err(e) = scaled.to_rgb8().save_with_format(&tmp, ImageFormat::Jpeg) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!("published {width}x{height} asset at {}", dest.display());
    Ok(())
}

/// Hidden temp name in the destination directory, so the final rename
/// never crosses a filesystem boundary.
fn temp_sibling(dest: &Path) -> PathBuf {
    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(10)
        .collect();
    let name = match dest.file_name().and_then(|n| n.to_str()) {
        Some(name) => format!(".{name}.{suffix}"),
        None => suffix,
    };
    dest.with_file_name(name)
}
