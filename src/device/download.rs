use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::device::memory::{MemoryGuard, MemoryProbe};
use crate::device::progress;
use crate::device::screen::{show_status, Screen, STATUS_Y};
use crate::device::transport::Transport;
use crate::errors::{PixframeError, Result};

/// Small chunks keep the peak allocation bounded on the device.
pub const CHUNK_SIZE: usize = 512;

const CHUNK_PAUSE: Duration = Duration::from_millis(5);

/// Stream `url` into `staging` in 512-byte chunks.
///
/// The memory guard is consulted before every chunk; tripping it aborts
/// mid-stream with the bytes written so far left in `staging` and nothing
/// promoted. A non-200 status fails fast before any file is touched. Every
/// failure leaves a previously promoted current image untouched.
pub fn download<T, S, P>(
    transport: &mut T,
    guard: &mut MemoryGuard<P>,
    screen: &mut S,
    url: &str,
    staging: &Path,
) -> Result<()>
where
    T: Transport,
    S: Screen,
    P: MemoryProbe,
{
    show_status(screen, "Downloading...", STATUS_Y);
    debug!("requesting {url}");
    let response = transport.get(url)?;
    let status = response.status();
    debug!("response status: {status}");
    if status != 200 {
        return Err(PixframeError::Transport(format!("bad status: {status}")));
    }

    // Never append to leftovers from an aborted attempt.
    if staging.exists() {
        fs::remove_file(staging)?;
    }

    let mut body = response.into_body();
    let mut file = File::create(staging)?;
    let mut buf = [0u8; CHUNK_SIZE];
    let mut chunks: u64 = 0;
    loop {
        if !guard.check() {
            debug!("memory low during download");
            // Dropping `body` closes the connection.
            return Err(PixframeError::ResourceExhausted);
        }

        let n = body
            .read(&mut buf)
            .map_err(|e| PixframeError::Transport(e.to_string()))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        chunks += 1;
        progress::draw_chunk_progress(screen, chunks);
        // Yield so the host stays responsive between chunks.
        thread::sleep(CHUNK_PAUSE);
    }
    file.flush()?;
    drop(body);

    debug!("download complete after {chunks} chunks");
    progress::draw_bar(screen, 100);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::{
        RecordingScreen, ScriptedProbe, ScriptedTransport,
    };
    use tempdir::TempDir;

    fn body_of(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn completed_download_is_byte_identical() {
        let dir = TempDir::new("pixframe-dl").unwrap();
        let staging = dir.path().join("staged.jpg");
        let body = body_of(3 * CHUNK_SIZE + 17);

        let mut transport = ScriptedTransport::ok(body.clone());
        let mut guard = MemoryGuard::new(ScriptedProbe::plenty());
        let mut screen = RecordingScreen::default();

        download(&mut transport, &mut guard, &mut screen, "http://s/x", &staging)
            .expect("download must succeed");
        assert_eq!(fs::read(&staging).unwrap(), body);
        assert_eq!(transport.requests, vec!["http://s/x".to_string()]);
    }

    #[test]
    fn bad_status_fails_fast_and_leaves_staging_alone() {
        let dir = TempDir::new("pixframe-dl").unwrap();
        let staging = dir.path().join("staged.jpg");
        fs::write(&staging, b"previous attempt").unwrap();

        let mut transport = ScriptedTransport::status(404);
        let mut guard = MemoryGuard::new(ScriptedProbe::plenty());
        let mut screen = RecordingScreen::default();

        let err = download(
            &mut transport,
            &mut guard,
            &mut screen,
            "http://s/x",
            &staging,
        )
        .expect_err("404 must fail");
        assert!(matches!(err, PixframeError::Transport(_)));
        // Fail-fast happens before the stale file is removed.
        assert_eq!(fs::read(&staging).unwrap(), b"previous attempt");
    }

    #[test]
    fn guard_trip_keeps_bytes_through_previous_chunk() {
        let dir = TempDir::new("pixframe-dl").unwrap();
        let staging = dir.path().join("staged.jpg");
        let body = body_of(4 * CHUNK_SIZE);

        let mut transport = ScriptedTransport::ok(body.clone());
        // Healthy for two chunk checks, exhausted on the third.
        let mut guard = MemoryGuard::new(ScriptedProbe::trips_after(2));
        let mut screen = RecordingScreen::default();

        let err = download(
            &mut transport,
            &mut guard,
            &mut screen,
            "http://s/x",
            &staging,
        )
        .expect_err("guard trip must abort");
        assert!(matches!(err, PixframeError::ResourceExhausted));
        assert_eq!(fs::read(&staging).unwrap(), body[..2 * CHUNK_SIZE]);
    }

    #[test]
    fn stale_staging_is_replaced_not_appended() {
        let dir = TempDir::new("pixframe-dl").unwrap();
        let staging = dir.path().join("staged.jpg");
        fs::write(&staging, b"stale bytes from a crashed run").unwrap();
        let body = body_of(CHUNK_SIZE / 2);

        let mut transport = ScriptedTransport::ok(body.clone());
        let mut guard = MemoryGuard::new(ScriptedProbe::plenty());
        let mut screen = RecordingScreen::default();

        download(&mut transport, &mut guard, &mut screen, "http://s/x", &staging)
            .unwrap();
        assert_eq!(fs::read(&staging).unwrap(), body);
    }

    #[test]
    fn progress_is_drawn_per_chunk_plus_completion() {
        let dir = TempDir::new("pixframe-dl").unwrap();
        let staging = dir.path().join("staged.jpg");
        let body = body_of(2 * CHUNK_SIZE);

        let mut transport = ScriptedTransport::ok(body);
        let mut guard = MemoryGuard::new(ScriptedProbe::plenty());
        let mut screen = RecordingScreen::default();

        download(&mut transport, &mut guard, &mut screen, "http://s/x", &staging)
            .unwrap();
        // Status box + text, then a track rect per chunk draw and per the
        // final full bar; chunk 1 and 2 each add fill rects as well.
        let rects = screen
            .ops
            .iter()
            .filter(|op| {
                matches!(op, crate::device::testing::ScreenOp::Rect { .. })
            })
            .count();
        // 1 status box, 2 per-chunk draws (track + fill), full bar (track + fill).
        assert_eq!(rects, 1 + 2 * 2 + 2);
    }
}
