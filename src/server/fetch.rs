use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{error, info};
use url::Url;

use crate::config::ServerConfig;
use crate::errors::{PixframeError, Result};
use crate::server::resample;

pub const FETCH_CHUNK_SIZE: usize = 8 * 1024;

/// Stream the upstream response body into `dest` in fixed 8 KiB chunks.
/// A non-2xx status fails without touching `dest`.
pub fn fetch(
    client: &reqwest::blocking::Client,
    url: &Url,
    dest: &Path,
) -> Result<()> {
    let mut response = client.get(url.clone()).send()?;
    if !response.status().is_success() {
        return Err(PixframeError::Transport(format!(
            "upstream status: {}",
            response.status()
        )));
    }

    let mut file = File::create(dest)?;
    let mut buf = [0u8; FETCH_CHUNK_SIZE];
    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| PixframeError::Transport(e.to_string()))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
    }
    Ok(())
}

/// Fetch-and-resample forever on the configured interval. Failures are
/// logged and left for the next tick; no retry, no backoff. Runs on its
/// own thread, an independent failure domain from the request handlers.
pub fn run_refresh_loop(config: &ServerConfig) -> ! {
    let client = reqwest::blocking::Client::new();
    let interval = Duration::from_secs(config.server.refresh_interval);
    loop {
        match fetch(
            &client,
            &config.server.image_url,
            &config.paths.source_image_path,
        ) {
            Ok(()) => {
                info!("image downloaded successfully");
                match resample::resample(
                    &config.paths.source_image_path,
                    &config.paths.image_path,
                    config.image.target_width,
                    config.image.target_height,
                ) {
                    Ok(()) => info!("image scaled successfully"),
                    Err(e) => error!("error scaling image: {e}"),
                }
            }
            Err(e) => error!("error downloading image: {e}"),
        }
        thread::sleep(interval);
    }
}
