use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, info};

use pixframe::device::cleanup;
use pixframe::device::memory::{MeminfoProbe, MemoryGuard};
use pixframe::device::scheduler::{
    Button, Connectivity, RefreshScheduler,
};
use pixframe::device::screen::{Color, Screen};
use pixframe::device::transport::HttpTransport;
use pixframe::{PixframeError, Result};

const STAGING_FILE: &str = "staged.jpg";
const CURRENT_FILE: &str = "img.jpg";

#[derive(Parser, Debug)]
#[clap(name = "pixframe-device")]
#[clap(
    about = "Run the device refresh loop against a pixframe server",
    long_about = None
)]
struct Cli {
    /// URL of the scaled asset, e.g. http://host:8080/image.jpg
    #[clap(long)]
    url: String,

    /// Directory holding the staged and current image files
    #[clap(long, default_value = "/tmp/pixframe")]
    data_dir: PathBuf,
}

/// Stand-in for the LCD driver: logs status text and decodes each frame to
/// prove it would paint. A firmware build wires the real panel here.
struct ConsoleScreen;

impl Screen for ConsoleScreen {
    fn clear(&mut self) {}

    fn fill_rect(&mut self, _x: i32, _y: i32, _w: u32, _h: u32, _color: Color) {}

    fn draw_text(&mut self, msg: &str, _x: i32, _y: i32, _color: Color) {
        info!("[screen] {msg}");
    }

    fn draw_image(&mut self, path: &Path) -> Result<()> {
        let img = image::open(path)
            .map_err(|e| PixframeError::DecodeOrRender(e.to_string()))?;
        debug!(
            "[screen] painted {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(())
    }
}

/// The host link is already up when the process runs.
struct AlwaysConnected;

impl Connectivity for AlwaysConnected {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// No physical button on the host; only the timer triggers refreshes.
struct NoButton;

impl Button for NoButton {
    fn was_pressed(&mut self) -> bool {
        false
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.data_dir)?;
    // Keep only the two image slots in the data directory.
    cleanup::cleanup_storage(&cli.data_dir, &[], &[STAGING_FILE, CURRENT_FILE]);

    let mut scheduler = RefreshScheduler::new(
        HttpTransport::new(),
        ConsoleScreen,
        AlwaysConnected,
        MemoryGuard::new(MeminfoProbe),
        cli.url,
        cli.data_dir.join(STAGING_FILE),
        cli.data_dir.join(CURRENT_FILE),
    );
    scheduler.run(&mut NoButton)
}
