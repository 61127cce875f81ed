use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::device::memory::{MemoryGuard, MemoryProbe};
use crate::device::screen::{show_status, Screen, STATUS_Y};
use crate::device::transport::Transport;
use crate::device::{display, download, SCREEN_HEIGHT};

/// Wall-clock threshold for the periodic trigger.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const POLL_PAUSE: Duration = Duration::from_millis(100);
const CONNECT_SETTLE: Duration = Duration::from_millis(1000);
const REVEAL_DELAY: Duration = Duration::from_millis(1000);
const LOW_MEMORY_PAUSE: Duration = Duration::from_millis(1000);
const ERROR_PAUSE: Duration = Duration::from_millis(3000);
const READY_Y: i32 = SCREEN_HEIGHT as i32 - 20;

/// What asked for a refresh. Each trigger yields at most one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    ButtonPress,
    TimerElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Connecting,
    Downloading,
    Displaying,
}

/// Typed outcome of one refresh cycle. Nothing here escalates; the loop
/// re-enters `Idle` after every attempt, whatever happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    /// Trigger arrived while a refresh was already in flight.
    Skipped,
    LowMemory,
    ConnectFailed,
    DownloadFailed,
    DisplayFailed,
    /// A collaborator panicked mid-cycle; the loop showed "Error!" and
    /// carried on.
    Crashed,
}

/// Seam for the WiFi stack: a single join attempt, no internal retries.
/// The next scheduled trigger retries connecting.
pub trait Connectivity {
    fn connect(&mut self) -> crate::Result<()>;
    fn is_connected(&self) -> bool;
}

/// Seam for the hardware button; reports a pressed edge since the last poll.
pub trait Button {
    fn was_pressed(&mut self) -> bool;
}

/// Drives the whole device side: connect, download to staging, promote,
/// paint, forever. At most one refresh runs at a time.
pub struct RefreshScheduler<T, S, C, P> {
    transport: T,
    screen: S,
    wifi: C,
    guard: MemoryGuard<P>,
    url: String,
    staging: PathBuf,
    current: PathBuf,
    state: RefreshState,
}

impl<T, S, C, P> RefreshScheduler<T, S, C, P>
where
    T: Transport,
    S: Screen,
    C: Connectivity,
    P: MemoryProbe,
{
    pub fn new(
        transport: T,
        screen: S,
        wifi: C,
        guard: MemoryGuard<P>,
        url: impl Into<String>,
        staging: impl Into<PathBuf>,
        current: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            screen,
            wifi,
            guard,
            url: url.into(),
            staging: staging.into(),
            current: current.into(),
            state: RefreshState::Idle,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    #[cfg(test)]
    fn force_state(&mut self, state: RefreshState) {
        self.state = state;
    }

    /// Run one refresh cycle for `trigger`. Triggers arriving while a cycle
    /// is in flight are dropped, collapsing concurrent requests into the
    /// one already running.
    pub fn refresh(&mut self, trigger: RefreshTrigger) -> CycleOutcome {
        if self.state != RefreshState::Idle {
            debug!("dropping {trigger:?} while {:?}", self.state);
            return CycleOutcome::Skipped;
        }
        debug!("refresh cycle: {trigger:?}");
        let outcome = self.cycle();
        self.state = RefreshState::Idle;
        debug!("refresh cycle done: {outcome:?}");
        outcome
    }

    /// `refresh` behind the loop's outermost safety net. A panicking
    /// collaborator (a bus fault in a panel driver, say) degrades to a
    /// generic "Error!" status and a reset to `Idle` instead of killing
    /// the loop; the device must never halt over one bad cycle.
    pub fn refresh_guarded(&mut self, trigger: RefreshTrigger) -> CycleOutcome {
        let attempt = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
            || self.refresh(trigger),
        ));
        match attempt {
            Ok(outcome) => outcome,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("refresh cycle panicked: {msg}");
                self.state = RefreshState::Idle;
                show_status(&mut self.screen, "Error!", STATUS_Y);
                thread::sleep(ERROR_PAUSE);
                CycleOutcome::Crashed
            }
        }
    }

    fn cycle(&mut self) -> CycleOutcome {
        if !self.guard.check() {
            show_status(&mut self.screen, "Low memory!", STATUS_Y);
            thread::sleep(LOW_MEMORY_PAUSE);
            return CycleOutcome::LowMemory;
        }

        self.state = RefreshState::Connecting;
        if !self.wifi.is_connected() {
            show_status(&mut self.screen, "Connecting...", STATUS_Y);
            match self.wifi.connect() {
                Ok(()) => {
                    show_status(&mut self.screen, "Connected!", STATUS_Y);
                    // Let the link settle before the first request.
                    thread::sleep(CONNECT_SETTLE);
                }
                Err(e) => {
                    warn!("wifi join failed: {e}");
                    show_status(&mut self.screen, "WiFi Failed!", STATUS_Y);
                    return CycleOutcome::ConnectFailed;
                }
            }
        }

        self.state = RefreshState::Downloading;
        if let Err(e) = download::download(
            &mut self.transport,
            &mut self.guard,
            &mut self.screen,
            &self.url,
            &self.staging,
        ) {
            warn!("download failed: {e}");
            show_status(&mut self.screen, "Download Failed!", STATUS_Y);
            return CycleOutcome::DownloadFailed;
        }
        if let Err(e) = display::promote(&self.staging, &self.current) {
            warn!("promotion failed: {e}");
            show_status(&mut self.screen, "Download Failed!", STATUS_Y);
            return CycleOutcome::DownloadFailed;
        }

        self.state = RefreshState::Displaying;
        if let Err(e) = display::show(&mut self.screen, &self.current) {
            warn!("display failed: {e}");
            show_status(&mut self.screen, "Display Error!", STATUS_Y);
            return CycleOutcome::DisplayFailed;
        }

        show_status(&mut self.screen, "Ready!", READY_Y);
        thread::sleep(REVEAL_DELAY);
        // Second paint clears the status overlay; the panel has no
        // transient layer to draw it on instead.
        if let Err(e) = display::show(&mut self.screen, &self.current) {
            warn!("display failed: {e}");
            show_status(&mut self.screen, "Display Error!", STATUS_Y);
            return CycleOutcome::DisplayFailed;
        }
        CycleOutcome::Completed
    }

    /// Cooperative device loop: an initial refresh, then button edges and
    /// the 60-second timer, polled with short bounded pauses. Every outcome
    /// is typed and logged; the loop itself never ends.
    pub fn run<B: Button>(&mut self, button: &mut B) -> ! {
        info!("entering refresh loop");
        let outcome = self.refresh_guarded(RefreshTrigger::Initial);
        info!("initial refresh: {outcome:?}");
        let mut last = Instant::now();
        loop {
            if button.was_pressed() {
                let outcome = self.refresh_guarded(RefreshTrigger::ButtonPress);
                info!("manual refresh: {outcome:?}");
                if completes_attempt(outcome) {
                    last = Instant::now();
                }
            }

            if last.elapsed() >= REFRESH_INTERVAL {
                let outcome = self.refresh_guarded(RefreshTrigger::TimerElapsed);
                info!("timed refresh: {outcome:?}");
                if completes_attempt(outcome) {
                    last = Instant::now();
                }
            }

            thread::sleep(POLL_PAUSE);
        }
    }
}

/// Whether an outcome counts as a spent refresh attempt for timer pacing.
/// Low-memory and crashed cycles leave the timer armed; their own pauses
/// pace the retries.
fn completes_attempt(outcome: CycleOutcome) -> bool {
    !matches!(outcome, CycleOutcome::LowMemory | CycleOutcome::Crashed)
}
