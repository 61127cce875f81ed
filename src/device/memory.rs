use std::time::{Duration, Instant};

use log::debug;

/// The device refuses to start or continue risky work below this floor.
pub const MIN_FREE_BYTES: u64 = 10 * 1024;

const REPORT_INTERVAL: Duration = Duration::from_millis(5000);

/// Seam for the allocator. Readings must be taken fresh on every call so a
/// slow leak shows up mid-download, not only at the next refresh boundary.
pub trait MemoryProbe {
    /// Run a reclamation pass before reading. A no-op on hosts without a
    /// collector.
    fn reclaim(&mut self);
    fn free_bytes(&mut self) -> u64;
    fn allocated_bytes(&mut self) -> u64;
}

/// Circuit breaker consulted before a refresh and once per streamed chunk.
pub struct MemoryGuard<P> {
    probe: P,
    last_report: Option<Instant>,
}

impl<P: MemoryProbe> MemoryGuard<P> {
    pub fn new(probe: P) -> Self {
        Self { probe, last_report: None }
    }

    /// Reclaim, read, and report whether more than the 10 KiB floor is
    /// free. Emits a diagnostic at most once per five seconds.
    pub fn check(&mut self) -> bool {
        self.probe.reclaim();
        let free = self.probe.free_bytes();
        let alloc = self.probe.allocated_bytes();

        let now = Instant::now();
        let due = self
            .last_report
            .map_or(true, |at| now.duration_since(at) > REPORT_INTERVAL);
        if due {
            debug!(
                "memory - free: {}KiB, used: {}KiB, total: {}KiB",
                free / 1024,
                alloc / 1024,
                free.saturating_add(alloc) / 1024
            );
            self.last_report = Some(now);
        }

        free > MIN_FREE_BYTES
    }
}

/// Host probe backed by `/proc/meminfo`; a firmware build swaps in the
/// allocator's own accounting. An unreadable file is treated as
/// unconstrained rather than tripping the guard.
pub struct MeminfoProbe;

impl MemoryProbe for MeminfoProbe {
    fn reclaim(&mut self) {}

    fn free_bytes(&mut self) -> u64 {
        read_meminfo("MemAvailable:").unwrap_or(u64::MAX)
    }

    fn allocated_bytes(&mut self) -> u64 {
        match (read_meminfo("MemTotal:"), read_meminfo("MemAvailable:")) {
            (Some(total), Some(available)) => total.saturating_sub(available),
            _ => 0,
        }
    }
}

fn read_meminfo(key: &str) -> Option<u64> {
    let text = std::fs::read_to_string("/proc/meminfo").ok()?;
    let line = text.lines().find(|line| line.starts_with(key))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::ScriptedProbe;

    #[test]
    fn floor_is_strict() {
        let mut guard = MemoryGuard::new(ScriptedProbe::new(vec![
            MIN_FREE_BYTES + 1,
            MIN_FREE_BYTES,
            MIN_FREE_BYTES - 1,
        ]));
        assert!(guard.check());
        // Exactly 10240 bytes free is not enough.
        assert!(!guard.check());
        assert!(!guard.check());
    }

    #[test]
    fn every_check_reclaims_and_rereads() {
        let mut guard =
            MemoryGuard::new(ScriptedProbe::new(vec![1024 * 1024, 0]));
        assert!(guard.check());
        assert!(!guard.check());
    }
}
