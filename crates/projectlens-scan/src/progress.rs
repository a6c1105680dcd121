//! Scan progress reporting.

use std::time::{Duration, Instant};

use compact_str::CompactString;

/// How many files are recorded between two progress snapshots.
pub const PROGRESS_INTERVAL: u64 = 500;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files recorded so far.
    pub files_scanned: u64,
    /// Number of directories recorded so far.
    pub dirs_scanned: u64,
    /// Total bytes of the recorded files.
    pub bytes_scanned: u64,
    /// Relative path of the entry being processed.
    pub current_path: CompactString,
    /// Number of warnings encountered.
    pub warnings_count: u64,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            current_path: CompactString::default(),
            warnings_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total items recorded (files + dirs).
    pub fn total_items(&self) -> u64 {
        self.files_scanned + self.dirs_scanned
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters for one scan.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_scanned: u64,
    dirs_scanned: u64,
    bytes_scanned: u64,
    warnings_count: u64,
    current_path: CompactString,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            warnings_count: 0,
            current_path: CompactString::default(),
        }
    }

    /// Record a file and report whether a snapshot is due.
    pub fn record_file(&mut self, path: &str, size: u64) -> bool {
        self.files_scanned += 1;
        self.bytes_scanned += size;
        self.current_path = CompactString::new(path);
        self.files_scanned % PROGRESS_INTERVAL == 0
    }

    pub fn record_dir(&mut self, path: &str) {
        self.dirs_scanned += 1;
        self.current_path = CompactString::new(path);
    }

    pub fn record_warning(&mut self) {
        self.warnings_count += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_scanned: self.files_scanned,
            dirs_scanned: self.dirs_scanned,
            bytes_scanned: self.bytes_scanned,
            current_path: self.current_path.clone(),
            warnings_count: self.warnings_count,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_due_every_interval() {
        let mut tracker = ProgressTracker::new();
        let due: Vec<u64> = (1..=PROGRESS_INTERVAL * 2)
            .filter(|i| tracker.record_file(&format!("f{i}"), 1))
            .collect();
        assert_eq!(due, vec![PROGRESS_INTERVAL, PROGRESS_INTERVAL * 2]);

        tracker.record_dir("src");
        tracker.record_warning();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.files_scanned, PROGRESS_INTERVAL * 2);
        assert_eq!(snapshot.bytes_scanned, PROGRESS_INTERVAL * 2);
        assert_eq!(snapshot.total_items(), PROGRESS_INTERVAL * 2 + 1);
        assert_eq!(snapshot.warnings_count, 1);
        assert_eq!(snapshot.current_path, "src");
    }

    #[test]
    fn test_files_per_second() {
        let mut progress = ScanProgress::new();
        assert_eq!(progress.files_per_second(), 0.0);

        progress.files_scanned = 1000;
        progress.elapsed = Duration::from_millis(500);
        assert_eq!(progress.files_per_second(), 2000.0);
    }
}
