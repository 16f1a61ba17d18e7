//! Configuration options for copy operations.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pipecopy::CopyOptions;
//!
//! let options = CopyOptions::default()
//!     .with_progress_update_period(Duration::from_millis(500));
//! ```

use std::time::Duration;

/// Default period between progress snapshots.
pub(crate) const DEFAULT_PROGRESS_UPDATE_PERIOD: Duration = Duration::from_millis(5000);

/// Options for copy operations.
///
/// Use [`Default::default()`] to get the standard defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `progress_update_period` | 5000 ms | Snapshot emission cadence |
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// How often a progress snapshot is pushed to the progress callback
    /// during an active transfer (default: 5000 ms).
    ///
    /// Snapshots are emitted on chunk boundaries, so the effective cadence
    /// is "at most once per period". A zero period emits on every chunk.
    pub progress_update_period: Duration,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            progress_update_period: DEFAULT_PROGRESS_UPDATE_PERIOD,
        }
    }
}

impl CopyOptions {
    /// Set the progress snapshot emission period.
    #[must_use]
    pub fn with_progress_update_period(mut self, period: Duration) -> Self {
        self.progress_update_period = period;
        self
    }
}
