//! Per-call progress accounting

/// Progress callback, invoked with a percentage in `0.0..=100.0`.
pub type ProgressFn = Box<dyn Fn(f64) + Send + Sync>;

/// Tracks completed units (bytes written, or chunks verified) for one call.
///
/// Each encrypt/decrypt call owns its tracker, so concurrent calls never share
/// counters.
pub struct ProgressTracker<'a> {
    callback: Option<&'a ProgressFn>,
    done: u64,
    total: u64,
    finished: bool,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(callback: Option<&'a ProgressFn>, total: u64) -> Self {
        Self {
            callback,
            done: 0,
            total,
            finished: false,
        }
    }

    pub fn start(&self) {
        self.report(0.0);
    }

    /// Record `units` more completed work and report the new percentage.
    ///
    /// Reaching the total reports nothing; `100.0` is left to [`finish`],
    /// which callers invoke only once the output is finalized.
    ///
    /// [`finish`]: ProgressTracker::finish
    pub fn advance(&mut self, units: u64) {
        self.done += units;
        if self.done < self.total {
            self.report(100.0 * self.done as f64 / self.total as f64);
        }
    }

    /// Report exactly `100.0`, once.
    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.report(100.0);
        }
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    fn report(&self, percent: f64) {
        if let Some(cb) = self.callback {
            cb(percent);
        }
    }
}
