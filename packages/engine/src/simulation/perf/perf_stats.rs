use serde::Serialize;

/// Timing of the most recent macro-step (zeros when perf metrics are off).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PerfStats {
    pub(super) batch_ms: f64,
    pub(super) mlups: f64,
    pub(super) batches: u64,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }

    /// Records one macro-step of `iterations` sweeps over `cells` cells.
    pub(crate) fn record(&mut self, elapsed_ms: f64, iterations: u32, cells: usize) {
        self.batch_ms = elapsed_ms;
        self.mlups = if elapsed_ms > 0.0 {
            (iterations as f64 * cells as f64) / (elapsed_ms * 1000.0)
        } else {
            0.0
        };
        self.batches += 1;
    }

    pub fn batch_ms(&self) -> f64 { self.batch_ms }

    /// Million lattice-cell updates per second.
    pub fn mlups(&self) -> f64 { self.mlups }

    pub fn batches(&self) -> u64 { self.batches }
}
