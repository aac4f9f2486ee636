use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

/// Shared render counters, carried explicitly by the renderer instead of
/// living in a global registry. Relaxed ordering is fine, the values are
/// only ever read for reporting.
#[derive(Debug, Default)]
pub struct Stats {
    samples: AtomicU64,
    rays: AtomicU64,
}

impl Stats {
    pub fn add_samples(&self, n: u64) {
        self.samples.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_rays(&self, n: u64) {
        self.rays.fetch_add(n, Ordering::Relaxed);
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn rays(&self) -> u64 {
        self.rays.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.samples.store(0, Ordering::Relaxed);
        self.rays.store(0, Ordering::Relaxed);
    }

    pub fn report(&self) {
        let samples = self.samples();
        let rays = self.rays();
        let per_sample = if samples > 0 {
            rays as f64 / samples as f64
        } else {
            0.0
        };
        info!("session: {samples} samples, {rays} rays ({per_sample:.2} rays/sample)");
    }
}
