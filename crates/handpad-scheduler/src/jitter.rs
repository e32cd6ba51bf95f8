//! Tick jitter tracking.

/// Jitter statistics over the ticks recorded so far.
///
/// Recent samples live in a bounded ring buffer, so recording never
/// allocates once the buffer is full.
#[derive(Debug, Clone)]
pub struct JitterMetrics {
    pub total_ticks: u64,
    /// Ticks that woke after their deadline.
    pub missed_ticks: u64,
    pub max_jitter_ns: u64,
    pub last_jitter_ns: u64,
    jitter_sum_ns: u128,
    samples: Vec<u64>,
    max_samples: usize,
    next_sample: usize,
    scratch: Vec<u64>,
}

const DEFAULT_MAX_SAMPLES: usize = 1_000;

impl Default for JitterMetrics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SAMPLES)
    }
}

impl JitterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            total_ticks: 0,
            missed_ticks: 0,
            max_jitter_ns: 0,
            last_jitter_ns: 0,
            jitter_sum_ns: 0,
            samples: Vec::with_capacity(max_samples),
            max_samples,
            next_sample: 0,
            scratch: Vec::with_capacity(max_samples),
        }
    }

    pub fn record_tick(&mut self, jitter_ns: u64, missed_deadline: bool) {
        self.total_ticks = self.total_ticks.saturating_add(1);
        if missed_deadline {
            self.missed_ticks = self.missed_ticks.saturating_add(1);
        }
        self.max_jitter_ns = self.max_jitter_ns.max(jitter_ns);
        self.last_jitter_ns = jitter_ns;
        self.jitter_sum_ns = self.jitter_sum_ns.saturating_add(u128::from(jitter_ns));

        if self.max_samples == 0 {
            return;
        }
        if self.samples.len() < self.max_samples {
            self.samples.push(jitter_ns);
        } else if let Some(slot) = self.samples.get_mut(self.next_sample) {
            *slot = jitter_ns;
            self.next_sample = (self.next_sample + 1) % self.max_samples;
        }
    }

    /// Jitter at `percentile` (0-1) over the retained samples, 0 when empty.
    pub fn percentile_jitter_ns(&mut self, percentile: f64) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.samples);

        let len = self.scratch.len();
        let index = ((len as f64 * percentile.clamp(0.0, 1.0)) as usize).min(len.saturating_sub(1));
        let (_, value, _) = self.scratch.select_nth_unstable(index);
        *value
    }

    pub fn p99_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.99)
    }

    pub fn average_jitter_ns(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.jitter_sum_ns as f64 / self.total_ticks as f64
    }

    pub fn missed_tick_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.missed_ticks as f64 / self.total_ticks as f64
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn reset(&mut self) {
        *self = Self::with_capacity(self.max_samples);
    }
}
