use std::collections::VecDeque;

/// Mean of the last `window` samples pushed.
///
/// Older samples are evicted as new ones arrive, so the mean tracks recent
/// behavior only.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    samples: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    /// Creates an empty rolling mean over at most `window` samples.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    #[must_use]
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "rolling window must not be empty");
        Self {
            window,
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    /// Number of samples currently inside the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.window {
            self.sum -= self.samples.pop_front().unwrap_or(0.0);
        }
        self.samples.push_back(sample);
        self.sum += sample;
    }

    /// Mean of the samples in the window, or `None` before the first sample.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (!self.samples.is_empty()).then(|| self.sum / self.samples.len() as f64)
    }

    /// Like [`RollingMean::mean`], but `0.0` for an empty window.
    #[must_use]
    pub fn mean_or_zero(&self) -> f64 {
        self.mean().unwrap_or(0.0)
    }
}
