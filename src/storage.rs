use std::collections::VecDeque;

/// Default rolling-window depth for trend charts.
pub const SPARK_MAX: usize = 60;

/// Fixed-capacity rolling window of metric samples, oldest first.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    capacity: usize,
    inner: VecDeque<f64>,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Appends `value` and evicts from the front until the window fits again.
    /// Values are stored as given; NaN or out-of-range input is not rejected.
    pub fn push(&mut self, value: f64) {
        self.inner.push_back(value);
        while self.inner.len() > self.capacity {
            self.inner.pop_front();
        }
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.inner.iter().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.inner.back().copied()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(SPARK_MAX)
    }
}
