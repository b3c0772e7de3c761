//! Trailing-window statistics over a fixed-size ring buffer.
//!
//! A window of length N at index i covers the values at i-N+1..=i that
//! exist. Short histories are averaged over what is there: three closes in a
//! 20-bar window are divided by three, never by twenty. Missing values
//! (`None`) occupy a slot but are excluded from every statistic.
//!
//! The mean is recomputed from the slots on every read, offset from the
//! oldest present value and clamped to the window's range, so a flat window
//! averages to exactly its value.

use super::Statistic;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    slots: Vec<Option<f64>>,
    next: usize,
    filled: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            next: 0,
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Pushes a value, evicting the oldest slot once the window is full.
    pub fn push(&mut self, value: Option<f64>) {
        if self.filled < self.slots.len() {
            self.filled += 1;
        }
        self.slots[self.next] = value;
        self.next = (self.next + 1) % self.slots.len();
    }

    fn present(&self) -> impl Iterator<Item = f64> + '_ {
        let start = if self.filled == self.slots.len() {
            self.next
        } else {
            0
        };
        (0..self.filled).filter_map(move |i| self.slots[(start + i) % self.slots.len()])
    }

    pub fn count(&self) -> usize {
        self.present().count()
    }

    pub fn mean(&self) -> Option<f64> {
        let pivot = self.present().next()?;
        let (n, offset) = self
            .present()
            .fold((0usize, 0.0), |(n, acc), v| (n + 1, acc + (v - pivot)));
        let mean = pivot + offset / n as f64;
        Some(mean.max(self.min()?).min(self.max()?))
    }

    pub fn min(&self) -> Option<f64> {
        self.present().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.present().reduce(f64::max)
    }

    pub fn value(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Mean | Statistic::MeanAbsMove => self.mean(),
            Statistic::Min => self.min(),
            Statistic::Max => self.max(),
        }
    }
}

/// Day-over-day absolute change; undefined for the first value.
pub fn daily_moves(values: &[f64]) -> Vec<Option<f64>> {
    let mut moves = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            moves.push(None);
        } else {
            moves.push(Some((values[i] - values[i - 1]).abs()));
        }
    }
    moves
}

/// Rolls `stat` over `values`, one output per input.
pub fn rolling(values: &[f64], window: usize, stat: Statistic) -> Vec<Option<f64>> {
    let inputs: Vec<Option<f64>> = match stat {
        Statistic::MeanAbsMove => daily_moves(values),
        _ => values.iter().copied().map(Some).collect(),
    };

    let mut ring = RollingWindow::new(window);
    let mut out = Vec::with_capacity(inputs.len());
    for value in inputs {
        ring.push(value);
        out.push(ring.value(stat));
    }
    out
}
