use std::collections::VecDeque;

use crate::model::chart_point::ChartPoint;
use crate::model::trade::Trade;

pub const DEFAULT_CHART_CAPACITY: usize = 100;

/// Fixed-capacity, oldest-first window of chart points.
///
/// Order is ingestion order. Points are never re-sorted by creation time, so a
/// live trade that arrives late is still placed at the end.
#[derive(Debug, Clone)]
pub struct SlidingWindowBuffer {
    points: VecDeque<ChartPoint>,
    capacity: usize,
}

impl SlidingWindowBuffer {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHART_CAPACITY)
    }

    /// Replaces the whole window from a history snapshot and returns the new
    /// full point set.
    pub fn resync(&mut self, mut history: Vec<Trade>, newest_first: bool) -> Vec<ChartPoint> {
        self.points.clear();
        if newest_first {
            history.reverse();
        }
        let skip = history.len().saturating_sub(self.capacity);
        self.points
            .extend(history.into_iter().skip(skip).map(ChartPoint::from_trade));
        self.snapshot()
    }

    /// Appends `events` in the given order, drops from the front down to
    /// capacity and returns the appended points that are still in the window.
    pub fn append(&mut self, events: Vec<Trade>) -> Vec<ChartPoint> {
        let appended = events.len();
        self.points
            .extend(events.into_iter().map(ChartPoint::from_trade));
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        let survivors = appended.min(self.points.len());
        self.points
            .iter()
            .skip(self.points.len() - survivors)
            .cloned()
            .collect()
    }

    pub fn points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    pub fn snapshot(&self) -> Vec<ChartPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SlidingWindowBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
