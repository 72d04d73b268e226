//! Periodic image cycling for the record view.
//!
//! The cycler only holds an index. It is handed the current record's image
//! list when rendering and knows nothing about searches.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ImageCycler {
    period: Duration,
    enabled: bool,
    index: usize,
    last_step: Option<Instant>,
}

impl ImageCycler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            enabled: false,
            index: 0,
            last_step: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        self.last_step = None;
    }

    /// Back to the first image, e.g. when a new record arrives.
    pub fn reset(&mut self) {
        self.index = 0;
        self.last_step = None;
    }

    /// Advance once for every full period elapsed since the last step.
    pub fn tick(&mut self, now: Instant) {
        if !self.enabled || self.period.is_zero() {
            return;
        }
        let Some(last) = self.last_step else {
            self.last_step = Some(now);
            return;
        };
        let elapsed = now.saturating_duration_since(last);
        let steps = (elapsed.as_millis() / self.period.as_millis().max(1)) as u32;
        if steps > 0 {
            self.index = self.index.wrapping_add(steps as usize);
            self.last_step = Some(last + self.period * steps);
        }
    }

    pub fn current<'a>(&self, urls: &'a [String]) -> Option<&'a str> {
        if urls.is_empty() {
            return None;
        }
        urls.get(self.index % urls.len()).map(String::as_str)
    }
}
