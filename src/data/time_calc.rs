use std::time::Duration;

/// Cumulative per-stage timings across diagnosis runs.
///
/// Stage `i` is whatever the caller decides; the service uses
/// 0 = preprocess, 1 = scoring, 2 = postprocess.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeCalc {
    runs: usize,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn avg(&self) -> Duration {
        match self.runs {
            0 => Duration::ZERO,
            n => self.total() / n as u32,
        }
    }

    pub fn avg_i(&self, i: usize) -> Duration {
        match (self.duration.get(i), self.runs) {
            (Some(d), n) if n > 0 => *d / n as u32,
            _ => Duration::ZERO,
        }
    }

    pub fn ts(&self) -> &[Duration] {
        &self.duration
    }

    /// Records one complete run, one duration per stage.
    pub fn record(&mut self, stages: &[Duration]) {
        for (i, d) in stages.iter().enumerate() {
            match self.duration.get_mut(i) {
                Some(elem) => *elem += *d,
                None => self.duration.push(*d),
            }
        }
        self.runs += 1;
    }

    pub fn clear(&mut self) {
        self.runs = Default::default();
        self.duration = Default::default();
    }
}
