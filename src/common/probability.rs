/// Scorer output: one probability per label, in label order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityVector(Vec<f32>);

impl From<Vec<f32>> for ProbabilityVector {
    fn from(xs: Vec<f32>) -> Self {
        Self(xs)
    }
}

impl std::ops::Deref for ProbabilityVector {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProbabilityVector {
    pub fn new(xs: Vec<f32>) -> Self {
        Self(xs)
    }

    /// Index and value of the maximum. Ties go to the lowest index and NaN
    /// entries are skipped. `None` when there is no finite-comparable entry.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in self.0.iter().enumerate() {
            if p.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if p <= b => {}
                _ => best = Some((i, p)),
            }
        }
        best
    }

    /// Highest `k` entries, descending. Equal values keep ascending index order.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut indexed: Vec<(usize, f32)> = self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .collect();
        // stable sort keeps the lower index first for equal values
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k);
        indexed
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Converts raw logits into probabilities. Max-shifted to stay finite.
    pub fn softmax(self) -> Self {
        let max = self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !max.is_finite() {
            return self;
        }
        let exps: Vec<f32> = self.0.iter().map(|x| (x - max).exp()).collect();
        let total: f32 = exps.iter().sum();
        Self(exps.into_iter().map(|e| e / total).collect())
    }
}
