use serde::{Serialize, Deserialize};

/// How per-element losses collapse to a scalar.
///
/// - `Mean` — divide the total by the element count (the default).
/// - `Sum`  — plain total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
}

impl Reduction {
    pub(crate) fn reduce(&self, terms: impl Iterator<Item = f64>) -> f64 {
        let (total, n) = terms.fold((0.0, 0usize), |(s, n), t| (s + t, n + 1));
        match self {
            Reduction::Mean => total / n as f64,
            Reduction::Sum => total,
        }
    }
}
