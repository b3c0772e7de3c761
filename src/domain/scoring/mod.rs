//! Scorers over per-symbol analyses.
//!
//! Each scorer is an independent filter/ranking. Symbols are evaluated in
//! parallel and the merged collection is sorted exactly once with the
//! scorer's ordering, so reruns on unchanged input are identical.

pub mod analysis;
pub mod base_pattern;
pub mod bullish;
pub mod momentum;
pub mod tight_base;
pub mod wedge;

pub use analysis::{analyze_universe, SymbolAnalysis};
pub use base_pattern::{BasePatternMetrics, BasePatternParams, BasePatternScorer};
pub use bullish::{BullishMetrics, BullishScorer};
pub use momentum::{MomentumMetrics, MomentumScorer};
pub use tight_base::{TightBaseMetrics, TightBaseParams, TightBaseScorer};
pub use wedge::{WedgeParams, WedgeScorer};

use crate::domain::reference::SymbolProfile;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::info;

/// One output row of a scorer run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<M> {
    pub profile: SymbolProfile,
    pub metrics: M,
    pub score: f64,
}

impl<M> ScoredCandidate<M> {
    pub fn symbol(&self) -> &str {
        &self.profile.symbol
    }
}

pub trait Scorer: Sync {
    type Metrics: Send;

    fn name(&self) -> &'static str;

    /// Metrics and score for one symbol, or `None` when it is not admitted.
    fn evaluate(&self, analysis: &SymbolAnalysis) -> Option<(Self::Metrics, f64)>;

    /// Ordering of the merged output. Defaults to symbol.
    fn order(
        &self,
        a: &ScoredCandidate<Self::Metrics>,
        b: &ScoredCandidate<Self::Metrics>,
    ) -> Ordering {
        a.symbol().cmp(b.symbol())
    }
}

/// Evaluates every analysis, joins reference data and sorts the result.
pub fn run<S: Scorer>(
    scorer: &S,
    analyses: &[SymbolAnalysis],
    profiles: &HashMap<String, SymbolProfile>,
) -> Vec<ScoredCandidate<S::Metrics>> {
    let mut candidates: Vec<ScoredCandidate<S::Metrics>> = analyses
        .par_iter()
        .filter_map(|analysis| {
            let (metrics, score) = scorer.evaluate(analysis)?;
            let profile = profiles
                .get(analysis.symbol())
                .cloned()
                .unwrap_or_else(|| SymbolProfile::bare(analysis.symbol()));
            Some(ScoredCandidate {
                profile,
                metrics,
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| scorer.order(a, b));
    info!(
        scorer = scorer.name(),
        evaluated = analyses.len(),
        admitted = candidates.len(),
        "scored candidates"
    );
    candidates
}

/// Ascending text order with missing values last.
pub(crate) fn text_nulls_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending numeric order with missing values last.
pub(crate) fn asc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending numeric order with missing values last.
pub(crate) fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => asc_nulls_last(a, b),
    }
}
