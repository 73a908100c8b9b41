//! Analysis Context - state carried between analysis runs
//!
//! Holds what the engine learns from earlier batches: the behavioral
//! baseline and the (protocol, port) pairs already seen. One context per
//! tenant or deployment; nothing here is global.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::logic::baseline::BehaviorBaseline;
use crate::logic::config::AnalyzerConfig;
use crate::logic::protocol::ReferenceCombinations;
use crate::logic::traffic::TrafficRecord;

pub struct AnalysisContext {
    tenant: String,
    baseline: BehaviorBaseline,
    known_combinations: RwLock<ReferenceCombinations>,
    runs: AtomicU64,
}

impl AnalysisContext {
    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self::with_baseline(tenant, BehaviorBaseline::default())
    }

    /// Baseline band taken from `config`
    pub fn for_config<S: Into<String>>(tenant: S, config: &AnalyzerConfig) -> Self {
        Self::with_baseline(tenant, BehaviorBaseline::new(config.deviation_band))
    }

    pub fn with_baseline<S: Into<String>>(tenant: S, baseline: BehaviorBaseline) -> Self {
        Self {
            tenant: tenant.into(),
            baseline,
            known_combinations: RwLock::new(ReferenceCombinations::new()),
            runs: AtomicU64::new(0),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn baseline(&self) -> &BehaviorBaseline {
        &self.baseline
    }

    /// Completed runs
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub(crate) fn record_run(&self) -> u64 {
        self.runs.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Pairs seen in earlier batches; None until something was learned
    pub fn reference_combinations(&self) -> Option<ReferenceCombinations> {
        let known = self.known_combinations.read();
        if known.is_empty() {
            None
        } else {
            Some(known.clone())
        }
    }

    pub fn learn_combinations(&self, records: &[TrafficRecord]) -> usize {
        let mut known = self.known_combinations.write();
        let before = known.len();
        known.extend(records.iter().map(|r| (r.protocol.clone(), r.port)));
        let added = known.len() - before;
        if added > 0 {
            log::debug!("[{}] Learned {} new protocol/port pairs ({} known)", self.tenant, added, known.len());
        }
        added
    }
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new("default")
    }
}
