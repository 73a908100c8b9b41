//! Threat Feature Extraction
//!
//! `ThreatFeatureExtractor` turns one event into a numeric row; the
//! default extractor follows `layout::THREAT_FEATURE_LAYOUT`.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::layout::{feature_index, layout_hash, LayoutInfo, THREAT_FEATURE_COUNT, THREAT_FEATURE_LAYOUT, THREAT_FEATURE_VERSION};
use super::types::ThreatEvent;
use crate::logic::error::{AnalysisError, Result};
use crate::logic::stats::{item_entropy, mean, std_dev, EPSILON};

/// Ports below this are privileged
const PRIVILEGED_PORT_LIMIT: u16 = 1024;

pub trait ThreatFeatureExtractor: Send + Sync {
    /// Column names, in row order
    fn feature_names(&self) -> Vec<String>;

    fn extract(&self, event: &ThreatEvent) -> Vec<f64>;

    /// Unversioned unless the extractor overrides it
    fn layout(&self) -> LayoutInfo {
        LayoutInfo::from_names(0, self.feature_names())
    }
}

// ============================================================================
// DEFAULT LAYOUT
// ============================================================================

/// Fixed-length vector tagged with the layout it was built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatFeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    pub values: [f64; THREAT_FEATURE_COUNT],
}

impl ThreatFeatureVector {
    pub fn from_event(event: &ThreatEvent) -> Self {
        let payloads: Vec<f64> = event.payload_sizes.iter().map(|&p| p as f64).collect();
        let distinct_sources = distinct(&event.source_ips);
        let distinct_ports = distinct(&event.destination_ports);
        let privileged = if event.destination_ports.is_empty() {
            0.0
        } else {
            event.destination_ports.iter().filter(|&&p| p < PRIVILEGED_PORT_LIMIT).count() as f64
                / event.destination_ports.len() as f64
        };

        Self {
            version: THREAT_FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [
                item_entropy(&event.source_ips),
                (distinct_sources as f64).ln_1p(),
                item_entropy(&event.destination_ports),
                (distinct_ports as f64).ln_1p(),
                mean(&payloads).ln_1p(),
                std_dev(&payloads).ln_1p(),
                mean(&event.inter_arrival_ms).max(0.0).ln_1p(),
                privileged,
            ],
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == THREAT_FEATURE_VERSION && self.layout_hash == layout_hash()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }
}

fn distinct<T: Ord>(items: &[T]) -> usize {
    items.iter().collect::<std::collections::BTreeSet<_>>().len()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultThreatFeatures;

impl ThreatFeatureExtractor for DefaultThreatFeatures {
    fn feature_names(&self) -> Vec<String> {
        THREAT_FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
    }

    fn extract(&self, event: &ThreatEvent) -> Vec<f64> {
        ThreatFeatureVector::from_event(event).values.to_vec()
    }

    fn layout(&self) -> LayoutInfo {
        LayoutInfo::current()
    }
}

// ============================================================================
// MATRIX
// ============================================================================

/// One row per event, extracted in parallel
pub fn feature_matrix(extractor: &dyn ThreatFeatureExtractor, events: &[ThreatEvent]) -> Result<Array2<f64>> {
    let width = extractor.feature_names().len();
    let rows: Vec<Vec<f64>> = events.par_iter().map(|e| extractor.extract(e)).collect();

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(AnalysisError::InvalidConfig(format!(
            "extractor produced {} values for event #{}, layout has {}",
            row.len(),
            i,
            width
        )));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((events.len(), width), flat)
        .map_err(|e| AnalysisError::InvalidConfig(format!("feature matrix shape: {}", e)))
}

/// Zero mean, unit (population) variance per column; constant columns become 0
pub fn standardize(matrix: &Array2<f64>) -> Array2<f64> {
    let mut out = matrix.clone();
    for mut column in out.columns_mut() {
        let values: Vec<f64> = column.iter().copied().collect();
        let m = mean(&values);
        let s = std_dev(&values);
        if s <= EPSILON {
            column.fill(0.0);
        } else {
            column.mapv_inplace(|v| (v - m) / s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::{threat_events, ts, BASE_TS};

    fn event(ports: Vec<u16>, sources: Vec<&str>) -> ThreatEvent {
        ThreatEvent {
            event_id: "e".into(),
            timestamp: ts(BASE_TS),
            category: "recon".into(),
            source_ips: sources.into_iter().map(String::from).collect(),
            destination_ips: vec![],
            destination_ports: ports,
            payload_sizes: vec![100, 300],
            inter_arrival_ms: vec![],
        }
    }

    #[test]
    fn test_default_vector_values() {
        let v = ThreatFeatureVector::from_event(&event(vec![22, 22, 8080, 8443], vec!["10.0.0.1"]));
        assert!(v.is_current());
        assert_eq!(v.get("source_ip_entropy"), Some(0.0));
        assert!((v.get("source_count_log").unwrap() - 2f64.ln()).abs() < 1e-12);
        assert!((v.get("port_count_log").unwrap() - 4f64.ln()).abs() < 1e-12);
        assert!((v.get("payload_mean_log").unwrap() - 201f64.ln()).abs() < 1e-12);
        assert!((v.get("payload_std_log").unwrap() - 101f64.ln()).abs() < 1e-12);
        assert_eq!(v.get("inter_arrival_log"), Some(0.0));
        assert_eq!(v.get("privileged_port_ratio"), Some(0.5));
    }

    #[test]
    fn test_matrix_shape_and_standardization() {
        let events = threat_events();
        let matrix = feature_matrix(&DefaultThreatFeatures, &events).unwrap();
        assert_eq!(matrix.dim(), (100, THREAT_FEATURE_COUNT));

        let z = standardize(&matrix);
        for column in z.columns() {
            let values: Vec<f64> = column.iter().copied().collect();
            assert!(mean(&values).abs() < 1e-9);
            let s = std_dev(&values);
            assert!(s.abs() < 1e-9 || (s - 1.0).abs() < 1e-9);
        }
    }

    struct Short;

    impl ThreatFeatureExtractor for Short {
        fn feature_names(&self) -> Vec<String> {
            vec!["a".into(), "b".into()]
        }

        fn extract(&self, _event: &ThreatEvent) -> Vec<f64> {
            vec![1.0]
        }
    }

    #[test]
    fn test_inconsistent_extractor_is_rejected() {
        let result = feature_matrix(&Short, &threat_events());
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }
}
