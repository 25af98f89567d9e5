use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock cost of one named stage (edge extraction, scene setup, a
/// refinement chunk, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Ordered stage timings plus their total.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Record the time since `start` under `label` and return it.
    pub fn record_since(&mut self, label: impl Into<String>, start: Instant) -> f64 {
        let ms = elapsed_ms(start);
        self.push(label, ms);
        ms
    }

    /// Append another breakdown's stages, prefixing their labels.
    pub fn extend_prefixed(&mut self, prefix: &str, other: &TimingBreakdown) {
        for stage in &other.stages {
            self.push(format!("{prefix}.{}", stage.label), stage.elapsed_ms);
        }
    }

    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

#[inline]
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_stages_keep_order() {
        let mut inner = TimingBreakdown::default();
        inner.push("normals", 1.5);
        inner.push("occlusion_edges", 0.5);
        let mut outer = TimingBreakdown::with_total(3.0);
        outer.push("load", 1.0);
        outer.extend_prefixed("edges", &inner);
        let labels: Vec<_> = outer.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["load", "edges.normals", "edges.occlusion_edges"]);
        assert_eq!(outer.stage_ms("edges.normals"), Some(1.5));
        assert_eq!(outer.stage_ms("missing"), None);
    }
}
