//! Performance metrics supplied by an external audit tool

use serde::{Deserialize, Serialize};

/// One timing audit, e.g. largest-contentful-paint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingAudit {
    pub display_value: String,
    pub numeric_value: f64,
    /// Tool-specific 0..=1 score, when the tool reports one
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimingAudits {
    pub first_contentful_paint: TimingAudit,
    pub largest_contentful_paint: TimingAudit,
    pub cumulative_layout_shift: TimingAudit,
    pub total_blocking_time: TimingAudit,
    pub speed_index: TimingAudit,
    pub time_to_interactive: TimingAudit,
    pub time_to_first_byte: TimingAudit,
}

/// Category scores (0..=100) plus named timing audits.
///
/// Missing fields deserialize to zero, which is also what a failed audit
/// degrades to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetrics {
    pub performance: u8,
    pub seo: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub audits: TimingAudits,
}

impl PerformanceMetrics {
    /// Clamp every category score into 0..=100.
    pub fn clamped(mut self) -> Self {
        for score in [
            &mut self.performance,
            &mut self.seo,
            &mut self.accessibility,
            &mut self.best_practices,
        ] {
            *score = (*score).min(100);
        }
        self
    }
}
