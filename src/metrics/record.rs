use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which sub-mapping a metric lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    Timing,
    Stats,
    Custom,
}

impl Default for MetricCategory {
    fn default() -> Self {
        MetricCategory::Custom
    }
}

/// Metrics for one agent run; the exported JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub agent_id: String,
    pub run_id: String,
    pub prompt_version: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timing: Map<String, Value>,
    #[serde(default)]
    pub stats: Map<String, Value>,
    #[serde(default)]
    pub custom: Map<String, Value>,
}

impl MetricsRecord {
    pub fn new(
        agent_id: String,
        run_id: String,
        prompt_version: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            agent_id,
            run_id,
            prompt_version,
            started_at,
            completed_at: None,
            timing: Map::new(),
            stats: Map::new(),
            custom: Map::new(),
        }
    }

    pub fn category_mut(&mut self, category: MetricCategory) -> &mut Map<String, Value> {
        match category {
            MetricCategory::Timing => &mut self.timing,
            MetricCategory::Stats => &mut self.stats,
            MetricCategory::Custom => &mut self.custom,
        }
    }

    /// Stamp completion and record `total_runtime_seconds`.
    pub fn finish(&mut self, completed_at: DateTime<Utc>) {
        let elapsed = completed_at - self.started_at;
        let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
        self.completed_at = Some(completed_at);
        self.timing
            .insert("total_runtime_seconds".to_string(), Value::from(seconds));
    }
}
