//! Best-effort extraction of run statistics from an agent framework result.
//!
//! The result is opaque to the hub; it arrives as the framework's JSON form.
//! Each field is read independently and anything missing is skipped.

use super::record::{MetricCategory, MetricsRecord};
use serde_json::{json, Map, Value};

pub(crate) fn apply(record: &mut MetricsRecord, result: &Value) {
    let Some(metrics) = result.get("metrics") else {
        return;
    };

    if let Some(usage) = metrics.get("accumulated_usage") {
        let stats = record.category_mut(MetricCategory::Stats);
        stats.insert("input_tokens".into(), number_or_zero(usage, "inputTokens"));
        stats.insert("output_tokens".into(), number_or_zero(usage, "outputTokens"));
        stats.insert("total_tokens".into(), number_or_zero(usage, "totalTokens"));
    }

    if let Some(accumulated) = metrics.get("accumulated_metrics") {
        record
            .category_mut(MetricCategory::Timing)
            .insert("latency_ms".into(), number_or_zero(accumulated, "latencyMs"));
    }

    if let Some(cycles) = metrics.get("cycle_durations").and_then(Value::as_array) {
        let total: f64 = cycles.iter().filter_map(Value::as_f64).sum();
        record
            .category_mut(MetricCategory::Timing)
            .insert("total_duration".into(), Value::from(total));
        record
            .category_mut(MetricCategory::Stats)
            .insert("total_cycles".into(), Value::from(cycles.len()));
    }

    if let Some(tools) = metrics.get("tool_metrics").and_then(Value::as_object) {
        let mut summary = Map::new();
        for (tool_name, tool_data) in tools {
            summary.insert(
                tool_name.clone(),
                json!({
                    "call_count": number_or_zero(tool_data, "call_count"),
                    "success_count": number_or_zero(tool_data, "success_count"),
                    "error_count": number_or_zero(tool_data, "error_count"),
                }),
            );
        }
        record
            .category_mut(MetricCategory::Stats)
            .insert("tool_usage".into(), Value::Object(summary));
    }
}

fn number_or_zero(value: &Value, field: &str) -> Value {
    match value.get(field) {
        Some(v) if v.is_number() => v.clone(),
        _ => Value::from(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> MetricsRecord {
        MetricsRecord::new("agent".into(), "run".into(), None, Utc::now())
    }

    #[test]
    fn test_full_result() {
        let mut rec = record();
        let result = json!({
            "metrics": {
                "accumulated_usage": {"inputTokens": 120, "outputTokens": 30, "totalTokens": 150},
                "accumulated_metrics": {"latencyMs": 812},
                "cycle_durations": [1.5, 2.0],
                "tool_metrics": {
                    "get_weather": {"call_count": 2, "success_count": 1, "error_count": 1}
                }
            }
        });
        apply(&mut rec, &result);

        assert_eq!(rec.stats["input_tokens"], json!(120));
        assert_eq!(rec.stats["total_tokens"], json!(150));
        assert_eq!(rec.timing["latency_ms"], json!(812));
        assert_eq!(rec.timing["total_duration"], json!(3.5));
        assert_eq!(rec.stats["total_cycles"], json!(2));
        assert_eq!(
            rec.stats["tool_usage"]["get_weather"],
            json!({"call_count": 2, "success_count": 1, "error_count": 1})
        );
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut rec = record();
        apply(&mut rec, &json!({"text": "done"}));
        assert!(rec.stats.is_empty());
        assert!(rec.timing.is_empty());

        apply(&mut rec, &json!({"metrics": {"accumulated_usage": {}}}));
        assert_eq!(rec.stats["input_tokens"], json!(0));
        assert!(!rec.timing.contains_key("latency_ms"));
    }

    #[test]
    fn test_tool_entry_without_counts() {
        let mut rec = record();
        apply(
            &mut rec,
            &json!({"metrics": {"tool_metrics": {"search": "not-an-object"}}}),
        );
        assert_eq!(
            rec.stats["tool_usage"]["search"],
            json!({"call_count": 0, "success_count": 0, "error_count": 0})
        );
    }
}
