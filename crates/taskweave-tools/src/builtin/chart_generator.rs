use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Tool;
use taskweave_core::types::JsonMap;

/// Shape parallel label/value lists into a chart-ready series.
pub struct ChartGeneratorTool;

#[derive(Deserialize)]
struct ChartGeneratorInput {
    #[serde(default = "default_chart_type")]
    chart_type: String,
    #[serde(default)]
    labels: Vec<serde_json::Value>,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

fn default_chart_type() -> String {
    "bar".into()
}

impl Tool for ChartGeneratorTool {
    fn name(&self) -> &str {
        "chart_generator"
    }

    fn description(&self) -> &str {
        "Zip labels and values into a chart-ready series structure."
    }

    fn execute(&self, params: JsonMap) -> BoxFuture<'_, Result<JsonMap>> {
        Box::pin(async move {
            let p: ChartGeneratorInput = serde_json::from_value(serde_json::Value::Object(params))
                .map_err(|e| TaskweaveError::ToolValidation(e.to_string()))?;

            if p.labels.len() != p.values.len() {
                return Err(TaskweaveError::ToolValidation(format!(
                    "labels and values must have the same length ({} vs {})",
                    p.labels.len(),
                    p.values.len()
                )));
            }

            let series: Vec<serde_json::Value> = p
                .labels
                .into_iter()
                .zip(p.values)
                .map(|(label, value)| json!({"label": label, "value": value}))
                .collect();

            let mut output = JsonMap::new();
            output.insert("chart_type".into(), json!(p.chart_type));
            output.insert("series".into(), json!(series));
            Ok(output)
        })
    }
}
