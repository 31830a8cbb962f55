use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Tool;
use taskweave_core::types::JsonMap;

/// Aggregate a numeric list (sum, average, max, min, identity).
pub struct DataProcessorTool;

#[derive(Deserialize)]
struct DataProcessorInput {
    #[serde(default = "default_operation")]
    operation: String,
    #[serde(default)]
    values: Vec<f64>,
}

fn default_operation() -> String {
    "identity".into()
}

impl Tool for DataProcessorTool {
    fn name(&self) -> &str {
        "data_processor"
    }

    fn description(&self) -> &str {
        "Aggregate a list of numbers: sum, average, max, min, or identity."
    }

    fn execute(&self, params: JsonMap) -> BoxFuture<'_, Result<JsonMap>> {
        Box::pin(async move {
            let p: DataProcessorInput = serde_json::from_value(serde_json::Value::Object(params))
                .map_err(|e| TaskweaveError::ToolValidation(e.to_string()))?;

            let result = match p.operation.as_str() {
                "sum" => json!(p.values.iter().sum::<f64>()),
                "average" => {
                    if p.values.is_empty() {
                        json!(0.0)
                    } else {
                        json!(p.values.iter().sum::<f64>() / p.values.len() as f64)
                    }
                }
                "max" => json!(non_empty(&p.values)?
                    .iter()
                    .cloned()
                    .fold(f64::NEG_INFINITY, f64::max)),
                "min" => json!(non_empty(&p.values)?
                    .iter()
                    .cloned()
                    .fold(f64::INFINITY, f64::min)),
                "identity" => json!(p.values),
                other => {
                    return Err(TaskweaveError::ToolValidation(format!(
                        "unsupported operation '{}'",
                        other
                    )))
                }
            };

            let mut output = JsonMap::new();
            output.insert("operation".into(), json!(p.operation));
            output.insert("result".into(), result);
            Ok(output)
        })
    }
}

fn non_empty(values: &[f64]) -> Result<&[f64]> {
    if values.is_empty() {
        return Err(TaskweaveError::ToolValidation(
            "values must contain at least one number".into(),
        ));
    }
    Ok(values)
}
