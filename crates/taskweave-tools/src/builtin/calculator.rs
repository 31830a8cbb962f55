use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Tool;
use taskweave_core::types::JsonMap;

/// Arithmetic over a list of operands.
pub struct CalculatorTool;

#[derive(Deserialize)]
struct CalculatorInput {
    #[serde(default = "default_operation")]
    operation: String,
    #[serde(default)]
    values: Vec<f64>,
}

fn default_operation() -> String {
    "add".into()
}

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform arithmetic (add, subtract, multiply, divide) on a list of values."
    }

    fn execute(&self, params: JsonMap) -> BoxFuture<'_, Result<JsonMap>> {
        Box::pin(async move {
            let p: CalculatorInput = serde_json::from_value(serde_json::Value::Object(params))
                .map_err(|e| TaskweaveError::ToolValidation(e.to_string()))?;

            if p.values.is_empty() {
                return Err(TaskweaveError::ToolValidation(
                    "values must contain at least one number".into(),
                ));
            }

            let result = match p.operation.as_str() {
                "add" => p.values.iter().sum(),
                "subtract" => p.values[0] - p.values[1..].iter().sum::<f64>(),
                "multiply" => p.values.iter().product(),
                "divide" => {
                    let mut acc = p.values[0];
                    for v in &p.values[1..] {
                        if *v == 0.0 {
                            return Err(TaskweaveError::ToolExecution {
                                tool: "calculator".into(),
                                message: "division by zero".into(),
                            });
                        }
                        acc /= v;
                    }
                    acc
                }
                other => {
                    return Err(TaskweaveError::ToolValidation(format!(
                        "unsupported operation '{}'",
                        other
                    )))
                }
            };

            let mut output = JsonMap::new();
            output.insert("operation".into(), json!(p.operation));
            output.insert("result".into(), json!(result));
            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: serde_json::Value) -> JsonMap {
        value.as_object().expect("object literal").clone()
    }

    #[tokio::test]
    async fn test_add() {
        let out = CalculatorTool
            .execute(params(json!({"operation": "add", "values": [10.0, 5.0]})))
            .await
            .expect("add");
        assert_eq!(out["result"], json!(15.0));
    }

    #[tokio::test]
    async fn test_subtract_and_divide() {
        let out = CalculatorTool
            .execute(params(json!({"operation": "subtract", "values": [10, 3, 2]})))
            .await
            .expect("subtract");
        assert_eq!(out["result"], json!(5.0));

        let out = CalculatorTool
            .execute(params(json!({"operation": "divide", "values": [12, 4]})))
            .await
            .expect("divide");
        assert_eq!(out["result"], json!(3.0));
    }

    #[tokio::test]
    async fn test_divide_by_zero() {
        let err = CalculatorTool
            .execute(params(json!({"operation": "divide", "values": [1, 0]})))
            .await
            .expect_err("division by zero must fail");
        assert!(matches!(err, TaskweaveError::ToolExecution { .. }));
    }

    #[tokio::test]
    async fn test_empty_values_rejected() {
        let err = CalculatorTool
            .execute(params(json!({"operation": "add"})))
            .await
            .expect_err("empty operands must fail");
        assert!(matches!(err, TaskweaveError::ToolValidation(_)));
    }
}
