use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Tool;
use taskweave_core::types::JsonMap;

/// Return a static data payload, echoing where it came from.
pub struct DataFetcherTool;

#[derive(Deserialize)]
struct DataFetcherInput {
    #[serde(default = "default_source")]
    source: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

fn default_source() -> String {
    "direct".into()
}

impl Tool for DataFetcherTool {
    fn name(&self) -> &str {
        "data_fetcher"
    }

    fn description(&self) -> &str {
        "Fetch a static data payload from the provided source parameters."
    }

    fn execute(&self, params: JsonMap) -> BoxFuture<'_, Result<JsonMap>> {
        Box::pin(async move {
            let p: DataFetcherInput = serde_json::from_value(serde_json::Value::Object(params))
                .map_err(|e| TaskweaveError::ToolValidation(e.to_string()))?;

            let mut output = JsonMap::new();
            output.insert("source".into(), json!(p.source));
            output.insert("data".into(), p.data.unwrap_or_else(|| json!({})));
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
    async fn test_fetch_with_payload() {
        let out = DataFetcherTool
            .execute(params(json!({"source": "inventory", "data": [1, 2, 3]})))
            .await
            .expect("fetch");
        assert_eq!(out["source"], json!("inventory"));
        assert_eq!(out["data"], json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_fetch_defaults() {
        let out = DataFetcherTool
            .execute(JsonMap::new())
            .await
            .expect("fetch with defaults");
        assert_eq!(out["source"], json!("direct"));
        assert_eq!(out["data"], json!({}));
    }
}
