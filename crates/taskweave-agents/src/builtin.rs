use std::sync::Arc;

use serde_json::Value;

use taskweave_core::traits::Agent;
use taskweave_core::types::{AgentSpec, JsonMap};
use taskweave_tools::ToolRegistry;

use crate::agent::{ParamShaper, ToolAgent};
use crate::registry::AgentRegistry;

/// Register the built-in agent types.
///
/// Types already present are left untouched so callers can override a
/// built-in before wiring the defaults.
pub fn register_builtin_agents(registry: &mut AgentRegistry, tools: &Arc<ToolRegistry>) {
    let builtins: [(&str, &str, &str, ParamShaper); 4] = [
        (
            "data_fetcher",
            "data_fetcher",
            "Fetch a static data payload for downstream agents.",
            fetcher_params,
        ),
        (
            "data_processor",
            "data_processor",
            "Aggregate numeric data collected from upstream outputs.",
            processor_params,
        ),
        (
            "calculator",
            "calculator",
            "Perform arithmetic over operands collected from upstream outputs.",
            calculator_params,
        ),
        (
            "chart_generator",
            "chart_generator",
            "Shape upstream labels and values into a chart-ready series.",
            chart_params,
        ),
    ];

    for (agent_type, tool_name, description, shape) in builtins {
        if registry.contains(agent_type) {
            continue;
        }
        let tools = tools.clone();
        registry.register_overwrite(agent_type, description, move |spec: &AgentSpec| {
            let tool = tools.get(tool_name)?;
            Ok(Arc::new(ToolAgent::new(spec.clone(), tool, shape)) as Arc<dyn Agent>)
        });
    }
}

/// The data fetcher takes its parameters verbatim; the tool ignores
/// upstream mappings it does not understand.
fn fetcher_params(_spec: &AgentSpec, inputs: &JsonMap) -> JsonMap {
    inputs.clone()
}

/// Collect `operation` + `values` for the data processor.
fn processor_params(_spec: &AgentSpec, inputs: &JsonMap) -> JsonMap {
    let mut params = JsonMap::new();
    if let Some(op) = inputs.get("operation") {
        params.insert("operation".into(), op.clone());
    }
    params.insert("values".into(), Value::Array(collect_values(inputs)));
    params
}

/// Like the processor, plus an optional numeric `const` config entry
/// appended to the operand list.
fn calculator_params(_spec: &AgentSpec, inputs: &JsonMap) -> JsonMap {
    let mut params = JsonMap::new();
    if let Some(op) = inputs.get("operation") {
        params.insert("operation".into(), op.clone());
    }
    let mut values = collect_values(inputs);
    if let Some(constant) = inputs.get("const").filter(|v| v.is_number()) {
        values.push(constant.clone());
    }
    params.insert("values".into(), Value::Array(values));
    params
}

/// Collect `labels`, `values`, and `chart_type` for the chart generator.
fn chart_params(_spec: &AgentSpec, inputs: &JsonMap) -> JsonMap {
    let mut params = JsonMap::new();
    if let Some(chart_type) = inputs.get("chart_type") {
        params.insert("chart_type".into(), chart_type.clone());
    }

    let labels = match inputs.get("labels") {
        Some(Value::Array(items)) => items.clone(),
        _ => scan_upstream(inputs, &["labels"]).unwrap_or_default(),
    };
    params.insert("labels".into(), Value::Array(labels));

    let values = match inputs.get("values") {
        Some(Value::Array(items)) => items.clone(),
        _ => collect_series_values(inputs),
    };
    params.insert("values".into(), Value::Array(values));
    params
}

/// Gather one series contribution per upstream output: scalar results
/// add a single point, array results splice in all of their items.
/// Upstreams are visited in key order, matching label order.
fn collect_series_values(inputs: &JsonMap) -> Vec<Value> {
    let mut values = Vec::new();
    for value in inputs.values() {
        let Value::Object(upstream) = value else {
            continue;
        };
        match upstream.get("result").or_else(|| upstream.get("value")) {
            Some(Value::Array(items)) => values.extend(items.iter().cloned()),
            Some(v) if v.is_number() => values.push(v.clone()),
            _ => {}
        }
    }
    values
}

/// Gather operand values from a composed input mapping.
///
/// A top-level `values` entry wins; otherwise upstream output mappings
/// are scanned for `result`, `values`, `data`, or `value` payloads, with
/// scalars promoted to one-element lists.
fn collect_values(inputs: &JsonMap) -> Vec<Value> {
    match inputs.get("values") {
        Some(Value::Array(items)) => return items.clone(),
        Some(v) if v.is_number() => return vec![v.clone()],
        _ => {}
    }
    scan_upstream(inputs, &["result", "values", "data", "value"]).unwrap_or_default()
}

fn scan_upstream(inputs: &JsonMap, keys: &[&str]) -> Option<Vec<Value>> {
    for value in inputs.values() {
        let Value::Object(upstream) = value else {
            continue;
        };
        for key in keys {
            match upstream.get(*key) {
                Some(Value::Array(items)) => return Some(items.clone()),
                Some(v) if v.is_number() => return Some(vec![v.clone()]),
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        value.as_object().expect("object literal").clone()
    }

    #[test]
    fn test_collect_values_prefers_top_level() {
        let inputs = map(json!({
            "values": [1, 2],
            "upstream": {"result": [9, 9]}
        }));
        assert_eq!(collect_values(&inputs), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_collect_values_scans_upstream_outputs() {
        let inputs = map(json!({"fetch": {"source": "direct", "data": 10}}));
        assert_eq!(collect_values(&inputs), vec![json!(10)]);

        let inputs = map(json!({"agg": {"operation": "sum", "result": 6.0}}));
        assert_eq!(collect_values(&inputs), vec![json!(6.0)]);
    }

    #[test]
    fn test_calculator_params_appends_const() {
        let spec = AgentSpec::new("calc", "calculator");
        let inputs = map(json!({
            "operation": "add",
            "const": 5,
            "fetch": {"data": 10}
        }));
        let params = calculator_params(&spec, &inputs);
        assert_eq!(params["operation"], json!("add"));
        assert_eq!(params["values"], json!([10, 5]));
    }

    #[test]
    fn test_chart_params_pulls_labels_and_values() {
        let spec = AgentSpec::new("chart", "chart_generator");
        let inputs = map(json!({
            "chart_type": "line",
            "labels": ["a", "b"],
            "agg": {"result": [1, 2]}
        }));
        let params = chart_params(&spec, &inputs);
        assert_eq!(params["chart_type"], json!("line"));
        assert_eq!(params["labels"], json!(["a", "b"]));
        assert_eq!(params["values"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_builtin_agent_end_to_end() {
        let tools = Arc::new(ToolRegistry::with_builtins());
        let registry = AgentRegistry::with_builtins(tools);

        let spec = AgentSpec::new("calc", "calculator").with_config(map(json!({
            "operation": "add",
            "const": 5
        })));
        let agent = registry.create(&spec).expect("create calculator");

        // Engine-composed inputs: config overlaid on the upstream mapping.
        let inputs = map(json!({
            "fetch": {"source": "direct", "data": 10},
            "operation": "add",
            "const": 5
        }));
        let output = agent.run(inputs).await.expect("run");
        assert_eq!(output["result"], json!(15.0));
    }
}
