use serde_json::json;

use taskweave_core::types::{AgentSpec, JsonMap, WorkflowRequest};

/// Names of the built-in workflow templates.
pub fn template_names() -> Vec<&'static str> {
    vec!["linear_calc", "diamond_stats"]
}

/// Look up a prebuilt workflow request by template name.
pub fn template(name: &str) -> Option<WorkflowRequest> {
    match name {
        "linear_calc" => Some(linear_calc()),
        "diamond_stats" => Some(diamond_stats()),
        _ => None,
    }
}

/// Two-step chain: fetch a number, add a constant to it.
fn linear_calc() -> WorkflowRequest {
    WorkflowRequest {
        workflow_id: Some("linear_calc_example".into()),
        initial_input: JsonMap::new(),
        agents: vec![
            AgentSpec::new("fetch", "data_fetcher").with_config(config(json!({"data": 10}))),
            AgentSpec::new("calc", "calculator")
                .with_inputs(vec!["fetch".into()])
                .with_config(config(json!({"operation": "add", "const": 5}))),
        ],
        continue_on_error: false,
    }
}

/// Diamond: fetch a list, aggregate it two ways in parallel, chart both.
fn diamond_stats() -> WorkflowRequest {
    WorkflowRequest {
        workflow_id: Some("diamond_stats_example".into()),
        initial_input: JsonMap::new(),
        agents: vec![
            AgentSpec::new("fetch", "data_fetcher")
                .with_config(config(json!({"data": [3, 1, 2]}))),
            AgentSpec::new("total", "data_processor")
                .with_inputs(vec!["fetch".into()])
                .with_config(config(json!({"operation": "sum"}))),
            AgentSpec::new("peak", "data_processor")
                .with_inputs(vec!["fetch".into()])
                .with_config(config(json!({"operation": "max"}))),
            AgentSpec::new("chart", "chart_generator")
                .with_inputs(vec!["peak".into(), "total".into()])
                .with_config(config(json!({
                    "chart_type": "bar",
                    "labels": ["peak", "total"]
                }))),
        ],
        continue_on_error: false,
    }
}

fn config(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::WorkflowDag;

    #[test]
    fn test_all_templates_build_valid_dags() {
        for name in template_names() {
            let request = template(name).expect("known template");
            WorkflowDag::new(&request.agents).expect("template must validate");
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(template("nope").is_none());
    }

    #[test]
    fn test_diamond_layers() {
        let request = template("diamond_stats").expect("known template");
        let dag = WorkflowDag::new(&request.agents).expect("valid dag");
        assert_eq!(
            dag.layers(),
            vec![vec!["fetch"], vec!["total", "peak"], vec!["chart"]]
        );
    }
}
