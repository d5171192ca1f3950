//! Typed views over backend payloads, shaped for table output

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tabled::Tabled;

/// Payload of `network.info.v1`
#[derive(Debug, Deserialize)]
pub struct NetworkInfo {
    pub nodes: Vec<Value>,
    pub columns: Vec<String>,
    pub pools: HashMap<String, Vec<Value>>,
    #[serde(default)]
    pub connections: Vec<Value>,
}

/// Payload of `simulation.run.v1` (fields the CLI needs)
#[derive(Debug, Deserialize)]
pub struct SimulationRun {
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub node_to_pool: HashMap<String, String>,
    pub history: Vec<Vec<f64>>,
}

#[derive(Debug, Tabled, PartialEq)]
pub struct PoolRow {
    #[tabled(rename = "Pool")]
    pub pool: String,
    #[tabled(rename = "Units")]
    pub units: usize,
    #[tabled(rename = "Members")]
    pub members: String,
}

#[derive(Debug, Tabled, PartialEq)]
pub struct ActivationRow {
    #[tabled(rename = "Node")]
    pub node: String,
    #[tabled(rename = "Pool")]
    pub pool: String,
    #[tabled(rename = "Activation")]
    pub activation: String,
    #[tabled(rename = "Input")]
    pub input: String,
}

/// Node names may arrive as numbers; show them the way the CSV had them
pub fn label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One row per pool, in column order
pub fn pool_rows(info: &NetworkInfo) -> Vec<PoolRow> {
    info.columns
        .iter()
        .map(|column| {
            let members = info.pools.get(column).map(Vec::as_slice).unwrap_or(&[]);
            PoolRow {
                pool: column.clone(),
                units: members.len(),
                members: members.iter().map(label).collect::<Vec<_>>().join(", "),
            }
        })
        .collect()
}

/// Activations after the last step, strongest first
pub fn final_activations(run: &SimulationRun, selected: &[String]) -> Vec<ActivationRow> {
    let Some(last) = run.history.last() else {
        return Vec::new();
    };

    let mut ranked: Vec<(String, f64)> = run
        .nodes
        .iter()
        .zip(last.iter().copied())
        .map(|(node, activation)| (label(node), activation))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .map(|(node, activation)| ActivationRow {
            pool: run.node_to_pool.get(&node).cloned().unwrap_or_default(),
            input: if selected.contains(&node) { "●" } else { "" }.to_string(),
            activation: format!("{:+.4}", activation),
            node,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pool_rows_follow_column_order() {
        let info: NetworkInfo = serde_json::from_value(json!({
            "nodes": ["Art", "Al", "Jets", "Sharks", 40],
            "columns": ["Name", "Gang", "Age"],
            "pools": {"Gang": ["Jets", "Sharks"], "Name": ["Art", "Al"], "Age": [40]},
            "node_to_pool": {"Art": "Name"},
            "connections": [{"source": "Art", "target": "Jets", "type": "excitatory"}]
        }))
        .unwrap();

        let rows = pool_rows(&info);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].pool, "Name");
        assert_eq!(rows[0].members, "Art, Al");
        assert_eq!(rows[2].members, "40");
        assert_eq!(info.connections.len(), 1);
    }

    #[test]
    fn test_final_activations_sorted_and_marked() {
        let run: SimulationRun = serde_json::from_value(json!({
            "nodes": ["Art", "Jets", "Sharks"],
            "node_to_pool": {"Art": "Name", "Jets": "Gang", "Sharks": "Gang"},
            "history": [[0.1, 0.0, 0.0], [0.2, 0.15, -0.05]],
            "idx_lookup": {"Art": 0, "Jets": 1, "Sharks": 2}
        }))
        .unwrap();

        let rows = final_activations(&run, &["Art".to_string()]);

        let order: Vec<&str> = rows.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(order, ["Art", "Jets", "Sharks"]);
        assert_eq!(rows[0].activation, "+0.2000");
        assert_eq!(rows[0].input, "●");
        assert_eq!(rows[2].pool, "Gang");
        assert_eq!(rows[2].activation, "-0.0500");
    }

    #[test]
    fn test_final_activations_empty_history() {
        let run = SimulationRun {
            nodes: vec![json!("Art")],
            node_to_pool: HashMap::new(),
            history: vec![],
        };

        assert!(final_activations(&run, &[]).is_empty());
    }
}
