use async_trait::async_trait;
use nodeflow_core::{
    NodeContract, NodeError, NodeHandler, NodeId, NodeInput, NodeRegistryLookup, PortAddress,
    PortValues, StructuralError, WorkflowBuilder, WorkflowDefinition,
};
use serde_json::json;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Writes `<type>:<inputs>` to its single output so propagation is visible
struct Tagging {
    node_type: &'static str,
    output: &'static str,
}

#[async_trait]
impl NodeHandler for Tagging {
    async fn execute(&self, inputs: PortValues) -> Result<PortValues, NodeError> {
        let mut outputs = PortValues::new();
        outputs.insert(
            self.output.to_string(),
            json!(format!("{}:{}", self.node_type, serde_json::Value::Object(inputs))),
        );
        Ok(outputs)
    }
}

struct ScenarioRegistry;

impl NodeRegistryLookup for ScenarioRegistry {
    fn lookup(&self, node_type: &str, version: u32) -> Option<NodeContract> {
        let (name, inputs, output): (&'static str, &[&str], &'static str) = match (node_type, version) {
            ("trigger.manual", 1) => ("trigger.manual", &[], "fired"),
            ("http.request", 1) => ("http.request", &["trigger"], "response"),
            ("email.send", 1) => ("email.send", &["body"], "sent"),
            _ => return None,
        };

        Some(NodeContract {
            node_type: name.to_string(),
            version,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: BTreeSet::from([output.to_string()]),
            handler: Arc::new(Tagging {
                node_type: name,
                output,
            }),
        })
    }
}

struct Scenario {
    definition: WorkflowDefinition,
    a: NodeId,
    b: NodeId,
    c: NodeId,
}

fn build_scenario() -> Scenario {
    let mut builder = WorkflowBuilder::init("notify", "1.0")
        .unwrap()
        .description("trigger, fetch, then mail");

    let a = builder
        .add_node(NodeInput::new("trigger.manual", 1).output("fired"))
        .unwrap();
    let b = builder
        .add_node(
            NodeInput::new("http.request", 1)
                .set("url", json!("https://example.com/status"))
                .input("trigger")
                .output("response"),
        )
        .unwrap();
    let c = builder
        .add_node(
            NodeInput::new("email.send", 1)
                .set("to", json!("ops@example.com"))
                .input("body")
                .output("sent"),
        )
        .unwrap();

    builder
        .connect(PortAddress::named(&a, "fired"), PortAddress::named(&b, "trigger"))
        .unwrap();
    builder
        .connect(PortAddress::named(&b, "response"), PortAddress::named(&c, "body"))
        .unwrap();
    builder.set_entrypoints(vec![a.clone()]);

    let definition = builder.build(Some(Arc::new(ScenarioRegistry))).unwrap();
    Scenario { definition, a, b, c }
}

#[test]
fn test_scenario_shape() {
    let Scenario { definition, a, .. } = build_scenario();

    assert_eq!(definition.nodes().len(), 3);
    assert_eq!(definition.edges().len(), 2);
    assert_eq!(definition.entrypoints(), &[a]);
    assert_eq!(definition.metadata().description(), Some("trigger, fetch, then mail"));
}

#[tokio::test]
async fn test_scenario_runs_in_order_without_repeats() {
    let Scenario { definition, a, b, c } = build_scenario();
    let mut iterator = definition.create_iterator();

    let mut order = Vec::new();
    let mut last_inputs = PortValues::new();
    while let Some(step) = iterator.get_next_step().unwrap() {
        let outputs = step.run().await.unwrap();
        last_inputs = step.inputs.clone();
        order.push(step.node_id.clone());
        iterator.record_output(step.node_id, outputs);
    }

    assert_eq!(order, vec![a, b, c]);
    let unique: HashSet<&NodeId> = order.iter().collect();
    assert_eq!(unique.len(), 3);

    // email.send saw its config plus the http.request output
    assert_eq!(last_inputs.get("to"), Some(&json!("ops@example.com")));
    let body = last_inputs.get("body").and_then(|v| v.as_str()).unwrap();
    assert!(body.starts_with("http.request:"));
    assert!(body.contains("trigger.manual:"));
}

#[test]
fn test_graph_structure_snapshot() {
    let Scenario { definition, a, b, c } = build_scenario();
    let structure = definition.graph_structure();

    assert!(structure.has_edge(a.as_str(), b.as_str()));
    assert!(structure.has_edge(b.as_str(), c.as_str()));
    assert_eq!(structure.node_type(c.as_str()), Some("email.send"));
    assert_eq!(definition.topological_order(), vec![a, b, c]);
}

#[test]
fn test_unregistered_type_rejected_at_build() {
    let mut builder = WorkflowBuilder::init("broken", "1.0").unwrap();
    builder
        .add_node(NodeInput::new("sms.send", 1).input("body"))
        .unwrap();

    let err = builder.build(Some(Arc::new(ScenarioRegistry))).unwrap_err();
    assert!(matches!(err, StructuralError::UnknownNodeType { ref node_type, .. } if node_type == "sms.send"));
    assert!(err.to_string().contains("sms.send"));
}
