use flowtime_core::analysis::dependents_of;
use flowtime_core::display::format_trace;
use flowtime_core::expr::ParseErrorKind;
use flowtime_core::{
    evaluate_batch, evaluate_model, BinUnit, EngineError, Graph, ModelDefinition, Node, NodeId, Pcg32,
    TimeGrid,
};
use serde_json::json;

fn model(value: serde_json::Value) -> ModelDefinition {
    ModelDefinition::from_json(&value.to_string()).unwrap()
}

fn series(run: &flowtime_core::ModelRun, id: &str) -> Vec<f64> {
    run.series[&NodeId::from(id)].to_vec()
}

#[test]
fn test_demand_served() {
    let def = model(json!({
        "grid": { "bins": 3, "binSize": 60, "binUnit": "minutes" },
        "nodes": [
            { "kind": "const", "id": "demand", "values": [10, 10, 10] },
            { "kind": "expr", "id": "served", "expr": "demand * 0.8" }
        ]
    }));
    let run = evaluate_model(&def).unwrap();
    assert_eq!(series(&run, "served"), vec![8.0, 8.0, 8.0]);
    assert_eq!(run.order, vec![NodeId::from("demand"), NodeId::from("served")]);
}

#[test]
fn test_division_by_zero_is_zero() {
    let def = model(json!({
        "grid": { "bins": 3, "binSize": 1, "binUnit": "hours" },
        "nodes": [
            { "kind": "const", "id": "a", "values": [4, 4, 4] },
            { "kind": "const", "id": "b", "values": [2, 0, 1] },
            { "kind": "expr", "id": "ratio", "expr": "a / b" },
            { "kind": "binary", "id": "ratio2", "op": "div", "left": "a", "right": "b" }
        ]
    }));
    let run = evaluate_model(&def).unwrap();
    assert_eq!(series(&run, "ratio"), vec![2.0, 0.0, 4.0]);
    assert_eq!(series(&run, "ratio2"), vec![2.0, 0.0, 4.0]);
}

#[test]
fn test_queue_with_retries() {
    let def = model(json!({
        "grid": { "bins": 5, "binSize": 5, "binUnit": "minutes" },
        "nodes": [
            { "kind": "const", "id": "arrivals", "values": [10, 10, 10, 0, 0] },
            { "kind": "const", "id": "capacity", "values": [6, 6, 6, 6, 6] },
            { "kind": "expr", "id": "served", "expr": "MIN(arrivals, capacity)" },
            { "kind": "expr", "id": "failed", "expr": "arrivals - served" },
            { "kind": "retry", "id": "retries", "source": "failed", "kernel": [0, 0.5, 0.5] },
            { "kind": "backlog", "id": "queue", "inflow": "retries", "outflow": "capacity", "initialDepth": 1 },
            { "kind": "shift", "id": "prev_served", "source": "served", "lag": 1 }
        ]
    }));
    let run = evaluate_model(&def).unwrap();
    assert_eq!(series(&run, "failed"), vec![4.0, 4.0, 4.0, 0.0, 0.0]);
    assert_eq!(series(&run, "retries"), vec![0.0, 2.0, 4.0, 4.0, 2.0]);
    assert_eq!(series(&run, "queue"), vec![0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(series(&run, "prev_served"), vec![0.0, 6.0, 6.0, 6.0, 0.0]);
    assert!(run.warnings.is_empty());

    let pos = |id: &str| run.order.iter().position(|n| n.as_str() == id).unwrap();
    assert!(pos("served") < pos("failed"));
    assert!(pos("failed") < pos("retries"));
    assert!(pos("retries") < pos("queue"));
}

#[test]
fn test_conv_in_expression() {
    let def = model(json!({
        "grid": { "bins": 5, "binSize": 60, "binUnit": "minutes" },
        "nodes": [
            { "kind": "const", "id": "x", "values": [1, 2, 3, 4, 5] },
            { "kind": "expr", "id": "y", "expr": "CONV(x, [0.0, 0.6, 0.3, 0.1])" }
        ]
    }));
    let run = evaluate_model(&def).unwrap();
    for (a, e) in series(&run, "y").iter().zip([0.0, 0.6, 1.5, 2.5, 3.5]) {
        assert!((a - e).abs() < 1e-12);
    }
}

#[test]
fn test_cycle_is_rejected() {
    let def = model(json!({
        "grid": { "bins": 2, "binSize": 60, "binUnit": "minutes" },
        "nodes": [
            { "kind": "expr", "id": "a", "expr": "b + 1" },
            { "kind": "expr", "id": "b", "expr": "a + 1" }
        ]
    }));
    assert!(matches!(evaluate_model(&def), Err(EngineError::GraphCycle { unresolved: 2 })));
}

#[test]
fn test_parse_error_surfaces_position() {
    let def = model(json!({
        "grid": { "bins": 2, "binSize": 60, "binUnit": "minutes" },
        "nodes": [ { "kind": "expr", "id": "a", "expr": "1 + * 2" } ]
    }));
    match evaluate_model(&def) {
        Err(EngineError::Parse(e)) => assert_eq!(e.position, 4),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_overlong_expression_is_a_parse_error() {
    let source = vec!["x"; 50_000].join(" + ");
    let def = model(json!({
        "grid": { "bins": 2, "binSize": 60, "binUnit": "minutes" },
        "nodes": [
            { "kind": "const", "id": "x", "values": [1, 2] },
            { "kind": "expr", "id": "y", "expr": source }
        ]
    }));
    match evaluate_model(&def) {
        Err(EngineError::Parse(e)) => assert_eq!(e.kind, ParseErrorKind::TooDeep),
        other => panic!("expected parse error, got {:?}", other),
    }
    assert!(Node::expr("y", &format!("{}x{}", "(".repeat(5_000), ")".repeat(5_000))).is_err());
}

#[test]
fn test_long_expression_within_limit_evaluates() {
    let grid = TimeGrid::new(2, 60, BinUnit::Minutes).unwrap();
    let graph = Graph::new(vec![
        Node::constant("x", vec![1.0, 2.0]),
        Node::expr("y", &vec!["x"; 200].join(" + ")).unwrap(),
    ])
    .unwrap();
    let out = graph.evaluate(&grid).unwrap();
    assert_eq!(out[&NodeId::from("y")].to_vec(), vec![200.0, 400.0]);
}

#[test]
fn test_pmf_node_expected_value() {
    let def = model(json!({
        "grid": { "bins": 4, "binSize": 1, "binUnit": "days" },
        "nodes": [
            { "kind": "pmf", "id": "svc", "pmf": { "values": [1, 2, 3], "probabilities": [0.2, 0.5, 0.3] } },
            { "kind": "binary", "id": "scaled", "op": "mul", "left": "svc", "scalar": 10 }
        ]
    }));
    let run = evaluate_model(&def).unwrap();
    for v in series(&run, "scaled") {
        assert!((v - 21.0).abs() < 1e-9);
    }
    assert_eq!(run.grid.total_minutes(), 4 * 1_440);
}

#[test]
fn test_const_length_mismatch() {
    let def = model(json!({
        "grid": { "bins": 3, "binSize": 60, "binUnit": "minutes" },
        "nodes": [ { "kind": "const", "id": "a", "values": [1, 2] } ]
    }));
    assert!(matches!(
        evaluate_model(&def),
        Err(EngineError::LengthMismatch { expected: 3, actual: 2, .. })
    ));
}

#[test]
fn test_repeated_evaluation_is_identical() {
    let grid = TimeGrid::new(3, 60, BinUnit::Minutes).unwrap();
    let graph = Graph::new(vec![
        Node::constant("in", vec![5.0, 0.0, 5.0]),
        Node::constant("out", vec![2.0, 2.0, 2.0]),
        Node::backlog("q", "in", "out", None, 0.0),
    ])
    .unwrap();
    let first = graph.evaluate(&grid).unwrap();
    let second = graph.evaluate(&grid).unwrap();
    assert_eq!(first[&NodeId::from("q")].to_vec(), vec![3.0, 1.0, 4.0]);
    assert_eq!(first[&NodeId::from("q")], second[&NodeId::from("q")]);
}

#[test]
fn test_batch_evaluation() {
    let grid = TimeGrid::new(2, 60, BinUnit::Minutes).unwrap();
    let graphs: Vec<Graph> = (0..8)
        .map(|i| {
            Graph::new(vec![
                Node::constant("base", vec![i as f64, i as f64]),
                Node::expr("double", "base * 2").unwrap(),
            ])
            .unwrap()
        })
        .collect();
    let results = evaluate_batch(&graphs, &grid);
    assert_eq!(results.len(), 8);
    for (i, r) in results.into_iter().enumerate() {
        let r = r.unwrap();
        assert_eq!(r[&NodeId::from("double")].to_vec(), vec![2.0 * i as f64; 2]);
    }
}

#[test]
fn test_trace_and_impact() {
    let grid = TimeGrid::new(1, 60, BinUnit::Minutes).unwrap();
    let graph = Graph::new(vec![
        Node::constant("demand", vec![10.0]),
        Node::expr("served", "demand * 0.8").unwrap(),
    ])
    .unwrap();
    let results = graph.evaluate(&grid).unwrap();
    let trace = format_trace(&graph, &results, &"served".into());
    assert!(trace.contains("[L1] served[8.000] = demand * 0.8"));
    assert!(trace.contains("`--[L2] demand[10.000]"));
    assert_eq!(dependents_of(&graph, &"demand".into()), vec![NodeId::from("served")]);
}

#[test]
fn test_rng_is_reproducible() {
    let mut a = Pcg32::new(12345);
    let mut b = Pcg32::new(12345);
    let xs: Vec<u32> = (0..16).map(|_| a.next_u32()).collect();
    let ys: Vec<u32> = (0..16).map(|_| b.next_u32()).collect();
    assert_eq!(xs, ys);
}
