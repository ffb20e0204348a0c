use crate::graph::{Graph, NodeId, NodeKind, Operand};
use crate::series::Series;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the dependency tree under `target` with each node's computed values.
///
/// A node reached a second time prints a back-reference to the level where it
/// first appeared instead of being expanded again.
pub fn format_trace(graph: &Graph, results: &HashMap<NodeId, Series>, target: &NodeId) -> String {
    let mut tracer = Tracer { graph, results, visited_at_level: HashMap::new(), output: String::new() };

    if graph.contains(target) {
        let _ = writeln!(tracer.output, "TRACE for node '{}':", target);
        let _ = writeln!(tracer.output, "--------------------------------------------------");
        tracer.trace_node(target, 1, "");
    } else {
        let _ = writeln!(tracer.output, "Error: unknown node '{}'", target);
    }
    tracer.output
}

struct Tracer<'a> {
    graph: &'a Graph,
    results: &'a HashMap<NodeId, Series>,
    visited_at_level: HashMap<NodeId, usize>,
    output: String,
}

impl Tracer<'_> {
    fn trace_node(&mut self, id: &NodeId, level: usize, prefix: &str) {
        let Some(node) = self.graph.node(id) else {
            let _ = writeln!(self.output, "{}{} [missing]", prefix, id);
            return;
        };
        if let Some(&first_seen) = self.visited_at_level.get(id) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return;
        }
        self.visited_at_level.insert(id.clone(), level);

        let header = format!("[L{}] {}{}", level, id, self.format_value(id));
        let formula = match node.kind() {
            NodeKind::Const { values } => format!("const(len={})", values.len()),
            NodeKind::Binary { op, left, right } => {
                let rhs = match right {
                    Operand::Node(r) => r.to_string(),
                    Operand::Scalar(s) => format!("{}", s),
                };
                format!("{} {} {}", left, op.symbol(), rhs)
            }
            NodeKind::Backlog { inflow, outflow, loss, initial_depth } => match loss {
                Some(l) => format!("backlog({}, {}, loss={}, q0={})", inflow, outflow, l, initial_depth),
                None => format!("backlog({}, {}, q0={})", inflow, outflow, initial_depth),
            },
            NodeKind::Shift { source, lag } => format!("SHIFT({}, {})", source, lag),
            NodeKind::Expr(e) => e.source().to_string(),
            NodeKind::Pmf { pmf } => format!("pmf(E={:.3})", pmf.expected_value()),
        };
        let _ = writeln!(self.output, "{}{} = {}", prefix, header, formula);

        let stem = prefix.replace("`--", "   ").replace("|--", "|  ");
        let inputs = node.inputs();
        for (i, input) in inputs.iter().enumerate() {
            let connector = if i == inputs.len() - 1 { "`--" } else { "|--" };
            self.trace_node(input, level + 1, &format!("{}{}", stem, connector));
        }
    }

    fn format_value(&self, id: &NodeId) -> String {
        match self.results.get(id) {
            Some(s) if s.len() == 1 => format!("[{:.3}]", s[0]),
            Some(s) if !s.is_empty() => format!("[{:.3}, ...]", s[0]),
            _ => "[?]".to_string(),
        }
    }
}
