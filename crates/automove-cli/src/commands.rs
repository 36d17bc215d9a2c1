// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `run` and `check`.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use automove_core::{
    parse_rule_file, Automove, ElementScope, EventKind, GraphEvent, GraphHost, NodeId, RuleConfig,
};
use automove_graph::{MemoryGraph, Scene};
use comfy_table::Table;
use serde::Serialize;
use tracing::{debug, info};

use crate::args::{Drag, Format};

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_scene(path: &Path) -> Result<MemoryGraph> {
    let scene = Scene::from_json(&read(path)?)
        .with_context(|| format!("failed to load scene {}", path.display()))?;
    let graph = scene
        .build()
        .with_context(|| format!("failed to build scene {}", path.display()))?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "scene loaded"
    );
    Ok(graph)
}

fn load_rules(path: &Path) -> Result<Vec<RuleConfig>> {
    parse_rule_file(&read(path)?)
        .with_context(|| format!("failed to parse rule file {}", path.display()))
}

/// Per-node count of `automove` notifications.
fn count_automoves(graph: &mut MemoryGraph) -> Rc<RefCell<BTreeMap<NodeId, u32>>> {
    let counts = Rc::new(RefCell::new(BTreeMap::new()));
    let sink = Rc::clone(&counts);
    graph.on(
        &[EventKind::Automove],
        ElementScope::Node,
        Rc::new(move |_host: &mut dyn GraphHost, event: &GraphEvent| {
            if let Some(node) = event.node() {
                *sink.borrow_mut().entry(node).or_insert(0) += 1;
            }
        }),
    );
    counts
}

#[derive(Serialize)]
struct NodeRow<'a> {
    id: &'a str,
    x: f64,
    y: f64,
    automoves: u32,
}

/// Executes `run` and returns the rendered output.
pub fn run(scene: &Path, rules: &Path, moves: &[Drag], format: Format) -> Result<String> {
    let mut graph = load_scene(scene)?;
    let configs = load_rules(rules)?;
    let counts = count_automoves(&mut graph);

    let automove = Automove::new();
    for (index, config) in configs.iter().enumerate() {
        let options = config
            .to_options(&graph)
            .with_context(|| format!("rule {index} in {}", rules.display()))?;
        let handle = automove
            .register(&mut graph, options)
            .with_context(|| format!("rule {index} in {}", rules.display()))?;
        info!(rule = %handle.id(), index, "rule registered");
    }

    for drag in moves {
        let node = graph
            .resolve_node(&drag.node)
            .with_context(|| format!("--move names unknown node `{}`", drag.node))?;
        info!(node = %drag.node, to = %drag.to, "applying move");
        graph.set_position(node, drag.to);
    }

    let counts = counts.borrow();
    let rows: Vec<NodeRow<'_>> = graph
        .iter_nodes()
        .map(|(id, record)| NodeRow {
            id: record.key(),
            x: record.position().x,
            y: record.position().y,
            automoves: counts.get(&id).copied().unwrap_or(0),
        })
        .collect();

    match format {
        Format::Json => Ok(serde_json::to_string_pretty(&rows)?),
        Format::Table => {
            let mut table = Table::new();
            table.set_header(vec!["node", "x", "y", "automoves"]);
            for row in &rows {
                table.add_row(vec![
                    row.id.to_owned(),
                    row.x.to_string(),
                    row.y.to_string(),
                    row.automoves.to_string(),
                ]);
            }
            Ok(table.to_string())
        }
    }
}

/// Executes `check` and returns one line per rule.
///
/// # Errors
/// Fails after reporting if any rule is invalid.
pub fn check(scene: &Path, rules: &Path) -> Result<String> {
    let mut graph = load_scene(scene)?;
    let configs = load_rules(rules)?;
    let automove = Automove::new();

    let mut lines = Vec::with_capacity(configs.len());
    let mut failed = 0usize;
    for (index, config) in configs.iter().enumerate() {
        let outcome = config
            .to_options(&graph)
            .and_then(|options| {
                let strategy = options.reposition.name();
                automove
                    .register(&mut graph, options)
                    .map(|handle| (strategy, handle))
            });
        match outcome {
            Ok((strategy, handle)) => lines.push(format!(
                "rule {index}: ok ({strategy}, {} bindings)",
                handle.binding_count()
            )),
            Err(err) => {
                failed += 1;
                lines.push(format!("rule {index}: error: {err}"));
            }
        }
    }
    let report = lines.join("\n");
    if failed > 0 {
        bail!("{report}\n{failed} of {} rules invalid", configs.len());
    }
    Ok(report)
}
