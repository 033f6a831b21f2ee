//! Presentation state derived from the layout and the pointer interaction.
//!
//! Nothing here touches the canvas; `render` draws whatever this produces.

use std::collections::HashMap;

use crate::knowledge::{GraphData, GraphNode, NodeKind};

use super::simulation::{ForceSimulation, NodeState};
use super::state::{InteractionState, NODE_RADIUS};

/// Longest node label drawn on the canvas before it is cut with an ellipsis.
pub const MAX_LABEL_CHARS: usize = 6;
/// Longest detail text shown in the tooltip.
pub const MAX_TOOLTIP_DETAIL_CHARS: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub color: &'static str,
	pub label: String,
	pub highlighted: bool,
	pub hovered: bool,
	pub selected: bool,
	pub fixed: bool,
	pub dragging: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub label: &'static str,
	pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub x: f64,
	pub y: f64,
	pub title: String,
	pub lines: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderState {
	pub nodes: Vec<NodeVisual>,
	pub edges: Vec<EdgeVisual>,
	pub tooltip: Option<Tooltip>,
	pub has_highlight: bool,
}

pub fn node_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Project => "#3498db",
		NodeKind::Tech => "#f39c12",
		NodeKind::Flood => "#e74c3c",
	}
}

/// Colour for nodes whose type is unknown to the legend.
pub const FALLBACK_COLOR: &str = "#95a5a6";

/// Cuts `text` to `max` characters, marking the cut with "...".
pub fn truncate_chars(text: &str, max: usize) -> String {
	match text.char_indices().nth(max) {
		Some((cut, _)) => format!("{}...", &text[..cut]),
		None => text.to_owned(),
	}
}

pub fn fixed_status(state: NodeState) -> &'static str {
	match state {
		NodeState::Fixed => "已固定 (双击解锁)",
		NodeState::Dragging => "拖动中",
		NodeState::Free => "自由",
	}
}

/// Tooltip text for a hovered node: type, pin status, year and details.
pub fn tooltip_lines(node: &GraphNode, state: NodeState) -> Vec<String> {
	let mut lines = vec![
		format!("类型: {}", node.kind.label()),
		format!("状态: {}", fixed_status(state)),
	];
	if !node.year.is_empty() {
		lines.push(format!("年份: {}", node.year));
	}
	if !node.details.is_empty() {
		lines.push(format!(
			"详情: {}",
			truncate_chars(&node.details, MAX_TOOLTIP_DETAIL_CHARS)
		));
	}
	lines
}

/// Computes what every node and edge should look like right now.
///
/// A node or edge is highlighted when it is, or touches, the hovered node or
/// the selected node. Edges whose endpoints are not laid out are left out.
pub fn derive(
	interaction: &InteractionState,
	simulation: &ForceSimulation,
	graph: &GraphData,
	pointer: (f64, f64),
) -> RenderState {
	let by_id: HashMap<&str, &GraphNode> = graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
	let sim_nodes = simulation.nodes();

	let edges = simulation
		.edges()
		.iter()
		.filter_map(|e| {
			let (a, b) = (sim_nodes.get(e.source)?, sim_nodes.get(e.target)?);
			Some(EdgeVisual {
				x1: a.x,
				y1: a.y,
				x2: b.x,
				y2: b.y,
				label: e.kind.label(),
				highlighted: interaction.is_emphasized(&a.id) || interaction.is_emphasized(&b.id),
			})
		})
		.collect();

	let nodes = sim_nodes
		.iter()
		.map(|n| {
			let data = by_id.get(n.id.as_str());
			let hovered = interaction.hovered.as_deref() == Some(n.id.as_str());
			let selected = interaction.selected.as_deref() == Some(n.id.as_str());
			let highlighted = hovered || selected;
			NodeVisual {
				x: n.x,
				y: n.y,
				radius: if highlighted {
					NODE_RADIUS * 1.2
				} else {
					NODE_RADIUS
				},
				color: data.map_or(FALLBACK_COLOR, |d| node_color(d.kind)),
				label: data.map_or_else(String::new, |d| truncate_chars(&d.label, MAX_LABEL_CHARS)),
				highlighted,
				hovered,
				selected,
				fixed: n.is_fixed(),
				dragging: n.state == NodeState::Dragging,
			}
		})
		.collect();

	let tooltip = match (&interaction.hovered, &interaction.dragged) {
		(Some(id), None) => by_id.get(id.as_str()).zip(simulation.node(id)).map(|(data, sim)| Tooltip {
			x: pointer.0 + 15.0,
			y: pointer.1 - 10.0,
			title: data.label.clone(),
			lines: tooltip_lines(data, sim.state),
		}),
		_ => None,
	};

	RenderState {
		nodes,
		edges,
		tooltip,
		has_highlight: interaction.hovered.is_some() || interaction.selected.is_some(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::SimulationParameters;

	fn setup() -> (ForceSimulation, GraphData) {
		let mut graph = GraphData::fixture(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
		graph.nodes[0].label = "京杭大运河山东段".into();
		graph.nodes[0].details = "水".repeat(150);
		graph.nodes[0].year = "1289".into();
		let mut sim = ForceSimulation::new(SimulationParameters::default(), 800.0, 600.0, 2);
		sim.sync(&graph);
		(sim, graph)
	}

	fn interaction(hovered: Option<&str>, selected: Option<&str>) -> InteractionState {
		InteractionState {
			dragged: None,
			hovered: hovered.map(str::to_owned),
			selected: selected.map(str::to_owned),
		}
	}

	#[test]
	fn truncation_counts_characters() {
		assert_eq!(truncate_chars("都江堰", 6), "都江堰");
		assert_eq!(truncate_chars("京杭大运河山东", 6), "京杭大运河山...");
		assert_eq!(truncate_chars("abcdef", 6), "abcdef");
	}

	#[test]
	fn labels_and_colors() {
		let (sim, graph) = setup();
		let state = derive(&InteractionState::default(), &sim, &graph, (0.0, 0.0));
		assert_eq!(state.nodes[0].label, "京杭大运河山...");
		assert!(state.nodes.iter().all(|n| n.color == "#3498db"));
		assert!(!state.has_highlight);
		assert!(state.edges.iter().all(|e| !e.highlighted));
	}

	#[test]
	fn hover_or_selection_highlights_incident_edges() {
		let (sim, graph) = setup();
		let hovered = derive(&interaction(Some("a"), None), &sim, &graph, (0.0, 0.0));
		assert_eq!(
			hovered.edges.iter().map(|e| e.highlighted).collect::<Vec<_>>(),
			vec![true, false]
		);

		let both = derive(&interaction(Some("a"), Some("c")), &sim, &graph, (0.0, 0.0));
		assert!(both.edges.iter().all(|e| e.highlighted));
		assert!(both.nodes[0].highlighted && both.nodes[2].highlighted);
		assert!(!both.nodes[1].highlighted);

		// Moving hover away leaves the selection's edges lit.
		let selected = derive(&interaction(None, Some("c")), &sim, &graph, (0.0, 0.0));
		assert_eq!(
			selected.edges.iter().map(|e| e.highlighted).collect::<Vec<_>>(),
			vec![false, true]
		);
		assert!(selected.has_highlight);
	}

	#[test]
	fn tooltip_for_hovered_node() {
		let (mut sim, graph) = setup();
		sim.pin("a");
		let state = derive(&interaction(Some("a"), None), &sim, &graph, (100.0, 100.0));
		let tip = state.tooltip.unwrap();
		assert_eq!(tip.title, "京杭大运河山东段");
		assert_eq!((tip.x, tip.y), (115.0, 90.0));
		assert_eq!(tip.lines[0], "类型: 水利工程");
		assert_eq!(tip.lines[1], "状态: 已固定 (双击解锁)");
		assert_eq!(tip.lines[2], "年份: 1289");
		assert_eq!(tip.lines[3].chars().count(), "详情: ".chars().count() + 103);
	}

	#[test]
	fn no_tooltip_while_dragging() {
		let (sim, graph) = setup();
		let mut i = interaction(Some("a"), None);
		i.dragged = Some("b".into());
		assert!(derive(&i, &sim, &graph, (0.0, 0.0)).tooltip.is_none());
	}
}
