use std::collections::HashSet;

use log::{debug, info, warn};
use serde_json::Value;

use super::normalize::normalize;
use super::record::{Record, coerce_collection, non_blank};
use super::types::{EdgeKind, GraphData, GraphEdge, GraphNode, NodeKind};

/// Hands out ids that collide with neither explicit ids nor earlier generated ones.
struct IdAllocator {
	taken: HashSet<String>,
	next: usize,
}

impl IdAllocator {
	fn new<'a>(explicit: impl Iterator<Item = &'a str>) -> Self {
		Self {
			taken: explicit.map(str::to_owned).collect(),
			next: 1,
		}
	}

	fn fresh(&mut self, prefix: &str) -> String {
		loop {
			let id = format!("{}-{}", prefix, self.next);
			self.next += 1;
			if !self.taken.contains(&id) {
				self.taken.insert(id.clone());
				return id;
			}
		}
	}
}

fn node_from(record: &Record, kind: NodeKind, id: String) -> GraphNode {
	let text = |value: &Option<String>| value.clone().unwrap_or_default();
	let (label, category, year) = match kind {
		NodeKind::Project => (
			text(&record.label),
			record.category.clone().unwrap_or_else(|| "工程".into()),
			text(&record.year),
		),
		NodeKind::Tech => (
			record
				.label
				.clone()
				.filter(|l| !l.is_empty())
				.or_else(|| record.label_alt.clone())
				.unwrap_or_default(),
			record.kind.clone().unwrap_or_else(|| "技术".into()),
			record
				.period
				.clone()
				.filter(|p| !p.is_empty())
				.or_else(|| record.year.clone())
				.unwrap_or_default(),
		),
		NodeKind::Flood => (
			text(&record.label),
			record.kind.clone().unwrap_or_else(|| "水灾".into()),
			text(&record.year),
		),
	};

	GraphNode {
		id,
		label,
		kind,
		category,
		year,
		details: text(&record.details),
		interval: normalize(record),
		original: record.clone(),
	}
}

fn find_by_label<'a>(nodes: &'a [GraphNode], label: &str) -> Option<&'a str> {
	let wanted = label.trim();
	if wanted.is_empty() {
		return None;
	}
	nodes
		.iter()
		.find(|n| n.label.trim() == wanted)
		.map(|n| n.id.as_str())
}

fn find_by_id_or_label<'a>(nodes: &'a [GraphNode], reference: &str) -> Option<&'a str> {
	nodes
		.iter()
		.find(|n| n.id == reference)
		.map(|n| n.id.as_str())
		.or_else(|| find_by_label(nodes, reference))
}

/// Builds the unified graph from the three record collections.
///
/// Never fails: records that cannot be used are skipped, missing ids are
/// generated, and relations that do not resolve to a node are dropped.
pub fn build(projects: &[Record], technologies: &[Record], floods: &[Record]) -> GraphData {
	let sources: Vec<(NodeKind, &Record)> = projects
		.iter()
		.map(|r| (NodeKind::Project, r))
		.chain(technologies.iter().map(|r| (NodeKind::Tech, r)))
		.chain(floods.iter().map(|r| (NodeKind::Flood, r)))
		.collect();

	let mut ids = IdAllocator::new(sources.iter().filter_map(|(_, r)| r.explicit_id()));
	let mut seen = HashSet::new();
	let nodes: Vec<GraphNode> = sources
		.iter()
		.map(|&(kind, record)| {
			let id = match record.explicit_id() {
				Some(id) if seen.insert(id.to_owned()) => id.to_owned(),
				Some(id) => {
					let fresh = ids.fresh(id);
					warn!("duplicate node id {:?}, renamed to {:?}", id, fresh);
					fresh
				}
				None => ids.fresh(kind.id_prefix()),
			};
			node_from(record, kind, id)
		})
		.collect();

	let mut edges = Vec::new();
	let mut link = |source: &str, target: Option<&str>, kind: EdgeKind, reference: &str| {
		match target {
			Some(target) => edges.push(GraphEdge {
				source: source.to_owned(),
				target: target.to_owned(),
				kind,
			}),
			None => debug!(
				"dropping {:?} edge from {:?}: no node matches {:?}",
				kind, source, reference
			),
		}
	};

	for ((kind, record), node) in sources.iter().zip(&nodes) {
		match kind {
			NodeKind::Project => {
				if let Some(prev) = non_blank(record.prev_project.as_deref()) {
					link(&node.id, find_by_label(&nodes, prev), EdgeKind::Precedes, prev);
				}
				if let Some(next) = non_blank(record.next_project.as_deref()) {
					link(&node.id, find_by_label(&nodes, next), EdgeKind::Follows, next);
				}
				for tech in &record.tech_chain {
					link(&node.id, find_by_label(&nodes, tech), EdgeKind::Applies, tech);
				}
			}
			NodeKind::Tech | NodeKind::Flood => {
				for related in &record.related {
					let target = find_by_id_or_label(&nodes, related);
					link(&node.id, target, EdgeKind::Related, related);
				}
			}
		}
	}

	let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	edges.retain(|e| known.contains(e.source.as_str()) && known.contains(e.target.as_str()));

	info!("built graph: {} nodes, {} edges", nodes.len(), edges.len());
	GraphData { nodes, edges }
}

/// Coerces the raw JSON collections and builds the graph from them.
pub fn build_from_json(projects: &Value, technologies: &Value, floods: &Value) -> GraphData {
	build(
		&coerce_collection("projects", projects),
		&coerce_collection("technologies", technologies),
		&coerce_collection("floods", floods),
	)
}
