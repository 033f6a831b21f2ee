use serde::{Deserialize, Serialize};

use super::normalize::TimeInterval;
use super::record::Record;

/// Which source collection a node came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// 水利工程, from the projects collection.
	Project,
	/// 水利技术, from the technologies collection.
	Tech,
	/// 水灾记录, from the floods collection.
	Flood,
}

impl NodeKind {
	/// Every kind, in legend order.
	pub const ALL: [NodeKind; 3] = [NodeKind::Project, NodeKind::Tech, NodeKind::Flood];

	/// Display name shown in tooltips, the legend and the detail panel.
	pub fn label(self) -> &'static str {
		match self {
			NodeKind::Project => "水利工程",
			NodeKind::Tech => "水利技术",
			NodeKind::Flood => "水灾记录",
		}
	}

	/// Lowercase identifier, as serialized.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Project => "project",
			NodeKind::Tech => "tech",
			NodeKind::Flood => "flood",
		}
	}

	/// Prefix for generated ids.
	pub(crate) fn id_prefix(self) -> &'static str {
		match self {
			NodeKind::Project => "project",
			NodeKind::Tech => "tech",
			NodeKind::Flood => "disaster",
		}
	}
}

/// Relation carried by an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
	/// From a `prevProject` reference.
	Precedes,
	/// From a `nextProject` reference.
	Follows,
	/// From a `techChain` entry.
	Applies,
	/// From a `related` entry.
	Related,
}

impl EdgeKind {
	/// Relation name drawn on highlighted edges.
	pub fn label(self) -> &'static str {
		match self {
			EdgeKind::Precedes => "前序",
			EdgeKind::Follows => "后续",
			EdgeKind::Applies => "应用",
			EdgeKind::Related => "相关",
		}
	}
}

/// A dated record placed in the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique id within the graph.
	pub id: String,
	/// Display name.
	pub label: String,
	/// Source collection.
	pub kind: NodeKind,
	/// Category or type text of the record.
	pub category: String,
	/// Raw year text as given by the record (`period` for technologies).
	pub year: String,
	/// Details text of the record.
	pub details: String,
	/// Normalized date.
	pub interval: TimeInterval,
	/// The record the node was built from.
	pub original: Record,
}

/// A directed relation between two nodes, by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Id of the node the relation starts from.
	pub source: String,
	/// Id of the node the relation points at.
	pub target: String,
	/// Relation type.
	pub kind: EdgeKind,
}

/// Nodes plus the edges between them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// All nodes, in build order.
	pub nodes: Vec<GraphNode>,
	/// Edges whose endpoints are both in `nodes`.
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node with the given id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

#[cfg(test)]
impl GraphData {
	/// Undated project nodes labelled by their ids, joined by `related` edges.
	pub(crate) fn fixture(ids: &[&str], links: &[(&str, &str)]) -> Self {
		GraphData {
			nodes: ids
				.iter()
				.map(|id| GraphNode {
					id: id.to_string(),
					label: id.to_string(),
					kind: NodeKind::Project,
					category: String::new(),
					year: String::new(),
					details: String::new(),
					interval: TimeInterval::default(),
					original: Record::default(),
				})
				.collect(),
			edges: links
				.iter()
				.map(|(s, t)| GraphEdge {
					source: s.to_string(),
					target: t.to_string(),
					kind: EdgeKind::Related,
				})
				.collect(),
		}
	}
}
