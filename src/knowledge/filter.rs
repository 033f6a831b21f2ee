use std::collections::HashSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::chronology::Dynasty;
use super::error::RangeError;
use super::normalize::{leading_year, marked_year};
use super::types::{GraphData, GraphEdge, GraphNode};

/// Ranges wider than this many years also show nodes that carry no date at all.
pub const FULL_SPAN_THRESHOLD: i32 = 2500;

/// Inclusive year range selected by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
	/// First visible year.
	pub start: i32,
	/// Last visible year.
	pub end: i32,
}

impl TimeRange {
	/// Earliest year offered by the range controls.
	pub const MIN_YEAR: i32 = -770;
	/// Latest year offered by the range controls.
	pub const MAX_YEAR: i32 = 1911;

	/// Range from `start` to `end`, unchecked; see [`TimeRange::validate`].
	pub const fn new(start: i32, end: i32) -> Self {
		Self { start, end }
	}

	/// The whole span covered by the controls.
	pub const fn full() -> Self {
		Self::new(Self::MIN_YEAR, Self::MAX_YEAR)
	}

	/// Checks the range as entered through the controls.
	pub fn validate(&self) -> Result<(), RangeError> {
		for year in [self.start, self.end] {
			if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
				return Err(RangeError::OutOfBounds {
					year,
					min: Self::MIN_YEAR,
					max: Self::MAX_YEAR,
				});
			}
		}
		if self.start >= self.end {
			return Err(RangeError::Inverted {
				start: self.start,
				end: self.end,
			});
		}
		Ok(())
	}

	/// True when `year` lies inside the range, bounds included.
	pub fn contains(&self, year: i32) -> bool {
		(self.start..=self.end).contains(&year)
	}

	/// True when `[start, end]` shares at least one year with this range.
	pub fn overlaps(&self, start: i32, end: i32) -> bool {
		!(end < self.start || start > self.end)
	}

	fn is_effectively_unfiltered(&self) -> bool {
		i64::from(self.end) - i64::from(self.start) > i64::from(FULL_SPAN_THRESHOLD)
	}
}

impl Default for TimeRange {
	fn default() -> Self {
		Self::full()
	}
}

/// Best single year for a node that has no normalized interval.
///
/// Looks at the raw year text first, then a dynasty named by the period, then
/// an "N年" in the label.
pub fn representative_year(node: &GraphNode) -> Option<i32> {
	let record = &node.original;
	let year_text = record
		.year
		.as_deref()
		.filter(|y| !y.trim().is_empty())
		.or(Some(node.year.as_str()).filter(|y| !y.trim().is_empty()));
	if let Some(year) = year_text.and_then(leading_year) {
		return Some(year);
	}
	let period = record.period.as_deref().or(record.dynasty.as_deref());
	if let Some(dynasty) = period.and_then(Dynasty::from_alias) {
		return Some(dynasty.representative_year());
	}
	marked_year(&node.label)
}

fn matches_search(node: &GraphNode, term: &str) -> bool {
	let label = node.label.to_lowercase();
	label.contains(term) || node.kind.label().contains(term) || node.kind.as_str().contains(term)
}

fn in_range(node: &GraphNode, range: &TimeRange) -> bool {
	if let Some((start, end)) = node.interval.bounds() {
		return range.overlaps(start, end);
	}
	match representative_year(node) {
		Some(year) => range.contains(year),
		None => range.is_effectively_unfiltered(),
	}
}

/// Returns the part of the graph visible in `range`, optionally narrowed by a
/// case-insensitive search on label or node type.
///
/// An inverted range (`start >= end`) yields the empty graph. Edges survive
/// only when both endpoints do.
pub fn filter(
	nodes: &[GraphNode],
	edges: &[GraphEdge],
	range: TimeRange,
	search: Option<&str>,
) -> GraphData {
	if range.start >= range.end {
		debug!("inverted time range {:?}, showing nothing", range);
		return GraphData::default();
	}

	let term = search
		.map(|s| s.trim().to_lowercase())
		.filter(|s| !s.is_empty());

	let nodes: Vec<GraphNode> = nodes
		.iter()
		.filter(|n| in_range(n, &range))
		.filter(|n| term.as_deref().is_none_or(|t| matches_search(n, t)))
		.cloned()
		.collect();

	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let edges: Vec<GraphEdge> = edges
		.iter()
		.filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
		.cloned()
		.collect();

	info!(
		"filtered {}..={}: {} nodes, {} edges",
		range.start,
		range.end,
		nodes.len(),
		edges.len()
	);
	GraphData { nodes, edges }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::knowledge::builder::build;
	use crate::knowledge::normalize::TimeInterval;
	use crate::knowledge::record::Record;
	use crate::knowledge::types::{EdgeKind, NodeKind};

	fn node(id: &str, interval: TimeInterval) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.into(),
			kind: NodeKind::Project,
			category: "工程".into(),
			year: String::new(),
			details: String::new(),
			interval,
			original: Record::labelled(id),
		}
	}

	fn ids(graph: &GraphData) -> Vec<&str> {
		graph.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn inverted_range_is_empty() {
		let nodes: Vec<GraphNode> = (0..50)
			.map(|i| node(&i.to_string(), TimeInterval::year(75)))
			.collect();
		let edges = vec![GraphEdge {
			source: "0".into(),
			target: "1".into(),
			kind: EdgeKind::Related,
		}];
		assert_eq!(
			filter(&nodes, &edges, TimeRange::new(100, 50), None),
			GraphData::default()
		);
		assert_eq!(
			filter(&nodes, &edges, TimeRange::new(75, 75), None),
			GraphData::default()
		);
	}

	#[test]
	fn partial_overlap() {
		let nodes = vec![node("a", TimeInterval::span(1200, 1300))];
		for (range, expected) in [
			(TimeRange::new(1250, 1400), 1),
			(TimeRange::new(1000, 1210), 1),
			(TimeRange::new(1300, 1400), 1),
			(TimeRange::new(1000, 1200), 1),
			(TimeRange::new(1500, 1600), 0),
			(TimeRange::new(1000, 1199), 0),
		] {
			assert_eq!(filter(&nodes, &[], range, None).nodes.len(), expected, "{:?}", range);
		}
	}

	#[test]
	fn fallback_years() {
		let mut by_year = node("year", TimeInterval::default());
		by_year.original.year = Some("1276-1293 修建".into());
		let mut by_period = node("period", TimeInterval::default());
		by_period.original.period = Some("唐朝".into());
		let mut by_label = node("label", TimeInterval::default());
		by_label.label = "约1600年治理".into();

		assert_eq!(representative_year(&by_year), Some(1276));
		assert_eq!(representative_year(&by_period), Some(763));
		assert_eq!(representative_year(&by_label), Some(1600));

		let nodes = vec![by_year, by_period, by_label];
		let shown = filter(&nodes, &[], TimeRange::new(700, 1300), None);
		assert_eq!(ids(&shown), vec!["year", "period"]);
	}

	#[test]
	fn undated_nodes_only_in_wide_ranges() {
		let nodes = vec![node("undated", TimeInterval::default())];
		assert!(filter(&nodes, &[], TimeRange::new(0, 1000), None).is_empty());
		assert!(!filter(&nodes, &[], TimeRange::new(-770, 1911), None).is_empty());
		assert!(filter(&nodes, &[], TimeRange::new(-589, 1911), None).is_empty());
	}

	#[test]
	fn extreme_range_spans_everything() {
		let nodes = vec![
			node("undated", TimeInterval::default()),
			node("dated", TimeInterval::year(1000)),
		];
		let range = TimeRange::new(-2_000_000_000, 2_000_000_000);
		assert_eq!(filter(&nodes, &[], range, None).nodes.len(), 2);
		let range = TimeRange::new(i32::MIN, i32::MAX);
		assert_eq!(filter(&nodes, &[], range, None).nodes.len(), 2);
	}

	#[test]
	fn search_narrows_by_label_or_type() {
		let mut tech = node("t", TimeInterval::year(100));
		tech.kind = NodeKind::Tech;
		tech.label = "Fish Mouth".into();
		let nodes = vec![node("都江堰", TimeInterval::year(-256)), tech];
		let range = TimeRange::full();
		assert_eq!(ids(&filter(&nodes, &[], range, Some("都江"))), vec!["都江堰"]);
		assert_eq!(ids(&filter(&nodes, &[], range, Some("fish"))), vec!["t"]);
		assert_eq!(ids(&filter(&nodes, &[], range, Some("技术"))), vec!["t"]);
		assert_eq!(ids(&filter(&nodes, &[], range, Some("  "))).len(), 2);
		assert!(filter(&nodes, &[], TimeRange::new(0, 50), Some("fish")).is_empty());
	}

	#[test]
	fn validation() {
		assert_eq!(TimeRange::full().validate(), Ok(()));
		assert_eq!(
			TimeRange::new(100, 50).validate(),
			Err(RangeError::Inverted { start: 100, end: 50 })
		);
		assert!(matches!(
			TimeRange::new(-800, 50).validate(),
			Err(RangeError::OutOfBounds { year: -800, .. })
		));
	}

	#[test]
	fn chain_narrowing_drops_edge() {
		let a = Record {
			id: Some("A".into()),
			year: Some("605".into()),
			next_project: Some("通济渠".into()),
			..Record::labelled("永济渠")
		};
		let b = Record {
			id: Some("B".into()),
			year: Some("1289".into()),
			..Record::labelled("通济渠")
		};
		let c = Record {
			id: Some("C".into()),
			year: Some("1700".into()),
			..Record::labelled("清口枢纽")
		};
		let graph = build(&[a, b, c], &[], &[]);

		let full = filter(&graph.nodes, &graph.edges, TimeRange::new(-800, 2000), None);
		assert_eq!(full.nodes.len(), 3);
		assert_eq!(full.edges.len(), 1);
		assert_eq!(full.edges[0].kind, EdgeKind::Follows);
		assert_eq!((full.edges[0].source.as_str(), full.edges[0].target.as_str()), ("A", "B"));

		let narrow = filter(&graph.nodes, &graph.edges, TimeRange::new(1000, 1500), None);
		assert_eq!(ids(&narrow), vec!["B"]);
		assert!(narrow.edges.is_empty());
	}
}
