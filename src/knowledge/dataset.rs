use log::info;
use serde_json::Value;

use super::builder::build;
use super::error::LoadError;
use super::record::coerce_collection;
use super::types::GraphData;

const PROJECTS: &str = include_str!("../../data/projects.json");
const TECHNOLOGIES: &str = include_str!("../../data/technologies.json");
const FLOODS: &str = include_str!("../../data/floods.json");

fn parse(collection: &'static str, text: &str) -> Result<Value, LoadError> {
	serde_json::from_str(text).map_err(|source| LoadError::Json { collection, source })
}

/// Builds the full graph from three raw collections.
///
/// Unlike [`build`], an input with nothing usable in it is an error here.
pub fn load(projects: &Value, technologies: &Value, floods: &Value) -> Result<GraphData, LoadError> {
	let projects = coerce_collection("projects", projects);
	let technologies = coerce_collection("technologies", technologies);
	let floods = coerce_collection("floods", floods);
	info!(
		"loaded {} projects, {} technologies, {} floods",
		projects.len(),
		technologies.len(),
		floods.len()
	);
	if projects.is_empty() && technologies.is_empty() && floods.is_empty() {
		return Err(LoadError::NoRecords);
	}

	let graph = build(&projects, &technologies, &floods);
	if graph.is_empty() {
		return Err(LoadError::NoNodes);
	}
	Ok(graph)
}

/// The graph shipped with the application.
pub fn bundled() -> Result<GraphData, LoadError> {
	load(
		&parse("projects", PROJECTS)?,
		&parse("technologies", TECHNOLOGIES)?,
		&parse("floods", FLOODS)?,
	)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::knowledge::filter::{TimeRange, filter};
	use serde_json::json;

	#[test]
	fn nothing_to_load_is_an_error() {
		let err = load(&Value::Null, &json!([]), &json!([null])).unwrap_err();
		assert!(matches!(err, LoadError::NoRecords));
	}

	#[test]
	fn one_collection_is_enough() {
		let graph = load(&json!([{ "id": "x", "label": "灵渠" }]), &Value::Null, &Value::Null).unwrap();
		assert_eq!(graph.nodes.len(), 1);
	}

	#[test]
	fn bad_json_names_the_collection() {
		let err = parse("floods", "[{").unwrap_err();
		assert!(err.to_string().contains("floods"));
	}

	#[test]
	fn bundled_data_is_consistent() {
		let graph = bundled().unwrap();
		assert!(graph.nodes.len() > 10);
		assert!(!graph.edges.is_empty());

		let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), graph.nodes.len());
		for e in &graph.edges {
			assert!(ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()));
		}

		let all = filter(&graph.nodes, &graph.edges, TimeRange::full(), None);
		assert_eq!(all.nodes.len(), graph.nodes.len());
	}
}
