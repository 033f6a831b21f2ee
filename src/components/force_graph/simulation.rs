//! Continuous force-directed layout.
//!
//! Every tick each free node feels Coulomb-like repulsion from all other nodes,
//! Hooke springs along its edges, a weak pull toward the canvas centre and a
//! little jitter. Repulsion is all-pairs, so a tick costs O(n²); past a few
//! hundred nodes a Barnes-Hut quadtree would be the next step.

use std::collections::HashMap;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::knowledge::{EdgeKind, GraphData};

/// Physics constants. One unit of force changes velocity by one pixel per frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
	/// Coulomb constant between every pair of nodes.
	pub repulsion: f64,
	/// Rest length of an edge, in pixels.
	pub spring_length: f64,
	/// Hooke constant of an edge.
	pub spring_strength: f64,
	/// Extra factor damping every spring.
	pub edge_strength: f64,
	/// Velocity kept per frame.
	pub damping: f64,
	/// Pull toward the canvas centre per pixel of distance.
	pub center_gravity: f64,
	/// Width of the uniform random force.
	pub jitter: f64,
	/// Distance kept between a node centre and the canvas edges.
	pub wall_padding: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		Self {
			repulsion: 1500.0,
			spring_length: 150.0,
			spring_strength: 0.03,
			edge_strength: 0.6,
			damping: 0.85,
			center_gravity: 0.005,
			jitter: 0.3,
			wall_padding: 30.0,
		}
	}
}

/// Where a node is in its drag/pin lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
	#[default]
	Free,
	Dragging,
	Fixed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub state: NodeState,
}

impl SimNode {
	pub fn is_fixed(&self) -> bool {
		self.state == NodeState::Fixed
	}

	fn moves(&self) -> bool {
		self.state == NodeState::Free
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimEdge {
	pub source: usize,
	pub target: usize,
	pub kind: EdgeKind,
}

/// Positions and velocities of the visible nodes, looked up by stable id.
pub struct ForceSimulation {
	params: SimulationParameters,
	nodes: Vec<SimNode>,
	index: HashMap<String, usize>,
	edges: Vec<SimEdge>,
	/// Edge indices incident to each node.
	incident: Vec<Vec<usize>>,
	width: f64,
	height: f64,
	rng: SmallRng,
}

impl ForceSimulation {
	pub fn new(params: SimulationParameters, width: f64, height: f64, seed: u64) -> Self {
		Self {
			params,
			nodes: Vec::new(),
			index: HashMap::new(),
			edges: Vec::new(),
			incident: Vec::new(),
			width,
			height,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[SimEdge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Rebuilds the node table for a new visible graph.
	///
	/// Nodes that were already present keep their position, velocity and
	/// state; new ones start at a random spot inside the central 90% of the
	/// canvas with a small random velocity. Edges whose endpoints are not
	/// visible are skipped.
	pub fn sync(&mut self, graph: &GraphData) {
		let mut previous: HashMap<String, SimNode> = self
			.nodes
			.drain(..)
			.map(|n| (n.id.clone(), n))
			.collect();

		let (w, h) = (self.width, self.height);
		let mut nodes = Vec::with_capacity(graph.nodes.len());
		let mut index = HashMap::with_capacity(graph.nodes.len());
		let mut kept = 0;
		for node in &graph.nodes {
			if index.contains_key(&node.id) {
				continue;
			}
			if previous.contains_key(&node.id) {
				kept += 1;
			}
			let sim = previous.remove(&node.id).unwrap_or_else(|| SimNode {
				id: node.id.clone(),
				x: self.rng.gen_range(0.05..0.95) * w,
				y: self.rng.gen_range(0.05..0.95) * h,
				vx: (self.rng.r#gen::<f64>() - 0.5) * 5.0,
				vy: (self.rng.r#gen::<f64>() - 0.5) * 5.0,
				state: NodeState::Free,
			});
			index.insert(node.id.clone(), nodes.len());
			nodes.push(sim);
		}

		let mut edges = Vec::with_capacity(graph.edges.len());
		let mut incident = vec![Vec::new(); nodes.len()];
		for edge in &graph.edges {
			let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target))
			else {
				debug!("skipping edge {} -> {}: endpoint not in layout", edge.source, edge.target);
				continue;
			};
			incident[source].push(edges.len());
			if target != source {
				incident[target].push(edges.len());
			}
			edges.push(SimEdge {
				source,
				target,
				kind: edge.kind,
			});
		}

		debug!(
			"layout synced: {} nodes ({} kept), {} edges",
			nodes.len(),
			kept,
			edges.len()
		);
		self.nodes = nodes;
		self.index = index;
		self.edges = edges;
		self.incident = incident;
	}

	fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
		let pad = self.params.wall_padding;
		let clamp_axis = |v: f64, max: f64| {
			if max - pad > pad {
				v.clamp(pad, max - pad)
			} else {
				max / 2.0
			}
		};
		(clamp_axis(x, self.width), clamp_axis(y, self.height))
	}

	/// Net force on node `i` from the current positions.
	fn force_on(&mut self, i: usize) -> (f64, f64) {
		let p = &self.params;
		let node = &self.nodes[i];
		let (mut fx, mut fy) = (0.0, 0.0);

		for (j, other) in self.nodes.iter().enumerate() {
			if j == i {
				continue;
			}
			let (dx, dy) = (node.x - other.x, node.y - other.y);
			let dist = (dx * dx + dy * dy).sqrt().max(1.0);
			let force = p.repulsion / (dist * dist);
			fx += dx / dist * force;
			fy += dy / dist * force;
		}

		for &e in &self.incident[i] {
			let edge = self.edges[e];
			let other = if edge.source == i {
				edge.target
			} else {
				edge.source
			};
			let Some(other) = self.nodes.get(other) else {
				continue;
			};
			let (dx, dy) = (node.x - other.x, node.y - other.y);
			let dist = (dx * dx + dy * dy).sqrt().max(1.0);
			let force = (dist - p.spring_length) * p.spring_strength * p.edge_strength;
			fx -= dx / dist * force;
			fy -= dy / dist * force;
		}

		let (dx, dy) = (node.x - self.width / 2.0, node.y - self.height / 2.0);
		fx -= dx * p.center_gravity;
		fy -= dy * p.center_gravity;

		let jitter = p.jitter;
		fx += (self.rng.r#gen::<f64>() - 0.5) * jitter;
		fy += (self.rng.r#gen::<f64>() - 0.5) * jitter;
		(fx, fy)
	}

	/// Advances the layout by `dt` seconds (one frame is 1/60 s).
	///
	/// Dragging and fixed nodes are never moved here, though they still push
	/// and pull the free ones.
	pub fn step(&mut self, dt: f64) {
		if self.nodes.is_empty() {
			return;
		}
		let frames = (dt * 60.0).clamp(0.0, 3.0);
		let forces: Vec<Option<(f64, f64)>> = (0..self.nodes.len())
			.map(|i| self.nodes[i].moves().then(|| self.force_on(i)))
			.collect();

		let damping = self.params.damping;
		for i in 0..self.nodes.len() {
			let Some((fx, fy)) = forces[i] else {
				continue;
			};
			let node = &mut self.nodes[i];
			node.vx = (node.vx + fx * frames) * damping;
			node.vy = (node.vy + fy * frames) * damping;
			let (x, y) = (node.x + node.vx * frames, node.y + node.vy * frames);
			let (cx, cy) = self.clamp(x, y);
			let node = &mut self.nodes[i];
			// Hitting a wall stops motion along that axis.
			if cx != x {
				node.vx = 0.0;
			}
			if cy != y {
				node.vy = 0.0;
			}
			node.x = cx;
			node.y = cy;
		}
	}

	/// Moves a node straight to the pointer and marks it as being dragged.
	pub fn apply_drag(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let (x, y) = self.clamp(x, y);
		let node = &mut self.nodes[i];
		node.x = x;
		node.y = y;
		node.vx = 0.0;
		node.vy = 0.0;
		node.state = NodeState::Dragging;
		true
	}

	/// Pins a node where it is.
	pub fn pin(&mut self, id: &str) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.state = NodeState::Fixed;
		node.vx = 0.0;
		node.vy = 0.0;
		true
	}

	/// Releases a pinned node with a nudge so it drifts back into the layout.
	pub fn unpin(&mut self, id: &str) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let (vx, vy) = (
			(self.rng.r#gen::<f64>() - 0.5) * 2.0,
			(self.rng.r#gen::<f64>() - 0.5) * 2.0,
		);
		let node = &mut self.nodes[i];
		if node.state != NodeState::Fixed {
			return false;
		}
		node.state = NodeState::Free;
		node.vx = vx;
		node.vy = vy;
		true
	}

	/// Changes the canvas size; nodes outside the new walls are pulled in.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		for i in 0..self.nodes.len() {
			let (x, y) = self.clamp(self.nodes[i].x, self.nodes[i].y);
			self.nodes[i].x = x;
			self.nodes[i].y = y;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const W: f64 = 800.0;
	const H: f64 = 600.0;

	fn sim(ids: &[&str], links: &[(&str, &str)]) -> ForceSimulation {
		let mut sim = ForceSimulation::new(SimulationParameters::default(), W, H, 7);
		sim.sync(&GraphData::fixture(ids, links));
		sim
	}

	fn place(sim: &mut ForceSimulation, id: &str, x: f64, y: f64) {
		let i = sim.index[id];
		sim.nodes[i].x = x;
		sim.nodes[i].y = y;
		sim.nodes[i].vx = 0.0;
		sim.nodes[i].vy = 0.0;
	}

	fn quiet() -> SimulationParameters {
		SimulationParameters {
			jitter: 0.0,
			center_gravity: 0.0,
			..SimulationParameters::default()
		}
	}

	#[test]
	fn parameters_from_partial_json() {
		let params: SimulationParameters =
			serde_json::from_str(r#"{"repulsion": 900.0, "wall_padding": 10.0}"#).unwrap();
		assert_eq!(params.repulsion, 900.0);
		assert_eq!(params.wall_padding, 10.0);
		assert_eq!(params.spring_length, 150.0);
		assert_eq!(params.damping, 0.85);
	}

	#[test]
	fn initial_positions_inside_canvas() {
		let sim = sim(&["a", "b", "c", "d"], &[]);
		for n in sim.nodes() {
			assert!(n.x >= 0.05 * W && n.x <= 0.95 * W);
			assert!(n.y >= 0.05 * H && n.y <= 0.95 * H);
			assert!(n.vx.abs() <= 2.5 && n.vy.abs() <= 2.5);
			assert_eq!(n.state, NodeState::Free);
		}
	}

	#[test]
	fn repulsion_pushes_apart() {
		let mut sim = ForceSimulation::new(quiet(), W, H, 1);
		sim.sync(&GraphData::fixture(&["a", "b"], &[]));
		place(&mut sim, "a", 390.0, 300.0);
		place(&mut sim, "b", 410.0, 300.0);
		sim.step(1.0 / 60.0);
		assert!(sim.node("a").unwrap().x < 390.0);
		assert!(sim.node("b").unwrap().x > 410.0);
	}

	#[test]
	fn coincident_nodes_do_not_explode() {
		let mut sim = ForceSimulation::new(quiet(), W, H, 1);
		sim.sync(&GraphData::fixture(&["a", "b"], &[]));
		place(&mut sim, "a", 400.0, 300.0);
		place(&mut sim, "b", 400.0, 300.0);
		sim.step(1.0 / 60.0);
		for n in sim.nodes() {
			assert!(n.x.is_finite() && n.y.is_finite());
		}
	}

	#[test]
	fn spring_pulls_long_edge_together() {
		let params = SimulationParameters {
			repulsion: 0.0,
			..quiet()
		};
		let mut sim = ForceSimulation::new(params, W, H, 1);
		sim.sync(&GraphData::fixture(&["a", "b"], &[("a", "b")]));
		place(&mut sim, "a", 100.0, 300.0);
		place(&mut sim, "b", 700.0, 300.0);
		sim.step(1.0 / 60.0);
		let expected = (600.0 - 150.0) * 0.03 * 0.6 * 0.85;
		assert!((sim.node("a").unwrap().x - (100.0 + expected)).abs() < 1e-9);
		assert!((sim.node("b").unwrap().x - (700.0 - expected)).abs() < 1e-9);
	}

	#[test]
	fn center_gravity_scales_with_distance() {
		let params = SimulationParameters {
			repulsion: 0.0,
			jitter: 0.0,
			..SimulationParameters::default()
		};
		let mut sim = ForceSimulation::new(params, W, H, 1);
		sim.sync(&GraphData::fixture(&["near", "far"], &[]));
		place(&mut sim, "near", 410.0, 300.0);
		place(&mut sim, "far", 700.0, 300.0);
		sim.step(1.0 / 60.0);
		let near = 410.0 - sim.node("near").unwrap().x;
		let far = 700.0 - sim.node("far").unwrap().x;
		assert!(near > 0.0 && far > near * 20.0);
	}

	#[test]
	fn walls_hold_nodes() {
		let params = SimulationParameters {
			repulsion: 1.0e9,
			..SimulationParameters::default()
		};
		let mut sim = ForceSimulation::new(params, W, H, 3);
		sim.sync(&GraphData::fixture(&["a", "b", "c"], &[]));
		for _ in 0..200 {
			sim.step(1.0 / 60.0);
			for n in sim.nodes() {
				assert!(n.x >= 30.0 && n.x <= W - 30.0);
				assert!(n.y >= 30.0 && n.y <= H - 30.0);
			}
		}
	}

	#[test]
	fn pinned_node_never_moves() {
		let mut sim = sim(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
		sim.apply_drag("b", 200.0, 200.0);
		sim.pin("b");
		for _ in 0..500 {
			sim.step(1.0 / 60.0);
			let b = sim.node("b").unwrap();
			assert_eq!((b.x, b.y), (200.0, 200.0));
			assert_eq!(b.state, NodeState::Fixed);
		}
	}

	#[test]
	fn dragged_node_ignores_forces_but_pushes_others() {
		let mut sim = ForceSimulation::new(quiet(), W, H, 1);
		sim.sync(&GraphData::fixture(&["a", "b"], &[]));
		place(&mut sim, "b", 420.0, 300.0);
		sim.apply_drag("a", 400.0, 300.0);
		sim.step(1.0 / 60.0);
		let a = sim.node("a").unwrap();
		assert_eq!((a.x, a.y, a.state), (400.0, 300.0, NodeState::Dragging));
		assert!(sim.node("b").unwrap().x > 420.0);
	}

	#[test]
	fn unpin_only_releases_fixed_nodes() {
		let mut sim = sim(&["a"], &[]);
		assert!(!sim.unpin("a"));
		sim.pin("a");
		assert!(sim.unpin("a"));
		let a = sim.node("a").unwrap();
		assert_eq!(a.state, NodeState::Free);
		assert!(a.vx.abs() <= 1.0 && a.vy.abs() <= 1.0);
		assert!(!sim.pin("missing"));
		assert!(!sim.apply_drag("missing", 1.0, 1.0));
	}

	#[test]
	fn sync_keeps_surviving_nodes() {
		let mut sim = sim(&["a", "b", "c"], &[("a", "b")]);
		sim.apply_drag("a", 123.0, 234.0);
		sim.pin("a");
		sim.sync(&GraphData::fixture(&["a", "d"], &[("a", "b"), ("a", "d")]));
		assert_eq!(sim.nodes().len(), 2);
		let a = sim.node("a").unwrap();
		assert_eq!((a.x, a.y, a.state), (123.0, 234.0, NodeState::Fixed));
		assert!(sim.node("b").is_none());
		assert_eq!(sim.edges().len(), 1);
	}

	#[test]
	fn energy_settles() {
		let mut sim = ForceSimulation::new(
			SimulationParameters {
				jitter: 0.0,
				..SimulationParameters::default()
			},
			W,
			H,
			11,
		);
		sim.sync(&GraphData::fixture(&["a", "b", "c", "d", "e"], &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")]));
		for _ in 0..2000 {
			sim.step(1.0 / 60.0);
		}
		let speed: f64 = sim.nodes().iter().map(|n| n.vx.abs() + n.vy.abs()).sum();
		assert!(speed < 0.5, "residual speed {}", speed);
	}
}
