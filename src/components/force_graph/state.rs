use crate::knowledge::{GraphData, GraphNode};

use super::render_state::{self, RenderState, fixed_status};
use super::simulation::{ForceSimulation, NodeState, SimulationParameters};

pub const NODE_RADIUS: f64 = 20.0;
pub const HIT_RADIUS: f64 = 22.0;

/// Which nodes the pointer is working with. Each slot holds at most one id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
	pub dragged: Option<String>,
	pub hovered: Option<String>,
	pub selected: Option<String>,
}

impl InteractionState {
	pub fn is_emphasized(&self, id: &str) -> bool {
		self.hovered.as_deref() == Some(id) || self.selected.as_deref() == Some(id)
	}
}

/// The selected node as reported to the page.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
	pub node: GraphNode,
	pub fixed: bool,
	pub status: &'static str,
}

#[derive(Clone, Debug, Default)]
pub struct HighlightFade {
	pub t: f64,
	delay_t: f64,
}

/// Everything the canvas needs between frames: the layout, the pointer
/// interaction and the visible graph it was built from.
pub struct ForceGraphState {
	pub simulation: ForceSimulation,
	pub interaction: InteractionState,
	pub graph: GraphData,
	pub fade: HighlightFade,
	pub pointer: (f64, f64),
	pub width: f64,
	pub height: f64,
	reported: Option<(String, NodeState)>,
}

impl ForceGraphState {
	pub fn new(
		data: &GraphData,
		width: f64,
		height: f64,
		params: SimulationParameters,
		seed: u64,
	) -> Self {
		let mut simulation = ForceSimulation::new(params, width, height, seed);
		simulation.sync(data);
		Self {
			simulation,
			interaction: InteractionState::default(),
			graph: data.clone(),
			fade: HighlightFade::default(),
			pointer: (0.0, 0.0),
			width,
			height,
			reported: None,
		}
	}

	/// Replaces the visible graph. Interaction slots pointing at nodes that
	/// are gone are cleared; returns true when that dropped the selection.
	pub fn sync_graph(&mut self, data: &GraphData) -> bool {
		self.simulation.sync(data);
		self.graph = data.clone();

		let sim = &self.simulation;
		let gone = |slot: &mut Option<String>| {
			if slot.as_deref().is_some_and(|id| sim.node(id).is_none()) {
				*slot = None;
				true
			} else {
				false
			}
		};
		gone(&mut self.interaction.dragged);
		gone(&mut self.interaction.hovered);
		gone(&mut self.interaction.selected)
	}

	/// Topmost node under the pointer.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<String> {
		self.simulation
			.nodes()
			.iter()
			.rev()
			.find(|n| {
				let (dx, dy) = (n.x - x, n.y - y);
				(dx * dx + dy * dy).sqrt() < HIT_RADIUS
			})
			.map(|n| n.id.clone())
	}

	pub fn selected_node(&self) -> Option<&GraphNode> {
		self.interaction
			.selected
			.as_deref()
			.and_then(|id| self.graph.node(id))
	}

	/// Selects a node (or clears the selection); returns whether it changed.
	pub fn select(&mut self, id: Option<String>) -> bool {
		if self.interaction.selected == id {
			return false;
		}
		self.interaction.selected = id;
		true
	}

	pub fn set_hover(&mut self, id: Option<String>) {
		if self.interaction.hovered == id {
			return;
		}
		if self.interaction.hovered.is_none() && self.interaction.selected.is_none() {
			self.fade.delay_t = 0.0;
		}
		self.interaction.hovered = id;
	}

	/// Starts dragging the node under the pointer, selecting it. Returns true
	/// when the selection changed.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
		self.pointer = (x, y);
		let Some(id) = self.node_at_position(x, y) else {
			return false;
		};
		self.simulation.apply_drag(&id, x, y);
		self.interaction.dragged = Some(id.clone());
		self.select(Some(id))
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		self.pointer = (x, y);
		match self.interaction.dragged.as_deref() {
			Some(id) => {
				self.simulation.apply_drag(id, x, y);
			}
			None => {
				let hovered = self.node_at_position(x, y);
				self.set_hover(hovered);
			}
		}
	}

	/// Ends a drag; the node stays pinned where it was dropped.
	pub fn pointer_up(&mut self) {
		if let Some(id) = self.interaction.dragged.take() {
			self.simulation.pin(&id);
		}
	}

	/// The pointer left the canvas: finish any drag (pinning) and drop hover.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Releases a pinned node under the pointer.
	pub fn double_click(&mut self, x: f64, y: f64) -> bool {
		match self.node_at_position(x, y) {
			Some(id) => self.simulation.unpin(&id),
			None => false,
		}
	}

	pub fn selection(&self) -> Option<Selection> {
		let node = self.selected_node()?;
		let state = self.node_state(&node.id)?;
		Some(Selection {
			node: node.clone(),
			fixed: state == NodeState::Fixed,
			status: fixed_status(state),
		})
	}

	/// Returns the current selection if it, or its pin state, changed since
	/// the last call.
	pub fn take_selection_change(&mut self) -> Option<Option<Selection>> {
		let key = self
			.interaction
			.selected
			.as_deref()
			.and_then(|id| Some((id.to_owned(), self.node_state(id)?)));
		if key == self.reported {
			return None;
		}
		self.reported = key;
		Some(self.selection())
	}

	pub fn node_state(&self, id: &str) -> Option<NodeState> {
		self.simulation.node(id).map(|n| n.state)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.interaction.hovered.is_some() || self.interaction.selected.is_some()
	}

	pub fn render_state(&self) -> RenderState {
		render_state::derive(&self.interaction, &self.simulation, &self.graph, self.pointer)
	}

	pub fn tick(&mut self, dt: f64) {
		self.simulation.step(dt);

		let (target, delay, speed) = if self.has_active_highlight() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.has_active_highlight() {
			self.fade.delay_t = (self.fade.delay_t + dt).min(delay);
			if self.fade.delay_t >= delay {
				self.fade.t += (target - self.fade.t) * speed * dt;
			}
		} else {
			self.fade.t += (target - self.fade.t) * speed * dt;
			if self.fade.t < 0.01 {
				self.fade.t = 0.0;
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state(ids: &[&str], links: &[(&str, &str)]) -> ForceGraphState {
		let mut s = ForceGraphState::new(
			&GraphData::fixture(ids, links),
			800.0,
			600.0,
			SimulationParameters::default(),
			5,
		);
		// Spread nodes on a line so hit testing is unambiguous.
		for (i, id) in ids.iter().enumerate() {
			s.simulation.apply_drag(id, 100.0 + 150.0 * i as f64, 300.0);
			s.simulation.pin(id);
			s.simulation.unpin(id);
		}
		s
	}

	fn pos(s: &ForceGraphState, id: &str) -> (f64, f64) {
		let n = s.simulation.node(id).unwrap();
		(n.x, n.y)
	}

	#[test]
	fn drag_selects_moves_and_pins() {
		let mut s = state(&["a", "b"], &[("a", "b")]);
		let (ax, ay) = pos(&s, "a");
		assert!(s.pointer_down(ax + 5.0, ay));
		assert_eq!(s.interaction.dragged.as_deref(), Some("a"));
		assert_eq!(s.interaction.selected.as_deref(), Some("a"));
		assert_eq!(s.node_state("a"), Some(NodeState::Dragging));

		s.pointer_move(500.0, 120.0);
		assert_eq!(pos(&s, "a"), (500.0, 120.0));
		s.tick(1.0 / 60.0);
		assert_eq!(pos(&s, "a"), (500.0, 120.0));

		s.pointer_up();
		assert_eq!(s.interaction.dragged, None);
		assert_eq!(s.node_state("a"), Some(NodeState::Fixed));
		let a = s.simulation.node("a").unwrap();
		assert_eq!((a.vx, a.vy), (0.0, 0.0));
		for _ in 0..100 {
			s.tick(1.0 / 60.0);
		}
		assert_eq!(pos(&s, "a"), (500.0, 120.0));
	}

	#[test]
	fn leaving_canvas_pins_and_clears_hover() {
		let mut s = state(&["a", "b"], &[]);
		let (bx, by) = pos(&s, "b");
		s.pointer_move(bx, by);
		assert_eq!(s.interaction.hovered.as_deref(), Some("b"));
		s.pointer_down(bx, by);
		s.pointer_leave();
		assert_eq!(s.node_state("b"), Some(NodeState::Fixed));
		assert_eq!(s.interaction.hovered, None);
		assert_eq!(s.interaction.selected.as_deref(), Some("b"));
	}

	#[test]
	fn double_click_unpins() {
		let mut s = state(&["a"], &[]);
		let (ax, ay) = pos(&s, "a");
		s.pointer_down(ax, ay);
		s.pointer_up();
		assert!(s.double_click(ax, ay));
		assert_eq!(s.node_state("a"), Some(NodeState::Free));
		assert!(!s.double_click(ax, ay));
		assert!(!s.double_click(5.0, 5.0));
	}

	#[test]
	fn hover_ignored_while_dragging() {
		let mut s = state(&["a", "b"], &[]);
		let (ax, ay) = pos(&s, "a");
		let (bx, by) = pos(&s, "b");
		s.pointer_down(ax, ay);
		s.pointer_move(bx + 40.0, by);
		assert_eq!(s.interaction.hovered, None);
	}

	#[test]
	fn pressing_selected_node_keeps_selection() {
		let mut s = state(&["a", "b"], &[]);
		let (ax, ay) = pos(&s, "a");
		assert!(s.pointer_down(ax, ay));
		s.pointer_up();
		assert!(!s.pointer_down(ax, ay));
		s.pointer_up();
		let (bx, by) = pos(&s, "b");
		assert!(s.pointer_down(bx, by));
		assert_eq!(s.interaction.selected.as_deref(), Some("b"));
	}

	#[test]
	fn sync_drops_vanished_selection() {
		let mut s = state(&["a", "b"], &[]);
		s.select(Some("b".into()));
		s.set_hover(Some("a".into()));
		assert!(!s.sync_graph(&GraphData::fixture(&["a", "b", "c"], &[])));
		assert!(s.sync_graph(&GraphData::fixture(&["a"], &[])));
		assert_eq!(s.interaction.selected, None);
		assert_eq!(s.interaction.hovered.as_deref(), Some("a"));
	}

	#[test]
	fn selection_changes_are_reported_once() {
		let mut s = state(&["a", "b"], &[]);
		assert_eq!(s.take_selection_change(), None);
		let (ax, ay) = pos(&s, "a");
		s.pointer_down(ax, ay);
		let picked = s.take_selection_change().unwrap().unwrap();
		assert_eq!(picked.node.id, "a");
		assert_eq!(picked.status, "拖动中");
		assert_eq!(s.take_selection_change(), None);

		s.pointer_up();
		let pinned = s.take_selection_change().unwrap().unwrap();
		assert!(pinned.fixed);
		assert_eq!(pinned.status, "已固定 (双击解锁)");

		s.double_click(ax, ay);
		assert!(!s.take_selection_change().unwrap().unwrap().fixed);

		s.sync_graph(&GraphData::fixture(&["b"], &[]));
		assert_eq!(s.take_selection_change(), Some(None));
		assert_eq!(s.take_selection_change(), None);
	}

	#[test]
	fn fade_follows_highlight() {
		let mut s = state(&["a"], &[]);
		s.set_hover(Some("a".into()));
		for _ in 0..120 {
			s.tick(1.0 / 60.0);
		}
		assert!(s.fade.t > 0.5);
		s.set_hover(None);
		for _ in 0..600 {
			s.tick(1.0 / 60.0);
		}
		assert_eq!(s.fade.t, 0.0);
	}
}
