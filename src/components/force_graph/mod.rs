//! Canvas force-directed graph: simulation, interaction and drawing.

mod component;
mod render;
mod render_state;
mod simulation;
mod state;

pub use component::ForceGraphCanvas;
pub use render_state::{FALLBACK_COLOR, node_color};
pub use simulation::SimulationParameters;
pub use state::Selection;
