pub mod detail_panel;
pub mod force_graph;
pub mod legend;
pub mod time_range;
