use leptos::prelude::*;

use crate::components::force_graph::{FALLBACK_COLOR, node_color};
use crate::knowledge::NodeKind;

/// Colour key for the node types, plus the pinned-node outline.
#[component]
pub fn Legend() -> impl IntoView {
	let swatch = |color: &'static str, label: &'static str| {
		view! {
			<li class="legend-item">
				<span class="legend-swatch" style=format!("background-color: {color};")></span>
				<span>{label}</span>
			</li>
		}
	};

	view! {
		<ul class="legend">
			{NodeKind::ALL
				.into_iter()
				.map(|kind| swatch(node_color(kind), kind.label()))
				.collect_view()}
			{swatch(FALLBACK_COLOR, "其他")}
			<li class="legend-item">
				<span
					class="legend-swatch"
					style="border: 2px dashed #e74c3c; background-color: transparent;"
				></span>
				<span>"已固定 (双击解锁)"</span>
			</li>
		</ul>
	}
}
