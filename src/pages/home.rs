use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use log::{info, warn};

use crate::components::detail_panel::DetailPanel;
use crate::components::force_graph::{ForceGraphCanvas, Selection, SimulationParameters};
use crate::components::legend::Legend;
use crate::components::time_range::TimeRangeControls;
use crate::knowledge::{GraphData, TimeRange, dataset, filter};

/// Layout tuning from the `layout` query parameter, a JSON object that may
/// name any subset of the simulation parameters.
fn layout_parameters(raw: Option<&str>) -> SimulationParameters {
	let Some(raw) = raw else {
		return SimulationParameters::default();
	};
	serde_json::from_str(raw).unwrap_or_else(|err| {
		warn!("ignoring layout parameters {raw:?}: {err}");
		SimulationParameters::default()
	})
}

/// Graph explorer over an already loaded dataset.
#[component]
fn Explorer(graph: GraphData) -> impl IntoView {
	let parameters = use_query_map().with_untracked(|q| layout_parameters(q.get("layout").as_deref()));
	let total = graph.nodes.len();
	let graph = StoredValue::new(graph);

	let start = RwSignal::new(TimeRange::MIN_YEAR);
	let end = RwSignal::new(TimeRange::MAX_YEAR);
	let search = RwSignal::new(String::new());
	let selection = RwSignal::new(None::<Selection>);

	let range = Memo::new(move |_| TimeRange::new(start.get(), end.get()));
	let range_error = Signal::derive(move || range.get().validate().err());
	let visible = Memo::new(move |_| {
		let range = range.get();
		if range.validate().is_err() {
			return GraphData::default();
		}
		search.with(|term| graph.with_value(|g| filter(&g.nodes, &g.edges, range, Some(term.as_str()))))
	});

	let on_select = Callback::new(move |picked: Option<Selection>| {
		if let Some(s) = &picked {
			info!("selected {} ({})", s.node.label, s.node.id);
		}
		selection.set(picked);
	});

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=visible fullscreen=true parameters=parameters on_select=on_select />
			<div class="graph-overlay">
				<h1>"中国古代水利知识图谱"</h1>
				<p class="subtitle">"拖动节点可固定位置，双击已固定的节点解锁。"</p>
				<p class="graph-count">
					{move || format!("显示 {} / {} 个节点", visible.with(|g| g.nodes.len()), total)}
				</p>
				<TimeRangeControls start=start end=end search=search error=range_error />
				<Legend />
			</div>
			<Show when=move || visible.with(GraphData::is_empty)>
				<div class="empty-overlay">"所选时间范围内无数据"</div>
			</Show>
			<DetailPanel selection=selection />
		</div>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let loaded = dataset::bundled().map(|graph| view! { <Explorer graph=graph /> });

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"数据加载失败"</h1>

				<p>"错误: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>{loaded}</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout_query_overrides_defaults() {
		assert_eq!(layout_parameters(None), SimulationParameters::default());
		let tuned = layout_parameters(Some(r#"{"repulsion": 900.0}"#));
		assert_eq!(tuned.repulsion, 900.0);
		assert_eq!(tuned.damping, SimulationParameters::default().damping);
		assert_eq!(layout_parameters(Some("{not json")), SimulationParameters::default());
	}
}
