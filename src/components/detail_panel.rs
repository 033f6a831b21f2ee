use leptos::prelude::*;

use crate::components::force_graph::Selection;
use crate::knowledge::{GraphNode, NodeKind, format_year};

/// Titled block of the panel below the fact list.
#[derive(Clone, Debug, PartialEq)]
enum Section {
	Text(&'static str, String),
	List(&'static str, Vec<String>),
}

fn project_status(status: &str) -> String {
	match status {
		"completed" => "已完成".into(),
		"in-progress" => "进行中".into(),
		"planned" => "规划中".into(),
		"abandoned" => "已废弃".into(),
		other => other.into(),
	}
}

/// Kind-specific `名称: 值` rows, skipping blank fields.
fn kind_facts(node: &GraphNode) -> Vec<(&'static str, String)> {
	let record = &node.original;
	let fields: Vec<(&'static str, Option<String>)> = match node.kind {
		NodeKind::Project => vec![
			("位置", record.extra_text("location")),
			("建造者", record.extra_text("builder")),
			("工程状态", record.extra_text("status").map(|s| project_status(&s))),
			("前期项目", record.prev_project.clone()),
			("后续项目", record.next_project.clone()),
		],
		NodeKind::Tech => vec![("时期", record.period.clone())],
		NodeKind::Flood => Vec::new(),
	};
	fields
		.into_iter()
		.filter_map(|(name, value)| Some((name, value.filter(|v| !v.trim().is_empty())?)))
		.collect()
}

fn sections(node: &GraphNode) -> Vec<Section> {
	let record = &node.original;
	let mut out = Vec::new();
	let texts: &[(&'static str, &str)] = match node.kind {
		NodeKind::Project => &[("收益", "benefits"), ("历史意义", "significance")],
		NodeKind::Tech => &[("创新点", "innovation"), ("技术改进", "improvement")],
		NodeKind::Flood => &[("灾害影响", "impact"), ("应对措施", "response")],
	};
	if node.kind == NodeKind::Project && !record.tech_chain.is_empty() {
		out.push(Section::List("技术链", record.tech_chain.clone()));
	}
	for &(heading, key) in texts {
		if let Some(text) = record.extra_text(key) {
			out.push(Section::Text(heading, text));
		}
	}
	if !record.related.is_empty() {
		let heading = match node.kind {
			NodeKind::Project => "相关项目",
			NodeKind::Tech => "相关技术",
			NodeKind::Flood => "相关事件",
		};
		out.push(Section::List(heading, record.related.clone()));
	}
	out
}

/// Side panel describing the selected node; empty when nothing is selected.
#[component]
pub fn DetailPanel(#[prop(into)] selection: Signal<Option<Selection>>) -> impl IntoView {
	move || {
		selection.get().map(|Selection { node, status, .. }| {
			let row = |name: &'static str, value: String| {
				(!value.is_empty()).then(|| {
					view! {
						<dt>{name}</dt>
						<dd>{value}</dd>
					}
				})
			};
			let span = node.interval.bounds().map_or_else(String::new, |(start, end)| {
				if start == end {
					format_year(start)
				} else {
					format!("{} - {}", format_year(start), format_year(end))
				}
			});
			let dynasty = node.interval.dynasty.map_or_else(String::new, |d| d.to_string());
			let facts = kind_facts(&node)
				.into_iter()
				.map(|(name, value)| row(name, value))
				.collect_view();
			let blocks = sections(&node)
				.into_iter()
				.map(|section| match section {
					Section::Text(heading, text) => view! {
						<h3>{heading}</h3>
						<p class="detail-text">{text}</p>
					}
					.into_any(),
					Section::List(heading, items) => view! {
						<h3>{heading}</h3>
						<ul class="detail-list">
							{items.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
						</ul>
					}
					.into_any(),
				})
				.collect_view();

			view! {
				<aside class="detail-panel">
					<h2>{node.label}</h2>
					<dl>
						{row("类型", node.kind.label().to_string())}
						{row("状态", status.to_string())}
						{row("分类", node.category)}
						{row("年份", node.year)}
						{row("朝代", dynasty)}
						{row("时间范围", span)}
						{facts}
					</dl>
					{(!node.details.is_empty()).then(|| view! { <p class="detail-text">{node.details}</p> })}
					{blocks}
				</aside>
			}
		})
	}
}
