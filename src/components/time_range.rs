use leptos::prelude::*;

use crate::knowledge::{RangeError, TimeRange, format_year};

fn range_message(err: RangeError) -> String {
	match err {
		RangeError::Inverted { .. } => "起始年份必须早于结束年份".to_string(),
		RangeError::OutOfBounds { min, max, .. } => {
			format!("年份必须在{}至{}之间", format_year(min), format_year(max))
		}
	}
}

/// Start/end sliders, a reset button and the search box.
///
/// The signals are owned by the page; `error` is whatever the page's range
/// validation currently reports.
#[component]
pub fn TimeRangeControls(
	start: RwSignal<i32>,
	end: RwSignal<i32>,
	search: RwSignal<String>,
	#[prop(into)] error: Signal<Option<RangeError>>,
) -> impl IntoView {
	let slider = move |label: &'static str, year: RwSignal<i32>| {
		view! {
			<label class="range-control">
				<span class="range-label">{label} ": " {move || format_year(year.get())}</span>
				<input
					type="range"
					min=TimeRange::MIN_YEAR.to_string()
					max=TimeRange::MAX_YEAR.to_string()
					step="1"
					prop:value=move || year.get().to_string()
					on:input=move |ev| {
						if let Ok(value) = event_target_value(&ev).parse::<i32>() {
							year.set(value);
						}
					}
				/>
			</label>
		}
	};

	let reset = move |_: leptos::ev::MouseEvent| {
		start.set(TimeRange::MIN_YEAR);
		end.set(TimeRange::MAX_YEAR);
	};

	view! {
		<div class="time-range-controls">
			{slider("起始年份", start)}
			{slider("结束年份", end)}
			<button class="range-reset" on:click=reset>
				"重置"
			</button>
			<input
				type="search"
				class="search-box"
				placeholder="搜索名称或类型"
				prop:value=move || search.get()
				on:input=move |ev| search.set(event_target_value(&ev))
			/>
			{move || error.get().map(|err| view! { <p class="range-error">{range_message(err)}</p> })}
		</div>
	}
}
