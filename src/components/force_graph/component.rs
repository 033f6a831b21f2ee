use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use leptos::ev;
use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use crate::knowledge::GraphData;

use super::render;
use super::simulation::SimulationParameters;
use super::state::{ForceGraphState, Selection};

/// Simulated time per animation frame, in seconds.
const FRAME_DT: f64 = 0.016;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn viewport_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

fn pointer_position(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn schedule(cb: &Closure<dyn FnMut()>, frame: &AtomicI32) {
	let Some(window) = web_sys::window() else {
		return;
	};
	match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
		Ok(handle) => frame.store(handle, Ordering::Relaxed),
		Err(err) => error!("requestAnimationFrame failed: {:?}", err),
	}
}

/// Canvas that lays out `data` with the force simulation and lets the user
/// hover, select, drag, pin and release nodes.
///
/// Whenever `data` changes the layout is synchronised in place: surviving
/// nodes keep their position and pin state. `on_select` hears every
/// selection change, including a selection dropped because its node left
/// the graph.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] parameters: Option<SimulationParameters>,
	#[prop(optional)] on_select: Option<Callback<Option<Selection>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize: Arc<Mutex<Option<WindowListenerHandle>>> = Arc::new(Mutex::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let frame = Arc::new(AtomicI32::new(0));

	// Runs `event` against the state, then reports a changed selection once
	// the borrow is released.
	let with_state = {
		let state = state.clone();
		move |event: &dyn Fn(&mut ForceGraphState)| {
			let change = state.borrow_mut().as_mut().and_then(|s| {
				event(s);
				s.take_selection_change()
			});
			if let (Some(selection), Some(cb)) = (change, on_select) {
				cb.run(selection);
			}
		}
	};

	let (state_init, animate_init, resize_init) = (state.clone(), animate.clone(), resize.clone());
	let (alive_init, frame_init) = (alive.clone(), frame.clone());
	let with_sync = with_state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		if state_init.borrow().is_some() {
			// The pending frame is cancelled and rescheduled around every sync.
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(frame_init.load(Ordering::Relaxed));
			}
			with_sync(&|s| {
				if s.sync_graph(&graph) {
					debug!("selected node left the visible graph");
				}
			});
			debug!("graph synced: {} nodes, {} edges", graph.nodes.len(), graph.edges.len());
			if let Some(cb) = animate_init.borrow().as_ref() {
				schedule(cb, &frame_init);
			}
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window; graph canvas not started");
			return;
		};
		let (w, h) = if fullscreen {
			viewport_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("2d canvas context unavailable");
			return;
		};
		let seed = js_sys::Date::now() as u64;
		*state_init.borrow_mut() = Some(ForceGraphState::new(
			&graph,
			w,
			h,
			parameters.clone().unwrap_or_default(),
			seed,
		));

		if fullscreen {
			let (state_resize, canvas_resize, alive_resize) =
				(state_init.clone(), canvas.clone(), alive_init.clone());
			let handle = window_event_listener(ev::resize, move |_| {
				if !alive_resize.load(Ordering::Relaxed) {
					return;
				}
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(s) = state_resize.borrow_mut().as_mut() {
					s.resize(nw, nh);
				}
			});
			if let Ok(mut slot) = resize_init.lock() {
				*slot = Some(handle);
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let (alive_anim, frame_anim) = (alive_init.clone(), frame_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Some(s) = state_anim.borrow_mut().as_mut() {
				s.tick(FRAME_DT);
				render::render(s, &ctx);
			}
			if let Some(cb) = animate_inner.borrow().as_ref() {
				schedule(cb, &frame_anim);
			}
		}));
		if let Some(cb) = animate_init.borrow().as_ref() {
			schedule(cb, &frame_init);
		}
	});

	on_cleanup(move || {
		alive.store(false, Ordering::Relaxed);
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(frame.load(Ordering::Relaxed));
		}
		if let Some(handle) = resize.lock().ok().and_then(|mut slot| slot.take()) {
			handle.remove();
		}
		debug!("graph canvas stopped");
	});

	let with_md = with_state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			with_md(&|s| {
				s.pointer_down(x, y);
			});
		}
	};

	let with_mm = with_state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			with_mm(&|s| s.pointer_move(x, y));
		}
	};

	let with_mu = with_state.clone();
	let on_mouseup = move |_: MouseEvent| with_mu(&|s| s.pointer_up());

	let with_ml = with_state.clone();
	let on_mouseleave = move |_: MouseEvent| with_ml(&|s| s.pointer_leave());

	let with_dc = with_state;
	let on_dblclick = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			with_dc(&|s| {
				if s.double_click(x, y) {
					debug!("node released at ({x:.0}, {y:.0})");
				}
			});
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
