use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::render_state::{EdgeVisual, NodeVisual, RenderState, Tooltip};
use super::state::ForceGraphState;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let frame = state.render_state();
	let t = if frame.has_highlight {
		ease_out_cubic(state.fade.t)
	} else {
		0.0
	};

	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	ctx.set_fill_style_str("rgba(248, 249, 250, 0.6)");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	draw_edges(&frame, ctx, t);
	draw_nodes(&frame, ctx, t);
	if let Some(tip) = &frame.tooltip {
		draw_tooltip(tip, ctx, state.width);
	}
}

fn draw_edges(frame: &RenderState, ctx: &CanvasRenderingContext2d, t: f64) {
	for edge in frame.edges.iter().filter(|e| !e.highlighted) {
		draw_edge(edge, ctx, 0.8 - 0.5 * t);
	}
	// Highlighted edges on top, with their relation label.
	for edge in frame.edges.iter().filter(|e| e.highlighted) {
		draw_edge(edge, ctx, 0.8 + 0.2 * t);
		draw_edge_label(edge, ctx);
	}
}

fn draw_edge(edge: &EdgeVisual, ctx: &CanvasRenderingContext2d, alpha: f64) {
	let (color, width) = if edge.highlighted {
		(format!("rgba(52, 152, 219, {})", alpha), 2.5)
	} else {
		(format!("rgba(136, 136, 136, {})", alpha), 1.5)
	};
	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(width);
	ctx.set_line_cap("round");
	ctx.begin_path();
	ctx.move_to(edge.x1, edge.y1);
	ctx.line_to(edge.x2, edge.y2);
	ctx.stroke();
}

fn draw_edge_label(edge: &EdgeVisual, ctx: &CanvasRenderingContext2d) {
	let (mx, my) = ((edge.x1 + edge.x2) / 2.0, (edge.y1 + edge.y2) / 2.0);
	ctx.set_fill_style_str("white");
	ctx.set_stroke_style_str("#ddd");
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.rect(mx - 18.0, my - 10.0, 36.0, 20.0);
	ctx.fill();
	ctx.stroke();

	ctx.set_fill_style_str("#666");
	ctx.set_font("10px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(edge.label, mx, my);
}

fn draw_nodes(frame: &RenderState, ctx: &CanvasRenderingContext2d, t: f64) {
	for node in frame.nodes.iter().filter(|n| !n.highlighted) {
		let alpha = if frame.has_highlight { 1.0 - 0.5 * t } else { 1.0 };
		draw_node(node, ctx, alpha, 0.0);
	}
	for node in frame.nodes.iter().filter(|n| n.highlighted) {
		draw_node(node, ctx, 1.0, t);
	}
}

fn draw_node(node: &NodeVisual, ctx: &CanvasRenderingContext2d, alpha: f64, glow_t: f64) {
	let (x, y, radius) = (node.x, node.y, node.radius);
	ctx.set_global_alpha(alpha);

	if glow_t > 0.01 {
		let glow_radius = radius * (1.2 + 0.6 * glow_t);
		let glow_alpha = if node.hovered { 0.35 } else { 0.2 } * glow_t;
		ctx.begin_path();
		let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&format!("rgba(52, 152, 219, {})", glow_alpha));
		ctx.fill();
	}

	if node.dragging {
		ctx.set_shadow_color("rgba(0, 0, 0, 0.35)");
		ctx.set_shadow_blur(12.0);
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(node.color);
	ctx.fill();
	ctx.set_shadow_blur(0.0);

	let (stroke, width) = if node.fixed {
		("#e74c3c", 3.0)
	} else if node.selected {
		("#2c3e50", 3.0)
	} else {
		("#fff", 1.5)
	};
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(width);
	if node.fixed {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&4.0.into(), &2.0.into()));
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if !node.label.is_empty() {
		ctx.set_font("bold 11px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_line_width(3.0);
		ctx.set_stroke_style_str("rgba(0, 0, 0, 0.9)");
		let _ = ctx.stroke_text(&node.label, x, y);
		ctx.set_fill_style_str("#ffffff");
		let _ = ctx.fill_text(&node.label, x, y);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_tooltip(tip: &Tooltip, ctx: &CanvasRenderingContext2d, canvas_width: f64) {
	const WIDTH: f64 = 220.0;
	const LINE: f64 = 16.0;
	const PAD: f64 = 8.0;

	// Details can be long; wrap them by character count.
	let wrapped: Vec<String> = tip
		.lines
		.iter()
		.flat_map(|line| {
			let chars: Vec<char> = line.chars().collect();
			chars
				.chunks(16)
				.map(|c| c.iter().collect::<String>())
				.collect::<Vec<_>>()
		})
		.collect();
	let height = PAD * 2.0 + LINE * (wrapped.len() + 1) as f64;
	let x = if tip.x + WIDTH > canvas_width {
		tip.x - WIDTH - 30.0
	} else {
		tip.x
	};

	ctx.set_fill_style_str("rgba(255, 255, 255, 0.95)");
	ctx.set_stroke_style_str("#ccc");
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.rect(x, tip.y, WIDTH, height);
	ctx.fill();
	ctx.stroke();

	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	ctx.set_fill_style_str("#222");
	ctx.set_font("bold 13px sans-serif");
	let _ = ctx.fill_text(&tip.title, x + PAD, tip.y + PAD);
	ctx.set_font("12px sans-serif");
	ctx.set_fill_style_str("#444");
	for (i, line) in wrapped.iter().enumerate() {
		let _ = ctx.fill_text(line, x + PAD, tip.y + PAD + LINE * (i + 1) as f64);
	}
}
