//! Canvas rendering for the co-author graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (root space)
//! 2. Links touching the owner (solid, glowing), then the rest (dashed)
//! 3. Nodes, rings around the hovered and selected node, then labels

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::state::CoauthorGraphState;
use super::theme::{Color, Theme};
use super::types::surname;
use super::viewport::Point;

/// Renders the complete graph to the canvas.
pub fn render(state: &CoauthorGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let t = state.viewport.transform();
	let scaled = ScaledValues::new(&state.scale, t.scale);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.scale(t.scale, t.scale);
	let _ = ctx.translate(t.tx, t.ty);

	draw_links(state, ctx, theme, true);
	draw_links(state, ctx, theme, false);
	draw_nodes(state, ctx, &scaled, theme);
	draw_rings(state, ctx, &scaled, theme);
	draw_labels(state, ctx, &scaled, theme);

	ctx.restore();
}

fn draw_background(state: &CoauthorGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.size.width, state.size.height);
	ctx.clear_rect(0.0, 0.0, w, h);
	let bg = &theme.background;
	let gradient = bg
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &bg.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &bg.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&bg.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn set_glow(ctx: &CanvasRenderingContext2d, blur: f64, color: Color) {
	ctx.set_shadow_blur(blur);
	ctx.set_shadow_color(&color.to_css());
}

fn clear_glow(ctx: &CanvasRenderingContext2d) {
	ctx.set_shadow_blur(0.0);
	ctx.set_shadow_color("rgba(0, 0, 0, 0)");
}

/// Draws one class of links: `direct` ones touch the owner.
fn draw_links(state: &CoauthorGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme, direct: bool) {
	let graph = state.session.graph();
	let positions = state.session.positions();
	let style = &theme.link;

	if direct {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_stroke_style_str(&style.direct.to_css());
		if style.glow_blur > 0.0 {
			set_glow(ctx, style.glow_blur, style.glow_color);
		}
	} else {
		let (dash, gap) = state.scale.link.dash_pattern;
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_stroke_style_str(&style.indirect.to_css());
		clear_glow(ctx);
	}

	for (&(s, t), link) in graph.endpoints().iter().zip(&graph.links) {
		let touches_owner = state.is_owner(&link.source) || state.is_owner(&link.target);
		if touches_owner != direct {
			continue;
		}
		let (Some(a), Some(b)) = (positions.get(s), positions.get(t)) else {
			continue;
		};
		if !a.is_finite() || !b.is_finite() {
			continue;
		}
		ctx.set_line_width(state.scale.link_width(link.weight, direct));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}

	clear_glow(ctx);
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn circle(ctx: &CanvasRenderingContext2d, at: Point, radius: f64) {
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, radius, 0.0, TAU);
}

fn draw_nodes(
	state: &CoauthorGraphState,
	ctx: &CanvasRenderingContext2d,
	scaled: &ScaledValues,
	theme: &Theme,
) {
	let graph = state.session.graph();
	ctx.set_line_width(state.scale.node.stroke_width / scaled.k.max(1.0));

	for (node, p) in graph.nodes.iter().zip(state.session.positions()) {
		if !p.is_finite() {
			continue;
		}
		let is_owner = state.is_owner(&node.name);
		let style = theme.node_style(is_owner);
		let radius = state.scale.node_radius(is_owner, node.degree);

		if style.glow_blur > 0.0 {
			set_glow(ctx, style.glow_blur, style.glow_color);
		}
		ctx.set_fill_style_str(&style.fill.to_css());
		ctx.set_stroke_style_str(&style.stroke.to_css());
		circle(ctx, *p, radius);
		ctx.fill();
		ctx.stroke();
		if style.glow_blur > 0.0 {
			clear_glow(ctx);
		}
	}
}

fn draw_rings(
	state: &CoauthorGraphState,
	ctx: &CanvasRenderingContext2d,
	scaled: &ScaledValues,
	theme: &Theme,
) {
	let hovered = state.hover.current();
	let selected = state.selection.author.as_ref();
	let ringed = hovered.into_iter().chain(selected.filter(|s| Some(*s) != hovered));

	ctx.set_stroke_style_str(&theme.ring.to_css());
	ctx.set_line_width(scaled.ring_width);
	for author in ringed {
		let graph = state.session.graph();
		let Some(idx) = graph.index_of(author) else {
			continue;
		};
		let (Some(node), Some(p)) = (graph.node(idx), state.session.position(idx)) else {
			continue;
		};
		let radius = state.scale.node_radius(state.is_owner(author), node.degree);
		circle(ctx, p, radius + scaled.ring_offset);
		ctx.stroke();
	}
}

fn draw_labels(
	state: &CoauthorGraphState,
	ctx: &CanvasRenderingContext2d,
	scaled: &ScaledValues,
	theme: &Theme,
) {
	let graph = state.session.graph();
	let gap = state.scale.label.gap;
	ctx.set_text_baseline("middle");

	for (node, p) in graph.nodes.iter().zip(state.session.positions()) {
		if !p.is_finite() {
			continue;
		}
		let is_owner = state.is_owner(&node.name);
		let emphasized =
			is_owner || state.hover.current() == Some(&node.name) || state.selection.is_selected(&node.name);
		let alpha = if emphasized { 1.0 } else { scaled.label_alpha };
		if alpha <= 0.01 {
			continue;
		}
		let style = theme.node_style(is_owner);
		ctx.set_font(if is_owner {
			&scaled.label_bold_font
		} else {
			&scaled.label_font
		});
		ctx.set_fill_style_str(&style.label.with_alpha(style.label.a * alpha).to_css());
		let radius = state.scale.node_radius(is_owner, node.degree);
		let _ = ctx.fill_text(surname(&node.name), p.x + radius + gap, p.y);
	}
}
