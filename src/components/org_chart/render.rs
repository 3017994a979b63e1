//! Converts packed nodes and the live camera frame into drawable primitives,
//! and paints them onto a 2D canvas context.

use web_sys::CanvasRenderingContext2d;

use super::hierarchy::NodeKind;
use super::pack::{PackedNode, DIAMETER, MARGIN};
use super::scale::Rgb;
use super::viewport::ViewportFrame;

/// Fixed view box around the chart, in the same coordinate space as the
/// screen-transformed nodes (origin at the canvas center).
pub struct ViewBox {
	pub x1: f64,
	pub y1: f64,
	pub width: f64,
	pub height: f64,
}

/// Wider than the canvas so partially visible circles still draw while the
/// focus-role detail gets breathing room on the side.
pub const VIEW_BOX: ViewBox =
	ViewBox { x1: -225.0, y1: -(MARGIN / 2.0), width: 1000.0, height: DIAMETER + MARGIN };

/// Circles smaller than this on screen are dropped.
const MIN_SCREEN_RADIUS: f64 = 5.0;
/// Labels more than this many depth levels below the focus are dropped.
const LABEL_DEPTH_WINDOW: i64 = 2;

const CORE_ROLE_FILL: Rgb = Rgb::new(0x9c as f64, 0xd8 as f64, 0xff as f64);
const CIRCLE_FILL: Rgb = Rgb::new(247.0, 247.0, 247.0);
const FILLED_ROLE_FILL: Rgb = Rgb::new(0xc8 as f64, 0xe6 as f64, 0xc9 as f64);
const VACANT_ROLE_FILL: Rgb = Rgb::new(0xf9 as f64, 0xe3 as f64, 0xbd as f64);
/// Brightness step per hierarchy level away from the focus.
const DEPTH_SHADE: f64 = 0.02;

/// Label block proportions (width, height) relative to the node radius.
const TITLE_BLOCK: (f64, f64) = (2.2, 1.8);
const ROLE_BLOCK: (f64, f64) = (1.8, 1.0);

/// A circle ready to draw, in screen space.
#[derive(Clone, Debug)]
pub struct CircleShape {
	/// Index into the packed node list.
	pub index: usize,
	pub x: f64,
	pub y: f64,
	pub r: f64,
	pub fill: Rgb,
	/// Whether this circle may show a hover tooltip (at or below the focus).
	pub hoverable: bool,
}

/// A label block ready to draw, in screen space (x/y is the top-left corner).
#[derive(Clone, Debug)]
pub struct LabelBlock {
	/// Index into the packed node list.
	pub index: usize,
	pub kind: NodeKind,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub font_px: f64,
}

/// Hover tooltip, anchored in screen space.
#[derive(Clone, Debug)]
pub struct Tooltip {
	pub x: f64,
	pub y: f64,
	pub text: String,
}

/// Everything one frame draws.
#[derive(Default)]
pub struct Scene {
	pub circles: Vec<CircleShape>,
	pub labels: Vec<LabelBlock>,
	pub tooltip: Option<Tooltip>,
}

fn outside_view_box(x: f64, y: f64, r: f64) -> bool {
	(x + r < -VIEW_BOX.width / 2.0)
		|| (x - r > VIEW_BOX.width / 2.0)
		|| (y + r < -VIEW_BOX.height)
		|| (y - r > VIEW_BOX.height)
}

fn fill_for(node: &PackedNode) -> Rgb {
	if node.role_type.is_core() {
		CORE_ROLE_FILL
	} else if node.kind == NodeKind::Circle {
		CIRCLE_FILL
	} else if node.member_count > 0 {
		FILLED_ROLE_FILL
	} else {
		VACANT_ROLE_FILL
	}
}

/// Circles visible under `frame`: titles excluded, tiny and off-box circles
/// culled, fills shaded by distance from the focus level.
pub fn visible_circles(nodes: &[PackedNode], frame: &ViewportFrame, focus: usize) -> Vec<CircleShape> {
	let k = DIAMETER / frame.diameter;
	let focus_level = i64::from(nodes[focus].level);

	nodes
		.iter()
		.enumerate()
		.filter_map(|(i, node)| {
			if node.kind == NodeKind::Title {
				return None;
			}
			let x = (node.x - frame.cx) * k;
			let y = (node.y - frame.cy) * k;
			let r = node.r * k;
			if r < MIN_SCREEN_RADIUS {
				return None;
			}
			if outside_view_box(x, y, r) {
				return None;
			}
			let shade = DEPTH_SHADE * (i64::from(node.level) - focus_level) as f64;
			Some(CircleShape {
				index: i,
				x,
				y,
				r,
				fill: fill_for(node).brighter(shade),
				hoverable: i64::from(node.level) >= focus_level,
			})
		})
		.collect()
}

/// Label blocks visible under `frame`: circle titles and role names, culled
/// by the view box and by depth distance from the focus. `detail_index`
/// names a node whose label is replaced by the DOM detail overlay.
pub fn visible_labels(
	nodes: &[PackedNode],
	frame: &ViewportFrame,
	focus: usize,
	detail_index: Option<usize>,
) -> Vec<LabelBlock> {
	let k = DIAMETER / frame.diameter;
	let focus_depth = i64::from(nodes[focus].depth);

	nodes
		.iter()
		.enumerate()
		.filter_map(|(i, node)| {
			if !matches!(node.kind, NodeKind::Title | NodeKind::Role) {
				return None;
			}
			if i64::from(node.depth) - focus_depth > LABEL_DEPTH_WINDOW {
				return None;
			}
			if detail_index == Some(i) {
				return None;
			}

			let (bx, by) = if node.kind == NodeKind::Title { TITLE_BLOCK } else { ROLE_BLOCK };
			let r = node.r * k;
			let x = (node.x - frame.cx) * k - r * bx / 2.0;
			let y = (node.y - frame.cy) * k - r * by / 2.0;
			if outside_view_box(x, y, r) {
				return None;
			}

			// Titles read slightly larger than role names.
			let font_px = if node.kind == NodeKind::Title { r * 16.0 / 30.0 } else { r * 16.0 / 40.0 };
			Some(LabelBlock { index: i, kind: node.kind, x, y, width: r * bx, height: r * by, font_px })
		})
		.collect()
}

/// Uniform scale fitting the view box into a `width` × `height` canvas.
pub fn canvas_scale(width: f64, height: f64) -> f64 {
	(width / VIEW_BOX.width).min(height / VIEW_BOX.height)
}

/// Canvas pixel position → chart screen space (the space of [`CircleShape`]).
pub fn canvas_to_chart(px: f64, py: f64, width: f64, height: f64) -> (f64, f64) {
	let s = canvas_scale(width, height);
	(px / s - (DIAMETER / 2.0 - VIEW_BOX.x1), py / s - (DIAMETER / 2.0 - VIEW_BOX.y1))
}

/// Paints a scene. The context transform maps chart screen space into the
/// canvas: uniform scale, then the view-box offset to the chart origin.
pub fn draw(ctx: &CanvasRenderingContext2d, nodes: &[PackedNode], scene: &Scene, width: f64, height: f64) {
	ctx.clear_rect(0.0, 0.0, width, height);
	ctx.save();

	let s = canvas_scale(width, height);
	let _ = ctx.scale(s, s);
	let _ = ctx.translate(DIAMETER / 2.0 - VIEW_BOX.x1, DIAMETER / 2.0 - VIEW_BOX.y1);

	for shape in &scene.circles {
		ctx.begin_path();
		let _ = ctx.arc(shape.x, shape.y, shape.r, 0.0, std::f64::consts::TAU);
		ctx.set_fill_style_str(&shape.fill.to_css());
		ctx.fill();
		ctx.set_stroke_style_str("rgba(0, 0, 0, 0.06)");
		ctx.set_line_width(1.0 / s);
		ctx.stroke();
	}

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str("#333");
	for label in &scene.labels {
		let node = &nodes[label.index];
		ctx.set_font(&format!("{}px sans-serif", label.font_px));
		let _ = ctx.fill_text(&node.name, label.x + label.width / 2.0, label.y + label.height / 2.0);
	}

	if let Some(tip) = &scene.tooltip {
		draw_tooltip(ctx, tip, s);
	}

	ctx.restore();
}

fn draw_tooltip(ctx: &CanvasRenderingContext2d, tip: &Tooltip, s: f64) {
	let font_px = 13.0 / s;
	let pad = 6.0 / s;
	// Approximate text extent; canvas metrics are overkill for a one-liner.
	let w = tip.text.chars().count() as f64 * font_px * 0.55 + 2.0 * pad;
	let h = font_px + 2.0 * pad;
	let x = tip.x - w / 2.0;
	let y = tip.y - h - 10.0 / s;

	ctx.set_fill_style_str("rgba(27, 28, 29, 0.9)");
	ctx.fill_rect(x, y, w, h);
	ctx.set_fill_style_str("#fff");
	ctx.set_font(&format!("{font_px}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&tip.text, tip.x, y + h / 2.0);
}
