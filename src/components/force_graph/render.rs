//! Per-frame painting of the transaction graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background fill (screen space) and zoom-aware grid (world space)
//! 2. Links with arrowheads
//! 3. Node glows, node bodies (focused nodes last), then labels on top
//!
//! [`render`] reads everything and writes nothing but paint commands. The
//! only time-dependent output is the selection ring pulse.

use std::f64::consts::PI;

use super::model::{GraphModel, Link};
use super::risk::RiskOverlay;
use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::PositionSource;
use super::state::InteractionState;
use super::surface::{Fill, RadialGradient, Surface};
use super::theme::{NodeRamp, Theme};
use super::viewport::Viewport;

/// Everything one frame is painted from.
pub struct Frame<'a> {
	/// Node positions from the layout.
	pub positions: &'a dyn PositionSource,
	/// Accounts and links to draw.
	pub model: &'a GraphModel,
	/// Risk annotations.
	pub overlay: &'a RiskOverlay,
	/// Hover, selection, and adjacency.
	pub interaction: &'a InteractionState,
	/// Surface size and camera.
	pub viewport: &'a Viewport,
	/// Zoom-dependent sizes.
	pub scale: &'a ScaleConfig,
	/// Colors.
	pub theme: &'a Theme,
}

/// Visual state of a link. Dimming wins over everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
	/// Outside the selected neighborhood.
	Dimmed,
	/// Inside the selected neighborhood.
	Highlighted {
		/// An endpoint is flagged; keeps the red tint.
		suspicious: bool,
	},
	/// Touches a flagged account.
	Suspicious,
	/// Plain link.
	Normal,
}

/// State `link` is drawn in.
pub fn link_state(link: &Link, interaction: &InteractionState, overlay: &RiskOverlay) -> LinkState {
	let suspicious = overlay.is_flagged(&link.source) || overlay.is_flagged(&link.target);
	if interaction.has_selection() {
		if interaction.link_in_focus(link) {
			LinkState::Highlighted { suspicious }
		} else {
			LinkState::Dimmed
		}
	} else if suspicious {
		LinkState::Suspicious
	} else {
		LinkState::Normal
	}
}

/// Visual state of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeState {
	/// Account is flagged.
	pub suspicious: bool,
	/// Account is under the pointer.
	pub hovered: bool,
	/// Account is selected.
	pub selected: bool,
	/// A selection exists and the account is outside its neighborhood.
	pub dimmed: bool,
}

impl NodeState {
	/// Hovered or selected.
	pub fn focused(&self) -> bool {
		self.hovered || self.selected
	}

	/// Unflagged, unfocused nodes get no label.
	pub fn labeled(&self) -> bool {
		self.focused() || self.suspicious
	}
}

/// State account `id` is drawn in.
pub fn node_state(id: &str, interaction: &InteractionState, overlay: &RiskOverlay) -> NodeState {
	NodeState {
		suspicious: overlay.is_flagged(id),
		hovered: interaction.hovered() == Some(id),
		selected: interaction.selected() == Some(id),
		dimmed: interaction.is_dimmed(id),
	}
}

pub(super) fn node_radius(state: NodeState, scale: &ScaledValues, config: &ScaleConfig) -> f64 {
	let base = if state.suspicious {
		scale.suspicious_radius
	} else {
		scale.node_radius
	};
	if state.focused() {
		base * config.node.focus_scale
	} else {
		base
	}
}

fn node_ramp(state: NodeState, theme: &Theme) -> NodeRamp {
	if state.dimmed {
		theme.node.dimmed
	} else if state.suspicious {
		theme.node.suspicious
	} else if state.focused() {
		theme.node.focused
	} else {
		theme.node.normal
	}
}

/// Paints one frame.
pub fn render(frame: &Frame<'_>, surface: &mut dyn Surface, time: f64) {
	let vp = frame.viewport;
	let scale = ScaledValues::new(frame.scale, vp.transform.k);

	surface.fill_rect(0.0, 0.0, vp.width, vp.height, frame.theme.background.color);

	surface.save();
	surface.apply_transform(&vp.transform);

	draw_grid(frame, surface, &scale);
	draw_links(frame, surface, &scale);
	draw_nodes(frame, surface, &scale, time);

	surface.restore();
}

fn draw_grid(frame: &Frame<'_>, surface: &mut dyn Surface, scale: &ScaledValues) {
	if scale.grid_alpha < 0.01 {
		return;
	}
	let vp = frame.viewport;
	let (x0, y0) = vp.transform.screen_to_graph(0.0, 0.0);
	let (x1, y1) = vp.transform.screen_to_graph(vp.width, vp.height);
	let cell = scale.grid_cell;
	let color = frame.theme.background.grid_color.fade(scale.grid_alpha);
	let max_lines = frame.scale.grid.max_lines;

	let start_x = (x0 / cell).floor() * cell;
	let columns = (((x1 - start_x) / cell).ceil() as usize + 1).min(max_lines);
	for i in 0..columns {
		let x = start_x + i as f64 * cell;
		surface.stroke_line((x, y0), (x, y1), color, scale.grid_line_width);
	}

	let start_y = (y0 / cell).floor() * cell;
	let rows = (((y1 - start_y) / cell).ceil() as usize + 1).min(max_lines);
	for i in 0..rows {
		let y = start_y + i as f64 * cell;
		surface.stroke_line((x0, y), (x1, y), color, scale.grid_line_width);
	}
}

fn draw_links(frame: &Frame<'_>, surface: &mut dyn Surface, scale: &ScaledValues) {
	// Dimmed links underneath so highlighted ones stay readable.
	for dimmed_pass in [true, false] {
		for link in frame.model.links() {
			let state = link_state(link, frame.interaction, frame.overlay);
			if (state == LinkState::Dimmed) == dimmed_pass {
				draw_link(frame, surface, scale, link, state);
			}
		}
	}
}

fn draw_link(
	frame: &Frame<'_>,
	surface: &mut dyn Surface,
	scale: &ScaledValues,
	link: &Link,
	state: LinkState,
) {
	let (Some(p1), Some(p2)) = (
		frame.positions.position(&link.source),
		frame.positions.position(&link.target),
	) else {
		return;
	};
	let (dx, dy) = (p2.0 - p1.0, p2.1 - p1.1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}

	let style = &frame.theme.link;
	let (color, width, arrow_mult) = match state {
		LinkState::Dimmed => (style.dimmed, scale.link_width, 0.0),
		LinkState::Highlighted { suspicious } => (
			if suspicious {
				style.highlighted_suspicious
			} else {
				style.highlighted
			},
			scale.link_width * style.highlighted_width,
			style.highlighted_arrow,
		),
		LinkState::Suspicious => (style.suspicious, scale.link_width * style.suspicious_width, 1.0),
		LinkState::Normal => (style.normal, scale.link_width, 1.0),
	};

	let source_r = node_radius(
		node_state(&link.source, frame.interaction, frame.overlay),
		scale,
		frame.scale,
	);
	let target_r = node_radius(
		node_state(&link.target, frame.interaction, frame.overlay),
		scale,
		frame.scale,
	);
	let draw_arrow = arrow_mult > 0.0 && !scale.cull_arrows;
	let arrow_size = scale.arrow_size * arrow_mult;
	let arrow_gap = if draw_arrow { arrow_size } else { 0.0 };

	let bend = parallel_bend(link, scale);
	// (ux, uy) is the direction into the target, used for the arrowhead.
	let (ux, uy) = if bend == 0.0 {
		let (ux, uy) = (dx / dist, dy / dist);
		let start = (p1.0 + ux * source_r, p1.1 + uy * source_r);
		let end = (
			p2.0 - ux * (target_r + arrow_gap),
			p2.1 - uy * (target_r + arrow_gap),
		);
		surface.stroke_line(start, end, color, width);
		(ux, uy)
	} else {
		// Perpendicular taken in id order so A->B and B->A bend consistently.
		let (nx, ny) = if link.source <= link.target {
			(-dy / dist, dx / dist)
		} else {
			(dy / dist, -dx / dist)
		};
		let control = (
			(p1.0 + p2.0) / 2.0 + nx * bend * 2.0,
			(p1.1 + p2.1) / 2.0 + ny * bend * 2.0,
		);
		let (sx, sy) = unit(control.0 - p1.0, control.1 - p1.1);
		let (ux, uy) = unit(p2.0 - control.0, p2.1 - control.1);
		let start = (p1.0 + sx * source_r, p1.1 + sy * source_r);
		let end = (
			p2.0 - ux * (target_r + arrow_gap),
			p2.1 - uy * (target_r + arrow_gap),
		);
		surface.stroke_quadratic(start, control, end, color, width);
		(ux, uy)
	};

	if draw_arrow {
		let emphasis = if matches!(state, LinkState::Highlighted { .. }) {
			1.0
		} else {
			0.7
		};
		let alpha = (color.a * 1.5).min(1.0) * scale.arrow_alpha * emphasis;
		let (tip_x, tip_y) = (p2.0 - ux * target_r, p2.1 - uy * target_r);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		surface.fill_polygon(
			&[
				(tip_x, tip_y),
				(back_x + px, back_y + py),
				(back_x - px, back_y - py),
			],
			color.with_alpha(alpha),
		);
	}
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
	let len = (dx * dx + dy * dy).sqrt();
	if len < 1e-9 { (0.0, 0.0) } else { (dx / len, dy / len) }
}

/// Sideways offset for the n-th link between the same two accounts:
/// 0, +s, -s, +2s, -2s, ...
fn parallel_bend(link: &Link, scale: &ScaledValues) -> f64 {
	let i = link.parallel_index;
	if i == 0 {
		return 0.0;
	}
	let step = i.div_ceil(2) as f64 * scale.parallel_spacing;
	if i % 2 == 1 { step } else { -step }
}

fn draw_nodes(frame: &Frame<'_>, surface: &mut dyn Surface, scale: &ScaledValues, time: f64) {
	let placed: Vec<(&String, (f64, f64), NodeState)> = frame
		.model
		.nodes()
		.iter()
		.filter_map(|id| {
			let pos = frame.positions.position(id)?;
			Some((id, pos, node_state(id, frame.interaction, frame.overlay)))
		})
		.collect();

	// Pass 1: risk glows
	for (_, (x, y), state) in &placed {
		if state.suspicious && !state.dimmed {
			let r = node_radius(*state, scale, frame.scale);
			draw_glow(surface, frame, *x, *y, r);
		}
	}

	// Pass 2: bodies, focused nodes on top
	for focused_pass in [false, true] {
		for (_, (x, y), state) in &placed {
			if state.focused() != focused_pass {
				continue;
			}
			let r = node_radius(*state, scale, frame.scale);
			draw_body(surface, frame.theme, *x, *y, r, *state);
			if state.selected {
				draw_selection_rings(surface, frame.theme, scale, *x, *y, r, time);
			}
		}
	}

	// Pass 3: labels
	for (id, (x, y), state) in &placed {
		if state.labeled() {
			let r = node_radius(*state, scale, frame.scale);
			draw_label(surface, frame, scale, id, *x, *y, r, *state);
		}
	}
}

fn draw_glow(surface: &mut dyn Surface, frame: &Frame<'_>, x: f64, y: f64, r: f64) {
	let glow = &frame.scale.glow;
	let layers = [
		(glow.outer_radius, frame.theme.node.glow_outer),
		(glow.inner_radius, frame.theme.node.glow_inner),
	];
	for (mult, color) in layers {
		let outer = r * mult;
		surface.fill_circle(
			x,
			y,
			outer,
			&Fill::Radial(RadialGradient {
				inner: (x, y, r * 0.5),
				outer: (x, y, outer),
				stops: vec![(0.0, color), (1.0, color.with_alpha(0.0))],
			}),
		);
	}
}

fn draw_body(surface: &mut dyn Surface, theme: &Theme, x: f64, y: f64, r: f64, state: NodeState) {
	let ramp = node_ramp(state, theme);
	let highlight = if state.hovered {
		ramp.highlight.lighten(0.25)
	} else {
		ramp.highlight
	};
	surface.fill_circle(
		x,
		y,
		r,
		&Fill::Radial(RadialGradient {
			inner: (x - r * 0.3, y - r * 0.3, 0.0),
			outer: (x, y, r),
			stops: vec![(0.0, highlight), (0.7, ramp.base), (1.0, ramp.shadow)],
		}),
	);
}

fn draw_selection_rings(
	surface: &mut dyn Surface,
	theme: &Theme,
	scale: &ScaledValues,
	x: f64,
	y: f64,
	r: f64,
	time: f64,
) {
	let phase = time * scale.pulse_speed;
	let inner = r + scale.ring_offset + phase.sin() * scale.pulse_amplitude;
	let outer = r + scale.ring_offset * 2.5 + (phase + PI / 2.0).sin() * scale.pulse_amplitude;
	surface.stroke_circle(x, y, inner.max(r), theme.node.ring, scale.ring_width);
	surface.stroke_circle(
		x,
		y,
		outer.max(r),
		theme.node.ring.fade(0.4),
		scale.ring_width * 0.5,
	);
}

#[allow(clippy::too_many_arguments)]
fn draw_label(
	surface: &mut dyn Surface,
	frame: &Frame<'_>,
	scale: &ScaledValues,
	id: &str,
	x: f64,
	y: f64,
	r: f64,
	state: NodeState,
) {
	let style = &frame.theme.label;
	let text = match frame.overlay.score(id) {
		Some(score) if state.suspicious && state.focused() => format!("{id} ({score:.0})"),
		_ => id.to_string(),
	};
	let alpha = if state.dimmed { style.dimmed_alpha } else { 1.0 };

	let (pad_x, pad_y) = scale.label_padding;
	let w = surface.measure_text(&text, &scale.label_font) + pad_x * 2.0;
	let h = scale.label_font_size + pad_y * 2.0;
	let cy = y - r - scale.label_gap - h / 2.0;

	surface.fill_round_rect(
		x - w / 2.0,
		cy - h / 2.0,
		w,
		h,
		h / 2.0,
		style.background.fade(alpha),
	);
	let color = if state.suspicious {
		style.suspicious_text
	} else {
		style.text
	};
	surface.fill_text(&text, x, cy, &scale.label_font, color.fade(alpha));
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::components::force_graph::model::tests::{row, triangle};
	use crate::components::force_graph::risk::tests::flag;
	use crate::components::force_graph::surface::recording::{PaintCmd, RecordingSurface};
	use crate::components::force_graph::types::Amount;
	use crate::components::force_graph::viewport::ViewportConfig;

	struct Scene {
		model: GraphModel,
		overlay: RiskOverlay,
		interaction: InteractionState,
		viewport: Viewport,
		positions: HashMap<String, (f64, f64)>,
		scale: ScaleConfig,
		theme: Theme,
	}

	impl Scene {
		fn new(model: GraphModel, overlay: RiskOverlay) -> Self {
			let positions = model
				.nodes()
				.iter()
				.enumerate()
				.map(|(i, id)| (id.clone(), (i as f64 * 60.0, (i % 2) as f64 * 40.0)))
				.collect();
			Self {
				model,
				overlay,
				interaction: InteractionState::default(),
				viewport: Viewport::new(Some(800.0), ViewportConfig::default()),
				positions,
				scale: ScaleConfig::default(),
				theme: Theme::default(),
			}
		}

		fn triangle_flagged_a() -> Self {
			Self::new(
				GraphModel::build(&triangle()),
				RiskOverlay::build(&[flag("A", 90.0, &["fan_out"])]),
			)
		}

		fn paint(&self, time: f64) -> Vec<PaintCmd> {
			let frame = Frame {
				positions: &self.positions,
				model: &self.model,
				overlay: &self.overlay,
				interaction: &self.interaction,
				viewport: &self.viewport,
				scale: &self.scale,
				theme: &self.theme,
			};
			let mut surface = RecordingSurface::default();
			render(&frame, &mut surface, time);
			surface.commands
		}

		fn select(&mut self, id: &str) {
			self.interaction.set_selection(Some(id.into()), &self.model);
		}

		fn radial_circles_at(&self, cmds: &[PaintCmd], id: &str) -> Vec<RadialGradient> {
			let (px, py) = self.positions[id];
			cmds.iter()
				.filter_map(|c| match c {
					PaintCmd::Circle {
						x,
						y,
						fill: Fill::Radial(g),
						..
					} if *x == px && *y == py => Some(g.clone()),
					_ => None,
				})
				.collect()
		}
	}

	fn texts(cmds: &[PaintCmd]) -> Vec<String> {
		cmds.iter()
			.filter_map(|c| match c {
				PaintCmd::Text { text, .. } => Some(text.clone()),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn flagged_node_gets_two_glows() {
		let scene = Scene::triangle_flagged_a();
		let cmds = scene.paint(0.0);
		// two glow layers plus the body
		assert_eq!(scene.radial_circles_at(&cmds, "A").len(), 3);
		assert_eq!(scene.radial_circles_at(&cmds, "B").len(), 1);
		assert_eq!(scene.radial_circles_at(&cmds, "C").len(), 1);
	}

	#[test]
	fn unknown_selection_dims_every_node() {
		let mut scene = Scene::triangle_flagged_a();
		scene.select("Z");
		for id in scene.model.nodes() {
			assert!(node_state(id, &scene.interaction, &scene.overlay).dimmed);
		}
		for link in scene.model.links() {
			assert_eq!(
				link_state(link, &scene.interaction, &scene.overlay),
				LinkState::Dimmed
			);
		}
		let cmds = scene.paint(0.0);
		let dimmed = scene.theme.node.dimmed.base;
		for id in ["A", "B", "C"] {
			let bodies = scene.radial_circles_at(&cmds, id);
			assert_eq!(bodies.len(), 1, "no glow on dimmed {id}");
			assert_eq!(bodies[0].stops[1].1, dimmed);
		}
		assert!(!cmds.iter().any(|c| matches!(c, PaintCmd::Polygon { .. })));
	}

	#[test]
	fn selection_highlights_neighborhood() {
		let mut scene = Scene::new(
			GraphModel::build(&[
				row("t1", "A", "B", 1.0),
				row("t2", "B", "C", 1.0),
				row("t3", "D", "E", 1.0),
			]),
			RiskOverlay::build(&[flag("D", 80.0, &["cycle_length_3"])]),
		);
		scene.select("B");
		let states: Vec<_> = scene
			.model
			.links()
			.iter()
			.map(|l| link_state(l, &scene.interaction, &scene.overlay))
			.collect();
		assert_eq!(
			states,
			vec![
				LinkState::Highlighted { suspicious: false },
				LinkState::Highlighted { suspicious: false },
				LinkState::Dimmed,
			]
		);
	}

	#[test]
	fn link_states_without_selection() {
		let scene = Scene::triangle_flagged_a();
		let states: Vec<_> = scene
			.model
			.links()
			.iter()
			.map(|l| link_state(l, &scene.interaction, &scene.overlay))
			.collect();
		assert_eq!(
			states,
			vec![LinkState::Suspicious, LinkState::Normal, LinkState::Suspicious]
		);
	}

	#[test]
	fn background_click_undims_next_frame() {
		let mut scene = Scene::triangle_flagged_a();
		scene.select("B");
		scene.interaction.set_selection(None, &scene.model);
		let cmds = scene.paint(0.0);
		let dimmed = scene.theme.node.dimmed.base;
		for id in ["A", "B", "C"] {
			let bodies = scene.radial_circles_at(&cmds, id);
			assert!(bodies.iter().all(|g| g.stops.len() < 3 || g.stops[1].1 != dimmed));
		}
	}

	#[test]
	fn labels_only_for_flagged_or_focused() {
		let mut scene = Scene::triangle_flagged_a();
		assert_eq!(texts(&scene.paint(0.0)), vec!["A".to_string()]);

		scene.interaction.set_hover(Some("A".into()));
		assert_eq!(texts(&scene.paint(0.0)), vec!["A (90)".to_string()]);

		scene.interaction.set_hover(Some("C".into()));
		let labels = texts(&scene.paint(0.0));
		assert!(labels.contains(&"A".to_string()));
		assert!(labels.contains(&"C".to_string()));
		assert!(!labels.contains(&"B".to_string()));
	}

	#[test]
	fn overlay_entry_without_node_draws_nothing() {
		let plain = Scene::triangle_flagged_a();
		let extra = Scene::new(
			GraphModel::build(&triangle()),
			RiskOverlay::build(&[
				flag("A", 90.0, &["fan_out"]),
				flag("Z", 50.0, &["fan_out"]),
			]),
		);
		let cmds = extra.paint(0.0);
		assert_eq!(cmds.len(), plain.paint(0.0).len());
		assert_eq!(cmds, plain.paint(0.0));
		assert!(!texts(&cmds).iter().any(|t| t.starts_with('Z')));
	}

	#[test]
	fn focused_node_is_larger() {
		let mut scene = Scene::triangle_flagged_a();
		let before = scene.radial_circles_at(&scene.paint(0.0), "C")[0].outer.2;
		scene.interaction.set_hover(Some("C".into()));
		let after = scene.radial_circles_at(&scene.paint(0.0), "C")[0].outer.2;
		assert!((after / before - 1.5).abs() < 1e-9);
	}

	#[test]
	fn identical_inputs_paint_identically() {
		let mut scene = Scene::triangle_flagged_a();
		scene.select("B");
		assert_eq!(scene.paint(1.25), scene.paint(1.25));
	}

	#[test]
	fn time_only_moves_selection_rings() {
		let mut scene = Scene::triangle_flagged_a();
		scene.select("B");
		let a = scene.paint(0.0);
		let b = scene.paint(0.4);
		assert_eq!(a.len(), b.len());
		for (x, y) in a.iter().zip(&b) {
			if x != y {
				assert!(matches!(x, PaintCmd::Ring { .. }));
			}
		}
		assert_ne!(a, b);
	}

	#[test]
	fn grid_density_is_zoom_independent() {
		let mut scene = Scene::new(GraphModel::default(), RiskOverlay::default());
		let count = |cmds: &[PaintCmd]| {
			cmds.iter()
				.filter(|c| matches!(c, PaintCmd::Line { .. }))
				.count() as i64
		};
		let at_one = count(&scene.paint(0.0));
		scene.viewport.transform.k = 4.0;
		let at_four = count(&scene.paint(0.0));
		assert!(at_one > 0);
		assert!((at_one - at_four).abs() <= 2);
	}

	#[test]
	fn parallel_links_curve_apart() {
		let scene = Scene::new(
			GraphModel::build(&[
				row("t1", "A", "B", 1.0),
				row("t2", "A", "B", 2.0),
				row("t3", "B", "A", 3.0),
			]),
			RiskOverlay::default(),
		);
		let cmds = scene.paint(0.0);
		let curves: Vec<_> = cmds
			.iter()
			.filter_map(|c| match c {
				PaintCmd::Curve { control, .. } => Some(*control),
				_ => None,
			})
			.collect();
		assert_eq!(curves.len(), 2);
		assert_ne!(curves[0], curves[1]);
		// one straight link plus a grid made of lines
		assert!(cmds.iter().any(|c| matches!(c, PaintCmd::Line { .. })));
		let arrows = cmds
			.iter()
			.filter(|c| matches!(c, PaintCmd::Polygon { .. }))
			.count();
		assert_eq!(arrows, 3);
	}

	#[test]
	fn unparsed_amount_renders() {
		let mut rows = triangle();
		rows[0].amount = Amount::parse("twelve");
		let scene = Scene::new(GraphModel::build(&rows), RiskOverlay::default());
		let arrows = scene
			.paint(0.0)
			.iter()
			.filter(|c| matches!(c, PaintCmd::Polygon { .. }))
			.count();
		assert_eq!(arrows, 3);
	}

	#[test]
	fn missing_positions_are_skipped() {
		let mut scene = Scene::triangle_flagged_a();
		scene.positions.remove("C");
		let cmds = scene.paint(0.0);
		let arrows = cmds
			.iter()
			.filter(|c| matches!(c, PaintCmd::Polygon { .. }))
			.count();
		assert_eq!(arrows, 1);
	}
}
