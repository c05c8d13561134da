//! Drawing primitives the renderer paints through.
//!
//! The renderer only ever talks to a [`Surface`]. The browser build implements
//! it for `CanvasRenderingContext2d`; tests use a recording surface.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ViewTransform;
use super::theme::Color;

/// A radial gradient between two circles.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
	/// Inner circle `(x, y, r)`.
	pub inner: (f64, f64, f64),
	/// Outer circle `(x, y, r)`.
	pub outer: (f64, f64, f64),
	/// Color stops as `(offset, color)`, offsets in `[0, 1]`.
	pub stops: Vec<(f64, Color)>,
}

/// How a closed shape is filled.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
	Solid(Color),
	Radial(RadialGradient),
}

/// A 2-D drawing target.
pub trait Surface {
	fn save(&mut self);
	fn restore(&mut self);
	/// Maps world coordinates onto the surface for subsequent calls.
	fn apply_transform(&mut self, transform: &ViewTransform);
	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);
	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);
	fn stroke_quadratic(
		&mut self,
		from: (f64, f64),
		control: (f64, f64),
		to: (f64, f64),
		color: Color,
		width: f64,
	);
	fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color);
	fn fill_circle(&mut self, x: f64, y: f64, r: f64, fill: &Fill);
	fn stroke_circle(&mut self, x: f64, y: f64, r: f64, color: Color, width: f64);
	fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Color);
	/// Draws text centered on `(x, y)`.
	fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: Color);
	fn measure_text(&mut self, text: &str, font: &str) -> f64;
}

impl Surface for CanvasRenderingContext2d {
	fn save(&mut self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&mut self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn apply_transform(&mut self, transform: &ViewTransform) {
		let _ = self.translate(transform.x, transform.y);
		let _ = self.scale(transform.k, transform.k);
	}

	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
		self.set_fill_style_str(&color.to_css());
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn stroke_quadratic(
		&mut self,
		from: (f64, f64),
		control: (f64, f64),
		to: (f64, f64),
		color: Color,
		width: f64,
	) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.quadratic_curve_to(control.0, control.1, to.0, to.1);
		self.stroke();
	}

	fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
		let Some((first, rest)) = points.split_first() else {
			return;
		};
		self.set_fill_style_str(&color.to_css());
		self.begin_path();
		self.move_to(first.0, first.1);
		for p in rest {
			self.line_to(p.0, p.1);
		}
		self.close_path();
		self.fill();
	}

	fn fill_circle(&mut self, x: f64, y: f64, r: f64, fill: &Fill) {
		match fill {
			Fill::Solid(color) => self.set_fill_style_str(&color.to_css()),
			Fill::Radial(g) => {
				let Ok(gradient) = self.create_radial_gradient(
					g.inner.0, g.inner.1, g.inner.2, g.outer.0, g.outer.1, g.outer.2,
				) else {
					return;
				};
				for (offset, color) in &g.stops {
					let _ = gradient.add_color_stop(*offset as f32, &color.to_css());
				}
				#[allow(deprecated)]
				self.set_fill_style(&gradient);
			}
		}
		self.begin_path();
		let _ = self.arc(x, y, r, 0.0, 2.0 * PI);
		self.fill();
	}

	fn stroke_circle(&mut self, x: f64, y: f64, r: f64, color: Color, width: f64) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		let _ = self.arc(x, y, r, 0.0, 2.0 * PI);
		self.stroke();
	}

	fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Color) {
		let r = radius.min(w / 2.0).min(h / 2.0);
		self.set_fill_style_str(&color.to_css());
		self.begin_path();
		self.move_to(x + r, y);
		self.line_to(x + w - r, y);
		self.quadratic_curve_to(x + w, y, x + w, y + r);
		self.line_to(x + w, y + h - r);
		self.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
		self.line_to(x + r, y + h);
		self.quadratic_curve_to(x, y + h, x, y + h - r);
		self.line_to(x, y + r);
		self.quadratic_curve_to(x, y, x + r, y);
		self.close_path();
		self.fill();
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: Color) {
		self.set_font(font);
		self.set_text_align("center");
		self.set_text_baseline("middle");
		self.set_fill_style_str(&color.to_css());
		let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
	}

	fn measure_text(&mut self, text: &str, font: &str) -> f64 {
		self.set_font(font);
		CanvasRenderingContext2d::measure_text(self, text)
			.map(|m| m.width())
			.unwrap_or(0.0)
	}
}
