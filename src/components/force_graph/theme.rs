//! Visual theming for the transaction graph.
//!
//! Colors for the dark analyst background, link states, and the per-state node
//! gradient ramps.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Multiplies the current alpha.
	pub fn fade(self, factor: f64) -> Self {
		Self {
			a: self.a * factor,
			..self
		}
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Three-stop radial ramp used for node bodies: highlight, body, rim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeRamp {
	pub highlight: Color,
	pub base: Color,
	pub shadow: Color,
}

impl NodeRamp {
	pub const fn new(highlight: Color, base: Color, shadow: Color) -> Self {
		Self {
			highlight,
			base,
			shadow,
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	pub grid_color: Color,
}

/// Link colors and width multipliers per link state.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub normal: Color,
	pub suspicious: Color,
	pub highlighted: Color,
	/// Highlighted link touching a flagged account.
	pub highlighted_suspicious: Color,
	pub dimmed: Color,
	pub suspicious_width: f64,
	pub highlighted_width: f64,
	/// Arrow size multiplier for highlighted links.
	pub highlighted_arrow: f64,
}

/// Node colors per node state.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub normal: NodeRamp,
	pub suspicious: NodeRamp,
	/// Hovered or selected accounts that are not flagged.
	pub focused: NodeRamp,
	pub dimmed: NodeRamp,
	/// Wide, faint glow around flagged accounts.
	pub glow_outer: Color,
	/// Tight, stronger glow around flagged accounts.
	pub glow_inner: Color,
	pub ring: Color,
}

/// Label pill style.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub background: Color,
	pub text: Color,
	pub suspicious_text: Color,
	/// Alpha multiplier for labels of dimmed nodes.
	pub dimmed_alpha: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Display name.
	pub name: &'static str,
	/// Canvas fill and grid.
	pub background: BackgroundStyle,
	/// Link colors per state.
	pub link: LinkStyle,
	/// Node ramps, glows, and rings.
	pub node: NodeStyle,
	/// Label pills.
	pub label: LabelStyle,
}

impl Theme {
	/// Dark analyst theme: slate background, red for risk, indigo for focus.
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(10, 12, 20),
				grid_color: Color::rgba(148, 163, 184, 0.06),
			},
			link: LinkStyle {
				normal: Color::rgba(148, 163, 184, 0.25),
				suspicious: Color::rgba(239, 68, 68, 0.45),
				highlighted: Color::rgba(129, 140, 248, 0.85),
				highlighted_suspicious: Color::rgba(248, 113, 113, 0.9),
				dimmed: Color::rgba(100, 116, 139, 0.06),
				suspicious_width: 1.5,
				highlighted_width: 2.0,
				highlighted_arrow: 1.5,
			},
			node: NodeStyle {
				normal: NodeRamp::new(
					Color::rgb(226, 232, 240),
					Color::rgb(148, 163, 184),
					Color::rgb(71, 85, 105),
				),
				suspicious: NodeRamp::new(
					Color::rgb(252, 165, 165),
					Color::rgb(239, 68, 68),
					Color::rgb(153, 27, 27),
				),
				focused: NodeRamp::new(
					Color::rgb(199, 210, 254),
					Color::rgb(99, 102, 241),
					Color::rgb(55, 48, 163),
				),
				dimmed: NodeRamp::new(
					Color::rgba(75, 85, 99, 0.35),
					Color::rgba(55, 65, 81, 0.3),
					Color::rgba(31, 41, 55, 0.25),
				),
				glow_outer: Color::rgba(239, 68, 68, 0.15),
				glow_inner: Color::rgba(239, 68, 68, 0.4),
				ring: Color::rgba(165, 180, 252, 0.9),
			},
			label: LabelStyle {
				background: Color::rgba(15, 23, 42, 0.85),
				text: Color::rgb(226, 232, 240),
				suspicious_text: Color::rgb(252, 165, 165),
				dimmed_alpha: 0.35,
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgba(1, 2, 3, 0.5).to_css(),
			"rgba(1, 2, 3, 0.5)"
		);
	}

	#[test]
	fn fade_multiplies_alpha() {
		let c = Color::rgba(0, 0, 0, 0.5).fade(0.5);
		assert_eq!(c.a, 0.25);
		assert_eq!(Color::rgb(0, 0, 0).lighten(1.0), Color::rgb(255, 255, 255));
	}
}
