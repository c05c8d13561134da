//! Sizes and opacities that depend on the current zoom `k`.
//!
//! Everything is drawn after the view transform is applied, so a value in
//! world units grows on screen as `k` grows. To keep something a fixed number
//! of pixels, divide it by `k` first. [`ScaledValues`] does that once per frame
//! for every primitive the renderer draws:
//!
//! - node bodies stay in world units, so focusing a neighborhood enlarges it
//! - line widths, label text, rings, and grid cells stay in pixels
//! - arrowheads and hit targets follow the world but are held between pixel
//!   bounds so they stay visible and clickable at any zoom

/// Ease-in-out curve on `[0, 1]`.
pub fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// How a length reacts to zoom.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// World units.
	World,
	/// Pixels.
	Screen,
	/// World units, held between `min_screen` and `max_screen` pixels.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space length for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match *self {
			Self::World => base,
			Self::Screen => base / k,
			Self::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// How an opacity reacts to zoom.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	/// Equal to `k`, capped at 1.
	ScaleWithZoom,
	/// Linear ramp from 0 at `zero_alpha_k` to 1 at `full_alpha_k`.
	Fade {
		zero_alpha_k: f64,
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Opacity multiplier in `[0, 1]` at zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match *self {
			Self::ScaleWithZoom => k.clamp(0.0, 1.0),
			Self::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				let span = full_alpha_k - zero_alpha_k;
				if span == 0.0 {
					1.0
				} else {
					((k - zero_alpha_k) / span).clamp(0.0, 1.0)
				}
			}
		}
	}
}

/// Node body, hit target, and label sizes.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base radius of an unflagged node in world units.
	pub radius: f64,
	/// Base radius of a flagged node in world units.
	pub suspicious_radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Radius multiplier for hovered or selected nodes.
	pub focus_scale: f64,
	/// Pointer pick radius in world units.
	pub hit_radius: f64,
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Below this zoom labels shrink with the graph instead of holding their pixel size.
	pub label_min_k: f64,
	/// Gap between node edge and label pill, in screen pixels.
	pub label_gap: f64,
	/// Horizontal/vertical padding inside the label pill, in screen pixels.
	pub label_padding: (f64, f64),
}

/// Configuration for link visual scaling.
#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	/// Stroke width in pixels.
	pub line_width: f64,
	/// Sideways bend per parallel link, in world units.
	pub parallel_spacing: f64,
}

/// Arrowhead size and fade-out.
#[derive(Clone, Debug)]
pub struct ArrowScaleConfig {
	/// Base arrow size in world units.
	pub size: f64,
	pub size_behavior: ScaleBehavior,
	pub alpha_behavior: AlphaBehavior,
	/// Below this opacity arrows are skipped.
	pub cull_alpha: f64,
}

/// Configuration for glow and selection-ring effects.
#[derive(Clone, Debug)]
pub struct GlowScaleConfig {
	/// Outer glow radius as a multiple of the node radius.
	pub outer_radius: f64,
	/// Inner glow radius as a multiple of the node radius.
	pub inner_radius: f64,
	/// Stroke width for selection rings in screen pixels.
	pub ring_width: f64,
	/// Ring offset from node edge in screen pixels.
	pub ring_offset: f64,
	/// Ring radius oscillation amplitude in screen pixels.
	pub pulse_amplitude: f64,
	/// Ring oscillation speed in radians per second.
	pub pulse_speed: f64,
}

/// Configuration for the background grid.
#[derive(Clone, Debug)]
pub struct GridScaleConfig {
	/// Grid cell size in screen pixels.
	pub cell: f64,
	/// Grid line width in screen pixels.
	pub line_width: f64,
	/// Upper bound on lines per axis.
	pub max_lines: usize,
	pub alpha_behavior: AlphaBehavior,
}

/// Zoom behavior of every drawn element.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node bodies, hit targets, labels.
	pub node: NodeScaleConfig,
	/// Link strokes.
	pub link: LinkScaleConfig,
	/// Arrowheads.
	pub arrow: ArrowScaleConfig,
	/// Glows and selection rings.
	pub glow: GlowScaleConfig,
	/// Background grid.
	pub grid: GridScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 4.0,
				suspicious_radius: 6.0,
				radius_behavior: ScaleBehavior::World,
				focus_scale: 1.5,
				hit_radius: 8.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
				label_size: 11.0,
				label_min_k: 0.5,
				label_gap: 4.0,
				label_padding: (5.0, 3.0),
			},
			link: LinkScaleConfig {
				line_width: 1.0,
				parallel_spacing: 8.0,
			},
			arrow: ArrowScaleConfig {
				size: 4.0,
				size_behavior: ScaleBehavior::Clamped {
					min_screen: 0.0,
					max_screen: 14.0,
				},
				alpha_behavior: AlphaBehavior::ScaleWithZoom,
				cull_alpha: 0.05,
			},
			glow: GlowScaleConfig {
				outer_radius: 4.0,
				inner_radius: 2.0,
				ring_width: 1.5,
				ring_offset: 3.0,
				pulse_amplitude: 2.0,
				pulse_speed: 4.0,
			},
			grid: GridScaleConfig {
				cell: 48.0,
				line_width: 1.0,
				max_lines: 200,
				alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.05,
					full_alpha_k: 0.3,
				},
			},
		}
	}
}

/// Every zoom-dependent size for one frame, already in world units.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom the values were resolved at.
	pub k: f64,
	pub node_radius: f64,
	pub suspicious_radius: f64,
	pub hit_radius: f64,
	pub label_font_size: f64,
	/// Label font string (e.g., "11px sans-serif").
	pub label_font: String,
	pub label_gap: f64,
	pub label_padding: (f64, f64),
	pub link_width: f64,
	pub parallel_spacing: f64,
	pub arrow_size: f64,
	pub arrow_alpha: f64,
	/// Arrows are too faint to be worth drawing.
	pub cull_arrows: bool,
	pub ring_width: f64,
	pub ring_offset: f64,
	pub pulse_amplitude: f64,
	/// Ring oscillation speed in radians per second (zoom-independent).
	pub pulse_speed: f64,
	pub grid_cell: f64,
	pub grid_line_width: f64,
	pub grid_alpha: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_radius = config.node.radius_behavior.apply(config.node.radius, k);
		let suspicious_radius = config
			.node
			.radius_behavior
			.apply(config.node.suspicious_radius, k);
		let hit_radius = config.node.hit_behavior.apply(config.node.hit_radius, k);
		let label_font_size = config.node.label_size / k.max(config.node.label_min_k);
		let arrow_alpha = config.arrow.alpha_behavior.apply(k);

		Self {
			k,
			node_radius,
			suspicious_radius,
			hit_radius,
			label_font_size,
			label_font: format!("{}px sans-serif", label_font_size),
			label_gap: config.node.label_gap / k,
			label_padding: (
				config.node.label_padding.0 / k,
				config.node.label_padding.1 / k,
			),
			link_width: config.link.line_width / k,
			parallel_spacing: config.link.parallel_spacing,
			arrow_size: config.arrow.size_behavior.apply(config.arrow.size, k),
			arrow_alpha,
			cull_arrows: arrow_alpha < config.arrow.cull_alpha,
			ring_width: config.glow.ring_width / k,
			ring_offset: config.glow.ring_offset / k,
			pulse_amplitude: config.glow.pulse_amplitude / k,
			pulse_speed: config.glow.pulse_speed,
			grid_cell: config.grid.cell / k,
			grid_line_width: config.grid.line_width / k,
			grid_alpha: config.grid.alpha_behavior.apply(k),
		}
	}
}
