//! Surface size and camera control.
//!
//! The camera is a [`ViewTransform`]. Focus requests animate it toward a target
//! over a fixed duration; a newer request simply starts from wherever the
//! camera currently is.

use super::scale::smooth_step;
use super::state::ViewTransform;

/// Default surface width used until the container can be measured.
pub const DEFAULT_WIDTH: f64 = 800.0;
/// Default surface height. The graph height is fixed by layout.
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Camera and sizing configuration.
#[derive(Clone, Debug)]
pub struct ViewportConfig {
	/// Surface height in pixels.
	pub height: f64,
	/// Zoom applied when focusing a selected node.
	pub focus_zoom: f64,
	/// Focus/zoom transition length in seconds.
	pub transition_secs: f64,
	/// Lowest zoom reachable.
	pub min_zoom: f64,
	/// Highest zoom reachable.
	pub max_zoom: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			height: DEFAULT_HEIGHT,
			focus_zoom: 3.0,
			transition_secs: 0.6,
			min_zoom: 0.1,
			max_zoom: 10.0,
		}
	}
}

/// Camera instruction: center `(x, y)` in world space at `zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusRequest {
	/// World x to center.
	pub x: f64,
	/// World y to center.
	pub y: f64,
	/// Target zoom.
	pub zoom: f64,
}

#[derive(Clone, Copy, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	started_at: f64,
}

/// Surface dimensions and the animated camera.
#[derive(Clone, Debug)]
pub struct Viewport {
	/// Surface width in pixels.
	pub width: f64,
	/// Surface height in pixels.
	pub height: f64,
	/// Current camera.
	pub transform: ViewTransform,
	config: ViewportConfig,
	transition: Option<Transition>,
}

impl Viewport {
	/// Viewport of `width` (or the default) centered on the world origin.
	pub fn new(width: Option<f64>, config: ViewportConfig) -> Self {
		let width = width.filter(|w| *w > 0.0).unwrap_or(DEFAULT_WIDTH);
		let height = config.height;
		Self {
			width,
			height,
			transform: ViewTransform::centered_on(0.0, 0.0, 1.0, width, height),
			config,
			transition: None,
		}
	}

	/// Camera and sizing settings.
	pub fn config(&self) -> &ViewportConfig {
		&self.config
	}

	/// Applies a measured container width. `None` (container not mounted) or a
	/// non-positive width keeps the current size. Returns true on change.
	pub fn measure(&mut self, width: Option<f64>) -> bool {
		let Some(width) = width.filter(|w| *w > 0.0) else {
			return false;
		};
		if (width - self.width).abs() < 0.5 {
			return false;
		}
		// Keep the world point at the old center in the middle.
		let shift = (width - self.width) / 2.0;
		self.width = width;
		self.transform.x += shift;
		if let Some(t) = self.transition.as_mut() {
			t.from.x += shift;
			t.to.x += shift;
		}
		true
	}

	/// World point currently at the middle of the surface.
	pub fn center(&self) -> (f64, f64) {
		self.transform
			.screen_to_graph(self.width / 2.0, self.height / 2.0)
	}

	/// Starts animating toward `request`, replacing any running transition.
	pub fn focus(&mut self, request: FocusRequest, now: f64) {
		let zoom = request.zoom.clamp(self.config.min_zoom, self.config.max_zoom);
		let target = ViewTransform::centered_on(request.x, request.y, zoom, self.width, self.height);
		self.start(target, now);
	}

	/// Animates back to 1x around the current view center.
	pub fn reset_zoom(&mut self, now: f64) {
		let (cx, cy) = self.center();
		self.focus(
			FocusRequest {
				x: cx,
				y: cy,
				zoom: 1.0,
			},
			now,
		);
	}

	fn start(&mut self, target: ViewTransform, now: f64) {
		if self.config.transition_secs <= 0.0 {
			self.transform = target;
			self.transition = None;
			return;
		}
		self.transition = Some(Transition {
			from: self.transform,
			to: target,
			started_at: now,
		});
	}

	/// Drops the running transition, leaving the camera where it is.
	pub fn cancel_transition(&mut self) {
		self.transition = None;
	}

	/// Whether a focus transition is running.
	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Target of the running transition, if any.
	pub fn target(&self) -> Option<ViewTransform> {
		self.transition.map(|t| t.to)
	}

	/// Advances the running transition to time `now`.
	pub fn tick(&mut self, now: f64) {
		let Some(t) = self.transition else {
			return;
		};
		let progress = (now - t.started_at) / self.config.transition_secs;
		if progress >= 1.0 {
			self.transform = t.to;
			self.transition = None;
		} else {
			self.transform = t.from.lerp(t.to, smooth_step(progress));
		}
	}

	/// Wheel zoom anchored at screen point `(sx, sy)`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.cancel_transition();
		let new_k = (self.transform.k * factor).clamp(self.config.min_zoom, self.config.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}
