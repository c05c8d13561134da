//! Interaction state: hover, selection, and the derived adjacency set.
//!
//! Also holds the view transform and the pan gesture tracker shared by the
//! viewport controller and the canvas event handlers.

use std::collections::HashSet;

use super::model::{GraphModel, Link};

/// Pan and zoom transform applied to the entire graph view.
///
/// A world point `(wx, wy)` lands on screen at `(wx * k + x, wy * k + y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal screen offset in pixels.
	pub x: f64,
	/// Vertical screen offset in pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Screen pixel to world point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// World point to screen pixel.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Transform that puts world point `(gx, gy)` at the center of a
	/// `width` x `height` surface at zoom `k`.
	pub fn centered_on(gx: f64, gy: f64, k: f64, width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0 - gx * k,
			y: height / 2.0 - gy * k,
			k,
		}
	}

	/// Componentwise blend, `t = 0` is `self`.
	pub fn lerp(self, other: ViewTransform, t: f64) -> Self {
		Self {
			x: self.x + (other.x - self.x) * t,
			y: self.y + (other.y - self.y) * t,
			k: self.k + (other.k - self.k) * t,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	/// Set once the pointer travels far enough that the gesture is a drag, so
	/// the trailing click is not treated as a background click.
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Pointer travel (px) beyond which a press becomes a pan.
pub const PAN_THRESHOLD: f64 = 4.0;

/// Accounts one hop from `selected` in either direction, plus `selected`.
///
/// Empty when nothing is selected or the id is not a node of `model`.
pub fn adjacency(selected: Option<&str>, model: &GraphModel) -> HashSet<String> {
	let mut set = HashSet::new();
	let Some(id) = selected else {
		return set;
	};
	if !model.contains(id) {
		return set;
	}

	set.insert(id.to_string());
	for link in model.links() {
		if link.source == id {
			set.insert(link.target.clone());
		} else if link.target == id {
			set.insert(link.source.clone());
		}
	}
	set
}

/// Hovered and selected accounts with the adjacency set of the selection.
#[derive(Clone, Debug, Default)]
pub struct InteractionState {
	hovered: Option<String>,
	selected: Option<String>,
	adjacency: HashSet<String>,
}

impl InteractionState {
	/// Account under the pointer.
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	/// Clicked account, possibly one no longer in the graph.
	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// Selection plus its one-hop neighbors.
	pub fn adjacency(&self) -> &HashSet<String> {
		&self.adjacency
	}

	/// Whether a selection exists (even one that matched no node).
	pub fn has_selection(&self) -> bool {
		self.selected.is_some()
	}

	/// Whether the node should be drawn dimmed.
	pub fn is_dimmed(&self, id: &str) -> bool {
		self.has_selection() && !self.adjacency.contains(id)
	}

	/// Whether the link joins two members of the adjacency set.
	pub fn link_in_focus(&self, link: &Link) -> bool {
		self.adjacency.contains(&link.source) && self.adjacency.contains(&link.target)
	}

	/// Returns true when the hovered id changed.
	pub fn set_hover(&mut self, id: Option<String>) -> bool {
		if self.hovered == id {
			return false;
		}
		self.hovered = id;
		true
	}

	/// Replaces the selection and rescans the links. Returns true on change.
	pub fn set_selection(&mut self, id: Option<String>, model: &GraphModel) -> bool {
		if self.selected == id {
			return false;
		}
		self.adjacency = adjacency(id.as_deref(), model);
		self.selected = id;
		true
	}

	/// Drops hover and selection, e.g. after the graph model is replaced.
	pub fn clear(&mut self) {
		self.hovered = None;
		self.selected = None;
		self.adjacency.clear();
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::force_graph::model::tests::{row, triangle};

	fn ids(items: &[&str]) -> HashSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn selecting_middle_of_triangle() {
		let model = GraphModel::build(&triangle());
		assert_eq!(adjacency(Some("B"), &model), ids(&["A", "B", "C"]));
	}

	#[test]
	fn direction_agnostic() {
		let model = GraphModel::build(&[row("t1", "A", "B", 1.0), row("t2", "C", "A", 1.0)]);
		assert_eq!(adjacency(Some("B"), &model), ids(&["A", "B"]));
		assert_eq!(adjacency(Some("A"), &model), ids(&["A", "B", "C"]));
	}

	#[test]
	fn unknown_or_missing_selection_is_empty() {
		let model = GraphModel::build(&triangle());
		assert!(adjacency(Some("Z"), &model).is_empty());
		assert!(adjacency(None, &model).is_empty());
	}

	#[test]
	fn stale_selection_dims_everything() {
		let model = GraphModel::build(&triangle());
		let mut state = InteractionState::default();
		assert!(state.set_selection(Some("Z".into()), &model));
		for id in model.nodes() {
			assert!(state.is_dimmed(id));
		}
	}

	#[test]
	fn clear_undims() {
		let model = GraphModel::build(&triangle());
		let mut state = InteractionState::default();
		state.set_selection(Some("A".into()), &model);
		state.set_hover(Some("B".into()));
		state.clear();
		assert_eq!(state.selected(), None);
		assert_eq!(state.hovered(), None);
		assert!(!state.is_dimmed("C"));
	}

	#[test]
	fn hover_reports_change_once() {
		let mut state = InteractionState::default();
		assert!(state.set_hover(Some("A".into())));
		assert!(!state.set_hover(Some("A".into())));
		assert!(state.set_hover(None));
	}

	#[test]
	fn transform_round_trip() {
		let t = ViewTransform::centered_on(10.0, -5.0, 2.0, 800.0, 600.0);
		assert_eq!(t.graph_to_screen(10.0, -5.0), (400.0, 300.0));
		assert_eq!(t.screen_to_graph(400.0, 300.0), (10.0, -5.0));
	}

	proptest! {
		#[test]
		fn adjacency_is_one_hop(edges in prop::collection::vec((0u8..8, 0u8..8), 1..30), pick in 0usize..8) {
			let rows: Vec<_> = edges
				.iter()
				.enumerate()
				.map(|(i, (a, b))| row(&format!("t{i}"), &format!("N{a}"), &format!("N{b}"), 1.0))
				.collect();
			let model = GraphModel::build(&rows);
			let s = format!("N{pick}");
			let set = adjacency(Some(&s), &model);

			if model.contains(&s) {
				let mut expected = HashSet::from([s.clone()]);
				for r in &rows {
					if r.sender_id == s {
						expected.insert(r.receiver_id.clone());
					}
					if r.receiver_id == s {
						expected.insert(r.sender_id.clone());
					}
				}
				prop_assert_eq!(set, expected);
			} else {
				prop_assert!(set.is_empty());
			}
		}
	}
}
