//! Pointer events to state transitions.
//!
//! Handlers only touch [`InteractionState`] and [`Viewport`]. The graph model,
//! risk overlay, and positions are read, never written.

use super::model::GraphModel;
use super::render::{Frame, node_radius, node_state};
use super::scale::ScaledValues;
use super::simulation::PositionSource;
use super::state::InteractionState;
use super::viewport::{FocusRequest, Viewport};

/// Semantic events reported to the host page.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// The pointer moved onto an account, or off all of them.
	NodeHovered(Option<String>),
	/// An account was selected, or the selection was cleared.
	NodeSelected(Option<String>),
	/// The canvas took a new size.
	ViewportResized {
		/// Width in pixels.
		width: f64,
		/// Height in pixels.
		height: f64,
	},
}

/// Pointer input already resolved against the node set.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
	/// Pointer over a node, or over empty space.
	Hover(Option<String>),
	/// Click that landed on a node.
	ClickNode(String),
	/// Click on empty space.
	ClickBackground,
}

/// Everything a handler may read or update.
pub struct InteractionContext<'a> {
	/// Hover and selection.
	pub state: &'a mut InteractionState,
	/// Camera, for focus and reset.
	pub viewport: &'a mut Viewport,
	/// Graph the ids refer to.
	pub model: &'a GraphModel,
	/// Current node positions.
	pub positions: &'a dyn PositionSource,
}

/// Applies one pointer event. Returns the event to report, if any.
pub fn handle(event: PointerEvent, cx: InteractionContext<'_>, now: f64) -> Option<GraphEvent> {
	match event {
		PointerEvent::Hover(id) => cx
			.state
			.set_hover(id.clone())
			.then_some(GraphEvent::NodeHovered(id)),
		PointerEvent::ClickNode(id) => {
			if cx.state.selected() == Some(id.as_str()) {
				cx.state.set_selection(None, cx.model);
				log::debug!("selection cleared: {id}");
				return Some(GraphEvent::NodeSelected(None));
			}
			cx.state.set_selection(Some(id.clone()), cx.model);
			if let Some((x, y)) = cx.positions.position(&id) {
				let zoom = cx.viewport.config().focus_zoom;
				cx.viewport.focus(FocusRequest { x, y, zoom }, now);
			}
			log::debug!(
				"selected {id} ({} accounts in neighborhood)",
				cx.state.adjacency().len()
			);
			Some(GraphEvent::NodeSelected(Some(id)))
		}
		PointerEvent::ClickBackground => {
			cx.viewport.reset_zoom(now);
			cx.state
				.set_selection(None, cx.model)
				.then_some(GraphEvent::NodeSelected(None))
		}
	}
}

/// Drops hover and selection once the graph model is replaced, since both may
/// name accounts the new graph lacks. Returns the events reporting the clear.
pub fn replace_model(state: &mut InteractionState) -> Vec<GraphEvent> {
	let mut events = Vec::new();
	if state.hovered().is_some() {
		events.push(GraphEvent::NodeHovered(None));
	}
	if state.has_selection() {
		events.push(GraphEvent::NodeSelected(None));
	}
	state.clear();
	events
}

/// Node under screen point `(sx, sy)`: the nearest one within its hit radius.
/// A node's reach is at least its drawn radius, focus enlargement included.
pub fn pick_node(sx: f64, sy: f64, frame: &Frame<'_>) -> Option<String> {
	let (gx, gy) = frame.viewport.transform.screen_to_graph(sx, sy);
	let scale = ScaledValues::new(frame.scale, frame.viewport.transform.k);
	let mut found: Option<(&String, f64)> = None;

	for id in frame.model.nodes() {
		let Some((x, y)) = frame.positions.position(id) else {
			continue;
		};
		let state = node_state(id, frame.interaction, frame.overlay);
		let reach = scale.hit_radius.max(node_radius(state, &scale, frame.scale));
		let dist = (x - gx).hypot(y - gy);
		if dist < reach && found.is_none_or(|(_, best)| dist < best) {
			found = Some((id, dist));
		}
	}
	found.map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::components::force_graph::model::tests::triangle;
	use crate::components::force_graph::risk::RiskOverlay;
	use crate::components::force_graph::risk::tests::flag;
	use crate::components::force_graph::scale::ScaleConfig;
	use crate::components::force_graph::theme::Theme;
	use crate::components::force_graph::viewport::ViewportConfig;

	fn positions() -> HashMap<String, (f64, f64)> {
		HashMap::from([
			("A".to_string(), (0.0, 0.0)),
			("B".to_string(), (100.0, 0.0)),
			("C".to_string(), (50.0, 80.0)),
		])
	}

	struct Fixture {
		model: GraphModel,
		state: InteractionState,
		viewport: Viewport,
		positions: HashMap<String, (f64, f64)>,
	}

	impl Fixture {
		fn new() -> Self {
			Self {
				model: GraphModel::build(&triangle()),
				state: InteractionState::default(),
				viewport: Viewport::new(Some(800.0), ViewportConfig::default()),
				positions: positions(),
			}
		}

		fn send(&mut self, event: PointerEvent, now: f64) -> Option<GraphEvent> {
			handle(
				event,
				InteractionContext {
					state: &mut self.state,
					viewport: &mut self.viewport,
					model: &self.model,
					positions: &self.positions,
				},
				now,
			)
		}

		fn pick(&self, overlay: &RiskOverlay, gx: f64, gy: f64) -> Option<String> {
			let (scale, theme) = (ScaleConfig::default(), Theme::default());
			let frame = Frame {
				positions: &self.positions,
				model: &self.model,
				overlay,
				interaction: &self.state,
				viewport: &self.viewport,
				scale: &scale,
				theme: &theme,
			};
			let (sx, sy) = self.viewport.transform.graph_to_screen(gx, gy);
			pick_node(sx, sy, &frame)
		}
	}

	#[test]
	fn hover_sets_and_clears() {
		let mut f = Fixture::new();
		assert_eq!(
			f.send(PointerEvent::Hover(Some("A".into())), 0.0),
			Some(GraphEvent::NodeHovered(Some("A".into())))
		);
		assert_eq!(f.send(PointerEvent::Hover(Some("A".into())), 0.0), None);
		assert_eq!(
			f.send(PointerEvent::Hover(None), 0.0),
			Some(GraphEvent::NodeHovered(None))
		);
		assert_eq!(f.state.selected(), None);
	}

	#[test]
	fn click_selects_and_focuses() {
		let mut f = Fixture::new();
		let ev = f.send(PointerEvent::ClickNode("B".into()), 0.0);
		assert_eq!(ev, Some(GraphEvent::NodeSelected(Some("B".into()))));
		assert_eq!(f.state.adjacency().len(), 3);
		let target = f.viewport.target().unwrap();
		assert_eq!(target.k, 3.0);
		assert_eq!(target.graph_to_screen(100.0, 0.0), (400.0, 300.0));
	}

	#[test]
	fn clicking_selected_node_toggles_off() {
		let mut f = Fixture::new();
		f.send(PointerEvent::ClickNode("B".into()), 0.0);
		let ev = f.send(PointerEvent::ClickNode("B".into()), 0.1);
		assert_eq!(ev, Some(GraphEvent::NodeSelected(None)));
		assert!(!f.state.has_selection());
	}

	#[test]
	fn background_click_clears_and_resets_zoom() {
		let mut f = Fixture::new();
		f.send(PointerEvent::ClickNode("B".into()), 0.0);
		f.viewport.tick(1.0);
		assert_eq!(f.viewport.transform.k, 3.0);

		let ev = f.send(PointerEvent::ClickBackground, 1.0);
		assert_eq!(ev, Some(GraphEvent::NodeSelected(None)));
		f.viewport.tick(2.0);
		assert_eq!(f.viewport.transform.k, 1.0);
		for id in f.model.nodes() {
			assert!(!f.state.is_dimmed(id));
		}
		assert_eq!(f.send(PointerEvent::ClickBackground, 2.0), None);
	}

	#[test]
	fn pick_nearest_node() {
		let f = Fixture::new();
		let overlay = RiskOverlay::default();
		assert_eq!(f.pick(&overlay, 98.0, 2.0), Some("B".into()));
		assert_eq!(f.pick(&overlay, 50.0, 30.0), None);
	}

	#[test]
	fn pick_reaches_enlarged_focused_node() {
		let mut f = Fixture::new();
		let overlay = RiskOverlay::build(&[flag("B", 80.0, &["fan_in"])]);
		// Flagged body is 6, hit radius 8; focused it grows to 9.
		assert_eq!(f.pick(&overlay, 108.5, 0.0), None);
		f.send(PointerEvent::Hover(Some("B".into())), 0.0);
		assert_eq!(f.pick(&overlay, 108.5, 0.0), Some("B".into()));
		f.send(PointerEvent::Hover(None), 0.0);
		f.send(PointerEvent::ClickNode("B".into()), 0.0);
		assert_eq!(f.pick(&overlay, 108.5, 0.0), Some("B".into()));
	}

	#[test]
	fn replacing_model_reports_what_was_cleared() {
		let mut f = Fixture::new();
		assert!(replace_model(&mut f.state).is_empty());

		f.send(PointerEvent::Hover(Some("A".into())), 0.0);
		assert_eq!(
			replace_model(&mut f.state),
			vec![GraphEvent::NodeHovered(None)]
		);

		f.send(PointerEvent::Hover(Some("A".into())), 0.0);
		f.send(PointerEvent::ClickNode("B".into()), 0.0);
		assert_eq!(
			replace_model(&mut f.state),
			vec![GraphEvent::NodeHovered(None), GraphEvent::NodeSelected(None)]
		);
		assert_eq!(f.state.hovered(), None);
		assert!(!f.state.has_selection());
		assert!(f.state.adjacency().is_empty());
	}
}
