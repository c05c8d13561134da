//! Leptos component wrapping the transaction graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for hovering, selecting, panning, and zooming. An animation loop
//! runs via `requestAnimationFrame`, advancing the physics simulation and the
//! camera transition, then painting the frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};
use web_time::Instant;

use super::interaction::{self, GraphEvent, InteractionContext, PointerEvent, pick_node, replace_model};
use super::model::GraphModel;
use super::render::{self, Frame};
use super::risk::RiskOverlay;
use super::scale::ScaleConfig;
use super::simulation::Simulation;
use super::state::{InteractionState, PAN_THRESHOLD, PanState};
use super::theme::Theme;
use super::types::{FlaggedAccount, TransactionRecord};
use super::viewport::{DEFAULT_HEIGHT, Viewport, ViewportConfig};

const FRAME_DT: f32 = 0.016;

/// Everything the animation loop and the event handlers share.
struct GraphContext {
	model: Arc<GraphModel>,
	overlay: Arc<RiskOverlay>,
	simulation: Simulation,
	viewport: Viewport,
	interaction: InteractionState,
	pan: PanState,
	scale: ScaleConfig,
	theme: Theme,
	clock: Instant,
}

impl GraphContext {
	fn now(&self) -> f64 {
		self.clock.elapsed().as_secs_f64()
	}

	fn frame(&self) -> Frame<'_> {
		Frame {
			positions: &self.simulation,
			model: &self.model,
			overlay: &self.overlay,
			interaction: &self.interaction,
			viewport: &self.viewport,
			scale: &self.scale,
			theme: &self.theme,
		}
	}

	fn pick(&self, x: f64, y: f64) -> Option<String> {
		pick_node(x, y, &self.frame())
	}

	fn dispatch(&mut self, event: PointerEvent) -> Option<GraphEvent> {
		let now = self.now();
		interaction::handle(
			event,
			InteractionContext {
				state: &mut self.interaction,
				viewport: &mut self.viewport,
				model: &self.model,
				positions: &self.simulation,
			},
			now,
		)
	}
}

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Width of the canvas's parent element, if the canvas is mounted.
fn container_width(canvas: &HtmlCanvasElement) -> Option<f64> {
	let parent = canvas.parent_element()?;
	Some(parent.client_width() as f64).filter(|w| *w > 0.0)
}

/// Pointer position relative to the canvas.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders the transaction graph with fraud-risk highlighting.
///
/// `transactions` drives the node and link set; `flagged` drives the risk
/// overlay. Both are memoized, so the graph is only rebuilt when they change.
/// The canvas takes its parent's width and the configured `height`. Hover,
/// selection, and resize changes are reported through `on_event`.
#[component]
pub fn TransactionGraph(
	/// Transaction rows; one link each.
	#[prop(into)]
	transactions: Signal<Vec<TransactionRecord>>,
	/// Accounts to highlight.
	#[prop(into)]
	flagged: Signal<Vec<FlaggedAccount>>,
	/// Canvas height in pixels.
	#[prop(default = DEFAULT_HEIGHT)]
	height: f64,
	/// Receives hover, selection, and resize events.
	#[prop(optional, into)]
	on_event: Option<Callback<GraphEvent>>,
) -> impl IntoView {
	let model = Memo::new(move |_| Arc::new(GraphModel::build(&transactions.get())));
	let overlay = Memo::new(move |_| Arc::new(RiskOverlay::build(&flagged.get())));
	let emit = move |event: GraphEvent| {
		if let Some(cb) = on_event {
			cb.run(event);
		}
	};

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Shared<GraphContext> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let (context_init, animate_init, resize_cb_init, frame_id_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame_id.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("fraud-graph: no window, graph stays inert");
			return;
		};
		let Some(mut ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("fraud-graph: canvas has no 2d context");
			return;
		};

		let config = ViewportConfig {
			height,
			..ViewportConfig::default()
		};
		let viewport = Viewport::new(container_width(&canvas), config);
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);
		let (w, h) = (viewport.width, viewport.height);

		let model = model.get_untracked();
		info!(
			"fraud-graph: {} accounts, {} transactions",
			model.node_count(),
			model.link_count()
		);
		*context_init.borrow_mut() = Some(GraphContext {
			simulation: Simulation::new(&model),
			model,
			overlay: overlay.get_untracked(),
			viewport,
			interaction: InteractionState::default(),
			pan: PanState::default(),
			scale: ScaleConfig::default(),
			theme: Theme::default(),
			clock: Instant::now(),
		});
		emit(GraphEvent::ViewportResized { width: w, height: h });

		let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let width = container_width(&canvas_resize);
			if width.is_none() {
				debug!("fraud-graph: container not mounted, keeping size");
			}
			let resized = match context_resize.borrow_mut().as_mut() {
				Some(c) => {
					if c.viewport.measure(width) {
						canvas_resize.set_width(c.viewport.width as u32);
						Some(GraphEvent::ViewportResized {
							width: c.viewport.width,
							height: c.viewport.height,
						})
					} else {
						None
					}
				}
				None => None,
			};
			if let Some(event) = resized {
				debug!("fraud-graph: {event:?}");
				emit(event);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner, frame_id_anim) = (
			context_init.clone(),
			animate_init.clone(),
			frame_id_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			frame_id_anim.set(None);
			let mut guard = context_anim.borrow_mut();
			let Some(c) = guard.as_mut() else {
				// torn down
				return;
			};
			let now = c.now();
			c.simulation.tick(FRAME_DT);
			c.viewport.tick(now);
			render::render(&c.frame(), &mut ctx, now);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				frame_id_anim.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_id_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	// Unmount: stop the frame loop, detach the resize listener, drop the closures.
	let handles = StoredValue::new_local((
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame_id.clone(),
	));
	on_cleanup(move || {
		handles.try_with_value(|(context, animate, resize_cb, frame_id)| {
			let window = web_sys::window();
			if let (Some(id), Some(win)) = (frame_id.take(), &window) {
				let _ = win.cancel_animation_frame(id);
			}
			if let (Some(cb), Some(win)) = (resize_cb.borrow_mut().take(), &window) {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			animate.borrow_mut().take();
			context.borrow_mut().take();
			debug!("fraud-graph: torn down");
		});
	});

	// New transactions: fresh layout, and hover/selection refer to the old graph.
	let context_model = context.clone();
	Effect::new(move |_| {
		let next = model.get();
		let cleared = {
			let mut guard = context_model.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			if Arc::ptr_eq(&c.model, &next) {
				return;
			}
			info!(
				"fraud-graph: rebuilt graph, {} accounts, {} transactions",
				next.node_count(),
				next.link_count()
			);
			c.simulation = Simulation::new(&next);
			c.model = next;
			c.pan = PanState::default();
			replace_model(&mut c.interaction)
		};
		for event in cleared {
			emit(event);
		}
	});

	let context_overlay = context.clone();
	Effect::new(move |_| {
		let next = overlay.get();
		if let Some(ref mut c) = *context_overlay.borrow_mut() {
			debug!("fraud-graph: {} flagged accounts", next.len());
			c.overlay = next;
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.pan = PanState {
				active: true,
				moved: false,
				start_x: x,
				start_y: y,
				transform_start_x: c.viewport.transform.x,
				transform_start_y: c.viewport.transform.y,
			};
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let event = match context_mm.borrow_mut().as_mut() {
			Some(c) if c.pan.active => {
				let (dx, dy) = (x - c.pan.start_x, y - c.pan.start_y);
				if !c.pan.moved && dx.hypot(dy) > PAN_THRESHOLD {
					c.pan.moved = true;
					c.viewport.cancel_transition();
				}
				if c.pan.moved {
					c.viewport.transform.x = c.pan.transform_start_x + dx;
					c.viewport.transform.y = c.pan.transform_start_y + dy;
				}
				None
			}
			Some(c) => {
				let hovered = c.pick(x, y);
				c.dispatch(PointerEvent::Hover(hovered))
			}
			None => None,
		};
		if let Some(event) = event {
			emit(event);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.pan.active = false;
		}
	};

	let context_cl = context.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let event = match context_cl.borrow_mut().as_mut() {
			Some(c) if c.pan.moved => {
				c.pan.moved = false;
				None
			}
			Some(c) => {
				let pointer = match c.pick(x, y) {
					Some(id) => PointerEvent::ClickNode(id),
					None => PointerEvent::ClickBackground,
				};
				c.dispatch(pointer)
			}
			None => None,
		};
		if let Some(event) = event {
			emit(event);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let event = context_ml.borrow_mut().as_mut().and_then(|c| {
			c.pan = PanState::default();
			c.dispatch(PointerEvent::Hover(None))
		});
		if let Some(event) = event {
			emit(event);
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.viewport.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="transaction-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:click=on_click
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
