//! fraud-graph: Interactive force-directed transaction graph with fraud-risk
//! highlighting.
//!
//! This crate provides a WASM-based graph component that renders money-mule
//! transaction networks with physics-based layout, risk glows on flagged
//! accounts, click-to-focus neighborhoods, and pan/zoom. A local detector
//! scores accounts when the host page supplies no flagged-account list.

use std::collections::HashSet;
use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod detection;

pub use components::force_graph::{
	Amount, AnalysisResult, FlaggedAccount, FraudRing, GraphEvent, GraphModel, GraphPayload,
	RiskOverlay, TransactionGraph, TransactionRecord,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("fraud-graph: logging initialized");
}

/// Load the graph payload from a script element with id="graph-data".
/// Expected format: JSON with { transactions: [...], suspicious_accounts?: [...] }
fn load_payload() -> Option<GraphPayload> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphPayload>(&json_text) {
		Ok(payload) => {
			info!(
				"fraud-graph: loaded {} transactions",
				payload.transactions.len()
			);
			Some(payload)
		}
		Err(e) => {
			warn!("fraud-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Flagged accounts from the payload, or from the local detector when the
/// payload carries none.
fn resolve_flagged(payload: &mut GraphPayload) -> Vec<FlaggedAccount> {
	if let Some(flagged) = payload.suspicious_accounts.take() {
		return flagged;
	}
	match detection::analyze(&payload.transactions) {
		Ok(result) => result.suspicious_accounts,
		Err(e) => {
			warn!("fraud-graph: local detection skipped: {}", e);
			Vec::new()
		}
	}
}

/// Main application component.
/// Loads transactions from the DOM and renders the graph with a detail panel
/// for the selected account.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let mut payload = load_payload().unwrap_or_default();
	let flagged = resolve_flagged(&mut payload);
	let overlay = Arc::new(RiskOverlay::build(&flagged));
	let flagged_count = flagged.len();
	let transactions = payload.transactions;
	let account_count = transactions
		.iter()
		.flat_map(|t| [t.sender_id.as_str(), t.receiver_id.as_str()])
		.collect::<HashSet<_>>()
		.len();

	let transactions_signal = Signal::derive(move || transactions.clone());
	let flagged_signal = Signal::derive(move || flagged.clone());

	let selected = RwSignal::new(None::<String>);
	let on_event = Callback::new(move |event: GraphEvent| {
		if let GraphEvent::NodeSelected(id) = event {
			selected.set(id);
		}
	});

	let detail = move || {
		selected.get().map(|id| {
			let risk = match overlay.detail(&id).cloned() {
				Some(d) => view! {
					<p class="score">"Suspicion score " {format!("{:.1}", d.score)}</p>
					<ul class="patterns">
						{d.patterns.into_iter().map(|p| view! { <li>{p}</li> }).collect_view()}
					</ul>
					{d.ring_id.map(|ring| view! { <p class="ring">"Ring " {ring}</p> })}
				}
				.into_any(),
				None => view! { <p class="score">"No risk flags"</p> }.into_any(),
			};
			view! {
				<aside class="account-detail">
					<h2>{id}</h2>
					{risk}
				</aside>
			}
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Transaction Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-page">
			<div class="graph-overlay">
				<h1>"Transaction Graph"</h1>
				<p class="subtitle">
					{format!("{account_count} accounts, {flagged_count} flagged. ")}
					"Click an account to focus it. Scroll to zoom. Drag background to pan."
				</p>
			</div>
			<TransactionGraph
				transactions=transactions_signal
				flagged=flagged_signal
				on_event=on_event
			/>
			{detail}
		</div>
	}
}
