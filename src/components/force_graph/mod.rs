//! Force-directed transaction graph with fraud-risk highlighting.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - Physics-based node positioning via force simulation
//! - Risk glows, labels, and link tints driven by flagged-account data
//! - Click-to-focus selection that dims everything outside the neighborhood
//! - Pan and wheel zoom, configurable theming and visual scaling
//!
//! # Example
//!
//! ```ignore
//! use fraud_graph::{Amount, TransactionGraph, TransactionRecord};
//!
//! let rows = vec![TransactionRecord {
//!     transaction_id: "t1".into(),
//!     sender_id: "A".into(),
//!     receiver_id: "B".into(),
//!     amount: Amount::Value(100.0),
//!     timestamp: "2024-01-01 10:00:00".into(),
//! }];
//!
//! view! { <TransactionGraph transactions=rows flagged=Vec::new() /> }
//! ```

mod component;
mod interaction;
mod model;
mod render;
mod risk;
mod scale;
mod simulation;
mod state;
mod surface;
mod theme;
mod types;
mod viewport;

pub use component::TransactionGraph;
pub use interaction::{
	GraphEvent, InteractionContext, PointerEvent, handle, pick_node, replace_model,
};
pub use model::{GraphModel, Link};
pub use render::{Frame, LinkState, NodeState, link_state, node_state};
pub use risk::{RiskDetail, RiskOverlay};
pub use scale::ScaleConfig;
pub use simulation::PositionSource;
pub use state::{InteractionState, ViewTransform, adjacency};
pub use theme::Theme;
pub use types::{
	Amount, AnalysisResult, AnalysisSummary, FlaggedAccount, FraudRing, GraphPayload,
	TransactionRecord,
};
pub use viewport::{Viewport, ViewportConfig};
