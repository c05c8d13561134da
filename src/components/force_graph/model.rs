//! Renderable graph model derived from transaction rows.
//!
//! Nodes and links reference each other only by account id. Neighborhoods are
//! recovered by scanning `links` rather than through stored back-pointers.

use std::collections::HashMap;

use super::types::{Amount, TransactionRecord};

/// A directed transaction between two accounts.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Transaction this link draws.
	pub transaction_id: String,
	/// Sending account.
	pub source: String,
	/// Receiving account.
	pub target: String,
	/// Amount as supplied, never read while drawing.
	pub amount: Amount,
	/// Timestamp text as supplied.
	pub timestamp: String,
	/// Ordinal among links joining the same pair of accounts (either direction).
	/// Zero for the first such link; the renderer curves the others apart.
	pub parallel_index: usize,
}

impl Link {
	/// Whether `id` is either endpoint.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Deduplicated account set plus one link per transaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	nodes: Vec<String>,
	index: HashMap<String, usize>,
	links: Vec<Link>,
}

impl GraphModel {
	/// Builds the model from parsed rows. Every row yields exactly one link.
	pub fn build(rows: &[TransactionRecord]) -> Self {
		let mut model = Self {
			nodes: Vec::new(),
			index: HashMap::new(),
			links: Vec::with_capacity(rows.len()),
		};
		let mut pair_counts: HashMap<(String, String), usize> = HashMap::new();

		for row in rows {
			model.insert_node(&row.sender_id);
			model.insert_node(&row.receiver_id);

			let pair = if row.sender_id <= row.receiver_id {
				(row.sender_id.clone(), row.receiver_id.clone())
			} else {
				(row.receiver_id.clone(), row.sender_id.clone())
			};
			let count = pair_counts.entry(pair).or_insert(0);
			let parallel_index = *count;
			*count += 1;

			model.links.push(Link {
				transaction_id: row.transaction_id.clone(),
				source: row.sender_id.clone(),
				target: row.receiver_id.clone(),
				amount: row.amount.clone(),
				timestamp: row.timestamp.clone(),
				parallel_index,
			});
		}

		model
	}

	fn insert_node(&mut self, id: &str) {
		if !self.index.contains_key(id) {
			self.index.insert(id.to_string(), self.nodes.len());
			self.nodes.push(id.to_string());
		}
	}

	/// Account ids in order of first appearance.
	pub fn nodes(&self) -> &[String] {
		&self.nodes
	}

	/// Links in input order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Whether `id` is a node.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Number of distinct accounts.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of links, equal to the number of input rows.
	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	/// True when there are no accounts.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
