//! Lookup index over flagged accounts.

use std::collections::HashMap;

use super::types::FlaggedAccount;

/// Risk annotation for one account.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskDetail {
	/// Suspicion score, 0 to 100.
	pub score: f64,
	/// Detected pattern tags.
	pub patterns: Vec<String>,
	/// Fraud ring membership, if any.
	pub ring_id: Option<String>,
}

/// Score and detail lookups keyed by account id.
///
/// Entries for accounts that never appear in a transaction are kept; they are
/// simply never drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RiskOverlay {
	details: HashMap<String, RiskDetail>,
}

impl RiskOverlay {
	/// Builds the index. A repeated account id overwrites the earlier entry.
	pub fn build(flagged: &[FlaggedAccount]) -> Self {
		let details = flagged
			.iter()
			.map(|acc| {
				(
					acc.account_id.clone(),
					RiskDetail {
						score: acc.suspicion_score,
						patterns: acc.detected_patterns.clone(),
						ring_id: acc.ring_id.clone(),
					},
				)
			})
			.collect();
		Self { details }
	}

	/// Suspicion score, `None` for unflagged ids.
	pub fn score(&self, id: &str) -> Option<f64> {
		self.details.get(id).map(|d| d.score)
	}

	/// Full annotation, `None` for unflagged ids.
	pub fn detail(&self, id: &str) -> Option<&RiskDetail> {
		self.details.get(id)
	}

	/// Whether `id` carries any annotation.
	pub fn is_flagged(&self, id: &str) -> bool {
		self.details.contains_key(id)
	}

	/// Number of annotated accounts.
	pub fn len(&self) -> usize {
		self.details.len()
	}

	/// True when nothing is flagged.
	pub fn is_empty(&self) -> bool {
		self.details.is_empty()
	}
}
