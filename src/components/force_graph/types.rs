//! Record types crossing the component boundary.
//!
//! Transactions come from the CSV collaborator, flagged accounts from the
//! detection service (or the local [`crate::detection`] module). Both are plain
//! serde types so the host page can hand them over as JSON.

use serde::{Deserialize, Serialize};

/// Transaction amount as supplied by the CSV collaborator.
///
/// Amounts that fail to parse are kept verbatim rather than rejected. Nothing
/// in the rendering path reads the amount, so an unparsed value never faults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAmount", into = "RawAmount")]
pub enum Amount {
	/// A finite numeric amount.
	Value(f64),
	/// Original text of an amount that is not a finite number.
	Unparsed(String),
}

impl Amount {
	/// Parses a textual amount, keeping the text when it is not a finite number.
	pub fn parse(text: &str) -> Self {
		match text.trim().parse::<f64>() {
			Ok(v) if v.is_finite() => Amount::Value(v),
			_ => Amount::Unparsed(text.to_string()),
		}
	}

	/// Numeric value, if any.
	pub fn value(&self) -> Option<f64> {
		match self {
			Amount::Value(v) => Some(*v),
			Amount::Unparsed(_) => None,
		}
	}
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAmount {
	Number(f64),
	Text(String),
}

impl From<RawAmount> for Amount {
	fn from(raw: RawAmount) -> Self {
		match raw {
			RawAmount::Number(v) if v.is_finite() => Amount::Value(v),
			RawAmount::Number(v) => Amount::Unparsed(v.to_string()),
			RawAmount::Text(s) => Amount::parse(&s),
		}
	}
}

impl From<Amount> for RawAmount {
	fn from(amount: Amount) -> Self {
		match amount {
			Amount::Value(v) => RawAmount::Number(v),
			Amount::Unparsed(s) => RawAmount::Text(s),
		}
	}
}

/// One parsed transaction row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
	/// Upstream transaction identifier.
	pub transaction_id: String,
	/// Account the money left.
	pub sender_id: String,
	/// Account the money reached.
	pub receiver_id: String,
	/// Transferred amount.
	pub amount: Amount,
	/// Timestamp text as exported; parsed only by the detector.
	pub timestamp: String,
}

/// An account annotated by the detection service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlaggedAccount {
	/// Flagged account id.
	pub account_id: String,
	/// Suspicion score in `0.0..=100.0`.
	pub suspicion_score: f64,
	/// Pattern tags such as `cycle_length_3` or `fan_in_smurfing`.
	#[serde(default)]
	pub detected_patterns: Vec<String>,
	/// Ring the account was first assigned to, if any.
	#[serde(default)]
	pub ring_id: Option<String>,
}

/// A cycle of accounts reported as a fraud ring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
	/// Ring identifier, `RING_01` and up.
	pub ring_id: String,
	/// Accounts along the cycle, in transfer order.
	pub member_accounts: Vec<String>,
	/// Kind of ring; always `cycle` for now.
	pub pattern_type: String,
	/// Ring risk score, 0 to 100.
	pub risk_score: f64,
}

/// Totals reported alongside an analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
	/// Distinct accounts seen.
	pub total_accounts_analyzed: usize,
	/// Accounts with at least one pattern.
	pub suspicious_accounts_flagged: usize,
	/// Rings reported.
	pub fraud_rings_detected: usize,
	/// Detector wall time, rounded to four decimals.
	pub processing_time_seconds: f64,
}

/// Full output of the detection service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
	/// Flagged accounts in detection order.
	pub suspicious_accounts: Vec<FlaggedAccount>,
	/// Cycle rings in discovery order.
	pub fraud_rings: Vec<FraudRing>,
	/// Totals for the run.
	pub summary: AnalysisSummary,
}

/// Payload the host page embeds for the graph view.
///
/// When `suspicious_accounts` is absent the accounts are scored locally.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	/// Rows to draw.
	pub transactions: Vec<TransactionRecord>,
	/// Precomputed flags from the detection service.
	#[serde(default)]
	pub suspicious_accounts: Option<Vec<FlaggedAccount>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn amount_accepts_numbers_and_text() {
		let row: TransactionRecord = serde_json::from_str(
			r#"{"transaction_id":"t1","sender_id":"A","receiver_id":"B","amount":"12.5","timestamp":"2024-01-01 10:00:00"}"#,
		)
		.unwrap();
		assert_eq!(row.amount, Amount::Value(12.5));

		let row: TransactionRecord = serde_json::from_str(
			r#"{"transaction_id":"t2","sender_id":"A","receiver_id":"B","amount":"n/a","timestamp":"2024-01-01 10:00:00"}"#,
		)
		.unwrap();
		assert_eq!(row.amount, Amount::Unparsed("n/a".into()));
		assert_eq!(row.amount.value(), None);
	}

	#[test]
	fn non_finite_text_stays_unparsed() {
		assert_eq!(Amount::parse("NaN"), Amount::Unparsed("NaN".into()));
		assert_eq!(Amount::parse(" 7 "), Amount::Value(7.0));
	}

	#[test]
	fn flagged_account_defaults() {
		let acc: FlaggedAccount =
			serde_json::from_str(r#"{"account_id":"A","suspicion_score":90}"#).unwrap();
		assert!(acc.detected_patterns.is_empty());
		assert_eq!(acc.ring_id, None);
	}
}
