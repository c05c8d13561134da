//! Local fraud-pattern detection.
//!
//! Produces the flagged-account list the graph view overlays when the host does
//! not supply one. Three detectors run over a collapsed transaction digraph:
//!
//! - bounded cycles (3 to 5 accounts), reported as fraud rings
//! - temporal smurfing, fan-out and fan-in within a 72 hour window
//! - shell pass-through accounts on longer transfer chains
//!
//! Pattern scores accumulate per account, plus a velocity bonus for accounts
//! with two transactions less than an hour apart.

mod digraph;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use thiserror::Error;
use web_time::Instant;

use crate::components::force_graph::{
	AnalysisResult, AnalysisSummary, FlaggedAccount, FraudRing, TransactionRecord,
};
use digraph::{DiGraph, EdgeInfo};

/// Risk score attached to every cycle ring.
pub const CYCLE_RING_SCORE: f64 = 95.3;
const CYCLE_MIN_LEN: usize = 3;
const CYCLE_MAX_LEN: usize = 5;
const CYCLE_SCORE: u32 = 40;

const SMURF_WINDOW_SECS: i64 = 72 * 3600;
const SMURF_MIN_TRANSACTIONS: usize = 10;
const SMURF_SCORE: u32 = 30;

const SHELL_SCORE: u32 = 20;

const VELOCITY_WINDOW_SECS: i64 = 3600;
const VELOCITY_SCORE: u32 = 10;

const MULTI_PATTERN_MULTIPLIER: f64 = 1.2;
const MAX_SCORE: f64 = 100.0;

/// Errors raised while preparing transactions for detection.
#[derive(Debug, Error, PartialEq)]
pub enum DetectionError {
	/// A row's timestamp matched none of the accepted formats.
	#[error("transaction {transaction_id}: unrecognized timestamp {value:?}")]
	InvalidTimestamp {
		/// Row carrying the timestamp.
		transaction_id: String,
		/// Timestamp text as given.
		value: String,
	},
}

/// Parses the timestamp formats seen in transaction exports.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
	let text = text.trim();
	if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
		return Some(dt.naive_utc());
	}
	for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
		if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
			return Some(dt);
		}
	}
	NaiveDate::parse_from_str(text, "%Y-%m-%d")
		.ok()
		.and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug)]
struct Flag {
	account_id: String,
	patterns: Vec<String>,
	pattern_score: u32,
	velocity_score: u32,
	ring_id: Option<String>,
}

impl Flag {
	fn final_score(&self) -> f64 {
		let mut total = f64::from(self.pattern_score + self.velocity_score);
		if self.patterns.len() > 1 {
			total *= MULTI_PATTERN_MULTIPLIER;
		}
		total.min(MAX_SCORE)
	}
}

/// Runs the pattern detectors over one batch of transactions.
pub struct FraudDetector {
	graph: DiGraph,
	flags: Vec<Flag>,
	flag_index: HashMap<String, usize>,
	rings: Vec<FraudRing>,
}

impl FraudDetector {
	/// Builds the collapsed digraph. Fails on the first unparseable timestamp.
	pub fn new(rows: &[TransactionRecord]) -> Result<Self, DetectionError> {
		let mut graph = DiGraph::new();
		for row in rows {
			let timestamp =
				parse_timestamp(&row.timestamp).ok_or_else(|| DetectionError::InvalidTimestamp {
					transaction_id: row.transaction_id.clone(),
					value: row.timestamp.clone(),
				})?;
			graph.add_edge(
				&row.sender_id,
				&row.receiver_id,
				EdgeInfo {
					transaction_id: row.transaction_id.clone(),
					timestamp,
				},
			);
		}
		debug!("detector: {} accounts from {} rows", graph.len(), rows.len());
		Ok(Self {
			graph,
			flags: Vec::new(),
			flag_index: HashMap::new(),
			rings: Vec::new(),
		})
	}

	/// Runs every detector and scores the flagged accounts.
	pub fn run(mut self) -> AnalysisResult {
		let started = Instant::now();

		self.detect_bounded_cycles();
		self.detect_temporal_smurfing();
		self.detect_shell_pass_throughs();

		let suspicious_accounts: Vec<FlaggedAccount> = self
			.flags
			.iter()
			.map(|flag| FlaggedAccount {
				account_id: flag.account_id.clone(),
				suspicion_score: flag.final_score(),
				detected_patterns: flag.patterns.clone(),
				ring_id: flag.ring_id.clone(),
			})
			.collect();

		let elapsed = started.elapsed().as_secs_f64();
		let summary = AnalysisSummary {
			total_accounts_analyzed: self.graph.len(),
			suspicious_accounts_flagged: suspicious_accounts.len(),
			fraud_rings_detected: self.rings.len(),
			processing_time_seconds: (elapsed * 10_000.0).round() / 10_000.0,
		};
		info!(
			"detector: {} of {} accounts flagged, {} rings",
			summary.suspicious_accounts_flagged,
			summary.total_accounts_analyzed,
			summary.fraud_rings_detected
		);

		AnalysisResult {
			suspicious_accounts,
			fraud_rings: self.rings,
			summary,
		}
	}

	fn detect_bounded_cycles(&mut self) {
		let cycles = self.graph.bounded_cycles(CYCLE_MAX_LEN);
		for cycle in cycles.iter().filter(|c| c.len() >= CYCLE_MIN_LEN) {
			let ring_id = format!("RING_{:02}", self.rings.len() + 1);
			let pattern = format!("cycle_length_{}", cycle.len());
			let via: Vec<&str> = cycle
				.iter()
				.zip(cycle.iter().cycle().skip(1))
				.filter_map(|(&a, &b)| self.graph.edge(a, b))
				.map(|e| e.transaction_id.as_str())
				.collect();
			debug!("{ring_id}: {} accounts via {}", cycle.len(), via.join(", "));
			for &v in cycle {
				self.flag(v, &pattern, CYCLE_SCORE, Some(&ring_id));
			}
			self.rings.push(FraudRing {
				ring_id,
				member_accounts: cycle.iter().map(|&v| self.graph.id(v).to_string()).collect(),
				pattern_type: "cycle".to_string(),
				risk_score: CYCLE_RING_SCORE,
			});
		}
	}

	fn detect_temporal_smurfing(&mut self) {
		for v in 0..self.graph.len() {
			if self.graph.out_degree(v) < SMURF_MIN_TRANSACTIONS {
				continue;
			}
			let times = self.graph.out_edges(v).map(|(_, e)| e.timestamp).collect();
			if !dense_window(times) {
				continue;
			}
			let receivers_forward = self
				.graph
				.successors(v)
				.all(|r| self.graph.out_degree(r) > 0);
			if receivers_forward {
				self.flag(v, "fan_out_smurfing", SMURF_SCORE, None);
			}
		}

		for v in 0..self.graph.len() {
			if self.graph.in_degree(v) < SMURF_MIN_TRANSACTIONS {
				continue;
			}
			let times = self.graph.in_edges(v).map(|(_, e)| e.timestamp).collect();
			if dense_window(times) && self.graph.out_degree(v) == 1 {
				self.flag(v, "fan_in_smurfing", SMURF_SCORE, None);
			}
		}
	}

	fn detect_shell_pass_throughs(&mut self) {
		for v in 0..self.graph.len() {
			let (din, dout) = (self.graph.in_degree(v), self.graph.out_degree(v));
			if !matches!(din + dout, 2 | 3) || din == 0 || dout == 0 {
				continue;
			}
			// pred -> v -> succ extends to a chain of three or more transfers
			let on_chain = self.graph.predecessors(v).any(|p| self.graph.in_degree(p) > 0)
				|| self.graph.successors(v).any(|s| self.graph.out_degree(s) > 0);
			if on_chain {
				self.flag(v, "shell_pass_through", SHELL_SCORE, None);
			}
		}
	}

	fn flag(&mut self, v: usize, pattern: &str, score: u32, ring_id: Option<&str>) {
		let id = self.graph.id(v).to_string();
		if let Some(&i) = self.flag_index.get(&id) {
			let flag = &mut self.flags[i];
			if !flag.patterns.iter().any(|p| p == pattern) {
				flag.patterns.push(pattern.to_string());
				flag.pattern_score += score;
			}
			if flag.ring_id.is_none() {
				flag.ring_id = ring_id.map(str::to_string);
			}
			return;
		}

		let velocity_score = self.velocity_score(v);
		self.flag_index.insert(id.clone(), self.flags.len());
		self.flags.push(Flag {
			account_id: id,
			patterns: vec![pattern.to_string()],
			pattern_score: score,
			velocity_score,
			ring_id: ring_id.map(str::to_string),
		});
	}

	/// Bonus when two of the account's transactions fall within an hour.
	fn velocity_score(&self, v: usize) -> u32 {
		let mut times: Vec<NaiveDateTime> = self
			.graph
			.out_edges(v)
			.chain(self.graph.in_edges(v))
			.map(|(_, e)| e.timestamp)
			.collect();
		times.sort();
		let rapid = times
			.windows(2)
			.any(|w| (w[1] - w[0]).num_seconds() < VELOCITY_WINDOW_SECS);
		if rapid { VELOCITY_SCORE } else { 0 }
	}
}

/// Whether some run of `SMURF_MIN_TRANSACTIONS` consecutive timestamps spans
/// at most the smurfing window.
fn dense_window(mut times: Vec<NaiveDateTime>) -> bool {
	times.sort();
	times
		.windows(SMURF_MIN_TRANSACTIONS)
		.any(|w| (w[SMURF_MIN_TRANSACTIONS - 1] - w[0]).num_seconds() <= SMURF_WINDOW_SECS)
}

/// Convenience wrapper: build a detector and run it.
pub fn analyze(rows: &[TransactionRecord]) -> Result<AnalysisResult, DetectionError> {
	Ok(FraudDetector::new(rows)?.run())
}
