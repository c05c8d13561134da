//! Collapsed directed transaction graph used by the detectors.
//!
//! One edge per ordered (sender, receiver) pair; a repeated pair keeps the
//! attributes of its last transaction. Vertices are indexed in order of first
//! appearance so every traversal below is deterministic.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

/// Edge attributes kept for a sender→receiver pair.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub transaction_id: String,
	pub timestamp: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct DiGraph {
	ids: Vec<String>,
	index: HashMap<String, usize>,
	out: Vec<BTreeMap<usize, EdgeInfo>>,
	inc: Vec<BTreeMap<usize, EdgeInfo>>,
}

impl DiGraph {
	pub fn new() -> Self {
		Self::default()
	}

	fn vertex(&mut self, id: &str) -> usize {
		if let Some(&v) = self.index.get(id) {
			return v;
		}
		let v = self.ids.len();
		self.ids.push(id.to_string());
		self.index.insert(id.to_string(), v);
		self.out.push(BTreeMap::new());
		self.inc.push(BTreeMap::new());
		v
	}

	/// Adds or overwrites the edge `from -> to`.
	pub fn add_edge(&mut self, from: &str, to: &str, info: EdgeInfo) {
		let a = self.vertex(from);
		let b = self.vertex(to);
		self.out[a].insert(b, info.clone());
		self.inc[b].insert(a, info);
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn id(&self, v: usize) -> &str {
		&self.ids[v]
	}

	#[cfg(test)]
	pub fn vertex_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn edge(&self, from: usize, to: usize) -> Option<&EdgeInfo> {
		self.out[from].get(&to)
	}

	pub fn out_degree(&self, v: usize) -> usize {
		self.out[v].len()
	}

	pub fn in_degree(&self, v: usize) -> usize {
		self.inc[v].len()
	}

	pub fn successors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
		self.out[v].keys().copied()
	}

	pub fn predecessors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
		self.inc[v].keys().copied()
	}

	pub fn out_edges(&self, v: usize) -> impl Iterator<Item = (usize, &EdgeInfo)> + '_ {
		self.out[v].iter().map(|(t, e)| (*t, e))
	}

	pub fn in_edges(&self, v: usize) -> impl Iterator<Item = (usize, &EdgeInfo)> + '_ {
		self.inc[v].iter().map(|(s, e)| (*s, e))
	}

	/// Every simple directed cycle with at most `max_len` vertices.
	///
	/// Each cycle is reported once, rotated to start at its lowest-indexed
	/// vertex. Self-loops count as length-1 cycles.
	pub fn bounded_cycles(&self, max_len: usize) -> Vec<Vec<usize>> {
		let mut cycles = Vec::new();
		let mut path = Vec::with_capacity(max_len);
		let mut on_path = vec![false; self.len()];

		for start in 0..self.len() {
			path.push(start);
			on_path[start] = true;
			self.extend_cycles(start, max_len, &mut path, &mut on_path, &mut cycles);
			on_path[start] = false;
			path.pop();
		}
		cycles
	}

	fn extend_cycles(
		&self,
		start: usize,
		max_len: usize,
		path: &mut Vec<usize>,
		on_path: &mut [bool],
		cycles: &mut Vec<Vec<usize>>,
	) {
		let Some(&tail) = path.last() else {
			return;
		};
		for next in self.successors(tail) {
			if next == start {
				cycles.push(path.clone());
			} else if next > start && !on_path[next] && path.len() < max_len {
				path.push(next);
				on_path[next] = true;
				self.extend_cycles(start, max_len, path, on_path, cycles);
				on_path[next] = false;
				path.pop();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	fn info(id: &str) -> EdgeInfo {
		EdgeInfo {
			transaction_id: id.into(),
			timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
				.and_then(|d| d.and_hms_opt(0, 0, 0))
				.unwrap(),
		}
	}

	fn graph(edges: &[(&str, &str)]) -> DiGraph {
		let mut g = DiGraph::new();
		for (i, (a, b)) in edges.iter().enumerate() {
			g.add_edge(a, b, info(&format!("t{i}")));
		}
		g
	}

	fn named(g: &DiGraph, cycles: &[Vec<usize>]) -> Vec<Vec<String>> {
		cycles
			.iter()
			.map(|c| c.iter().map(|v| g.id(*v).to_string()).collect())
			.collect()
	}

	#[test]
	fn repeated_pair_collapses() {
		let g = graph(&[("A", "B"), ("A", "B"), ("B", "A")]);
		let a = g.vertex_of("A").unwrap();
		assert_eq!(g.out_degree(a), 1);
		assert_eq!(g.in_degree(a), 1);
		assert_eq!(g.out_edges(a).next().unwrap().1.transaction_id, "t1");
	}

	#[test]
	fn finds_each_cycle_once() {
		let g = graph(&[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D"), ("D", "A")]);
		let cycles = g.bounded_cycles(5);
		assert_eq!(
			named(&g, &cycles),
			vec![vec!["A", "B", "C"], vec!["A", "B", "C", "D"]]
		);
	}

	#[test]
	fn respects_length_bound() {
		let g = graph(&[
			("A", "B"),
			("B", "C"),
			("C", "D"),
			("D", "E"),
			("E", "F"),
			("F", "A"),
		]);
		assert!(g.bounded_cycles(5).is_empty());
		assert_eq!(g.bounded_cycles(6).len(), 1);
	}

	#[test]
	fn self_loop_and_two_cycle() {
		let g = graph(&[("A", "A"), ("A", "B"), ("B", "A")]);
		let lens: Vec<_> = g.bounded_cycles(5).iter().map(Vec::len).collect();
		assert_eq!(lens, vec![1, 2]);
	}
}
