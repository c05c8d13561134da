//! Physics collaborator adapter.
//!
//! Node positions belong to the `force_graph` simulation. The renderer and the
//! hit-tester only see them through [`PositionSource`], keyed by account id.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::model::GraphModel;

/// Read-only access to node positions in world coordinates.
pub trait PositionSource {
	/// Current world position of `id`, if it is laid out.
	fn position(&self, id: &str) -> Option<(f64, f64)>;
}

impl PositionSource for HashMap<String, (f64, f64)> {
	fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.get(id).copied()
	}
}

/// Force-directed layout for one graph model.
pub struct Simulation {
	graph: ForceGraph<String, ()>,
	positions: HashMap<String, (f64, f64)>,
	/// Paused simulations keep their last positions.
	pub running: bool,
}

impl Simulation {
	/// Seeds every node on a circle around the origin and connects one spring
	/// per link, parallel links included.
	pub fn new(model: &GraphModel) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx = HashMap::new();
		let count = model.node_count().max(1) as f64;
		let ring = 40.0 + 8.0 * count.sqrt();

		for (i, id) in model.nodes().iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count;
			let idx = graph.add_node(NodeData {
				x: (ring * angle.cos()) as f32,
				y: (ring * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: id.clone(),
			});
			id_to_idx.insert(id.as_str(), idx);
		}

		for link in model.links() {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		let mut sim = Self {
			graph,
			positions: HashMap::with_capacity(model.node_count()),
			running: true,
		};
		sim.publish();
		sim
	}

	/// Advances the layout and republishes positions.
	pub fn tick(&mut self, dt: f32) {
		if !self.running {
			return;
		}
		self.graph.update(dt);
		self.publish();
	}

	fn publish(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.data.user_data.clone(),
				(node.x() as f64, node.y() as f64),
			);
		});
	}
}

impl PositionSource for Simulation {
	fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.positions.position(id)
	}
}
