//! Physics layout backed by the `force_graph` simulation.
//!
//! `force_graph` provides many-body repulsion, integration and anchoring. The
//! co-author specific forces are layered on top as alpha-scaled position corrections
//! each tick, in this order: link, collision, radial, center.

use std::f64::consts::PI;

use force_graph::{ForceGraph, NodeData, SimulationParameters};

use super::{
	Energy, LayoutEngine, LayoutError, LayoutParams, LayoutProvider, collide_radius,
	link_distance, radial_ring,
};
use crate::components::coauthor_graph::graph::CoauthorGraph;
use crate::components::coauthor_graph::viewport::{Point, Size};

/// Seconds of simulated time per tick at full energy.
const TICK_DT: f32 = 0.016;
const NODE_MASS: f32 = 10.0;
/// Maps the (negative) charge strength onto `force_graph`'s repulsion constant.
const CHARGE_SCALE: f64 = 150.0 / 320.0;
const COLLIDE_ITERATIONS: usize = 3;
/// Energy target while parameters re-settle.
const RESETTLE_ALPHA: f64 = 0.25;

/// Creates [`ForceEngine`]s unless physics is disabled.
#[derive(Clone, Copy, Debug)]
pub struct ForceProvider {
	pub enabled: bool,
}

impl Default for ForceProvider {
	fn default() -> Self {
		Self { enabled: true }
	}
}

impl LayoutProvider for ForceProvider {
	fn create(
		&self,
		graph: &CoauthorGraph,
		canvas: Size,
		params: &LayoutParams,
	) -> Result<Box<dyn LayoutEngine>, LayoutError> {
		if !self.enabled {
			return Err(LayoutError::Disabled);
		}
		params.validate()?;
		if graph.nodes.is_empty() {
			return Err(LayoutError::EmptyGraph);
		}
		Ok(Box::new(ForceEngine::new(graph, canvas, *params)))
	}
}

/// Per-link constants derived from the graph topology.
#[derive(Clone, Debug)]
struct LinkBody {
	source: usize,
	target: usize,
	weight: u32,
	/// Share of the correction applied to the target.
	bias: f64,
	strength: f64,
}

/// Force-directed layout for one graph generation.
pub struct ForceEngine {
	sim: ForceGraph<usize, ()>,
	positions: Vec<Point>,
	pins: Vec<Option<Point>>,
	degrees: Vec<u32>,
	links: Vec<LinkBody>,
	params: LayoutParams,
	canvas: Size,
	energy: Energy,
}

fn simulation_parameters(params: &LayoutParams) -> SimulationParameters {
	SimulationParameters {
		force_charge: (-params.charge_strength * CHARGE_SCALE).max(0.0) as f32,
		force_spring: 0.0,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

impl ForceEngine {
	pub fn new(graph: &CoauthorGraph, canvas: Size, params: LayoutParams) -> Self {
		let center = canvas.center();
		// Phyllotaxis spiral: deterministic, evenly spread, no two nodes coincide.
		let golden = PI * (3.0 - 5f64.sqrt());
		let positions: Vec<Point> = (0..graph.nodes.len())
			.map(|i| {
				let r = 10.0 * (0.5 + i as f64).sqrt();
				let a = i as f64 * golden;
				Point::new(center.x + r * a.cos(), center.y + r * a.sin())
			})
			.collect();

		let mut link_counts = vec![0usize; graph.nodes.len()];
		for &(s, t) in graph.endpoints() {
			link_counts[s] += 1;
			link_counts[t] += 1;
		}
		let links = graph
			.endpoints()
			.iter()
			.zip(&graph.links)
			.map(|(&(source, target), link)| {
				let (cs, ct) = (link_counts[source] as f64, link_counts[target] as f64);
				LinkBody {
					source,
					target,
					weight: link.weight,
					bias: cs / (cs + ct),
					strength: 1.0 / cs.min(ct),
				}
			})
			.collect();

		let mut engine = Self {
			sim: ForceGraph::new(simulation_parameters(&params)),
			pins: vec![None; positions.len()],
			degrees: graph.nodes.iter().map(|n| n.degree).collect(),
			positions,
			links,
			params,
			canvas,
			energy: Energy::default(),
		};
		engine.rebuild_simulation();
		engine
	}

	/// Recreate the underlying simulation at the current positions.
	fn rebuild_simulation(&mut self) {
		let mut sim = ForceGraph::new(simulation_parameters(&self.params));
		for (idx, p) in self.positions.iter().enumerate() {
			sim.add_node(NodeData {
				x: p.x as f32,
				y: p.y as f32,
				mass: NODE_MASS,
				is_anchor: self.pins[idx].is_some(),
				user_data: idx,
			});
		}
		self.sim = sim;
	}

	fn pull_from_simulation(&mut self) {
		let positions = &mut self.positions;
		self.sim.visit_nodes(|node| {
			if let Some(p) = positions.get_mut(node.data.user_data) {
				*p = Point::new(node.x() as f64, node.y() as f64);
			}
		});
	}

	fn push_to_simulation(&mut self) {
		let (positions, pins) = (&self.positions, &self.pins);
		self.sim.visit_nodes_mut(|node| {
			let idx = node.data.user_data;
			if let Some(p) = positions.get(idx) {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = pins[idx].is_some();
			}
		});
	}

	fn is_free(&self, idx: usize) -> bool {
		self.pins[idx].is_none()
	}

	/// Nudge `(i, j)` by `delta` split by `share_j`, never moving pinned nodes.
	fn split_move(&mut self, i: usize, j: usize, dx: f64, dy: f64, share_j: f64) {
		let (free_i, free_j) = (self.is_free(i), self.is_free(j));
		let share_j = match (free_i, free_j) {
			(true, true) => share_j,
			(true, false) => 0.0,
			(false, true) => 1.0,
			(false, false) => return,
		};
		self.positions[j].x -= dx * share_j;
		self.positions[j].y -= dy * share_j;
		self.positions[i].x += dx * (1.0 - share_j);
		self.positions[i].y += dy * (1.0 - share_j);
	}

	fn apply_links(&mut self, alpha: f64) {
		for k in 0..self.links.len() {
			let link = self.links[k].clone();
			let (ps, pt) = (self.positions[link.source], self.positions[link.target]);
			let (mut dx, mut dy) = (pt.x - ps.x, pt.y - ps.y);
			if dx == 0.0 && dy == 0.0 {
				dx = jiggle(k);
				dy = jiggle(k + 1);
			}
			let l = dx.hypot(dy);
			let target = link_distance(self.params.link_base_distance, link.weight);
			let factor = (l - target) / l * alpha * link.strength;
			self.split_move(
				link.source,
				link.target,
				dx * factor,
				dy * factor,
				link.bias,
			);
		}
	}

	fn apply_collisions(&mut self) {
		let radii: Vec<f64> = self
			.degrees
			.iter()
			.map(|&d| collide_radius(self.params.collide_base_radius, d))
			.collect();
		let n = self.positions.len();
		for _ in 0..COLLIDE_ITERATIONS {
			for i in 0..n {
				for j in i + 1..n {
					let (pi, pj) = (self.positions[i], self.positions[j]);
					let min_dist = radii[i] + radii[j];
					let (mut dx, mut dy) = (pj.x - pi.x, pj.y - pi.y);
					if dx == 0.0 && dy == 0.0 {
						dx = jiggle(i + j);
						dy = jiggle(i * j + 1);
					}
					let l = dx.hypot(dy);
					if l >= min_dist {
						continue;
					}
					let push = (min_dist - l) / l;
					let (ri2, rj2) = (radii[i] * radii[i], radii[j] * radii[j]);
					// Smaller nodes yield more.
					let share_j = ri2 / (ri2 + rj2);
					self.split_move(i, j, -dx * push, -dy * push, share_j);
				}
			}
		}
	}

	fn apply_radial(&mut self, alpha: f64) {
		let center = self.canvas.center();
		let ring = radial_ring(self.canvas);
		let strength = self.params.radial_strength * alpha;
		for idx in 0..self.positions.len() {
			if !self.is_free(idx) {
				continue;
			}
			let p = &mut self.positions[idx];
			let (dx, dy) = (p.x - center.x, p.y - center.y);
			let r = dx.hypot(dy).max(1e-6);
			let k = (ring - r) * strength / r;
			p.x += dx * k;
			p.y += dy * k;
		}
	}

	fn apply_center(&mut self) {
		let free: Vec<usize> = (0..self.positions.len())
			.filter(|&i| self.is_free(i))
			.collect();
		if free.is_empty() {
			return;
		}
		let center = self.canvas.center();
		let n = free.len() as f64;
		let (sx, sy) = free.iter().fold((0.0, 0.0), |(sx, sy), &i| {
			(sx + self.positions[i].x, sy + self.positions[i].y)
		});
		let strength = self.params.center_strength;
		let (shift_x, shift_y) = ((sx / n - center.x) * strength, (sy / n - center.y) * strength);
		for i in free {
			self.positions[i].x -= shift_x;
			self.positions[i].y -= shift_y;
		}
	}
}

/// Tiny deterministic offset for coincident points.
fn jiggle(seed: usize) -> f64 {
	((seed as f64 * 12.9898).sin() * 43758.5453).fract() * 1e-6 + 1e-7
}

impl LayoutEngine for ForceEngine {
	fn name(&self) -> &'static str {
		"force"
	}

	fn tick(&mut self) -> bool {
		if !self.energy.step() {
			return false;
		}
		let alpha = self.energy.alpha;

		self.sim.update(TICK_DT * alpha as f32);
		self.pull_from_simulation();

		self.apply_links(alpha);
		self.apply_collisions();
		self.apply_radial(alpha);
		self.apply_center();

		let center = self.canvas.center();
		for (idx, p) in self.positions.iter_mut().enumerate() {
			if let Some(pin) = self.pins[idx] {
				*p = pin;
			} else if !p.is_finite() {
				*p = center;
			}
		}
		self.push_to_simulation();
		true
	}

	fn positions(&self) -> &[Point] {
		&self.positions
	}

	fn pin(&mut self, idx: usize, at: Point) {
		if idx >= self.positions.len() || !at.is_finite() {
			return;
		}
		self.pins[idx] = Some(at);
		self.positions[idx] = at;
		self.sim.visit_nodes_mut(|node| {
			if node.data.user_data == idx {
				node.data.x = at.x as f32;
				node.data.y = at.y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	fn unpin(&mut self, idx: usize) {
		if let Some(pin) = self.pins.get_mut(idx) {
			*pin = None;
			self.sim.visit_nodes_mut(|node| {
				if node.data.user_data == idx {
					node.data.is_anchor = false;
				}
			});
		}
	}

	fn is_pinned(&self, idx: usize) -> bool {
		self.pins.get(idx).is_some_and(Option::is_some)
	}

	fn set_params(&mut self, params: &LayoutParams) {
		if params.validate().is_err() || *params == self.params {
			return;
		}
		let charge_changed = params.charge_strength != self.params.charge_strength;
		self.params = *params;
		if charge_changed {
			self.rebuild_simulation();
		}
		if self.energy.alpha < RESETTLE_ALPHA {
			self.energy.restart_with(RESETTLE_ALPHA);
		} else {
			self.energy.restart();
		}
	}

	fn heat(&mut self, alpha_target: f64) {
		self.energy.set_target(alpha_target);
		self.energy.restart();
	}

	fn cool(&mut self) {
		self.energy.set_target(0.0);
	}

	fn is_live(&self) -> bool {
		self.energy.is_live()
	}

	fn stop(&mut self) {
		self.energy.stop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::coauthor_graph::graph::build_coauthor_graph;
	use crate::components::coauthor_graph::types::Publication;

	fn sample_graph() -> CoauthorGraph {
		build_coauthor_graph(&[
			Publication::with_authors("1", ["Filipov, V.", "Smith, J."]),
			Publication::with_authors("2", ["Filipov, V.", "Smith, J.", "Doe, A."]),
			Publication::with_authors("3", ["Doe, A.", "Roe, B."]),
			Publication::with_authors("4", ["Filipov, V.", "Kim, C."]),
			Publication::with_authors("5", ["Solo, H."]),
		])
	}

	fn engine() -> ForceEngine {
		ForceEngine::new(
			&sample_graph(),
			Size::new(760.0, 460.0),
			LayoutParams::default(),
		)
	}

	#[test]
	fn initial_positions_are_distinct_and_finite() {
		let engine = engine();
		let positions = engine.positions();
		assert_eq!(positions.len(), 6);
		for (i, a) in positions.iter().enumerate() {
			assert!(a.is_finite());
			for b in &positions[i + 1..] {
				assert!(a.distance(*b) > 1.0);
			}
		}
	}

	#[test]
	fn settles_and_stops() {
		let mut engine = engine();
		let mut ticks = 0;
		while engine.tick() {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert!(!engine.is_live());
		assert!(engine.positions().iter().all(|p| p.is_finite()));
	}

	#[test]
	fn center_force_keeps_centroid_on_canvas_center() {
		let mut engine = engine();
		for _ in 0..50 {
			engine.tick();
		}
		let n = engine.positions().len() as f64;
		let (sx, sy) = engine
			.positions()
			.iter()
			.fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
		assert!((sx / n - 380.0).abs() < 1e-3);
		assert!((sy / n - 230.0).abs() < 1e-3);
	}

	#[test]
	fn pinned_node_holds_exact_position() {
		let mut engine = engine();
		let pin = Point::new(12.5, -40.0);
		engine.pin(0, pin);
		engine.heat(0.3);
		for _ in 0..30 {
			engine.tick();
			assert_eq!(engine.positions()[0], pin);
		}
		assert!(engine.is_live());
	}

	#[test]
	fn unpinned_node_moves_again() {
		let mut engine = engine();
		let pin = Point::new(5000.0, 5000.0);
		engine.pin(1, pin);
		engine.tick();
		engine.unpin(1);
		engine.heat(0.3);
		engine.tick();
		assert!(!engine.is_pinned(1));
		assert_ne!(engine.positions()[1], pin);
	}

	#[test]
	fn parameter_change_reheats_a_resting_layout() {
		let mut engine = engine();
		while engine.tick() {}
		engine.set_params(&LayoutParams::spread());
		assert!(engine.is_live());
		assert!(engine.tick());
	}

	#[test]
	fn provider_honours_configuration() {
		let graph = sample_graph();
		let canvas = Size::new(760.0, 460.0);
		let disabled = ForceProvider { enabled: false };
		assert!(matches!(
			disabled.create(&graph, canvas, &LayoutParams::default()),
			Err(LayoutError::Disabled)
		));
		let bad = LayoutParams {
			radial_strength: f64::NAN,
			..LayoutParams::default()
		};
		assert!(matches!(
			ForceProvider::default().create(&graph, canvas, &bad),
			Err(LayoutError::InvalidParameter { .. })
		));
		let engine = ForceProvider::default()
			.create(&graph, canvas, &LayoutParams::default())
			.unwrap();
		assert_eq!(engine.name(), "force");
		assert!(matches!(
			ForceProvider::default().create(&CoauthorGraph::default(), canvas, &LayoutParams::default()),
			Err(LayoutError::EmptyGraph)
		));
	}
}
