//! Deterministic radial layout used when the physics simulation is unavailable.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use super::{LayoutEngine, LayoutParams};
use crate::components::coauthor_graph::graph::CoauthorGraph;
use crate::components::coauthor_graph::viewport::{Point, Size};

/// Owner at the canvas center, everyone else evenly spaced on a ring.
///
/// Better-connected authors sit closer to the center. The layout never ticks; pins
/// move a node directly and it stays where it was dropped.
pub struct StaticRadialLayout {
	positions: Vec<Point>,
	pinned: Vec<bool>,
}

impl StaticRadialLayout {
	pub fn new(graph: &CoauthorGraph, canvas: Size, owner: &str) -> Self {
		let center = canvas.center();
		let radius_base = canvas.width.min(canvas.height) / 3.2;
		let mut positions = vec![center; graph.nodes.len()];

		let mut others: Vec<usize> = (0..graph.nodes.len())
			.filter(|&i| graph.nodes[i].id != owner)
			.collect();
		others.sort_by(|&a, &b| {
			let (na, nb) = (&graph.nodes[a], &graph.nodes[b]);
			match nb.degree.cmp(&na.degree) {
				Ordering::Equal => na.name.cmp(&nb.name),
				ord => ord,
			}
		});

		let total = others.len().max(1) as f64;
		for (i, &idx) in others.iter().enumerate() {
			let angle = i as f64 / total * TAU;
			let r = radius_base - (graph.nodes[idx].degree as f64 * 8.0).min(60.0);
			positions[idx] = Point::new(center.x + angle.cos() * r, center.y + angle.sin() * r);
		}

		Self {
			pinned: vec![false; positions.len()],
			positions,
		}
	}
}

impl LayoutEngine for StaticRadialLayout {
	fn name(&self) -> &'static str {
		"static-radial"
	}

	fn tick(&mut self) -> bool {
		false
	}

	fn positions(&self) -> &[Point] {
		&self.positions
	}

	fn pin(&mut self, idx: usize, at: Point) {
		if let (Some(p), Some(pinned)) = (self.positions.get_mut(idx), self.pinned.get_mut(idx)) {
			*p = at;
			*pinned = true;
		}
	}

	fn unpin(&mut self, idx: usize) {
		if let Some(pinned) = self.pinned.get_mut(idx) {
			*pinned = false;
		}
	}

	fn is_pinned(&self, idx: usize) -> bool {
		self.pinned.get(idx).copied().unwrap_or(false)
	}

	fn set_params(&mut self, _params: &LayoutParams) {}

	fn heat(&mut self, _alpha_target: f64) {}

	fn cool(&mut self) {}

	fn is_live(&self) -> bool {
		false
	}

	fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::coauthor_graph::graph::build_coauthor_graph;
	use crate::components::coauthor_graph::types::Publication;

	#[test]
	fn owner_centered_and_others_evenly_spaced() {
		let publications: Vec<Publication> = ["A", "B", "C", "D", "E"]
			.iter()
			.map(|name| Publication::with_authors("p", ["Owner", *name]))
			.collect();
		let graph = build_coauthor_graph(&publications);
		let canvas = Size::new(1200.0, 900.0);
		let layout = StaticRadialLayout::new(&graph, canvas, "Owner");
		let center = canvas.center();

		assert_eq!(layout.positions()[graph.index_of("Owner").unwrap()], center);

		let mut angles: Vec<f64> = ["A", "B", "C", "D", "E"]
			.iter()
			.map(|name| {
				let p = layout.positions()[graph.index_of(name).unwrap()];
				(p.y - center.y).atan2(p.x - center.x).rem_euclid(TAU)
			})
			.collect();
		angles.sort_by(f64::total_cmp);
		for pair in angles.windows(2) {
			assert!((pair[1] - pair[0] - TAU / 5.0).abs() < 1e-9);
		}
	}

	#[test]
	fn higher_degree_sits_closer_to_center() {
		let graph = build_coauthor_graph(&[
			Publication::with_authors("1", ["Owner", "Busy"]),
			Publication::with_authors("2", ["Owner", "Busy"]),
			Publication::with_authors("3", ["Owner", "Busy"]),
			Publication::with_authors("4", ["Owner", "Rare"]),
		]);
		let canvas = Size::new(800.0, 800.0);
		let layout = StaticRadialLayout::new(&graph, canvas, "Owner");
		let center = canvas.center();
		let busy = layout.positions()[graph.index_of("Busy").unwrap()];
		let rare = layout.positions()[graph.index_of("Rare").unwrap()];
		assert!(busy.distance(center) < rare.distance(center));
		// Highest degree comes first, at angle zero.
		assert!((busy.y - center.y).abs() < 1e-9 && busy.x > center.x);
	}

	#[test]
	fn without_owner_everyone_is_on_the_ring() {
		let graph = build_coauthor_graph(&[Publication::with_authors("p", ["A", "B"])]);
		let canvas = Size::new(640.0, 480.0);
		let layout = StaticRadialLayout::new(&graph, canvas, "Owner");
		assert!(
			layout
				.positions()
				.iter()
				.all(|p| p.distance(canvas.center()) > 1.0)
		);
	}

	#[test]
	fn pin_moves_node_and_unpin_keeps_it() {
		let graph = build_coauthor_graph(&[Publication::with_authors("p", ["A", "B"])]);
		let mut layout = StaticRadialLayout::new(&graph, Size::new(640.0, 480.0), "A");
		layout.pin(1, Point::new(5.0, 6.0));
		assert!(layout.is_pinned(1));
		layout.unpin(1);
		assert!(!layout.is_pinned(1));
		assert!(!layout.tick());
		assert_eq!(layout.positions()[1], Point::new(5.0, 6.0));
	}
}
