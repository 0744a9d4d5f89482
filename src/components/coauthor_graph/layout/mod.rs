//! Node layout capability.
//!
//! The graph state only talks to a [`LayoutEngine`]; which engine backs it is decided
//! once per session by a [`LayoutProvider`]. The physics provider wraps the
//! `force_graph` simulation. When it cannot be used, [`start_layout`] falls back to the
//! deterministic [`StaticRadialLayout`] so the graph always renders.

mod force;
mod radial;

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use super::graph::CoauthorGraph;
use super::viewport::{Point, Size};

pub use force::{ForceEngine, ForceProvider};
pub use radial::StaticRadialLayout;

/// Why a layout engine could not be created.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
	#[error("physics simulation disabled by configuration")]
	Disabled,
	#[error("layout parameter `{name}` is not finite: {value}")]
	InvalidParameter { name: &'static str, value: f64 },
	#[error("no authors to simulate")]
	EmptyGraph,
}

/// Live-tunable force parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	/// Link target distance before the shared-publication bonus is subtracted.
	pub link_base_distance: f64,
	/// Many-body strength; more negative spreads the layout further.
	pub charge_strength: f64,
	/// Collision radius before the degree bonus is added.
	pub collide_base_radius: f64,
	pub center_strength: f64,
	pub radial_strength: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			link_base_distance: 160.0,
			charge_strength: -320.0,
			collide_base_radius: 18.0,
			center_strength: 1.0,
			radial_strength: 0.05,
		}
	}
}

impl LayoutParams {
	/// Loose preset with more room between clusters.
	pub fn spread() -> Self {
		Self {
			link_base_distance: 220.0,
			charge_strength: -420.0,
			collide_base_radius: 20.0,
			center_strength: 0.9,
			radial_strength: 0.06,
		}
	}

	/// Tight preset for small surfaces.
	pub fn compact() -> Self {
		Self {
			link_base_distance: 120.0,
			charge_strength: -240.0,
			collide_base_radius: 14.0,
			center_strength: 1.2,
			radial_strength: 0.03,
		}
	}

	pub fn get(&self, param: LayoutParam) -> f64 {
		match param {
			LayoutParam::LinkDistance => self.link_base_distance,
			LayoutParam::Charge => self.charge_strength,
			LayoutParam::CollideRadius => self.collide_base_radius,
			LayoutParam::Center => self.center_strength,
			LayoutParam::Radial => self.radial_strength,
		}
	}

	/// Set one parameter, clamped to its control range. Non-finite values are ignored.
	pub fn set(&mut self, param: LayoutParam, value: f64) {
		if !value.is_finite() {
			return;
		}
		let (min, max, _) = param.range();
		let value = value.clamp(min, max);
		match param {
			LayoutParam::LinkDistance => self.link_base_distance = value,
			LayoutParam::Charge => self.charge_strength = value,
			LayoutParam::CollideRadius => self.collide_base_radius = value,
			LayoutParam::Center => self.center_strength = value,
			LayoutParam::Radial => self.radial_strength = value,
		}
	}

	/// First non-finite parameter, if any.
	pub fn validate(&self) -> Result<(), LayoutError> {
		for param in LayoutParam::ALL {
			let value = self.get(param);
			if !value.is_finite() {
				return Err(LayoutError::InvalidParameter {
					name: param.key(),
					value,
				});
			}
		}
		Ok(())
	}
}

/// Identifies one tunable force parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutParam {
	LinkDistance,
	Charge,
	CollideRadius,
	Center,
	Radial,
}

impl LayoutParam {
	pub const ALL: [LayoutParam; 5] = [
		LayoutParam::LinkDistance,
		LayoutParam::Charge,
		LayoutParam::CollideRadius,
		LayoutParam::Center,
		LayoutParam::Radial,
	];

	pub fn key(self) -> &'static str {
		match self {
			LayoutParam::LinkDistance => "link_base_distance",
			LayoutParam::Charge => "charge_strength",
			LayoutParam::CollideRadius => "collide_base_radius",
			LayoutParam::Center => "center_strength",
			LayoutParam::Radial => "radial_strength",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			LayoutParam::LinkDistance => "Link base distance",
			LayoutParam::Charge => "Charge strength",
			LayoutParam::CollideRadius => "Collide radius",
			LayoutParam::Center => "Center force",
			LayoutParam::Radial => "Radial force",
		}
	}

	/// `(min, max, step)` of the control.
	pub fn range(self) -> (f64, f64, f64) {
		match self {
			LayoutParam::LinkDistance => (60.0, 300.0, 1.0),
			LayoutParam::Charge => (-800.0, -80.0, 1.0),
			LayoutParam::CollideRadius => (6.0, 40.0, 1.0),
			LayoutParam::Center => (0.0, 2.0, 0.01),
			LayoutParam::Radial => (0.0, 0.2, 0.005),
		}
	}
}

/// Target distance for a link: more shared publications pull co-authors closer.
pub fn link_distance(base: f64, weight: u32) -> f64 {
	base - (weight as f64 * 10.0).min(80.0)
}

/// Personal space of a node: higher-degree authors get a little more room.
pub fn collide_radius(base: f64, degree: u32) -> f64 {
	base + (degree as f64 * 0.7).min(14.0)
}

/// Radius of the ring the radial force pulls nodes towards.
pub fn radial_ring(canvas: Size) -> f64 {
	(canvas.width / 2.0).min(canvas.height / 2.0) * 0.7
}

/// Simulation energy ("alpha"), decaying towards a target.
///
/// Decays from 1 to the minimum in about 300 ticks when the target is 0. Raising the
/// target keeps the layout visibly reacting (e.g. while a node is dragged).
#[derive(Clone, Debug, PartialEq)]
pub struct Energy {
	pub alpha: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	running: bool,
}

impl Default for Energy {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			running: true,
		}
	}
}

impl Energy {
	/// Advance one tick. Returns false when the simulation is at rest.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		if self.alpha < self.alpha_min {
			self.running = false;
		}
		true
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn restart_with(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.running = true;
	}

	pub fn set_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn is_live(&self) -> bool {
		self.running
	}
}

/// A source of node positions for the current graph generation.
///
/// Node coordinates are only ever changed through these entry points.
pub trait LayoutEngine {
	fn name(&self) -> &'static str;
	/// Advance the layout one step. Returns whether positions changed.
	fn tick(&mut self) -> bool;
	/// Logical-space positions, indexed like the graph's nodes.
	fn positions(&self) -> &[Point];
	/// Fix a node at `at`. Pinned nodes do not move but still act on others.
	fn pin(&mut self, idx: usize, at: Point);
	/// Release a pin back to free motion.
	fn unpin(&mut self, idx: usize);
	fn is_pinned(&self, idx: usize) -> bool;
	/// Update force parameters in place and let the layout re-settle.
	fn set_params(&mut self, params: &LayoutParams);
	/// Raise the energy target and restart so the layout visibly reacts.
	fn heat(&mut self, alpha_target: f64);
	/// Return the energy target to rest.
	fn cool(&mut self);
	fn is_live(&self) -> bool;
	fn stop(&mut self);
}

/// Creates layout engines. Selected once at session start.
pub trait LayoutProvider {
	fn create(
		&self,
		graph: &CoauthorGraph,
		canvas: Size,
		params: &LayoutParams,
	) -> Result<Box<dyn LayoutEngine>, LayoutError>;
}

/// Create an engine from `provider`, or the static radial layout if that fails.
pub fn start_layout(
	provider: &dyn LayoutProvider,
	graph: &CoauthorGraph,
	canvas: Size,
	params: &LayoutParams,
	owner: &str,
) -> Box<dyn LayoutEngine> {
	match provider.create(graph, canvas, params) {
		Ok(engine) => {
			info!(
				"coauthor-graph: {} layout for {} nodes",
				engine.name(),
				graph.nodes.len()
			);
			engine
		}
		Err(err) => {
			warn!("coauthor-graph: {err}; using static radial layout");
			Box::new(StaticRadialLayout::new(graph, canvas, owner))
		}
	}
}
