//! Zoom-dependent sizing for graph visuals.
//!
//! # Coordinate Spaces
//!
//! - **Logical-space**: node coordinates. Values in logical units grow on screen
//!   when zoomed in.
//! - **Root-space**: canvas pixels. Values in root units stay the same size on screen.
//!
//! Node and link sizes derive from graph data (degree, shared publications); labels,
//! rings and hit areas additionally depend on the zoom level `k`.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant logical size. Appears larger when zoomed in.
	World,
	/// Constant on-screen size. Divides by `k` to counteract the view transform.
	Screen,
	/// Logical size, clamped to min/max on-screen bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Logical-space value for a base value at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how opacity varies with zoom level.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	Constant,
	/// Invisible at `zero_alpha_k`, fully visible from `full_alpha_k`.
	Fade { zero_alpha_k: f64, full_alpha_k: f64 },
}

impl AlphaBehavior {
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Node radius as a function of degree.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Owner radius before the degree bonus.
	pub owner_radius: f64,
	/// Cap on the owner's degree bonus (one unit per degree).
	pub owner_max_bonus: f64,
	/// Co-author radius before the degree bonus.
	pub radius: f64,
	pub max_bonus: f64,
	pub bonus_per_degree: f64,
	pub stroke_width: f64,
	/// Extra pick distance around the drawn circle.
	pub hit_padding: f64,
	pub hit_behavior: ScaleBehavior,
}

/// Link stroke width as a function of weight.
#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	pub base_width: f64,
	pub width_per_weight: f64,
	pub max_width: f64,
	/// Links not touching the owner are thinner, down to `indirect_min_width`.
	pub indirect_factor: f64,
	pub indirect_min_width: f64,
	/// Dash pattern for links not touching the owner.
	pub dash_pattern: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct LabelScaleConfig {
	/// Font size in logical units.
	pub size: f64,
	/// Gap between circle edge and text.
	pub gap: f64,
	pub alpha_behavior: AlphaBehavior,
}

/// Hover/selection ring around a node.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Stroke width in screen pixels.
	pub width: f64,
	/// Offset from the node edge in screen pixels.
	pub offset: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub link: LinkScaleConfig,
	pub label: LabelScaleConfig,
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				owner_radius: 10.0,
				owner_max_bonus: 12.0,
				radius: 6.0,
				max_bonus: 8.0,
				bonus_per_degree: 0.4,
				stroke_width: 2.0,
				hit_padding: 3.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 8.0,
					max_screen: f64::INFINITY,
				},
			},
			link: LinkScaleConfig {
				base_width: 0.8,
				width_per_weight: 0.8,
				max_width: 6.0,
				indirect_factor: 0.7,
				indirect_min_width: 1.5,
				dash_pattern: (8.0, 6.0),
			},
			label: LabelScaleConfig {
				size: 12.0,
				gap: 6.0,
				alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.3,
					full_alpha_k: 0.55,
				},
			},
			ring: RingScaleConfig {
				width: 1.5,
				offset: 3.0,
			},
		}
	}
}

impl ScaleConfig {
	/// Drawn radius in logical units.
	pub fn node_radius(&self, is_owner: bool, degree: u32) -> f64 {
		let n = &self.node;
		let degree = degree as f64;
		if is_owner {
			n.owner_radius + degree.min(n.owner_max_bonus)
		} else {
			n.radius + (degree * n.bonus_per_degree).min(n.max_bonus)
		}
	}

	/// Stroke width in logical units. Direct links touch the owner.
	pub fn link_width(&self, weight: u32, direct: bool) -> f64 {
		let l = &self.link;
		let width = (l.base_width + weight as f64 * l.width_per_weight).min(l.max_width);
		if direct {
			width
		} else {
			(width * l.indirect_factor).max(l.indirect_min_width)
		}
	}
}

/// Pre-computed zoom-dependent values for one frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	/// Label font (e.g. "12px ui-monospace, monospace").
	pub label_font: String,
	pub label_bold_font: String,
	pub label_alpha: f64,
	pub ring_width: f64,
	pub ring_offset: f64,
	hit_padding: f64,
	hit_behavior: ScaleBehavior,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let size = config.label.size;
		Self {
			k,
			label_font: format!("{size}px ui-monospace, monospace"),
			label_bold_font: format!("bold {size}px ui-monospace, monospace"),
			label_alpha: config.label.alpha_behavior.apply(k),
			ring_width: config.ring.width / k,
			ring_offset: config.ring.offset / k,
			hit_padding: config.node.hit_padding,
			hit_behavior: config.node.hit_behavior.clone(),
		}
	}

	/// Pick radius for a node drawn at `radius`; never below the on-screen minimum.
	pub fn hit_radius(&self, radius: f64) -> f64 {
		self.hit_behavior.apply(radius + self.hit_padding, self.k)
	}
}
