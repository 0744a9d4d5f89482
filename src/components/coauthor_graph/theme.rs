//! Visual theming for the co-author graph.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Center color of the radial gradient.
	pub color_secondary: Color,
	pub use_gradient: bool,
}

/// Fill, outline and label colors for one kind of node.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub fill: Color,
	pub stroke: Color,
	pub label: Color,
	/// Shadow blur radius in screen pixels (0 = no glow).
	pub glow_blur: f64,
	pub glow_color: Color,
}

/// Link colors. Direct links touch the owner and are drawn solid.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub direct: Color,
	pub indirect: Color,
	pub glow_blur: f64,
	pub glow_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub owner: NodeStyle,
	pub coauthor: NodeStyle,
	pub link: LinkStyle,
	/// Ring drawn around the hovered and the selected node.
	pub ring: Color,
}

impl Theme {
	/// Retro neon look: magenta owner, gold co-authors.
	pub fn neon() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgba(0, 0, 0, 0.4),
				color_secondary: Color::rgba(18, 6, 24, 0.6),
				use_gradient: true,
			},
			owner: NodeStyle {
				fill: Color::rgba(255, 119, 238, 0.5),
				stroke: Color::rgb(255, 0, 255),
				label: Color::rgb(255, 0, 255),
				glow_blur: 6.0,
				glow_color: Color::rgb(255, 0, 255),
			},
			coauthor: NodeStyle {
				fill: Color::rgba(255, 215, 112, 0.5),
				stroke: Color::rgb(255, 214, 112),
				label: Color::rgb(255, 223, 232),
				glow_blur: 0.0,
				glow_color: Color::rgba(0, 0, 0, 0.0),
			},
			link: LinkStyle {
				direct: Color::rgba(255, 215, 0, 0.53 * 0.95),
				indirect: Color::rgba(255, 215, 0, 0.27 * 0.55),
				glow_blur: 6.0,
				glow_color: Color::rgba(255, 215, 0, 0.35),
			},
			ring: Color::rgb(0, 255, 255),
		}
	}

	pub fn node_style(&self, is_owner: bool) -> &NodeStyle {
		if is_owner { &self.owner } else { &self.coauthor }
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::neon()
	}
}
