//! Pan/zoom transform and coordinate conversion.
//!
//! # Coordinate Spaces
//!
//! - **Client-space**: pointer coordinates as reported by the browser.
//! - **Root-space**: pixel coordinates of the drawing surface. Derived from client-space
//!   by the surface's own placement and pixel density ([`SurfaceTransform`]).
//! - **Logical-space**: where the layout engine places nodes, independent of pan/zoom.
//!
//! The view maps logical to root as `root = (logical + (tx, ty)) * scale`.

use super::config::ZoomConfig;

/// A 2D point in any of the coordinate spaces above.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Minimum measured surface size before a layout may start.
pub const MIN_SURFACE_WIDTH: f64 = 100.0;
pub const MIN_SURFACE_HEIGHT: f64 = 80.0;

/// Drawing surface dimensions in root-space pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Whether the surface has been measured with a usable, non-degenerate size.
	pub fn is_measured(&self) -> bool {
		self.width >= MIN_SURFACE_WIDTH && self.height >= MIN_SURFACE_HEIGHT
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// The drawing surface's placement on screen: maps client-space to root-space.
///
/// Built from the element's bounding rectangle each event; a missing or zero-sized
/// rectangle yields no transform and dependent operations are skipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceTransform {
	left: f64,
	top: f64,
	width: f64,
	height: f64,
	scale_x: f64,
	scale_y: f64,
}

impl SurfaceTransform {
	/// `css_*` is the on-screen rectangle, `pixel_*` the backing store size.
	pub fn from_rect(
		left: f64,
		top: f64,
		css_width: f64,
		css_height: f64,
		pixel_width: f64,
		pixel_height: f64,
	) -> Option<Self> {
		let usable = |v: f64| v.is_finite() && v > 0.0;
		if !(usable(css_width) && usable(css_height) && usable(pixel_width) && usable(pixel_height))
			|| !left.is_finite()
			|| !top.is_finite()
		{
			return None;
		}
		Some(Self {
			left,
			top,
			width: css_width,
			height: css_height,
			scale_x: pixel_width / css_width,
			scale_y: pixel_height / css_height,
		})
	}

	/// A surface at the client origin with one pixel per client unit.
	pub fn identity(width: f64, height: f64) -> Self {
		Self {
			left: 0.0,
			top: 0.0,
			width,
			height,
			scale_x: 1.0,
			scale_y: 1.0,
		}
	}

	pub fn client_to_root(&self, client: Point) -> Point {
		Point::new(
			(client.x - self.left) * self.scale_x,
			(client.y - self.top) * self.scale_y,
		)
	}

	pub fn root_to_client(&self, root: Point) -> Point {
		Point::new(
			root.x / self.scale_x + self.left,
			root.y / self.scale_y + self.top,
		)
	}

	/// Client-space offset of the surface's top-left corner.
	pub fn origin(&self) -> Point {
		Point::new(self.left, self.top)
	}

	/// On-screen size of the surface.
	pub fn size(&self) -> Size {
		Size::new(self.width, self.height)
	}
}

/// Translation and uniform scale applied to the whole node/link group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub tx: f64,
	pub ty: f64,
	/// Zoom factor, clamped to the configured range.
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			tx: 0.0,
			ty: 0.0,
			scale: 1.0,
		}
	}
}

/// Owns the view transform and converts between coordinate spaces.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
	transform: ViewTransform,
	zoom: ZoomConfig,
}

impl Viewport {
	pub fn new(zoom: ZoomConfig) -> Self {
		Self {
			transform: ViewTransform::default(),
			zoom,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn zoom_config(&self) -> &ZoomConfig {
		&self.zoom
	}

	fn safe_scale(&self) -> f64 {
		self.transform.scale.max(1e-6)
	}

	pub fn logical_to_root(&self, p: Point) -> Point {
		let t = self.transform;
		Point::new((p.x + t.tx) * t.scale, (p.y + t.ty) * t.scale)
	}

	pub fn root_to_logical(&self, root: Point) -> Point {
		let s = self.safe_scale();
		Point::new(root.x / s - self.transform.tx, root.y / s - self.transform.ty)
	}

	/// Invert the full screen transform to recover logical coordinates.
	pub fn client_to_logical(&self, surface: &SurfaceTransform, client: Point) -> Point {
		self.root_to_logical(surface.client_to_root(client))
	}

	/// Forward transform, used to anchor screen-space overlays to a node.
	pub fn logical_to_client(&self, surface: &SurfaceTransform, p: Point) -> Point {
		surface.root_to_client(self.logical_to_root(p))
	}

	/// Rescale by `factor` keeping the logical point under `root` fixed on screen.
	///
	/// From `root = (u + tx) * s` and `root = (u + tx') * s'` it follows that
	/// `tx' = tx + root * (1/s' - 1/s)`.
	pub fn zoom_at(&mut self, root: Point, factor: f64) {
		if !factor.is_finite() || factor <= 0.0 || !root.is_finite() {
			return;
		}
		let old = self.safe_scale();
		let new = self.zoom.clamp(old * factor);
		let delta = 1.0 / new - 1.0 / old;
		self.transform.tx += root.x * delta;
		self.transform.ty += root.y * delta;
		self.transform.scale = new;
	}

	pub fn zoom_at_client(&mut self, surface: &SurfaceTransform, client: Point, factor: f64) {
		self.zoom_at(surface.client_to_root(client), factor);
	}

	/// Apply a root-space pan delta, converted to logical units by the current scale.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		let s = self.safe_scale();
		self.transform.tx += dx / s;
		self.transform.ty += dy / s;
	}

	pub fn set_translation(&mut self, tx: f64, ty: f64) {
		self.transform.tx = tx;
		self.transform.ty = ty;
	}

	pub fn reset(&mut self) {
		self.transform = ViewTransform::default();
	}
}
