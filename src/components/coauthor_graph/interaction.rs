//! Pointer gestures: panning the view and dragging nodes.
//!
//! At most one gesture runs at a time and it belongs to the pointer that started
//! it; events from other pointers are ignored until it ends. Wheel zoom is
//! independent of gestures.

use log::debug;

use super::session::LayoutSession;
use super::viewport::{Point, SurfaceTransform, ViewTransform, Viewport};

/// Energy target held while a node is dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Mouse button reported for the primary (left) button and for touch/pen contact.
const PRIMARY_BUTTON: i16 = 0;

/// The parts of a pointer event the controller needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
	pub pointer_id: i32,
	pub button: i16,
	pub client: Point,
}

impl PointerInput {
	pub fn primary(pointer_id: i32, client: Point) -> Self {
		Self {
			pointer_id,
			button: PRIMARY_BUTTON,
			client,
		}
	}
}

/// What a pointer-down landed on, resolved once by hit-testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
	Background,
	Node(usize),
	/// Overlaid controls. Never starts a gesture.
	NoPan,
}

/// The running gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
	Idle,
	Panning {
		pointer_id: i32,
		start: ViewTransform,
		start_root: Point,
	},
	DraggingNode {
		pointer_id: i32,
		node: usize,
		start_root: Point,
		/// Travelled beyond the click slop at some point.
		moved: bool,
	},
}

impl Gesture {
	fn pointer_id(&self) -> Option<i32> {
		match *self {
			Gesture::Idle => None,
			Gesture::Panning { pointer_id, .. } | Gesture::DraggingNode { pointer_id, .. } => {
				Some(pointer_id)
			}
		}
	}
}

/// How a gesture ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEnd {
	/// The event did not end a gesture.
	None,
	Panned,
	/// A node was dragged and released in a new place.
	Dropped(usize),
	/// A node was pressed and released without moving.
	Clicked(usize),
	Cancelled,
}

/// Pan/drag state machine.
#[derive(Clone, Debug)]
pub struct InteractionController {
	gesture: Gesture,
	click_slop: f64,
}

impl InteractionController {
	pub fn new(click_slop: f64) -> Self {
		Self {
			gesture: Gesture::Idle,
			click_slop,
		}
	}

	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	pub fn is_active(&self) -> bool {
		self.gesture != Gesture::Idle
	}

	/// Node being dragged, if any.
	pub fn dragged_node(&self) -> Option<usize> {
		match self.gesture {
			Gesture::DraggingNode { node, .. } => Some(node),
			_ => None,
		}
	}

	fn owns(&self, pointer_id: i32) -> bool {
		self.gesture.pointer_id() == Some(pointer_id)
	}

	/// Begin a gesture. Returns whether one started, in which case the caller should
	/// capture the pointer and listen for its moves until the gesture ends.
	pub fn pointer_down(
		&mut self,
		input: PointerInput,
		target: PointerTarget,
		surface: Option<&SurfaceTransform>,
		viewport: &Viewport,
		layout: &mut LayoutSession,
	) -> bool {
		if self.is_active() || input.button != PRIMARY_BUTTON {
			return false;
		}
		let Some(surface) = surface else {
			debug!("coauthor-graph: pointer down without a measurable surface");
			return false;
		};
		let root = surface.client_to_root(input.client);
		if !root.is_finite() {
			return false;
		}
		self.gesture = match target {
			PointerTarget::NoPan => return false,
			PointerTarget::Background => Gesture::Panning {
				pointer_id: input.pointer_id,
				start: viewport.transform(),
				start_root: root,
			},
			PointerTarget::Node(node) => {
				layout.pin(node, viewport.root_to_logical(root));
				layout.heat(DRAG_ALPHA_TARGET);
				Gesture::DraggingNode {
					pointer_id: input.pointer_id,
					node,
					start_root: root,
					moved: false,
				}
			}
		};
		true
	}

	/// Continue the running gesture. Returns whether the event was consumed.
	pub fn pointer_move(
		&mut self,
		input: PointerInput,
		surface: Option<&SurfaceTransform>,
		viewport: &mut Viewport,
		layout: &mut LayoutSession,
	) -> bool {
		if !self.owns(input.pointer_id) {
			return false;
		}
		let Some(surface) = surface else {
			return true;
		};
		let root = surface.client_to_root(input.client);
		if !root.is_finite() {
			return true;
		}
		match &mut self.gesture {
			Gesture::Idle => return false,
			Gesture::Panning {
				start, start_root, ..
			} => {
				// Relative to the gesture start, so rounding does not accumulate.
				viewport.set_translation(start.tx, start.ty);
				viewport.pan_by(root.x - start_root.x, root.y - start_root.y);
			}
			Gesture::DraggingNode {
				node,
				start_root,
				moved,
				..
			} => {
				if root.distance(*start_root) > self.click_slop {
					*moved = true;
				}
				layout.pin(*node, viewport.root_to_logical(root));
			}
		}
		true
	}

	/// Finish the running gesture.
	pub fn pointer_up(&mut self, input: PointerInput, layout: &mut LayoutSession) -> GestureEnd {
		if !self.owns(input.pointer_id) {
			return GestureEnd::None;
		}
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Idle => GestureEnd::None,
			Gesture::Panning { .. } => GestureEnd::Panned,
			Gesture::DraggingNode { node, moved, .. } => {
				layout.unpin(node);
				layout.cool();
				if moved {
					GestureEnd::Dropped(node)
				} else {
					GestureEnd::Clicked(node)
				}
			}
		}
	}

	/// The browser took the pointer away. Ends the gesture without a click.
	pub fn pointer_cancel(&mut self, pointer_id: i32, layout: &mut LayoutSession) -> GestureEnd {
		if !self.owns(pointer_id) {
			return GestureEnd::None;
		}
		self.abort(layout);
		GestureEnd::Cancelled
	}

	/// End any gesture unconditionally (teardown, rebuild).
	pub fn abort(&mut self, layout: &mut LayoutSession) {
		if let Gesture::DraggingNode { node, .. } = self.gesture {
			layout.unpin(node);
			layout.cool();
		}
		self.gesture = Gesture::Idle;
	}

	/// Zoom one wheel notch around the cursor.
	pub fn wheel(
		&self,
		delta_y: f64,
		client: Point,
		surface: Option<&SurfaceTransform>,
		viewport: &mut Viewport,
	) -> bool {
		let Some(surface) = surface else {
			return false;
		};
		if !delta_y.is_finite() {
			return false;
		}
		let factor = viewport.zoom_config().wheel_factor(delta_y);
		viewport.zoom_at_client(surface, client, factor);
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::coauthor_graph::layout::{ForceProvider, LayoutParams};
	use crate::components::coauthor_graph::types::Publication;
	use crate::components::coauthor_graph::viewport::Size;

	const EPS: f64 = 1e-9;

	fn setup() -> (InteractionController, Viewport, LayoutSession, SurfaceTransform) {
		let mut layout = LayoutSession::new(
			&[Publication::with_authors("p", ["Me", "You"])],
			"Me".to_string(),
			Box::new(ForceProvider::default()),
			LayoutParams::default(),
		);
		layout.rebuild(Size::new(400.0, 300.0));
		let surface = SurfaceTransform::from_rect(10.0, 20.0, 400.0, 300.0, 400.0, 300.0).unwrap();
		(InteractionController::new(3.0), Viewport::default(), layout, surface)
	}

	#[test]
	fn background_drag_pans_by_delta_over_scale() {
		let (mut ctl, mut viewport, mut layout, surface) = setup();
		viewport.zoom_at(Point::new(0.0, 0.0), 2.0);
		let start = viewport.transform();

		let down = PointerInput::primary(1, Point::new(110.0, 120.0));
		assert!(ctl.pointer_down(down, PointerTarget::Background, Some(&surface), &viewport, &mut layout));
		let mv = PointerInput::primary(1, Point::new(150.0, 100.0));
		assert!(ctl.pointer_move(mv, Some(&surface), &mut viewport, &mut layout));
		assert!(ctl.pointer_move(mv, Some(&surface), &mut viewport, &mut layout));

		let end = viewport.transform();
		assert!((end.tx - (start.tx + 20.0)).abs() < EPS);
		assert!((end.ty - (start.ty - 10.0)).abs() < EPS);
		assert_eq!(ctl.pointer_up(mv, &mut layout), GestureEnd::Panned);
		assert!(!ctl.is_active());
	}

	#[test]
	fn node_drag_pins_to_pointer_and_releases() {
		let (mut ctl, mut viewport, mut layout, surface) = setup();
		viewport.zoom_at(Point::new(50.0, 50.0), 1.5);

		let down = PointerInput::primary(7, Point::new(100.0, 100.0));
		assert!(ctl.pointer_down(down, PointerTarget::Node(1), Some(&surface), &viewport, &mut layout));
		assert!(layout.is_pinned(1));
		assert!(layout.is_live());

		let client = Point::new(180.0, 140.0);
		ctl.pointer_move(PointerInput::primary(7, client), Some(&surface), &mut viewport, &mut layout);
		let expected = viewport.client_to_logical(&surface, client);
		let actual = layout.position(1).unwrap();
		assert!(actual.distance(expected) < EPS, "{actual:?} != {expected:?}");

		assert_eq!(
			ctl.pointer_up(PointerInput::primary(7, client), &mut layout),
			GestureEnd::Dropped(1)
		);
		assert!(!layout.is_pinned(1));
	}

	#[test]
	fn press_without_travel_is_a_click() {
		let (mut ctl, mut viewport, mut layout, surface) = setup();
		let down = PointerInput::primary(1, Point::new(100.0, 100.0));
		ctl.pointer_down(down, PointerTarget::Node(0), Some(&surface), &viewport, &mut layout);
		let jitter = PointerInput::primary(1, Point::new(101.0, 101.0));
		ctl.pointer_move(jitter, Some(&surface), &mut viewport, &mut layout);
		assert_eq!(ctl.pointer_up(jitter, &mut layout), GestureEnd::Clicked(0));
	}

	#[test]
	fn other_pointers_and_buttons_are_ignored() {
		let (mut ctl, mut viewport, mut layout, surface) = setup();
		let right = PointerInput {
			button: 2,
			..PointerInput::primary(1, Point::new(50.0, 50.0))
		};
		assert!(!ctl.pointer_down(right, PointerTarget::Background, Some(&surface), &viewport, &mut layout));

		let down = PointerInput::primary(1, Point::new(50.0, 50.0));
		assert!(ctl.pointer_down(down, PointerTarget::Background, Some(&surface), &viewport, &mut layout));
		let second = PointerInput::primary(2, Point::new(90.0, 90.0));
		assert!(!ctl.pointer_down(second, PointerTarget::Node(0), Some(&surface), &viewport, &mut layout));
		assert!(!ctl.pointer_move(second, Some(&surface), &mut viewport, &mut layout));
		assert_eq!(ctl.pointer_up(second, &mut layout), GestureEnd::None);
		assert_eq!(viewport.transform(), ViewTransform::default());
		assert!(ctl.is_active());
	}

	#[test]
	fn controls_and_missing_surface_never_start_gestures() {
		let (mut ctl, viewport, mut layout, surface) = setup();
		let down = PointerInput::primary(1, Point::new(50.0, 50.0));
		assert!(!ctl.pointer_down(down, PointerTarget::NoPan, Some(&surface), &viewport, &mut layout));
		assert!(!ctl.pointer_down(down, PointerTarget::Background, None, &viewport, &mut layout));
		assert!(!ctl.is_active());
	}

	#[test]
	fn cancel_releases_pin_without_click() {
		let (mut ctl, viewport, mut layout, surface) = setup();
		let down = PointerInput::primary(4, Point::new(100.0, 100.0));
		ctl.pointer_down(down, PointerTarget::Node(1), Some(&surface), &viewport, &mut layout);
		assert_eq!(ctl.pointer_cancel(3, &mut layout), GestureEnd::None);
		assert_eq!(ctl.pointer_cancel(4, &mut layout), GestureEnd::Cancelled);
		assert!(!layout.is_pinned(1));
		assert!(!ctl.is_active());
	}

	#[test]
	fn wheel_zooms_around_cursor() {
		let (ctl, mut viewport, _layout, surface) = setup();
		let client = Point::new(210.0, 170.0);
		let before = viewport.client_to_logical(&surface, client);
		assert!(ctl.wheel(-100.0, client, Some(&surface), &mut viewport));
		assert!((viewport.transform().scale - 1.08).abs() < EPS);
		let after = viewport.logical_to_client(&surface, before);
		assert!(after.distance(client) < EPS);
		assert!(!ctl.wheel(-100.0, client, None, &mut viewport));
	}
}
