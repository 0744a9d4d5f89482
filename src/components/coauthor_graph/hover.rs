//! Hover tracking with a debounced target switch, plus tooltip placement.
//!
//! Timestamps are milliseconds from a monotonic clock (`performance.now()` in the
//! browser). Pending switches are resolved by [`HoverTracker::poll`] from the
//! animation loop, so there are no detached timers to cancel on teardown.

use super::types::AuthorName;
use super::viewport::{Point, Size};

/// A hover switch waiting for its delay to elapse.
#[derive(Clone, Debug, PartialEq)]
struct PendingHover {
	author: AuthorName,
	due_ms: f64,
}

/// Which author the tooltip shows, with flicker-free switching between nodes.
///
/// - nothing shown: entering a node shows it immediately
/// - another node shown: entering schedules a switch after the delay; a newer
///   schedule replaces an older one
/// - leaving a node cancels any pending switch and hides it if it was shown
#[derive(Clone, Debug)]
pub struct HoverTracker {
	shown: Option<AuthorName>,
	pending: Option<PendingHover>,
	/// Node currently under the pointer, as last reported by [`Self::track`].
	under_pointer: Option<AuthorName>,
	delay_ms: f64,
}

impl HoverTracker {
	pub fn new(delay_ms: f64) -> Self {
		Self {
			shown: None,
			pending: None,
			under_pointer: None,
			delay_ms,
		}
	}

	/// The author whose tooltip is displayed.
	pub fn current(&self) -> Option<&AuthorName> {
		self.shown.as_ref()
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	pub fn enter(&mut self, author: &str, now_ms: f64) {
		match &self.shown {
			None => {
				self.pending = None;
				self.shown = Some(author.to_string());
			}
			Some(shown) if shown == author => self.pending = None,
			Some(_) => {
				if self.pending.as_ref().is_some_and(|p| p.author == author) {
					return;
				}
				self.pending = Some(PendingHover {
					author: author.to_string(),
					due_ms: now_ms + self.delay_ms,
				});
			}
		}
	}

	pub fn leave(&mut self, author: &str) {
		self.pending = None;
		if self.shown.as_deref() == Some(author) {
			self.shown = None;
		}
	}

	/// Feed the hit-test result of a pointer move. Moving straight from one node onto
	/// another is an enter without a leave, so the switch is debounced.
	pub fn track(&mut self, hit: Option<&str>, now_ms: f64) {
		if self.under_pointer.as_deref() == hit {
			return;
		}
		match hit {
			Some(author) => self.enter(author, now_ms),
			None => {
				if let Some(previous) = self.under_pointer.take() {
					self.leave(&previous);
				}
				// The shown author may be stale if a pending switch was cancelled.
				self.shown = None;
			}
		}
		self.under_pointer = hit.map(str::to_string);
	}

	/// Apply a due pending switch. Returns whether the shown author changed.
	pub fn poll(&mut self, now_ms: f64) -> bool {
		match &self.pending {
			Some(p) if now_ms >= p.due_ms => {
				let author = self.pending.take().map(|p| p.author);
				let changed = self.shown != author;
				self.shown = author;
				changed
			}
			_ => false,
		}
	}

	/// Drop all hover state (pointer left the surface, graph rebuilt).
	pub fn clear(&mut self) {
		self.shown = None;
		self.pending = None;
		self.under_pointer = None;
	}
}

/// Rate limiter: at most one pass per interval.
#[derive(Clone, Debug)]
pub struct Throttle {
	interval_ms: f64,
	last_ms: Option<f64>,
}

impl Throttle {
	pub fn new(interval_ms: f64) -> Self {
		Self {
			interval_ms,
			last_ms: None,
		}
	}

	/// Whether an update may run now; records it if so.
	pub fn ready(&mut self, now_ms: f64) -> bool {
		match self.last_ms {
			Some(last) if now_ms - last < self.interval_ms => false,
			_ => {
				self.last_ms = Some(now_ms);
				true
			}
		}
	}

	pub fn reset(&mut self) {
		self.last_ms = None;
	}
}

/// Tooltip offset from the surface's top-left corner, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TooltipPosition {
	pub left: f64,
	pub top: f64,
}

/// Places the tooltip under its node, kept inside the drawing surface.
///
/// The tooltip is horizontally centered on `left`.
#[derive(Clone, Debug)]
pub struct TooltipPlacer {
	throttle: Throttle,
	last: Option<TooltipPosition>,
	/// Estimated tooltip box.
	pub width: f64,
	pub height: f64,
	/// Gap between the node center and the tooltip top.
	pub offset: f64,
}

impl TooltipPlacer {
	pub fn new(interval_ms: f64) -> Self {
		Self {
			throttle: Throttle::new(interval_ms),
			last: None,
			width: 180.0,
			height: 48.0,
			offset: 8.0,
		}
	}

	/// Clamped position for an anchor given relative to the surface origin.
	pub fn clamp(&self, anchor: Point, surface: Size) -> TooltipPosition {
		let half = self.width / 2.0;
		let left = anchor.x.round().max(half).min(surface.width - half);
		let top = (anchor.y + self.offset)
			.round()
			.max(6.0)
			.min(surface.height - self.height)
			.max(0.0);
		TooltipPosition { left, top }
	}

	/// Throttled placement. Returns a position only when it is due and has changed.
	pub fn place(&mut self, anchor: Point, surface: Size, now_ms: f64) -> Option<TooltipPosition> {
		if !anchor.is_finite() || !self.throttle.ready(now_ms) {
			return None;
		}
		let position = self.clamp(anchor, surface);
		if self.last == Some(position) {
			return None;
		}
		self.last = Some(position);
		Some(position)
	}

	pub fn last(&self) -> Option<TooltipPosition> {
		self.last
	}

	/// Forget the placement so the next anchor is applied immediately.
	pub fn reset(&mut self) {
		self.last = None;
		self.throttle.reset();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_hover_is_immediate() {
		let mut hover = HoverTracker::new(80.0);
		hover.enter("A", 0.0);
		assert_eq!(hover.current().map(String::as_str), Some("A"));
		assert!(!hover.is_pending());
	}

	#[test]
	fn switching_is_debounced() {
		let mut hover = HoverTracker::new(80.0);
		hover.enter("A", 0.0);
		hover.enter("B", 10.0);
		assert!(hover.is_pending());
		assert!(!hover.poll(50.0));
		assert_eq!(hover.current().map(String::as_str), Some("A"));
		assert!(hover.poll(90.0));
		assert_eq!(hover.current().map(String::as_str), Some("B"));
	}

	#[test]
	fn newer_switch_replaces_pending_one() {
		let mut hover = HoverTracker::new(80.0);
		hover.enter("A", 0.0);
		hover.enter("B", 10.0);
		hover.enter("C", 60.0);
		assert!(!hover.poll(100.0));
		assert!(hover.poll(140.0));
		assert_eq!(hover.current().map(String::as_str), Some("C"));
	}

	#[test]
	fn re_entering_same_target_keeps_deadline() {
		let mut hover = HoverTracker::new(80.0);
		hover.enter("A", 0.0);
		hover.enter("B", 10.0);
		hover.enter("B", 70.0);
		assert!(hover.poll(95.0));
	}

	#[test]
	fn leaving_cancels_pending_switch() {
		let mut hover = HoverTracker::new(80.0);
		hover.enter("A", 0.0);
		hover.enter("B", 10.0);
		hover.leave("B");
		assert!(!hover.is_pending());
		assert!(!hover.poll(500.0));
		assert_eq!(hover.current().map(String::as_str), Some("A"));
		hover.leave("A");
		assert_eq!(hover.current(), None);
	}

	#[test]
	fn tracking_hit_tests() {
		let mut hover = HoverTracker::new(80.0);
		hover.track(Some("A"), 0.0);
		assert_eq!(hover.current().map(String::as_str), Some("A"));
		// Sweep directly onto a neighbor: debounced.
		hover.track(Some("B"), 5.0);
		assert_eq!(hover.current().map(String::as_str), Some("A"));
		// Leave before the delay elapses: nothing shown, nothing pending.
		hover.track(None, 20.0);
		assert_eq!(hover.current(), None);
		assert!(!hover.poll(200.0));
		// Fresh enter after empty space is immediate.
		hover.track(Some("B"), 210.0);
		assert_eq!(hover.current().map(String::as_str), Some("B"));
	}

	#[test]
	fn throttle_limits_rate() {
		let mut throttle = Throttle::new(36.0);
		assert!(throttle.ready(0.0));
		assert!(!throttle.ready(20.0));
		assert!(throttle.ready(36.0));
		let passes = (0..1000).filter(|ms| throttle.ready(100.0 + *ms as f64)).count();
		assert!((27..=29).contains(&passes), "{passes}");
	}

	#[test]
	fn tooltip_is_clamped_to_surface() {
		let placer = TooltipPlacer::new(36.0);
		let surface = Size::new(400.0, 300.0);
		assert_eq!(
			placer.clamp(Point::new(200.0, 100.0), surface),
			TooltipPosition {
				left: 200.0,
				top: 108.0
			}
		);
		assert_eq!(
			placer.clamp(Point::new(-50.0, -50.0), surface),
			TooltipPosition { left: 90.0, top: 6.0 }
		);
		assert_eq!(
			placer.clamp(Point::new(999.0, 999.0), surface),
			TooltipPosition {
				left: 310.0,
				top: 252.0
			}
		);
	}

	#[test]
	fn narrow_surface_keeps_tooltip_right_edge_inside() {
		let placer = TooltipPlacer::new(36.0);
		let position = placer.clamp(Point::new(20.0, 40.0), Size::new(120.0, 300.0));
		assert_eq!(position.left, 30.0);
		assert!(position.left + placer.width / 2.0 <= 120.0);
	}

	#[test]
	fn placement_is_throttled_and_deduplicated() {
		let mut placer = TooltipPlacer::new(36.0);
		let surface = Size::new(400.0, 300.0);
		assert!(placer.place(Point::new(100.0, 100.0), surface, 0.0).is_some());
		assert!(placer.place(Point::new(150.0, 100.0), surface, 10.0).is_none());
		assert!(placer.place(Point::new(100.0, 100.0), surface, 50.0).is_none());
		assert!(placer.place(Point::new(120.0, 100.0), surface, 100.0).is_some());
		assert!(placer.place(Point::new(f64::NAN, 0.0), surface, 200.0).is_none());
		assert_eq!(placer.last().map(|p| p.left), Some(120.0));
	}
}
