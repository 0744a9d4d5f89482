//! Per-canvas state: layout session, view, gestures, hover and selection.
//!
//! Event handlers and the animation loop only talk to [`CoauthorGraphState`]; it
//! owns no DOM handles and is fully testable without a browser.

use log::debug;

use super::config::{GraphConfig, SiteData};
use super::hover::{HoverTracker, TooltipPlacer, TooltipPosition};
use super::interaction::{Gesture, GestureEnd, InteractionController, PointerInput, PointerTarget};
use super::layout::{ForceProvider, LayoutParam, LayoutParams};
use super::scale::{ScaleConfig, ScaledValues};
use super::selection::Selection;
use super::session::LayoutSession;
use super::types::{AuthorName, Publication};
use super::viewport::{Point, Size, SurfaceTransform, Viewport};

/// Coarse interaction mode, for styling and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Idle,
	Panning,
	DraggingNode,
	/// A hover switch is waiting for its delay.
	HoverPending,
}

pub struct CoauthorGraphState {
	pub session: LayoutSession,
	pub viewport: Viewport,
	pub interaction: InteractionController,
	pub hover: HoverTracker,
	pub selection: Selection,
	pub tooltip: TooltipPlacer,
	pub scale: ScaleConfig,
	publications: Vec<Publication>,
	/// Last measured canvas size.
	pub size: Size,
}

impl CoauthorGraphState {
	pub fn new(data: &SiteData) -> Self {
		let GraphConfig {
			physics,
			layout,
			zoom,
			hover_delay_ms,
			tooltip_interval_ms,
			click_slop_px,
		} = data.config.clone();
		Self {
			session: LayoutSession::new(
				&data.publications,
				data.owner.clone(),
				Box::new(ForceProvider { enabled: physics }),
				layout,
			),
			viewport: Viewport::new(zoom),
			interaction: InteractionController::new(click_slop_px),
			hover: HoverTracker::new(hover_delay_ms),
			selection: Selection::default(),
			tooltip: TooltipPlacer::new(tooltip_interval_ms),
			scale: ScaleConfig::default(),
			publications: data.publications.clone(),
			size: Size::default(),
		}
	}

	pub fn publications(&self) -> &[Publication] {
		&self.publications
	}

	/// Graph identity is the exact name; similar family names are other people.
	pub fn is_owner(&self, author: &str) -> bool {
		author == self.session.owner()
	}

	/// Record a new canvas size and (re)start the layout if it is usable.
	///
	/// Returns whether a new layout generation started.
	pub fn resize(&mut self, size: Size) -> bool {
		if size == self.size && self.session.is_started() {
			return false;
		}
		self.size = size;
		if !size.is_measured() {
			return false;
		}
		self.interaction.abort(&mut self.session);
		self.hover.clear();
		self.tooltip.reset();
		self.session.rebuild(size).is_some()
	}

	/// Swap in a new data set. Selection survives only if the author still exists.
	pub fn set_publications(&mut self, publications: Vec<Publication>) {
		self.interaction.abort(&mut self.session);
		self.hover.clear();
		self.tooltip.reset();
		self.session.replace_publications(&publications);
		self.publications = publications;
		match self.selection.author.clone() {
			Some(author) if self.session.graph().index_of(&author).is_some() => {
				self.selection.select(&author, &self.publications);
			}
			_ => self.selection.clear(),
		}
	}

	pub fn mode(&self) -> Mode {
		match self.interaction.gesture() {
			Gesture::Panning { .. } => Mode::Panning,
			Gesture::DraggingNode { .. } => Mode::DraggingNode,
			Gesture::Idle if self.hover.is_pending() => Mode::HoverPending,
			Gesture::Idle => Mode::Idle,
		}
	}

	/// Topmost node under a root-space point. Later nodes are drawn on top.
	pub fn node_at(&self, root: Point) -> Option<usize> {
		let logical = self.viewport.root_to_logical(root);
		let scaled = ScaledValues::new(&self.scale, self.viewport.transform().scale);
		let graph = self.session.graph();
		self.session
			.positions()
			.iter()
			.enumerate()
			.rev()
			.find(|(idx, p)| {
				let node = &graph.nodes[*idx];
				let radius = self.scale.node_radius(self.is_owner(&node.name), node.degree);
				p.distance(logical) <= scaled.hit_radius(radius)
			})
			.map(|(idx, _)| idx)
	}

	fn author_at(&self, root: Point) -> Option<&str> {
		self.node_at(root)
			.and_then(|idx| self.session.graph().node(idx))
			.map(|n| n.name.as_str())
	}

	/// Resolve what a press at `client` lands on.
	pub fn pointer_target(&self, client: Point, surface: Option<&SurfaceTransform>) -> PointerTarget {
		surface
			.and_then(|s| self.node_at(s.client_to_root(client)))
			.map_or(PointerTarget::Background, PointerTarget::Node)
	}

	/// Returns whether a gesture started.
	pub fn pointer_down(
		&mut self,
		input: PointerInput,
		on_controls: bool,
		surface: Option<&SurfaceTransform>,
	) -> bool {
		let target = if on_controls {
			PointerTarget::NoPan
		} else {
			self.pointer_target(input.client, surface)
		};
		self.interaction.pointer_down(
			input,
			target,
			surface,
			&self.viewport,
			&mut self.session,
		)
	}

	/// Gesture move, or a hover hit-test when no gesture is running.
	pub fn pointer_move(&mut self, input: PointerInput, surface: Option<&SurfaceTransform>, now_ms: f64) {
		if self.interaction.is_active() {
			self.interaction.pointer_move(
				input,
				surface,
				&mut self.viewport,
				&mut self.session,
			);
			return;
		}
		let Some(surface) = surface else {
			return;
		};
		let hit = self
			.author_at(surface.client_to_root(input.client))
			.map(str::to_string);
		self.hover.track(hit.as_deref(), now_ms);
	}

	/// End a gesture; a click on a node selects it.
	pub fn pointer_up(&mut self, input: PointerInput) -> GestureEnd {
		let end = self.interaction.pointer_up(input, &mut self.session);
		if let GestureEnd::Clicked(idx) = end {
			if let Some(name) = self.session.graph().node(idx).map(|n| n.name.clone()) {
				self.select(&name);
			}
		}
		end
	}

	pub fn pointer_cancel(&mut self, pointer_id: i32) -> GestureEnd {
		self.interaction.pointer_cancel(pointer_id, &mut self.session)
	}

	/// Pointer left the canvas. Captured gestures keep running.
	pub fn pointer_leave(&mut self) {
		if !self.interaction.is_active() {
			self.hover.clear();
		}
	}

	pub fn wheel(&mut self, delta_y: f64, client: Point, surface: Option<&SurfaceTransform>) -> bool {
		self.interaction
			.wheel(delta_y, client, surface, &mut self.viewport)
	}

	pub fn select(&mut self, author: &str) {
		debug!("coauthor-graph: selected {author}");
		self.selection.select(author, &self.publications);
	}

	pub fn clear_selection(&mut self) {
		self.selection.clear();
	}

	pub fn set_layout_param(&mut self, param: LayoutParam, value: f64) {
		self.session.set_param(param, value);
	}

	pub fn set_layout_params(&mut self, params: LayoutParams) {
		self.session.set_params(params);
	}

	/// Author the tooltip follows: the hovered node, else the selected one.
	pub fn tooltip_author(&self) -> Option<&AuthorName> {
		self.hover.current().or(self.selection.author.as_ref())
	}

	/// Advance one animation frame. Returns whether anything visible changed.
	pub fn frame(&mut self, now_ms: f64, surface: Option<&SurfaceTransform>) -> bool {
		let moved = self.session.tick();
		let hover_changed = self.hover.poll(now_ms);
		if hover_changed {
			self.tooltip.reset();
		}
		if let Some(surface) = surface {
			let anchor = self
				.tooltip_author()
				.and_then(|author| self.session.position_of(author));
			if let Some(logical) = anchor {
				let client = self.viewport.logical_to_client(surface, logical);
				let origin = surface.origin();
				let relative = Point::new(client.x - origin.x, client.y - origin.y);
				self.tooltip.place(relative, surface.size(), now_ms);
			}
		}
		moved || hover_changed
	}

	pub fn tooltip_position(&self) -> Option<TooltipPosition> {
		self.tooltip_author().and(self.tooltip.last())
	}

	/// Stop the layout and drop transient state. Safe to call more than once.
	pub fn teardown(&mut self) {
		self.interaction.abort(&mut self.session);
		self.session.teardown();
		self.hover.clear();
		self.tooltip.reset();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn data() -> SiteData {
		let mut data = SiteData {
			owner: "Me".to_string(),
			publications: vec![
				Publication::with_authors("a", ["Me", "Smith, J."]),
				Publication::with_authors("b", ["Me", "Doe, A."]),
			],
			..SiteData::default()
		};
		data.config.physics = false;
		data
	}

	fn started() -> (CoauthorGraphState, SurfaceTransform) {
		let mut state = CoauthorGraphState::new(&data());
		assert!(state.resize(Size::new(640.0, 480.0)));
		(state, SurfaceTransform::identity(640.0, 480.0))
	}

	fn client_of(state: &CoauthorGraphState, surface: &SurfaceTransform, author: &str) -> Point {
		let p = state.session.position_of(author).unwrap();
		state.viewport.logical_to_client(surface, p)
	}

	#[test]
	fn unmeasured_surface_defers_start() {
		let mut state = CoauthorGraphState::new(&data());
		assert!(!state.resize(Size::new(0.0, 0.0)));
		assert!(!state.session.is_started());
		assert!(state.resize(Size::new(640.0, 480.0)));
		assert!(!state.resize(Size::new(640.0, 480.0)));
	}

	#[test]
	fn hit_test_finds_nodes_and_background() {
		let (state, surface) = started();
		let smith = client_of(&state, &surface, "Smith, J.");
		let idx = state.session.graph().index_of("Smith, J.").unwrap();
		assert_eq!(state.pointer_target(smith, Some(&surface)), PointerTarget::Node(idx));
		assert_eq!(
			state.pointer_target(Point::new(2.0, 2.0), Some(&surface)),
			PointerTarget::Background
		);
		assert_eq!(state.pointer_target(smith, None), PointerTarget::Background);
	}

	#[test]
	fn click_on_node_selects_its_publications() {
		let (mut state, surface) = started();
		let doe = client_of(&state, &surface, "Doe, A.");
		let input = PointerInput::primary(1, doe);
		assert!(state.pointer_down(input, false, Some(&surface)));
		assert_eq!(state.mode(), Mode::DraggingNode);
		assert!(matches!(state.pointer_up(input), GestureEnd::Clicked(_)));
		assert_eq!(state.selection.author.as_deref(), Some("Doe, A."));
		assert_eq!(state.selection.publications.len(), 1);
		assert_eq!(state.selection.publications[0].title, "b");

		state.clear_selection();
		assert_eq!(state.selection, Selection::default());
	}

	#[test]
	fn press_on_controls_is_ignored() {
		let (mut state, surface) = started();
		let input = PointerInput::primary(1, Point::new(5.0, 5.0));
		assert!(!state.pointer_down(input, true, Some(&surface)));
		assert_eq!(state.mode(), Mode::Idle);
	}

	#[test]
	fn hover_drives_tooltip() {
		let (mut state, surface) = started();
		let smith = client_of(&state, &surface, "Smith, J.");
		state.pointer_move(PointerInput::primary(1, smith), Some(&surface), 0.0);
		assert_eq!(state.hover.current().map(String::as_str), Some("Smith, J."));

		state.frame(0.0, Some(&surface));
		let tip = state.tooltip_position().unwrap();
		assert_eq!(tip.left, smith.x.round().clamp(90.0, 550.0));

		state.pointer_leave();
		assert_eq!(state.hover.current(), None);
		assert_eq!(state.tooltip_position(), None);
	}

	#[test]
	fn sweeping_between_nodes_reports_pending_mode() {
		let (mut state, surface) = started();
		let smith = client_of(&state, &surface, "Smith, J.");
		let doe = client_of(&state, &surface, "Doe, A.");
		state.pointer_move(PointerInput::primary(1, smith), Some(&surface), 0.0);
		state.pointer_move(PointerInput::primary(1, doe), Some(&surface), 10.0);
		assert_eq!(state.mode(), Mode::HoverPending);
		assert!(state.frame(200.0, Some(&surface)));
		assert_eq!(state.hover.current().map(String::as_str), Some("Doe, A."));
		assert_eq!(state.mode(), Mode::Idle);
	}

	#[test]
	fn data_replacement_keeps_surviving_selection() {
		let (mut state, _) = started();
		state.select("Smith, J.");
		state.set_publications(vec![
			Publication::with_authors("c", ["Me", "Smith, J."]),
			Publication::with_authors("d", ["Smith, J."]),
		]);
		assert_eq!(state.selection.publications.len(), 2);
		state.set_publications(vec![Publication::with_authors("e", ["Me", "Doe, A."])]);
		assert_eq!(state.selection.author, None);
	}

	#[test]
	fn teardown_is_idempotent() {
		let (mut state, surface) = started();
		state.teardown();
		state.teardown();
		assert!(!state.session.is_started());
		assert!(!state.frame(0.0, Some(&surface)));
	}

	#[test]
	fn owner_is_matched_by_exact_name() {
		let data = SiteData {
			owner: "Filipov, V.".to_string(),
			publications: vec![Publication::with_authors(
				"a",
				["Filipov, V.", "Filipova, M."],
			)],
			..SiteData::default()
		};
		let state = CoauthorGraphState::new(&data);
		assert!(state.is_owner("Filipov, V."));
		assert!(!state.is_owner("Filipova, M."));

		let nameless = CoauthorGraphState::new(&SiteData {
			owner: String::new(),
			..data
		});
		assert!(!nameless.is_owner("Filipova, M."));
	}

	#[test]
	fn narrowing_the_surface_recentres_and_keeps_selection() {
		let (mut state, _) = started();
		state.select("Smith, J.");
		assert_eq!(state.session.position_of("Me"), Some(Point::new(320.0, 240.0)));

		assert!(state.resize(Size::new(480.0, 480.0)));
		assert_eq!(state.session.canvas(), Size::new(480.0, 480.0));
		assert_eq!(state.session.position_of("Me"), Some(Point::new(240.0, 240.0)));
		assert_eq!(state.selection.author.as_deref(), Some("Smith, J."));
	}
}
