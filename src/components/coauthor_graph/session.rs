//! Layout lifecycle for the current graph generation.
//!
//! A session starts once the drawing surface has a usable size. Every rebuild
//! (new data, resize) stops the previous engine and bumps the generation, so work
//! scheduled against an old generation can detect that it is stale.

use log::{debug, info};

use super::graph::{CoauthorGraph, build_coauthor_graph};
use super::layout::{LayoutEngine, LayoutParam, LayoutParams, LayoutProvider, start_layout};
use super::types::{AuthorName, Publication};
use super::viewport::{Point, Size};

/// Identifies the generation a piece of scheduled work belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationToken(u64);

pub struct LayoutSession {
	graph: CoauthorGraph,
	owner: AuthorName,
	provider: Box<dyn LayoutProvider>,
	params: LayoutParams,
	canvas: Size,
	engine: Option<Box<dyn LayoutEngine>>,
	generation: u64,
}

impl LayoutSession {
	pub fn new(
		publications: &[Publication],
		owner: AuthorName,
		provider: Box<dyn LayoutProvider>,
		params: LayoutParams,
	) -> Self {
		Self {
			graph: build_coauthor_graph(publications),
			owner,
			provider,
			params,
			canvas: Size::default(),
			engine: None,
			generation: 0,
		}
	}

	pub fn graph(&self) -> &CoauthorGraph {
		&self.graph
	}

	pub fn owner(&self) -> &str {
		&self.owner
	}

	pub fn params(&self) -> &LayoutParams {
		&self.params
	}

	pub fn canvas(&self) -> Size {
		self.canvas
	}

	pub fn is_started(&self) -> bool {
		self.engine.is_some()
	}

	pub fn engine_name(&self) -> Option<&'static str> {
		self.engine.as_ref().map(|e| e.name())
	}

	pub fn token(&self) -> GenerationToken {
		GenerationToken(self.generation)
	}

	/// Whether work tagged with `token` still applies to a running layout.
	pub fn is_current(&self, token: GenerationToken) -> bool {
		self.engine.is_some() && token.0 == self.generation
	}

	/// Start a fresh layout on a surface of `canvas` size.
	///
	/// Does nothing (and returns `None`) until the surface has been measured.
	pub fn rebuild(&mut self, canvas: Size) -> Option<GenerationToken> {
		if !canvas.is_measured() {
			debug!(
				"coauthor-graph: surface {}x{} not measured yet",
				canvas.width, canvas.height
			);
			return None;
		}
		self.teardown();
		self.generation += 1;
		self.canvas = canvas;
		self.engine = Some(start_layout(
			self.provider.as_ref(),
			&self.graph,
			canvas,
			&self.params,
			&self.owner,
		));
		Some(self.token())
	}

	/// Replace the data set. The graph is rebuilt from scratch; a running layout restarts.
	pub fn replace_publications(&mut self, publications: &[Publication]) {
		self.graph = build_coauthor_graph(publications);
		info!(
			"coauthor-graph: {} authors, {} links",
			self.graph.nodes.len(),
			self.graph.links.len()
		);
		if self.is_started() {
			self.rebuild(self.canvas);
		}
	}

	/// Stop the engine. Outstanding tokens become stale.
	pub fn teardown(&mut self) {
		if let Some(mut engine) = self.engine.take() {
			engine.stop();
			self.generation += 1;
		}
	}

	pub fn tick(&mut self) -> bool {
		self.engine.as_mut().is_some_and(|e| e.tick())
	}

	pub fn is_live(&self) -> bool {
		self.engine.as_ref().is_some_and(|e| e.is_live())
	}

	pub fn positions(&self) -> &[Point] {
		match &self.engine {
			Some(engine) => engine.positions(),
			None => &[],
		}
	}

	pub fn position(&self, idx: usize) -> Option<Point> {
		self.positions().get(idx).copied()
	}

	pub fn position_of(&self, author: &str) -> Option<Point> {
		self.graph.index_of(author).and_then(|idx| self.position(idx))
	}

	pub fn pin(&mut self, idx: usize, at: Point) {
		if let Some(engine) = self.engine.as_mut() {
			engine.pin(idx, at);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(engine) = self.engine.as_mut() {
			engine.unpin(idx);
		}
	}

	pub fn is_pinned(&self, idx: usize) -> bool {
		self.engine.as_ref().is_some_and(|e| e.is_pinned(idx))
	}

	pub fn heat(&mut self, alpha_target: f64) {
		if let Some(engine) = self.engine.as_mut() {
			engine.heat(alpha_target);
		}
	}

	pub fn cool(&mut self) {
		if let Some(engine) = self.engine.as_mut() {
			engine.cool();
		}
	}

	/// Replace all force parameters (e.g. a preset). The layout re-settles in place.
	pub fn set_params(&mut self, params: LayoutParams) {
		if params.validate().is_err() {
			return;
		}
		self.params = params;
		if let Some(engine) = self.engine.as_mut() {
			engine.set_params(&self.params);
		}
	}

	pub fn set_param(&mut self, param: LayoutParam, value: f64) {
		let mut params = self.params;
		params.set(param, value);
		self.set_params(params);
	}
}
