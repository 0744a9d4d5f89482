//! coauthor-graph: interactive co-author network for an academic portfolio.
//!
//! This crate provides a WASM-based component that turns a publication list into a
//! co-authorship graph with physics-based layout, pan/zoom, node dragging and a
//! publication side panel.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

pub mod components;

pub use components::coauthor_graph::{
	CoauthorGraph, CoauthorGraphCanvas, DataError, GraphConfig, GraphLink, GraphNode, Publication,
	SiteData, build_coauthor_graph,
};

/// Id of the script element carrying the page data.
pub const DATA_ELEMENT_ID: &str = "coauthor-data";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("coauthor-graph: logging initialized");
}

/// Load site data from `<script id="coauthor-data" type="application/json">`.
pub fn load_site_data() -> Result<SiteData, DataError> {
	let script = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(DATA_ELEMENT_ID))
		.and_then(|e| e.dyn_into::<HtmlScriptElement>().ok())
		.ok_or(DataError::MissingElement(DATA_ELEMENT_ID))?;
	let json_text = script.text().unwrap_or_default();
	let data = SiteData::from_json(&json_text)?;
	info!(
		"coauthor-graph: loaded {} publications for {}",
		data.publications.len(),
		data.owner
	);
	Ok(data)
}

/// Main application component.
/// Loads publications from the DOM and renders the co-author network page.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let site_data = load_site_data().unwrap_or_else(|e| {
		warn!("coauthor-graph: {e}; rendering an empty graph");
		SiteData::default()
	});
	let data_signal = Signal::derive(move || site_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Co-author Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<main class="coauthors-page">
			<h1>"Co-author Network"</h1>
			<CoauthorGraphCanvas data=data_signal />
			<p class="caption">"Nodes are co-authors; edges show co-authorship counts."</p>
		</main>
	}
}
