//! Co-author network visualization.
//!
//! Builds an undirected weighted graph from publication authorship and renders it on
//! an HTML canvas with:
//! - Force-directed layout via `force_graph`, falling back to a static radial layout
//! - Cursor-anchored wheel zoom, background panning and node dragging
//! - Debounced hover tooltips and a publication side panel for the selected author
//! - Live-tunable layout forces with presets
//!
//! Everything except [`component`] and [`render`] is plain Rust and runs without a browser.
//!
//! # Example
//!
//! ```ignore
//! use coauthor_graph::{CoauthorGraphCanvas, SiteData};
//!
//! let data = SiteData::from_json(r#"{ "publications": [
//!     { "title": "On Graphs", "authors": ["Filipov, V.", "Smith, J."] }
//! ] }"#)?;
//!
//! view! { <CoauthorGraphCanvas data=Signal::derive(move || data.clone()) /> }
//! ```

mod component;
pub mod config;
pub mod graph;
pub mod hover;
pub mod interaction;
pub mod layout;
mod render;
pub mod scale;
pub mod selection;
pub mod session;
pub mod state;
pub mod theme;
pub mod types;
pub mod viewport;

pub use component::CoauthorGraphCanvas;
pub use config::{DataError, GraphConfig, SiteData, ZoomConfig};
pub use graph::{CoauthorGraph, GraphLink, GraphNode, build_coauthor_graph};
pub use layout::{LayoutEngine, LayoutError, LayoutParam, LayoutParams, LayoutProvider};
pub use state::{CoauthorGraphState, Mode};
pub use theme::Theme;
pub use types::{AuthorName, Publication, YOUR_NAME};
pub use viewport::{Point, Size, SurfaceTransform, Viewport};
