//! Page-provided configuration and data.
//!
//! The page embeds a JSON document (generated offline from BibTeX) in a
//! `<script id="coauthor-data" type="application/json">` element. Every field is
//! optional; missing values fall back to the defaults below.

use serde::Deserialize;
use thiserror::Error;

use super::layout::LayoutParams;
use super::types::{AuthorName, Publication, YOUR_NAME};

/// Errors raised while reading embedded page data.
#[derive(Debug, Error)]
pub enum DataError {
	#[error("no element with id `{0}`")]
	MissingElement(&'static str),
	#[error("failed to parse graph data: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Zoom limits and wheel step factors.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	/// Factor applied per wheel notch towards the user (zoom in).
	pub step_in: f64,
	/// Factor applied per wheel notch away from the user (zoom out).
	pub step_out: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.25,
			max_scale: 3.0,
			step_in: 1.08,
			step_out: 0.92,
		}
	}
}

impl ZoomConfig {
	pub fn clamp(&self, scale: f64) -> f64 {
		scale.clamp(self.min_scale, self.max_scale)
	}

	/// Zoom factor for a wheel event: scrolling up zooms in.
	pub fn wheel_factor(&self, delta_y: f64) -> f64 {
		if delta_y < 0.0 {
			self.step_in
		} else {
			self.step_out
		}
	}
}

/// Behavioral configuration for the co-author graph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Use the physics simulation. When off, the static radial layout is used.
	pub physics: bool,
	pub layout: LayoutParams,
	pub zoom: ZoomConfig,
	/// Delay before the hover target switches between two nodes.
	pub hover_delay_ms: f64,
	/// Minimum interval between tooltip repositions.
	pub tooltip_interval_ms: f64,
	/// Pointer travel (root pixels) above which a node press counts as a drag.
	pub click_slop_px: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			physics: true,
			layout: LayoutParams::default(),
			zoom: ZoomConfig::default(),
			hover_delay_ms: 80.0,
			tooltip_interval_ms: 36.0,
			click_slop_px: 3.0,
		}
	}
}

/// Everything the page hands to the app.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteData {
	/// The distinguished author, rendered with emphasis.
	pub owner: AuthorName,
	pub publications: Vec<Publication>,
	pub config: GraphConfig,
}

impl Default for SiteData {
	fn default() -> Self {
		Self {
			owner: YOUR_NAME.to_string(),
			publications: Vec::new(),
			config: GraphConfig::default(),
		}
	}
}

impl SiteData {
	pub fn from_json(text: &str) -> Result<Self, DataError> {
		Ok(serde_json::from_str(text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let data = SiteData::from_json("{}").unwrap();
		assert_eq!(data, SiteData::default());
		assert_eq!(data.owner, YOUR_NAME);
		assert!(data.config.physics);
		assert_eq!(data.config.hover_delay_ms, 80.0);
	}

	#[test]
	fn partial_overrides_merge_with_defaults() {
		let data = SiteData::from_json(
			r#"{
				"owner": "Doe, A.",
				"config": { "physics": false, "zoom": { "max_scale": 5.0 }, "layout": { "charge_strength": -500 } },
				"publications": [{ "title": "T", "authors": ["Doe, A.", "Roe, B."] }]
			}"#,
		)
		.unwrap();
		assert_eq!(data.owner, "Doe, A.");
		assert!(!data.config.physics);
		assert_eq!(data.config.zoom.max_scale, 5.0);
		assert_eq!(data.config.zoom.min_scale, 0.25);
		assert_eq!(data.config.layout.charge_strength, -500.0);
		assert_eq!(data.config.layout.link_base_distance, 160.0);
		assert_eq!(data.publications.len(), 1);
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		assert!(matches!(
			SiteData::from_json("{ not json"),
			Err(DataError::Parse(_))
		));
	}

	#[test]
	fn wheel_direction() {
		let zoom = ZoomConfig::default();
		assert_eq!(zoom.wheel_factor(-120.0), 1.08);
		assert_eq!(zoom.wheel_factor(120.0), 0.92);
		assert_eq!(zoom.clamp(10.0), 3.0);
	}
}
