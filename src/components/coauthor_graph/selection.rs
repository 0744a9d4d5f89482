//! Selected author and the publications listed in the side panel.

use super::types::{AuthorName, Publication};

/// Side panel state. Recomputed on every selection change; nothing is cached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	pub author: Option<AuthorName>,
	pub publications: Vec<Publication>,
}

impl Selection {
	/// Select `author` and list every publication that names them.
	pub fn select(&mut self, author: &str, all: &[Publication]) {
		self.author = Some(author.to_string());
		self.publications = all
			.iter()
			.filter(|p| p.has_author(author))
			.cloned()
			.collect();
	}

	pub fn clear(&mut self) {
		self.author = None;
		self.publications.clear();
	}

	pub fn is_selected(&self, author: &str) -> bool {
		self.author.as_deref() == Some(author)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn publications() -> Vec<Publication> {
		vec![
			Publication::with_authors("one", ["Filipov, V.", "Smith, J."]),
			Publication::with_authors("two", ["Doe, A."]),
			Publication::with_authors("three", ["Smith, J.", "Doe, A."]),
		]
	}

	#[test]
	fn select_filters_by_membership() {
		let all = publications();
		let mut selection = Selection::default();
		selection.select("Smith, J.", &all);
		let titles: Vec<_> = selection.publications.iter().map(|p| p.title.as_str()).collect();
		assert_eq!(titles, ["one", "three"]);
		assert!(selection.is_selected("Smith, J."));
	}

	#[test]
	fn unknown_author_selects_nothing() {
		let mut selection = Selection::default();
		selection.select("Nobody", &publications());
		assert!(selection.publications.is_empty());
		assert_eq!(selection.author.as_deref(), Some("Nobody"));
	}

	#[test]
	fn clear_resets_to_default() {
		let mut selection = Selection::default();
		selection.select("Doe, A.", &publications());
		selection.clear();
		assert_eq!(selection, Selection::default());
	}
}
