//! Publication records consumed by the co-author graph.

use serde::{Deserialize, Deserializer};

/// Author identity: the formatted name exactly as it appears in publication records
/// (e.g. `"Filipov, V."`). Name equality is the join key.
pub type AuthorName = String;

/// Default distinguished author (the site owner).
pub const YOUR_NAME: &str = "Filipov, V.";

/// A publication as emitted by the offline BibTeX conversion step.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Publication {
	/// Citation key.
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub title: String,
	/// Ordered author list. Missing or `null` is treated as empty.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub authors: Vec<AuthorName>,
	#[serde(default)]
	pub venue: Option<String>,
	#[serde(default)]
	pub year: Option<u32>,
	/// Conference, Journal, Workshop, ...
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub doi: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AuthorName>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Vec<AuthorName>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Publication {
	/// Convenience constructor used by tests and demos.
	pub fn with_authors<I, S>(title: &str, authors: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<AuthorName>,
	{
		Self {
			title: title.to_string(),
			authors: authors.into_iter().map(Into::into).collect(),
			..Self::default()
		}
	}

	pub fn has_author(&self, author: &str) -> bool {
		self.authors.iter().any(|a| a == author)
	}

	/// Outbound link for the publication panel: DOI resolver first, then the raw URL.
	pub fn link(&self) -> Option<String> {
		match (&self.doi, &self.url) {
			(Some(doi), _) if !doi.is_empty() => Some(format!("https://doi.org/{doi}")),
			(_, Some(url)) if !url.is_empty() => Some(url.clone()),
			_ => None,
		}
	}
}

/// Short display label: the family name before the first comma.
pub fn surname(author: &str) -> &str {
	author.split(',').next().unwrap_or(author).trim()
}

/// Whether `author` refers to the site owner, either exactly or by family name.
///
/// Only used to emphasize the owner in publication author lists; graph identity is
/// exact name equality.
pub fn is_owner_alias(author: &str, owner: &str) -> bool {
	let family = surname(owner);
	author == owner || (!family.is_empty() && author.contains(family))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_and_null_authors_are_empty() {
		let missing: Publication = serde_json::from_str(r#"{"title": "A"}"#).unwrap();
		let null: Publication = serde_json::from_str(r#"{"title": "B", "authors": null}"#).unwrap();
		assert!(missing.authors.is_empty());
		assert!(null.authors.is_empty());
	}

	#[test]
	fn parses_generated_record() {
		let json = r#"{
			"id": "filipov2023",
			"title": "Graphs",
			"authors": ["Filipov, V.", "Smith, J."],
			"venue": "EuroVis",
			"year": 2023,
			"type": "Conference",
			"doi": "10.1111/cgf.14000",
			"bibtex": "@inproceedings{...}"
		}"#;
		let publication: Publication = serde_json::from_str(json).unwrap();
		assert_eq!(publication.kind.as_deref(), Some("Conference"));
		assert_eq!(publication.year, Some(2023));
		assert!(publication.has_author("Smith, J."));
		assert_eq!(
			publication.link().as_deref(),
			Some("https://doi.org/10.1111/cgf.14000")
		);
	}

	#[test]
	fn link_falls_back_to_url() {
		let publication = Publication {
			url: Some("https://example.org/paper.pdf".into()),
			..Publication::default()
		};
		assert_eq!(
			publication.link().as_deref(),
			Some("https://example.org/paper.pdf")
		);
		assert_eq!(Publication::default().link(), None);
	}

	#[test]
	fn surname_and_owner_alias() {
		assert_eq!(surname("Filipov, V."), "Filipov");
		assert_eq!(surname("Plato"), "Plato");
		assert!(is_owner_alias("Filipov, Velitchko", YOUR_NAME));
		assert!(!is_owner_alias("Smith, J.", YOUR_NAME));
		assert!(!is_owner_alias("Smith, J.", ""));
	}
}
