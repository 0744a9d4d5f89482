//! Co-authorship graph construction.
//!
//! Nodes are distinct authors, links are unordered co-author pairs weighted by the
//! number of shared publications. The graph is rebuilt from scratch whenever the
//! publication list changes; there is no incremental update.

use std::collections::{HashMap, HashSet};

use super::types::{AuthorName, Publication};

/// An author in the co-authorship graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: AuthorName,
	pub name: AuthorName,
	/// Sum of the weights of all incident links (not the neighbor count).
	pub degree: u32,
}

/// An undirected co-authorship edge. `source < target` lexicographically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphLink {
	pub source: AuthorName,
	pub target: AuthorName,
	/// Number of publications shared by the pair. Always >= 1.
	pub weight: u32,
}

/// Immutable co-authorship graph derived from a publication list.
#[derive(Clone, Debug, Default)]
pub struct CoauthorGraph {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	index: HashMap<AuthorName, usize>,
	/// `(source index, target index)` per link, parallel to `links`.
	endpoints: Vec<(usize, usize)>,
}

impl CoauthorGraph {
	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.index.get(name).copied()
	}

	pub fn node(&self, idx: usize) -> Option<&GraphNode> {
		self.nodes.get(idx)
	}

	/// Link endpoints as node indices, parallel to `links`.
	pub fn endpoints(&self) -> &[(usize, usize)] {
		&self.endpoints
	}

	/// Distinct neighbors of a node.
	pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.endpoints.iter().filter_map(move |&(s, t)| {
			if s == idx {
				Some(t)
			} else if t == idx {
				Some(s)
			} else {
				None
			}
		})
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Canonical key for an unordered author pair.
fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
	if a < b { (a, b) } else { (b, a) }
}

/// Build the co-authorship graph from an ordered publication list.
///
/// Every author listed on any publication gets exactly one node, including sole
/// authors (degree 0). Authors repeated within one record count once for that record.
/// Node order follows first appearance, link order follows the first shared publication.
pub fn build_coauthor_graph(publications: &[Publication]) -> CoauthorGraph {
	let mut index: HashMap<AuthorName, usize> = HashMap::new();
	let mut nodes: Vec<GraphNode> = Vec::new();
	let mut pair_slots: HashMap<(AuthorName, AuthorName), usize> = HashMap::new();
	let mut links: Vec<GraphLink> = Vec::new();

	for publication in publications {
		let mut seen = HashSet::new();
		let authors: Vec<&AuthorName> = publication
			.authors
			.iter()
			.filter(|a| seen.insert(a.as_str()))
			.collect();

		for author in &authors {
			if !index.contains_key(author.as_str()) {
				index.insert((*author).clone(), nodes.len());
				nodes.push(GraphNode {
					id: (*author).clone(),
					name: (*author).clone(),
					degree: 0,
				});
			}
		}

		for (i, a) in authors.iter().enumerate() {
			for b in &authors[i + 1..] {
				let (lo, hi) = pair_key(a, b);
				let key = (lo.to_string(), hi.to_string());
				match pair_slots.get(&key) {
					Some(&slot) => links[slot].weight += 1,
					None => {
						pair_slots.insert(key.clone(), links.len());
						links.push(GraphLink {
							source: key.0,
							target: key.1,
							weight: 1,
						});
					}
				}
			}
		}
	}

	let mut endpoints = Vec::with_capacity(links.len());
	for link in &links {
		let (s, t) = (index[&link.source], index[&link.target]);
		nodes[s].degree += link.weight;
		nodes[t].degree += link.weight;
		endpoints.push((s, t));
	}

	CoauthorGraph {
		nodes,
		links,
		index,
		endpoints,
	}
}
