//! UI components.

pub mod coauthor_graph;
