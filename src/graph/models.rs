//! Result types for the analytics engine.
//!
//! ## Domain
//! - [`Person`]: a decoded Person vertex
//!
//! ## Operation results
//! - [`ShortestPath`] / [`PathNode`]
//! - [`Recommendations`] / [`Recommendation`]
//! - [`EgoGraph`] / [`EgoNode`] / [`EgoEdge`] / [`EgoStats`]
//! - [`Communities`] / [`Community`]
//! - [`Connectivity`] / [`ConnectivityEntry`] / [`ConnectivityStats`]
//! - [`PersonProfile`] / [`HobbyCatalog`]
//!
//! Every result serializes with camelCase field names.

use super::decode::{DecodeError, Vertex};
use serde::{Deserialize, Serialize};

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================================
// Domain
// ============================================================================

/// A person as read from a Person vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub age: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Person {
    pub fn from_vertex(vertex: &Vertex) -> Result<Self, DecodeError> {
        Ok(Self {
            id: vertex.int("person_id")?,
            name: vertex.text("name")?,
            surname: vertex.text("surname")?,
            age: vertex.int("age")?,
            latitude: vertex.float("latitude")?,
            longitude: vertex.float("longitude")?,
        })
    }

    /// `"<name> <surname>"`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

// ============================================================================
// Shortest path
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNode {
    pub id: i64,
    pub name: String,
}

/// Shortest connection path between two people.
///
/// `length` counts edges. A missing path is `{exists: false, path: [], length: 0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPath {
    pub path: Vec<PathNode>,
    pub length: usize,
    pub exists: bool,
}

impl ShortestPath {
    pub fn not_found() -> Self {
        Self {
            path: Vec::new(),
            length: 0,
            exists: false,
        }
    }

    /// Zero-length path from a person to itself.
    pub fn single_node(node: PathNode) -> Self {
        Self {
            path: vec![node],
            length: 0,
            exists: true,
        }
    }
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: i64,
    pub name: String,
    pub common_count: usize,
    pub common_ids: Vec<i64>,
    /// Common count relative to the best candidate returned, in `[0, 1]`
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub user_id: i64,
    pub recommendations: Vec<Recommendation>,
    pub total: usize,
}

// ============================================================================
// Ego network
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub age: i64,
    pub hobby: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// A node ready for a graph-drawing frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgoNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub color: String,
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgoEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgoStats {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub avg_degree: f64,
}

impl EgoStats {
    /// Undirected density and average degree, rounded for display.
    pub fn compute(nodes: usize, edges: usize) -> Self {
        let n = nodes as f64;
        let e = edges as f64;
        let density = if nodes > 1 {
            e / (n * (n - 1.0) / 2.0)
        } else {
            0.0
        };
        let avg_degree = if nodes > 0 { 2.0 * e / n } else { 0.0 };
        Self {
            nodes,
            edges,
            density: round_to(density, 4),
            avg_degree: round_to(avg_degree, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgoGraph {
    pub nodes: Vec<EgoNode>,
    pub edges: Vec<EgoEdge>,
    pub stats: EgoStats,
}

// ============================================================================
// Communities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    /// Grouping key: the shared hobby's id
    pub id: i64,
    pub hobby: Option<String>,
    pub members: Vec<i64>,
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communities {
    pub communities: Vec<Community>,
    pub total: usize,
    pub algorithm: String,
}

// ============================================================================
// Connectivity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityEntry {
    pub id: i64,
    pub neighbors: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStats {
    pub users_with_connections: usize,
    pub total_connections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connectivity {
    pub items: Vec<ConnectivityEntry>,
    pub stats: ConnectivityStats,
}

impl Connectivity {
    /// Out-neighbors of `id`, empty when it has none.
    pub fn neighbors_of(&self, id: i64) -> &[i64] {
        self.items
            .binary_search_by_key(&id, |entry| entry.id)
            .map(|idx| self.items[idx].neighbors.as_slice())
            .unwrap_or_default()
    }

    /// True when both `a → b` and `b → a` exist.
    pub fn is_bidirectional(&self, a: i64, b: i64) -> bool {
        self.neighbors_of(a).contains(&b) && self.neighbors_of(b).contains(&a)
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HobbyRef {
    pub id: i64,
    pub name: String,
    pub category: Option<CategoryRef>,
}

/// A person with hobby and outgoing connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    #[serde(flatten)]
    pub person: Person,
    pub hobby: Option<HobbyRef>,
    pub connections: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HobbyCatalog {
    pub items: Vec<HobbyRef>,
    pub total: usize,
}
