//! Ego-network extraction for visualization.
//!
//! Collects a person and everyone within `depth` undirected hops, attaches
//! drawing attributes (position, size, hobby color) and every CONNECTED edge
//! whose endpoints both made it into the node set.

use super::decode::{decode_optional_vertex, decode_scalar, decode_value, decode_vertex, DecodeError, Value};
use super::error::{ensure_range, store_call, GraphResult};
use super::models::{EgoEdge, EgoGraph, EgoNode, EgoStats, NodeMetadata, Person};
use super::profile::load_person;
use crate::neo4j::{Envelope, GraphStore};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 2;
pub const DEFAULT_MAX_NODES: u32 = 500;
pub const MIN_MAX_NODES: u32 = 10;
pub const MAX_MAX_NODES: u32 = 2000;

pub const DEFAULT_NODE_COLOR: &str = "#95a5a6";
pub const EDGE_COLOR: &str = "#cccccc";
pub const NODE_SIZE: u32 = 10;
pub const EDGE_SIZE: u32 = 1;
/// Spread factor applied to coordinates for drawing.
pub const COORDINATE_SCALE: f64 = 100.0;

const DEFAULT_PALETTE: [(&str, &str); 10] = [
    ("football", "#ff6b6b"),
    ("basketball", "#ee5a6f"),
    ("tennis", "#f06595"),
    ("painting", "#4ecdc4"),
    ("sculpture", "#45b7d1"),
    ("photography", "#96ceb4"),
    ("guitar", "#feca57"),
    ("piano", "#ff9ff3"),
    ("reading", "#54a0ff"),
    ("cooking", "#48dbfb"),
];

// ============================================================================
// Palette
// ============================================================================

/// Hobby name → node color, matched case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct HobbyPalette {
    colors: HashMap<String, String>,
}

impl Default for HobbyPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .map(|(hobby, color)| (hobby.to_string(), color.to_string()))
                .collect(),
        }
    }
}

impl HobbyPalette {
    /// Default palette with `overrides` layered on top.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut palette = Self::default();
        for (hobby, color) in overrides {
            palette
                .colors
                .insert(hobby.trim().to_lowercase(), color.clone());
        }
        palette
    }

    /// Color for a hobby, or the neutral default.
    pub fn color_for(&self, hobby: Option<&str>) -> &str {
        hobby
            .and_then(|h| self.colors.get(&h.trim().to_lowercase()))
            .map(String::as_str)
            .unwrap_or(DEFAULT_NODE_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Build the ego network of `user`.
///
/// At most `max_nodes` nodes are returned, the center included. When the
/// neighborhood is larger, nearer hop layers are kept first.
pub async fn build_ego_graph(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    palette: &HobbyPalette,
    user: i64,
    depth: u32,
    max_nodes: u32,
) -> GraphResult<EgoGraph> {
    ensure_range("depth", i64::from(depth), 1, i64::from(MAX_DEPTH))?;
    ensure_range(
        "max_nodes",
        i64::from(max_nodes),
        i64::from(MIN_MAX_NODES),
        i64::from(MAX_MAX_NODES),
    )?;

    let (center, record) = load_person(store, cancel, user).await?;
    let center_hobby = match decode_optional_vertex(&record.hobby)? {
        Some(hobby) => hobby.opt_text("name")?,
        None => None,
    };

    let neighbor_cap = max_nodes as usize - 1;
    let rows = store_call(cancel, store.neighborhood(user, depth, neighbor_cap)).await?;

    let mut neighbors = Vec::with_capacity(rows.len());
    for row in &rows {
        let person = Person::from_vertex(&decode_vertex(&row.person)?)?;
        if person.id == user {
            continue;
        }
        let hobby = hobby_name(&row.hobby)?;
        neighbors.push((row.hops, person, hobby));
    }
    neighbors.sort_by_key(|(hops, _, _)| *hops);

    let mut seen = HashSet::from([user]);
    neighbors.retain(|(_, person, _)| seen.insert(person.id));
    neighbors.truncate(neighbor_cap);

    let mut ids = Vec::with_capacity(neighbors.len() + 1);
    ids.push(user);
    ids.extend(neighbors.iter().map(|(_, person, _)| person.id));
    let members: HashSet<i64> = ids.iter().copied().collect();

    let mut nodes = Vec::with_capacity(ids.len());
    nodes.push(render_node(palette, &center, center_hobby));
    for (_, person, hobby) in neighbors {
        nodes.push(render_node(palette, &person, hobby));
    }

    let edge_rows = store_call(cancel, store.connections_among(&ids)).await?;

    let mut pairs = HashSet::new();
    let mut ordered = Vec::with_capacity(edge_rows.len());
    for row in &edge_rows {
        let source = person_id(&row.source)?;
        let target = person_id(&row.target)?;
        if !members.contains(&source) || !members.contains(&target) {
            continue;
        }
        if pairs.insert((source, target)) {
            ordered.push((source, target));
        }
    }

    let edges: Vec<EgoEdge> = ordered
        .into_iter()
        .enumerate()
        .map(|(i, (source, target))| EgoEdge {
            id: format!("e{}", i),
            source: source.to_string(),
            target: target.to_string(),
            size: EDGE_SIZE,
            color: EDGE_COLOR.to_string(),
        })
        .collect();

    let stats = EgoStats::compute(nodes.len(), edges.len());
    tracing::debug!(
        "Ego graph for {} (depth {}): {} nodes, {} edges",
        user,
        depth,
        stats.nodes,
        stats.edges
    );

    Ok(EgoGraph {
        nodes,
        edges,
        stats,
    })
}

fn render_node(palette: &HobbyPalette, person: &Person, hobby: Option<String>) -> EgoNode {
    EgoNode {
        id: person.id.to_string(),
        label: person.display_name(),
        x: person.latitude * COORDINATE_SCALE,
        y: person.longitude * COORDINATE_SCALE,
        size: NODE_SIZE,
        color: palette.color_for(hobby.as_deref()).to_string(),
        metadata: NodeMetadata {
            age: person.age,
            hobby,
            latitude: person.latitude,
            longitude: person.longitude,
        },
    }
}

/// Hobby column: a name, a hobby vertex or nothing.
fn hobby_name(envelope: &Envelope) -> Result<Option<String>, DecodeError> {
    match decode_value(envelope)? {
        Value::Text(name) => Ok(Some(name)),
        Value::Vertex(vertex) => vertex.opt_text("name"),
        Value::Null => Ok(None),
        other @ (Value::Integer(_) | Value::Float(_) | Value::List(_)) => Err(DecodeError::new(
            format!("expected a hobby name, got {}", other.kind()),
            &other.to_string(),
        )),
    }
}

/// Edge endpoint column: an integer person id.
fn person_id(envelope: &Envelope) -> Result<i64, DecodeError> {
    match decode_scalar(envelope)? {
        Value::Integer(id) => Ok(id),
        Value::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| DecodeError::new("person id is not an integer", &text)),
        other => Err(DecodeError::new(
            format!("expected a person id, got {}", other.kind()),
            &other.to_string(),
        )),
    }
}
