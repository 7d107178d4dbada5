//! Store-contract types exchanged between the graph store and the engine.
//!
//! Every value a store hands back is an [`Envelope`]: the store does not know
//! (or care) how the engine types its results. Decoding happens exclusively in
//! [`crate::graph::decode`].

use serde_json::Value as JsonValue;

// ============================================================================
// Labels and property keys
// ============================================================================

/// Vertex label for people.
pub const PERSON_LABEL: &str = "Person";
/// Vertex label for hobbies.
pub const HOBBY_LABEL: &str = "Hobby";
/// Vertex label for hobby categories.
pub const CATEGORY_LABEL: &str = "HobbyCategory";

/// Directed Person → Person edge.
pub const CONNECTED_REL: &str = "CONNECTED";
/// Directed Person → Hobby edge.
pub const HAS_HOBBY_REL: &str = "HAS_HOBBY";
/// Directed Hobby → HobbyCategory edge.
pub const BELONGS_TO_REL: &str = "BELONGS_TO";

/// Label-specific id property for `label`, if the label carries one.
pub fn id_property_for(label: &str) -> Option<&'static str> {
    match label {
        PERSON_LABEL => Some("person_id"),
        HOBBY_LABEL => Some("hobby_id"),
        CATEGORY_LABEL => Some("category_id"),
        _ => None,
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A generic, self-describing value as emitted by a graph store.
///
/// - `Bytes`: raw wire bytes, UTF-8 text once decoded
/// - `Text`: textual form, optionally carrying a trailing `::tag`
///   (e.g. `{"id": 1, ...}::vertex`, `[1, 2]::_agtype`)
/// - `Native`: an already-structured value
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Bytes(Vec<u8>),
    Text(String),
    Native(JsonValue),
}

impl Envelope {
    /// The null envelope.
    pub fn null() -> Self {
        Envelope::Native(JsonValue::Null)
    }

    /// True for a native null (text `"null"` is only known after decoding).
    pub fn is_null(&self) -> bool {
        matches!(self, Envelope::Native(JsonValue::Null))
    }
}

impl From<JsonValue> for Envelope {
    fn from(value: JsonValue) -> Self {
        Envelope::Native(value)
    }
}

impl From<&str> for Envelope {
    fn from(value: &str) -> Self {
        Envelope::Text(value.to_string())
    }
}

impl From<String> for Envelope {
    fn from(value: String) -> Self {
        Envelope::Text(value)
    }
}

impl From<Vec<u8>> for Envelope {
    fn from(value: Vec<u8>) -> Self {
        Envelope::Bytes(value)
    }
}

// ============================================================================
// Row records
// ============================================================================

/// A person looked up by id, with its optional hobby and category and its
/// outgoing connection ids.
#[derive(Debug, Clone)]
pub struct PersonRecord {
    /// Person vertex
    pub person: Envelope,
    /// Hobby vertex or null
    pub hobby: Envelope,
    /// HobbyCategory vertex or null
    pub category: Envelope,
    /// Array of out-neighbor person ids
    pub connections: Envelope,
}

/// A friend-of-friend candidate with the collected ids of the user's friends
/// that lead to it.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    /// Candidate person vertex
    pub candidate: Envelope,
    /// Array of common friend ids
    pub common_friends: Envelope,
}

/// A person reachable from an ego center, with its minimum hop distance.
#[derive(Debug, Clone)]
pub struct NeighborRecord {
    /// Person vertex
    pub person: Envelope,
    /// Hobby name scalar or null
    pub hobby: Envelope,
    /// Minimum undirected hop count from the center (>= 1)
    pub hops: u32,
}

/// A directed Connection edge.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    /// Source person id scalar
    pub source: Envelope,
    /// Target person id scalar
    pub target: Envelope,
}

/// All people sharing one hobby.
#[derive(Debug, Clone)]
pub struct HobbyGroupRecord {
    /// Hobby vertex
    pub hobby: Envelope,
    /// Array of member person ids
    pub members: Envelope,
}

/// One person and its outgoing Connection targets.
#[derive(Debug, Clone)]
pub struct AdjacencyRecord {
    /// Person id scalar
    pub person_id: Envelope,
    /// Array of out-neighbor person ids (may be empty)
    pub neighbors: Envelope,
}

/// A hobby with the category it belongs to.
#[derive(Debug, Clone)]
pub struct HobbyRecord {
    /// Hobby vertex
    pub hobby: Envelope,
    /// HobbyCategory vertex or null
    pub category: Envelope,
}
