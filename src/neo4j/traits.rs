//! GraphStore trait definition
//!
//! Defines the abstract interface the analytics engine reads the social graph
//! through. Implemented by `Neo4jClient` and, in tests, by `MockGraphStore`.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Read-only access to the social property graph.
///
/// Every result is returned as raw [`Envelope`]s; the engine decodes them.
/// Implementations own read consistency: a single vertex or edge mutation
/// must never be observed half-written by any of these reads.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Vertex lookup
    // ========================================================================

    /// Look up a person by id, together with its hobby, the hobby's category
    /// and its outgoing connection ids.
    async fn get_person(&self, person_id: i64) -> Result<Option<PersonRecord>>;

    /// List every hobby with its category, ordered by hobby id.
    async fn list_hobbies(&self) -> Result<Vec<HobbyRecord>>;

    // ========================================================================
    // Bounded traversal
    // ========================================================================

    /// Find one undirected CONNECTED chain of exactly `depth` edges between
    /// `origin` and `destination`. Returns the chain's person vertices in
    /// order (`depth + 1` of them), or `None` if no such chain exists.
    async fn find_chain(
        &self,
        origin: i64,
        destination: i64,
        depth: u32,
    ) -> Result<Option<Vec<Envelope>>>;

    /// People two directed hops away from `user` (user → friend → candidate),
    /// excluding `user` and its direct connections, in discovery order.
    async fn friend_of_friend(&self, user: i64) -> Result<Vec<CandidateRecord>>;

    /// People within `depth` undirected hops of `center` (center excluded),
    /// nearest first, at most `limit` rows.
    async fn neighborhood(
        &self,
        center: i64,
        depth: u32,
        limit: usize,
    ) -> Result<Vec<NeighborRecord>>;

    /// Directed CONNECTED edges whose both endpoints are in `person_ids`.
    async fn connections_among(&self, person_ids: &[i64]) -> Result<Vec<EdgeRecord>>;

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// People grouped by their HAS_HOBBY target, one row per hobby that has
    /// at least one member.
    async fn hobby_groups(&self) -> Result<Vec<HobbyGroupRecord>>;

    /// Every person with its outgoing CONNECTED targets, ordered by person id.
    async fn adjacency(&self) -> Result<Vec<AdjacencyRecord>>;

    // ========================================================================
    // Health
    // ========================================================================

    /// Check connectivity to the backing store.
    async fn health_check(&self) -> Result<bool>;
}
