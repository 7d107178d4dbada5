//! Analytics engine façade.
//!
//! `SocialGraphEngine` is the single entry point for engine consumers (HTTP
//! handlers, the CLI). It holds only write-once startup constants; the store
//! and the cancellation token are passed into every call, so one engine can
//! serve any number of concurrent requests against any store.

use super::community::detect_communities;
use super::connectivity::enumerate_connections;
use super::ego::{build_ego_graph, HobbyPalette};
use super::error::GraphResult;
use super::models::{
    Communities, Connectivity, EgoGraph, HobbyCatalog, PersonProfile, Recommendations,
    ShortestPath,
};
use super::path::find_shortest_path;
use super::profile::{hobby_catalog, person_profile};
use super::recommend::recommend;
use crate::neo4j::GraphStore;
use tokio_util::sync::CancellationToken;

/// Stateless social-graph analytics over a [`GraphStore`].
#[derive(Debug, Clone, Default)]
pub struct SocialGraphEngine {
    palette: HobbyPalette,
}

impl SocialGraphEngine {
    pub fn new(palette: HobbyPalette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &HobbyPalette {
        &self.palette
    }

    /// Shortest undirected path of at most `max_depth` edges.
    pub async fn shortest_path(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
        origin: i64,
        destination: i64,
        max_depth: u32,
    ) -> GraphResult<ShortestPath> {
        find_shortest_path(store, cancel, origin, destination, max_depth).await
    }

    /// Friend-of-friend recommendations.
    pub async fn recommendations(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
        user: i64,
        limit: u32,
        min_common: u32,
    ) -> GraphResult<Recommendations> {
        recommend(store, cancel, user, limit, min_common).await
    }

    /// Ego network colored with this engine's palette.
    pub async fn ego_graph(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
        user: i64,
        depth: u32,
        max_nodes: u32,
    ) -> GraphResult<EgoGraph> {
        build_ego_graph(store, cancel, &self.palette, user, depth, max_nodes).await
    }

    /// Hobby communities without density.
    pub async fn communities(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
    ) -> GraphResult<Communities> {
        detect_communities(store, cancel, false).await
    }

    /// Hobby communities with per-community connection density.
    pub async fn communities_with_density(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
    ) -> GraphResult<Communities> {
        detect_communities(store, cancel, true).await
    }

    pub async fn connections(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
    ) -> GraphResult<Connectivity> {
        enumerate_connections(store, cancel).await
    }

    pub async fn person_profile(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
        person_id: i64,
    ) -> GraphResult<PersonProfile> {
        person_profile(store, cancel, person_id).await
    }

    pub async fn hobby_catalog(
        &self,
        store: &dyn GraphStore,
        cancel: &CancellationToken,
    ) -> GraphResult<HobbyCatalog> {
        hobby_catalog(store, cancel).await
    }
}
