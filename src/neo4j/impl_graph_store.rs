//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn get_person(&self, person_id: i64) -> anyhow::Result<Option<PersonRecord>> {
        self.get_person(person_id).await
    }

    async fn list_hobbies(&self) -> anyhow::Result<Vec<HobbyRecord>> {
        self.list_hobbies().await
    }

    async fn find_chain(
        &self,
        origin: i64,
        destination: i64,
        depth: u32,
    ) -> anyhow::Result<Option<Vec<Envelope>>> {
        self.find_chain(origin, destination, depth).await
    }

    async fn friend_of_friend(&self, user: i64) -> anyhow::Result<Vec<CandidateRecord>> {
        self.friend_of_friend(user).await
    }

    async fn neighborhood(
        &self,
        center: i64,
        depth: u32,
        limit: usize,
    ) -> anyhow::Result<Vec<NeighborRecord>> {
        self.neighborhood(center, depth, limit).await
    }

    async fn connections_among(&self, person_ids: &[i64]) -> anyhow::Result<Vec<EdgeRecord>> {
        self.connections_among(person_ids).await
    }

    async fn hobby_groups(&self) -> anyhow::Result<Vec<HobbyGroupRecord>> {
        self.hobby_groups().await
    }

    async fn adjacency(&self) -> anyhow::Result<Vec<AdjacencyRecord>> {
        self.adjacency().await
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        match self.ping().await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
