//! In-memory mock implementation of GraphStore for testing.
//!
//! Stores people, hobbies and connections in `tokio::sync::RwLock` collections
//! and answers every read the way a graph-extension backend would: vertices
//! come back as tagged text (`{...}::vertex`), arrays as JSON text, scalars in
//! a mix of native, text and byte envelopes.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Offset added to domain ids to form store-internal vertex ids.
const VERTEX_ID_BASE: i64 = 844_424_930_131_968;

#[derive(Debug, Clone)]
pub struct MockPerson {
    pub name: String,
    pub surname: String,
    pub age: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct MockHobby {
    pub name: String,
    pub category_id: Option<i64>,
}

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub persons: RwLock<BTreeMap<i64, MockPerson>>,
    pub hobbies: RwLock<BTreeMap<i64, MockHobby>>,
    pub categories: RwLock<BTreeMap<i64, String>>,
    /// Directed CONNECTED edges in insertion order
    pub connections: RwLock<Vec<(i64, i64)>>,
    pub person_hobby: RwLock<HashMap<i64, i64>>,

    // Fault injection
    /// Raw text returned instead of the person vertex
    pub corrupt_persons: RwLock<HashMap<i64, String>>,
    /// When set, every read fails with this message
    pub failure: RwLock<Option<String>>,
    /// Artificial latency for `find_chain`
    pub probe_delay: RwLock<Option<Duration>>,

    /// Number of `find_chain` calls served
    pub chain_probes: AtomicUsize,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            persons: RwLock::new(BTreeMap::new()),
            hobbies: RwLock::new(BTreeMap::new()),
            categories: RwLock::new(BTreeMap::new()),
            connections: RwLock::new(Vec::new()),
            person_hobby: RwLock::new(HashMap::new()),
            corrupt_persons: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
            probe_delay: RwLock::new(None),
            chain_probes: AtomicUsize::new(0),
        }
    }

    /// Build a store from directed edges, creating every endpoint as a person
    /// named `P<id>`.
    pub fn from_edges(edges: &[(i64, i64)]) -> Self {
        let mut store = Self::new();
        for &(a, b) in edges {
            store = store.with_person(a).with_person(b).with_connection(a, b);
        }
        store
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a person with default attributes (no-op if it already exists).
    pub fn with_person(mut self, id: i64) -> Self {
        self.persons.get_mut().entry(id).or_insert_with(|| MockPerson {
            name: format!("P{}", id),
            surname: "Test".to_string(),
            age: 30,
            latitude: 40.0 + id as f64 / 100.0,
            longitude: -3.0 - id as f64 / 100.0,
        });
        self
    }

    /// Seed (or replace) a person with explicit attributes.
    pub fn with_person_details(mut self, id: i64, person: MockPerson) -> Self {
        self.persons.get_mut().insert(id, person);
        self
    }

    /// Seed a directed connection. Self-loops and duplicates are ignored.
    pub fn with_connection(mut self, from: i64, to: i64) -> Self {
        let edges = self.connections.get_mut();
        if from != to && !edges.contains(&(from, to)) {
            edges.push((from, to));
        }
        self
    }

    /// Seed a hobby category.
    pub fn with_category(mut self, id: i64, name: &str) -> Self {
        self.categories.get_mut().insert(id, name.to_string());
        self
    }

    /// Seed a hobby, optionally belonging to a category.
    pub fn with_hobby(mut self, id: i64, name: &str, category_id: Option<i64>) -> Self {
        self.hobbies.get_mut().insert(
            id,
            MockHobby {
                name: name.to_string(),
                category_id,
            },
        );
        self
    }

    /// Give a person a hobby (replaces any previous one).
    pub fn with_person_hobby(mut self, person_id: i64, hobby_id: i64) -> Self {
        self.person_hobby.get_mut().insert(person_id, hobby_id);
        self
    }

    /// Make every read of this person's vertex return `raw` instead.
    pub fn with_corrupt_person(mut self, person_id: i64, raw: &str) -> Self {
        self.corrupt_persons
            .get_mut()
            .insert(person_id, raw.to_string());
        self
    }

    /// Make every read fail with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        *self.failure.get_mut() = Some(message.to_string());
        self
    }

    /// Delay every chain probe by `delay`.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        *self.probe_delay.get_mut() = Some(delay);
        self
    }

    /// Number of chain probes served so far.
    pub fn probe_count(&self) -> usize {
        self.chain_probes.load(Ordering::SeqCst)
    }

    /// Add a directed connection after construction.
    pub async fn add_connection(&self, from: i64, to: i64) {
        let mut edges = self.connections.write().await;
        if from != to && !edges.contains(&(from, to)) {
            edges.push((from, to));
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    async fn check_failure(&self) -> Result<()> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    async fn person_envelope(&self, id: i64) -> Option<Envelope> {
        if let Some(raw) = self.corrupt_persons.read().await.get(&id) {
            return Some(Envelope::Text(raw.clone()));
        }
        let persons = self.persons.read().await;
        let p = persons.get(&id)?;
        let vertex = json!({
            "id": VERTEX_ID_BASE + id,
            "label": PERSON_LABEL,
            "properties": {
                "person_id": id,
                "name": p.name,
                "surname": p.surname,
                "age": p.age,
                "latitude": p.latitude,
                "longitude": p.longitude,
            }
        });
        Some(Envelope::Text(format!("{}::vertex", vertex)))
    }

    /// Hobby vertices carry their id only as the vertex identifier, the way
    /// a store does for vertices created without an explicit id property.
    async fn hobby_envelope(&self, id: i64) -> Envelope {
        match self.hobbies.read().await.get(&id) {
            Some(h) => {
                let vertex = json!({
                    "id": id,
                    "label": HOBBY_LABEL,
                    "properties": { "name": h.name }
                });
                Envelope::Text(format!("{}::vertex", vertex))
            }
            None => Envelope::null(),
        }
    }

    async fn category_envelope(&self, id: Option<i64>) -> Envelope {
        let categories = self.categories.read().await;
        match id.and_then(|id| categories.get(&id).map(|name| (id, name))) {
            Some((id, name)) => {
                let vertex = json!({
                    "id": id,
                    "label": CATEGORY_LABEL,
                    "properties": { "name": name }
                });
                Envelope::Text(format!("{}::vertex", vertex))
            }
            None => Envelope::null(),
        }
    }

    fn array_envelope(ids: &[i64]) -> Envelope {
        Envelope::Text(format!("{}::_agtype", json!(ids)))
    }

    async fn out_neighbors(&self, id: i64) -> Vec<i64> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(a, _)| *a == id)
            .map(|(_, b)| *b)
            .collect()
    }

    async fn undirected_adjacency(&self) -> BTreeMap<i64, Vec<i64>> {
        let mut adj: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for &(a, b) in self.connections.read().await.iter() {
            adj.entry(a).or_default().push(b);
            adj.entry(b).or_default().push(a);
        }
        for list in adj.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        adj
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first search for a vertex-simple path of exactly `remaining` more edges.
fn chain_dfs(
    adj: &BTreeMap<i64, Vec<i64>>,
    current: i64,
    destination: i64,
    remaining: u32,
    path: &mut Vec<i64>,
) -> bool {
    if remaining == 0 {
        return current == destination;
    }
    let Some(neighbors) = adj.get(&current) else {
        return false;
    };
    for &next in neighbors {
        if path.contains(&next) {
            continue;
        }
        // The destination may only appear as the final vertex.
        if next == destination && remaining > 1 {
            continue;
        }
        path.push(next);
        if chain_dfs(adj, next, destination, remaining - 1, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn get_person(&self, person_id: i64) -> Result<Option<PersonRecord>> {
        self.check_failure().await?;
        if !self.persons.read().await.contains_key(&person_id) {
            return Ok(None);
        }
        let Some(person) = self.person_envelope(person_id).await else {
            return Ok(None);
        };

        let hobby_id = self.person_hobby.read().await.get(&person_id).copied();
        let (hobby, category) = match hobby_id {
            Some(hid) => {
                let category_id = self
                    .hobbies
                    .read()
                    .await
                    .get(&hid)
                    .and_then(|h| h.category_id);
                (
                    self.hobby_envelope(hid).await,
                    self.category_envelope(category_id).await,
                )
            }
            None => (Envelope::null(), Envelope::null()),
        };

        let mut connections = self.out_neighbors(person_id).await;
        connections.dedup();

        Ok(Some(PersonRecord {
            person,
            hobby,
            category,
            connections: Self::array_envelope(&connections),
        }))
    }

    async fn list_hobbies(&self) -> Result<Vec<HobbyRecord>> {
        self.check_failure().await?;
        let hobbies: Vec<(i64, Option<i64>)> = self
            .hobbies
            .read()
            .await
            .iter()
            .map(|(id, h)| (*id, h.category_id))
            .collect();

        let mut records = Vec::with_capacity(hobbies.len());
        for (id, category_id) in hobbies {
            records.push(HobbyRecord {
                hobby: self.hobby_envelope(id).await,
                category: self.category_envelope(category_id).await,
            });
        }
        Ok(records)
    }

    async fn find_chain(
        &self,
        origin: i64,
        destination: i64,
        depth: u32,
    ) -> Result<Option<Vec<Envelope>>> {
        self.chain_probes.fetch_add(1, Ordering::SeqCst);
        self.check_failure().await?;
        let delay = *self.probe_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let adj = self.undirected_adjacency().await;
        let mut path = vec![origin];
        if !chain_dfs(&adj, origin, destination, depth, &mut path) {
            return Ok(None);
        }

        let mut chain = Vec::with_capacity(path.len());
        for id in path {
            match self.person_envelope(id).await {
                Some(envelope) => chain.push(envelope),
                None => return Err(anyhow!("dangling connection to person {}", id)),
            }
        }
        Ok(Some(chain))
    }

    async fn friend_of_friend(&self, user: i64) -> Result<Vec<CandidateRecord>> {
        self.check_failure().await?;
        let direct: Vec<i64> = self.out_neighbors(user).await;
        let direct_set: HashSet<i64> = direct.iter().copied().collect();

        // candidate -> friends leading to it, in discovery order
        let mut order: Vec<i64> = Vec::new();
        let mut common: HashMap<i64, Vec<i64>> = HashMap::new();
        for friend in direct {
            for candidate in self.out_neighbors(friend).await {
                if candidate == user || direct_set.contains(&candidate) {
                    continue;
                }
                let friends = common.entry(candidate).or_insert_with(|| {
                    order.push(candidate);
                    Vec::new()
                });
                if !friends.contains(&friend) {
                    friends.push(friend);
                }
            }
        }

        let mut records = Vec::with_capacity(order.len());
        for candidate in order {
            let Some(envelope) = self.person_envelope(candidate).await else {
                continue;
            };
            records.push(CandidateRecord {
                candidate: envelope,
                common_friends: Self::array_envelope(&common[&candidate]),
            });
        }
        Ok(records)
    }

    async fn neighborhood(
        &self,
        center: i64,
        depth: u32,
        limit: usize,
    ) -> Result<Vec<NeighborRecord>> {
        self.check_failure().await?;
        let adj = self.undirected_adjacency().await;

        let mut hops: BTreeMap<i64, u32> = BTreeMap::new();
        let mut queue = VecDeque::from([(center, 0u32)]);
        let mut seen = HashSet::from([center]);
        while let Some((node, dist)) = queue.pop_front() {
            if dist == depth {
                continue;
            }
            for &next in adj.get(&node).map(Vec::as_slice).unwrap_or_default() {
                if seen.insert(next) {
                    hops.insert(next, dist + 1);
                    queue.push_back((next, dist + 1));
                }
            }
        }

        let mut ordered: Vec<(i64, u32)> = hops.into_iter().collect();
        ordered.sort_by_key(|&(id, h)| (h, id));
        ordered.truncate(limit);

        let person_hobby = self.person_hobby.read().await.clone();
        let mut records = Vec::with_capacity(ordered.len());
        for (id, h) in ordered {
            let Some(person) = self.person_envelope(id).await else {
                continue;
            };
            let hobby = match person_hobby.get(&id) {
                Some(hid) => match self.hobbies.read().await.get(hid) {
                    Some(hobby) => Envelope::Text(json!(hobby.name).to_string()),
                    None => Envelope::null(),
                },
                None => Envelope::null(),
            };
            records.push(NeighborRecord {
                person,
                hobby,
                hops: h,
            });
        }
        Ok(records)
    }

    async fn connections_among(&self, person_ids: &[i64]) -> Result<Vec<EdgeRecord>> {
        self.check_failure().await?;
        let members: HashSet<i64> = person_ids.iter().copied().collect();
        Ok(self
            .connections
            .read()
            .await
            .iter()
            .filter(|(a, b)| members.contains(a) && members.contains(b))
            .map(|&(a, b)| EdgeRecord {
                source: Envelope::Native(json!(a)),
                target: Envelope::Text(b.to_string()),
            })
            .collect())
    }

    async fn hobby_groups(&self) -> Result<Vec<HobbyGroupRecord>> {
        self.check_failure().await?;
        let mut groups: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for (&person, &hobby) in self.person_hobby.read().await.iter() {
            groups.entry(hobby).or_default().push(person);
        }
        for members in groups.values_mut() {
            members.sort_unstable();
        }

        let mut ordered: Vec<(i64, Vec<i64>)> = groups.into_iter().collect();
        ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

        let mut records = Vec::with_capacity(ordered.len());
        for (hobby, members) in ordered {
            records.push(HobbyGroupRecord {
                hobby: self.hobby_envelope(hobby).await,
                members: Self::array_envelope(&members),
            });
        }
        Ok(records)
    }

    async fn adjacency(&self) -> Result<Vec<AdjacencyRecord>> {
        self.check_failure().await?;
        let ids: Vec<i64> = self.persons.read().await.keys().copied().collect();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let neighbors = self.out_neighbors(id).await;
            records.push(AdjacencyRecord {
                person_id: Envelope::Bytes(id.to_string().into_bytes()),
                neighbors: Self::array_envelope(&neighbors),
            });
        }
        Ok(records)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.failure.read().await.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_chain_exact_length() {
        let store = MockGraphStore::from_edges(&[(1, 2), (2, 3), (3, 4)]);
        assert!(store.find_chain(1, 4, 2).await.unwrap().is_none());
        let chain = store.find_chain(1, 4, 3).await.unwrap().unwrap();
        assert_eq!(chain.len(), 4);
        assert_eq!(store.probe_count(), 2);
    }

    #[tokio::test]
    async fn test_find_chain_ignores_direction() {
        let store = MockGraphStore::from_edges(&[(2, 1), (3, 2)]);
        assert!(store.find_chain(1, 3, 2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_neighborhood_orders_by_hops() {
        let store = MockGraphStore::from_edges(&[(1, 5), (5, 2), (1, 9)]);
        let rows = store.neighborhood(1, 2, 10).await.unwrap();
        let hops: Vec<u32> = rows.iter().map(|r| r.hops).collect();
        assert_eq!(hops, vec![1, 1, 2]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MockGraphStore::from_edges(&[(1, 2)]).failing("connection reset");
        let err = store.adjacency().await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert!(!store.health_check().await.unwrap());
    }
}
