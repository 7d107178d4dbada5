//! Neo4j client for reading the social graph

use super::models::*;
use anyhow::{bail, Context, Result};
use neo4rs::{query, BoltType, ConfigBuilder, Graph, Query, Row};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client bound to `database` (the graph namespace).
    pub async fn new(uri: &str, user: &str, password: &str, database: &str) -> Result<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .db(database)
            .build()
            .context("Invalid Neo4j configuration")?;

        let graph = Graph::connect(config)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await;

        Ok(client)
    }

    /// Create lookup indexes for the id properties.
    ///
    /// Failures are logged and ignored: a read-only account may not be allowed
    /// to manage schema, and the queries still work without the indexes.
    async fn init_schema(&self) {
        let indexes = [
            "CREATE INDEX person_id IF NOT EXISTS FOR (p:Person) ON (p.person_id)",
            "CREATE INDEX hobby_id IF NOT EXISTS FOR (h:Hobby) ON (h.hobby_id)",
            "CREATE INDEX category_id IF NOT EXISTS FOR (c:HobbyCategory) ON (c.category_id)",
        ];

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Could not create index ({}): {}", index, e);
            }
        }
    }

    /// Run a query and collect every row.
    async fn fetch_all(&self, q: Query) -> Result<Vec<Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get a person with hobby, category and outgoing connections.
    pub async fn get_person(&self, person_id: i64) -> Result<Option<PersonRecord>> {
        let q = query(
            r#"
            MATCH (u:Person {person_id: $id})
            OPTIONAL MATCH (u)-[:HAS_HOBBY]->(h:Hobby)
            OPTIONAL MATCH (h)-[:BELONGS_TO]->(c:HobbyCategory)
            OPTIONAL MATCH (u)-[:CONNECTED]->(con:Person)
            WITH u, h, c, collect(DISTINCT con.person_id) AS connections
            RETURN u, h, c, connections
            LIMIT 1
            "#,
        )
        .param("id", person_id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            Ok(Some(PersonRecord {
                person: column(&row, "u")?,
                hobby: column(&row, "h")?,
                category: column(&row, "c")?,
                connections: column(&row, "connections")?,
            }))
        } else {
            Ok(None)
        }
    }

    /// List every hobby with its category.
    pub async fn list_hobbies(&self) -> Result<Vec<HobbyRecord>> {
        let q = query(
            r#"
            MATCH (h:Hobby)
            OPTIONAL MATCH (h)-[:BELONGS_TO]->(c:HobbyCategory)
            RETURN h, c
            ORDER BY h.hobby_id
            "#,
        );

        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(HobbyRecord {
                    hobby: column(row, "h")?,
                    category: column(row, "c")?,
                })
            })
            .collect()
    }

    // ========================================================================
    // Traversals
    // ========================================================================

    /// Find one undirected chain of exactly `depth` CONNECTED edges.
    ///
    /// Variable-length bounds cannot be query parameters, so `depth` is
    /// formatted into the pattern; it is an engine-validated integer. The
    /// endpoint ids stay bound parameters.
    pub async fn find_chain(
        &self,
        origin: i64,
        destination: i64,
        depth: u32,
    ) -> Result<Option<Vec<Envelope>>> {
        if depth == 0 {
            bail!("chain depth must be at least 1");
        }

        let cypher = format!(
            r#"
            MATCH p = (a:Person {{person_id: $origin}})-[:CONNECTED*{depth}..{depth}]-(b:Person {{person_id: $destination}})
            RETURN nodes(p) AS chain
            LIMIT 1
            "#
        );
        let q = query(&cypher)
            .param("origin", origin)
            .param("destination", destination);

        let mut result = self.graph.execute(q).await?;
        let Some(row) = result.next().await? else {
            return Ok(None);
        };

        let chain: BoltType = row.get("chain").context("missing column chain")?;
        match chain {
            BoltType::List(list) => list
                .value
                .into_iter()
                .map(to_envelope)
                .collect::<Result<Vec<_>>>()
                .map(Some),
            other => bail!("expected a node list for chain, got {:?}", other),
        }
    }

    /// Friend-of-friend candidates with their common friend ids.
    pub async fn friend_of_friend(&self, user: i64) -> Result<Vec<CandidateRecord>> {
        let q = query(
            r#"
            MATCH (user:Person {person_id: $id})-[:CONNECTED]->(friend:Person)-[:CONNECTED]->(fof:Person)
            WHERE fof <> user AND NOT (user)-[:CONNECTED]->(fof)
            WITH fof, collect(DISTINCT friend.person_id) AS common_friends
            RETURN fof, common_friends
            "#,
        )
        .param("id", user);

        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(CandidateRecord {
                    candidate: column(row, "fof")?,
                    common_friends: column(row, "common_friends")?,
                })
            })
            .collect()
    }

    /// People within `depth` undirected hops of `center`, nearest first.
    pub async fn neighborhood(
        &self,
        center: i64,
        depth: u32,
        limit: usize,
    ) -> Result<Vec<NeighborRecord>> {
        if depth == 0 {
            bail!("neighborhood depth must be at least 1");
        }

        let cypher = format!(
            r#"
            MATCH p = (center:Person {{person_id: $id}})-[:CONNECTED*1..{depth}]-(u:Person)
            WHERE u <> center
            WITH u, min(length(p)) AS hops
            OPTIONAL MATCH (u)-[:HAS_HOBBY]->(h:Hobby)
            RETURN u, h.name AS hobby, hops
            ORDER BY hops, u.person_id
            LIMIT $limit
            "#
        );
        let q = query(&cypher)
            .param("id", center)
            .param("limit", i64::try_from(limit).unwrap_or(i64::MAX));

        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                let hops: i64 = row.get("hops").context("missing column hops")?;
                Ok(NeighborRecord {
                    person: column(row, "u")?,
                    hobby: column(row, "hobby")?,
                    hops: u32::try_from(hops).context("hop count out of range")?,
                })
            })
            .collect()
    }

    /// Directed CONNECTED edges inside a person set.
    pub async fn connections_among(&self, person_ids: &[i64]) -> Result<Vec<EdgeRecord>> {
        if person_ids.is_empty() {
            return Ok(vec![]);
        }

        let q = query(
            r#"
            MATCH (a:Person)-[:CONNECTED]->(b:Person)
            WHERE a.person_id IN $ids AND b.person_id IN $ids
            RETURN DISTINCT a.person_id AS source, b.person_id AS target
            "#,
        )
        .param("ids", person_ids.to_vec());

        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(EdgeRecord {
                    source: column(row, "source")?,
                    target: column(row, "target")?,
                })
            })
            .collect()
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// People grouped by hobby.
    pub async fn hobby_groups(&self) -> Result<Vec<HobbyGroupRecord>> {
        let q = query(
            r#"
            MATCH (u:Person)-[:HAS_HOBBY]->(h:Hobby)
            WITH h, collect(DISTINCT u.person_id) AS members
            RETURN h, members
            ORDER BY size(members) DESC, h.hobby_id
            "#,
        );

        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(HobbyGroupRecord {
                    hobby: column(row, "h")?,
                    members: column(row, "members")?,
                })
            })
            .collect()
    }

    /// Every person with its outgoing CONNECTED targets.
    pub async fn adjacency(&self) -> Result<Vec<AdjacencyRecord>> {
        let q = query(
            r#"
            MATCH (u:Person)
            OPTIONAL MATCH (u)-[:CONNECTED]->(c:Person)
            RETURN u.person_id AS person_id, collect(DISTINCT c.person_id) AS neighbors
            ORDER BY person_id
            "#,
        );

        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(AdjacencyRecord {
                    person_id: column(row, "person_id")?,
                    neighbors: column(row, "neighbors")?,
                })
            })
            .collect()
    }

    /// Execute a trivial query to verify connectivity.
    pub async fn ping(&self) -> Result<()> {
        self.graph.run(query("RETURN 1 AS ping")).await?;
        Ok(())
    }
}

// ============================================================================
// Bolt → envelope conversion
// ============================================================================

/// Read a column as an envelope.
fn column(row: &Row, key: &str) -> Result<Envelope> {
    let value: BoltType = row
        .get(key)
        .with_context(|| format!("missing column {}", key))?;
    to_envelope(value)
}

/// Raw byte values stay bytes; everything else becomes a native value.
fn to_envelope(value: BoltType) -> Result<Envelope> {
    match value {
        BoltType::Bytes(bytes) => Ok(Envelope::Bytes(bytes.value.to_vec())),
        other => Ok(Envelope::Native(bolt_to_json(&other)?)),
    }
}

/// Convert a Bolt value into the generic JSON shape the decoder understands.
///
/// Nodes become `{"id": .., "label": .., "properties": {..}}`.
fn bolt_to_json(value: &BoltType) -> Result<JsonValue> {
    Ok(match value {
        BoltType::Null(_) => JsonValue::Null,
        BoltType::Boolean(b) => JsonValue::Bool(b.value),
        BoltType::Integer(i) => JsonValue::from(i.value),
        BoltType::Float(f) => serde_json::Number::from_f64(f.value)
            .map(JsonValue::Number)
            .with_context(|| format!("non-finite float {}", f.value))?,
        BoltType::String(s) => JsonValue::String(s.value.clone()),
        BoltType::List(list) => JsonValue::Array(
            list.value
                .iter()
                .map(bolt_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        BoltType::Map(map) => {
            let mut out = Map::with_capacity(map.value.len());
            for (k, v) in &map.value {
                out.insert(k.value.clone(), bolt_to_json(v)?);
            }
            JsonValue::Object(out)
        }
        BoltType::Node(node) => {
            let label = node
                .labels
                .value
                .iter()
                .find_map(|l| match l {
                    BoltType::String(s) => Some(s.value.clone()),
                    _ => None,
                })
                .unwrap_or_default();

            let mut properties = Map::with_capacity(node.properties.value.len());
            for (k, v) in &node.properties.value {
                properties.insert(k.value.clone(), bolt_to_json(v)?);
            }

            serde_json::json!({
                "id": node.id.value,
                "label": label,
                "properties": properties,
            })
        }
        other => bail!("unsupported bolt value {:?}", other),
    })
}
