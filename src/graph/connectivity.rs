//! Full adjacency listing.

use super::decode::{decode_array, decode_scalar, DecodeError, Value};
use super::error::{store_call, GraphResult};
use super::models::{Connectivity, ConnectivityEntry, ConnectivityStats};
use crate::neo4j::GraphStore;
use tokio_util::sync::CancellationToken;

/// Every person with at least one outgoing connection, ordered by id.
pub async fn enumerate_connections(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
) -> GraphResult<Connectivity> {
    let rows = store_call(cancel, store.adjacency()).await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let id = match decode_scalar(&row.person_id)? {
            Value::Integer(id) => id,
            other => {
                return Err(DecodeError::new(
                    format!("expected a person id, got {}", other.kind()),
                    &other.to_string(),
                )
                .into())
            }
        };
        let neighbors: Vec<i64> = decode_array(&row.neighbors)?
            .into_iter()
            .filter(|n| *n != id)
            .collect();
        if neighbors.is_empty() {
            continue;
        }
        items.push(ConnectivityEntry { id, neighbors });
    }
    items.sort_by_key(|entry| entry.id);

    let stats = ConnectivityStats {
        users_with_connections: items.len(),
        total_connections: items.iter().map(|e| e.neighbors.len()).sum(),
    };
    tracing::debug!(
        "Enumerated {} connections from {} people",
        stats.total_connections,
        stats.users_with_connections
    );

    Ok(Connectivity { items, stats })
}
