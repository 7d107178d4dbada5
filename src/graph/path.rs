//! Bounded shortest-path search.
//!
//! The store is asked for an undirected chain of exactly `d` CONNECTED edges
//! for `d = 1, 2, ..., max_depth`. The first depth that yields a chain is the
//! shortest distance, so the search stops there.

use super::decode::{decode_vertex, DecodeError};
use super::error::{ensure_range, store_call, GraphResult};
use super::models::{PathNode, Person, ShortestPath};
use super::profile::load_person;
use crate::neo4j::{Envelope, GraphStore};
use tokio_util::sync::CancellationToken;

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 5;
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Find the shortest undirected connection path from `origin` to `destination`
/// of at most `max_depth` edges.
pub async fn find_shortest_path(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    origin: i64,
    destination: i64,
    max_depth: u32,
) -> GraphResult<ShortestPath> {
    ensure_range(
        "max_depth",
        i64::from(max_depth),
        i64::from(MIN_DEPTH),
        i64::from(MAX_DEPTH),
    )?;

    let (origin_person, _) = load_person(store, cancel, origin).await?;
    load_person(store, cancel, destination).await?;

    if origin == destination {
        return Ok(ShortestPath::single_node(path_node(&origin_person)));
    }

    for depth in MIN_DEPTH..=max_depth {
        tracing::debug!(
            "Probing chain {} -> {} at depth {}",
            origin,
            destination,
            depth
        );
        let chain = store_call(cancel, store.find_chain(origin, destination, depth)).await?;
        if let Some(chain) = chain {
            return materialize(&chain, origin, destination, depth);
        }
    }

    tracing::debug!(
        "No chain {} -> {} within {} hops",
        origin,
        destination,
        max_depth
    );
    Ok(ShortestPath::not_found())
}

fn path_node(person: &Person) -> PathNode {
    PathNode {
        id: person.id,
        name: person.display_name(),
    }
}

/// Decode a chain and check it against what was asked for.
fn materialize(
    chain: &[Envelope],
    origin: i64,
    destination: i64,
    depth: u32,
) -> GraphResult<ShortestPath> {
    let path = chain
        .iter()
        .map(|envelope| {
            let person = Person::from_vertex(&decode_vertex(envelope)?)?;
            Ok(path_node(&person))
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    let ids: Vec<i64> = path.iter().map(|n| n.id).collect();
    if path.len() != depth as usize + 1 {
        return Err(DecodeError::new(
            format!(
                "chain of {} vertices returned for depth {}",
                path.len(),
                depth
            ),
            &format!("{:?}", ids),
        )
        .into());
    }
    if ids.first() != Some(&origin) || ids.last() != Some(&destination) {
        return Err(DecodeError::new(
            format!("chain does not run from {} to {}", origin, destination),
            &format!("{:?}", ids),
        )
        .into());
    }

    Ok(ShortestPath {
        length: path.len() - 1,
        path,
        exists: true,
    })
}
