//! Hobby-based community grouping.
//!
//! People sharing a hobby form a community. This is a plain grouping, not a
//! modularity optimizer; results are labelled [`ALGORITHM`] accordingly.

use super::decode::{decode_array, decode_scalar, decode_value, DecodeError, Value};
use super::error::{store_call, GraphResult};
use super::models::{round_to, Communities, Community};
use crate::neo4j::{Envelope, GraphStore};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

pub const ALGORITHM: &str = "hobby-based-grouping";

/// Smallest group reported as a community.
pub const MIN_COMMUNITY_SIZE: usize = 2;

/// Group people by hobby. When `with_density` is set, each community also
/// carries its internal connection density.
pub async fn detect_communities(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    with_density: bool,
) -> GraphResult<Communities> {
    let rows = store_call(cancel, store.hobby_groups()).await?;

    let mut communities = Vec::with_capacity(rows.len());
    for row in &rows {
        let (id, hobby) = hobby_key(&row.hobby)?;

        let mut seen = HashSet::new();
        let members: Vec<i64> = decode_array(&row.members)?
            .into_iter()
            .filter(|m| seen.insert(*m))
            .collect();
        if members.len() < MIN_COMMUNITY_SIZE {
            continue;
        }

        communities.push(Community {
            id,
            hobby,
            size: members.len(),
            members,
            density: None,
        });
    }
    communities.sort_by(|a, b| b.size.cmp(&a.size));

    if with_density {
        for community in &mut communities {
            let density = internal_density(store, cancel, &community.members).await?;
            community.density = Some(density);
        }
    }

    tracing::debug!("Detected {} hobby communities", communities.len());

    Ok(Communities {
        total: communities.len(),
        communities,
        algorithm: ALGORITHM.to_string(),
    })
}

/// Distinct connected pairs inside `members` over all possible pairs.
async fn internal_density(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    members: &[i64],
) -> GraphResult<f64> {
    let n = members.len();
    if n < 2 {
        return Ok(0.0);
    }

    let inside: HashSet<i64> = members.iter().copied().collect();
    let rows = store_call(cancel, store.connections_among(members)).await?;

    let mut pairs = HashSet::new();
    for row in &rows {
        let a = endpoint(&row.source)?;
        let b = endpoint(&row.target)?;
        if a != b && inside.contains(&a) && inside.contains(&b) {
            pairs.insert((a.min(b), a.max(b)));
        }
    }

    let possible = (n * (n - 1) / 2) as f64;
    Ok(round_to(pairs.len() as f64 / possible, 4))
}

/// Grouping key of a hobby column: a hobby vertex or a bare hobby id.
fn hobby_key(envelope: &Envelope) -> Result<(i64, Option<String>), DecodeError> {
    match decode_value(envelope)? {
        Value::Vertex(vertex) => Ok((vertex.int("hobby_id")?, vertex.opt_text("name")?)),
        Value::Integer(id) => Ok((id, None)),
        other @ (Value::Float(_) | Value::Text(_) | Value::List(_) | Value::Null) => {
            Err(DecodeError::new(
                format!("expected a hobby, got {}", other.kind()),
                &other.to_string(),
            ))
        }
    }
}

fn endpoint(envelope: &Envelope) -> Result<i64, DecodeError> {
    match decode_scalar(envelope)? {
        Value::Integer(id) => Ok(id),
        other => Err(DecodeError::new(
            format!("expected a person id, got {}", other.kind()),
            &other.to_string(),
        )),
    }
}
