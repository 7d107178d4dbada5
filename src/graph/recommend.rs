//! Friend-of-friend recommendations.
//!
//! Candidates are people two directed hops away (`user → friend → candidate`)
//! that the user is not already connected to. They are ranked by how many of
//! the user's friends lead to them.

use super::decode::{decode_array, decode_vertex};
use super::error::{ensure_range, store_call, GraphResult};
use super::models::{round_to, Person, Recommendation, Recommendations};
use super::profile::load_person;
use crate::neo4j::GraphStore;
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_MIN_COMMON: u32 = 1;
pub const MAX_MIN_COMMON: u32 = 10;

struct Candidate {
    person: Person,
    common: Vec<i64>,
}

/// Rank friend-of-friend candidates for `user`.
///
/// Scores are relative to the best candidate in the returned list, so the
/// first entry always scores 1.0.
pub async fn recommend(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    user: i64,
    limit: u32,
    min_common: u32,
) -> GraphResult<Recommendations> {
    ensure_range("limit", i64::from(limit), 1, i64::from(MAX_LIMIT))?;
    ensure_range(
        "min_common",
        i64::from(min_common),
        1,
        i64::from(MAX_MIN_COMMON),
    )?;

    let (_, record) = load_person(store, cancel, user).await?;
    let direct: HashSet<i64> = decode_array(&record.connections)?.into_iter().collect();

    let rows = store_call(cancel, store.friend_of_friend(user)).await?;

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for row in &rows {
        let person = Person::from_vertex(&decode_vertex(&row.candidate)?)?;
        if person.id == user || direct.contains(&person.id) {
            continue;
        }

        let slot = *index.entry(person.id).or_insert_with(|| {
            candidates.push(Candidate {
                person,
                common: Vec::new(),
            });
            candidates.len() - 1
        });
        let common = &mut candidates[slot].common;
        for friend in decode_array(&row.common_friends)? {
            if direct.contains(&friend) && !common.contains(&friend) {
                common.push(friend);
            }
        }
    }

    let min_common = min_common as usize;
    candidates.retain(|c| c.common.len() >= min_common);
    candidates.sort_by(|a, b| b.common.len().cmp(&a.common.len()));
    candidates.truncate(limit as usize);

    let max_common = candidates.first().map_or(1, |c| c.common.len()).max(1) as f64;
    let recommendations: Vec<Recommendation> = candidates
        .into_iter()
        .map(|c| Recommendation {
            id: c.person.id,
            name: c.person.display_name(),
            common_count: c.common.len(),
            score: round_to(c.common.len() as f64 / max_common, 2),
            common_ids: c.common,
        })
        .collect();

    tracing::debug!(
        "Recommendations for {}: {} of {} candidate rows",
        user,
        recommendations.len(),
        rows.len()
    );

    Ok(Recommendations {
        user_id: user,
        total: recommendations.len(),
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::error::GraphError;
    use crate::neo4j::mock::MockGraphStore;

    async fn run(store: &MockGraphStore, user: i64, limit: u32, min_common: u32) -> GraphResult<Recommendations> {
        recommend(store, &CancellationToken::new(), user, limit, min_common).await
    }

    #[tokio::test]
    async fn test_two_common_friends() {
        let store = MockGraphStore::from_edges(&[(1, 2), (1, 3), (2, 5), (3, 5)]);
        let result = run(&store, 1, 10, 1).await.unwrap();

        assert_eq!(result.user_id, 1);
        assert_eq!(result.total, 1);
        let rec = &result.recommendations[0];
        assert_eq!(rec.id, 5);
        assert_eq!(rec.name, "P5 Test");
        assert_eq!(rec.common_count, 2);
        assert_eq!(rec.common_ids, vec![2, 3]);
        assert_eq!(rec.score, 1.0);
    }

    #[tokio::test]
    async fn test_excludes_self_and_direct_connections() {
        let store = MockGraphStore::from_edges(&[(1, 2), (1, 3), (2, 1), (2, 3), (3, 4)]);
        let result = run(&store, 1, 10, 1).await.unwrap();
        let ids: Vec<i64> = result.recommendations.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[tokio::test]
    async fn test_ranking_and_relative_scores() {
        // 6 is reachable through 2, 3 and 4; 7 through 2; 8 through 3 and 4.
        let store = MockGraphStore::from_edges(&[
            (1, 2),
            (1, 3),
            (1, 4),
            (2, 7),
            (2, 6),
            (3, 6),
            (3, 8),
            (4, 6),
            (4, 8),
        ]);
        let result = run(&store, 1, 10, 1).await.unwrap();

        let ranked: Vec<(i64, usize, f64)> = result
            .recommendations
            .iter()
            .map(|r| (r.id, r.common_count, r.score))
            .collect();
        assert_eq!(ranked, vec![(6, 3, 1.0), (8, 2, 0.67), (7, 1, 0.33)]);
    }

    #[tokio::test]
    async fn test_ties_keep_discovery_order() {
        let store = MockGraphStore::from_edges(&[(1, 2), (2, 9), (2, 7), (2, 8)]);
        let result = run(&store, 1, 10, 1).await.unwrap();
        let ids: Vec<i64> = result.recommendations.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 7, 8]);
    }

    #[tokio::test]
    async fn test_min_common_filters() {
        let store = MockGraphStore::from_edges(&[(1, 2), (1, 3), (2, 5), (3, 5), (2, 6)]);
        let result = run(&store, 1, 10, 2).await.unwrap();
        assert_eq!(result.total, 1);
        assert!(result.recommendations.iter().all(|r| r.common_count >= 2));
    }

    #[tokio::test]
    async fn test_scores_normalize_within_truncated_set() {
        let store = MockGraphStore::from_edges(&[(1, 2), (1, 3), (2, 5), (3, 5), (2, 6)]);
        let result = run(&store, 1, 1, 1).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.recommendations[0].id, 5);
        assert_eq!(result.recommendations[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let store = MockGraphStore::from_edges(&[(1, 2)]);
        let result = run(&store, 1, 10, 1).await.unwrap();
        assert_eq!(result.total, 0);
        assert!(result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_invariants_on_dense_fixture() {
        let mut edges = Vec::new();
        for a in 1..=12i64 {
            for b in 1..=12i64 {
                if a != b && (a * 7 + b * 3) % 5 == 0 {
                    edges.push((a, b));
                }
            }
        }
        let store = MockGraphStore::from_edges(&edges);
        let direct = |u: i64| -> HashSet<i64> {
            edges.iter().filter(|(a, _)| *a == u).map(|(_, b)| *b).collect()
        };

        for user in 1..=12 {
            let result = run(&store, user, 100, 1).await.unwrap();
            let friends = direct(user);
            let mut previous = usize::MAX;
            for rec in &result.recommendations {
                assert_ne!(rec.id, user);
                assert!(!friends.contains(&rec.id));
                assert!(rec.common_count >= 1);
                assert!(rec.common_count <= previous);
                assert!((0.0..=1.0).contains(&rec.score));
                for f in &rec.common_ids {
                    assert!(friends.contains(f));
                    assert!(direct(*f).contains(&rec.id));
                }
                previous = rec.common_count;
            }
        }
    }

    #[tokio::test]
    async fn test_validation_and_not_found() {
        let store = MockGraphStore::from_edges(&[(1, 2)]);
        assert!(matches!(
            run(&store, 1, 0, 1).await,
            Err(GraphError::Validation { param: "limit", .. })
        ));
        assert!(matches!(
            run(&store, 1, 101, 1).await,
            Err(GraphError::Validation { param: "limit", .. })
        ));
        assert!(matches!(
            run(&store, 1, 10, 11).await,
            Err(GraphError::Validation { param: "min_common", .. })
        ));
        assert!(matches!(run(&store, 77, 10, 1).await, Err(GraphError::NotFound(77))));
    }

    #[tokio::test]
    async fn test_corrupt_candidate_is_decode_error() {
        let store = MockGraphStore::from_edges(&[(1, 2), (2, 3)]).with_corrupt_person(3, "::vertex{");
        let err = run(&store, 1, 10, 1).await.unwrap_err();
        assert!(matches!(err, GraphError::Decode(_)));
    }
}
