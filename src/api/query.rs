//! Query parameter structs for the graph endpoints.
//!
//! Every parameter is accepted in snake_case and camelCase
//! (`max_depth` / `maxDepth`). Missing or empty values fall back to defaults.

use crate::graph::{ego, error::ensure_range, path, recommend};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Helper to deserialize optional values from query string (which are always strings)
fn deserialize_option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => s.trim().parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

fn check(param: &'static str, value: u32, min: u32, max: u32) -> Result<(), String> {
    ensure_range(param, i64::from(value), i64::from(min), i64::from(max)).map_err(|e| e.to_string())
}

/// `GET /graph/shortest-path/{origin}/{destination}`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ShortestPathParams {
    /// Maximum path length in edges (default: 3, range 1..=5)
    #[serde(
        default,
        alias = "maxDepth",
        deserialize_with = "deserialize_option_from_str"
    )]
    pub max_depth: Option<u32>,
}

impl ShortestPathParams {
    pub fn max_depth(&self) -> u32 {
        self.max_depth.unwrap_or(path::DEFAULT_MAX_DEPTH)
    }

    pub fn validate(&self) -> Result<(), String> {
        check("max_depth", self.max_depth(), path::MIN_DEPTH, path::MAX_DEPTH)
    }
}

/// `GET /graph/recommendations/{user}`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RecommendationParams {
    /// Max recommendations (default: 10, range 1..=100)
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub limit: Option<u32>,
    /// Minimum common friends (default: 1, range 1..=10)
    #[serde(
        default,
        alias = "minCommon",
        deserialize_with = "deserialize_option_from_str"
    )]
    pub min_common: Option<u32>,
}

impl RecommendationParams {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(recommend::DEFAULT_LIMIT)
    }

    pub fn min_common(&self) -> u32 {
        self.min_common.unwrap_or(recommend::DEFAULT_MIN_COMMON)
    }

    pub fn validate(&self) -> Result<(), String> {
        check("limit", self.limit(), 1, recommend::MAX_LIMIT)?;
        check("min_common", self.min_common(), 1, recommend::MAX_MIN_COMMON)
    }
}

/// `GET /graph/ego/{user}`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EgoParams {
    /// Hop radius (default: 1, range 1..=2)
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub depth: Option<u32>,
    /// Node cap including the center (default: 500, range 10..=2000)
    #[serde(
        default,
        alias = "maxNodes",
        deserialize_with = "deserialize_option_from_str"
    )]
    pub max_nodes: Option<u32>,
}

impl EgoParams {
    pub fn depth(&self) -> u32 {
        self.depth.unwrap_or(ego::DEFAULT_DEPTH)
    }

    pub fn max_nodes(&self) -> u32 {
        self.max_nodes.unwrap_or(ego::DEFAULT_MAX_NODES)
    }

    pub fn validate(&self) -> Result<(), String> {
        check("depth", self.depth(), 1, ego::MAX_DEPTH)?;
        check(
            "max_nodes",
            self.max_nodes(),
            ego::MIN_MAX_NODES,
            ego::MAX_MAX_NODES,
        )
    }
}

/// `GET /graph/communities`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CommunityParams {
    /// Include per-community density (default: false)
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub density: Option<bool>,
}

impl CommunityParams {
    pub fn with_density(&self) -> bool {
        self.density.unwrap_or(false)
    }
}
