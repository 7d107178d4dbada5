//! Social graph analytics engine.
//!
//! Answers read-only structural questions about the social graph by driving
//! the traversal primitives of a [`GraphStore`](crate::neo4j::GraphStore) and
//! decoding what it returns.
//!
//! ## Architecture
//!
//! ```text
//! GraphStore (Neo4j / mock) ──► Envelope ──► decode ──► typed values
//!                                                │
//!              path · recommend · ego · community · connectivity · profile
//!                                                │
//!                                     SocialGraphEngine (façade)
//! ```
//!
//! ## Modules
//!
//! - [`decode`]: envelope decoding (scalars, id arrays, vertices)
//! - [`error`]: `GraphError` taxonomy and cancellable store calls
//! - [`models`]: result types
//! - [`path`]: iterative-deepening shortest path
//! - [`recommend`]: friend-of-friend recommendations
//! - [`ego`]: ego network with drawing attributes
//! - [`community`]: hobby-based grouping
//! - [`connectivity`]: full adjacency listing
//! - [`profile`]: person profile and hobby catalog
//! - [`engine`]: `SocialGraphEngine`

pub mod community;
pub mod connectivity;
pub mod decode;
pub mod ego;
pub mod engine;
pub mod error;
pub mod models;
pub mod path;
pub mod profile;
pub mod recommend;

pub use decode::{DecodeError, Value, Vertex};
pub use ego::HobbyPalette;
pub use engine::SocialGraphEngine;
pub use error::{GraphError, GraphResult};
pub use models::*;
