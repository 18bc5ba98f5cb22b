//! Attribution graph normalization.
//!
//! Turns a loosely typed `{nodes, links}` document (state sponsors → threat
//! actors → victims) into a graph where:
//! - every link endpoint is a plain id that resolves to a node,
//! - every node carries a kind (`actor` | `sponsor` | `victim`),
//! - nodes acting as both sponsor and victim are split into two variants,
//! - degrees are recomputed from the final links.
//!
//! The crate does no I/O; callers hand it a parsed document (see
//! [`RawDocument`]) and receive a [`NormalizedGraph`] plus a
//! [`NormalizeReport`].

pub mod canonical;
pub mod degree;
mod error;
pub mod model;
pub mod normalize;
pub mod roles;
pub mod split;
pub mod validate;

pub use error::IngestionError;
pub use model::{Link, Node, NodeKind, NormalizedGraph, RawDocument};
pub use normalize::{
    normalize, normalize_json_str, normalize_value, NormalizeOptions, NormalizeReport, Normalized,
};
pub use roles::{Role, RoleSet, RoleTokens};
pub use split::{AmbiguousRoute, SplitPolicy, SplitRule};
