//! # Alchemy Common Library
//!
//! Recipe-search engine shared by the alchemy services:
//! - Corpus model, loader and tier validation
//! - Element graph (producing/consuming recipe indices)
//! - Search kernels (forward BFS, backward DFS, bidirectional) and their
//!   multi-threaded variants
//! - Recipe tree builders and the distinct-tree enumerator
//! - Animation event plans and paced streams
//! - Query façade used by the HTTP layer
//! - Configuration loading

pub mod animation;
pub mod config;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod query;
pub mod search;
pub mod tree;

pub use corpus::{Corpus, Element, PRIMITIVES};
pub use error::{Error, Result};
pub use graph::ElementGraph;
pub use query::RecipeService;
pub use search::{SearchAlgorithm, TreeFlavor};
