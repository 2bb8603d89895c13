//! Core data model for the knowledge graph compactor.
//!
//! Holds the graph types shared by both codec passes, the JSON boundary
//! adapter, the codec configuration and the error type.

pub mod config;
pub mod error;
pub mod json;
pub mod types;

pub use config::CodecConfig;
pub use error::{KgError, Result};
pub use types::{AttrValue, Graph, Link, Node, Scalar, ValueFold};
