//! Infrastructure layer - External service implementations

pub mod cache;
pub mod embedding;
pub mod generation;
pub mod http;
pub mod logging;
pub mod observability;
pub mod services;
pub mod vector_index;
