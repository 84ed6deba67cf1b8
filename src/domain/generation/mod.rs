//! Fallback generation domain

mod generator;

pub use generator::{FallbackGenerator, Generation};

#[cfg(test)]
pub use generator::mock::MockGenerator;
