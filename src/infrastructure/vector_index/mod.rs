//! Vector index implementations

mod hash_family;
mod lsh;

pub use hash_family::HashFamily;
pub use lsh::LshVectorIndex;
