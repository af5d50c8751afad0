//! Relationship inference and cardinality

mod cardinality;
mod implicit;

pub use cardinality::{classify_cardinality, is_unique_or_primary};
pub use implicit::{detect_implicit_relationships, IdSuffixNaming, ReferenceNaming};
