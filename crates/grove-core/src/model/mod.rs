//! Persisted aggregate types and their string-enum vocabularies.

pub mod completion;
pub mod group;
pub mod id;
pub mod task;
pub mod user;
