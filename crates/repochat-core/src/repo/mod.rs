//! Document repositories: named collections of uploaded files.

pub mod model;

pub use model::{FileDraft, RepoFile, Repository};
