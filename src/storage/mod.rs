//! Saved artifacts under the output root

pub mod catalog;
pub mod writer;

pub use catalog::{
    validate_file_name, ArtifactCatalog, ArtifactKind, SavedContent, SavedFile, SavedListing,
};
pub use writer::{base_name_for, ArtifactWriter, SavedArtifacts};
