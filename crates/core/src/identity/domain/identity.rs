use std::fmt;
use std::path::PathBuf;

use crate::shared::embedding::Embedding;

/// Arena index of an identity within its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityId(pub usize);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an identity entered the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityOrigin {
    /// Loaded from the reference directory before sorting.
    Reference,
    /// Synthesized for a face that matched nobody.
    Discovered,
}

/// A person: a unique label, a destination folder and every reference
/// embedding seen for them. References are only ever appended.
#[derive(Clone, Debug)]
pub struct Identity {
    id: IdentityId,
    label: String,
    folder: PathBuf,
    origin: IdentityOrigin,
    references: Vec<Embedding>,
}

impl Identity {
    pub(crate) fn new(
        id: IdentityId,
        label: String,
        folder: PathBuf,
        origin: IdentityOrigin,
        first_reference: Embedding,
    ) -> Self {
        Self {
            id,
            label,
            folder,
            origin,
            references: vec![first_reference],
        }
    }

    pub fn id(&self) -> IdentityId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn folder(&self) -> &PathBuf {
        &self.folder
    }

    pub fn origin(&self) -> IdentityOrigin {
        self.origin
    }

    pub fn references(&self) -> &[Embedding] {
        &self.references
    }

    pub(crate) fn push_reference(&mut self, embedding: Embedding) {
        self.references.push(embedding);
    }
}
