use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::PathBuf;

use thiserror::Error;

use crate::identity::domain::identity::{Identity, IdentityId, IdentityOrigin};
use crate::shared::constants::CLUSTER_LABEL_PREFIX;
use crate::shared::embedding::Embedding;

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("identity '{0}' already exists")]
    DuplicateLabel(String),
    #[error("folder {} already belongs to identity '{owner}'", .folder.display())]
    FolderTaken { owner: String, folder: PathBuf },
    #[error("no identity labelled '{0}'")]
    UnknownLabel(String),
    #[error("embedding has {actual} dimensions, registry holds {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("identity registry lock poisoned")]
    Poisoned,
}

/// The nearest stored reference to a query embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct Nearest {
    pub id: IdentityId,
    pub label: String,
    pub distance: f64,
}

/// Arena of identities keyed by integer id, with a label index.
///
/// Labels and folders are unique. The registry only grows: identities are never
/// removed and references are only appended.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    identities: Vec<Identity>,
    by_label: HashMap<String, IdentityId>,
    dim: Option<usize>,
    discovered: usize,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every reference of every identity for the smallest Euclidean
    /// distance. Ties go to the first reference in insertion order.
    pub fn lookup_nearest(&self, embedding: &Embedding) -> Option<Nearest> {
        let mut best: Option<(&Identity, f64)> = None;
        for identity in &self.identities {
            for reference in identity.references() {
                let distance = reference.distance(embedding);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((identity, distance));
                }
            }
        }
        best.filter(|(_, d)| d.is_finite()).map(|(identity, distance)| Nearest {
            id: identity.id(),
            label: identity.label().to_string(),
            distance,
        })
    }

    /// Adds a new identity loaded from a reference image.
    pub fn insert(
        &mut self,
        label: &str,
        embedding: Embedding,
        folder: PathBuf,
    ) -> Result<IdentityId, RegistryError> {
        self.insert_with_origin(label, embedding, folder, IdentityOrigin::Reference)
    }

    /// Adds an identity synthesized for an unmatched face.
    pub fn insert_discovered(
        &mut self,
        label: &str,
        embedding: Embedding,
        folder: PathBuf,
    ) -> Result<IdentityId, RegistryError> {
        let id = self.insert_with_origin(label, embedding, folder, IdentityOrigin::Discovered)?;
        self.discovered += 1;
        Ok(id)
    }

    fn insert_with_origin(
        &mut self,
        label: &str,
        embedding: Embedding,
        folder: PathBuf,
        origin: IdentityOrigin,
    ) -> Result<IdentityId, RegistryError> {
        if self.by_label.contains_key(label) {
            return Err(RegistryError::DuplicateLabel(label.to_string()));
        }
        if let Some(owner) = self.identities.iter().find(|i| i.folder() == &folder) {
            return Err(RegistryError::FolderTaken {
                owner: owner.label().to_string(),
                folder,
            });
        }
        self.check_dim(&embedding)?;

        let id = IdentityId(self.identities.len());
        self.identities.push(Identity::new(
            id,
            label.to_string(),
            folder,
            origin,
            embedding,
        ));
        self.by_label.insert(label.to_string(), id);
        Ok(id)
    }

    /// Appends another reference embedding to an existing identity.
    pub fn add_reference(&mut self, label: &str, embedding: Embedding) -> Result<(), RegistryError> {
        let id = *self
            .by_label
            .get(label)
            .ok_or_else(|| RegistryError::UnknownLabel(label.to_string()))?;
        self.check_dim(&embedding)?;
        self.identities[id.0].push_reference(embedding);
        Ok(())
    }

    /// Label for the next synthesized identity: `Person_<n>`, where `n` is
    /// one more than the number synthesized so far, skipping labels and
    /// folder names already taken.
    pub fn next_cluster_label(&self) -> String {
        let mut n = self.discovered + 1;
        loop {
            let label = format!("{CLUSTER_LABEL_PREFIX}{n}");
            let folder_taken = self
                .identities
                .iter()
                .any(|i| i.folder().file_name() == Some(OsStr::new(&label)));
            if !self.by_label.contains_key(&label) && !folder_taken {
                return label;
            }
            n += 1;
        }
    }

    pub fn get(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get(id.0)
    }

    pub fn find(&self, label: &str) -> Option<&Identity> {
        self.by_label.get(label).and_then(|id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.identities.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.identities.iter().map(Identity::label).collect()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Number of identities synthesized for unmatched faces.
    pub fn discovered(&self) -> usize {
        self.discovered
    }

    fn check_dim(&mut self, embedding: &Embedding) -> Result<(), RegistryError> {
        match self.dim {
            Some(expected) if expected != embedding.dim() => Err(RegistryError::DimensionMismatch {
                expected,
                actual: embedding.dim(),
            }),
            Some(_) => Ok(()),
            None => {
                self.dim = Some(embedding.dim());
                Ok(())
            }
        }
    }
}
