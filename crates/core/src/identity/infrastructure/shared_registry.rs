use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::identity::domain::assignment::{
    decide, AssignmentKind, AssignmentOutcome, AssignmentPolicy, Decision, UnknownPolicy,
};
use crate::identity::domain::identity_registry::{IdentityRegistry, RegistryError};
use crate::placement::domain::placement::identity_folder;
use crate::shared::constants::UNKNOWN_LABEL;
use crate::shared::embedding::Embedding;

/// Identity registry shared by all sorting workers.
///
/// A single mutex covers the whole decide-then-create sequence, so two
/// workers seeing the same new person at once cannot both conclude "no
/// match" and create two identities. The lock is never held while
/// decoding, running models or writing files.
pub struct SharedRegistry {
    registry: Mutex<IdentityRegistry>,
    policy: AssignmentPolicy,
    output_root: PathBuf,
}

impl SharedRegistry {
    pub fn new(registry: IdentityRegistry, policy: AssignmentPolicy, output_root: PathBuf) -> Self {
        Self {
            registry: Mutex::new(registry),
            policy,
            output_root,
        }
    }

    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Assigns a face to an identity, creating one in clustering mode when
    /// nothing is within the threshold.
    pub fn assign(&self, embedding: &Embedding) -> Result<AssignmentOutcome, RegistryError> {
        let mut registry = self.lock()?;
        let outcome = match decide(embedding, &registry, &self.policy) {
            Decision::Match {
                label, distance, ..
            } => AssignmentOutcome {
                label: Some(label),
                distance: Some(distance),
                kind: AssignmentKind::MatchedExisting,
            },
            Decision::Create {
                label,
                nearest_distance,
            } => {
                let folder = identity_folder(&self.output_root, &label);
                registry.insert_discovered(&label, embedding.clone(), folder)?;
                log::info!("New identity {label}");
                AssignmentOutcome {
                    label: Some(label),
                    distance: nearest_distance,
                    kind: AssignmentKind::CreatedNew,
                }
            }
            Decision::NoMatch { nearest_distance } => AssignmentOutcome {
                label: match self.policy.unknown {
                    UnknownPolicy::Collect => Some(UNKNOWN_LABEL.to_string()),
                    UnknownPolicy::Skip => None,
                },
                distance: nearest_distance,
                kind: AssignmentKind::Unmatched,
            },
        };
        Ok(outcome)
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.lock()?.is_empty())
    }

    /// Labels in creation order.
    pub fn labels(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self
            .lock()?
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    pub fn into_inner(self) -> Result<IdentityRegistry, RegistryError> {
        self.registry.into_inner().map_err(|_| RegistryError::Poisoned)
    }

    fn lock(&self) -> Result<MutexGuard<'_, IdentityRegistry>, RegistryError> {
        self.registry.lock().map_err(|_| RegistryError::Poisoned)
    }
}
