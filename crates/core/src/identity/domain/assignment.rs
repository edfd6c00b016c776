//! Pure identity assignment: embedding + registry snapshot in, decision out.
//!
//! Nothing here mutates the registry or touches the filesystem; the
//! caller applies the decision.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::domain::identity::IdentityId;
use crate::identity::domain::identity_registry::IdentityRegistry;
use crate::shared::constants::DEFAULT_DISTANCE_THRESHOLD;
use crate::shared::embedding::Embedding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Closed set: only identities loaded from references.
    Supervised,
    /// Open set: unmatched faces become new identities.
    Clustering,
}

/// What supervised mode does with a face that matches no reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    Skip,
    /// Route the image to the `Unknown` folder.
    Collect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPolicy {
    pub mode: SortMode,
    pub threshold: f64,
    pub unknown: UnknownPolicy,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            mode: SortMode::Clustering,
            threshold: DEFAULT_DISTANCE_THRESHOLD,
            unknown: UnknownPolicy::Skip,
        }
    }
}

/// Outcome of comparing one face against the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Match {
        id: IdentityId,
        label: String,
        distance: f64,
    },
    /// Clustering mode: create `label` seeded with this embedding.
    Create {
        label: String,
        nearest_distance: Option<f64>,
    },
    /// Supervised mode: nobody is close enough.
    NoMatch { nearest_distance: Option<f64> },
}

/// Decides which identity `embedding` belongs to.
///
/// A face matches its nearest identity iff the distance is strictly below
/// the threshold.
pub fn decide(
    embedding: &Embedding,
    registry: &IdentityRegistry,
    policy: &AssignmentPolicy,
) -> Decision {
    let nearest = registry.lookup_nearest(embedding);
    let nearest_distance = nearest.as_ref().map(|n| n.distance);

    match nearest {
        Some(n) if n.distance < policy.threshold => Decision::Match {
            id: n.id,
            label: n.label,
            distance: n.distance,
        },
        _ => match policy.mode {
            SortMode::Clustering => Decision::Create {
                label: registry.next_cluster_label(),
                nearest_distance,
            },
            SortMode::Supervised => Decision::NoMatch { nearest_distance },
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    MatchedExisting,
    CreatedNew,
    Unmatched,
}

/// The applied result of a decision for one detected face.
///
/// `label` is `None` only for unmatched faces that are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub label: Option<String>,
    pub distance: Option<f64>,
    pub kind: AssignmentKind,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Supervised => write!(f, "supervised"),
            SortMode::Clustering => write!(f, "clustering"),
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supervised" => Ok(SortMode::Supervised),
            "clustering" | "cluster" => Ok(SortMode::Clustering),
            other => Err(format!(
                "mode must be 'supervised' or 'clustering', got '{other}'"
            )),
        }
    }
}

impl FromStr for UnknownPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(UnknownPolicy::Skip),
            "collect" => Ok(UnknownPolicy::Collect),
            other => Err(format!(
                "unknown faces policy must be 'skip' or 'collect', got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn emb(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    fn policy(mode: SortMode, threshold: f64) -> AssignmentPolicy {
        AssignmentPolicy {
            mode,
            threshold,
            unknown: UnknownPolicy::Skip,
        }
    }

    fn registry() -> IdentityRegistry {
        let mut registry = IdentityRegistry::new();
        registry
            .insert("alice", emb(&[0.0, 0.0]), PathBuf::from("alice"))
            .unwrap();
        registry
            .insert("bob", emb(&[1.0, 0.0]), PathBuf::from("bob"))
            .unwrap();
        registry
    }

    #[test]
    fn test_match_within_threshold() {
        let d = decide(&emb(&[0.1, 0.0]), &registry(), &policy(SortMode::Supervised, 0.6));
        match d {
            Decision::Match { label, id, .. } => {
                assert_eq!(label, "alice");
                assert_eq!(id, IdentityId(0));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn test_distance_equal_to_threshold_is_no_match() {
        let d = decide(&emb(&[0.0, 0.5]), &registry(), &policy(SortMode::Supervised, 0.5));
        assert_eq!(
            d,
            Decision::NoMatch {
                nearest_distance: Some(0.5)
            }
        );
    }

    #[test]
    fn test_clustering_creates_next_person() {
        let d = decide(&emb(&[5.0, 5.0]), &registry(), &policy(SortMode::Clustering, 0.6));
        assert!(matches!(d, Decision::Create { ref label, .. } if label == "Person_1"));
    }

    #[test]
    fn test_clustering_empty_registry_creates_first_person() {
        let d = decide(
            &emb(&[0.3, 0.3]),
            &IdentityRegistry::new(),
            &policy(SortMode::Clustering, 0.6),
        );
        assert_eq!(
            d,
            Decision::Create {
                label: "Person_1".into(),
                nearest_distance: None
            }
        );
    }

    #[test]
    fn test_supervised_never_creates() {
        let d = decide(
            &emb(&[0.3, 0.3]),
            &IdentityRegistry::new(),
            &policy(SortMode::Supervised, 0.6),
        );
        assert_eq!(
            d,
            Decision::NoMatch {
                nearest_distance: None
            }
        );
    }

    #[test]
    fn test_decide_does_not_mutate_registry() {
        let registry = registry();
        decide(&emb(&[9.0, 9.0]), &registry, &policy(SortMode::Clustering, 0.6));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Supervised".parse::<SortMode>(), Ok(SortMode::Supervised));
        assert_eq!("clustering".parse::<SortMode>(), Ok(SortMode::Clustering));
        assert!("open".parse::<SortMode>().is_err());
        assert_eq!("collect".parse::<UnknownPolicy>(), Ok(UnknownPolicy::Collect));
        assert!("keep".parse::<UnknownPolicy>().is_err());
    }
}
