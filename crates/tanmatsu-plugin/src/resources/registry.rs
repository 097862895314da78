//! Exclusive resource claims keyed by (kind, index).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Kinds of exclusive hardware resources plugins can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ResourceKind {
    /// One pixel of the addressable LED strip.
    Led,
}

impl ResourceKind {
    /// Returns the string name of this resource kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Led => "led",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry of exclusive claims. At most one owner per (kind, index).
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    /// (kind, index) → owning plugin slug.
    claims: HashMap<(ResourceKind, u32), String>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a resource for `owner`.
    ///
    /// Returns `false` if another owner holds it. Re-claiming a resource
    /// already held by `owner` succeeds.
    pub fn claim(&mut self, kind: ResourceKind, index: u32, owner: &str) -> bool {
        match self.claims.get(&(kind, index)) {
            Some(current) if current == owner => true,
            Some(current) => {
                warn!(
                    plugin = %owner,
                    resource = %kind,
                    index,
                    owner = %current,
                    "Claim denied; resource already owned"
                );
                false
            }
            None => {
                self.claims.insert((kind, index), owner.to_string());
                info!(plugin = %owner, resource = %kind, index, "Resource claimed");
                true
            }
        }
    }

    /// Releases a resource held by `owner`. Returns `false` if `owner` does
    /// not hold it.
    pub fn release(&mut self, kind: ResourceKind, index: u32, owner: &str) -> bool {
        match self.claims.get(&(kind, index)) {
            Some(current) if current == owner => {
                self.claims.remove(&(kind, index));
                info!(plugin = %owner, resource = %kind, index, "Resource released");
                true
            }
            _ => {
                warn!(
                    plugin = %owner,
                    resource = %kind,
                    index,
                    "Attempted to release a resource not owned by the caller"
                );
                false
            }
        }
    }

    /// Releases everything held by `owner` and returns what was released,
    /// sorted by kind and index.
    pub fn force_release_all(&mut self, owner: &str) -> Vec<(ResourceKind, u32)> {
        let mut released: Vec<(ResourceKind, u32)> = self
            .claims
            .iter()
            .filter(|(_, o)| o.as_str() == owner)
            .map(|(key, _)| *key)
            .collect();
        released.sort();

        for key in &released {
            self.claims.remove(key);
        }

        if !released.is_empty() {
            info!(plugin = %owner, count = released.len(), "Resources force-released");
        }

        released
    }

    /// Returns the current owner of a resource.
    pub fn owner_of(&self, kind: ResourceKind, index: u32) -> Option<&str> {
        self.claims.get(&(kind, index)).map(|o| o.as_str())
    }

    /// Returns everything held by `owner`, sorted.
    pub fn claims_of(&self, owner: &str) -> Vec<(ResourceKind, u32)> {
        let mut held: Vec<(ResourceKind, u32)> = self
            .claims
            .iter()
            .filter(|(_, o)| o.as_str() == owner)
            .map(|(key, _)| *key)
            .collect();
        held.sort();
        held
    }

    /// Total number of active claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Returns whether nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
