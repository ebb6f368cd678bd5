//! The read-only service lookup table.

use std::collections::HashMap;
use std::path::Path;

use crate::registry::descriptor::ServiceDescriptor;

/// Error type for registry construction.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read services file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse services file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid service descriptor: {0}")]
    Invalid(String),

    #[error("duplicate service name {0:?}")]
    Duplicate(String),
}

/// Read-only lookup table of service descriptors, keyed by name.
///
/// Built once at startup and shared immutably; concurrent lookups need no
/// synchronization.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Build a registry from a list of descriptors.
    ///
    /// Every descriptor is checked and names must be unique.
    pub fn new(descriptors: Vec<ServiceDescriptor>) -> Result<Self, RegistryError> {
        let mut services = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            descriptor.check().map_err(RegistryError::Invalid)?;
            let name = descriptor.name.clone();
            if services.insert(name.clone(), descriptor).is_some() {
                return Err(RegistryError::Duplicate(name));
            }
        }
        Ok(Self { services })
    }

    /// Load a registry from a JSON file containing an array of descriptors.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let descriptors: Vec<ServiceDescriptor> = serde_json::from_str(&content)?;
        Self::new(descriptors)
    }

    /// Look up a service by name. A miss is a normal outcome.
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Registered service names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All descriptors, sorted by name for stable output.
    pub fn descriptors(&self) -> Vec<&ServiceDescriptor> {
        let mut all: Vec<&ServiceDescriptor> = self.services.values().collect();
        all.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
