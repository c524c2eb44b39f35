//! Versioned process registry.
//!
//! Each `create_process` call for an id appends a new, enabled version.
//! Existing versions are never rewritten; the only mutation is
//! Enabled -> Disabled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use restriction_engine::{
    ProcessDefinition, ProcessFullyQualifiedId, ProcessId, ProcessStatus, ProcessVersion,
    Restriction,
};

use crate::config::LedgerConfig;
use crate::error::RegistryError;

/// Record of a successful `create_process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCreated {
    pub id: ProcessId,
    pub version: ProcessVersion,
    /// True when this is the first version of `id`.
    pub is_new: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    config: LedgerConfig,
    processes: BTreeMap<ProcessId, BTreeMap<ProcessVersion, ProcessDefinition>>,
}

impl ProcessRegistry {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            processes: BTreeMap::new(),
        }
    }

    pub fn create_process(
        &mut self,
        id: ProcessId,
        restrictions: Vec<Restriction>,
    ) -> Result<ProcessCreated, RegistryError> {
        id.ensure_width(self.config.engine.process_identifier_width)?;
        self.check_restrictions(&restrictions)?;

        let version = match self.latest_version(&id) {
            Some(latest) => latest
                .checked_add(1)
                .ok_or_else(|| RegistryError::VersionOverflow(id.clone()))?,
            None => 1,
        };

        let versions = self.processes.entry(id.clone()).or_default();
        if versions.contains_key(&version) {
            return Err(RegistryError::AlreadyExists(ProcessFullyQualifiedId {
                id,
                version,
            }));
        }
        let definition = ProcessDefinition::new(id.clone(), version, restrictions);
        info!(
            process = %definition.qualified_id(),
            restrictions = definition.restrictions.len(),
            "Process created"
        );
        versions.insert(version, definition);

        Ok(ProcessCreated {
            id,
            version,
            is_new: version == 1,
        })
    }

    pub fn disable_process(
        &mut self,
        id: &ProcessId,
        version: ProcessVersion,
    ) -> Result<ProcessFullyQualifiedId, RegistryError> {
        let versions = self
            .processes
            .get_mut(id)
            .ok_or_else(|| RegistryError::NonExistingProcess(id.clone()))?;
        let definition = versions
            .get_mut(&version)
            .ok_or_else(|| RegistryError::InvalidVersion {
                id: id.clone(),
                version,
            })?;
        let qualified = definition.qualified_id();
        if !definition.is_enabled() {
            return Err(RegistryError::AlreadyDisabled(qualified));
        }
        definition.status = ProcessStatus::Disabled;
        info!(process = %qualified, "Process disabled");
        Ok(qualified)
    }

    /// Look up one version. Disabled versions are returned too; the
    /// evaluator is what refuses to run them.
    pub fn get(
        &self,
        id: &ProcessId,
        version: ProcessVersion,
    ) -> Result<&ProcessDefinition, RegistryError> {
        self.processes
            .get(id)
            .ok_or_else(|| RegistryError::NonExistingProcess(id.clone()))?
            .get(&version)
            .ok_or_else(|| RegistryError::InvalidVersion {
                id: id.clone(),
                version,
            })
    }

    pub fn latest_version(&self, id: &ProcessId) -> Option<ProcessVersion> {
        self.processes
            .get(id)
            .and_then(|versions| versions.keys().next_back().copied())
    }

    /// All versions of `id`, oldest first.
    pub fn versions(&self, id: &ProcessId) -> impl Iterator<Item = &ProcessDefinition> {
        self.processes
            .get(id)
            .into_iter()
            .flat_map(|versions| versions.values())
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    fn check_restrictions(&self, restrictions: &[Restriction]) -> Result<(), RegistryError> {
        let max = self.config.max_process_restrictions;
        if restrictions.len() > max {
            return Err(RegistryError::TooManyRestrictions {
                count: restrictions.len(),
                max,
            });
        }
        let max_depth = self.config.engine.max_restriction_depth;
        for (restriction_index, restriction) in restrictions.iter().enumerate() {
            let depth = restriction.depth();
            if depth > max_depth as usize {
                return Err(RegistryError::RestrictionsTooDeep {
                    restriction_index,
                    depth,
                    max: max_depth,
                });
            }
        }
        Ok(())
    }
}
