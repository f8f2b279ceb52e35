//! Candidate enumeration and match scoring.

use std::sync::Arc;

use tracing::debug;

use labdeck_catalog::ResourceCatalog;
use labdeck_core::capability::{CapabilityKind, Mount};
use labdeck_core::spec::{InstalledModule, PipetteSpec, RoleSpec, RuntimeContext};

use crate::requirement::ResourceRequirement;

/// Match score bounds and adjustments.
const BASE_SCORE: f64 = 100.0;
const MISSING_CRITICAL_PENALTY: f64 = 30.0;
const MISSING_PENALTY: f64 = 10.0;
const PREFERRED_LABWARE_BONUS: f64 = 20.0;
const STANDARD_FORMAT_BONUS: f64 = 5.0;
const STANDARD_WELL_COUNT: u32 = 96;

/// One scored (labware, module, pipette) combination for a role.
///
/// A score of zero signals "no compatible resource" — such matches are still
/// returned so the solver can treat the role as unsatisfiable instead of
/// silently skipping it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityMatch {
    pub labware_id: String,
    pub module_id: Option<String>,
    pub pipette_mount: Option<Mount>,
    pub score: f64,
    pub satisfied: Vec<CapabilityKind>,
    pub missing: Vec<CapabilityKind>,
}

/// Maps roles to ranked resource combinations against a shared catalog.
#[derive(Debug, Clone)]
pub struct CapabilityMapper {
    catalog: Arc<ResourceCatalog>,
}

impl CapabilityMapper {
    pub fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self { catalog }
    }

    /// Rank every candidate combination for `role`, best first.
    pub fn map_role_to_resources(
        &self,
        role_name: &str,
        role: &RoleSpec,
        runtime: Option<&RuntimeContext>,
    ) -> Vec<CapabilityMatch> {
        let requirement = ResourceRequirement::for_role(role);

        let labware_ids = self.candidate_labware(role, &requirement);
        let modules = self.candidate_modules(role, &requirement, runtime);
        let pipettes = candidate_pipettes(role, &requirement, runtime);

        let mut matches = Vec::new();
        for labware_id in &labware_ids {
            for module in &modules {
                for pipette in &pipettes {
                    matches.push(self.score_combination(
                        role,
                        labware_id,
                        module.as_ref(),
                        pipette.as_ref(),
                    ));
                }
            }
        }

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!(
            role = role_name,
            candidates = matches.len(),
            best = matches.first().map(|m| m.score),
            "role mapped to resources"
        );
        matches
    }

    /// Labware candidates: explicit options first, capability query second,
    /// volume-filtered when a window applies, all labware as a last resort
    /// when labware is required but nothing matched.
    fn candidate_labware(&self, role: &RoleSpec, requirement: &ResourceRequirement) -> Vec<String> {
        let mut ids: Vec<String> = if requirement.labware.options.is_empty() {
            self.catalog
                .find_labware_by_capabilities(&role.capabilities)
                .into_iter()
                .map(|l| l.id.clone())
                .collect()
        } else {
            let mut options = requirement.labware.options.clone();
            options.dedup();
            options
        };

        if let Some(volume) = requirement.labware.volume {
            let in_range: Vec<String> = self
                .catalog
                .find_labware_by_volume(volume.min_ul, volume.max_ul)
                .into_iter()
                .map(|l| l.id.clone())
                .collect();
            ids.retain(|id| in_range.contains(id));
        }

        if ids.is_empty() && requirement.labware.required {
            ids = self.catalog.all_labware().map(|l| l.id.clone()).collect();
        }

        ids
    }

    /// Installed modules matching the required kind and the role's
    /// module-flavored capabilities. `None` stands for "no module" so the
    /// Cartesian product always forms.
    fn candidate_modules(
        &self,
        role: &RoleSpec,
        requirement: &ResourceRequirement,
        runtime: Option<&RuntimeContext>,
    ) -> Vec<Option<InstalledModule>> {
        if !requirement.module.required {
            return vec![None];
        }
        let Some(runtime) = runtime else {
            return vec![None];
        };

        let module_needs: Vec<_> = role
            .capabilities
            .iter()
            .filter(|c| c.kind.is_module_flavored())
            .cloned()
            .collect();

        let matching: Vec<Option<InstalledModule>> = runtime
            .installed_modules
            .iter()
            .filter(|installed| {
                requirement
                    .module
                    .kind
                    .is_none_or(|kind| installed.kind == kind)
            })
            .filter(|installed| {
                module_needs
                    .iter()
                    .all(|need| need.satisfied_by_any(&installed.capabilities))
            })
            .cloned()
            .map(Some)
            .collect();

        if matching.is_empty() { vec![None] } else { matching }
    }

    fn score_combination(
        &self,
        role: &RoleSpec,
        labware_id: &str,
        module: Option<&InstalledModule>,
        pipette: Option<&PipetteSpec>,
    ) -> CapabilityMatch {
        let mut result = CapabilityMatch {
            labware_id: labware_id.to_string(),
            module_id: module.map(|m| m.id.clone()),
            pipette_mount: pipette.map(|p| p.mount),
            score: 0.0,
            satisfied: Vec::new(),
            missing: Vec::new(),
        };

        let Some(labware) = self.catalog.labware(labware_id) else {
            // Unknown id (e.g. a preferred labware not in the catalog):
            // nothing is satisfiable.
            result.missing = role.capabilities.iter().map(|c| c.kind).collect();
            return result;
        };

        for capability in &role.capabilities {
            let by_labware = labware
                .capabilities
                .iter()
                .any(|c| c.kind == capability.kind);
            let by_module = module
                .is_some_and(|m| m.capabilities.iter().any(|c| c.kind == capability.kind));
            let by_pipette = pipette.is_some_and(|p| match capability.kind {
                CapabilityKind::MultiChannelAccessible => p.channels == 8,
                CapabilityKind::SingleChannelAccessible => p.channels == 1,
                CapabilityKind::Mixing => true,
                _ => false,
            });

            if by_labware || by_module || by_pipette {
                result.satisfied.push(capability.kind);
            } else {
                result.missing.push(capability.kind);
            }
        }

        let mut score = BASE_SCORE;
        for missing in &result.missing {
            score -= if missing.is_critical() {
                MISSING_CRITICAL_PENALTY
            } else {
                MISSING_PENALTY
            };
        }
        if role.prefers(labware_id) {
            score += PREFERRED_LABWARE_BONUS;
        }
        if labware
            .well_layout
            .as_ref()
            .is_some_and(|w| w.well_count() == STANDARD_WELL_COUNT)
        {
            score += STANDARD_FORMAT_BONUS;
        }

        result.score = score.clamp(0.0, 100.0);
        result
    }
}

fn candidate_pipettes(
    role: &RoleSpec,
    requirement: &ResourceRequirement,
    runtime: Option<&RuntimeContext>,
) -> Vec<Option<PipetteSpec>> {
    if !requirement.pipette.required {
        return vec![None];
    }
    let Some(runtime) = runtime else {
        return vec![None];
    };

    let matching: Vec<Option<PipetteSpec>> = runtime
        .available_pipettes
        .iter()
        .filter(|p| {
            requirement
                .pipette
                .channels
                .is_none_or(|channels| p.channels == channels)
        })
        .filter(|p| requirement.pipette.mount.is_none_or(|mount| p.mount == mount))
        .filter(|p| {
            requirement
                .pipette
                .volume
                .is_none_or(|v| p.min_volume_ul <= v.min_ul && p.max_volume_ul >= v.max_ul)
        })
        .filter(|p| {
            role.volume
                .is_none_or(|v| p.min_volume_ul <= v.min_ul && p.max_volume_ul >= v.max_ul)
        })
        .cloned()
        .map(Some)
        .collect();

    if matching.is_empty() { vec![None] } else { matching }
}
