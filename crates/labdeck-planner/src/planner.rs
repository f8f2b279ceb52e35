//! The deck planner orchestrator.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use labdeck_capability::{CapabilityMapper, CapabilityMatch, SelectionPattern, assign_pipette, select_wells};
use labdeck_catalog::ResourceCatalog;
use labdeck_compat::{BindingLookup, BindingResolver, MigrationMode};
use labdeck_core::binding::{
    Binding, BindingMap, BindingMeta, BindingMetadata, ModuleAssignment, ValidationStatus,
    VisualizationData,
};
use labdeck_core::capability::VolumeRange;
use labdeck_core::deck;
use labdeck_core::finding::{Severity, ValidationFinding};
use labdeck_core::spec::{DeckSpec, RuntimeContext, SolverStrategy};
use labdeck_placement::{PlacementSolver, Solution};
use labdeck_validation::{DeckValidator, conflict_zones};

use crate::cache::{BindingCache, cache_key};
use crate::error::PlannerError;
use crate::execution::generate_execution_plan;

const SOLVER_VERSION: &str = "1.0.0";
const DEFAULT_PIPETTE_VOLUME: VolumeRange = VolumeRange {
    min_ul: 1.0,
    max_ul: 1000.0,
};

/// Planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub strategy: SolverStrategy,
    pub enable_validation: bool,
    pub enable_visualization: bool,
    pub cache_bindings: bool,
    /// Fixed RNG seed for the stochastic strategies.
    pub solver_seed: Option<u64>,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            strategy: SolverStrategy::Greedy,
            enable_validation: true,
            enable_visualization: true,
            cache_bindings: true,
            solver_seed: None,
        }
    }
}

/// Everything one `plan()` call produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningResult {
    pub binding_map: BindingMap,
    pub validation_results: Vec<ValidationFinding>,
    pub execution_time_ms: u64,
    pub success: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Session-scoped solved bindings, shared with resolvers through the
/// [`BindingLookup`] seam.
#[derive(Clone, Default)]
struct SessionBindings(Arc<RwLock<BTreeMap<String, Binding>>>);

impl BindingLookup for SessionBindings {
    fn binding(&self, role: &str) -> Option<Binding> {
        self.0.read().ok().and_then(|map| map.get(role).cloned())
    }
}

/// Sequences catalog lookups, capability mapping, placement solving,
/// binding construction, validation, and caching.
pub struct DeckPlanner {
    catalog: Arc<ResourceCatalog>,
    options: PlannerOptions,
    mapper: CapabilityMapper,
    solver: PlacementSolver,
    validator: DeckValidator,
    cache: BindingCache,
    session: SessionBindings,
}

impl DeckPlanner {
    pub fn new(catalog: Arc<ResourceCatalog>, options: PlannerOptions) -> Self {
        let mut solver = PlacementSolver::new(Arc::clone(&catalog), options.strategy);
        if let Some(seed) = options.solver_seed {
            solver = solver.with_seed(seed);
        }
        Self {
            mapper: CapabilityMapper::new(Arc::clone(&catalog)),
            solver,
            validator: DeckValidator::new(Arc::clone(&catalog)),
            cache: BindingCache::new(),
            session: SessionBindings::default(),
            catalog,
            options,
        }
    }

    pub fn with_defaults(catalog: Arc<ResourceCatalog>) -> Self {
        Self::new(catalog, PlannerOptions::default())
    }

    // ── Planning ───────────────────────────────────────────────────

    /// Plan a deck layout. Never returns an error and never panics its way
    /// out: every failure lands in the result's `errors` list with an
    /// empty-but-valid binding map.
    pub fn plan(&self, spec: &DeckSpec, runtime: Option<&RuntimeContext>) -> PlanningResult {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let key = cache_key(spec, runtime);
        if self.options.cache_bindings {
            if let Some(cached) = self.cache.get(&key) {
                debug!(%key, "cache hit");
                warnings.push("using cached binding result".to_string());
                return PlanningResult {
                    binding_map: (*cached).clone(),
                    validation_results: Vec::new(),
                    execution_time_ms: elapsed_ms(start),
                    success: true,
                    warnings,
                    errors,
                };
            }
        }

        if let Err(structural) = check_spec(spec, &mut warnings) {
            for message in structural {
                errors.push(message);
            }
            return PlanningResult {
                binding_map: self.empty_binding_map(),
                validation_results: Vec::new(),
                execution_time_ms: elapsed_ms(start),
                success: false,
                warnings,
                errors,
            };
        }

        match self.run_pipeline(spec, runtime, &mut errors) {
            Ok((binding_map, validation_results)) => {
                for finding in &validation_results {
                    match finding.severity {
                        Severity::Error => errors.push(finding.message.clone()),
                        Severity::Warning => warnings.push(finding.message.clone()),
                        Severity::Info => {}
                    }
                }
                let success = errors.is_empty();

                if success && self.options.cache_bindings {
                    self.cache.insert(key, binding_map.clone());
                }
                self.register_session_bindings(&binding_map);

                info!(
                    roles = binding_map.bindings.len(),
                    success,
                    errors = errors.len(),
                    warnings = warnings.len(),
                    "planning finished"
                );
                PlanningResult {
                    binding_map,
                    validation_results,
                    execution_time_ms: elapsed_ms(start),
                    success,
                    warnings,
                    errors,
                }
            }
            Err(failure) => {
                errors.push(format!("planning failed: {failure}"));
                PlanningResult {
                    binding_map: self.empty_binding_map(),
                    validation_results: Vec::new(),
                    execution_time_ms: elapsed_ms(start),
                    success: false,
                    warnings,
                    errors,
                }
            }
        }
    }

    /// The fallible middle of the pipeline. Unsatisfiable roles are recorded
    /// and planning continues for the rest; an empty solution aborts.
    fn run_pipeline(
        &self,
        spec: &DeckSpec,
        runtime: Option<&RuntimeContext>,
        errors: &mut Vec<String>,
    ) -> Result<(BindingMap, Vec<ValidationFinding>)> {
        let (matches, mut unsatisfiable) = self.map_roles(spec, runtime);

        let placements = self.solver.solve(spec, runtime);
        if placements.is_empty() {
            return Err(PlannerError::NoSolution.into());
        }

        // Roles the solver could not place (no capability-compatible
        // labware) are reported as planning errors, not a partial solution.
        for role_name in spec.roles.keys() {
            if !placements.contains_key(role_name) && !unsatisfiable.contains(role_name) {
                unsatisfiable.push(role_name.clone());
            }
        }
        if !unsatisfiable.is_empty() {
            unsatisfiable.sort();
            errors.push(PlannerError::UnsatisfiableRoles(unsatisfiable.join(", ")).to_string());
        }

        let mut binding_map = self.build_binding_map(spec, runtime, &placements, &matches);

        let validation_results = if self.options.enable_validation {
            self.validator.validate_binding(spec, &mut binding_map, runtime)
        } else {
            Vec::new()
        };

        binding_map.metadata.validation_status = status_from(&validation_results);
        if self.options.enable_visualization {
            binding_map.visualization = Some(VisualizationData {
                conflict_zones: conflict_zones(&validation_results, &binding_map),
                movement_paths: Vec::new(),
            });
        }

        Ok((binding_map, validation_results))
    }

    /// Best capability match per role, plus the roles with no viable match.
    fn map_roles(
        &self,
        spec: &DeckSpec,
        runtime: Option<&RuntimeContext>,
    ) -> (BTreeMap<String, CapabilityMatch>, Vec<String>) {
        let mut matches = BTreeMap::new();
        let mut unsatisfiable = Vec::new();

        for (role_name, role) in &spec.roles {
            let ranked = self.mapper.map_role_to_resources(role_name, role, runtime);
            match ranked.into_iter().next() {
                Some(best) if best.score > 0.0 => {
                    matches.insert(role_name.clone(), best);
                }
                _ => {
                    warn!(role = %role_name, "no compatible resources found");
                    unsatisfiable.push(role_name.clone());
                }
            }
        }

        (matches, unsatisfiable)
    }

    fn build_binding_map(
        &self,
        spec: &DeckSpec,
        runtime: Option<&RuntimeContext>,
        placements: &Solution,
        matches: &BTreeMap<String, CapabilityMatch>,
    ) -> BindingMap {
        let mut bindings = BTreeMap::new();
        let mut score_total = 0.0;

        for (role_name, candidate) in placements {
            let Some(capability_match) = matches.get(role_name) else { continue };
            let Some(labware) = self.catalog.labware(&candidate.labware_id) else { continue };
            let role = &spec.roles[role_name];
            score_total += candidate.score;

            let module = candidate
                .module_id
                .as_deref()
                .and_then(|id| self.catalog.module(id))
                .map(|entry| ModuleAssignment {
                    id: entry.id.clone(),
                    kind: entry.kind,
                });

            let pipette = capability_match.pipette_mount.and_then(|mount| {
                let runtime = runtime?;
                let channels = runtime
                    .available_pipettes
                    .iter()
                    .find(|p| p.mount == mount)
                    .map_or(1, |p| p.channels);
                assign_pipette(
                    runtime,
                    role.volume.unwrap_or(DEFAULT_PIPETTE_VOLUME),
                    channels,
                    Some(mount),
                )
            });

            let wells = labware
                .well_layout
                .as_ref()
                .map(|_| select_wells(labware, 1, SelectionPattern::Sequential, &[]));

            bindings.insert(
                role_name.clone(),
                Binding {
                    slot: candidate.slot,
                    labware: labware.descriptor(),
                    module,
                    pipette,
                    wells,
                    meta: BindingMeta {
                        capabilities_satisfied: capability_match.satisfied.clone(),
                        warnings: candidate.violations.clone(),
                    },
                },
            );
        }

        let optimization_score = if bindings.is_empty() {
            0.0
        } else {
            (score_total / (bindings.len() as f64 * 100.0)).clamp(0.0, 1.0)
        };

        let mut binding_map = BindingMap {
            bindings,
            execution_plan: None,
            visualization: None,
            metadata: BindingMetadata {
                created_at: unix_now(),
                solver_version: SOLVER_VERSION.into(),
                solver_strategy: self.options.strategy,
                optimization_score,
                validation_status: ValidationStatus::Valid,
            },
        };
        binding_map.execution_plan = Some(generate_execution_plan(&binding_map));
        binding_map
    }

    fn empty_binding_map(&self) -> BindingMap {
        BindingMap {
            bindings: BTreeMap::new(),
            execution_plan: None,
            visualization: None,
            metadata: BindingMetadata {
                created_at: unix_now(),
                solver_version: SOLVER_VERSION.into(),
                solver_strategy: self.options.strategy,
                optimization_score: 0.0,
                validation_status: ValidationStatus::Valid,
            },
        }
    }

    fn register_session_bindings(&self, binding_map: &BindingMap) {
        if let Ok(mut session) = self.session.0.write() {
            for (role, binding) in &binding_map.bindings {
                session.insert(role.clone(), binding.clone());
            }
        }
    }

    // ── Public accessors ───────────────────────────────────────────

    /// Solved binding for a role from the current session.
    pub fn binding(&self, role: &str) -> Option<Binding> {
        self.session.binding(role)
    }

    /// Register a binding for later role-based resolution.
    pub fn set_session_binding(&self, role: impl Into<String>, binding: Binding) {
        if let Ok(mut session) = self.session.0.write() {
            session.insert(role.into(), binding);
        }
    }

    pub fn clear_session_bindings(&self) {
        if let Ok(mut session) = self.session.0.write() {
            session.clear();
        }
    }

    /// A resolver wired to this planner's session bindings.
    pub fn resolver(&self, mode: MigrationMode) -> BindingResolver {
        BindingResolver::new(
            Arc::clone(&self.catalog),
            Some(Arc::new(self.session.clone())),
            mode,
        )
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.catalog
    }
}

/// Structural spec validation: non-empty roles and in-bounds fixed slots
/// abort; missing version and capability-less roles only warn.
fn check_spec(spec: &DeckSpec, warnings: &mut Vec<String>) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if spec.roles.is_empty() {
        errors.push(PlannerError::EmptySpec.to_string());
    }
    if spec.version.is_none() {
        warnings.push("no version specified, assuming 1.0".to_string());
    }

    for (role_name, role) in &spec.roles {
        if role.capabilities.is_empty() {
            warnings.push(format!("role {role_name} has no capabilities defined"));
        }
        if let Some(slot) = role.constraints.as_ref().and_then(|c| c.fixed_slot) {
            if !deck::valid_slot(slot) {
                errors.push(
                    PlannerError::InvalidFixedSlot {
                        role: role_name.clone(),
                        slot,
                    }
                    .to_string(),
                );
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn status_from(findings: &[ValidationFinding]) -> ValidationStatus {
    if findings.iter().any(|f| f.severity == Severity::Error) {
        ValidationStatus::Errors
    } else if findings.iter().any(|f| f.severity == Severity::Warning) {
        ValidationStatus::Warnings
    } else {
        ValidationStatus::Valid
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
