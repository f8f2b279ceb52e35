//! The validation pipeline.

use std::sync::Arc;

use tracing::debug;

use labdeck_catalog::ResourceCatalog;
use labdeck_core::binding::{Binding, BindingMap, ExecutionPlan};
use labdeck_core::capability::CapabilityKind;
use labdeck_core::deck::{self, SLOT_COUNT};
use labdeck_core::finding::{Severity, ValidationFinding, ValidationKind};
use labdeck_core::spec::{DeckSpec, RoleSpec, RuntimeContext};

use crate::conflict::overall_risk;
use crate::geometry::{CollisionBox, box_collision, box_distance};

/// Clearance and limit thresholds, in the units noted. Empirically chosen
/// for the reference deck; kept verbatim.
pub const COLLISION_CLEARANCE_MM: f64 = 5.0;
pub const MAX_STACK_HEIGHT_MM: f64 = 150.0;
pub const OBSTRUCTION_HEIGHT_MM: f64 = 50.0;
pub const LID_CLEARANCE_MM: f64 = 100.0;
pub const COOLING_AIRFLOW_MM: f64 = 30.0;
pub const CONTAMINATION_DISTANCE_MM: f64 = 200.0;
pub const UTILIZATION_WARNING_PCT: f64 = 90.0;

/// Runs every check over a completed binding map.
#[derive(Debug, Clone)]
pub struct DeckValidator {
    catalog: Arc<ResourceCatalog>,
}

impl DeckValidator {
    pub fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self { catalog }
    }

    /// Validate a binding map against its spec and the runtime snapshot.
    ///
    /// Pure over its inputs except for one write: the aggregate collision
    /// risk is recorded on the binding map's execution plan (a default plan
    /// is created when none exists).
    pub fn validate_binding(
        &self,
        spec: &DeckSpec,
        binding_map: &mut BindingMap,
        _runtime: Option<&RuntimeContext>,
    ) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        findings.extend(self.check_collisions(binding_map));
        findings.extend(self.check_accessibility(binding_map));
        findings.extend(self.check_volume(spec, binding_map));
        findings.extend(self.check_temperature(spec, binding_map));
        findings.extend(self.check_contamination(spec, binding_map));
        findings.extend(self.check_capacity(binding_map));
        findings.extend(self.check_compatibility(binding_map));

        let risk = overall_risk(&findings);
        binding_map
            .execution_plan
            .get_or_insert_with(ExecutionPlan::default)
            .collision_risk = risk;

        debug!(
            findings = findings.len(),
            errors = findings.iter().filter(|f| f.severity == Severity::Error).count(),
            ?risk,
            "binding map validated"
        );
        findings
    }

    /// Total stack height for a binding: labware plus module offset.
    fn stack_height_mm(&self, binding: &Binding) -> f64 {
        let module_offset = binding
            .module
            .as_ref()
            .and_then(|m| self.catalog.module(&m.id))
            .map_or(0.0, |m| m.height_offset_mm);
        binding.labware.dimensions.z_mm + module_offset
    }

    // ── Collision ──────────────────────────────────────────────────

    fn check_collisions(&self, binding_map: &BindingMap) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        let boxes: Vec<CollisionBox> = binding_map
            .bindings
            .iter()
            .filter_map(|(role, binding)| {
                CollisionBox::for_slot(
                    binding.slot,
                    role,
                    binding.labware.dimensions.x_mm,
                    binding.labware.dimensions.y_mm,
                    self.stack_height_mm(binding),
                )
            })
            .collect();

        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let (a, b) = (&boxes[i], &boxes[j]);
                if box_collision(a, b) {
                    findings.push(
                        ValidationFinding::error(
                            ValidationKind::Collision,
                            format!(
                                "physical collision between {} (slot {}) and {} (slot {})",
                                a.role, a.slot, b.role, b.slot
                            ),
                        )
                        .with_roles([a.role.clone(), b.role.clone()])
                        .with_fix("move one of the items to a different slot with adequate clearance"),
                    );
                } else {
                    let distance = box_distance(a, b);
                    if distance < COLLISION_CLEARANCE_MM {
                        findings.push(
                            ValidationFinding::warning(
                                ValidationKind::Collision,
                                format!(
                                    "insufficient clearance ({distance:.1} mm) between {} and {}",
                                    a.role, b.role
                                ),
                            )
                            .with_roles([a.role.clone(), b.role.clone()])
                            .with_fix(format!(
                                "ensure at least {COLLISION_CLEARANCE_MM} mm clearance between objects"
                            )),
                        );
                    }
                }
            }
        }

        for item in &boxes {
            if item.top_mm() > MAX_STACK_HEIGHT_MM {
                findings.push(
                    ValidationFinding::error(
                        ValidationKind::Collision,
                        format!(
                            "total height ({:.1} mm) exceeds maximum deck height ({MAX_STACK_HEIGHT_MM} mm) for {} in slot {}",
                            item.top_mm(),
                            item.role,
                            item.slot
                        ),
                    )
                    .with_roles([item.role.clone()])
                    .with_fix("use a labware or module combination with lower height"),
                );
            }
        }

        findings
    }

    // ── Accessibility ──────────────────────────────────────────────

    fn check_accessibility(&self, binding_map: &BindingMap) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for (role, binding) in &binding_map.bindings {
            if let Some(pipette) = &binding.pipette {
                if !deck::reachable(pipette.mount, binding.slot) {
                    let reachable: Vec<String> = deck::reach_slots(pipette.mount)
                        .iter()
                        .map(|s| s.to_string())
                        .collect();
                    findings.push(
                        ValidationFinding::error(
                            ValidationKind::Accessibility,
                            format!(
                                "{:?} pipette cannot reach slot {} for {role}",
                                pipette.mount, binding.slot
                            ),
                        )
                        .with_roles([role.clone()])
                        .with_fix(format!(
                            "move to a slot the pipette can reach: {}",
                            reachable.join(", ")
                        )),
                    );
                }
            }

            let obstructions = self.access_obstructions(role, binding, binding_map);
            if !obstructions.is_empty() {
                let mut affected = vec![role.clone()];
                affected.extend(obstructions);
                findings.push(
                    ValidationFinding::warning(
                        ValidationKind::Accessibility,
                        format!(
                            "potential access obstruction for {role} in slot {}; nearby tall items may interfere with pipette movement",
                            binding.slot
                        ),
                    )
                    .with_roles(affected)
                    .with_fix("consider relocating nearby tall objects or modules"),
                );
            }

            if binding.module.is_some() {
                let available = MAX_STACK_HEIGHT_MM - self.stack_height_mm(binding);
                if available < LID_CLEARANCE_MM {
                    findings.push(
                        ValidationFinding::warning(
                            ValidationKind::Accessibility,
                            format!(
                                "insufficient lid clearance for {role}: need {LID_CLEARANCE_MM} mm, have {available:.1} mm"
                            ),
                        )
                        .with_roles([role.clone()])
                        .with_fix("ensure adequate clearance above modules for lid operation"),
                    );
                }
            }
        }

        findings
    }

    /// Roles in adjacent slots whose stack exceeds the obstruction height.
    fn access_obstructions(
        &self,
        role: &str,
        binding: &Binding,
        binding_map: &BindingMap,
    ) -> Vec<String> {
        let neighbors = deck::adjacent_slots(binding.slot);
        binding_map
            .bindings
            .iter()
            .filter(|(other_role, _)| other_role.as_str() != role)
            .filter(|(_, other)| neighbors.contains(&other.slot))
            .filter(|(_, other)| self.stack_height_mm(other) > OBSTRUCTION_HEIGHT_MM)
            .map(|(other_role, _)| other_role.clone())
            .collect()
    }

    // ── Volume ─────────────────────────────────────────────────────

    fn check_volume(&self, spec: &DeckSpec, binding_map: &BindingMap) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for (role_name, role) in &spec.roles {
            let Some(binding) = binding_map.bindings.get(role_name) else { continue };
            let Some(volume) = &role.volume else { continue };
            let Some(layout) = self
                .catalog
                .labware(&binding.labware.id)
                .and_then(|l| l.well_layout.as_ref())
            else {
                continue;
            };

            let total = layout.total_capacity_ul();
            if total < volume.min_ul {
                findings.push(
                    ValidationFinding::error(
                        ValidationKind::Volume,
                        format!(
                            "insufficient volume capacity for {role_name}: need {} µL, labware provides {total} µL",
                            volume.min_ul
                        ),
                    )
                    .with_roles([role_name.clone()])
                    .with_fix("select a labware with higher volume capacity"),
                );
            }
            if layout.well_volume_ul > volume.max_ul {
                findings.push(
                    ValidationFinding::warning(
                        ValidationKind::Volume,
                        format!(
                            "well volume ({} µL) exceeds maximum requirement ({} µL) for {role_name}",
                            layout.well_volume_ul, volume.max_ul
                        ),
                    )
                    .with_roles([role_name.clone()])
                    .with_fix("consider a labware with smaller wells to minimize waste"),
                );
            }
        }

        findings
    }

    // ── Temperature ────────────────────────────────────────────────

    fn check_temperature(
        &self,
        spec: &DeckSpec,
        binding_map: &BindingMap,
    ) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for (role_name, role) in &spec.roles {
            let Some(binding) = binding_map.bindings.get(role_name) else { continue };

            let needs_temperature = needs_temperature_control(role);
            let constraint_range = role.constraints.as_ref().and_then(|c| c.temperature);

            if (needs_temperature || constraint_range.is_some()) && binding.module.is_none() {
                findings.push(
                    ValidationFinding::error(
                        ValidationKind::Temperature,
                        format!(
                            "temperature control required for {role_name} but no temperature module assigned"
                        ),
                    )
                    .with_roles([role_name.clone()])
                    .with_fix("assign a temperature module or move to a slot with one"),
                );
            }

            if let (Some(range), Some(module)) = (constraint_range, &binding.module) {
                if let Some(module_range) = self
                    .catalog
                    .module(&module.id)
                    .and_then(|m| m.temperature_range)
                {
                    if !module_range.covers(&range) {
                        findings.push(
                            ValidationFinding::error(
                                ValidationKind::Temperature,
                                format!(
                                    "temperature range ({}–{} °C) for {role_name} exceeds module capability ({}–{} °C)",
                                    range.min_c, range.max_c, module_range.min_c, module_range.max_c
                                ),
                            )
                            .with_roles([role_name.clone()])
                            .with_fix("use a different module or adjust the temperature requirements"),
                        );
                    }
                }
            }

            if binding
                .module
                .as_ref()
                .is_some_and(|m| m.kind.is_temperature_module())
            {
                let nearby = nearby_temperature_modules(role_name, binding, binding_map);
                if !nearby.is_empty() {
                    let mut affected = vec![role_name.clone()];
                    affected.extend(nearby);
                    findings.push(
                        ValidationFinding::warning(
                            ValidationKind::Temperature,
                            format!(
                                "temperature module for {role_name} may be affected by nearby temperature modules"
                            ),
                        )
                        .with_roles(affected)
                        .with_fix(format!(
                            "ensure {COOLING_AIRFLOW_MM} mm airflow clearance around temperature modules"
                        )),
                    );
                }
            }
        }

        findings
    }

    // ── Contamination ──────────────────────────────────────────────

    fn check_contamination(
        &self,
        spec: &DeckSpec,
        binding_map: &BindingMap,
    ) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        let mut waste_roles = Vec::new();
        let mut sample_roles = Vec::new();
        for (role_name, role) in &spec.roles {
            if role
                .capabilities
                .iter()
                .any(|c| c.kind == CapabilityKind::Waste)
            {
                waste_roles.push(role_name);
            } else if role.description.to_lowercase().contains("sample") {
                sample_roles.push(role_name);
            }
        }

        for waste in &waste_roles {
            let Some(waste_binding) = binding_map.bindings.get(*waste) else { continue };
            for sample in &sample_roles {
                let Some(sample_binding) = binding_map.bindings.get(*sample) else { continue };
                let distance = deck::slot_distance_mm(waste_binding.slot, sample_binding.slot)
                    .unwrap_or(0.0);
                if distance < CONTAMINATION_DISTANCE_MM {
                    findings.push(
                        ValidationFinding::warning(
                            ValidationKind::Contamination,
                            format!(
                                "waste container ({waste}) is too close to samples ({sample}): {distance:.1} mm"
                            ),
                        )
                        .with_roles([waste.to_string(), sample.to_string()])
                        .with_fix(
                            "increase separation between waste and sample containers to reduce contamination risk",
                        ),
                    );
                }
            }
        }

        findings
    }

    // ── Capacity ───────────────────────────────────────────────────

    fn check_capacity(&self, binding_map: &BindingMap) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        let used = binding_map.bindings.len() as f64;
        let utilization = used / f64::from(SLOT_COUNT) * 100.0;
        if utilization > UTILIZATION_WARNING_PCT {
            findings.push(
                ValidationFinding::warning(
                    ValidationKind::Capacity,
                    format!(
                        "high deck utilization ({utilization:.1}%); may limit workflow flexibility"
                    ),
                )
                .with_fix("consider consolidating roles or using multi-purpose labware"),
            );
        }

        let mut tip_racks_needed = 0u32;
        let mut tip_racks_available = 0u32;
        for binding in binding_map.bindings.values() {
            if binding.pipette.is_some() {
                tip_racks_needed += 1;
            }
            if self.catalog.labware(&binding.labware.id).is_some_and(|l| {
                l.capabilities
                    .iter()
                    .any(|c| c.kind == CapabilityKind::TipRack)
            }) {
                tip_racks_available += 1;
            }
        }
        if tip_racks_needed > tip_racks_available {
            findings.push(
                ValidationFinding::error(
                    ValidationKind::Capacity,
                    format!(
                        "insufficient tip racks: need {tip_racks_needed}, have {tip_racks_available}"
                    ),
                )
                .with_fix("add tip rack roles or use multi-channel pipettes to reduce tip usage"),
            );
        }

        findings
    }

    // ── Compatibility ──────────────────────────────────────────────

    fn check_compatibility(&self, binding_map: &BindingMap) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for (role, binding) in &binding_map.bindings {
            if let Some(module) = &binding.module {
                let known = self.catalog.labware(&binding.labware.id).is_some();
                if known
                    && !self
                        .catalog
                        .is_labware_module_compatible(&binding.labware.id, module.kind)
                {
                    findings.push(
                        ValidationFinding::error(
                            ValidationKind::Compatibility,
                            format!(
                                "labware {} is not compatible with {:?} for {role}",
                                binding.labware.display_name, module.kind
                            ),
                        )
                        .with_roles([role.clone()])
                        .with_fix("select a labware compatible with the required module"),
                    );
                }
            }

            if binding.pipette.is_some() {
                let issues = self.well_reach_issues(binding);
                if !issues.is_empty() {
                    findings.push(
                        ValidationFinding::warning(
                            ValidationKind::Compatibility,
                            format!("pipette reachability issues for {role}: {}", issues.join(", ")),
                        )
                        .with_roles([role.clone()])
                        .with_fix("verify the pipette can access all selected wells"),
                    );
                }
            }
        }

        findings
    }

    /// Selected wells the assigned pipette cannot span.
    fn well_reach_issues(&self, binding: &Binding) -> Vec<String> {
        let mut issues = Vec::new();
        let (Some(pipette), Some(wells)) = (&binding.pipette, &binding.wells) else {
            return issues;
        };
        let Some(layout) = self
            .catalog
            .labware(&binding.labware.id)
            .and_then(|l| l.well_layout.as_ref())
        else {
            return issues;
        };

        if pipette.model.contains("multi") {
            for well in &wells.specific {
                let row = (well.chars().next().map_or(0, |c| c as u32)).saturating_sub('A' as u32);
                if row >= 8 {
                    issues.push("8-channel pipette cannot access wells beyond row H".to_string());
                    break;
                }
            }
        }

        let max_column = wells
            .specific
            .iter()
            .filter_map(|w| w[1..].parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        if max_column > layout.columns {
            issues.push(format!(
                "selected wells exceed labware column count ({})",
                layout.columns
            ));
        }

        issues
    }
}

/// Temperature-flavored capability kinds that demand a module.
fn needs_temperature_control(role: &RoleSpec) -> bool {
    role.capabilities.iter().any(|c| {
        matches!(
            c.kind,
            CapabilityKind::TemperatureControl | CapabilityKind::Heating | CapabilityKind::Cooling
        )
    })
}

/// Roles in adjacent slots whose binding also carries a temperature module.
fn nearby_temperature_modules(
    role: &str,
    binding: &Binding,
    binding_map: &BindingMap,
) -> Vec<String> {
    let neighbors = deck::adjacent_slots(binding.slot);
    binding_map
        .bindings
        .iter()
        .filter(|(other_role, _)| other_role.as_str() != role)
        .filter(|(_, other)| neighbors.contains(&other.slot))
        .filter(|(_, other)| {
            other
                .module
                .as_ref()
                .is_some_and(|m| m.kind.is_temperature_module())
        })
        .map(|(other_role, _)| other_role.clone())
        .collect()
}
