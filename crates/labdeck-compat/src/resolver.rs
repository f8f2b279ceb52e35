//! The binding resolver.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use labdeck_catalog::ResourceCatalog;
use labdeck_core::binding::{
    Binding, LabwareDescriptor, ModuleAssignment, PipetteAssignment, WellSelection,
};
use labdeck_core::capability::{Capability, CapabilityKind};
use labdeck_core::deck::Dimensions;
use labdeck_core::finding::Severity;
use labdeck_core::spec::{
    DeckSpec, OptimizationConfig, OptimizationPriority, ProtocolInfo, RoleConstraints, RoleSpec,
};

use crate::error::{ResolutionError, ResolveResult};
use crate::legacy;

/// Narrow lookup interface onto the planner's solved bindings. Injected at
/// construction so the resolver never holds a back-pointer to the planner.
pub trait BindingLookup: Send + Sync {
    fn binding(&self, role: &str) -> Option<Binding>;
}

/// How a resolve request addresses the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressingKind {
    #[serde(rename = "legacy")]
    Legacy,
    #[serde(rename = "role-based")]
    RoleBased,
    #[serde(rename = "hybrid")]
    Hybrid,
}

/// How loudly migration hints are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    /// Collect hints without logging them.
    Silent,
    /// Log hints and continue.
    #[default]
    Warning,
    /// Error-level hints fail the resolve.
    Strict,
}

/// One side of a transfer, in either addressing style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSpec {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub well_selection: Option<WellSelection>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slot: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub labware: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wells: Option<Vec<String>>,
}

/// A source/destination pair to resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Explicit addressing override; auto-detected when absent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<AddressingKind>,
    pub source: LocationSpec,
    pub destination: LocationSpec,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_ul: Option<f64>,
}

/// A fully resolved deck location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub slot: u32,
    pub labware: LabwareDescriptor,
    pub wells: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub module: Option<ModuleAssignment>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pipette: Option<PipetteAssignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationReadiness {
    Ready,
    Partial,
    NotReady,
}

/// Both sides resolved plus migration metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBinding {
    pub source: ResolvedLocation,
    pub destination: ResolvedLocation,
    pub input_kind: AddressingKind,
    pub migration_ready: MigrationReadiness,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub migration_progress_pct: Option<u32>,
    pub optimized: bool,
}

/// Guidance emitted while resolving legacy inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationHint {
    pub level: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggestion: Option<RoleSuggestion>,
}

/// A role definition sketch suggested for a legacy input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSuggestion {
    pub role_id: String,
    pub description: String,
    pub capabilities: Vec<CapabilityKind>,
}

/// Fallback footprint for labware the catalog does not know.
const PLACEHOLDER_DIMENSIONS: Dimensions = Dimensions {
    x_mm: 127.76,
    y_mm: 85.48,
    z_mm: 14.22,
};

/// Resolves location pairs against the catalog and the solved bindings.
pub struct BindingResolver {
    catalog: Arc<ResourceCatalog>,
    lookup: Option<Arc<dyn BindingLookup>>,
    mode: MigrationMode,
    hints: Vec<MigrationHint>,
    session_bindings: BTreeMap<String, Binding>,
}

impl BindingResolver {
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        lookup: Option<Arc<dyn BindingLookup>>,
        mode: MigrationMode,
    ) -> Self {
        Self {
            catalog,
            lookup,
            mode,
            hints: Vec::new(),
            session_bindings: BTreeMap::new(),
        }
    }

    // ── Resolution ─────────────────────────────────────────────────

    /// Resolve one request. Hints from earlier calls are discarded first,
    /// so [`migration_hints`](Self::migration_hints) always describes the
    /// most recent resolve.
    pub fn resolve(&mut self, request: &ResolveRequest) -> ResolveResult<ResolvedBinding> {
        self.hints.clear();

        let kind = request.kind.unwrap_or_else(|| detect_kind(request));
        match kind {
            AddressingKind::Legacy => self.resolve_legacy(request),
            AddressingKind::RoleBased => self.resolve_role_based(request),
            AddressingKind::Hybrid => self.resolve_hybrid(request),
        }
    }

    fn resolve_legacy(&mut self, request: &ResolveRequest) -> ResolveResult<ResolvedBinding> {
        let source = self.resolve_legacy_location(&request.source, "source")?;
        let destination = self.resolve_legacy_location(&request.destination, "destination")?;

        if self.mode != MigrationMode::Silent {
            let suggestion = self.role_suggestion(request);
            self.add_hint(MigrationHint {
                level: Severity::Info,
                message: "consider migrating to role-based specification for better flexibility"
                    .to_string(),
                suggestion: Some(suggestion),
            })?;
        }

        Ok(ResolvedBinding {
            source,
            destination,
            input_kind: AddressingKind::Legacy,
            migration_ready: MigrationReadiness::NotReady,
            migration_progress_pct: Some(0),
            optimized: false,
        })
    }

    fn resolve_legacy_location(
        &mut self,
        spec: &LocationSpec,
        side: &'static str,
    ) -> ResolveResult<ResolvedLocation> {
        let (Some(slot), Some(labware_id)) = (spec.slot, spec.labware.as_deref()) else {
            return Err(ResolutionError::IncompleteLegacyLocation(side));
        };

        let descriptor = match self.catalog.labware(labware_id) {
            Some(entry) => entry.descriptor(),
            None => self.map_legacy_labware(labware_id)?,
        };

        Ok(ResolvedLocation {
            slot,
            labware: descriptor,
            wells: spec.wells.clone().unwrap_or_else(|| vec!["A1".to_string()]),
            module: None,
            pipette: None,
        })
    }

    /// Best-effort modern equivalent for a labware id the catalog does not
    /// know, via the legacy mapping table; synthetic placeholder otherwise.
    fn map_legacy_labware(&mut self, labware_id: &str) -> ResolveResult<LabwareDescriptor> {
        if let Some(mapping) = legacy::lookup(labware_id) {
            let wanted_name = mapping.display_name.to_lowercase();
            let replacement = self
                .catalog
                .all_labware()
                .find(|l| {
                    l.display_name.to_lowercase().contains(&wanted_name)
                        || mapping
                            .default_capabilities
                            .iter()
                            .any(|kind| l.capabilities.iter().any(|c| c.kind == *kind))
                })
                .map(|l| l.descriptor());

            if let Some(descriptor) = replacement {
                self.add_hint(MigrationHint {
                    level: Severity::Warning,
                    message: format!(
                        "legacy labware id '{labware_id}' mapped to '{}'",
                        descriptor.id
                    ),
                    suggestion: None,
                })?;
                return Ok(descriptor);
            }
        }

        self.add_hint(MigrationHint {
            level: Severity::Error,
            message: format!("unknown labware '{labware_id}', using generic placeholder"),
            suggestion: None,
        })?;

        Ok(LabwareDescriptor {
            id: labware_id.to_string(),
            display_name: labware_id.to_string(),
            dimensions: PLACEHOLDER_DIMENSIONS,
            well_count: None,
            well_volume_ul: None,
        })
    }

    fn resolve_role_based(&mut self, request: &ResolveRequest) -> ResolveResult<ResolvedBinding> {
        let source = self.resolve_role_location(&request.source, "source")?;
        let destination = self.resolve_role_location(&request.destination, "destination")?;

        Ok(ResolvedBinding {
            source,
            destination,
            input_kind: AddressingKind::RoleBased,
            migration_ready: MigrationReadiness::Ready,
            migration_progress_pct: None,
            optimized: true,
        })
    }

    /// Look the role up in the session overrides first, then in the injected
    /// binding lookup. Absence is an error, never a silent default.
    fn resolve_role_location(
        &mut self,
        spec: &LocationSpec,
        side: &'static str,
    ) -> ResolveResult<ResolvedLocation> {
        let Some(role) = spec.role.as_deref() else {
            return Err(ResolutionError::MissingRole(side));
        };

        let binding = self
            .session_bindings
            .get(role)
            .cloned()
            .or_else(|| self.lookup.as_ref().and_then(|l| l.binding(role)))
            .ok_or_else(|| ResolutionError::UnboundRole(role.to_string()))?;

        let bound_wells = binding
            .wells
            .as_ref()
            .map(|w| w.specific.clone())
            .unwrap_or_default();
        let wells = match &spec.well_selection {
            Some(selection) => apply_well_selection(&bound_wells, selection),
            None => bound_wells,
        };

        Ok(ResolvedLocation {
            slot: binding.slot,
            labware: binding.labware,
            wells,
            module: binding.module,
            pipette: binding.pipette,
        })
    }

    fn resolve_hybrid(&mut self, request: &ResolveRequest) -> ResolveResult<ResolvedBinding> {
        let source = self.resolve_hybrid_location(&request.source, "source")?;
        let destination = self.resolve_hybrid_location(&request.destination, "destination")?;

        let role_sides = [&request.source, &request.destination]
            .iter()
            .filter(|s| s.role.is_some())
            .count() as u32;
        let progress = role_sides * 100 / 2;

        Ok(ResolvedBinding {
            source,
            destination,
            input_kind: AddressingKind::Hybrid,
            migration_ready: MigrationReadiness::Partial,
            migration_progress_pct: Some(progress),
            optimized: false,
        })
    }

    fn resolve_hybrid_location(
        &mut self,
        spec: &LocationSpec,
        side: &'static str,
    ) -> ResolveResult<ResolvedLocation> {
        if spec.role.is_some() {
            return self.resolve_role_location(spec, side);
        }
        if spec.slot.is_some() && spec.labware.is_some() {
            return self.resolve_legacy_location(spec, side);
        }
        Err(ResolutionError::Unresolvable(side))
    }

    // ── Session bindings ───────────────────────────────────────────

    pub fn set_session_binding(&mut self, role: impl Into<String>, binding: Binding) {
        self.session_bindings.insert(role.into(), binding);
    }

    pub fn clear_session_bindings(&mut self) {
        self.session_bindings.clear();
    }

    // ── Migration helpers ──────────────────────────────────────────

    /// Hints collected during the most recent resolve. Populated in every
    /// mode, including silent.
    pub fn migration_hints(&self) -> &[MigrationHint] {
        &self.hints
    }

    /// Human-readable summary of the collected hints.
    pub fn migration_report(&self) -> String {
        if self.hints.is_empty() {
            return "No migration issues detected.".to_string();
        }

        let mut report = format!("Migration report ({} items):\n\n", self.hints.len());
        for (index, hint) in self.hints.iter().enumerate() {
            report.push_str(&format!(
                "{}. [{:?}] {}\n",
                index + 1,
                hint.level,
                hint.message
            ));
            if let Some(suggestion) = &hint.suggestion {
                report.push_str(&format!("   suggested role: {}\n", suggestion.role_id));
                report.push_str(&format!("   description: {}\n", suggestion.description));
            }
            report.push('\n');
        }
        report
    }

    /// Generate a starter deck spec from a batch of legacy transfers: one
    /// suggested role per legacy request, pinned to its source slot, plus a
    /// conversion report.
    pub fn convert_legacy_to_roles(&self, requests: &[ResolveRequest]) -> (DeckSpec, String) {
        let mut roles = BTreeMap::new();
        let mut report = String::from("Legacy to role conversion report:\n\n");

        for (index, request) in requests.iter().enumerate() {
            let kind = request.kind.unwrap_or_else(|| detect_kind(request));
            if kind != AddressingKind::Legacy {
                continue;
            }

            let suggestion = self.role_suggestion(request);
            report.push_str(&format!(
                "{}. created role '{}' from slot {:?}, labware {:?}\n",
                index + 1,
                suggestion.role_id,
                request.source.slot,
                request.source.labware,
            ));

            roles.insert(
                suggestion.role_id.clone(),
                RoleSpec {
                    description: suggestion.description,
                    capabilities: suggestion
                        .capabilities
                        .into_iter()
                        .map(Capability::new)
                        .collect(),
                    constraints: request.source.slot.map(|slot| RoleConstraints {
                        fixed_slot: Some(slot),
                        ..Default::default()
                    }),
                    preferred_labware: None,
                    volume: None,
                    temperature: None,
                },
            );
        }

        let spec = DeckSpec {
            version: Some("1.0".to_string()),
            protocol: ProtocolInfo {
                name: "Converted Protocol".to_string(),
                author: None,
                description: Some("auto-converted from legacy format".to_string()),
            },
            roles,
            template: None,
            optimization: Some(OptimizationConfig {
                priority: OptimizationPriority::MinimizeMoves,
                weights: None,
                constraints: None,
            }),
        };

        (spec, report)
    }

    fn role_suggestion(&self, request: &ResolveRequest) -> RoleSuggestion {
        request
            .source
            .labware
            .as_deref()
            .and_then(legacy::lookup)
            .map(|mapping| RoleSuggestion {
                role_id: mapping.suggested_role.to_string(),
                description: format!("Role for {}", mapping.display_name),
                capabilities: mapping.default_capabilities.to_vec(),
            })
            .unwrap_or_else(|| RoleSuggestion {
                role_id: "unknown_role".to_string(),
                description: "Generated role suggestion".to_string(),
                capabilities: Vec::new(),
            })
    }

    /// Record a hint. In warning/strict modes the hint is also logged; in
    /// strict mode an error-level hint fails the resolve.
    fn add_hint(&mut self, hint: MigrationHint) -> ResolveResult<()> {
        if self.mode != MigrationMode::Silent {
            warn!(level = ?hint.level, "{}", hint.message);
        }
        let strict_failure = self.mode == MigrationMode::Strict && hint.level == Severity::Error;
        let message = hint.message.clone();
        self.hints.push(hint);
        if strict_failure {
            return Err(ResolutionError::Migration(message));
        }
        Ok(())
    }
}

/// Detect addressing from which fields are populated.
fn detect_kind(request: &ResolveRequest) -> AddressingKind {
    let source_role = request.source.role.is_some();
    let dest_role = request.destination.role.is_some();
    let source_slot = request.source.slot.is_some();
    let dest_slot = request.destination.slot.is_some();

    if source_role && dest_role && !source_slot && !dest_slot {
        AddressingKind::RoleBased
    } else if !source_role && !dest_role && source_slot && dest_slot {
        AddressingKind::Legacy
    } else {
        AddressingKind::Hybrid
    }
}

/// Filter bound wells by an explicit selection.
fn apply_well_selection(available: &[String], selection: &WellSelection) -> Vec<String> {
    if !selection.specific.is_empty() {
        return selection
            .specific
            .iter()
            .filter(|w| available.contains(w))
            .cloned()
            .collect();
    }

    if !selection.rows.is_empty() && !selection.columns.is_empty() {
        let mut wells = Vec::new();
        for row in &selection.rows {
            for column in &selection.columns {
                let well = format!("{row}{column}");
                if available.contains(&well) {
                    wells.push(well);
                }
            }
        }
        return wells;
    }

    available.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdeck_core::binding::BindingMeta;

    fn resolver(mode: MigrationMode) -> BindingResolver {
        BindingResolver::new(Arc::new(ResourceCatalog::with_builtins()), None, mode)
    }

    fn legacy_request() -> ResolveRequest {
        ResolveRequest {
            kind: None,
            source: LocationSpec {
                slot: Some(4),
                labware: Some("plate_96".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                slot: Some(5),
                labware: Some("tips_300ul".into()),
                ..Default::default()
            },
            volume_ul: None,
        }
    }

    fn sample_binding(slot: u32) -> Binding {
        let catalog = ResourceCatalog::with_builtins();
        Binding {
            slot,
            labware: catalog
                .labware("corning_96_wellplate_360ul_flat")
                .unwrap()
                .descriptor(),
            module: None,
            pipette: None,
            wells: Some(WellSelection {
                rows: vec![],
                columns: vec![],
                specific: vec!["A1".into(), "B1".into()],
                pattern: None,
            }),
            meta: BindingMeta::default(),
        }
    }

    #[test]
    fn legacy_pair_is_detected_and_resolved() {
        let mut resolver = resolver(MigrationMode::Warning);
        let resolved = resolver.resolve(&legacy_request()).unwrap();

        assert_eq!(resolved.input_kind, AddressingKind::Legacy);
        assert_eq!(resolved.source.slot, 4);
        assert_eq!(resolved.destination.slot, 5);
        assert_eq!(resolved.migration_ready, MigrationReadiness::NotReady);

        let hints = resolver.migration_hints();
        let info = hints
            .iter()
            .find(|h| h.level == Severity::Info)
            .expect("legacy resolve must emit an info hint");
        assert_eq!(
            info.suggestion.as_ref().unwrap().role_id,
            "sample_plate"
        );
    }

    #[test]
    fn silent_mode_still_collects_hints() {
        let mut resolver = resolver(MigrationMode::Silent);
        resolver.resolve(&legacy_request()).unwrap();
        // Legacy-id mapping hints are collected; the info suggestion is
        // suppressed in silent mode.
        assert!(!resolver.migration_hints().is_empty());
        assert!(resolver
            .migration_hints()
            .iter()
            .all(|h| h.level != Severity::Info));
    }

    #[test]
    fn strict_mode_fails_on_unknown_labware() {
        let mut resolver = resolver(MigrationMode::Strict);
        let request = ResolveRequest {
            source: LocationSpec {
                slot: Some(1),
                labware: Some("mystery_labware".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                slot: Some(2),
                labware: Some("plate_96".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = resolver.resolve(&request);
        assert!(matches!(result, Err(ResolutionError::Migration(_))));
    }

    #[test]
    fn warning_mode_substitutes_a_placeholder() {
        let mut resolver = resolver(MigrationMode::Warning);
        let request = ResolveRequest {
            source: LocationSpec {
                slot: Some(1),
                labware: Some("mystery_labware".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                slot: Some(2),
                labware: Some("corning_96_wellplate_360ul_flat".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolver.resolve(&request).unwrap();
        assert_eq!(resolved.source.labware.id, "mystery_labware");
        assert_eq!(resolved.source.labware.dimensions, PLACEHOLDER_DIMENSIONS);
        assert!(resolver
            .migration_hints()
            .iter()
            .any(|h| h.level == Severity::Error));
    }

    #[test]
    fn role_resolution_requires_a_binding() {
        let mut resolver = resolver(MigrationMode::Warning);
        let request = ResolveRequest {
            source: LocationSpec {
                role: Some("samples".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                role: Some("tips".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = resolver.resolve(&request);
        assert!(matches!(result, Err(ResolutionError::UnboundRole(_))));
    }

    #[test]
    fn session_binding_round_trips() {
        let mut resolver = resolver(MigrationMode::Warning);
        let binding = sample_binding(6);
        resolver.set_session_binding("samples", binding.clone());
        resolver.set_session_binding("tips", sample_binding(9));

        let request = ResolveRequest {
            source: LocationSpec {
                role: Some("samples".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                role: Some("tips".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolver.resolve(&request).unwrap();

        assert_eq!(resolved.input_kind, AddressingKind::RoleBased);
        assert_eq!(resolved.source.slot, binding.slot);
        assert_eq!(resolved.source.labware, binding.labware);
        assert_eq!(resolved.source.wells, ["A1", "B1"]);
        assert_eq!(resolved.migration_ready, MigrationReadiness::Ready);
    }

    #[test]
    fn hybrid_mix_reports_progress() {
        let mut resolver = resolver(MigrationMode::Warning);
        resolver.set_session_binding("samples", sample_binding(6));

        let request = ResolveRequest {
            source: LocationSpec {
                role: Some("samples".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                slot: Some(5),
                labware: Some("tips_300ul".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolver.resolve(&request).unwrap();

        assert_eq!(resolved.input_kind, AddressingKind::Hybrid);
        assert_eq!(resolved.migration_progress_pct, Some(50));
        assert_eq!(resolved.migration_ready, MigrationReadiness::Partial);
    }

    #[test]
    fn explicit_kind_overrides_detection() {
        let mut resolver = resolver(MigrationMode::Warning);
        let mut request = legacy_request();
        request.kind = Some(AddressingKind::Hybrid);
        let resolved = resolver.resolve(&request).unwrap();
        assert_eq!(resolved.input_kind, AddressingKind::Hybrid);
    }

    #[test]
    fn legacy_conversion_builds_pinned_roles() {
        let resolver = resolver(MigrationMode::Warning);
        let (spec, report) = resolver.convert_legacy_to_roles(&[legacy_request()]);

        let role = spec.roles.get("sample_plate").expect("suggested role created");
        assert_eq!(
            role.constraints.as_ref().unwrap().fixed_slot,
            Some(4)
        );
        assert!(role
            .capabilities
            .iter()
            .any(|c| c.kind == CapabilityKind::WellFormat96));
        assert!(report.contains("sample_plate"));
    }

    #[test]
    fn well_selection_filters_bound_wells() {
        let mut resolver = resolver(MigrationMode::Warning);
        resolver.set_session_binding("samples", sample_binding(6));
        resolver.set_session_binding("tips", sample_binding(9));

        let request = ResolveRequest {
            source: LocationSpec {
                role: Some("samples".into()),
                well_selection: Some(WellSelection {
                    rows: vec![],
                    columns: vec![],
                    specific: vec!["B1".into(), "H12".into()],
                    pattern: None,
                }),
                ..Default::default()
            },
            destination: LocationSpec {
                role: Some("tips".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolver.resolve(&request).unwrap();
        // H12 is not among the bound wells, so only B1 survives.
        assert_eq!(resolved.source.wells, ["B1"]);
    }
}
