//! The resource catalog: keyed storage plus capability/volume queries.

use std::collections::BTreeMap;

use tracing::debug;

use labdeck_core::capability::{Capability, ModuleKind};

use crate::builtin;
use crate::entry::{LabwareEntry, ModuleEntry};

/// Registry of labware and module definitions, keyed by id.
///
/// Construct once (usually via [`ResourceCatalog::with_builtins`]), share
/// behind `Arc`, and treat as read-only for the lifetime of the process.
/// Extension happens through explicit `register_*` calls before the catalog
/// is handed to the planner.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    labware: BTreeMap<String, LabwareEntry>,
    modules: BTreeMap<String, ModuleEntry>,
}

impl ResourceCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-populated with the built-in labware and module set.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for entry in builtin::labware() {
            catalog.register_labware(entry);
        }
        for entry in builtin::modules() {
            catalog.register_module(entry);
        }
        debug!(
            labware = catalog.labware.len(),
            modules = catalog.modules.len(),
            "catalog initialized"
        );
        catalog
    }

    // ── Registration ───────────────────────────────────────────────

    /// Insert or overwrite a labware definition.
    pub fn register_labware(&mut self, entry: LabwareEntry) {
        self.labware.insert(entry.id.clone(), entry);
    }

    /// Insert or overwrite a module definition.
    pub fn register_module(&mut self, entry: ModuleEntry) {
        self.modules.insert(entry.id.clone(), entry);
    }

    // ── Lookup ─────────────────────────────────────────────────────

    pub fn labware(&self, id: &str) -> Option<&LabwareEntry> {
        self.labware.get(id)
    }

    pub fn module(&self, id: &str) -> Option<&ModuleEntry> {
        self.modules.get(id)
    }

    pub fn all_labware(&self) -> impl Iterator<Item = &LabwareEntry> {
        self.labware.values()
    }

    pub fn all_modules(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values()
    }

    // ── Queries ────────────────────────────────────────────────────

    /// All labware offering every required capability (value-aware).
    pub fn find_labware_by_capabilities(&self, required: &[Capability]) -> Vec<&LabwareEntry> {
        self.labware
            .values()
            .filter(|l| l.offers_all(required))
            .collect()
    }

    /// All labware whose total well capacity lies within `[min_ul, max_ul]`.
    /// Labware without a well layout never matches.
    pub fn find_labware_by_volume(&self, min_ul: f64, max_ul: f64) -> Vec<&LabwareEntry> {
        self.labware
            .values()
            .filter(|l| {
                l.well_layout
                    .as_ref()
                    .is_some_and(|w| (min_ul..=max_ul).contains(&w.total_capacity_ul()))
            })
            .collect()
    }

    pub fn find_modules_by_kind(&self, kind: ModuleKind) -> Vec<&ModuleEntry> {
        self.modules.values().filter(|m| m.kind == kind).collect()
    }

    pub fn find_modules_by_capabilities(&self, required: &[Capability]) -> Vec<&ModuleEntry> {
        self.modules
            .values()
            .filter(|m| m.offers_all(required))
            .collect()
    }

    // ── Compatibility ──────────────────────────────────────────────

    /// Whether the labware declares mechanical compatibility with the module
    /// type. Unknown labware ids are never compatible.
    pub fn is_labware_module_compatible(&self, labware_id: &str, kind: ModuleKind) -> bool {
        self.labware(labware_id)
            .is_some_and(|l| l.compatible_modules.contains(&kind))
    }

    pub fn compatible_labware_for_module(&self, kind: ModuleKind) -> Vec<&LabwareEntry> {
        self.labware
            .values()
            .filter(|l| l.compatible_modules.contains(&kind))
            .collect()
    }

    // ── Search helpers ─────────────────────────────────────────────

    /// Case-insensitive substring search over names, manufacturers, and tags.
    pub fn search_labware(&self, query: &str) -> Vec<&LabwareEntry> {
        let query = query.to_lowercase();
        self.labware
            .values()
            .filter(|l| {
                l.display_name.to_lowercase().contains(&query)
                    || l.manufacturer.to_lowercase().contains(&query)
                    || l.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Distinct tags across all registered labware.
    pub fn labware_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .labware
            .values()
            .flat_map(|l| l.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdeck_core::capability::CapabilityKind;

    #[test]
    fn builtins_cover_the_expected_set() {
        let catalog = ResourceCatalog::with_builtins();
        assert_eq!(catalog.all_labware().count(), 9);
        assert_eq!(catalog.all_modules().count(), 4);
        assert!(catalog.labware("corning_96_wellplate_360ul_flat").is_some());
        assert!(catalog.module("thermocycler_module").is_some());
        assert!(catalog.labware("nonexistent").is_none());
    }

    #[test]
    fn capability_query_requires_all() {
        let catalog = ResourceCatalog::with_builtins();

        let tip_racks = catalog
            .find_labware_by_capabilities(&[Capability::new(CapabilityKind::TipRack)]);
        assert_eq!(tip_racks.len(), 3);

        let filter_racks = catalog.find_labware_by_capabilities(&[
            Capability::new(CapabilityKind::TipRack),
            Capability::new(CapabilityKind::FilterTips),
        ]);
        assert_eq!(filter_racks.len(), 1);
        assert_eq!(filter_racks[0].id, "opentrons_96_filtertiprack_200ul");
    }

    #[test]
    fn volume_query_uses_total_capacity() {
        let catalog = ResourceCatalog::with_builtins();
        // The 12-well 15 mL reservoir totals 180 000 µL.
        let hits = catalog.find_labware_by_volume(100_000.0, 200_000.0);
        assert!(hits.iter().any(|l| l.id == "nest_12_reservoir_15ml"));
        assert!(hits.iter().all(|l| l.well_layout.is_some()));
    }

    #[test]
    fn module_compatibility_table() {
        let catalog = ResourceCatalog::with_builtins();
        assert!(catalog.is_labware_module_compatible(
            "corning_96_wellplate_360ul_flat",
            ModuleKind::MagneticModuleGen2
        ));
        assert!(!catalog.is_labware_module_compatible(
            "nest_12_reservoir_15ml",
            ModuleKind::TemperatureModuleGen2
        ));
        assert!(!catalog.is_labware_module_compatible("unknown", ModuleKind::HeaterShakerModule));
    }

    #[test]
    fn registration_overwrites_by_id() {
        let mut catalog = ResourceCatalog::with_builtins();
        let mut entry = catalog
            .labware("opentrons_96_tiprack_300ul")
            .cloned()
            .unwrap();
        entry.display_name = "Renamed rack".into();
        catalog.register_labware(entry);
        assert_eq!(
            catalog.labware("opentrons_96_tiprack_300ul").unwrap().display_name,
            "Renamed rack"
        );
        assert_eq!(catalog.all_labware().count(), 9);
    }

    #[test]
    fn search_matches_tags_case_insensitively() {
        let catalog = ResourceCatalog::with_builtins();
        let hits = catalog.search_labware("TIPRACK");
        assert_eq!(hits.len(), 3);
    }
}
