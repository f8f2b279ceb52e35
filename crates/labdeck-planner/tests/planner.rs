//! End-to-end planning scenarios.

use std::sync::Arc;

use labdeck_capability::{SelectionPattern, select_wells};
use labdeck_catalog::ResourceCatalog;
use labdeck_compat::{AddressingKind, LocationSpec, MigrationMode, ResolveRequest};
use labdeck_core::capability::{Capability, CapabilityKind, VolumeRange};
use labdeck_core::finding::{Severity, ValidationKind};
use labdeck_core::spec::{
    DeckSpec, ProtocolInfo, RoleConstraints, RoleSpec, RuntimeContext, SolverStrategy,
};
use labdeck_planner::{DeckPlanner, PlannerOptions};

fn role(description: &str, kinds: &[CapabilityKind]) -> RoleSpec {
    RoleSpec {
        description: description.into(),
        capabilities: kinds.iter().copied().map(Capability::new).collect(),
        constraints: None,
        preferred_labware: None,
        volume: None,
        temperature: None,
    }
}

fn spec(roles: Vec<(&str, RoleSpec)>) -> DeckSpec {
    DeckSpec {
        version: Some("1.0".into()),
        protocol: ProtocolInfo {
            name: "integration test".into(),
            author: None,
            description: None,
        },
        roles: roles
            .into_iter()
            .map(|(name, role)| (name.to_string(), role))
            .collect(),
        template: None,
        optimization: None,
    }
}

fn planner(options: PlannerOptions) -> DeckPlanner {
    init_logging();
    DeckPlanner::new(Arc::new(ResourceCatalog::with_builtins()), options)
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn no_cache() -> PlannerOptions {
    PlannerOptions {
        cache_bindings: false,
        ..Default::default()
    }
}

// ── Properties ─────────────────────────────────────────────────────

#[test]
fn greedy_planning_is_deterministic() {
    let s = spec(vec![
        ("samples", role("sample plate", &[CapabilityKind::HoldLiquid])),
        ("reagents", role("reagent source", &[CapabilityKind::ReagentReservoir])),
        ("tips", role("tip source", &[CapabilityKind::TipRack])),
    ]);

    let run = || {
        let mut result = planner(no_cache()).plan(&s, None);
        // Creation timestamps are wall-clock; normalize before comparing.
        result.binding_map.metadata.created_at = 0;
        serde_json::to_string(&result.binding_map).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn successful_plans_never_double_book_a_slot() {
    let s = spec(vec![
        ("a", role("plate a", &[CapabilityKind::HoldLiquid])),
        ("b", role("plate b", &[CapabilityKind::HoldLiquid])),
        ("c", role("reagents", &[CapabilityKind::ReagentReservoir])),
        ("d", role("tips", &[CapabilityKind::TipRack])),
        ("e", role("more tips", &[CapabilityKind::TipRack])),
    ]);
    let result = planner(no_cache()).plan(&s, None);
    assert!(result.success);

    let mut slots: Vec<u32> = result.binding_map.bindings.values().map(|b| b.slot).collect();
    let total = slots.len();
    slots.sort();
    slots.dedup();
    assert_eq!(slots.len(), total, "two roles share a slot");
}

#[test]
fn fixed_slot_is_honored_or_flagged() {
    let mut pinned = role("pinned plate", &[CapabilityKind::HoldLiquid]);
    pinned.constraints = Some(RoleConstraints {
        fixed_slot: Some(6),
        ..Default::default()
    });
    let s = spec(vec![
        ("pinned", pinned),
        ("tips", role("tip source", &[CapabilityKind::TipRack])),
    ]);

    let result = planner(no_cache()).plan(&s, None);
    let binding = &result.binding_map.bindings["pinned"];

    let flagged = binding
        .meta
        .warnings
        .iter()
        .any(|w| w.contains("slot 6"))
        || result
            .validation_results
            .iter()
            .any(|f| f.affected_roles.contains(&"pinned".to_string()));
    assert!(binding.slot == 6 || flagged);
}

#[test]
fn cache_returns_an_identical_map() {
    let s = spec(vec![("tips", role("tip source", &[CapabilityKind::TipRack]))]);
    let planner = planner(PlannerOptions::default());

    let first = planner.plan(&s, None);
    assert!(first.success);
    assert!(!first.warnings.iter().any(|w| w.contains("cached")));

    let second = planner.plan(&s, None);
    assert!(second.success);
    assert!(
        second.warnings.iter().any(|w| w.contains("cached")),
        "second call must hit the cache branch"
    );
    assert_eq!(first.binding_map, second.binding_map);

    planner.clear_cache();
    let third = planner.plan(&s, None);
    assert!(!third.warnings.iter().any(|w| w.contains("cached")));
}

#[test]
fn resolver_round_trips_session_bindings() {
    let s = spec(vec![
        ("samples", role("sample plate", &[CapabilityKind::HoldLiquid])),
        ("tips", role("tip source", &[CapabilityKind::TipRack])),
    ]);
    let planner = planner(no_cache());
    let result = planner.plan(&s, None);
    assert!(result.success);

    let mut resolver = planner.resolver(MigrationMode::Warning);
    let resolved = resolver
        .resolve(&ResolveRequest {
            kind: None,
            source: LocationSpec {
                role: Some("samples".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                role: Some("tips".into()),
                ..Default::default()
            },
            volume_ul: None,
        })
        .expect("role-based resolution against solved bindings");

    let samples = &result.binding_map.bindings["samples"];
    assert_eq!(resolved.source.slot, samples.slot);
    assert_eq!(resolved.source.labware, samples.labware);

    // A session override supersedes the solved binding on re-resolution.
    let mut replacement = samples.clone();
    replacement.slot = 11;
    resolver.set_session_binding("samples", replacement.clone());
    let re_resolved = resolver
        .resolve(&ResolveRequest {
            kind: None,
            source: LocationSpec {
                role: Some("samples".into()),
                ..Default::default()
            },
            destination: LocationSpec {
                role: Some("tips".into()),
                ..Default::default()
            },
            volume_ul: None,
        })
        .unwrap();
    assert_eq!(re_resolved.source.slot, 11);
}

// ── Scenario A ─────────────────────────────────────────────────────

#[test]
fn single_tip_rack_role_on_an_empty_deck() {
    let s = spec(vec![("tips", role("tip source", &[CapabilityKind::TipRack]))]);
    let result = planner(no_cache()).plan(&s, None);

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.binding_map.bindings.len(), 1);

    let binding = &result.binding_map.bindings["tips"];
    assert!((1..=11).contains(&binding.slot));
    assert!(
        [
            "opentrons_96_tiprack_300ul",
            "opentrons_96_tiprack_1000ul",
            "opentrons_96_filtertiprack_200ul",
        ]
        .contains(&binding.labware.id.as_str())
    );
}

// ── Scenario B ─────────────────────────────────────────────────────

#[test]
fn isolated_waste_gets_free_neighbors_or_a_violation() {
    let mut waste = role("liquid waste", &[CapabilityKind::Waste]);
    waste.constraints = Some(RoleConstraints {
        isolated: Some(true),
        ..Default::default()
    });
    let s = spec(vec![
        ("waste", waste),
        ("reagents", role("reagent source", &[CapabilityKind::ReagentReservoir])),
    ]);

    let result = planner(no_cache()).plan(&s, None);
    let bindings = &result.binding_map.bindings;
    let waste_slot = bindings["waste"].slot;

    let occupied: Vec<u32> = bindings.values().map(|b| b.slot).collect();
    let neighbors_free = labdeck_core::deck::adjacent_slots(waste_slot)
        .iter()
        .all(|n| !occupied.contains(n));

    let violation_recorded = bindings["waste"]
        .meta
        .warnings
        .iter()
        .any(|w| w.contains("isolated"))
        || result
            .validation_results
            .iter()
            .any(|f| f.kind == ValidationKind::Collision && f.affected_roles.contains(&"waste".to_string()));

    assert!(neighbors_free || violation_recorded);
}

// ── Scenario C ─────────────────────────────────────────────────────

#[test]
fn oversized_volume_requirement_raises_a_volume_error() {
    // A trough whose total capacity (15 000 µL) sits below the role's
    // 20 000 µL minimum.
    let mut catalog = ResourceCatalog::with_builtins();
    catalog.register_labware(labdeck_catalog::LabwareEntry {
        id: "custom_trough_15ml".into(),
        display_name: "Custom 15 mL Trough".into(),
        manufacturer: "Custom".into(),
        capabilities: vec![
            Capability::new(CapabilityKind::HoldLiquid),
            Capability::new(CapabilityKind::ReagentReservoir),
        ],
        dimensions: labdeck_core::deck::Dimensions::new(127.76, 85.48, 31.4),
        well_layout: Some(labdeck_catalog::WellLayout {
            rows: 1,
            columns: 1,
            well_volume_ul: 15_000.0,
            well_shape: labdeck_catalog::WellShape::Rectangular,
        }),
        compatible_modules: vec![],
        tags: vec![],
    });

    let mut wash = role("wash buffer", &[CapabilityKind::ReagentReservoir]);
    wash.preferred_labware = Some(vec!["custom_trough_15ml".into()]);
    wash.volume = Some(VolumeRange::new(20_000.0, 25_000.0));
    let s = spec(vec![("wash", wash)]);

    let planner = DeckPlanner::new(Arc::new(catalog), no_cache());
    let result = planner.plan(&s, None);

    assert!(result.validation_results.iter().any(|f| {
        f.kind == ValidationKind::Volume
            && f.severity == Severity::Error
            && f.affected_roles.contains(&"wash".to_string())
    }));
    assert!(!result.success);
}

// ── Scenario D ─────────────────────────────────────────────────────

#[test]
fn legacy_transfer_resolves_with_migration_hints() {
    let planner = planner(no_cache());
    let mut resolver = planner.resolver(MigrationMode::Warning);

    let resolved = resolver
        .resolve(&ResolveRequest {
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
        })
        .expect("legacy resolution in warning mode");

    assert_eq!(resolved.input_kind, AddressingKind::Legacy);
    assert_eq!(resolved.source.slot, 4);
    assert_eq!(resolved.destination.slot, 5);

    let hints = resolver.migration_hints();
    let info = hints
        .iter()
        .find(|h| h.level == Severity::Info)
        .expect("legacy resolve emits an info hint");
    let suggestion = info.suggestion.as_ref().expect("hint carries a role suggestion");
    assert!(!suggestion.role_id.is_empty());
}

// ── Strategy parity ────────────────────────────────────────────────

#[test]
fn all_strategies_produce_complete_plans() {
    let build_spec = || {
        let mut waste = role("liquid waste", &[CapabilityKind::Waste]);
        waste.constraints = Some(RoleConstraints {
            isolated: Some(true),
            ..Default::default()
        });
        spec(vec![
            ("samples", role("sample plate", &[CapabilityKind::HoldLiquid])),
            ("waste", waste),
            ("tips", role("tip source", &[CapabilityKind::TipRack])),
        ])
    };

    for strategy in [
        SolverStrategy::Greedy,
        SolverStrategy::SimulatedAnnealing,
        SolverStrategy::GeneticAlgorithm,
        SolverStrategy::Ilp,
    ] {
        let planner = planner(PlannerOptions {
            strategy,
            cache_bindings: false,
            solver_seed: Some(17),
            ..Default::default()
        });
        let result = planner.plan(&build_spec(), None);
        assert_eq!(
            result.binding_map.bindings.len(),
            3,
            "{strategy:?} left roles unplaced: {:?}",
            result.errors
        );
        assert_eq!(result.binding_map.metadata.solver_strategy, strategy);
    }
}

// ── Runtime-context interplay ──────────────────────────────────────

#[test]
fn occupied_slots_are_respected() {
    let s = spec(vec![("tips", role("tip source", &[CapabilityKind::TipRack]))]);
    let runtime = RuntimeContext {
        available_slots: (1..=11).collect(),
        installed_modules: vec![],
        available_pipettes: vec![],
        existing_labware: vec![],
        occupied_slots: vec![1, 2, 3, 4, 5],
    };

    let result = planner(no_cache()).plan(&s, Some(&runtime));
    assert!(result.success);
    assert!(result.binding_map.bindings["tips"].slot > 5);
}

#[test]
fn well_selection_matches_capability_helper() {
    let catalog = ResourceCatalog::with_builtins();
    let labware = catalog.labware("corning_96_wellplate_360ul_flat").unwrap();
    let selection = select_wells(labware, 1, SelectionPattern::Sequential, &[]);
    assert_eq!(selection.specific, ["A1"]);

    let s = spec(vec![("samples", role("sample plate", &[CapabilityKind::HoldLiquid]))]);
    let result = planner(no_cache()).plan(&s, None);
    let wells = result.binding_map.bindings["samples"]
        .wells
        .as_ref()
        .expect("plate bindings carry a well selection");
    assert_eq!(wells.specific, ["A1"]);
}
