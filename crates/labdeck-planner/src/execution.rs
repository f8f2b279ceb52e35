//! Execution-plan estimation over a completed binding map.
//!
//! Rough figures for the result consumer: all-to-all movement time, tip
//! consumption per pipette model, travel efficiency, and deck utilization.
//! The validator fills in the collision risk afterwards.

use std::collections::BTreeMap;

use labdeck_core::binding::{BindingMap, CollisionRisk, ExecutionPlan, ResourceUtilization, TipUsage};
use labdeck_core::capability::Mount;
use labdeck_core::deck::{self, SLOT_COUNT};

const SECONDS_PER_MOVEMENT: f64 = 10.0;
const TIPS_PER_BINDING: u32 = 8;
const TIPS_PER_RACK: u32 = 96;
const MAX_TRAVEL_MM: f64 = 300.0;

pub fn generate_execution_plan(binding_map: &BindingMap) -> ExecutionPlan {
    let bindings: Vec<_> = binding_map.bindings.values().collect();
    let count = bindings.len();

    let movements = count.saturating_sub(1) * count;
    let estimated_time_s = movements as f64 * SECONDS_PER_MOVEMENT;

    let mut tip_usage: BTreeMap<String, TipUsage> = BTreeMap::new();
    for binding in &bindings {
        if let Some(pipette) = &binding.pipette {
            let usage = tip_usage.entry(pipette.model.clone()).or_default();
            usage.tips_needed += TIPS_PER_BINDING;
            usage.racks_needed = usage.tips_needed.div_ceil(TIPS_PER_RACK);
        }
    }

    let mut total_distance = 0.0;
    let mut pairs = 0u32;
    for i in 0..count {
        for j in (i + 1)..count {
            total_distance +=
                deck::slot_distance_mm(bindings[i].slot, bindings[j].slot).unwrap_or(0.0);
            pairs += 1;
        }
    }
    let movement_efficiency = if pairs == 0 {
        1.0
    } else {
        (1.0 - (total_distance / f64::from(pairs)) / MAX_TRAVEL_MM).max(0.0)
    };

    let slot_usage_pct = count as f64 / f64::from(SLOT_COUNT) * 100.0;
    let with_module = bindings.iter().filter(|b| b.module.is_some()).count();
    let module_usage_pct = if count > 0 {
        with_module as f64 / count as f64 * 100.0
    } else {
        0.0
    };
    let mount_usage = |mount: Mount| {
        if count == 0 {
            return None;
        }
        let using = bindings
            .iter()
            .filter(|b| b.pipette.as_ref().is_some_and(|p| p.mount == mount))
            .count();
        Some(using as f64 / count as f64 * 100.0)
    };

    ExecutionPlan {
        estimated_time_s,
        tip_usage,
        movement_efficiency,
        collision_risk: CollisionRisk::Low,
        resource_utilization: ResourceUtilization {
            slot_usage_pct,
            module_usage_pct,
            left_pipette_usage_pct: mount_usage(Mount::Left),
            right_pipette_usage_pct: mount_usage(Mount::Right),
        },
    }
}
