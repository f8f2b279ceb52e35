//! Genetic-algorithm search over placements.
//!
//! The population starts from the greedy solution; diversity comes from
//! uniform per-role crossover and slot-reassignment mutation. Fitness is the
//! total solution score.

use rand::Rng;
use tracing::debug;

use labdeck_catalog::ResourceCatalog;
use labdeck_core::spec::DeckSpec;

use crate::board::DeckBoard;
use crate::candidate::Solution;
use crate::constraint::PlacementConstraint;
use crate::greedy::solve_greedy;
use crate::score::{evaluate_candidate, evaluate_solution};

pub const POPULATION_SIZE: usize = 50;
pub const GENERATIONS: u32 = 100;
pub const MUTATION_RATE: f64 = 0.1;
pub const ELITE_SIZE: usize = 5;
pub const TOURNAMENT_SIZE: usize = 3;

pub fn solve_genetic<R: Rng>(
    spec: &DeckSpec,
    catalog: &ResourceCatalog,
    constraints: &[PlacementConstraint],
    board: &mut DeckBoard,
    rng: &mut R,
) -> Solution {
    let seed = solve_greedy(spec, catalog, constraints, board);
    if seed.is_empty() {
        return seed;
    }

    let mut population: Vec<Solution> = vec![seed; POPULATION_SIZE];

    for generation in 0..GENERATIONS {
        let mut fitness: Vec<(Solution, f64)> = population
            .into_iter()
            .map(|mut individual| {
                let score = evaluate_solution(&mut individual, spec, constraints, board);
                (individual, score)
            })
            .collect();
        fitness.sort_by(|a, b| b.1.total_cmp(&a.1));

        if generation == GENERATIONS - 1 {
            debug!(best = fitness[0].1, "final generation evaluated");
            return fitness.swap_remove(0).0;
        }

        let mut next: Vec<Solution> = fitness
            .iter()
            .take(ELITE_SIZE)
            .map(|(solution, _)| solution.clone())
            .collect();

        while next.len() < POPULATION_SIZE {
            let parent1 = tournament(&fitness, rng);
            let parent2 = tournament(&fitness, rng);
            let mut child = crossover(parent1, parent2, spec, board, rng);
            if rng.random::<f64>() < MUTATION_RATE {
                mutate(&mut child, spec, constraints, board, rng);
            }
            next.push(child);
        }

        population = next;
    }

    // GENERATIONS is nonzero, so the loop always returns from the final
    // generation branch.
    unreachable!("generation loop returns the best individual")
}

/// Best of `TOURNAMENT_SIZE` random picks.
fn tournament<'a, R: Rng>(fitness: &'a [(Solution, f64)], rng: &mut R) -> &'a Solution {
    let mut best = &fitness[rng.random_range(0..fitness.len())];
    for _ in 1..TOURNAMENT_SIZE {
        let challenger = &fitness[rng.random_range(0..fitness.len())];
        if challenger.1 > best.1 {
            best = challenger;
        }
    }
    &best.0
}

/// Uniform crossover: each role's placement comes from either parent with
/// equal probability. Slot conflicts between the parents' genes are
/// repaired by falling back to the other parent, then to the lowest free
/// slot, so a child never double-books a slot or drops a role.
fn crossover<R: Rng>(
    parent1: &Solution,
    parent2: &Solution,
    spec: &DeckSpec,
    board: &DeckBoard,
    rng: &mut R,
) -> Solution {
    let mut child = Solution::new();
    let mut taken: Vec<u32> = Vec::new();

    for role_name in spec.roles.keys() {
        let (first, second) = if rng.random::<f64>() < 0.5 {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };

        let picked = first
            .get(role_name)
            .filter(|p| !taken.contains(&p.slot))
            .or_else(|| second.get(role_name).filter(|p| !taken.contains(&p.slot)));

        let mut placement = match picked {
            Some(placement) => placement.clone(),
            None => {
                let Some(template) = first.get(role_name).or_else(|| second.get(role_name))
                else {
                    continue;
                };
                let mut repaired = template.clone();
                if let Some(slot) = board
                    .free_or_own_slots(role_name)
                    .into_iter()
                    .find(|s| !taken.contains(s))
                {
                    repaired.slot = slot;
                }
                repaired
            }
        };

        taken.push(placement.slot);
        placement.role = role_name.clone();
        child.insert(role_name.clone(), placement);
    }

    child
}

/// Reassign one random role to a random free-or-own slot and re-score it.
fn mutate<R: Rng>(
    solution: &mut Solution,
    spec: &DeckSpec,
    constraints: &[PlacementConstraint],
    board: &DeckBoard,
    rng: &mut R,
) {
    let roles: Vec<String> = solution.keys().cloned().collect();
    if roles.is_empty() {
        return;
    }
    let role_name = &roles[rng.random_range(0..roles.len())];

    let used_by_others: Vec<u32> = solution
        .iter()
        .filter(|(name, _)| name.as_str() != role_name.as_str())
        .map(|(_, p)| p.slot)
        .collect();
    let available: Vec<u32> = board
        .free_or_own_slots(role_name)
        .into_iter()
        .filter(|slot| !used_by_others.contains(slot))
        .collect();
    if available.len() < 2 {
        return;
    }

    let Some(mut candidate) = solution.remove(role_name) else { return };
    candidate.slot = available[rng.random_range(0..available.len())];
    if let Some(role) = spec.roles.get(role_name) {
        evaluate_candidate(&mut candidate, role, constraints, board, solution);
    }
    solution.insert(role_name.clone(), candidate);
}
