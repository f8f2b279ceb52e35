//! Strategy dispatch.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use labdeck_catalog::ResourceCatalog;
use labdeck_core::spec::{DeckSpec, RuntimeContext, SolverStrategy};

use crate::annealing::solve_annealing;
use crate::board::DeckBoard;
use crate::candidate::Solution;
use crate::constraint::extract_constraints;
use crate::genetic::solve_genetic;
use crate::greedy::solve_greedy;

/// Places roles onto the deck with the configured search strategy.
///
/// State is rebuilt on every [`solve`](PlacementSolver::solve) call: the
/// board is re-seeded from the runtime snapshot and constraints are
/// re-extracted from the spec, so one solver can serve many plans.
#[derive(Debug, Clone)]
pub struct PlacementSolver {
    catalog: Arc<ResourceCatalog>,
    strategy: SolverStrategy,
    seed: Option<u64>,
}

impl PlacementSolver {
    pub fn new(catalog: Arc<ResourceCatalog>, strategy: SolverStrategy) -> Self {
        Self {
            catalog,
            strategy,
            seed: None,
        }
    }

    /// Fix the RNG seed for reproducible annealing/genetic runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn strategy(&self) -> SolverStrategy {
        self.strategy
    }

    /// Solve placements for every role. Roles with no compatible labware are
    /// absent from the result.
    pub fn solve(&self, spec: &DeckSpec, runtime: Option<&RuntimeContext>) -> Solution {
        let constraints = extract_constraints(spec);
        let mut board = DeckBoard::from_runtime(runtime);
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        match self.strategy {
            SolverStrategy::Greedy => {
                solve_greedy(spec, &self.catalog, &constraints, &mut board)
            }
            SolverStrategy::SimulatedAnnealing => {
                solve_annealing(spec, &self.catalog, &constraints, &mut board, &mut rng)
            }
            SolverStrategy::GeneticAlgorithm => {
                solve_genetic(spec, &self.catalog, &constraints, &mut board, &mut rng)
            }
            SolverStrategy::Ilp => {
                // Exact solving is declared in the interface but not wired
                // up; the contract is a greedy fallback with a notice.
                warn!("ilp strategy not implemented, falling back to greedy");
                solve_greedy(spec, &self.catalog, &constraints, &mut board)
            }
            SolverStrategy::Manual => {
                solve_greedy(spec, &self.catalog, &constraints, &mut board)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use labdeck_core::capability::{Capability, CapabilityKind};
    use labdeck_core::spec::{ProtocolInfo, RoleSpec};

    fn spec() -> DeckSpec {
        let mut roles = BTreeMap::new();
        roles.insert(
            "tips".to_string(),
            RoleSpec {
                description: "tip source".into(),
                capabilities: vec![Capability::new(CapabilityKind::TipRack)],
                constraints: None,
                preferred_labware: None,
                volume: None,
                temperature: None,
            },
        );
        DeckSpec {
            version: Some("1.0".into()),
            protocol: ProtocolInfo {
                name: "solver test".into(),
                author: None,
                description: None,
            },
            roles,
            template: None,
            optimization: None,
        }
    }

    #[test]
    fn every_strategy_places_the_role() {
        let catalog = Arc::new(ResourceCatalog::with_builtins());
        for strategy in [
            SolverStrategy::Greedy,
            SolverStrategy::SimulatedAnnealing,
            SolverStrategy::GeneticAlgorithm,
            SolverStrategy::Ilp,
            SolverStrategy::Manual,
        ] {
            let solver = PlacementSolver::new(Arc::clone(&catalog), strategy).with_seed(11);
            let solution = solver.solve(&spec(), None);
            assert_eq!(solution.len(), 1, "{strategy:?} failed to place the role");
            let candidate = &solution["tips"];
            assert!((1..=11).contains(&candidate.slot));
        }
    }

    #[test]
    fn ilp_output_matches_greedy() {
        let catalog = Arc::new(ResourceCatalog::with_builtins());
        let greedy = PlacementSolver::new(Arc::clone(&catalog), SolverStrategy::Greedy)
            .solve(&spec(), None);
        let ilp = PlacementSolver::new(catalog, SolverStrategy::Ilp).solve(&spec(), None);
        assert_eq!(greedy, ilp);
    }
}
