//! Runs the self-financed, bank-financed and consortium models over the same
//! development and ranks them.

pub mod comparator;

pub use comparator::{
    compare_scenarios, ConsortiumTerms, ProjectScenario, Ranking, ScenarioComparison,
    ScenarioRun, SimulationRequest,
};
