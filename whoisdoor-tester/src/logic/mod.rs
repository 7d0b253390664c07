pub mod realtime;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use seeds::resolve_seed_inputs;
pub use simulation::{PlayPolicy, SimulationPlan, SimulationSummary, Simulator};
pub use tester::*;
