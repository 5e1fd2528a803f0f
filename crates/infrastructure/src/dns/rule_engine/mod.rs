pub mod adult;
pub mod engine;
pub mod suffix;

pub use adult::AdultHeuristic;
pub use engine::RuleEngine;
pub use suffix::domain_matches;
