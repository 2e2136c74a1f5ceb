pub mod builder;
pub mod precheck;
pub mod variables;

pub use builder::{ConstraintCounts, ConstraintModelBuilder, FormulatedModel};
pub use precheck::{check_coverage, CoverageShortfall, InfeasibilityReport, InfeasibilitySource};
pub use variables::VariableGrid;
