use crate::formulation::InfeasibilityReport;
use crate::persistence::PersistenceError;
use crate::roster::AssemblyError;
use crate::solver::Assignment;
use crate::validation::ValidationError;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum RosterError {
    Validation(ValidationError),
    InfeasibleModel(InfeasibilityReport),
    SolverTimeout {
        time_limit: Option<Duration>,
        incumbent: Option<Assignment>,
    },
    Assembly(AssemblyError),
    Engine(String),
    Persistence(PersistenceError),
}

impl RosterError {
    /// Whether retrying with a larger time budget could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RosterError::SolverTimeout { .. })
    }
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::Validation(err) => write!(f, "invalid input: {err}"),
            RosterError::InfeasibleModel(report) => write!(f, "{report}"),
            RosterError::SolverTimeout {
                time_limit,
                incumbent,
            } => {
                match time_limit {
                    Some(limit) => write!(f, "solver did not finish within {limit:?}")?,
                    None => write!(f, "solver timed out")?,
                }
                if incumbent.is_some() {
                    write!(f, " (a feasible but unproven roster is available)")?;
                }
                Ok(())
            }
            RosterError::Assembly(err) => write!(f, "roster assembly failed: {err}"),
            RosterError::Engine(msg) => write!(f, "optimization engine error: {msg}"),
            RosterError::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<ValidationError> for RosterError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AssemblyError> for RosterError {
    fn from(value: AssemblyError) -> Self {
        Self::Assembly(value)
    }
}

impl From<PersistenceError> for RosterError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Validation(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
