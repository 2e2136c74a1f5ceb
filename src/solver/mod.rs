//! Contract between the roster formulation and an optimization engine.
//!
//! The formulation only declares variables, linear constraints and an
//! objective through [`SolverBackend`]; how the engine searches is its own
//! business.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub mod linear_model;
pub mod microlp;

pub use linear_model::{LinearConstraint, LinearModel, VarKind, VariableDecl};
pub use microlp::MicroLpBackend;

/// Values above this count as "assigned" when reading boolean variables.
pub const ASSIGNED_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarHandle(usize);

impl VarHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub var: VarHandle,
    pub coefficient: f64,
}

impl Term {
    pub fn new(var: VarHandle, coefficient: f64) -> Self {
        Self { var, coefficient }
    }

    pub fn unit(var: VarHandle) -> Self {
        Self::new(var, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    LessEq,
    Equal,
    GreaterEq,
}

impl Comparator {
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Comparator::LessEq => lhs <= rhs + tolerance,
            Comparator::Equal => (lhs - rhs).abs() <= tolerance,
            Comparator::GreaterEq => lhs >= rhs - tolerance,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::LessEq => "<=",
            Comparator::Equal => "==",
            Comparator::GreaterEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unbounded,
    Timeout,
    Error,
}

impl SolveStatus {
    pub fn is_success(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unbounded => "UNBOUNDED",
            SolveStatus::Timeout => "TIMEOUT",
            SolveStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solved values for every declared variable, indexed by [`VarHandle`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, var: VarHandle) -> Option<f64> {
        self.values.get(var.index()).copied()
    }

    /// Boolean reading of a variable; `None` when the handle is out of range.
    pub fn is_set(&self, var: VarHandle) -> Option<bool> {
        self.value(var).map(|value| value > ASSIGNED_THRESHOLD)
    }

    pub fn set(&mut self, var: VarHandle, value: f64) {
        if var.index() >= self.values.len() {
            self.values.resize(var.index() + 1, 0.0);
        }
        self.values[var.index()] = value;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Present for `Optimal`/`Feasible`, and for `Timeout` when the engine kept an incumbent.
    pub assignment: Option<Assignment>,
    pub detail: Option<String>,
    pub elapsed: Duration,
}

impl SolveOutcome {
    pub fn solved(status: SolveStatus, assignment: Assignment, elapsed: Duration) -> Self {
        Self {
            status,
            assignment: Some(assignment),
            detail: None,
            elapsed,
        }
    }

    pub fn failed(status: SolveStatus, detail: Option<String>, elapsed: Duration) -> Self {
        Self {
            status,
            assignment: None,
            detail,
            elapsed,
        }
    }
}

/// Declarations accumulate until [`SolverBackend::solve`]; after a successful
/// solve, [`SolverBackend::value_of`] reads the solved values.
pub trait SolverBackend {
    /// Discards every declaration and solved value, leaving an empty model.
    fn reset(&mut self);

    fn declare_boolean_variable(&mut self, name: &str) -> VarHandle;

    fn declare_integer_variable(&mut self, name: &str, lower: i64, upper: i64) -> VarHandle;

    fn add_linear_constraint(&mut self, terms: &[Term], comparator: Comparator, bound: f64);

    fn set_objective(&mut self, terms: &[Term], sense: Sense);

    fn solve(&mut self, time_limit: Option<Duration>) -> SolveOutcome;

    fn value_of(&self, var: VarHandle) -> Option<f64>;
}
