use super::{Assignment, Comparator, Sense, Term, VarHandle};
use serde::{Deserialize, Serialize};

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Boolean,
    Integer { lower: i64, upper: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub kind: VarKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub terms: Vec<Term>,
    pub comparator: Comparator,
    pub bound: f64,
}

impl LinearConstraint {
    pub fn lhs(&self, assignment: &Assignment) -> f64 {
        self.terms
            .iter()
            .map(|term| term.coefficient * assignment.value(term.var).unwrap_or(0.0))
            .sum()
    }

    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.comparator
            .holds(self.lhs(assignment), self.bound, FEASIBILITY_TOLERANCE)
    }
}

/// Engine-neutral record of everything declared for one solve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearModel {
    variables: Vec<VariableDecl>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<Term>,
    sense: Sense,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, kind: VarKind) -> VarHandle {
        let handle = VarHandle::new(self.variables.len());
        self.variables.push(VariableDecl {
            name: name.to_string(),
            kind,
        });
        handle
    }

    pub fn add_constraint(&mut self, terms: &[Term], comparator: Comparator, bound: f64) {
        self.constraints.push(LinearConstraint {
            terms: terms.to_vec(),
            comparator,
            bound,
        });
    }

    pub fn set_objective(&mut self, terms: &[Term], sense: Sense) {
        self.objective = terms.to_vec();
        self.sense = sense;
    }

    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    pub fn variable(&self, var: VarHandle) -> Option<&VariableDecl> {
        self.variables.get(var.index())
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[Term] {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.objective
            .iter()
            .map(|term| term.coefficient * assignment.value(term.var).unwrap_or(0.0))
            .sum()
    }

    /// Indices of constraints the assignment breaks.
    pub fn violated_constraints(&self, assignment: &Assignment) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, constraint)| !constraint.is_satisfied_by(assignment))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Handles whose value lies outside the declared domain or is not integral.
    pub fn domain_violations(&self, assignment: &Assignment) -> Vec<VarHandle> {
        self.variables
            .iter()
            .enumerate()
            .filter_map(|(idx, decl)| {
                let handle = VarHandle::new(idx);
                let value = match assignment.value(handle) {
                    Some(value) => value,
                    None => return Some(handle),
                };
                let (lower, upper) = match decl.kind {
                    VarKind::Boolean => (0.0, 1.0),
                    VarKind::Integer { lower, upper } => (lower as f64, upper as f64),
                };
                let integral = (value - value.round()).abs() <= FEASIBILITY_TOLERANCE;
                let in_range = value >= lower - FEASIBILITY_TOLERANCE
                    && value <= upper + FEASIBILITY_TOLERANCE;
                (!integral || !in_range).then_some(handle)
            })
            .collect()
    }
}
