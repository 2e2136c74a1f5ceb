use super::{
    Assignment, Comparator, LinearModel, Sense, SolveOutcome, SolveStatus, SolverBackend, Term,
    VarHandle, VarKind,
};
use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// [`SolverBackend`] backed by `good_lp`'s pure-Rust microlp branch-and-bound.
///
/// Declarations are recorded in a [`LinearModel`] and translated in one go
/// when [`SolverBackend::solve`] runs. The solve happens on a worker thread so
/// a time limit can be honoured; microlp keeps no incumbent, so an expired
/// limit always reports `Timeout` without an assignment.
///
/// microlp cannot be interrupted. After a timeout the worker keeps running on
/// its own copy of the model until it finishes, and its result is discarded.
/// [`MicroLpBackend::is_solving`] reports whether that worker is still busy;
/// a new solve started meanwhile runs alongside it.
#[derive(Debug, Default)]
pub struct MicroLpBackend {
    model: LinearModel,
    solved: Option<Assignment>,
    worker: Option<JoinHandle<()>>,
}

impl MicroLpBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn solved_assignment(&self) -> Option<&Assignment> {
        self.solved.as_ref()
    }

    /// Whether a worker abandoned by an expired time limit is still running.
    pub fn is_solving(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }
}

impl SolverBackend for MicroLpBackend {
    fn declare_boolean_variable(&mut self, name: &str) -> VarHandle {
        self.model.declare(name, VarKind::Boolean)
    }

    fn declare_integer_variable(&mut self, name: &str, lower: i64, upper: i64) -> VarHandle {
        self.model.declare(name, VarKind::Integer { lower, upper })
    }

    fn add_linear_constraint(&mut self, terms: &[Term], comparator: Comparator, bound: f64) {
        self.model.add_constraint(terms, comparator, bound);
    }

    fn set_objective(&mut self, terms: &[Term], sense: Sense) {
        self.model.set_objective(terms, sense);
    }

    fn reset(&mut self) {
        self.model = LinearModel::new();
        self.solved = None;
    }

    fn solve(&mut self, time_limit: Option<Duration>) -> SolveOutcome {
        self.solved = None;
        if self.is_solving() {
            warn!("previous microlp solve is still running after its time limit");
        }
        let started = Instant::now();
        let model = self.model.clone();
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("microlp-solve".to_string())
            .spawn(move || {
                let _ = sender.send(solve_linear_model(&model));
            });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(err) => {
                return SolveOutcome::failed(
                    SolveStatus::Error,
                    Some(format!("could not start solver thread: {err}")),
                    started.elapsed(),
                );
            }
        };

        let received = match time_limit {
            Some(limit) => match receiver.recv_timeout(limit) {
                Ok(result) => Some(result),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(?limit, "solver time limit reached before a result was available");
                    self.worker = Some(worker);
                    return SolveOutcome::failed(
                        SolveStatus::Timeout,
                        Some(format!("no result within {limit:?}")),
                        started.elapsed(),
                    );
                }
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => receiver.recv().ok(),
        };
        let elapsed = started.elapsed();
        // The result has been received, so the worker is about to exit.
        let _ = worker.join();

        let outcome = match received {
            Some(Ok(values)) => {
                let assignment = Assignment::new(values);
                self.solved = Some(assignment.clone());
                SolveOutcome::solved(SolveStatus::Optimal, assignment, elapsed)
            }
            Some(Err(ResolutionError::Infeasible)) => {
                SolveOutcome::failed(SolveStatus::Infeasible, None, elapsed)
            }
            Some(Err(ResolutionError::Unbounded)) => {
                SolveOutcome::failed(SolveStatus::Unbounded, None, elapsed)
            }
            Some(Err(err)) => SolveOutcome::failed(SolveStatus::Error, Some(err.to_string()), elapsed),
            None => SolveOutcome::failed(
                SolveStatus::Error,
                Some("solver thread terminated without a result".to_string()),
                elapsed,
            ),
        };
        debug!(status = %outcome.status, ?elapsed, "microlp solve finished");
        outcome
    }

    fn value_of(&self, var: VarHandle) -> Option<f64> {
        self.solved.as_ref().and_then(|assignment| assignment.value(var))
    }
}

fn solve_linear_model(model: &LinearModel) -> Result<Vec<f64>, ResolutionError> {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .variables()
        .iter()
        .map(|decl| {
            let definition = match decl.kind {
                VarKind::Boolean => variable().binary(),
                VarKind::Integer { lower, upper } => {
                    variable().integer().min(lower as f64).max(upper as f64)
                }
            };
            vars.add(definition.name(decl.name.clone()))
        })
        .collect();

    let objective = expression(&handles, model.objective());
    let unsolved = match model.sense() {
        Sense::Maximize => vars.maximise(objective),
        Sense::Minimize => vars.minimise(objective),
    };
    let mut problem = unsolved.using(default_solver);

    for linear in model.constraints() {
        let lhs = expression(&handles, &linear.terms);
        let rhs = Expression::from(linear.bound);
        let translated = match linear.comparator {
            Comparator::LessEq => constraint::leq(lhs, rhs),
            Comparator::Equal => constraint::eq(lhs, rhs),
            Comparator::GreaterEq => constraint::geq(lhs, rhs),
        };
        problem.add_constraint(translated);
    }

    let solution = problem.solve()?;
    Ok(handles.iter().map(|&var| solution.value(var)).collect())
}

fn expression(handles: &[Variable], terms: &[Term]) -> Expression {
    let mut expr = Expression::from(0.0);
    for term in terms {
        expr += term.coefficient * handles[term.var.index()];
    }
    expr
}
