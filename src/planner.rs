use crate::config::RosterConfig;
use crate::data_model::DataModel;
use crate::error::{RosterError, RosterResult};
use crate::formulation::{
    check_coverage, ConstraintModelBuilder, FormulatedModel, InfeasibilityReport,
    InfeasibilitySource,
};
use crate::roster::{Roster, ScheduleAssembler};
use crate::solver::{Assignment, SolveStatus, SolverBackend};
use crate::validation::ValidationError;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RosterPlan {
    pub roster: Roster,
    /// `Timeout` only when the caller opted into unproven incumbents.
    pub status: SolveStatus,
    pub objective: f64,
    pub assignment: Assignment,
    pub model: FormulatedModel,
    pub elapsed: Duration,
}

/// Runs precheck, formulation, solve and assembly for one data set.
///
/// The backend is reset before formulation, so it may be reused across calls.
pub fn plan_roster<B: SolverBackend>(
    data: &DataModel,
    config: &RosterConfig,
    backend: &mut B,
) -> RosterResult<RosterPlan> {
    config.validate()?;
    if data.roles() != config.role_names().as_slice() {
        return Err(RosterError::Validation(ValidationError::new(format!(
            "data model roles [{}] do not match configured roles [{}]",
            data.roles().join(", "),
            config.role_names().join(", ")
        ))));
    }

    let shortfalls = check_coverage(data, config);
    if !shortfalls.is_empty() {
        for shortfall in &shortfalls {
            warn!(%shortfall, "coverage shortfall");
        }
        return Err(RosterError::InfeasibleModel(InfeasibilityReport {
            source: InfeasibilitySource::Precheck,
            shortfalls,
        }));
    }

    // Anything declared earlier on this backend would be solved alongside the roster.
    backend.reset();
    let model = ConstraintModelBuilder::new(data, config).build(backend);
    let time_limit = config.time_limit();
    let outcome = backend.solve(time_limit);
    info!(status = %outcome.status, elapsed = ?outcome.elapsed, "solve finished");

    let assignment = match (outcome.status, outcome.assignment) {
        (status, Some(assignment)) if status.is_success() => assignment,
        (status, None) if status.is_success() => {
            return Err(RosterError::Engine(format!(
                "engine reported {status} without an assignment"
            )));
        }
        (SolveStatus::Infeasible, _) => {
            return Err(RosterError::InfeasibleModel(InfeasibilityReport {
                source: InfeasibilitySource::Solver,
                shortfalls: Vec::new(),
            }));
        }
        (SolveStatus::Timeout, Some(incumbent)) if config.accept_timeout_incumbent => {
            warn!("using unproven incumbent after solver timeout");
            incumbent
        }
        (SolveStatus::Timeout, incumbent) => {
            return Err(RosterError::SolverTimeout {
                time_limit,
                incumbent,
            });
        }
        (SolveStatus::Unbounded, _) => {
            return Err(RosterError::Engine(
                "engine reported the roster model as unbounded".to_string(),
            ));
        }
        (status, _) => {
            let detail = outcome.detail.unwrap_or_else(|| "no detail".to_string());
            return Err(RosterError::Engine(format!("{status}: {detail}")));
        }
    };

    let roster = ScheduleAssembler::new(data, config, &model.grid).assemble(&assignment)?;
    let objective = objective_value(data, config, &model, &assignment);
    Ok(RosterPlan {
        roster,
        status: outcome.status,
        objective,
        assignment,
        model,
        elapsed: outcome.elapsed,
    })
}

/// Preference-weighted value of an assignment, recomputed from the inputs.
pub fn objective_value(
    data: &DataModel,
    config: &RosterConfig,
    model: &FormulatedModel,
    assignment: &Assignment,
) -> f64 {
    let mut total = 0.0;
    for (e, employee) in data.employees().iter().enumerate() {
        for (d, slot) in data.date_slots().iter().enumerate() {
            for r in 0..data.roles().len() {
                if assignment.is_set(model.grid.assign(e, d, r)).unwrap_or(false) {
                    total += employee.preference(slot.weekday()) + config.preference_bonus;
                }
            }
        }
    }
    total
}
