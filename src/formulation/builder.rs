use super::variables::VariableGrid;
use crate::calendar::{self, DateWindows};
use crate::config::RosterConfig;
use crate::data_model::DataModel;
use crate::solver::{Comparator, Sense, SolverBackend, Term};
use tracing::info;

/// Number of constraints emitted per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintCounts {
    pub window_link: usize,
    pub single_shift: usize,
    pub quota: usize,
    pub window_cap: usize,
    pub eligibility: usize,
    pub availability: usize,
}

impl ConstraintCounts {
    pub fn total(&self) -> usize {
        self.window_link
            + self.single_shift
            + self.quota
            + self.window_cap
            + self.eligibility
            + self.availability
    }
}

/// What the builder declared: the handle grid plus bookkeeping.
#[derive(Debug, Clone)]
pub struct FormulatedModel {
    pub grid: VariableGrid,
    pub windows: DateWindows,
    pub counts: ConstraintCounts,
}

/// Translates a [`DataModel`] and [`RosterConfig`] into declarations on a
/// [`SolverBackend`].
///
/// `config.roles` must list the same roles, in the same order, as
/// `data.roles()`; the planner checks this before building.
pub struct ConstraintModelBuilder<'a> {
    data: &'a DataModel,
    config: &'a RosterConfig,
}

impl<'a> ConstraintModelBuilder<'a> {
    pub fn new(data: &'a DataModel, config: &'a RosterConfig) -> Self {
        Self { data, config }
    }

    pub fn build<B: SolverBackend>(&self, backend: &mut B) -> FormulatedModel {
        let employees = self.data.employees();
        let slots = self.data.date_slots();
        let roles = self.data.roles();
        let (n_emp, n_dates, n_roles) = (employees.len(), slots.len(), roles.len());

        let mut grid = VariableGrid::with_capacity(n_emp, n_dates, n_roles);
        let mut counts = ConstraintCounts::default();

        for employee in employees {
            for slot in slots {
                let date = calendar::format_date(slot.date());
                for role in roles {
                    let name = format!("assign[{},{},{}]", employee.name, date, role);
                    grid.push_assign(backend.declare_boolean_variable(&name));
                }
            }
        }

        // The true bound comes from the cap; the domain only needs to be safe.
        let load_upper = (n_roles * n_dates) as i64;
        for employee in employees {
            for slot in slots {
                let name = format!(
                    "load[{},{}]",
                    employee.name,
                    calendar::format_date(slot.date())
                );
                grid.push_load(backend.declare_integer_variable(&name, 0, load_upper));
            }
        }

        let windows = DateWindows::new(&self.data.dates(), self.config.window_half_width_days);
        for e in 0..n_emp {
            for d in 0..n_dates {
                let mut terms = vec![Term::unit(grid.load(e, d))];
                for other in windows.window(d) {
                    for r in 0..n_roles {
                        terms.push(Term::new(grid.assign(e, other, r), -1.0));
                    }
                }
                backend.add_linear_constraint(&terms, Comparator::Equal, 0.0);
                counts.window_link += 1;
            }
        }

        for e in 0..n_emp {
            for d in 0..n_dates {
                let terms: Vec<Term> = (0..n_roles)
                    .map(|r| Term::unit(grid.assign(e, d, r)))
                    .collect();
                backend.add_linear_constraint(&terms, Comparator::LessEq, 1.0);
                counts.single_shift += 1;
            }
        }

        for d in 0..n_dates {
            for r in 0..n_roles {
                let terms: Vec<Term> = (0..n_emp)
                    .map(|e| Term::unit(grid.assign(e, d, r)))
                    .collect();
                let quota = f64::from(self.config.quota(r));
                backend.add_linear_constraint(&terms, Comparator::Equal, quota);
                counts.quota += 1;
            }
        }

        let cap = f64::from(self.config.max_assignments_per_window);
        for e in 0..n_emp {
            for d in 0..n_dates {
                backend.add_linear_constraint(&[Term::unit(grid.load(e, d))], Comparator::LessEq, cap);
                counts.window_cap += 1;
            }
        }

        // A flag of 1 only restates the boolean domain, so only zero flags are emitted.
        for (e, employee) in employees.iter().enumerate() {
            for d in 0..n_dates {
                for r in 0..n_roles {
                    if !employee.is_eligible(r) {
                        backend.add_linear_constraint(
                            &[Term::unit(grid.assign(e, d, r))],
                            Comparator::LessEq,
                            0.0,
                        );
                        counts.eligibility += 1;
                    }
                }
            }
        }

        for (e, employee) in employees.iter().enumerate() {
            for (d, slot) in slots.iter().enumerate() {
                if employee.is_available(slot.weekday()) {
                    continue;
                }
                for r in 0..n_roles {
                    backend.add_linear_constraint(
                        &[Term::unit(grid.assign(e, d, r))],
                        Comparator::LessEq,
                        0.0,
                    );
                    counts.availability += 1;
                }
            }
        }

        let bonus = self.config.preference_bonus;
        let mut objective = Vec::with_capacity(n_emp * n_dates * n_roles);
        for (e, employee) in employees.iter().enumerate() {
            for (d, slot) in slots.iter().enumerate() {
                let weight = employee.preference(slot.weekday()) + bonus;
                for r in 0..n_roles {
                    objective.push(Term::new(grid.assign(e, d, r), weight));
                }
            }
        }
        backend.set_objective(&objective, Sense::Maximize);

        info!(
            employees = n_emp,
            dates = n_dates,
            roles = n_roles,
            constraints = counts.total(),
            "formulated roster model"
        );
        FormulatedModel {
            grid,
            windows,
            counts,
        }
    }
}
