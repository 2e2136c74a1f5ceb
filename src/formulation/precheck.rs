use crate::calendar::{self, DateWindows};
use crate::config::RosterConfig;
use crate::data_model::DataModel;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A necessary condition for feasibility that the input already breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageShortfall {
    /// Fewer eligible and available employees than the role's quota.
    Role {
        date: NaiveDate,
        role: String,
        required: u32,
        available: usize,
    },
    /// The night's combined quota exceeds everyone who could work any role.
    Date {
        date: NaiveDate,
        required: u32,
        available: usize,
    },
    /// Every slot in the window needs filling but each employee may take only
    /// `cap` of them.
    Window {
        date: NaiveDate,
        window_start: NaiveDate,
        window_end: NaiveDate,
        required: u64,
        capacity: u64,
    },
}

impl fmt::Display for CoverageShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageShortfall::Role {
                date,
                role,
                required,
                available,
            } => write!(
                f,
                "{} ({}) role {role}: quota {required}, only {available} eligible and available",
                calendar::format_date(*date),
                calendar::weekday_name(date.weekday()),
            ),
            CoverageShortfall::Date {
                date,
                required,
                available,
            } => write!(
                f,
                "{} ({}) all roles: {required} slots, only {available} employees available",
                calendar::format_date(*date),
                calendar::weekday_name(date.weekday()),
            ),
            CoverageShortfall::Window {
                date,
                window_start,
                window_end,
                required,
                capacity,
            } => write!(
                f,
                "window around {} ({} to {}): {required} slots, per-window cap allows only {capacity}",
                calendar::format_date(*date),
                calendar::format_date(*window_start),
                calendar::format_date(*window_end),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibilitySource {
    Precheck,
    Solver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfeasibilityReport {
    pub source: InfeasibilitySource,
    pub shortfalls: Vec<CoverageShortfall>,
}

impl InfeasibilityReport {
    /// (date, role) pairs named by role-level shortfalls.
    pub fn short_roles(&self) -> Vec<(NaiveDate, &str)> {
        self.shortfalls
            .iter()
            .filter_map(|shortfall| match shortfall {
                CoverageShortfall::Role { date, role, .. } => Some((*date, role.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for InfeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            InfeasibilitySource::Precheck => write!(f, "no feasible roster (coverage precheck)")?,
            InfeasibilitySource::Solver => write!(f, "no feasible roster (solver reported INFEASIBLE)")?,
        }
        if self.shortfalls.is_empty() {
            return write!(
                f,
                "; every night has enough eligible staff, so the per-window cap or single-shift rule conflicts with the quotas"
            );
        }
        for shortfall in &self.shortfalls {
            write!(f, "\n  - {shortfall}")?;
        }
        Ok(())
    }
}

/// Compares each quota against the headcount that could possibly fill it.
///
/// Every reported shortfall proves the model infeasible; an empty result
/// proves nothing.
pub fn check_coverage(data: &DataModel, config: &RosterConfig) -> Vec<CoverageShortfall> {
    let mut shortfalls = Vec::new();
    let employees = data.employees();
    let slots = data.date_slots();

    for slot in slots {
        let weekday = slot.weekday();
        for (r, role) in config.roles.iter().enumerate() {
            let available = employees
                .iter()
                .filter(|employee| employee.can_work(r, weekday))
                .count();
            if available < role.quota as usize {
                shortfalls.push(CoverageShortfall::Role {
                    date: slot.date(),
                    role: role.name.clone(),
                    required: role.quota,
                    available,
                });
            }
        }

        let required = config.total_quota();
        let available = employees
            .iter()
            .filter(|employee| {
                config
                    .roles
                    .iter()
                    .enumerate()
                    .any(|(r, role)| role.quota > 0 && employee.can_work(r, weekday))
            })
            .count();
        if available < required as usize {
            shortfalls.push(CoverageShortfall::Date {
                date: slot.date(),
                required,
                available,
            });
        }
    }

    let windows = DateWindows::new(&data.dates(), config.window_half_width_days);
    let capacity = employees.len() as u64 * u64::from(config.max_assignments_per_window);
    let per_date = u64::from(config.total_quota());
    for (d, slot) in slots.iter().enumerate() {
        let window = windows.window(d);
        let required = window.len() as u64 * per_date;
        if required > capacity {
            shortfalls.push(CoverageShortfall::Window {
                date: slot.date(),
                window_start: slots[window.start].date(),
                window_end: slots[window.end - 1].date(),
                required,
                capacity,
            });
        }
    }

    shortfalls
}
