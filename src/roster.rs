use crate::calendar::{self, date_to_epoch_days};
use crate::config::RosterConfig;
use crate::data_model::DataModel;
use crate::formulation::VariableGrid;
use crate::solver::Assignment;
use chrono::{NaiveDate, Weekday};
use polars::prelude::*;
use std::collections::HashMap;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    QuotaMismatch {
        date: NaiveDate,
        role: String,
        expected: u32,
        found: usize,
    },
    DoubleBooked {
        date: NaiveDate,
        employee: String,
        roles: Vec<String>,
    },
    MissingValue {
        employee: String,
        date: NaiveDate,
        role: String,
    },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyError::QuotaMismatch {
                date,
                role,
                expected,
                found,
            } => write!(
                f,
                "{} role {role}: solver filled {found} slots, quota is {expected}",
                calendar::format_date(*date)
            ),
            AssemblyError::DoubleBooked {
                date,
                employee,
                roles,
            } => write!(
                f,
                "{} employee {employee} assigned to several roles: {}",
                calendar::format_date(*date),
                roles.join(", ")
            ),
            AssemblyError::MissingValue {
                employee,
                date,
                role,
            } => write!(
                f,
                "no solved value for {employee} on {} as {role}",
                calendar::format_date(*date)
            ),
        }
    }
}

impl std::error::Error for AssemblyError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// One employee name per slot label, in label order.
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    slot_labels: Vec<String>,
    rows: Vec<RosterRow>,
}

impl Roster {
    pub fn slot_labels(&self) -> &[String] {
        &self.slot_labels
    }

    pub fn rows(&self) -> &[RosterRow] {
        &self.rows
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.slot_labels.len() + 2);
        header.push("Date".to_string());
        header.push("Day".to_string());
        header.extend(self.slot_labels.iter().cloned());
        header
    }

    /// Cells of each row in header order.
    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Vec::with_capacity(row.slots.len() + 2);
                record.push(calendar::format_date(row.date));
                record.push(calendar::weekday_name(row.weekday).to_string());
                record.extend(row.slots.iter().cloned());
                record
            })
            .collect()
    }

    pub fn assignee(&self, date: NaiveDate, slot_label: &str) -> Option<&str> {
        let column = self.slot_labels.iter().position(|label| label == slot_label)?;
        self.rows
            .iter()
            .find(|row| row.date == date)
            .and_then(|row| row.slots.get(column))
            .map(String::as_str)
    }

    /// Number of nights each employee works, in employee input order.
    pub fn assignment_counts(&self, data: &DataModel) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            for name in &row.slots {
                *counts.entry(name.as_str()).or_default() += 1;
            }
        }
        data.employees()
            .iter()
            .map(|employee| {
                let count = counts.get(employee.name.as_str()).copied().unwrap_or(0);
                (employee.name.clone(), count)
            })
            .collect()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.slot_labels.len() + 2);

        let dates: Vec<i32> = self.rows.iter().map(|row| date_to_epoch_days(row.date)).collect();
        columns.push(
            Series::new(PlSmallStr::from_static("Date"), dates)
                .cast(&DataType::Date)?
                .into_column(),
        );

        let days: Vec<&str> = self
            .rows
            .iter()
            .map(|row| calendar::weekday_name(row.weekday))
            .collect();
        columns.push(Series::new(PlSmallStr::from_static("Day"), days).into_column());

        for (idx, label) in self.slot_labels.iter().enumerate() {
            let names: Vec<&str> = self
                .rows
                .iter()
                .map(|row| row.slots.get(idx).map(String::as_str).unwrap_or(""))
                .collect();
            columns.push(Series::new(label.as_str().into(), names).into_column());
        }

        DataFrame::new(columns)
    }
}

/// Output column labels: the bare role name for quota 1, `<Role>1..N` above that.
pub fn slot_labels(config: &RosterConfig) -> Vec<String> {
    let mut labels = Vec::with_capacity(config.total_quota() as usize);
    for role in &config.roles {
        match role.quota {
            0 => {}
            1 => labels.push(role.name.clone()),
            quota => labels.extend((1..=quota).map(|ordinal| format!("{}{ordinal}", role.name))),
        }
    }
    labels
}

/// Reads solved assignment values back into a [`Roster`].
///
/// Pure over its inputs: the same snapshot always yields the same roster.
pub struct ScheduleAssembler<'a> {
    data: &'a DataModel,
    config: &'a RosterConfig,
    grid: &'a VariableGrid,
}

impl<'a> ScheduleAssembler<'a> {
    pub fn new(data: &'a DataModel, config: &'a RosterConfig, grid: &'a VariableGrid) -> Self {
        Self { data, config, grid }
    }

    pub fn assemble(&self, assignment: &Assignment) -> Result<Roster, AssemblyError> {
        let employees = self.data.employees();
        let roles = self.data.roles();
        let mut rows = Vec::with_capacity(self.data.date_slots().len());

        for (d, slot) in self.data.date_slots().iter().enumerate() {
            let mut selected: Vec<Vec<usize>> = vec![Vec::new(); roles.len()];
            for (e, employee) in employees.iter().enumerate() {
                let mut held = Vec::new();
                for (r, role) in roles.iter().enumerate() {
                    let assigned = assignment.is_set(self.grid.assign(e, d, r)).ok_or_else(|| {
                        AssemblyError::MissingValue {
                            employee: employee.name.clone(),
                            date: slot.date(),
                            role: role.clone(),
                        }
                    })?;
                    if assigned {
                        selected[r].push(e);
                        held.push(role.clone());
                    }
                }
                if held.len() > 1 {
                    return Err(AssemblyError::DoubleBooked {
                        date: slot.date(),
                        employee: employee.name.clone(),
                        roles: held,
                    });
                }
            }

            let mut cells = Vec::with_capacity(self.config.total_quota() as usize);
            for (r, role) in roles.iter().enumerate() {
                let expected = self.config.quota(r);
                // Employee indices are pushed in input order, so ordinals are stable.
                let chosen = &selected[r];
                if chosen.len() != expected as usize {
                    return Err(AssemblyError::QuotaMismatch {
                        date: slot.date(),
                        role: role.clone(),
                        expected,
                        found: chosen.len(),
                    });
                }
                cells.extend(chosen.iter().map(|&e| employees[e].name.clone()));
            }

            rows.push(RosterRow {
                date: slot.date(),
                weekday: slot.weekday(),
                slots: cells,
            });
        }

        info!(dates = rows.len(), "assembled roster");
        Ok(Roster {
            slot_labels: slot_labels(self.config),
            rows,
        })
    }
}
