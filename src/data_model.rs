use crate::calendar::{self, WeekdayTable};
use crate::employee::Employee;
use crate::validation::{self, RawRecord, ValidationError};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const EMPLOYEE_TABLE: &str = "employee";
const DATE_TABLE: &str = "date";

/// A covered date. The weekday is always derived from the date itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSlot {
    date: NaiveDate,
    weekday: Weekday,
}

impl DateSlot {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            weekday: date.weekday(),
        }
    }

    /// Builds a slot from a date and a caller-supplied weekday name, rejecting
    /// names outside Monday..Sunday and names that disagree with the date.
    pub fn with_supplied_weekday(date: NaiveDate, supplied: &str) -> Result<Self, ValidationError> {
        let slot = Self::new(date);
        let weekday = calendar::parse_weekday(supplied).ok_or_else(|| {
            ValidationError::new(format!("'{}' is not a weekday name", supplied.trim()))
        })?;
        if weekday != slot.weekday {
            return Err(ValidationError::new(format!(
                "{date} is a {}, but the supplied day is '{}'",
                calendar::weekday_name(slot.weekday),
                supplied.trim()
            )));
        }
        Ok(slot)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }
}

/// Validated employees and date slots for one planning run.
///
/// Employees keep their input order, which is also their dense index. Date
/// slots are sorted ascending and unique.
#[derive(Debug, Clone, PartialEq)]
pub struct DataModel {
    roles: Vec<String>,
    employees: Vec<Employee>,
    dates: Vec<DateSlot>,
}

impl DataModel {
    pub fn new(
        roles: Vec<String>,
        employees: Vec<Employee>,
        dates: Vec<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let slots = dates.into_iter().map(DateSlot::new).collect();
        Self::from_parts(roles, employees, slots)
    }

    /// Interprets raw table rows. `roles` fixes the order of each employee's
    /// eligibility flags and which `role_<ROLE>` columns are required.
    pub fn from_records(
        roles: &[String],
        employee_records: &[RawRecord],
        date_records: &[RawRecord],
    ) -> Result<Self, ValidationError> {
        let employees = Self::employees_from_records(roles, employee_records)?;
        let dates = Self::date_slots_from_records(date_records)?;
        Self::from_parts(roles.to_vec(), employees, dates)
    }

    /// Interprets employee rows on their own. Cross-row checks such as
    /// duplicate names happen when the model is assembled.
    pub fn employees_from_records(
        roles: &[String],
        records: &[RawRecord],
    ) -> Result<Vec<Employee>, ValidationError> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| employee_from_record(roles, idx + 1, record))
            .collect()
    }

    pub fn date_slots_from_records(records: &[RawRecord]) -> Result<Vec<DateSlot>, ValidationError> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| date_slot_from_record(idx + 1, record))
            .collect()
    }

    /// Like [`DataModel::new`], for prebuilt slots. A slot whose weekday
    /// disagrees with its date is rejected.
    pub fn from_slots(
        roles: Vec<String>,
        employees: Vec<Employee>,
        dates: Vec<DateSlot>,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(roles, employees, dates)
    }

    fn from_parts(
        roles: Vec<String>,
        employees: Vec<Employee>,
        mut dates: Vec<DateSlot>,
    ) -> Result<Self, ValidationError> {
        let mut role_names = HashSet::with_capacity(roles.len());
        for role in &roles {
            if !role_names.insert(role.to_ascii_lowercase()) {
                return Err(ValidationError::new(format!("duplicate role '{role}'")));
            }
        }

        let mut names = HashSet::with_capacity(employees.len());
        for employee in &employees {
            if employee.name.trim().is_empty() {
                return Err(ValidationError::new("employee name must not be blank"));
            }
            if !names.insert(employee.name.as_str()) {
                return Err(ValidationError::new(format!(
                    "duplicate employee '{}'",
                    employee.name
                )));
            }
            if employee.eligible_roles.len() != roles.len() {
                return Err(ValidationError::new(format!(
                    "employee '{}' has {} eligibility flags for {} roles",
                    employee.name,
                    employee.eligible_roles.len(),
                    roles.len()
                )));
            }
            if let Some((day, score)) = employee.preferences.iter().find(|(_, s)| !s.is_finite()) {
                return Err(ValidationError::new(format!(
                    "employee '{}' has non-finite {} preference {score}",
                    employee.name,
                    calendar::weekday_name(day)
                )));
            }
        }

        if let Some(slot) = dates.iter().find(|slot| slot.weekday != slot.date.weekday()) {
            return Err(ValidationError::new(format!(
                "{} is a {}, but its slot says {}",
                calendar::format_date(slot.date),
                calendar::weekday_name(slot.date.weekday()),
                calendar::weekday_name(slot.weekday)
            )));
        }

        dates.sort_by_key(DateSlot::date);
        if let Some(pair) = dates.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ValidationError::new(format!(
                "duplicate date {}",
                calendar::format_date(pair[0].date)
            )));
        }

        debug!(
            employees = employees.len(),
            dates = dates.len(),
            roles = roles.len(),
            "validated data model"
        );
        Ok(Self {
            roles,
            employees,
            dates,
        })
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn date_slots(&self) -> &[DateSlot] {
        &self.dates
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.dates.iter().map(DateSlot::date).collect()
    }

    pub fn employee_index(&self, name: &str) -> Option<usize> {
        self.employees.iter().position(|employee| employee.name == name)
    }

    pub fn role_index(&self, role: &str) -> Option<usize> {
        self.roles.iter().position(|candidate| candidate == role)
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search_by_key(&date, DateSlot::date).ok()
    }

    pub fn weekday_of(&self, date: NaiveDate) -> Option<Weekday> {
        self.date_index(date).map(|idx| self.dates[idx].weekday)
    }

    /// Required columns of the employee table for a role list.
    pub fn employee_columns(roles: &[String]) -> Vec<String> {
        let mut columns = Vec::with_capacity(1 + roles.len() + 14);
        columns.push("name".to_string());
        columns.extend(roles.iter().map(|role| role_column(role)));
        for day in calendar::ALL_WEEKDAYS {
            columns.push(availability_column(day));
        }
        for day in calendar::ALL_WEEKDAYS {
            columns.push(preference_column(day));
        }
        columns
    }

    pub fn date_columns() -> Vec<String> {
        vec!["date".to_string()]
    }
}

pub fn role_column(role: &str) -> String {
    format!("role_{}", role.to_ascii_lowercase())
}

pub fn availability_column(day: Weekday) -> String {
    format!("{}_avail", calendar::weekday_key(day))
}

pub fn preference_column(day: Weekday) -> String {
    format!("{}_pref", calendar::weekday_key(day))
}

fn employee_from_record(
    roles: &[String],
    row: usize,
    record: &RawRecord,
) -> Result<Employee, ValidationError> {
    let name = record.require(EMPLOYEE_TABLE, row, "name")?.trim();
    if name.is_empty() {
        return Err(ValidationError::new(format!(
            "{EMPLOYEE_TABLE} row {row}: name must not be blank"
        )));
    }

    let eligible_roles = roles
        .iter()
        .map(|role| {
            let key = role_column(role);
            let value = record.require(EMPLOYEE_TABLE, row, &key)?;
            validation::parse_flag(EMPLOYEE_TABLE, row, &key, value)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let availability = WeekdayTable::try_from_fn(|day| {
        let key = availability_column(day);
        let value = record.require(EMPLOYEE_TABLE, row, &key)?;
        validation::parse_flag(EMPLOYEE_TABLE, row, &key, value)
    })?;

    let preferences = WeekdayTable::try_from_fn(|day| {
        let key = preference_column(day);
        let value = record.require(EMPLOYEE_TABLE, row, &key)?;
        validation::parse_score(EMPLOYEE_TABLE, row, &key, value)
    })?;

    Ok(Employee::new(name, eligible_roles, availability, preferences))
}

fn date_slot_from_record(row: usize, record: &RawRecord) -> Result<DateSlot, ValidationError> {
    let raw = record.require(DATE_TABLE, row, "date")?;
    let date = calendar::parse_date(raw).ok_or_else(|| {
        ValidationError::new(format!(
            "{DATE_TABLE} row {row}: unparsable date '{}'",
            raw.trim()
        ))
    })?;
    match record.get("day").map(str::trim).filter(|day| !day.is_empty()) {
        Some(day) => DateSlot::with_supplied_weekday(date, day)
            .map_err(|err| ValidationError::new(format!("{DATE_TABLE} row {row}: {err}"))),
        None => Ok(DateSlot::new(date)),
    }
}
