use super::{PersistenceError, PersistenceResult};
use crate::config::RosterConfig;
use crate::data_model::{DataModel, DateSlot};
use crate::employee::Employee;
use crate::roster::Roster;
use crate::solver::Assignment;
use crate::validation::{self, RawRecord};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Reads a headed CSV table into raw records, checking `required` columns first.
pub fn read_records<R: Read>(
    reader: R,
    table: &str,
    required: &[String],
) -> PersistenceResult<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(validation::normalize_header)
        .collect();
    validation::validate_headers(table, &headers, required)?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(RawRecord::from_pairs(
            headers.iter().zip(record.iter().map(str::to_string)),
        ));
    }
    debug!(table, rows = records.len(), "read csv table");
    Ok(records)
}

fn read_employee_records<R: Read>(reader: R, roles: &[String]) -> PersistenceResult<Vec<RawRecord>> {
    let records = read_records(reader, "employee", &DataModel::employee_columns(roles))?;
    if records.is_empty() {
        return Err(PersistenceError::InvalidData(
            "employee table contained no rows".into(),
        ));
    }
    Ok(records)
}

fn read_date_records<R: Read>(reader: R) -> PersistenceResult<Vec<RawRecord>> {
    let records = read_records(reader, "date", &DataModel::date_columns())?;
    if records.is_empty() {
        return Err(PersistenceError::InvalidData(
            "date table contained no rows".into(),
        ));
    }
    Ok(records)
}

pub fn load_employees_from_csv<P: AsRef<Path>>(
    path: P,
    roles: &[String],
) -> PersistenceResult<Vec<Employee>> {
    let records = read_employee_records(File::open(path)?, roles)?;
    Ok(DataModel::employees_from_records(roles, &records)?)
}

pub fn load_dates_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<DateSlot>> {
    let records = read_date_records(File::open(path)?)?;
    Ok(DataModel::date_slots_from_records(&records)?)
}

pub fn load_data_model_from_readers<E: Read, D: Read>(
    employees: E,
    dates: D,
    roles: &[String],
) -> PersistenceResult<DataModel> {
    let employee_records = read_employee_records(employees, roles)?;
    let date_records = read_date_records(dates)?;
    Ok(DataModel::from_records(roles, &employee_records, &date_records)?)
}

pub fn load_data_model_from_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    employees_path: P,
    dates_path: Q,
    roles: &[String],
) -> PersistenceResult<DataModel> {
    let employees = load_employees_from_csv(employees_path, roles)?;
    let dates = load_dates_from_csv(dates_path)?;
    Ok(DataModel::from_slots(roles.to_vec(), employees, dates)?)
}

pub fn write_roster_csv<W: Write>(roster: &Roster, writer: W) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(roster.header())?;
    for record in roster.records() {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_roster_to_csv<P: AsRef<Path>>(roster: &Roster, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    write_roster_csv(roster, file)
}

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<RosterConfig> {
    let file = File::open(path)?;
    let config: RosterConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config_to_json<P: AsRef<Path>>(config: &RosterConfig, path: P) -> PersistenceResult<()> {
    config.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

pub fn save_assignment_to_json<P: AsRef<Path>>(
    assignment: &Assignment,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer(file, assignment)?;
    Ok(())
}

pub fn load_assignment_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Assignment> {
    let file = File::open(path)?;
    let assignment: Assignment = serde_json::from_reader(file)?;
    if assignment.values().iter().any(|value| !value.is_finite()) {
        return Err(PersistenceError::InvalidData(
            "assignment snapshot contains non-finite values".into(),
        ));
    }
    Ok(assignment)
}
