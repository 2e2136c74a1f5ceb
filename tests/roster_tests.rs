use chrono::{NaiveDate, Weekday};
use overnight_roster::roster::slot_labels;
use overnight_roster::{
    write_roster_csv, Assignment, AssemblyError, ConstraintModelBuilder, DataModel, Employee,
    FormulatedModel, MicroLpBackend, RoleQuota, RosterConfig, ScheduleAssembler,
};
use polars::prelude::DataType;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Fixture {
    data: DataModel,
    config: RosterConfig,
    backend: MicroLpBackend,
    model: FormulatedModel,
}

// One manager and two overnight staff on a Monday and a Tuesday.
fn fixture() -> Fixture {
    let roles = vec!["MOD".to_string(), "ON".to_string()];
    let employees = ["Ada", "Ben", "Cy", "Dee"]
        .into_iter()
        .map(|name| Employee::unrestricted(name, 2))
        .collect();
    let data = DataModel::new(roles, employees, vec![d(2025, 3, 3), d(2025, 3, 4)]).unwrap();
    let config = RosterConfig::new(vec![RoleQuota::new("MOD", 1), RoleQuota::new("ON", 2)], 1.0);
    let mut backend = MicroLpBackend::new();
    let model = ConstraintModelBuilder::new(&data, &config).build(&mut backend);
    Fixture {
        data,
        config,
        backend,
        model,
    }
}

const MOD: usize = 0;
const ON: usize = 1;

// (employee, date, role) triples of the hand-picked roster.
const PICKS: [(usize, usize, usize); 6] = [
    (2, 0, MOD),
    (0, 0, ON),
    (3, 0, ON),
    (0, 1, MOD),
    (1, 1, ON),
    (2, 1, ON),
];

fn hand_picked(fixture: &Fixture) -> Assignment {
    let grid = &fixture.model.grid;
    let mut assignment = Assignment::zeros(fixture.backend.model().variable_count());
    for (e, d, r) in PICKS {
        assignment.set(grid.assign(e, d, r), 1.0);
    }
    // Both dates sit in one window, so each load is the employee's total.
    for (e, load) in [2.0, 1.0, 2.0, 1.0].into_iter().enumerate() {
        for d in 0..2 {
            assignment.set(grid.load(e, d), load);
        }
    }
    assignment
}

#[test]
fn slot_labels_number_roles_with_several_slots() {
    let config = RosterConfig::new(
        vec![
            RoleQuota::new("MOD", 1),
            RoleQuota::new("ON", 3),
            RoleQuota::new("SPARE", 0),
        ],
        1.0,
    );
    assert_eq!(slot_labels(&config), vec!["MOD", "ON1", "ON2", "ON3"]);
}

#[test]
fn hand_picked_assignment_satisfies_every_constraint() {
    let fixture = fixture();
    let assignment = hand_picked(&fixture);
    let model = fixture.backend.model();
    assert!(model.violated_constraints(&assignment).is_empty());
    assert!(model.domain_violations(&assignment).is_empty());
}

#[test]
fn assembler_fills_slots_in_employee_input_order() {
    let fixture = fixture();
    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, &fixture.model.grid);
    let roster = assembler.assemble(&hand_picked(&fixture)).unwrap();

    assert_eq!(roster.header(), vec!["Date", "Day", "MOD", "ON1", "ON2"]);
    assert_eq!(
        roster.records(),
        vec![
            vec!["2025-03-03", "Monday", "Cy", "Ada", "Dee"],
            vec!["2025-03-04", "Tuesday", "Ada", "Ben", "Cy"],
        ]
    );
    assert_eq!(roster.rows()[1].weekday, Weekday::Tue);
    assert_eq!(roster.assignee(d(2025, 3, 4), "ON2"), Some("Cy"));
    assert_eq!(roster.assignee(d(2025, 3, 5), "ON2"), None);
    assert_eq!(
        roster.assignment_counts(&fixture.data),
        vec![
            ("Ada".to_string(), 2),
            ("Ben".to_string(), 1),
            ("Cy".to_string(), 2),
            ("Dee".to_string(), 1),
        ]
    );
}

#[test]
fn assembler_tolerates_solver_noise() {
    let fixture = fixture();
    let grid = &fixture.model.grid;
    let clean = hand_picked(&fixture);
    let mut noisy = clean.clone();
    for (idx, value) in clean.values().iter().enumerate() {
        let handle = overnight_roster::VarHandle::new(idx);
        if idx < grid.assign_handles().len() {
            noisy.set(handle, if *value > 0.5 { 0.9999997 } else { 2e-7 });
        }
    }

    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, grid);
    assert_eq!(
        assembler.assemble(&noisy).unwrap(),
        assembler.assemble(&clean).unwrap()
    );
}

#[test]
fn unfilled_quota_is_an_assembly_error() {
    let fixture = fixture();
    let mut assignment = hand_picked(&fixture);
    assignment.set(fixture.model.grid.assign(2, 0, MOD), 0.0);

    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, &fixture.model.grid);
    assert_eq!(
        assembler.assemble(&assignment).unwrap_err(),
        AssemblyError::QuotaMismatch {
            date: d(2025, 3, 3),
            role: "MOD".to_string(),
            expected: 1,
            found: 0,
        }
    );
}

#[test]
fn double_booking_is_an_assembly_error() {
    let fixture = fixture();
    let mut assignment = hand_picked(&fixture);
    assignment.set(fixture.model.grid.assign(0, 0, MOD), 1.0);

    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, &fixture.model.grid);
    let err = assembler.assemble(&assignment).unwrap_err();
    assert_eq!(
        err,
        AssemblyError::DoubleBooked {
            date: d(2025, 3, 3),
            employee: "Ada".to_string(),
            roles: vec!["MOD".to_string(), "ON".to_string()],
        }
    );
    assert!(err.to_string().contains("Ada"));
}

#[test]
fn truncated_snapshot_is_an_assembly_error() {
    let fixture = fixture();
    let mut assignment = Assignment::zeros(3);
    assignment.set(fixture.model.grid.assign(0, 0, ON), 1.0);

    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, &fixture.model.grid);
    assert_eq!(
        assembler.assemble(&assignment).unwrap_err(),
        AssemblyError::MissingValue {
            employee: "Ben".to_string(),
            date: d(2025, 3, 3),
            role: "MOD".to_string(),
        }
    );
}

#[test]
fn csv_output_is_stable_across_writes() {
    let fixture = fixture();
    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, &fixture.model.grid);
    let assignment = hand_picked(&fixture);

    let mut first = Vec::new();
    write_roster_csv(&assembler.assemble(&assignment).unwrap(), &mut first).unwrap();
    let mut second = Vec::new();
    write_roster_csv(&assembler.assemble(&assignment).unwrap(), &mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "Date,Day,MOD,ON1,ON2\n2025-03-03,Monday,Cy,Ada,Dee\n2025-03-04,Tuesday,Ada,Ben,Cy\n"
    );
}

#[test]
fn roster_converts_to_a_dataframe() {
    let fixture = fixture();
    let assembler = ScheduleAssembler::new(&fixture.data, &fixture.config, &fixture.model.grid);
    let roster = assembler.assemble(&hand_picked(&fixture)).unwrap();
    let df = roster.to_dataframe().unwrap();

    assert_eq!(df.shape(), (2, 5));
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["Date", "Day", "MOD", "ON1", "ON2"]);
    assert_eq!(df.column("Date").unwrap().dtype(), &DataType::Date);

    let dates = df.column("Date").unwrap().date().unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    assert_eq!(dates.get(1), Some((d(2025, 3, 4) - epoch).num_days() as i32));

    let second_on = df.column("ON2").unwrap().str().unwrap();
    assert_eq!(second_on.get(0), Some("Dee"));
    assert_eq!(second_on.get(1), Some("Cy"));
}
