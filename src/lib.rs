pub mod calendar;
pub mod config;
pub mod data_model;
pub mod employee;
pub mod error;
pub mod formulation;
pub mod persistence;
pub mod planner;
pub mod roster;
pub mod solver;
pub mod validation;

pub use calendar::{DateWindows, WeekdayTable};
pub use config::{RoleQuota, RosterConfig};
pub use data_model::{DataModel, DateSlot};
pub use employee::Employee;
pub use error::{RosterError, RosterResult};
pub use formulation::{
    ConstraintModelBuilder, CoverageShortfall, FormulatedModel, InfeasibilityReport,
    InfeasibilitySource, VariableGrid,
};
pub use persistence::{
    PersistenceError, load_assignment_from_json, load_config_from_json, load_data_model_from_csv,
    load_data_model_from_readers, load_dates_from_csv, load_employees_from_csv,
    save_assignment_to_json, save_config_to_json, save_roster_to_csv, write_roster_csv,
};
pub use planner::{RosterPlan, plan_roster};
pub use roster::{AssemblyError, Roster, RosterRow, ScheduleAssembler};
pub use solver::{
    Assignment, Comparator, LinearModel, MicroLpBackend, Sense, SolveOutcome, SolveStatus,
    SolverBackend, Term, VarHandle,
};
pub use validation::{RawRecord, ValidationError};
