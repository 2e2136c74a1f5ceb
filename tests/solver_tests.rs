use chrono::NaiveDate;
use overnight_roster::solver::{VarKind, ASSIGNED_THRESHOLD};
use overnight_roster::{
    plan_roster, Assignment, Comparator, ConstraintModelBuilder, DataModel, Employee, LinearModel, MicroLpBackend,
    RoleQuota, RosterConfig, RosterError, Sense, SolveOutcome, SolveStatus, SolverBackend, Term,
    VarHandle,
};
use std::thread;
use std::time::{Duration, Instant};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Solves through microlp, then reports whatever status the test asks for.
struct RelabelingBackend {
    inner: MicroLpBackend,
    status: SolveStatus,
    keep_assignment: bool,
    seen_limit: Option<Option<Duration>>,
}

impl RelabelingBackend {
    fn new(status: SolveStatus, keep_assignment: bool) -> Self {
        Self {
            inner: MicroLpBackend::new(),
            status,
            keep_assignment,
            seen_limit: None,
        }
    }
}

impl SolverBackend for RelabelingBackend {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn declare_boolean_variable(&mut self, name: &str) -> VarHandle {
        self.inner.declare_boolean_variable(name)
    }

    fn declare_integer_variable(&mut self, name: &str, lower: i64, upper: i64) -> VarHandle {
        self.inner.declare_integer_variable(name, lower, upper)
    }

    fn add_linear_constraint(&mut self, terms: &[Term], comparator: Comparator, bound: f64) {
        self.inner.add_linear_constraint(terms, comparator, bound);
    }

    fn set_objective(&mut self, terms: &[Term], sense: Sense) {
        self.inner.set_objective(terms, sense);
    }

    fn solve(&mut self, time_limit: Option<Duration>) -> SolveOutcome {
        self.seen_limit = Some(time_limit);
        let outcome = self.inner.solve(None);
        SolveOutcome {
            status: self.status,
            assignment: outcome.assignment.filter(|_| self.keep_assignment),
            detail: Some("relabeled".to_string()),
            elapsed: outcome.elapsed,
        }
    }

    fn value_of(&self, var: VarHandle) -> Option<f64> {
        self.inner.value_of(var)
    }
}

fn two_night_data() -> DataModel {
    DataModel::new(
        vec!["ON".to_string()],
        vec![
            Employee::unrestricted("Ada", 1),
            Employee::unrestricted("Ben", 1),
        ],
        vec![d(2025, 1, 6), d(2025, 1, 7)],
    )
    .unwrap()
}

fn two_night_config() -> RosterConfig {
    RosterConfig::new(vec![RoleQuota::new("ON", 1)], 1.0)
}

#[test]
fn microlp_maximizes_over_booleans() {
    let mut backend = MicroLpBackend::new();
    let x = backend.declare_boolean_variable("x");
    let y = backend.declare_boolean_variable("y");
    backend.add_linear_constraint(&[Term::unit(x), Term::unit(y)], Comparator::LessEq, 1.0);
    backend.set_objective(&[Term::new(x, 2.0), Term::new(y, 3.0)], Sense::Maximize);

    let outcome = backend.solve(None);
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!(outcome.assignment.is_some());
    assert!(backend.value_of(x).unwrap() < ASSIGNED_THRESHOLD);
    assert!(backend.value_of(y).unwrap() > ASSIGNED_THRESHOLD);
}

#[test]
fn microlp_respects_integer_bounds() {
    let mut backend = MicroLpBackend::new();
    let z = backend.declare_integer_variable("z", 0, 5);
    backend.add_linear_constraint(&[Term::new(z, 2.0)], Comparator::LessEq, 7.0);
    backend.set_objective(&[Term::unit(z)], Sense::Maximize);

    let outcome = backend.solve(Some(Duration::from_secs(30)));
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!((backend.value_of(z).unwrap() - 3.0).abs() < 1e-6);
}

#[test]
fn microlp_reports_infeasible_models() {
    let mut backend = MicroLpBackend::new();
    let x = backend.declare_boolean_variable("x");
    backend.add_linear_constraint(&[Term::unit(x)], Comparator::GreaterEq, 2.0);
    backend.set_objective(&[Term::unit(x)], Sense::Maximize);

    let outcome = backend.solve(None);
    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert!(outcome.assignment.is_none());
    assert_eq!(backend.value_of(x), None);
}

#[test]
fn linear_model_checks_constraints_and_domains() {
    let mut model = LinearModel::new();
    let a = model.declare("a", VarKind::Boolean);
    let b = model.declare("b", VarKind::Integer { lower: 0, upper: 2 });
    model.add_constraint(&[Term::unit(a), Term::unit(b)], Comparator::LessEq, 2.0);
    model.add_constraint(&[Term::unit(b)], Comparator::Equal, 1.0);
    model.set_objective(&[Term::new(a, 4.0), Term::new(b, 1.5)], Sense::Maximize);

    let good = Assignment::new(vec![1.0, 1.0]);
    assert!(model.violated_constraints(&good).is_empty());
    assert!(model.domain_violations(&good).is_empty());
    assert!((model.objective_value(&good) - 5.5).abs() < 1e-9);

    let bad = Assignment::new(vec![0.5, 0.0]);
    assert_eq!(model.violated_constraints(&bad), vec![1]);
    assert_eq!(model.domain_violations(&bad), vec![a]);

    let short = Assignment::new(vec![1.0]);
    assert_eq!(model.domain_violations(&short), vec![b]);
}

#[test]
fn assignment_reads_booleans_against_the_threshold() {
    let mut assignment = Assignment::zeros(2);
    assignment.set(VarHandle::new(0), 0.49);
    assignment.set(VarHandle::new(1), 0.51);
    assignment.set(VarHandle::new(4), 1.0);

    assert_eq!(assignment.len(), 5);
    assert_eq!(assignment.is_set(VarHandle::new(0)), Some(false));
    assert_eq!(assignment.is_set(VarHandle::new(1)), Some(true));
    assert_eq!(assignment.is_set(VarHandle::new(3)), Some(false));
    assert_eq!(assignment.is_set(VarHandle::new(4)), Some(true));
    assert_eq!(assignment.is_set(VarHandle::new(5)), None);
}

#[test]
fn comparators_apply_tolerance() {
    assert!(Comparator::LessEq.holds(1.0 + 1e-9, 1.0, 1e-6));
    assert!(!Comparator::LessEq.holds(1.1, 1.0, 1e-6));
    assert!(Comparator::Equal.holds(2.0, 2.0, 0.0));
    assert!(Comparator::GreaterEq.holds(0.0, 1e-9, 1e-6));
    assert_eq!(Comparator::Equal.symbol(), "==");
}

#[test]
fn solve_status_strings() {
    assert_eq!(SolveStatus::Optimal.to_string(), "OPTIMAL");
    assert_eq!(SolveStatus::Timeout.as_str(), "TIMEOUT");
    assert!(SolveStatus::Feasible.is_success());
    assert!(!SolveStatus::Timeout.is_success());
}

#[test]
fn planner_forwards_the_configured_time_limit() {
    let data = two_night_data();
    let config = two_night_config().with_time_limit(Duration::from_secs(7));
    let mut backend = RelabelingBackend::new(SolveStatus::Optimal, true);

    let plan = plan_roster(&data, &config, &mut backend).unwrap();
    assert_eq!(backend.seen_limit, Some(Some(Duration::from_secs(7))));
    assert_eq!(plan.status, SolveStatus::Optimal);
}

#[test]
fn timeout_without_opt_in_is_a_recoverable_error() {
    let data = two_night_data();
    let config = two_night_config().with_time_limit(Duration::from_secs(5));
    let mut backend = RelabelingBackend::new(SolveStatus::Timeout, true);

    let err = plan_roster(&data, &config, &mut backend).unwrap_err();
    assert!(err.is_recoverable());
    match err {
        RosterError::SolverTimeout {
            time_limit,
            incumbent,
        } => {
            assert_eq!(time_limit, Some(Duration::from_secs(5)));
            assert!(incumbent.is_some());
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn timeout_incumbent_is_used_when_accepted() {
    let data = two_night_data();
    let config = two_night_config().accepting_timeout_incumbent(true);
    let mut backend = RelabelingBackend::new(SolveStatus::Timeout, true);

    let plan = plan_roster(&data, &config, &mut backend).unwrap();
    assert_eq!(plan.status, SolveStatus::Timeout);
    assert_eq!(plan.roster.rows().len(), 2);
}

#[test]
fn timeout_without_incumbent_fails_even_when_accepted() {
    let data = two_night_data();
    let config = two_night_config().accepting_timeout_incumbent(true);
    let mut backend = RelabelingBackend::new(SolveStatus::Timeout, false);

    match plan_roster(&data, &config, &mut backend) {
        Err(RosterError::SolverTimeout { incumbent, .. }) => assert!(incumbent.is_none()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn engine_failures_are_not_recoverable() {
    let data = two_night_data();
    let config = two_night_config();

    let mut failing = RelabelingBackend::new(SolveStatus::Error, false);
    let err = plan_roster(&data, &config, &mut failing).unwrap_err();
    assert!(matches!(err, RosterError::Engine(ref msg) if msg.contains("relabeled")));
    assert!(!err.is_recoverable());

    let mut unbounded = RelabelingBackend::new(SolveStatus::Unbounded, false);
    let err = plan_roster(&data, &config, &mut unbounded).unwrap_err();
    assert!(matches!(err, RosterError::Engine(_)));

    let mut empty_success = RelabelingBackend::new(SolveStatus::Optimal, false);
    let err = plan_roster(&data, &config, &mut empty_success).unwrap_err();
    assert!(matches!(err, RosterError::Engine(_)));
}

#[test]
fn expired_limit_reports_timeout_and_the_worker_finishes_alone() {
    let employees = (0..6)
        .map(|idx| Employee::unrestricted(format!("E{idx}"), 1))
        .collect();
    let dates = (6..20).map(|day| d(2025, 1, day)).collect();
    let data = DataModel::new(vec!["ON".to_string()], employees, dates).unwrap();
    let config = two_night_config().with_window(1, 2);

    let mut backend = MicroLpBackend::new();
    let model = ConstraintModelBuilder::new(&data, &config).build(&mut backend);
    let outcome = backend.solve(Some(Duration::ZERO));
    assert_eq!(outcome.status, SolveStatus::Timeout);
    assert!(outcome.assignment.is_none());
    assert!(outcome.detail.unwrap().contains("no result within"));
    assert!(backend.solved_assignment().is_none());
    assert_eq!(backend.value_of(model.grid.assign(0, 0, 0)), None);

    let waited = Instant::now();
    while backend.is_solving() {
        assert!(waited.elapsed() < Duration::from_secs(120), "worker never finished");
        thread::sleep(Duration::from_millis(10));
    }

    // The abandoned result is never picked up; a fresh solve is needed.
    assert!(backend.solved_assignment().is_none());
    let outcome = backend.solve(None);
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!(!backend.is_solving());
}

#[test]
fn planner_resets_a_backend_that_already_holds_declarations() {
    let mut backend = MicroLpBackend::new();
    let stray = backend.declare_boolean_variable("stray");
    backend.add_linear_constraint(&[Term::new(stray, 1.0)], Comparator::GreaterEq, 2.0);
    assert_eq!(backend.solve(None).status, SolveStatus::Infeasible);

    let plan = plan_roster(&two_night_data(), &two_night_config(), &mut backend).unwrap();
    assert_eq!(plan.status, SolveStatus::Optimal);
    // Two employees by two nights by one role, plus one load per employee and night.
    assert_eq!(backend.model().variable_count(), 8);

    // A second plan on the same backend starts from scratch again.
    let again = plan_roster(&two_night_data(), &two_night_config(), &mut backend).unwrap();
    assert_eq!(again.roster, plan.roster);
    assert_eq!(backend.model().variable_count(), 8);
}
