use overnight_roster::{
    MicroLpBackend, RosterError, load_config_from_json, load_data_model_from_csv, plan_roster,
    save_roster_to_csv,
};
use polars::prelude::{AnyValue, DataFrame};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                widths[ci] = widths[ci].max(cell_text(av).len());
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        out.push_str(&" ".repeat(widths[i] - name.len()));
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default();
            out.push(' ');
            out.push_str(&s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            out.push_str(" |");
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_usage() {
    eprintln!(
        "Usage: cli <employees.csv> <dates.csv> <config.json> [output.csv]\n\n  employees.csv  name, role_<ROLE>, <weekday>_avail, <weekday>_pref columns\n  dates.csv      date column, optional day column\n  config.json    roles, quotas, window, cap, preference_bonus, time_limit_secs\n  output.csv     where to write the roster (printed only when omitted)\n\nSet RUST_LOG to adjust logging (default overnight_roster=info)."
    );
}

fn run(args: &[String]) -> Result<(), RosterError> {
    let config = load_config_from_json(&args[2])?;
    let data = load_data_model_from_csv(&args[0], &args[1], &config.role_names())?;
    let mut backend = MicroLpBackend::new();
    let plan = plan_roster(&data, &config, &mut backend)?;

    match plan.roster.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(err) => eprintln!("could not render roster table: {err}"),
    }
    println!("Status: {}  Objective: {:.3}", plan.status, plan.objective);
    println!("Assignments per employee:");
    for (name, count) in plan.roster.assignment_counts(&data) {
        println!("  {:<24} {}", name, count);
    }

    if let Some(output) = args.get(3) {
        save_roster_to_csv(&plan.roster, output)?;
        println!("Roster written to {output}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("overnight_roster=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    if !(3..=4).contains(&args.len()) {
        print_usage();
        return ExitCode::from(2);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if err.is_recoverable() {
                eprintln!("hint: raise time_limit_secs in the configuration and retry");
            }
            ExitCode::FAILURE
        }
    }
}
