use std::path::{Path, PathBuf};

use aircraft_sizing::pipeline::{self, CURVE_SAMPLES, SizingReport};
use aircraft_sizing::sizing_config::{
    DesignCase, SizingCatalog, load_case, load_cases, load_catalog,
};
use aircraft_sizing::sizing_constraints::power_loading_grid;
use aircraft_sizing::sizing_export::{chart, report, writer_for_path};
use aircraft_sizing::sizing_takeoff::{TakeoffCriterion, TakeoffDataTable, takeoff_parameter};
use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Aircraft conceptual sizing: mission weight, takeoff parameter, and the
/// wing-loading / power-loading matching chart.
#[derive(Parser, Debug)]
#[command(author, version, about = "Aircraft conceptual sizing toolkit")]
struct Cli {
    /// Sizing catalog (SFC, K_LD and empty-weight tables)
    #[arg(long, global = true, default_value = "data/sizing_data.toml")]
    catalog: PathBuf,

    /// Takeoff chart CSV (TOP followed by seven distance columns)
    #[arg(long, global = true, default_value = "data/top.csv")]
    takeoff_data: PathBuf,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG applies otherwise
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate takeoff weight from the mission section of a case
    Weight {
        /// Design case file (TOML or YAML)
        #[arg(long)]
        case: PathBuf,
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fit the takeoff chart and read TOP at a distance
    Top {
        /// Criterion name or column label (e.g. prop_50ft, TO_Dist_Jet_2eng_BFL)
        #[arg(long)]
        criterion: String,
        /// Target takeoff distance in feet
        #[arg(long)]
        distance: f64,
    },
    /// Sample every constraint curve of a case to CSV
    Constraints {
        #[arg(long)]
        case: PathBuf,
        /// Output CSV path (`-` for stdout)
        #[arg(long, default_value = "-")]
        output: PathBuf,
    },
    /// Run every stage of one case, or of every case in a directory
    Run {
        /// Case file or directory of `*.toml` cases
        #[arg(long)]
        case: PathBuf,
        /// Write chart CSV here, plus a `<stem>_report.json` sidecar
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List the keys available in each catalog table
    Catalog,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Weight { case, json } => {
            let case = read_case(case)?;
            let catalog = read_catalog(&cli.catalog)?;
            let Some(mission) = case.mission.as_ref() else {
                bail!("case '{}' has no [mission] section", case.name);
            };
            let estimate = pipeline::estimate_weight(mission, &catalog)
                .with_context(|| format!("weight estimate for '{}'", case.name))?;
            if *json {
                report::write_json(std::io::stdout(), &estimate, true)?;
            } else {
                println!("Case: {}", case.name);
                for segment in &estimate.segments {
                    println!("  {:<8} {:.4}", segment.segment.name(), segment.fraction);
                }
                println!("Fuel fraction:      {:.4}", estimate.fuel_fraction);
                println!("Empty fraction:     {:.4}", estimate.empty_weight_fraction);
                println!("Takeoff weight:     {:.0} lb", estimate.takeoff_weight_lb);
                println!("Empty weight:       {:.0} lb", estimate.empty_weight_lb);
                println!("Fuel weight:        {:.0} lb", estimate.fuel_weight_lb);
                println!("Iterations:         {}", estimate.iterations);
            }
        }
        Command::Top {
            criterion,
            distance,
        } => {
            let table = read_takeoff_data(&cli.takeoff_data)?;
            let criterion: TakeoffCriterion = criterion.parse()?;
            let top = takeoff_parameter(&table, criterion, *distance)?;
            println!("Criterion:  {} ({})", criterion, criterion.label());
            println!(
                "Fit:        TOP = {:.6e}·d² + {:.6e}·d + {:.4}",
                top.fit.a, top.fit.b, top.fit.c
            );
            println!(
                "Residuals:  rms {:.3}, max {:.3} over {} samples",
                top.fit.rms_residual, top.fit.max_residual, top.fit.samples
            );
            println!("TOP at {:.0} ft: {:.2}", top.distance_ft, top.value);
        }
        Command::Constraints { case, output } => {
            let case = read_case(case)?;
            let Some(constraints) = case.constraints.as_ref() else {
                bail!("case '{}' has no [constraints] section", case.name);
            };
            let table = optional_takeoff_data(&cli.takeoff_data, &case)?;
            let analysis = pipeline::build_constraints(&case.name, constraints, table.as_ref())?;
            let [lo, hi] = case.optimizer.power_loading_bounds;
            let grid = power_loading_grid(lo, hi, CURVE_SAMPLES)?;
            let curves = analysis.set.curves(&grid);
            let rows = curves.iter().flat_map(|curve| {
                curve.points.iter().map(move |p| chart::Row {
                    constraint: &curve.name,
                    wing_loading_lb_ft2: p.wing_loading,
                    power_loading_lb_hp: p.power_loading,
                })
            });
            let writer = writer_for_path(output)
                .with_context(|| format!("creating {}", output.display()))?;
            chart::write_rows(writer, rows, None)?;
        }
        Command::Run { case, output, json } => {
            let cases = load_cases(case)
                .with_context(|| format!("loading cases from {}", case.display()))?;
            let catalog = read_catalog(&cli.catalog)?;
            for case in &cases {
                let table = optional_takeoff_data(&cli.takeoff_data, case)?;
                let result = match pipeline::run_case(case, &catalog, table.as_ref()) {
                    Ok(result) => result,
                    Err(err) => bail!("case '{}' failed ({}): {err}", case.name, err.kind()),
                };
                if *json {
                    report::write_json(std::io::stdout(), &result, true)?;
                } else {
                    print_summary(&result);
                }
                if let Some(output) = output {
                    let output = if cases.len() > 1 {
                        per_case_path(output, &case.name)
                    } else {
                        output.clone()
                    };
                    write_chart(&output, &result)?;
                    let sidecar = report::write_sidecar(&output, &result)?;
                    eprintln!("wrote {} and {}", output.display(), sidecar.display());
                }
            }
        }
        Command::Catalog => {
            let catalog = read_catalog(&cli.catalog)?;
            for (table, keys) in catalog.tables() {
                println!("[{table}]");
                for key in keys {
                    println!("  {key}");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_case(path: &Path) -> anyhow::Result<DesignCase> {
    load_case(path).with_context(|| format!("loading case {}", path.display()))
}

fn read_catalog(path: &Path) -> anyhow::Result<SizingCatalog> {
    load_catalog(path).with_context(|| format!("loading catalog {}", path.display()))
}

fn read_takeoff_data(path: &Path) -> anyhow::Result<TakeoffDataTable> {
    TakeoffDataTable::from_path(path)
        .with_context(|| format!("loading takeoff data {}", path.display()))
}

/// The takeoff chart is only read when the case has a takeoff requirement.
fn optional_takeoff_data(
    path: &Path,
    case: &DesignCase,
) -> anyhow::Result<Option<TakeoffDataTable>> {
    let needed = case
        .constraints
        .as_ref()
        .is_some_and(|c| c.takeoff.is_some());
    needed.then(|| read_takeoff_data(path)).transpose()
}

fn per_case_path(output: &Path, case: &str) -> PathBuf {
    let slug: String = case
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chart");
    output.with_file_name(format!("{stem}_{slug}.csv"))
}

fn write_chart(output: &Path, result: &SizingReport) -> anyhow::Result<()> {
    let rows = result.curves.iter().flat_map(|curve| {
        curve.points.iter().map(move |p| chart::Row {
            constraint: &curve.name,
            wing_loading_lb_ft2: p.wing_loading,
            power_loading_lb_hp: p.power_loading,
        })
    });
    let design = result
        .design_point
        .as_ref()
        .map(|d| (d.wing_loading, d.power_loading));
    let writer = writer_for_path(output)
        .with_context(|| format!("creating {}", output.display()))?;
    chart::write_rows(writer, rows, design)?;
    Ok(())
}

fn print_summary(result: &SizingReport) {
    println!("Case: {}", result.case);
    if let Some(weight) = &result.weight {
        println!("  Takeoff weight: {:.0} lb", weight.takeoff_weight_lb);
        println!(
            "  Empty {:.0} lb, fuel {:.0} lb, {} iterations",
            weight.empty_weight_lb, weight.fuel_weight_lb, weight.iterations
        );
    }
    if let Some(cl_max) = result.wing_cl_max {
        println!("  Wing CLmax: {cl_max:.3}");
    }
    if let Some(top) = &result.takeoff_parameter {
        println!(
            "  TOP ({}) at {:.0} ft: {:.2}",
            top.criterion, top.distance_ft, top.value
        );
    }
    if let Some(point) = &result.design_point {
        println!(
            "  Design point: W/S = {:.2} lb/ft², W/P = {:.2} lb/hp",
            point.wing_loading, point.power_loading
        );
        let active: Vec<&str> = point.active().collect();
        if !active.is_empty() {
            println!("  Active constraints: {}", active.join(", "));
        }
    }
}
