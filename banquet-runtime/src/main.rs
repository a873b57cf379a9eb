use anyhow::{anyhow, Context, Result};
use banquet_scoring::{
    generate::{generate_contest, GenerateParams},
    score_contest, verify_grid, Grid, Scratch,
};
use banquet_search::Optimizer;
use banquet_structs::{api::Assignment, config::SearchConfig, core::Contest};
use banquet_utils::{fingerprint, jsonify, load_json_arg};
use clap::{arg, Arg, ArgAction, Command};
use std::{fs, io::Read, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("banquet-runtime")
        .about("Computes or verifies contest assignments")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Emit logs as json lines")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("compute_assignment")
                .about("Searches for the best assignment of a contest")
                .arg(
                    arg!(<CONTEST> "Contest json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--config [CONFIG] "Search config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--preset [PRESET] "Named config: default, fast or thorough")
                        .value_parser(["default", "fast", "thorough"]),
                )
                .arg(
                    arg!(--threads [THREADS] "Worker threads, overriding the config")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the outcome will be saved to this file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("verify_assignment")
                .about("Checks an assignment against a contest and prints its score")
                .arg(
                    arg!(<CONTEST> "Contest json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<ASSIGNMENT> "Assignment or outcome json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("generate_contest")
                .about("Prints a random contest")
                .arg(arg!(<SEED> "A string used in seed generation"))
                .arg(
                    arg!(--groups [GROUPS] "Number of groups")
                        .default_value("2")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--agents [AGENTS] "Number of agents")
                        .default_value("12")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--items [ITEMS] "Number of items")
                        .default_value("40")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--materials [MATERIALS] "Number of materials")
                        .default_value("8")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--intents "Add satiety targets and slot intents")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("config_help").about("Lists the search config keys"))
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("log-json"));

    if let Err(e) = match matches.subcommand() {
        Some(("compute_assignment", sub_m)) => compute_assignment(
            sub_m.get_one::<String>("CONTEST").cloned().unwrap_or_default(),
            sub_m.get_one::<String>("config").cloned(),
            sub_m.get_one::<String>("preset").cloned(),
            sub_m.get_one::<usize>("threads").copied(),
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        Some(("verify_assignment", sub_m)) => verify_assignment(
            sub_m.get_one::<String>("CONTEST").cloned().unwrap_or_default(),
            sub_m.get_one::<String>("ASSIGNMENT").cloned().unwrap_or_default(),
        ),
        Some(("generate_contest", sub_m)) => print_contest(
            sub_m.get_one::<String>("SEED").cloned().unwrap_or_default(),
            GenerateParams {
                num_groups: sub_m.get_one::<usize>("groups").copied().unwrap_or(2),
                num_agents: sub_m.get_one::<usize>("agents").copied().unwrap_or(12),
                num_items: sub_m.get_one::<usize>("items").copied().unwrap_or(40),
                num_materials: sub_m.get_one::<usize>("materials").copied().unwrap_or(8),
                with_intents: sub_m.get_flag("intents"),
            },
        ),
        Some(("config_help", _)) => {
            banquet_search::help();
            Ok(())
        }
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn compute_assignment(
    contest: String,
    config: Option<String>,
    preset: Option<String>,
    threads: Option<usize>,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let contest = load_contest(&contest)?;
    let mut config = match (config, preset) {
        (Some(config), _) => load_json_arg::<SearchConfig>(&config).context("Invalid config")?,
        (None, Some(preset)) => SearchConfig::preset(&preset)?,
        (None, None) => SearchConfig::default(),
    };
    if threads.is_some() {
        config.worker_threads = threads;
    }
    config.validate()?;

    let outcome = Optimizer::new(&contest, config)
        .optimize()?
        .ok_or_else(|| anyhow!("No assignment found"))?;
    let output = jsonify(&outcome)?;
    match output_file {
        Some(path) => {
            fs::write(&path, output)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(path = %path.display(), "outcome written");
        }
        None => println!("{}", output),
    }
    Ok(())
}

pub fn verify_assignment(contest: String, assignment: String) -> Result<()> {
    let mut contest = load_contest(&contest)?;
    contest.prepare();
    let assignment = load_assignment(&assignment)?;
    let grid = Grid::from_assignment(&contest, &assignment)?;
    verify_grid(&contest, &grid).context("Invalid assignment")?;
    let score = score_contest(&contest, &grid, &mut Scratch::new());
    println!("Assignment is valid");
    println!("{}", jsonify(&serde_json::json!({ "score": score }))?);
    Ok(())
}

fn print_contest(seed: String, params: GenerateParams) -> Result<()> {
    let contest = generate_contest(fingerprint(seed.as_bytes()), &params);
    println!("{}", jsonify(&contest)?);
    Ok(())
}

fn load_contest(contest: &str) -> Result<Contest> {
    let contest: Contest = load_json_arg(contest).context("Failed to load contest")?;
    contest.validate()?;
    Ok(contest)
}

/// Accepts a bare assignment or a full search outcome.
fn load_assignment(assignment: &str) -> Result<Assignment> {
    let mut value: serde_json::Value = if assignment == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read assignment from stdin")?;
        serde_json::from_str(&buffer).context("Failed to parse assignment")?
    } else {
        load_json_arg(assignment).context("Failed to load assignment")?
    };
    if value.get("assignment").is_some() {
        value = value["assignment"].take();
    }
    serde_json::from_value(value).context("Invalid assignment")
}
