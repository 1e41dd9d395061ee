//! `sim-runner`: run a simulation binary inside its project.
//!
//! Resolves the working directory and `INET_ROOT` from a project root, runs
//! the given command as a child process and reports its captured output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sim_runner::exit_codes;
use sim_runner::io::config::{CliConfig, DEFAULT_CONFIG_FILE, load_config, write_config};
use sim_runner::{LaunchError, LocalProject, SimulationConfig, SimulationRun, SubprocessRunner};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "sim-runner",
    version,
    about = "Run simulation binaries as child processes"
)]
struct Cli {
    /// Path to the CLI config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Simulation project root.
    #[arg(long, default_value = ".")]
    project: PathBuf,
    /// Working directory relative to the project root.
    #[arg(long, default_value = ".")]
    workdir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the resolved working directory and `INET_ROOT` without running anything.
    Resolve {
        #[command(flatten)]
        target: Target,
        /// Print JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Run a command inside the simulation project.
    Run {
        #[command(flatten)]
        target: Target,
        /// Command vector; the first element is the executable.
        #[arg(last = true, required = true)]
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            if err.downcast_ref::<LaunchError>().is_some() {
                exit_codes::LAUNCH_FAILED
            } else {
                exit_codes::INVALID
            }
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Resolve { target, json } => {
            with_runner(&cli.config, |runner, _| cmd_resolve(runner, &target, json))
        }
        Command::Run { target, args } => {
            with_runner(&cli.config, |runner, cfg| cmd_run(runner, cfg, &target, &args))
        }
    }
}

/// Load config, start logging, and hand a ready runner to `f`.
fn with_runner<F>(config_path: &Path, f: F) -> Result<i32>
where
    F: FnOnce(&SubprocessRunner, &CliConfig) -> Result<i32>,
{
    let cfg = load_config(config_path)?;
    sim_runner::logging::init(&cfg.log_filter);

    let mut runner = SubprocessRunner::new();
    runner.setup();
    let result = f(&runner, &cfg);
    runner.teardown();
    result
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &CliConfig::default())?;
    println!("{}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_resolve(runner: &SubprocessRunner, target: &Target, json: bool) -> Result<i32> {
    let run = simulation_run(target)?;
    let resolution = runner.resolve(&run);
    if json {
        let payload =
            serde_json::to_string_pretty(&resolution).context("serialize resolution")?;
        println!("{payload}");
    } else {
        println!("working_dir = {}", resolution.working_dir.display());
        println!("INET_ROOT = {}", resolution.inet_root.display());
    }
    Ok(exit_codes::OK)
}

fn cmd_run(
    runner: &SubprocessRunner,
    cfg: &CliConfig,
    target: &Target,
    args: &[String],
) -> Result<i32> {
    let run = simulation_run(target)?;
    let result = runner.run(&run, args)?;
    debug!(exit_code = result.exit_code, "simulation finished");

    if cfg.forward_output {
        std::io::stdout()
            .write_all(&result.stdout)
            .context("forward child stdout")?;
        std::io::stderr()
            .write_all(&result.stderr)
            .context("forward child stderr")?;
    }

    if cfg.propagate_exit_code {
        Ok(exit_codes::from_child(result.exit_code))
    } else {
        Ok(exit_codes::OK)
    }
}

fn simulation_run(target: &Target) -> Result<SimulationRun> {
    let project = LocalProject::new(&target.project)
        .with_context(|| format!("resolve project root {}", target.project.display()))?;
    Ok(SimulationRun::new(SimulationConfig::new(
        target.workdir.clone(),
        Arc::new(project),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_trailing_args() {
        let cli = Cli::parse_from([
            "sim-runner",
            "run",
            "--project",
            "/work/inet",
            "--workdir",
            "examples/ethernet",
            "--",
            "opp_run",
            "-u",
            "Cmdenv",
        ]);
        match cli.command {
            Command::Run { target, args } => {
                assert_eq!(target.project, PathBuf::from("/work/inet"));
                assert_eq!(target.workdir, PathBuf::from("examples/ethernet"));
                assert_eq!(args, vec!["opp_run", "-u", "Cmdenv"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_requires_a_command() {
        assert!(Cli::try_parse_from(["sim-runner", "run"]).is_err());
    }

    #[test]
    fn parse_init_force_with_config() {
        let cli = Cli::parse_from(["sim-runner", "--config", "x.toml", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn resolve_defaults_to_current_directory() {
        let cli = Cli::parse_from(["sim-runner", "resolve"]);
        match cli.command {
            Command::Resolve { target, json } => {
                assert_eq!(target.project, PathBuf::from("."));
                assert_eq!(target.workdir, PathBuf::from("."));
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
