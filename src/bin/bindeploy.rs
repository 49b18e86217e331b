//! CLI front-end: resolves a target's dependencies and, if a destination was
//! given, stages them.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bindeploy::common::LookupError;
use bindeploy::config::{DeployConfig, StageLayout, StageOptions};
use bindeploy::driver::find_dependencies;
use bindeploy::platform::Platform;
use bindeploy::sinks::MessageSinks;
use bindeploy::stager::stage;

/// Resolve and optionally stage the transitive shared-library dependencies of a
/// native binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The executable or shared library to resolve.
    target: PathBuf,

    /// Directory to stage the target and its dependencies into.
    #[arg(long)]
    destination: Option<PathBuf>,

    /// Additional directory to search for dependencies, can be given more than once.
    #[arg(long = "prefix")]
    prefixes: Vec<PathBuf>,

    /// Increase verbosity (-v for verbose, -vv for debug).
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Don't exclude MSVC runtime DLLs from the result (Windows only).
    #[arg(long)]
    include_msvc_runtime: bool,

    /// Don't exclude Windows API-set DLLs from the result (Windows only).
    #[arg(long)]
    include_windows_api_sets: bool,

    /// Print the result as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Stage the result even if some dependencies could not be found.
    #[arg(long)]
    allow_unsolved: bool,
}

fn run(args: Args) -> Result<(), LookupError> {
    let sinks = MessageSinks::printing(args.verbose);

    let config = DeployConfig {
        exclude_msvc_runtime: !args.include_msvc_runtime,
        exclude_windows_api_sets: !args.include_windows_api_sets,
        prefix_path_list: args.prefixes,
        ..DeployConfig::default()
    };

    let result = find_dependencies(&args.target, &config, &sinks)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for entry in &result.entries {
            println!("{:?}  {}", entry.status, entry.library_name);
        }
        if !result.is_solved {
            eprintln!("warning: not all dependencies could be found");
        }
    }

    if let Some(destination) = args.destination {
        let options = StageOptions {
            allow_unsolved: args.allow_unsolved,
        };
        let report = stage(
            &result,
            &destination,
            &StageLayout::default(),
            &options,
            Platform::native().os,
            &sinks,
        )?;
        sinks.status(format!(
            "staged {} files ({} unchanged)",
            report.copied.len(),
            report.skipped_unchanged.len()
        ));
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
