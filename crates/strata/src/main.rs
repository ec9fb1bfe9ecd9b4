mod demo;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};
use strata_core::access::{Layer, Visibility, check_dependency};
use strata_core::{Descriptor, KernelConfig};

/// Strata: a layered dependency-resolution kernel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print which layers may depend on which, with per-layer defaults
    Layers,
    /// Evaluate the access policy for one dependency
    Check {
        /// Layer of the declaring component
        parent: String,
        /// Layer of the component being injected
        target: String,
        /// Put the two components in different modules
        #[arg(long)]
        cross_module: bool,
        /// Override the target's visibility (private, module, global)
        #[arg(long)]
        target_visibility: Option<String>,
    },
    /// Build a small component graph and resolve it on two request forks
    Demo {
        /// Kernel configuration file (json, toml, yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // A logger may already be installed when embedded; keep it.
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);
    debug!("Parsed arguments: {:?}", args);

    match args.command {
        Some(Commands::Layers) => {
            print_layers();
            ExitCode::SUCCESS
        }
        Some(Commands::Check {
            parent,
            target,
            cross_module,
            target_visibility,
        }) => run_check(&parent, &target, cross_module, target_visibility.as_deref()),
        Some(Commands::Demo { config }) => {
            let config = match config {
                Some(path) => match KernelConfig::load(&path) {
                    Ok(config) => config,
                    Err(e) => {
                        error!("Failed to load {}: {}", path.display(), e);
                        eprintln!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                },
                None => KernelConfig::default(),
            };
            match demo::run(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Demo failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            println!("No command specified. Run `strata --help` for usage.");
            ExitCode::SUCCESS
        }
    }
}

fn print_layers() {
    println!(
        "{:<10} {:<10} {:<11} {}",
        "LAYER", "SCOPE", "VISIBILITY", "ALLOWED DEPENDENTS"
    );
    for layer in Layer::ALL {
        let parents: Vec<&str> = layer.default_parents().iter().map(Layer::as_str).collect();
        let parents = if parents.is_empty() {
            "none".to_string()
        } else {
            parents.join(", ")
        };
        println!(
            "{:<10} {:<10} {:<11} {}",
            layer,
            layer.default_scope(),
            layer.default_visibility(),
            parents
        );
    }
    println!();
    println!("A facade declares its dependencies as a service.");
    println!("Only repos may declare memoized functions.");
}

fn run_check(
    parent: &str,
    target: &str,
    cross_module: bool,
    target_visibility: Option<&str>,
) -> ExitCode {
    let parsed = parent.parse::<Layer>().and_then(|parent_layer| {
        let target_layer = target.parse::<Layer>()?;
        let visibility = target_visibility.map(str::parse::<Visibility>).transpose()?;
        Ok((parent_layer, target_layer, visibility))
    });
    let (parent_layer, target_layer, visibility) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let parent = Descriptor::new("Parent", "app", parent_layer);
    let target_module = if cross_module { "other" } else { "app" };
    let mut target = Descriptor::new("Target", target_module, target_layer);
    if let Some(visibility) = visibility {
        target = target.with_visibility(visibility);
    }

    match check_dependency(&parent, &target) {
        Ok(()) => {
            println!("allowed");
            ExitCode::SUCCESS
        }
        Err(violation) => {
            println!("{}", violation);
            ExitCode::FAILURE
        }
    }
}
