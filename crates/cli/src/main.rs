//! occkey — demo CLI for the occurrence key allocation coordinator.
//!
//! Runs entirely against a fresh, process-local [`InMemoryBackend`]: there is
//! no persistence between invocations. Its purpose is exercising the
//! coordinator's public API from a shell, not standing in for a real
//! deployment's client.

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use occkey_backend::InMemoryBackend;
use occkey_core::types::OccurrenceKey;
use occkey_engine::{AllocationCoordinator, CoordinatorConfig};

#[derive(Parser)]
#[command(name = "occkey", about = "Occurrence key allocation demo CLI")]
struct Cli {
    /// Default scope used by commands that omit --scope.
    #[arg(long, global = true)]
    dataset_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Allocate (or reuse) the key for a set of natural-key fragments.
    GenerateKey {
        /// Natural-key fragments (e.g. alternate identifiers for the record).
        #[arg(required = true)]
        uniques: Vec<String>,
        #[arg(long)]
        scope: Option<String>,
    },
    /// Look up the key for a set of natural-key fragments, without allocating.
    FindKey {
        #[arg(required = true)]
        uniques: Vec<String>,
        #[arg(long)]
        scope: Option<String>,
    },
    /// List every distinct allocated key under a scope.
    ListKeys {
        #[arg(long)]
        scope: Option<String>,
    },
    /// Delete every lookup row resolving to a key.
    DeleteKey {
        key: i32,
        #[arg(long)]
        scope: Option<String>,
    },
    /// Run a short scripted scenario demonstrating convergence and reuse.
    Demo,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.dataset_id.clone() {
        Some(id) => CoordinatorConfig::new().with_dataset_id(id),
        None => CoordinatorConfig::new(),
    };
    let coordinator = AllocationCoordinator::new(Arc::new(InMemoryBackend::new()), config);

    let result = run(&coordinator, cli.command);
    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(coordinator: &AllocationCoordinator, command: Command) -> Result<(), occkey_engine::Error> {
    match command {
        Command::GenerateKey { uniques, scope } => {
            let (key, created) = coordinator.generate_key(uniques, scope.as_deref())?;
            println!("{key} (created: {created})");
        }
        Command::FindKey { uniques, scope } => match coordinator.find_key(uniques, scope.as_deref())? {
            Some(key) => println!("{key}"),
            None => println!("not found"),
        },
        Command::ListKeys { scope } => {
            let keys = coordinator.find_keys_by_scope(scope.as_deref())?;
            for key in keys {
                println!("{key}");
            }
        }
        Command::DeleteKey { key, scope } => {
            coordinator.delete_key(OccurrenceKey::new(key), scope.as_deref())?;
        }
        Command::Demo => run_demo(coordinator)?,
    }
    Ok(())
}

fn run_demo(coordinator: &AllocationCoordinator) -> Result<(), occkey_engine::Error> {
    let (first, created) = coordinator.generate_key(["ic|cc|cat1"], Some("demo"))?;
    println!("allocated {first} for [\"ic|cc|cat1\"] (created: {created})");

    let (second, created) = coordinator.generate_key(["ic|cc|cat1", "occ-42"], Some("demo"))?;
    println!("allocated {second} for [\"ic|cc|cat1\", \"occ-42\"] (created: {created})");
    assert_eq!(first, second, "overlapping key sets must converge");

    let found = coordinator.find_key(["occ-42"], Some("demo"))?;
    println!("find_key([\"occ-42\"]) = {found:?}");

    Ok(())
}
