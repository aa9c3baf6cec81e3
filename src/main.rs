//! rmap CLI - prioritize product features on a value/effort matrix.

use clap::Parser;
use roadmap::cli::{Cli, Commands, ConfigCommands, FeatureCommands};
use roadmap::commands::{self, Context, Output};
use roadmap::config::{ConfigOverrides, OutputFormat};
use roadmap::logging::init_logging;
use roadmap::storage::get_data_dir;
use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // -H wins immediately; config.kdl may still ask for human output below
    let mut human = cli.human_readable;

    if let Err(e) = run(cli, &mut human) {
        tracing::debug!(error = %e, "command failed");
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Build CLI overrides from global and per-command flags.
fn overrides_for(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    overrides.storage_key = cli.storage_key.clone();
    if let Commands::Matrix(ref args) = cli.command {
        overrides = overrides.with_canvas(args.width, args.height, args.dpr);
        overrides.date_format = args.date_format.clone();
    }
    overrides
}

fn run(cli: Cli, human: &mut bool) -> Result<(), roadmap::Error> {
    let data_dir = get_data_dir(cli.data_dir.as_deref())?;
    let ctx = Context::new(data_dir, &overrides_for(&cli))?;
    *human = ctx.human();
    let human = *human;

    match cli.command {
        Commands::Feature { command } => match command {
            FeatureCommands::Add { name, fields } => {
                let result = commands::feature_add(&ctx, &name, &fields)?;
                output(&result, human);
            }
            FeatureCommands::List { status } => {
                let result = commands::feature_list(&ctx, &status)?;
                output(&result, human);
            }
            FeatureCommands::Show { id } => {
                let result = commands::feature_show(&ctx, &id)?;
                output(&result, human);
            }
            FeatureCommands::Update { id, name, fields } => {
                let result = commands::feature_update(&ctx, &id, name.as_deref(), &fields)?;
                output(&result, human);
            }
            FeatureCommands::Block { id, reason } => {
                let result = commands::feature_block(&ctx, &id, &reason)?;
                output(&result, human);
            }
            FeatureCommands::Unblock { id } => {
                let result = commands::feature_unblock(&ctx, &id)?;
                output(&result, human);
            }
            FeatureCommands::Move { id, status } => {
                let result = commands::feature_move(&ctx, &id, &status)?;
                output(&result, human);
            }
            FeatureCommands::Delete { id } => {
                let result = commands::feature_delete(&ctx, &id)?;
                output(&result, human);
            }
        },
        Commands::Matrix(args) => {
            let result = commands::matrix(&ctx, &args)?;
            output(&result, human);
        }
        Commands::Kanban { status } => {
            let result = commands::kanban(&ctx, &status)?;
            output(&result, human);
        }
        Commands::Stats => {
            let result = commands::stats(&ctx)?;
            output(&result, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(&ctx);
                output(&result, human);
            }
            ConfigCommands::Get { key } => {
                let result = commands::config_get(ctx.data_dir(), &key)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(ctx.data_dir(), &key, &value)?;
                output(&result, human);
            }
        },
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
