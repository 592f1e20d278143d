use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use symfs::prelude::*;

/// Builds symlink trees that group files by their metadata
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long)]
    config_file: PathBuf,

    /// Compute and log everything without touching the filesystem
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Overrides the output path of the config
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overrides the source paths of the config (repeatable)
    #[arg(short, long)]
    source_paths: Vec<PathBuf>,

    /// Overrides the groups of the config, as `name:field[,field...]` (repeatable)
    #[arg(short, long)]
    group_by: Vec<GroupSpec>,

    /// Append the overrides to the configured lists instead of replacing them
    #[arg(long)]
    append: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();

    let mut config = Config::from_file(&cli.config_file).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load config '{}': {}",
            cli.config_file.display(),
            e
        ))
    });
    config.apply_overrides(ConfigOverrides {
        path: cli.path,
        source_paths: cli.source_paths,
        group_by: cli.group_by,
        merge: if cli.append {
            MergeMode::Append
        } else {
            MergeMode::Replace
        },
    });

    let mut symfs = SymFs::new(config)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid configuration: {}", e)));

    if log::log_enabled!(log::Level::Debug) {
        for (group, keys) in symfs.get_mapping() {
            for (key, items) in keys {
                log::debug!("{}/{}: {} items", group, key, items.len());
            }
        }
    }

    let report = symfs
        .generate(cli.dry_run)
        .unwrap_or_else(|e| exit_with_error(&format!("Generation failed: {}", e)));

    if cli.dry_run {
        println!(
            "Dry run: would create {} directories and {} links",
            report.created_dirs, report.created_links
        );
    }
    if !symfs.warnings().is_empty() {
        println!("Finished with {} warnings", symfs.warnings().len());
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
