use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use water_score::catalog::ReferenceCatalog;
use water_score::config::Config;
use water_score::scoring::ScoringOptions;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one observation set
    Score {
        /// JSON observation file
        file: PathBuf,

        /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to the file's, then now
        #[arg(long)]
        now: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also save the report as JSON at this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score several observation sets and rank them
    Batch {
        /// JSON observation files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to each file's, then now
        #[arg(long)]
        now: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the reference catalog
    Catalog {
        /// Only show this category key
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "water-score")]
#[command(about = "Drinking-water quality scoring from laboratory analyses", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/water-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn parse_now(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match water_score::observations::parse_sample_date(raw) {
        Ok(now) => Some(now),
        Err(e) => {
            eprintln!("Invalid --now: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

/// Load config, catalog and scoring options, exiting on any configuration error.
fn load_setup(config_path: Option<PathBuf>, verbose: bool) -> (ReferenceCatalog, ScoringOptions) {
    let config: Config = match water_score::config::load_config(config_path.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let effective_scoring = config.effective_scoring();
    if let Err(errors) = water_score::scoring::validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    let options = match effective_scoring.resolve() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Scoring config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let source_path = config_path.or_else(water_score::config::get_config_path);
    let catalog = match water_score::config::load_catalog_for(&config, source_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Catalog error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if verbose {
        eprintln!(
            "Catalog {}: {} categories, {} parameters",
            catalog.version().unwrap_or("(unversioned)"),
            catalog.categories().len(),
            catalog.parameter_count()
        );
        eprintln!(
            "Windows: recent {:.0}d, medium {:.0}d, decay {:.0}d, bonus up to {:.1}",
            options.windows.recent_days,
            options.windows.medium_days,
            options.windows.decay_days,
            options.temporal_bonus
        );
    }

    (catalog, options)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);
    let use_colors = water_score::output::should_use_colors();

    match cli.command {
        Commands::Catalog { category } => {
            let (catalog, _) = load_setup(config_path, cli.verbose);
            if let Some(key) = category.as_deref() {
                if catalog.category(key).is_none() {
                    eprintln!("Unknown category '{}'", key);
                    std::process::exit(EXIT_INPUT);
                }
            }
            println!(
                "{}",
                water_score::output::format_catalog(&catalog, category.as_deref(), use_colors)
            );
        }
        Commands::Score {
            file,
            now,
            format,
            output,
        } => {
            let override_now = parse_now(now.as_deref());
            let (catalog, options) = load_setup(config_path, cli.verbose);

            let input = match water_score::observations::load_observations(&file) {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let now = input.reference_time(override_now, Utc::now());
            let observations = input.observations();
            if cli.verbose {
                eprintln!(
                    "Loaded {} observations over {} codes from {}",
                    observations.len(),
                    input.parameters.len(),
                    file.display()
                );
            }

            let result = water_score::scoring::score_supply(
                &catalog,
                &observations,
                now,
                input.source.as_ref(),
                &options,
            );

            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let label = input.label(&stem);

            match format {
                OutputFormat::Text => println!(
                    "{}",
                    water_score::output::format_report(&result, label, cli.verbose, use_colors)
                ),
                OutputFormat::Tsv => {
                    println!("{}", water_score::output::format_category_tsv(&result))
                }
                OutputFormat::Json => match water_score::output::format_json(label, &result) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                },
            }

            if let Some(path) = output {
                if let Err(e) = water_score::output::save_report(&path, label, &result) {
                    eprintln!("Failed to save report: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
                if cli.verbose {
                    eprintln!("Report saved to {}", path.display());
                }
            }

            if cli.verbose {
                eprintln!("Scored in {:?}", start_time.elapsed());
            }
        }
        Commands::Batch { files, now, format } => {
            let override_now = parse_now(now.as_deref());
            let (catalog, options) = load_setup(config_path, cli.verbose);

            if cli.verbose {
                eprintln!("Loading {} observation files", files.len());
            }
            let entries = match water_score::batch::load_entries(&files, cli.verbose) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let ranked = water_score::batch::score_all(
                &catalog,
                &entries,
                override_now,
                Utc::now(),
                &options,
            );

            match format {
                OutputFormat::Text => println!(
                    "{}",
                    water_score::output::format_ranked_table(&ranked, use_colors)
                ),
                OutputFormat::Tsv => println!("{}", water_score::output::format_tsv(&ranked)),
                OutputFormat::Json => match water_score::output::format_json_list(&ranked) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                },
            }

            if cli.verbose {
                eprintln!();
                eprintln!("Total: {} sets in {:?}", ranked.len(), start_time.elapsed());
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
