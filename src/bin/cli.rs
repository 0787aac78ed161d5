//! Course deadline CLI
//!
//! Resolves intake deadlines for courses against the university directory.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use deadlines::{
    error::{AppError, Result},
    models::{Config, Course},
    pipeline,
};
use serde::Serialize;

/// Course deadline resolver
#[derive(Parser, Debug)]
#[command(
    name = "deadlines",
    version,
    about = "Match courses to universities and resolve upcoming deadlines"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Read universities from a JSON file instead of the directory API
    #[arg(long, global = true)]
    directory_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve deadlines for a single course
    Resolve {
        /// Course record as JSON (overrides the individual flags)
        #[arg(long)]
        course: Option<PathBuf>,

        /// University name as recorded on the course
        #[arg(long)]
        university: Option<String>,

        /// Municipality of the university
        #[arg(long)]
        city: Option<String>,

        /// Academic year label (e.g., 2026/2027)
        #[arg(long)]
        academic_year: Option<String>,

        /// Program name
        #[arg(long)]
        course_name: Option<String>,
    },

    /// Resolve deadlines for every course in a JSON array
    Batch {
        /// Path to the courses file
        courses: PathBuf,

        /// Write results here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the directory entry a university resolves to
    Match {
        #[arg(long)]
        university: Option<String>,

        #[arg(long)]
        city: Option<String>,
    },

    /// Parse a date text the way intake dates are parsed
    ParseDate {
        text: String,

        /// Reference year (default: from --academic-year, else current year)
        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        academic_year: Option<String>,
    },

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)
    };
    log::debug!("Loaded configuration from {}", cli.config.display());

    let directory_file = cli.directory_file.as_deref();

    match cli.command {
        Command::Resolve {
            course,
            university,
            city,
            academic_year,
            course_name,
        } => {
            let course = match course {
                Some(path) => pipeline::load_course(&path)?,
                None => Course {
                    university_name: university,
                    municipality: city,
                    academic_year,
                    course_name,
                    ..Course::default()
                },
            };

            let directory = pipeline::open_directory(&config, directory_file)?;
            let result = pipeline::run_resolve(&config, directory, course).await?;
            print_json(&result.deadlines)?;
        }

        Command::Batch { courses, output } => {
            let courses = pipeline::load_courses(&courses)?;
            let directory = pipeline::open_directory(&config, directory_file)?;
            let (results, _summary) = pipeline::run_batch(&config, directory, &courses).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&results)?)?;
                    log::info!("Results saved to {}", path.display());
                }
                None => print_json(&results)?,
            }
        }

        Command::Match { university, city } => {
            let directory = pipeline::open_directory(&config, directory_file)?;
            let entry =
                pipeline::run_match(&config, directory, university.as_deref(), city.as_deref())
                    .await?;
            match entry {
                Some(entry) => print_json(&entry)?,
                None => println!("no match"),
            }
        }

        Command::ParseDate {
            text,
            year,
            academic_year,
        } => {
            let parsed = pipeline::run_parse_date(
                &config,
                &text,
                year,
                academic_year.as_deref(),
                Utc::now().date_naive(),
            );
            print_json(&parsed)?;
            if parsed.date.is_none() {
                return Err(AppError::validation(format!("unparseable date: {text:?}")));
            }
        }

        Command::Validate => {
            pipeline::run_validate(&config, directory_file)?;
        }
    }

    Ok(())
}
