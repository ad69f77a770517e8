//! Bracket Draw CLI
//!
//! Usage:
//!   bracket-draw process <FILES>... [OPTIONS]
//!   bracket-draw categories [--catalog <FILE>]
//!   bracket-draw bracket <REQUEST> [OPTIONS]
//!
//! Options:
//!   -c, --catalog <FILE>    Category catalog (TOML format)
//!   -t, --templates <FILE>  Bracket templates (TOML format)
//!   --svg-dir <DIR>         Write one SVG per bracket
//!   -v, --verbose           Debug logging on stderr

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use bracket_draw::logging::init_logging;
use bracket_draw::{
    CategoryBracket, CategoryCatalog, Error, ManualRequest, Pipeline, PipelineConfig,
    TemplateRegistry,
};

#[derive(Parser)]
#[command(name = "bracket-draw")]
#[command(about = "Categorize tournament registrations and lay out elimination brackets")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Categorize registration sheets and draw every bracket
    Process {
        /// CSV registration sheets, processed in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Category catalog (TOML format)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Date ages are computed against (YYYY-MM-DD, default today)
        #[arg(long)]
        reference_date: Option<NaiveDate>,

        /// Keep rows of every modality, not only sparring
        #[arg(long)]
        all_modalities: bool,

        /// Bracket templates (TOML format)
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Write one SVG per bracket into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,

        /// Report format on stdout
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List every valid category key
    Categories {
        /// Category catalog (TOML format)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// Draw brackets from a manual JSON request
    Bracket {
        /// JSON file: {"brackets": [{"category", "participants": [{"name", "academy"}]}]}
        request: PathBuf,

        /// Bracket templates (TOML format)
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Write one SVG per bracket into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(command: Command) -> Result<(), Error> {
    match command {
        Command::Process {
            files,
            catalog,
            reference_date,
            all_modalities,
            templates,
            svg_dir,
            format,
        } => {
            let mut config = PipelineConfig::new().with_modality_filter(!all_modalities);
            if let Some(date) = reference_date {
                config = config.with_reference_date(date);
            }
            let pipeline = build_pipeline(catalog.as_deref(), templates.as_deref(), config)?;
            let report = pipeline.run_paths(&files);

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                Format::Text => {
                    print!("{}", report.summary);
                    if !report.invalid_keys.is_empty() {
                        println!();
                        println!("INVALID CATEGORIES:");
                        for key in &report.invalid_keys {
                            println!("- {}", key);
                        }
                    }
                    for failure in &report.sources.failed {
                        eprintln!("Skipped source '{}': {}", failure.source_id, failure.message);
                    }
                }
            }

            if let Some(dir) = svg_dir {
                write_svgs(&pipeline, &report.brackets, &dir)?;
            }
            Ok(())
        }
        Command::Categories { catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            print!("{}", catalog.listing());
            Ok(())
        }
        Command::Bracket {
            request,
            templates,
            svg_dir,
        } => {
            let content = fs::read_to_string(&request)?;
            let request = ManualRequest::from_json(&content)?;
            let pipeline = build_pipeline(None, templates.as_deref(), PipelineConfig::new())?;
            let brackets = pipeline.manual_brackets(&request);

            match svg_dir {
                Some(dir) => write_svgs(&pipeline, &brackets, &dir)?,
                None => println!("{}", serde_json::to_string_pretty(&brackets)?),
            }
            Ok(())
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<CategoryCatalog, Error> {
    Ok(match path {
        Some(path) => CategoryCatalog::from_file(path)?,
        None => CategoryCatalog::default(),
    })
}

fn build_pipeline(
    catalog: Option<&Path>,
    templates: Option<&Path>,
    config: PipelineConfig,
) -> Result<Pipeline, Error> {
    let catalog = Arc::new(load_catalog(catalog)?);
    let mut pipeline = Pipeline::new(catalog, config);
    if let Some(path) = templates {
        let registry = TemplateRegistry::from_file(path)?;
        pipeline = pipeline.with_templates(Arc::new(registry));
    }
    Ok(pipeline)
}

fn write_svgs(pipeline: &Pipeline, brackets: &[CategoryBracket], dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir)?;
    for bracket in brackets {
        let path = dir.join(format!("{}.svg", bracket.file_stem()));
        fs::write(&path, pipeline.render(bracket)?)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
