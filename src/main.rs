use anyhow::{Context, Result};
use clap::Parser;
use ojs_meta::{AssemblerConfig, MetadataAssembler, MetadataError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Directory holding the input files when running inside the typesetting container.
const CONTAINER_INPUT_DIR: &str = "xml_input";

#[derive(Parser, Debug)]
#[command(
    name = "ojs-meta",
    version,
    about = "Converts an OJS XML article export to YAML metadata",
    long_about = "Reads the OJS native XML export of one article and writes the YAML \
                  metadata used by the typesetting templates"
)]
struct Cli {
    /// Path to the input XML file
    xml_file: PathBuf,

    /// Year of publication
    #[arg(short, long)]
    year: Option<String>,

    /// Volume number, overrides the one in the export
    #[arg(short, long)]
    volume: Option<String>,

    /// ORCIDs of authors: --orcid Starke=0000-0001-1111-1111 Jurczyk=0000-0002-5943-2305
    #[arg(short, long, num_args = 1.., value_name = "LASTNAME=ORCID")]
    orcid: Vec<String>,

    /// Special issue text printed at the beginning of the article
    #[arg(short, long = "specialissue")]
    special_issue: Option<String>,

    /// DOI, overrides the one in the export
    #[arg(short, long)]
    doi: Option<String>,

    /// Where to write the YAML metadata
    #[arg(long, default_value = "yaml_output/metadata.yaml")]
    output: PathBuf,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> AssemblerConfig {
        AssemblerConfig {
            year: self.year.clone(),
            volume: self.volume.clone(),
            orcids: self.orcid.clone(),
            doi: self.doi.clone(),
            special_issue: self.special_issue.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let in_container = std::env::var("IS_CONTAINER").is_ok_and(|v| v == "true");
    let input = input_path(&cli.xml_file, in_container);
    if !input.is_file() {
        println!("ERROR_NO_FILE_FOUND");
        return ExitCode::FAILURE;
    }

    match run(&cli, &input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<MetadataError>() {
                Some(MetadataError::MissingPublication) => {
                    error!("NO_PUBLICATION_DATA_FOUND. EXIT.")
                }
                _ => error!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn input_path(xml_file: &Path, in_container: bool) -> PathBuf {
    if in_container {
        Path::new(CONTAINER_INPUT_DIR).join(xml_file)
    } else {
        xml_file.to_path_buf()
    }
}

fn run(cli: &Cli, input: &Path) -> Result<()> {
    info!(input = %input.display(), "Converting OJS export");

    let metadata = MetadataAssembler::new()
        .with_config(cli.config())
        .assemble_file(input)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    metadata
        .write_to(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    Ok(())
}
