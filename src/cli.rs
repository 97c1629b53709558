use crate::config::{Config, OutputFormat};
use crate::formats::FormatRegistry;
use crate::metadata::ClassIndex;
use crate::openapi_builder::OpenApiBuilder;
use crate::routes::RouteTable;
use crate::serializer::{serialize, write_to_file};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI From Routes - Generate OpenAPI documentation from a web application's route table
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the OpenAPI document
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Route table exported by the host application (YAML or JSON)
    #[arg(short = 'r', long = "routes", value_name = "FILE")]
    pub routes: PathBuf,

    /// Configuration file (YAML or JSON); defaults apply when omitted
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Application source tree scanned for controllers, requests and resources
    #[arg(short = 's', long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Output file path (overrides the configuration)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Response format name, e.g. simple or json-api (overrides the configuration)
    #[arg(short = 'f', long = "format", value_name = "NAME")]
    pub format: Option<String>,

    /// Serialization of the output file (overrides the configuration)
    #[arg(long = "output-format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Seed for reproducible example values
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

/// Counts reported after a successful generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub format: String,
    pub routes: usize,
    pub endpoints: usize,
    pub schemas: usize,
    pub responses: usize,
    pub security_schemes: usize,
    pub tags: usize,
    pub bytes: usize,
    pub path: PathBuf,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    let Command::Generate(generate) = &args.command;

    if !generate.routes.is_file() {
        anyhow::bail!("Route table does not exist: {}", generate.routes.display());
    }

    if let Some(source) = &generate.source {
        if !source.is_dir() {
            anyhow::bail!("Source path is not a directory: {}", source.display());
        }
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Generate(generate_args) => {
            let summary = generate(&generate_args)?;
            info!("Generation complete!");
            info!("Summary:");
            info!("  - Format: {}", summary.format);
            info!("  - Routes processed: {}", summary.routes);
            info!("  - Endpoints: {}", summary.endpoints);
            info!("  - Schemas: {}", summary.schemas);
            info!("  - Responses: {}", summary.responses);
            info!("  - Security schemes: {}", summary.security_schemes);
            info!("  - Tags: {}", summary.tags);
            info!(
                "  - Output: {} ({:.1} KB)",
                summary.path.display(),
                summary.bytes as f64 / 1024.0
            );
            Ok(())
        }
    }
}

/// Load inputs, build the document and write it out.
pub fn generate(args: &GenerateArgs) -> Result<GenerationSummary> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Configuration, with command line overrides
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if let Some(output_format) = args.output_format {
        config.output.format = output_format;
    }
    if args.seed.is_some() {
        config.examples.seed = args.seed;
    }

    // Step 2: Resolve the response format before doing any work
    let registry = FormatRegistry::new();
    let format = registry
        .resolve(&config.format)
        .context("Invalid response format")?;
    info!("Response format: {}", format.name());

    // Step 3: Route table and class metadata
    info!("Loading route table: {}", args.routes.display());
    let table = RouteTable::load(&args.routes)
        .with_context(|| format!("Failed to load route table: {}", args.routes.display()))?;
    info!("Found {} routes", table.routes.len());

    let mut classes = match &args.source {
        Some(source) => {
            info!("Scanning source directory: {}", source.display());
            let scanned = ClassIndex::from_directory(source, &["php"])?;
            info!("Indexed {} classes", scanned.len());
            scanned
        }
        None => ClassIndex::new(),
    };
    // Metadata supplied with the route table is exact and wins over scanning
    classes.merge(table.classes);

    // Step 4: Build the document
    info!("Building OpenAPI document...");
    let mut builder = OpenApiBuilder::new(&config, &classes, format).with_progress(|progress| {
        let methods: Vec<String> = progress.methods.iter().map(|m| m.to_string()).collect();
        info!(
            "[{}/{}] {} {}",
            progress.index,
            progress.total,
            methods.join(" "),
            progress.route.bare_uri()
        );
    });
    let document = builder.build(&table.routes);
    let routes = builder.processed_routes();
    let format_name = builder.format().name().to_string();

    // Step 5: Serialize and write
    debug!("Serializing to {:?}", config.output.format);
    let content = serialize(&document, config.output.format, config.output.pretty)?;
    write_to_file(&content, &config.output.path)?;
    info!("Wrote OpenAPI document to {}", config.output.path.display());

    Ok(GenerationSummary {
        format: format_name,
        routes,
        endpoints: document.operation_count(),
        schemas: document.components.schemas.len(),
        responses: document.components.responses.len(),
        security_schemes: document.components.security_schemes.len(),
        tags: document.tags.len(),
        bytes: content.len(),
        path: config.output.path.clone(),
    })
}
