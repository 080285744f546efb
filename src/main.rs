//! Command-line interface for efti-datatools

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use efti_datatools::conversion::project;
#[cfg(feature = "cli")]
use efti_datatools::documents::Document;
#[cfg(feature = "cli")]
use efti_datatools::populate::{DomPopulator, PopulateMode, TextContentOverride};
#[cfg(feature = "cli")]
use efti_datatools::schema::{NodeKind, SchemaModel};
#[cfg(feature = "cli")]
use efti_datatools::subsets::{SubsetCategory, SubsetFilter, SubsetId};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "efti-datatools")]
#[command(author, version, about = "eFTI consignment document population and subset filtering", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a sample document from a schema
    Populate {
        /// Schema definition (JSON)
        #[arg(short = 'x', long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Identifier schema; also writes the projected identifier document
        #[arg(long, value_name = "SCHEMA")]
        identifier_schema: Option<PathBuf>,

        /// Seed, a time-derived short seed by default. Identical seeds give
        /// identical documents for a given version
        #[arg(short, long)]
        seed: Option<u64>,

        /// How many instances of each element are generated
        #[arg(short, long, default_value = "minimum-one")]
        repeatable_mode: PopulateMode,

        /// Override in the form "<path>:=<value>", applied in the given order.
        /// Paths use local names; namespaces can be ignored
        #[arg(short, long = "text-override", value_name = "OVERRIDE")]
        text_overrides: Vec<TextContentOverride>,

        /// Output file for the populated document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the identifier document
        #[arg(long)]
        output_identifiers: Option<PathBuf>,

        /// Overwrite existing output files
        #[arg(short = 'w', long)]
        overwrite: bool,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Filter a document down to the requested subsets
    Filter {
        /// Schema definition (JSON)
        #[arg(short = 'x', long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Subset category: common or identifier
        #[arg(short, long, default_value = "common")]
        category: SubsetCategory,

        /// Subset ids to keep, comma separated
        #[arg(short = 'i', long, value_delimiter = ',', required = true)]
        subsets: Vec<SubsetId>,

        /// Path to the XML file to filter
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Display a summary of a schema definition
    Inspect {
        /// Schema definition (JSON)
        #[arg(short = 'x', long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Populate {
            schema,
            identifier_schema,
            seed,
            repeatable_mode,
            text_overrides,
            output,
            output_identifiers,
            overwrite,
            pretty,
        } => cmd_populate(PopulateArgs {
            schema,
            identifier_schema,
            seed: seed.unwrap_or_else(short_seed),
            mode: repeatable_mode,
            overrides: text_overrides,
            output,
            output_identifiers,
            overwrite,
            pretty,
        }),
        Commands::Filter {
            schema,
            category,
            subsets,
            file,
            output,
            pretty,
        } => cmd_filter(schema, category, subsets, file, output, pretty),
        Commands::Inspect { schema, json } => cmd_inspect(schema, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Last five digits of the current time in milliseconds
#[cfg(feature = "cli")]
fn short_seed() -> u64 {
    chrono::Utc::now().timestamp_millis().unsigned_abs() % 100_000
}

#[cfg(feature = "cli")]
struct PopulateArgs {
    schema: PathBuf,
    identifier_schema: Option<PathBuf>,
    seed: u64,
    mode: PopulateMode,
    overrides: Vec<TextContentOverride>,
    output: Option<PathBuf>,
    output_identifiers: Option<PathBuf>,
    overwrite: bool,
    pretty: bool,
}

#[cfg(feature = "cli")]
fn cmd_populate(args: PopulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let schema = SchemaModel::from_file(&args.schema)?;
    let identifier_schema = args
        .identifier_schema
        .as_ref()
        .map(SchemaModel::from_file)
        .transpose()?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("consignment-{}-common.xml", args.seed)));
    let output_identifiers = identifier_schema.as_ref().map(|_| {
        args.output_identifiers
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("consignment-{}-identifiers.xml", args.seed)))
    });

    println!("Generating with:");
    println!("  * schema: {}", args.schema.display());
    println!("  * seed: {}", args.seed);
    println!("  * repeatable mode: {}", args.mode);
    for text_override in &args.overrides {
        println!("  * override: set \"{}\" to \"{}\"", text_override.path, text_override.value);
    }
    println!("  * output: {}", output.display());
    if let Some(path) = &output_identifiers {
        println!("  * output identifiers: {}", path.display());
    }

    if !args.overwrite {
        for path in std::iter::once(&output).chain(output_identifiers.as_ref()) {
            if path.exists() {
                return Err(format!("Output file {} already exists", path.display()).into());
            }
        }
    }

    let doc = DomPopulator::new(args.seed, args.mode).populate(&schema, &args.overrides)?;
    write_document(&doc, &output, args.pretty)?;

    if let (Some(identifier_schema), Some(path)) = (identifier_schema, output_identifiers) {
        let identifiers = project(&doc, &identifier_schema)?;
        write_document(&identifiers, &path, args.pretty)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn write_document(doc: &Document, path: &Path, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, doc.to_xml_string(pretty)?)?;
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_filter(
    schema_path: PathBuf,
    category: SubsetCategory,
    subsets: Vec<SubsetId>,
    file: PathBuf,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = SchemaModel::from_file(&schema_path)?;
    let xml_content = fs::read_to_string(&file)?;
    let doc = Document::from_string(&xml_content)?;

    let subsets = subsets.into_iter().collect();
    let filtered = SubsetFilter::new(&schema).filter_document(&doc, &subsets, category)?;
    let xml = filtered.to_xml_string(pretty)?;

    if let Some(output_path) = output {
        fs::write(output_path, &xml)?;
    } else {
        print!("{}", xml);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schema = SchemaModel::from_file(&schema_path)?;
    let elements = schema.nodes().filter(|n| n.kind() == NodeKind::Element).count();
    let attributes = schema.len() - elements;
    let ids = |category| {
        schema
            .subsets(category)
            .iter()
            .map(|id| id.as_str().to_string())
            .collect::<Vec<_>>()
    };
    let common = ids(SubsetCategory::Common);
    let identifier = ids(SubsetCategory::Identifier);

    if json_output {
        let json = serde_json::json!({
            "root": schema.root().name().to_string(),
            "statistics": {
                "elements": elements,
                "attributes": attributes,
            },
            "subsets": {
                "common": common,
                "identifier": identifier,
            },
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("efti-datatools v{}", efti_datatools::VERSION);
        println!();
        println!("Schema Information:");
        println!("  Root: {}", schema.root().name());
        println!();
        println!("Statistics:");
        println!("  Elements: {}", elements);
        println!("  Attributes: {}", attributes);
        println!();
        println!("Subsets:");
        println!("  Common: {}", common.join(", "));
        println!("  Identifier: {}", identifier.join(", "));
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
