//! ProtoCodec CLI: the command-line interface for ProtoCodec.
//!
//! # Commands
//! ```text
//! protocodec parse     --file <path.psdl>
//! protocodec encode    --type <Name> --json <json|@file> [--format hex|base64] [--delimited]
//! protocodec decode    --type <Name> (--hex <hex> | --base64 <b64>) [--delimited] [--sparse]
//! protocodec describe  --type <Name> [--json]
//! protocodec schemas   list|validate
//! protocodec test      --fixtures <dir>
//! protocodec bench     --type <Name> --iterations <N> --threads <N>
//! protocodec info
//! ```

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use protocodec_core::{Codec, JsonOptions, SchemaRegistry, WireReader};
use protocodec_observability::{init_tracing, CodecMetrics, LogConfig};
use protocodec_registry::{load_bundled, Definition, MemoryRegistry, PsdlParser, BUNDLED_SCHEMAS};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

mod cmd_parse;
mod cmd_test;
mod config;

use config::FileConfig;

#[derive(Parser)]
#[command(
    name = "protocodec",
    about = "Schema-driven protobuf codec: ProtoCodec CLI",
    long_about = "
ProtoCodec CLI: encode and decode protobuf records against PSDL schemas.
Ships with the google.protobuf.Any, cosmos base, cronos and ethermint EVM
schemas; --schema-dir layers extra .psdl files on top.
",
    version
)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Extra directory of .psdl files loaded over the bundled schemas
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    /// YAML configuration file (codec + log sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a PSDL schema file
    Parse {
        /// Path to the .psdl file
        #[arg(short, long)]
        file: String,
    },

    /// Encode a JSON record to protobuf bytes
    Encode {
        /// Fully-qualified message type, e.g. cronos.TokenMapping
        #[arg(long = "type")]
        type_name: String,
        /// JSON object, or @path to read it from a file
        #[arg(long)]
        json: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Hex)]
        format: OutputFormat,
        /// Prefix the output with its varint length
        #[arg(long)]
        delimited: bool,
    },

    /// Decode protobuf bytes to JSON
    Decode {
        /// Fully-qualified message type, e.g. cronos.TokenMapping
        #[arg(long = "type")]
        type_name: String,
        /// Input bytes as hex (0x prefix optional)
        #[arg(long, conflicts_with = "base64", required_unless_present = "base64")]
        hex: Option<String>,
        /// Input bytes as standard base64
        #[arg(long)]
        base64: Option<String>,
        /// Input is a stream of length-prefixed records
        #[arg(long)]
        delimited: bool,
        /// Omit default-valued fields from the output
        #[arg(long)]
        sparse: bool,
    },

    /// Show the field table of a message type
    Describe {
        #[arg(long = "type")]
        type_name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run golden test fixtures
    Test {
        /// Directory containing fixture JSON files
        #[arg(long, default_value = "./fixtures")]
        fixtures: String,
        /// Only run fixtures for this message type
        #[arg(long = "type")]
        type_name: Option<String>,
    },

    /// Benchmark batch decode throughput
    Bench {
        #[arg(long = "type")]
        type_name: String,
        /// Sample record as JSON (default: the all-defaults record)
        #[arg(long)]
        json: Option<String>,
        /// Number of payloads to decode
        #[arg(long, default_value_t = 100_000)]
        iterations: usize,
        /// Number of parallel Rayon threads (0 = use default)
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },

    /// Schema registry management
    Schemas {
        #[command(subcommand)]
        action: SchemasAction,
    },

    /// Show ProtoCodec build and capability info
    Info,
}

#[derive(Subcommand)]
enum SchemasAction {
    /// List all loaded messages and services
    List,
    /// Validate every .psdl file in a directory against the bundled schemas
    Validate {
        #[arg(long, default_value = "./schemas")]
        dir: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Hex,
    Base64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut log = file_config.log.clone().unwrap_or_else(|| LogConfig {
        level: "warn".into(),
        ..LogConfig::default()
    });
    if cli.verbose {
        log.level = "debug".into();
    }
    log.json |= cli.log_json;
    // Only fails if a subscriber is already installed.
    let _ = init_tracing(&log);

    let load = || -> Result<(MemoryRegistry, Codec)> {
        let registry = build_registry(cli.schema_dir.as_deref())?;
        let codec = Codec::from_config(Arc::new(registry.clone()), file_config.codec.clone());
        Ok((registry, codec))
    };

    match &cli.command {
        Commands::Parse { file } => cmd_parse::run(file, cli.verbose),

        Commands::Encode {
            type_name,
            json,
            format,
            delimited,
        } => cmd_encode(&load()?.1, type_name, json, *format, *delimited),

        Commands::Decode {
            type_name,
            hex,
            base64,
            delimited,
            sparse,
        } => cmd_decode(
            &load()?.1,
            type_name,
            hex.as_deref(),
            base64.as_deref(),
            *delimited,
            *sparse,
        ),

        Commands::Describe { type_name, json } => cmd_describe(&load()?.1, type_name, *json),

        Commands::Test {
            fixtures,
            type_name,
        } => cmd_test::run(&load()?.1, fixtures, type_name.as_deref(), cli.verbose),

        Commands::Bench {
            type_name,
            json,
            iterations,
            threads,
        } => cmd_bench(load()?.1, type_name, json.as_deref(), *iterations, *threads),

        Commands::Schemas { action } => match action {
            SchemasAction::List => cmd_schemas_list(&load()?.0),
            SchemasAction::Validate { dir } => cmd_schemas_validate(dir),
        },

        Commands::Info => cmd_info(),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Bundled schemas plus everything under `schema_dir`, reference-checked.
fn build_registry(schema_dir: Option<&Path>) -> Result<MemoryRegistry> {
    let registry = MemoryRegistry::new();
    load_bundled(&registry)?;
    if let Some(dir) = schema_dir {
        let n = registry
            .load_directory(dir)
            .with_context(|| format!("load schemas from '{}'", dir.display()))?;
        tracing::info!(dir = %dir.display(), definitions = n, "loaded extra schemas");
    }
    registry.check_references()?;
    Ok(registry)
}

/// A JSON argument, or the contents of the file it names when prefixed with `@`.
fn read_json_arg(arg: &str) -> Result<serde_json::Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("read '{path}'"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("parse JSON input")
}

fn decode_input(hex_in: Option<&str>, b64_in: Option<&str>) -> Result<Vec<u8>> {
    match (hex_in, b64_in) {
        (Some(h), _) => {
            let h = h.trim();
            hex::decode(h.strip_prefix("0x").unwrap_or(h)).context("invalid hex input")
        }
        (None, Some(b)) => STANDARD.decode(b.trim()).context("invalid base64 input"),
        (None, None) => Err(anyhow!("one of --hex or --base64 is required")),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_encode(codec: &Codec, type_name: &str, json: &str, format: OutputFormat, delimited: bool) -> Result<()> {
    let value = read_json_arg(json)?;
    let record = codec.from_json(type_name, &value)?;
    let bytes = if delimited {
        codec.encode_delimited(&record)?
    } else {
        codec.encode(&record)?
    };
    CodecMetrics::global().record_encoded(type_name);
    match format {
        OutputFormat::Hex => println!("{}", hex::encode(&bytes)),
        OutputFormat::Base64 => println!("{}", STANDARD.encode(&bytes)),
    }
    Ok(())
}

fn cmd_decode(
    codec: &Codec,
    type_name: &str,
    hex_in: Option<&str>,
    b64_in: Option<&str>,
    delimited: bool,
    sparse: bool,
) -> Result<()> {
    let bytes = decode_input(hex_in, b64_in)?;
    let codec = if sparse {
        codec.clone().with_json_options(JsonOptions {
            emit_defaults: false,
            ..codec.config().json.clone()
        })
    } else {
        codec.clone()
    };
    let metrics = CodecMetrics::global();

    let output = if delimited {
        let mut reader = WireReader::new(&bytes);
        let mut items = Vec::new();
        while !reader.is_eof() {
            let started = Instant::now();
            let result = codec.decode_delimited(type_name, &mut reader);
            metrics.observe_decode(type_name, started, &result);
            items.push(codec.to_json(&result?)?);
        }
        serde_json::Value::Array(items)
    } else {
        let started = Instant::now();
        let result = codec.decode(type_name, &bytes);
        metrics.observe_decode(type_name, started, &result);
        codec.to_json(&result?)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_describe(codec: &Codec, type_name: &str, as_json: bool) -> Result<()> {
    let desc = codec.schema(type_name)?.describe();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&desc)?);
        return Ok(());
    }
    println!("{}  ({})", desc.name, desc.type_url);
    if let Some(d) = &desc.description {
        println!("  {d}");
    }
    println!();
    println!("  {:>4}  {:24} {:24} {:12} {:10} wire", "tag", "field", "json", "type", "card.");
    for f in &desc.fields {
        let packed = if f.packed { " packed" } else { "" };
        println!(
            "  {:>4}  {:24} {:24} {:12} {:10} {}{}",
            f.tag,
            f.name,
            f.json_name,
            f.ty,
            format!("{:?}", f.cardinality).to_lowercase(),
            f.wire_type,
            packed
        );
    }
    Ok(())
}

fn cmd_bench(codec: Codec, type_name: &str, json: Option<&str>, iterations: usize, threads: usize) -> Result<()> {
    use protocodec_batch::{BatchEngine, BatchRequest, ErrorMode};

    let record = match json {
        Some(arg) => codec.from_json(type_name, &read_json_arg(arg)?)?,
        None => codec.default_record(type_name)?,
    };
    let payload = codec.encode(&record)?;
    let batch = vec![payload.clone(); iterations];

    println!(
        "Benchmarking '{type_name}': {iterations} payloads of {} bytes ...",
        payload.len()
    );

    let metrics = CodecMetrics::global();
    let engine = BatchEngine::new(Arc::new(codec));
    let start = Instant::now();
    let result = engine.decode(
        BatchRequest::new(type_name, batch)
            .concurrency(threads)
            .error_mode(ErrorMode::Collect),
    )?;
    let elapsed = start.elapsed();

    metrics.record_batch(iterations);
    if iterations > 0 {
        metrics.record_latency(elapsed.as_secs_f64() * 1_000.0 / iterations as f64, type_name);
    }

    let success = result.records.len();
    let throughput = iterations as f64 / elapsed.as_secs_f64();
    let threads_used = if threads == 0 {
        rayon::current_num_threads()
    } else {
        threads
    };

    println!("Results:");
    println!("  Total:      {iterations} records");
    println!(
        "  Decoded:    {success} ({:.1}%)",
        100.0 * result.success_rate()
    );
    println!("  Errors:     {}", result.errors.len());
    println!("  Threads:    {threads_used}");
    println!("  Duration:   {:.3}s", elapsed.as_secs_f64());
    println!("  Throughput: {throughput:.0} records/sec");
    println!(
        "  Bandwidth:  {:.1} MiB/sec",
        throughput * payload.len() as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}

fn cmd_schemas_list(registry: &MemoryRegistry) -> Result<()> {
    let messages = registry.all_messages();
    let services = registry.all_services();

    println!("{} messages, {} services", messages.len(), services.len());
    println!();
    for m in &messages {
        println!("  message {:56} {:>2} fields", m.name, m.fields.len());
    }
    for s in &services {
        println!("  service {:56} {:>2} methods", s.name, s.methods.len());
    }
    Ok(())
}

fn cmd_schemas_validate(dir: &str) -> Result<()> {
    let registry = MemoryRegistry::new();
    load_bundled(&registry)?;

    let mut ok = 0;
    let mut errors = 0;

    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "psdl"))
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    for path in &paths {
        let content = std::fs::read_to_string(path)?;
        match check_psdl(&registry, &content) {
            Ok(n) => {
                ok += n;
                println!("  ✓ {} ({n} definitions)", path.display());
            }
            Err(e) => {
                errors += 1;
                eprintln!("  ✗ {}: {e}", path.display());
            }
        }
    }

    if let Err(e) = registry.check_references() {
        errors += 1;
        eprintln!("  ✗ references: {e}");
    }

    println!("\n{ok} definitions valid, {errors} errors");
    if errors > 0 {
        anyhow::bail!("{errors} schema check(s) failed");
    }
    Ok(())
}

/// Parse and validate one PSDL file against `registry`, adding its new
/// definitions. A definition that is already registered must be identical
/// to the registered one.
fn check_psdl(registry: &MemoryRegistry, content: &str) -> Result<usize> {
    let defs = PsdlParser::parse_all(content)?;
    let count = defs.len();
    let mut fresh = Vec::new();
    for def in defs {
        let same = match &def {
            Definition::Message(m) => registry.message(&m.name).map(|known| *known == *m),
            Definition::Service(s) => registry.service(&s.name).map(|known| *known == *s),
        };
        match same {
            Some(true) => {}
            Some(false) => {
                return Err(anyhow!(
                    "'{}' conflicts with the already registered definition",
                    def.name()
                ))
            }
            None => fresh.push(def),
        }
    }
    registry.add_all(fresh)?;
    Ok(count)
}

fn cmd_info() -> Result<()> {
    println!("ProtoCodec v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Capabilities:");
    println!("  ✓ Protobuf wire encode / decode   (proto3, packed + unpacked repeated)");
    println!("  ✓ Length-delimited streams");
    println!("  ✓ Canonical JSON conversion       (camelCase keys, base64 bytes)");
    println!("  ✓ Partial record construction");
    println!("  ✓ Integer strategies             (native 64-bit, JS-safe 2^53-1)");
    println!("  ✓ PSDL schema parser             (multi-doc YAML)");
    println!("  ✓ Parallel batch decode          (Rayon)");
    println!("  ✓ google.protobuf.Any packing and service clients");
    println!();
    println!("Bundled schema files:");
    for (path, _) in BUNDLED_SCHEMAS {
        println!("  {path}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    fn bundled() -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        load_bundled(&registry).unwrap();
        registry
    }

    #[test]
    fn redeclared_bundled_message_is_validated() {
        let registry = bundled();
        let dup_tags = "message cronos.TokenMapping:\n  fields:\n    denom: { tag: 1, type: string }\n    contract: { tag: 1, type: string }\n";
        assert!(check_psdl(&registry, dup_tags).is_err());

        let reserved = "message cronos.TokenMapping:\n  fields:\n    denom: { tag: 1, type: string }\n    contract: { tag: 19001, type: string }\n";
        assert!(check_psdl(&registry, reserved).is_err());
    }

    #[test]
    fn redeclaration_must_match_bundled() {
        let registry = bundled();
        let same = "message cronos.TokenMapping:\n  description: \"Mapping between a native denom and an ERC20 contract address\"\n  fields:\n    denom: { tag: 1, type: string }\n    contract: { tag: 2, type: string }\n";
        assert_eq!(check_psdl(&registry, same).unwrap(), 1);

        let different = "message cronos.TokenMapping:\n  fields:\n    denom: { tag: 1, type: string }\n    contract: { tag: 3, type: string }\n";
        let err = check_psdl(&registry, different).unwrap_err();
        assert!(err.to_string().contains("conflicts"));
    }

    #[test]
    fn new_definitions_are_added() {
        let registry = bundled();
        let extra = "message test.Extra:\n  fields:\n    id: { tag: 1, type: uint64 }\n";
        assert_eq!(check_psdl(&registry, extra).unwrap(), 1);
        assert!(registry.message("test.Extra").is_some());
    }

    #[test]
    fn global_flags_reach_subcommands() {
        let cli = Cli::try_parse_from(["protocodec", "test", "--fixtures", "fx", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Test { .. }));
    }
}
