//! Fill placeholders in a layout snapshot.
//!
//! Loads a document snapshot (JSON), detects its placeholders, erases the
//! ones with a value, draws the values in, and writes the filled snapshot
//! plus a JSON report.
//!
//! Usage:
//!   cargo run --release --bin placeholder-fill -- --input doc.json --values values.json
//!   cargo run --release --bin placeholder-fill -- --input doc.json --detect-only
//!
//! Options:
//!   --input <path>        snapshot to fill (required)
//!   --values <path>       JSON object of key -> value
//!   --request <path>      full fill request JSON (values merged on top)
//!   --config <path>       pipeline configuration JSON
//!   --output <path>       filled snapshot (default: <input stem>.filled.json)
//!   --report <path>       report JSON (default: stdout)
//!   --font <path>         font file to draw with
//!   --fonts-dir <path>    extra fallback font directory (repeatable)
//!   --detect-only         print detected placeholders and exit
//!   --verbose, -v         log progress

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use indexmap::IndexMap;
use placeholder_oxide::config::PipelineConfig;
use placeholder_oxide::engine::{LayoutSnapshot, MemoryDocument};
use placeholder_oxide::fill::FillRequest;
use placeholder_oxide::Pipeline;

struct FillArgs {
    input: PathBuf,
    values: Option<PathBuf>,
    request: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    font: Option<PathBuf>,
    font_dirs: Vec<PathBuf>,
    detect_only: bool,
    verbose: bool,
}

impl FillArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut parsed = Self {
            input: PathBuf::new(),
            values: None,
            request: None,
            config: None,
            output: None,
            report: None,
            font: None,
            font_dirs: Vec::new(),
            detect_only: false,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--detect-only" => parsed.detect_only = true,
                "--verbose" | "-v" => parsed.verbose = true,
                "--input" | "--values" | "--request" | "--config" | "--output" | "--report" | "--font"
                | "--fonts-dir" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .map(PathBuf::from)
                        .ok_or_else(|| format!("{} needs a value", flag))?;
                    match flag {
                        "--input" => input = Some(value),
                        "--values" => parsed.values = Some(value),
                        "--request" => parsed.request = Some(value),
                        "--config" => parsed.config = Some(value),
                        "--output" => parsed.output = Some(value),
                        "--report" => parsed.report = Some(value),
                        "--font" => parsed.font = Some(value),
                        _ => parsed.font_dirs.push(value),
                    }
                },
                other => return Err(format!("unknown argument: {}", other)),
            }
            i += 1;
        }

        parsed.input = input.ok_or_else(|| "--input is required".to_string())?;
        Ok(parsed)
    }

    fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let stem = self
                    .input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                self.input.with_file_name(format!("{}.filled.json", stem))
            },
        }
    }
}

fn load_request(args: &FillArgs) -> Result<FillRequest, Box<dyn std::error::Error>> {
    let mut request = match &args.request {
        Some(path) => serde_json::from_str::<FillRequest>(&fs::read_to_string(path)?)?,
        None => FillRequest::new(),
    };
    if let Some(path) = &args.values {
        let values: IndexMap<String, serde_json::Value> = serde_json::from_str(&fs::read_to_string(path)?)?;
        for (key, value) in values {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            request.values.insert(key, text);
        }
    }
    if let Some(font) = &args.font {
        request.font_override = Some(font.clone());
    }
    Ok(request)
}

fn write_report(path: Option<&Path>, json: &str) -> std::io::Result<()> {
    match path {
        Some(path) => fs::write(path, json),
        None => {
            println!("{}", json);
            Ok(())
        },
    }
}

fn run(args: &FillArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    config.fonts.fallback_dirs.extend(args.font_dirs.iter().cloned());

    let snapshot = LayoutSnapshot::from_file(&args.input)?;
    let mut doc: MemoryDocument = snapshot.to_document()?;
    let pipeline = Pipeline::new(config)?;

    if args.detect_only {
        let hits = pipeline.detect(&doc)?;
        if args.verbose {
            eprintln!("{} placeholders in {}", hits.len(), args.input.display());
        }
        write_report(args.report.as_deref(), &serde_json::to_string_pretty(&hits)?)?;
        return Ok(());
    }

    let request = load_request(args)?;
    let start = Instant::now();
    let report = pipeline.process(&mut doc, &request)?;
    if args.verbose {
        eprintln!(
            "{} placeholders, {} filled, {} clipped, {} missing keys in {:.1} ms",
            report.hits.len(),
            report.fill.diagnostics.len(),
            report.fill.clipped().count(),
            report.fill.missing_keys.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let output = args.output_path();
    LayoutSnapshot::from_document(&doc).save(&output)?;
    if args.verbose {
        eprintln!("wrote {}", output.display());
    }
    write_report(args.report.as_deref(), &serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match FillArgs::from_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: placeholder-fill --input <snapshot.json> [--values <values.json>] [--output <path>]");
            process::exit(2);
        },
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
