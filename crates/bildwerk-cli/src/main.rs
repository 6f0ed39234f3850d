// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — turn a sequence of images into one multi-page PDF.
//
// Entry point. Initialises logging, parses the command line, runs the
// conversion pipeline and saves the result.

mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use bildwerk_core::error::ItemFailure;
use bildwerk_core::human_errors::{describe_omissions, humanize_error};
use bildwerk_core::types::ImageId;
use bildwerk_document::{ConversionOutcome, IntakeInput, PdfReader, convert_to_pdf};
use clap::{Parser, Subcommand};

use settings::ConvertArgs;

/// Exit code when no image could be converted.
const EXIT_NOTHING_TO_EXPORT: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "bildwerk", version, about = "Convert images into a single multi-page PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert images into one PDF, one image per page.
    Convert(ConvertArgs),
    /// Show the page count and page sizes of a PDF.
    Inspect {
        /// PDF file to inspect.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Convert(args) => run_convert(args).await,
        Command::Inspect { file } => run_inspect(&file),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = ?err, "bildwerk failed");
            match err.downcast_ref::<bildwerk_core::BildwerkError>() {
                Some(bildwerk_err) => {
                    let human = humanize_error(bildwerk_err);
                    eprintln!("{}\n{}", human.message, human.suggestion);
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_convert(args: ConvertArgs) -> anyhow::Result<ExitCode> {
    let config = args.resolve()?;
    let output = args.output_path(&config);

    // Unreadable files are reported like undecodable ones; `positions` maps
    // the pipeline's numbering back to the command-line position.
    let mut inputs = Vec::with_capacity(args.images.len());
    let mut positions = Vec::with_capacity(args.images.len());
    let mut unreadable = Vec::new();
    for (position, path) in args.images.iter().enumerate() {
        match IntakeInput::from_path(path) {
            Ok(input) => {
                inputs.push(input);
                positions.push(position);
            }
            Err(err) => unreadable.push(ItemFailure::new(
                ImageId::new(),
                path.display().to_string(),
                position,
                &err,
            )),
        }
    }

    tracing::info!(
        images = inputs.len(),
        unreadable = unreadable.len(),
        layout = ?config.layout,
        "Starting conversion"
    );

    let outcome = convert_to_pdf(inputs, &config).await?;

    let mut omitted: Vec<ItemFailure> = outcome
        .omitted()
        .iter()
        .cloned()
        .map(|mut failure| {
            if let Some(position) = positions.get(failure.source_order) {
                failure.source_order = *position;
            }
            failure
        })
        .collect();
    omitted.extend(unreadable);

    if let Some(text) = describe_omissions(&omitted) {
        eprintln!("{text}");
    }

    match outcome {
        ConversionOutcome::Exported { document, .. } => {
            document
                .write_to_file(&output)
                .with_context(|| format!("saving {}", output.display()))?;
            println!(
                "Wrote {} ({} page{}, sha256 {})",
                output.display(),
                document.page_count(),
                if document.page_count() == 1 { "" } else { "s" },
                document.sha256_hex()
            );
            Ok(ExitCode::SUCCESS)
        }
        ConversionOutcome::NothingToExport { .. } => {
            eprintln!("Nothing to export: no image could be converted.");
            Ok(ExitCode::from(EXIT_NOTHING_TO_EXPORT))
        }
    }
}

fn run_inspect(file: &Path) -> anyhow::Result<ExitCode> {
    let reader = PdfReader::open(file)?;
    let sizes = reader.page_sizes_mm()?;
    let name = reader
        .source_path()
        .map(str::to_owned)
        .unwrap_or_else(|| file.display().to_string());
    println!("{name}: {} page(s)", reader.page_count());
    for (index, (width, height)) in sizes.iter().enumerate() {
        println!("  page {:>3}: {width:.1} x {height:.1} mm", index + 1);
    }
    Ok(ExitCode::SUCCESS)
}
