//! tableqr command-line entrypoint

use clap::Parser;
use std::path::PathBuf;
use tableqr::output::render_report;
use tableqr::{
    BatchGenerator, ChannelSink, Error, ProgressEvent, Result, TableQrConfig, logging, validate,
};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "tableqr",
    version,
    about = "Generate numbered table QR codes with the number printed in the middle"
)]
struct Cli {
    /// Configuration file (toml/yaml). Defaults to ./tableqr.{toml,yaml,yml}, then $XDG_CONFIG_HOME/tableqr/config.{toml,yaml,yml}
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// URL prefix; the table number is appended as-is (include any trailing `/` or `=`)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Number of tables to generate, starting at 1
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    count: Option<i64>,

    /// Directory receiving `<n>.png` files (created when missing)
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Scalable font (.ttf/.otf) used for the table number
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Table number size in pixels
    #[arg(long, value_name = "PX")]
    font_size: Option<u32>,

    /// Output progress and the summary as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Decode every written file and report those that do not read back
    #[arg(long)]
    verify: bool,
}

impl Cli {
    fn apply(&self, config: &mut TableQrConfig) {
        let generation = &mut config.generation;
        if let Some(ref url) = self.base_url {
            generation.base_url = url.clone();
        }
        if let Some(count) = self.count {
            generation.table_count = count;
        }
        if let Some(ref dir) = self.output {
            generation.output_dir = dir.clone();
        }
        if let Some(ref font) = self.font {
            generation.font_path = font.clone();
        }
        if let Some(size) = self.font_size {
            generation.font_size = size;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TableQrConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(&config.logging)?;

    let generation = validate(&config.generation)?;
    info!(?generation, "Starting table QR generation");

    let generator = BatchGenerator::new(generation);
    let cancel = generator.cancel_handle();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let worker = tokio::task::spawn_blocking(move || {
        let result = generator.generate(&ChannelSink::new(tx));
        (generator, result)
    });

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancelling = false;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => print_event(&event, cli.json)?,
                None => break,
            },
            _ = &mut ctrl_c, if !cancelling => {
                cancelling = true;
                cancel.cancel();
                if !cli.json {
                    println!("Cancelling after the current table...");
                }
            }
        }
    }

    let (generator, result) = worker
        .await
        .map_err(|e| Error::Other(format!("Generator task failed: {e}")))?;
    let report = result?;

    let verifications = if cli.verify {
        let report = report.clone();
        let checks = tokio::task::spawn_blocking(move || generator.verify(&report))
            .await
            .map_err(|e| Error::Other(format!("Verification task failed: {e}")))?;
        Some(checks)
    } else {
        None
    };

    let rendered = render_report(&report, verifications.as_deref());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }

    Ok(())
}

fn print_event(event: &ProgressEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        ProgressEvent::Status { message } => println!("{message}"),
        ProgressEvent::FontFallback => {
            println!("Using default font (selected font not available)")
        }
        ProgressEvent::FatalError { cause } => println!("Error: {cause}"),
        // Summary lines are printed from the final report.
        ProgressEvent::Progress { .. }
        | ProgressEvent::Complete { .. }
        | ProgressEvent::Cancelled { .. } => {}
    }
    Ok(())
}
