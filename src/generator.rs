//! Batch generation of numbered table codes.
//!
//! [`validate`] turns a [`GenerationOptions`] draft into a [`GenerationConfig`];
//! [`BatchGenerator::generate`] then writes `1.png ..= N.png`, one table at a
//! time, reporting to a [`ProgressSink`] and polling a cancellation flag
//! between tables.

use crate::config::{GenerationOptions, MAX_FONT_SIZE};
use crate::error::{Error, Result};
use crate::overlay::{self, LabelFont};
use crate::progress::ProgressSink;
use crate::qr::{QrDecoder, QrEncoder, QrStyle};
use image::ImageFormat;
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, info, warn};

/// Validated, immutable inputs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Trimmed URL prefix
    pub base_url: String,
    /// Number of tables, at least 1
    pub table_count: u32,
    /// Existing output directory
    pub output_dir: PathBuf,
    /// Font file that existed at validation time
    pub font_path: PathBuf,
    /// Label size in pixels per em
    pub font_size: u32,
    /// Rendering parameters
    pub style: QrStyle,
}

impl GenerationConfig {
    /// URL encoded for `table`: plain concatenation, no separator added
    pub fn url_for(&self, table: u32) -> String {
        format!("{}{}", self.base_url, table)
    }

    /// Output path for `table`
    pub fn file_path(&self, table: u32) -> PathBuf {
        self.output_dir.join(format!("{table}.png"))
    }
}

/// Check a draft and create its output directory.
///
/// Checks run in order (URL, count, font size, font file); the directory is
/// only created once all of them pass.
pub fn validate(draft: &GenerationOptions) -> Result<GenerationConfig> {
    let base_url = draft.base_url.trim();
    if base_url.is_empty() {
        return Err(Error::InvalidInput("base URL must not be empty".to_string()));
    }

    if draft.table_count < 1 {
        return Err(Error::InvalidInput(format!(
            "table count must be at least 1 (got {})",
            draft.table_count
        )));
    }
    let table_count = u32::try_from(draft.table_count).map_err(|_| {
        Error::InvalidInput(format!("table count {} is too large", draft.table_count))
    })?;

    if draft.font_size == 0 || draft.font_size > MAX_FONT_SIZE {
        return Err(Error::InvalidInput(format!(
            "font size must be between 1 and {MAX_FONT_SIZE} (got {})",
            draft.font_size
        )));
    }

    if !draft.font_path.is_file() {
        return Err(Error::FontNotFound(draft.font_path.clone()));
    }

    fs::create_dir_all(&draft.output_dir)?;

    Ok(GenerationConfig {
        base_url: base_url.to_string(),
        table_count,
        output_dir: draft.output_dir.clone(),
        font_path: draft.font_path.clone(),
        font_size: draft.font_size,
        style: QrStyle::default(),
    })
}

/// Live state of a generator, readable from any thread
#[derive(Debug, Default)]
pub struct GenerationState {
    running: AtomicBool,
    current_index: AtomicU32,
    cancel_requested: AtomicBool,
}

/// Point-in-time copy of [`GenerationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// A run is in progress
    pub is_running: bool,
    /// Table currently being (or last) rendered, 0 before the first
    pub current_index: u32,
    /// Cancellation has been requested and not yet consumed
    pub cancel_requested: bool,
}

impl GenerationState {
    /// Read all fields
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            is_running: self.running.load(Ordering::SeqCst),
            current_index: self.current_index.load(Ordering::SeqCst),
            cancel_requested: self.cancel_requested.load(Ordering::SeqCst),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }
}

/// Handle for cancelling a running generation from another thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<GenerationState>,
}

impl CancelHandle {
    /// Request a stop. The table being rendered is finished first.
    pub fn cancel(&self) {
        self.state.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// All tables written
    Completed,
    /// Stopped early on request
    Cancelled,
}

/// Which font drew the labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum FontSource {
    /// The configured font file
    Configured(PathBuf),
    /// Built-in bitmap digits
    FallbackBitmap,
}

/// Outcome of a run that did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Completed or cancelled
    pub status: GenerationStatus,
    /// Files written
    pub completed: u32,
    /// Files requested
    pub requested: u32,
    /// Where the files went
    pub output_dir: PathBuf,
    /// Font used for labels
    pub font: FontSource,
    /// Written files in table order
    pub files: Vec<PathBuf>,
}

/// Result of reading one written file back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Table number
    pub table: u32,
    /// File that was decoded
    pub path: PathBuf,
    /// URL the file should encode
    pub expected: String,
    /// Decoded text, if any
    pub decoded: Option<String>,
    /// Decoder error, if decoding failed
    pub error: Option<String>,
}

impl Verification {
    /// Decoded text equals the expected URL
    pub fn is_match(&self) -> bool {
        self.decoded.as_deref() == Some(self.expected.as_str())
    }
}

/// Sequential table code generator
#[derive(Debug)]
pub struct BatchGenerator {
    config: GenerationConfig,
    encoder: QrEncoder,
    state: Arc<GenerationState>,
}

impl BatchGenerator {
    /// Create a generator for a validated config
    pub fn new(config: GenerationConfig) -> Self {
        let encoder = QrEncoder::new(config.style);
        Self {
            config,
            encoder,
            state: Arc::new(GenerationState::default()),
        }
    }

    /// Get a cancellation handle.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Shared state, for hosts that poll progress
    pub fn state(&self) -> Arc<GenerationState> {
        Arc::clone(&self.state)
    }

    /// Write every table code, blocking the calling thread.
    ///
    /// Run this off any UI thread (`std::thread::spawn`,
    /// `tokio::task::spawn_blocking`). A cancel request made before the call
    /// is honoured; the flag is cleared when the run ends.
    pub fn generate(&self, sink: &dyn ProgressSink) -> Result<GenerationReport> {
        if self
            .state
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Other("generation already in progress".to_string()));
        }
        self.state.current_index.store(0, Ordering::SeqCst);

        let result = self.run(sink);

        self.state.running.store(false, Ordering::SeqCst);
        self.state.cancel_requested.store(false, Ordering::SeqCst);

        if let Err(err) = &result {
            warn!(error = %err, "generation aborted");
            sink.on_fatal_error(err);
        }
        result
    }

    /// Decode every file listed in `report` and compare it with its URL.
    ///
    /// Failures are returned, not raised: small symbols can lose too many
    /// modules under the center square to be read back.
    pub fn verify(&self, report: &GenerationReport) -> Vec<Verification> {
        let decoder = QrDecoder::new();
        report
            .files
            .iter()
            .zip(1u32..)
            .map(|(path, table)| {
                let expected = self.config.url_for(table);
                let (decoded, error) = match decoder.decode_file(path) {
                    Ok(text) => (Some(text), None),
                    Err(err) => (None, Some(err.to_string())),
                };
                let verification = Verification {
                    table,
                    path: path.clone(),
                    expected,
                    decoded,
                    error,
                };
                if !verification.is_match() {
                    warn!(table, path = %path.display(), "table code did not read back");
                }
                verification
            })
            .collect()
    }

    fn run(&self, sink: &dyn ProgressSink) -> Result<GenerationReport> {
        let config = &self.config;
        let total = config.table_count;

        let (font, font_source) = match LabelFont::load(&config.font_path, config.font_size) {
            Ok(font) => (font, FontSource::Configured(config.font_path.clone())),
            Err(err) => {
                warn!(error = %err, "falling back to built-in font");
                sink.on_font_fallback();
                (LabelFont::fallback(config.font_size), FontSource::FallbackBitmap)
            }
        };

        info!(
            total,
            output_dir = %config.output_dir.display(),
            "generating table codes"
        );

        let mut files = Vec::with_capacity(total as usize);
        for table in 1..=total {
            if self.state.is_cancelled() {
                break;
            }
            self.state.current_index.store(table, Ordering::SeqCst);

            sink.on_status(&format!("Generating QR code for table {table}/{total}"));
            let path = self.render_table(table, &font)?;
            files.push(path);
            sink.on_progress(table, total);
        }

        let completed = files.len() as u32;
        let status = if completed == total {
            sink.on_complete(completed, &config.output_dir);
            GenerationStatus::Completed
        } else {
            sink.on_cancelled(completed);
            GenerationStatus::Cancelled
        };

        Ok(GenerationReport {
            status,
            completed,
            requested: total,
            output_dir: config.output_dir.clone(),
            font: font_source,
            files,
        })
    }

    fn render_table(&self, table: u32, font: &LabelFont) -> Result<PathBuf> {
        let url = self.config.url_for(table);
        let mut img = self.encoder.encode(&url)?;
        overlay::stamp_label(&mut img, &table.to_string(), font, &self.config.style);

        let path = self.config.file_path(table);
        write_png(&img, &path)?;
        debug!(table, url = %url, path = %path.display(), "wrote table code");
        Ok(path)
    }
}

/// Encode in memory first so a failed encode never leaves a partial file.
fn write_png(img: &image::RgbImage, path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    fs::write(path, buf)?;
    Ok(())
}
