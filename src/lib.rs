//! tableqr - numbered table QR codes in bulk
//!
//! Generates `1.png ..= N.png`, each encoding `<base_url><n>` with the number
//! printed in a blank square at the center of the code.
//!
//! # Features
//!
//! - **Validation**: rejects empty URLs, non-positive counts and missing fonts
//!   before anything is written
//! - **Sequential generation**: ascending table order with cooperative
//!   cancellation between tables
//! - **Font fallback**: unreadable fonts degrade to built-in bitmap digits
//! - **Pluggable progress**: any host implements [`ProgressSink`]
//!
//! # Example
//!
//! ```no_run
//! use tableqr::{BatchGenerator, GenerationOptions, TracingSink, validate};
//!
//! fn main() -> tableqr::Result<()> {
//!     let options = GenerationOptions {
//!         base_url: "https://site.com/t=".to_string(),
//!         table_count: 3,
//!         ..GenerationOptions::default()
//!     };
//!     let generator = BatchGenerator::new(validate(&options)?);
//!
//!     let worker = std::thread::spawn(move || generator.generate(&TracingSink));
//!     let report = worker.join().expect("generator thread panicked")?;
//!
//!     println!("{} files in {}", report.completed, report.output_dir.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod output;
pub mod overlay;
pub mod progress;
pub mod qr;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{GenerationOptions, LogRotation, LoggingOptions, TableQrConfig};
pub use generator::{
    BatchGenerator, CancelHandle, FontSource, GenerationConfig, GenerationReport,
    GenerationState, GenerationStatus, StateSnapshot, Verification, validate,
};
pub use progress::{ChannelSink, ProgressEvent, ProgressSink, RecordingSink, TracingSink};
pub use qr::{QrDecoder, QrEncoder, QrPayload, QrStyle};
