//! Folio Core - image ingestion for a photo gallery.
//!
//! Folio takes an uploaded image buffer and produces everything the gallery
//! stores for it: three WebP renditions and the capture metadata. It has no
//! storage or database dependencies; the caller uploads the renditions and
//! records them.
//!
//! # Architecture
//!
//! ```text
//!                  ┌─► Extract metadata ─────────────────────────┐
//! Bytes → Detect ──┤                                             ├─► ProcessedImageSet
//!                  └─► Decode → Orient ─┬─► thumb  (400px)  ─────┤
//!                                       ├─► medium (1200px) ─────┤
//!                                       └─► full   (2400px) ─────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use folio_core::{generate_rendition_path, Config, ImagePipeline, RawImageInput};
//!
//! #[tokio::main]
//! async fn main() -> folio_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = ImagePipeline::new(&config);
//!
//!     let bytes = std::fs::read("./IMG_0042.HEIC")?;
//!     let input = RawImageInput::new(bytes).with_name("IMG_0042.HEIC");
//!     let set = pipeline.process(&input).await?;
//!
//!     for rendition in set.renditions() {
//!         let key = generate_rendition_path("travel", "IMG_0042.HEIC", rendition.size);
//!         println!("{} {}x{}", key, rendition.width, rendition.height);
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, FolioError, PipelineError, PipelineResult, Result};
pub use pipeline::{
    detect_format, progress_channel, ChannelObserver, Codecs, ImagePipeline, MetadataExtractor,
    NoopObserver, ProgressObserver, UploadValidator,
};
pub use storage::{generate_rendition_path, GALLERY_PREFIX, RENDITION_CONTENT_TYPE};
pub use types::{
    CaptureMetadata, DetectedFormat, ProcessedImageSet, ProcessedSummary, ProcessingStep,
    RawImageInput, Rendition, RenditionSummary, SizeKey,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
