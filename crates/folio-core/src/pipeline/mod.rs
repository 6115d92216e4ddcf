//! Image ingestion pipeline components.
//!
//! This module contains all the stages of the ingestion pipeline:
//! - **detect**: Classify the container from its leading bytes
//! - **metadata**: Extract capture metadata (EXIF, ICC description)
//! - **normalize**: Decode and apply orientation
//! - **rendition**: Resize and re-encode the thumb/medium/full renditions
//! - **processor**: Orchestrates the full pipeline
//! - **progress**: Progress observers
//! - **codec**: HEIC decoder and rendition encoder handles
//! - **validate**: Upload policy checks

pub mod codec;
pub mod detect;
mod icc;
pub mod metadata;
pub mod normalize;
pub mod processor;
pub mod progress;
pub mod rendition;
pub mod validate;

// Re-exports for convenient access
pub use codec::{
    CodecError, Codecs, DecodedPixels, HeicDecoder, RenditionEncoder, UnavailableHeicDecoder,
    WebpEncoder,
};
#[cfg(feature = "heif")]
pub use codec::LibheifDecoder;
pub use detect::detect_format;
pub use metadata::MetadataExtractor;
pub use normalize::{NormalizedSource, Normalizer};
pub use processor::ImagePipeline;
pub use progress::{progress_channel, ChannelObserver, NoopObserver, ProgressObserver};
pub use rendition::{fit_width, RenditionDeriver};
pub use validate::UploadValidator;
