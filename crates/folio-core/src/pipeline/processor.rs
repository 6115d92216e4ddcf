//! Pipeline orchestration - wires together all processing stages.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CaptureMetadata, ProcessedImageSet, ProcessingStep, RawImageInput, SizeKey};

use super::codec::Codecs;
use super::detect::detect_format;
use super::metadata::MetadataExtractor;
use super::normalize::Normalizer;
use super::progress::{NoopObserver, ProgressObserver};
use super::rendition::RenditionDeriver;

/// The ingestion pipeline: raw upload bytes in, three renditions out.
///
/// Holds only configuration and codec handles, so a single instance can be
/// shared across concurrent uploads.
#[derive(Clone)]
pub struct ImagePipeline {
    normalizer: Normalizer,
    deriver: RenditionDeriver,
}

impl ImagePipeline {
    /// Create a pipeline with the default codecs.
    pub fn new(config: &Config) -> Self {
        Self::with_codecs(config, Codecs::default())
    }

    /// Create a pipeline with explicit codec handles.
    pub fn with_codecs(config: &Config, codecs: Codecs) -> Self {
        Self {
            normalizer: Normalizer::new(codecs.heic, &config.limits),
            deriver: RenditionDeriver::new(config.renditions.clone(), codecs.encoder),
        }
    }

    /// MIME type of the renditions this pipeline produces.
    pub fn content_type(&self) -> &'static str {
        self.deriver.content_type()
    }

    /// Process an image without progress reporting.
    pub async fn process(&self, input: &RawImageInput) -> PipelineResult<ProcessedImageSet> {
        self.process_image(input, &NoopObserver).await
    }

    /// Process an image, reporting each step to `observer`.
    ///
    /// Metadata extraction runs alongside decoding, and the three renditions
    /// are derived concurrently. The first failure is returned and any branch
    /// still running is detached; its result is discarded. Steps after the
    /// failure point are never reported.
    pub async fn process_image(
        &self,
        input: &RawImageInput,
        observer: &dyn ProgressObserver,
    ) -> PipelineResult<ProcessedImageSet> {
        let start = Instant::now();
        let name = input.display_name().to_string();

        if input.is_empty() {
            return Err(PipelineError::EmptyInput { name });
        }

        let format = detect_format(input.bytes());
        tracing::debug!("Processing {} ({} bytes, {:?})", name, input.len(), format);

        let metadata_task = {
            let bytes = input.shared_bytes();
            tokio::task::spawn_blocking(move || MetadataExtractor::extract(&bytes))
        };

        // Decode
        observer.on_step(ProcessingStep::Decoding);
        let decode_start = Instant::now();
        let decoded = {
            let normalizer = self.normalizer.clone();
            let bytes = input.shared_bytes();
            let worker_name = name.clone();
            run_blocking(&name, "decoding", move || {
                normalizer.decode(&bytes, format, &worker_name)
            })
            .await??
        };
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Orientation
        observer.on_step(ProcessingStep::Normalizing);
        let normalize_start = Instant::now();
        let source = {
            let normalizer = self.normalizer.clone();
            let worker_name = name.clone();
            run_blocking(&name, "normalizing", move || {
                normalizer.orient(decoded, &worker_name)
            })
            .await?
        };
        tracing::trace!("  Normalize: {:?}", normalize_start.elapsed());

        let (original_width, original_height) = (source.width(), source.height());
        let source = Arc::new(source);

        // Renditions
        let resize_start = Instant::now();
        let name_ref: &str = &name;
        let derive = |size: SizeKey| {
            let deriver = self.deriver.clone();
            let source = Arc::clone(&source);
            let worker_name = name_ref.to_string();
            async move {
                let step = ProcessingStep::Resizing(size);
                observer.on_step(step);
                run_blocking(name_ref, step.as_str(), move || {
                    deriver.derive(&source, size, &worker_name)
                })
                .await
                .and_then(|rendition| rendition)
            }
        };
        let (thumb, medium, full) = tokio::try_join!(
            derive(SizeKey::Thumb),
            derive(SizeKey::Medium),
            derive(SizeKey::Full)
        )?;
        tracing::trace!("  Renditions: {:?}", resize_start.elapsed());

        let metadata = match metadata_task.await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Metadata extraction for {} did not finish: {}", name, e);
                CaptureMetadata::default()
            }
        };

        tracing::debug!(
            "Processed {} in {:?} ({}x{})",
            name,
            start.elapsed(),
            original_width,
            original_height
        );

        Ok(ProcessedImageSet {
            thumb,
            medium,
            full,
            original_width,
            original_height,
            metadata,
        })
    }
}

/// Run CPU-bound work on the blocking pool.
async fn run_blocking<T, F>(name: &str, stage: &str, work: F) -> PipelineResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Task {
            name: name.to_string(),
            stage: stage.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_before_any_step() {
        let pipeline = ImagePipeline::new(&Config::default());
        let seen = Mutex::new(Vec::new());
        let observer = |step: ProcessingStep| seen.lock().unwrap().push(step);

        let input = RawImageInput::new(Vec::<u8>::new()).with_name("empty.jpg");
        let err = pipeline.process_image(&input, &observer).await.unwrap_err();

        assert!(matches!(err, PipelineError::EmptyInput { name } if name == "empty.jpg"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_small_png_is_never_upscaled() {
        let pipeline = ImagePipeline::new(&Config::default());
        let input = RawImageInput::new(png(300, 200));

        let set = pipeline.process(&input).await.unwrap();
        assert_eq!((set.original_width, set.original_height), (300, 200));
        for rendition in set.renditions() {
            assert_eq!((rendition.width, rendition.height), (300, 200));
            assert_eq!(rendition.byte_length, rendition.bytes.len());
        }
        assert!(set.metadata.camera_make.is_none());
    }

    #[tokio::test]
    async fn test_decode_failure_stops_after_decoding_step() {
        let pipeline = ImagePipeline::new(&Config::default());
        let seen = Mutex::new(Vec::new());
        let observer = |step: ProcessingStep| seen.lock().unwrap().push(step);

        let input = RawImageInput::new(b"\xFF\xD8\xFF\xE0 definitely not a jpeg".to_vec());
        let err = pipeline.process_image(&input, &observer).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Decode { .. } | PipelineError::UnsupportedFormat { .. }
        ));
        assert_eq!(*seen.lock().unwrap(), vec![ProcessingStep::Decoding]);
    }

    #[test]
    fn test_content_type_is_webp() {
        let pipeline = ImagePipeline::new(&Config::default());
        assert_eq!(pipeline.content_type(), "image/webp");
    }
}
