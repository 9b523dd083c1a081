use std::sync::Arc;

use crate::models::audio_format::AudioFormat;
use crate::models::error::NegotiationError;
use crate::traits::transform::Transform;
use crate::transcode::composite::TransformComposite;
use crate::transcode::decimator::Decimator;
use crate::transcode::interpolator::Interpolator;
use crate::transcode::mono_to_stereo::MonoToStereo;
use crate::transcode::null_transform::NullTransform;

/// Builds the transform that turns `source` audio into `sink` audio.
///
/// Supported conversions, all at 16 bits:
/// - sample rate ×2 or ÷2 on mono audio;
/// - mono to stereo;
/// - both, rate stage first.
///
/// Anything else is refused with [`NegotiationError::UnsupportedTranscoding`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformFactory;

impl TransformFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn make_transform(
        &self,
        source: &AudioFormat,
        sink: &AudioFormat,
    ) -> Result<Arc<dyn Transform>, NegotiationError> {
        for format in [source, sink] {
            if !format.is_valid() {
                return Err(NegotiationError::InvalidFormat(*format));
            }
        }

        if source == sink {
            return Ok(Arc::new(NullTransform));
        }

        if source.bit_width() != sink.bit_width() {
            return Err(unsupported(source, sink, "bit width conversion is not supported"));
        }

        let mut stages: Vec<Arc<dyn Transform>> = Vec::with_capacity(2);
        let mut current = *source;

        if current.sample_rate() != sink.sample_rate() {
            let stage = Self::rate_stage(&current, sink)?;
            current = stage.transform_format(&current);
            stages.push(stage);
        }

        if current.channels() != sink.channels() {
            let stage = Self::channel_stage(&current, sink)?;
            current = stage.transform_format(&current);
            stages.push(stage);
        }

        debug_assert_eq!(current, *sink);
        log::debug!(
            "Transcoding {} -> {} in {} stage(s)",
            source,
            sink,
            stages.len()
        );

        if stages.len() == 1 {
            Ok(stages.swap_remove(0))
        } else {
            Ok(Arc::new(TransformComposite::new(stages)))
        }
    }

    fn rate_stage(
        source: &AudioFormat,
        sink: &AudioFormat,
    ) -> Result<Arc<dyn Transform>, NegotiationError> {
        if source.bit_width() != 16 || source.channels() != 1 {
            return Err(unsupported(
                source,
                sink,
                "sample rate conversion requires 16-bit mono audio",
            ));
        }

        let (from, to) = (source.sample_rate(), sink.sample_rate());
        if from.checked_mul(2) == Some(to) {
            Ok(Arc::new(Interpolator::<u16, 1, 2>::new()))
        } else if to.checked_mul(2) == Some(from) {
            Ok(Arc::new(Decimator::<u16, 1, 2>::new()))
        } else {
            Err(unsupported(source, sink, "sample rate ratio must be exactly 2"))
        }
    }

    fn channel_stage(
        source: &AudioFormat,
        sink: &AudioFormat,
    ) -> Result<Arc<dyn Transform>, NegotiationError> {
        if source.bit_width() == 16 && source.channels() == 1 && sink.channels() == 2 {
            Ok(Arc::new(MonoToStereo))
        } else {
            Err(unsupported(
                source,
                sink,
                "only 16-bit mono to stereo channel conversion is supported",
            ))
        }
    }
}

fn unsupported(source: &AudioFormat, sink: &AudioFormat, reason: &'static str) -> NegotiationError {
    NegotiationError::UnsupportedTranscoding {
        source_format: *source,
        sink_format: *sink,
        reason,
    }
}
