use crate::models::audio_format::AudioFormat;
use crate::traits::transform::Transform;
use crate::transcode::frames;

const SAMPLE_BYTES: usize = 2;

/// Duplicates each 16-bit mono sample into an interleaved left/right pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoToStereo;

impl Transform for MonoToStereo {
    fn transform_in_place(&self, buffer: &mut [u8], input_size: usize) -> usize {
        frames::repeat_frames(buffer, input_size, SAMPLE_BYTES, 2)
    }

    fn validate_input_format(&self, input_format: &AudioFormat) -> bool {
        input_format.sample_rate() > 0
            && input_format.bit_width() == 16
            && input_format.channels() == 1
    }

    fn transform_format(&self, input_format: &AudioFormat) -> AudioFormat {
        AudioFormat::new(input_format.sample_rate(), input_format.bit_width(), 2)
    }

    fn transform_format_inverted(&self, output_format: &AudioFormat) -> AudioFormat {
        AudioFormat::new(output_format.sample_rate(), output_format.bit_width(), 1)
    }

    fn transform_block_size(&self, input_block_size: usize) -> usize {
        input_block_size.saturating_mul(2)
    }

    fn transform_block_size_inverted(&self, output_block_size: usize) -> usize {
        output_block_size / 2
    }
}
