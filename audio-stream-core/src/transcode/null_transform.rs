use crate::models::audio_format::AudioFormat;
use crate::traits::transform::Transform;

/// Identity transform, used when source and sink formats already match.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransform;

impl Transform for NullTransform {
    fn transform_in_place(&self, _buffer: &mut [u8], input_size: usize) -> usize {
        input_size
    }

    fn validate_input_format(&self, _input_format: &AudioFormat) -> bool {
        true
    }

    fn transform_format(&self, input_format: &AudioFormat) -> AudioFormat {
        *input_format
    }

    fn transform_format_inverted(&self, output_format: &AudioFormat) -> AudioFormat {
        *output_format
    }

    fn transform_block_size(&self, input_block_size: usize) -> usize {
        input_block_size
    }

    fn transform_block_size_inverted(&self, output_block_size: usize) -> usize {
        output_block_size
    }
}
