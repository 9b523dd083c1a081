use std::marker::PhantomData;
use std::mem::size_of;

use crate::models::audio_format::AudioFormat;
use crate::traits::transform::Transform;
use crate::transcode::frames;

/// Divides the sample rate by `R`, keeping frame 0 of every `R` frames.
///
/// `S` is the sample type and `C` the channel count; a frame of
/// `size_of::<S>() * 8 * C` bits must be 8, 16, 32 or 64 bits wide, which is
/// checked at compile time.
#[derive(Debug, Clone, Copy)]
pub struct Decimator<S, const C: usize, const R: usize> {
    _sample: PhantomData<fn() -> S>,
}

impl<S, const C: usize, const R: usize> Decimator<S, C, R> {
    const FRAME_BYTES: usize = size_of::<S>() * C;

    const FRAME_WIDTH_CHECK: () = {
        assert!(
            matches!(size_of::<S>() * 8 * C, 8 | 16 | 32 | 64),
            "frame width must be 8, 16, 32 or 64 bits"
        );
        assert!(R > 0, "decimation ratio must be positive");
    };

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FRAME_WIDTH_CHECK;
        Self {
            _sample: PhantomData,
        }
    }
}

impl<S, const C: usize, const R: usize> Default for Decimator<S, C, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, const C: usize, const R: usize> Transform for Decimator<S, C, R> {
    fn transform_in_place(&self, buffer: &mut [u8], input_size: usize) -> usize {
        frames::keep_every_nth_frame(buffer, input_size, Self::FRAME_BYTES, R)
    }

    fn validate_input_format(&self, input_format: &AudioFormat) -> bool {
        input_format.is_valid()
            && input_format.bit_width() as usize == size_of::<S>() * 8
            && input_format.channels() as usize == C
            && input_format.sample_rate() as usize % R == 0
    }

    fn transform_format(&self, input_format: &AudioFormat) -> AudioFormat {
        AudioFormat::new(
            input_format.sample_rate() / R as u32,
            input_format.bit_width(),
            input_format.channels(),
        )
    }

    fn transform_format_inverted(&self, output_format: &AudioFormat) -> AudioFormat {
        AudioFormat::new(
            output_format.sample_rate().saturating_mul(R as u32),
            output_format.bit_width(),
            output_format.channels(),
        )
    }

    fn transform_block_size(&self, input_block_size: usize) -> usize {
        input_block_size / R
    }

    fn transform_block_size_inverted(&self, output_block_size: usize) -> usize {
        output_block_size.saturating_mul(R)
    }
}
