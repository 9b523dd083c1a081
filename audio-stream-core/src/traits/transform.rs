use crate::models::audio_format::AudioFormat;

/// Stateless conversion of audio blocks from one format to another.
///
/// A transform holds no mutable state, so one instance can be shared by any
/// number of streams. Sizes are in bytes.
pub trait Transform: Send + Sync {
    /// Convert the first `input_size` bytes of `buffer` in place and return the
    /// size of the result.
    ///
    /// `buffer` must hold at least `max(input_size, self.transform_size(input_size))`
    /// bytes. Expanding transforms iterate from the end so unread input is never
    /// overwritten.
    fn transform_in_place(&self, buffer: &mut [u8], input_size: usize) -> usize;

    /// Convert `input`, using `workspace` when the result does not fit in `input`.
    ///
    /// The returned slice borrows from whichever buffer holds the result.
    ///
    /// # Panics
    ///
    /// Panics if the result does not fit in `input` and `workspace` is smaller
    /// than `self.transform_size(input.len())`.
    fn transform<'a>(&self, input: &'a mut [u8], workspace: &'a mut [u8]) -> &'a mut [u8] {
        let input_size = input.len();
        let required = self.transform_size(input_size);
        if required <= input_size {
            let output_size = self.transform_in_place(input, input_size);
            &mut input[..output_size]
        } else {
            let buffer = &mut workspace[..required];
            buffer[..input_size].copy_from_slice(input);
            let output_size = self.transform_in_place(buffer, input_size);
            &mut buffer[..output_size]
        }
    }

    fn validate_input_format(&self, input_format: &AudioFormat) -> bool;

    /// Format produced from `input_format`.
    fn transform_format(&self, input_format: &AudioFormat) -> AudioFormat;

    /// Format that transforms into `output_format`.
    fn transform_format_inverted(&self, output_format: &AudioFormat) -> AudioFormat;

    /// Output block size for an input block of `input_block_size` bytes.
    fn transform_block_size(&self, input_block_size: usize) -> usize;

    /// Input block size that produces an output block of `output_block_size` bytes.
    fn transform_block_size_inverted(&self, output_block_size: usize) -> usize;

    /// Working space needed to transform `input_size` bytes.
    fn transform_size(&self, input_size: usize) -> usize {
        self.transform_block_size(input_size)
    }
}
