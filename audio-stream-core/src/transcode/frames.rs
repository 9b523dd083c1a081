//! Byte-level frame moves shared by the rate and channel transforms.
//!
//! A frame is the group of samples played at one instant. Transforms here
//! never look at sample values, so frames are moved as opaque byte groups.

/// Repeat every `frame_bytes`-sized frame of `buffer[..input_size]` `factor`
/// times, in place. Returns the output size.
///
/// Walks from the last frame backward so no unread frame is overwritten.
/// Trailing bytes that do not form a whole frame are dropped.
pub(crate) fn repeat_frames(
    buffer: &mut [u8],
    input_size: usize,
    frame_bytes: usize,
    factor: usize,
) -> usize {
    if frame_bytes == 0 {
        return 0;
    }
    let frames = input_size / frame_bytes;
    let output_size = frames * frame_bytes * factor;
    assert!(buffer.len() >= output_size, "buffer too small for repeated frames");

    for frame in (0..frames).rev() {
        let source = frame * frame_bytes;
        for copy in (0..factor).rev() {
            let target = (frame * factor + copy) * frame_bytes;
            if target != source {
                buffer.copy_within(source..source + frame_bytes, target);
            }
        }
    }
    output_size
}

/// Keep the first frame of every `factor` frames of `buffer[..input_size]`,
/// compacting them to the front. Returns the output size.
pub(crate) fn keep_every_nth_frame(
    buffer: &mut [u8],
    input_size: usize,
    frame_bytes: usize,
    factor: usize,
) -> usize {
    if frame_bytes == 0 || factor == 0 {
        return 0;
    }
    let frames = input_size / frame_bytes / factor;
    for frame in 1..frames {
        let source = frame * factor * frame_bytes;
        buffer.copy_within(source..source + frame_bytes, frame * frame_bytes);
    }
    frames * frame_bytes
}
