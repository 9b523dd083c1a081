use std::fmt;
use std::sync::Arc;

use crate::models::audio_format::AudioFormat;
use crate::traits::transform::Transform;

/// Chain of transforms applied left to right.
///
/// Formats and block sizes are re-derived after each stage, so every stage
/// sees what the previous one produced.
#[derive(Clone)]
pub struct TransformComposite {
    children: Vec<Arc<dyn Transform>>,
}

impl TransformComposite {
    pub fn new(children: Vec<Arc<dyn Transform>>) -> Self {
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Debug for TransformComposite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformComposite")
            .field("stages", &self.children.len())
            .finish()
    }
}

impl Transform for TransformComposite {
    fn transform_in_place(&self, buffer: &mut [u8], input_size: usize) -> usize {
        self.children
            .iter()
            .fold(input_size, |size, child| child.transform_in_place(buffer, size))
    }

    fn validate_input_format(&self, input_format: &AudioFormat) -> bool {
        let mut format = *input_format;
        for child in &self.children {
            if !child.validate_input_format(&format) {
                return false;
            }
            format = child.transform_format(&format);
        }
        true
    }

    fn transform_format(&self, input_format: &AudioFormat) -> AudioFormat {
        self.children
            .iter()
            .fold(*input_format, |format, child| child.transform_format(&format))
    }

    fn transform_format_inverted(&self, output_format: &AudioFormat) -> AudioFormat {
        self.children
            .iter()
            .rev()
            .fold(*output_format, |format, child| {
                child.transform_format_inverted(&format)
            })
    }

    fn transform_block_size(&self, input_block_size: usize) -> usize {
        self.children
            .iter()
            .fold(input_block_size, |size, child| child.transform_block_size(size))
    }

    fn transform_block_size_inverted(&self, output_block_size: usize) -> usize {
        self.children
            .iter()
            .rev()
            .fold(output_block_size, |size, child| {
                child.transform_block_size_inverted(size)
            })
    }

    /// The largest buffer any stage needs, including the input itself.
    fn transform_size(&self, input_size: usize) -> usize {
        let mut size = input_size;
        let mut largest = input_size;
        for child in &self.children {
            largest = largest.max(child.transform_size(size));
            size = child.transform_block_size(size);
        }
        largest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bytes_to_samples, samples_to_bytes, InverseTransform};
    use crate::transcode::decimator::Decimator;
    use crate::transcode::interpolator::Interpolator;
    use crate::transcode::mono_to_stereo::MonoToStereo;

    fn inverse_then_stereo() -> TransformComposite {
        TransformComposite::new(vec![Arc::new(InverseTransform), Arc::new(MonoToStereo)])
    }

    #[test]
    fn applies_stages_in_order() {
        let composite = inverse_then_stereo();
        let mut input = samples_to_bytes(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let mut workspace = vec![0u8; composite.transform_size(input.len())];
        assert_eq!(workspace.len(), 32);

        let output = composite.transform(&mut input, &mut workspace);

        assert_eq!(
            bytes_to_samples(output),
            vec![
                0xFFFF, 0xFFFF, 0xFFFE, 0xFFFE, 0xFFFD, 0xFFFD, 0xFFFC, 0xFFFC, 0xFFFB, 0xFFFB,
                0xFFFA, 0xFFFA, 0xFFF9, 0xFFF9, 0xFFF8, 0xFFF8,
            ]
        );
    }

    #[test]
    fn validation_follows_the_chain() {
        let composite = inverse_then_stereo();
        assert!(composite.validate_input_format(&AudioFormat::new(44100, 16, 1)));
        assert!(!composite.validate_input_format(&AudioFormat::new(44100, 16, 0)));
        assert!(!composite.validate_input_format(&AudioFormat::new(44100, 16, 2)));

        assert_eq!(
            composite.transform_format(&AudioFormat::new(44100, 16, 1)),
            AudioFormat::new(44100, 16, 2)
        );
        assert_eq!(composite.transform_block_size(16), 32);
    }

    #[test]
    fn inversion_runs_right_to_left() {
        let composite = TransformComposite::new(vec![
            Arc::new(Interpolator::<u16, 1, 2>::new()),
            Arc::new(MonoToStereo),
        ]);
        let sink = AudioFormat::new(16000, 16, 2);

        assert_eq!(
            composite.transform_format_inverted(&sink),
            AudioFormat::new(8000, 16, 1)
        );
        assert_eq!(composite.transform_block_size_inverted(256), 64);
        assert_eq!(composite.transform_block_size(64), 256);
    }

    #[test]
    fn interpolate_then_decimate_round_trips() {
        let composite = TransformComposite::new(vec![
            Arc::new(Interpolator::<u16, 1, 2>::new()),
            Arc::new(Decimator::<u16, 1, 2>::new()),
        ]);
        let format = AudioFormat::new(8000, 16, 1);
        assert_eq!(composite.transform_format(&format), format);
        for block_size in [2, 64, 256] {
            assert_eq!(composite.transform_block_size(block_size), block_size);
        }

        let samples: [u16; 6] = [1, 20, 300, 4000, 5, 60];
        let mut input = samples_to_bytes(&samples);
        let mut workspace = vec![0u8; composite.transform_size(input.len())];
        assert_eq!(workspace.len(), 24);

        let output = composite.transform(&mut input, &mut workspace);

        assert_eq!(bytes_to_samples(output), samples);
    }

    #[test]
    fn transform_size_tracks_largest_stage() {
        let shrinking = TransformComposite::new(vec![
            Arc::new(Decimator::<u16, 1, 2>::new()),
            Arc::new(MonoToStereo),
        ]);
        // 64 -> 32 -> 64: never larger than the input
        assert_eq!(shrinking.transform_size(64), 64);

        let growing = TransformComposite::new(vec![
            Arc::new(Interpolator::<u16, 1, 2>::new()),
            Arc::new(MonoToStereo),
        ]);
        assert_eq!(growing.transform_size(64), 256);
    }

    #[test]
    fn empty_composite_is_identity() {
        let composite = TransformComposite::new(Vec::new());
        let format = AudioFormat::new(8000, 16, 1);
        assert!(composite.is_empty());
        assert_eq!(composite.transform_format(&format), format);
        assert_eq!(composite.transform_size(10), 10);
    }
}
