use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// PCM format of the samples carried by a stream: sample rate, bit width, channel count.
///
/// Formats are ordered by bitrate. Two different formats with the same bitrate
/// (e.g. 16 kHz stereo vs. 32 kHz mono at equal width) are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioFormat {
    sample_rate: u32,
    bit_width: u32,
    channels: u32,
}

impl AudioFormat {
    /// The all-zero sentinel format.
    pub const NULL: AudioFormat = AudioFormat::new(0, 0, 0);

    pub const fn new(sample_rate: u32, bit_width: u32, channels: u32) -> Self {
        Self {
            sample_rate,
            bit_width,
            channels,
        }
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub const fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub const fn channels(&self) -> u32 {
        self.channels
    }

    /// Bits per second: `sample_rate * bit_width * channels`.
    pub const fn bitrate(&self) -> u64 {
        self.sample_rate as u64 * self.bit_width as u64 * self.channels as u64
    }

    pub const fn bytes_per_second(&self) -> u64 {
        self.bitrate() / 8
    }

    /// A format is valid when none of its fields is zero.
    pub const fn is_valid(&self) -> bool {
        self.sample_rate != 0 && self.bit_width != 0 && self.channels != 0
    }

    pub const fn is_null(&self) -> bool {
        self.sample_rate == 0 && self.bit_width == 0 && self.channels == 0
    }

    /// Playback time represented by `bytes` of audio in this format.
    ///
    /// Returns zero for formats with a zero bitrate.
    pub fn bytes_to_duration(&self, bytes: usize) -> Duration {
        let bytes_per_second = self.bytes_per_second() as u128;
        if bytes_per_second == 0 {
            return Duration::ZERO;
        }
        let nanos = bytes as u128 * NANOS_PER_SEC / bytes_per_second;
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }

    /// Number of bytes needed to hold `duration` of audio in this format (rounded down).
    pub fn duration_to_bytes(&self, duration: Duration) -> usize {
        let bytes = duration.as_nanos() * self.bytes_per_second() as u128 / NANOS_PER_SEC;
        bytes.min(usize::MAX as u128) as usize
    }
}

impl PartialOrd for AudioFormat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.bitrate().cmp(&other.bitrate()) {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz/{}bit/{}ch",
            self.sample_rate, self.bit_width, self.channels
        )
    }
}
