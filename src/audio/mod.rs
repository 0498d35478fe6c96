//! Audio system for playing sounds and music
//!
//! Built on top of the rodio audio library.
//! Supports WAV, MP3, OGG, and FLAC formats.

mod manager;
mod sound;

pub use manager::AudioManager;
pub use sound::{AudioError, Sound};

/// Minimal PCM WAV used by audio tests: 16-bit mono at 8 kHz.
#[cfg(test)]
pub(crate) fn test_wav(samples: u32) -> Vec<u8> {
    use std::f32::consts::TAU;

    let sample_rate: u32 = 8000;
    let data_len = samples * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let t = i as f32 / sample_rate as f32;
        let value = (t * 440.0 * TAU).sin();
        bytes.extend_from_slice(&((value * 8000.0) as i16).to_le_bytes());
    }
    bytes
}
