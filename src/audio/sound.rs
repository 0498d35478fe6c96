//! Loaded sound data
//!
//! A [`Sound`] is the decoded-on-demand form of an audio file: the raw
//! bytes plus a base volume. Playback decodes a fresh stream from the
//! shared bytes each time, so one sound can play several times at once.
//! Loading validates the bytes by decoding once, which needs no output
//! device.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use rodio::Decoder;

/// Why a sound failed to load or decode.
#[derive(Debug)]
pub enum AudioError {
    /// The sound file could not be read
    Io(std::io::Error),
    /// The bytes are not a decodable audio stream
    Decode(String),
}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "sound file error: {e}"),
            Self::Decode(e) => write!(f, "sound decode error: {e}"),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(_) => None,
        }
    }
}

/// Raw audio bytes ready to be decoded into playback streams.
#[derive(Debug, Clone)]
pub struct Sound {
    bytes: Arc<[u8]>,
    base_volume: f32,
}

impl Sound {
    /// Load a sound file and confirm it decodes.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Wrap in-memory audio bytes and confirm they decode.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self, AudioError> {
        let bytes: Arc<[u8]> = bytes.into();
        Decoder::new(Cursor::new(Arc::clone(&bytes)))
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        Ok(Self {
            bytes,
            base_volume: 1.0,
        })
    }

    /// A fresh decoder over the shared bytes.
    ///
    /// Only fails if the bytes were corrupted after validation, which
    /// cannot happen through this type; callers may treat an error as a
    /// bug.
    pub(crate) fn decode(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>, AudioError> {
        Decoder::new(Cursor::new(Arc::clone(&self.bytes)))
            .map_err(|e| AudioError::Decode(e.to_string()))
    }

    #[must_use]
    pub fn base_volume(&self) -> f32 {
        self.base_volume
    }

    /// Default volume for plays that do not pass one explicitly.
    pub fn set_base_volume(&mut self, volume: f32) {
        self.base_volume = volume.max(0.0);
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}
