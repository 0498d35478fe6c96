//! Audio manager for loading and playing sounds
//!
//! Sounds are loaded once by name and played fire-and-forget: every play
//! decodes a fresh stream into its own sink, so the same sound can
//! overlap itself. With no output device available the manager still
//! loads and validates sounds but plays become logged no-ops, which
//! keeps games and tests runnable on headless machines.

use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use rustc_hash::FxHashMap;

use super::sound::{AudioError, Sound};

/// Open output device. Dropping the stream stops all playback, so it is
/// held for the manager's lifetime.
struct AudioOutput {
    _stream: OutputStream,
    mixer: Mixer,
}

/// A sink currently playing, with the volume it was started at so
/// master-volume and mute changes can be reapplied.
struct ActiveSound {
    sink: Sink,
    volume: f32,
}

pub struct AudioManager {
    output: Option<AudioOutput>,
    sounds: FxHashMap<String, Sound>,
    active: Vec<ActiveSound>,
    master_volume: f32,
    muted: bool,
}

impl AudioManager {
    /// Open the default output device.
    ///
    /// Never fails: without a device the manager runs silently.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: open_output(),
            sounds: FxHashMap::default(),
            active: Vec::new(),
            master_volume: 1.0,
            muted: false,
        }
    }

    /// Whether an output device is open.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.output.is_some()
    }

    /// Load an audio file under a name. Validates the data by decoding,
    /// which works with or without a device.
    pub fn load(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<(), AudioError> {
        let name = name.into();
        let sound = Sound::from_file(path)?;
        self.sounds.insert(name, sound);
        Ok(())
    }

    /// Load in-memory audio bytes under a name.
    pub fn load_bytes(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<(), AudioError> {
        let sound = Sound::from_bytes(bytes)?;
        self.sounds.insert(name.into(), sound);
        Ok(())
    }

    /// Play a sound at its base volume.
    ///
    /// Returns whether playback actually started; false for unknown
    /// names or a missing device.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(volume) = self.sounds.get(name).map(Sound::base_volume) else {
            warn!("audio: unknown sound {name}");
            return false;
        };
        self.start(name, volume, false)
    }

    /// Play a sound at an explicit volume.
    pub fn play_with_volume(&mut self, name: &str, volume: f32) -> bool {
        if !self.sounds.contains_key(name) {
            warn!("audio: unknown sound {name}");
            return false;
        }
        self.start(name, volume, false)
    }

    /// Play a sound on an endless loop, for music and ambience. Runs
    /// until [`stop_all`](Self::stop_all).
    pub fn play_looping(&mut self, name: &str) -> bool {
        let Some(volume) = self.sounds.get(name).map(Sound::base_volume) else {
            warn!("audio: unknown sound {name}");
            return false;
        };
        self.start(name, volume, true)
    }

    /// Stop every playing sink.
    pub fn stop_all(&mut self) {
        for active in &self.active {
            active.sink.stop();
        }
        self.active.clear();
    }

    /// Set the base volume a named sound starts at.
    pub fn set_volume(&mut self, name: &str, volume: f32) -> bool {
        if let Some(sound) = self.sounds.get_mut(name) {
            sound.set_base_volume(volume);
            true
        } else {
            false
        }
    }

    /// Scale every current and future play.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.max(0.0);
        self.apply_volumes();
    }

    #[must_use]
    pub const fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn mute(&mut self) {
        self.muted = true;
        self.apply_volumes();
    }

    pub fn unmute(&mut self) {
        self.muted = false;
        self.apply_volumes();
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }

    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    #[must_use]
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Sinks still playing. Finished ones are dropped first.
    pub fn active_count(&mut self) -> usize {
        self.prune_finished();
        self.active.len()
    }

    /// Drop sinks that have finished playing.
    pub fn prune_finished(&mut self) {
        self.active.retain(|active| !active.sink.empty());
    }

    fn start(&mut self, name: &str, volume: f32, looping: bool) -> bool {
        let Some(sound) = self.sounds.get(name) else {
            return false;
        };
        let Some(output) = &self.output else {
            debug!("audio: no device, dropping play of {name}");
            return false;
        };

        let decoder = match sound.decode() {
            Ok(decoder) => decoder,
            Err(err) => {
                warn!("audio: decode failed for {name}: {err}");
                return false;
            }
        };

        let volume = volume.max(0.0);
        let sink = Sink::connect_new(&output.mixer);
        sink.set_volume(self.effective_volume(volume));
        if looping {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }

        self.prune_finished();
        self.active.push(ActiveSound { sink, volume });
        true
    }

    fn effective_volume(&self, volume: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            volume * self.master_volume
        }
    }

    fn apply_volumes(&mut self) {
        let muted = self.muted;
        let master = self.master_volume;
        for active in &self.active {
            let effective = if muted { 0.0 } else { active.volume * master };
            active.sink.set_volume(effective);
        }
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("available", &self.output.is_some())
            .field("sound_count", &self.sounds.len())
            .field("active", &self.active.len())
            .field("master_volume", &self.master_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

fn open_output() -> Option<AudioOutput> {
    let builder = match OutputStreamBuilder::from_default_device() {
        Ok(builder) => builder,
        Err(err) => {
            warn!("audio: no output device, sound disabled ({err})");
            return None;
        }
    };
    match builder.open_stream() {
        Ok(stream) => {
            let mixer = stream.mixer().clone();
            Some(AudioOutput {
                _stream: stream,
                mixer,
            })
        }
        Err(err) => {
            warn!("audio: failed to open output stream, sound disabled ({err})");
            None
        }
    }
}
