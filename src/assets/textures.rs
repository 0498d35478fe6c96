//! Texture loading and storage
//!
//! Textures are identified by [`TextureId`] and deduplicated by path.
//! Loads can be synchronous or handed to the worker pool; an async load
//! gets its id immediately and holds placeholder pixels until the decode
//! finishes. Workers send decoded images back over a channel, and the
//! engine drains it once per frame with [`TextureStore::pump`], which
//! also fires a [`GameEvent::TextureLoaded`] and the optional completion
//! callback per finished load. Failed loads keep the placeholder, a
//! magenta checkerboard that is hard to miss in a running game.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::core::{EventQueue, GameEvent};
use crate::jobs::JobSystem;
use crate::render::{Texture, TextureError, TextureFormat, TextureId, TextureProperties};

/// Edge length of the generated placeholder texture.
const PLACEHOLDER_SIZE: u32 = 64;
/// Edge length of one checkerboard cell.
const PLACEHOLDER_CELL: u32 = 8;

/// Raw pixels produced by decoding an image file.
#[derive(Debug)]
struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Message a worker sends back when a texture decode finishes.
struct FinishedLoad {
    id: TextureId,
    path: String,
    result: Result<DecodedImage, TextureError>,
}

struct TextureEntry {
    texture: Texture,
    pixels: Vec<u8>,
    ready: bool,
}

/// Invoked on the pumping thread once an async load lands.
type LoadCallback = Box<dyn FnOnce(TextureId)>;

/// Owns every loaded texture and the channel async loads report through.
pub struct TextureStore {
    entries: FxHashMap<TextureId, TextureEntry>,
    by_path: FxHashMap<String, TextureId>,
    callbacks: FxHashMap<TextureId, LoadCallback>,
    next_id: u32,
    sender: Sender<FinishedLoad>,
    receiver: Receiver<FinishedLoad>,
}

impl TextureStore {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            entries: FxHashMap::default(),
            by_path: FxHashMap::default(),
            callbacks: FxHashMap::default(),
            next_id: 0,
            sender,
            receiver,
        }
    }

    /// Load and decode on the calling thread.
    ///
    /// `key` is the deduplication key (normally the resource-relative
    /// path); `full_path` is where the file actually lives. A failed
    /// load logs and leaves the placeholder in place, so the returned id
    /// is always drawable.
    pub fn load_sync(
        &mut self,
        key: &str,
        full_path: &Path,
        properties: TextureProperties,
    ) -> TextureId {
        if let Some(&id) = self.by_path.get(key) {
            return id;
        }
        let id = self.alloc(key, properties, true);
        match decode_file(full_path, properties) {
            Ok(image) => {
                info!(
                    "texture loaded: {key} ({}x{}, {} channels)",
                    image.width,
                    image.height,
                    properties.format.channels()
                );
                self.publish(id, image);
            }
            Err(err) => warn!("texture load failed for {key}: {err}"),
        }
        id
    }

    /// Queue a decode on the worker pool.
    ///
    /// The id is issued immediately with placeholder pixels behind it;
    /// the real image appears at a later [`pump`](Self::pump). If the
    /// job queue is full the entry stays on the placeholder and is
    /// marked ready so nothing waits on a job that never ran.
    pub fn request(
        &mut self,
        jobs: &JobSystem,
        key: &str,
        full_path: PathBuf,
        properties: TextureProperties,
    ) -> TextureId {
        if let Some(&id) = self.by_path.get(key) {
            return id;
        }
        let id = self.alloc(key, properties, false);

        let sender = self.sender.clone();
        let path = key.to_string();
        let submitted = jobs.execute(move || {
            let result = decode_file(&full_path, properties);
            let _ = sender.send(FinishedLoad { id, path, result });
        });

        if submitted.is_err() {
            warn!("texture load rejected by job queue, keeping placeholder for {key}");
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.ready = true;
            }
        }
        id
    }

    /// Queue a decode with a completion callback.
    ///
    /// The callback runs on the pumping thread once the load lands,
    /// placeholder substitution included. If the path is already loaded
    /// (or the job could not be queued) it runs before this returns.
    pub fn request_with_callback(
        &mut self,
        jobs: &JobSystem,
        key: &str,
        full_path: PathBuf,
        properties: TextureProperties,
        callback: impl FnOnce(TextureId) + 'static,
    ) -> TextureId {
        if let Some(&id) = self.by_path.get(key) {
            callback(id);
            return id;
        }
        let id = self.request(jobs, key, full_path, properties);
        if self.is_ready(id) {
            callback(id);
        } else {
            self.callbacks.insert(id, Box::new(callback));
        }
        id
    }

    /// Drain finished loads from the workers.
    ///
    /// Each one updates its entry, pushes a [`GameEvent::TextureLoaded`]
    /// and runs its completion callback if one was registered. Returns
    /// how many loads landed.
    pub fn pump(&mut self, events: &mut EventQueue) -> usize {
        let mut published = 0;
        while let Ok(finished) = self.receiver.try_recv() {
            let FinishedLoad { id, path, result } = finished;
            match result {
                Ok(image) => {
                    info!("texture loaded: {path} ({}x{})", image.width, image.height);
                    self.publish(id, image);
                }
                Err(err) => {
                    warn!("texture load failed for {path}: {err}");
                    if let Some(entry) = self.entries.get_mut(&id) {
                        entry.ready = true;
                    }
                }
            }
            events.push(GameEvent::TextureLoaded { path, texture: id });
            if let Some(callback) = self.callbacks.remove(&id) {
                callback(id);
            }
            published += 1;
        }
        published
    }

    #[must_use]
    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.entries.get(&id).map(|entry| &entry.texture)
    }

    #[must_use]
    pub fn pixels(&self, id: TextureId) -> Option<&[u8]> {
        self.entries.get(&id).map(|entry| entry.pixels.as_slice())
    }

    /// Whether the real image is in place. False for pending loads and
    /// unknown ids.
    #[must_use]
    pub fn is_ready(&self, id: TextureId) -> bool {
        self.entries.get(&id).is_some_and(|entry| entry.ready)
    }

    #[must_use]
    pub fn id_for(&self, key: &str) -> Option<TextureId> {
        self.by_path.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn alloc(&mut self, key: &str, properties: TextureProperties, ready: bool) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.by_path.insert(key.to_string(), id);
        self.entries.insert(
            id,
            TextureEntry {
                texture: Texture::new(id, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, properties),
                pixels: checkerboard_pixels(properties.format),
                ready,
            },
        );
        id
    }

    fn publish(&mut self, id: TextureId, image: DecodedImage) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.texture.width = image.width;
            entry.texture.height = image.height;
            entry.pixels = image.pixels;
            entry.ready = true;
        }
    }
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_file(path: &Path, properties: TextureProperties) -> Result<DecodedImage, TextureError> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, properties)
}

fn decode_bytes(bytes: &[u8], properties: TextureProperties) -> Result<DecodedImage, TextureError> {
    let mut image =
        image::load_from_memory(bytes).map_err(|e| TextureError::Decode(e.to_string()))?;
    if properties.flip_vertically {
        image = image.flipv();
    }
    let width = image.width();
    let height = image.height();
    let pixels = match properties.format {
        TextureFormat::Rgba8 => image.into_rgba8().into_raw(),
        TextureFormat::Rgb8 => image.into_rgb8().into_raw(),
    };
    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

/// Magenta and black checkerboard in the requested format.
fn checkerboard_pixels(format: TextureFormat) -> Vec<u8> {
    let channels = format.channels() as usize;
    let size = PLACEHOLDER_SIZE as usize;
    let cell = PLACEHOLDER_CELL as usize;
    let mut pixels = vec![0u8; size * size * channels];
    for y in 0..size {
        for x in 0..size {
            let offset = (y * size + x) * channels;
            if (x / cell + y / cell) % 2 == 0 {
                pixels[offset] = 255;
                pixels[offset + 2] = 255;
            }
            if channels == 4 {
                pixels[offset + 3] = 255;
            }
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tiny_engine_tex_{name}_{}.png", std::process::id()));
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_missing_file_keeps_placeholder() {
        let mut store = TextureStore::new();
        let id = store.load_sync(
            "nope.png",
            Path::new("/definitely/not/here.png"),
            TextureProperties::rgba_linear(),
        );

        assert!(store.is_ready(id));
        let texture = store.get(id).unwrap();
        assert_eq!(texture.width, PLACEHOLDER_SIZE);
        assert_eq!(texture.height, PLACEHOLDER_SIZE);
        let pixels = store.pixels(id).unwrap();
        assert_eq!(
            pixels.len(),
            (PLACEHOLDER_SIZE * PLACEHOLDER_SIZE * 4) as usize
        );
        // Top-left cell is magenta
        assert_eq!(&pixels[0..4], &[255, 0, 255, 255]);
    }

    #[test]
    fn test_sync_load_decodes_and_dedups() {
        let path = temp_png("sync", 2, 3);
        let mut store = TextureStore::new();

        let id = store.load_sync("sprite.png", &path, TextureProperties::rgba_linear());
        let texture = store.get(id).unwrap();
        assert_eq!(texture.width, 2);
        assert_eq!(texture.height, 3);
        assert_eq!(store.pixels(id).unwrap().len(), 2 * 3 * 4);

        let again = store.load_sync("sprite.png", &path, TextureProperties::rgba_linear());
        assert_eq!(again, id);
        assert_eq!(store.len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_rgb_format_drops_alpha() {
        let path = temp_png("rgb", 4, 4);
        let mut store = TextureStore::new();

        let id = store.load_sync("rgb.png", &path, TextureProperties::rgb_linear());
        assert_eq!(store.pixels(id).unwrap().len(), 4 * 4 * 3);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_async_load_publishes_through_pump() {
        let path = temp_png("async", 8, 8);
        let jobs = JobSystem::new(Some(1));
        let mut store = TextureStore::new();
        let mut events = EventQueue::new();

        let id = store.request(
            &jobs,
            "async.png",
            path.clone(),
            TextureProperties::rgba_linear(),
        );
        assert!(!store.is_ready(id));

        // The worker decodes in the background; pump until it lands.
        let mut published = 0;
        for _ in 0..200 {
            published += store.pump(&mut events);
            if store.is_ready(id) {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(published, 1);
        assert!(store.is_ready(id));
        assert_eq!(store.get(id).unwrap().width, 8);

        events.swap();
        let fired: Vec<_> = events.iter().collect();
        assert_eq!(fired.len(), 1);
        match fired[0] {
            GameEvent::TextureLoaded { path, texture } => {
                assert_eq!(path, "async.png");
                assert_eq!(*texture, id);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_request_dedup_issues_one_id() {
        let jobs = JobSystem::new(Some(1));
        let mut store = TextureStore::new();

        let a = store.request(
            &jobs,
            "same.png",
            PathBuf::from("/missing/same.png"),
            TextureProperties::rgba_linear(),
        );
        let b = store.request(
            &jobs,
            "same.png",
            PathBuf::from("/missing/same.png"),
            TextureProperties::rgba_linear(),
        );

        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_callback_fires_when_load_lands() {
        use std::cell::Cell;
        use std::rc::Rc;

        let path = temp_png("callback", 4, 4);
        let jobs = JobSystem::new(Some(1));
        let mut store = TextureStore::new();
        let mut events = EventQueue::new();

        let seen = Rc::new(Cell::new(None));
        let inner = Rc::clone(&seen);
        let id = store.request_with_callback(
            &jobs,
            "callback.png",
            path.clone(),
            TextureProperties::rgba_linear(),
            move |done| inner.set(Some(done)),
        );
        assert_eq!(seen.get(), None);

        for _ in 0..200 {
            store.pump(&mut events);
            if seen.get().is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(seen.get(), Some(id));

        // A repeat request for a loaded path completes synchronously.
        let again = Rc::new(Cell::new(None));
        let inner = Rc::clone(&again);
        let same = store.request_with_callback(
            &jobs,
            "callback.png",
            path.clone(),
            TextureProperties::rgba_linear(),
            move |done| inner.set(Some(done)),
        );
        assert_eq!(same, id);
        assert_eq!(again.get(), Some(id));

        let _ = std::fs::remove_file(path);
    }
}
