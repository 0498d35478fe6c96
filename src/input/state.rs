//! Keyboard, mouse, and look-direction state

use glam::{Vec2, Vec3};
use std::collections::HashSet;
use std::hash::Hash;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Pitch is clamped short of straight up/down so the look direction
/// never degenerates.
const PITCH_LIMIT_DEG: f32 = 89.0;

/// Edge-tracking set shared by keys and mouse buttons: which are held,
/// which went down this frame, which came up this frame.
#[derive(Debug)]
struct ButtonSet<T> {
    down: HashSet<T>,
    went_down: HashSet<T>,
    went_up: HashSet<T>,
}

impl<T> Default for ButtonSet<T> {
    fn default() -> Self {
        Self {
            down: HashSet::new(),
            went_down: HashSet::new(),
            went_up: HashSet::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> ButtonSet<T> {
    fn apply(&mut self, id: T, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // OS key repeat re-sends presses while held; only a fresh
                // press counts as an edge.
                if self.down.insert(id) {
                    self.went_down.insert(id);
                }
            }
            ElementState::Released => {
                self.down.remove(&id);
                self.went_up.insert(id);
            }
        }
    }

    fn end_frame(&mut self) {
        self.went_down.clear();
        self.went_up.clear();
    }
}

/// Per-frame input snapshot.
///
/// Window events are fed in as they arrive; queries see a stable picture
/// until [`update`](Input::update) rolls the frame over. Mouse movement
/// also accumulates into a yaw/pitch pair for first-person cameras.
#[derive(Debug)]
pub struct Input {
    keys: ButtonSet<KeyCode>,
    buttons: ButtonSet<MouseButton>,
    /// Last cursor position, None until the cursor has been seen
    cursor: Option<Vec2>,
    /// Cursor movement accumulated this frame
    mouse_delta: Vec2,
    /// Scroll wheel movement accumulated this frame
    scroll_delta: Vec2,
    /// Look yaw in degrees
    yaw: f32,
    /// Look pitch in degrees
    pitch: f32,
    /// Degrees of look per pixel of mouse movement
    pub look_sensitivity: f32,
}

impl Input {
    pub fn new() -> Self {
        Self {
            keys: ButtonSet::default(),
            buttons: ButtonSet::default(),
            cursor: None,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            look_sensitivity: 0.1,
        }
    }

    /// Roll the frame over: edges and deltas reset, held state persists.
    /// The engine calls this at the end of each frame.
    pub fn update(&mut self) {
        self.keys.end_frame();
        self.buttons.end_frame();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn process_keyboard(&mut self, key_code: KeyCode, state: ElementState) {
        self.keys.apply(key_code, state);
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.buttons.apply(button, state);
    }

    /// Feed a cursor position event.
    ///
    /// The first position only anchors the cursor. It produces no delta
    /// and no look change, so the camera does not jump when the cursor
    /// first enters the window.
    pub fn process_mouse_motion(&mut self, position: Vec2) {
        if let Some(previous) = self.cursor.replace(position) {
            let delta = position - previous;
            self.mouse_delta += delta;
            self.apply_look(delta);
        }
    }

    /// Feed a raw mouse delta, as delivered when the cursor is grabbed.
    pub fn process_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
        self.apply_look(delta);
    }

    pub fn process_scroll(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }

    fn apply_look(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.look_sensitivity;
        // Screen y grows downward; moving the mouse up looks up
        self.pitch = (self.pitch - delta.y * self.look_sensitivity)
            .clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    /// True while the key is held down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.down.contains(&key)
    }

    /// True only on the frame the key went down.
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys.went_down.contains(&key)
    }

    /// True only on the frame the key came up.
    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        self.keys.went_up.contains(&key)
    }

    /// True while the button is held down.
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.down.contains(&button)
    }

    /// True only on the frame the button went down.
    pub fn is_mouse_button_just_pressed(&self, button: MouseButton) -> bool {
        self.buttons.went_down.contains(&button)
    }

    /// True only on the frame the button came up.
    pub fn is_mouse_button_just_released(&self, button: MouseButton) -> bool {
        self.buttons.went_up.contains(&button)
    }

    /// Last seen cursor position, in window pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.cursor.unwrap_or(Vec2::ZERO)
    }

    /// Cursor movement accumulated this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel movement accumulated this frame.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Look yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Look pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Aim the look direction directly, e.g. when spawning the player
    pub fn set_look(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    /// Normalized world-space direction the accumulated look points at
    pub fn look_direction(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
