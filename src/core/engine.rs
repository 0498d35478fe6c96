//! Engine driver: window, event loop, and the per-frame pipeline
//!
//! [`Engine`] owns the window and the winit event loop; everything a game
//! touches lives in [`EngineContext`] and is handed to the [`Game`]
//! callbacks by mutable reference. One frame runs in a fixed order: advance
//! time, record stats, step physics, game update, flush main-thread jobs,
//! publish finished asset loads, game render, close out the draw list,
//! swap event buffers, forward sound requests, clear per-frame input, then
//! sleep toward the FPS target.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::assets::AssetServer;
use crate::audio::AudioManager;
use crate::core::config::EngineConfig;
use crate::core::debug::DebugInfo;
use crate::core::events::{EventQueue, GameEvent};
use crate::core::random::Random;
use crate::core::time::Time;
use crate::input::Input;
use crate::jobs::JobSystem;
use crate::mem::Arena;
use crate::physics::Physics;
use crate::render::{Renderer, TextureId};
use crate::scene::{Camera, EntityId, EntityRegistry, Lights, Transform};

/// Size of the engine-side scratch arena, reclaimed every frame.
const FRAME_ARENA_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// Game Trait
// ============================================================================

/// Callbacks a game hands to the engine.
///
/// Only [`init`](Game::init), [`update`](Game::update), and
/// [`render`](Game::render) are required; the rest default to no-ops.
pub trait Game: 'static {
    /// Runs once, after the window exists and before the first frame.
    fn init(&mut self, engine: &mut EngineContext);

    /// Per-frame logic step.
    fn update(&mut self, engine: &mut EngineContext);

    /// Per-frame draw step. Push models and particles to the renderer here.
    fn render(&mut self, engine: &mut EngineContext);

    /// The window size changed.
    fn on_resize(&mut self, _engine: &mut EngineContext, _width: u32, _height: u32) {}

    /// The engine is about to stop, either via quit or window close.
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

// ============================================================================
// Engine Context
// ============================================================================

/// Everything the game callbacks can reach.
pub struct EngineContext {
    /// Frame clock
    pub time: Time,
    /// Keyboard, mouse, and look state
    pub input: Input,
    /// Engine RNG, seeded from the config
    pub random: Random,
    /// Worker pool and main-thread job queue
    pub jobs: JobSystem,
    /// Texture and model loading
    pub assets: AssetServer,
    /// Sound playback. Runs as a no-op when no output device exists.
    pub audio: AudioManager,
    /// Physics world, stepped once per frame
    pub physics: Physics,
    /// Entities in the scene
    pub entities: EntityRegistry,
    /// Scene camera
    pub camera: Camera,
    /// Scene lighting
    pub lights: Lights,
    /// Draw list the game renders into
    pub renderer: Renderer,
    /// Cross-system events, readable one frame after they are pushed
    pub events: EventQueue,
    /// Overlay stats and lines
    pub debug: DebugInfo,
    /// Game-owned arena, sized by the config. Never cleared by the engine.
    pub game_arena: Arena,
    /// Engine-side scratch arena. Cleared at the end of every frame, so
    /// handles into it must not outlive the frame they were made in.
    pub frame_arena: Arena,
    /// Current window size in physical pixels
    window_size: PhysicalSize<u32>,
    /// Set by quit(), checked once per frame
    should_quit: bool,
}

impl EngineContext {
    fn new(config: &EngineConfig) -> Self {
        Self {
            time: Time::new(),
            input: Input::new(),
            random: Random::new(config.rng_seed),
            jobs: JobSystem::new(config.worker_threads),
            assets: AssetServer::new(&config.resource_dir),
            audio: AudioManager::new(),
            physics: Physics::new(),
            entities: EntityRegistry::new(),
            camera: Camera::new(config.width, config.height),
            lights: Lights::new(),
            renderer: Renderer::new(),
            events: EventQueue::new(),
            debug: DebugInfo::new(),
            game_arena: Arena::with_capacity("game", config.game_arena_bytes),
            frame_arena: Arena::with_capacity("frame", FRAME_ARENA_BYTES),
            window_size: PhysicalSize::new(config.width, config.height),
            should_quit: false,
        }
    }

    /// Window width in physical pixels.
    pub fn width(&self) -> u32 {
        self.window_size.width
    }

    /// Window height in physical pixels.
    pub fn height(&self) -> u32 {
        self.window_size.height
    }

    /// Width over height, guarded against a zero-height window.
    pub fn aspect_ratio(&self) -> f32 {
        self.window_size.width as f32 / self.window_size.height.max(1) as f32
    }

    /// Create an entity and announce it on the event queue
    pub fn spawn_entity(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let entity = self.entities.create(name, transform);
        self.events.push(GameEvent::EntitySpawned { entity });
        entity
    }

    /// Remove an entity and announce it on the event queue.
    /// Returns false when the id is not in the registry.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        if self.entities.destroy(entity) {
            self.events.push(GameEvent::EntityDestroyed { entity });
            true
        } else {
            false
        }
    }

    /// Queue a sound by name. It plays at the end of this frame.
    pub fn play_sound(&mut self, name: &'static str, volume: f32) {
        self.events.push(GameEvent::PlaySound { name, volume });
    }

    /// Start a background texture load. The returned handle is usable
    /// immediately and resolves to a placeholder until the load lands.
    pub fn request_texture(&mut self, path: &str) -> TextureId {
        self.assets.request_texture(&self.jobs, path)
    }

    /// Ask the engine to stop after the current frame.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Whether quit has been requested.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Forward last frame's sound requests to the audio manager.
    fn dispatch_sound_events(&mut self) {
        let Self { events, audio, .. } = self;
        for event in events.iter() {
            if let GameEvent::PlaySound { name, volume } = event {
                audio.play_with_volume(name, *volume);
            }
        }
    }

    /// Record arena usage for the debug overlay, then reclaim the
    /// frame scratch arena.
    fn end_frame_memory(&mut self) {
        let Self {
            debug,
            game_arena,
            frame_arena,
            ..
        } = self;
        debug.record_arena_usage(game_arena.name(), game_arena.used(), game_arena.capacity());
        debug.record_arena_usage(
            frame_arena.name(),
            frame_arena.used(),
            frame_arena.capacity(),
        );
        frame_arena.clear();
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Window, event loop, and the game being driven.
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    /// Pair a game with a config. Nothing starts until [`run`](Engine::run).
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(&config);
        Self {
            config,
            game,
            context,
            window: None,
            initialized: false,
        }
    }

    /// Open the window and block on the event loop until the game quits.
    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        log::info!("starting {}", self.config.title);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        log::info!("event loop exited");
        Ok(())
    }

    /// Run the game shutdown hook, stop the workers, and leave the loop.
    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.game.shutdown(&mut self.context);
        self.context.jobs.shutdown();
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let frame_start = Instant::now();

        self.context.time.update();
        self.context.debug.record_frame(self.context.time.delta());

        // Step physics before game logic so updates see fresh transforms
        let delta = self.context.time.delta_seconds();
        self.context.physics.step(delta);

        self.game.update(&mut self.context);

        // Run work queued for the main thread, then publish any asset
        // loads the workers finished
        self.context.jobs.flush_main_thread_jobs();
        self.context.assets.pump(&mut self.context.events);

        if self.context.should_quit() {
            log::info!("quit requested");
            self.exit(event_loop);
            return;
        }

        self.game.render(&mut self.context);
        self.context.renderer.end_frame();

        self.context.end_frame_memory();

        // Frame boundary: pushed events become readable, sounds requested
        // during the frame start playing
        self.context.events.swap();
        self.context.dispatch_sound_events();

        self.context.input.update();

        self.limit_frame_rate(frame_start);

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Sleep off whatever is left of the frame budget.
    fn limit_frame_rate(&self, frame_start: Instant) {
        if self.config.target_fps == 0 {
            return;
        }
        let target = Duration::from_secs_f64(1.0 / f64::from(self.config.target_fps));
        let elapsed = frame_start.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = event_loop
            .create_window(attrs)
            .expect("window creation failed");
        self.window = Some(Arc::new(window));

        // init runs once even if the loop suspends and resumes
        if !self.initialized {
            self.initialized = true;
            self.game.init(&mut self.context);
            log::info!("init complete, entering main loop");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                // Minimized windows report 0x0; ignore those
                if new_size.width > 0 && new_size.height > 0 {
                    self.context.window_size = new_size;
                    self.context
                        .camera
                        .set_screen_size(new_size.width, new_size.height);
                    self.context.events.push(GameEvent::WindowResized {
                        width: new_size.width,
                        height: new_size.height,
                    });
                    self.game
                        .on_resize(&mut self.context, new_size.width, new_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.context.input.process_keyboard(code, event.state);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.context.input.process_mouse_button(button, state);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let position = position.cast::<f32>();
                self.context
                    .input
                    .process_mouse_motion(Vec2::new(position.x, position.y));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        let pos = pos.cast::<f32>();
                        Vec2::new(pos.x, pos.y)
                    }
                };
                self.context.input.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
