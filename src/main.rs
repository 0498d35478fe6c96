//! Example game demonstrating engine features
//!
//! A physics-driven crate drops onto a ground plane while a handful of
//! wanderers roam the field, tracked frame to frame in a quadtree. WASD
//! pushes the crate, Space drops a fresh one, the mouse steers the
//! camera, Escape quits.

use tiny_engine::prelude::*;
use tiny_engine::scene::BoundingBox2D;

const CRATE_SPAWN: Vec3 = Vec3::new(0.0, 5.0, 0.0);
const PUSH_FORCE: f32 = 10.0;
const WANDERER_COUNT: u32 = 6;
const WANDER_SPEED: f32 = 4.0;
/// Half-width of the square the wanderers roam in.
const WANDER_AREA: f32 = 18.0;
const NEIGHBOR_RADIUS: f32 = 6.0;

/// One roaming entity and where it is currently headed.
struct Wanderer {
    entity: EntityId,
    target: Vec2,
}

/// Demo game with a physics crate and quadtree-tracked wanderers
struct DemoGame {
    crate_entity: EntityId,
    crate_body: Option<RigidBodyHandle>,
    wanderers: Vec<Wanderer>,
    tree: QuadTree<EntityId>,
}

impl DemoGame {
    fn new() -> Self {
        Self {
            crate_entity: EntityId::INVALID,
            crate_body: None,
            wanderers: Vec::new(),
            tree: QuadTree::new(wander_bounds()),
        }
    }

    /// Drop a fresh crate body at the spawn point, replacing any old one.
    fn reset_crate(&mut self, ctx: &mut EngineContext) {
        if let Some(old) = self.crate_body.take() {
            ctx.physics.remove_body(old);
        }

        let body = ctx.physics.create_dynamic_body(CRATE_SPAWN, Quat::IDENTITY);
        ctx.physics.add_box_collider(body, Vec3::splat(0.5), 1.0);
        self.crate_body = Some(body);

        ctx.play_sound("thud", 0.8);
    }

    fn drive_crate(&mut self, ctx: &mut EngineContext) {
        if ctx.input.is_key_just_pressed(KeyCode::Space) {
            self.reset_crate(ctx);
        }

        let Some(body) = self.crate_body else {
            return;
        };

        // Push with WASD
        let mut push = Vec3::ZERO;
        if ctx.input.is_key_pressed(KeyCode::KeyW) {
            push.z -= 1.0;
        }
        if ctx.input.is_key_pressed(KeyCode::KeyS) {
            push.z += 1.0;
        }
        if ctx.input.is_key_pressed(KeyCode::KeyA) {
            push.x -= 1.0;
        }
        if ctx.input.is_key_pressed(KeyCode::KeyD) {
            push.x += 1.0;
        }
        if push != Vec3::ZERO {
            ctx.physics.apply_force(body, push.normalize() * PUSH_FORCE);
        }

        // Mirror the body onto the crate entity
        if let Some(position) = ctx.physics.get_position(body)
            && let Some(rotation) = ctx.physics.get_rotation(body)
            && let Some(entity) = ctx.entities.get_mut(self.crate_entity)
        {
            let (axis, angle) = rotation.to_axis_angle();
            entity.transform.position = position;
            entity.transform.rotation_axis = axis;
            entity.transform.rotation_degrees = angle.to_degrees();
        }
    }

    /// Walk every wanderer toward its target, retarget the ones that have
    /// arrived, and rebuild the quadtree over the new positions.
    fn wander(&mut self, ctx: &mut EngineContext) {
        let dt = ctx.time.delta_seconds();
        self.tree = QuadTree::new(wander_bounds());

        for wanderer in &mut self.wanderers {
            let Some(entity) = ctx.entities.get_mut(wanderer.entity) else {
                continue;
            };

            let position = Vec2::new(entity.transform.position.x, entity.transform.position.z);
            let to_target = wanderer.target - position;
            if to_target.length() <= 1.0 {
                wanderer.target = random_ground_point(&mut ctx.random);
            } else {
                let step = to_target.normalize_or_zero() * WANDER_SPEED * dt;
                entity.transform.position.x += step.x;
                entity.transform.position.z += step.y;
            }

            let moved = Vec2::new(entity.transform.position.x, entity.transform.position.z);
            self.tree.insert(moved, wanderer.entity);
        }
    }
}

impl Game for DemoGame {
    fn init(&mut self, ctx: &mut EngineContext) {
        log::info!("Initializing demo game");

        // Camera above and behind the field, steered by the mouse
        ctx.camera.position = Vec3::new(0.0, 6.0, 14.0);
        ctx.input.set_look(-90.0, -20.0);
        ctx.camera.front = ctx.input.look_direction();

        let cube = ctx.assets.add_model(Model::fallback_cube());
        let cube_bounds = ctx
            .assets
            .model(cube)
            .map_or(BoundingBox::EMPTY, Model::bounds);

        // Ground: static body with a plane collider, drawn as a flat slab
        let ground_body = ctx.physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        ctx.physics.add_ground_plane(ground_body);

        let ground = ctx.spawn_entity(
            "ground",
            Transform::from_position(Vec3::new(0.0, -0.1, 0.0))
                .with_scale(Vec3::new(200.0, 0.2, 200.0)),
        );
        ctx.entities.set_model(ground, cube, cube_bounds);

        // The crate the player pushes around
        self.crate_entity = ctx.spawn_entity("crate", Transform::from_position(CRATE_SPAWN));
        ctx.entities.set_model(self.crate_entity, cube, cube_bounds);
        self.reset_crate(ctx);

        // Scatter the wanderers
        for i in 0..WANDERER_COUNT {
            let position = random_ground_point(&mut ctx.random);
            let entity = ctx.spawn_entity(
                format!("wanderer_{i}"),
                Transform::from_position(Vec3::new(position.x, 0.5, position.y)),
            );
            let target = random_ground_point(&mut ctx.random);
            self.wanderers.push(Wanderer { entity, target });
        }

        ctx.request_texture("textures/crate.png");
        if let Err(e) = ctx.audio.load("thud", ctx.assets.res_path("sounds/thud.wav")) {
            log::warn!("Demo running without sound: {e}");
        }

        log::info!("Demo game initialized");
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        if ctx.input.is_key_just_pressed(KeyCode::Escape) {
            ctx.quit();
            return;
        }

        ctx.camera.front = ctx.input.look_direction();

        self.drive_crate(ctx);
        self.wander(ctx);

        for event in ctx.events.iter() {
            if let GameEvent::TextureLoaded { path, .. } = event {
                log::info!("Texture ready: {path}");
            }
        }
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        // Entities with models: ground slab and crate
        for entity in ctx.entities.renderables() {
            let Some(model_id) = entity.model else {
                continue;
            };
            if let Some(model) = ctx.assets.model(model_id) {
                ctx.renderer
                    .push_model(model_id, model, entity.transform.to_matrix());
            }
        }

        // Wanderers as points, with lines to their targets and to any
        // neighbor the quadtree finds nearby
        for wanderer in &self.wanderers {
            let Some(entity) = ctx.entities.get(wanderer.entity) else {
                continue;
            };
            let position = entity.position();

            ctx.renderer
                .push_point(position, Vec4::new(0.3, 0.9, 0.4, 1.0), 6.0);
            ctx.renderer.push_line(
                position,
                Vec3::new(wanderer.target.x, 0.5, wanderer.target.y),
                Vec4::new(0.4, 0.4, 0.4, 1.0),
            );

            let region = BoundingBox2D::from_center_size(
                Vec2::new(position.x, position.z),
                Vec2::splat(NEIGHBOR_RADIUS * 2.0),
            );
            for &neighbor in self.tree.search(&region) {
                if neighbor == wanderer.entity {
                    continue;
                }
                if let Some(other) = ctx.entities.get(neighbor) {
                    ctx.renderer.push_line(
                        position,
                        other.position(),
                        Vec4::new(0.9, 0.6, 0.2, 1.0),
                    );
                }
            }
        }
    }

    fn on_resize(&mut self, _ctx: &mut EngineContext, width: u32, height: u32) {
        log::info!("Window resized to {width}x{height}");
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        log::info!("Demo game shutting down");
    }
}

fn wander_bounds() -> BoundingBox2D {
    BoundingBox2D::from_center_size(Vec2::ZERO, Vec2::splat(WANDER_AREA * 2.0))
}

fn random_ground_point(random: &mut Random) -> Vec2 {
    Vec2::new(
        random.range_f32(-WANDER_AREA, WANDER_AREA),
        random.range_f32(-WANDER_AREA, WANDER_AREA),
    )
}

fn main() {
    let config = EngineConfig::default()
        .with_title("Engine Demo")
        .with_size(1280, 720)
        .with_target_fps(60);

    let game = DemoGame::new();
    let engine = Engine::new(config, game);

    if let Err(e) = engine.run() {
        eprintln!("Engine error: {e}");
    }
}
