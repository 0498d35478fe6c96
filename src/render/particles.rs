//! 2D particle system
//!
//! A [`ParticleSystem2D`] owns a fixed pool of particles and a list of
//! behaviors. Behaviors decide how many particles to emit each tick,
//! initialize newly spawned ones, and mutate the whole pool every tick.
//! Spawning never allocates: a new particle overwrites the first dead
//! slot, scanning forward from a cursor so repeated spawns do not rescan
//! the front of the pool.

use std::f32::consts::TAU;

use glam::{Vec2, Vec4};

use crate::core::Random;

/// A single pooled particle. Life runs from 1.0 down to 0.0; a particle
/// with `life <= 0.0` is dead and its slot is free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle2D {
    pub life: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub color: Vec4,
}

impl Default for Particle2D {
    fn default() -> Self {
        Self {
            life: 0.0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: Vec2::splat(15.0),
            rotation: 0.0,
            color: Vec4::ONE,
        }
    }
}

impl Particle2D {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Hook points a particle system calls every tick.
///
/// All methods have no-op defaults so a behavior only implements the
/// hooks it cares about. Emitter behaviors implement `should_emit`,
/// initializers implement `init_particle`, and per-tick mutators
/// implement `on_tick`.
pub trait ParticleBehavior {
    /// How many particles this behavior wants spawned this tick.
    fn should_emit(&mut self) -> u32 {
        0
    }

    /// Initialize a freshly spawned particle.
    fn init_particle(&mut self, _particle: &mut Particle2D, _system_position: Vec2) {}

    /// Mutate the pool once per tick.
    fn on_tick(&mut self, _particles: &mut [Particle2D]) {}

    /// Return to the initial state when the owning system resets.
    fn reset(&mut self) {}
}

/// Baseline behavior every system carries: new particles start at the
/// system position with full life, and alive particles integrate their
/// velocity each tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultParticleBehavior;

impl ParticleBehavior for DefaultParticleBehavior {
    fn init_particle(&mut self, particle: &mut Particle2D, system_position: Vec2) {
        particle.life = 1.0;
        particle.position = system_position;
    }

    fn on_tick(&mut self, particles: &mut [Particle2D]) {
        for particle in particles.iter_mut().filter(|p| p.is_alive()) {
            particle.position += particle.velocity;
        }
    }
}

/// Subtracts a fixed amount of life per tick.
#[derive(Debug, Clone, Copy)]
pub struct ParticleDecay {
    pub life_per_tick: f32,
}

impl ParticleDecay {
    #[must_use]
    pub fn new(life_per_tick: f32) -> Self {
        Self { life_per_tick }
    }
}

impl ParticleBehavior for ParticleDecay {
    fn on_tick(&mut self, particles: &mut [Particle2D]) {
        for particle in particles.iter_mut().filter(|p| p.is_alive()) {
            particle.life -= self.life_per_tick;
        }
    }
}

/// Fades alpha toward zero, clamped so it never goes negative.
#[derive(Debug, Clone, Copy)]
pub struct ParticleAlphaDecay {
    pub alpha_per_tick: f32,
}

impl ParticleAlphaDecay {
    #[must_use]
    pub fn new(alpha_per_tick: f32) -> Self {
        Self { alpha_per_tick }
    }
}

impl ParticleBehavior for ParticleAlphaDecay {
    fn on_tick(&mut self, particles: &mut [Particle2D]) {
        for particle in particles.iter_mut().filter(|p| p.is_alive()) {
            particle.color.w = (particle.color.w - self.alpha_per_tick).max(0.0);
        }
    }
}

/// Gives every spawned particle the same starting velocity.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSetVelocity {
    pub velocity: Vec2,
}

impl ParticleSetVelocity {
    #[must_use]
    pub fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

impl ParticleBehavior for ParticleSetVelocity {
    fn init_particle(&mut self, particle: &mut Particle2D, _system_position: Vec2) {
        particle.velocity = self.velocity;
    }
}

/// Gives every spawned particle the same size.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSetSize {
    pub size: Vec2,
}

impl ParticleSetSize {
    #[must_use]
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }
}

impl ParticleBehavior for ParticleSetSize {
    fn init_particle(&mut self, particle: &mut Particle2D, _system_position: Vec2) {
        particle.size = self.size;
    }
}

/// Launches each spawned particle in a random direction at a fixed speed.
#[derive(Debug)]
pub struct ParticleSpreadOut {
    pub speed: f32,
    rng: Random,
}

impl ParticleSpreadOut {
    /// Clock-seeded spread.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            rng: Random::new(0),
        }
    }

    /// Deterministic spread for reproducible effects.
    #[must_use]
    pub fn with_seed(speed: f32, seed: u32) -> Self {
        Self {
            speed,
            rng: Random::new(seed),
        }
    }
}

impl ParticleBehavior for ParticleSpreadOut {
    fn init_particle(&mut self, particle: &mut Particle2D, _system_position: Vec2) {
        let angle = self.rng.range_f32(0.0, TAU);
        particle.velocity = Vec2::new(angle.cos(), angle.sin()) * self.speed;
    }
}

/// Emits one particle every tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmitEveryTick;

impl ParticleBehavior for EmitEveryTick {
    fn should_emit(&mut self) -> u32 {
        1
    }
}

/// Emits one particle every `every_n_ticks` ticks.
#[derive(Debug, Clone, Copy)]
pub struct EmitInterval {
    pub every_n_ticks: u32,
    counter: u32,
}

impl EmitInterval {
    #[must_use]
    pub fn new(every_n_ticks: u32) -> Self {
        Self {
            every_n_ticks: every_n_ticks.max(1),
            counter: 0,
        }
    }
}

impl ParticleBehavior for EmitInterval {
    fn should_emit(&mut self) -> u32 {
        self.counter += 1;
        if self.counter >= self.every_n_ticks {
            self.counter = 0;
            1
        } else {
            0
        }
    }

    fn reset(&mut self) {
        self.counter = 0;
    }
}

/// Emits `count` particles at once, then waits until that many slots are
/// dead before firing again.
#[derive(Debug, Clone, Copy)]
pub struct EmitBurst {
    pub count: u32,
    has_fired: bool,
}

impl EmitBurst {
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            count,
            has_fired: false,
        }
    }
}

impl ParticleBehavior for EmitBurst {
    fn should_emit(&mut self) -> u32 {
        if self.has_fired {
            0
        } else {
            self.has_fired = true;
            self.count
        }
    }

    fn on_tick(&mut self, particles: &mut [Particle2D]) {
        if !self.has_fired {
            return;
        }
        let dead = particles.iter().filter(|p| !p.is_alive()).count();
        if dead >= self.count as usize {
            self.has_fired = false;
        }
    }

    fn reset(&mut self) {
        self.has_fired = false;
    }
}

/// Blends particle color across its lifetime, `from` at full life to
/// `to` at death.
#[derive(Debug, Clone, Copy)]
pub struct ParticleColorGradient {
    pub from: Vec4,
    pub to: Vec4,
}

impl ParticleColorGradient {
    #[must_use]
    pub fn new(from: Vec4, to: Vec4) -> Self {
        Self { from, to }
    }
}

impl ParticleBehavior for ParticleColorGradient {
    fn on_tick(&mut self, particles: &mut [Particle2D]) {
        for particle in particles.iter_mut().filter(|p| p.is_alive()) {
            particle.color = self.from.lerp(self.to, 1.0 - particle.life);
        }
    }
}

/// Fixed-pool particle system driven by a stack of behaviors.
pub struct ParticleSystem2D {
    pub is_active: bool,
    particles: Vec<Particle2D>,
    behaviors: Vec<Box<dyn ParticleBehavior>>,
    cursor: usize,
}

impl ParticleSystem2D {
    /// Create a system with a pre-allocated pool of dead particles.
    /// [`DefaultParticleBehavior`] is always installed first.
    #[must_use]
    pub fn new(max_particles: usize, start_active: bool) -> Self {
        Self {
            is_active: start_active,
            particles: vec![Particle2D::default(); max_particles],
            behaviors: vec![Box::new(DefaultParticleBehavior)],
            cursor: 0,
        }
    }

    pub fn add_behavior(&mut self, behavior: impl ParticleBehavior + 'static) -> &mut Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: impl ParticleBehavior + 'static) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    /// Advance the system one tick: spawn whatever the emitter behaviors
    /// request (clamped to the pool size), then run every behavior's
    /// per-tick pass. Does nothing while inactive.
    pub fn update(&mut self, position: Vec2) {
        if !self.is_active {
            return;
        }

        let requested: u32 = self
            .behaviors
            .iter_mut()
            .map(|behavior| behavior.should_emit())
            .sum();
        let to_spawn = (requested as usize).min(self.particles.len());

        for _ in 0..to_spawn {
            let mut particle = Particle2D::default();
            for behavior in &mut self.behaviors {
                behavior.init_particle(&mut particle, position);
            }
            let slot = self.first_unused();
            self.particles[slot] = particle;
        }

        for behavior in &mut self.behaviors {
            behavior.on_tick(&mut self.particles);
        }
    }

    /// Find a dead slot, scanning from the cursor and wrapping around.
    /// When the pool is saturated the first slot is sacrificed.
    fn first_unused(&mut self) -> usize {
        for i in self.cursor..self.particles.len() {
            if !self.particles[i].is_alive() {
                self.cursor = i;
                return i;
            }
        }
        for i in 0..self.cursor {
            if !self.particles[i].is_alive() {
                self.cursor = i;
                return i;
            }
        }
        self.cursor = 0;
        0
    }

    /// Kill every particle and reset all behaviors. The pool keeps its
    /// allocation.
    pub fn reset(&mut self) {
        for particle in &mut self.particles {
            *particle = Particle2D::default();
        }
        for behavior in &mut self.behaviors {
            behavior.reset();
        }
        self.cursor = 0;
    }

    /// Particles worth drawing this frame.
    pub fn alive(&self) -> impl Iterator<Item = &Particle2D> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle2D] {
        &self.particles
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once_and_rearms_when_dead() {
        let mut system = ParticleSystem2D::new(4, true)
            .with_behavior(EmitBurst::new(4))
            .with_behavior(ParticleDecay::new(0.5));

        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 4);

        // Two decay ticks kill the burst; the emitter stays quiet until
        // it sees the pool dead, then fires again.
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 0);
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 0);
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 4);
    }

    #[test]
    fn test_spawn_scans_forward_from_cursor() {
        let mut system = ParticleSystem2D::new(3, true).with_behavior(EmitEveryTick);

        system.update(Vec2::new(1.0, 0.0));
        system.update(Vec2::new(2.0, 0.0));
        system.update(Vec2::new(3.0, 0.0));

        let xs: Vec<f32> = system.particles().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_saturated_pool_overwrites_slot_zero() {
        let mut system = ParticleSystem2D::new(3, true).with_behavior(EmitEveryTick);

        for i in 1..=4 {
            system.update(Vec2::new(i as f32, 0.0));
        }

        assert_eq!(system.particles()[0].position.x, 4.0);
        assert_eq!(system.particles()[1].position.x, 2.0);
        assert_eq!(system.particles()[2].position.x, 3.0);
    }

    #[test]
    fn test_decay_kills_particles() {
        let mut system = ParticleSystem2D::new(1, true)
            .with_behavior(EmitBurst::new(1))
            .with_behavior(ParticleDecay::new(0.4));

        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 1);
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 1);
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 0);
    }

    #[test]
    fn test_interval_emits_on_cadence() {
        let mut emitter = EmitInterval::new(3);
        let counts: Vec<u32> = (0..6).map(|_| emitter.should_emit()).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 0, 1]);

        emitter.reset();
        assert_eq!(emitter.should_emit(), 0);
    }

    #[test]
    fn test_inactive_system_does_nothing() {
        let mut system = ParticleSystem2D::new(4, false).with_behavior(EmitEveryTick);
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 0);

        system.is_active = true;
        system.update(Vec2::ZERO);
        assert_eq!(system.alive_count(), 1);
    }

    #[test]
    fn test_gradient_blends_with_life() {
        let mut gradient = ParticleColorGradient::new(
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        );
        let mut particles = [Particle2D {
            life: 0.5,
            ..Particle2D::default()
        }];

        gradient.on_tick(&mut particles);
        assert_eq!(particles[0].color, Vec4::new(0.5, 0.0, 0.5, 1.0));
    }

    #[test]
    fn test_spread_out_launches_at_speed() {
        let mut spread = ParticleSpreadOut::with_seed(5.0, 42);
        let mut a = Particle2D::default();
        let mut b = Particle2D::default();
        spread.init_particle(&mut a, Vec2::ZERO);
        spread.init_particle(&mut b, Vec2::ZERO);

        assert!((a.velocity.length() - 5.0).abs() < 1e-3);
        assert!((b.velocity.length() - 5.0).abs() < 1e-3);
        assert_ne!(a.velocity, b.velocity);
    }

    #[test]
    fn test_default_behavior_integrates_velocity() {
        let mut default = DefaultParticleBehavior;
        let mut particles = [Particle2D {
            life: 1.0,
            velocity: Vec2::new(1.0, 2.0),
            ..Particle2D::default()
        }];

        default.on_tick(&mut particles);
        assert_eq!(particles[0].position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_alpha_decay_clamps_at_zero() {
        let mut fade = ParticleAlphaDecay::new(0.5);
        let mut particles = [Particle2D {
            life: 1.0,
            color: Vec4::new(1.0, 1.0, 1.0, 0.3),
            ..Particle2D::default()
        }];

        fade.on_tick(&mut particles);
        assert_eq!(particles[0].color.w, 0.0);
    }

    #[test]
    fn test_reset_revives_pool_and_rearms_behaviors() {
        let mut system = ParticleSystem2D::new(2, true).with_behavior(EmitBurst::new(2));
        system.update(Vec2::ONE);
        assert_eq!(system.alive_count(), 2);

        system.reset();
        assert_eq!(system.alive_count(), 0);
        for particle in system.particles() {
            assert_eq!(*particle, Particle2D::default());
        }

        // Burst re-armed by the reset
        system.update(Vec2::ONE);
        assert_eq!(system.alive_count(), 2);
    }
}
