//! Rigid-body simulation on rapier3d
//!
//! Physics here is a pass-through to an external solver, the same shape
//! the rest of the engine assumes: games create bodies and colliders
//! through glam-typed wrappers, the engine steps the world once per
//! frame with the real delta, and transforms are read back to drive
//! rendering.

use glam::{Quat, Vec3};
use rapier3d::na::{self, UnitQuaternion};
use rapier3d::prelude::*;

/// Opaque handle to a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Opaque handle to a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<f32> {
    Isometry::from_parts(
        na::Translation3::new(position.x, position.y, position.z),
        UnitQuaternion::from_quaternion(na::Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        )),
    )
}

fn to_quat(rotation: &UnitQuaternion<f32>) -> Quat {
    let q = rotation.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn to_vec3(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// The simulation and every solver component it steps.
pub struct Physics {
    /// World gravity, applied to every dynamic body.
    pub gravity: Vec3,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd: CCDSolver,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
}

impl Physics {
    /// World with standard earth gravity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    #[must_use]
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd: CCDSolver::new(),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.params.dt = dt;
        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    /// Body that never moves; level geometry and floors.
    pub fn create_static_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        self.insert_body(RigidBodyBuilder::fixed(), position, rotation)
    }

    /// Body integrated by the solver, subject to gravity and forces.
    pub fn create_dynamic_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        self.insert_body(RigidBodyBuilder::dynamic(), position, rotation)
    }

    fn insert_body(
        &mut self,
        builder: RigidBodyBuilder,
        position: Vec3,
        rotation: Quat,
    ) -> RigidBodyHandle {
        let body = builder.position(to_isometry(position, rotation)).build();
        RigidBodyHandle(self.bodies.insert(body))
    }

    /// Attach a box collider with the given half extents and density.
    pub fn add_box_collider(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec3,
        density: f32,
    ) -> ColliderHandle {
        let shape = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .density(density)
            .build();
        ColliderHandle(
            self.colliders
                .insert_with_parent(shape, body.0, &mut self.bodies),
        )
    }

    /// Attach a broad flat slab for floors: 200 units on a side, 0.2
    /// thick.
    pub fn add_ground_plane(&mut self, body: RigidBodyHandle) -> ColliderHandle {
        let slab = ColliderBuilder::cuboid(100.0, 0.1, 100.0).build();
        ColliderHandle(
            self.colliders
                .insert_with_parent(slab, body.0, &mut self.bodies),
        )
    }

    #[must_use]
    pub fn get_position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(body.0).map(|rb| to_vec3(rb.translation()))
    }

    #[must_use]
    pub fn get_rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.bodies.get(body.0).map(|rb| to_quat(rb.rotation()))
    }

    /// Accumulate a continuous force on a body, consumed by the next
    /// step. Unknown handles are ignored.
    pub fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.add_force(vector![force.x, force.y, force.z], true);
        }
    }

    /// Instantaneous momentum change on a body.
    pub fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    pub fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    #[must_use]
    pub fn get_linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(body.0).map(|rb| to_vec3(rb.linvel()))
    }

    /// Remove a body along with every collider attached to it.
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.bodies.remove(
            body.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}
