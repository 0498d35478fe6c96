//! Per-frame draw list
//!
//! Games push draw commands during `render`; a backend drains the sorted
//! list with [`Renderer::drain_frame`]. Mesh commands are sorted by
//! material before draining so a backend can batch state changes; lines
//! and points keep their push order and draw after the meshes. The engine
//! calls [`Renderer::end_frame`] at the frame boundary, which closes the
//! list out and records stats even when no backend consumed it.

use glam::{Mat4, Vec3, Vec4};

use crate::render::material::MaterialId;
use crate::render::model::{Model, ModelId};

/// Draw one mesh of a model with a material and transform.
#[derive(Debug, Clone, Copy)]
pub struct MeshCommand {
    pub model: ModelId,
    /// Index into the model's mesh list
    pub mesh_index: u32,
    pub material: MaterialId,
    pub transform: Mat4,
}

/// Draw a world-space line segment.
#[derive(Debug, Clone, Copy)]
pub struct LineCommand {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Vec4,
}

/// Draw a world-space point.
#[derive(Debug, Clone, Copy)]
pub struct PointCommand {
    pub position: Vec3,
    pub color: Vec4,
    pub size: f32,
}

/// One frame's commands, meshes already sorted by material.
#[derive(Debug, Default)]
pub struct FrameDrawList {
    pub meshes: Vec<MeshCommand>,
    pub lines: Vec<LineCommand>,
    pub points: Vec<PointCommand>,
}

impl FrameDrawList {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len() + self.lines.len() + self.points.len()
    }
}

/// Command counts for the most recently drained frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub mesh_commands: usize,
    pub line_commands: usize,
    pub point_commands: usize,
}

impl RenderStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.mesh_commands + self.line_commands + self.point_commands
    }
}

/// Draw list the game renders into each frame.
#[derive(Debug, Default)]
pub struct Renderer {
    meshes: Vec<MeshCommand>,
    lines: Vec<LineCommand>,
    points: Vec<PointCommand>,
    last_stats: RenderStats,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one mesh of a model.
    pub fn push_mesh(
        &mut self,
        model: ModelId,
        mesh_index: u32,
        material: MaterialId,
        transform: Mat4,
    ) {
        self.meshes.push(MeshCommand {
            model,
            mesh_index,
            material,
            transform,
        });
    }

    /// Queue every visible mesh of a model, each with its own material.
    pub fn push_model(&mut self, id: ModelId, model: &Model, transform: Mat4) {
        for (index, mesh) in model.meshes.iter().enumerate() {
            if !mesh.visible {
                continue;
            }
            self.push_mesh(id, index as u32, mesh.material, transform);
        }
    }

    /// Queue a line segment.
    pub fn push_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        self.lines.push(LineCommand { start, end, color });
    }

    /// Queue a point.
    pub fn push_point(&mut self, position: Vec3, color: Vec4, size: f32) {
        self.points.push(PointCommand {
            position,
            color,
            size,
        });
    }

    /// Take this frame's commands, sorted for drawing, and clear the list.
    ///
    /// The mesh sort is stable, so commands sharing a material keep their
    /// push order.
    pub fn drain_frame(&mut self) -> FrameDrawList {
        self.meshes.sort_by_key(|command| command.material.0);

        let list = FrameDrawList {
            meshes: std::mem::take(&mut self.meshes),
            lines: std::mem::take(&mut self.lines),
            points: std::mem::take(&mut self.points),
        };

        self.last_stats = RenderStats {
            mesh_commands: list.meshes.len(),
            line_commands: list.lines.len(),
            point_commands: list.points.len(),
        };

        list
    }

    /// Close out the frame without a consumer: record stats, drop commands.
    pub fn end_frame(&mut self) {
        let _ = self.drain_frame();
    }

    /// Stats for the last drained frame.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Commands queued so far this frame.
    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.meshes.len() + self.lines.len() + self.points.len()
    }

    /// Drop queued commands without recording stats.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.lines.clear();
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mesh::Mesh;

    #[test]
    fn test_drain_sorts_meshes_by_material() {
        let mut renderer = Renderer::new();
        renderer.push_mesh(ModelId(0), 0, MaterialId(2), Mat4::IDENTITY);
        renderer.push_mesh(ModelId(1), 0, MaterialId(0), Mat4::IDENTITY);
        renderer.push_mesh(ModelId(2), 0, MaterialId(1), Mat4::IDENTITY);
        renderer.push_mesh(ModelId(3), 0, MaterialId(0), Mat4::IDENTITY);

        let list = renderer.drain_frame();
        let materials: Vec<u32> = list.meshes.iter().map(|c| c.material.0).collect();
        assert_eq!(materials, vec![0, 0, 1, 2]);

        // Stable sort keeps push order within a material
        assert_eq!(list.meshes[0].model, ModelId(1));
        assert_eq!(list.meshes[1].model, ModelId(3));
    }

    #[test]
    fn test_drain_clears_and_records_stats() {
        let mut renderer = Renderer::new();
        renderer.push_line(Vec3::ZERO, Vec3::X, Vec4::ONE);
        renderer.push_point(Vec3::Y, Vec4::ONE, 2.0);
        renderer.push_mesh(ModelId(0), 0, MaterialId::DEFAULT, Mat4::IDENTITY);
        assert_eq!(renderer.pending_commands(), 3);

        let list = renderer.drain_frame();
        assert_eq!(list.len(), 3);
        assert_eq!(renderer.pending_commands(), 0);

        let stats = renderer.stats();
        assert_eq!(stats.mesh_commands, 1);
        assert_eq!(stats.line_commands, 1);
        assert_eq!(stats.point_commands, 1);
        assert_eq!(stats.total(), 3);

        // Next drain resets the stats
        renderer.end_frame();
        assert_eq!(renderer.stats().total(), 0);
    }

    #[test]
    fn test_push_model_skips_invisible_meshes() {
        let mut hidden = Mesh::cube();
        hidden.visible = false;
        let model = Model::from_meshes("test", vec![Mesh::cube(), hidden, Mesh::plane(1.0)]);

        let mut renderer = Renderer::new();
        renderer.push_model(ModelId(5), &model, Mat4::IDENTITY);

        let list = renderer.drain_frame();
        assert_eq!(list.meshes.len(), 2);
        let indices: Vec<u32> = list.meshes.iter().map(|c| c.mesh_index).collect();
        assert!(indices.contains(&0));
        assert!(indices.contains(&2));
    }
}
