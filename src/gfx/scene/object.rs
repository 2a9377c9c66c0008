//! Placed objects: CPU-side placement state and the GPU geometry it drives.
//!
//! [`ObjectPlacement`] is plain data so placement and picking can be tested
//! without a graphics context; [`Mesh`] owns the GPU buffer exclusively and
//! releases it when dropped (object deletion or scene reset).

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;
use wgpu::Device;

use crate::gfx::geometry::GeometryData;
use crate::gfx::rendering::color_mode::{ColorMode, DrawUniform};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc},
    uniform_buffer::UniformBuffer,
};

use super::vertex::Vertex3D;

/// Selected objects rescale within these bounds.
pub const SCALE_MIN: f32 = 0.25;
pub const SCALE_MAX: f32 = 8.0;
/// Exponential rescale factor per wheel detent.
pub const SCALE_WHEEL_FACTOR: f32 = 1.1;

/// CPU-only placement state of an object on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPlacement {
    /// World placement, ground-seated
    pub translation: Vector3<f32>,
    /// Uniform scale, kept within [`SCALE_MIN`]..=[`SCALE_MAX`]
    pub scale: f32,
    /// Planar bounding extent before scale
    pub base_footprint: f32,
    /// Picking sphere radius before scale
    pub bounding_radius: f32,
}

impl ObjectPlacement {
    pub fn new(translation: Vector3<f32>, base_footprint: f32, bounding_radius: f32) -> Self {
        Self {
            translation,
            scale: 1.0,
            base_footprint,
            bounding_radius,
        }
    }

    /// Radius of the placed footprint circle on the ground plane.
    pub fn footprint_radius(&self) -> f32 {
        self.base_footprint * self.scale * 0.5
    }

    /// Radius of the picking sphere centered at the translation.
    pub fn picking_radius(&self) -> f32 {
        self.bounding_radius * self.scale
    }

    /// Applies wheel detents as an exponential rescale, clamped.
    pub fn rescale(&mut self, wheel_steps: f32) {
        self.scale = (self.scale * SCALE_WHEEL_FACTOR.powf(wheel_steps)).clamp(SCALE_MIN, SCALE_MAX);
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation) * Matrix4::from_scale(self.scale)
    }
}

/// Geometry handle: interleaved vertex data plus its exclusively-owned GPU
/// buffer. The buffer is `None` until a device exists.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl Mesh {
    /// Interleaves a flat triangle list, applying the attribute defaults
    /// (world-up normals, zero UVs) where the source carried none.
    pub fn new(geometry: &GeometryData) -> Self {
        let vertices: Vec<Vertex3D> = (0..geometry.positions.len())
            .map(|i| Vertex3D {
                position: geometry.positions[i],
                normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();
        let vertex_count = vertices.len() as u32;

        Self {
            vertices,
            vertex_buffer: None,
            vertex_count,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// Uploads the vertex data once; later calls are no-ops.
    pub fn upload(&mut self, device: &Device) {
        if self.vertex_buffer.is_some() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }
}

/// Per-object GPU resources for the draw uniform (bind group 1).
pub struct ObjectGpuResources {
    draw_ubo: UniformBuffer<DrawUniform>,
    bind_group: wgpu::BindGroup,
}

/// One placed object in the scene.
pub struct SceneObject {
    pub name: String,
    pub placement: ObjectPlacement,
    pub base_color: [f32; 4],
    mesh: Mesh,
    gpu_resources: Option<ObjectGpuResources>,
}

impl SceneObject {
    pub fn new(
        name: impl Into<String>,
        mesh: Mesh,
        placement: ObjectPlacement,
        base_color: [f32; 4],
    ) -> Self {
        Self {
            name: name.into(),
            placement,
            base_color,
            mesh,
            gpu_resources: None,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh.vertex_count()
    }

    /// Uploads the mesh and creates the draw uniform resources. Idempotent,
    /// so the scene can call it again after late imports.
    pub fn init_gpu_resources(&mut self, device: &Device, draw_layout: &BindGroupLayoutWithDesc) {
        self.mesh.upload(device);

        if self.gpu_resources.is_none() {
            let draw_ubo = UniformBuffer::new_with_data(
                device,
                &DrawUniform::new(self.placement.model_matrix(), self.base_color, ColorMode::Uniform),
            );
            let bind_group = BindGroupBuilder::new(draw_layout)
                .resource(draw_ubo.binding_resource())
                .create(device, "Object Draw Bind Group");
            self.gpu_resources = Some(ObjectGpuResources {
                draw_ubo,
                bind_group,
            });
        }
    }

    /// Syncs the placement transform, base color and color mode to the GPU.
    pub fn update_draw_uniform(&mut self, queue: &wgpu::Queue, color_mode: ColorMode) {
        if let Some(resources) = &mut self.gpu_resources {
            let uniform = DrawUniform::new(self.placement.model_matrix(), self.base_color, color_mode);
            resources.draw_ubo.update_content(queue, uniform);
        }
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_scene_object(&mut self, object: &'a SceneObject);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let vertex_buffer = match &mesh.vertex_buffer {
            Some(buffer) => buffer,
            None => return, // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.draw(0..mesh.vertex_count, 0..1);
    }

    fn draw_scene_object(&mut self, object: &'b SceneObject) {
        let resources = match &object.gpu_resources {
            Some(resources) => resources,
            None => return,
        };

        self.set_bind_group(1, &resources.bind_group, &[]);
        self.draw_mesh(&object.mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn placement() -> ObjectPlacement {
        ObjectPlacement::new(Vector3::new(2.0, -1.95, 0.0), 1.5, 1.0)
    }

    #[test]
    fn rescale_stays_within_bounds() {
        let mut placement = placement();
        for _ in 0..100 {
            placement.rescale(5.0);
        }
        assert!(placement.scale <= SCALE_MAX);
        assert_eq!(placement.scale, SCALE_MAX);

        for _ in 0..100 {
            placement.rescale(-5.0);
        }
        assert_eq!(placement.scale, SCALE_MIN);
    }

    #[test]
    fn rescale_is_exponential_per_detent() {
        let mut placement = placement();
        placement.rescale(1.0);
        assert_relative_eq!(placement.scale, 1.1);
        placement.rescale(-1.0);
        assert_relative_eq!(placement.scale, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn radii_scale_with_the_object() {
        let mut placement = placement();
        placement.scale = 2.0;
        assert_relative_eq!(placement.footprint_radius(), 1.5);
        assert_relative_eq!(placement.picking_radius(), 2.0);
    }

    #[test]
    fn model_matrix_scales_then_translates() {
        let mut placement = placement();
        placement.scale = 2.0;
        let transformed = placement.model_matrix() * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(
            transformed.truncate(),
            Vector3::new(2.0, 0.05, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn mesh_defaults_missing_attributes() {
        let geometry = GeometryData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: Vec::new(),
        };
        let mesh = Mesh::new(&geometry);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(!mesh.is_uploaded());
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
    }
}
