//! Per-draw color mode selection and the uniform block that carries it.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

use crate::gfx::camera::convert_matrix4_to_array;

/// How the fragment shader colors a draw call.
///
/// `Uniform` uses the base color unmodified; the other modes derive a color
/// from an interpolated attribute mapped into a visible range and blend it
/// with the base color at a fixed 65/35 ratio favoring the attribute.
/// Orthogonal to all other state; switching modes only requests a repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Uniform,
    Position,
    Normal,
    Uv,
    /// Averages the position and normal encodings before the blend.
    PositionNormal,
}

impl ColorMode {
    /// The selector value the shader switches on.
    pub fn shader_index(self) -> u32 {
        match self {
            ColorMode::Uniform => 0,
            ColorMode::Position => 1,
            ColorMode::Normal => 2,
            ColorMode::Uv => 3,
            ColorMode::PositionNormal => 4,
        }
    }
}

/// GPU uniform for one draw call. MUST match `DrawUniform` in shader.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's 3x3, columns padded to vec4 for WGSL
    pub normal_matrix: [[f32; 4]; 3],
    pub base_color: [f32; 4],
    pub color_mode: u32,
    _padding: [f32; 3],
}

impl DrawUniform {
    pub fn new(model: Matrix4<f32>, base_color: [f32; 4], mode: ColorMode) -> Self {
        let linear = Matrix3::from_cols(
            model.x.truncate(),
            model.y.truncate(),
            model.z.truncate(),
        );
        let normal = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix3::identity);

        Self {
            model: convert_matrix4_to_array(model),
            normal_matrix: [
                [normal.x.x, normal.x.y, normal.x.z, 0.0],
                [normal.y.x, normal.y.y, normal.y.z, 0.0],
                [normal.z.x, normal.z.y, normal.z.z, 0.0],
            ],
            base_color,
            color_mode: mode.shader_index(),
            _padding: [0.0; 3],
        }
    }
}

impl Default for DrawUniform {
    fn default() -> Self {
        Self::new(Matrix4::identity(), [0.8, 0.8, 0.8, 1.0], ColorMode::Uniform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shader_indices_are_stable() {
        assert_eq!(ColorMode::Uniform.shader_index(), 0);
        assert_eq!(ColorMode::Position.shader_index(), 1);
        assert_eq!(ColorMode::Normal.shader_index(), 2);
        assert_eq!(ColorMode::Uv.shader_index(), 3);
        assert_eq!(ColorMode::PositionNormal.shader_index(), 4);
    }

    #[test]
    fn normal_matrix_undoes_uniform_scale() {
        let uniform = DrawUniform::new(
            Matrix4::from_scale(2.0),
            [1.0, 1.0, 1.0, 1.0],
            ColorMode::Normal,
        );
        assert_relative_eq!(uniform.normal_matrix[0][0], 0.5);
        assert_relative_eq!(uniform.normal_matrix[1][1], 0.5);
        assert_relative_eq!(uniform.normal_matrix[2][2], 0.5);
    }

    #[test]
    fn uniform_block_size_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 144);
    }
}
