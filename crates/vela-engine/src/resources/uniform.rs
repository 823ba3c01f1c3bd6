//! Uniform value protocol.
//!
//! Everything that can be written with [`Program::uniform`] implements
//! [`Uniform`]. Scalars, vectors and matrices flatten to a single native write;
//! aggregates expand into several writes using the naming contract shared with
//! shader sources:
//!
//! - struct members: `name.field`
//! - array elements: `name[index].field`

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::device::UniformValue;
use crate::error::Result;

use super::program::Program;

/// A value that knows how to write itself into a program's uniforms.
pub trait Uniform {
    fn write(&self, program: &Program, name: &str) -> Result<()>;
}

macro_rules! impl_uniform {
    ($($ty:ty => |$v:ident| $value:expr;)*) => {
        $(
            impl Uniform for $ty {
                fn write(&self, program: &Program, name: &str) -> Result<()> {
                    let $v = self;
                    program.set(name, $value)
                }
            }
        )*
    };
}

impl_uniform! {
    f32 => |v| UniformValue::Float1(*v);
    [f32; 1] => |v| UniformValue::Float1(v[0]);
    [f32; 2] => |v| UniformValue::Float2(*v);
    [f32; 3] => |v| UniformValue::Float3(*v);
    [f32; 4] => |v| UniformValue::Float4(*v);

    i32 => |v| UniformValue::Int1(*v);
    [i32; 1] => |v| UniformValue::Int1(v[0]);
    [i32; 2] => |v| UniformValue::Int2(*v);
    [i32; 3] => |v| UniformValue::Int3(*v);
    [i32; 4] => |v| UniformValue::Int4(*v);

    bool => |v| UniformValue::Int1(i32::from(*v));

    Vec2 => |v| UniformValue::Float2(v.to_array());
    Vec3 => |v| UniformValue::Float3(v.to_array());
    Vec4 => |v| UniformValue::Float4(v.to_array());

    IVec2 => |v| UniformValue::Int2(v.to_array());
    IVec3 => |v| UniformValue::Int3(v.to_array());
    IVec4 => |v| UniformValue::Int4(v.to_array());

    Mat2 => |v| UniformValue::Mat2(v.to_cols_array());
    Mat3 => |v| UniformValue::Mat3(v.to_cols_array());
    Mat4 => |v| UniformValue::Mat4(v.to_cols_array());
}

/// Element of a fixed-capacity uniform array of structs (light lists).
pub trait ArrayElement {
    /// Maximum number of elements the shader-side array holds.
    const CAPACITY: usize;

    /// Writes every field under `prefix`, which is `name[index]`.
    fn write_fields(&self, program: &Program, prefix: &str) -> Result<()>;
}

/// Writes up to `L::CAPACITY` elements; anything past capacity is ignored.
impl<L: ArrayElement> Uniform for [L] {
    fn write(&self, program: &Program, name: &str) -> Result<()> {
        for (i, element) in self.iter().take(L::CAPACITY).enumerate() {
            element.write_fields(program, &format!("{name}[{i}]"))?;
        }
        Ok(())
    }
}

impl<L: ArrayElement> Uniform for Vec<L> {
    fn write(&self, program: &Program, name: &str) -> Result<()> {
        self.as_slice().write(program, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::device::{Gpu, HeadlessProbe, ShaderStage};
    use crate::resources::Shader;

    const SOURCE: &str = "
        struct Item { float weight; vec3 color; };
        uniform float uScalar;
        uniform ivec3 uCells;
        uniform bool uFlag;
        uniform mat3 uBasis;
        uniform Item uItems[2];
        void main() {}
    ";

    struct Item {
        weight: f32,
        color: Vec3,
    }

    impl ArrayElement for Item {
        const CAPACITY: usize = 2;

        fn write_fields(&self, program: &Program, prefix: &str) -> Result<()> {
            program.uniform(&format!("{prefix}.weight"), &self.weight)?;
            program.uniform(&format!("{prefix}.color"), &self.color)
        }
    }

    fn program() -> (Program, HeadlessProbe) {
        let (gpu, probe) = Gpu::headless();
        let shaders = [
            Rc::new(Shader::new(&gpu, ShaderStage::Vertex, SOURCE).unwrap()),
            Rc::new(Shader::new(&gpu, ShaderStage::Fragment, SOURCE).unwrap()),
        ];
        let program = Program::new(&gpu, &shaders).unwrap();
        program.use_program();
        (program, probe)
    }

    // ── scalars ───────────────────────────────────────────────────────────

    #[test]
    fn scalars_flatten_to_single_writes() {
        let (program, probe) = program();

        program.uniform("uScalar", &0.5f32).unwrap();
        program.uniform("uCells", &IVec3::new(1, 2, 3)).unwrap();
        program.uniform("uFlag", &true).unwrap();
        program.uniform("uBasis", &Mat3::IDENTITY).unwrap();

        let h = program.handle();
        assert_eq!(probe.uniform_value(h, "uScalar"), Some(UniformValue::Float1(0.5)));
        assert_eq!(probe.uniform_value(h, "uCells"), Some(UniformValue::Int3([1, 2, 3])));
        assert_eq!(probe.uniform_value(h, "uFlag"), Some(UniformValue::Int1(1)));
        assert_eq!(
            probe.uniform_value(h, "uBasis"),
            Some(UniformValue::Mat3(Mat3::IDENTITY.to_cols_array()))
        );
    }

    // ── arrays ────────────────────────────────────────────────────────────

    #[test]
    fn array_elements_use_positional_names() {
        let (program, probe) = program();
        let items = vec![
            Item { weight: 1.0, color: Vec3::X },
            Item { weight: 2.0, color: Vec3::Y },
        ];

        program.uniform("uItems", &items).unwrap();

        let names: Vec<String> = probe.uniform_writes().into_iter().map(|w| w.name).collect();
        assert_eq!(
            names,
            vec!["uItems[0].weight", "uItems[0].color", "uItems[1].weight", "uItems[1].color"]
        );
    }

    #[test]
    fn array_past_capacity_is_truncated() {
        let (program, probe) = program();
        let items: Vec<Item> = (0..5)
            .map(|i| Item {
                weight: i as f32,
                color: Vec3::ZERO,
            })
            .collect();

        program.uniform("uItems", items.as_slice()).unwrap();

        assert_eq!(probe.uniform_writes().len(), 2 * 2);
        assert!(probe.violations().is_empty());
    }
}
