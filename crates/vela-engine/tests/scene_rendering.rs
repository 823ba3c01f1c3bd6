//! Loads a glTF scene from disk and draws it with a textured Phong material,
//! checking what reaches the (headless) driver.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use vela_engine::assets::{ShaderLoader, TextureLoader};
use vela_engine::device::{Gpu, PrimitiveMode, UniformValue};
use vela_engine::material::{DrawContext, Material, MaterialKind, SHADER_DIR};
use vela_engine::scene::{DirLight, Model, PointLight};
use vela_engine::Error;

/// A textured triangle referenced by two nodes, next to a 2x2 PNG.
fn write_scene(dir: &Path) -> PathBuf {
    image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]))
        .save(dir.join("albedo.png"))
        .unwrap();

    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let normals: [[f32; 3]; 3] = [[0.0, 0.0, 1.0]; 3];
    let indices: [u32; 3] = [0, 1, 2];

    let mut bin = Vec::new();
    bin.extend_from_slice(bytemuck::cast_slice(&positions));
    bin.extend_from_slice(bytemuck::cast_slice(&normals));
    bin.extend_from_slice(bytemuck::cast_slice(&indices));
    std::fs::write(dir.join("scene.bin"), &bin).unwrap();

    let json = format!(
        r#"{{
            "asset": {{ "version": "2.0" }},
            "scene": 0,
            "scenes": [ {{ "nodes": [0, 1] }} ],
            "nodes": [ {{ "mesh": 0 }}, {{ "mesh": 0 }} ],
            "meshes": [ {{ "primitives": [ {{
                "attributes": {{ "POSITION": 0, "NORMAL": 1 }},
                "indices": 2,
                "material": 0
            }} ] }} ],
            "materials": [ {{ "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }} ],
            "textures": [ {{ "source": 0 }} ],
            "images": [ {{ "uri": "albedo.png" }} ],
            "buffers": [ {{ "uri": "scene.bin", "byteLength": {len} }} ],
            "bufferViews": [
                {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
                {{ "buffer": 0, "byteOffset": 36, "byteLength": 36 }},
                {{ "buffer": 0, "byteOffset": 72, "byteLength": 12 }}
            ],
            "accessors": [
                {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                   "min": [0, 0, 0], "max": [1, 1, 0] }},
                {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" }},
                {{ "bufferView": 2, "componentType": 5125, "count": 3, "type": "SCALAR" }}
            ]
        }}"#,
        len = bin.len()
    );
    let path = dir.join("scene.gltf");
    std::fs::write(&path, json).unwrap();
    path
}

// ── loading ───────────────────────────────────────────────────────────────

#[test]
fn shared_texture_is_loaded_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scene(dir.path());
    let (gpu, probe) = Gpu::headless();
    let mut textures = TextureLoader::new(&gpu);

    let model = Model::load(&gpu, &path, &mut textures).unwrap();

    assert_eq!(model.meshes().len(), 2);
    assert_eq!(textures.len(), 1);
    assert_eq!(textures.total_bytes_loaded(), 2 * 2 * 4);
    assert_eq!(probe.live_textures(), 1);
    assert!(Model::load(&gpu, &path, &mut textures).is_ok());
    assert_eq!(textures.total_bytes_loaded(), 2 * 2 * 4);
}

#[test]
fn missing_texture_fails_the_whole_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scene(dir.path());
    std::fs::remove_file(dir.path().join("albedo.png")).unwrap();
    let (gpu, probe) = Gpu::headless();
    let mut textures = TextureLoader::new(&gpu);

    let err = Model::load(&gpu, &path, &mut textures).unwrap_err();

    assert!(matches!(err, Error::Decode { .. }), "{err}");
    assert_eq!(probe.live_buffers(), 0);
}

// ── drawing ───────────────────────────────────────────────────────────────

#[test]
fn textured_phong_draw_binds_units_and_writes_uniforms() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scene(dir.path());
    let (gpu, probe) = Gpu::headless();
    let mut shaders = ShaderLoader::new(&gpu);
    let mut textures = TextureLoader::new(&gpu);

    let model = Model::load(&gpu, &path, &mut textures).unwrap();
    let material = Material::new(MaterialKind::PhongTextured, &mut shaders, SHADER_DIR).unwrap();

    let sun = [DirLight::default()];
    let lamps = [PointLight::new(Vec3::new(0.0, 2.0, 0.0), 10.0)];
    let projection = Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let ctx = DrawContext::new(projection, view, Mat4::IDENTITY, Vec3::new(0.0, 0.0, 5.0))
        .with_lights(&sun, &lamps, &[]);

    probe.reset_records();
    material.use_material();
    material.update(&ctx).unwrap();
    model.draw(PrimitiveMode::Triangles);
    material.halt();

    let draws = probe.draws();
    assert_eq!(draws.len(), 2);
    let albedo = model.meshes()[0].textures()[0].handle();
    for draw in &draws {
        assert_eq!(draw.count, 3);
        assert_eq!(draw.program, Some(material.program().handle()));
        assert_eq!(draw.textures.get(&0), Some(&albedo));
    }

    let program = material.program().handle();
    assert_eq!(
        probe.uniform_value(program, "uViewPos"),
        Some(UniformValue::Float3([0.0, 0.0, 5.0]))
    );
    assert_eq!(
        probe.uniform_value(program, "uPointLights[0].range"),
        Some(UniformValue::Float1(10.0))
    );
    assert!(probe.bound_textures().is_empty());
    assert!(probe.violations().is_empty());
}

#[test]
fn dropping_everything_releases_every_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scene(dir.path());
    let (gpu, probe) = Gpu::headless();

    {
        let mut shaders = ShaderLoader::new(&gpu);
        let mut textures = TextureLoader::new(&gpu);
        let model = Model::load(&gpu, &path, &mut textures).unwrap();
        let material = Material::new(MaterialKind::PhongTextured, &mut shaders, SHADER_DIR).unwrap();
        assert!(probe.live_objects() > 0);

        // Caches cleared first: the model and material still hold their Rcs.
        shaders.clear();
        textures.clear();
        assert_eq!(probe.live_textures(), 1);
        assert_eq!(probe.live_shaders(), 2);

        drop(model);
        drop(material);
    }

    assert_eq!(probe.live_objects(), 0);
    assert!(probe.violations().is_empty());
}
