use anyhow::Context;
use glam::{Mat4, Vec3};
use vela_engine::assets::{ShaderLoader, TextureLoader};
use vela_engine::camera::{CameraState, FpsCamera};
use vela_engine::core::{App, AppControl, FrameCtx, InitCtx};
use vela_engine::device::PrimitiveMode;
use vela_engine::input::{Key, MouseButton};
use vela_engine::material::{DrawContext, Material, MaterialKind};
use vela_engine::scene::{primitives, DirLight, Mesh, Model};

use crate::Args;

const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
const CAMERA_SPEED: f32 = 25.0;

pub struct Viewer {
    args: Args,
    scene: Option<Scene>,
}

enum Content {
    Model { model: Model, transform: Mat4 },
    /// Shown when no scene file was given.
    Demo { floor: Mesh, cube: Mesh },
}

struct Scene {
    camera: FpsCamera,
    sun: [DirLight; 1],
    material: Material,
    content: Content,
    // Caches stay alive for the whole run so reloads hit them.
    _shaders: ShaderLoader,
    _textures: TextureLoader,
}

impl Viewer {
    pub fn new(args: Args) -> Self {
        Self { args, scene: None }
    }
}

fn sun() -> DirLight {
    let angle = (-60.0f32).to_radians();
    DirLight {
        ambient: Vec3::splat(0.2),
        diffuse: Vec3::ONE,
        specular: Vec3::ONE,
        direction: Vec3::new(angle.cos(), angle.sin(), 0.0),
        intensity: 0.5,
    }
}

impl App for Viewer {
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> anyhow::Result<()> {
        let mut shaders = ShaderLoader::new(ctx.gpu);
        let mut textures = TextureLoader::new(ctx.gpu);

        let (kind, content) = match &self.args.scene {
            Some(path) => {
                let model = Model::load(ctx.gpu, path, &mut textures)
                    .with_context(|| format!("loading scene {}", path.display()))?;
                log::info!(
                    "scene {} has {} meshes, {} textures [{} bytes]",
                    path.display(),
                    model.meshes().len(),
                    textures.len(),
                    textures.total_bytes_loaded()
                );
                let transform = Mat4::from_scale(Vec3::splat(self.args.scale));
                (MaterialKind::PhongTextured, Content::Model { model, transform })
            }
            None => {
                let floor = primitives::quad(ctx.gpu).context("building floor")?;
                let cube = primitives::cube(ctx.gpu).context("building cube")?;
                (MaterialKind::Phong, Content::Demo { floor, cube })
            }
        };

        let mut material = Material::new(kind, &mut shaders, &self.args.shaders)
            .with_context(|| format!("building {kind} material from {}", self.args.shaders.display()))?;
        material.params.shininess = 32.0;

        let (w, h) = ctx.framebuffer_size;
        let mut camera = FpsCamera::new(w as f32, h as f32);
        camera.speed = CAMERA_SPEED;

        self.scene = Some(Scene {
            camera,
            sun: [sun()],
            material,
            content,
            _shaders: shaders,
            _textures: textures,
        });
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.camera.set_viewport(width as f32, height as f32);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> anyhow::Result<AppControl> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(AppControl::Continue);
        };

        if ctx.input_frame.key_pressed(Key::Escape) {
            return Ok(AppControl::Exit);
        }

        if ctx.input_frame.button_pressed(MouseButton::Right) {
            let look = !ctx.runtime.cursor_captured();
            ctx.runtime.capture_cursor(look);
            scene.camera.active = look;
            if !look {
                scene.camera.state = CameraState::default();
            }
        }

        scene.steer(ctx);

        ctx.clear(CLEAR_COLOR);
        scene.draw()?;
        Ok(AppControl::Continue)
    }
}

impl Scene {
    fn steer(&mut self, ctx: &FrameCtx<'_>) {
        let camera = &mut self.camera;
        for key in &ctx.input_frame.keys_pressed {
            camera.handle_key(*key, true);
        }
        for key in &ctx.input_frame.keys_released {
            camera.handle_key(*key, false);
        }

        let (x, y) = ctx.input.look_pos;
        camera.orient(x, y);

        if ctx.input_frame.scroll_lines != 0.0 {
            camera.zoom(ctx.input_frame.scroll_lines);
        }

        camera.update(ctx.time.dt);
    }

    fn draw(&self) -> anyhow::Result<()> {
        self.material.use_material();
        let result = match &self.content {
            Content::Model { model, transform } => {
                self.draw_with(*transform, |mode| model.draw(mode))
            }
            Content::Demo { floor, cube } => {
                let floor_transform = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))
                    * Mat4::from_rotation_x((-90.0f32).to_radians())
                    * Mat4::from_scale(Vec3::splat(20.0));
                self.draw_with(floor_transform, |mode| floor.draw(mode))
                    .and_then(|()| self.draw_with(Mat4::IDENTITY, |mode| cube.draw(mode)))
            }
        };
        self.material.halt();
        result
    }

    fn draw_with(&self, transform: Mat4, draw: impl FnOnce(PrimitiveMode)) -> anyhow::Result<()> {
        let camera = &self.camera;
        let ctx = DrawContext::new(camera.projection(), camera.view(), transform, camera.position)
            .with_lights(&self.sun, &[], &[]);
        self.material
            .update(&ctx)
            .with_context(|| format!("updating {} material", self.material.kind()))?;
        draw(PrimitiveMode::Triangles);
        Ok(())
    }
}
