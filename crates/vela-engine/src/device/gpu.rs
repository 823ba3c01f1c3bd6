use std::fmt;
use std::rc::Rc;

use super::backend::Backend;
use super::headless::{HeadlessBackend, HeadlessProbe};
use super::types::{Capability, ClearMask};

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Install the driver debug message callback when the context supports it.
    pub debug_output: bool,

    /// Color used by full-frame clears.
    pub clear_color: [f32; 4],

    pub cull_face: bool,
    pub depth_test: bool,
    pub stencil_test: bool,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            debug_output: cfg!(debug_assertions),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            cull_face: true,
            depth_test: true,
            stencil_test: true,
        }
    }
}

/// Owns the graphics backend for one native context.
///
/// Every GPU resource keeps an `Rc<Gpu>` so that it can release its handle on
/// drop. The context is single-threaded; `Gpu` is intentionally `!Send`.
pub struct Gpu {
    backend: Box<dyn Backend>,
}

impl Gpu {
    /// Wraps a backend bound to a current context.
    pub fn new<B>(backend: B) -> Rc<Self>
    where
        B: Backend + 'static,
    {
        log::debug!("gpu created (backend: {})", backend.name());
        Rc::new(Self {
            backend: Box::new(backend),
        })
    }

    /// Creates a context backed by the in-memory simulation, plus a probe for
    /// inspecting what was issued against it.
    pub fn headless() -> (Rc<Self>, HeadlessProbe) {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        (Self::new(backend), probe)
    }

    /// Direct access to the native API surface.
    #[inline]
    pub fn api(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Applies the fixed-function state described by `init`.
    pub fn configure(&self, init: &GpuInit) {
        let api = self.api();
        api.clear_color(init.clear_color);
        api.set_capability(Capability::CullFace, init.cull_face);
        api.set_capability(Capability::DepthTest, init.depth_test);
        api.set_capability(Capability::StencilTest, init.stencil_test);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.api().viewport(0, 0, width as i32, height as i32);
    }

    /// Clears color, depth and stencil planes.
    pub fn clear_frame(&self) {
        self.api().clear(ClearMask::ALL);
    }
}

impl fmt::Debug for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gpu")
            .field("backend", &self.backend.name())
            .finish()
    }
}
