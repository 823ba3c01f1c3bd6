use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::device::{GlHandle, Gpu, UniformLocation, UniformValue};
use crate::error::{Error, Result};

use super::shader::Shader;
use super::uniform::Uniform;

/// Linked GPU program.
///
/// Construction attaches the given shaders and links immediately; a `Program`
/// value is always fully linked. Shaders are shared (`Rc`) with the loader cache
/// and other programs, so they stay alive at least as long as this program.
///
/// Uniform locations are resolved lazily and cached for the program's lifetime.
pub struct Program {
    gpu: Rc<Gpu>,
    handle: GlHandle,
    shaders: Vec<Rc<Shader>>,
    uniforms: RefCell<HashMap<String, UniformLocation>>,
}

impl Program {
    /// Links `shaders` into a new program.
    ///
    /// Fails with [`Error::Link`] carrying the driver's info log.
    pub fn new(gpu: &Rc<Gpu>, shaders: &[Rc<Shader>]) -> Result<Self> {
        let api = gpu.api();

        let handle = api.create_program()?;
        for shader in shaders {
            api.attach_shader(handle, shader.handle());
        }
        api.link_program(handle);

        if !api.program_link_status(handle) {
            let log = api.program_info_log(handle);
            api.delete_program(handle);
            return Err(Error::Link { log });
        }

        log::debug!("program {handle} linked from {} shaders", shaders.len());

        Ok(Self {
            gpu: Rc::clone(gpu),
            handle,
            shaders: shaders.to_vec(),
            uniforms: RefCell::new(HashMap::new()),
        })
    }

    /// Links the same shaders into a new native program.
    ///
    /// Every name resolved by `self` is resolved again against the copy, so
    /// both programs answer uniform lookups identically.
    pub fn duplicate(&self) -> Result<Self> {
        let copy = Self::new(&self.gpu, &self.shaders)?;
        let names: Vec<String> = self.uniforms.borrow().keys().cloned().collect();
        for name in names {
            copy.find_uniform(&name)?;
        }
        Ok(copy)
    }

    #[inline]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    pub fn shaders(&self) -> &[Rc<Shader>] {
        &self.shaders
    }

    /// Makes this the current program.
    pub fn use_program(&self) {
        self.gpu.api().use_program(Some(self.handle));
    }

    /// Clears the current program.
    pub fn halt(&self) {
        self.gpu.api().use_program(None);
    }

    /// Resolves a uniform location, consulting the cache first.
    ///
    /// A name that is not an active uniform fails with
    /// [`Error::UniformNotFound`] on every call; misses are never cached.
    pub fn find_uniform(&self, name: &str) -> Result<UniformLocation> {
        if let Some(location) = self.uniforms.borrow().get(name) {
            return Ok(*location);
        }

        let location = self
            .gpu
            .api()
            .uniform_location(self.handle, name)
            .ok_or_else(|| Error::UniformNotFound {
                name: name.to_string(),
            })?;

        self.uniforms
            .borrow_mut()
            .insert(name.to_string(), location);
        Ok(location)
    }

    /// Number of cached uniform locations.
    pub fn uniform_cache_len(&self) -> usize {
        self.uniforms.borrow().len()
    }

    /// Writes `value` to the uniform `name`. The program must be in use.
    ///
    /// Aggregates (light lists, material properties) expand to several writes
    /// named `name[i].field` or `name.field`.
    pub fn uniform<T>(&self, name: &str, value: &T) -> Result<()>
    where
        T: Uniform + ?Sized,
    {
        value.write(self, name)
    }

    /// Writes a single pre-flattened value.
    pub fn set(&self, name: &str, value: UniformValue) -> Result<()> {
        let location = self.find_uniform(name)?;
        self.gpu.api().uniform(location, value);
        Ok(())
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.gpu.api().delete_program(self.handle);
        log::debug!("program {} released", self.handle);
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Program {}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("handle", &self.handle)
            .field("shaders", &self.shaders.len())
            .field("cached_uniforms", &self.uniforms.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ShaderStage;
    use crate::error::Severity;

    const VS: &str = "uniform mat4 uPVM;\nvoid main() {}";
    const FS: &str = "uniform vec4 uColor;\nvoid main() {}";

    fn shaders(gpu: &Rc<Gpu>) -> Vec<Rc<Shader>> {
        vec![
            Rc::new(Shader::new(gpu, ShaderStage::Vertex, VS).unwrap()),
            Rc::new(Shader::new(gpu, ShaderStage::Fragment, FS).unwrap()),
        ]
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn links_and_keeps_shaders() {
        let (gpu, _probe) = Gpu::headless();
        let shaders = shaders(&gpu);
        let program = Program::new(&gpu, &shaders).unwrap();

        assert_eq!(program.shaders().len(), 2);
        assert_eq!(Rc::strong_count(&shaders[0]), 2);
    }

    #[test]
    fn link_failure_carries_log() {
        let (gpu, probe) = Gpu::headless();
        let vs = Rc::new(Shader::new(&gpu, ShaderStage::Vertex, VS).unwrap());

        let err = Program::new(&gpu, &[vs]).unwrap_err();
        match err {
            Error::Link { log } => assert!(log.contains("no fragment shader"), "log: {log}"),
            other => panic!("expected link error, got {other:?}"),
        }
        assert_eq!(probe.live_programs(), 0);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn find_uniform_caches_locations() {
        let (gpu, probe) = Gpu::headless();
        let program = Program::new(&gpu, &shaders(&gpu)).unwrap();

        let a = program.find_uniform("uPVM").unwrap();
        let queries = probe.location_queries();
        let b = program.find_uniform("uPVM").unwrap();

        assert_eq!(a, b);
        assert_eq!(probe.location_queries(), queries);
        assert_eq!(program.uniform_cache_len(), 1);
    }

    #[test]
    fn missing_uniform_fails_every_time() {
        let (gpu, _probe) = Gpu::headless();
        let program = Program::new(&gpu, &shaders(&gpu)).unwrap();

        for _ in 0..3 {
            let err = program.find_uniform("uTypo").unwrap_err();
            assert_eq!(err.severity(), Severity::Unexpected);
            assert!(matches!(err, Error::UniformNotFound { ref name } if name == "uTypo"));
        }
        assert_eq!(program.uniform_cache_len(), 0);
    }

    #[test]
    fn set_writes_to_current_program() {
        let (gpu, probe) = Gpu::headless();
        let program = Program::new(&gpu, &shaders(&gpu)).unwrap();

        program.use_program();
        program.set("uColor", UniformValue::Float4([1.0, 0.0, 0.0, 1.0])).unwrap();
        program.halt();

        assert_eq!(
            probe.uniform_value(program.handle(), "uColor"),
            Some(UniformValue::Float4([1.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(probe.current_program(), None);
        assert!(probe.violations().is_empty());
    }

    // ── duplication ───────────────────────────────────────────────────────

    #[test]
    fn duplicate_resolves_same_uniforms() {
        let (gpu, probe) = Gpu::headless();
        let program = Program::new(&gpu, &shaders(&gpu)).unwrap();
        program.find_uniform("uPVM").unwrap();
        program.find_uniform("uColor").unwrap();

        let copy = program.duplicate().unwrap();
        assert_ne!(program, copy);
        assert_eq!(copy.uniform_cache_len(), 2);

        copy.use_program();
        copy.set("uPVM", UniformValue::Mat4([0.0; 16])).unwrap();
        assert!(probe.violations().is_empty());
    }
}
