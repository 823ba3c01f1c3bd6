use std::fmt;
use std::rc::Rc;

use crate::device::{GlHandle, Gpu, ShaderStage};
use crate::error::{Error, Result};

/// Compiled shader stage.
///
/// Construction compiles immediately; a `Shader` value always holds a
/// successfully compiled object.
pub struct Shader {
    gpu: Rc<Gpu>,
    handle: GlHandle,
    stage: ShaderStage,
    source: String,
}

impl Shader {
    /// Compiles `source` as a `stage` shader.
    ///
    /// Fails with [`Error::Compile`] carrying the driver's info log.
    pub fn new(gpu: &Rc<Gpu>, stage: ShaderStage, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let api = gpu.api();

        let handle = api.create_shader(stage)?;
        api.shader_source(handle, &source);
        api.compile_shader(handle);

        if !api.shader_compile_status(handle) {
            let log = api.shader_info_log(handle);
            api.delete_shader(handle);
            return Err(Error::Compile { stage, log });
        }

        log::debug!("{stage} shader {handle} compiled");

        Ok(Self {
            gpu: Rc::clone(gpu),
            handle,
            stage,
            source,
        })
    }

    /// Compiles the same source into a new native object.
    pub fn duplicate(&self) -> Result<Self> {
        Self::new(&self.gpu, self.stage, self.source.clone())
    }

    #[inline]
    pub fn handle(&self) -> GlHandle {
        self.handle
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Full source text, including any preamble added by the loader.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.gpu.api().delete_shader(self.handle);
        log::debug!("{} shader {} released", self.stage, self.handle);
    }
}

impl PartialEq for Shader {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Shader {}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("handle", &self.handle)
            .field("stage", &self.stage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;

    #[test]
    fn compiles_valid_source() {
        let (gpu, probe) = Gpu::headless();
        let shader = Shader::new(&gpu, ShaderStage::Vertex, "void main() {}").unwrap();

        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert_eq!(probe.shader_source(shader.handle()).as_deref(), Some("void main() {}"));
    }

    #[test]
    fn invalid_source_fails_with_driver_log() {
        let (gpu, probe) = Gpu::headless();
        let err = Shader::new(&gpu, ShaderStage::Fragment, "void main() {\n#error unexpected token\n}")
            .unwrap_err();

        assert_eq!(err.severity(), Severity::Unexpected);
        match err {
            Error::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("unexpected token"), "log: {log}");
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        // Nothing half-built survives.
        assert_eq!(probe.live_shaders(), 0);
    }

    #[test]
    fn duplicate_recompiles() {
        let (gpu, probe) = Gpu::headless();
        let a = Shader::new(&gpu, ShaderStage::Vertex, "void main() {}").unwrap();
        let b = a.duplicate().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.source(), b.source());
        assert_eq!(probe.live_shaders(), 2);
    }
}
