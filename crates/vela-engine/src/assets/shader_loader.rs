use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::device::{Gpu, ShaderStage};
use crate::error::Result;
use crate::resources::Shader;

use super::io::read_source;

/// Version directive placed before every loaded shader source.
pub const SHADER_VERSION: &str = "#version 400 core";

/// Cache of compiled shaders keyed by `(path, stage)`.
///
/// One file may hold several stages guarded by `#ifdef VERTEX_SHADER` /
/// `#ifdef FRAGMENT_SHADER`; each stage compiles once and is shared through
/// `Rc` by every program that links it.
pub struct ShaderLoader {
    gpu: Rc<Gpu>,
    shaders: HashMap<(PathBuf, ShaderStage), Rc<Shader>>,
}

impl ShaderLoader {
    pub fn new(gpu: &Rc<Gpu>) -> Self {
        Self {
            gpu: Rc::clone(gpu),
            shaders: HashMap::new(),
        }
    }

    /// Returns the cached shader for `(path, stage)`, compiling it on a miss.
    ///
    /// A failed compile is not cached; the next call tries again from disk.
    pub fn load(&mut self, stage: ShaderStage, path: impl AsRef<Path>) -> Result<Rc<Shader>> {
        let key = (path.as_ref().to_path_buf(), stage);
        if let Some(shader) = self.shaders.get(&key) {
            return Ok(Rc::clone(shader));
        }

        let source = read_source(&key.0)?;
        let shader = Rc::new(Shader::new(&self.gpu, stage, preamble(stage) + &source)?);
        log::info!("loaded shader {} ({stage})", key.0.display());

        self.shaders.insert(key, Rc::clone(&shader));
        Ok(shader)
    }

    pub fn gpu(&self) -> &Rc<Gpu> {
        &self.gpu
    }

    pub fn contains(&self, stage: ShaderStage, path: impl AsRef<Path>) -> bool {
        self.shaders
            .contains_key(&(path.as_ref().to_path_buf(), stage))
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Drops every cached entry. Shaders still linked into a live program stay
    /// alive through that program.
    pub fn clear(&mut self) {
        log::info!("clearing {} cached shaders", self.shaders.len());
        self.shaders.clear();
    }
}

/// `#version` line followed by the stage define.
fn preamble(stage: ShaderStage) -> String {
    format!("{SHADER_VERSION}\n#define {}\n", stage.define())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    const SOURCE: &str = "#ifdef VERTEX_SHADER\nvoid main() {}\n#endif\n";

    fn fixture(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.glsl");
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    // ── caching ───────────────────────────────────────────────────────────

    #[test]
    fn same_key_returns_same_shader() {
        let (gpu, probe) = Gpu::headless();
        let (_dir, path) = fixture(SOURCE);
        let mut loader = ShaderLoader::new(&gpu);

        let a = loader.load(ShaderStage::Vertex, &path).unwrap();
        let b = loader.load(ShaderStage::Vertex, &path).unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(loader.len(), 1);
        assert_eq!(probe.live_shaders(), 1);
    }

    #[test]
    fn stage_is_part_of_the_key() {
        let (gpu, _probe) = Gpu::headless();
        let (_dir, path) = fixture(SOURCE);
        let mut loader = ShaderLoader::new(&gpu);

        let vs = loader.load(ShaderStage::Vertex, &path).unwrap();
        let fs = loader.load(ShaderStage::Fragment, &path).unwrap();

        assert!(!Rc::ptr_eq(&vs, &fs));
        assert!(loader.contains(ShaderStage::Fragment, &path));
        assert_eq!(loader.len(), 2);
    }

    // ── preamble ──────────────────────────────────────────────────────────

    #[test]
    fn prepends_version_and_stage_define() {
        let (gpu, _probe) = Gpu::headless();
        let (_dir, path) = fixture(SOURCE);
        let mut loader = ShaderLoader::new(&gpu);

        let fs = loader.load(ShaderStage::Fragment, &path).unwrap();
        assert!(fs
            .source()
            .starts_with("#version 400 core\n#define FRAGMENT_SHADER\n#ifdef VERTEX_SHADER"));
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn failures_are_not_cached() {
        let (gpu, _probe) = Gpu::headless();
        let (_dir, path) = fixture("#error broken\n");
        let mut loader = ShaderLoader::new(&gpu);

        assert!(matches!(
            loader.load(ShaderStage::Vertex, &path),
            Err(Error::Compile { .. })
        ));
        assert!(loader.is_empty());

        std::fs::write(&path, SOURCE).unwrap();
        assert!(loader.load(ShaderStage::Vertex, &path).is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let (gpu, _probe) = Gpu::headless();
        let mut loader = ShaderLoader::new(&gpu);

        let err = loader.load(ShaderStage::Vertex, "does/not/exist.glsl").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn clear_keeps_shared_shaders_alive() {
        let (gpu, probe) = Gpu::headless();
        let (_dir, path) = fixture(SOURCE);
        let mut loader = ShaderLoader::new(&gpu);

        let held = loader.load(ShaderStage::Vertex, &path).unwrap();
        loader.load(ShaderStage::Fragment, &path).unwrap();
        loader.clear();

        assert!(loader.is_empty());
        assert_eq!(probe.live_shaders(), 1);
        drop(held);
        assert_eq!(probe.live_shaders(), 0);
    }
}
