//! Engine error type.
//!
//! Every failure carries a [`Severity`] class and the component that produced
//! it. Resource construction never retries: errors surface immediately to the
//! caller, and the runtime is the only place that recovers.

use std::path::PathBuf;

use crate::device::ShaderStage;

/// Recoverability class of an [`Error`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Severity {
    /// The caller could have checked for this before acting.
    Expected,
    /// An internal precondition was violated (missing file, bad shader, ...).
    Unexpected,
    /// The graphics context is unusable; the process should terminate.
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Expected => f.write_str("expected"),
            Severity::Unexpected => f.write_str("unexpected"),
            Severity::Fatal => f.write_str("fatal"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link: {log}")]
    Link { log: String },

    #[error("couldn't find uniform `{name}`")]
    UniformNotFound { name: String },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} could not be loaded: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("{path} is an invalid path")]
    InvalidPath { path: String },

    #[error("unexpected texture count {count} (at most {max} units)")]
    TextureCount { count: usize, max: usize },

    #[error("failed to import {}: {reason}", .path.display())]
    Import { path: PathBuf, reason: String },

    #[error("graphics backend: {0}")]
    Backend(String),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::Backend(_) => Severity::Fatal,
            Error::Compile { .. }
            | Error::Link { .. }
            | Error::UniformNotFound { .. }
            | Error::Io { .. }
            | Error::Decode { .. }
            | Error::InvalidPath { .. }
            | Error::TextureCount { .. }
            | Error::Import { .. } => Severity::Unexpected,
        }
    }

    /// Component that raised the error, for diagnostics.
    pub fn component(&self) -> &'static str {
        match self {
            Error::Compile { .. } => "shader",
            Error::Link { .. } | Error::UniformNotFound { .. } => "program",
            Error::Io { .. } => "io",
            Error::Decode { .. } => "texture",
            Error::InvalidPath { .. } | Error::Import { .. } => "model",
            Error::TextureCount { .. } => "mesh",
            Error::Backend(_) => "device",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_failures_are_unexpected() {
        let e = Error::UniformNotFound { name: "uPVM".into() };
        assert_eq!(e.severity(), Severity::Unexpected);
        assert_eq!(e.component(), "program");
        assert_eq!(e.to_string(), "couldn't find uniform `uPVM`");
    }

    #[test]
    fn backend_failures_are_fatal() {
        let e = Error::Backend("context lost".into());
        assert_eq!(e.severity(), Severity::Fatal);
    }

    #[test]
    fn invalid_path_message() {
        let e = Error::InvalidPath { path: "Sponza.gltf".into() };
        assert_eq!(e.to_string(), "Sponza.gltf is an invalid path");
        assert_eq!(e.severity().to_string(), "unexpected");
    }
}
