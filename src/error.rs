//! Error taxonomy of the scene.
//!
//! Three failure classes exist and each one is handled differently:
//!
//! - [`AssetLoadError`] is recoverable; the overlay offers a retry.
//! - [`SceneGraphIntegrityError`] is fatal for the bundle that raised it and is
//!   reported as soon as the bundle finished loading.
//! - [`ShaderCompileError`] is raised before a WGSL module reaches the device.

use thiserror::Error;

/// A texture, model or audio clip could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to fetch `{path}`: {reason}")]
    Fetch { path: String, reason: String },
    #[error("`{path}` is not a readable image")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("`{path}` is not a valid glTF bundle")]
    Gltf {
        path: String,
        #[source]
        source: gltf::Error,
    },
}

impl AssetLoadError {
    pub fn fetch(path: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The asset path the failure belongs to.
    pub fn path(&self) -> &str {
        match self {
            Self::Fetch { path, .. } | Self::Decode { path, .. } | Self::Gltf { path, .. } => path,
        }
    }
}

/// A loaded bundle lacks nodes its manifest requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bundle `{bundle}` is missing required node(s): {}", missing.join(", "))]
pub struct SceneGraphIntegrityError {
    pub bundle: String,
    pub missing: Vec<String>,
}

/// A WGSL program was rejected by the shader front-end or validator.
#[derive(Debug, Clone, Error)]
#[error("shader `{label}` failed to compile:\n{message}")]
pub struct ShaderCompileError {
    pub label: String,
    pub message: String,
}
