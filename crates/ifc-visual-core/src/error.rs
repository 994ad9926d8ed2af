// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the visual lifecycle

use crate::render_loop::LoopState;
use thiserror::Error;

/// Result type alias for visual operations
pub type Result<T> = std::result::Result<T, VisualError>;

/// Errors raised while constructing or driving the visual
#[derive(Error, Debug)]
pub enum VisualError {
    /// The host factory could not produce a visual instance
    #[error("Visual instance not found")]
    InstanceNotFound,

    /// A required DOM element or host field is missing
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// The graphics context could not be created
    #[error("Graphics context unavailable: {0}")]
    Context(String),

    /// Shader compilation or program linking failed
    #[error("Shader error: {0}")]
    Shader(String),

    /// The scene graph violates a construction invariant
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// The render loop was asked for an illegal transition
    #[error("Render loop cannot start from state {0:?}")]
    LoopState(LoopState),

    /// IFC content could not be turned into a model
    #[error("IFC load failed: {0}")]
    Load(String),

    /// Configuration JSON was malformed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration value is outside its usable range
    #[error("Invalid configuration value: {0}")]
    ConfigValue(String),
}

impl VisualError {
    /// Create a missing element error
    pub fn missing(what: impl Into<String>) -> Self {
        VisualError::MissingElement(what.into())
    }

    /// Create a graphics context error
    pub fn context(msg: impl Into<String>) -> Self {
        VisualError::Context(msg.into())
    }

    /// Create a shader error
    pub fn shader(msg: impl Into<String>) -> Self {
        VisualError::Shader(msg.into())
    }

    /// Create a configuration value error
    pub fn config_value(msg: impl Into<String>) -> Self {
        VisualError::ConfigValue(msg.into())
    }

    /// Create a load error
    pub fn load(msg: impl Into<String>) -> Self {
        VisualError::Load(msg.into())
    }
}

/// Errors reported by a single frame's draw
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The draw call failed; the context is still usable
    #[error("Draw failed: {0}")]
    Draw(String),

    /// The graphics context was lost by the browser
    #[error("Graphics context lost")]
    ContextLost,
}

impl RenderError {
    /// Create a draw error
    pub fn draw(msg: impl Into<String>) -> Self {
        RenderError::Draw(msg.into())
    }
}
