//! Error types
//!
//! The failure surface is narrow: a host that cannot report a usable size,
//! malformed colors or config files, and frames the surface could not present.

use std::fmt;

/// Container geometry could not be built for the given viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// Viewport has a zero, negative or non-finite dimension.
    InvalidViewport { width: f32, height: f32 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::InvalidViewport { width, height } => {
                write!(f, "Viewport {}x{} is not a positive size", width, height)
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// A color string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Expected `#RRGGBB` or `#RRGGBBAA`.
    BadLength(String),
    /// Non-hex digit in the color string.
    BadDigit(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::BadLength(s) => write!(f, "Color '{}' must be #RRGGBB or #RRGGBBAA", s),
            ColorError::BadDigit(s) => write!(f, "Color '{}' contains a non-hex digit", s),
        }
    }
}

impl std::error::Error for ColorError {}

/// A scene config file could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the file.
    Io(std::io::Error),
    /// File is not a valid scene config.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// A frame could not be presented.
#[derive(Debug)]
pub enum RenderError {
    /// Surface texture unavailable (lost, outdated, timed out...).
    Surface(wgpu::SurfaceError),
    /// Present was called while no surface is attached.
    Detached,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Surface(e) => write!(f, "Surface error: {}", e),
            RenderError::Detached => write!(f, "No display surface attached"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Surface(e) => Some(e),
            RenderError::Detached => None,
        }
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RenderError::Surface(e)
    }
}
