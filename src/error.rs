use std::io;
use thiserror::Error;

/// The ROM source could not produce the requested program.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("ROM '{rom}' is not available from this source")]
    NotFound { rom: String },

    #[error("could not read ROM '{rom}': {source}")]
    Io {
        rom: String,
        #[source]
        source: io::Error,
    },
}

/// The machine refused the fetched program bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("program is {size} bytes but only {capacity} bytes of program memory are available")]
    TooLarge { size: usize, capacity: usize },

    #[error("program rejected: {0}")]
    Rejected(String),
}

/// The machine hit an instruction it cannot execute. Not recoverable for the running session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("execution fault at {address:#05x}: unsupported opcode {opcode:#06x}")]
pub struct ExecutionFault {
    pub address: u16,
    pub opcode: u16,
}

/// Everything a load request or an animation frame can surface to the caller.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fault(#[from] ExecutionFault),

    #[error("failed to draw frame: {0}")]
    Render(String),
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("could not access settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("window scale must be at least 1")]
    ZeroScale,

    #[error("window scale {scale} is larger than the maximum of {max}")]
    ScaleTooLarge { scale: u32, max: u32 },

    #[error("ticks_per_frame must be at least 1")]
    ZeroTickBudget,

    #[error("frame_rate must be at least 1")]
    ZeroFrameRate,

    #[error("keypad layout needs exactly 16 keys, found {0}")]
    LayoutLength(usize),

    #[error("key '{key}' is bound to both {first:#x} and {second:#x}")]
    DuplicateBinding { key: String, first: usize, second: usize },
}
