use std::io;

/// Setup and lifecycle failures. Anything in here surfaces before the loops
/// start (or when joining them); faults inside a running loop are logged and
/// counted instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to open inbound region '{path}'")]
    OpenSource {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to create outbound region '{path}'")]
    CreateSink {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn thread '{name}'")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("pipeline task '{0}' panicked")]
    TaskPanicked(String),
}
