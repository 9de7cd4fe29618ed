use crate::domain::Topic;
use thiserror::Error;

/// Errors that can occur during pub/sub operations
#[derive(Error, Debug)]
pub enum Error {
    /// `subscribe` called for a topic that already has a handler
    #[error("topic already has a handler: {0}")]
    DuplicateTopic(Topic),

    /// `publish` attempted while the client is disconnected
    #[error("client is not connected")]
    NotConnected,

    /// Failure surfaced verbatim from the transport layer
    #[error("transport error: {0}")]
    Transport(String),

    /// A transport subscribe failed while replaying the registry during `start`
    #[error("failed to replay subscription for topic {topic}: {source}")]
    Replay {
        /// Topic whose replay subscribe failed.
        topic: Topic,
        /// The underlying transport error.
        source: Box<Error>,
    },

    /// Malformed connect or bind address rejected by a transport factory
    #[error("invalid endpoint address: {0}")]
    InvalidEndpoint(String),
}

/// Result type alias for pub/sub operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn replay_error_names_the_failing_topic() {
        // ---
        let err = Error::Replay {
            topic: Topic::from("orders"),
            source: Box::new(Error::Transport("socket closed".into())),
        };

        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("socket closed"));
    }
}
