//! Error types for the robot protocol client.

use std::io;
use thiserror::Error;

/// Result type alias for robot operations.
pub type Result<T> = std::result::Result<T, RobotError>;

/// Errors that can occur while talking to a robot controller.
#[derive(Debug, Error)]
pub enum RobotError {
    /// The TCP connection could not be opened or the handshake line was not received.
    #[error("Connection to {address} failed: {source}")]
    Connection {
        /// Address that was being connected to (`host:port`).
        address: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// No response line arrived within the configured socket timeout.
    #[error("Communication timeout")]
    Timeout,

    /// The controller answered with the error code.
    #[error("Controller error: {message}")]
    Protocol {
        /// Message text reported by the controller.
        message: String,
    },

    /// The response line is malformed or carries an unrecognized code.
    #[error("Unknown response: {line:?}")]
    UnknownResponse {
        /// Raw response line, without its terminator.
        line: String,
    },

    /// A caller-supplied value failed local validation.
    #[error("Invalid argument '{parameter}': {reason}")]
    InvalidArgument {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// A digital-output operation was attempted without an output kind or index configured.
    #[error("End-effector output not configured: {reason}")]
    UnconfiguredOutput {
        /// What is missing from the configuration.
        reason: String,
    },

    /// An operation needing a live connection was attempted without one.
    #[error("Not connected to the controller")]
    NotConnected,

    /// `connect` was called while a connection is already open.
    #[error("Already connected to the controller")]
    AlreadyConnected,

    /// A success response carried a message that could not be decoded.
    #[error("Invalid response payload: {reason}")]
    InvalidPayload {
        /// Description of the payload error.
        reason: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the configuration error.
        reason: String,
    },

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RobotError {
    /// Creates a new `Connection` error.
    pub fn connection(address: impl Into<String>, source: io::Error) -> Self {
        Self::Connection {
            address: address.into(),
            source,
        }
    }

    /// Creates a new `Protocol` error.
    ///
    /// # Example
    ///
    /// ```
    /// use mappdk::RobotError;
    ///
    /// let err = RobotError::protocol("Position not reachable");
    /// assert_eq!(err.to_string(), "Controller error: Position not reachable");
    /// ```
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a new `UnknownResponse` error.
    pub fn unknown_response(line: impl Into<String>) -> Self {
        Self::UnknownResponse { line: line.into() }
    }

    /// Creates a new `InvalidArgument` error.
    ///
    /// # Example
    ///
    /// ```
    /// use mappdk::RobotError;
    ///
    /// let err = RobotError::invalid_argument("blend_value", "must be 0-100");
    /// ```
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `UnconfiguredOutput` error.
    pub fn unconfigured_output(reason: impl Into<String>) -> Self {
        Self::UnconfiguredOutput {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidPayload` error.
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            reason: reason.into(),
        }
    }

    /// Creates a new `Config` error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error was raised by local validation, before any
    /// byte was written to the socket.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::UnconfiguredOutput { .. }
                | Self::NotConnected
                | Self::AlreadyConnected
        )
    }

    /// Returns `true` if the error leaves the connection out of step with
    /// the controller: a reply may still be in flight, or the line framing
    /// can no longer be trusted.
    pub fn desynchronizes(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::UnknownResponse { .. } | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        let err = RobotError::protocol("Joint 3 out of range");
        assert_eq!(err.to_string(), "Controller error: Joint 3 out of range");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = RobotError::invalid_argument("velocity", "must not exceed 9999");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'velocity': must not exceed 9999"
        );
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(RobotError::Timeout.to_string(), "Communication timeout");
    }

    #[test]
    fn test_unknown_response_display() {
        let err = RobotError::unknown_response("2:busy");
        assert_eq!(err.to_string(), "Unknown response: \"2:busy\"");
    }

    #[test]
    fn test_connection_display() {
        let err = RobotError::connection(
            "10.0.0.5:18735",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert_eq!(err.to_string(), "Connection to 10.0.0.5:18735 failed: refused");
    }

    #[test]
    fn test_is_local() {
        assert!(RobotError::NotConnected.is_local());
        assert!(RobotError::invalid_argument("x", "y").is_local());
        assert!(RobotError::unconfigured_output("no kind").is_local());
        assert!(!RobotError::Timeout.is_local());
        assert!(!RobotError::protocol("x").is_local());
    }

    #[test]
    fn test_desynchronizes() {
        assert!(RobotError::Timeout.desynchronizes());
        assert!(RobotError::unknown_response("2:???").desynchronizes());
        assert!(RobotError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).desynchronizes());
        assert!(!RobotError::protocol("Position not reachable").desynchronizes());
        assert!(!RobotError::invalid_payload("bad").desynchronizes());
        assert!(!RobotError::NotConnected.desynchronizes());
    }
}
