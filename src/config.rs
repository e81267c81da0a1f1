//! Connection configuration.
//!
//! A [`ClientConfig`] is built once, either with the `with_*` builder methods
//! or from a TOML document, and handed to [`Robot::new`](crate::Robot::new).
//! The client never mutates it.
//!
//! # TOML format
//!
//! ```toml
//! robot_model = "Fanuc"
//! host = "192.168.1.100"
//! port = 18735                     # optional, default 18735
//! end_effector_output_kind = "RDO" # optional, "RDO" or "DO"
//! end_effector_output_index = 7    # optional
//! socket_timeout = 5.0             # optional, seconds, default 60
//! revision = "current"             # optional, "current" or "legacy"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RobotError};
use crate::output::{OutputKind, ProtocolRevision};
use crate::transport::{DEFAULT_PORT, DEFAULT_TIMEOUT};

fn default_robot_model() -> String {
    "Fanuc".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Configuration for creating a robot client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Controller family, e.g. `"Fanuc"`. Informational only.
    #[serde(default = "default_robot_model")]
    pub robot_model: String,
    /// Controller hostname or IP address.
    pub host: String,
    /// Controller TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Addressing scheme of the end-effector output, if any.
    #[serde(default)]
    pub end_effector_output_kind: Option<OutputKind>,
    /// Index of the end-effector output, if any.
    #[serde(default)]
    pub end_effector_output_index: Option<u32>,
    /// Timeout applied to connect, every read and every write.
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub socket_timeout: Duration,
    /// Wire-format revision spoken by the controller program.
    #[serde(default)]
    pub revision: ProtocolRevision,
}

impl ClientConfig {
    /// Creates a configuration with default port, timeout and no end-effector output.
    ///
    /// # Example
    ///
    /// ```
    /// use mappdk::ClientConfig;
    ///
    /// let config = ClientConfig::new("Fanuc", "192.168.1.100");
    /// assert_eq!(config.port, 18735);
    /// ```
    pub fn new(robot_model: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            robot_model: robot_model.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            end_effector_output_kind: None,
            end_effector_output_index: None,
            socket_timeout: DEFAULT_TIMEOUT,
            revision: ProtocolRevision::default(),
        }
    }

    /// Sets a custom controller port (default is 18735).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a custom socket timeout (default is 60 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use mappdk::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("Fanuc", "192.168.1.100")
    ///     .with_timeout(Duration::from_secs(5));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    /// Configures the end-effector (gripper) output.
    ///
    /// # Example
    ///
    /// ```
    /// use mappdk::{ClientConfig, OutputKind};
    ///
    /// let config = ClientConfig::new("Fanuc", "192.168.1.100")
    ///     .with_end_effector(OutputKind::Rdo, 7);
    /// ```
    pub fn with_end_effector(mut self, kind: OutputKind, index: u32) -> Self {
        self.end_effector_output_kind = Some(kind);
        self.end_effector_output_index = Some(index);
        self
    }

    /// Selects the wire-format revision.
    pub fn with_revision(mut self, revision: ProtocolRevision) -> Self {
        self.revision = revision;
        self
    }

    /// Returns `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::Config`] if the document is not valid TOML or
    /// does not describe a configuration.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| RobotError::config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RobotError::config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}

/// Durations as (fractional) seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds)
            .map_err(|_| de::Error::custom(format!("invalid duration: {} seconds", seconds)))
    }
}
