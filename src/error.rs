// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Unified error types for rr-iops.
//!
//! Every variant except [`Error::Teardown`] is terminal: the workflow stops,
//! tears down the session if one exists, and the process exits with status 1.
//! A teardown failure is only ever logged.

use thiserror::Error;

/// The main error type for remediation runs.
#[derive(Debug, Error)]
pub enum Error {
    /// The run could not be prepared (bad server address, missing input).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interactive input could not be read from the terminal.
    #[error("Failed to read input: {0}")]
    Prompt(String),

    /// The management endpoint did not accept a TCP connection.
    ///
    /// This is raised before any credentials are sent.
    #[error("Management server {endpoint} is unreachable: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The endpoint was reachable but refused to open a session.
    #[error("Authentication to {endpoint} failed: {message}")]
    Authentication { endpoint: String, message: String },

    /// No cluster matched the requested name exactly.
    #[error("Cluster '{name}' could not be resolved: {reason}")]
    ClusterResolution { name: String, reason: String },

    /// Host or volume inventory could not be retrieved.
    #[error("Failed to {operation}: {message}")]
    Inventory {
        operation: &'static str,
        message: String,
    },

    /// Applying the path-switch threshold failed; the run aborts here.
    #[error("Failed to update multipathing on volume {volume}: {message}")]
    Remediation { volume: String, message: String },

    /// Closing the session failed. Logged as a warning, never escalated.
    #[error("Failed to close session: {0}")]
    Teardown(String),

    /// A report file could not be written.
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),

    /// A report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether the run must stop because of this error.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Error::Teardown(_))
    }
}

/// A specialized Result type for rr-iops operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ClusterResolution {
            name: "prod-01".to_string(),
            reason: "no cluster with that name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cluster 'prod-01' could not be resolved: no cluster with that name"
        );

        let err = Error::Inventory {
            operation: "list hosts",
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to list hosts: HTTP 500");

        let err = Error::Remediation {
            volume: "naa.600".to_string(),
            message: "busy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to update multipathing on volume naa.600: busy"
        );
    }

    #[test]
    fn test_unreachable_is_distinct_from_authentication() {
        let unreachable = Error::Unreachable {
            endpoint: "vc01:443".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let auth = Error::Authentication {
            endpoint: "vc01:443".to_string(),
            message: "invalid credentials".to_string(),
        };
        assert!(unreachable.to_string().contains("unreachable"));
        assert!(auth.to_string().contains("Authentication"));
        assert_ne!(unreachable.to_string(), auth.to_string());
    }

    #[test]
    fn test_teardown_is_not_terminal() {
        assert!(!Error::Teardown("gone".to_string()).is_terminal());
        assert!(Error::Config("x".to_string()).is_terminal());
        assert_eq!(Error::Config("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Report(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
