// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for alicloud operations.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    service: Option<Box<ServiceError>>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied an unsupported combination or invalid input.
    ///
    /// Never retried.
    Validation,

    /// Network, I/O or decode failure before a structured response was obtained.
    Transport,

    /// A well-formed error response returned by the remote service.
    ///
    /// [`Error::service_error`] carries the provider fields.
    Protocol,

    /// No usable credential could be loaded.
    CredentialInvalid,

    /// Configuration error (missing fields, malformed files)
    ConfigInvalid,

    /// Anything else.
    Unexpected,
}

/// Structured error returned by an Aliyun endpoint.
///
/// All fields are kept as returned so that failures can be traced back on the
/// provider side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Provider error code, for example `NoSuchKey`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id assigned by the service.
    pub request_id: String,
    /// Host that served the request.
    pub host_id: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status: {}, code: {}, message: {}, request_id: {}, host_id: {}",
            self.status, self.code, self.message, self.request_id, self.host_id
        )
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            service: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the structured service error if this is a protocol error.
    pub fn service_error(&self) -> Option<&ServiceError> {
        self.service.as_deref()
    }

    /// Returns true if the operation may succeed when attempted again.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::Transport | ErrorKind::Unexpected => true,
            ErrorKind::Protocol => self
                .service_error()
                .map(|e| e.status.is_server_error() || e.status == StatusCode::TOO_MANY_REQUESTS)
                .unwrap_or(false),
            _ => false,
        }
    }
}

// Convenience constructors
impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a protocol error from the service response.
    pub fn protocol(service: ServiceError) -> Self {
        let message = if service.message.is_empty() {
            format!("service responded {}", service.status)
        } else {
            service.message.clone()
        };
        Self {
            kind: ErrorKind::Protocol,
            message,
            service: Some(Box::new(service)),
            source: None,
        }
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::transport(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::transport(format!("failed to decode json: {err}")).with_source(anyhow::Error::from(err))
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Self::transport(format!("failed to decode xml: {err}")).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_keeps_service_fields() {
        let err = Error::protocol(ServiceError {
            status: StatusCode::NOT_FOUND,
            code: "NoSuchKey".to_string(),
            message: "The specified key does not exist.".to_string(),
            request_id: "5C3D9175B6FC201293AD4890".to_string(),
            host_id: "bucket.oss-cn-hangzhou.aliyuncs.com".to_string(),
        });

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(!err.is_retryable());
        let service = err.service_error().expect("protocol error has service fields");
        assert_eq!(service.code, "NoSuchKey");
        assert_eq!(service.request_id, "5C3D9175B6FC201293AD4890");
        assert_eq!(service.host_id, "bucket.oss-cn-hangzhou.aliyuncs.com");
        assert_eq!(
            err.to_string(),
            "protocol error: The specified key does not exist."
        );
    }

    #[test]
    fn test_retryable() {
        assert!(Error::transport("connection reset").is_retryable());
        assert!(!Error::validation("bad input").is_retryable());
        assert!(Error::protocol(ServiceError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            ..Default::default()
        })
        .is_retryable());
    }
}
