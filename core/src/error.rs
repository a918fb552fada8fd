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

use std::fmt;
use thiserror::Error;

/// Error returned by owlery.
///
/// Inside a dispatch errors never escape the background task, they end up
/// as response state (status, `parse_error`) plus a log line.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// What went wrong, without the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable credential: missing consumer key or secret.
    CredentialInvalid,
    /// A url, header or param could not be turned into a request.
    RequestInvalid,
    /// Config values are missing or malformed.
    ConfigInvalid,
    /// The transport could not open, configure or connect.
    ConnectFailed,
    /// A parser produced zero models where at least one is required.
    EmptyResult,
    /// Everything else: I/O, hashing, joined tasks.
    Unexpected,
}

impl ErrorKind {
    /// Short lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CredentialInvalid => "credential invalid",
            ErrorKind::RequestInvalid => "request invalid",
            ErrorKind::ConfigInvalid => "config invalid",
            ErrorKind::ConnectFailed => "connect failed",
            ErrorKind::EmptyResult => "empty result",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Build an error of `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Shorthand for [`ErrorKind::CredentialInvalid`].
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Shorthand for [`ErrorKind::RequestInvalid`].
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Shorthand for [`ErrorKind::ConfigInvalid`].
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Shorthand for [`ErrorKind::ConnectFailed`].
    pub fn connect_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectFailed, message)
    }

    /// Shorthand for [`ErrorKind::EmptyResult`].
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyResult, message)
    }

    /// Shorthand for [`ErrorKind::Unexpected`].
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

/// Result with owlery's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

macro_rules! impl_from_error {
    ($($ty:ty => $ctor:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Self::$ctor(err.to_string()).with_source(err)
                }
            }
        )+
    };
}

impl_from_error! {
    fmt::Error => unexpected,
    std::io::Error => unexpected,
    http::Error => request_invalid,
    http::header::InvalidHeaderValue => request_invalid,
    http::header::InvalidHeaderName => request_invalid,
    http::uri::InvalidUri => request_invalid,
}
