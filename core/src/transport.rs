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

use std::fmt::Debug;

use http::HeaderMap;
use http::Method;

use crate::Error;
use crate::Result;

/// Everything needed to open, configure and connect a connection.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    /// HTTP method.
    pub method: Method,
    /// Full url including the query string.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Exact body length for fixed-length streaming, `None` if there is no body.
    pub content_length: Option<u64>,
}

/// Status line and headers of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Status code.
    pub status: u16,
    /// Status message (reason phrase).
    pub message: String,
    /// Response headers, a name may repeat.
    pub headers: HeaderMap,
    /// The url the response came from after redirects.
    pub url: String,
}

/// Which body stream to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStream {
    /// The regular stream of a successful response.
    Input,
    /// The error stream of a failed response.
    Error,
}

/// Transport opens connections for the dispatcher.
///
/// Any failure during open, configure or connect must be returned from
/// `connect`, the dispatcher turns it into a failed response.
#[async_trait::async_trait]
pub trait Transport: Debug + Send + Sync + 'static {
    /// Open a configured connection.
    async fn connect(&self, req: ConnectRequest) -> Result<Box<dyn Connection>>;
}

/// Connection is exclusively owned by one dispatch for its whole lifetime.
#[async_trait::async_trait]
pub trait Connection: Send {
    /// Write a chunk of the request body.
    async fn write(&mut self, chunk: &[u8]) -> Result<()>;

    /// Finish the request and wait for the status line and headers.
    async fn response_head(&mut self) -> Result<ResponseHead>;

    /// Select the stream the following reads come from.
    fn select_body(&mut self, stream: BodyStream) -> Result<()>;

    /// Read body bytes into `buf`, returns 0 at the end of the body.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Release the connection. Calling it more than once is a no-op.
    async fn disconnect(&mut self);
}

/// NoopTransport is a no-op implementation that always fails to connect.
///
/// This is used when no transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

#[async_trait::async_trait]
impl Transport for NoopTransport {
    async fn connect(&self, _: ConnectRequest) -> Result<Box<dyn Connection>> {
        Err(Error::connect_failed(
            "connecting not supported: no transport configured",
        ))
    }
}
