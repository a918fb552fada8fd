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

//! Reqwest based [`Transport`] for owlery.
//!
//! ```no_run
//! use owlery_core::{Context, CookieJar};
//! use owlery_transport_reqwest::ReqwestTransport;
//!
//! let ctx = Context::new()
//!     .with_transport(ReqwestTransport::default())
//!     .with_session(CookieJar::new());
//! ```

use async_trait::async_trait;
use bytes::Buf;
use bytes::Bytes;
use http::HeaderMap;
use http::Method;
use log::debug;
use owlery_core::BodyStream;
use owlery_core::ConnectRequest;
use owlery_core::Connection;
use owlery_core::Error;
use owlery_core::ResponseHead;
use owlery_core::Result;
use owlery_core::Transport;
use reqwest::Client;
use reqwest::Url;

/// Transport that sends requests with a [`reqwest::Client`].
///
/// Redirects follow the client's policy. Content decoding is left to the
/// dispatcher, so the client must be built without `gzip` support.
#[derive(Debug, Default, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new ReqwestTransport with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn connect(&self, req: ConnectRequest) -> Result<Box<dyn Connection>> {
        let url = Url::parse(&req.url).map_err(|err| {
            Error::connect_failed(format!("invalid url {}", req.url)).with_source(err)
        })?;

        Ok(Box::new(ReqwestConnection {
            client: self.client.clone(),
            method: req.method,
            url,
            headers: req.headers,
            body: Vec::with_capacity(req.content_length.unwrap_or_default() as usize),
            response: None,
            pending: Bytes::new(),
            stream: None,
        }))
    }
}

/// One request/response exchange.
///
/// The body written by the dispatcher is buffered and sent once the
/// response head is requested.
struct ReqwestConnection {
    client: Client,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,

    response: Option<reqwest::Response>,
    pending: Bytes,
    stream: Option<BodyStream>,
}

#[async_trait]
impl Connection for ReqwestConnection {
    async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        if self.response.is_some() {
            return Err(Error::unexpected("request already sent"));
        }
        self.body.extend_from_slice(chunk);
        Ok(())
    }

    async fn response_head(&mut self) -> Result<ResponseHead> {
        let body = std::mem::take(&mut self.body);
        let mut builder = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        if !body.is_empty() {
            builder = builder.body(body);
        }

        // reqwest connects lazily, a refused connection shows up here.
        let resp = builder.send().await.map_err(|err| {
            if err.is_connect() {
                Error::connect_failed(format!("connect to {} failed", self.url)).with_source(err)
            } else {
                Error::unexpected("send request failed").with_source(err)
            }
        })?;

        let status = resp.status();
        let head = ResponseHead {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
            headers: resp.headers().clone(),
            url: resp.url().to_string(),
        };
        debug!("{} {} responded {}", self.method, self.url, head.status);

        self.response = Some(resp);
        Ok(head)
    }

    fn select_body(&mut self, stream: BodyStream) -> Result<()> {
        if self.response.is_none() {
            return Err(Error::unexpected("response head not received"));
        }
        self.stream = Some(stream);
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.stream.is_none() {
            return Err(Error::unexpected("body stream not selected"));
        }

        while self.pending.is_empty() {
            let Some(resp) = self.response.as_mut() else {
                return Ok(0);
            };
            match resp
                .chunk()
                .await
                .map_err(|err| Error::unexpected("read body failed").with_source(err))?
            {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }

        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }

    async fn disconnect(&mut self) {
        self.response = None;
        self.pending = Bytes::new();
    }
}
