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

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use http::header::HeaderName;
use http::HeaderMap;
use http::HeaderValue;
use owlery_core::BodyStream;
use owlery_core::Callback;
use owlery_core::ConnectRequest;
use owlery_core::Connection;
use owlery_core::Error;
use owlery_core::Request;
use owlery_core::Response;
use owlery_core::ResponseHead;
use owlery_core::Result;
use owlery_core::Transport;
use tokio::sync::Notify;

/// What one connection answers.
#[derive(Debug, Clone)]
pub struct Script {
    status: u16,
    message: String,
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
    url: Option<String>,
    fail_connect: bool,
    fail_head: bool,
    refuse_on_head: bool,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
    write_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    read_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl Script {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            message: "OK".to_string(),
            headers: Vec::new(),
            body: body.into(),
            url: None,
            fail_connect: false,
            fail_head: false,
            refuse_on_head: false,
            gate: None,
            write_gate: None,
            read_gate: None,
        }
    }

    pub fn connect_failure() -> Self {
        Self {
            fail_connect: true,
            ..Self::ok("")
        }
    }

    pub fn head_failure() -> Self {
        Self {
            fail_head: true,
            ..Self::ok("")
        }
    }

    /// Connect lazily and get refused once the head is requested.
    pub fn refused_on_head() -> Self {
        Self {
            refuse_on_head: true,
            ..Self::ok("")
        }
    }

    pub fn status(mut self, status: u16, message: &str) -> Self {
        self.status = status;
        self.message = message.to_string();
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn redirected_to(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Notify `entered` once connect is called, then wait for `release`.
    pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    /// Notify `entered` once the first body chunk is written, then wait for `release`.
    pub fn gated_write(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.write_gate = Some((entered, release));
        self
    }

    /// Notify `entered` once the first body chunk is read, then wait for `release`.
    pub fn gated_read(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.read_gate = Some((entered, release));
        self
    }
}

/// Everything the mock transport observed.
#[derive(Debug, Default)]
pub struct Recorded {
    pub connects: Vec<ConnectRequest>,
    pub body: Vec<u8>,
    pub writes: usize,
    pub streams: Vec<BodyStream>,
    pub disconnects: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockTransport {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into_iter().collect())),
            recorded: Arc::default(),
        }
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, req: ConnectRequest) -> Result<Box<dyn Connection>> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::ok(""));
        let url = req.url.clone();
        self.recorded.lock().unwrap().connects.push(req);

        if let Some((entered, release)) = &script.gate {
            entered.notify_one();
            release.notified().await;
        }
        if script.fail_connect {
            return Err(Error::connect_failed("connection refused"));
        }

        Ok(Box::new(MockConnection {
            script,
            url,
            recorded: self.recorded.clone(),
            pos: 0,
            disconnected: false,
        }))
    }
}

struct MockConnection {
    script: Script,
    url: String,
    recorded: Arc<Mutex<Recorded>>,
    pos: usize,
    disconnected: bool,
}

#[async_trait]
impl Connection for MockConnection {
    async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.body.extend_from_slice(chunk);
            recorded.writes += 1;
        }

        if let Some((entered, release)) = self.script.write_gate.take() {
            entered.notify_one();
            release.notified().await;
        }
        Ok(())
    }

    async fn response_head(&mut self) -> Result<ResponseHead> {
        if self.script.fail_head {
            return Err(Error::unexpected("connection reset by peer"));
        }
        if self.script.refuse_on_head {
            return Err(Error::connect_failed("connection refused"));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.script.headers {
            headers.append(HeaderName::from_static(*name), HeaderValue::from_str(value)?);
        }
        Ok(ResponseHead {
            status: self.script.status,
            message: self.script.message.clone(),
            headers,
            url: self.script.url.clone().unwrap_or_else(|| self.url.clone()),
        })
    }

    fn select_body(&mut self, stream: BodyStream) -> Result<()> {
        self.recorded.lock().unwrap().streams.push(stream);
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let rest = &self.script.body[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;

        if let Some((entered, release)) = self.script.read_gate.take() {
            entered.notify_one();
            release.notified().await;
        }
        Ok(n)
    }

    async fn disconnect(&mut self) {
        if !self.disconnected {
            self.disconnected = true;
            self.recorded.lock().unwrap().disconnects += 1;
        }
    }
}

/// Records callback notifications in order.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl Callback for Recorder {
    fn on_success(&self, _: &Request, _: &Response) {
        self.events.lock().unwrap().push("success");
    }

    fn on_error(&self, _: &Request, _: &Response) {
        self.events.lock().unwrap().push("error");
    }

    fn on_complete(&self, _: &Request, _: &Response) {
        self.events.lock().unwrap().push("complete");
    }
}
