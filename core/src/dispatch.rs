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

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use flate2::write::GzDecoder;
use http::header;
use http::HeaderMap;
use http::HeaderValue;
use log::debug;
use log::warn;
use tokio::task::JoinHandle;

use crate::request::Request;
use crate::response::Callback;
use crate::response::Response;
use crate::transport::BodyStream;
use crate::transport::ConnectRequest;
use crate::transport::Connection;
use crate::Context;
use crate::Error;
use crate::ErrorKind;
use crate::Result;

const CHUNK_SIZE: usize = 1024;
const CONNECT_FAILED_MESSAGE: &str = "Internal Lib Error: Unable to bridge connection";
const BAD_REQUEST_MESSAGE: &str = "Bad Request";

/// States of one dispatch.
///
/// ```text
/// Created -> Connecting -> (Connected | Failed) -> SendingBody -> AwaitingResponse
///         -> ReadingBody -> Parsed -> Completed
/// ```
///
/// `Cancelled` is reachable from every state but `Completed`. `Failed` is
/// reachable from every state before a response head was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Request prepared, nothing sent.
    Created,
    /// Opening the connection.
    Connecting,
    /// Connection established.
    Connected,
    /// Connection could not be established.
    Failed,
    /// Writing the form body.
    SendingBody,
    /// Waiting for status and headers.
    AwaitingResponse,
    /// Reading the body.
    ReadingBody,
    /// Body parsed into models.
    Parsed,
    /// Callback notified.
    Completed,
    /// Cancelled by the caller.
    Cancelled,
}

impl DispatchState {
    fn rank(&self) -> u8 {
        match self {
            DispatchState::Created => 0,
            DispatchState::Connecting => 1,
            DispatchState::Connected | DispatchState::Failed => 2,
            DispatchState::SendingBody => 3,
            DispatchState::AwaitingResponse => 4,
            DispatchState::ReadingBody => 5,
            DispatchState::Parsed => 6,
            DispatchState::Completed | DispatchState::Cancelled => 7,
        }
    }

    /// Completed and Cancelled are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Completed | DispatchState::Cancelled)
    }

    /// Check whether the lifecycle may move from `self` to `next`.
    ///
    /// States only move forward. A failure before the response head skips
    /// straight to `Parsed`, nothing else follows it.
    pub fn can_transition_to(&self, next: DispatchState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, DispatchState::Cancelled) => true,
            (DispatchState::Failed, DispatchState::Parsed) => true,
            (DispatchState::Failed, _) => false,
            (current, DispatchState::Failed) => current.rank() < DispatchState::ReadingBody.rank(),
            (DispatchState::Created, DispatchState::Connecting) => true,
            (DispatchState::Created, _) => false,
            (DispatchState::Connecting, DispatchState::Connected) => true,
            (DispatchState::Connecting, _) => false,
            (current, next) => next.rank() > current.rank(),
        }
    }
}

impl Display for DispatchState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DispatchState::Created => "created",
            DispatchState::Connecting => "connecting",
            DispatchState::Connected => "connected",
            DispatchState::Failed => "failed",
            DispatchState::SendingBody => "sending_body",
            DispatchState::AwaitingResponse => "awaiting_response",
            DispatchState::ReadingBody => "reading_body",
            DispatchState::Parsed => "parsed",
            DispatchState::Completed => "completed",
            DispatchState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// CancelToken is the cancellation flag shared by a dispatch and its handle.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel, returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    /// Check whether the token was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Dispatch is the handle of a request running in the background.
#[derive(Debug)]
pub struct Dispatch {
    token: CancelToken,
    handle: JoinHandle<(Request, Response)>,
}

impl Dispatch {
    /// Request cancellation.
    ///
    /// Cancellation is cooperative: the dispatch stops at its next check,
    /// releases the connection and never notifies the callback. Returns
    /// `false` if the dispatch was already cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.token.cancel();
        if cancelled {
            debug!("dispatch cancellation requested");
        }
        cancelled
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Check whether the background task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the dispatch to finish and take back the request and its response.
    pub async fn join(self) -> Result<(Request, Response)> {
        self.handle
            .await
            .map_err(|err| Error::unexpected("dispatch task failed").with_source(err))
    }
}

impl Request {
    /// Dispatch the request in the background.
    ///
    /// The request moves into the dispatch and comes back from
    /// [`Dispatch::join`], so a request can't be dispatched twice at once.
    /// Must be called within a tokio runtime.
    pub fn execute(self, ctx: &Context, callback: impl Callback) -> Dispatch {
        let token = CancelToken::new();
        let ctx = ctx.clone();
        let task_token = token.clone();
        let handle = tokio::spawn(async move { run(&ctx, self, task_token, &callback).await });

        Dispatch { token, handle }
    }

    /// Dispatch the request inline and wait for the response.
    pub async fn send(self, ctx: &Context) -> (Request, Response) {
        run(ctx, self, CancelToken::new(), &()).await
    }

    /// Dispatch the request inline, notifying `callback` when done.
    pub async fn send_with(self, ctx: &Context, callback: impl Callback) -> (Request, Response) {
        run(ctx, self, CancelToken::new(), &callback).await
    }
}

async fn run(
    ctx: &Context,
    mut req: Request,
    token: CancelToken,
    callback: &dyn Callback,
) -> (Request, Response) {
    req.dispatch = Some(token.clone());
    let mut resp = Response::for_request(&req);
    let mut lifecycle = Lifecycle::new(ctx, token, &req);
    let mut conn = None;

    let finished = match lifecycle.exchange(&mut req, &mut resp, &mut conn).await {
        Ok(finished) => finished,
        Err(err) => {
            warn!("dispatch {} {} stopped: {err}", req.method(), lifecycle.url);
            lifecycle.fail(&mut resp, CONNECT_FAILED_MESSAGE);
            true
        }
    };

    if let Some(mut conn) = conn.take() {
        conn.disconnect().await;
    }
    req.dispatch = None;

    if !finished || lifecycle.check_cancelled() {
        debug!("dispatch {} {} cancelled", req.method(), lifecycle.url);
        return (req, resp);
    }

    if let Err(err) = lifecycle.complete(&req, &mut resp, callback) {
        warn!("dispatch {} {} failed to complete: {err}", req.method(), lifecycle.url);
    }
    (req, resp)
}

struct Lifecycle<'a> {
    ctx: &'a Context,
    token: CancelToken,
    state: DispatchState,
    url: String,
}

impl<'a> Lifecycle<'a> {
    fn new(ctx: &'a Context, token: CancelToken, req: &Request) -> Self {
        Self {
            ctx,
            token,
            state: DispatchState::Created,
            url: req.full_url(),
        }
    }

    fn transition(&mut self, next: DispatchState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::unexpected(format!(
                "invalid dispatch transition from {} to {next}",
                self.state
            )));
        }

        debug!("dispatch {}: {} -> {next}", self.url, self.state);
        self.state = next;
        Ok(())
    }

    /// Move to `Failed` and answer with a 400 unless a status is known.
    fn fail(&mut self, resp: &mut Response, message: &str) {
        if self.state.can_transition_to(DispatchState::Failed) {
            debug!("dispatch {}: {} -> failed", self.url, self.state);
            self.state = DispatchState::Failed;
        }
        if resp.status_code().is_none() {
            resp.set_status(400, message);
        }
    }

    /// Move to `Cancelled` if the token is cancelled.
    fn check_cancelled(&mut self) -> bool {
        if !self.token.is_cancelled() {
            return false;
        }
        if self.state != DispatchState::Cancelled {
            debug!("dispatch {}: {} -> cancelled", self.url, self.state);
            self.state = DispatchState::Cancelled;
        }
        true
    }

    /// Run the network exchange, returns `false` if it was cancelled.
    ///
    /// Failures after the request left the client are not errors: the
    /// response keeps whatever was captured so far.
    async fn exchange(
        &mut self,
        req: &mut Request,
        resp: &mut Response,
        slot: &mut Option<Box<dyn Connection>>,
    ) -> Result<bool> {
        if let Some(signer) = req.signer() {
            if let Err(err) = signer.sign(req).await {
                warn!("sign request {} failed, sending it unsigned: {err}", self.url);
            }
        }
        // Signing may add query params.
        self.url = req.full_url();

        let body = req
            .method()
            .has_body()
            .then(|| req.payload_string().into_bytes());
        let mut headers = req.headers().clone();
        if let Some(cookie) = cookie_header(&self.url, self.ctx.cookies_for(&self.url)) {
            headers.insert(header::COOKIE, cookie);
        }

        if self.check_cancelled() {
            return Ok(false);
        }
        self.transition(DispatchState::Connecting)?;
        let connect = ConnectRequest {
            method: req.method().into(),
            url: self.url.clone(),
            headers,
            content_length: body.as_ref().map(|b| b.len() as u64),
        };
        let conn = match self.ctx.connect(connect).await {
            Ok(conn) => slot.insert(conn),
            Err(err) => {
                warn!("connect to {} failed: {err}", self.url);
                self.fail(resp, CONNECT_FAILED_MESSAGE);
                return Ok(true);
            }
        };
        self.transition(DispatchState::Connected)?;

        if let Some(body) = body {
            self.transition(DispatchState::SendingBody)?;
            for chunk in body.chunks(CHUNK_SIZE) {
                if self.check_cancelled() {
                    return Ok(false);
                }
                if let Err(err) = conn.write(chunk).await {
                    warn!("write body to {} failed: {err}", self.url);
                    return Ok(true);
                }
            }
        }

        if self.check_cancelled() {
            return Ok(false);
        }
        self.transition(DispatchState::AwaitingResponse)?;
        let head = match conn.response_head().await {
            Ok(head) => head,
            // Transports that connect lazily report connect failures here.
            Err(err) if err.kind() == ErrorKind::ConnectFailed => {
                warn!("connect to {} failed: {err}", self.url);
                self.fail(resp, CONNECT_FAILED_MESSAGE);
                return Ok(true);
            }
            Err(err) => {
                warn!("read response head from {} failed: {err}", self.url);
                resp.set_status(400, BAD_REQUEST_MESSAGE);
                return Ok(true);
            }
        };

        req.resolve_url(&head.url);
        let origin = if head.url.is_empty() {
            self.url.clone()
        } else {
            head.url.clone()
        };
        let set_cookies: Vec<&str> = head
            .headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if !set_cookies.is_empty() {
            self.ctx.store_cookies(&origin, &set_cookies);
        }

        let gzip = is_gzip(&head.headers);
        resp.set_status(head.status, head.message)
            .set_headers(head.headers);

        self.transition(DispatchState::ReadingBody)?;
        let stream = if resp.is_success() {
            BodyStream::Input
        } else {
            BodyStream::Error
        };
        if let Err(err) = conn.select_body(stream) {
            warn!("select {stream:?} body of {} failed: {err}", self.url);
            return Ok(true);
        }

        let mut sink = BodySink::new(gzip);
        let mut buf = [0; CHUNK_SIZE];
        loop {
            if self.check_cancelled() {
                return Ok(false);
            }
            let n = match conn.read(&mut buf).await {
                Ok(n) => n,
                Err(err) => {
                    warn!("read body from {} failed: {err}", self.url);
                    return Ok(true);
                }
            };
            if n == 0 {
                break;
            }
            if let Err(err) = sink.write(&buf[..n]) {
                warn!("decode body from {} failed: {err}", self.url);
                return Ok(true);
            }
        }

        match sink.finish() {
            Ok(body) => {
                resp.set_body(body);
            }
            Err(err) => warn!("decode body from {} failed: {err}", self.url),
        }
        Ok(true)
    }

    fn complete(&mut self, req: &Request, resp: &mut Response, callback: &dyn Callback) -> Result<()> {
        if let Err(err) = resp.process() {
            warn!("parse response of {} failed: {err}", self.url);
        }
        self.transition(DispatchState::Parsed)?;

        resp.trigger_callback(req, callback);
        self.transition(DispatchState::Completed)
    }
}

/// Join the session cookies into one `Cookie` value, dropping the ones
/// that can't be sent in a header.
fn cookie_header(url: &str, cookies: Vec<String>) -> Option<HeaderValue> {
    let cookies: Vec<String> = cookies
        .into_iter()
        .filter(|cookie| {
            let valid = HeaderValue::from_str(cookie).is_ok();
            if !valid {
                warn!("cookie for {url} is not a valid header value, skipped");
            }
            valid
        })
        .collect();
    if cookies.is_empty() {
        return None;
    }

    match HeaderValue::from_str(&cookies.join("; ")) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("cookie header for {url} is invalid, skipped: {err}");
            None
        }
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.trim().eq_ignore_ascii_case("gzip"))
}

enum BodySink {
    Plain(Vec<u8>),
    Gzip(GzDecoder<Vec<u8>>),
}

impl BodySink {
    fn new(gzip: bool) -> Self {
        if gzip {
            BodySink::Gzip(GzDecoder::new(Vec::new()))
        } else {
            BodySink::Plain(Vec::new())
        }
    }

    fn write(&mut self, chunk: &[u8]) -> Result<()> {
        match self {
            BodySink::Plain(buf) => buf.extend_from_slice(chunk),
            BodySink::Gzip(decoder) => decoder.write_all(chunk)?,
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        match self {
            BodySink::Plain(buf) => Ok(buf),
            BodySink::Gzip(decoder) => Ok(decoder.finish()?),
        }
    }
}
