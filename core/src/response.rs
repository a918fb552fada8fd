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

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use log::debug;

use crate::model::Model;
use crate::parser::Parser;
use crate::request::Request;
use crate::Error;
use crate::Result;

const EMPTY_MODELS: &str = "parser returned an empty sequence of models";

/// The kind of body a request expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Plain text, the body is not parsed.
    Text,
    /// JSON body.
    #[default]
    Json,
    /// OAuth 1.0a token endpoint body.
    OAuth,
}

/// How many models the response body holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The body holds one model.
    #[default]
    Single,
    /// The body holds a sequence of models.
    Multiple,
}

/// Response of a dispatched request.
///
/// The dispatcher fills status and headers first, then the body, then runs the
/// parser. Once handed to the callback the response is not touched anymore.
#[derive(Debug)]
pub struct Response {
    typ: ResponseType,
    mode: Mode,
    parser: Parser,

    status: Option<u16>,
    message: String,
    headers: HeaderMap,
    body: Option<Bytes>,

    model: Option<Arc<dyn Model>>,
    models: Vec<Arc<dyn Model>>,
    parse_error: Option<Error>,
}

impl Response {
    /// Create an empty response that will be parsed with the given parser.
    pub fn new(typ: ResponseType, mode: Mode, parser: Parser) -> Self {
        Self {
            typ,
            mode,
            parser,
            status: None,
            message: String::new(),
            headers: HeaderMap::new(),
            body: None,
            model: None,
            models: Vec::new(),
            parse_error: None,
        }
    }

    /// Create an empty response for the request, resolving its parser.
    pub fn for_request(req: &Request) -> Self {
        let parser = Parser::resolve(req.parser(), req.response_type());
        Self::new(req.response_type(), req.mode(), parser)
    }

    /// Set status code and status message.
    pub fn set_status(&mut self, code: u16, message: impl Into<String>) -> &mut Self {
        self.status = Some(code);
        self.message = message.into();
        self
    }

    /// Set response headers.
    pub fn set_headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Set response body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Declared response type.
    pub fn response_type(&self) -> ResponseType {
        self.typ
    }

    /// Declared mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The parser resolved for this response.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Status code, `None` if the head was never received.
    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    /// Status message.
    pub fn status_message(&self) -> &str {
        &self.message
    }

    /// A response is successful if its status code is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|code| code / 100 == 2)
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Names of all response headers.
    pub fn header_names(&self) -> Vec<&str> {
        self.headers.keys().map(|k| k.as_str()).collect()
    }

    /// The last value of the header.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(name)
            .iter()
            .last()
            .and_then(|v| v.to_str().ok())
    }

    /// All values of the header in the order they were received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Body as text, empty if there is no body.
    pub fn body(&self) -> Cow<'_, str> {
        match &self.body {
            Some(bs) => String::from_utf8_lossy(bs),
            None => Cow::Borrowed(""),
        }
    }

    /// Raw body, `None` if no body was read.
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The convenience single model.
    pub fn model(&self) -> Option<&Arc<dyn Model>> {
        self.model.as_ref()
    }

    /// All parsed models.
    pub fn models(&self) -> &[Arc<dyn Model>] {
        &self.models
    }

    /// The single model as `T`.
    pub fn model_as<T: 'static>(&self) -> Option<&T> {
        self.model
            .as_ref()
            .and_then(|m| (**m).as_any().downcast_ref::<T>())
    }

    /// Every model that is a `T`.
    pub fn models_as<T: 'static>(&self) -> Vec<&T> {
        self.models
            .iter()
            .filter_map(|m| (**m).as_any().downcast_ref::<T>())
            .collect()
    }

    /// The error recorded by the last [`Response::process`], if any.
    pub fn parse_error(&self) -> Option<&Error> {
        self.parse_error.as_ref()
    }

    /// Parse the body into models.
    ///
    /// Failed responses are not parsed and end up with no models. In
    /// [`Mode::Multiple`], a parser returning zero models is an
    /// [`ErrorKind::EmptyResult`](crate::ErrorKind::EmptyResult) error.
    pub fn process(&mut self) -> Result<()> {
        self.model = None;
        self.models = Vec::new();
        self.parse_error = None;

        if !self.is_success() {
            return Ok(());
        }

        let body = self.body().into_owned();
        match self.mode {
            Mode::Single => {
                self.model = self.parser.parse_single(&body);
                self.models = self.model.iter().cloned().collect();
            }
            Mode::Multiple => {
                let Some(models) = self.parser.parse_multiple(&body) else {
                    debug!("parser {:?} produced no models in multiple mode", self.parser);
                    return Ok(());
                };
                let Some(first) = models.first() else {
                    self.parse_error = Some(Error::empty_result(EMPTY_MODELS));
                    return Err(Error::empty_result(EMPTY_MODELS));
                };

                self.model = Some(first.clone());
                self.models = models;
            }
        }

        Ok(())
    }

    /// Notify the callback: success or error, then complete.
    pub fn trigger_callback(&self, req: &Request, callback: &dyn Callback) {
        if self.is_success() {
            callback.on_success(req, self);
        } else {
            callback.on_error(req, self);
        }

        callback.on_complete(req, self);
    }
}

/// Callback receives the outcome of a finished dispatch.
///
/// Exactly one of `on_success` and `on_error` is called, then `on_complete`.
/// Cancelled dispatches call nothing.
pub trait Callback: Send + Sync + 'static {
    /// Called when the status code is 2xx.
    fn on_success(&self, req: &Request, resp: &Response) {
        let _ = (req, resp);
    }

    /// Called when the status code is not 2xx, including connection failures.
    fn on_error(&self, req: &Request, resp: &Response) {
        let _ = (req, resp);
    }

    /// Called after `on_success` or `on_error`.
    fn on_complete(&self, req: &Request, resp: &Response);
}

/// `()` ignores every notification.
impl Callback for () {
    fn on_complete(&self, _: &Request, _: &Response) {}
}
