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

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use http::header;
use http::header::HeaderName;
use http::HeaderMap;
use http::HeaderValue;
use log::debug;

use crate::dispatch::CancelToken;
use crate::params::ParamStore;
use crate::parser::Parser;
use crate::response::Mode;
use crate::response::ResponseType;
use crate::signer::Sign;
use crate::Result;

const USER_AGENT: &str = concat!("owlery/", env!("CARGO_PKG_VERSION"));
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP methods a request can be dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper case name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// POST and PUT send the post params as a form body.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
        }
    }
}

/// Request holds everything needed to dispatch and sign one HTTP exchange.
///
/// The stored url never contains a query string: queries passed with the url
/// are extracted into the query params.
///
/// ```
/// use owlery_core::{Method, Request};
///
/// let mut req = Request::new("https://example.com/photos?size=original#top", Method::Get);
/// req.add_query_param("file", "vacation.jpg");
///
/// assert_eq!(req.url(), "https://example.com/photos");
/// assert_eq!(req.query_param_string(), "file=vacation.jpg&size=original");
/// ```
#[derive(Debug)]
pub struct Request {
    url: String,
    method: Method,
    typ: ResponseType,
    mode: Mode,

    query: ParamStore,
    post: ParamStore,
    files: BTreeMap<String, String>,
    headers: HeaderMap,

    token: Option<String>,
    token_secret: Option<String>,
    verifier: Option<String>,

    signer: Option<Arc<dyn Sign>>,
    parser: Option<Parser>,
    pub(crate) dispatch: Option<CancelToken>,
}

impl Request {
    /// Create a request expecting a single JSON model back.
    pub fn new(url: &str, method: Method) -> Self {
        Self::with_type(url, method, ResponseType::default(), Mode::default())
    }

    /// Create a request with the declared response type and mode.
    pub fn with_type(url: &str, method: Method, typ: ResponseType, mode: Mode) -> Self {
        let mut req = Self {
            url: String::new(),
            method,
            typ,
            mode,
            query: ParamStore::new(),
            post: ParamStore::new(),
            files: BTreeMap::new(),
            headers: default_headers(method),
            token: None,
            token_secret: None,
            verifier: None,
            signer: None,
            parser: None,
            dispatch: None,
        };
        req.set_url(url);
        req
    }

    /// Replace the url.
    ///
    /// The fragment is dropped and the query string is appended to the
    /// existing query params.
    pub fn set_url(&mut self, url: &str) -> &mut Self {
        let url = url.split_once('#').map_or(url, |(url, _)| url);
        match url.split_once('?') {
            Some((base, query)) => {
                self.url = base.to_string();
                for (k, v) in form_urlencoded::parse(query.as_bytes()) {
                    self.query.add(k, v);
                }
            }
            None => self.url = url.to_string(),
        }
        self
    }

    /// Follow the url the response actually came from.
    ///
    /// If it differs from the dispatched url, the query params are replaced
    /// by the ones of the resolved url.
    pub fn resolve_url(&mut self, resolved: &str) {
        if resolved.is_empty() || resolved == self.full_url() {
            return;
        }

        debug!("request url resolved to {resolved}");
        self.query.clear();
        self.set_url(resolved);
    }

    /// Base url without query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Url with the encoded query params appended.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query_param_string())
        }
    }

    /// Request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Declared response type.
    pub fn response_type(&self) -> ResponseType {
        self.typ
    }

    /// Declared mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Append a query param.
    pub fn add_query_param(&mut self, key: &str, value: &str) -> &mut Self {
        self.query.add(key, value);
        self
    }

    /// Append a post param.
    ///
    /// A GET never carries a body, so on GET the pair also lands in the query
    /// params.
    pub fn add_post_param(&mut self, key: &str, value: &str) -> &mut Self {
        self.post.add(key, value);
        if self.method == Method::Get {
            self.query.add(key, value);
        }
        self
    }

    /// Set a file param, replacing the previous one with the same name.
    pub fn add_file_param(&mut self, name: &str, path: &str) -> &mut Self {
        if !name.is_empty() {
            self.files.insert(name.to_string(), path.to_string());
        }
        self
    }

    /// Set a header, replacing any previous value.
    pub fn insert_header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    /// Query params.
    pub fn query_params(&self) -> &ParamStore {
        &self.query
    }

    /// Mutable query params.
    pub fn query_params_mut(&mut self) -> &mut ParamStore {
        &mut self.query
    }

    /// Post params.
    pub fn post_params(&self) -> &ParamStore {
        &self.post
    }

    /// Mutable post params.
    pub fn post_params_mut(&mut self) -> &mut ParamStore {
        &mut self.post
    }

    /// File params.
    pub fn file_params(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    /// Headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Encoded query string without the leading `?`.
    pub fn query_param_string(&self) -> String {
        self.query.to_param_string()
    }

    /// Encoded form body built from the post params.
    pub fn payload_string(&self) -> String {
        self.post.to_param_string()
    }

    /// Exact byte length of [`Request::payload_string`].
    pub fn payload_length(&self) -> usize {
        self.payload_string().len()
    }

    /// Use a token and token secret for this request only.
    pub fn with_token(mut self, token: &str, secret: &str) -> Self {
        self.token = Some(token.to_string());
        self.token_secret = Some(secret.to_string());
        self
    }

    /// Use a verifier for this request only.
    pub fn with_verifier(mut self, verifier: &str) -> Self {
        self.verifier = Some(verifier.to_string());
        self
    }

    /// Token set on this request.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Token secret set on this request.
    pub fn token_secret(&self) -> Option<&str> {
        self.token_secret.as_deref()
    }

    /// Verifier set on this request.
    pub fn verifier(&self) -> Option<&str> {
        self.verifier.as_deref()
    }

    /// Sign the request with `signer` right before it's dispatched.
    pub fn sign_with(mut self, signer: impl Sign) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// The attached signer.
    pub fn signer(&self) -> Option<Arc<dyn Sign>> {
        self.signer.clone()
    }

    /// Parse the response with this parser instead of the built-in one.
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// The explicit parser, if any.
    pub fn parser(&self) -> Option<&Parser> {
        self.parser.as_ref()
    }

    /// Check whether the active dispatch of this request was cancelled.
    ///
    /// Returns `false` when the request is not being dispatched.
    pub fn is_cancelled(&self) -> bool {
        self.dispatch.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

fn default_headers(method: Method) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    if method.has_body() {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(FORM_CONTENT_TYPE),
        );
    }
    headers
}
