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

//! Core components for dispatching, signing and parsing HTTP requests.
//!
//! This crate provides the foundational types and traits for the owlery ecosystem.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds the transport, the cookie session and environment access
//! - **Request**: Method, url, query/post/file params, headers and signing material of one exchange
//! - **Dispatch**: The cancellable background lifecycle connect, send, receive, parse, callback
//! - **Response**: Status, headers, body and the models parsed out of the body
//! - **Signer**: Coordinates credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//!
//! ## Example
//!
//! ```no_run
//! use owlery_core::{Callback, Context, Method, Request, Response};
//!
//! struct Print;
//!
//! impl Callback for Print {
//!     fn on_complete(&self, req: &Request, resp: &Response) {
//!         println!("{} {:?}: {}", req.url(), resp.status_code(), resp.body());
//!     }
//! }
//!
//! # async fn example(ctx: Context) -> owlery_core::Result<()> {
//! let mut req = Request::new("https://example.com/photos?size=original", Method::Get);
//! req.add_query_param("file", "vacation.jpg");
//!
//! let dispatch = req.execute(&ctx, Print);
//! let (_req, resp) = dispatch.join().await?;
//! assert!(resp.status_code().is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`Transport`] and [`Connection`]: For opening connections and moving bytes
//! - [`SessionState`]: For keeping cookies across dispatches
//! - [`Env`]: For environment variable access
//! - [`ParseResponse`]: For user supplied response parsers
//! - [`Callback`]: For receiving the outcome of a dispatch
//! - [`ProvideCredential`], [`SignRequest`], [`SigningCredential`]: For request signing
//!
//! ## Utilities
//!
//! - [`encode`]: RFC 3986 percent encoding
//! - [`hash`]: HMAC-SHA1 and base64 helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod encode;
pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, NoopEnv, OsEnv, StaticEnv};
mod transport;
pub use transport::{BodyStream, ConnectRequest, Connection, NoopTransport, ResponseHead, Transport};
mod session;
pub use session::{CookieJar, NoopSession, SessionState};

mod params;
pub use params::ParamStore;
mod model;
pub use model::{Model, OAuthKey};
mod parser;
pub use parser::{parse_oauth_form, JsonParser, ParseResponse, Parser};
mod request;
pub use request::{Method, Request};
mod response;
pub use response::{Callback, Mode, Response, ResponseType};
mod dispatch;
pub use dispatch::{CancelToken, Dispatch, DispatchState};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod signer;
pub use signer::{Sign, Signer};
