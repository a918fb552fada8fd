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

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::session::NoopSession;
use crate::session::SessionState;
use crate::transport::ConnectRequest;
use crate::transport::Connection;
use crate::transport::NoopTransport;
use crate::transport::Transport;
use crate::Result;

/// Context holds the collaborators shared by every dispatch.
///
/// ## Important
///
/// owlery provides NO default implementations. Any unconfigured component
/// uses a no-op implementation: connecting fails, cookies are not kept and
/// no environment variable is visible.
///
/// ## Example
///
/// ```
/// use owlery_core::{Context, CookieJar, OsEnv};
///
/// let ctx = Context::new()
///     .with_session(CookieJar::new())
///     .with_env(OsEnv);
/// ```
#[derive(Clone)]
pub struct Context {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionState>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("transport", &self.transport)
            .field("session", &self.session)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    pub fn new() -> Self {
        Self {
            transport: Arc::new(NoopTransport),
            session: Arc::new(NoopSession),
            env: Arc::new(NoopEnv),
        }
    }

    /// Replace the transport implementation.
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the session implementation.
    ///
    /// Pass a [`CookieJar`](crate::CookieJar) to enable cookies.
    pub fn with_session(mut self, session: impl SessionState) -> Self {
        self.session = Arc::new(session);
        self
    }

    /// Share a session with other contexts.
    pub fn with_shared_session(mut self, session: Arc<dyn SessionState>) -> Self {
        self.session = session;
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Open a connection through the configured transport.
    #[inline]
    pub async fn connect(&self, req: ConnectRequest) -> Result<Box<dyn Connection>> {
        self.transport.connect(req).await
    }

    /// The session shared by dispatches of this context.
    pub fn session(&self) -> &Arc<dyn SessionState> {
        &self.session
    }

    /// Cookies to send to the url.
    #[inline]
    pub fn cookies_for(&self, url: &str) -> Vec<String> {
        self.session.cookies_for(url)
    }

    /// Remember `Set-Cookie` values received from the url.
    #[inline]
    pub fn store_cookies(&self, url: &str, set_cookies: &[&str]) {
        self.session.store_cookies(url, set_cookies)
    }

    /// Forget cookies of the url's origin, or all of them.
    #[inline]
    pub fn remove_cookies(&self, url: Option<&str>) {
        self.session.remove_cookies(url)
    }

    /// Read an environment variable through the configured [`Env`].
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// All environment variables visible to this context.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }
}

/// Env is the process environment as seen by owlery.
pub trait Env: Debug + Send + Sync + 'static {
    /// Value of `key`, `None` if unset or not valid utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Every variable that is valid utf-8.
    fn vars(&self) -> HashMap<String, String>;
}

/// Reads the real process environment.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// In-memory environment, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// Visible variables.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }
}

/// Environment with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::default()
    }
}
