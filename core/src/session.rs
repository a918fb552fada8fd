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
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Mutex;

use http::Uri;
use log::debug;

/// SessionState keeps cookies across dispatches that share a [`Context`](crate::Context).
pub trait SessionState: Debug + Send + Sync + 'static {
    /// Cookies to send to the url, as `name=value` pairs.
    fn cookies_for(&self, url: &str) -> Vec<String>;

    /// Remember the `Set-Cookie` values received from the url.
    fn store_cookies(&self, url: &str, set_cookies: &[&str]);

    /// Forget cookies of the url's origin, or every cookie if `url` is `None`.
    fn remove_cookies(&self, url: Option<&str>);
}

/// NoopSession keeps nothing, cookies are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSession;

impl SessionState for NoopSession {
    fn cookies_for(&self, _: &str) -> Vec<String> {
        Vec::new()
    }

    fn store_cookies(&self, _: &str, _: &[&str]) {}

    fn remove_cookies(&self, _: Option<&str>) {}
}

/// CookieJar stores cookies in memory keyed by `scheme://host`.
///
/// Only the `name=value` part of `Set-Cookie` is kept. `Max-Age=0` (or a
/// negative value) removes the cookie.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<HashMap<String, BTreeMap<String, String>>>,
}

impl CookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionState for CookieJar {
    fn cookies_for(&self, url: &str) -> Vec<String> {
        let Some(origin) = origin(url) else {
            return Vec::new();
        };

        let cookies = self.cookies.lock().expect("lock poisoned");
        cookies
            .get(&origin)
            .map(|jar| jar.iter().map(|(k, v)| format!("{k}={v}")).collect())
            .unwrap_or_default()
    }

    fn store_cookies(&self, url: &str, set_cookies: &[&str]) {
        let Some(origin) = origin(url) else {
            return;
        };

        let mut cookies = self.cookies.lock().expect("lock poisoned");
        let jar = cookies.entry(origin).or_default();
        for set_cookie in set_cookies {
            let Some(cookie) = SetCookie::parse(set_cookie) else {
                debug!("ignore malformed set-cookie: {set_cookie}");
                continue;
            };

            if cookie.expired {
                jar.remove(&cookie.name);
            } else {
                jar.insert(cookie.name, cookie.value);
            }
        }
    }

    fn remove_cookies(&self, url: Option<&str>) {
        let mut cookies = self.cookies.lock().expect("lock poisoned");
        match url {
            None => cookies.clear(),
            Some(url) => {
                if let Some(origin) = origin(url) {
                    cookies.remove(&origin);
                }
            }
        }
    }
}

struct SetCookie {
    name: String,
    value: String,
    expired: bool,
}

impl SetCookie {
    fn parse(s: &str) -> Option<Self> {
        let mut attrs = s.split(';');
        let (name, value) = attrs.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let expired = attrs.any(|attr| match attr.split_once('=') {
            Some((k, v)) => {
                k.trim().eq_ignore_ascii_case("max-age")
                    && v.trim().parse::<i64>().is_ok_and(|age| age <= 0)
            }
            None => false,
        });

        Some(SetCookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            expired,
        })
    }
}

fn origin(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    Some(format!(
        "{}://{}",
        uri.scheme_str()?.to_ascii_lowercase(),
        uri.host()?.to_ascii_lowercase()
    ))
}
