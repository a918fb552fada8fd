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

use anyhow::Result;
use async_trait::async_trait;
use http::header;
use owlery_core::Error;
use owlery_core::Method;
use owlery_core::Request;
use owlery_core::Sign;
use pretty_assertions::assert_eq;

use crate::init;
use crate::mock::Recorder;
use crate::mock::Script;

#[tokio::test]
async fn test_cookies_are_kept_across_dispatches() -> Result<()> {
    let (ctx, transport) = init([
        Script::ok("{}").header("set-cookie", "session=abc; Path=/; HttpOnly"),
        Script::ok("{}"),
        Script::ok("{}"),
    ]);

    let _ = Request::new("http://h/login", Method::Post).send(&ctx).await;
    let _ = Request::new("http://h/profile", Method::Get).send(&ctx).await;
    let _ = Request::new("http://other/", Method::Get).send(&ctx).await;

    let recorded = transport.recorded();
    assert!(recorded.connects[0].headers.get(header::COOKIE).is_none());
    assert_eq!(recorded.connects[1].headers[header::COOKIE], "session=abc");
    assert!(recorded.connects[2].headers.get(header::COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn test_removed_cookies_are_not_sent() -> Result<()> {
    let (ctx, transport) = init([
        Script::ok("{}").header("set-cookie", "session=abc"),
        Script::ok("{}"),
    ]);

    let _ = Request::new("http://h/login", Method::Get).send(&ctx).await;
    ctx.remove_cookies(Some("http://h/"));
    let _ = Request::new("http://h/profile", Method::Get).send(&ctx).await;

    assert!(transport.recorded().connects[1]
        .headers
        .get(header::COOKIE)
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_unsendable_cookie_is_skipped() -> Result<()> {
    let (ctx, transport) = init([Script::ok("{}")]);
    ctx.store_cookies("http://h/", &["ok=1", "bad=a\u{7f}b"]);
    let recorder = Recorder::default();

    let (_, resp) = Request::new("http://h/profile", Method::Get)
        .execute(&ctx, recorder.clone())
        .join()
        .await?;

    assert_eq!(resp.status_code(), Some(200));
    assert_eq!(recorder.events(), vec!["success", "complete"]);
    assert_eq!(transport.recorded().connects[0].headers[header::COOKIE], "ok=1");
    Ok(())
}

#[derive(Debug)]
struct StampSigner;

#[async_trait]
impl Sign for StampSigner {
    async fn sign(&self, req: &mut Request) -> owlery_core::Result<()> {
        req.insert_header("authorization", "stamp")?;
        req.add_query_param("signed", "1");
        Ok(())
    }
}

#[derive(Debug)]
struct BrokenSigner;

#[async_trait]
impl Sign for BrokenSigner {
    async fn sign(&self, _: &mut Request) -> owlery_core::Result<()> {
        Err(Error::credential_invalid("no consumer key"))
    }
}

#[tokio::test]
async fn test_signer_runs_before_connect() -> Result<()> {
    let (ctx, transport) = init([Script::ok("{}")]);

    let req = Request::new("http://h/", Method::Get).sign_with(StampSigner);
    let _ = req.send(&ctx).await;

    let recorded = transport.recorded();
    assert_eq!(recorded.connects[0].headers[header::AUTHORIZATION], "stamp");
    assert_eq!(recorded.connects[0].url, "http://h/?signed=1");
    Ok(())
}

#[tokio::test]
async fn test_signing_failure_sends_unsigned() -> Result<()> {
    let (ctx, transport) = init([Script::ok("{}")]);

    let req = Request::new("http://h/", Method::Get).sign_with(BrokenSigner);
    let (_, resp) = req.send(&ctx).await;

    assert!(resp.is_success());
    assert!(transport.recorded().connects[0]
        .headers
        .get(header::AUTHORIZATION)
        .is_none());
    Ok(())
}
