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

use std::sync::Arc;

use anyhow::Result;
use owlery_core::Method;
use owlery_core::Request;
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

use crate::init;
use crate::mock::Recorder;
use crate::mock::Script;

#[tokio::test]
async fn test_cancel_before_body_is_written() -> Result<()> {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (ctx, transport) = init([Script::ok("{}").gated(entered.clone(), release.clone())]);
    let recorder = Recorder::default();

    let mut req = Request::new("http://h/user", Method::Post);
    req.add_post_param("name", "John Doe");
    let dispatch = req.execute(&ctx, recorder.clone());

    entered.notified().await;
    assert!(dispatch.cancel());
    assert!(!dispatch.cancel());
    assert!(dispatch.is_cancelled());
    release.notify_one();

    let (req, resp) = dispatch.join().await?;
    assert_eq!(resp.status_code(), None);
    assert!(resp.body_bytes().is_none());
    assert!(recorder.events().is_empty());
    assert!(!req.is_cancelled());

    let recorded = transport.recorded();
    assert_eq!(recorded.writes, 0);
    assert_eq!(recorded.disconnects, 1);
    Ok(())
}

#[tokio::test]
async fn test_cancel_get_before_head() -> Result<()> {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (ctx, transport) = init([Script::ok("{}").gated(entered.clone(), release.clone())]);
    let recorder = Recorder::default();

    let dispatch = Request::new("http://h/", Method::Get).execute(&ctx, recorder.clone());

    entered.notified().await;
    dispatch.cancel();
    release.notify_one();

    let (_, resp) = dispatch.join().await?;
    assert_eq!(resp.status_code(), None);
    assert!(resp.model().is_none());
    assert!(recorder.events().is_empty());
    assert!(transport.recorded().streams.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cancel_between_body_chunks() -> Result<()> {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (ctx, transport) =
        init([Script::ok("{}").gated_write(entered.clone(), release.clone())]);
    let recorder = Recorder::default();

    let mut req = Request::new("http://h/upload", Method::Post);
    req.add_post_param("data", &"x".repeat(3000));
    let dispatch = req.execute(&ctx, recorder.clone());

    entered.notified().await;
    dispatch.cancel();
    release.notify_one();

    let (_, resp) = dispatch.join().await?;
    assert_eq!(resp.status_code(), None);
    assert!(recorder.events().is_empty());

    let recorded = transport.recorded();
    assert_eq!(recorded.writes, 1);
    assert_eq!(recorded.body.len(), 1024);
    assert!(recorded.streams.is_empty());
    assert_eq!(recorded.disconnects, 1);
    Ok(())
}

#[tokio::test]
async fn test_cancel_while_reading_body() -> Result<()> {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let body = format!(r#"{{"data": "{}"}}"#, "x".repeat(3000));
    let (ctx, transport) = init([Script::ok(body).gated_read(entered.clone(), release.clone())]);
    let recorder = Recorder::default();

    let dispatch = Request::new("http://h/", Method::Get).execute(&ctx, recorder.clone());

    entered.notified().await;
    dispatch.cancel();
    release.notify_one();

    let (_, resp) = dispatch.join().await?;
    assert_eq!(resp.status_code(), Some(200));
    assert!(resp.body_bytes().is_none());
    assert!(resp.model().is_none());
    assert!(recorder.events().is_empty());
    assert_eq!(transport.recorded().disconnects, 1);
    Ok(())
}

#[tokio::test]
async fn test_finished_dispatch_ignores_late_cancel() -> Result<()> {
    let (ctx, _) = init([Script::ok("{}")]);
    let recorder = Recorder::default();

    let dispatch = Request::new("http://h/", Method::Get).execute(&ctx, recorder.clone());
    while !dispatch.is_finished() {
        tokio::task::yield_now().await;
    }
    dispatch.cancel();

    let (_, resp) = dispatch.join().await?;
    assert_eq!(resp.status_code(), Some(200));
    assert_eq!(recorder.events(), vec!["success", "complete"]);
    Ok(())
}
