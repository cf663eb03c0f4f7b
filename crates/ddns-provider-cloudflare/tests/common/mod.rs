//! Test doubles for Cloudflare client contract tests
//!
//! `FakeCloudflare` is a RequestExecutor that answers zone, record listing
//! and record update calls from canned bodies, and records every request it
//! receives.

#![allow(dead_code)]

use ddns_core::error::Result;
use ddns_core::{ApiRequest, ApiResponse, CancellationToken, RequestExecutor};
use ddns_provider_cloudflare::{ClientConfig, CloudflareClient};
use reqwest::Method;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Routes {
    zones: Option<ApiResponse>,
    pages: HashMap<u32, ApiResponse>,
    update: Option<ApiResponse>,
}

/// Canned Cloudflare API
#[derive(Clone, Default)]
pub struct FakeCloudflare {
    routes: Arc<Mutex<Routes>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl FakeCloudflare {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zones(self, status: u16, body: Value) -> Self {
        self.routes.lock().unwrap().zones = Some(response(status, body));
        self
    }

    pub fn page(self, page: u32, body: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .pages
            .insert(page, response(200, body));
        self
    }

    pub fn update(self, status: u16, body: Value) -> Self {
        self.routes.lock().unwrap().update = Some(response(status, body));
        self
    }

    pub fn update_raw(self, status: u16, body: &str) -> Self {
        self.routes.lock().unwrap().update = Some(ApiResponse::new(status, body.as_bytes()));
        self
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Page numbers of every listing request, in order
    pub fn pages_requested(&self) -> Vec<u32> {
        self.requests()
            .iter()
            .filter(|r| r.url.contains("/dns_records?"))
            .filter_map(|r| query_param(&r.url, "page"))
            .filter_map(|p| p.parse().ok())
            .collect()
    }

    pub fn client(&self) -> CloudflareClient {
        CloudflareClient::with_executor(
            ClientConfig::new("test_token").with_base_url("https://api.test/client/v4"),
            Box::new(self.clone()),
        )
        .unwrap()
    }
}

#[async_trait::async_trait]
impl RequestExecutor for FakeCloudflare {
    async fn execute(
        &self,
        request: &ApiRequest,
        _cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let routes = self.routes.lock().unwrap();

        let canned = if request.method == Method::PUT {
            routes.update.clone()
        } else if request.url.contains("/dns_records?") {
            query_param(&request.url, "page")
                .and_then(|p| p.parse::<u32>().ok())
                .and_then(|p| routes.pages.get(&p).cloned())
        } else if request.url.contains("/zones?") {
            routes.zones.clone()
        } else {
            None
        };

        Ok(canned.unwrap_or_else(|| ApiResponse::new(404, "unexpected request")))
    }
}

fn response(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, serde_json::to_vec(&body).unwrap())
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Zone listing with one zone per `(id, name)`
pub fn zones_body(zones: &[(&str, &str)]) -> Value {
    let result: Vec<Value> = zones
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name, "status": "active" }))
        .collect();
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

/// One page of a record listing; each record is `(id, type, name, content)`
pub fn records_page(records: &[(&str, &str, &str, &str)], page: u32, total_pages: u32) -> Value {
    let result: Vec<Value> = records
        .iter()
        .map(|(id, kind, name, content)| {
            json!({
                "id": id,
                "type": kind,
                "name": name,
                "content": content,
                "proxied": true,
                "ttl": 1,
                "zone_id": "zone-1"
            })
        })
        .collect();
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
        "result_info": { "page": page, "per_page": 50, "total_pages": total_pages, "count": records.len() }
    })
}

/// Failed envelope carrying `errors` as given
pub fn error_body(errors: Value) -> Value {
    json!({ "success": false, "errors": errors, "messages": [], "result": null })
}

/// Successful update response
pub fn updated_body() -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": { "id": "rec-1", "type": "A", "name": "home.nenad.dev", "content": "198.51.100.7" }
    })
}
