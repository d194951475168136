//! # Mock Resource
//!
//! Utilities for testing routing without real storage.
//!
//! [`MockResource`] is a handler that advertises a chosen capability set and
//! answers each call from a queue of expectations. Calls are recorded so tests
//! can assert on the normalized [`ResourceRequest`] the router produced.
//!
//! It lives in the library rather than behind `#[cfg(test)]` so integration
//! tests can use it.
//!
//! ```rust
//! use remple::mock::MockResource;
//! use remple::{Capability, Request, Router};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = Arc::new(MockResource::new([Capability::Show]));
//! mock.expect(Capability::Show).return_ok(json!({ "id": "abc123" }));
//!
//! let router = Router::builder()
//!     .resource("widgets", mock.clone())
//!     .build()
//!     .unwrap();
//!
//! let response = router.dispatch(Request::get("/widgets/abc123/")).await;
//! assert_eq!(response.status, 200);
//! assert_eq!(mock.calls()[0].1.id.as_deref(), Some("abc123"));
//! mock.verify();
//! # }
//! ```

use crate::capability::{Capability, CapabilitySet};
use crate::resource::{CustomEndpoint, Resource, ResourceError, ResourceRequest, ResourceResult};
use crate::route::RouteTarget;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A queued answer for the next call to a given target.
struct Expectation {
    target: RouteTarget,
    delay: Option<Duration>,
    response: ResourceResult,
}

type Shared<T> = Arc<Mutex<T>>;

/// A handler with expectation tracking for fluent testing.
pub struct MockResource {
    capabilities: CapabilitySet,
    custom: Vec<CustomEndpoint>,
    expectations: Shared<VecDeque<Expectation>>,
    calls: Shared<Vec<(RouteTarget, ResourceRequest)>>,
}

impl MockResource {
    /// Creates a mock advertising `capabilities`, with no expectations.
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            capabilities: capabilities.into_iter().collect(),
            custom: Vec::new(),
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock advertising every capability.
    pub fn full() -> Self {
        Self::new(Capability::ALL)
    }

    /// Also advertises a custom endpoint.
    pub fn with_custom_endpoint(mut self, endpoint: CustomEndpoint) -> Self {
        self.custom.push(endpoint);
        self
    }

    /// Expects a call to `capability`.
    pub fn expect(&self, capability: Capability) -> ExpectationBuilder {
        ExpectationBuilder {
            target: RouteTarget::Capability(capability),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a call to the custom action `action`.
    pub fn expect_custom(&self, action: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            target: RouteTarget::Custom(Arc::from(action)),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<(RouteTarget, ResourceRequest)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().map(|e| e.len()).unwrap_or_default();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    async fn answer(&self, target: RouteTarget, request: ResourceRequest) -> ResourceResult {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((target.clone(), request));
        }
        let next = self
            .expectations
            .lock()
            .ok()
            .and_then(|mut exps| exps.pop_front());
        match next {
            Some(expectation) if expectation.target == target => {
                if let Some(delay) = expectation.delay {
                    tokio::time::sleep(delay).await;
                }
                expectation.response
            }
            Some(expectation) => panic!(
                "Unexpected call: expected {}, got {}",
                expectation.target, target
            ),
            None => panic!("Unexpected call to {target}: no expectation queued"),
        }
    }
}

/// Builder for a single expectation.
pub struct ExpectationBuilder {
    target: RouteTarget,
    delay: Option<Duration>,
    expectations: Shared<VecDeque<Expectation>>,
}

impl ExpectationBuilder {
    /// Waits before answering; useful for cancellation tests.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful payload.
    pub fn return_ok(self, payload: Value) {
        self.push(Ok(payload));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ResourceError) {
        self.push(Err(error));
    }

    fn push(self, response: ResourceResult) {
        if let Ok(mut exps) = self.expectations.lock() {
            exps.push_back(Expectation {
                target: self.target,
                delay: self.delay,
                response,
            });
        }
    }
}

#[async_trait]
impl Resource for MockResource {
    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn custom_endpoints(&self) -> Vec<CustomEndpoint> {
        self.custom.clone()
    }

    async fn create(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Create), request).await
    }

    async fn new(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::New), request).await
    }

    async fn index(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Index), request).await
    }

    async fn show(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Show), request).await
    }

    async fn update(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Update), request).await
    }

    async fn edit(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Edit), request).await
    }

    async fn delete(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Delete), request).await
    }

    async fn search(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::Search), request).await
    }

    async fn new_search(&self, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Capability(Capability::NewSearch), request).await
    }

    async fn custom(&self, action: &str, request: ResourceRequest) -> ResourceResult {
        self.answer(RouteTarget::Custom(Arc::from(action)), request).await
    }
}
