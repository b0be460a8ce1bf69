//! In-memory asset details API
//!
//! Each id owns a queue of scripted responses. The last response in a queue
//! repeats forever; ids without a script answer 404.

use async_trait::async_trait;
use sndcat_ingest::services::{AssetResponse, AssetTransport, LookupError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeAssets {
    scripts: Mutex<HashMap<String, VecDeque<AssetResponse>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// `id` always resolves to `name`
    pub fn with_name(self, id: &str, name: &str) -> Self {
        self.with_responses(id, vec![ok_body(name)])
    }

    /// `id` answers with `responses` in order
    pub fn with_responses(self, id: &str, responses: Vec<AssetResponse>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(id.to_string(), responses.into());
        self
    }

    /// Every id requested, in request order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == id).count()
    }
}

/// 200 response carrying `name` under the `Name` key
pub fn ok_body(name: &str) -> AssetResponse {
    AssetResponse::new(200, serde_json::json!({ "Name": name }).to_string())
}

#[async_trait]
impl AssetTransport for FakeAssets {
    async fn fetch(&self, id: &str) -> Result<AssetResponse, LookupError> {
        self.calls.lock().unwrap().push(id.to_string());

        let mut scripts = self.scripts.lock().unwrap();
        let response = match scripts.get_mut(id) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| AssetResponse::new(404, "")))
    }
}
