//! Scripted artifact transport serving files from memory

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use restorer::services::ArtifactTransport;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct TransportState {
    files: HashMap<String, Vec<u8>>,
    /// Remaining failures per file before it is served
    flaky: HashMap<String, u32>,
    requests: Vec<String>,
}

/// Cloneable handle; clones share served files and the request log
#[derive(Clone)]
pub struct FakeTransport {
    name: String,
    available: bool,
    state: Arc<Mutex<TransportState>>,
}

impl FakeTransport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: true,
            state: Arc::new(Mutex::new(TransportState::default())),
        }
    }

    /// Transport whose tool is not installed
    pub fn unavailable(name: &str) -> Self {
        Self {
            available: false,
            ..Self::new(name)
        }
    }

    pub fn serve(self, filename: &str, body: &[u8]) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(filename.to_string(), body.to_vec());
        self
    }

    /// Serves every file in `filenames` with a body comfortably above the size threshold
    pub fn serve_all(self, filenames: &[&str]) -> Self {
        filenames
            .iter()
            .fold(self, |t, f| t.serve(f, format!("payload of {}", f).as_bytes()))
    }

    /// Fails the first `times` requests for `filename`
    pub fn flaky(self, filename: &str, times: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .flaky
            .insert(filename.to_string(), times);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self, filename: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.ends_with(&format!("/{}", filename)))
            .count()
    }

    pub fn boxed(&self) -> Box<dyn ArtifactTransport> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl ArtifactTransport for FakeTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn available(&self) -> bool {
        self.available
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let body = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(url.to_string());

            let filename = url.rsplit('/').next().unwrap_or_default().to_string();
            if let Some(remaining) = state.flaky.get_mut(&filename) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(anyhow!("{}: connection reset fetching {}", self.name, url));
                }
            }

            match state.files.get(&filename) {
                Some(body) => body.clone(),
                None => return Err(anyhow!("{}: {} returned 404", self.name, url)),
            }
        };

        tokio::fs::write(dest, &body).await?;
        Ok(body.len() as u64)
    }
}
