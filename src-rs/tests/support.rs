use anyhow::Result;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::config::{ProviderSettings, Settings, SettingsStore};
use crate::selection::host::{EditorHost, InputRequest, PickItem, SelectionStats, Telemetry};

pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn chat_completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub head: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct StubRoute {
    pub path_suffix: &'static str,
    pub status: u16,
    pub body: String,
}

impl StubRoute {
    pub fn new(path_suffix: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            path_suffix,
            status,
            body: body.into(),
        }
    }
}

/// Minimal HTTP/1.1 responder on 127.0.0.1 standing in for a provider API.
pub struct HttpStub {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl HttpStub {
    pub async fn spawn(routes: Vec<StubRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let Some(request) = read_request(&mut stream).await else {
                    continue;
                };
                let (status, body) = routes
                    .iter()
                    .find(|r| request.path.ends_with(r.path_suffix))
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, "not found".to_string()));
                recorded.lock().unwrap().push(request);

                let reason = if status < 400 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(pos) = find_header_end(&buf) else {
            continue;
        };

        let head = String::from_utf8_lossy(&buf[..pos]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (k, v) = line.split_once(':')?;
                if k.trim().eq_ignore_ascii_case("content-length") {
                    v.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        let body_start = pos + 4;
        while buf.len() < body_start + content_length {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let path = request_line.next().unwrap_or_default().to_string();
        return Some(RecordedRequest {
            method,
            path,
            head: head.clone(),
            body: String::from_utf8_lossy(&buf[body_start..]).to_string(),
        });
    }
}

/// Scripted editor: queued answers for dialogs, recorded notifications and mentions.
#[derive(Default)]
pub struct RecordingHost {
    pub inputs: Mutex<VecDeque<Option<String>>>,
    pub picks: Mutex<VecDeque<Option<String>>>,
    pub confirm_answer: bool,
    pub roots: Vec<PathBuf>,
    pub failing_mentions: HashSet<PathBuf>,
    /// Deleted while the confirmation dialog is open
    pub remove_on_confirm: Option<PathBuf>,
    pub input_requests: Mutex<Vec<InputRequest>>,
    pub pick_items: Mutex<Vec<Vec<PickItem>>>,
    pub confirmations: Mutex<Vec<String>>,
    pub mentions: Mutex<Vec<PathBuf>>,
    pub infos: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn with_root(root: &Path) -> Self {
        Self {
            roots: vec![root.to_path_buf()],
            ..Default::default()
        }
    }

    pub fn queue_input(&self, value: Option<&str>) {
        self.inputs
            .lock()
            .unwrap()
            .push_back(value.map(|v| v.to_string()));
    }

    pub fn queue_pick(&self, value: Option<&str>) {
        self.picks
            .lock()
            .unwrap()
            .push_back(value.map(|v| v.to_string()));
    }

    pub fn mentions(&self) -> Vec<PathBuf> {
        self.mentions.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl EditorHost for RecordingHost {
    async fn prompt_input(&self, request: InputRequest) -> Option<String> {
        self.input_requests.lock().unwrap().push(request);
        self.inputs.lock().unwrap().pop_front().flatten()
    }

    async fn pick(&self, _title: &str, items: Vec<PickItem>) -> Option<String> {
        self.pick_items.lock().unwrap().push(items);
        self.picks.lock().unwrap().pop_front().flatten()
    }

    async fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().unwrap().push(message.to_string());
        if let Some(path) = &self.remove_on_confirm {
            fs::remove_dir_all(path).unwrap();
        }
        self.confirm_answer
    }

    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn progress(&self, message: &str) {
        self.progress.lock().unwrap().push(message.to_string());
    }

    fn workspace_roots(&self) -> Vec<PathBuf> {
        self.roots.clone()
    }

    async fn mention(&self, path: &Path) -> Result<()> {
        if self.failing_mentions.contains(path) {
            anyhow::bail!("assistant rejected {}", path.display());
        }
        self.mentions.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// In-memory settings scope that counts loads and records saves.
pub struct MemorySettingsStore {
    pub settings: Mutex<Settings>,
    pub saved: Mutex<Vec<ProviderSettings>>,
    pub loads: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            saved: Mutex::new(Vec::new()),
            loads: Mutex::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }

    pub fn saved(&self) -> Vec<ProviderSettings> {
        self.saved.lock().unwrap().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        *self.loads.lock().unwrap() += 1;
        Ok(self.settings.lock().unwrap().clone())
    }

    fn save_provider(&self, provider: &ProviderSettings) -> Result<()> {
        let mut settings = self.settings.lock().unwrap();
        settings.provider = Some(provider.provider.code().to_string());
        settings.api_key = Some(provider.api_key.clone());
        if let Some(model) = &provider.model {
            settings.model = Some(model.clone());
        }
        if let Some(url) = &provider.base_url {
            settings
                .base_urls
                .insert(provider.provider.code().to_string(), url.clone());
        }
        self.saved.lock().unwrap().push(provider.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub events: Mutex<Vec<(String, SelectionStats)>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<(String, SelectionStats)> {
        self.events.lock().unwrap().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn record(&self, event: &str, stats: SelectionStats) {
        self.events.lock().unwrap().push((event.to_string(), stats));
    }
}

/// Settings with an OpenAI-style provider pointed at `base_url` and no exclusions.
pub fn openai_settings(base_url: &str) -> Settings {
    let mut settings = Settings {
        provider: Some("openai".to_string()),
        api_key: Some("test-key".to_string()),
        model: Some("gpt-test".to_string()),
        ..Default::default()
    };
    settings
        .base_urls
        .insert("openai".to_string(), base_url.to_string());
    settings
}
