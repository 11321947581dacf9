use crate::error::{E2eError, Result};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};
use url::Url;

/// Upper bound for a single CDP round trip
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type PendingMap = HashMap<u64, mpsc::UnboundedSender<CdpMessage>>;

/// CDP message structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdpMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CdpError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdpError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Chrome tab information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub websocket_debugger_url: Option<String>,
}

/// CDP client bound to a single tab
pub struct CdpClient {
    sink: Mutex<Option<WsSink>>,
    message_id: AtomicU64,
    pending_requests: Arc<Mutex<PendingMap>>,
    http: reqwest::Client,
    chrome_host: String,
    chrome_port: u16,
    tab_id: std::sync::RwLock<Option<String>>,
}

impl CdpClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            sink: Mutex::new(None),
            message_id: AtomicU64::new(1),
            pending_requests: Arc::new(Mutex::new(HashMap::new())),
            http: reqwest::Client::new(),
            chrome_host: host.to_string(),
            chrome_port: port,
            tab_id: std::sync::RwLock::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("http://{}:{}/json{}", self.chrome_host, self.chrome_port, path)
    }

    /// Create a new tab
    pub async fn create_tab(&self, url: Option<&str>) -> Result<TabInfo> {
        let mut endpoint = self.endpoint("/new");
        if let Some(u) = url {
            endpoint.push_str(&format!("?{}", u));
        }

        // recent Chrome versions reject GET on /json/new
        let response = self
            .http
            .put(&endpoint)
            .send()
            .await
            .map_err(|e| E2eError::cdp_connection(format!("Failed to create tab: {}", e)))?;

        response
            .json()
            .await
            .map_err(|e| E2eError::cdp_protocol(format!("Failed to parse new tab: {}", e)))
    }

    /// Close a tab
    pub async fn close_tab(&self, tab_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("/close/{}", tab_id));

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| E2eError::cdp_connection(format!("Failed to close tab: {}", e)))?;

        if !response.status().is_success() {
            return Err(E2eError::cdp_protocol(format!(
                "Failed to close tab: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Connect to a specific tab
    pub async fn connect_to_tab(&self, tab: &TabInfo) -> Result<()> {
        let ws_url = tab
            .websocket_debugger_url
            .as_ref()
            .ok_or_else(|| E2eError::cdp_protocol("Tab has no WebSocket debugger URL"))?;

        debug!("Connecting to tab WebSocket: {}", ws_url);

        let url = Url::parse(ws_url)
            .map_err(|e| E2eError::cdp_connection(format!("Invalid WebSocket URL: {}", e)))?;

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| E2eError::cdp_connection(format!("WebSocket connection failed: {}", e)))?;

        let (sink, stream) = ws_stream.split();
        *self.sink.lock().await = Some(sink);
        if let Ok(mut id) = self.tab_id.write() {
            *id = Some(tab.id.clone());
        }

        self.start_message_loop(stream);
        self.enable_domains().await
    }

    /// Enable CDP domains required for automation
    async fn enable_domains(&self) -> Result<()> {
        for domain in ["Page", "Runtime", "DOM"] {
            self.send_command(&format!("{}.enable", domain), None).await?;
        }
        Ok(())
    }

    /// Route responses from the websocket to the requests waiting on them
    fn start_message_loop(
        &self,
        mut stream: futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    ) {
        let pending_requests = Arc::clone(&self.pending_requests);

        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        trace!("Received CDP message: {}", text);
                        match serde_json::from_str::<CdpMessage>(&text) {
                            Ok(cdp_msg) => {
                                if let Some(id) = cdp_msg.id {
                                    if let Some(sender) = pending_requests.lock().await.remove(&id) {
                                        if sender.send(cdp_msg).is_err() {
                                            warn!("Failed to send response to waiting request {}", id);
                                        }
                                    }
                                } else {
                                    trace!("CDP Event: {:?}", cdp_msg.method);
                                }
                            }
                            Err(e) => {
                                error!("Failed to parse CDP message: {}", e);
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("WebSocket connection closed");
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            // dropping the senders wakes every request still waiting
            pending_requests.lock().await.clear();
        });
    }

    /// Send a CDP command and wait for response
    pub async fn send_command(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.message_id.fetch_add(1, Ordering::Relaxed);

        let message = CdpMessage {
            id: Some(id),
            method: Some(method.to_string()),
            params,
            result: None,
            error: None,
        };

        let (response_tx, mut response_rx) = mpsc::unbounded_channel();
        self.pending_requests.lock().await.insert(id, response_tx);

        if let Err(e) = self.send_message(&message).await {
            self.pending_requests.lock().await.remove(&id);
            return Err(e);
        }

        let response = timeout(COMMAND_TIMEOUT, response_rx.recv())
            .await
            .map_err(|_| E2eError::Timeout {
                timeout: COMMAND_TIMEOUT.as_millis() as u64,
            })?
            .ok_or_else(|| E2eError::cdp_protocol("Response channel closed"))?;

        if let Some(error) = response.error {
            return Err(E2eError::cdp_protocol(format!(
                "CDP error {}: {}",
                error.code, error.message
            )));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn send_message(&self, message: &CdpMessage) -> Result<()> {
        let json_msg = serde_json::to_string(message)?;
        trace!("Sending CDP message: {}", json_msg);

        let mut sink = self.sink.lock().await;
        let sink = sink
            .as_mut()
            .ok_or_else(|| E2eError::cdp_connection("Not connected to a tab"))?;
        sink.send(Message::Text(json_msg)).await?;
        Ok(())
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<Value> {
        let result = self
            .send_command("Page.navigate", Some(json!({ "url": url })))
            .await?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            return Err(E2eError::cdp_protocol(format!(
                "Navigation to {} failed: {}",
                url, error_text
            )));
        }

        Ok(result)
    }

    /// Evaluate JavaScript and return the value it produced
    pub async fn evaluate_js(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true
                })),
            )
            .await?;

        if let Some(exception_details) = result.get("exceptionDetails") {
            return Err(E2eError::javascript_error(format!(
                "JS Exception: {}",
                exception_details
            )));
        }

        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Take a screenshot, returned as base64
    pub async fn screenshot(&self, format: &str) -> Result<String> {
        let result = self
            .send_command("Page.captureScreenshot", Some(json!({ "format": format })))
            .await?;

        result
            .get("data")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| E2eError::cdp_protocol("No screenshot data returned"))
    }

    /// Insert text into the focused element
    pub async fn insert_text(&self, text: &str) -> Result<()> {
        self.send_command("Input.insertText", Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    /// Drop the websocket sink
    pub async fn disconnect(&self) {
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.close().await;
        }
    }

    /// Get the current tab ID
    pub fn current_tab_id(&self) -> Option<String> {
        self.tab_id.read().ok().and_then(|id| id.clone())
    }
}
