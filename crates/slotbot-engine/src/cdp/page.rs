//! CDP page session: all interaction with a single page/tab.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures::SinkExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

use super::client::{PendingRequest, WsSink};
use super::error::CdpError;
use super::protocol::{BoxModel, CdpRequest, RemoteObject};

/// A session attached to a single page/target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    /// WebSocket sender (shared with the client).
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Pending requests (shared with the client).
    pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
    /// Request ID counter (shared with the client).
    request_id: Arc<AtomicU64>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
        request_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            ws_tx,
            pending,
            request_id,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: Some(self.session_id.clone()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP session send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(Duration::from_secs(30), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Enable the CDP domains the probes rely on.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate to URL and wait for the document to become usable.
    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let result = self.call("Page.navigate", Some(json!({"url": url}))).await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::NavigationFailed(error.to_string()));
            }
        }

        self.wait_for_load(Duration::from_secs(25)).await?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    /// Wait until `document.readyState` reports a usable document.
    ///
    /// `interactive` is accepted deliberately: pages on the target site keep
    /// loading trackers long after the DOM is workable (eager strategy).
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            let result = self.evaluate("document.readyState").await?;

            if let Some(state) = result.as_str() {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Reload the page.
    pub async fn reload(&self) -> Result<(), CdpError> {
        self.call("Page.reload", None).await?;
        self.wait_for_load(Duration::from_secs(25)).await?;
        Ok(())
    }

    /// Current URL.
    pub async fn url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    // ========================================================================
    // JavaScript execution
    // ========================================================================

    /// Evaluate a JavaScript expression, returning its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(CdpError::JavaScript(exception_text(exception)));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Evaluate a JavaScript expression, returning a remote object handle.
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": false,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(CdpError::JavaScript(exception_text(exception)));
        }

        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    /// Call a function with `this` bound to the given remote object,
    /// returning the result by value.
    pub async fn call_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "arguments": args.into_iter().map(|v| json!({"value": v})).collect::<Vec<_>>(),
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(CdpError::JavaScript(exception_text(exception)));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Call a function on a remote object, returning a new handle
    /// (e.g. `this.closest('label')`).
    pub async fn call_on_handle(
        &self,
        object_id: &str,
        function: &str,
    ) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "returnByValue": false,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(CdpError::JavaScript(exception_text(exception)));
        }

        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Dispatch a trusted left click at viewport coordinates.
    pub async fn mouse_click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        for event_type in ["mousePressed", "mouseReleased"] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": "left",
                    "clickCount": 1,
                })),
            )
            .await?;
        }
        Ok(())
    }

    /// Insert text into the focused element via the input pipeline.
    pub async fn insert_text(&self, text: &str) -> Result<(), CdpError> {
        self.call("Input.insertText", Some(json!({"text": text})))
            .await?;
        Ok(())
    }

    /// Press Ctrl+A (select all in the focused field).
    pub async fn select_all(&self) -> Result<(), CdpError> {
        for event_type in ["keyDown", "keyUp"] {
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({
                    "type": event_type,
                    "key": "a",
                    "modifiers": 2,
                })),
            )
            .await?;
        }
        Ok(())
    }

    // ========================================================================
    // DOM
    // ========================================================================

    /// Box model for a remote element, `None` when the element has no
    /// layout (hidden or zero-sized).
    pub async fn box_model(&self, object_id: &str) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"objectId": object_id})))
            .await;

        match result {
            Ok(r) => {
                let model: BoxModel = serde_json::from_value(r["model"].clone())?;
                Ok(Some(model))
            }
            Err(CdpError::Protocol { code: -32000, message }) => {
                // "Could not compute box model" means no layout; a dead
                // handle must still surface as staleness.
                let probe = CdpError::Protocol {
                    code: -32000,
                    message: message.clone(),
                };
                if probe.is_stale() {
                    Err(probe)
                } else {
                    Ok(None)
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Focus a remote element.
    pub async fn focus(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("DOM.focus", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }
}

fn exception_text(exception: &Value) -> String {
    exception["exception"]["description"]
        .as_str()
        .or_else(|| exception["text"].as_str())
        .unwrap_or("Unknown error")
        .to_string()
}
