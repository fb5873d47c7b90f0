//! Real-time symptom alerts.
//!
//! Speaks the backend's Phoenix-channel protocol over a WebSocket:
//!
//! 1. Connect to `{url}/realtime/v1/websocket?apikey=..&vsn=1.0.0`
//! 2. Send `phx_join` on `realtime:symptom-alerts` with an INSERT filter on
//!    `symptom_records` for one user, and wait for an `ok` reply
//! 3. Heartbeat on the `phoenix` topic while forwarding inserted rows
//! 4. Send `phx_leave` and close when the subscription ends
//!
//! The returned [`Subscription`] owns the channel task. Dropping it ends the
//! channel, so the listener is released on every exit path of the owner.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gastro_model::{AlertSeverity, SymptomRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async_with_config, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::config::BackendConfig;
use crate::error::{Result, StoreError};

/// Channel name shared by all alert subscriptions.
const CHANNEL: &str = "symptom-alerts";

/// Interval between heartbeats (server drops idle sockets after ~60s).
const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(30);

/// Time allowed for the join reply.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// A newly inserted symptom record severe enough to alert on.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomAlert {
    pub severity: AlertSeverity,
    pub record: SymptomRecord,
}

impl SymptomAlert {
    /// `None` when the record's pain level does not warrant an alert.
    pub fn classify(record: SymptomRecord) -> Option<Self> {
        AlertSeverity::from_pain(record.pain_level).map(|severity| Self { severity, record })
    }

    pub fn message(&self) -> &'static str {
        self.severity.message()
    }
}

/// Phoenix channel frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Frame {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

impl Frame {
    fn new(topic: &str, event: &str, payload: Value, reference: u64) -> Self {
        Self {
            topic: topic.to_string(),
            event: event.to_string(),
            payload,
            reference: Some(reference.to_string()),
        }
    }

    fn to_message(&self) -> Result<Message> {
        Ok(Message::Text(serde_json::to_string(self)?))
    }
}

/// Client for the real-time endpoint.
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    socket_url: String,
    access_token: String,
    heartbeat: Duration,
}

impl RealtimeClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate().map_err(StoreError::Configuration)?;

        let base = config.base_url();
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            return Err(StoreError::Configuration(format!("Unsupported backend URL: {}", base)));
        };

        Ok(Self {
            socket_url: format!(
                "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
                ws_base,
                urlencoding::encode(&config.anon_key)
            ),
            access_token: config.bearer().to_string(),
            heartbeat: DEFAULT_HEARTBEAT,
        })
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat = interval;
        self
    }

    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }

    /// Deliver an alert for every new symptom row of `user_id` with pain >= 6.
    ///
    /// Returns once the server has accepted the join. Keep the returned handle
    /// alive for as long as alerts are wanted.
    pub async fn subscribe_symptom_alerts<F>(&self, user_id: &str, on_alert: F) -> Result<Subscription>
    where
        F: Fn(SymptomAlert) + Send + 'static,
    {
        let topic = format!("realtime:{}", CHANNEL);

        let (ws, _) = connect_async_with_config(self.socket_url.as_str(), None, false)
            .await
            .map_err(|e| StoreError::Realtime(format!("WebSocket connect failed: {}", e)))?;
        let (mut write, mut read) = ws.split();

        let join = Frame::new(
            &topic,
            "phx_join",
            json!({
                "config": {
                    "broadcast": { "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [{
                        "event": "INSERT",
                        "schema": "public",
                        "table": "symptom_records",
                        "filter": format!("user_id=eq.{}", user_id),
                    }],
                },
                "access_token": self.access_token,
            }),
            1,
        );
        write
            .send(join.to_message()?)
            .await
            .map_err(|e| StoreError::Realtime(format!("Failed to send join: {}", e)))?;

        // Wait for the join reply
        let joined = tokio::time::timeout(JOIN_TIMEOUT, async {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let Ok(frame) = serde_json::from_str::<Frame>(&text) else {
                            continue;
                        };
                        if frame.event == "phx_reply" && frame.reference.as_deref() == Some("1") {
                            return match frame.payload["status"].as_str() {
                                Some("ok") => Ok(()),
                                _ => Err(StoreError::Realtime(format!(
                                    "Join rejected: {}",
                                    frame.payload["response"]
                                ))),
                            };
                        }
                    }
                    Ok(Message::Close(_)) => {
                        return Err(StoreError::Realtime("Connection closed during join".to_string()));
                    }
                    Err(e) => return Err(StoreError::Realtime(format!("WebSocket error: {}", e))),
                    _ => continue,
                }
            }
            Err(StoreError::Realtime("No join reply received".to_string()))
        })
        .await
        .map_err(|_| StoreError::Realtime("Timeout waiting for join reply".to_string()))?;

        if let Err(e) = joined {
            let _ = write.close().await;
            return Err(e);
        }

        info!(user_id = %user_id, %topic, "Subscribed to symptom alerts");

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let heartbeat = self.heartbeat;
        let task_topic = topic.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(heartbeat);
            ticker.tick().await;
            let mut next_ref: u64 = 2;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        let leave = Frame::new(&task_topic, "phx_leave", json!({}), next_ref);
                        if let Ok(msg) = leave.to_message() {
                            let _ = write.send(msg).await;
                        }
                        let _ = write.close().await;
                        debug!(topic = %task_topic, "Left alert channel");
                        break;
                    }
                    _ = ticker.tick() => {
                        let beat = Frame::new("phoenix", "heartbeat", json!({}), next_ref);
                        next_ref += 1;
                        let sent = match beat.to_message() {
                            Ok(msg) => write.send(msg).await.map_err(|e| e.to_string()),
                            Err(e) => Err(e.to_string()),
                        };
                        if let Err(e) = sent {
                            error!(error = %e, "Heartbeat failed, closing alert channel");
                            break;
                        }
                    }
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                if let Some(record) = parse_insert(&text) {
                                    match SymptomAlert::classify(record) {
                                        Some(alert) => {
                                            info!(severity = %alert.severity, record_id = %alert.record.id, "Symptom alert");
                                            on_alert(alert);
                                        }
                                        None => debug!("Inserted symptom below alert threshold"),
                                    }
                                }
                            }
                            Some(Ok(Message::Ping(data))) => {
                                let _ = write.send(Message::Pong(data)).await;
                            }
                            Some(Ok(Message::Close(frame))) => {
                                info!(?frame, "Alert channel closed by server");
                                break;
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "Alert channel error");
                                break;
                            }
                            None => break,
                            _ => {}
                        }
                    }
                }
            }
        });

        Ok(Subscription {
            topic,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Extract the inserted row from a `postgres_changes` frame.
fn parse_insert(text: &str) -> Option<SymptomRecord> {
    let frame: Frame = serde_json::from_str(text).ok()?;
    if frame.event != "postgres_changes" {
        return None;
    }
    let data = frame.payload.get("data")?;
    if data.get("type").and_then(Value::as_str) != Some("INSERT") {
        return None;
    }
    match serde_json::from_value(data.get("record")?.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "Unreadable symptom row in change event");
            None
        }
    }
}

/// Handle for an active alert subscription.
///
/// Call [`Subscription::unsubscribe`] to leave and wait for the channel to
/// close. Dropping the handle signals the same shutdown without waiting.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the channel task is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Resolve when the channel ends without being asked to: the server
    /// closed it, the socket failed, or a heartbeat could not be sent.
    /// Returns at once if the channel task has already been collected.
    pub async fn closed(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        let outcome = task.await;
        self.task = None;
        if let Err(e) = outcome {
            warn!(error = %e, "Alert channel task ended abnormally");
        }
    }

    /// Leave the channel and wait for the socket to close.
    pub async fn unsubscribe(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Alert channel task ended abnormally");
            }
        }
        info!(topic = %self.topic, "Unsubscribed from symptom alerts");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_frame(pain: u8) -> String {
        json!({
            "topic": "realtime:symptom-alerts",
            "event": "postgres_changes",
            "ref": null,
            "payload": {
                "ids": [1],
                "data": {
                    "type": "INSERT",
                    "schema": "public",
                    "table": "symptom_records",
                    "commit_timestamp": "2026-10-16T08:00:00Z",
                    "record": {
                        "id": "r1",
                        "user_id": "u1",
                        "recorded_at": "2026-10-16T08:00:00Z",
                        "pain_level": pain,
                        "throat_discomfort": false,
                        "bloating": false,
                        "acid_reflux": true,
                        "nausea": false,
                        "appetite_level": 2,
                        "triggers": [],
                        "created_at": "2026-10-16T08:00:00Z"
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_insert() {
        let record = parse_insert(&insert_frame(9)).unwrap();
        assert_eq!(record.pain_level, 9);
        assert!(record.acid_reflux);

        assert!(parse_insert(r#"{"topic":"phoenix","event":"phx_reply","payload":{}}"#).is_none());
        assert!(parse_insert("garbage").is_none());
    }

    #[test]
    fn test_classify_thresholds() {
        let severe = SymptomAlert::classify(parse_insert(&insert_frame(8)).unwrap()).unwrap();
        assert_eq!(severe.severity, AlertSeverity::Severe);
        let moderate = SymptomAlert::classify(parse_insert(&insert_frame(6)).unwrap()).unwrap();
        assert_eq!(moderate.severity, AlertSeverity::Moderate);
        assert!(SymptomAlert::classify(parse_insert(&insert_frame(5)).unwrap()).is_none());
    }

    #[test]
    fn test_socket_url() {
        let client = RealtimeClient::new(&BackendConfig {
            url: "https://abc.supabase.co/".into(),
            anon_key: "anon key".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.socket_url(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=anon%20key&vsn=1.0.0"
        );
    }
}
