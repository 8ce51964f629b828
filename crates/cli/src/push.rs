//! Push notification fan-out through an Expo-compatible gateway.
//!
//! Delivery is the gateway's job. This module only finds the users that
//! registered a push token and hands one message per user to the gateway.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use studyhub_store::{Document, PageRequest, StoreClient, StoreError, USERS_COLLECTION};
use tracing::{debug, error, trace};

/// Expo's public push endpoint.
pub const DEFAULT_GATEWAY_URL: &str = "https://exp.host/--/api/v2/push/send";

/// User fields that may carry a push token, in lookup order.
const TOKEN_FIELDS: [&str; 2] = ["pushToken", "expoPushToken"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One notification addressed to one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to:    String,
    pub sound: String,
    pub title: String,
    pub body:  String,
    pub data:  Value,
}

impl PushMessage {
    pub fn new(to: impl Into<String>, title: &str, body: &str, data: Value) -> Self {
        Self {
            to: to.into(),
            sound: "default".to_owned(),
            title: title.to_owned(),
            body: body.to_owned(),
            data,
        }
    }
}

/// Messages built from the users collection.
#[derive(Debug, Default)]
pub struct Recipients {
    pub messages: Vec<PushMessage>,
    /// Users without a usable push token
    pub skipped:  usize,
}

/// The push token of a user record, if it has a non-empty one.
pub fn push_token(user: &Document) -> Option<&str> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| user.data().get(*field).and_then(Value::as_str))
        .find(|token| !token.trim().is_empty())
}

/// Walks the users collection page by page and builds one message per user
/// with a push token.
pub async fn collect_messages(
    store: &dyn StoreClient,
    title: &str,
    body: &str,
    data: &Value,
    page_size: usize,
) -> studyhub_store::Result<Recipients> {
    let mut recipients = Recipients::default();
    let mut request = PageRequest::first(page_size);

    loop {
        let page = store.list_documents(USERS_COLLECTION, request).await?;
        let Some(last) = page.last()
        else {
            break;
        };
        request = PageRequest::after(page_size, last.id());
        let full = page.len() == page_size;

        for user in &page {
            match push_token(user) {
                Some(token) => recipients.messages.push(PushMessage::new(token, title, body, data.clone())),
                None => {
                    trace!("User '{}' has no push token", user.id());
                    recipients.skipped = recipients.skipped.saturating_add(1);
                },
            }
        }

        if !full {
            break;
        }
    }

    debug!(
        "Built {} push messages, skipped {} users without a token",
        recipients.messages.len(),
        recipients.skipped
    );
    Ok(recipients)
}

/// HTTP client for the push gateway.
#[derive(Debug, Clone)]
pub struct PushGateway {
    client: Client,
    url:    String,
}

impl PushGateway {
    pub fn new(url: impl Into<String>) -> studyhub_store::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                error!("Failed to build the push gateway client: {}", e);
                StoreError::Internal {
                    message: e.to_string(),
                }
            })?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str { &self.url }

    /// Posts one message and returns the gateway's JSON response.
    ///
    /// Connection failures and 5xx responses are `Network` errors and 429 is
    /// `Throttled`, so both can be retried with a [`studyhub_store::RetryPolicy`].
    pub async fn send(&self, message: &PushMessage) -> studyhub_store::Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(message)
            .send()
            .await
            .map_err(|e| {
                StoreError::Network {
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response.json::<Value>().await.map_err(|e| {
            StoreError::Network {
                reason: format!("invalid gateway response: {}", e),
            }
        })
    }
}

fn status_error(status: StatusCode, body: String) -> StoreError {
    let reason = format!("gateway returned {}: {}", status, body);
    if status == StatusCode::TOO_MANY_REQUESTS {
        StoreError::Throttled {
            reason,
        }
    }
    else if status.is_server_error() {
        StoreError::Network {
            reason,
        }
    }
    else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StoreError::PermissionDenied {
            reason,
        }
    }
    else {
        StoreError::Internal {
            message: reason,
        }
    }
}

/// The delivery status reported in a gateway ticket, e.g. `ok` or `error`.
pub fn ticket_status(response: &Value) -> Option<&str> { response.pointer("/data/status").and_then(Value::as_str) }
