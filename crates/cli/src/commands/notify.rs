use clap::Args;
use serde_json::Value;
use studyhub_store::{ResetConfig, StoreClient, StoreError};
use tracing::{error, info, warn};

use super::{open_store, StoreOptions};
use crate::push::{collect_messages, ticket_status, PushGateway, DEFAULT_GATEWAY_URL};

/// Arguments for the notify command.
#[derive(Args, Clone)]
pub struct NotifyArgs {
    #[command(flatten)]
    pub store:       StoreOptions,
    /// Notification title
    #[arg(long)]
    pub title:       String,
    /// Notification body
    #[arg(long)]
    pub body:        String,
    /// JSON payload delivered with the notification
    #[arg(long, value_parser = parse_json)]
    pub data:        Option<Value>,
    /// Push gateway endpoint
    #[arg(long, default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,
}

fn parse_json(s: &str) -> Result<Value, String> { serde_json::from_str(s).map_err(|e| format!("Invalid JSON: {}", e)) }

/// Send a push notification to every user with a push token.
///
/// Messages are sent one at a time. A send that fails after the configured
/// retries is logged and counted, and the remaining users are still notified.
///
/// # Returns
/// Returns `Ok(())` when every message was accepted by the gateway.
pub async fn run(args: NotifyArgs) -> studyhub_store::Result<()> {
    let config = args.store.load_config().await?;
    let store = open_store(&args.store.store_path, config.retry.clone()).await?;
    let gateway = PushGateway::new(args.gateway_url.as_str())?;
    notify_users(&*store, &gateway, &args, &config).await
}

async fn notify_users(
    store: &dyn StoreClient,
    gateway: &PushGateway,
    args: &NotifyArgs,
    config: &ResetConfig,
) -> studyhub_store::Result<()> {
    let data = args.data.clone().unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    let recipients = collect_messages(store, &args.title, &args.body, &data, config.page_size).await?;
    info!(
        "Sending '{}' to {} users through {} ({} users without a push token)",
        args.title,
        recipients.messages.len(),
        gateway.url(),
        recipients.skipped
    );

    let mut failed = 0_usize;
    for message in &recipients.messages {
        let outcome = config
            .retry
            .execute("push send", || gateway.send(message))
            .await;
        match outcome {
            Ok(response) => {
                info!("Gateway response for {}: {}", message.to, response);
                if ticket_status(&response) == Some("error") {
                    warn!("Gateway rejected the notification for {}", message.to);
                    failed = failed.saturating_add(1);
                }
            },
            Err(e) => {
                error!("Failed to notify {}: {}", message.to, e);
                failed = failed.saturating_add(1);
            },
        }
    }

    if failed == 0 {
        info!("Sent {} notifications", recipients.messages.len());
        Ok(())
    }
    else {
        Err(StoreError::Internal {
            message: format!(
                "{} of {} notifications failed",
                failed,
                recipients.messages.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use studyhub_store::{FsStore, StoreClient as _};
    use tempfile::TempDir;

    use super::*;
    use crate::push::tests::{local_gateway, one_shot_gateway};

    /// Runs the notification fan-out against a gateway on localhost.
    async fn notify_local(args: NotifyArgs) -> studyhub_store::Result<()> {
        let config = args.store.load_config().await?;
        let store = FsStore::new(&args.store.store_path).await?;
        let gateway = local_gateway(&args.gateway_url);
        notify_users(&store, &gateway, &args, &config).await
    }

    fn args_for(store_path: &std::path::Path, gateway_url: String) -> NotifyArgs {
        NotifyArgs {
            store: StoreOptions {
                store_path: store_path.to_string_lossy().to_string(),
                config:     None,
                page_size:  None,
            },
            title: "Reminder".to_string(),
            body: "Your test starts soon".to_string(),
            data: Some(json!({"testId": "algebra-quiz"})),
            gateway_url,
        }
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(parse_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert!(parse_json("{not json").is_err());
    }

    /// Test that users without a token are skipped and never reach the gateway.
    #[tokio::test]
    async fn test_notify_single_user() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("test_store");
        let store = FsStore::new(&store_path).await.unwrap();
        store
            .set_document("users", "student-1", json!({"name": "Sam", "pushToken": "tok-sam"}))
            .await
            .unwrap();
        store
            .set_document("users", "student-2", json!({"name": "Kim"}))
            .await
            .unwrap();

        let (url, server) = one_shot_gateway(200, r#"{"data":{"status":"ok","id":"t-1"}}"#).await;
        notify_local(args_for(&store_path, url)).await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received["to"], "tok-sam");
        assert_eq!(received["data"]["testId"], "algebra-quiz");
    }

    /// Test that a rejected ticket fails the command.
    #[tokio::test]
    async fn test_notify_rejected_ticket() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("test_store");
        let store = FsStore::new(&store_path).await.unwrap();
        store
            .set_document("users", "student-1", json!({"expoPushToken": "tok-bad"}))
            .await
            .unwrap();

        let (url, server) = one_shot_gateway(
            200,
            r#"{"data":{"status":"error","message":"DeviceNotRegistered"}}"#,
        )
        .await;
        let result = notify_local(args_for(&store_path, url)).await;

        assert!(matches!(result, Err(StoreError::Internal { .. })));
        server.await.unwrap();
    }

    /// Test that a store without users sends nothing.
    #[tokio::test]
    async fn test_notify_no_users() {
        let temp_dir = TempDir::new().unwrap();
        let args = args_for(temp_dir.path(), "http://127.0.0.1:9/unused".to_string());
        assert!(notify_local(args).await.is_ok());
    }
}
