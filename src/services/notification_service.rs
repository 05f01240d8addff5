use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::notification::Notification;
use crate::models::webhook_log::WebhookLog;
use crate::utils::signing;

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
    target_url: Option<String>,
    secret: Option<String>,
}

/// Seconds to wait before retry number `attempts + 1`.
pub fn retry_delay_secs(attempts: i32) -> i64 {
    let exp = (attempts - 1).clamp(0, 20) as u32;
    (30_i64 * 2_i64.pow(exp)).min(3600)
}

impl NotificationService {
    pub fn new(pool: PgPool, target_url: Option<String>, secret: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            pool,
            client,
            target_url,
            secret,
        }
    }

    /// In-app notice plus an outbox entry for the relay. Never fails the caller.
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        message: &str,
        payload: JsonValue,
    ) {
        let stored = sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, message) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(message)
        .execute(&self.pool)
        .await;
        if let Err(e) = stored {
            tracing::warn!(%user_id, kind, error = %e, "failed to store notification");
        }

        let envelope = json!({
            "user_id": user_id,
            "kind": kind,
            "title": title,
            "message": message,
            "data": payload,
        });
        self.relay(kind, &envelope).await;
    }

    /// Outbox only, for recipients without an account (e.g. interviewers).
    pub async fn relay(&self, event_type: &str, payload: &JsonValue) {
        if self.target_url.is_none() {
            return;
        }
        if let Err(e) = self.enqueue_webhook(event_type, payload).await {
            tracing::warn!(event_type, error = %e, "failed to enqueue webhook");
        }
    }

    pub async fn enqueue_webhook(&self, event_type: &str, payload: &JsonValue) -> Result<WebhookLog> {
        let target_url = self
            .target_url
            .as_deref()
            .ok_or_else(|| Error::Config("NOTIFICATION_WEBHOOK_URL is not set".into()))?;
        let row = sqlx::query_as::<_, WebhookLog>(
            r#"
            INSERT INTO webhook_logs (event_type, payload, target_url, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(event_type)
        .bind(payload)
        .bind(target_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool) -> Result<(Vec<Notification>, i64)> {
        let items = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC
            LIMIT 200
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        let unread = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((items, unread))
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Notification not found".into()))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Posts one outbox row to its target. Only the HTTP exchange happens here.
    pub async fn send(&self, log: &WebhookLog) -> DeliveryOutcome {
        let body = match serde_json::to_vec(&log.payload) {
            Ok(body) => body,
            Err(e) => {
                return DeliveryOutcome {
                    http_status: None,
                    response_body: e.to_string(),
                    delivered: false,
                }
            }
        };
        let mut request = self
            .client
            .post(&log.target_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Event-Type", &log.event_type);
        if let Some(secret) = &self.secret {
            request = request
                .header("X-Webhook-Secret", secret)
                .header("X-Signature", signing::sign(secret, &body));
        }

        match request.body(body).send().await {
            Ok(resp) => {
                let status = resp.status();
                DeliveryOutcome {
                    http_status: Some(status.as_u16() as i32),
                    response_body: resp.text().await.unwrap_or_default(),
                    delivered: status.is_success(),
                }
            }
            Err(err) => DeliveryOutcome {
                http_status: None,
                response_body: err.to_string(),
                delivered: false,
            },
        }
    }

    /// Delivers one due outbox row; `false` when nothing was due.
    pub async fn run_once(&self) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        // the row lock is held for the whole attempt so other workers skip it
        let log = sqlx::query_as::<_, WebhookLog>(
            r#"
            SELECT * FROM webhook_logs
            WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= NOW())
            ORDER BY created_at ASC
            FOR UPDATE SKIP LOCKED
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;
        let Some(log) = log else {
            tx.commit().await?;
            return Ok(false);
        };

        let outcome = self.send(&log).await;
        let (status, retry_in) = outcome.next_state(log.attempts + 1, log.max_attempts);

        sqlx::query(
            r#"
            UPDATE webhook_logs
            SET http_status = $2, response_body = $3, status = $4, attempts = $5,
                next_retry_at = CASE WHEN $6::bigint IS NULL THEN NULL
                                     ELSE NOW() + make_interval(secs => ($6::bigint)::double precision) END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(log.id)
        .bind(outcome.http_status)
        .bind(&outcome.response_body)
        .bind(status)
        .bind(log.attempts + 1)
        .bind(retry_in)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if outcome.delivered {
            tracing::debug!(webhook_id = %log.id, "webhook delivered");
        } else {
            tracing::warn!(webhook_id = %log.id, attempts = log.attempts + 1, status, "webhook delivery failed");
        }
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub http_status: Option<i32>,
    pub response_body: String,
    pub delivered: bool,
}

impl DeliveryOutcome {
    /// Row status after this attempt and the retry delay when another is due.
    pub fn next_state(&self, attempts: i32, max_attempts: i32) -> (&'static str, Option<i64>) {
        if self.delivered {
            ("success", None)
        } else if attempts >= max_attempts {
            ("failed", None)
        } else {
            ("pending", Some(retry_delay_secs(attempts)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps_at_an_hour() {
        assert_eq!(retry_delay_secs(1), 30);
        assert_eq!(retry_delay_secs(2), 60);
        assert_eq!(retry_delay_secs(3), 120);
        assert_eq!(retry_delay_secs(8), 3600);
        assert_eq!(retry_delay_secs(40), 3600);
        assert_eq!(retry_delay_secs(0), 30);
    }

    #[test]
    fn failed_attempts_stay_pending_until_exhausted() {
        let failed = DeliveryOutcome {
            http_status: Some(500),
            response_body: String::new(),
            delivered: false,
        };
        assert_eq!(failed.next_state(1, 5), ("pending", Some(30)));
        assert_eq!(failed.next_state(4, 5), ("pending", Some(240)));
        assert_eq!(failed.next_state(5, 5), ("failed", None));

        let ok = DeliveryOutcome {
            delivered: true,
            ..failed
        };
        assert_eq!(ok.next_state(1, 5), ("success", None));
    }
}
