//! Push notifications for order status changes.
//!
//! Delivery is best effort. A failed push is logged and never fails the
//! request that triggered it.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use shoebox_core::{OrderId, OrderStatus};

/// Errors from the push gateway.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport-level failure.
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an unexpected status.
    #[error("push gateway returned {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

#[derive(Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    notification: PushNotification,
}

#[derive(Serialize)]
struct PushNotification {
    title: String,
    body: String,
}

/// Client for the push gateway.
#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    endpoint: Url,
    server_key: SecretString,
}

impl Notifier {
    /// Create a new notifier.
    #[must_use]
    pub fn new(endpoint: Url, server_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            server_key,
        }
    }

    /// Send an order status notification to a device token.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` on transport failure or a non-success status.
    pub async fn send_order_status(
        &self,
        fcm_token: &str,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), NotifyError> {
        let message = PushMessage {
            to: fcm_token,
            notification: order_status_notification(order_id, status),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.server_key.expose_secret())
            .json(&message)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::UnexpectedStatus(response.status()))
        }
    }

    /// Fire-and-forget wrapper: spawn the send and log failures.
    pub fn send_order_status_best_effort(
        &self,
        fcm_token: String,
        order_id: OrderId,
        status: OrderStatus,
    ) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier
                .send_order_status(&fcm_token, order_id, status)
                .await
            {
                tracing::warn!(error = %e, order_id = %order_id, "push notification failed");
            }
        });
    }
}

fn order_status_notification(order_id: OrderId, status: OrderStatus) -> PushNotification {
    let body = match status {
        OrderStatus::Shipping => format!("Order #{order_id} is on its way."),
        OrderStatus::Completed => format!("Order #{order_id} has been delivered."),
        OrderStatus::Cancelled => format!("Order #{order_id} was cancelled."),
    };
    PushNotification {
        title: "Order update".to_owned(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_body_names_order_and_status() {
        let n = order_status_notification(OrderId::new(7), OrderStatus::Completed);
        assert!(n.body.contains('7'));
        assert!(n.body.contains("delivered"));
    }
}
