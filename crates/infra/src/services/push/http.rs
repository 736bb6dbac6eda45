use super::{DeliveryOutcome, IPushTransport};
use mypa_reminders_api_structs::dtos::PushMessageDTO;
use mypa_reminders_domain::DeviceEndpoint;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Delivers push messages by posting them as json to the endpoint url
pub struct HttpPushTransport {
    client: Client,
}

impl HttpPushTransport {
    pub fn new(timeout_millis: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_millis))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

/// 404 and 410 are what push services answer for expired or
/// unregistered subscriptions
pub(super) fn classify(status: StatusCode) -> DeliveryOutcome {
    if status.is_success() {
        DeliveryOutcome::Delivered
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        DeliveryOutcome::Gone
    } else {
        DeliveryOutcome::Transient(format!("Push service responded with {}", status))
    }
}

#[async_trait::async_trait]
impl IPushTransport for HttpPushTransport {
    async fn send(&self, endpoint: &DeviceEndpoint, message: &PushMessageDTO) -> DeliveryOutcome {
        let res = self
            .client
            .post(&endpoint.endpoint)
            .header("TTL", "60")
            .header("Urgency", "high")
            .json(message)
            .send()
            .await;

        match res {
            Ok(res) => {
                debug!(
                    "Push to endpoint {} responded with {}",
                    endpoint.id,
                    res.status()
                );
                classify(res.status())
            }
            Err(e) => DeliveryOutcome::Transient(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_classifies_push_service_responses() {
        assert_eq!(classify(StatusCode::CREATED), DeliveryOutcome::Delivered);
        assert_eq!(classify(StatusCode::OK), DeliveryOutcome::Delivered);
        assert_eq!(classify(StatusCode::GONE), DeliveryOutcome::Gone);
        assert_eq!(classify(StatusCode::NOT_FOUND), DeliveryOutcome::Gone);
        assert!(matches!(
            classify(StatusCode::TOO_MANY_REQUESTS),
            DeliveryOutcome::Transient(_)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR),
            DeliveryOutcome::Transient(_)
        ));
    }
}
