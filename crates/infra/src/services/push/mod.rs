mod http;

pub use http::HttpPushTransport;
use mypa_reminders_api_structs::dtos::PushMessageDTO;
use mypa_reminders_domain::DeviceEndpoint;

/// Result of one delivery attempt to one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The endpoint will never accept deliveries again and should be removed
    Gone,
    /// Might work later, the endpoint is kept
    Transient(String),
}

/// Capability of sending a message to a device endpoint through the
/// platform push service
#[async_trait::async_trait]
pub trait IPushTransport: Send + Sync {
    async fn send(&self, endpoint: &DeviceEndpoint, message: &PushMessageDTO) -> DeliveryOutcome;
}
