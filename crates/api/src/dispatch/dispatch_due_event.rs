use crate::shared::usecase::UseCase;
use actix_web::rt::time::timeout;
use futures::future::join_all;
use mypa_reminders_api_structs::dtos::{DueEventDTO, PushMessageDTO};
use mypa_reminders_domain::{DispatchReport, DueEvent};
use mypa_reminders_infra::{DeliveryOutcome, ReminderContext};
use std::time::Duration;
use tracing::{info, warn};

/// Fans a due event out to every registered device of its owner.
///
/// Every endpoint gets exactly one attempt bounded by the push timeout.
/// Endpoints reported gone are removed from the registry, transient
/// failures are only counted. Polling on the device covers missed pushes.
#[derive(Debug)]
pub struct DispatchDueEventUseCase {
    pub event: DueEvent,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for DispatchDueEventUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchDueEvent";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let mut report = DispatchReport::default();

        let endpoints = match ctx
            .repos
            .device_endpoints
            .find_by_owner(&self.event.owner_id)
            .await
        {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!(
                    "Unable to load devices for owner {}, skipping {}: {:?}",
                    self.event.owner_id, self.event.occurrence_key, e
                );
                return Ok(report);
            }
        };

        let event = DueEventDTO::new(&self.event);
        let push_timeout = Duration::from_millis(ctx.config.push_timeout_millis);
        let attempts = endpoints.iter().map(|endpoint| {
            let message = PushMessageDTO {
                event: event.clone(),
                full_screen: endpoint.supports_full_screen,
            };
            async move {
                let outcome = match timeout(push_timeout, ctx.push.send(endpoint, &message)).await
                {
                    Ok(outcome) => outcome,
                    Err(_) => DeliveryOutcome::Transient(format!(
                        "No answer within {} ms",
                        push_timeout.as_millis()
                    )),
                };
                (endpoint, outcome)
            }
        });

        for (endpoint, outcome) in join_all(attempts).await {
            match outcome {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::Gone => {
                    report.failed += 1;
                    info!(
                        "Endpoint {} of owner {} is gone, removing it",
                        endpoint.id, endpoint.owner_id
                    );
                    if ctx.repos.device_endpoints.delete(&endpoint.id).await.is_some() {
                        report.pruned += 1;
                    }
                }
                DeliveryOutcome::Transient(reason) => {
                    report.failed += 1;
                    warn!(
                        "Delivery of {} to endpoint {} failed: {}",
                        self.event.occurrence_key, endpoint.id, reason
                    );
                }
            }
        }

        Ok(report)
    }
}
