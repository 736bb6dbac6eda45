use crate::error::MypaError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use mypa_reminders_api_structs::deactivate_item::*;
use mypa_reminders_domain::{ItemRef, OwnerId, ScheduleItem};
use mypa_reminders_infra::ReminderContext;

fn handle_error(e: UseCaseError) -> MypaError {
    match e {
        UseCaseError::NotFound(item) => {
            MypaError::NotFound(format!("The item: {}, was not found.", item))
        }
        UseCaseError::StorageError => MypaError::InternalError,
    }
}

/// Used by devices when a one-shot occurrence was dismissed
pub async fn deactivate_item_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, MypaError> {
    let owner_id = protect_route(&http_req, &ctx)?;

    let usecase = DeactivateItemUseCase {
        owner_id,
        item: ItemRef {
            kind: path.kind,
            id: path.item_id,
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|item| HttpResponse::Ok().json(APIResponse::new(item)))
        .map_err(handle_error)
}

#[derive(Debug)]
struct DeactivateItemUseCase {
    pub owner_id: OwnerId,
    pub item: ItemRef,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ItemRef),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeactivateItemUseCase {
    type Response = ScheduleItem;

    type Error = UseCaseError;

    const NAME: &'static str = "DeactivateItem";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let mut item = match ctx.repos.schedule_items.find(&self.item).await {
            // Items of other owners are reported as missing
            Ok(Some(item)) if item.owner_id == self.owner_id => item,
            Ok(_) => return Err(UseCaseError::NotFound(self.item)),
            Err(_) => return Err(UseCaseError::StorageError),
        };
        if !item.active {
            return Ok(item);
        }

        match ctx.repos.schedule_items.set_active(&self.item, false).await {
            Ok(true) => {
                item.active = false;
                Ok(item)
            }
            Ok(false) => Err(UseCaseError::NotFound(self.item)),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mypa_reminders_domain::{ItemTiming, NaiveDate, Presentation};
    use mypa_reminders_infra::IScheduleItemRepo;
    use std::sync::Arc;

    /// Schedule store whose database is down
    struct UnreachableScheduleItemRepo;

    #[async_trait::async_trait]
    impl IScheduleItemRepo for UnreachableScheduleItemRepo {
        async fn insert(&self, _: &ScheduleItem) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn find(&self, _: &ItemRef) -> anyhow::Result<Option<ScheduleItem>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn find_active(&self, _: Option<&OwnerId>) -> anyhow::Result<Vec<ScheduleItem>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn set_active(&self, _: &ItemRef, _: bool) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    async fn setup() -> (ReminderContext, ScheduleItem) {
        let ctx = ReminderContext::create_inmemory();
        let meeting = ScheduleItem::new(
            1,
            OwnerId::new("alice"),
            Presentation::new("Standup"),
            ItemTiming::Meeting {
                time_of_day: "10:00".parse().unwrap(),
                date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
                location: None,
            },
        );
        ctx.repos.schedule_items.insert(&meeting).await.unwrap();
        (ctx, meeting)
    }

    #[actix_web::test]
    async fn deactivates_own_item_and_is_idempotent() {
        let (ctx, meeting) = setup().await;

        for _ in 0..2 {
            let mut usecase = DeactivateItemUseCase {
                owner_id: OwnerId::new("alice"),
                item: meeting.item_ref(),
            };
            let item = usecase.execute(&ctx).await.unwrap();
            assert!(!item.active);
        }
        assert!(ctx
            .repos
            .schedule_items
            .find_active(None)
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn rejects_item_of_other_owner() {
        let (ctx, meeting) = setup().await;

        let mut usecase = DeactivateItemUseCase {
            owner_id: OwnerId::new("mallory"),
            item: meeting.item_ref(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
        assert!(ctx.repos.schedule_items.find(&meeting.item_ref()).await.unwrap().unwrap().active);
    }

    #[actix_web::test]
    async fn storage_failure_is_not_reported_as_missing() {
        let (mut ctx, meeting) = setup().await;
        ctx.repos.schedule_items = Arc::new(UnreachableScheduleItemRepo);

        let mut usecase = DeactivateItemUseCase {
            owner_id: OwnerId::new("alice"),
            item: meeting.item_ref(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::StorageError)
        ));
    }
}
