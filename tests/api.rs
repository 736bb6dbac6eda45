mod helpers;

use helpers::setup::spawn_app;
use mypa_reminders_domain::{
    AlarmRepeat, ItemKind, ItemTiming, NaiveDate, OwnerId, Presentation, ScheduleItem,
};
use mypa_reminders_sdk::{
    APIError, DeviceClass, EndpointKeys, MypaSDK, Platform, SubscribeDeviceInput,
};
use reqwest::StatusCode;

fn subscribe_input(endpoint: &str) -> SubscribeDeviceInput {
    SubscribeDeviceInput {
        endpoint: endpoint.into(),
        keys: EndpointKeys {
            p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA".into(),
            auth: "tBHItJI5svbpez7KI4CCXg".into(),
        },
        platform: Platform::Android,
        device_class: DeviceClass::Mobile,
        supports_full_screen_presentation: true,
    }
}

// Dates in the past so the running scheduler job never finds them due
fn past_date_alarm(id: i64, owner: &str) -> ScheduleItem {
    ScheduleItem::new(
        id,
        OwnerId::new(owner),
        Presentation::new("Passport office"),
        ItemTiming::Alarm {
            time_of_day: "09:30".parse().unwrap(),
            repeat: AlarmRepeat::OnDate(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()),
        },
    )
}

fn past_meeting(id: i64, owner: &str) -> ScheduleItem {
    ScheduleItem::new(
        id,
        OwnerId::new(owner),
        Presentation::new("Kickoff"),
        ItemTiming::Meeting {
            time_of_day: "13:00".parse().unwrap(),
            date: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
            location: Some("Room 2".into()),
        },
    )
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let app = spawn_app().await;
    let sdk = MypaSDK::new(app.address.clone(), "");
    let status = sdk.status.check_health().await.expect("Expected health");
    assert_eq!(status.message, "Yo! We are up!\r\n");
    assert!(status.scheduler.last_tick.is_none());
}

#[actix_web::main]
#[test]
async fn test_requests_without_identity_are_rejected() {
    let app = spawn_app().await;
    let sdk = MypaSDK::new(app.address.clone(), "");
    assert!(matches!(
        sdk.device.list().await,
        Err(APIError::UnexpectedStatusCode(StatusCode::UNAUTHORIZED))
    ));

    let forged = MypaSDK::new(app.address.clone(), "not-a-jwt");
    assert!(forged.item.get_active().await.is_err());
}

#[actix_web::main]
#[test]
async fn test_subscribe_and_unsubscribe_device() {
    let app = spawn_app().await;
    let alice = app.sdk_for("alice");
    let bob = app.sdk_for("bob");

    let res = alice
        .device
        .subscribe(subscribe_input("https://push.example.com/alice-phone"))
        .await
        .expect("Expected to subscribe device");
    assert!(res.device.supports_full_screen_presentation);

    // Subscribing again from the same device refreshes it
    let mut input = subscribe_input("https://push.example.com/alice-phone");
    input.platform = Platform::Ios;
    let again = alice.device.subscribe(input).await.unwrap();
    assert_eq!(again.device.id, res.device.id);
    assert_eq!(again.device.platform, Platform::Ios);

    let devices = alice.device.list().await.unwrap().devices;
    assert_eq!(devices.len(), 1);
    assert!(bob.device.list().await.unwrap().devices.is_empty());

    assert!(bob
        .device
        .unsubscribe("https://push.example.com/alice-phone".into())
        .await
        .is_err());
    alice
        .device
        .unsubscribe("https://push.example.com/alice-phone".into())
        .await
        .expect("Expected to unsubscribe");
    assert!(alice.device.list().await.unwrap().devices.is_empty());
}

#[actix_web::main]
#[test]
async fn test_subscribe_ignores_owner_in_body() {
    let app = spawn_app().await;
    let body = serde_json::json!({
        "ownerId": "bob",
        "endpoint": "https://push.example.com/shared",
        "keys": { "p256dh": "p", "auth": "a" },
        "platform": "web",
        "deviceClass": "desktop"
    });
    let res = reqwest::Client::new()
        .post(format!("{}/api/v1/devices", app.address))
        .bearer_auth(app.token_for("alice"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let owned = app
        .ctx
        .repos
        .device_endpoints
        .find_by_owner(&OwnerId::new("alice"))
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert!(!owned[0].supports_full_screen);
    assert!(app.sdk_for("bob").device.list().await.unwrap().devices.is_empty());
}

#[actix_web::main]
#[test]
async fn test_subscribe_rejects_invalid_endpoint() {
    let app = spawn_app().await;
    let res = app
        .sdk_for("alice")
        .device
        .subscribe(subscribe_input("not a url"))
        .await;
    assert!(matches!(
        res,
        Err(APIError::UnexpectedStatusCode(StatusCode::BAD_REQUEST))
    ));
}

#[actix_web::main]
#[test]
async fn test_get_active_items_and_deactivate() {
    let app = spawn_app().await;
    let repo = &app.ctx.repos.schedule_items;
    let alarm = past_date_alarm(1, "alice");
    let meeting = past_meeting(1, "alice");
    let other = past_date_alarm(2, "bob");
    for item in [&alarm, &meeting, &other] {
        repo.insert(item).await.unwrap();
    }

    let alice = app.sdk_for("alice");
    let mut items = alice.item.get_active().await.expect("Expected items");
    items.sort_by_key(|item| item.kind());
    assert_eq!(items, vec![alarm.clone(), meeting.clone()]);

    let res = alice.item.deactivate(&meeting.item_ref()).await.unwrap();
    assert!(!res.item.active);
    // Deactivating again is fine
    assert!(alice.item.deactivate(&meeting.item_ref()).await.is_ok());

    let items = alice.item.get_active().await.unwrap();
    assert_eq!(items, vec![alarm]);
    assert_eq!(items[0].kind(), ItemKind::Alarm);

    assert!(matches!(
        alice.item.deactivate(&other.item_ref()).await,
        Err(APIError::UnexpectedStatusCode(StatusCode::NOT_FOUND))
    ));
    assert!(repo.find(&other.item_ref()).await.unwrap().unwrap().active);
}
