use jsonwebtoken::{encode, EncodingKey, Header};
use mypa_reminders_api::Application;
use mypa_reminders_infra::{Config, ReminderContext};
use mypa_reminders_sdk::MypaSDK;
use serde::Serialize;

pub struct TestApp {
    pub config: Config,
    pub ctx: ReminderContext,
    pub address: String,
}

impl TestApp {
    /// Identity token for `owner`, signed the way the identity provider does
    pub fn token_for(&self, owner: &str) -> String {
        #[derive(Serialize)]
        struct Claims {
            exp: usize,
            sub: String,
        }
        let claims = Claims {
            exp: 10_000_000_000,
            sub: owner.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.identity_jwt_secret.as_bytes()),
        )
        .expect("To sign identity token")
    }

    pub fn sdk_for(&self, owner: &str) -> MypaSDK {
        MypaSDK::new(self.address.clone(), self.token_for(owner))
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let mut ctx = ReminderContext::create_inmemory();
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        config,
        ctx,
        address,
    }
}
