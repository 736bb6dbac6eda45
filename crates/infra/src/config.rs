use chrono_tz::Tz;
use mypa_reminders_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Secret shared with the identity provider, used to verify the
    /// json web tokens that identify the owner of every request
    pub identity_jwt_secret: String,
    /// Every `timeOfDay` is a wall clock time in this timezone
    pub evaluation_timezone: Tz,
    /// Upper bound in millis for a single push delivery attempt.
    /// A slow or dead endpoint will not delay delivery to the others
    /// for longer than this.
    pub push_timeout_millis: u64,
}

const DEFAULT_PORT: usize = 5000;
const DEFAULT_PUSH_TIMEOUT_MILLIS: u64 = 10_000;

impl Config {
    pub fn new() -> Self {
        let identity_jwt_secret = match std::env::var("IDENTITY_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find IDENTITY_JWT_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(32);
                info!(
                    "Secret for verifying identity tokens was generated and set to: {}",
                    secret
                );
                secret
            }
        };

        let port = match std::env::var("PORT") {
            Ok(port) => match port.parse::<usize>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "The given PORT: {} is not valid, falling back to the default port: {}.",
                        port, DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let evaluation_timezone = match std::env::var("EVALUATION_TIMEZONE") {
            Ok(tzid) => match tzid.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given EVALUATION_TIMEZONE: {} is not a valid IANA timezone, falling back to UTC.",
                        tzid
                    );
                    chrono_tz::UTC
                }
            },
            Err(_) => chrono_tz::UTC,
        };

        let push_timeout_millis = match std::env::var("PUSH_TIMEOUT_MILLIS") {
            Ok(timeout) => timeout.parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "The given PUSH_TIMEOUT_MILLIS: {} is not valid, falling back to {}.",
                    timeout, DEFAULT_PUSH_TIMEOUT_MILLIS
                );
                DEFAULT_PUSH_TIMEOUT_MILLIS
            }),
            Err(_) => DEFAULT_PUSH_TIMEOUT_MILLIS,
        };

        Self {
            port,
            identity_jwt_secret,
            evaluation_timezone,
            push_timeout_millis,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
