use crate::shared::entity::{Entity, OwnerId, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Ios,
    Android,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Error, Debug)]
#[error("Unknown {kind}: `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Self::Web),
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            _ => Err(UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl FromStr for DeviceClass {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            _ => Err(UnknownVariant {
                kind: "device class",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Encryption material the push service hands out with a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A place where due events for a user can be delivered.
///
/// Rows are keyed by `endpoint`: subscribing again from the same device
/// refreshes the metadata instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEndpoint {
    pub id: ID,
    pub owner_id: OwnerId,
    pub endpoint: String,
    pub keys: EndpointKeys,
    pub platform: Platform,
    pub device_class: DeviceClass,
    pub supports_full_screen: bool,
    pub created: i64,
    pub updated: i64,
}

impl DeviceEndpoint {
    pub fn new(
        owner_id: OwnerId,
        endpoint: String,
        keys: EndpointKeys,
        platform: Platform,
        device_class: DeviceClass,
        supports_full_screen: bool,
        now: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            owner_id,
            endpoint,
            keys,
            platform,
            device_class,
            supports_full_screen,
            created: now,
            updated: now,
        }
    }

    /// Copies everything a re-subscription is allowed to change,
    /// keeping the identity and creation time of `self`
    pub fn refresh_from(&mut self, other: &DeviceEndpoint) {
        self.owner_id = other.owner_id.clone();
        self.keys = other.keys.clone();
        self.platform = other.platform;
        self.device_class = other.device_class;
        self.supports_full_screen = other.supports_full_screen;
        self.updated = other.updated;
    }
}

impl Entity for DeviceEndpoint {
    fn id(&self) -> &ID {
        &self.id
    }
}
