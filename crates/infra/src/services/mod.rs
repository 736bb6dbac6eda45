mod push;

pub use push::{DeliveryOutcome, HttpPushTransport, IPushTransport};
