use serde_json::json;

use super::ClientProfile;

pub const CLIENT_NAME: &str = "IOS";
const CLIENT_ID: u32 = 5;
const CLIENT_VERSION: &str = "21.02.1";
const DEVICE_MODEL: &str = "iPhone16,2";
const USER_AGENT: &str =
    "com.google.ios.youtube/21.02.1 (iPhone16,2; U; CPU iOS 18_2 like Mac OS X;)";

/// iOS app identity. Usually answers with an HLS manifest, which is why it
/// sits right after the embedded player in the default order.
pub fn ios() -> ClientProfile {
    ClientProfile::new(CLIENT_NAME, CLIENT_VERSION, CLIENT_ID)
        .with_user_agent(USER_AGENT)
        .with_field("deviceMake", json!("Apple"))
        .with_field("deviceModel", json!(DEVICE_MODEL))
        .with_field("userAgent", json!(USER_AGENT))
        .with_field("osName", json!("iPhone"))
        .with_field("osVersion", json!("18.2.22C152"))
        .with_field("utcOffsetMinutes", json!(0))
}
