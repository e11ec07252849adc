use serde_json::json;

use super::ClientProfile;

pub const WEB_CLIENT_NAME: &str = "WEB";
const WEB_CLIENT_ID: u32 = 1;
const WEB_CLIENT_VERSION: &str = "2.20260114.01.00";

pub const CREATOR_CLIENT_NAME: &str = "WEB_CREATOR";
const CREATOR_CLIENT_ID: u32 = 62;
const CREATOR_CLIENT_VERSION: &str = "1.20250312.03.01";

pub const MWEB_CLIENT_NAME: &str = "MWEB";
const MWEB_CLIENT_ID: u32 = 2;
const MWEB_CLIENT_VERSION: &str = "2.20250311.03.00";
const MWEB_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 18_2 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.0 Mobile/15E148 Safari/604.1";

// Web identities use the fetcher's browser User-Agent. Their formats are
// almost always ciphered, so they mostly help through manifests.

pub fn web() -> ClientProfile {
    ClientProfile::new(WEB_CLIENT_NAME, WEB_CLIENT_VERSION, WEB_CLIENT_ID)
        .with_field("platform", json!("DESKTOP"))
}

pub fn creator() -> ClientProfile {
    ClientProfile::new(CREATOR_CLIENT_NAME, CREATOR_CLIENT_VERSION, CREATOR_CLIENT_ID)
        .with_field("platform", json!("DESKTOP"))
}

pub fn mweb() -> ClientProfile {
    ClientProfile::new(MWEB_CLIENT_NAME, MWEB_CLIENT_VERSION, MWEB_CLIENT_ID)
        .with_user_agent(MWEB_USER_AGENT)
        .with_field("platform", json!("MOBILE"))
}
