//! Android-family identities. All of them send `androidSdkVersion`, which
//! InnerTube uses to decide the format list it hands back.

use serde_json::json;

use super::ClientProfile;

pub const MUSIC_CLIENT_NAME: &str = "ANDROID_MUSIC";
const MUSIC_CLIENT_ID: u32 = 21;
const MUSIC_CLIENT_VERSION: &str = "8.47.54";
const MUSIC_USER_AGENT: &str =
    "com.google.android.apps.youtube.music/8.47.54 (Linux; U; Android 14 gzip)";

pub const ANDROID_CLIENT_NAME: &str = "ANDROID";
const ANDROID_CLIENT_ID: u32 = 3;
const ANDROID_CLIENT_VERSION: &str = "20.01.35";
const ANDROID_USER_AGENT: &str =
    "com.google.android.youtube/20.01.35 (Linux; U; Android 14) gzip";

pub const TESTSUITE_CLIENT_NAME: &str = "ANDROID_TESTSUITE";
const TESTSUITE_CLIENT_ID: u32 = 30;
const TESTSUITE_CLIENT_VERSION: &str = "1.9";
const TESTSUITE_USER_AGENT: &str =
    "com.google.android.youtube/1.9 (Linux; U; Android 12; US) gzip";

pub const VR_CLIENT_NAME: &str = "ANDROID_VR";
const VR_CLIENT_ID: u32 = 28;
const VR_CLIENT_VERSION: &str = "1.61.48";
const VR_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8 Pro Build/UQ1A.240205.002; wv) \
     AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 \
     Chrome/121.0.6167.164 Mobile Safari/537.36 YouTubeVR/1.61.48 (gzip)";

pub fn music() -> ClientProfile {
    ClientProfile::new(MUSIC_CLIENT_NAME, MUSIC_CLIENT_VERSION, MUSIC_CLIENT_ID)
        .with_user_agent(MUSIC_USER_AGENT)
        .with_field("androidSdkVersion", json!(34))
        .with_field("osName", json!("Android"))
        .with_field("osVersion", json!("14"))
        .with_field("platform", json!("MOBILE"))
}

pub fn android() -> ClientProfile {
    ClientProfile::new(ANDROID_CLIENT_NAME, ANDROID_CLIENT_VERSION, ANDROID_CLIENT_ID)
        .with_user_agent(ANDROID_USER_AGENT)
        .with_field("androidSdkVersion", json!(34))
        .with_field("osName", json!("Android"))
        .with_field("osVersion", json!("14"))
        .with_field("platform", json!("MOBILE"))
}

pub fn testsuite() -> ClientProfile {
    ClientProfile::new(
        TESTSUITE_CLIENT_NAME,
        TESTSUITE_CLIENT_VERSION,
        TESTSUITE_CLIENT_ID,
    )
    .with_user_agent(TESTSUITE_USER_AGENT)
    .with_field("androidSdkVersion", json!(30))
}

pub fn vr() -> ClientProfile {
    ClientProfile::new(VR_CLIENT_NAME, VR_CLIENT_VERSION, VR_CLIENT_ID)
        .with_user_agent(VR_USER_AGENT)
        .with_field("androidSdkVersion", json!(34))
        .with_field("deviceMake", json!("Oculus"))
        .with_field("deviceModel", json!("Quest 3"))
        .with_field("osName", json!("Android"))
        .with_field("osVersion", json!("14"))
}
