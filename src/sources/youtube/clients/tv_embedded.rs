use super::ClientProfile;

pub const CLIENT_NAME: &str = "TVHTML5_SIMPLY_EMBEDDED_PLAYER";
const CLIENT_ID: u32 = 85;
const CLIENT_VERSION: &str = "2.0";

/// Embedded TV player. Sends no device fields at all; tends to return
/// non-ciphered formats for embeddable videos.
pub fn tv_embedded() -> ClientProfile {
    ClientProfile::new(CLIENT_NAME, CLIENT_VERSION, CLIENT_ID)
}
