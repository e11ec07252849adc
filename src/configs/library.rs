use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LibraryConfig {
    /// JSON export of the on-device library used for local matches.
    #[serde(default = "default_library_path")]
    pub path: String,
}

fn default_library_path() -> String {
    "library.json".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library_path(),
        }
    }
}
