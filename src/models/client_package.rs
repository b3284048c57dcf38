use serde::{Deserialize, Serialize};

/// A generated installer bundle. Customer fields are a snapshot taken when
/// the package was built, so later changes to the code do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPackage {
    pub id: String,
    pub support_code: String,
    pub package_path: String,
    pub package_name: String,
    pub created_at: i64,
    pub downloaded_at: Option<i64>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub session_notes: Option<String>,
}

impl ClientPackage {
    pub fn download_url(&self) -> String {
        download_url_for(&self.package_name)
    }
}

pub fn download_url_for(package_name: &str) -> String {
    format!("/downloads/{}", package_name)
}
