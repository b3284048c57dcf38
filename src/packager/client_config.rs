use serde::Serialize;

use crate::models::CustomerMetadata;

const RELAY_PORT: u16 = 21117;
const SIGNAL_PORT: u16 = 21115;
const SERVICE_NAME: &str = "ConnectAssist Remote Support";

/// Unattended-access password baked into a code's installer.
///
/// Depends only on the code, so every rebuild for the same code yields a
/// functionally identical installer.
pub fn permanent_password(code: &str) -> String {
    format!("CA{}!", code)
}

/// Archive file name for a code: `ConnectAssist-{code}-{CustomerName}.zip`,
/// keeping only ASCII alphanumerics of the customer name.
pub fn package_name(code: &str, customer_name: &str) -> String {
    let name: String = customer_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let name = if name.is_empty() { "Customer".to_string() } else { name };
    format!("ConnectAssist-{}-{}.zip", code, name)
}

/// Contents of `connectassist-config.json` inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    pub server: String,
    pub relay_server: String,
    pub signal_server: String,
    pub api_server: String,
    pub permanent_password: String,
    pub auto_connect: bool,
    pub unattended_access: bool,
    pub install_service: bool,
    pub auto_start: bool,
    pub start_minimized: bool,
    pub service_name: String,
    pub support_code: String,
    pub customer_info: CustomerMetadata,
}

impl ClientConfig {
    pub fn for_code(code: &str, metadata: &CustomerMetadata, server_domain: &str) -> Self {
        Self {
            server: server_domain.to_string(),
            relay_server: format!("{}:{}", server_domain, RELAY_PORT),
            signal_server: format!("{}:{}", server_domain, SIGNAL_PORT),
            api_server: format!("https://{}", server_domain),
            permanent_password: permanent_password(code),
            auto_connect: true,
            unattended_access: true,
            install_service: true,
            auto_start: true,
            start_minimized: true,
            service_name: SERVICE_NAME.to_string(),
            support_code: code.to_string(),
            customer_info: metadata.clone(),
        }
    }

    /// Batch launcher that writes the client settings to the registry and
    /// hands off to the service installer.
    pub fn setup_script(&self) -> String {
        let key = r"HKCU\Software\RustDesk\config";
        let lines = [
            "@echo off".to_string(),
            format!("REM ConnectAssist setup for support code {}", self.support_code),
            "title ConnectAssist Setup".to_string(),
            "echo  [INFO] Configuring ConnectAssist settings...".to_string(),
            format!(
                "reg add \"{}\" /v \"custom-rendezvous-server\" /t REG_SZ /d \"{}\" /f >nul 2>&1",
                key, self.server
            ),
            format!(
                "reg add \"{}\" /v \"relay-server\" /t REG_SZ /d \"{}\" /f >nul 2>&1",
                key, self.relay_server
            ),
            format!(
                "reg add \"{}\" /v \"api-server\" /t REG_SZ /d \"{}\" /f >nul 2>&1",
                key, self.api_server
            ),
            format!(
                "reg add \"{}\" /v \"permanent_password\" /t REG_SZ /d \"{}\" /f >nul 2>&1",
                key, self.permanent_password
            ),
            format!(
                "reg add \"{}\" /v \"enable-unattended-access\" /t REG_DWORD /d 1 /f >nul 2>&1",
                key
            ),
            format!(
                "reg add \"{}\" /v \"enable-auto-connect\" /t REG_DWORD /d 1 /f >nul 2>&1",
                key
            ),
            "echo  [SUCCESS] ConnectAssist configured".to_string(),
            "echo  [INFO] Starting service installation...".to_string(),
            "call install-connectassist.bat".to_string(),
        ];
        let mut script = lines.join("\r\n");
        script.push_str("\r\n");
        script
    }

    pub fn instructions(&self) -> String {
        format!(
            "ConnectAssist Remote Support\n\
             ============================\n\
             \n\
             Hello {name},\n\
             \n\
             This package installs ConnectAssist as a background service so your\n\
             technician can connect when you need help.\n\
             \n\
             Installation:\n\
             1. Extract this ZIP file to your Desktop or Downloads folder.\n\
             2. Right-click 'setup-connectassist.bat' and choose \"Run as administrator\".\n\
             3. Accept the Windows permission prompt.\n\
             4. Wait for the \"Installation completed successfully!\" message.\n\
             \n\
             The service starts automatically with Windows and needs no further action.\n\
             \n\
             Support code: {code}\n\
             Customer:     {name}\n\
             Server:       {server}\n\
             \n\
             To uninstall, run `sc delete ConnectAssistService` from an\n\
             administrator command prompt.\n",
            name = self.customer_info.customer_name,
            code = self.support_code,
            server = self.server,
        )
    }
}
