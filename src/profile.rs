/*!
 * Connection profile generation
 *
 * `netsh wlan add profile` consumes a WLAN profile XML document. One profile
 * is written per candidate at a fixed scratch filename, encoding the target
 * SSID and the candidate passphrase with fixed WPA2-PSK/AES security
 * parameters. The previous candidate's file is simply overwritten.
 */

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BlastError, Result};

/// Fixed scratch filename inside the profile directory.
pub const PROFILE_FILE: &str = "wifi_profile.xml";

/// Write the WLAN profile document for `ssid`/`passphrase` into `dir`.
///
/// Returns the path of the written file. Filesystem failures are real
/// errors; callers never have to interpret a placeholder path.
pub fn write_profile(ssid: &str, passphrase: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(PROFILE_FILE);
    let document = render(ssid, passphrase);

    fs::write(&path, document).map_err(|source| BlastError::ProfileWrite {
        path: path.clone(),
        source,
    })?;

    debug!("wrote connection profile: {}", path.display());
    Ok(path)
}

fn render(ssid: &str, passphrase: &str) -> String {
    let ssid = escape_xml(ssid);
    let passphrase = escape_xml(passphrase);

    format!(
        r#"<?xml version="1.0"?>
<WLANProfile xmlns="http://www.microsoft.com/networking/WLAN/profile/v1">
    <name>{ssid}</name>
    <SSIDConfig>
        <SSID>
            <name>{ssid}</name>
        </SSID>
    </SSIDConfig>
    <connectionType>ESS</connectionType>
    <connectionMode>auto</connectionMode>
    <MSM>
        <security>
            <authEncryption>
                <authentication>WPA2PSK</authentication>
                <encryption>AES</encryption>
                <useOneX>false</useOneX>
            </authEncryption>
            <sharedKey>
                <keyType>passPhrase</keyType>
                <protected>false</protected>
                <keyMaterial>{passphrase}</keyMaterial>
            </sharedKey>
        </security>
    </MSM>
</WLANProfile>
"#
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
