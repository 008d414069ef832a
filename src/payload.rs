//! Builders for the structured payloads some content kinds expect.
//!
//! The encoder only ever sees a string; these helpers produce that string
//! for Wi-Fi credentials, contact cards and bare URLs.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum WifiSecurity {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl fmt::Display for WifiSecurity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::NoPass => "nopass",
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    pub security: WifiSecurity,
    pub hidden: bool,
}

impl WifiConfig {
    /// Formats the network as a `WIFI:` payload understood by phone cameras.
    ///
    /// ```rust
    /// use qr_studio::payload::{WifiConfig, WifiSecurity};
    ///
    /// let wifi = WifiConfig {
    ///     ssid: "Home".into(),
    ///     password: "hunter2".into(),
    ///     security: WifiSecurity::Wpa,
    ///     hidden: false,
    /// };
    /// assert_eq!(wifi.to_payload(), "WIFI:T:WPA;S:Home;P:hunter2;H:false;;");
    /// ```
    pub fn to_payload(&self) -> String {
        format!(
            "WIFI:T:{};S:{};P:{};H:{};;",
            self.security, self.ssid, self.password, self.hidden
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VCardConfig {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub organization: String,
    pub job_title: String,
    pub website: String,
}

impl VCardConfig {
    /// Formats the contact as a vCard 3.0 document.
    pub fn to_payload(&self) -> String {
        [
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("FN:{}", self.name),
            format!("TEL:{}", self.phone),
            format!("EMAIL:{}", self.email),
            format!("ORG:{}", self.organization),
            format!("TITLE:{}", self.job_title),
            format!("URL:{}", self.website),
            "END:VCARD".to_string(),
        ]
        .join("\n")
    }
}

/// Prefixes `https://` to a URL that has no http(s) scheme yet.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn test_hidden_open_network() {
        let wifi = WifiConfig {
            ssid: "Cafe".into(),
            security: WifiSecurity::NoPass,
            hidden: true,
            ..WifiConfig::default()
        };
        assert_eq!(wifi.to_payload(), "WIFI:T:nopass;S:Cafe;P:;H:true;;");
    }

    #[test]
    fn test_vcard_lines() {
        let card = VCardConfig {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            ..VCardConfig::default()
        };
        let payload = card.to_payload();
        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(lines.first(), Some(&"BEGIN:VCARD"));
        assert_eq!(lines.last(), Some(&"END:VCARD"));
        assert!(lines.contains(&"FN:Ada Lovelace"));
        assert!(lines.contains(&"EMAIL:ada@example.com"));
        assert_eq!(lines.len(), 9);
    }
}
