//! QR code payload generator.
//!
//! Builds the text that a QR encoder turns into a bitmap. Rendering the
//! bitmap itself is left to the caller.

pub mod state;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use state::{ErrorCorrection, QrHistoryEntry, QrSettings, QrState, HISTORY_LIMIT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    Nopass,
}

impl WifiSecurity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "wpa" | "wpa2" | "wpa3" => Some(WifiSecurity::Wpa),
            "wep" => Some(WifiSecurity::Wep),
            "nopass" | "none" | "open" => Some(WifiSecurity::Nopass),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Nopass => "nopass",
        }
    }
}

/// What the QR code carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QrPayload {
    Text {
        text: String,
    },
    Url {
        url: String,
    },
    Email {
        to: String,
        #[serde(default)]
        subject: String,
        #[serde(default)]
        body: String,
    },
    Phone {
        number: String,
    },
    Sms {
        number: String,
        #[serde(default)]
        message: String,
    },
    Wifi {
        ssid: String,
        #[serde(default)]
        password: String,
        #[serde(default)]
        security: WifiSecurity,
        #[serde(default)]
        hidden: bool,
    },
    Vcard {
        name: String,
        #[serde(default)]
        phone: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        organization: String,
        #[serde(default)]
        url: String,
    },
}

impl QrPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            QrPayload::Text { .. } => "text",
            QrPayload::Url { .. } => "url",
            QrPayload::Email { .. } => "email",
            QrPayload::Phone { .. } => "phone",
            QrPayload::Sms { .. } => "sms",
            QrPayload::Wifi { .. } => "wifi",
            QrPayload::Vcard { .. } => "vcard",
        }
    }

    /// Required-field check.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] for empty mandatory
    /// fields and [`ValidationError::InvalidValue`] for a malformed address.
    pub fn validate(&self) -> Result<(), ValidationError> {
        fn blank(s: &str) -> bool {
            s.trim().is_empty()
        }
        match self {
            QrPayload::Text { text } if blank(text) => Err(ValidationError::missing("text")),
            QrPayload::Url { url } if blank(url) => Err(ValidationError::missing("url")),
            QrPayload::Email { to, .. } if blank(to) => Err(ValidationError::missing("to")),
            QrPayload::Email { to, .. } if !to.contains('@') => {
                Err(ValidationError::invalid("to", "not an email address"))
            }
            QrPayload::Phone { number } | QrPayload::Sms { number, .. } if blank(number) => {
                Err(ValidationError::missing("number"))
            }
            QrPayload::Wifi { ssid, .. } if blank(ssid) => Err(ValidationError::missing("ssid")),
            QrPayload::Wifi {
                password, security, ..
            } if *security != WifiSecurity::Nopass && password.is_empty() => {
                Err(ValidationError::missing("password"))
            }
            QrPayload::Vcard { name, .. } if blank(name) => Err(ValidationError::missing("name")),
            _ => Ok(()),
        }
    }

    /// The string to feed into a QR encoder.
    pub fn encode(&self) -> String {
        match self {
            QrPayload::Text { text } => text.clone(),
            QrPayload::Url { url } => normalize_url(url),
            QrPayload::Email { to, subject, body } => {
                let mut query = Vec::new();
                if !subject.is_empty() {
                    query.push(format!("subject={}", urlencoding::encode(subject)));
                }
                if !body.is_empty() {
                    query.push(format!("body={}", urlencoding::encode(body)));
                }
                if query.is_empty() {
                    format!("mailto:{}", to.trim())
                } else {
                    format!("mailto:{}?{}", to.trim(), query.join("&"))
                }
            }
            QrPayload::Phone { number } => format!("tel:{}", compact_number(number)),
            QrPayload::Sms { number, message } => {
                format!("SMSTO:{}:{}", compact_number(number), message)
            }
            QrPayload::Wifi {
                ssid,
                password,
                security,
                hidden,
            } => {
                let mut out = format!("WIFI:T:{};S:{};", security.code(), escape_wifi(ssid));
                if *security != WifiSecurity::Nopass {
                    out.push_str(&format!("P:{};", escape_wifi(password)));
                }
                if *hidden {
                    out.push_str("H:true;");
                }
                out.push(';');
                out
            }
            QrPayload::Vcard {
                name,
                phone,
                email,
                organization,
                url,
            } => {
                let mut lines = vec![
                    "BEGIN:VCARD".to_string(),
                    "VERSION:3.0".to_string(),
                    format!("FN:{}", name.trim()),
                ];
                for (tag, value) in [
                    ("TEL", phone),
                    ("EMAIL", email),
                    ("ORG", organization),
                    ("URL", url),
                ] {
                    if !value.trim().is_empty() {
                        lines.push(format!("{tag}:{}", value.trim()));
                    }
                }
                lines.push("END:VCARD".to_string());
                lines.join("\n")
            }
        }
    }
}

fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn compact_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Escape the characters the WIFI: scheme treats as delimiters.
fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Validate and encode, checking the result fits in a QR code at `level`.
///
/// # Errors
///
/// Returns a validation error if a required field is empty or the payload
/// exceeds the byte capacity of the largest QR version at `level`.
pub fn generate(payload: &QrPayload, level: ErrorCorrection) -> Result<String, ValidationError> {
    payload.validate()?;
    let encoded = payload.encode();
    let limit = level.capacity_bytes();
    if encoded.len() > limit {
        return Err(ValidationError::TooLong {
            field: "payload".to_string(),
            len: encoded.len(),
            limit,
        });
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_gets_a_scheme() {
        let payload = QrPayload::Url {
            url: " example.com/a ".into(),
        };
        assert_eq!(payload.encode(), "https://example.com/a");
        let payload = QrPayload::Url {
            url: "ftp://host".into(),
        };
        assert_eq!(payload.encode(), "ftp://host");
    }

    #[test]
    fn email_query_is_percent_encoded() {
        let payload = QrPayload::Email {
            to: "a@b.io".into(),
            subject: "Hi there".into(),
            body: "x&y".into(),
        };
        assert_eq!(payload.encode(), "mailto:a@b.io?subject=Hi%20there&body=x%26y");
    }

    #[test]
    fn wifi_escapes_delimiters() {
        let payload = QrPayload::Wifi {
            ssid: "Cafe;Net".into(),
            password: "p:w\"d".into(),
            security: WifiSecurity::Wpa,
            hidden: true,
        };
        assert_eq!(payload.encode(), r#"WIFI:T:WPA;S:Cafe\;Net;P:p\:w\"d;H:true;;"#);
    }

    #[test]
    fn open_wifi_has_no_password() {
        let payload = QrPayload::Wifi {
            ssid: "Guest".into(),
            password: String::new(),
            security: WifiSecurity::Nopass,
            hidden: false,
        };
        assert!(payload.validate().is_ok());
        assert_eq!(payload.encode(), "WIFI:T:nopass;S:Guest;;");
    }

    #[test]
    fn vcard_skips_empty_lines() {
        let payload = QrPayload::Vcard {
            name: "Ada Lovelace".into(),
            phone: "+44 20 1234".into(),
            email: String::new(),
            organization: String::new(),
            url: String::new(),
        };
        assert_eq!(
            payload.encode(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Ada Lovelace\nTEL:+44 20 1234\nEND:VCARD"
        );
    }

    #[test]
    fn phone_and_sms_strip_formatting() {
        let phone = QrPayload::Phone {
            number: "+1 (555) 010-2030".into(),
        };
        assert_eq!(phone.encode(), "tel:+15550102030");
        let sms = QrPayload::Sms {
            number: "555 0101".into(),
            message: "on my way".into(),
        };
        assert_eq!(sms.encode(), "SMSTO:5550101:on my way");
    }

    #[test]
    fn validation_catches_missing_fields() {
        assert!(QrPayload::Text { text: "  ".into() }.validate().is_err());
        let bad_email = QrPayload::Email {
            to: "nobody".into(),
            subject: String::new(),
            body: String::new(),
        };
        assert!(matches!(
            bad_email.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
        let locked = QrPayload::Wifi {
            ssid: "Home".into(),
            password: String::new(),
            security: WifiSecurity::Wep,
            hidden: false,
        };
        assert_eq!(locked.validate(), Err(ValidationError::missing("password")));
    }

    #[test]
    fn generate_enforces_capacity() {
        let payload = QrPayload::Text {
            text: "x".repeat(2000),
        };
        assert!(generate(&payload, ErrorCorrection::Low).is_ok());
        assert!(matches!(
            generate(&payload, ErrorCorrection::High),
            Err(ValidationError::TooLong { limit: 1273, .. })
        ));
    }

    #[test]
    fn payload_json_is_tagged() {
        let payload = QrPayload::Phone {
            number: "123".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "phone");
        assert_eq!(json["number"], "123");
    }
}
