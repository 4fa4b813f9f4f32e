//! QR payload commands for CLI.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::json;
use toolbench_core::qr::{generate, ErrorCorrection, QrPayload, QrState, WifiSecurity};
use toolbench_core::{FormValues, JsonStore, ToolKey};

use super::{export_state, import_state, print_json, CliResult, ImportModeArg};

#[derive(Subcommand)]
pub enum QrAction {
    /// Build the text to encode in a QR code
    Encode {
        #[command(subcommand)]
        payload: PayloadArg,
        #[command(flatten)]
        options: EncodeOptions,
    },
    /// Recently generated payloads
    History {
        /// Forget the history
        #[arg(long)]
        clear: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show or change size, colours and error correction
    Settings {
        /// e.g. `--set size=512 --set foreground=#112233` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
    },
    /// Export settings and history to a file
    Export { path: PathBuf },
    /// Import settings and history from a file
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "merge")]
        mode: ImportModeArg,
    },
}

#[derive(Args)]
pub struct EncodeOptions {
    /// Error correction level (L, M, Q, H); defaults to the saved setting
    #[arg(long, global = true)]
    level: Option<String>,
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Do not add the payload to the history
    #[arg(long, global = true)]
    no_history: bool,
}

#[derive(Subcommand)]
pub enum PayloadArg {
    /// Plain text
    Text { text: String },
    /// Web address; `https://` is added when no scheme is given
    Url { url: String },
    /// Pre-filled email
    Email {
        to: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Phone number
    Phone { number: String },
    /// Pre-filled text message
    Sms {
        number: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Wi-Fi network credentials
    Wifi {
        ssid: String,
        #[arg(long, default_value = "")]
        password: String,
        /// wpa, wep or nopass
        #[arg(long, default_value = "wpa")]
        security: String,
        #[arg(long)]
        hidden: bool,
    },
    /// Contact card
    Vcard {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        organization: String,
        #[arg(long, default_value = "")]
        url: String,
    },
}

impl PayloadArg {
    fn into_payload(self) -> Result<QrPayload, String> {
        Ok(match self {
            PayloadArg::Text { text } => QrPayload::Text { text },
            PayloadArg::Url { url } => QrPayload::Url { url },
            PayloadArg::Email { to, subject, body } => QrPayload::Email { to, subject, body },
            PayloadArg::Phone { number } => QrPayload::Phone { number },
            PayloadArg::Sms { number, message } => QrPayload::Sms { number, message },
            PayloadArg::Wifi {
                ssid,
                password,
                security,
                hidden,
            } => QrPayload::Wifi {
                ssid,
                password,
                security: WifiSecurity::parse(&security)
                    .ok_or_else(|| format!("unknown Wi-Fi security '{security}'"))?,
                hidden,
            },
            PayloadArg::Vcard {
                name,
                phone,
                email,
                organization,
                url,
            } => QrPayload::Vcard {
                name,
                phone,
                email,
                organization,
                url,
            },
        })
    }
}

pub fn run(action: QrAction) -> CliResult {
    let store: JsonStore<QrState> = JsonStore::open(ToolKey::Qr)?;

    match action {
        QrAction::Encode { payload, options } => {
            let mut state = store.load_or_default();
            let level = match options.level.as_deref() {
                Some(raw) => ErrorCorrection::parse(raw)
                    .ok_or_else(|| format!("unknown error correction level '{raw}'"))?,
                None => state.settings.error_correction,
            };
            let payload = payload.into_payload()?;
            let encoded = generate(&payload, level)?;
            if options.json {
                print_json(&json!({
                    "kind": payload.kind(),
                    "encoded": encoded,
                    "error_correction": level,
                    "size": state.settings.size,
                    "foreground": state.settings.foreground,
                    "background": state.settings.background,
                }))?;
            } else {
                println!("{encoded}");
            }
            if !options.no_history {
                state.record(payload, encoded);
                store.save(&state)?;
            }
        }
        QrAction::History { clear, json } => {
            let mut state = store.load_or_default();
            if clear {
                state.clear_history();
                store.save(&state)?;
                println!("history cleared");
            } else if json {
                print_json(&state.history)?;
            } else {
                for entry in &state.history {
                    println!(
                        "{}  {:<6}  {}",
                        entry.created_at.format("%Y-%m-%d %H:%M"),
                        entry.payload.kind(),
                        entry.encoded.replace('\n', " | ")
                    );
                }
            }
        }
        QrAction::Settings { sets } => {
            let mut state = store.load_or_default();
            if !sets.is_empty() {
                let form = FormValues::from_pairs(&sets)?;
                state.settings.apply_form(&form);
                store.save(&state)?;
            }
            print_json(&state.settings)?;
        }
        QrAction::Export { path } => export_state::<QrState>(&path)?,
        QrAction::Import { path, mode } => import_state::<QrState>(&path, mode)?,
    }
    Ok(())
}
