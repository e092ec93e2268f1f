// # Telegram Notifier
//
// This crate provides a Notifier implementation that posts change-sets to
// a Telegram channel via the Bot API.
//
// ## Behavior
//
// - One `sendMessage` call per change-set, MarkdownV2 formatted
// - Every dynamic string passes through the MarkdownV2 escaper
// - Added doctors are grouped by availability status
// - An inline keyboard button links back to the registry search page
// - NO retry logic (a change-set that fails to deliver is gone; the runner
//   persists state regardless and the next run diffs against the new
//   baseline)
//
// ## Security
//
// - The bot token NEVER appears in logs
// - The Debug implementation redacts the token
//
// ## API Reference
//
// - Telegram Bot API: https://core.telegram.org/bots/api#sendmessage
// - Message length limit: 4096 characters

use async_trait::async_trait;
use medwatch_core::model::{ChangeSet, Doctor};
use medwatch_core::traits::Notifier;
use medwatch_core::{Error, Result};
use std::time::Duration;

/// Telegram Bot API base URL
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram message length limit is 4096; warn with some headroom
const MESSAGE_WARN_LENGTH: usize = 4000;

/// Telegram notification channel
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the bot token.
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .field("search_url", &self.search_url)
            .finish()
    }
}

pub struct TelegramNotifier {
    /// Bot token
    /// ⚠️ NEVER log this value
    bot_token: String,

    /// Target chat or channel id
    chat_id: String,

    /// Optional registry search URL, rendered as an inline keyboard button
    search_url: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Parameters
    ///
    /// - `bot_token`: Bot API token
    /// - `chat_id`: Target chat/channel (e.g. "@my_channel")
    ///
    /// # Security
    ///
    /// The bot token will NEVER be logged or displayed in error messages.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let bot_token = bot_token.into();
        if bot_token.is_empty() {
            panic!("Telegram bot token cannot be empty");
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            bot_token,
            chat_id: chat_id.into(),
            search_url: None,
            client,
        }
    }

    /// Attach a search URL to render as a "Cerca medico" button
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = Some(url.into());
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, changes: &ChangeSet) -> Result<()> {
        let message = format_message(changes);

        if message.len() > MESSAGE_WARN_LENGTH {
            tracing::warn!(
                "message is {} characters, might be truncated by Telegram",
                message.len()
            );
        }

        let mut payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "MarkdownV2",
            "disable_web_page_preview": true,
        });

        if let Some(ref url) = self.search_url {
            payload["reply_markup"] = serde_json::json!({
                "inline_keyboard": [[{ "text": "🔗 Cerca medico", "url": url }]],
            });
        }

        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notify(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            // Map HTTP status codes to specific errors
            return match status.as_u16() {
                401 | 403 => Err(Error::notify(format!(
                    "Authentication failed: invalid bot token or bot not admin of the chat. Status: {}",
                    status
                ))),
                400 | 404 => Err(Error::notify(format!(
                    "Telegram rejected the request (check chat id and message formatting): {} - {}",
                    status, error_text
                ))),
                429 => Err(Error::notify(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                ))),
                500..=599 => Err(Error::notify(format!(
                    "Telegram server error (transient): {} - {}",
                    status, error_text
                ))),
                _ => Err(Error::notify(format!(
                    "sendMessage failed: {} - {}",
                    status, error_text
                ))),
            };
        }

        tracing::info!("posted {} changes to {}", changes.total(), self.chat_id);
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "telegram"
    }
}

/// Escape special characters for Telegram MarkdownV2
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Format a single doctor entry line
fn format_doctor(doctor: &Doctor) -> String {
    format!(
        "  • *{}* \\({}\\)",
        escape_markdown(&doctor.display_name()),
        escape_markdown(&locations_or_na(doctor))
    )
}

fn locations_or_na(doctor: &Doctor) -> String {
    match &doctor.locations {
        Some(locations) if !locations.is_empty() => locations.join(", "),
        _ => "N/A".to_string(),
    }
}

/// Format a change-set into a MarkdownV2 message.
///
/// Added doctors are grouped by availability status, in first-seen order.
pub fn format_message(changes: &ChangeSet) -> String {
    let mut parts = Vec::new();

    parts.push("🏥 *Aggiornamento medici di medicina generale*".to_string());

    if !changes.added.is_empty() {
        parts.push(format!(
            "➕ *Medici aggiunti* \\({}\\):",
            changes.added.len()
        ));

        let mut groups: Vec<(&str, Vec<&Doctor>)> = Vec::new();
        for doctor in &changes.added {
            match groups
                .iter_mut()
                .find(|(availability, _)| *availability == doctor.availability)
            {
                Some((_, group)) => group.push(doctor),
                None => groups.push((&doctor.availability, vec![doctor])),
            }
        }

        for (availability, doctors) in groups {
            parts.push(format!("\n_{}_:", escape_markdown(availability)));
            for doctor in doctors {
                parts.push(format_doctor(doctor));
            }
        }
    }

    if !changes.removed.is_empty() {
        parts.push(format!(
            "\n➖ *Medici rimossi* \\({}\\):",
            changes.removed.len()
        ));
        for doctor in &changes.removed {
            parts.push(format_doctor(doctor));
        }
    }

    if !changes.changed.is_empty() {
        parts.push(format!(
            "\n🔄 *Cambio disponibilità* \\({}\\):",
            changes.changed.len()
        ));
        for change in &changes.changed {
            parts.push(format!(
                "{}\n    {} → {}",
                format_doctor(&change.doctor),
                escape_markdown(&change.old_availability),
                escape_markdown(&change.new_availability)
            ));
        }
    }

    parts.join("\n")
}
