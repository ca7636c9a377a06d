use crate::error::{Error, Result};
use crate::types::ZoningRequest;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::Deserialize;

/// Subscriber notification settings, supplied via the TOML settings file.
/// The SMTP password comes from the `SMTP_PASSWORD` environment variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_user: String,
}

/// Zoning requests whose introduction or pass date is on/after `since`.
/// Timestamps are ISO-8601 UTC, so text comparison orders correctly.
pub fn recent_changes(requests: &[ZoningRequest], since: &str) -> Vec<ZoningRequest> {
    requests
        .iter()
        .filter(|r| {
            r.introduction_date.as_str() >= since
                || r.pass_date.as_deref().is_some_and(|d| d >= since)
        })
        .cloned()
        .collect()
}

/// Render recent changes as an HTML unordered list; each address links to its
/// public detail page.
pub fn render_recent_changes(requests: &[ZoningRequest], area_label: &str) -> String {
    if requests.is_empty() {
        return format!("<p>No recent {} zoning changes.</p>", area_label);
    }

    let items: Vec<String> = requests
        .iter()
        .map(|r| {
            let status = if r.sub_status.contains("Passed") {
                r.sub_status.clone()
            } else {
                let date = r.introduction_date.split('T').next().unwrap_or("");
                format!("Introduced {}", date)
            };
            let address = r.bill_address.as_deref().unwrap_or(&r.record_number);
            let ward = match r.ward.as_deref() {
                Some(ward) => format!("Ward {}", ward),
                None => "unknown ward".to_string(),
            };
            let community = r.community.as_deref().unwrap_or("unknown area");
            format!(
                r#"<li><a href="{}">{}</a> ({}, {}) - {}</li>"#,
                r.url, address, ward, community, status
            )
        })
        .collect();

    format!(
        "<html><body><ul>\n{}\n</ul></body></html>",
        items.join("\n")
    )
}

/// Human-friendly label for an all-caps community name ("AVONDALE" ->
/// "Avondale").
pub fn area_label(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Send the zoning update email over SMTP.
pub fn send_zoning_update_email(
    settings: &EmailSettings,
    html: String,
    area_label: &str,
) -> Result<()> {
    let from = settings
        .from
        .parse()
        .map_err(|e| Error::Email(format!("invalid sender {:?}: {}", settings.from, e)))?;
    let mut builder = Message::builder()
        .from(from)
        .subject(format!("Recent {} Zoning Changes", area_label));
    for recipient in &settings.recipients {
        let to = recipient
            .parse()
            .map_err(|e| Error::Email(format!("invalid recipient {:?}: {}", recipient, e)))?;
        builder = builder.to(to);
    }

    let message = builder
        .multipart(MultiPart::alternative_plain_html(
            "Please open with an email client that supports HTML.".to_string(),
            html,
        ))
        .map_err(|e| Error::Email(format!("failed to build message: {}", e)))?;

    let password = std::env::var("SMTP_PASSWORD")
        .map_err(|_| Error::Email("SMTP_PASSWORD is not set".to_string()))?;
    let mailer = SmtpTransport::relay(&settings.smtp_host)
        .map_err(|e| Error::Email(format!("invalid SMTP host: {}", e)))?
        .credentials(Credentials::new(settings.smtp_user.clone(), password))
        .build();
    mailer
        .send(&message)
        .map_err(|e| Error::Email(format!("send failed: {}", e)))?;
    Ok(())
}
