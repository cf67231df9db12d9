//! HTML bodies for the emails the service sends.

use super::{EmailMessage, EmailSettings};
use common::Analysis;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(settings: &EmailSettings, title: &str, body: &str) -> String {
    format!(
        "<html><body style=\"font-family: Arial, sans-serif; color: #333;\">\
         <h2 style=\"color: #2e7d32;\">{title}</h2>{body}\
         <hr><p style=\"font-size: 12px; color: #777;\">{app} &middot; <a href=\"{url}\">{url}</a></p>\
         </body></html>",
        title = escape(title),
        body = body,
        app = escape(&settings.app_name),
        url = escape(&settings.frontend_url),
    )
}

pub fn welcome(settings: &EmailSettings, to: &str, username: &str) -> EmailMessage {
    let body = format!(
        "<p>Hello {},</p>\
         <p>Your account is ready. Upload a photo of a crop leaf and we will check it for \
         signs of disease and suggest treatments.</p>",
        escape(username)
    );
    EmailMessage {
        to: to.to_string(),
        subject: format!("Welcome to {}", settings.app_name),
        html: layout(settings, &format!("Welcome to {}", settings.app_name), &body),
    }
}

pub fn disease_report(
    settings: &EmailSettings,
    to: &str,
    username: &str,
    analysis: &Analysis,
) -> EmailMessage {
    let status = analysis.status_message();
    let body = format!(
        "<p>Hello {user},</p>\
         <p><strong>{status}</strong></p>\
         <table>\
         <tr><td>Crop</td><td>{plant}</td></tr>\
         <tr><td>Confidence</td><td>{confidence}</td></tr>\
         </table>\
         <h3>Recommended treatment</h3><p>{treatment}</p>\
         <h3>Prevention</h3><p>{prevention}</p>",
        user = escape(username),
        status = escape(&status),
        plant = escape(&analysis.plant_name),
        confidence = analysis.confidence,
        treatment = escape(&analysis.treatment),
        prevention = escape(&analysis.prevention),
    );
    EmailMessage {
        to: to.to_string(),
        subject: format!("{} - Crop Analysis Report", settings.app_name),
        html: layout(settings, "Crop Analysis Report", &body),
    }
}

pub fn password_reset(settings: &EmailSettings, to: &str, username: &str, token: &str) -> EmailMessage {
    let link = format!(
        "{}/reset-password?token={}",
        settings.frontend_url.trim_end_matches('/'),
        token
    );
    let body = format!(
        "<p>Hello {user},</p>\
         <p>We received a request to reset your password. The link below expires in 1 hour.</p>\
         <p><a href=\"{link}\">Reset your password</a></p>\
         <p>If you did not ask for this, you can ignore this email.</p>",
        user = escape(username),
        link = escape(&link),
    );
    EmailMessage {
        to: to.to_string(),
        subject: format!("{} - Password Reset", settings.app_name),
        html: layout(settings, "Password Reset", &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback;

    #[test]
    fn report_email_shows_percentage_and_verdict() {
        let analysis = fallback::outcome(0);
        let message = disease_report(&EmailSettings::default(), "a@b.c", "john", &analysis);
        assert!(message.html.contains("Disease detected: Leaf Rust"));
        assert!(message.html.contains("87.5%"));
        assert_eq!(message.subject, "Agri Smart Detect - Crop Analysis Report");
    }

    #[test]
    fn reset_email_links_to_frontend() {
        let settings = EmailSettings {
            frontend_url: "https://app.example/".to_string(),
            ..EmailSettings::default()
        };
        let message = password_reset(&settings, "a@b.c", "john", "tok-123");
        assert!(message.html.contains("https://app.example/reset-password?token=tok-123"));
    }

    #[test]
    fn user_text_is_escaped() {
        let message = welcome(&EmailSettings::default(), "a@b.c", "<script>");
        assert!(message.html.contains("&lt;script&gt;"));
        assert!(!message.html.contains("<script>"));
    }
}
