//! Message bodies for every channel.
//!
//! Anything user-supplied that ends up in HTML goes through [`escape_html`].

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dosewatch_common::models::Medication;
use dosewatch_common::notifications::{EmailMessage, PushAction, PushPayload, SmsMessage};

pub const PUSH_TITLE: &str = "Medication Reminder";
pub const VIBRATE_PATTERN: [u32; 7] = [200, 100, 200, 100, 200, 100, 400];

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders a timestamp in the user-facing zone, e.g. "Mar 1, 2026 at 11:00 AM CET".
pub fn format_local(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz)
        .format("%b %-d, %Y at %-I:%M %p %Z")
        .to_string()
}

fn interval_phrase(hours: u32) -> String {
    if hours == 1 {
        "1 hour".to_string()
    } else {
        format!("{} hours", hours)
    }
}

pub fn reminder_email(medication: &Medication, to: &str) -> EmailMessage {
    let name = escape_html(&medication.name);
    let image = match medication.image_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => format!(
            "<img src=\"{}\" alt=\"{}\" style=\"max-width: 200px;\" />\n",
            escape_html(url),
            name
        ),
        _ => String::new(),
    };

    let html = format!(
        "<h1>Medication Reminder</h1>\n\
         <p>It's time to take your {name}</p>\n\
         <p>Dosage: {dosage}</p>\n\
         {image}\
         <p>Next reminder will be in {interval}</p>\n",
        name = name,
        dosage = escape_html(&medication.dosage),
        image = image,
        interval = interval_phrase(medication.interval_hours),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Time to take {}!", medication.name),
        html,
    }
}

/// SMS text, with one snooze link per line appended when given.
pub fn reminder_sms(medication: &Medication, to: &str, snooze_links: &[(u32, String)]) -> SmsMessage {
    let mut body = format!(
        "Time to take {} ({}). Next reminder in {}.",
        medication.name,
        medication.dosage,
        interval_phrase(medication.interval_hours)
    );
    for (hours, link) in snooze_links {
        body.push_str(&format!("\nSnooze {}h: {}", hours, link));
    }

    SmsMessage {
        to: to.to_string(),
        body,
    }
}

pub fn reminder_push(medication: &Medication, click_url: &str, sound: Option<&str>) -> PushPayload {
    PushPayload {
        title: PUSH_TITLE.to_string(),
        body: format!("Time to take {} ({})", medication.name, medication.dosage),
        url: click_url.to_string(),
        sound: sound.map(str::to_string),
        tag: Some(format!("medication-{}", medication.id)),
        renotify: Some(true),
        actions: Some(vec![
            PushAction {
                action: "take".to_string(),
                title: "Mark as taken".to_string(),
            },
            PushAction {
                action: "snooze".to_string(),
                title: "Snooze".to_string(),
            },
        ]),
        vibrate: Some(VIBRATE_PATTERN.to_vec()),
    }
}

pub fn snooze_email(medication: &Medication, to: &str, next_reminder: DateTime<Utc>, tz: Tz) -> EmailMessage {
    let html = format!(
        "<h1>Reminder Snoozed</h1>\n\
         <p>Your reminder for {} has been snoozed.</p>\n\
         <p>Next reminder: {}</p>\n",
        escape_html(&medication.name),
        format_local(next_reminder, tz)
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Reminder Snoozed".to_string(),
        html,
    }
}
