use crate::models::InboundEvent;
use serde::Deserialize;

/// Form fields posted by the Twilio messaging webhook.
#[derive(Debug, Deserialize)]
pub struct TwilioMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<String>,
}

impl TwilioMessage {
    pub fn into_event(self) -> InboundEvent {
        InboundEvent::from_parts(
            self.from,
            &self.body,
            self.latitude.as_deref(),
            self.longitude.as_deref(),
        )
    }
}

/// Wrap a reply in a TwiML messaging response.
pub fn twiml_message(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(body)
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            twiml_message("a < b & 'c'"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>a &lt; b &amp; &apos;c&apos;</Message></Response>"
        );
    }

    #[test]
    fn converts_to_event() {
        let msg = TwilioMessage {
            from: "whatsapp:+911234567890".into(),
            body: "  Rice, S ".into(),
            latitude: Some("26.4499".into()),
            longitude: Some("80.3319".into()),
        };
        let event = msg.into_event();
        assert_eq!(event.sender_id, "whatsapp:+911234567890");
        assert_eq!(event.text, "Rice, S");
        assert!(event.location.is_some());
    }
}
