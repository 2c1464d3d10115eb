use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A cleaned inbound email ready for the agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    pub subject: String,
    pub body: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub email_id: Option<String>,
}

/// Parses raw email fields into a [`ParsedEmail`].
///
/// Accepts `Name <addr@host>` sender forms, validates the address shape,
/// and strips HTML markup from subject/body when any is present.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmailParser;

impl EmailParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(
        &self,
        from_email: &str,
        subject: &str,
        body: &str,
        sender_name: Option<&str>,
        email_id: Option<&str>,
    ) -> Result<ParsedEmail, DomainError> {
        let address = extract_email_address(from_email);
        let extracted_name = extract_name_from_email(from_email);

        if !is_valid_email(&address) {
            return Err(DomainError::InvalidSenderAddress { address });
        }

        let clean_body = if looks_like_html(body) {
            strip_html(body)
        } else {
            body.trim().to_string()
        };
        let clean_subject = if looks_like_html(subject) {
            strip_html(subject)
        } else {
            subject.trim().to_string()
        };

        Ok(ParsedEmail {
            subject: clean_subject,
            body: clean_body,
            sender_email: address,
            sender_name: sender_name.map(str::to_string).or(extracted_name),
            email_id: email_id.map(str::to_string),
        })
    }
}

fn looks_like_html(text: &str) -> bool {
    text.contains('<') && text.contains('>')
}

/// Pulls the bare address out of `Name <addr@host>`; returns the trimmed
/// input when no angle-bracket form is present.
pub fn extract_email_address(input: &str) -> String {
    if let (Some(start), Some(end)) = (input.find('<'), input.rfind('>')) {
        if start < end {
            return input[start + 1..end].trim().to_string();
        }
    }
    input.trim().to_string()
}

fn extract_name_from_email(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let start = trimmed.find('<')?;
    if !trimmed.ends_with('>') || start == 0 {
        return None;
    }
    let name = trimmed[..start].trim().trim_matches('"').trim_matches('\'').trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Shape check only: one `@`, non-empty local part, and a dotted domain
/// with an alphabetic top-level label of at least two characters.
pub fn is_valid_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c)) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }
    if !domain.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
        return false;
    }

    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Strips markup from an HTML fragment: drops script/style blocks entirely,
/// replaces remaining tags with spaces, decodes common entities, and
/// collapses whitespace.
pub fn strip_html(input: &str) -> String {
    let without_blocks = remove_block(&remove_block(input, "script"), "style");

    let mut text = String::with_capacity(without_blocks.len());
    let mut in_tag = false;
    for ch in without_blocks.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn remove_block(input: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let lower = input.to_ascii_lowercase();

    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;
    while let Some(relative_start) = lower[cursor..].find(&open) {
        let start = cursor + relative_start;
        output.push_str(&input[cursor..start]);
        match lower[start..].find(&close) {
            Some(relative_end) => cursor = start + relative_end + close.len(),
            None => return output,
        }
    }
    output.push_str(&input[cursor..]);
    output
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
