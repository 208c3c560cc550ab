//! MIME parsing: locate the CSV attachment of a tender notification email.

use mail_parser::{Message, MessageParser, MimeHeaders, PartType};
use tracing::debug;

use crate::error::MailError;
use crate::mail::attachment::{AttachmentPart, TransferEncoding};
use crate::mail::rows::{CsvRow, parse_csv_rows};

/// Parse a raw RFC 5322 / MIME message.
///
/// Input that `mail-parser` rejects, or that carries no header at all, is
/// not an email.
pub fn parse_email(raw_email: &[u8]) -> Result<Message<'_>, MailError> {
    let message = MessageParser::default()
        .parse(raw_email)
        .ok_or_else(|| MailError::MalformedEmail("input is not a MIME message".into()))?;

    if message.headers().is_empty() {
        return Err(MailError::MalformedEmail("message has no headers".into()));
    }
    Ok(message)
}

/// Find the first `text/csv` part, in document order.
///
/// Nested multiparts are already flattened by the parser; attached
/// `message/rfc822` emails are searched in place.
pub fn find_csv_part(message: &Message<'_>) -> Result<Option<AttachmentPart>, MailError> {
    for part in &message.parts {
        if let PartType::Message(nested) = &part.body {
            if let Some(found) = find_csv_part(nested)? {
                return Ok(Some(found));
            }
            continue;
        }

        let Some(content_type) = part.content_type() else {
            continue;
        };
        let mut attachment = AttachmentPart {
            content_type: match content_type.subtype() {
                Some(subtype) => format!("{}/{}", content_type.ctype(), subtype),
                None => content_type.ctype().to_string(),
            }
            .to_ascii_lowercase(),
            encoding: TransferEncoding::from_header(part.content_transfer_encoding()),
            filename: part.attachment_name().map(str::to_string),
            raw_body: Vec::new(),
        };
        if !attachment.is_csv() {
            continue;
        }

        // Part offsets index the buffer the message was parsed from, which
        // for an inline forwarded email is the enclosing message.
        let start = part.raw_body_offset() as usize;
        let end = part.raw_end_offset() as usize;
        attachment.raw_body = message
            .raw_message
            .get(start..end)
            .ok_or_else(|| {
                MailError::CsvDecode(format!(
                    "attachment body {start}..{end} lies outside the message"
                ))
            })?
            .to_vec();

        debug!(
            filename = attachment.filename.as_deref().unwrap_or("(unnamed)"),
            encoding = attachment.encoding.label(),
            bytes = attachment.raw_body.len(),
            "Found CSV attachment"
        );
        return Ok(Some(attachment));
    }
    Ok(None)
}

/// Extract the rows of the first CSV attachment of `raw_email`.
///
/// `Ok(None)` means the email has no CSV attachment, which is a normal
/// outcome rather than an error.
pub fn extract_csv(raw_email: &[u8]) -> Result<Option<Vec<CsvRow>>, MailError> {
    let message = parse_email(raw_email)?;
    let Some(attachment) = find_csv_part(&message)? else {
        debug!("Email has no text/csv part");
        return Ok(None);
    };

    let text = attachment.decode_text()?;
    parse_csv_rows(&text).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Tender URL,Notes\r\nhttps://www.tenders.gov.au/Atm/Show/1,first\r\nhttps://www.tenders.gov.au/Atm/Show/2,second\r\n";

    fn email_with_part(headers: &str, body: &str) -> String {
        format!(
            "From: alerts@tenders.example\r\n\
             To: inbox@example.org\r\n\
             Subject: Daily tender report\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
             \r\n\
             --XYZ\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             See attached.\r\n\
             --XYZ\r\n\
             {headers}\r\n\
             \r\n\
             {body}\r\n\
             --XYZ--\r\n"
        )
    }

    fn assert_two_rows(rows: &[CsvRow]) {
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("Tender URL"),
            Some("https://www.tenders.gov.au/Atm/Show/1")
        );
        assert_eq!(
            rows[1].get("Tender URL"),
            Some("https://www.tenders.gov.au/Atm/Show/2")
        );
        assert_eq!(rows[1].get("Notes"), Some("second"));
    }

    // ── Transfer encodings ──────────────────────────────────────────

    #[test]
    fn extracts_base64_attachment() {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(CSV);
        let raw = email_with_part(
            "Content-Type: text/csv; name=\"report.csv\"\r\n\
             Content-Disposition: attachment; filename=\"report.csv\"\r\n\
             Content-Transfer-Encoding: base64",
            &encoded,
        );
        let rows = extract_csv(raw.as_bytes()).unwrap().unwrap();
        assert_two_rows(&rows);
    }

    #[test]
    fn extracts_quoted_printable_attachment() {
        let body = "Tender URL,Notes\r\n\
                    https://www.tenders.gov.au/Atm/Show/1,fi=\r\nrst\r\n\
                    https://www.tenders.gov.au/Atm/Show/2,sec=6Fnd";
        let raw = email_with_part(
            "Content-Type: text/csv\r\nContent-Transfer-Encoding: quoted-printable",
            body,
        );
        let rows = extract_csv(raw.as_bytes()).unwrap().unwrap();
        assert_two_rows(&rows);
        assert_eq!(rows[0].get("Notes"), Some("first"));
    }

    #[test]
    fn extracts_plain_attachment() {
        let raw = email_with_part("Content-Type: text/csv; charset=utf-8", CSV.trim_end());
        let rows = extract_csv(raw.as_bytes()).unwrap().unwrap();
        assert_two_rows(&rows);
    }

    // ── Part selection ──────────────────────────────────────────────

    #[test]
    fn no_csv_part_is_none() {
        let raw = email_with_part("Content-Type: application/pdf", "JVBERi0xLjQ=");
        assert!(extract_csv(raw.as_bytes()).unwrap().is_none());
    }

    #[test]
    fn finds_csv_in_nested_multipart() {
        let raw = "From: alerts@tenders.example\r\n\
                   Subject: nested\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"OUTER\"\r\n\
                   \r\n\
                   --OUTER\r\n\
                   Content-Type: multipart/alternative; boundary=\"INNER\"\r\n\
                   \r\n\
                   --INNER\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   hello\r\n\
                   --INNER\r\n\
                   Content-Type: text/csv\r\n\
                   \r\n\
                   URL\r\n\
                   https://inner.example/1\r\n\
                   --INNER--\r\n\
                   --OUTER--\r\n";
        let rows = extract_csv(raw.as_bytes()).unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("URL"), Some("https://inner.example/1"));
    }

    #[test]
    fn finds_csv_in_forwarded_email() {
        let raw = "From: colleague@example.org\r\n\
                   Subject: Fwd: Daily tender report\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"FWD\"\r\n\
                   \r\n\
                   --FWD\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   Forwarding this one.\r\n\
                   --FWD\r\n\
                   Content-Type: message/rfc822\r\n\
                   \r\n\
                   From: alerts@tenders.example\r\n\
                   Subject: Daily tender report\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"ORIG\"\r\n\
                   \r\n\
                   --ORIG\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   See attached.\r\n\
                   --ORIG\r\n\
                   Content-Type: text/csv\r\n\
                   \r\n\
                   Tender URL,Notes\r\n\
                   https://inner.example/1,a\r\n\
                   --ORIG--\r\n\
                   --FWD--\r\n";
        let rows = extract_csv(raw.as_bytes()).unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Tender URL"), Some("https://inner.example/1"));
        assert_eq!(rows[0].get("Notes"), Some("a"));
    }

    #[test]
    fn located_part_reports_its_content_type() {
        let raw = email_with_part("Content-Type: Text/CSV; name=\"a.csv\"", CSV.trim_end());
        let message = parse_email(raw.as_bytes()).unwrap();
        let part = find_csv_part(&message).unwrap().unwrap();
        assert_eq!(part.content_type, "text/csv");
        assert!(part.is_csv());
        assert_eq!(part.filename.as_deref(), Some("a.csv"));
    }

    #[test]
    fn first_csv_part_wins() {
        let raw = "From: alerts@tenders.example\r\n\
                   Subject: two csvs\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"B\"\r\n\
                   \r\n\
                   --B\r\n\
                   Content-Type: text/csv\r\n\
                   \r\n\
                   URL\r\n\
                   https://first.example\r\n\
                   --B\r\n\
                   Content-Type: text/csv\r\n\
                   \r\n\
                   URL\r\n\
                   https://second.example\r\n\
                   --B--\r\n";
        let rows = extract_csv(raw.as_bytes()).unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("URL"), Some("https://first.example"));
    }

    #[test]
    fn content_type_match_ignores_case() {
        let raw = email_with_part("Content-Type: Text/CSV", CSV.trim_end());
        assert!(extract_csv(raw.as_bytes()).unwrap().is_some());
    }

    // ── Failures ────────────────────────────────────────────────────

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            extract_csv(b""),
            Err(MailError::MalformedEmail(_))
        ));
    }

    #[test]
    fn undecodable_attachment_is_csv_error() {
        let raw = email_with_part(
            "Content-Type: text/csv\r\nContent-Transfer-Encoding: base64",
            "%%%% definitely not base64 %%%%",
        );
        assert!(matches!(
            extract_csv(raw.as_bytes()),
            Err(MailError::CsvDecode(_))
        ));
    }
}
