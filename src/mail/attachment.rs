//! Located MIME parts and transfer-encoding decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quoted_printable::ParseMode;

use crate::error::MailError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Declared `Content-Transfer-Encoding` of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Absent, `7bit`, `8bit`, `binary` or anything unrecognized.
    Identity,
    Base64,
    QuotedPrintable,
}

impl TransferEncoding {
    /// Map a raw header value to an encoding. Unknown values are identity.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("base64") => Self::Base64,
            Some("quoted-printable") => Self::QuotedPrintable,
            _ => Self::Identity,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
        }
    }
}

/// A MIME part located inside a raw email, body still transfer-encoded.
#[derive(Debug, Clone)]
pub struct AttachmentPart {
    /// `type/subtype`, lowercased.
    pub content_type: String,
    pub encoding: TransferEncoding,
    pub filename: Option<String>,
    pub raw_body: Vec<u8>,
}

impl AttachmentPart {
    pub fn is_csv(&self) -> bool {
        self.content_type == "text/csv"
    }

    /// Undo the transfer encoding, returning the payload bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, MailError> {
        match self.encoding {
            TransferEncoding::Identity => Ok(self.raw_body.clone()),
            TransferEncoding::Base64 => {
                let compact: Vec<u8> = self
                    .raw_body
                    .iter()
                    .copied()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| MailError::CsvDecode(format!("invalid base64 payload: {e}")))
            }
            // Robust mode keeps malformed escapes literally.
            TransferEncoding::QuotedPrintable => {
                quoted_printable::decode(&self.raw_body, ParseMode::Robust).map_err(|e| {
                    MailError::CsvDecode(format!("invalid quoted-printable payload: {e}"))
                })
            }
        }
    }

    /// Undo the transfer encoding and decode the payload as UTF-8,
    /// dropping a leading byte-order mark.
    pub fn decode_text(&self) -> Result<String, MailError> {
        let bytes = self.decode_bytes()?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
        String::from_utf8(bytes.to_vec())
            .map_err(|e| MailError::CsvDecode(format!("payload is not UTF-8: {e}")))
    }
}
