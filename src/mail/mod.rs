//! Notification email ingestion: MIME parsing, CSV attachment decoding and
//! tender URL collection.

pub mod attachment;
pub mod mime;
pub mod rows;
pub mod urls;

pub use attachment::{AttachmentPart, TransferEncoding};
pub use mime::{extract_csv, find_csv_part, parse_email};
pub use rows::{CsvRow, parse_csv_rows};
pub use urls::{collect_urls, is_url_column};
