//! Flattened MIME model built on `mail-parser`.

use mail_parser::{Message, MessageParser, MimeHeaders, PartType};
use tracing::trace;

use crate::error::EmailError;

/// Content type assumed for parts without a Content-Type header (RFC 2045 §5.2).
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// A parsed email: the raw From header and every MIME part in walk order.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Unparsed value of the From header.
    pub from_header: Option<String>,

    /// All parts, depth-first pre-order, starting with the root.
    pub parts: Vec<MimePart>,

    /// Indices into `parts` of the root's direct children.
    pub top_level: Vec<usize>,
}

/// One MIME part.
#[derive(Debug, Clone)]
pub struct MimePart {
    /// Full content type, lowercase (e.g. `application/pdf`).
    pub content_type: String,

    /// Disposition type (`attachment`, `inline`), if the header is present.
    pub content_disposition: Option<String>,

    /// Filename from the disposition or content-type parameters.
    pub filename: Option<String>,

    /// Transfer-decoded payload. Empty for multipart containers.
    pub payload: Vec<u8>,

    /// Nesting depth; the root is 0.
    pub depth: usize,
}

impl MimePart {
    /// Primary type, e.g. `application` for `application/pdf`.
    pub fn main_type(&self) -> &str {
        self.content_type
            .split('/')
            .next()
            .unwrap_or(&self.content_type)
    }

    pub fn is_multipart(&self) -> bool {
        self.main_type() == "multipart"
    }

    /// A part qualifies as an attachment when it is a non-text leaf with a
    /// non-inline Content-Disposition.
    pub fn is_attachment_candidate(&self) -> bool {
        if self.is_multipart() || self.main_type() == "text" {
            return false;
        }
        match self.content_disposition.as_deref() {
            None => false,
            Some(disposition) => disposition != "inline",
        }
    }
}

impl EmailMessage {
    /// Parse a raw RFC 5322 message.
    pub fn parse(raw: &[u8]) -> Result<Self, EmailError> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| EmailError::Parse("no message structure found".to_string()))?;

        let mut parts = Vec::new();
        let mut top_level = Vec::new();
        walk(&message, 0, 0, &mut parts, &mut top_level);

        trace!("Parsed message with {} MIME parts", parts.len());

        Ok(Self {
            from_header: raw_header(raw, "From"),
            parts,
            top_level,
        })
    }

    /// Whether the root part is a multipart container.
    pub fn is_multipart(&self) -> bool {
        self.parts.first().is_some_and(MimePart::is_multipart)
    }

    /// Parts qualifying as attachments, in walk order.
    pub fn attachment_candidates(&self) -> impl Iterator<Item = &MimePart> {
        self.parts.iter().filter(|p| p.is_attachment_candidate())
    }

    /// The root's direct child at `index`.
    pub fn top_level_part(&self, index: usize) -> Option<&MimePart> {
        self.top_level.get(index).and_then(|&i| self.parts.get(i))
    }
}

fn walk(
    message: &Message<'_>,
    id: usize,
    depth: usize,
    parts: &mut Vec<MimePart>,
    top_level: &mut Vec<usize>,
) {
    let Some(part) = message.parts.get(id) else {
        return;
    };

    let content_type = part
        .content_type()
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        .to_ascii_lowercase();

    let content_disposition = part
        .content_disposition()
        .map(|d| d.ctype().to_ascii_lowercase());

    let filename = part.attachment_name().map(str::to_string);

    let children: &[usize] = match &part.body {
        PartType::Multipart(children) => children,
        _ => &[],
    };

    let payload = if children.is_empty() {
        part.contents().to_vec()
    } else {
        Vec::new()
    };

    parts.push(MimePart {
        content_type,
        content_disposition,
        filename,
        payload,
        depth,
    });

    for &child in children {
        if depth == 0 {
            top_level.push(parts.len());
        }
        walk(message, child, depth + 1, parts, top_level);
    }
}

/// Unfolded value of the first header named `name` (case-insensitive).
fn raw_header(raw: &[u8], name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let mut found: Option<String> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            if let Some(value) = found.as_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if found.is_some() {
            break;
        }

        if let Some((header, value)) = line.split_once(':') {
            if header.trim().eq_ignore_ascii_case(name) {
                found = Some(value.trim().to_string());
            }
        }
    }

    found
}
