//! Content type detection from leading bytes.
//!
//! Uploads never trust a caller-supplied extension: the MIME type and the
//! extension appended to the filename both come from the content itself.

/// Number of leading bytes inspected by [`sniff`].
pub const SNIFF_LEN: usize = 3072;

/// A detected content type and its canonical extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    /// MIME type, e.g. `image/png`.
    pub mime: &'static str,
    /// Extension including the dot, e.g. `.png`. Empty when unknown.
    pub extension: &'static str,
}

impl Sniffed {
    const fn new(mime: &'static str, extension: &'static str) -> Self {
        Self { mime, extension }
    }

    /// Fallback for unrecognised binary content.
    pub const OCTET_STREAM: Self = Self::new("application/octet-stream", "");
}

// Checked in order; the first match wins.
const SIGNATURES: &[(&[u8], Sniffed)] = &[
    (b"\x89PNG\r\n\x1a\n", Sniffed::new("image/png", ".png")),
    (b"\xff\xd8\xff", Sniffed::new("image/jpeg", ".jpg")),
    (b"GIF87a", Sniffed::new("image/gif", ".gif")),
    (b"GIF89a", Sniffed::new("image/gif", ".gif")),
    (b"\x00\x00\x01\x00", Sniffed::new("image/x-icon", ".ico")),
    (b"II*\x00", Sniffed::new("image/tiff", ".tiff")),
    (b"MM\x00*", Sniffed::new("image/tiff", ".tiff")),
    (b"%PDF-", Sniffed::new("application/pdf", ".pdf")),
    (b"PK\x03\x04", Sniffed::new("application/zip", ".zip")),
    (b"\x1f\x8b", Sniffed::new("application/gzip", ".gz")),
    (b"ID3", Sniffed::new("audio/mpeg", ".mp3")),
    (b"OggS", Sniffed::new("audio/ogg", ".ogg")),
    (b"fLaC", Sniffed::new("audio/flac", ".flac")),
    (b"\x1a\x45\xdf\xa3", Sniffed::new("video/webm", ".webm")),
    (b"\x00asm", Sniffed::new("application/wasm", ".wasm")),
];

/// Detect the content type of `data` from its first [`SNIFF_LEN`] bytes.
///
/// Binary signatures are checked first. Content that is valid UTF-8 is then
/// classified as SVG, HTML, JSON or plain text. Anything else is
/// `application/octet-stream` with no extension.
///
/// ```
/// use payloadcms_core::sniff;
///
/// let text = sniff(b"hello world");
/// assert_eq!(text.mime, "text/plain; charset=utf-8");
/// assert_eq!(text.extension, ".txt");
/// ```
#[must_use]
pub fn sniff(data: &[u8]) -> Sniffed {
    let head = data.get(..SNIFF_LEN).unwrap_or(data);

    if let Some(found) = riff(head).or_else(|| iso_media(head)).or_else(|| bmp(head)) {
        return found;
    }
    for (magic, sniffed) in SIGNATURES {
        if head.starts_with(magic) {
            return *sniffed;
        }
    }

    match utf8_prefix(head) {
        Some(text) => classify_text(text, head.len() < data.len()),
        None => Sniffed::OCTET_STREAM,
    }
}

fn riff(head: &[u8]) -> Option<Sniffed> {
    if head.get(..4) != Some(b"RIFF".as_slice()) {
        return None;
    }
    match head.get(8..12)? {
        b"WEBP" => Some(Sniffed::new("image/webp", ".webp")),
        b"WAVE" => Some(Sniffed::new("audio/wav", ".wav")),
        b"AVI " => Some(Sniffed::new("video/x-msvideo", ".avi")),
        _ => None,
    }
}

// `BM` alone matches ordinary text, so the reserved header words must be zero too.
fn bmp(head: &[u8]) -> Option<Sniffed> {
    (head.starts_with(b"BM") && head.get(6..10) == Some([0u8; 4].as_slice()))
        .then_some(Sniffed::new("image/bmp", ".bmp"))
}

fn iso_media(head: &[u8]) -> Option<Sniffed> {
    if head.get(4..8) != Some(b"ftyp".as_slice()) {
        return None;
    }
    match head.get(8..12)? {
        b"avif" | b"avis" => Some(Sniffed::new("image/avif", ".avif")),
        b"heic" | b"heix" => Some(Sniffed::new("image/heic", ".heic")),
        b"qt  " => Some(Sniffed::new("video/quicktime", ".mov")),
        b"M4A " => Some(Sniffed::new("audio/x-m4a", ".m4a")),
        _ => Some(Sniffed::new("video/mp4", ".mp4")),
    }
}

/// Decodes `head` as UTF-8, tolerating a multi-byte character cut at the end.
fn utf8_prefix(head: &[u8]) -> Option<&str> {
    match std::str::from_utf8(head) {
        Ok(text) => Some(text),
        Err(e) if e.error_len().is_none() => head
            .get(..e.valid_up_to())
            .and_then(|valid| std::str::from_utf8(valid).ok()),
        Err(_) => None,
    }
}

fn classify_text(text: &str, truncated: bool) -> Sniffed {
    if text.contains('\0') {
        return Sniffed::OCTET_STREAM;
    }

    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let lower = trimmed
        .get(..trimmed.len().min(256))
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    if lower.starts_with("<svg") || (lower.starts_with("<?xml") && trimmed.contains("<svg")) {
        return Sniffed::new("image/svg+xml", ".svg");
    }
    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return Sniffed::new("text/html; charset=utf-8", ".html");
    }
    if lower.starts_with("<?xml") {
        return Sniffed::new("text/xml; charset=utf-8", ".xml");
    }
    // a truncated prefix cannot be validated as a whole document
    if !truncated
        && (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok()
    {
        return Sniffed::new("application/json", ".json");
    }

    Sniffed::new("text/plain; charset=utf-8", ".txt")
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn images() {
        check!(sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").mime == "image/png");
        check!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).extension == ".jpg");
        check!(sniff(b"GIF89a\x01\x00").extension == ".gif");
        check!(sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 ").mime == "image/webp");
        check!(sniff(b"\x00\x00\x00\x1cftypavif").mime == "image/avif");
    }

    #[test]
    fn documents() {
        check!(sniff(b"%PDF-1.7\n").extension == ".pdf");
        check!(sniff(b"PK\x03\x04\x14\x00").mime == "application/zip");
    }

    #[test]
    fn text_variants() {
        check!(sniff(b"This is a test file content").mime == "text/plain; charset=utf-8");
        check!(sniff(b"This is a test file content").extension == ".txt");
        check!(sniff(br#"{"alt":"x"}"#).mime == "application/json");
        check!(sniff(b"{not json").extension == ".txt");
        check!(sniff(b"<!DOCTYPE html><html></html>").extension == ".html");
        check!(
            sniff(br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"/>"#).mime
                == "image/svg+xml"
        );
    }

    #[test]
    fn binary_falls_back_to_octet_stream() {
        check!(sniff(&[0x00, 0x01, 0x02, 0xFE]) == Sniffed::OCTET_STREAM);
        check!(sniff(&[0xC3, 0x28, 0x41]) == Sniffed::OCTET_STREAM);
        check!(sniff(b"").mime == "text/plain; charset=utf-8");
    }

    #[test]
    fn cut_multibyte_char_is_still_text() {
        let mut data = "a".repeat(SNIFF_LEN - 1).into_bytes();
        data.extend_from_slice("é".as_bytes());
        check!(sniff(&data).extension == ".txt");
    }
}
