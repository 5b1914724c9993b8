//! Archived web-page snapshot decoding.
//!
//! Snapshots are single-file MIME archives (`.mhtml`, legacy `.mht`)
//! deposited by the browser-automation step. The reader extracts the first
//! `text/html` part and ignores everything else (images, stylesheets).
//! Decoding is best-effort throughout: a snapshot that decodes badly still
//! beats a pipeline abort, so failures degrade to lossy UTF-8.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The file is absent. Callers treat this as "no data for this
    /// sub-page" — some skill pages are legitimately optional.
    #[error("snapshot not found: {0}")]
    NotFound(String),

    #[error("no text/html part in snapshot: {0}")]
    NoHtmlPart(String),

    #[error("IO error reading snapshot: {0}")]
    Io(String),
}

/// Decode one snapshot file into its embedded HTML document.
pub fn read_snapshot(path: &Path) -> Result<String, SnapshotError> {
    if !path.is_file() {
        return Err(SnapshotError::NotFound(path.display().to_string()));
    }
    let raw = std::fs::read(path).map_err(|e| SnapshotError::Io(e.to_string()))?;
    let text = String::from_utf8_lossy(&raw);
    extract_html(&text).ok_or_else(|| SnapshotError::NoHtmlPart(path.display().to_string()))
}

/// Pull the first text/html payload out of a MIME archive string.
fn extract_html(archive: &str) -> Option<String> {
    let (headers, body) = split_message(archive);
    let content_type = header_value(&headers, "content-type").unwrap_or_default();

    if let Some(boundary) = boundary_param(&content_type) {
        let separator = format!("--{boundary}");
        for part in body.split(separator.as_str()) {
            // skip the preamble and the terminal "--" marker
            let part = part.trim_start_matches(['\r', '\n']);
            if part.is_empty() || part.starts_with("--") {
                continue;
            }
            let (part_headers, part_body) = split_message(part);
            let part_type = header_value(&part_headers, "content-type").unwrap_or_default();
            if !part_type.to_ascii_lowercase().starts_with("text/html") {
                continue;
            }
            let encoding =
                header_value(&part_headers, "content-transfer-encoding").unwrap_or_default();
            let bytes = decode_transfer(&encoding, part_body);
            return Some(decode_charset(&charset_param(&part_type), &bytes));
        }
        return None;
    }

    // single-part archive: headers then the document itself
    if content_type.to_ascii_lowercase().starts_with("text/html") {
        let encoding = header_value(&headers, "content-transfer-encoding").unwrap_or_default();
        let bytes = decode_transfer(&encoding, body);
        return Some(decode_charset(&charset_param(&content_type), &bytes));
    }

    // headerless capture: accept anything that already looks like markup
    if archive.trim_start().starts_with('<') {
        return Some(archive.to_string());
    }
    None
}

/// Split a MIME message into unfolded header lines and the body.
fn split_message(text: &str) -> (Vec<String>, &str) {
    let crlf = text.find("\r\n\r\n");
    let lf = text.find("\n\n");
    let (head, body) = match (crlf, lf) {
        (Some(a), Some(b)) if b + 1 < a => (&text[..b], &text[b + 2..]),
        (Some(a), _) => (&text[..a], &text[a + 4..]),
        (None, Some(b)) => (&text[..b], &text[b + 2..]),
        (None, None) => (text, ""),
    };

    let mut headers: Vec<String> = Vec::new();
    for line in head.lines() {
        if (line.starts_with(' ') || line.starts_with('\t')) && !headers.is_empty() {
            // folded continuation of the previous header
            let last = headers.last_mut().expect("checked non-empty");
            last.push(' ');
            last.push_str(line.trim());
        } else {
            headers.push(line.trim_end().to_string());
        }
    }
    (headers, body)
}

/// Value of a header by case-insensitive name.
fn header_value(headers: &[String], name: &str) -> Option<String> {
    for line in headers {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case(name) {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// `boundary=` parameter of a Content-Type value, unquoted.
fn boundary_param(content_type: &str) -> Option<String> {
    mime_param(content_type, "boundary=")
}

/// `charset=` parameter of a Content-Type value; empty when undeclared.
fn charset_param(content_type: &str) -> String {
    mime_param(content_type, "charset=").unwrap_or_default()
}

fn mime_param(content_type: &str, key: &str) -> Option<String> {
    let lower = content_type.to_ascii_lowercase();
    let start = lower.find(key)? + key.len();
    let rest = &content_type[start..];
    let value = rest.split(';').next().unwrap_or(rest).trim();
    let value = value.trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Undo the part's transfer encoding. Unknown or absent encodings pass
/// through; a corrupt base64 body degrades to its raw bytes.
fn decode_transfer(encoding: &str, body: &str) -> Vec<u8> {
    match encoding.trim().to_ascii_lowercase().as_str() {
        "base64" => {
            let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .unwrap_or_else(|_| body.as_bytes().to_vec())
        }
        "quoted-printable" => decode_quoted_printable(body),
        _ => body.as_bytes().to_vec(),
    }
}

fn decode_quoted_printable(body: &str) -> Vec<u8> {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        // soft line break
        if bytes.get(i + 1) == Some(&b'\r') && bytes.get(i + 2) == Some(&b'\n') {
            i += 3;
        } else if bytes.get(i + 1) == Some(&b'\n') {
            i += 2;
        } else if i + 2 < bytes.len() {
            match std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                Some(decoded) => {
                    out.push(decoded);
                    i += 3;
                }
                None => {
                    out.push(b'=');
                    i += 1;
                }
            }
        } else {
            out.push(b'=');
            i += 1;
        }
    }
    out
}

/// Decode payload bytes per the declared charset, falling back to lossy
/// UTF-8. The latin-1 family is mapped directly; windows-1252's printable
/// range is approximated by latin-1.
fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    match charset.to_ascii_lowercase().as_str() {
        "iso-8859-1" | "latin1" | "latin-1" | "windows-1252" | "cp1252" => {
            bytes.iter().map(|&b| b as char).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(parts: &[(&str, &str, &str)]) -> String {
        let mut out = String::from(
            "From: <Saved by automation>\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/related;\r\n\
             \ttype=\"text/html\";\r\n\
             \tboundary=\"----SnapshotBoundary--1234\"\r\n\r\n",
        );
        for (content_type, encoding, body) in parts {
            out.push_str("------SnapshotBoundary--1234\r\n");
            out.push_str(&format!("Content-Type: {content_type}\r\n"));
            out.push_str(&format!("Content-Transfer-Encoding: {encoding}\r\n\r\n"));
            out.push_str(body);
            out.push_str("\r\n");
        }
        out.push_str("------SnapshotBoundary--1234--\r\n");
        out
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_snapshot(Path::new("/nonexistent/page.mhtml")).unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }

    #[test]
    fn extracts_first_html_part() {
        let text = archive(&[
            ("text/css", "7bit", "body { color: red }"),
            ("text/html; charset=\"utf-8\"", "7bit", "<html><body>first</body></html>"),
            ("text/html; charset=\"utf-8\"", "7bit", "<html><body>second</body></html>"),
        ]);
        let html = extract_html(&text).unwrap();
        assert!(html.contains("first"));
        assert!(!html.contains("second"));
    }

    #[test]
    fn ignores_image_parts() {
        let text = archive(&[
            ("image/png", "base64", "aGVsbG8="),
            ("text/html", "7bit", "<p>doc</p>"),
        ]);
        let html = extract_html(&text).unwrap();
        assert!(html.contains("doc"));
    }

    #[test]
    fn decodes_quoted_printable_payload() {
        let text = archive(&[(
            "text/html; charset=\"utf-8\"",
            "quoted-printable",
            "<p>caf=C3=A9 swim=\r\nmers</p>",
        )]);
        let html = extract_html(&text).unwrap();
        assert!(html.contains("café swimmers"), "got: {html}");
    }

    #[test]
    fn decodes_base64_payload() {
        // "<p>ok</p>"
        let text = archive(&[("text/html", "base64", "PHA+b2s8L3A+")]);
        let html = extract_html(&text).unwrap();
        assert_eq!(html, "<p>ok</p>");
    }

    #[test]
    fn latin1_charset_is_mapped() {
        let body = decode_charset("iso-8859-1", &[b'c', b'a', b'f', 0xE9]);
        assert_eq!(body, "café");
    }

    #[test]
    fn unknown_charset_falls_back_to_lossy_utf8() {
        let body = decode_charset("x-unknown", &[b'o', b'k', 0xFF]);
        assert!(body.starts_with("ok"));
    }

    #[test]
    fn no_html_part_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.mhtml");
        std::fs::write(&path, archive(&[("text/css", "7bit", "body{}")])).unwrap();
        assert!(matches!(
            read_snapshot(&path),
            Err(SnapshotError::NoHtmlPart(_))
        ));
    }

    #[test]
    fn single_part_archive_decodes() {
        let text = "Content-Type: text/html; charset=\"utf-8\"\r\n\
                    Content-Transfer-Encoding: quoted-printable\r\n\r\n\
                    <html><body>solo=20page</body></html>";
        let html = extract_html(text).unwrap();
        assert!(html.contains("solo page"));
    }

    #[test]
    fn headerless_markup_passes_through() {
        let html = extract_html("<html><body>bare</body></html>").unwrap();
        assert!(html.contains("bare"));
    }

    #[test]
    fn quoted_printable_edge_cases() {
        assert_eq!(decode_quoted_printable("a=3Db"), b"a=b");
        assert_eq!(decode_quoted_printable("trailing="), b"trailing=");
        assert_eq!(decode_quoted_printable("bad=ZZesc"), b"bad=ZZesc");
        assert_eq!(decode_quoted_printable("soft=\nbreak"), b"softbreak");
    }

    #[test]
    fn folded_content_type_header_is_unfolded() {
        let text = archive(&[("text/html", "7bit", "<p>x</p>")]);
        let (headers, _) = split_message(&text);
        let ct = header_value(&headers, "content-type").unwrap();
        assert!(ct.contains("boundary=\"----SnapshotBoundary--1234\""));
    }
}
