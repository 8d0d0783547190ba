//! Content-Type, Content-Encoding and Content-Disposition helpers.

use std::path::Path;

use unicode_normalization::UnicodeNormalization;

/// Fallback when the type cannot be guessed.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Compression suffixes reported through `Content-Encoding`.
const ENCODINGS: &[(&str, &str)] = &[
    ("gz", "gzip"),
    ("Z", "compress"),
    ("bz2", "bzip2"),
    ("xz", "xz"),
    ("br", "br"),
];

/// How the `filename` parameter of `Content-Disposition` is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayName {
    /// Use the served file's own name.
    #[default]
    FromPath,
    /// Send no filename parameter.
    Omit,
    /// Use this name.
    Custom(String),
}

/// Guess `(mime type, content encoding)` from a file name.
///
/// A compression suffix yields the encoding and the type is guessed from the
/// remaining extension, so `data.csv.gz` is `text/csv` encoded with `gzip`.
pub fn guess_type(path: &Path) -> (Option<String>, Option<&'static str>) {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return (None, None);
    };

    let (stem, encoding) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let encoding = ENCODINGS
                .iter()
                .find(|(suffix, _)| *suffix == ext)
                .or_else(|| {
                    ENCODINGS
                        .iter()
                        .find(|(suffix, _)| suffix.eq_ignore_ascii_case(ext))
                })
                .map(|(_, encoding)| *encoding);
            match encoding {
                Some(encoding) => (stem, Some(encoding)),
                None => (name, None),
            }
        }
        _ => (name, None),
    };

    let mime = mime_guess::from_path(stem)
        .first()
        .map(|m| m.essence_str().to_string());

    (mime, encoding)
}

/// Whether a type is streamed through the range path.
pub fn is_video(mime_type: &str) -> bool {
    mime_type.starts_with("video/")
}

/// Build a `Content-Disposition` value.
///
/// Non-ASCII names get an ASCII fallback `filename` plus a percent-encoded
/// `filename*=UTF-8''...` parameter for clients that understand it.
pub fn content_disposition(attachment: bool, filename: Option<&str>) -> String {
    let mut parts = vec![if attachment { "attachment" } else { "inline" }.to_string()];

    if let Some(filename) = filename.filter(|name| !name.is_empty()) {
        let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
        let ascii: String = escaped.nfkd().filter(char::is_ascii).collect();
        parts.push(format!("filename=\"{}\"", ascii));

        if ascii != escaped {
            parts.push(format!("filename*=UTF-8''{}", urlencoding::encode(&escaped)));
        }
    }

    parts.join("; ")
}
