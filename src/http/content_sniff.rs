//! Generic content sniffing
//!
//! Classifies a byte prefix following the WHATWG MIME sniffing rules for
//! HTML, XML, text, images, media, fonts and archives. Only the first
//! 512 bytes are examined.

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const SNIFF_LEN: usize = 512;

enum Sniff {
    /// Case-insensitive HTML tag, after optional whitespace, terminated by a space or `>`
    Html(&'static [u8]),
    /// Byte prefix compared under a mask
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_whitespace: bool,
        mime: &'static str,
    },
    /// Literal byte prefix
    Exact(&'static [u8], &'static str),
    Mp4,
    Text,
}

const HTML: &str = "text/html; charset=utf-8";

const fn exact(sig: &'static [u8], mime: &'static str) -> Sniff {
    Sniff::Exact(sig, mime)
}

const fn masked(mask: &'static [u8], pattern: &'static [u8], mime: &'static str) -> Sniff {
    Sniff::Masked {
        mask,
        pattern,
        skip_whitespace: false,
        mime,
    }
}

const SNIFFERS: &[Sniff] = &[
    Sniff::Html(b"<!DOCTYPE HTML"),
    Sniff::Html(b"<HTML"),
    Sniff::Html(b"<HEAD"),
    Sniff::Html(b"<SCRIPT"),
    Sniff::Html(b"<IFRAME"),
    Sniff::Html(b"<H1"),
    Sniff::Html(b"<DIV"),
    Sniff::Html(b"<FONT"),
    Sniff::Html(b"<TABLE"),
    Sniff::Html(b"<A"),
    Sniff::Html(b"<STYLE"),
    Sniff::Html(b"<TITLE"),
    Sniff::Html(b"<B"),
    Sniff::Html(b"<BODY"),
    Sniff::Html(b"<BR"),
    Sniff::Html(b"<P"),
    Sniff::Html(b"<!--"),
    Sniff::Masked {
        mask: b"\xff\xff\xff\xff\xff",
        pattern: b"<?xml",
        skip_whitespace: true,
        mime: "text/xml; charset=utf-8",
    },
    exact(b"%PDF-", "application/pdf"),
    exact(b"%!PS-Adobe-", "application/postscript"),
    // UTF byte order marks
    masked(b"\xff\xff\x00\x00", b"\xfe\xff\x00\x00", "text/plain; charset=utf-16be"),
    masked(b"\xff\xff\x00\x00", b"\xff\xfe\x00\x00", "text/plain; charset=utf-16le"),
    masked(b"\xff\xff\xff\x00", b"\xef\xbb\xbf\x00", "text/plain; charset=utf-8"),
    // images
    exact(b"\x00\x00\x01\x00", "image/x-icon"),
    exact(b"\x00\x00\x02\x00", "image/x-icon"),
    exact(b"BM", "image/bmp"),
    exact(b"GIF87a", "image/gif"),
    exact(b"GIF89a", "image/gif"),
    masked(
        b"\xff\xff\xff\xff\x00\x00\x00\x00\xff\xff\xff\xff\xff\xff",
        b"RIFF\x00\x00\x00\x00WEBPVP",
        "image/webp",
    ),
    exact(b"\x89PNG\x0d\x0a\x1a\x0a", "image/png"),
    exact(b"\xff\xd8\xff", "image/jpeg"),
    // audio and video
    masked(
        b"\xff\xff\xff\xff\x00\x00\x00\x00\xff\xff\xff\xff",
        b"FORM\x00\x00\x00\x00AIFF",
        "audio/aiff",
    ),
    masked(b"\xff\xff\xff", b"ID3", "audio/mpeg"),
    masked(b"\xff\xff\xff\xff\xff", b"OggS\x00", "application/ogg"),
    masked(
        b"\xff\xff\xff\xff\xff\xff\xff\xff",
        b"MThd\x00\x00\x00\x06",
        "audio/midi",
    ),
    masked(
        b"\xff\xff\xff\xff\x00\x00\x00\x00\xff\xff\xff\xff",
        b"RIFF\x00\x00\x00\x00AVI ",
        "video/avi",
    ),
    masked(
        b"\xff\xff\xff\xff\x00\x00\x00\x00\xff\xff\xff\xff",
        b"RIFF\x00\x00\x00\x00WAVE",
        "audio/wave",
    ),
    Sniff::Mp4,
    exact(b"\x1a\x45\xdf\xa3", "video/webm"),
    // fonts
    masked(
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xff\xff",
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00LP",
        "application/vnd.ms-fontobject",
    ),
    exact(b"\x00\x01\x00\x00", "font/ttf"),
    exact(b"OTTO", "font/otf"),
    exact(b"ttcf", "font/collection"),
    exact(b"wOFF", "font/woff"),
    exact(b"wOF2", "font/woff2"),
    // archives
    exact(b"\x1f\x8b\x08", "application/x-gzip"),
    exact(b"PK\x03\x04", "application/zip"),
    exact(b"Rar!\x1a\x07\x00", "application/x-rar-compressed"),
    exact(b"Rar!\x1a\x07\x01\x00", "application/x-rar-compressed"),
    exact(b"\x00\x61\x73\x6d", "application/wasm"),
    Sniff::Text,
];

/// Classify `data`, falling back to `application/octet-stream`
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let first_non_ws = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());

    SNIFFERS
        .iter()
        .find_map(|sniffer| sniffer.classify(data, first_non_ws))
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

impl Sniff {
    fn classify(&self, data: &[u8], first_non_ws: usize) -> Option<&'static str> {
        match self {
            Self::Html(tag) => {
                let data = &data[first_non_ws..];
                if data.len() < tag.len() + 1 {
                    return None;
                }
                let (head, rest) = data.split_at(tag.len());
                let same = head
                    .iter()
                    .zip(tag.iter())
                    .all(|(d, t)| d.to_ascii_uppercase() == *t);
                (same && matches!(rest[0], b' ' | b'>')).then_some(HTML)
            }
            Self::Masked {
                mask,
                pattern,
                skip_whitespace,
                mime,
            } => {
                let data = if *skip_whitespace {
                    &data[first_non_ws..]
                } else {
                    data
                };
                if data.len() < pattern.len() {
                    return None;
                }
                let hit = pattern
                    .iter()
                    .zip(mask.iter())
                    .zip(data.iter())
                    .all(|((p, m), d)| d & m == *p);
                hit.then_some(*mime)
            }
            Self::Exact(sig, mime) => data.starts_with(sig).then_some(*mime),
            Self::Mp4 => is_mp4(data).then_some("video/mp4"),
            Self::Text => {
                let text = data[first_non_ws..].iter().all(|b| !is_binary(*b));
                text.then_some("text/plain; charset=utf-8")
            }
        }
    }
}

const fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0c | b'\r' | b' ')
}

const fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    // brands start at offset 8; offset 12 holds the minor version
    (8..box_size)
        .step_by(4)
        .filter(|st| *st != 12)
        .any(|st| data.get(st..st + 3) == Some(b"mp4".as_slice()))
}
