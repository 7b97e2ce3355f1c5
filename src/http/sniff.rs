//! Magic-byte signature sniffing
//!
//! Identifies a file from its leading bytes. The table is consulted first,
//! in order; when nothing matches, the generic content sniffer decides, and
//! low-confidence answers (binary or plain text) are reported as unknown.

use super::content_sniff;

/// Bytes read from the start of a file before sniffing
pub const SNIFF_HEADER_LEN: u64 = 1024;

struct Signature {
    prefix: &'static [u8],
    mime: &'static str,
}

const fn sig(prefix: &'static [u8], mime: &'static str) -> Signature {
    Signature { prefix, mime }
}

// References:
//   http://www.garykessler.net/library/file_sigs.html
//   http://www.iana.org/assignments/media-types/media-types.xhtml
//
// Longer signatures sharing a prefix with shorter ones (the ZIP family)
// must come first: the first match wins.
const SIGNATURES: &[Signature] = &[
    sig(b"GIF87a", "image/gif"),
    sig(b"GIF89a", "image/gif"),
    sig(b"\xff\xd8\xff\xe2", "image/jpeg"),
    sig(b"\xff\xd8\xff\xe1", "image/jpeg"),
    sig(b"\xff\xd8\xff\xe0", "image/jpeg"),
    sig(b"\xff\xd8\xff\xdb", "image/jpeg"),
    sig(b"\x49\x49\x2a\x00\x10\x00\x00\x00\x43\x52\x02", "image/cr2"),
    sig(b"\x89PNG\r\n\x1a\n", "image/png"),
    sig(b"\x49\x20\x49", "image/tiff"),
    sig(b"\x49\x49\x2a\x00", "image/tiff"),
    sig(b"\x4d\x4d\x00\x2a", "image/tiff"),
    sig(b"\x4d\x4d\x00\x2b", "image/tiff"),
    sig(b"8BPS", "image/vnd.adobe.photoshop"),
    sig(b"gimp xcf ", "image/xcf"),
    sig(b"-----BEGIN PGP PUBLIC KEY BLOCK---", "text/x-openpgp-public-key"),
    sig(b"fLaC\x00\x00\x00", "audio/flac"),
    sig(b"ID3", "audio/mpeg"),
    sig(b"\x00\x00\x01\xb7", "video/mpeg"),
    sig(b"\x00\x00\x00\x14ftypqt  ", "video/quicktime"),
    sig(b"\x00\x6e\x1e\xf0", "application/vnd.ms-powerpoint"),
    sig(b"\x1a\x45\xdf\xa3", "video/webm"),
    sig(b"FLV\x01", "application/vnd.adobe.flash.video"),
    sig(b"\x1f\x8b\x08", "application/gzip"),
    sig(b"\x37\x7a\xbc\xaf\x27\x1c", "application/x-7z-compressed"),
    sig(b"BZh", "application/bzip2"),
    sig(b"\xfd\x37\x7a\x58\x5a\x00", "application/x-xz"),
    sig(b"PK\x03\x04\x0a\x00\x02\x00", "application/epub+zip"),
    sig(b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "application/vnd.ms-word"),
    sig(
        b"PK\x03\x04\x0a\x14\x00\x06\x00",
        "application/vnd.openxmlformats-officedocument.custom-properties+xml",
    ),
    sig(b"PK\x03\x04", "application/zip"),
    sig(b"%PDF", "application/pdf"),
    sig(b"{rtf", "text/rtf1"),
    sig(b"BEGIN:VCARD\r\n", "text/vcard"),
    sig(b"Return-Path: ", "message/rfc822"),
];

/// Look the header up in the signature table only.
///
/// The header must be strictly longer than the signature.
pub fn match_signature(header: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|s| header.len() > s.prefix.len() && header.starts_with(s.prefix))
        .map(|s| s.mime)
}

/// Detect a MIME type from a file header.
///
/// Returns `None` when the type cannot be determined with confidence.
pub fn detect(header: &[u8]) -> Option<&'static str> {
    if let Some(mime) = match_signature(header) {
        return Some(mime);
    }

    let generic = content_sniff::detect_content_type(header);
    let generic = generic.strip_suffix("; charset=utf-8").unwrap_or(generic);
    match generic {
        content_sniff::DEFAULT_CONTENT_TYPE | "text/plain" => None,
        other => Some(other),
    }
}
