//! Input cleanup pre-pass.
//!
//! Runs before tokenization: decompresses gzipped payloads, normalizes
//! whitespace and line breaks, then strips the structural noise the tree
//! builder should never see (doctype, comments, CDATA, script/style
//! blocks, template directives). Order matters - decompression first,
//! normalization next, structural stripping last, since the stripping
//! patterns assume single-line content.

use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ParseConfig;
use crate::error::CleanupError;

/// Reversible stand-in for a line break when `preserve_line_breaks` is on.
/// The text-node layer restores it to a literal newline.
pub const LINE_BREAK_TOKEN: char = '\u{e000}';

// Compile patterns once at first use; these are hardcoded and will never
// fail to compile.

static DOUBLE_QUOTE_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""\s+>"#).expect("DOUBLE_QUOTE_SPACE_RE: hardcoded regex is valid")
});

static SINGLE_QUOTE_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'\s+>").expect("SINGLE_QUOTE_SPACE_RE: hardcoded regex is valid"));

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("LINE_BREAK_RE: hardcoded regex is valid"));

static DOCTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").expect("DOCTYPE_RE: hardcoded regex is valid"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("COMMENT_RE: hardcoded regex is valid"));

static CDATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>").expect("CDATA_RE: hardcoded regex is valid")
});

static SCRIPT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script\s[^>]*>.*?<\s*/\s*script\s*>")
        .expect("SCRIPT_ATTR_RE: hardcoded regex is valid")
});

static SCRIPT_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script\s*>.*?<\s*/\s*script\s*>")
        .expect("SCRIPT_BARE_RE: hardcoded regex is valid")
});

static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*style\s[^>]*>.*?<\s*/\s*style\s*>")
        .expect("STYLE_ATTR_RE: hardcoded regex is valid")
});

static STYLE_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*style\s*>.*?<\s*/\s*style\s*>")
        .expect("STYLE_BARE_RE: hardcoded regex is valid")
});

static SMARTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("SMARTY_RE: hardcoded regex is valid"));

/// Clean raw input bytes into parseable text, honoring the configuration.
///
/// Gzip sniffing always runs - compressed bytes can never tokenize, so it
/// is not a step `cleanup_input` can meaningfully disable. Everything else
/// passes through untouched when cleanup is off.
///
/// # Errors
///
/// [`CleanupError::Decompress`] when the gzip magic bytes are present but
/// the payload does not decompress.
pub fn clean(raw: &[u8], config: &ParseConfig) -> Result<String, CleanupError> {
    let bytes = decompress_if_gzip(raw)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    if !config.cleanup_input {
        return Ok(text);
    }

    // quote-then-space-then-'>' collapses to a tight close, both styles
    let text = DOUBLE_QUOTE_SPACE_RE.replace_all(&text, "\">").into_owned();
    let mut text = SINGLE_QUOTE_SPACE_RE.replace_all(&text, "'>").into_owned();

    text = if config.preserve_line_breaks {
        LINE_BREAK_RE
            .replace_all(&text, LINE_BREAK_TOKEN.to_string())
            .into_owned()
    } else {
        LINE_BREAK_RE.replace_all(&text, " ").into_owned()
    };

    text = DOCTYPE_RE.replace_all(&text, "").into_owned();
    text = COMMENT_RE.replace_all(&text, "").into_owned();
    text = CDATA_RE.replace_all(&text, "").into_owned();

    if config.remove_scripts {
        text = SCRIPT_ATTR_RE.replace_all(&text, "").into_owned();
        text = SCRIPT_BARE_RE.replace_all(&text, "").into_owned();
    }
    if config.remove_styles {
        text = STYLE_ATTR_RE.replace_all(&text, "").into_owned();
        text = STYLE_BARE_RE.replace_all(&text, "").into_owned();
    }
    if config.remove_smarty_scripts {
        text = SMARTY_RE.replace_all(&text, "").into_owned();
    }

    Ok(text)
}

/// Decompress when the gzip magic bytes lead the buffer; pass through
/// otherwise.
fn decompress_if_gzip(raw: &[u8]) -> Result<Vec<u8>, CleanupError> {
    if raw.len() < 2 || raw[0] != 0x1f || raw[1] != 0x8b {
        return Ok(raw.to_vec());
    }
    let mut decoder = flate2::read::GzDecoder::new(raw);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CleanupError::Decompress(e.to_string()))?;
    Ok(out)
}
