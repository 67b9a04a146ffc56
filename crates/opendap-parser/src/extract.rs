//! Locating variable payloads inside an ASCII rendering.
//!
//! A response looks like:
//!
//! ```text
//! Dataset {
//!     Float64 cross_shore[cross_shore = 3];
//!     ...
//! } transect;
//! ---------------------------------------------
//! cross_shore[3]
//! 10, 20, 30
//!
//! altitude.altitude[2][1][3]
//! [0][0], 1.5, 2.5, 3.5
//! [1][0], -9999, 5.5, 6.5
//! ```
//!
//! Everything above the dash delimiter is structural preamble and never
//! contributes values. Below it, each payload block starts at a header line
//! and runs until the next header line or the end of the text.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A delimiter line: five or more dashes alone on a line.
static DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*-{5,}[ \t]*$").expect("delimiter pattern is valid"));

/// Any header line: dotted identifier followed by bracket groups.
static GENERIC_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Za-z_][\w.]*(?:\[[^\]\n]*\])+[ \t]*$")
        .expect("generic header pattern is valid")
});

/// One bracketed dimension descriptor: `[n]`, `[start:stride:end]` or `[name = n]`.
const DIMENSION: &str = r"\[\s*(?:\d+|\d+\s*:\s*\d+\s*:\s*\d+|[A-Za-z_]\w*\s*=\s*\d+)\s*\]";

static DIMENSION_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(?:(\d+)\s*:\s*(\d+)\s*:\s*(\d+)|[A-Za-z_]\w*\s*=\s*(\d+)|(\d+))\s*\]")
        .expect("dimension pattern is valid")
});

/// A variable's header and payload, borrowed from a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBlock<'a> {
    /// Variable name as requested (without namespace).
    pub name: String,
    /// Sizes declared by the header's bracket descriptors, in order.
    pub dimensions: Vec<usize>,
    /// Text between the header line and the next header (or end of text).
    pub body: &'a str,
}

/// A normalised ASCII response split into preamble and payload region.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    body_start: usize,
}

impl Document {
    /// Normalise line endings and locate the preamble delimiter.
    ///
    /// Without a delimiter the whole text is treated as payload region.
    pub fn parse(raw: &str) -> Self {
        let text = normalize_newlines(raw).into_owned();
        let body_start = match DELIMITER.find(&text) {
            Some(m) => m.end(),
            None => {
                debug!("no preamble delimiter found, searching whole document");
                0
            }
        };
        Self { text, body_start }
    }

    /// Whether a delimiter line separated a preamble from the payloads.
    pub fn has_preamble(&self) -> bool {
        self.body_start > 0
    }

    /// Text before the delimiter (empty when there is none).
    pub fn preamble(&self) -> &str {
        if self.body_start == 0 {
            ""
        } else {
            &self.text[..self.body_start]
        }
    }

    /// Text after the delimiter.
    pub fn body(&self) -> &str {
        &self.text[self.body_start..]
    }

    /// Full normalised text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Find the payload block for `name`.
    pub fn block(&self, name: &str) -> Option<VariableBlock<'_>> {
        let body = self.body();
        let header = header_pattern(name);
        let caps = header.captures(body)?;
        let whole = caps.get(0)?;
        let dims = caps.get(1).map(|m| m.as_str()).unwrap_or("");

        let mut start = whole.end();
        if body[start..].starts_with('\n') {
            start += 1;
        }
        let end = GENERIC_HEADER
            .find_at(body, start)
            .map(|m| m.start())
            .unwrap_or(body.len());

        Some(VariableBlock {
            name: name.to_string(),
            dimensions: parse_dimensions(dims),
            body: &body[start..end],
        })
    }

    /// Payload text for `name`, or an empty string when the header is absent.
    pub fn payload(&self, name: &str) -> &str {
        self.block(name).map(|b| b.body).unwrap_or("")
    }

    /// Units attribute declared for `name` in the preamble, if the server included one.
    ///
    /// Matches attribute containers of the form:
    ///
    /// ```text
    /// time {
    ///     String units "days since 1970-01-01";
    /// }
    /// ```
    pub fn preamble_units(&self, name: &str) -> Option<String> {
        let container = Regex::new(&format!(r"(?m)^[ \t]*{}[ \t]*\{{", regex::escape(name))).ok()?;
        let preamble = self.preamble();
        let open = container.find(preamble)?;
        let rest = &preamble[open.end()..];
        let scope = &rest[..rest.find('}').unwrap_or(rest.len())];
        static UNITS: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r#"(?i)\bunits\b\s*=?\s*"([^"]*)""#).expect("units pattern is valid")
        });
        UNITS
            .captures(scope)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Payload text following `name`'s header in `raw`, up to the next header.
///
/// Returns an empty string when no header matches.
pub fn extract_payload(raw: &str, name: &str) -> String {
    Document::parse(raw).payload(name).to_string()
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub fn normalize_newlines(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Anchored header pattern for one variable; the name is escaped before use.
fn header_pattern(name: &str) -> Regex {
    let pattern = format!(
        r"(?m)^[ \t]*(?:[A-Za-z_]\w*\.)*{}((?:{})+)[ \t]*$",
        regex::escape(name),
        DIMENSION
    );
    // Escaped input cannot produce an invalid pattern.
    Regex::new(&pattern).unwrap_or_else(|_| Regex::new(r"[^\s\S]").expect("never-matching pattern"))
}

/// Sizes declared by a run of bracket descriptors.
pub fn parse_dimensions(descriptors: &str) -> Vec<usize> {
    DIMENSION_PARTS
        .captures_iter(descriptors)
        .filter_map(|c| {
            if let (Some(start), Some(stride), Some(end)) = (c.get(1), c.get(2), c.get(3)) {
                let start: usize = start.as_str().parse().ok()?;
                let stride: usize = stride.as_str().parse().ok()?;
                let end: usize = end.as_str().parse().ok()?;
                if stride == 0 || end < start {
                    return Some(0);
                }
                return Some((end - start) / stride + 1);
            }
            c.get(4)
                .or_else(|| c.get(5))
                .and_then(|m| m.as_str().parse().ok())
        })
        .collect()
}
