// src/dump/parser.rs

//! Line-oriented parser for the badging dump text

use crate::dump::value::ParsedValue;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Manifest tags that must not repeat in a badging dump. A duplicate of any
/// of these aborts the whole parse (the superset policy: some aapt revisions
/// flag only `application`).
pub const DISALLOWED_DUPLICATE_TAGS: [&str; 3] =
    ["application", "sdkVersion", "targetSdkVersion"];

/// aapt emits this bare line (no colon) for test-only packages.
const TEST_ONLY_MARKER: &str = "testOnly='-1'";

/// `name='value'` pairs, values may contain escaped quotes.
static PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\s=]+)='((?:\\'|[^'])*)'").unwrap());

/// Bare quoted tokens.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'((?:\\'|[^'])*)'").unwrap());

/// Full-span quoted token, anchored. Labels may contain literal apostrophes,
/// so their value is everything between the outermost quotes.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'(.*)'$").unwrap());

/// The parsed badging dump: key -> value mapping plus the test-only flag.
///
/// The `testOnly='-1'` marker line carries no colon and therefore never
/// becomes a mapping key; it is recorded as a flag instead.
#[derive(Debug, Clone, Default)]
pub struct ParsedDump {
    entries: HashMap<String, ParsedValue>,
    test_only: bool,
}

impl ParsedDump {
    pub fn get(&self, key: &str) -> Option<&ParsedValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParsedValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the dump contained the test-only marker line.
    pub fn test_only(&self) -> bool {
        self.test_only
    }
}

/// Parse badging dump text into a [`ParsedDump`].
///
/// Malformed lines are skipped. The only failure is a repeated
/// disallow-listed tag, which surfaces as [`Error::ManifestInvalid`].
pub fn parse(text: &str) -> Result<ParsedDump> {
    let mut dump = ParsedDump::default();

    for raw in text.lines() {
        let line = raw.trim();
        let Some((key, rest)) = line.split_once(':') else {
            if line == TEST_ONLY_MARKER {
                dump.test_only = true;
            }
            continue;
        };

        let key = key.trim();
        let rest = rest.trim();
        if key.is_empty() || rest.is_empty() {
            continue;
        }

        let Some(value) = parse_value(key, rest) else {
            debug!("Skipping badging line with no quoted tokens: {}", line);
            continue;
        };

        insert(&mut dump.entries, key, value)?;
    }

    Ok(dump)
}

/// Parse the value portion of one dump line.
fn parse_value(key: &str, rest: &str) -> Option<ParsedValue> {
    // Labels get the anchored grammar so apostrophes inside the label text
    // do not split the token.
    if key.starts_with("application-label") {
        if let Some(caps) = LABEL_RE.captures(rest) {
            return Some(ParsedValue::Scalar(unescape(&caps[1])));
        }
    }

    if rest.contains("='") {
        let entries: HashMap<String, String> = PAIR_RE
            .captures_iter(rest)
            .map(|caps| (caps[1].to_string(), unescape(&caps[2])))
            .collect();
        if entries.is_empty() {
            return None;
        }
        return Some(ParsedValue::Map(entries));
    }

    let mut tokens: Vec<String> = TOKEN_RE
        .captures_iter(rest)
        .map(|caps| unescape(&caps[1]))
        .collect();
    match tokens.len() {
        0 => None,
        // Single-token lines are the common case; store them unwrapped.
        1 => Some(ParsedValue::Scalar(tokens.remove(0))),
        _ => Some(ParsedValue::List(tokens)),
    }
}

fn unescape(token: &str) -> String {
    token.replace("\\'", "'")
}

fn insert(
    entries: &mut HashMap<String, ParsedValue>,
    key: &str,
    value: ParsedValue,
) -> Result<()> {
    match entries.remove(key) {
        None => {
            entries.insert(key.to_string(), value);
        }
        Some(existing) => {
            if DISALLOWED_DUPLICATE_TAGS.contains(&key) {
                return Err(Error::ManifestInvalid(format!(
                    "duplicate tag '{}' in badging dump",
                    key
                )));
            }
            entries.insert(key.to_string(), existing.merge(value));
        }
    }
    Ok(())
}
