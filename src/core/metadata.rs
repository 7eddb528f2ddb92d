//! Run metadata: ordered key-value parameters stored alongside the events.
//!
//! Each entry is persisted as an escaped `key=value` string so keys and
//! values may contain any character, including `=` and `;`.

use smallvec::SmallVec;
use std::fmt;

/// Ordered key-value parameters (macro commands, event counts, ...).
#[derive(Clone, Default, PartialEq)]
pub struct MetaData {
    entries: SmallVec<[(String, String); 8]>,
}

impl MetaData {
    /// Key under which the number of processed events is recorded.
    pub const NUM_EVENTS_KEY: &'static str = "num_events";

    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing an existing entry with the same key in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of processed events, if recorded.
    pub fn num_events(&self) -> Option<u64> {
        self.get(Self::NUM_EVENTS_KEY).and_then(|s| s.trim().parse().ok())
    }

    /// Parse a command history: one `key value` pair per line, split at the
    /// first space. Blank lines are ignored; a line without a space yields an
    /// empty value.
    pub fn parse_history(text: &str) -> Self {
        let mut meta = Self::new();
        for line in text.lines() {
            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, v),
                None => (line, ""),
            };
            if !key.is_empty() {
                meta.set(key, value);
            }
        }
        meta
    }
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl FromIterator<(String, String)> for MetaData {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut meta = Self::new();
        for (k, v) in iter {
            meta.set(k, v);
        }
        meta
    }
}

/// Encode a single entry as `key=value` with `\`, `;` and `=` escaped.
pub fn encode_entry(key: &str, value: &str) -> String {
    let mut out = escape(key);
    out.push('=');
    out.push_str(&escape(value));
    out
}

/// Decode an entry written by [`encode_entry`]. Returns `None` without an
/// unescaped `=` or with an empty key.
pub fn decode_entry(s: &str) -> Option<(String, String)> {
    let eq = find_unescaped(s, b'=')?;
    let key = unescape(&s[..eq]);
    if key.is_empty() {
        return None;
    }
    Some((key, unescape(&s[eq + 1..])))
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            '=' => result.push_str("\\="),
            _ => result.push(c),
        }
    }
    result
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if matches!(next, '\\' | ';' | '=') => {
                    result.push(next);
                    chars.next();
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// First occurrence of `ch` preceded by an even number of backslashes.
fn find_unescaped(s: &str, ch: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    for i in 0..bytes.len() {
        if bytes[i] == ch {
            let backslashes = bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count();
            if backslashes % 2 == 0 {
                return Some(i);
            }
        }
    }
    None
}
