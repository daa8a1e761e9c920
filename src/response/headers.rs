//! Header block storage.

use std::collections::HashMap;

/// An article header block: a case-insensitive, multi-value map.
///
/// A header name may appear several times in a block; the values for one
/// name keep their arrival order. Lookups ignore case, while the spelling
/// from the first occurrence of a name is preserved for output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    entries: HashMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    /// The name as first seen on the wire.
    name: String,
    values: Vec<String>,
}

impl Headers {
    /// Create an empty header block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`, keeping any earlier values for the name.
    pub fn add(&mut self, name: &str, value: String) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| Entry {
                name: name.to_string(),
                values: Vec::new(),
            })
            .values
            .push(value);
    }

    /// Extend the last value recorded for `name` by string concatenation.
    ///
    /// Used for folded continuation lines; the fragment is appended exactly
    /// as given. Does nothing if the name has never been added.
    pub(crate) fn extend_last(&mut self, name: &str, fragment: &str) {
        if let Some(entry) = self.entries.get_mut(&name.to_ascii_lowercase()) {
            if let Some(last) = entry.values.last_mut() {
                last.push_str(fragment);
            }
        }
    }

    /// First value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .and_then(|entry| entry.values.first())
            .map(String::as_str)
    }

    /// All values for `name`, in arrival order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|entry| entry.values.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any value exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the block holds no headers at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, values)` pairs.
    ///
    /// Names use their first-seen spelling. Iteration order across names is
    /// unspecified; the order of values within a name is the arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .values()
            .map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// Serialize the block back to wire form, one `Name: value` CRLF line
    /// per value, without a terminating empty line.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, values) in self.iter() {
            for value in values {
                out.extend_from_slice(name.as_bytes());
                out.extend_from_slice(b": ");
                out.extend_from_slice(value.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
        }
        out
    }
}
