//! Ordered, case-insensitive header collection.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Placeholder shown for key fields that are missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Ordered header collection extracted from a single message.
///
/// Every occurrence is kept in the order it appeared, so repeated headers
/// such as `Received` are all displayed and all take part in the
/// authentication text. Lookups by name are case-insensitive and
/// **last-wins**: when a name repeats, the value of its final occurrence is
/// returned.
#[derive(Debug, Clone, Default)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
    /// ASCII-lowercased name → index of its last occurrence. Built on first lookup.
    index: OnceLock<HashMap<String, usize>>,
}

impl HeaderSet {
    /// Build a header set from `(name, value)` pairs in their original order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            index: OnceLock::new(),
        }
    }

    /// All headers in insertion order, names in their original case.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of header occurrences (repeats counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup of the last occurrence of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let index = self.index.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.entries.len());
            for (i, (k, _)) in self.entries.iter().enumerate() {
                map.insert(k.to_ascii_lowercase(), i);
            }
            map
        });
        index
            .get(&name.to_ascii_lowercase())
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Lookup that falls back to [`NOT_AVAILABLE`].
    pub fn get_or_na(&self, name: &str) -> &str {
        self.get(name).unwrap_or(NOT_AVAILABLE)
    }

    /// `true` when `name` exists with a non-blank value.
    ///
    /// A header that is present but empty counts as absent.
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    /// All occurrences of `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render as `Name: Value` lines joined by `\n`.
    pub fn rendered(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `From` header, or `N/A`.
    pub fn sender(&self) -> &str {
        self.get_or_na("From")
    }

    pub fn to(&self) -> &str {
        self.get_or_na("To")
    }

    pub fn cc(&self) -> &str {
        self.get_or_na("Cc")
    }

    pub fn bcc(&self) -> &str {
        self.get_or_na("Bcc")
    }

    pub fn subject(&self) -> &str {
        self.get_or_na("Subject")
    }

    pub fn date(&self) -> &str {
        self.get_or_na("Date")
    }

    pub fn message_id(&self) -> &str {
        self.get_or_na("Message-ID")
    }
}

impl PartialEq for HeaderSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for HeaderSet {}
