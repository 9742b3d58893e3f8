//! Submitted form data.
//!
//! [`SubmittedData`] is a multi-value map parsed from an
//! `application/x-www-form-urlencoded` body or a query string.

use std::collections::BTreeMap;

/// Submitted name/value pairs, keeping every value per name.
///
/// # Examples
///
/// ```
/// use formbuilder_forms::submission::SubmittedData;
///
/// let data = SubmittedData::parse("user_name=Jan+Nov%C3%A1k&tag=a&tag=b");
/// assert_eq!(data.get("user_name"), Some("Jan Novák"));
/// assert_eq!(data.get("tag"), Some("b"));
/// assert_eq!(data.get_list("tag").map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedData {
    values: BTreeMap<String, Vec<String>>,
}

impl SubmittedData {
    /// Creates empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an urlencoded string. `+` decodes to a space.
    pub fn parse(encoded: &str) -> Self {
        let mut data = Self::new();
        for pair in encoded.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            data.append(percent_decode(key), percent_decode(value));
        }
        data
    }

    /// Builds data from `(name, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut data = Self::new();
        for (k, v) in pairs {
            data.append(k, v);
        }
        data
    }

    /// Appends a value for `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Replaces all values for `name` with one value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), vec![value.into()]);
    }

    /// Returns the last value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    /// Returns every value submitted for `name`.
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Returns `true` if `name` was submitted.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of distinct names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encodes the data back into an urlencoded string, sorted by name.
    pub fn urlencode(&self) -> String {
        self.values
            .iter()
            .flat_map(|(k, vs)| {
                vs.iter()
                    .map(move |v| format!("{}={}", percent_encode(k), percent_encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}
