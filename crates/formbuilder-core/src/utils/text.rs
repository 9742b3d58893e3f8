//! String utility functions.

/// Lower-cases the first character of a string.
///
/// Used to derive an entity's short name from its type name.
///
/// # Examples
///
/// ```
/// use formbuilder_core::utils::text::lcfirst;
///
/// assert_eq!(lcfirst("User"), "user");
/// assert_eq!(lcfirst("TestEntity"), "testEntity");
/// assert_eq!(lcfirst(""), "");
/// ```
pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut result: String = first.to_lowercase().collect();
        result.push_str(chars.as_str());
        result
    })
}

/// Capitalizes the first character of a string.
///
/// # Examples
///
/// ```
/// use formbuilder_core::utils::text::capfirst;
///
/// assert_eq!(capfirst("hello"), "Hello");
/// assert_eq!(capfirst(""), "");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut result: String = first.to_uppercase().collect();
        result.push_str(chars.as_str());
        result
    })
}

/// Escapes the five HTML-significant characters.
///
/// # Examples
///
/// ```
/// use formbuilder_core::utils::text::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
