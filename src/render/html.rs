/*!
 * Small HTML helpers shared by the renderers.
 */

use serde_json::Value;

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turn a `snake_case` key into a `Title Case` label
pub fn title_case_key(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a loosely typed JSON value: strings verbatim, null empty,
/// everything else in its JSON form
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `<li class="list-group-item">` entries for a list of strings
pub(crate) fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li class=\"list-group-item\">{}</li>", escape_html(item)))
        .collect()
}
