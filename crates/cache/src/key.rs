//! Cache key construction

use url::form_urlencoded;

/// Stable signature for a logical query: the operation name followed by its
/// present arguments, each trimmed and lowercased, form-encoded so that
/// separators inside a value cannot collide with another argument list.
///
/// `cache_key("settlements", &[("condition", Some(" Mesothelioma ")), ("state", None)])`
/// yields `settlements:condition=mesothelioma`.
pub fn cache_key(operation: &str, args: &[(&str, Option<&str>)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut present = 0;

    for (name, value) in args {
        let Some(value) = value.map(|v| v.trim().to_lowercase()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        query.append_pair(name, &value);
        present += 1;
    }

    if present == 0 {
        operation.to_string()
    } else {
        format!("{}:{}", operation, query.finish())
    }
}
