use funeral_core_api::{ApiError, ApiResult};
use std::collections::BTreeMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitutes `{{name}}` placeholders in a template body.
///
/// Values are HTML-escaped. Unknown names and unterminated placeholders are
/// rejected so that a broken template never reaches print.
pub fn render_placeholders(body: &str, values: &BTreeMap<&str, String>) -> ApiResult<String> {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(open) = rest.find(OPEN) {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + OPEN.len()..];
        let close = after_open
            .find(CLOSE)
            .ok_or_else(|| ApiError::validation("template has an unterminated placeholder"))?;
        let name = after_open[..close].trim();
        let value = values
            .get(name)
            .ok_or_else(|| ApiError::validation(format!("template uses unknown placeholder '{name}'")))?;
        out.push_str(&escape_html(value));
        rest = &after_open[close + CLOSE.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> BTreeMap<&'static str, String> {
        let mut v = BTreeMap::new();
        v.insert("decedent_name", "Eleanor Rigby".to_string());
        v.insert("service_date", "October 8, 2026".to_string());
        v.insert("funeral_director", "O'Brien & Sons".to_string());
        v
    }

    #[test]
    fn test_substitutes_placeholders() {
        let out = render_placeholders("<h1>{{decedent_name}}</h1><p>{{ service_date }}</p>", &values()).unwrap();
        assert_eq!(out, "<h1>Eleanor Rigby</h1><p>October 8, 2026</p>");
    }

    #[test]
    fn test_escapes_values() {
        let out = render_placeholders("{{funeral_director}}", &values()).unwrap();
        assert_eq!(out, "O&#39;Brien &amp; Sons");
    }

    #[test]
    fn test_rejects_unknown_and_unterminated() {
        assert!(matches!(
            render_placeholders("{{burial_plot}}", &values()),
            Err(ApiError::ValidationError(_))
        ));
        assert!(render_placeholders("<p>{{decedent_name</p>", &values()).is_err());
    }

    #[test]
    fn test_body_without_placeholders() {
        assert_eq!(render_placeholders("In loving memory", &values()).unwrap(), "In loving memory");
    }
}
