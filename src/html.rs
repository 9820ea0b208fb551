//! Hidden-field markup rendering.

use crate::action::Nonce;

/// Field name used for the optional referer companion field.
pub const REFERER_FIELD_NAME: &str = "_http_referer";

pub(crate) fn render_hidden_field(field_name: &str, nonce: &Nonce, referer: Option<&str>) -> String {
    let name = escape_attr(field_name);
    let mut out = format!(
        r#"<input type="hidden" id="{name}" name="{name}" value="{value}" />"#,
        name = name,
        value = escape_attr(nonce.as_str()),
    );

    if let Some(uri) = referer {
        out.push_str(&format!(
            r#"<input type="hidden" name="{name}" value="{value}" />"#,
            name = REFERER_FIELD_NAME,
            value = escape_attr(uri),
        ));
    }

    out
}

/// Escape a string for use inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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
