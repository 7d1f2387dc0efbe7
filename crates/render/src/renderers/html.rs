//! HTML fragments shared by the field renderers

use crate::bound::BoundField;

/// Escape text for element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// ` name="value"`, escaped
pub fn attr(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, escape(value))
}

/// A text input
pub fn text_input(name: &str, value: &str, placeholder: &str) -> String {
    let mut out = String::from("<input type=\"text\"");
    out.push_str(&attr("name", name));
    if !placeholder.is_empty() {
        out.push_str(&attr("placeholder", placeholder));
    }
    out.push_str(&attr("value", value));
    out.push_str(" />");
    out
}

pub fn textarea(name: &str, value: &str, placeholder: &str, class: &str) -> String {
    let mut out = String::from("<textarea");
    out.push_str(&attr("name", name));
    if !class.is_empty() {
        out.push_str(&attr("class", class));
    }
    if !placeholder.is_empty() {
        out.push_str(&attr("placeholder", placeholder));
    }
    out.push('>');
    out.push_str(&escape(value));
    out.push_str("</textarea>");
    out
}

pub fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

/// A select list; `options` are `(value, label)` pairs
pub fn select<'o>(name: &str, selected: &str, options: impl IntoIterator<Item = (&'o str, String)>) -> String {
    let mut out = format!("<select{}>", attr("name", name));
    for (value, label) in options {
        out.push_str("<option");
        out.push_str(&attr("value", value));
        if value == selected {
            out.push_str(" selected=\"selected\"");
        }
        out.push('>');
        out.push_str(&escape(&label));
        out.push_str("</option>");
    }
    out.push_str("</select>");
    out
}

/// A submit button
pub fn button(name: &str, value: &str) -> String {
    format!("<input type=\"submit\"{}{} />", attr("name", name), attr("value", value))
}

/// Wrap a rendered value with the field's label in its placement grid
pub fn field_wrapper(field: &BoundField, value_html: &str) -> String {
    let d = field.descriptor();
    let mut out = String::with_capacity(value_html.len() + 256);
    out.push_str("<div");
    out.push_str(&attr("class", &d.placement.field));
    if !d.tooltip.is_empty() {
        out.push_str(&attr("title", &d.tooltip));
    }
    out.push_str("><div class=\"row\">");
    out.push_str("<div");
    out.push_str(&attr("class", &format!("view-label {}", d.placement.label)));
    out.push_str("><span>");
    out.push_str(&escape(&d.label));
    out.push_str("</span></div>");
    out.push_str("<div");
    out.push_str(&attr("class", &format!("view-value {}", d.placement.value)));
    out.push('>');
    out.push_str(value_html);
    out.push_str("</div></div></div>\n");
    out
}
