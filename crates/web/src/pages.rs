//! HTML page assembly around rendered views and lists

use annal_render::renderers::html::{attr, button, escape, link};

/// Title and navigation shared by every page
pub struct PageFrame<'a> {
    pub title: &'a str,
    /// Site base path, linked from the page header
    pub site_path: &'a str,
    /// Collection id and home path, when the page belongs to a collection
    pub collection: Option<(&'a str, String)>,
    pub user_id: &'a str,
}

impl PageFrame<'_> {
    pub fn page(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len() + 1024);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
        out.push_str(&format!("<title>{}</title>\n", escape(self.title)));
        out.push_str("</head>\n<body>\n<header class=\"row\">");
        out.push_str(&link(self.site_path, "Annalist"));
        if let Some((coll_id, home)) = &self.collection {
            out.push_str(" / ");
            out.push_str(&link(home, coll_id));
        }
        out.push_str(&format!("<span class=\"user\">{}</span>", escape(self.user_id)));
        out.push_str("</header>\n");
        out.push_str(&format!("<h1>{}</h1>\n", escape(self.title)));
        out.push_str(content);
        out.push_str("</body>\n</html>\n");
        out
    }
}

/// Edit form around rendered fields
pub fn edit_form(action: &str, form_action: &str, orig_id: &str, continuation_url: &str, fields_html: &str) -> String {
    let mut out = format!(
        "<form method=\"POST\" enctype=\"multipart/form-data\"{}>\n",
        attr("action", form_action)
    );
    out.push_str(&hidden("action", action));
    out.push_str(&hidden("orig_id", orig_id));
    if !continuation_url.is_empty() {
        out.push_str(&hidden("continuation_url", continuation_url));
    }
    out.push_str(fields_html);
    out.push_str("<div class=\"row buttons\">");
    out.push_str(&button("save", "Save"));
    out.push_str(&button("cancel", "Cancel"));
    out.push_str("</div>\n</form>\n");
    out
}

/// Entity view with links to edit and copy it
pub fn entity_view(fields_html: &str, entity_path: &str) -> String {
    let mut out = String::from(fields_html);
    out.push_str("<div class=\"row buttons\">");
    out.push_str(&link(&format!("{}?action=edit", entity_path), "Edit"));
    out.push(' ');
    out.push_str(&link(&format!("{}?action=copy", entity_path), "Copy"));
    out.push_str("</div>\n");
    out
}

/// List of links, one per item
pub fn link_list(items: &[(String, String)]) -> String {
    let mut out = String::from("<ul class=\"links\">\n");
    for (href, label) in items {
        out.push_str("<li>");
        out.push_str(&link(href, label));
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    out
}

fn hidden(name: &str, value: &str) -> String {
    format!("<input type=\"hidden\"{}{} />\n", attr("name", name), attr("value", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_frame() {
        let frame = PageFrame {
            title: "Entity <1>",
            site_path: "/annalist/",
            collection: Some(("testcoll", "/annalist/c/testcoll/".to_string())),
            user_id: "alice",
        };
        let html = frame.page("<p>body</p>");
        assert!(html.contains("<title>Entity &lt;1&gt;</title>"));
        assert!(html.contains("<a href=\"/annalist/c/testcoll/\">testcoll</a>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_edit_form_carries_state() {
        let html = edit_form("edit", "/annalist/c/testcoll/d/t/e1/", "e1", "/annalist/c/testcoll/d/t/", "");
        assert!(html.contains("<input type=\"hidden\" name=\"action\" value=\"edit\" />"));
        assert!(html.contains("<input type=\"hidden\" name=\"orig_id\" value=\"e1\" />"));
        assert!(html.contains("name=\"continuation_url\" value=\"/annalist/c/testcoll/d/t/\""));
    }
}
