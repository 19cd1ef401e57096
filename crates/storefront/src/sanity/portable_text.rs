//! Portable Text rendering.
//!
//! CMS rich text arrives as Portable Text block arrays. This renderer covers
//! the subset the site's schemas produce: paragraph/heading/blockquote
//! styles, bullet and numbered lists, and `strong`/`em`/link marks. All text
//! is HTML-escaped; unknown block types are skipped.

use serde_json::Value;

/// Render a Portable Text block array to HTML.
///
/// Anything that is not an array of blocks renders as an empty string.
#[must_use]
pub fn render(blocks: &Value) -> String {
    let Some(blocks) = blocks.as_array() else {
        return String::new();
    };

    let mut html = String::new();
    let mut open_list: Option<&str> = None;

    for block in blocks {
        if block.get("_type").and_then(Value::as_str) != Some("block") {
            continue;
        }

        let list_kind = block.get("listItem").and_then(Value::as_str).map(|kind| {
            if kind == "number" { "ol" } else { "ul" }
        });

        // Close or switch the surrounding list when the kind changes.
        if open_list != list_kind {
            if let Some(tag) = open_list.take() {
                html.push_str(&format!("</{tag}>"));
            }
            if let Some(tag) = list_kind {
                html.push_str(&format!("<{tag}>"));
                open_list = Some(tag);
            }
        }

        let children = render_children(block);
        if list_kind.is_some() {
            html.push_str(&format!("<li>{children}</li>"));
        } else {
            let tag = match block.get("style").and_then(Value::as_str) {
                Some(style @ ("h1" | "h2" | "h3" | "h4")) => style,
                Some("blockquote") => "blockquote",
                _ => "p",
            };
            html.push_str(&format!("<{tag}>{children}</{tag}>"));
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{tag}>"));
    }

    html
}

/// Render the spans of one block, applying marks inside-out.
fn render_children(block: &Value) -> String {
    let mark_defs = block
        .get("markDefs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let Some(children) = block.get("children").and_then(Value::as_array) else {
        return String::new();
    };

    let mut out = String::new();
    for span in children {
        if span.get("_type").and_then(Value::as_str) != Some("span") {
            continue;
        }
        let text = span.get("text").and_then(Value::as_str).unwrap_or_default();
        let mut rendered = escape(text);

        if let Some(marks) = span.get("marks").and_then(Value::as_array) {
            for mark in marks.iter().filter_map(Value::as_str) {
                rendered = apply_mark(mark, rendered, mark_defs);
            }
        }
        out.push_str(&rendered);
    }
    out
}

fn apply_mark(mark: &str, inner: String, mark_defs: &[Value]) -> String {
    match mark {
        "strong" => format!("<strong>{inner}</strong>"),
        "em" => format!("<em>{inner}</em>"),
        key => {
            // Annotation marks refer to a markDef by key; only links are used.
            let href = mark_defs.iter().find_map(|def| {
                (def.get("_key").and_then(Value::as_str) == Some(key)
                    && def.get("_type").and_then(Value::as_str) == Some("link"))
                .then(|| def.get("href").and_then(Value::as_str))
                .flatten()
            });
            href.map_or(inner.clone(), |href| {
                format!(
                    "<a href=\"{}\" rel=\"noopener\">{inner}</a>",
                    escape(href)
                )
            })
        }
    }
}

/// Minimal HTML escaping for text content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_paragraphs_and_headings() {
        let blocks = json!([
            { "_type": "block", "style": "h2",
              "children": [{ "_type": "span", "text": "Our History" }] },
            { "_type": "block", "style": "normal",
              "children": [{ "_type": "span", "text": "Founded in 1878." }] }
        ]);
        assert_eq!(
            render(&blocks),
            "<h2>Our History</h2><p>Founded in 1878.</p>"
        );
    }

    #[test]
    fn renders_marks_and_links() {
        let blocks = json!([
            { "_type": "block", "style": "normal",
              "markDefs": [{ "_key": "l1", "_type": "link", "href": "https://example.org" }],
              "children": [
                { "_type": "span", "text": "Visit ", "marks": [] },
                { "_type": "span", "text": "us", "marks": ["strong", "l1"] }
              ] }
        ]);
        assert_eq!(
            render(&blocks),
            "<p>Visit <a href=\"https://example.org\" rel=\"noopener\"><strong>us</strong></a></p>"
        );
    }

    #[test]
    fn groups_list_items() {
        let blocks = json!([
            { "_type": "block", "listItem": "bullet",
              "children": [{ "_type": "span", "text": "One" }] },
            { "_type": "block", "listItem": "bullet",
              "children": [{ "_type": "span", "text": "Two" }] },
            { "_type": "block", "style": "normal",
              "children": [{ "_type": "span", "text": "After" }] }
        ]);
        assert_eq!(
            render(&blocks),
            "<ul><li>One</li><li>Two</li></ul><p>After</p>"
        );
    }

    #[test]
    fn escapes_html_in_text() {
        let blocks = json!([
            { "_type": "block", "style": "normal",
              "children": [{ "_type": "span", "text": "<script>alert(1)</script>" }] }
        ]);
        assert_eq!(
            render(&blocks),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn non_array_input_renders_empty() {
        assert_eq!(render(&json!("not blocks")), "");
    }
}
