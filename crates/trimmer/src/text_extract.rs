use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

const SKIP_TAGS: &[&str] = &["script", "style", "header", "footer", "nav"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "br", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "tr", "table", "blockquote",
];

/// Tolerant HTML → visible-text extraction (spec §4.5): drops
/// script/style/header/footer/nav and hidden elements, walks the DOM
/// preserving paragraph/list breaks, then collapses incidental
/// whitespace. The page title, if any, is prefixed on its own line.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let mut raw = String::new();
    walk(document.tree.root(), &mut raw);
    let body = normalize_whitespace(&raw);

    let combined = match title {
        Some(t) => format!("[Page Title: {t}]\n{body}"),
        None => body,
    };

    truncate_to_cap(&combined)
}

fn walk(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(el) => {
            let tag = el.name();
            if SKIP_TAGS.contains(&tag) || is_hidden(el) {
                return;
            }
            let is_block = BLOCK_TAGS.contains(&tag);
            if is_block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            for child in node.children() {
                walk(child, out);
            }
            if is_block && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        Node::Text(text) => out.push_str(&text.text),
        // Document/Fragment have no text of their own but still need
        // their subtree walked; comments and doctypes are leaves.
        Node::Document | Node::Fragment => {
            for child in node.children() {
                walk(child, out);
            }
        }
        _ => {}
    }
}

fn is_hidden(el: &scraper::node::Element) -> bool {
    el.attr("style")
        .map(|style| {
            let lower = style.to_lowercase();
            lower.contains("display:none")
                || lower.contains("display: none")
                || lower.contains("visibility:hidden")
                || lower.contains("visibility: hidden")
        })
        .unwrap_or(false)
}

/// Collapses runs of horizontal whitespace to a single space per line,
/// and runs of blank lines to a single paragraph break.
fn normalize_whitespace(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_pending = false;
    for line in raw.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_pending = !lines.is_empty();
            continue;
        }
        if blank_pending {
            lines.push(String::new());
            blank_pending = false;
        }
        lines.push(collapsed);
    }
    lines.join("\n")
}

const MAX_TEXT_BYTES: usize = 50 * 1024;

fn truncate_to_cap(s: &str) -> String {
    if s.len() <= MAX_TEXT_BYTES {
        return s.to_string();
    }
    let mut end = MAX_TEXT_BYTES;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_style_and_nav() {
        let html = r#"
            <html><head><title>The Tavern</title><style>.x{color:red}</style></head>
            <body>
                <nav>Home | About</nav>
                <script>console.log('x')</script>
                <p>Happy hour 4-7pm daily.</p>
                <footer>Copyright 2026</footer>
            </body></html>
        "#;
        let text = extract_text(html);
        assert!(text.starts_with("[Page Title: The Tavern]"));
        assert!(text.contains("Happy hour 4-7pm daily."));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("console.log"));
        assert!(!text.contains("Copyright 2026"));
    }

    #[test]
    fn drops_hidden_elements() {
        let html = r#"<html><body>
            <p style="display:none">Secret text</p>
            <p style="visibility: hidden">Also hidden</p>
            <p>Visible text</p>
        </body></html>"#;
        let text = extract_text(html);
        assert!(!text.contains("Secret text"));
        assert!(!text.contains("Also hidden"));
        assert!(text.contains("Visible text"));
    }

    #[test]
    fn collapses_whitespace_but_preserves_paragraph_breaks() {
        let html = "<html><body><p>Line   one</p><p>Line two</p></body></html>";
        let text = extract_text(html);
        assert!(text.contains("Line one"));
        assert!(text.contains("Line two"));
        assert!(!text.contains("   "));
    }

    #[test]
    fn truncates_at_size_cap() {
        let huge = format!("<html><body><p>{}</p></body></html>", "x".repeat(200_000));
        let text = extract_text(&huge);
        assert!(text.len() <= MAX_TEXT_BYTES);
    }

    #[test]
    fn no_title_is_handled_gracefully() {
        let text = extract_text("<html><body><p>no title here</p></body></html>");
        assert!(!text.starts_with("[Page Title"));
        assert!(text.contains("no title here"));
    }
}
