use scraper::{ElementRef, Html, Node};

enum Piece {
    Text(String),
    Break,
}

/// Visible text of a page, one entry per block-level element.
pub(crate) fn extract_inner_texts(document: &Html) -> Vec<String> {
    let mut pieces = Vec::new();
    collect_text(&document.root_element(), &mut pieces);

    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => current.push(text),
            Piece::Break => flush(&mut current, &mut blocks),
        }
    }
    flush(&mut current, &mut blocks);

    blocks
}

fn flush(current: &mut Vec<String>, blocks: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let merged = current.join(" ").trim().to_string();
    if !merged.is_empty() {
        blocks.push(merged);
    }
    current.clear();
}

fn collect_text(element: &ElementRef, pieces: &mut Vec<Piece>) {
    if is_hidden(element) || should_skip_element(element) {
        return;
    }

    let tag_name = element.value().name().to_lowercase();
    if tag_name == "br" {
        pieces.push(Piece::Break);
        return;
    }
    if is_block_element(&tag_name) {
        pieces.push(Piece::Break);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let normalized = normalize_whitespace(text);
                if !normalized.is_empty() {
                    pieces.push(Piece::Text(normalized));
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, pieces);
                }
            }
            _ => {}
        }
    }

    if is_block_element(&tag_name) {
        pieces.push(Piece::Break);
    }
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element.value().attr("aria-hidden") == Some("true")
        || element
            .value()
            .attr("style")
            .map(|s| s.contains("display: none") || s.contains("visibility: hidden"))
            .unwrap_or(false)
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tr"
            | "ul"
    )
}

fn should_skip_element(element: &ElementRef) -> bool {
    matches!(
        element.value().name().to_lowercase().as_str(),
        "script" | "style" | "noscript" | "iframe" | "canvas" | "svg" | "nav" | "form" | "head"
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_and_inline_text() {
        let html = r#"<html><head><title>T</title><style>p{}</style></head><body>
            <h1>Lemon <b>Cake</b></h1>
            <ul><li>2 cups flour</li><li>1 lemon</li></ul>
            <p>Mix<br>Bake</p>
            <script>var x = 1;</script>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            extract_inner_texts(&document),
            vec!["Lemon Cake", "2 cups flour", "1 lemon", "Mix", "Bake"]
        );
    }

    #[test]
    fn test_skips_hidden_elements() {
        let html = r#"<html><body>
            <div hidden>secret</div>
            <div style="display: none">also secret</div>
            <nav>Home | About</nav>
            <div>Visible</div>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_inner_texts(&document), vec!["Visible"]);
    }
}
