//! HTML to plain markdown-ish text.
//!
//! Regex based and deliberately shallow: good enough to hand a page to a
//! model, not a faithful renderer.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
    static ref STYLE: Regex = Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap();
    static ref HEAD: Regex = Regex::new(r"(?is)<head\b[^>]*>.*?</head>").unwrap();
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref H1: Regex = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap();
    static ref H2: Regex = Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").unwrap();
    static ref H3: Regex = Regex::new(r"(?is)<h3[^>]*>(.*?)</h3>").unwrap();
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").unwrap();
    static ref BREAK: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref LINK: Regex =
        Regex::new(r#"(?is)<a\b[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"(?is)<li\b[^>]*>(.*?)</li>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n(\s*\n)+").unwrap();
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
}

/// Strip markup, keeping headings, paragraphs, links and list items readable.
pub fn html_to_markdown(html: &str) -> String {
    let text = COMMENT.replace_all(html, "");
    let text = SCRIPT.replace_all(&text, "");
    let text = STYLE.replace_all(&text, "");
    let text = HEAD.replace_all(&text, "");

    let text = H1.replace_all(&text, "\n# $1\n");
    let text = H2.replace_all(&text, "\n## $1\n");
    let text = H3.replace_all(&text, "\n### $1\n");
    let text = PARAGRAPH.replace_all(&text, "$1\n\n");
    let text = BREAK.replace_all(&text, "\n");
    let text = LINK.replace_all(&text, "[$2]($1)");
    let text = LIST_ITEM.replace_all(&text, "- $1\n");

    let text = TAG.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n\n");

    decode_entities(text.trim())
}

/// Contents of the `<title>` element, if any.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|title| !title.is_empty())
}

// `&amp;` last so "&amp;lt;" stays "&lt;".
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Whether a `Content-Type` header value denotes HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml")
        })
        .unwrap_or(false)
}
