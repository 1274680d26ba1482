//! Markup scanning and prelude insertion.
//!
//! This is not a full HTML parser. The scanner walks start tags, skipping
//! comments, declarations, end tags and the content of raw-text elements,
//! which is enough to locate `<html>`, `<head>` and every `<script>` the
//! way a browser's tokenizer would see them. Insertion is a pure transform:
//! the input text is copied around the insertion point and never reparsed.

use crate::error::{MarkupError, MarkupResult};

/// Elements whose content is raw text; tags inside them are not tags.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title", "xmp", "noscript"];

/// A start tag located by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercase element name.
    pub name: String,
    /// Byte offset of the opening `<`.
    pub start: usize,
    /// Byte offset just past the closing `>`.
    pub end: usize,
}

impl StartTag {
    /// The tag's source text.
    pub fn raw<'a>(&self, markup: &'a str) -> &'a str {
        &markup[self.start..self.end]
    }
}

/// Landmarks of a markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// End of a `<!doctype ...>` declaration, if present.
    pub doctype_end: Option<usize>,
    /// The first `<html>` start tag.
    pub html: Option<StartTag>,
    /// The first `<head>` start tag.
    pub head: Option<StartTag>,
    /// Every `<script>` start tag, in document order.
    pub scripts: Vec<StartTag>,
}

impl Outline {
    /// The first script element, if any.
    pub fn first_script(&self) -> Option<&StartTag> {
        self.scripts.first()
    }
}

/// Scan markup for its landmarks.
pub fn outline(markup: &str) -> Outline {
    let lower = markup.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let len = bytes.len();
    let mut outline = Outline::default();
    let mut i = 0;

    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'<') {
        let start = i + offset;
        let rest = &lower[start..];

        if rest.starts_with("<!-->") {
            i = start + 5;
            continue;
        }
        if rest.starts_with("<!--->") {
            i = start + 6;
            continue;
        }
        if rest.starts_with("<!--") {
            i = find(&lower, start + 4, "-->").map_or(len, |p| p + 3);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</") {
            let end = find(&lower, start + 2, ">").map_or(len, |p| p + 1);
            if rest.starts_with("<!doctype") && outline.doctype_end.is_none() {
                outline.doctype_end = Some(end);
            }
            i = end;
            continue;
        }
        if !bytes.get(start + 1).is_some_and(u8::is_ascii_alphabetic) {
            i = start + 1;
            continue;
        }

        let name_end = bytes[start + 1..]
            .iter()
            .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b':'))
            .map_or(len, |p| start + 1 + p);
        let name = &lower[start + 1..name_end];
        let end = tag_end(bytes, name_end);

        let tag = StartTag {
            name: name.to_string(),
            start,
            end,
        };
        match name {
            "html" if outline.html.is_none() => outline.html = Some(tag),
            "head" if outline.head.is_none() => outline.head = Some(tag),
            "script" => outline.scripts.push(tag),
            _ => {}
        }

        i = end;
        if RAW_TEXT_ELEMENTS.contains(&name) && !bytes[..end].ends_with(b"/>") {
            let closing = format!("</{name}");
            i = find(&lower, end, &closing).unwrap_or(len);
        }
    }

    outline
}

/// Insert a prelude as the first content of the document head.
///
/// The prelude lands right after the `<head>` start tag. If some script
/// element appears before that point, the prelude goes in front of that
/// script instead, so nothing the author wrote can run before it. Without
/// a head element, one is synthesized after the `<html>` start tag (or the
/// doctype, or at the very start).
pub fn inject_prelude(markup: &str, prelude: &str) -> String {
    let outline = outline(markup);

    let (point, synthesize_head) = match &outline.head {
        Some(head) => (head.end, false),
        None => {
            let point = outline
                .html
                .as_ref()
                .map(|tag| tag.end)
                .or(outline.doctype_end)
                .unwrap_or(0);
            (point, true)
        }
    };
    let point = match outline.first_script() {
        Some(script) if script.start < point => script.start,
        _ => point,
    };

    let mut out = String::with_capacity(markup.len() + prelude.len() + 16);
    out.push_str(&markup[..point]);
    if synthesize_head {
        out.push_str("<head>");
        out.push_str(prelude);
        out.push_str("</head>");
    } else {
        out.push_str(prelude);
    }
    out.push_str(&markup[point..]);
    out
}

/// Render an inline script element.
///
/// Fails if the body would close the element early.
pub fn script_element(attributes: &[(&str, &str)], body: &str) -> MarkupResult<String> {
    if let Some(position) = body.to_ascii_lowercase().find("</script") {
        return Err(MarkupError::UnterminatedScript(position));
    }

    let mut out = String::from("<script");
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');
    out.push_str(body);
    out.push_str("</script>");
    Ok(out)
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn find(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack.get(from..)?.find(needle).map(|p| from + p)
}

fn tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return from + offset + 1,
            None => {}
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_basic() {
        let markup = "<!DOCTYPE html><HTML><Head><title>x</title></Head>\
                      <body><script src=\"a.js\"></script><script>1</script></body></HTML>";
        let outline = outline(markup);

        assert_eq!(outline.doctype_end, Some(15));
        assert_eq!(outline.html.as_ref().unwrap().raw(markup), "<HTML>");
        assert_eq!(outline.head.as_ref().unwrap().raw(markup), "<Head>");
        assert_eq!(outline.scripts.len(), 2);
        assert_eq!(outline.scripts[0].raw(markup), "<script src=\"a.js\">");
    }

    #[test]
    fn test_outline_skips_comments_and_raw_text() {
        let markup = "<!-- <script>no</script> --><head></head>\
                      <script>const s = '<script>'; // </scrip</script>\
                      <textarea><script></textarea><header></header>";
        let outline = outline(markup);

        assert_eq!(outline.scripts.len(), 1);
        assert_eq!(outline.head.as_ref().unwrap().name, "head");
    }

    #[test]
    fn test_abrupt_empty_comments_close_immediately() {
        let markup = "<html><!--><script>early()</script><!---><script>late()</script>\
                      <!-- x --><head></head></html>";
        assert_eq!(outline(markup).scripts.len(), 2);

        let out = inject_prelude(markup, "<script>SHIM</script>");
        let shim = out.find("SHIM").unwrap();
        let early = out.find("early()").unwrap();
        assert!(shim < early);
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let markup = "<head data-x=\"a>b\"><script></script>";
        let outline = outline(markup);
        assert_eq!(outline.head.as_ref().unwrap().raw(markup), "<head data-x=\"a>b\">");
    }

    #[test]
    fn test_inject_after_head() {
        let markup = "<html><head><title>t</title></head><body></body></html>";
        let out = inject_prelude(markup, "<script>P</script>");
        assert_eq!(
            out,
            "<html><head><script>P</script><title>t</title></head><body></body></html>"
        );
    }

    #[test]
    fn test_inject_before_early_script() {
        let markup = "<script>early()</script><html><head></head></html>";
        let out = inject_prelude(markup, "<script>P</script>");
        assert!(out.starts_with("<script>P</script><script>early()"));
    }

    #[test]
    fn test_inject_synthesizes_head() {
        let out = inject_prelude("<!doctype html><html><body>hi</body></html>", "<p>P</p>");
        assert_eq!(
            out,
            "<!doctype html><html><head><p>P</p></head><body>hi</body></html>"
        );

        let out = inject_prelude("<body>hi</body>", "<p>P</p>");
        assert_eq!(out, "<head><p>P</p></head><body>hi</body>");

        let out = inject_prelude("", "<p>P</p>");
        assert_eq!(out, "<head><p>P</p></head>");
    }

    #[test]
    fn test_script_element() {
        let out = script_element(&[("type", "importmap")], "{}").unwrap();
        assert_eq!(out, "<script type=\"importmap\">{}</script>");

        let err = script_element(&[], "a</SCRIPT>b").unwrap_err();
        assert!(matches!(err, MarkupError::UnterminatedScript(1)));
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }
}
