//! HTML minification with in-place CSS and JavaScript minification.
//!
//! The HTML pass is deliberately light: comments go, whitespace collapses,
//! and raw-text elements are handed to real parsers (lightningcss for
//! `<style>`, oxc for `<script>`). `<pre>` and `<textarea>` are left alone.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Elements whose body is not HTML and must not be whitespace-collapsed.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "pre", "textarea"];

/// Elements whose boundaries make surrounding whitespace insignificant.
const BLOCK_ELEMENTS: [&str; 45] = [
    "html", "head", "body", "title", "meta", "link", "base", "style", "script", "noscript",
    "main", "header", "footer", "nav", "aside", "section", "article", "div", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd", "table", "thead", "tbody",
    "tfoot", "tr", "td", "th", "form", "fieldset", "figure", "blockquote", "hr", "br", "pre",
];

/// Errors that can occur while minifying.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    #[error("CSS parse error: {0}")]
    Css(String),

    #[error("CSS minify error: {0}")]
    CssPrint(String),

    #[error("JavaScript parse error: {0}")]
    Script(String),
}

/// Minify a full HTML document.
pub fn minify_html(html: &str) -> Result<String, MinifyError> {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    let mut prev_tag = String::new();

    while pos < html.len() {
        let rest = &html[pos..];

        if rest.starts_with("<!--") {
            pos += rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            continue;
        }

        if !is_tag_start(rest) {
            let end = next_tag_start(rest).unwrap_or(rest.len());
            let next_tag = tag_name(&rest[end..]);
            let between_inline = is_inline(&prev_tag) && is_inline(&next_tag);
            push_text(&mut out, &rest[..end], between_inline);
            pos += end;
            continue;
        }

        let end = tag_end(rest);
        let tag = &rest[..end];
        out.push_str(&collapse_tag(tag));
        pos += end;

        let name = tag_name(tag);
        prev_tag = name.clone();
        if tag.starts_with("</") || !RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            continue;
        }

        let body_src = &html[pos..];
        let close = body_src
            .to_ascii_lowercase()
            .find(&format!("</{}", name))
            .unwrap_or(body_src.len());
        let body = &body_src[..close];

        match name.as_str() {
            "style" => out.push_str(&minify_css(body)?),
            "script" => out.push_str(&minify_script(tag, body)?),
            _ => out.push_str(body),
        }
        pos += close;
    }

    Ok(out)
}

/// Minify a stylesheet using lightningcss.
pub fn minify_css(css: &str) -> Result<String, MinifyError> {
    if css.trim().is_empty() {
        return Ok(String::new());
    }

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| MinifyError::Css(e.to_string()))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| MinifyError::CssPrint(e.to_string()))?;

    Ok(minified.code)
}

/// Minify JavaScript source by reparsing it with oxc and printing it compactly.
pub fn minify_js(source: &str, module: bool) -> Result<String, MinifyError> {
    if source.trim().is_empty() {
        return Ok(String::new());
    }

    let allocator = Allocator::default();
    let source_type = if module {
        SourceType::mjs()
    } else {
        SourceType::cjs()
    };

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if let Some(error) = parsed.errors.first() {
        return Err(MinifyError::Script(error.to_string()));
    }
    if parsed.panicked {
        return Err(MinifyError::Script("parser aborted".to_string()));
    }

    let code = Codegen::new()
        .with_options(CodegenOptions::minify())
        .build(&parsed.program)
        .code;

    Ok(escape_script_close(code.trim()))
}

/// Dispatch a `<script>` body based on the opening tag's `type`.
fn minify_script(open_tag: &str, body: &str) -> Result<String, MinifyError> {
    let kind = attr_value(open_tag, "type").map(|t| t.trim().to_ascii_lowercase());

    match kind.as_deref() {
        None | Some("") | Some("text/javascript") | Some("application/javascript") => {
            minify_js(body, false)
        }
        Some("module") => minify_js(body, true),
        Some(_) => Ok(body.trim().to_string()),
    }
}

/// Keep printed code from closing its own script element.
fn escape_script_close(code: &str) -> String {
    let lower = code.to_ascii_lowercase();
    let mut out = String::with_capacity(code.len());
    let mut last = 0;

    for (i, _) in lower.match_indices("</script") {
        out.push_str(&code[last..i]);
        out.push_str("<\\/");
        last = i + 2;
    }
    out.push_str(&code[last..]);
    out
}

/// HTML whitespace is ASCII only; U+00A0 and friends are content.
fn is_html_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Whether whitespace next to this element can be visible.
fn is_inline(name: &str) -> bool {
    !name.is_empty() && !BLOCK_ELEMENTS.contains(&name)
}

/// Append a text node, collapsing whitespace runs.
///
/// A whitespace-only node becomes one space between two inline elements and
/// is dropped everywhere else.
fn push_text(out: &mut String, text: &str, between_inline: bool) {
    if text.chars().all(is_html_space) {
        if between_inline && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        return;
    }

    let mut in_space = false;
    for ch in text.chars() {
        if is_html_space(ch) {
            in_space = true;
            continue;
        }
        if in_space && !out.is_empty() {
            out.push(' ');
        }
        in_space = false;
        out.push(ch);
    }
    if in_space {
        out.push(' ');
    }
}

/// Collapse whitespace inside a tag, leaving quoted attribute values untouched.
fn collapse_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut in_quote: Option<char> = None;

    for ch in tag.chars() {
        if let Some(q) = in_quote {
            out.push(ch);
            if ch == q {
                in_quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                in_quote = Some(ch);
                out.push(ch);
            }
            '>' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push('>');
            }
            _ if is_html_space(ch) => {
                if !out.ends_with(' ') && !out.ends_with('<') {
                    out.push(' ');
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Whether `s` begins with something that opens a tag rather than a literal `<`.
fn is_tag_start(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<')
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn next_tag_start(s: &str) -> Option<usize> {
    s.char_indices()
        .skip(1)
        .find(|(i, c)| *c == '<' && is_tag_start(&s[*i..]))
        .map(|(i, _)| i)
}

/// Byte offset just past the `>` closing the tag at the start of `s`.
fn tag_end(s: &str) -> usize {
    let mut in_quote: Option<char> = None;

    for (i, ch) in s.char_indices().skip(1) {
        match in_quote {
            Some(q) if ch == q => in_quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => in_quote = Some(ch),
            None if ch == '>' => return i + 1,
            None => {}
        }
    }

    s.len()
}

/// Lowercased element name of a tag such as `<Script type="module">` or `</style>`.
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Value of attribute `name` in an opening tag, if present.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let mut search = 0;

    while let Some(found) = lower[search..].find(name) {
        let start = search + found;
        search = start + name.len();

        let preceded_by_space = lower[..start]
            .chars()
            .last()
            .is_some_and(is_html_space);
        if !preceded_by_space {
            continue;
        }

        let after = lower[search..].trim_start();
        let Some(after_eq) = after.strip_prefix('=') else {
            continue;
        };
        let value_start = tag.len() - after_eq.trim_start().len();
        let value = &tag[value_start..];

        return Some(match value.chars().next() {
            Some(q @ ('"' | '\'')) => value[1..].split(q).next().unwrap_or("").to_string(),
            _ => value
                .split(|c: char| is_html_space(c) || c == '>')
                .next()
                .unwrap_or("")
                .to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_comments_and_newlines() {
        let html = r#"<!DOCTYPE html>
<html>
  <!-- page header -->
  <head>
    <title>Not   Found</title>
  </head>
  <body>
    <h1>Not Found</h1>
  </body>
</html>
"#;

        let minified = minify_html(html).unwrap();

        assert_eq!(
            minified,
            "<!DOCTYPE html><html><head><title>Not Found</title></head><body><h1>Not Found</h1></body></html>"
        );
    }

    #[test]
    fn keeps_inline_spacing() {
        let minified = minify_html("<p>Error <b>502</b> at\n   host</p>").unwrap();
        assert_eq!(minified, "<p>Error <b>502</b> at host</p>");
    }

    #[test]
    fn keeps_space_between_inline_elements() {
        let minified = minify_html("<p><b>Error</b> <i>502</i></p>").unwrap();
        assert_eq!(minified, "<p><b>Error</b> <i>502</i></p>");

        let minified = minify_html("<p><b>Error</b>\n   <a href=\"/\">home</a></p>").unwrap();
        assert_eq!(minified, "<p><b>Error</b> <a href=\"/\">home</a></p>");
    }

    #[test]
    fn drops_space_between_blocks() {
        let minified = minify_html("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>").unwrap();
        assert_eq!(minified, "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn non_breaking_spaces_are_content() {
        let minified = minify_html("<td>\u{a0}</td><p>a\u{a0}\u{a0}b</p>").unwrap();
        assert_eq!(minified, "<td>\u{a0}</td><p>a\u{a0}\u{a0}b</p>");
    }

    #[test]
    fn preserves_quoted_attributes() {
        let html = "<input   type=\"text\"\n  placeholder=\"A  B\"  class='x  y' >";
        let minified = minify_html(html).unwrap();
        assert_eq!(minified, "<input type=\"text\" placeholder=\"A  B\" class='x  y'>");
    }

    #[test]
    fn preserves_pre_bodies() {
        let html = "<pre>\n  line one\n    line two\n</pre>";
        let minified = minify_html(html).unwrap();
        assert_eq!(minified, html);
    }

    #[test]
    fn minifies_embedded_css() {
        let html = "<style>\n  .button {\n    background-color: blue;\n    padding: 10px;\n  }\n</style>";
        let minified = minify_html(html).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button{"));
        assert!(minified.ends_with("</style>"));
    }

    #[test]
    fn minifies_embedded_js() {
        let html = "<script>\n  // greet\n  const greeting = \"hello\";\n  console.log(greeting);\n</script>";
        let minified = minify_html(html).unwrap();

        assert!(!minified.contains("// greet"));
        assert!(!minified.contains('\n'));
        assert!(minified.contains("console.log"));
        assert!(minified.starts_with("<script>"));
        assert!(minified.ends_with("</script>"));
    }

    #[test]
    fn leaves_data_scripts_alone() {
        let html = "<script type=\"application/ld+json\">\n{\"a\": 1}\n</script>";
        let minified = minify_html(html).unwrap();
        assert_eq!(minified, "<script type=\"application/ld+json\">{\"a\": 1}</script>");
    }

    #[test]
    fn invalid_js_is_an_error() {
        let result = minify_html("<script>const = ;</script>");
        assert!(matches!(result, Err(MinifyError::Script(_))));
    }

    #[test]
    fn literal_less_than_is_text() {
        let minified = minify_html("<p>1 < 2</p>").unwrap();
        assert_eq!(minified, "<p>1 < 2</p>");
    }

    #[test]
    fn script_close_is_escaped() {
        assert_eq!(escape_script_close("a=\"</SCRIPT>\""), "a=\"<\\/SCRIPT>\"");
    }

    #[test]
    fn reads_attribute_values() {
        let tag = "<script data-type=\"x\" type=\"module\">";
        assert_eq!(attr_value(tag, "type").as_deref(), Some("module"));
        assert_eq!(attr_value("<script type=module>", "type").as_deref(), Some("module"));
        assert_eq!(attr_value("<script>", "type"), None);
    }
}
