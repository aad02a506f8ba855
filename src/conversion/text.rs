//! Text transforms: Markdown rendering and markup stripping.
//!
//! All functions here are pure and infallible; a `&str` in, a `String` out.

use pulldown_cmark::{html, Event, Parser, Tag, TagEnd};

/// Render Markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip Markdown formatting, keeping the readable text content.
///
/// Walks the parsed event stream and keeps text, code, and block structure
/// (one line per block); emphasis markers, link targets, and heading syntax
/// are dropped.
pub fn markdown_to_plain(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => out.push('\n'),
            _ => {}
        }
    }
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Strip HTML tags, keeping the text between them.
///
/// Quoted attribute values may contain `>`, so the scanner tracks quoting
/// state inside tags instead of cutting at the first closing bracket.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut quote: Option<char> = None;

    for c in html.chars() {
        if in_tag {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '"' | '\'' => quote = Some(c),
                    '>' => in_tag = false,
                    _ => {}
                },
            }
        } else if c == '<' {
            in_tag = true;
        } else {
            out.push(c);
        }
    }
    out
}
