use crate::chat::{self, ChatAttributes, ChatRenderer};
use pulldown_cmark::*;

/// Converts markdown to HTML, appending the result to `out`. Fenced blocks
/// whose info string starts with `chat` are rendered by `chat_renderer`
/// instead of being emitted as code blocks.
pub fn to_html(
    out: &mut String,
    markdown: &str,
    chat_renderer: &ChatRenderer,
) -> Result<(), chat::Error> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut events: Vec<Event> = Vec::new();
    let mut parser = Parser::new_ext(markdown, options);
    while let Some(ev) = parser.next() {
        match ev {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if chat::is_chat_block(&info) =>
            {
                let attributes = ChatAttributes::from_info(&info)?;

                // The block's contents arrive as text events up to the
                // matching end tag.
                let mut text = String::new();
                for inner in parser.by_ref() {
                    match inner {
                        Event::End(Tag::CodeBlock(_)) => break,
                        Event::Text(t) => text.push_str(&t),
                        _ => {}
                    }
                }

                let lines: Vec<&str> = text.lines().collect();
                let html = chat_renderer.render(&attributes, &lines)?;
                events.push(Event::Html(CowStr::Boxed(html.into_boxed_str())));
            }
            _ => events.push(ev),
        }
    }

    html::push_html(out, events.into_iter());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_html_passes_through_plain_markdown() -> Result<(), chat::Error> {
        let dir = tempfile::tempdir().unwrap();
        let mut out = String::new();
        to_html(
            &mut out,
            "# Title\n\n```rust\nfn main() {}\n```\n",
            &ChatRenderer::new(dir.path()),
        )?;
        assert!(out.contains("<h1>Title</h1>"), "{}", out);
        assert!(out.contains(r#"<code class="language-rust">"#), "{}", out);
        Ok(())
    }

    #[test]
    fn test_to_html_renders_chat_blocks() -> Result<(), chat::Error> {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alice.svg"), "<svg/>").unwrap();

        let mut out = String::new();
        to_html(
            &mut out,
            "Intro.\n\n```chat alice\nHello\nworld\n```\n\nOutro.\n",
            &ChatRenderer::new(dir.path()),
        )?;
        assert!(out.contains("<p>Intro.</p>"), "{}", out);
        assert!(out.contains(r#"<div class="dialog alice" title="Alice">"#), "{}", out);
        assert!(out.contains("<p>Hello world</p>"), "{}", out);
        assert!(out.contains("<p>Outro.</p>"), "{}", out);
        assert!(!out.contains("<pre>"), "{}", out);
        Ok(())
    }

    #[test]
    fn test_to_html_missing_icon_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = String::new();
        let result = to_html(
            &mut out,
            "```chat nobody\nhi\n```\n",
            &ChatRenderer::new(dir.path()),
        );
        assert!(matches!(result, Err(chat::Error::ResourceNotFound { .. })));
    }
}
