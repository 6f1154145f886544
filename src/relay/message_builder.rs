use std::fmt::Write;

use url::Url;

enum Style {
    Bold,
    Code,
}

impl Style {
    fn close(&self) -> &'static str {
        match self {
            Self::Bold => "</b>",
            Self::Code => "</code>",
        }
    }
}

/// Builds the HTML body of a HipChat message. Everything written through the
/// [`Write`] impl is escaped; markup only enters through the dedicated
/// methods.
#[derive(Default)]
pub struct MessageBuilder {
    html: String,
    style_stack: Vec<Style>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(mut self) -> String {
        self.close_styles();
        self.html
    }

    pub fn bold(&mut self) {
        self.html.push_str("<b>");
        self.style_stack.push(Style::Bold);
    }

    pub fn code(&mut self) {
        self.html.push_str("<code>");
        self.style_stack.push(Style::Code);
    }

    /// Inline avatar thumbnail. URL attribute values come percent-encoded out
    /// of [`Url`] already.
    pub fn avatar(&mut self, src: &Url) {
        write!(self.html, r#"<img src="{}" width="25px">"#, src).unwrap();
    }

    pub fn line_break(&mut self) {
        self.html.push_str("<br />");
    }

    pub fn link(&mut self, text: &str, href: &Url) {
        write!(self.html, r#"<a href="{}">"#, href).unwrap();
        write!(self, "{}", text).unwrap();
        self.html.push_str("</a>");
    }

    /// Panics if called with no style in the stack
    pub fn close_last(&mut self) {
        let style = self.style_stack.pop().expect("cannot be empty");
        self.html.push_str(style.close());
    }

    pub fn close_styles(&mut self) {
        while !self.style_stack.is_empty() {
            self.close_last();
        }
    }
}

impl std::fmt::Write for MessageBuilder {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let mut last = 0;
        for (i, c) in s.char_indices() {
            // NOTE: escape characters that have a special meaning in HTML. Shamelessly adapted from
            // rustdoc/html/escape.rs
            let escaped = match c {
                '>' => "&gt;",
                '<' => "&lt;",
                '&' => "&amp;",
                '\'' => "&#39;",
                '"' => "&quot;",
                _ => continue,
            };

            self.html.push_str(&s[last..i]);
            self.html.push_str(escaped);
            last = i + 1;
        }

        if last < s.len() {
            self.html.push_str(&s[last..]);
        }

        Ok(())
    }
}
