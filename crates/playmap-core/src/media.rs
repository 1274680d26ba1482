//! Media type inference from file names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Media type of a source file, inferred from its extension.
///
/// Only three kinds are recognised. Any other extension is kept as
/// [`MediaType::Unsupported`]: it has no MIME type and no editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Script source.
    Script,
    /// Style sheet.
    Style,
    /// Markup document.
    Markup,
    /// Extension not covered by the rule table.
    Unsupported,
}

impl MediaType {
    /// Infer the media type of a file name.
    ///
    /// The rule is a substring match on the extension, checked in order:
    /// `js`, then `css`, then `html`. `data.json` and `app.mjs` are
    /// therefore scripts, `theme.scss` is a style sheet. Matching is
    /// case-sensitive: `MAIN.JS` is unsupported.
    pub fn infer(name: &str) -> Self {
        let Some(extension) = extension(name) else {
            return MediaType::Unsupported;
        };
        if extension.contains("js") {
            MediaType::Script
        } else if extension.contains("css") {
            MediaType::Style
        } else if extension.contains("html") {
            MediaType::Markup
        } else {
            MediaType::Unsupported
        }
    }

    /// MIME type used when creating a resource, if known.
    pub fn mime(&self) -> Option<&'static str> {
        match self {
            MediaType::Script => Some("application/javascript"),
            MediaType::Style => Some("text/css"),
            MediaType::Markup => Some("text/html"),
            MediaType::Unsupported => None,
        }
    }

    /// Editing mode for the authoring tool, if known.
    pub fn editor_mode(&self) -> Option<&'static str> {
        match self {
            MediaType::Script => Some("javascript"),
            MediaType::Style => Some("css"),
            MediaType::Markup => Some("html"),
            MediaType::Unsupported => None,
        }
    }

    /// Check whether the type is one of the recognised kinds.
    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaType::Unsupported)
    }

    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Script => "script",
            MediaType::Style => "style",
            MediaType::Markup => "markup",
            MediaType::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn extension(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(index) if index + 1 < base.len() => Some(&base[index + 1..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_known_extensions() {
        assert_eq!(MediaType::infer("main.js"), MediaType::Script);
        assert_eq!(MediaType::infer("style.css"), MediaType::Style);
        assert_eq!(MediaType::infer("index.html"), MediaType::Markup);
    }

    #[test]
    fn test_infer_is_case_sensitive() {
        assert_eq!(MediaType::infer("INDEX.HTML"), MediaType::Unsupported);
        assert_eq!(MediaType::infer("MAIN.JS"), MediaType::Unsupported);
    }

    #[test]
    fn test_infer_substring_rule() {
        assert_eq!(MediaType::infer("data.json"), MediaType::Script);
        assert_eq!(MediaType::infer("app.mjs"), MediaType::Script);
        assert_eq!(MediaType::infer("theme.scss"), MediaType::Style);
        assert_eq!(MediaType::infer("page.xhtml"), MediaType::Markup);
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(MediaType::infer("README.md"), MediaType::Unsupported);
        assert_eq!(MediaType::infer("Makefile"), MediaType::Unsupported);
        assert_eq!(MediaType::infer("trailing."), MediaType::Unsupported);
        assert_eq!(MediaType::infer("dir.js/notes"), MediaType::Unsupported);

        let unsupported = MediaType::Unsupported;
        assert_eq!(unsupported.mime(), None);
        assert_eq!(unsupported.editor_mode(), None);
        assert!(!unsupported.is_supported());
    }

    #[test]
    fn test_mime_and_mode() {
        assert_eq!(MediaType::Script.mime(), Some("application/javascript"));
        assert_eq!(MediaType::Style.editor_mode(), Some("css"));
        assert_eq!(MediaType::Markup.to_string(), "markup");
    }
}
