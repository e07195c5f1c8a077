//! Syntax highlighting for snippets, backed by syntect's bundled
//! syntaxes and themes.
//!
//! The service exposes a closed set of language and style names. Styles
//! are our own names mapped onto the themes syntect ships with, so the
//! API surface stays stable even if the underlying theme keys change.

use anyhow::{Context, Result};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{IncludeBackground, highlighted_html_for_string, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Supported languages: (public name, syntect lookup token).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("c", "c"),
    ("cpp", "c++"),
    ("css", "css"),
    ("go", "go"),
    ("html", "html"),
    ("java", "java"),
    ("javascript", "js"),
    ("json", "json"),
    ("markdown", "md"),
    ("php", "php"),
    ("python", "py"),
    ("ruby", "rb"),
    ("rust", "rs"),
    ("shell", "bash"),
    ("sql", "sql"),
    ("xml", "xml"),
    ("yaml", "yaml"),
];

/// Supported styles: (public name, syntect theme key).
pub const STYLES: &[(&str, &str)] = &[
    ("friendly", "InspiredGitHub"),
    ("eighties", "base16-eighties.dark"),
    ("mocha", "base16-mocha.dark"),
    ("ocean-dark", "base16-ocean.dark"),
    ("ocean-light", "base16-ocean.light"),
    ("solarized-dark", "Solarized (dark)"),
    ("solarized-light", "Solarized (light)"),
];

pub const DEFAULT_LANGUAGE: &str = "python";
pub const DEFAULT_STYLE: &str = "friendly";

pub fn is_language(name: &str) -> bool {
    LANGUAGES.iter().any(|(lang, _)| *lang == name)
}

pub fn is_style(name: &str) -> bool {
    STYLES.iter().any(|(style, _)| *style == name)
}

struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

// Loading the default syntax set is expensive, keep a single copy.
fn highlighter() -> &'static Highlighter {
    static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
    HIGHLIGHTER.get_or_init(|| Highlighter {
        syntaxes: SyntaxSet::load_defaults_newlines(),
        themes: ThemeSet::load_defaults(),
    })
}

/// Render `code` as highlighted HTML. Unknown languages fall back to
/// plain text; `style` must be a member of [`STYLES`].
pub fn render(code: &str, language: &str, style: &str, linenos: bool) -> Result<String> {
    let hl = highlighter();

    let token = LANGUAGES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, token)| *token)
        .unwrap_or(language);
    let syntax = hl
        .syntaxes
        .find_syntax_by_token(token)
        .unwrap_or_else(|| hl.syntaxes.find_syntax_plain_text());

    let theme_key = STYLES
        .iter()
        .find(|(name, _)| *name == style)
        .map(|(_, key)| *key)
        .with_context(|| format!("unknown style: {}", style))?;
    let theme = &hl.themes.themes[theme_key];

    if !linenos {
        return highlighted_html_for_string(code, &hl.syntaxes, syntax, theme)
            .context("failed to render highlighted html");
    }

    // Line-numbered variant: highlight line by line and prefix each line
    // with a lineno span, matching the table-less pygments layout.
    let background = theme
        .settings
        .background
        .map(|c| format!("background-color:#{:02x}{:02x}{:02x};", c.r, c.g, c.b))
        .unwrap_or_default();

    let mut lines = HighlightLines::new(syntax, theme);
    let mut html = format!("<pre class=\"highlight\" style=\"{}\">\n", background);
    for (number, line) in LinesWithEndings::from(code).enumerate() {
        let regions = lines
            .highlight_line(line, &hl.syntaxes)
            .context("failed to highlight line")?;
        let rendered = styled_line_to_highlighted_html(&regions, IncludeBackground::No)
            .context("failed to render line")?;
        html.push_str(&format!(
            "<span class=\"lineno\">{:>4} </span>{}",
            number + 1,
            rendered
        ));
    }
    html.push_str("</pre>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_members() {
        assert!(is_language(DEFAULT_LANGUAGE));
        assert!(is_style(DEFAULT_STYLE));
    }

    #[test]
    fn test_every_style_maps_to_a_bundled_theme() {
        let themes = ThemeSet::load_defaults();
        for (name, key) in STYLES {
            assert!(
                themes.themes.contains_key(*key),
                "style {} maps to missing theme {}",
                name,
                key
            );
        }
    }

    #[test]
    fn test_render_python() {
        let html = render("def hello():\n    print('hi')\n", "python", "friendly", false).unwrap();
        assert!(html.contains("<span"));
        assert!(html.contains("def"));
    }

    #[test]
    fn test_render_with_line_numbers() {
        let html = render("x = 1\ny = 2\n", "python", "friendly", true).unwrap();
        assert!(html.contains("class=\"lineno\""));
        assert!(html.contains("   1 "));
        assert!(html.contains("   2 "));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let html = render("whatever ???", "klingon", "friendly", false).unwrap();
        assert!(html.contains("whatever"));
    }

    #[test]
    fn test_unknown_style_is_an_error() {
        assert!(render("x = 1", "python", "no-such-style", false).is_err());
    }
}
