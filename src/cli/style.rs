//! Terminal styling for the bugfix views
//!
//! Semantic colors come from the [`Stylize`] trait; line prefixes come from
//! [`Marker`]. Color support detection (`NO_COLOR`, `CLICOLOR`, TTY) is left
//! to `owo-colors`.
//!
//! | Method       | Color  | Stream | Used for                           |
//! |--------------|--------|--------|------------------------------------|
//! | `.accent()`  | Cyan   | stdout | Branches, repositories, commands   |
//! | `.success()` | Green  | stdout | Completed pipeline, passing tests  |
//! | `.error()`   | Red    | stderr | Submission and result errors       |
//! | `.warn()`    | Yellow | stderr | No pull request, interruptions     |
//! | `.muted()`   | Dim    | stdout | Hints, test output                 |
//! | `.emphasis()`| Bold   | stdout | Section headers, current stage     |

use indicatif::ProgressStyle;
use std::fmt::{self, Display};
use std::sync::OnceLock;

pub use owo_colors::Stream;
use owo_colors::{OwoColorize, Style};

const ACCENT: Style = Style::new().cyan();
const SUCCESS: Style = Style::new().green();
const ERROR: Style = Style::new().red();
const WARN: Style = Style::new().yellow();
const MUTED: Style = Style::new().dimmed();
const EMPHASIS: Style = Style::new().bold();

/// A value rendered with a style when the target stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, style: Style, stream: Stream) -> Self {
        Self {
            value,
            style,
            stream,
        }
    }

    /// Detect color support on stdout instead of the default stream
    #[must_use]
    pub const fn for_stdout(mut self) -> Self {
        self.stream = Stream::Stdout;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.value
                .if_supports_color(self.stream, |v| v.style(self.style))
        )
    }
}

/// Semantic styling for anything displayable
pub trait Stylize: Display {
    /// Cyan, for primary information
    fn accent(&self) -> Styled<&Self> {
        Styled::new(self, ACCENT, Stream::Stdout)
    }

    /// Green, for completion
    fn success(&self) -> Styled<&Self> {
        Styled::new(self, SUCCESS, Stream::Stdout)
    }

    /// Red, for failures (stderr)
    fn error(&self) -> Styled<&Self> {
        Styled::new(self, ERROR, Stream::Stderr)
    }

    /// Yellow, for outcomes that need attention (stderr)
    fn warn(&self) -> Styled<&Self> {
        Styled::new(self, WARN, Stream::Stderr)
    }

    /// Dim, for secondary information
    fn muted(&self) -> Styled<&Self> {
        Styled::new(self, MUTED, Stream::Stdout)
    }

    /// Bold, for headers
    fn emphasis(&self) -> Styled<&Self> {
        Styled::new(self, EMPHASIS, Stream::Stdout)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Prefix symbol for a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Completed stage or action
    Done,
    /// Failed submission or tests
    Failed,
    /// Suggested next command
    Next,
    /// Stage currently highlighted
    Active,
    /// List entry
    Item,
}

impl Marker {
    const fn glyph(self) -> &'static str {
        match self {
            Self::Done => "✓",
            Self::Failed => "✗",
            Self::Next => "→",
            Self::Active => "▶",
            Self::Item => "○",
        }
    }

    const fn styled(self) -> Styled<&'static str> {
        match self {
            Self::Done => Styled::new(self.glyph(), SUCCESS, Stream::Stdout),
            Self::Failed => Styled::new(self.glyph(), ERROR, Stream::Stderr),
            Self::Next | Self::Active => Styled::new(self.glyph(), ACCENT, Stream::Stdout),
            Self::Item => Styled::new(self.glyph(), MUTED, Stream::Stdout),
        }
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.styled().fmt(f)
    }
}

const fn to_hyperlink_stream(stream: Stream) -> supports_hyperlinks::Stream {
    match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    }
}

/// OSC 8 link whose text is the URL itself
///
/// Plain URL text when the terminal can't render hyperlinks.
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    if supports_hyperlinks::on(to_hyperlink_stream(stream)) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Cyan dots followed by the message
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("hardcoded spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperlink_falls_back_to_url() {
        let url = "https://github.com/acme/widgets/pull/42";
        assert!(hyperlink_url(Stream::Stdout, url).contains(url));
    }
}
