//! Command grammar

use crate::media::is_valid_url;

/// What one inbound message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Echo(String),
    Download(String),
    /// Non-command text that is not a recognised media link
    PlainText(String),
    /// Text starting with `/` that matched no prefix
    Unknown,
}

type Constructor = fn(String) -> Command;

/// Ordered prefix table, first match wins
///
/// Matched against the lower-cased text. Prefixes with a trailing space only
/// match when an argument separator follows the command word.
const PREFIXES: &[(&str, Constructor)] = &[
    ("/start", |_| Command::Start),
    ("/help", |_| Command::Help),
    ("/echo ", Command::Echo),
    ("/download ", Command::Download),
];

impl Command {
    /// Interpret message text, `None` for empty text
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }

        if text.starts_with('/') {
            return Some(Self::parse_slash(text));
        }

        let trimmed = text.trim();
        if is_valid_url(trimmed) {
            Some(Self::Download(trimmed.to_string()))
        } else {
            Some(Self::PlainText(text.to_string()))
        }
    }

    fn parse_slash(text: &str) -> Self {
        let lowered = text.to_lowercase();

        PREFIXES
            .iter()
            .find(|(prefix, _)| lowered.starts_with(*prefix))
            .map_or(Self::Unknown, |(prefix, build)| {
                // Prefixes are ASCII, so the byte offset is the same in both strings
                let arg = text.get(prefix.len()..).unwrap_or_default().trim();
                build(arg.to_string())
            })
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Echo(_) => "echo",
            Self::Download(_) => "download",
            Self::PlainText(_) => "plain_text",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_no_command() {
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(Command::parse("/START"), Some(Command::Start));
        assert_eq!(Command::parse("/Help"), Some(Command::Help));
    }

    #[test]
    fn argument_keeps_original_case() {
        assert_eq!(
            Command::parse("/ECHO Hello World "),
            Some(Command::Echo("Hello World".to_string()))
        );
        assert_eq!(
            Command::parse("/download https://youtu.be/AbC"),
            Some(Command::Download("https://youtu.be/AbC".to_string()))
        );
    }

    #[test]
    fn download_with_blank_argument() {
        assert_eq!(
            Command::parse("/download    "),
            Some(Command::Download(String::new()))
        );
    }

    #[test]
    fn commands_without_separator_are_unknown() {
        assert_eq!(Command::parse("/download"), Some(Command::Unknown));
        assert_eq!(Command::parse("/echo"), Some(Command::Unknown));
        assert_eq!(Command::parse("/frobnicate"), Some(Command::Unknown));
    }

    #[test]
    fn bare_link_is_implicit_download() {
        assert_eq!(
            Command::parse("  https://www.youtube.com/watch?v=dQw4w9WgXcQ \n"),
            Some(Command::Download(
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()
            ))
        );
    }

    #[test]
    fn other_text_is_plain() {
        assert_eq!(
            Command::parse("hello there"),
            Some(Command::PlainText("hello there".to_string()))
        );
    }
}
