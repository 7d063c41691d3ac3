//! Splitting of user supplied argument strings into argument vectors without involving a shell.

use std::fmt;

/// The argument string could not be split because of unbalanced quotes or a trailing backslash.
#[derive(Debug)]
pub struct SplitError {
    pub input: String,
    pub source: shell_words::ParseError,
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to split {input:?}: {source}", input = self.input, source = self.source)
    }
}

impl std::error::Error for SplitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Splits `input` the way a POSIX shell splits words, honoring single quotes, double quotes and
/// backslash escapes. No expansion of any kind is performed.
pub fn split(input: &str) -> Result<Vec<String>, SplitError> {
    shell_words::split(input).map_err(|source| SplitError {
        input: input.to_owned(),
        source,
    })
}

/// Splits `input` on whitespace only. Quotes are kept as part of the words.
pub fn split_whitespace(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(split("").unwrap().is_empty());
        assert!(split(" \t\n ").unwrap().is_empty());
    }

    #[test]
    fn test_quotes() {
        assert_eq!(split(r#""a b" c 'd e'"#).unwrap(), ["a b", "c", "d e"]);
    }

    #[test]
    fn test_build_arg() {
        assert_eq!(
            split(r#"--build-arg https_proxy="http://proxy:3128" --no-cache"#).unwrap(),
            ["--build-arg", "https_proxy=http://proxy:3128", "--no-cache"]
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(split(r"a\ b c\\d").unwrap(), ["a b", r"c\d"]);
        assert_eq!(split(r#"'$HOME' "\$HOME""#).unwrap(), ["$HOME", "$HOME"]);
        assert_eq!(split(r#"'it'\''s'"#).unwrap(), ["it's"]);
    }

    #[test]
    fn test_unterminated_double_quote() {
        let error = split(r#""unterminated"#).unwrap_err();
        assert_eq!(error.input, r#""unterminated"#);
        assert!(error.to_string().contains("unterminated"));
    }

    #[test]
    fn test_unterminated_single_quote() {
        assert!(split("a 'b").is_err());
    }

    #[test]
    fn test_split_whitespace_ignores_quotes() {
        assert_eq!(
            split_whitespace(r#"-ldflags "-X main.xyz=abc""#),
            ["-ldflags", "\"-X", "main.xyz=abc\""]
        );
        assert!(split_whitespace("   ").is_empty());
    }
}
