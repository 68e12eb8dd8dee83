//! Home-directory and environment-variable expansion for paths.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

// Regex for matching $NAME and ${NAME}
static ENV_VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))").unwrap()
});

/// Expand a leading `~` to the home directory, then `$NAME` and `${NAME}`
/// to values from the process environment. Unknown variables are kept.
pub fn expand_path(input: &str) -> PathBuf {
    PathBuf::from(expand_with(
        input,
        dirs::home_dir().as_deref(),
        |name| std::env::var(name).ok(),
    ))
}

fn expand_with(input: &str, home: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> String {
    let input = match (home, input.strip_prefix('~')) {
        (Some(home), Some(rest)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", home.display(), rest)
        }
        _ => input.to_string(),
    };

    ENV_VAR_REGEX
        .replace_all(&input, |caps: &regex::Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/ci".to_string()),
            "PROJECT" => Some("demo".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_variables() {
        let home = Path::new("/home/ci");
        assert_eq!(expand_with("$HOME/.ssh", Some(home), lookup), "/home/ci/.ssh");
        assert_eq!(
            expand_with("/srv/${PROJECT}/build", Some(home), lookup),
            "/srv/demo/build"
        );
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/ci");
        assert_eq!(expand_with("~/.ssh", Some(home), lookup), "/home/ci/.ssh");
        assert_eq!(expand_with("~", Some(home), lookup), "/home/ci");
        assert_eq!(expand_with("~other/x", Some(home), lookup), "~other/x");
        assert_eq!(expand_with("~/.ssh", None, lookup), "~/.ssh");
    }

    #[test]
    fn test_unknown_variable_preserved() {
        assert_eq!(expand_with("$NOPE/x", None, lookup), "$NOPE/x");
        assert_eq!(expand_with("${NOPE}", None, lookup), "${NOPE}");
    }
}
