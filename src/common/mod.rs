mod directory;
mod field;
mod frontmatter;
mod not_found;
mod source_type;
mod tool_list;
mod tool_matcher;

use std::path::{Path, PathBuf};

pub(crate) use directory::{SKILL_FILE, markdown_files, regular_files, subdirectories};
pub use directory::is_markdown;
pub use field::{flag_field, text_field};
pub use frontmatter::{Frontmatter, ParsedDocument, parse_frontmatter};
pub use not_found::NotFound;
pub use source_type::Scope;
pub use tool_list::parse_tool_list;
pub use tool_matcher::split_tool_pattern;

pub(crate) fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(rest);
    }
    Path::new(path).to_path_buf()
}

/// Types with a registry identity.
pub trait Named {
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_passthrough() {
        assert_eq!(expand_home("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(expand_home("relative/file"), PathBuf::from("relative/file"));
    }

    #[test]
    fn test_expand_home_tilde() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_home("~/notes.md"), home.join("notes.md"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
