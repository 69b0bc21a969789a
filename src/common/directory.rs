use std::path::{Path, PathBuf};

pub const SKILL_FILE: &str = "SKILL.md";

pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "md")
}

/// Markdown files under `dir`, sorted by path. A missing directory yields
/// nothing; unreadable subdirectories are logged and skipped. Symlinked
/// subdirectories are not descended into.
pub async fn markdown_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for path in read_entries(&current).await {
            if path.is_dir() {
                if recursive && !path.is_symlink() {
                    pending.push(path);
                } else if recursive {
                    tracing::debug!(path = %path.display(), "Not following directory symlink");
                }
            } else if path.is_file() && is_markdown(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Immediate subdirectories of `dir`, sorted by path.
pub async fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = read_entries(dir)
        .await
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Immediate regular files of `dir`, sorted by path.
pub async fn regular_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = read_entries(dir)
        .await
        .into_iter()
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

async fn read_entries(dir: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if !dir.exists() {
        return paths;
    }

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory");
            return paths;
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => paths.push(entry.path()),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory entry");
                break;
            }
        }
    }

    paths
}
