//! Filesystem helpers for generated artifacts.

use ci2docker_core::ScriptArtifact;
use std::path::Path;

/// Add the owner-execute bit, keeping the existing permissions.
pub fn set_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o100);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Strip surrounding newlines and spaces from a rendered document.
pub fn strip_blank_edges(content: &str) -> &str {
    content.trim_matches(|c| c == '\n' || c == ' ')
}

/// Write `content` to `path`, creating parent directories on demand.
pub fn write_artifact(
    path: &Path,
    content: String,
    executable: bool,
) -> std::io::Result<ScriptArtifact> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &content)?;
    if executable {
        set_executable(path)?;
    }

    Ok(ScriptArtifact {
        path: path.to_path_buf(),
        content,
        executable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_blank_edges() {
        assert_eq!(strip_blank_edges("\n\n FROM alpine\nRUN x \n\n"), "FROM alpine\nRUN x");
        assert_eq!(strip_blank_edges("\t keep tabs"), "\t keep tabs");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_executable_artifact() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files").join("install");
        let artifact = write_artifact(&path, "echo hi\n".to_string(), true).unwrap();

        assert!(artifact.executable);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "echo hi\n");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0);
    }
}
