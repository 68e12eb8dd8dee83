//! Staging of auxiliary host paths into a build context.

use crate::{CompileError, CompileResult};
use ci2docker_config::{CopyPath, expand_path};
use ci2docker_core::CopySpec;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Copy every path into `work_dir` and return the matching copy instructions,
/// in input order.
///
/// Each source lands under its base name; whatever was there before is
/// removed first, so repeated runs with an unchanged source produce identical
/// contents.
pub fn resolve_copies(paths: &[CopyPath], work_dir: &Path) -> CompileResult<Vec<CopySpec>> {
    paths
        .iter()
        .map(|copy| {
            let relative = stage_path(&copy.src, work_dir)?;
            Ok(CopySpec::new(relative, copy.dest.clone()))
        })
        .collect()
}

/// Copy `src` (expanded) into `work_dir`, returning its context-relative path.
fn stage_path(src: &str, work_dir: &Path) -> CompileResult<String> {
    let src = expand_path(src);
    if !src.exists() {
        return Err(CompileError::CopySourceMissing(src));
    }
    let Some(name) = src.file_name() else {
        return Err(CompileError::CopySourceMissing(src));
    };

    let dest = work_dir.join(name);
    if dest.is_dir() {
        std::fs::remove_dir_all(&dest)?;
    } else if dest.exists() {
        std::fs::remove_file(&dest)?;
    }

    debug!(src = %src.display(), dest = %dest.display(), "Staging copy path");
    if src.is_dir() {
        copy_tree(&src, &dest)?;
    } else {
        std::fs::create_dir_all(work_dir)?;
        std::fs::copy(&src, &dest)?;
    }

    Ok(name.to_string_lossy().into_owned())
}

/// Copy a directory tree, keeping file and directory permissions.
fn copy_tree(src: &Path, dest: &Path) -> std::io::Result<()> {
    // Directory modes are applied once the tree is filled, deepest first,
    // so a read-only source directory can still receive its children.
    let mut dir_permissions = Vec::new();
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
            dir_permissions.push((target, entry.metadata()?.permissions()));
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    for (dir, permissions) in dir_permissions.into_iter().rev() {
        std::fs::set_permissions(&dir, permissions)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
        WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().display().to_string();
                (rel, std::fs::read(e.path()).unwrap())
            })
            .collect()
    }

    fn source_tree(root: &Path) -> std::path::PathBuf {
        let src = root.join("ssh");
        std::fs::create_dir_all(src.join("keys")).unwrap();
        std::fs::write(src.join("id_rsa.pub"), "ssh-rsa AAAA").unwrap();
        std::fs::write(src.join("keys").join("deploy"), "secret").unwrap();
        src
    }

    #[test]
    fn test_copy_tree_into_context() {
        let dir = tempfile::tempdir().unwrap();
        let src = source_tree(dir.path());
        let work_dir = dir.path().join("out").join("1");

        let copies = resolve_copies(
            &[CopyPath::new(src.display().to_string(), "$HOME/.ssh")],
            &work_dir,
        )
        .unwrap();

        assert_eq!(copies, vec![CopySpec::new("ssh", "$HOME/.ssh")]);
        assert_eq!(snapshot(&work_dir.join("ssh")), snapshot(&src));
    }

    #[test]
    fn test_repeated_copy_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let src = source_tree(dir.path());
        let work_dir = dir.path().join("out");
        let paths = [CopyPath::new(src.display().to_string(), "/root/.ssh")];

        resolve_copies(&paths, &work_dir).unwrap();
        let first = snapshot(&work_dir.join("ssh"));
        // Stale files in the destination are replaced, not merged.
        std::fs::write(work_dir.join("ssh").join("stale"), "old").unwrap();
        resolve_copies(&paths, &work_dir).unwrap();
        let second = snapshot(&work_dir.join("ssh"));

        assert_eq!(first, second);
        assert!(!work_dir.join("ssh").join("stale").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_keeps_directory_modes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = source_tree(dir.path());
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o700)).unwrap();
        std::fs::set_permissions(src.join("keys"), std::fs::Permissions::from_mode(0o750))
            .unwrap();
        let work_dir = dir.path().join("out");

        resolve_copies(
            &[CopyPath::new(src.display().to_string(), "$HOME/.ssh")],
            &work_dir,
        )
        .unwrap();

        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&work_dir.join("ssh")), 0o700);
        assert_eq!(mode(&work_dir.join("ssh").join("keys")), 0o750);
        assert_eq!(snapshot(&work_dir.join("ssh")), snapshot(&src));
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = resolve_copies(
            &[CopyPath::new(missing.display().to_string(), "/x")],
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::CopySourceMissing(path) if path == missing));
    }

    #[test]
    fn test_copy_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("netrc");
        std::fs::write(&src, "machine github.com").unwrap();
        let work_dir = dir.path().join("ctx");

        let copies = resolve_copies(
            &[CopyPath::new(src.display().to_string(), "/root/.netrc")],
            &work_dir,
        )
        .unwrap();
        assert_eq!(copies[0].src, "netrc");
        assert_eq!(
            std::fs::read_to_string(work_dir.join("netrc")).unwrap(),
            "machine github.com"
        );
    }
}
