//! # Path Sandbox
//!
//! Resolves plan paths against the open project directory and rejects anything that
//! lands outside it. The containment check always runs on the canonical form, so `..`
//! segments and symlinks cannot be used to walk out of the root.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::{CoreError, CoreResult};

/// Bound on symlink hops while resolving a path whose tail does not exist yet.
const MAX_SYMLINK_HOPS: u8 = 40;

/// The directory outside of which no operation may act.
///
/// Always canonical. A new value is created each time a project is opened; nothing
/// global is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    /// Canonicalize `dir` and require it to be an existing directory.
    pub fn open(dir: impl AsRef<Path>) -> CoreResult<Self> {
        let dir = dir.as_ref();
        let root = dir
            .canonicalize()
            .map_err(|e| CoreError::Io(format!("cannot open {}: {e}", dir.display())))?;
        if !root.is_dir() {
            return Err(CoreError::Io(format!("{} is not a directory", root.display())));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Join `relative` onto the root, canonicalize, and accept only the root itself or
    /// a descendant of it.
    ///
    /// Components that do not exist yet are resolved lexically on top of the deepest
    /// existing (canonical) ancestor.
    pub fn resolve(&self, relative: &str) -> CoreResult<PathBuf> {
        self.contain(&self.root.join(relative), relative)
    }

    /// Like [`resolve`](Self::resolve), but the final component is not followed. A
    /// symlink named by `relative` resolves to the link itself, not to its target.
    ///
    /// Only the parent goes through canonicalization and the containment check.
    pub fn resolve_entry(&self, relative: &str) -> CoreResult<PathBuf> {
        let rel = Path::new(relative);
        let (Some(parent), Some(name)) = (rel.parent(), rel.file_name()) else {
            // "." or a trailing "..": nothing to keep unresolved.
            return self.resolve(relative);
        };
        let parent = self.contain(&self.root.join(parent), relative)?;
        Ok(parent.join(name))
    }

    fn contain(&self, joined: &Path, relative: &str) -> CoreResult<PathBuf> {
        let resolved = canonicalize_lenient(joined, MAX_SYMLINK_HOPS).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidInput {
                // Dangling symlink chain too long: never treated as inside the root.
                CoreError::PathEscape {
                    path: relative.to_string(),
                }
            } else {
                CoreError::Io(format!("cannot resolve {relative}: {e}"))
            }
        })?;

        if resolved == self.root || resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            tracing::warn!(
                "Blocked path escape: '{}' resolves to {}",
                relative,
                resolved.display()
            );
            Err(CoreError::PathEscape {
                path: relative.to_string(),
            })
        }
    }
}

/// Canonicalize an absolute path whose trailing components may not exist.
fn canonicalize_lenient(path: &Path, hops_left: u8) -> io::Result<PathBuf> {
    let mut current = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => current.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                current.pop();
            }
            Component::Normal(name) => {
                current.push(name);
                current = resolve_existing(current, hops_left)?;
            }
        }
    }

    Ok(current)
}

/// Canonicalize `candidate` if it exists, following dangling symlinks by hand.
/// Missing paths are returned unchanged.
fn resolve_existing(candidate: PathBuf, hops_left: u8) -> io::Result<PathBuf> {
    let meta = match std::fs::symlink_metadata(&candidate) {
        Ok(meta) => meta,
        Err(e) if is_missing(&e) => return Ok(candidate),
        Err(e) => return Err(e),
    };

    match candidate.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(e) if meta.file_type().is_symlink() && is_missing(&e) => {
            // Dangling link: its target decides where a write would land.
            if hops_left == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "too many levels of symbolic links",
                ));
            }
            let target = std::fs::read_link(&candidate)?;
            let base = candidate.parent().unwrap_or(Path::new("/"));
            canonicalize_lenient(&base.join(target), hops_left - 1)
        }
        Err(e) => Err(e),
    }
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, SandboxRoot) {
        let dir = TempDir::new().unwrap();
        let root = SandboxRoot::open(dir.path()).unwrap();
        (dir, root)
    }

    fn assert_escape(root: &SandboxRoot, rel: &str) {
        match root.resolve(rel) {
            Err(CoreError::PathEscape { path }) => assert_eq!(path, rel),
            other => panic!("expected PathEscape for {rel}, got {other:?}"),
        }
    }

    #[test]
    fn test_open_canonicalizes_root() {
        let (dir, root) = sandbox();
        assert_eq!(root.path(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_open_rejects_missing_or_file() {
        let (dir, _root) = sandbox();
        assert!(matches!(
            SandboxRoot::open(dir.path().join("nope")),
            Err(CoreError::Io(_))
        ));
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();
        assert!(matches!(
            SandboxRoot::open(dir.path().join("file.txt")),
            Err(CoreError::Io(_))
        ));
    }

    #[test]
    fn test_resolve_plain_relative_paths() {
        let (_dir, root) = sandbox();
        for rel in ["a.txt", "src/app.py", "a/b/c/d.txt", "./x.txt", "a/./b.txt"] {
            let resolved = root.resolve(rel).unwrap();
            assert!(resolved.starts_with(root.path()), "{rel} -> {resolved:?}");
        }
        assert_eq!(root.resolve("a/b/c.txt").unwrap(), root.path().join("a/b/c.txt"));
    }

    #[test]
    fn test_resolve_root_itself() {
        let (_dir, root) = sandbox();
        assert_eq!(root.resolve(".").unwrap(), root.path());
        assert_eq!(root.resolve("sub/..").unwrap(), root.path());
    }

    #[test]
    fn test_inner_parent_segments_are_allowed() {
        let (_dir, root) = sandbox();
        assert_eq!(root.resolve("a/../b.txt").unwrap(), root.path().join("b.txt"));
    }

    #[test]
    fn test_parent_traversal_is_blocked() {
        let (_dir, root) = sandbox();
        assert_escape(&root, "../outside.txt");
        assert_escape(&root, "../../etc/passwd");
        assert_escape(&root, "missing/../../escape.txt");
        assert_escape(&root, "..");
    }

    #[test]
    fn test_absolute_paths_elsewhere_are_blocked() {
        let (_dir, root) = sandbox();
        assert_escape(&root, "/etc/hosts");
        assert_escape(&root, "/");
    }

    #[test]
    fn test_sibling_with_common_prefix_is_blocked() {
        let parent = TempDir::new().unwrap();
        std::fs::create_dir(parent.path().join("proj")).unwrap();
        std::fs::create_dir(parent.path().join("proj-other")).unwrap();
        let root = SandboxRoot::open(parent.path().join("proj")).unwrap();
        assert_escape(&root, "../proj-other/file.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_is_blocked() {
        let (dir, root) = sandbox();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        assert_escape(&root, "link/secret.txt");
        assert_escape(&root, "link");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_out_of_root_is_blocked() {
        let (dir, root) = sandbox();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("not-yet.txt"),
            dir.path().join("dangling"),
        )
        .unwrap();
        assert_escape(&root, "dangling");
        assert_escape(&root, "missing/../dangling");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_is_allowed() {
        let (dir, root) = sandbox();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        assert_eq!(
            root.resolve("alias/file.txt").unwrap(),
            root.path().join("real/file.txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_entry_keeps_final_symlink() {
        let (dir, root) = sandbox();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("out")).unwrap();

        assert_eq!(root.resolve_entry("alias").unwrap(), root.path().join("alias"));
        assert_eq!(root.resolve_entry("out").unwrap(), root.path().join("out"));
        // Intermediate links are still followed and checked.
        assert_eq!(
            root.resolve_entry("alias/f.txt").unwrap(),
            root.path().join("real/f.txt")
        );
        assert!(matches!(
            root.resolve_entry("out/secret.txt"),
            Err(CoreError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_resolve_entry_checks_containment() {
        let (_dir, root) = sandbox();
        assert_eq!(root.resolve_entry(".").unwrap(), root.path());
        assert_eq!(root.resolve_entry("a/b.txt").unwrap(), root.path().join("a/b.txt"));
        assert_eq!(root.resolve_entry("a/..").unwrap(), root.path());
        for rel in ["../x", "/etc/hosts", "a/../../x"] {
            assert!(
                matches!(root.resolve_entry(rel), Err(CoreError::PathEscape { .. })),
                "{rel}"
            );
        }
    }
}
