//! Local File System Implementation
//!
//! Recursive directory copy, permission propagation, and in-place content
//! replacement.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use ignore::WalkBuilder;

use crate::domain::ports::FileSystem;

/// Local file system operations
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }

    /// Copy a single file, creating parent directories of `dst`.
    pub fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
        Ok(())
    }
}

impl FileSystem for LocalFs {
    /// Copy `src` into `dst` recursively, preserving structure and modes.
    ///
    /// Existing files in `dst` are overwritten; other contents are kept.
    /// Symlinks are recreated rather than followed on Unix.
    fn copy_dir_all(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fs::create_dir_all(dst)?;

        let walker = WalkBuilder::new(src)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        // Directory modes are applied last so read-only sources can be copied
        let mut dirs = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::other)?;
            let rel = entry
                .path()
                .strip_prefix(src)
                .map_err(io::Error::other)?;
            let target = dst.join(rel);
            let Some(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
                dirs.push((fs::metadata(entry.path())?.permissions(), target));
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &target)?;
            }
        }

        for (permissions, dir) in dirs.into_iter().rev() {
            fs::set_permissions(dir, permissions)?;
        }
        Ok(())
    }

    /// Overwrite the content of the existing file at `path`.
    ///
    /// Writes through the existing inode: symlinks are followed, and the
    /// mode and owner stay as they were. The file must already exist.
    fn replace_content(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.write_all(content)?;
        file.sync_all()
    }

    /// Copy the permission bits of `src` onto `dst`.
    fn copy_permissions(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let permissions = fs::metadata(src)?.permissions();
        fs::set_permissions(dst, permissions)
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copy_dir_all_preserves_structure() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested/deeper")).unwrap();
        fs::write(src.join("top.tmpl"), "top").unwrap();
        fs::write(src.join("nested/deeper/leaf.tmpl"), "leaf").unwrap();
        fs::write(src.join(".hidden"), "dot").unwrap();

        let dst = dir.path().join("out/dst");
        LocalFs::new().copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("top.tmpl")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(dst.join("nested/deeper/leaf.tmpl")).unwrap(),
            "leaf"
        );
        assert!(dst.join(".hidden").exists());
    }

    #[test]
    fn copy_dir_all_overwrites_existing_files() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a"), "new").unwrap();
        fs::write(dst.join("a"), "old").unwrap();
        fs::write(dst.join("keep"), "kept").unwrap();

        LocalFs::new().copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.join("keep")).unwrap(), "kept");
    }

    #[test]
    fn copy_file_creates_parents() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, "content").unwrap();
        let dst = dir.path().join("x/y/a.txt");

        LocalFs::new().copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst).unwrap(), "content");
    }

    #[test]
    fn replace_content_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "a much longer body than the replacement").unwrap();

        LocalFs::new().replace_content(&path, b"after").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "after");
    }

    #[test]
    fn replace_content_requires_existing_file() {
        let dir = tempdir().unwrap();
        assert!(LocalFs::new()
            .replace_content(&dir.path().join("missing"), b"x")
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn replace_content_keeps_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("run.sh");
        fs::write(&path, "echo {{ x }}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        LocalFs::new().replace_content(&path, b"echo 1").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn replace_content_writes_through_symlink() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("real")).unwrap();
        let target = dir.path().join("real/app.conf");
        fs::write(&target, "v={{ x }}").unwrap();
        let link = dir.path().join("app.conf");
        std::os::unix::fs::symlink("real/app.conf", &link).unwrap();

        LocalFs::new().replace_content(&link, b"v=2").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "v=2");
    }

    #[cfg(unix)]
    #[test]
    fn replace_content_needs_no_parent_write_access() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        let path = locked.join("a.conf");
        fs::write(&path, "before").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let result = LocalFs::new().replace_content(&path, b"after");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        result.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "after");
    }

    #[cfg(unix)]
    #[test]
    fn copy_permissions_copies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let src = dir.path().join("src.sh");
        let dst = dir.path().join("dst.sh");
        fs::write(&src, "").unwrap();
        fs::write(&dst, "").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(&dst, fs::Permissions::from_mode(0o600)).unwrap();

        LocalFs::new().copy_permissions(&src, &dst).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_all_recreates_symlinks() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("real"), "r").unwrap();
        std::os::unix::fs::symlink("real", src.join("link")).unwrap();

        let dst = dir.path().join("dst");
        LocalFs::new().copy_dir_all(&src, &dst).unwrap();

        let link = dst.join("link");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(link).unwrap(), "r");
    }
}
