//! Deep recursive directory copy used by the once-runner cache and the
//! `Cache` executable. No checksum-based incremental copy: the destination
//! tree is fully replaced every time.

use std::io;
use std::path::Path;

pub async fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(dst).await?;
    let mut entries = tokio::fs::read_dir(src).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        let dst_path = dst.join(entry.file_name());
        if file_type.is_dir() {
            Box::pin(copy_dir_recursive(&entry.path(), &dst_path)).await?;
        } else if file_type.is_file() {
            tokio::fs::copy(entry.path(), &dst_path).await?;
        }
    }
    Ok(())
}

pub fn is_dir_empty(dir: &Path) -> io::Result<bool> {
    Ok(std::fs::read_dir(dir)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn copies_nested_directories_and_files() {
        let src = tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let dst = tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        std::fs::create_dir_all(src.path().join("nested")).unwrap_or_else(|e| panic!("mkdir: {e}"));
        std::fs::write(src.path().join("top.txt"), b"top").unwrap_or_else(|e| panic!("write: {e}"));
        std::fs::write(src.path().join("nested/inner.txt"), b"inner").unwrap_or_else(|e| panic!("write: {e}"));

        copy_dir_recursive(src.path(), dst.path())
            .await
            .unwrap_or_else(|e| panic!("copy: {e}"));

        assert_eq!(std::fs::read_to_string(dst.path().join("top.txt")).unwrap_or_default(), "top");
        assert_eq!(
            std::fs::read_to_string(dst.path().join("nested/inner.txt")).unwrap_or_default(),
            "inner"
        );
    }

    #[test]
    fn is_dir_empty_detects_nonempty_directories() {
        let dir = tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        assert!(is_dir_empty(dir.path()).unwrap_or_else(|e| panic!("{e}")));
        std::fs::write(dir.path().join("f"), b"x").unwrap_or_else(|e| panic!("write: {e}"));
        assert!(!is_dir_empty(dir.path()).unwrap_or_else(|e| panic!("{e}")));
    }
}
