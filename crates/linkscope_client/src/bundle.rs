use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Fallback name when the agent sends no usable filename hint.
pub const DEFAULT_BUNDLE_NAME: &str = "evidence-bundle.zip";

/// Pulls the filename out of a `Content-Disposition: attachment` header.
/// Returns `None` for anything that does not name a plain file.
pub fn attachment_filename(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let name = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next().unwrap_or_default(),
        None => rest.split(';').next().unwrap_or_default().trim(),
    };
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return None;
    }
    Some(name.to_string())
}

/// Writes the bundle under `dir` via a temp file and rename, so a crashed
/// download never leaves a truncated zip behind.
pub fn save_bundle(dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_quoted_filename() {
        assert_eq!(
            attachment_filename(r#"attachment; filename="vne-evidence-20260812-0900.zip""#),
            Some("vne-evidence-20260812-0900.zip".to_string())
        );
    }

    #[test]
    fn parses_an_unquoted_filename() {
        assert_eq!(
            attachment_filename("attachment; filename=bundle.zip"),
            Some("bundle.zip".to_string())
        );
    }

    #[test]
    fn rejects_path_escapes() {
        assert_eq!(attachment_filename(r#"attachment; filename="../x.zip""#), None);
        assert_eq!(attachment_filename(r#"attachment; filename="a/b.zip""#), None);
        assert_eq!(attachment_filename("attachment"), None);
        assert_eq!(attachment_filename(r#"attachment; filename="""#), None);
    }

    #[test]
    fn save_replaces_an_existing_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = save_bundle(dir.path(), "a.zip", b"old").expect("first write");
        let second = save_bundle(dir.path(), "a.zip", b"new").expect("second write");

        assert_eq!(first, second);
        assert_eq!(fs::read(second).expect("read back"), b"new");
    }
}
