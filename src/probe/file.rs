//! File probe (C2): a single stat, returning size rather than a bool because the stability
//! algorithm in `poller` needs the value to detect growth/shrink between probes.

use std::path::Path;

/// Returns the file's byte size, or `-1` if the stat fails (does not exist, permission
/// denied, etc. are all treated alike — "absent" from the stability algorithm's point of
/// view).
pub async fn stat_size(path: &Path) -> i64 {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len() as i64,
        Err(_) => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_is_negative_one() {
        let size = stat_size(Path::new("/nonexistent/path/for/wait-on/tests")).await;
        assert_eq!(size, -1);
    }

    #[tokio::test]
    async fn existing_file_reports_its_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        file.flush().unwrap();
        let size = stat_size(file.path()).await;
        assert_eq!(size, 5);
    }
}
