//! src/config_file.rs
//!
//! Loads a `RawOptions` from the `--config`/`-c` file. Format is picked by extension:
//! `.json` goes through `serde_json`, anything else (`.toml` or no extension) through `toml`.

use std::path::Path;

use crate::config::RawOptions;
use crate::error::WaitOnError;

pub fn load(path: &Path) -> Result<RawOptions, WaitOnError> {
    let contents = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"resources": ["tcp:localhost:3000"], "interval": 100}}"#).unwrap();
        let raw = load(file.path()).unwrap();
        assert_eq!(raw.resources, Some(vec!["tcp:localhost:3000".to_string()]));
        assert_eq!(raw.interval, Some(100));
    }

    #[test]
    fn loads_toml_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "resources = [\"tcp:localhost:3000\"]\ninterval = 100\n").unwrap();
        let raw = load(file.path()).unwrap();
        assert_eq!(raw.resources, Some(vec!["tcp:localhost:3000".to_string()]));
        assert_eq!(raw.interval, Some(100));
    }

    #[test]
    fn rejects_malformed_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json ").unwrap();
        assert!(load(file.path()).is_err());
    }
}
