//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section.to_lowercase())
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[inputs]
anchor = 4 - QQQ.csv
anchor_symbol = QQQ

[backtest]
risk_free_rate = 0.03
sma_window = 50
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("inputs", "anchor"),
            Some("4 - QQQ.csv".to_string())
        );
        assert_eq!(adapter.get_int("backtest", "sma_window", 20), 50);
        assert_eq!(adapter.get_double("backtest", "risk_free_rate", 0.0), 0.03);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Backtest]\nSMA_Window = 10\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "sma_window", 20), 10);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsma_window = 20\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsma_window = abc\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "sma_window", 42), 42);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "missing", 99.9), 99.9);
    }

    #[test]
    fn keys_lists_section_entries() {
        let adapter =
            FileConfigAdapter::from_string("[Inputs]\nconfirm_3 = a.csv\nAnchor = q.csv\n").unwrap();
        assert_eq!(adapter.keys("inputs"), vec!["anchor", "confirm_3"]);
        assert!(adapter.keys("backtest").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[low_vol]\njoin = left\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("low_vol", "join"), Some("left".to_string()));
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
