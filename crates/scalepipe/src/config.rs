use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Effective runtime settings: built-in defaults, overlaid by the
/// config file when one is given, overlaid by command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Serial device the scale head is wired to.
    pub device: PathBuf,
    /// Line rate; must be a standard UNIX rate (checked at open).
    pub baud: u32,
    /// Seconds between publishes, 1..=60 (checked at pipeline start).
    pub interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyS0"),
            baud: 9600,
            interval: 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not open config file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value for '{key}' in config file: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Settings {
    /// Load settings from a `key=value` config file.
    ///
    /// Whitespace is stripped from each line; empty lines, `#`
    /// comments, lines with no `=`, and assignments with no value are
    /// skipped. Unknown keys are ignored. Keys the file does not set
    /// fall back to the defaults with a logged warning.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut settings = Self::default();
        let mut device_set = false;
        let mut baud_set = false;
        let mut interval_set = false;

        for raw in contents.lines() {
            let line: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            if line.is_empty() || line.starts_with('#') || line.ends_with('=') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            match key {
                "dev" => {
                    settings.device = PathBuf::from(value);
                    device_set = true;
                }
                "baud" => {
                    settings.baud = value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: "baud",
                        value: value.to_string(),
                    })?;
                    baud_set = true;
                }
                "interval" => {
                    settings.interval = value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: "interval",
                        value: value.to_string(),
                    })?;
                    interval_set = true;
                }
                // Legacy key from the 4000-series config dialect. The
                // reading map is name-driven, so the count steers
                // nothing here, but the historical 4-or-6 validation
                // still applies.
                "num-channels" => {
                    let channels: u16 =
                        value.parse().map_err(|_| ConfigError::InvalidValue {
                            key: "num-channels",
                            value: value.to_string(),
                        })?;
                    if !(channels == 4 || channels == 6) {
                        return Err(ConfigError::InvalidValue {
                            key: "num-channels",
                            value: value.to_string(),
                        });
                    }
                    debug!(channels, "channel count noted (informational only)");
                }
                other => debug!(key = other, "ignoring unknown config key"),
            }
        }

        if !device_set {
            warn!(default = ?settings.device, "serial device not set in config file, using default");
        }
        if !baud_set {
            warn!(default = settings.baud, "baud rate not set in config file, using default");
        }
        if !interval_set {
            warn!(
                default = settings.interval,
                "publish interval not set in config file, using default"
            );
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(tag: &str, contents: &str) -> PathBuf {
        let path = PathBuf::from(format!(
            "/tmp/scalepipe-cfg-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::write(&path, contents).expect("config file should be writable");
        path
    }

    #[test]
    fn parses_all_keys_with_noise() {
        let path = write_config(
            "full",
            "# scale head on the bench rig\n\
             dev = /dev/ttyUSB0\n\
             baud= 115200\n\
             \n\
             interval =5\n\
             bogus-key = 7\n",
        );
        let settings = Settings::load(&path).expect("config should parse");
        assert_eq!(settings.device, PathBuf::from("/dev/ttyUSB0"));
        assert_eq!(settings.baud, 115200);
        assert_eq!(settings.interval, 5);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let path = write_config("partial", "baud=19200\n");
        let settings = Settings::load(&path).expect("config should parse");
        assert_eq!(settings.baud, 19200);
        assert_eq!(settings.device, Settings::default().device);
        assert_eq!(settings.interval, Settings::default().interval);
    }

    #[test]
    fn empty_assignments_and_comments_are_skipped() {
        let path = write_config("skips", "dev=\n# baud=50\nnot a config line\n");
        let settings = Settings::load(&path).expect("config should parse");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn channel_count_key_is_validated_but_steers_nothing() {
        let path = write_config("channels", "num-channels=6\nbaud=9600\n");
        let settings = Settings::load(&path).expect("config should parse");
        assert_eq!(settings, Settings::default());

        let path = write_config("badchannels", "num-channels=5\n");
        let err = Settings::load(&path).expect_err("only 4 or 6 channels are valid");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "num-channels",
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_baud_is_rejected() {
        let path = write_config("badbaud", "baud=fast\n");
        let err = Settings::load(&path).expect_err("bad baud should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "baud", .. }
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load(Path::new("/definitely/missing.conf"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Open { .. }));
    }
}
