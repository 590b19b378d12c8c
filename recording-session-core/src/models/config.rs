use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Default recording ceiling: ten minutes.
pub const DEFAULT_MAX_DURATION_SECS: u32 = 10 * 60;

/// Configuration for a browser stream session (host A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSessionConfig {
    /// Start recording as soon as the stream is ready (default: false).
    pub start_on_ready: bool,

    /// Recording ceiling in seconds; reaching it forces a stop (default: 600).
    pub max_duration_secs: u32,

    /// Sessions must last longer than this to be uploaded; 0 uploads every
    /// session (default: 0).
    pub min_duration_secs: u32,
}

impl StreamSessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.max_duration_secs == 0 {
            return Err(SessionError::Configuration(
                "max duration must be positive".into(),
            ));
        }
        if self.min_duration_secs >= self.max_duration_secs {
            return Err(SessionError::Configuration(format!(
                "min duration {}s must be below max duration {}s",
                self.min_duration_secs, self.max_duration_secs
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SessionError::Configuration(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for StreamSessionConfig {
    fn default() -> Self {
        Self {
            start_on_ready: false,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            min_duration_secs: 0,
        }
    }
}

/// Container format requested from a host-managed recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Aac,
    Wav,
    Pcm,
}

/// Options passed to the host-managed recorder on every start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderOptions {
    pub format: AudioFormat,
    pub number_of_channels: u16,
    /// Host-side segment ceiling in milliseconds (the runtime caps this at 600000).
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode_bit_rate: Option<u32>,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            number_of_channels: 1,
            duration_ms: u64::from(DEFAULT_MAX_DURATION_SECS) * 1000,
            sample_rate: None,
            encode_bit_rate: None,
        }
    }
}

/// Configuration for a host-managed recorder session (host B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagedSessionConfig {
    pub recorder_options: RecorderOptions,

    /// Start a new segment when the host ceiling ends a recording that was
    /// not stopped by the caller (default: false).
    pub auto_continue: bool,

    /// Recordings at or below this length are discarded with a notice (default: 1000).
    pub min_duration_ms: u64,
}

impl ManagedSessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        let options = &self.recorder_options;
        if ![1, 2].contains(&options.number_of_channels) {
            return Err(SessionError::Configuration(format!(
                "unsupported channel count: {}",
                options.number_of_channels
            )));
        }
        if options.duration_ms == 0 {
            return Err(SessionError::Configuration(
                "recorder duration must be positive".into(),
            ));
        }
        if self.min_duration_ms >= options.duration_ms {
            return Err(SessionError::Configuration(format!(
                "min duration {}ms must be below recorder duration {}ms",
                self.min_duration_ms, options.duration_ms
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SessionError::Configuration(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ManagedSessionConfig {
    fn default() -> Self {
        Self {
            recorder_options: RecorderOptions::default(),
            auto_continue: false,
            min_duration_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(StreamSessionConfig::default().validate().is_ok());
        assert!(ManagedSessionConfig::default().validate().is_ok());
        assert_eq!(StreamSessionConfig::default().max_duration_secs, 600);
        assert_eq!(RecorderOptions::default().duration_ms, 600_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = StreamSessionConfig::from_json(r#"{ "start_on_ready": true }"#).unwrap();
        assert!(config.start_on_ready);
        assert_eq!(config.max_duration_secs, DEFAULT_MAX_DURATION_SECS);

        let config = ManagedSessionConfig::from_json(
            r#"{ "recorder_options": { "format": "aac", "numberOfChannels": 2 }, "auto_continue": true }"#,
        )
        .unwrap();
        assert_eq!(config.recorder_options.format, AudioFormat::Aac);
        assert_eq!(config.recorder_options.number_of_channels, 2);
        assert_eq!(config.recorder_options.duration_ms, 600_000);
        assert!(config.auto_continue);
    }

    #[test]
    fn rejects_zero_ceiling() {
        let config = StreamSessionConfig {
            max_duration_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SessionError::Configuration(_))));
    }

    #[test]
    fn rejects_minimum_at_ceiling() {
        let config = StreamSessionConfig {
            max_duration_secs: 5,
            min_duration_secs: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_channel_count() {
        let mut config = ManagedSessionConfig::default();
        config.recorder_options.number_of_channels = 6;
        assert!(config.validate().is_err());
        assert!(ManagedSessionConfig::from_json("not json").is_err());
    }
}
