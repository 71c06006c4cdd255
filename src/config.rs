use crate::reveal::{Margin, RevealOptions};
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Phone number copied by the copy buttons.
pub const DEFAULT_PHONE_NUMBER: &str = "01624342544";

#[derive(Debug, Clone)]
pub struct Config {
    // Page
    pub page_file: String,
    pub preference_file: String,

    // Copy feedback
    pub phone_number: String,
    pub copy_feedback: Duration,

    // Toast
    pub toast_duration: Duration,
    pub toast_exit: Duration,

    // WhatsApp click pulse
    pub whatsapp_pulse: Duration,

    // Scroll reveal
    pub reveal: RevealOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_file: "pages/index.json".to_string(),
            preference_file: "data/preferences.json".to_string(),
            phone_number: DEFAULT_PHONE_NUMBER.to_string(),
            copy_feedback: Duration::from_millis(2000),
            toast_duration: Duration::from_millis(3000),
            toast_exit: Duration::from_millis(300),
            whatsapp_pulse: Duration::from_millis(150),
            reveal: RevealOptions::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let threshold = match std::env::var("REVEAL_THRESHOLD") {
            Ok(raw) => {
                let value: f64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("REVEAL_THRESHOLD is not a number: '{}'", raw))?;
                if !(0.0..=1.0).contains(&value) {
                    bail!("REVEAL_THRESHOLD must be between 0 and 1, got {}", value);
                }
                value
            }
            Err(_) => defaults.reveal.threshold,
        };

        let bottom_margin = std::env::var("REVEAL_BOTTOM_MARGIN_PX")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.reveal.root_margin.bottom);

        Ok(Self {
            // Page
            page_file: std::env::var("PAGE_FILE").unwrap_or(defaults.page_file),
            preference_file: std::env::var("PREFERENCE_FILE")
                .unwrap_or(defaults.preference_file),

            // Copy feedback
            phone_number: std::env::var("PHONE_NUMBER")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.phone_number),
            copy_feedback: env_millis("COPY_FEEDBACK_MS", defaults.copy_feedback),

            // Toast
            toast_duration: env_millis("TOAST_MS", defaults.toast_duration),
            toast_exit: env_millis("TOAST_EXIT_MS", defaults.toast_exit),

            whatsapp_pulse: env_millis("WHATSAPP_PULSE_MS", defaults.whatsapp_pulse),

            // Scroll reveal
            reveal: RevealOptions {
                threshold,
                root_margin: Margin {
                    bottom: bottom_margin,
                    ..defaults.reveal.root_margin
                },
            },
        })
    }
}

fn env_millis(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        "PAGE_FILE",
        "PREFERENCE_FILE",
        "PHONE_NUMBER",
        "COPY_FEEDBACK_MS",
        "TOAST_MS",
        "TOAST_EXIT_MS",
        "WHATSAPP_PULSE_MS",
        "REVEAL_THRESHOLD",
        "REVEAL_BOTTOM_MARGIN_PX",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.phone_number, "01624342544");
        assert_eq!(config.copy_feedback, Duration::from_secs(2));
        assert_eq!(config.toast_duration, Duration::from_secs(3));
        assert_eq!(config.toast_exit, Duration::from_millis(300));
        assert_eq!(config.whatsapp_pulse, Duration::from_millis(150));
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.reveal.root_margin.bottom, -50.0);
    }

    #[test]
    #[serial]
    fn test_from_env_without_vars_matches_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config.page_file, "pages/index.json");
        assert_eq!(config.preference_file, "data/preferences.json");
        assert_eq!(config.copy_feedback, Config::default().copy_feedback);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("PHONE_NUMBER", " 01700000000 ");
        std::env::set_var("COPY_FEEDBACK_MS", "500");
        std::env::set_var("REVEAL_THRESHOLD", "0.5");
        std::env::set_var("REVEAL_BOTTOM_MARGIN_PX", "-80");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.phone_number, "01700000000");
        assert_eq!(config.copy_feedback, Duration::from_millis(500));
        assert_eq!(config.reveal.threshold, 0.5);
        assert_eq!(config.reveal.root_margin.bottom, -80.0);
        assert_eq!(config.reveal.root_margin.top, 0.0);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparseable_durations() {
        clear_env();
        std::env::set_var("TOAST_MS", "soon");
        let config = Config::from_env().unwrap();
        clear_env();
        assert_eq!(config.toast_duration, Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_threshold() {
        clear_env();
        std::env::set_var("REVEAL_THRESHOLD", "1.5");
        let result = Config::from_env();
        std::env::set_var("REVEAL_THRESHOLD", "lots");
        let unparseable = Config::from_env();
        clear_env();

        assert!(result.unwrap_err().to_string().contains("between 0 and 1"));
        assert!(unparseable.is_err());
    }
}
