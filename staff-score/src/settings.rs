//! Export configuration.
//!
//! Missing fields take the defaults, so an empty JSON object is valid:
//!
//! ```
//! use staff_score::settings::ExportSettings;
//!
//! let settings = ExportSettings::from_json(r#"{"channel": 9}"#).unwrap();
//! assert_eq!(settings.channel, 9);
//! assert_eq!(settings.velocity, 100);
//! assert_eq!(settings.ticks_per_quarter, 960);
//! ```

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

#[derive(Derivative, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default)]
pub struct ExportSettings {
    /// MIDI channel, 0..=15.
    #[derivative(Default(value = "0"))]
    pub channel: u8,
    #[derivative(Default(value = "100"))]
    pub velocity: u8,
    /// Resolution, used when positions are converted to ticks.
    #[derivative(Default(value = "960"))]
    pub ticks_per_quarter: u32,
}
impl ExportSettings {
    pub fn from_json(json: &str) -> ScoreResult<Self> {
        let settings: Self = serde_json::from_str(json).map_err(|err| {
            ScoreError::Settings(format!("Could not read export settings: {err}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }
    pub fn to_json(&self) -> ScoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| {
            ScoreError::Settings(format!("Could not write export settings: {err}"))
        })
    }

    pub fn validate(&self) -> ScoreResult<()> {
        if self.channel > 15 {
            return Err(ScoreError::InvalidChannel(self.channel));
        }
        if self.velocity > 127 {
            return Err(ScoreError::Settings(format!(
                "velocity should be in 0..=127, got {}",
                self.velocity
            )));
        }
        if self.ticks_per_quarter == 0 {
            return Err(ScoreError::Settings(
                "ticks per quarter can not be zero".to_string(),
            ));
        }
        Ok(())
    }
}
