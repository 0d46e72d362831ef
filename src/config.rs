use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::{Club, Court};

/// Club configuration file: `[club]` plus any number of `[[courts]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClubFile {
    pub club: Club,
    #[serde(default)]
    pub courts: Vec<Court>,
}

pub fn parse_club(content: &str) -> Result<ClubFile> {
    let file: ClubFile = toml::from_str(content)?;
    // The engine itself does not validate duration; guard at the load
    // boundary so a zero value cannot reach the generator loop.
    if file.club.duration == 0 {
        bail!("club.duration must be at least 1 minute");
    }
    Ok(file)
}

pub fn load_club(path: &Path) -> Result<ClubFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_club(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [club]
        name = "Padel Nord"
        opening_hour = 8
        closing_hour = 22
        duration = 90
        default_price = 24.0

        [club.shifts]
        "1" = [{ start = "08:00", end = "14:00" }, { start = "16:00", end = "22:00" }]
        "7" = [{ start = "10:00", end = "14:00" }]

        [[courts]]
        id = "7d3f8a94-1f64-4f6c-9d3e-6f3a82f0a1c1"
        name = "Court A"

        [[courts]]
        id = "9b2c6e70-4f2b-4f43-b9b1-0f3d0f9a2b22"
        name = "Court B"
        price = 30.0
        is_active = false
    "#;

    #[test]
    fn test_parse_sample_config() {
        let file = parse_club(SAMPLE).unwrap();
        assert_eq!(file.club.name, "Padel Nord");
        assert_eq!(file.club.duration, 90);
        assert_eq!(file.club.shifts["1"].len(), 2);
        assert_eq!(file.club.shifts["7"][0].start, "10:00");
        assert_eq!(file.courts.len(), 2);
        assert!(file.courts[0].is_active);
        assert_eq!(file.courts[0].price, None);
        assert!(!file.courts[1].is_active);
        assert_eq!(file.courts[1].price, Some(30.0));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let broken = SAMPLE.replace("duration = 90", "duration = 0");
        assert!(parse_club(&broken).is_err());
    }

    #[test]
    fn test_missing_shifts_table_is_fine() {
        let minimal = r#"
            [club]
            name = "Padel Sud"
            opening_hour = 9
            closing_hour = 21
            duration = 60
            default_price = 20.0
        "#;
        let file = parse_club(minimal).unwrap();
        assert!(file.club.shifts.is_empty());
        assert!(file.courts.is_empty());
    }
}
