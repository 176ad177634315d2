use std::fmt;

use shared::domain::SequenceItem;

use crate::{catalog::Catalog, severity};

/// Duration that renders as a full strength bar.
const FULL_STRENGTH_SECS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileNote {
    pub position: usize,
    pub scent_name: String,
    pub duration_secs: u32,
    pub location: Option<String>,
    /// Percentage of a full bar; may exceed 100 for long notes.
    pub strength: u32,
}

impl fmt::Display for ProfileNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} ({}s)",
            self.position, self.scent_name, self.duration_secs
        )?;
        if let Some(location) = &self.location {
            write!(f, " [{location}]")?;
        }
        Ok(())
    }
}

/// Presentation-neutral result of a composition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScentProfile {
    pub score: f64,
    pub needle_angle: f64,
    pub notes: Vec<ProfileNote>,
    pub justification: Option<String>,
}

impl ScentProfile {
    pub fn build(
        score: f64,
        sequence: &[SequenceItem],
        catalog: &Catalog,
        justification: Option<String>,
    ) -> Self {
        let notes = sequence
            .iter()
            .enumerate()
            .map(|(index, item)| ProfileNote {
                position: index + 1,
                scent_name: item.scent_name.clone(),
                duration_secs: item.scent_duration,
                location: catalog
                    .get(&item.scent_name)
                    .and_then(|entry| entry.device_location())
                    .map(str::to_string),
                strength: strength_percent(item.scent_duration),
            })
            .collect();

        Self {
            score,
            needle_angle: severity::needle_angle(score),
            notes,
            justification,
        }
    }
}

fn strength_percent(duration_secs: u32) -> u32 {
    (f64::from(duration_secs) / FULL_STRENGTH_SECS * 100.0).round() as u32
}
