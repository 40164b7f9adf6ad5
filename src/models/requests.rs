use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{CandidateProfile, EducationLevel, UnknownEducationLevel};

/// Request to recommend internships
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1))]
    pub skills: String,
    #[validate(length(min = 1))]
    pub sectors: String,
    #[validate(custom(function = "validate_education_level"))]
    pub education_level: String,
    #[validate(length(min = 1))]
    pub city_name: String,
    /// Search radius in km; the configured default applies when absent
    #[serde(default)]
    #[validate(range(max = 20000))]
    pub max_distance_km: Option<u32>,
}

fn validate_education_level(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<EducationLevel>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_education_level"))
}

impl RecommendRequest {
    /// Normalize into the profile consumed by the recommender
    pub fn to_profile(
        &self,
        default_max_distance_km: u32,
    ) -> Result<CandidateProfile, UnknownEducationLevel> {
        let education_level = self.education_level.parse()?;
        let max_distance_km = self.max_distance_km.unwrap_or(default_max_distance_km);
        Ok(CandidateProfile::new(
            &self.skills,
            &self.sectors,
            education_level,
            &self.city_name,
            max_distance_km as f64,
        ))
    }
}
