use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered education levels
///
/// The derived `Ord` follows declaration order, so a posting is open to a
/// candidate when `posting.min_education <= candidate.education_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    HighSchool,
    Diploma,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 5] = [
        EducationLevel::HighSchool,
        EducationLevel::Diploma,
        EducationLevel::Bachelor,
        EducationLevel::Master,
        EducationLevel::Doctorate,
    ];

    /// Canonical lowercase name, as stored in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "highschool",
            EducationLevel::Diploma => "diploma",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Doctorate => "doctorate",
        }
    }

    /// Every level a holder of `self` qualifies for (all levels `<= self`)
    pub fn at_or_below(self) -> Vec<EducationLevel> {
        Self::ALL.into_iter().filter(|level| *level <= self).collect()
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown education level: {0}")]
pub struct UnknownEducationLevel(pub String);

impl FromStr for EducationLevel {
    type Err = UnknownEducationLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-' | '\''))
            .collect();

        match normalized.as_str() {
            "highschool" | "secondary" | "12th" => Ok(EducationLevel::HighSchool),
            "diploma" | "associate" | "associates" => Ok(EducationLevel::Diploma),
            "bachelor" | "bachelors" | "undergraduate" | "ba" | "bsc" | "btech" => {
                Ok(EducationLevel::Bachelor)
            }
            "master" | "masters" | "postgraduate" | "ma" | "msc" | "mtech" => {
                Ok(EducationLevel::Master)
            }
            "doctorate" | "phd" | "doctoral" => Ok(EducationLevel::Doctorate),
            _ => Err(UnknownEducationLevel(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for EducationLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How an internship is carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkMode {
    InPerson,
    Remote,
    Hybrid,
    Other(String),
}

impl WorkMode {
    pub fn is_remote(&self) -> bool {
        matches!(self, WorkMode::Remote)
    }

    pub fn as_str(&self) -> &str {
        match self {
            WorkMode::InPerson => "in-person",
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Other(other) => other,
        }
    }
}

impl From<&str> for WorkMode {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "in-person" | "in_person" | "in person" | "onsite" | "on-site" | "office" => {
                WorkMode::InPerson
            }
            "remote" => WorkMode::Remote,
            "hybrid" => WorkMode::Hybrid,
            other => WorkMode::Other(other.to_string()),
        }
    }
}

impl Default for WorkMode {
    fn default() -> Self {
        WorkMode::InPerson
    }
}

impl Serialize for WorkMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(WorkMode::from(raw.as_str()))
    }
}

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Round both components to 4 decimal places (about 11 m)
    pub fn rounded(&self) -> Self {
        let round4 = |v: f64| (v * 10_000.0).round() / 10_000.0;
        Self {
            latitude: round4(self.latitude),
            longitude: round4(self.longitude),
        }
    }
}

/// Document identifier as the store may emit it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RecordId {
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Text(String),
    Number(i64),
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        match value {
            RecordId::ObjectId { oid } => oid,
            RecordId::Text(s) => s,
            RecordId::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RecordId::deserialize(deserializer).map(String::from)
}

/// Posting skills arrive either as a token list or as free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    List(Vec<String>),
    Text(String),
    Other(serde_json::Value),
}

impl Skills {
    /// Flatten to text: lists joined with single spaces, anything else stringified
    pub fn to_text(&self) -> String {
        match self {
            Skills::List(items) => items.join(" "),
            Skills::Text(text) => text.clone(),
            Skills::Other(value) => value.to_string(),
        }
    }
}

impl Default for Skills {
    fn default() -> Self {
        Skills::Text(String::new())
    }
}

/// Internship posting as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "_id", alias = "id", deserialize_with = "deserialize_record_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub skills: Skills,
    pub sector: String,
    pub min_education: EducationLevel,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub mode: WorkMode,
}

impl Posting {
    /// Both coordinates, when the posting has a physical location
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Text fed to the vectorizer: title followed by the flattened skills
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.skills.to_text())
    }
}

/// Row returned by the coarse nearby query: a posting plus the
/// approximate planar distance computed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyRecord {
    #[serde(flatten)]
    pub posting: Posting,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

/// Normalized request profile
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateProfile {
    pub skills: String,
    pub sectors: Vec<String>,
    pub education_level: EducationLevel,
    pub city_name: String,
    pub max_distance_km: f64,
}

impl CandidateProfile {
    pub fn new(
        skills: &str,
        sectors: &str,
        education_level: EducationLevel,
        city_name: &str,
        max_distance_km: f64,
    ) -> Self {
        Self {
            skills: skills.to_lowercase(),
            sectors: parse_sectors(sectors),
            education_level,
            city_name: city_name.trim().to_string(),
            max_distance_km,
        }
    }
}

/// Split a comma-separated sector list into trimmed lowercase names
pub fn parse_sectors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Posting with its request-scoped scores
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub posting: Posting,
    pub coarse_distance_km: Option<f64>,
    pub distance_km: Option<f64>,
    pub similarity_score: f64,
    pub final_score: f64,
}

/// Row caps and list sizes used by the ranking pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingLimits {
    pub nearby_limit: usize,
    pub remote_limit: usize,
    pub coarse_row_cap: usize,
    pub remote_row_cap: usize,
    /// Remote pass runs while the nearby list is shorter than this
    pub fallback_threshold: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            nearby_limit: 5,
            remote_limit: 5,
            coarse_row_cap: 500,
            remote_row_cap: 10,
            fallback_threshold: 5,
        }
    }
}
