//! Intern Match - location-aware internship recommendation service
//!
//! This library provides the two-stage retrieval and ranking engine behind the
//! service: a coarse geo + attribute catalog query, an exact haversine
//! re-check, TF-IDF text similarity and a blended ranking, with a remote-only
//! fallback when too few nearby postings qualify.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, RecommendError, RecommendFailure, TfidfVectorizer, distance::haversine_distance};
pub use crate::models::{CandidateProfile, Coordinates, EducationLevel, Posting, Recommendations, RecommendRequest, WorkMode};
