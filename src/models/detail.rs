use serde::Serialize;

use super::{CastMember, MovieDetail};
use crate::error::AppError;

/// Number of cast members shown on the detail screen
pub const CAST_LIMIT: usize = 5;

/// Why a movie detail could not be shown
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetailErrorKind {
    NotFound,
    Unavailable,
}

impl From<&AppError> for DetailErrorKind {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::NotFound(_) => DetailErrorKind::NotFound,
            _ => DetailErrorKind::Unavailable,
        }
    }
}

/// State of the movie detail screen
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailState {
    Loading,
    Success {
        details: MovieDetail,
        director: Option<String>,
        cast: Vec<CastMember>,
    },
    Error {
        kind: DetailErrorKind,
    },
}

impl DetailState {
    pub fn details(&self) -> Option<&MovieDetail> {
        match self {
            DetailState::Success { details, .. } => Some(details),
            _ => None,
        }
    }
}
