use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::GenreId;

/// Score change applied to each genre of a liked movie
pub const LIKE_SCORE_CHANGE: i64 = 5;
/// Score change applied to each genre of a disliked movie
pub const DISLIKE_SCORE_CHANGE: i64 = -5;

/// A user's verdict on a movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Like,
    Dislike,
}

impl Rating {
    /// Score delta applied to every genre of the rated movie
    pub fn delta(self) -> i64 {
        match self {
            Rating::Like => LIKE_SCORE_CHANGE,
            Rating::Dislike => DISLIKE_SCORE_CHANGE,
        }
    }
}

/// Snapshot of every stored genre affinity score
///
/// Genres without an entry have an implicit score of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreScores(HashMap<GenreId, i64>);

impl GenreScores {
    pub fn new(scores: HashMap<GenreId, i64>) -> Self {
        Self(scores)
    }

    pub fn get(&self, genre_id: GenreId) -> i64 {
        self.0.get(&genre_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GenreId, i64)> + '_ {
        self.0.iter().map(|(id, score)| (*id, *score))
    }

    /// Genres with a positive score
    pub fn liked(&self) -> BTreeSet<GenreId> {
        self.select(|score| score > 0)
    }

    /// Genres with a negative score
    pub fn disliked(&self) -> BTreeSet<GenreId> {
        self.select(|score| score < 0)
    }

    fn select(&self, predicate: impl Fn(i64) -> bool) -> BTreeSet<GenreId> {
        self.iter()
            .filter(|(_, score)| predicate(*score))
            .map(|(id, _)| id)
            .collect()
    }

    /// Labelled entries for the preferences view, sorted by label
    ///
    /// Genres missing from `names` are labelled with their decimal id.
    pub fn entries(&self, names: &HashMap<GenreId, String>) -> Vec<PreferenceEntry> {
        let mut entries: Vec<PreferenceEntry> = self
            .iter()
            .map(|(id, score)| {
                let label = names.get(&id).cloned().unwrap_or_else(|| id.to_string());
                PreferenceEntry::new(id, label, score)
            })
            .collect();
        entries.sort_by(|a, b| a.label.cmp(&b.label).then(a.genre_id.cmp(&b.genre_id)));
        entries
    }
}

impl FromIterator<(GenreId, i64)> for GenreScores {
    fn from_iter<T: IntoIterator<Item = (GenreId, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the preferences view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferenceEntry {
    pub genre_id: GenreId,
    pub label: String,
    pub score: i64,
    /// Score as shown on the badge: "+10", "0", "-5"
    pub display: String,
}

impl PreferenceEntry {
    pub fn new(genre_id: GenreId, label: String, score: i64) -> Self {
        let display = if score > 0 {
            format!("+{}", score)
        } else {
            score.to_string()
        };
        Self {
            genre_id,
            label,
            score,
            display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_delta() {
        assert_eq!(Rating::Like.delta(), 5);
        assert_eq!(Rating::Dislike.delta(), -5);
    }

    #[test]
    fn test_partition_ignores_zero_scores() {
        let scores: GenreScores = [(28, 10), (18, -5), (35, 0)].into_iter().collect();

        assert_eq!(scores.liked(), BTreeSet::from([28]));
        assert_eq!(scores.disliked(), BTreeSet::from([18]));
        assert_eq!(scores.get(35), 0);
        assert_eq!(scores.get(99), 0);
    }

    #[test]
    fn test_entries_fall_back_to_genre_id() {
        let scores: GenreScores = [(28, 10), (10752, -5)].into_iter().collect();
        let names = HashMap::from([(28, "Action".to_string())]);

        let entries = scores.entries(&names);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "10752");
        assert_eq!(entries[0].display, "-5");
        assert_eq!(entries[1].label, "Action");
        assert_eq!(entries[1].display, "+10");
    }

    #[test]
    fn test_zero_score_display_has_no_sign() {
        assert_eq!(PreferenceEntry::new(1, "Drama".into(), 0).display, "0");
    }
}
