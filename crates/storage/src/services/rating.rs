//! Rating arithmetic and ledger maintenance.

use std::cmp::Ordering;

use sqlx::PgPool;

use crate::dto::ratings::RatingRebuildSummary;
use crate::error::Result;
use crate::repository::rating::RatingRepository;

pub const DEFAULT_ELO_K_FACTOR: f64 = 32.0;

/// Fixed rating change for a finishing place
pub fn placement_delta(place: i32) -> i32 {
    match place {
        1 => 20,
        2 => 10,
        3 => 0,
        _ => -10,
    }
}

/// Probability that a player rated `rating` beats one rated `opponent`
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(opponent - rating) / 400.0))
}

/// How results translate into rating changes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RatingStrategy {
    /// +20 / +10 / 0 / -10 by place, score is ignored
    #[default]
    Placement,
    /// Pairwise Elo over every other entrant of the event
    Elo { k_factor: f64 },
}

impl RatingStrategy {
    /// Parse a strategy name as found in configuration
    pub fn from_name(name: &str, k_factor: f64) -> std::result::Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "placement" => Ok(Self::Placement),
            "elo" if k_factor > 0.0 => Ok(Self::Elo { k_factor }),
            "elo" => Err(format!("Elo K factor must be positive, got {}", k_factor)),
            other => Err(format!(
                "Unknown rating strategy '{}': expected placement or elo",
                other
            )),
        }
    }

    /// One change per standing, in the same order
    pub fn rating_changes(&self, standings: &[Standing]) -> Vec<i32> {
        match *self {
            Self::Placement => standings.iter().map(|s| placement_delta(s.place)).collect(),
            Self::Elo { k_factor } => elo_changes(standings, k_factor),
        }
    }
}

/// A participant's place and rating before the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub place: i32,
    pub rating: i32,
}

fn elo_changes(standings: &[Standing], k_factor: f64) -> Vec<i32> {
    let n = standings.len();
    if n < 2 {
        return vec![0; n];
    }

    standings
        .iter()
        .enumerate()
        .map(|(i, me)| {
            let total: f64 = standings
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| {
                    // lower place wins
                    let actual = match me.place.cmp(&other.place) {
                        Ordering::Less => 1.0,
                        Ordering::Equal => 0.5,
                        Ordering::Greater => 0.0,
                    };
                    actual - expected_score(me.rating, other.rating)
                })
                .sum();
            (k_factor * total / (n - 1) as f64).round() as i32
        })
        .collect()
}

/// Recompute every current rating from the ledgers
pub async fn rebuild_ratings(pool: &PgPool) -> Result<RatingRebuildSummary> {
    let summary = RatingRepository::new(pool).rebuild().await?;

    tracing::info!(
        "Rebuilt ratings: {} users, {} teams",
        summary.users_updated,
        summary.teams_updated
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(place: i32, rating: i32) -> Standing {
        Standing { place, rating }
    }

    #[test]
    fn test_placement_table() {
        assert_eq!(placement_delta(1), 20);
        assert_eq!(placement_delta(2), 10);
        assert_eq!(placement_delta(3), 0);
        assert_eq!(placement_delta(4), -10);
        assert_eq!(placement_delta(17), -10);
    }

    #[test]
    fn test_placement_ignores_prior_rating() {
        let changes = RatingStrategy::Placement
            .rating_changes(&[standing(1, 400), standing(2, 2400), standing(5, 1000)]);
        assert_eq!(changes, vec![20, 10, -10]);
    }

    #[test]
    fn test_expected_score_is_symmetric() {
        assert!((expected_score(1000, 1000) - 0.5).abs() < 1e-9);
        let sum = expected_score(1200, 1000) + expected_score(1000, 1200);
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(expected_score(1200, 1000) > 0.5);
    }

    #[test]
    fn test_elo_two_equal_players() {
        let strategy = RatingStrategy::Elo { k_factor: 32.0 };
        let changes = strategy.rating_changes(&[standing(1, 1000), standing(2, 1000)]);
        assert_eq!(changes, vec![16, -16]);
    }

    #[test]
    fn test_elo_upset_moves_more() {
        let strategy = RatingStrategy::Elo { k_factor: 32.0 };
        let favourite_wins = strategy.rating_changes(&[standing(1, 1400), standing(2, 1000)]);
        let underdog_wins = strategy.rating_changes(&[standing(2, 1400), standing(1, 1000)]);
        assert!(underdog_wins[1] > favourite_wins[0]);
        assert!(underdog_wins[0] < 0);
    }

    #[test]
    fn test_elo_single_entrant_keeps_rating() {
        let strategy = RatingStrategy::Elo { k_factor: 32.0 };
        assert_eq!(strategy.rating_changes(&[standing(1, 1000)]), vec![0]);
        assert!(strategy.rating_changes(&[]).is_empty());
    }

    #[test]
    fn test_strategy_from_name() {
        assert_eq!(
            RatingStrategy::from_name("placement", 32.0),
            Ok(RatingStrategy::Placement)
        );
        assert_eq!(
            RatingStrategy::from_name("ELO", 24.0),
            Ok(RatingStrategy::Elo { k_factor: 24.0 })
        );
        assert!(RatingStrategy::from_name("elo", 0.0).is_err());
        assert!(RatingStrategy::from_name("glicko", 32.0).is_err());
    }
}
