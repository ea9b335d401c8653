use uuid::Uuid;

use crate::db::{RatingStats, ReviewExt, StyleExt};

/// Derived rating fields stored on a style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal, 0 when there are no reviews.
    pub average: f64,
    pub count: i32,
}

impl RatingSummary {
    pub fn from_stats(stats: RatingStats) -> Self {
        let average = match stats.mean {
            Some(mean) if stats.count > 0 => round_to_tenth(mean),
            _ => 0.0,
        };

        RatingSummary {
            average,
            count: stats.count as i32,
        }
    }

    pub fn from_ratings(ratings: &[i32]) -> Self {
        let count = ratings.len() as i64;
        let mean = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / count as f64)
        };

        RatingSummary::from_stats(RatingStats { count, mean })
    }
}

/// Rounds half away from zero, so 3.25 becomes 3.3.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Recompute a style's average rating and review count from its reviews.
///
/// Runs after every review create, update and delete. Failures are logged
/// and swallowed: the reviews stay correct and the next write repairs the
/// cached fields.
pub async fn recompute_aggregate<D>(db: &D, style_id: Uuid)
where
    D: StyleExt + ReviewExt,
{
    let stats = match db.get_rating_stats(style_id).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(%style_id, "DB error, aggregating ratings: {}", e);
            return;
        }
    };

    let summary = RatingSummary::from_stats(stats);

    match db.update_style_rating(style_id, summary).await {
        Ok(()) => tracing::debug!(
            %style_id,
            average = summary.average,
            count = summary.count,
            "style rating recomputed"
        ),
        Err(e) => tracing::error!(%style_id, "DB error, updating average rating: {}", e),
    }
}
