use super::angle::AngleEvaluation;
use super::connection::ConnectionEvaluation;
use super::{CriterionScore, ScoreStatus};
use crate::constants::{GOOD_TIER, GREAT_TIER, MASTERED_TIER, NEEDS_WORK_TIER};

/// One-line verdict for the whole pose, tiered by overall accuracy
#[must_use]
pub fn summary(overall: f64, angle_scores: &[CriterionScore]) -> String {
    let ranked = worst_first(angle_scores);
    let worst = |n: usize| -> Vec<String> { ranked.iter().take(n).map(|s| s.name.to_lowercase()).collect() };

    if overall >= MASTERED_TIER {
        "Excellent pose! You've mastered this position!".to_string()
    } else if overall >= GREAT_TIER {
        match worst(1).first() {
            Some(name) => format!("Great job! Very close to perfect form. Fine-tune your {name}."),
            None => "Great job! Very close to perfect form. Keep it up!".to_string(),
        }
    } else if overall >= GOOD_TIER {
        match worst(1).first() {
            Some(name) => format!("Good effort! Focus on improving your {name}."),
            None => "Good pose! A few minor adjustments will get you there.".to_string(),
        }
    } else if overall >= NEEDS_WORK_TIER {
        match worst(2).as_slice() {
            [first, second] => format!("Needs work. Focus on: {first} and {second}."),
            _ => "Needs improvement. Check the feedback for specific angles.".to_string(),
        }
    } else {
        "Keep practicing! Review the reference pose and try again.".to_string()
    }
}

/// Correction hint for one scored angle
#[must_use]
pub fn angle_line(score: &CriterionScore) -> String {
    let symbol = score.status.symbol();
    let name = &score.name;
    let actual = score.actual.unwrap_or(score.target);
    let deviation = score.deviation.unwrap_or(0.0);
    let too_open = actual > score.target;

    match score.status {
        ScoreStatus::Excellent => format!("{symbol} {name}: Perfect! ({actual:.1}°)"),
        ScoreStatus::Good if too_open => format!("{symbol} {name}: Good. Try decreasing by {deviation:.0}°"),
        ScoreStatus::Good => format!("{symbol} {name}: Good. Try increasing by {deviation:.0}°"),
        ScoreStatus::NeedsImprovement if too_open => format!("{symbol} {name}: Too open. Decrease by {deviation:.0}°"),
        ScoreStatus::NeedsImprovement => format!("{symbol} {name}: Too closed. Increase by {deviation:.0}°"),
        ScoreStatus::Poor if too_open => format!("{symbol} {name}: Much too open! Decrease by {deviation:.0}°"),
        ScoreStatus::Poor => format!("{symbol} {name}: Much too closed! Increase by {deviation:.0}°"),
        ScoreStatus::NotDetected | ScoreStatus::NotVisible => {
            format!("{symbol} {name}: {}", score.message.as_deref().unwrap_or("Not measured"))
        }
    }
}

/// Hint for one connection criterion
#[must_use]
pub fn connection_line(score: &CriterionScore) -> String {
    let symbol = score.status.symbol();
    let name = &score.name;

    match (score.status, score.actual) {
        (ScoreStatus::Excellent, _) => format!("{symbol} {name}: Connected!"),
        (ScoreStatus::NotDetected | ScoreStatus::NotVisible, _) | (_, None) => {
            format!("{symbol} {name}: {}", score.message.as_deref().unwrap_or("Not measured"))
        }
        (_, Some(distance)) => format!(
            "{symbol} {name}: Bring closer together ({distance:.2} apart, aim for under {:.2})",
            score.target
        ),
    }
}

/// Full feedback list: the summary first, then angle hints worst-first,
/// then connection hints in authored order.
#[must_use]
pub fn generate(overall: f64, angles: &AngleEvaluation, connections: Option<&ConnectionEvaluation>) -> Vec<String> {
    let mut feedback = vec![summary(overall, &angles.scores)];
    feedback.extend(worst_first(&angles.scores).into_iter().map(angle_line));
    if let Some(connections) = connections {
        feedback.extend(connections.scores.iter().map(connection_line));
    }
    feedback
}

fn worst_first(scores: &[CriterionScore]) -> Vec<&CriterionScore> {
    let mut ranked: Vec<&CriterionScore> = scores.iter().collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked
}
