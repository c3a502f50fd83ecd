// src/scoring/leaderboard.rs

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::{
    models::attempt::{LeaderboardEntry, LeaderboardRow},
    repository::QuizStore,
};

use super::ScoringError;

/// Highest score per quiz, recomputed from every recorded attempt.
pub async fn leaderboard(store: &dyn QuizStore) -> Result<Vec<LeaderboardEntry>, ScoringError> {
    let rows = store.leaderboard_rows().await?;
    tracing::debug!("Aggregating leaderboard over {} attempts", rows.len());
    Ok(highest_scores(rows))
}

/// Picks the winning attempt of each quiz.
///
/// Ties on score go to the earliest attempt, then to the lowest attempt id.
/// Quizzes without attempts never appear. Output is ordered by quiz id.
pub fn highest_scores<I>(rows: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = LeaderboardRow>,
{
    let mut best: BTreeMap<i64, LeaderboardRow> = BTreeMap::new();

    for row in rows {
        let outranks = best
            .get(&row.quiz_id)
            .is_none_or(|current| rank(&row, current) == Ordering::Greater);
        if outranks {
            best.insert(row.quiz_id, row);
        }
    }

    best.into_values()
        .map(|row| LeaderboardEntry {
            quiz_id: row.quiz_id,
            title: row.quiz_title,
            highest_score: row.score,
            student_email: row.student_email,
            student_first_name: row.student_first_name,
            student_last_name: row.student_last_name,
        })
        .collect()
}

/// `Greater` means `a` outranks `b`.
fn rank(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    a.score
        .cmp(&b.score)
        .then_with(|| b.attempt_time.cmp(&a.attempt_time))
        .then_with(|| b.attempt_id.cmp(&a.attempt_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
    }

    fn row(quiz_id: i64, attempt_id: i64, score: i64, minute: u32, email: &str) -> LeaderboardRow {
        LeaderboardRow {
            quiz_id,
            quiz_title: format!("Quiz {}", quiz_id),
            attempt_id,
            score: Decimal::from(score),
            attempt_time: at(minute),
            student_email: email.to_string(),
            student_first_name: "First".to_string(),
            student_last_name: "Last".to_string(),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_board() {
        assert!(highest_scores(Vec::new()).is_empty());
    }

    #[test]
    fn test_tie_goes_to_earliest_attempt() {
        let rows = vec![
            row(1, 10, 40, 0, "a@example.com"),
            row(1, 12, 90, 5, "late@example.com"),
            row(1, 11, 90, 2, "early@example.com"),
        ];

        let board = highest_scores(rows);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].highest_score, Decimal::from(90));
        assert_eq!(board[0].student_email, "early@example.com");
    }

    #[test]
    fn test_tie_on_time_goes_to_lowest_attempt_id() {
        let rows = vec![
            row(1, 21, 75, 3, "second@example.com"),
            row(1, 20, 75, 3, "first@example.com"),
        ];

        let board = highest_scores(rows);
        assert_eq!(board[0].student_email, "first@example.com");
    }

    #[test]
    fn test_one_entry_per_quiz_ordered_by_quiz() {
        let rows = vec![
            row(3, 1, 10, 0, "c@example.com"),
            row(1, 2, 55, 0, "a@example.com"),
            row(3, 3, 30, 1, "d@example.com"),
            row(2, 4, 100, 0, "b@example.com"),
        ];

        let board = highest_scores(rows);
        let ids: Vec<i64> = board.iter().map(|e| e.quiz_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(board[2].highest_score, Decimal::from(30));
        assert_eq!(board[2].student_email, "d@example.com");
        assert_eq!(board[1].title, "Quiz 2");
    }

    #[test]
    fn test_result_does_not_depend_on_row_order() {
        let mut rows = vec![
            row(1, 10, 40, 0, "a@example.com"),
            row(1, 11, 90, 1, "b@example.com"),
            row(1, 12, 90, 2, "c@example.com"),
        ];
        let forward = highest_scores(rows.clone());
        rows.reverse();
        let backward = highest_scores(rows);
        assert_eq!(forward, backward);
    }
}
