// src/scoring/scorer.rs

use rust_decimal::Decimal;

use super::ScoringError;

/// Correctness tally of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub correct_count: i64,
    pub total_questions: i64,
    /// 0..=100, two decimals.
    pub percentage: Decimal,
}

/// Counts correct outcomes and turns them into a percentage of
/// `total_questions`.
///
/// The denominator is the number of questions in the quiz, not the number of
/// outcomes, so unanswered questions count as wrong. The result is rounded to
/// two decimals with banker's rounding, the precision the attempt row stores.
pub fn tally<I>(outcomes: I, total_questions: i64) -> Result<Tally, ScoringError>
where
    I: IntoIterator<Item = bool>,
{
    if total_questions <= 0 {
        return Err(ScoringError::InvalidArgument(format!(
            "total_questions must be positive, got {}",
            total_questions
        )));
    }

    let correct_count = outcomes.into_iter().filter(|correct| *correct).count() as i64;
    if correct_count > total_questions {
        return Err(ScoringError::InvalidArgument(format!(
            "{} correct answers for {} questions",
            correct_count, total_questions
        )));
    }

    let percentage = (Decimal::from(correct_count) * Decimal::from(100)
        / Decimal::from(total_questions))
    .round_dp(2);

    Ok(Tally {
        correct_count,
        total_questions,
        percentage,
    })
}

/// `100 * count(correct) / total_questions`, two decimals.
pub fn score<I>(outcomes: I, total_questions: i64) -> Result<Decimal, ScoringError>
where
    I: IntoIterator<Item = bool>,
{
    tally(outcomes, total_questions).map(|t| t.percentage)
}

pub fn is_passing(score: Decimal, passing_score: i64) -> bool {
    score >= Decimal::from(passing_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_perfect() {
        let score = score([true, true, true, true], 4).unwrap();
        assert_eq!(score, Decimal::from(100));
    }

    #[test]
    fn test_score_half() {
        let score = score([true, false], 2).unwrap();
        assert_eq!(score, Decimal::from(50));
    }

    #[test]
    fn test_score_zero() {
        assert_eq!(score([false, false, false], 3).unwrap(), Decimal::ZERO);
        assert_eq!(score([], 5).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_score_rounds_to_two_decimals() {
        assert_eq!(score([true], 3).unwrap(), Decimal::new(3333, 2));
        assert_eq!(score([true, true], 3).unwrap(), Decimal::new(6667, 2));
        assert_eq!(score([true], 7).unwrap(), Decimal::new(1429, 2));
    }

    #[test]
    fn test_unanswered_questions_count_against_the_score() {
        // 2 answered, both right, but the quiz has 4 questions.
        let tally = tally([true, true], 4).unwrap();
        assert_eq!(tally.correct_count, 2);
        assert_eq!(tally.total_questions, 4);
        assert_eq!(tally.percentage, Decimal::from(50));
    }

    #[test]
    fn test_score_matches_ratio_for_all_small_quizzes() {
        for n in 1..=12i64 {
            for k in 0..=n {
                let outcomes = (0..n).map(|i| i < k);
                let got = score(outcomes, n).unwrap();
                let expected = Decimal::from(100 * k) / Decimal::from(n);
                let diff = (got - expected).abs();
                assert!(diff <= Decimal::new(5, 3), "k={} n={} got={}", k, n, got);
            }
        }
    }

    #[test]
    fn test_score_rejects_empty_quiz() {
        let err = score([true], 0).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidArgument(_)));

        let err = score([], -1).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidArgument(_)));
    }

    #[test]
    fn test_score_rejects_more_correct_than_questions() {
        let err = score([true, true, true], 2).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidArgument(_)));
    }

    #[test]
    fn test_pass_threshold() {
        assert!(is_passing(Decimal::from(60), 60));
        assert!(!is_passing(Decimal::new(5999, 2), 60));
        assert!(is_passing(Decimal::from(100), 60));
    }
}
