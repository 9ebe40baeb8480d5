use crate::dosha::{score, DoshaResult, QuestionBank};
use crate::error::{JournalError, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    InProgress,
    Complete(DoshaResult),
}

/// One pass through the dosha questionnaire.
///
/// Answers can be toggled until the quiz is submitted. Submission snapshots
/// the result; only [`DoshaQuiz::restart`] reopens the quiz.
#[derive(Debug, Clone)]
pub struct DoshaQuiz<'a> {
    bank: &'a QuestionBank,
    selected: BTreeSet<u32>,
    submitted: Option<DoshaResult>,
}

impl<'a> DoshaQuiz<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            selected: BTreeSet::new(),
            submitted: None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        match (self.submitted, self.selected.is_empty()) {
            (Some(result), _) => QuizPhase::Complete(result),
            (None, true) => QuizPhase::Idle,
            (None, false) => QuizPhase::InProgress,
        }
    }

    /// Flip a question's answer. Returns whether it is now selected.
    pub fn toggle(&mut self, id: u32) -> Result<bool> {
        if self.submitted.is_some() {
            return Err(JournalError::QuizComplete);
        }
        if self.bank.get(id).is_none() {
            return Err(JournalError::UnknownQuestion(id));
        }
        if self.selected.remove(&id) {
            Ok(false)
        } else {
            self.selected.insert(id);
            Ok(true)
        }
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> &BTreeSet<u32> {
        &self.selected
    }

    /// (answered, total) for a progress bar.
    pub fn progress(&self) -> (usize, usize) {
        (self.selected.len(), self.bank.len())
    }

    /// Running tally shown while the quiz is still open.
    pub fn live_counts(&self) -> DoshaResult {
        score(self.bank, &self.selected)
    }

    pub fn submit(&mut self) -> Result<DoshaResult> {
        if let Some(result) = self.submitted {
            return Ok(result);
        }
        if self.selected.is_empty() {
            return Err(JournalError::EmptySubmission);
        }
        let result = score(self.bank, &self.selected);
        self.submitted = Some(result);
        Ok(result)
    }

    pub fn restart(&mut self) {
        self.selected.clear();
        self.submitted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dosha::{Dosha, DoshaQuestion};
    use assert_matches::assert_matches;

    fn bank() -> QuestionBank {
        let questions = (1..=9)
            .map(|id| DoshaQuestion {
                id,
                text: format!("question {id}"),
                category: Dosha::ALL[((id - 1) / 3) as usize],
            })
            .collect();
        QuestionBank::new(1, questions)
    }

    #[test]
    fn test_starts_idle() {
        let bank = bank();
        let quiz = DoshaQuiz::new(&bank);
        assert_eq!(quiz.phase(), QuizPhase::Idle);
        assert_eq!(quiz.progress(), (0, 9));
    }

    #[test]
    fn test_toggling_moves_between_idle_and_in_progress() {
        let bank = bank();
        let mut quiz = DoshaQuiz::new(&bank);

        assert!(quiz.toggle(4).unwrap());
        assert_eq!(quiz.phase(), QuizPhase::InProgress);
        assert!(quiz.is_selected(4));

        assert!(!quiz.toggle(4).unwrap());
        assert_eq!(quiz.phase(), QuizPhase::Idle);
    }

    #[test]
    fn test_unknown_question_is_rejected() {
        let bank = bank();
        let mut quiz = DoshaQuiz::new(&bank);
        assert_matches!(quiz.toggle(42), Err(JournalError::UnknownQuestion(42)));
        assert_eq!(quiz.phase(), QuizPhase::Idle);
    }

    #[test]
    fn test_empty_submission_is_rejected() {
        let bank = bank();
        let mut quiz = DoshaQuiz::new(&bank);
        assert_matches!(quiz.submit(), Err(JournalError::EmptySubmission));
        assert_eq!(quiz.phase(), QuizPhase::Idle);
    }

    #[test]
    fn test_submit_snapshots_and_locks() {
        let bank = bank();
        let mut quiz = DoshaQuiz::new(&bank);
        for id in [4, 5, 7] {
            quiz.toggle(id).unwrap();
        }
        assert_eq!(quiz.live_counts().pitta, 2);

        let result = quiz.submit().unwrap();
        assert_eq!((result.vata, result.pitta, result.kapha), (0, 2, 1));
        assert_eq!(result.dominant, Dosha::Pitta);
        assert_eq!(quiz.phase(), QuizPhase::Complete(result));

        assert_matches!(quiz.toggle(1), Err(JournalError::QuizComplete));
        assert_eq!(quiz.submit().unwrap(), result);
    }

    #[test]
    fn test_restart_returns_to_idle() {
        let bank = bank();
        let mut quiz = DoshaQuiz::new(&bank);
        quiz.toggle(1).unwrap();
        quiz.submit().unwrap();

        quiz.restart();
        assert_eq!(quiz.phase(), QuizPhase::Idle);
        assert!(quiz.selected().is_empty());
        assert!(quiz.toggle(1).unwrap());
    }

    #[test]
    fn test_selecting_everything_stays_in_progress() {
        let bank = bank();
        let mut quiz = DoshaQuiz::new(&bank);
        for id in 1..=9 {
            quiz.toggle(id).unwrap();
        }
        assert_eq!(quiz.phase(), QuizPhase::InProgress);
        assert_eq!(quiz.submit().unwrap().dominant, Dosha::Vata);
    }
}
