//! Lesson progress for the learning dashboard.
//!
//! Each lesson moves `NotStarted → InProgress → Completed`, reported as
//! 0.0 / 0.5 / 1.0. A lesson with a quiz completes when the quiz is answered
//! correctly; a lesson without one completes when its target compound is
//! produced while the lesson is in progress. The tracker is fed from
//! workspace events by whoever owns it.

use crate::id::LessonId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    /// Formula the guided lesson asks the learner to build, if any.
    #[serde(default)]
    pub target_formula: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub quiz: Option<Quiz>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LessonStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    pub fn progress(self) -> f64 {
        match self {
            LessonStatus::NotStarted => 0.0,
            LessonStatus::InProgress => 0.5,
            LessonStatus::Completed => 1.0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("lesson not found: {0:?}")]
    LessonNotFound(LessonId),
    #[error("lesson {0:?} has no quiz")]
    NoQuiz(LessonId),
    #[error("duplicate lesson id: {0:?}")]
    DuplicateId(LessonId),
}

/// Tracks the status of every known lesson.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    lessons: Vec<Lesson>,
    states: HashMap<LessonId, LessonStatus>,
}

impl ProgressTracker {
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, ProgressError> {
        let mut states = HashMap::new();
        for lesson in &lessons {
            if states.insert(lesson.id, LessonStatus::NotStarted).is_some() {
                return Err(ProgressError::DuplicateId(lesson.id));
            }
        }
        Ok(Self { lessons, states })
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn status(&self, id: LessonId) -> Option<LessonStatus> {
        self.states.get(&id).copied()
    }

    /// 0.0 for unknown lessons.
    pub fn progress(&self, id: LessonId) -> f64 {
        self.status(id).map(LessonStatus::progress).unwrap_or(0.0)
    }

    /// Mark a lesson as opened. Completed lessons stay completed.
    pub fn start(&mut self, id: LessonId) -> Result<(), ProgressError> {
        let state = self
            .states
            .get_mut(&id)
            .ok_or(ProgressError::LessonNotFound(id))?;
        if *state == LessonStatus::NotStarted {
            *state = LessonStatus::InProgress;
        }
        Ok(())
    }

    /// Check a quiz answer. A correct answer completes the lesson; a wrong
    /// one leaves it in progress.
    pub fn answer_quiz(&mut self, id: LessonId, answer: &str) -> Result<bool, ProgressError> {
        let lesson = self
            .lessons
            .iter()
            .find(|l| l.id == id)
            .ok_or(ProgressError::LessonNotFound(id))?;
        let quiz = lesson.quiz.as_ref().ok_or(ProgressError::NoQuiz(id))?;
        let correct = quiz.correct == answer;

        let state = self
            .states
            .get_mut(&id)
            .ok_or(ProgressError::LessonNotFound(id))?;
        if correct {
            *state = LessonStatus::Completed;
        } else if *state == LessonStatus::NotStarted {
            *state = LessonStatus::InProgress;
        }
        Ok(correct)
    }

    /// Feed a produced formula. Completes in-progress quiz-less lessons
    /// targeting it and returns their ids.
    pub fn observe_production(&mut self, formula: &str) -> Vec<LessonId> {
        let mut completed = Vec::new();
        for lesson in &self.lessons {
            if lesson.quiz.is_some() || lesson.target_formula.as_deref() != Some(formula) {
                continue;
            }
            if let Some(state) = self.states.get_mut(&lesson.id)
                && *state == LessonStatus::InProgress
            {
                *state = LessonStatus::Completed;
                completed.push(lesson.id);
            }
        }
        completed
    }

    /// Mean progress across all lessons, as a percentage.
    pub fn overall_percent(&self) -> f64 {
        if self.lessons.is_empty() {
            return 0.0;
        }
        let total: f64 = self.lessons.iter().map(|l| self.progress(l.id)).sum();
        total / self.lessons.len() as f64 * 100.0
    }

    pub fn guided_hint(&self, id: LessonId) -> Option<&str> {
        self.lesson(id).and_then(|l| l.hint.as_deref())
    }
}
