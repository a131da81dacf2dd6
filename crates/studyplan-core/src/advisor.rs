//! Study advisor -- motivational tips and per-subject study advice.
//!
//! Wraps a [`TextGenerator`]; every failure collapses into a fixed
//! fallback string for the call site, so advice can never block or crash
//! a planning flow. No retries.

use indoc::formatdoc;

use crate::error::TextGenError;
use crate::integrations::TextGenerator;
use crate::plan::Difficulty;

// Shown when the endpoint answers with a failure status.
const TIP_FALLBACK: &str =
    "Keep going! Consistency is key to success. You're making progress every day you study.";

// Shown when the request cannot complete at all.
const TIP_ERROR_FALLBACK: &str =
    "Stay focused and keep moving forward. Every small step counts towards your success!";

fn advice_fallback(subject: &str) -> String {
    format!("Focus on the most important topics for {subject}. Practice problems and review key concepts daily.")
}

fn advice_error_fallback(subject: &str) -> String {
    format!("Review key concepts for {subject} and practice problems daily to improve your understanding.")
}

pub struct StudyAdvisor {
    generator: Option<Box<dyn TextGenerator>>,
}

impl StudyAdvisor {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Advisor that always answers with the built-in fallback strings.
    pub fn offline() -> Self {
        Self { generator: None }
    }

    /// Short motivational tip for a subject at the given progress
    /// percentage. Always returns text.
    pub fn motivational_tip(&self, subject: &str, progress_percent: f64) -> String {
        let prompt = formatdoc! {"
            Generate a motivational tip for a student studying {subject}.
            The student has completed {progress_percent:.1}% of their study plan.
            Keep the tip encouraging, actionable, and under 100 words."
        };

        match self.generate("motivational tip", &prompt) {
            Ok(text) => text,
            Err(Some(TextGenError::Status { .. })) => TIP_FALLBACK.to_string(),
            Err(_) => TIP_ERROR_FALLBACK.to_string(),
        }
    }

    /// Study advice for a subject given its difficulty and what is left to
    /// do. Always returns text.
    pub fn study_advice(
        &self,
        subject: &str,
        difficulty: Difficulty,
        remaining_days: i64,
        hours_left: f64,
    ) -> String {
        let prompt = formatdoc! {"
            Provide personalized study advice for {subject} which is marked as {difficulty} difficulty.
            The exam is in {remaining_days} days and there are {hours_left:.1} hours left to study for this subject.
            Give specific, actionable tips for effective studying in 100 words or less.",
            difficulty = difficulty.as_str(),
        };

        match self.generate("study advice", &prompt) {
            Ok(text) => text,
            Err(Some(TextGenError::Status { .. })) => advice_fallback(subject),
            Err(_) => advice_error_fallback(subject),
        }
    }

    /// Run the generator; `Err(None)` means there is no generator at all.
    fn generate(&self, what: &str, prompt: &str) -> Result<String, Option<TextGenError>> {
        let generator = match &self.generator {
            Some(g) => g,
            None => return Err(None),
        };
        generator.generate_text(prompt).map_err(|e| {
            eprintln!("warning: {what} generation via {} failed: {e}", generator.name());
            Some(e)
        })
    }
}
