//! The PHQ-9 questionnaire: item catalog, answer options and score interpretation.

use serde::Serialize;

pub const QUESTIONS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself, or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed, or the opposite: being so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead, or of hurting yourself in some way",
];

pub const OPTIONS: [(u8, &str); 4] = [
    (0, "Not at all"),
    (1, "Several days"),
    (2, "More than half the days"),
    (3, "Nearly every day"),
];

pub fn option_label(value: u8) -> Option<&'static str> {
    OPTIONS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Minimal,
        Severity::Mild,
        Severity::Moderate,
        Severity::ModeratelySevere,
        Severity::Severe,
    ];

    /// Scores above 19 all fall into the top band; callers only ever pass 0..=27.
    pub fn from_score(score: i64) -> Self {
        match score {
            ..=4 => Severity::Minimal,
            5..=9 => Severity::Mild,
            10..=14 => Severity::Moderate,
            15..=19 => Severity::ModeratelySevere,
            _ => Severity::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Minimal => "Minimal or none (0-4)",
            Severity::Mild => "Mild (5-9)",
            Severity::Moderate => "Moderate (10-14)",
            Severity::ModeratelySevere => "Moderately severe (15-19)",
            Severity::Severe => "Severe (20-27)",
        }
    }

    /// Leading words of the label, used as the dashboard filter value.
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Minimal => "Minimal",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::ModeratelySevere => "Moderately severe",
            Severity::Severe => "Severe",
        }
    }
}

pub fn interpret(score: i64) -> &'static str {
    Severity::from_score(score).label()
}

/// A complete, validated set of answers together with everything derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswers {
    pub answers: Vec<u8>,
    pub score: i64,
    pub interpretation: &'static str,
    pub flagged_suicidal_thoughts: bool,
}

impl ScoredAnswers {
    pub fn new(answers: Vec<u8>) -> Self {
        let score = answers.iter().map(|&a| i64::from(a)).sum();
        let flagged_suicidal_thoughts = answers.last().is_some_and(|&last| last > 0);

        Self {
            interpretation: interpret(score),
            answers,
            score,
            flagged_suicidal_thoughts,
        }
    }
}
