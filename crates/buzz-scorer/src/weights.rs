//! Point tables shared by the strategy weight structs.

use crate::classify::{Category, OpeningPattern};

/// Points awarded per opening pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningPoints {
    pub number_led: i32,
    pub question: i32,
    pub declarative: i32,
    pub empathy: i32,
    pub provocation: i32,
    pub address: i32,
    pub other: i32,
}

impl OpeningPoints {
    #[must_use]
    pub fn points(&self, pattern: OpeningPattern) -> i32 {
        match pattern {
            OpeningPattern::NumberLed => self.number_led,
            OpeningPattern::Question => self.question,
            OpeningPattern::Declarative => self.declarative,
            OpeningPattern::Empathy => self.empathy,
            OpeningPattern::Provocation => self.provocation,
            OpeningPattern::Address => self.address,
            OpeningPattern::Other => self.other,
        }
    }
}

/// Points awarded per content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPoints {
    pub achievement: i32,
    pub how_to: i32,
    pub anecdote: i32,
    pub problem_statement: i32,
    pub tool_promotion: i32,
    pub news: i32,
    pub other: i32,
}

impl CategoryPoints {
    #[must_use]
    pub fn points(&self, category: Category) -> i32 {
        match category {
            Category::Achievement => self.achievement,
            Category::HowTo => self.how_to,
            Category::Anecdote => self.anecdote,
            Category::ProblemStatement => self.problem_statement,
            Category::ToolPromotion => self.tool_promotion,
            Category::News => self.news,
            Category::Other => self.other,
        }
    }
}

/// Ascending `(upper_bound_inclusive, points)` steps with a fallback for
/// values above the last bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTable {
    pub steps: Vec<(usize, i32)>,
    pub above: i32,
}

impl StepTable {
    #[must_use]
    pub fn new(steps: &[(usize, i32)], above: i32) -> Self {
        Self {
            steps: steps.to_vec(),
            above,
        }
    }

    #[must_use]
    pub fn points(&self, value: usize) -> i32 {
        self.steps
            .iter()
            .find(|(bound, _)| value <= *bound)
            .map_or(self.above, |(_, points)| *points)
    }
}
