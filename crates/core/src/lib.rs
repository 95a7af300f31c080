pub mod catalog;
pub mod completion;
pub mod history;
pub mod session;
pub mod tutor;

/// The reserved token that moves the learner on to the next module.
pub const ADVANCE_COMMAND: &str = "/next";

/// Represents one piece of learner input after it has been classified at the
/// input boundary.
///
/// The tutor branches on this enum rather than inspecting raw text, so the
/// lifecycle command is recognised in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnerInput {
    /// Conversational text (a course name, a question, an answer).
    FreeText(String),
    /// The learner asked to finish the current module and move on.
    AdvanceModule,
}

impl LearnerInput {
    /// Classifies raw input after trimming surrounding whitespace. Blank input
    /// yields `None`. The command match is exact and case-sensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            None
        } else if text == ADVANCE_COMMAND {
            Some(Self::AdvanceModule)
        } else {
            Some(Self::FreeText(text.to_string()))
        }
    }

    /// True when there is nothing for the tutor to act on.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::FreeText(text) => text.trim().is_empty(),
            Self::AdvanceModule => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_advance_command() {
        assert_eq!(LearnerInput::parse("/next"), Some(LearnerInput::AdvanceModule));
        assert_eq!(LearnerInput::parse(" /next\n"), Some(LearnerInput::AdvanceModule));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(
            LearnerInput::parse("/NEXT"),
            Some(LearnerInput::FreeText("/NEXT".to_string()))
        );
        assert_eq!(
            LearnerInput::parse("/next please"),
            Some(LearnerInput::FreeText("/next please".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_blank_input() {
        assert_eq!(LearnerInput::parse(""), None);
        assert_eq!(LearnerInput::parse("  \t\n"), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(LearnerInput::FreeText("   ".to_string()).is_blank());
        assert!(!LearnerInput::FreeText("python".to_string()).is_blank());
        assert!(!LearnerInput::AdvanceModule.is_blank());
    }

    #[test]
    fn test_parse_trims_free_text() {
        assert_eq!(
            LearnerInput::parse("  python "),
            Some(LearnerInput::FreeText("python".to_string()))
        );
    }
}
