use proptest::prelude::*;
use sdk::display::DisplayLine;
use sdk::errors::{EngineError, EvaErrorExt};
use sdk::types::{Role, Turn};

proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::Profile(error_str.clone()),
            EngineError::Generation(error_str.clone()),
            EngineError::WorkerFailed(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            // Hint should not be empty
            prop_assert!(!hint.is_empty());

            // Hints are static strings and never echo the underlying detail
            if error_str.len() > 8 {
                prop_assert!(!hint.contains(error_str.as_str()));
            }
        }
    }
}

proptest! {
    #[test]
    fn test_turn_keeps_text_verbatim(text in "\\PC*", human in any::<bool>()) {
        let role = if human { Role::Human } else { Role::Agent };
        let turn = Turn::new(role, text.clone());
        prop_assert_eq!(turn.role(), role);
        prop_assert_eq!(turn.text(), text.as_str());
    }

    #[test]
    fn test_only_indicator_lines_are_transient(name in "[A-Za-z]{1,12}", text in "\\PC*") {
        prop_assert!(DisplayLine::indicator(&name).is_transient());
        prop_assert!(!DisplayLine::system(text.clone()).is_transient());
        let agent_line = DisplayLine::new(sdk::Speaker::Agent, name, text);
        prop_assert!(!agent_line.is_transient());
    }
}
