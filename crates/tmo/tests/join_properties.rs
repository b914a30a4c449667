//! Property tests for the default join and scalar rendering.

use proptest::collection::vec;
use proptest::prelude::*;
use tmo::interpreter::join_words;
use tmo::{Engine, GetTextOptions, args};

/// Straightforward restatement of the join rule for comparison.
fn reference_join(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [a, b] => format!("{a} and {b}"),
        [head @ .., a, b] => format!("{}, {a} and {b}", head.join(", ")),
    }
}

proptest! {
    #[test]
    fn default_join_matches_reference(items in vec("[a-z]{1,8}", 0..12)) {
        prop_assert_eq!(join_words(&items, " and ", ", "), reference_join(&items));
    }

    #[test]
    fn default_join_has_one_connector(items in vec("[a-z]{1,8}", 2..12)) {
        let joined = join_words(&items, " and ", ", ");
        prop_assert_eq!(joined.matches(" and ").count(), 1);
        prop_assert_eq!(joined.matches(", ").count(), items.len() - 2);
        let expected_end = format!(" and {}", items[items.len() - 1]);
        prop_assert!(joined.ends_with(&expected_end));
    }

    #[test]
    fn engine_join_matches_join_words(items in vec("[a-z]{1,8}", 0..8)) {
        let rendered = Engine::new()
            .format("{x}", &GetTextOptions::default(), &args! { "x" => items.clone() })
            .unwrap();
        prop_assert_eq!(rendered, join_words(&items, " and ", ", "));
    }

    #[test]
    fn scalars_render_as_themselves(n in any::<i64>(), word in "[a-zA-Z0-9 ]{0,16}") {
        let engine = Engine::new();
        let options = GetTextOptions::default();
        prop_assert_eq!(
            engine.format("{n}", &options, &args! { "n" => n }).unwrap(),
            n.to_string()
        );
        prop_assert_eq!(
            engine.format("{w}", &options, &args! { "w" => word.clone() }).unwrap(),
            word
        );
    }

    #[test]
    fn formatting_is_repeatable(items in vec("[a-z]{1,8}", 0..6)) {
        let engine = Engine::new();
        let options = GetTextOptions::default();
        let arguments = args! { "x" => items };
        let first = engine.format("<{x@upper}>", &options, &arguments).unwrap();
        let second = engine.format("<{x@upper}>", &options, &arguments).unwrap();
        prop_assert_eq!(first, second);
    }
}
