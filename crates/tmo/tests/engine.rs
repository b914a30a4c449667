//! End-to-end tests for `Engine::gettext` and `Engine::format`.

use std::collections::BTreeMap;
use std::thread;

use tmo::{
    Arguments, Engine, FieldError, FilterError, FormatError, GetTextOptions, JsonStr, LoadError,
    TemplateRegistry, Value, args,
};

const TEMPLATES: &str = include_str!("fixtures/templates.json");

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine.load_templates(&JsonStr::new(TEMPLATES)).unwrap();
    engine
}

fn opts() -> GetTextOptions {
    GetTextOptions::default()
}

fn format(template: &str, args: &Arguments) -> Result<String, FormatError> {
    Engine::new().format(template, &opts(), args)
}

// =============================================================================
// Template selection
// =============================================================================

#[test]
fn test_scalar_selects_base_template() {
    let s = engine()
        .gettext("fav_color", &opts(), &args! { "name" => "John", "color" => "red" })
        .unwrap();
    assert_eq!(s, "My name is John and my favourite color is red.");
}

#[test]
fn test_single_element_list_selects_base_template() {
    let s = engine()
        .gettext("fav_color", &opts(), &args! { "name" => "John", "color" => vec!["red"] })
        .unwrap();
    assert_eq!(s, "My name is John and my favourite color is red.");
}

#[test]
fn test_list_selects_plural_template() {
    let s = engine()
        .gettext(
            "fav_color",
            &opts(),
            &args! { "name" => "John", "color" => vec!["red", "blue", "green"] },
        )
        .unwrap();
    assert_eq!(s, "My name is John and my favourite colors are red, blue and green.");
}

#[test]
fn test_missing_plural_falls_back_to_base() {
    let e = engine();
    let cars = args! { "car" => vec!["bmw", "mercedes"] };
    assert_eq!(
        e.gettext("fav_car", &opts(), &cars).unwrap(),
        "My favourite car is bmw and mercedes."
    );
    assert_eq!(
        e.gettext("fav_car", &opts(), &args! { "car" => vec!["bmw"] }).unwrap(),
        "My favourite car is bmw."
    );
    assert_eq!(
        e.gettext("fav_car", &opts(), &args! { "car" => "bmw" }).unwrap(),
        "My favourite car is bmw."
    );
}

#[test]
fn test_explicit_variant_matches_automatic_selection() {
    let e = engine();
    let cars = args! { "car" => vec!["bmw", "mercedes"] };
    assert_eq!(
        e.gettext("fav_car#cars", &opts(), &cars).unwrap(),
        e.gettext("fav_car", &opts(), &cars).unwrap()
    );

    // An explicit base-level variant id is used as given, even for scalars.
    let s = e
        .gettext("fav_color#colors", &opts(), &args! { "name" => "Jo", "color" => "red" })
        .unwrap();
    assert_eq!(s, "My name is Jo and my favourite colors are red.");
}

#[test]
fn test_plural_variant_with_filters() {
    let s = engine()
        .gettext(
            "fav_country",
            &opts(),
            &args! { "country" => vec!["Great Britain", "USA", "Czech Republic"] },
        )
        .unwrap();
    assert_eq!(
        s,
        "My favourite countries are the Great Britain, the USA and the Czech Republic."
    );

    let s = engine()
        .gettext("fav_country", &opts(), &args! { "country" => "USA" })
        .unwrap();
    assert_eq!(s, "My favourite country is the USA.");
}

// =============================================================================
// Filters and join
// =============================================================================

#[test]
fn test_explicit_join_runs_last() {
    let s = engine()
        .gettext("fav_game", &opts(), &args! { "game" => vec!["World of Warcraft", "Dirt4"] })
        .unwrap();
    assert_eq!(s, "I usually play the World of Warcraft or the Dirt4.");
}

#[test]
fn test_round_then_implicit_join() {
    let s = engine()
        .gettext("fav_number", &opts(), &args! { "number" => vec![1.21513, 1.41342] })
        .unwrap();
    assert_eq!(s, "My favourite number is 1.22 and 1.41.");

    let s = engine()
        .gettext("fav_number", &opts(), &args! { "number" => 1.21513 })
        .unwrap();
    assert_eq!(s, "My favourite number is 1.22.");
}

#[test]
fn test_call_options_override_implicit_join() {
    let e = engine();
    let colors = args! { "name" => "John", "color" => vec!["red", "blue", "green"] };

    let options = GetTextOptions::builder().connector_word(" or ").build();
    assert_eq!(
        e.gettext("fav_color", &options, &colors).unwrap(),
        "My name is John and my favourite colors are red, blue or green."
    );

    let options = GetTextOptions::builder().separator_char("; ").build();
    assert_eq!(
        e.gettext("fav_color", &options, &colors).unwrap(),
        "My name is John and my favourite colors are red; blue and green."
    );
}

#[test]
fn test_explicit_join_arguments_beat_call_options() {
    let options = GetTextOptions::builder()
        .connector_word(" and also ")
        .separator_char(" / ")
        .build();
    let s = engine()
        .gettext("fav_game", &options, &args! { "game" => vec!["A", "B", "C"] })
        .unwrap();
    // The template gives the connector; the separator comes from the call.
    assert_eq!(s, "I usually play the A / the B or the C.");
}

#[test]
fn test_engine_level_join_defaults() {
    let engine = Engine::builder()
        .filters(tmo::FilterRegistry::builtin())
        .connector_word(" & ")
        .separator_char(" · ")
        .build();
    let s = engine
        .format("{x}", &opts(), &args! { "x" => vec![1, 2, 3] })
        .unwrap();
    assert_eq!(s, "1 · 2 & 3");
}

#[test]
fn test_empty_join_argument_uses_default() {
    let s = format("{x@join('')}", &args! { "x" => vec!["a", "b"] }).unwrap();
    assert_eq!(s, "a and b");
}

#[test]
fn test_builtin_case_filters() {
    let a = args! { "name" => "élan vital" };
    assert_eq!(format("{name@upper}", &a).unwrap(), "ÉLAN VITAL");
    assert_eq!(format("{name@cap}", &a).unwrap(), "Élan vital");
    assert_eq!(format("{name@upper@lower}", &a).unwrap(), "élan vital");
}

#[test]
fn test_round_without_digits_yields_integer() {
    assert_eq!(format("{n@round}", &args! { "n" => 2.6 }).unwrap(), "3");
    assert_eq!(format("{n@round}", &args! { "n" => 2.5 }).unwrap(), "2");
}

#[test]
fn test_round_keeps_integers() {
    assert_eq!(format("{n@round(2)}", &args! { "n" => 5 }).unwrap(), "5");
    assert_eq!(format("{n@round(-2)}", &args! { "n" => 1250 }).unwrap(), "1200");
    assert_eq!(format("{n@round(-2)}", &args! { "n" => 1351 }).unwrap(), "1400");
}

#[test]
fn test_round_large_and_extreme_digits_stay_finite() {
    assert_eq!(format("{x@round(15)}", &args! { "x" => 1e300 }).unwrap(), "1e+300");
    assert_eq!(format("{x@round(400)}", &args! { "x" => 0.1 }).unwrap(), "0.1");
    assert_eq!(format("{x@round(-400)}", &args! { "x" => 1234.5 }).unwrap(), "0.0");
    assert_eq!(format("{x@round(-2)}", &args! { "x" => 1234.5 }).unwrap(), "1200.0");
}

#[test]
fn test_custom_filters_are_registry_lookups() {
    let mut engine = Engine::new();
    engine
        .filters_mut()
        .register("shout", |value, _| Ok(Value::String(format!("{value}!"))))
        .unwrap();
    let s = engine
        .format("{w@shout}", &opts(), &args! { "w" => vec!["hey", "you"] })
        .unwrap();
    assert_eq!(s, "hey! and you!");
}

#[test]
fn test_custom_join_replaces_implicit_join() {
    let mut engine = Engine::new();
    engine
        .filters_mut()
        .register("join", |value, _| {
            let items: Vec<String> = value
                .as_list()
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect();
            Ok(Value::String(items.join("|")))
        })
        .unwrap();
    let s = engine
        .format("{x}", &opts(), &args! { "x" => vec!["a", "b", "c"] })
        .unwrap();
    assert_eq!(s, "a|b|c");
}

#[test]
fn test_filter_names_must_be_identifiers() {
    let mut engine = Engine::new();
    let err = engine
        .filters_mut()
        .register("bad-name", |value, _| Ok(value))
        .unwrap_err();
    assert!(matches!(err, LoadError::InvalidFilterName { name } if name == "bad-name"));
}

// =============================================================================
// Values, keys and format specs
// =============================================================================

#[test]
fn test_scalars_render_without_join_punctuation() {
    assert_eq!(format("{x}", &args! { "x" => 7 }).unwrap(), "7");
    assert_eq!(format("{x}", &args! { "x" => 3.5 }).unwrap(), "3.5");
    assert_eq!(format("{x}", &args! { "x" => 2.0 }).unwrap(), "2.0");
    assert_eq!(format("{x}", &args! { "x" => 1e16 }).unwrap(), "1e+16");
    assert_eq!(format("{x}", &args! { "x" => 1.5e-5 }).unwrap(), "1.5e-05");
    assert_eq!(format("{x}", &args! { "x" => 0.0001 }).unwrap(), "0.0001");
    assert_eq!(format("{x}", &args! { "x" => 1e15 }).unwrap(), "1000000000000000.0");
    assert_eq!(format("{x}", &args! { "x" => true }).unwrap(), "true");
    assert_eq!(format("{x}", &args! { "x" => "plain" }).unwrap(), "plain");
}

#[test]
fn test_empty_list_renders_empty() {
    assert_eq!(format("[{x}]", &args! { "x" => Vec::<&str>::new() }).unwrap(), "[]");
}

#[test]
fn test_literal_only_and_escaped_braces() {
    assert_eq!(format("", &Arguments::new()).unwrap(), "");
    assert_eq!(format("no fields", &Arguments::new()).unwrap(), "no fields");
    assert_eq!(
        format("{{literal}} {x}", &args! { "x" => 1 }).unwrap(),
        "{literal} 1"
    );
}

#[test]
fn test_positional_fields() {
    let ab = Arguments::new().arg("a").arg("b");
    assert_eq!(format("{} and {}", &ab).unwrap(), "a and b");
    assert_eq!(format("{1} {0} {1}", &ab).unwrap(), "b a b");
}

#[test]
fn test_attribute_and_index_access() {
    let user: BTreeMap<String, Value> = BTreeMap::from([
        ("name".to_string(), Value::from("Ann")),
        ("langs".to_string(), Value::from(vec!["rust", "c"])),
    ]);
    let a = args! { "user" => user, "items" => vec!["x", "y", "z"] };

    assert_eq!(format("{user.name}", &a).unwrap(), "Ann");
    assert_eq!(format("{user[name]@upper}", &a).unwrap(), "ANN");
    assert_eq!(format("{items.0}{items[2]}", &a).unwrap(), "xz");
    assert_eq!(format("{user.langs}", &a).unwrap(), "rust and c");
}

#[test]
fn test_string_positions() {
    let a = args! { "word" => "héllo", "items" => vec!["ab", "cd"] };
    assert_eq!(format("{word[1]}{word.4}", &a).unwrap(), "éo");
    assert_eq!(format("{items[1][0]@upper}", &a).unwrap(), "C");
    assert!(matches!(
        format("{word[name]}", &a).unwrap_err(),
        FormatError::FieldResolution {
            source: FieldError::NotIndexable { kind: "string", .. },
            ..
        }
    ));
}

#[test]
fn test_format_spec_applies_per_element() {
    let a = args! { "n" => vec![1.26, 2.0], "w" => "ab" };
    assert_eq!(format("{n:.1f}", &a).unwrap(), "1.3 and 2.0");
    assert_eq!(format("[{w:>4}]", &a).unwrap(), "[  ab]");
}

#[test]
fn test_format_spec_runs_before_filters() {
    // Padding happens first, so the article lands outside the padded word.
    let s = format("{w@art('x'):>4}", &args! { "w" => "ab" }).unwrap();
    assert_eq!(s, "x   ab");

    let s = format("{n@round(1):.3f}", &args! { "n" => 2.25 }).unwrap();
    assert_eq!(s, "2.2");

    let s = format("{w@art('x'):>4}", &args! { "w" => vec!["ab", "c"] }).unwrap();
    assert_eq!(s, "x   ab and x    c");
}

#[test]
fn test_filter_suffix_must_precede_spec() {
    // `:` starts the spec, so a suffix written after it is spec text.
    assert!(format("{n:05.1f@round(0)}", &args! { "n" => 2.25 }).is_err());
}

#[test]
fn test_conversions() {
    let a = args! { "s" => "é\"x" };
    assert_eq!(format("{s!s}", &a).unwrap(), "é\"x");
    assert_eq!(format("{s!r}", &a).unwrap(), "'é\"x'");
    assert_eq!(format("{s!a}", &a).unwrap(), "'\\xe9\"x'");

    let a = args! { "s" => "it's", "t" => "it's \"x\"\n", "u" => "\u{2603}\u{1f600}" };
    assert_eq!(format("{s!r}", &a).unwrap(), "\"it's\"");
    assert_eq!(format("{t!r}", &a).unwrap(), "'it\\'s \"x\"\\n'");
    assert_eq!(format("{u!r}", &a).unwrap(), "'\u{2603}\u{1f600}'");
    assert_eq!(format("{u!a}", &a).unwrap(), "'\\u2603\\U0001f600'");
    assert_eq!(format("{n!r}", &args! { "n" => 3 }).unwrap(), "3");
}

#[test]
fn test_nested_format_spec() {
    let a = args! { "value" => 42, "width" => 5, "fill" => "*" };
    assert_eq!(format("[{value:{width}}]", &a).unwrap(), "[   42]");
    assert_eq!(format("[{value:{fill}^{width}}]", &a).unwrap(), "[*42**]");
}

#[test]
fn test_recursion_limit_is_a_hard_failure() {
    let a = args! { "a" => 1, "b" => 2, "c" => "" };
    let err = format("[{a:{b:{c}}}]", &a).unwrap_err();
    assert!(matches!(err, FormatError::RecursionLimitExceeded { max_depth: 1 }));

    let deeper = Engine::builder()
        .filters(tmo::FilterRegistry::builtin())
        .max_depth(2)
        .build();
    assert_eq!(deeper.format("[{a:{b:{c}}}]", &opts(), &a).unwrap(), "[ 1]");

    let flat = Engine::builder()
        .filters(tmo::FilterRegistry::builtin())
        .max_depth(0)
        .build();
    let err = flat.format("{a:{b}}", &opts(), &a).unwrap_err();
    assert!(matches!(err, FormatError::RecursionLimitExceeded { max_depth: 0 }));
    // Specs without fields do not count against the bound.
    assert_eq!(flat.format("{a:>3}", &opts(), &a).unwrap(), "  1");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_preconditions() {
    let err = Engine::new().gettext("x", &opts(), &Arguments::new()).unwrap_err();
    assert!(matches!(err, FormatError::TemplatesNotInitialized));

    let templates = TemplateRegistry::from_mapping([("x", "text")]).unwrap();
    let unconfigured = Engine::builder().templates(templates).build();
    let err = unconfigured.gettext("x", &opts(), &Arguments::new()).unwrap_err();
    assert!(matches!(err, FormatError::FormatterNotConfigured));
}

#[test]
fn test_unknown_template() {
    let err = engine().gettext("nope", &opts(), &Arguments::new()).unwrap_err();
    assert!(matches!(err, FormatError::TemplateNotFound { ref id, .. } if id == "nope"));

    let err = engine().gettext("fav_colr", &opts(), &Arguments::new()).unwrap_err();
    let FormatError::TemplateNotFound { suggestions, .. } = err else {
        panic!("expected TemplateNotFound, got {err:?}");
    };
    assert_eq!(suggestions[0], "fav_color");
}

#[test]
fn test_missing_argument() {
    let err = engine().gettext("fav_car", &opts(), &Arguments::new()).unwrap_err();
    match err {
        FormatError::FieldResolution { field, source } => {
            assert_eq!(field, "car");
            assert_eq!(source, FieldError::MissingArgument { name: "car".into() });
        }
        other => panic!("expected FieldResolution, got {other:?}"),
    }
}

#[test]
fn test_unknown_filter() {
    let err = format("{x@uper}", &args! { "x" => 1 }).unwrap_err();
    match err {
        FormatError::UnknownFilter { name, suggestions } => {
            assert_eq!(name, "uper");
            assert_eq!(suggestions, vec!["upper"]);
        }
        other => panic!("expected UnknownFilter, got {other:?}"),
    }
}

#[test]
fn test_unknown_filter_fails_even_without_value() {
    let err = format("{missing@nope}", &Arguments::new()).unwrap_err();
    assert!(matches!(err, FormatError::UnknownFilter { .. }));
}

#[test]
fn test_filter_failure_is_wrapped() {
    let err = format("{x@art}", &args! { "x" => "y" }).unwrap_err();
    match err {
        FormatError::FieldResolution {
            field,
            source: FieldError::Filter { filter, source },
        } => {
            assert_eq!(field, "x@art");
            assert_eq!(filter, "art");
            assert!(matches!(source, FilterError::ArgumentCount { got: 0, .. }));
        }
        other => panic!("expected a wrapped filter error, got {other:?}"),
    }
}

#[test]
fn test_indexing_conflict() {
    let ab = Arguments::new().arg("a").arg("b");
    assert!(matches!(
        format("{} {0}", &ab).unwrap_err(),
        FormatError::ArgumentIndexingConflict
    ));
    assert!(matches!(
        format("{0} {}", &ab).unwrap_err(),
        FormatError::ArgumentIndexingConflict
    ));
    // Nested specs share the numbering of their template.
    assert!(matches!(
        format("{:{0}}", &ab).unwrap_err(),
        FormatError::ArgumentIndexingConflict
    ));
}

#[test]
fn test_syntax_errors_surface_as_parse_errors() {
    let err = format("a } b", &Arguments::new()).unwrap_err();
    assert!(matches!(err, FormatError::Parse(_)));
    let err = format("{open", &Arguments::new()).unwrap_err();
    assert!(matches!(err, FormatError::Parse(_)));
}

// =============================================================================
// Statelessness
// =============================================================================

#[test]
fn test_repeated_calls_are_identical() {
    let e = engine();
    let a = args! { "name" => "John", "color" => vec!["red", "blue"] };
    let first = e.gettext("fav_color", &opts(), &a).unwrap();
    let second = e.gettext("fav_color", &opts(), &a).unwrap();
    assert_eq!(first, second);

    let positional = Arguments::new().arg(1).arg(2);
    assert_eq!(
        e.format("{} {}", &opts(), &positional).unwrap(),
        e.format("{} {}", &opts(), &positional).unwrap()
    );
}

#[test]
fn test_engine_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Engine>();

    let e = engine();
    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let e = &e;
                scope.spawn(move || {
                    e.gettext("fav_car", &opts(), &args! { "car" => vec![i; 2] })
                        .unwrap()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(
                handle.join().unwrap(),
                format!("My favourite car is {i} and {i}.")
            );
        }
    });
}

#[test]
fn test_load_replaces_templates() {
    let mut e = engine();
    let count = e
        .load_templates(&JsonStr::new(r#"{"only": "just {x}"}"#))
        .unwrap();
    assert_eq!(count, 1);
    assert!(matches!(
        e.gettext("fav_car", &opts(), &args! { "car" => "bmw" }),
        Err(FormatError::TemplateNotFound { .. })
    ));

    // A failed load keeps the previous set.
    assert!(e.load_templates(&JsonStr::new("[1, 2]")).is_err());
    assert_eq!(e.gettext("only", &opts(), &args! { "x" => 1 }).unwrap(), "just 1");
}
