//! Tests for plural variant selection.

use tmo::interpreter::select_template_id;
use tmo::{Arguments, TemplateId, args};

fn select(base: &str, args: &Arguments) -> String {
    select_template_id(&TemplateId::new(base), args).to_string()
}

#[test]
fn test_scalars_keep_base_id() {
    assert_eq!(select("fav_color", &args! { "color" => "red" }), "fav_color");
    assert_eq!(select("fav_color", &args! {}), "fav_color");
}

#[test]
fn test_short_lists_keep_base_id() {
    assert_eq!(select("fav_color", &args! { "color" => vec!["red"] }), "fav_color");
    assert_eq!(
        select("fav_color", &args! { "color" => Vec::<&str>::new() }),
        "fav_color"
    );
}

#[test]
fn test_list_of_two_selects_plural() {
    assert_eq!(
        select("fav_color", &args! { "color" => vec!["red", "blue"], "name" => "John" }),
        "fav_color#colors"
    );
}

#[test]
fn test_multiple_lists_are_sorted() {
    let a = args! {
        "pet" => vec!["cat", "dog"],
        "car" => vec!["bmw", "audi"],
        "name" => vec!["solo"],
    };
    assert_eq!(select("msg", &a), "msg#cars#pets");
}

#[test]
fn test_explicit_variant_is_unchanged() {
    assert_eq!(
        select("fav_car#cars", &args! { "car" => "bmw" }),
        "fav_car#cars"
    );
    assert_eq!(
        select("fav_car#custom", &args! { "car" => vec!["a", "b"] }),
        "fav_car#custom"
    );
}

#[test]
fn test_positional_lists_do_not_pluralize() {
    let a = Arguments::new().arg(vec!["a", "b"]);
    assert_eq!(select("msg", &a), "msg");
}

#[test]
fn test_pluralization_is_not_linguistic() {
    assert_eq!(
        select("fav_country", &args! { "country" => vec!["USA", "UK"] }),
        "fav_country#countrys"
    );
}
