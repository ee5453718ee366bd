use super::{PathTemplate, Segment, TemplateError};

fn captures(template: &str, path: &str) -> Option<Vec<(String, String)>> {
    PathTemplate::parse(template)
        .unwrap()
        .matches(path)
        .map(|p| p.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[test]
fn test_root_path() {
    let t = PathTemplate::parse("/").unwrap();
    assert!(t.segments().is_empty());
    assert!(t.matches("/").is_some());
    assert!(t.matches("/x").is_none());
    assert!(t.matches("").is_none());
}

#[test]
fn test_parameterized_path() {
    assert_eq!(
        captures("/items/{item_id}", "/items/123"),
        Some(vec![("item_id".into(), "123".into())])
    );
    assert_eq!(captures("/items/{item_id}", "/items/"), None);
    assert_eq!(captures("/items/{item_id}", "/items"), None);
    assert_eq!(captures("/items/{item_id}", "/items/1/2"), None);
}

#[test]
fn test_nested_path() {
    assert_eq!(
        captures("/users/{user_id}/items/{item_id}", "/users/7/items/foo"),
        Some(vec![
            ("user_id".into(), "7".into()),
            ("item_id".into(), "foo".into())
        ])
    );
}

#[test]
fn test_rest_placeholder_keeps_slashes() {
    assert_eq!(
        captures("/files/{file_path:path}", "/files/a/b/c"),
        Some(vec![("file_path".into(), "a/b/c".into())])
    );
    assert_eq!(
        captures("/files/{path*}", "/files/home/johndoe/myfile.txt"),
        Some(vec![("path".into(), "home/johndoe/myfile.txt".into())])
    );
    assert_eq!(captures("/files/{path*}", "/files/"), None);
    assert_eq!(captures("/files/{path*}", "/files"), None);
}

#[test]
fn test_captures_are_percent_decoded() {
    assert_eq!(
        captures("/models/{name}", "/models/res%20net"),
        Some(vec![("name".into(), "res net".into())])
    );
    assert_eq!(
        captures("/files/{p*}", "/files/a%2Fb/c"),
        Some(vec![("p".into(), "a/b/c".into())])
    );
}

#[test]
fn test_trailing_slash_is_literal() {
    assert!(captures("/query-item/", "/query-item/").is_some());
    assert!(captures("/query-item/", "/query-item").is_none());
    assert!(captures("/query-item", "/query-item/").is_none());
}

#[test]
fn test_literal_segments_compare_exactly() {
    assert!(captures("/users/me", "/users/me").is_some());
    assert!(captures("/users/me", "/users/Me").is_none());
    assert!(PathTemplate::parse("/users/me").unwrap().is_literal());
    assert!(!PathTemplate::parse("/users/{id}").unwrap().is_literal());
}

#[test]
fn test_malformed_templates() {
    assert_eq!(
        PathTemplate::parse("items"),
        Err(TemplateError::MissingLeadingSlash)
    );
    assert!(matches!(
        PathTemplate::parse("/items/{}"),
        Err(TemplateError::InvalidName(_))
    ));
    assert!(matches!(
        PathTemplate::parse("/items/{id"),
        Err(TemplateError::PartialPlaceholder(_))
    ));
    assert!(matches!(
        PathTemplate::parse("/files/v{id}"),
        Err(TemplateError::PartialPlaceholder(_))
    ));
    assert!(matches!(
        PathTemplate::parse("/a/{id}/b/{id}"),
        Err(TemplateError::DuplicateName(_))
    ));
    assert!(matches!(
        PathTemplate::parse("/files/{p:path}/raw"),
        Err(TemplateError::RestNotLast(_))
    ));
    assert!(matches!(
        PathTemplate::parse("/files/{p:int}"),
        Err(TemplateError::UnknownConverter(_, _))
    ));
}

#[test]
fn test_placeholders_in_order() {
    let t = PathTemplate::parse("/a/{x}/b/{rest*}").unwrap();
    assert_eq!(t.placeholders().collect::<Vec<_>>(), vec!["x", "rest"]);
    assert!(matches!(t.segments()[3], Segment::Rest(_)));
}
