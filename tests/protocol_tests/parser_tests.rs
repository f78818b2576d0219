//! Parser Tests
//!
//! Tests for turning command lines into commands.
//!
//! These tests verify:
//! - Operation keyword splitting and case-insensitivity
//! - Brace group extraction (including the leftmost-match edge cases)
//! - Pair parsing and whole-group invalidation
//! - Single-document vs multi-document asymmetry

use recorddb::document::Fields;
use recorddb::protocol::{
    parse_command, parse_document, parse_documents, split_operation, Command, CommandType,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Keyword Tests
// =============================================================================

#[test]
fn test_split_operation() {
    assert_eq!(split_operation("FIND {a:1}"), ("FIND", "{a:1}"));
    assert_eq!(split_operation("  FIND \t  {a:1} "), ("FIND", "{a:1}"));
    assert_eq!(split_operation("STOP"), ("STOP", ""));
    assert_eq!(split_operation(""), ("", ""));
}

#[test]
fn test_keyword_is_case_insensitive() {
    assert_eq!(CommandType::from_keyword("insert_one"), Some(CommandType::InsertOne));
    assert_eq!(CommandType::from_keyword("Insert_Many"), Some(CommandType::InsertMany));
    assert_eq!(CommandType::from_keyword("fInD"), Some(CommandType::Find));
    assert_eq!(CommandType::from_keyword("delete"), Some(CommandType::Delete));
    assert_eq!(CommandType::from_keyword("stop"), Some(CommandType::Stop));
    assert_eq!(
        CommandType::from_keyword("purge_and_stop"),
        Some(CommandType::PurgeAndStop)
    );
    assert_eq!(CommandType::from_keyword("UPDATE"), None);
}

#[test]
fn test_keyword_round_trip() {
    for ty in [
        CommandType::InsertOne,
        CommandType::InsertMany,
        CommandType::Find,
        CommandType::Delete,
        CommandType::Stop,
        CommandType::PurgeAndStop,
    ] {
        assert_eq!(CommandType::from_keyword(ty.keyword()), Some(ty));
    }
}

#[test]
fn test_parse_unknown_and_empty() {
    assert_eq!(
        parse_command("UPSERT {_id:1}"),
        Command::Unknown {
            operation: "UPSERT".to_string()
        }
    );
    assert_eq!(
        parse_command("   "),
        Command::Unknown {
            operation: String::new()
        }
    );
}

#[test]
fn test_parse_stop_ignores_operand() {
    assert_eq!(parse_command("stop"), Command::Stop);
    assert_eq!(parse_command("STOP please"), Command::Stop);
    assert_eq!(parse_command("PURGE_AND_STOP"), Command::PurgeAndStop);
}

// =============================================================================
// Single Document Tests
// =============================================================================

#[test]
fn test_parse_insert_one() {
    let command = parse_command("INSERT_ONE {_id:1, name:Alice}");
    assert_eq!(command.command_type(), Some(CommandType::InsertOne));
    assert_eq!(
        command,
        Command::InsertOne {
            document: Some(fields(&[("_id", "1"), ("name", "Alice")]))
        }
    );
}

#[test]
fn test_parse_trims_keys_and_values() {
    assert_eq!(
        parse_document("{  _id :  1 ,\tname:   Alice Smith  }"),
        Some(fields(&[("_id", "1"), ("name", "Alice Smith")]))
    );
}

#[test]
fn test_value_may_contain_colons() {
    assert_eq!(
        parse_document("{_id:1, url:http://x.y:80/z}"),
        Some(fields(&[("_id", "1"), ("url", "http://x.y:80/z")]))
    );
}

#[test]
fn test_duplicate_key_last_wins() {
    assert_eq!(
        parse_document("{a:1, a:2}"),
        Some(fields(&[("a", "2")]))
    );
}

#[test]
fn test_only_first_group_is_used() {
    assert_eq!(
        parse_document("{a:1} {b:2}"),
        Some(fields(&[("a", "1")]))
    );
}

#[test]
fn test_bad_pair_invalidates_whole_group() {
    assert_eq!(parse_document("{_id:1, name}"), None);
    assert_eq!(parse_document("{_id:1, name:}"), None);
    assert_eq!(parse_document("{_id:1, name:   }"), None);
    assert_eq!(parse_document("{_id:1, :Alice}"), None);
    assert_eq!(parse_document("{_id:1,, name:Alice}"), None);
    assert_eq!(parse_document("{ }"), None);
}

#[test]
fn test_trailing_comma_is_tolerated() {
    assert_eq!(parse_document("{a:1,}"), Some(fields(&[("a", "1")])));
    assert_eq!(parse_document("{a:1,,}"), Some(fields(&[("a", "1")])));
}

#[test]
fn test_lone_comma_group_is_empty_criteria() {
    assert_eq!(parse_document("{,}"), Some(Fields::new()));
}

#[test]
fn test_no_group_is_none() {
    assert_eq!(parse_document(""), None);
    assert_eq!(parse_document("_id:1"), None);
    assert_eq!(parse_document("{_id:1"), None);
    assert_eq!(parse_document("{}"), None);
    assert_eq!(parse_document("_id:1}"), None);
}

#[test]
fn test_empty_braces_are_skipped() {
    assert_eq!(parse_document("{} {a:1}"), Some(fields(&[("a", "1")])));
}

#[test]
fn test_group_runs_to_first_closing_brace() {
    // An inner '{' is just a character of the body
    assert_eq!(parse_document("{{a:1}"), Some(fields(&[("{a", "1")])));
    assert_eq!(parse_document("{a:{b}"), Some(fields(&[("a", "{b")])));
}

#[test]
fn test_missing_operand() {
    assert_eq!(parse_command("INSERT_ONE"), Command::InsertOne { document: None });
    assert_eq!(parse_command("FIND"), Command::Find { criteria: None });
    assert_eq!(parse_command("DELETE"), Command::Delete { criteria: None });
    assert_eq!(
        parse_command("INSERT_MANY"),
        Command::InsertMany { documents: vec![] }
    );
}

// =============================================================================
// Multi Document Tests
// =============================================================================

#[test]
fn test_parse_insert_many() {
    assert_eq!(
        parse_command("INSERT_MANY {_id:1,x:a} {_id:2,x:a}"),
        Command::InsertMany {
            documents: vec![
                fields(&[("_id", "1"), ("x", "a")]),
                fields(&[("_id", "2"), ("x", "a")]),
            ]
        }
    );
}

#[test]
fn test_parse_documents_drops_bad_groups() {
    let docs = parse_documents("{_id:1,x:a} {_id:2,x:a} {bad}");

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0], fields(&[("_id", "1"), ("x", "a")]));
    assert_eq!(docs[1], fields(&[("_id", "2"), ("x", "a")]));
}

#[test]
fn test_parse_documents_keeps_order() {
    let docs = parse_documents("{_id:c}{_id:a} junk {_id:b}");
    let ids: Vec<&str> = docs.iter().map(|d| d["_id"].as_str()).collect();

    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn test_parse_documents_all_bad_is_empty() {
    assert!(parse_documents("{bad} {also:} {}").is_empty());
    assert!(parse_documents("no groups here").is_empty());
}

// Single-document commands reject a malformed group outright while
// multi-document commands silently drop it. Both behaviors are pinned here.
#[test]
fn test_single_vs_multi_malformed_group_asymmetry() {
    let operand = "{bad} {_id:1}";

    assert_eq!(parse_document(operand), None);
    assert_eq!(parse_documents(operand), vec![fields(&[("_id", "1")])]);
}
