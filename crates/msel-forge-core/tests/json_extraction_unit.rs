// crates/msel-forge-core/tests/json_extraction_unit.rs
// ============================================================================
// Module: JSON Extraction Unit Tests
// Description: Tolerant extraction of JSON objects from noisy model text.
// Purpose: Pin brace balancing, fence stripping, and string handling.
// ============================================================================

//! Tolerant JSON extraction tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use msel_forge_core::core::json::JsonExtractError;
use msel_forge_core::core::json::extract_json_object;
use serde_json::json;

#[test]
fn extracts_object_wrapped_in_prose() {
    let text = "Sure! Here is the plan: {\"next_goal\": \"escalate\"} hope it helps";
    let value = extract_json_object(text).unwrap();
    assert_eq!(value, json!({"next_goal": "escalate"}));
}

#[test]
fn strips_markdown_code_fences() {
    let text = "```json\n{\"a\": 1}\n```";
    let value = extract_json_object(text).unwrap();
    assert_eq!(value, json!({"a": 1}));
}

#[test]
fn honors_braces_inside_string_literals() {
    let text = r#"{"content": "alert {brace} inside", "n": 1}"#;
    let value = extract_json_object(text).unwrap();
    assert_eq!(value["content"], json!("alert {brace} inside"));
}

#[test]
fn honors_escaped_quotes_inside_strings() {
    let text = r#"{"content": "she said \"run\" now"}"#;
    let value = extract_json_object(text).unwrap();
    assert_eq!(value["content"], json!("she said \"run\" now"));
}

#[test]
fn nested_objects_balance_to_the_outermost() {
    let text = r#"noise {"outer": {"inner": {"deep": true}}} trailing"#;
    let value = extract_json_object(text).unwrap();
    assert_eq!(value["outer"]["inner"]["deep"], json!(true));
}

#[test]
fn missing_object_is_a_not_found_error() {
    assert_eq!(extract_json_object("no json here"), Err(JsonExtractError::NotFound));
}

#[test]
fn unbalanced_object_is_a_not_found_error() {
    assert_eq!(extract_json_object("{\"open\": true"), Err(JsonExtractError::NotFound));
}
