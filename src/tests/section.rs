use super::SectionStack;
use crate::collapse_state::CollapsedSet;

fn collapsed(ids: &[&str]) -> CollapsedSet {
    ids.iter().map(|id| (*id).to_string()).collect()
}

fn ids(stack: &SectionStack) -> Vec<(&str, u8)> {
    stack
        .entries()
        .iter()
        .map(|entry| (entry.heading_id.as_str(), entry.level))
        .collect()
}

#[test]
fn test_push_evicts_same_and_deeper_levels() {
    let mut stack = SectionStack::new();
    stack.push_section("a", 1);
    stack.push_section("b", 2);
    stack.push_section("c", 3);
    stack.push_section("d", 2);

    assert_eq!(ids(&stack), vec![("a", 1), ("d", 2)]);

    stack.push_section("e", 1);
    assert_eq!(ids(&stack), vec![("e", 1)]);
}

#[test]
fn test_push_handles_skipped_levels() {
    let mut stack = SectionStack::new();
    stack.push_section("a", 1);
    stack.push_section("b", 3);
    assert_eq!(ids(&stack), vec![("a", 1), ("b", 3)]);

    stack.push_section("c", 2);
    assert_eq!(ids(&stack), vec![("a", 1), ("c", 2)]);
}

#[test]
fn test_pop_and_reset() {
    let mut stack = SectionStack::new();
    stack.push_section("a", 1);
    stack.push_section("b", 2);
    stack.push_section("c", 3);

    stack.pop_section(2);
    assert_eq!(ids(&stack), vec![("a", 1)]);

    stack.reset();
    assert!(stack.entries().is_empty());
}

#[test]
fn test_heading_not_hidden_by_own_flag() {
    let set = collapsed(&["h-2-intro-0"]);
    let mut stack = SectionStack::new();
    stack.push_section("h-1-doc-0", 1);

    assert!(stack.is_heading_visible("h-2-intro-0", 2, &set));
    stack.push_section("h-2-intro-0", 2);

    // Even if asked after its own push, a heading ignores itself
    assert!(stack.is_heading_visible("h-2-intro-0", 2, &set));
    assert!(!stack.is_heading_visible("h-3-details-0", 3, &set));
}

#[test]
fn test_collapsed_sibling_does_not_hide_next_sibling() {
    let set = collapsed(&["first"]);
    let mut stack = SectionStack::new();
    stack.push_section("root", 1);
    stack.push_section("first", 2);

    assert!(stack.is_heading_visible("second", 2, &set));
    assert!(!stack.is_content_visible(&set));

    stack.push_section("second", 2);
    assert!(stack.is_content_visible(&set));
}

#[test]
fn test_content_hidden_by_any_ancestor() {
    let set = collapsed(&["top"]);
    let mut stack = SectionStack::new();
    stack.push_section("top", 1);
    stack.push_section("middle", 2);
    stack.push_section("bottom", 3);

    assert!(!stack.is_content_visible(&set));
    assert!(!stack.is_heading_visible("deeper", 4, &set));
}

#[test]
fn test_current_level() {
    let mut stack = SectionStack::new();
    assert_eq!(stack.current_level(), 1);
    stack.push_section("a", 1);
    stack.push_section("b", 3);
    assert_eq!(stack.current_level(), 3);
}
