use super::*;
use crate::bound::Bindings;
use crate::captures::Scope;
use crate::error::{MatchError, PredicateError};
use crate::matcher::Matcher;
use crate::value::{Kind, Value};
use pretty_assertions::assert_eq;

const TERM: &str = "multiple words";

fn a_foo() -> Node {
    "a" * group_named("1")
}

fn abc_e() -> Node {
    "abc" * either()
}

fn b_s() -> Node {
    "b" * repeat()
}

/// Match `value` with a fresh matcher. `prefix` is the expected match result
/// (`None` for a mismatch) and `groups` the exact captures committed.
fn run(pattern: impl Into<Node>, value: &str, prefix: Option<&str>, groups: &[(&str, &str)]) {
    let mut m = Matcher::new();
    let result = m.matched_prefix(value, pattern).unwrap();
    assert_eq!(result, prefix.map(Value::from));
    assert_eq!(m.captures().depth(), 0);
    match prefix {
        None => assert!(m.bound().is_empty()),
        Some(_) => {
            let expected: Scope = groups
                .iter()
                .map(|(name, text)| ((*name).to_owned(), Value::from(*text)))
                .collect();
            assert_eq!(m.bound().last(), Some(&Bindings::from(expected)));
        }
    }
}

#[test]
fn test_basic() {
    run("", "", Some(""), &[]);
    run("abc", "abc", Some("abc"), &[]);
    run("abc", "xbc", None, &[]);
    run("abc", "axc", None, &[]);
    run("abc", "abx", None, &[]);
    run("abc", "xabc", None, &[]);
    run("abc", "xabcy", None, &[]);
    run("abc", "", None, &[]);
    run(format!("{TERM} of text"), "uh-oh", None, &[]);
}

#[test]
fn test_empty_pattern_matches_empty_prefix() {
    run(Pattern::default(), "", Some(""), &[]);
    run(Pattern::default(), "abc", Some(""), &[]);
}

#[test]
fn test_groups() {
    run(a_foo(), "a", Some("a"), &[("1", "a")]);
    run(a_foo(), "aa", Some("a"), &[("1", "a")]);
    run(a_foo() * group_named("2"), "a", Some("a"), &[("1", "a"), ("2", "a")]);
    run(
        a_foo() * group_named("2") * group_named("3"),
        "a",
        Some("a"),
        &[("1", "a"), ("2", "a"), ("3", "a")],
    );
    run(a_foo() + "b" + "c" * group_named("2"), "abc", Some("abc"), &[("1", "a"), ("2", "c")]);
    run(Group::named(abc_e(), "1") * repeat() + "d", "abbbcd", Some("abbbcd"), &[("1", "c")]);
    run(Group::named(abc_e(), "1") * repeat() + "bcd", "abcd", Some("abcd"), &[("1", "a")]);
}

#[test]
fn test_anyone() {
    run("a" + anyone() + "c", "abc", Some("abc"), &[]);
    run("a" + anything() + "c", "axyzc", Some("axyzc"), &[]);
    run("a" + anything() + "c", "axyzd", None, &[]);
    run("a" + anything() + "c", "ac", Some("ac"), &[]);
    run("a" + anyone() * repeat_range(2, 3).unwrap() + "c", "abbc", Some("abbc"), &[]);
}

#[test]
fn test_repeat() {
    run("a" + b_s() + "c", "abc", Some("abc"), &[]);
    run("a" + b_s() + "bc", "abc", Some("abc"), &[]);
    run("a" + b_s() + "bc", "abbc", Some("abbc"), &[]);
    run("a" + b_s() + "bc", "abbbbc", Some("abbbbc"), &[]);
    run("a" * repeat(), "", Some(""), &[]);
    run("a" * repeat(), "a", Some("a"), &[]);
    run("a" * repeat(), "aaa", Some("aaa"), &[]);
    run(
        padding() + "a" * repeat_min(1) + "b" + "c" * repeat_min(1),
        "aabbabc",
        Some("aabbabc"),
        &[],
    );
}

#[test]
fn test_repeat_range() {
    run("a" + "b" * repeat_min(1) + "bc", "abbbbc", Some("abbbbc"), &[]);
    run("a" + "b" * repeat_range(1, 3).unwrap() + "bc", "abbbbc", Some("abbbbc"), &[]);
    run("a" + "b" * repeat_range(3, 4).unwrap() + "bc", "abbbbc", Some("abbbbc"), &[]);
    run("a" + "b" * repeat_range(4, 5).unwrap() + "bc", "abbbbc", None, &[]);
}

#[test]
fn test_repeat_bounds() {
    let pattern = || "a" + "b" * repeat_range(2, 3).unwrap() + "c";
    run(pattern(), "abc", None, &[]);
    run(pattern(), "abbc", Some("abbc"), &[]);
    run(pattern(), "abbbc", Some("abbbc"), &[]);
    run(pattern(), "abbbbc", None, &[]);
}

#[test]
fn test_some() {
    run("a" + "b" * repeat_min(1) + "bc", "abbc", Some("abbc"), &[]);
    run("a" + "b" * repeat_min(1) + "bc", "abc", None, &[]);
    run("a" + "b" * repeat_min(1) + "bc", "abq", None, &[]);
    run("a" + "b" * repeat_min(1) + "bc", "abbbbc", Some("abbbbc"), &[]);
}

#[test]
fn test_maybe() {
    run("a" * maybe(), "", Some(""), &[]);
    run("a" * maybe(), "a", Some("a"), &[]);
    run("a" * maybe(), "aa", Some("a"), &[]);
    run("a" + "a" * maybe(), "aa", Some("aa"), &[]);
    run("a" + anyone() + "c" + "d" * maybe(), "abc", Some("abc"), &[]);
    run("a" + "b" * maybe() + "bc", "abbc", Some("abbc"), &[]);
    run("a" + "b" * maybe() + "bc", "abc", Some("abc"), &[]);
    run("a" + "b" * repeat_range(0, 1).unwrap() + "bc", "abc", Some("abc"), &[]);
    run("a" + "b" * maybe() + "bc", "abbbbc", None, &[]);
    run("a" + "b" * maybe() + "c", "abc", Some("abc"), &[]);
    run("a" + "b" * repeat_range(0, 1).unwrap() + "c", "abc", Some("abc"), &[]);
}

#[test]
fn test_either() {
    run("a" + Node::from(Either::of(["b", "c"])) + "d", "abc", None, &[]);
    run("a" + "bc" * either() + "d", "abd", Some("abd"), &[]);
    run(vec!["ab", "cd"] * either(), "abc", Some("ab"), &[]);
    run(vec!["ab", "cd"] * either(), "abcd", Some("ab"), &[]);

    let a_or_b = || Either::of(["a" * repeat_min(1), Node::from("b")]);
    run(a_or_b() * repeat(), "ab", Some("ab"), &[]);
    run(a_or_b() * repeat_min(1), "ab", Some("ab"), &[]);
    run(a_or_b() * maybe(), "ab", Some("a"), &[]);

    run("abcde" * either(), "e", Some("e"), &[]);
    run("abcde" * either() + "f", "ef", Some("ef"), &[]);
    run(padding() + Either::of(["ab", "cd"]) + "e", "abcde", Some("abcde"), &[]);
    run("abhgefdc" * either() + "ij", "hij", Some("hij"), &[]);
}

#[test]
fn test_either_ordering() {
    run(Either::of(["bd", "bc"]), "bc", Some("bc"), &[]);
    run(Either::of(["bd"]), "bc", None, &[]);
    // The first option that leads to an overall match wins.
    run(
        Either::of([Group::named("a", "k") + "b", Pattern::of(Group::named("ab", "k"))]),
        "ab",
        Some("ab"),
        &[("k", "a")],
    );
}

#[test]
fn test_exclude() {
    run("a" + "bc" * exclude() + "d", "aed", Some("aed"), &[]);
    run("a" + "bc" * exclude() + "d", "abd", None, &[]);
    run("ab" * exclude() * repeat(), "cde", Some("cde"), &[]);
}

#[test]
fn test_exclude_needs_an_element() {
    run("a" + "b" * exclude(), "a", None, &[]);
    run("a" + "b" * exclude() * maybe(), "a", Some("a"), &[]);
}

#[test]
fn test_misc() {
    let bc_e_r_g_1 = || "bc" * either() * repeat() * group_named("1");
    let bc_e_r_1_g_1 = || "bc" * either() * repeat_min(1) * group_named("1");

    run(padding() + "ab" * either() + "c" * repeat() + "d", "abcd", Some("abcd"), &[]);
    run(
        Node::from(Either::of([Pattern::of("ab"), "a" + b_s()])) + "bc",
        "abc",
        Some("abc"),
        &[],
    );
    run("a" + bc_e_r_g_1() + "c" * repeat(), "abc", Some("abc"), &[("1", "bc")]);
    run(
        "a" + bc_e_r_g_1() + ("c" * repeat() + "d") * group_named("2"),
        "abcd",
        Some("abcd"),
        &[("1", "bc"), ("2", "d")],
    );
    run(
        "a" + bc_e_r_1_g_1() + ("c" * repeat() + "d") * group_named("2"),
        "abcd",
        Some("abcd"),
        &[("1", "bc"), ("2", "d")],
    );
    run(
        "a" + bc_e_r_g_1() + ("c" * repeat_min(1) + "d") * group_named("2"),
        "abcd",
        Some("abcd"),
        &[("1", "b"), ("2", "cd")],
    );
    run("a" + "bcd" * either() * repeat() + "dcdcde", "adcdcde", Some("adcdcde"), &[]);
    run("a" + "bcd" * either() * repeat_min(1) + "dcdcde", "adcdcde", None, &[]);
    run(vec!["ab", "a"] * either() + b_s() + "c", "abc", Some("abc"), &[]);
    run(
        Group::of(Group::of("a") + Group::of("b") + Group::of("c")) + Group::of("d"),
        "abcd",
        Some("abcd"),
        &[],
    );
    run(
        anything() * group_named("1") + "c" + anything() * group_named("2"),
        "abcde",
        Some("abcde"),
        &[("1", "ab"), ("2", "de")],
    );
    run("k" * either(), "ab", None, &[]);
    run("a" + "-" * maybe() + "c", "ac", Some("ac"), &[]);
    run(
        Either::of([Group::of("a") + Group::of("b") + "c", Pattern::of("ab")]),
        "ab",
        Some("ab"),
        &[],
    );
    run("a" * group() * repeat_min(1) + "x", "aaax", Some("aaax"), &[]);
    run(
        "ac" * either() * group_named("1") * repeat_min(1) + "x",
        "aacx",
        Some("aacx"),
        &[("1", "c")],
    );
    run(
        Group::named("/" * exclude() * repeat() + "/", "1") * repeat() + "sub1/",
        "d:msgs/tdir/sub1/trial/away.cpp",
        Some("d:msgs/tdir/sub1/"),
        &[("1", "tdir/")],
    );

    let n_chunks = || ("N" * exclude() * repeat() + "N") * group_named("1") * repeat_min(1);
    run(n_chunks(), "abNNxyzN", Some("abNNxyzN"), &[("1", "xyzN")]);
    run(n_chunks(), "abNNxyz", Some("abNN"), &[("1", "N")]);

    run(abc_e() * repeat() * group_named("1") + "x", "abcx", Some("abcx"), &[("1", "abc")]);
    run(abc_e() * repeat() * group_named("1") + "x", "abc", None, &[]);
    run(
        padding() + "xyz" * either() * repeat() * group_named("1") + "x",
        "abcx",
        Some("abcx"),
        &[("1", "")],
    );
    run(
        Either::of([Group::of("a") * repeat_min(1) + "b", Pattern::of("aac")]),
        "aac",
        Some("aac"),
        &[],
    );
}

#[test]
fn test_not_greedy() {
    run("a" + anyone() * repeat_min(1).lazy() + "c", "abcabc", Some("abc"), &[]);
    run("a" + anyone() * repeat_min(1) + "c", "abcabc", Some("abcabc"), &[]);
}

#[test]
fn test_group_capture_and_undo() {
    run(
        Group::named("a", "k1") + "b" + Group::named("c", "k2"),
        "abc",
        Some("abc"),
        &[("k1", "a"), ("k2", "c")],
    );
    // k1 is bound on the abandoned first option only.
    run(
        Either::of([Group::named("a", "k1") + "x", Pattern::of("ab")]),
        "ab",
        Some("ab"),
        &[],
    );
}

#[test]
fn test_zero_width_repeat_terminates() {
    run(Pattern::default() * repeat() + "a", "a", Some("a"), &[]);
    run(("x" * maybe()) * repeat() + "b", "b", Some("b"), &[]);
    run(group_named("g") * repeat_min(2) + "a", "a", Some("a"), &[("g", "")]);
}

// ─── Non-string sequences ───────────────────────────────────────────────────

#[test]
fn test_list_prefix_keeps_container() {
    let mut m = Matcher::new();
    let value = Value::list([1, 2, 3, 4]);
    let result = m.matched_prefix(value, Node::from(1) + anyone() * repeat_range(1, 2).unwrap()).unwrap();
    assert_eq!(result, Some(Value::list([1, 2, 3])));

    let value = Value::tuple([1, 2, 3]);
    let result = m.matched_prefix(value, Pattern::of(vec![1, 2])).unwrap();
    assert_eq!(result, Some(Value::tuple([1, 2])));
}

#[test]
fn test_record_prefix_is_a_tuple() {
    let mut m = Matcher::new();
    let value = Value::record("Point", [0, 1, 2]);
    let result = m.matched_prefix(value, Node::from(0) + anything()).unwrap();
    assert_eq!(result, Some(Value::tuple([0, 1, 2])));
}

#[test]
fn test_bytes_prefix() {
    let mut m = Matcher::new();
    let value = Value::from(b"abc".to_vec());
    let result = m.matched_prefix(value, Pattern::of(vec![97, 98])).unwrap();
    assert_eq!(result, Some(Value::from(b"ab".to_vec())));
}

#[test]
fn test_types_inside_patterns() {
    let mut m = Matcher::new();
    let pattern = || Kind::Int * repeat() + Kind::Str;
    assert!(m.matches(Value::list([Value::from(1), Value::from(2), Value::from("x")]), pattern()).unwrap());
    assert!(!m.matches(Value::list([Value::from(1), Value::from(2.5)]), pattern()).unwrap());
}

#[test]
fn test_nested_structures_are_visited() {
    let mut m = Matcher::new();
    let value = Value::list([Value::from(1), Value::list([2, 3]), Value::from(4)]);
    let pattern = Node::from(1) + Node::list([anyone(), name("x")]) + 4;
    assert!(m.matches(value, pattern).unwrap());
    assert_eq!(m.lookup("x"), Ok(&Value::Int(3)));
}

#[test]
fn test_nested_pattern_matches_one_element() {
    let mut m = Matcher::new();
    let value = Value::list([Value::list([1, 2, 3]), Value::from(4)]);
    let inner = Node::from(1) + anything() * group_named("tail");
    let pattern = || Pattern::new(vec![Node::Pattern(inner.clone()), Node::from(4)]);

    let result = m.matched_prefix(value.clone(), pattern()).unwrap();
    assert_eq!(result, Some(value));
    assert_eq!(m.lookup("tail"), Ok(&Value::list([2, 3])));

    let flat = Value::list([1, 2, 3, 4]);
    assert!(!m.matches(flat, pattern()).unwrap());
}

#[test]
fn test_names_in_patterns_reconcile_with_outer_bindings() {
    let mut m = Matcher::new();
    let pattern = || Node::tuple([name("x"), Node::from(name("x") * repeat() + 2)]);
    assert!(m.matches(Value::tuple([Value::from(1), Value::list([1, 1, 2])]), pattern()).unwrap());
    assert_eq!(m.lookup("x"), Ok(&Value::Int(1)));
    assert!(!m.matches(Value::tuple([Value::from(2), Value::list([1, 1, 2])]), pattern()).unwrap());
}

#[test]
fn test_algebra_needs_a_sequence() {
    let mut m = Matcher::new();
    assert!(!m.matches(5, Node::from(5) * repeat()).unwrap());
}

// ─── Binders and predicates ─────────────────────────────────────────────────

fn odd_num(value: &Value) -> Result<Value, PredicateError> {
    let n = value
        .as_int()
        .ok_or_else(|| PredicateError::Type(format!("{value} is not an integer")))?;
    Ok(Value::Int(if n % 2 != 0 { n } else { 0 }))
}

#[test]
fn test_bind_any() {
    let mut m = Matcher::new();
    assert!(m.matches(Value::list([0, 1, 2]), Node::list([anyone(), anyone(), anyone()])).unwrap());
}

#[test]
fn test_bind_repeat() {
    let mut m = Matcher::new();
    let pattern = Node::from(1) * repeat() + name("value") * repeat() + 3;
    assert!(m.matches(Value::list([1, 1, 1, 2, 2, 3]), pattern).unwrap());
    assert_eq!(m.lookup("value"), Ok(&Value::Int(2)));
}

#[test]
fn test_bind_repeat_alternate() {
    let mut m = Matcher::new();
    let pattern = anyone() * repeat() + anyone() * group_named("value") + vec![2, 1] + anyone();
    assert!(m.matches(Value::list([0, 1, 2, 1, 2]), pattern).unwrap());
    assert_eq!(m.lookup("value"), Ok(&Value::list([1])));
}

#[test]
fn test_bind_padding_name() {
    let mut m = Matcher::new();
    let pattern = padding() + vec![name("value"), name("other"), name("value"), Node::from(3)];
    assert!(m.matches(Value::list([1, 2, 1, 2, 1, 2, 3]), pattern).unwrap());
    assert_eq!(m.lookup("value"), Ok(&Value::Int(2)));
    assert_eq!(m.lookup("other"), Ok(&Value::Int(1)));
}

#[test]
fn test_bind_padding_like() {
    let mut m = Matcher::new();
    let odd = |bind: &str| Node::from(like(odd_num).bind_as(bind));
    let pattern = padding() + vec![odd("value"), odd("other"), odd("value"), Node::from(2)];
    assert!(m.matches(Value::list([3, 5, 3, 5, 3, 5, 2]), pattern).unwrap());
    assert_eq!(m.lookup("value"), Ok(&Value::Int(5)));
    assert_eq!(m.lookup("other"), Ok(&Value::Int(3)));
}

#[test]
fn test_like_regex_binds_matched_text() {
    let mut m = Matcher::new();
    let word = like_regex("[a-z]+").unwrap().bind_as("word");
    assert!(m.matches("hello1", word.clone()).unwrap());
    assert_eq!(m.lookup("word"), Ok(&Value::from("hello")));
    assert!(!m.matches("1hello", word.clone()).unwrap());
    assert!(!m.matches(7, word).unwrap());
}

#[test]
fn test_expected_predicate_errors_are_mismatches() {
    let mut m = Matcher::new();
    assert!(!m.matches("text", like(odd_num)).unwrap());
    assert!(!m.matches(4, like(odd_num)).unwrap());
    assert!(m.matches(5, like(odd_num)).unwrap());
}

#[test]
fn test_fatal_predicate_error_propagates() {
    let mut m = Matcher::new();
    assert!(m.matches(1, 1).unwrap());
    let boom = || like(|_: &Value| -> Result<bool, PredicateError> { Err(anyhow::anyhow!("boom").into()) });

    let err = m.matches(1, boom()).unwrap_err();
    assert!(matches!(err, MatchError::Predicate(_)));

    // Raised from deep inside a backtracking search.
    let err = m.matches("ab", "a" * repeat() + boom()).unwrap_err();
    assert!(matches!(err, MatchError::Predicate(_)));

    assert_eq!(m.bound().len(), 1);
    assert_eq!(m.captures().depth(), 0);
}

// ─── Search depth ───────────────────────────────────────────────────────────

#[test]
fn test_depth_limit_is_an_error() {
    let mut m = Matcher::new().with_max_depth(64);
    let text = "a".repeat(100) + "c";
    let err = m.matches(text.as_str(), "a" * repeat() + "c").unwrap_err();
    assert!(matches!(err, MatchError::DepthExceeded { limit: 64 }));
    assert!(m.bound().is_empty());
    assert_eq!(m.captures().depth(), 0);

    // The counter unwinds with the search.
    assert!(m.matches("aac", "a" * repeat() + "c").unwrap());
    assert_eq!(m.fork().max_depth(), 64);
}

#[test]
fn test_long_input_stops_at_default_limit() {
    let mut m = Matcher::new();
    assert_eq!(m.max_depth(), crate::matcher::DEFAULT_MAX_DEPTH);

    let text = "a".repeat(300) + "c";
    assert!(m.matches(text.as_str(), "a" * repeat() + "c").unwrap());

    let text = "a".repeat(5000) + "c";
    let err = m.matches(text.as_str(), "a" * repeat() + "c").unwrap_err();
    assert!(matches!(err, MatchError::DepthExceeded { .. }));
}
