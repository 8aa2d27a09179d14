// RFC 9535 Compliance Tests
//
// Examples from the RFC, grouped by the section that introduces them. Each
// case lists the query, the expected values and the expected paths.

use jpq::{Environment, Value};
use serde_json::json;

struct Case {
    query: &'static str,
    values: serde_json::Value,
    paths: &'static [&'static str],
}

fn case(query: &'static str, values: serde_json::Value, paths: &'static [&'static str]) -> Case {
    Case {
        query,
        values,
        paths,
    }
}

fn run_cases(document: serde_json::Value, cases: Vec<Case>) {
    let env = Environment::new();
    let document = Value::from(document);

    for case in cases {
        let nodes = env
            .query(case.query, &document)
            .unwrap_or_else(|e| panic!("query {} failed: {}", case.query, e));

        let values: Vec<serde_json::Value> = nodes
            .iter()
            .map(|node| serde_json::Value::from(node.value.clone()))
            .collect();
        let paths: Vec<String> = nodes.iter().map(|node| node.path()).collect();

        assert_eq!(
            serde_json::Value::Array(values),
            case.values,
            "Values differ for {}",
            case.query
        );
        assert_eq!(paths, case.paths, "Paths differ for {}", case.query);
    }
}

fn assert_invalid(queries: &[&str]) {
    let env = Environment::new();
    for query in queries {
        assert!(env.parse(query).is_err(), "{} should not parse", query);
    }
}

// ============================================================================
// Section 1.5: Overview Examples
// ============================================================================

fn bookstore() -> serde_json::Value {
    json!({
        "store": {
            "book": [
                {"category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95},
                {"category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99},
                {"category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
                {"category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
            ],
            "bicycle": {"color": "red", "price": 399}
        }
    })
}

#[test]
fn rfc_overview_examples() {
    run_cases(
        bookstore(),
        vec![
            case(
                "$.store.book[*].author",
                json!(["Nigel Rees", "Evelyn Waugh", "Herman Melville", "J. R. R. Tolkien"]),
                &[
                    "$['store']['book'][0]['author']",
                    "$['store']['book'][1]['author']",
                    "$['store']['book'][2]['author']",
                    "$['store']['book'][3]['author']",
                ],
            ),
            case(
                "$..book[2].author",
                json!(["Herman Melville"]),
                &["$['store']['book'][2]['author']"],
            ),
            case("$..book[2].publisher", json!([]), &[]),
            case(
                "$..book[-1].title",
                json!(["The Lord of the Rings"]),
                &["$['store']['book'][3]['title']"],
            ),
            case(
                "$..book[0,1].title",
                json!(["Sayings of the Century", "Sword of Honour"]),
                &["$['store']['book'][0]['title']", "$['store']['book'][1]['title']"],
            ),
            case(
                "$..book[:2].title",
                json!(["Sayings of the Century", "Sword of Honour"]),
                &["$['store']['book'][0]['title']", "$['store']['book'][1]['title']"],
            ),
            case(
                "$..book[?@.isbn].title",
                json!(["Moby Dick", "The Lord of the Rings"]),
                &["$['store']['book'][2]['title']", "$['store']['book'][3]['title']"],
            ),
            case(
                "$..book[?@.price<10].title",
                json!(["Sayings of the Century", "Moby Dick"]),
                &["$['store']['book'][0]['title']", "$['store']['book'][2]['title']"],
            ),
        ],
    );
}

#[test]
fn rfc_overview_all_member_values() {
    let env = Environment::new();
    let document = Value::from(bookstore());
    let nodes = env.query("$..*", &document).unwrap();
    assert_eq!(nodes.len(), 27);
    assert_eq!(nodes[0].path(), "$['store']");
}

// ============================================================================
// Section 2.3.1: Name Selector
// ============================================================================

#[test]
fn rfc_name_selector() {
    run_cases(
        json!({"o": {"j j": {"k.k": 3}}, "'": {"@": 2}}),
        vec![
            case("$.o['j j']", json!([{"k.k": 3}]), &["$['o']['j j']"]),
            case("$.o['j j']['k.k']", json!([3]), &["$['o']['j j']['k.k']"]),
            case(r#"$.o["j j"]["k.k"]"#, json!([3]), &["$['o']['j j']['k.k']"]),
            case(r#"$["'"]["@"]"#, json!([2]), &[r"$['\'']['@']"]),
        ],
    );
}

// ============================================================================
// Section 2.3.2: Wildcard Selector
// ============================================================================

#[test]
fn rfc_wildcard_selector() {
    run_cases(
        json!({"o": {"j": 1, "k": 2}, "a": [5, 3]}),
        vec![
            case("$[*]", json!([{"j": 1, "k": 2}, [5, 3]]), &["$['o']", "$['a']"]),
            case("$.o[*]", json!([1, 2]), &["$['o']['j']", "$['o']['k']"]),
            case(
                "$.o[*, *]",
                json!([1, 2, 1, 2]),
                &["$['o']['j']", "$['o']['k']", "$['o']['j']", "$['o']['k']"],
            ),
            case("$.a[*]", json!([5, 3]), &["$['a'][0]", "$['a'][1]"]),
        ],
    );
}

// ============================================================================
// Section 2.3.3: Index Selector
// ============================================================================

#[test]
fn rfc_index_selector() {
    run_cases(
        json!(["a", "b"]),
        vec![
            case("$[1]", json!(["b"]), &["$[1]"]),
            case("$[-2]", json!(["a"]), &["$[0]"]),
        ],
    );
}

// ============================================================================
// Section 2.3.4: Array Slice Selector
// ============================================================================

#[test]
fn rfc_slice_selector() {
    run_cases(
        json!(["a", "b", "c", "d", "e", "f", "g"]),
        vec![
            case("$[1:3]", json!(["b", "c"]), &["$[1]", "$[2]"]),
            case("$[5:]", json!(["f", "g"]), &["$[5]", "$[6]"]),
            case("$[1:5:2]", json!(["b", "d"]), &["$[1]", "$[3]"]),
            case("$[5:1:-2]", json!(["f", "d"]), &["$[5]", "$[3]"]),
            case(
                "$[::-1]",
                json!(["g", "f", "e", "d", "c", "b", "a"]),
                &["$[6]", "$[5]", "$[4]", "$[3]", "$[2]", "$[1]", "$[0]"],
            ),
        ],
    );
}

// ============================================================================
// Section 2.3.5: Filter Selector
// ============================================================================

fn filter_document() -> serde_json::Value {
    json!({
        "a": [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}],
        "o": {"p": 1, "q": 2, "r": 3, "s": 5, "t": {"u": 6}},
        "e": "f"
    })
}

#[test]
fn rfc_filter_selector() {
    run_cases(
        filter_document(),
        vec![
            case("$.a[?@.b == 'kilo']", json!([{"b": "kilo"}]), &["$['a'][9]"]),
            case("$.a[?(@.b == 'kilo')]", json!([{"b": "kilo"}]), &["$['a'][9]"]),
            case("$.a[?@>3.5]", json!([5, 4, 6]), &["$['a'][1]", "$['a'][4]", "$['a'][5]"]),
            case(
                "$.a[?@.b]",
                json!([{"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]),
                &["$['a'][6]", "$['a'][7]", "$['a'][8]", "$['a'][9]"],
            ),
            case(
                "$[?@.*]",
                json!([
                    [3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}],
                    {"p": 1, "q": 2, "r": 3, "s": 5, "t": {"u": 6}}
                ]),
                &["$['a']", "$['o']"],
            ),
            case("$[?@[?@.b]]", json!([[3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]]), &["$['a']"]),
            case(
                "$.o[?@<3, ?@<3]",
                json!([1, 2, 1, 2]),
                &["$['o']['p']", "$['o']['q']", "$['o']['p']", "$['o']['q']"],
            ),
            case(
                "$.a[?@<2 || @.b == \"k\"]",
                json!([1, {"b": "k"}]),
                &["$['a'][2]", "$['a'][7]"],
            ),
            case(
                "$.a[?match(@.b, \"[jk]\")]",
                json!([{"b": "j"}, {"b": "k"}]),
                &["$['a'][6]", "$['a'][7]"],
            ),
            case(
                "$.a[?search(@.b, \"[jk]\")]",
                json!([{"b": "j"}, {"b": "k"}, {"b": "kilo"}]),
                &["$['a'][6]", "$['a'][7]", "$['a'][9]"],
            ),
            case("$.o[?@>1 && @<4]", json!([2, 3]), &["$['o']['q']", "$['o']['r']"]),
            case(
                "$.o[?@.u || @.x]",
                json!([{"u": 6}]),
                &["$['o']['t']"],
            ),
            case(
                "$.a[?@.b == $.x]",
                json!([3, 5, 1, 2, 4, 6]),
                &["$['a'][0]", "$['a'][1]", "$['a'][2]", "$['a'][3]", "$['a'][4]", "$['a'][5]"],
            ),
            case(
                "$.a[?@ == @]",
                json!([3, 5, 1, 2, 4, 6, {"b": "j"}, {"b": "k"}, {"b": {}}, {"b": "kilo"}]),
                &[
                    "$['a'][0]", "$['a'][1]", "$['a'][2]", "$['a'][3]", "$['a'][4]",
                    "$['a'][5]", "$['a'][6]", "$['a'][7]", "$['a'][8]", "$['a'][9]",
                ],
            ),
        ],
    );
}

// ============================================================================
// Section 2.3.5.3: Comparison Examples
// ============================================================================

#[test]
fn rfc_comparisons() {
    let env = Environment::new();
    let document = Value::from(json!({"obj": {"x": "y"}, "arr": [2, 3]}));

    let cases = vec![
        ("$.absent1 == $.absent2", true),
        ("$.absent1 <= $.absent2", true),
        ("$.absent == 'g'", false),
        ("$.absent1 != $.absent2", false),
        ("$.absent != 'g'", true),
        ("1 <= 2", true),
        ("1 > 2", false),
        ("13 == '13'", false),
        ("'a' <= 'b'", true),
        ("'a' > 'b'", false),
        ("$.obj == $.arr", false),
        ("$.obj != $.arr", true),
        ("$.obj == $.obj", true),
        ("$.obj != $.obj", false),
        ("$.arr == $.arr", true),
        ("$.arr != $.arr", false),
        ("$.obj == 17", false),
        ("$.obj != 17", true),
        ("$.obj <= $.arr", false),
        ("$.obj < $.arr", false),
        ("$.obj <= $.obj", true),
        ("$.arr <= $.arr", true),
        ("1 <= $.arr", false),
        ("1 >= $.arr", false),
        ("1 > $.arr", false),
        ("1 < $.arr", false),
        ("true <= true", true),
        ("true > true", false),
    ];

    // The root has two members and the comparisons ignore `@`, so a true
    // comparison selects both of them.
    for (comparison, expected) in cases {
        let query = format!("$[?{}]", comparison);
        let nodes = env
            .query(&query, &document)
            .unwrap_or_else(|e| panic!("{} failed: {}", comparison, e));
        assert_eq!(nodes.len() == 2, expected, "Failed for {}", comparison);
    }
}

// ============================================================================
// Section 2.4: Function Extensions
// ============================================================================

#[test]
fn rfc_function_well_typedness() {
    let env = Environment::new();

    let valid = [
        "$[?length(@) < 3]",
        "$[?count(@.*) == 1]",
        "$[?match(@.timezone, 'Europe/.*')]",
        "$[?value(@..color) == \"red\"]",
    ];
    for query in valid {
        assert!(env.parse(query).is_ok(), "{} should parse", query);
    }

    assert_invalid(&[
        "$[?length(@.*) < 3]",
        "$[?match(@.timezone, 'Europe/.*') == true]",
        "$[?value(@..color)]",
    ]);
}

#[test]
fn rfc_nodes_parameter_accepts_literal() {
    // NodesType parameters accept any expression; count() of a non-list
    // argument is Nothing, which equals no value.
    let env = Environment::new();
    let document = Value::from(json!([1]));
    assert!(env.query("$[?count(1) == 1]", &document).unwrap().is_empty());
}

// ============================================================================
// Section 2.5.2: Descendant Segment
// ============================================================================

#[test]
fn rfc_descendant_segment() {
    run_cases(
        json!({"o": {"j": 1, "k": 2}, "a": [5, 3, [{"j": 4}, {"k": 6}]]}),
        vec![
            case("$..j", json!([1, 4]), &["$['o']['j']", "$['a'][2][0]['j']"]),
            case(
                "$..[0]",
                json!([5, {"j": 4}]),
                &["$['a'][0]", "$['a'][2][0]"],
            ),
            case(
                "$..[*]",
                json!([
                    {"j": 1, "k": 2},
                    [5, 3, [{"j": 4}, {"k": 6}]],
                    1, 2, 5, 3,
                    [{"j": 4}, {"k": 6}],
                    {"j": 4}, {"k": 6}, 4, 6
                ]),
                &[
                    "$['o']", "$['a']", "$['o']['j']", "$['o']['k']", "$['a'][0]",
                    "$['a'][1]", "$['a'][2]", "$['a'][2][0]", "$['a'][2][1]",
                    "$['a'][2][0]['j']", "$['a'][2][1]['k']",
                ],
            ),
            case("$..o", json!([{"j": 1, "k": 2}]), &["$['o']"]),
            case(
                "$.o..[*, *]",
                json!([1, 2, 1, 2]),
                &["$['o']['j']", "$['o']['k']", "$['o']['j']", "$['o']['k']"],
            ),
            case(
                "$.a..[0, 1]",
                json!([5, 3, {"j": 4}, {"k": 6}]),
                &["$['a'][0]", "$['a'][1]", "$['a'][2][0]", "$['a'][2][1]"],
            ),
        ],
    );
}

// ============================================================================
// Section 2.6: Semantics of null
// ============================================================================

#[test]
fn rfc_null_semantics() {
    run_cases(
        json!({"a": null, "b": [null], "c": [{}], "null": 1}),
        vec![
            case("$.a", json!([null]), &["$['a']"]),
            case("$.a[0]", json!([]), &[]),
            case("$.a.d", json!([]), &[]),
            case("$.b[0]", json!([null]), &["$['b'][0]"]),
            case("$.b[*]", json!([null]), &["$['b'][0]"]),
            case("$.b[?@]", json!([null]), &["$['b'][0]"]),
            case("$.b[?@==null]", json!([null]), &["$['b'][0]"]),
            case("$.c[?@.d==null]", json!([]), &[]),
            case("$.null", json!([1]), &["$['null']"]),
        ],
    );
}

// ============================================================================
// Invalid Queries
// ============================================================================

#[test]
fn rfc_invalid_queries() {
    assert_invalid(&[
        "$.a[?@.b == 1 == 2]",
        "$[?@.a == @.*]",
        "$[?@..a == 1]",
        "$[?1]",
        "$[?'a' && @.b]",
        "$[01]",
        "$[-0]",
        "$[1.0]",
        "$.1",
        "$['\\uD800']",
        "$[?@.a = 1]",
        "$..",
        "$...a",
        "$[",
        "$]",
        "$['a'",
        "$[?@.a",
    ]);
}
