//! End-to-end behavior of the front end over whole programs: pre-pass,
//! parse, render, read back.

use jack_core::tagged::{self, Element};
use jack_core::{
    build_registry, compile_batch, lex, load_path, parse_source, Grammar, JackError, Node, Rule,
    TokenKind, TypeRegistry, Unit,
};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn parse(src: &str) -> Result<Node, JackError> {
    parse_source(&Grammar::new(), &TypeRegistry::new(), src, "Test.jack")
}

/// Wrap statements in a function of class `Test`.
fn in_function(body: &str) -> String {
    format!(
        "class Test {{\n  function void f() {{\n    {}\n    return;\n  }}\n}}\n",
        body
    )
}

#[test]
fn square_program_parses_and_reads_back() {
    let units = load_path(&fixtures().join("square")).unwrap();
    assert_eq!(units.len(), 3);
    for (unit, result) in units.iter().zip(compile_batch(&units)) {
        let tree = result.unwrap_or_else(|e| panic!("{}: {}", unit.file_name(), e));
        assert_eq!(tree.rule(), Some(Rule::Class));

        let rendered = tree.to_xml();
        let element = tagged::parse(&rendered).unwrap();
        assert_eq!(Node::try_from(&element).unwrap(), tree);
        assert_eq!(Element::from(&tree), element);
    }
}

#[test]
fn tree_leaves_are_the_token_stream() {
    let units = load_path(&fixtures().join("square")).unwrap();
    let results = compile_batch(&units);
    for (unit, result) in units.iter().zip(results) {
        let tree = result.unwrap();
        let tokens = lex(&unit.source, &unit.file_name()).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(tree.leaf_texts(), texts, "{}", unit.file_name());
    }
}

#[test]
fn string_with_markup_characters_survives_rendering() {
    let units = load_path(&fixtures().join("square")).unwrap();
    let index = units.iter().position(|u| u.stem() == "SquareGame").unwrap();
    let tree = compile_batch(&units).remove(index).unwrap();
    let xml = tree.to_xml();
    assert!(xml.contains("<stringConstant> Bye &amp; see you &lt;3 </stringConstant>"));
}

#[test]
fn type_from_another_unit_needs_the_pre_pass() {
    let foo = Unit::new("Foo.jack", "class Foo { field Bar b; }");
    let bar = Unit::new("Bar.jack", "class Bar { }");
    let grammar = Grammar::new();

    let without = jack_core::parse_unit(&grammar, &TypeRegistry::new(), &foo);
    match without {
        Err(JackError::Syntax {
            expected, found, ..
        }) => {
            assert!(expected.contains(&"className".to_owned()));
            assert_eq!(found, "identifier `Bar`");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }

    let registry = build_registry(&[foo.clone(), bar]);
    assert!(registry.is_registered("Bar"));
    assert!(jack_core::parse_unit(&grammar, &registry, &foo).is_ok());
}

#[test]
fn plain_and_qualified_calls() {
    let plain = parse(&in_function("do foo();")).unwrap();
    let stmt = plain.find_all(Rule::DoStatement).remove(0);
    let tags: Vec<_> = stmt.children().iter().map(Node::tag).collect();
    assert_eq!(
        tags,
        vec!["keyword", "identifier", "symbol", "expressionList", "symbol", "symbol"]
    );

    let qualified = parse(&in_function("do foo.bar();")).unwrap();
    let stmt = qualified.find_all(Rule::DoStatement).remove(0);
    assert_eq!(stmt.leaf_texts(), vec!["do", "foo", ".", "bar", "(", ")", ";"]);
    assert_eq!(stmt.children().len(), 8);
}

#[test]
fn let_with_number_target_is_a_syntax_error() {
    let err = parse(&in_function("let 5 = 1;")).unwrap_err();
    match err {
        JackError::Syntax {
            line,
            expected,
            found,
            ..
        } => {
            assert_eq!(line, 3);
            assert!(expected.iter().any(|e| e == "identifier"));
            assert_eq!(found, "integerConstant `5`");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn misplaced_tokens_name_their_candidates() {
    let err = parse(&in_function("let x = 1; var int y;")).unwrap_err();
    match err {
        JackError::Syntax {
            expected, found, ..
        } => {
            // declarations must come before the first statement
            assert_eq!(expected, vec!["symbol `}`"]);
            assert_eq!(found, "keyword `var`");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
    let err = parse("class T { function void f() { let x = ; } }").unwrap_err();
    match err {
        JackError::Syntax { expected, found, .. } => {
            assert_eq!(expected.len(), 8);
            assert!(expected.contains(&"subroutineCall".to_owned()));
            assert_eq!(found, "symbol `;`");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn builtin_types_are_always_known() {
    let src = "class T { field Array a; field String s; method Math m() { return; } }";
    assert!(parse(src).is_ok());
}

#[test]
fn lexical_error_aborts_the_parse() {
    let err = parse(&in_function("let x = 1a;")).unwrap_err();
    assert_eq!(err.kind_name(), "lex");
    assert_eq!(err.line(), 3);
}

#[test]
fn missing_closing_brace_is_unfinished_program() {
    let err = parse("class T {\n  function void f() {\n    return;\n  }\n").unwrap_err();
    assert!(matches!(err, JackError::UnexpectedEof { line: 4, .. }));
    assert!(err.to_string().contains("unfinished program"));
}

#[test]
fn empty_class_and_empty_lists() {
    let tree = parse("class E { function void f() { do g(); return; } }").unwrap();
    let params = tree.find_all(Rule::ParameterList);
    assert_eq!(params.len(), 1);
    assert!(params[0].children().is_empty());
    let args = tree.find_all(Rule::ExpressionList);
    assert!(args[0].children().is_empty());
    assert!(tree.to_xml().contains("<parameterList>\n    </parameterList>\n"));
}

#[test]
fn json_rendering_mirrors_tree() {
    let tree = parse("class J { }").unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["rule"], "class");
    let kinds: Vec<_> = json["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["kind"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(kinds, vec!["keyword", "identifier", "symbol", "symbol"]);
}

#[test]
fn integer_and_string_terminals_keep_their_text() {
    let tree = parse(&in_function("let x = \"two  spaces\" + 007;")).unwrap();
    let leaves: Vec<(TokenKind, String)> = tree
        .find_all(Rule::Term)
        .into_iter()
        .flat_map(|t| t.children())
        .filter_map(|n| match n {
            Node::Terminal { kind, text } => Some((*kind, text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        leaves,
        vec![
            (TokenKind::StringConstant, "two  spaces".to_owned()),
            (TokenKind::IntegerConstant, "007".to_owned()),
        ]
    );
}

#[test]
fn deeply_nested_expression_fails_without_stopping_the_batch() {
    let depth = 1000;
    let deep = Unit::new(
        "Deep.jack",
        in_function(&format!(
            "let x = {}1{};",
            "(".repeat(depth),
            ")".repeat(depth)
        )),
    );
    let fine = Unit::new("Fine.jack", in_function("let x = ((1));"));

    let results = compile_batch(&[deep, fine]);
    match &results[0] {
        Err(err) => {
            assert_eq!(err.kind_name(), "too_deep");
            assert_eq!(err.line(), 3);
        }
        Ok(_) => panic!("nesting {} levels deep should fail", depth),
    }
    assert!(results[1].is_ok());
}
