//! The Jack grammar, expressed with [`Syntax`] combinators.
//!
//! Each [`Rule`] produces one non-terminal node in the parse tree. Helper
//! alternations (`type`, `op`, `subroutineCall`, ...) are spliced into rule
//! bodies and produce no node of their own.

use crate::syntax::Syntax;
use crate::syntax::Syntax::{Identifier, IntegerConstant, Keyword, StringConstant, Symbol, TypeName};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
}

impl Rule {
    pub const ALL: [Rule; 15] = [
        Rule::Class,
        Rule::ClassVarDec,
        Rule::SubroutineDec,
        Rule::ParameterList,
        Rule::SubroutineBody,
        Rule::VarDec,
        Rule::Statements,
        Rule::LetStatement,
        Rule::IfStatement,
        Rule::WhileStatement,
        Rule::DoStatement,
        Rule::ReturnStatement,
        Rule::Expression,
        Rule::Term,
        Rule::ExpressionList,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Rule::Class => "class",
            Rule::ClassVarDec => "classVarDec",
            Rule::SubroutineDec => "subroutineDec",
            Rule::ParameterList => "parameterList",
            Rule::SubroutineBody => "subroutineBody",
            Rule::VarDec => "varDec",
            Rule::Statements => "statements",
            Rule::LetStatement => "letStatement",
            Rule::IfStatement => "ifStatement",
            Rule::WhileStatement => "whileStatement",
            Rule::DoStatement => "doStatement",
            Rule::ReturnStatement => "returnStatement",
            Rule::Expression => "expression",
            Rule::Term => "term",
            Rule::ExpressionList => "expressionList",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|r| r.tag() == tag)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Rule bodies, indexed by [`Rule`]. Built once and shared by reference.
#[derive(Debug, Clone)]
pub struct Grammar {
    bodies: Vec<Syntax>,
}

fn rule(r: Rule) -> Syntax {
    Syntax::Rule(r)
}

fn seq(items: Vec<Syntax>) -> Syntax {
    Syntax::Seq {
        items,
        lookahead: 0,
    }
}

fn one_of(name: &'static str, options: Vec<Syntax>) -> Syntax {
    Syntax::OneOf { name, options }
}

fn keywords(name: &'static str, words: &[&'static str]) -> Syntax {
    one_of(name, words.iter().map(|w| Keyword(*w)).collect())
}

fn symbols(name: &'static str, chars: &str) -> Syntax {
    one_of(name, chars.chars().map(Symbol).collect())
}

/// `int | char | boolean | className`
fn type_() -> Syntax {
    one_of(
        "type",
        vec![Keyword("int"), Keyword("char"), Keyword("boolean"), TypeName],
    )
}

fn op() -> Syntax {
    symbols("op", "+-*/&|<>=")
}

fn unary_op() -> Syntax {
    symbols("unaryOp", "-~")
}

fn keyword_constant() -> Syntax {
    keywords("keywordConstant", &["true", "false", "null", "this"])
}

/// `subroutineName '(' expressionList ')'` or
/// `(className | varName) '.' subroutineName '(' expressionList ')'`
fn subroutine_call() -> Syntax {
    let args = || {
        vec![
            Symbol('('),
            rule(Rule::ExpressionList),
            Symbol(')'),
        ]
    };
    let mut plain = vec![Identifier];
    plain.extend(args());
    let mut qualified = vec![
        one_of("receiver", vec![TypeName, Identifier]),
        Symbol('.'),
        Identifier,
    ];
    qualified.extend(args());
    Syntax::Call {
        plain: Box::new(Syntax::Seq {
            items: plain,
            lookahead: 1,
        }),
        qualified: Box::new(Syntax::Seq {
            items: qualified,
            lookahead: 1,
        }),
    }
}

fn body(r: Rule) -> Syntax {
    match r {
        Rule::Class => seq(vec![
            Keyword("class"),
            Identifier,
            Symbol('{'),
            Syntax::Repeat(vec![rule(Rule::ClassVarDec)]),
            Syntax::Repeat(vec![rule(Rule::SubroutineDec)]),
            Symbol('}'),
        ]),
        Rule::ClassVarDec => seq(vec![
            keywords("classVarKind", &["static", "field"]),
            type_(),
            Identifier,
            Syntax::Repeat(vec![Symbol(','), Identifier]),
            Symbol(';'),
        ]),
        Rule::SubroutineDec => seq(vec![
            keywords("subroutineKind", &["constructor", "function", "method"]),
            one_of("returnType", vec![Keyword("void"), type_()]),
            Identifier,
            Symbol('('),
            rule(Rule::ParameterList),
            Symbol(')'),
            rule(Rule::SubroutineBody),
        ]),
        Rule::ParameterList => Syntax::Optional(vec![
            type_(),
            Identifier,
            Syntax::Repeat(vec![Symbol(','), type_(), Identifier]),
        ]),
        Rule::SubroutineBody => seq(vec![
            Symbol('{'),
            Syntax::Repeat(vec![rule(Rule::VarDec)]),
            rule(Rule::Statements),
            Symbol('}'),
        ]),
        Rule::VarDec => seq(vec![
            Keyword("var"),
            type_(),
            Identifier,
            Syntax::Repeat(vec![Symbol(','), Identifier]),
            Symbol(';'),
        ]),
        Rule::Statements => Syntax::Repeat(vec![one_of(
            "statement",
            vec![
                rule(Rule::LetStatement),
                rule(Rule::IfStatement),
                rule(Rule::WhileStatement),
                rule(Rule::DoStatement),
                rule(Rule::ReturnStatement),
            ],
        )]),
        Rule::LetStatement => seq(vec![
            Keyword("let"),
            Identifier,
            Syntax::Optional(vec![Symbol('['), rule(Rule::Expression), Symbol(']')]),
            Symbol('='),
            rule(Rule::Expression),
            Symbol(';'),
        ]),
        Rule::IfStatement => seq(vec![
            Keyword("if"),
            Symbol('('),
            rule(Rule::Expression),
            Symbol(')'),
            Symbol('{'),
            rule(Rule::Statements),
            Symbol('}'),
            Syntax::Optional(vec![
                Keyword("else"),
                Symbol('{'),
                rule(Rule::Statements),
                Symbol('}'),
            ]),
        ]),
        Rule::WhileStatement => seq(vec![
            Keyword("while"),
            Symbol('('),
            rule(Rule::Expression),
            Symbol(')'),
            Symbol('{'),
            rule(Rule::Statements),
            Symbol('}'),
        ]),
        Rule::DoStatement => seq(vec![Keyword("do"), subroutine_call(), Symbol(';')]),
        Rule::ReturnStatement => seq(vec![
            Keyword("return"),
            Syntax::Optional(vec![rule(Rule::Expression)]),
            Symbol(';'),
        ]),
        Rule::Expression => seq(vec![
            rule(Rule::Term),
            Syntax::Repeat(vec![op(), rule(Rule::Term)]),
        ]),
        // Order matters: `name[` and calls are tried before a bare name.
        Rule::Term => one_of(
            "term",
            vec![
                IntegerConstant,
                StringConstant,
                keyword_constant(),
                Syntax::Seq {
                    items: vec![
                        Identifier,
                        Symbol('['),
                        rule(Rule::Expression),
                        Symbol(']'),
                    ],
                    lookahead: 1,
                },
                subroutine_call(),
                Identifier,
                seq(vec![Symbol('('), rule(Rule::Expression), Symbol(')')]),
                seq(vec![unary_op(), rule(Rule::Term)]),
            ],
        ),
        Rule::ExpressionList => Syntax::Optional(vec![
            rule(Rule::Expression),
            Syntax::Repeat(vec![Symbol(','), rule(Rule::Expression)]),
        ]),
    }
}

impl Grammar {
    pub fn new() -> Self {
        Grammar {
            bodies: Rule::ALL.into_iter().map(body).collect(),
        }
    }

    pub fn body(&self, rule: Rule) -> &Syntax {
        &self.bodies[rule.index()]
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for r in Rule::ALL {
            assert_eq!(Rule::from_tag(r.tag()), Some(r));
        }
        assert_eq!(Rule::from_tag("type"), None);
        assert_eq!(Rule::from_tag("subroutineCall"), None);
    }

    #[test]
    fn table_is_indexed_by_rule() {
        let g = Grammar::new();
        assert!(matches!(g.body(Rule::Statements), Syntax::Repeat(_)));
        assert!(matches!(g.body(Rule::ParameterList), Syntax::Optional(_)));
        assert!(matches!(
            g.body(Rule::Term),
            Syntax::OneOf { name: "term", .. }
        ));
        for r in Rule::ALL {
            // index() must agree with declaration order
            assert_eq!(Rule::ALL[r.index()], r);
        }
    }

    #[test]
    fn rule_serializes_as_tag() {
        let json = serde_json::to_string(&Rule::SubroutineDec).unwrap();
        assert_eq!(json, "\"subroutineDec\"");
    }
}
