//! End-to-end: token definitions, an input text, and grammar rules over
//! the resulting tokens, all going through the public API.

use anyhow::Result;
use sedge::lexer::{GrammarBuilder, Lexer};
use sedge::parser::{RuleLabel, RuleSetBuilder};
use sedge::stream::StringStream;
use std::path::Path;

#[test]
fn lex_then_compile_rules() -> Result<()> {
    let grammar = GrammarBuilder::new()
        .with_terminal("Name", "[a-zA-Z_][a-zA-Z_0-9]*")
        .with_terminal("Num", "[0-9]+")
        .with_terminal("Comma", ",")
        .with_ignored("Blank", "[ \t\r\n]+")
        .build()?;

    let rules = RuleSetBuilder::new(
        &grammar,
        StringStream::new(
            Path::new("<rules>"),
            "call = Name args ;\nargs = Num (Comma Num)* ;",
        ),
    )
    .build()?;

    let lexer = Lexer::new(grammar);
    let tokens: sedge::error::Result<Vec<_>> = lexer
        .lex(StringStream::new(Path::new("<input>"), "foo 1, 23, 456"))
        .collect();
    let tokens = tokens?;
    assert_eq!(tokens.len(), 6);
    assert_eq!(tokens[0].name(), "Name");
    assert_eq!(tokens[0].lexeme(), "foo");
    assert_eq!(tokens[5].lexeme(), "456");

    // The `args` rule accepts the token shape the lexer just produced.
    let grammar = lexer.grammar();
    let args = rules.get(rules.id("args").expect("args rule"));
    let num = RuleLabel::Terminal(grammar.id("Num").expect("Num token"));
    let comma = RuleLabel::Terminal(grammar.id("Comma").expect("Comma token"));
    let shape: Vec<RuleLabel> = tokens[1..]
        .iter()
        .map(|token| RuleLabel::Terminal(token.id()))
        .collect();
    assert_eq!(
        shape,
        vec![num.clone(), comma.clone(), num.clone(), comma, num]
    );
    assert!(args.dfa().matches(shape).is_some());
    Ok(())
}
