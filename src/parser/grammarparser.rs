use super::grammar::{Element, Rule, RuleId, RuleLabel, RuleSet};
use crate::automaton::{determinize, GraphBuilder, Label, Nfa, Repetition};
use crate::error::{ConstructionError, Result};
use crate::lexer::{Grammar, GrammarBuilder, Lexer, Token};
use crate::stream::StringStream;
use hashbrown::HashMap;
use std::rc::Rc;


/// # Summary
///
/// The fixed grammar of the rule DSL itself. One line per rule, each of
/// the shape `name = element* ;`, where an element is a reference, a
/// quoted literal, or a parenthesized group with an optional `?`, `+` or
/// `*` stuck to its closing parenthesis. `#` starts a line comment.
pub fn meta_grammar() -> Result<Grammar> {
    GrammarBuilder::new()
        .with_terminal("Name", "[a-zA-Z_][a-zA-Z_0-9]*")
        .with_terminal("String", "'[^']*'")
        .with_terminal("LeftOp", r"\(")
        .with_terminal("RightOp", r"\)[?+*]?")
        .with_terminal("Eq", "=")
        .with_terminal("Or", r"\|")
        .with_terminal("EndRule", ";")
        .with_ignored("Blank", "[ \t\r\n]+")
        .with_ignored("Comment", "#[^\n]*")
        .build()
}

/// # Summary
///
/// Builder for [`RuleSet`]: takes the lexing grammar whose tokens the
/// rules may reference, and a stream holding the rule DSL source.
/// Rules are first split at `;` boundaries and assigned their
/// [`RuleId`]s, so a rule body may reference rules defined later.
#[derive(Debug)]
pub struct RuleSetBuilder<'grammar> {
    grammar: &'grammar Grammar,
    stream: StringStream,
}

impl<'grammar> RuleSetBuilder<'grammar> {
    pub fn new(grammar: &'grammar Grammar, stream: StringStream) -> Self {
        Self { grammar, stream }
    }

    /// Lex and compile every rule of the source.
    pub fn build(self) -> Result<RuleSet> {
        let lexer = Lexer::new(meta_grammar()?);
        let tokens: Result<Vec<Token>> = lexer.lex(self.stream).collect();
        let tokens = tokens?;

        let mut name_map: HashMap<Rc<str>, RuleId> = HashMap::new();
        let mut headers: Vec<(Rc<str>, Vec<Token>)> = Vec::new();
        let mut index = 0;
        while index < tokens.len() {
            let head = &tokens[index];
            if head.name() != "Name" {
                return Err(ConstructionError::UnexpectedToken {
                    expected: "a rule name".to_string(),
                    found: head.lexeme().to_string(),
                }
                .into());
            }
            let name: Rc<str> = head.lexeme().into();
            if self.grammar.contains(&name) {
                return Err(ConstructionError::RuleShadowsTerminal(name.to_string()).into());
            }
            if name_map.contains_key(&*name) {
                return Err(ConstructionError::DuplicateRule(name.to_string()).into());
            }
            index += 1;
            match tokens.get(index) {
                Some(token) if token.name() == "Eq" => index += 1,
                _ => {
                    return Err(ConstructionError::MissingEquals {
                        rule: name.to_string(),
                    }
                    .into())
                }
            }
            let start = index;
            while tokens.get(index).map_or(false, |token| token.name() != "EndRule") {
                index += 1;
            }
            if index == tokens.len() {
                return Err(ConstructionError::UnterminatedRule(name.to_string()).into());
            }
            let body = tokens[start..index].to_vec();
            index += 1;
            name_map.insert(name.clone(), RuleId(headers.len()));
            headers.push((name, body));
        }

        let mut rules = Vec::with_capacity(headers.len());
        for (position, (name, body)) in headers.into_iter().enumerate() {
            let rule_id = RuleId(position);
            let mut nfa = Nfa::new();
            let mut builder = GraphBuilder::new(&mut nfa);
            let mut elements = Vec::with_capacity(body.len());
            for token in &body {
                match token.name() {
                    "LeftOp" => {
                        builder.open_group();
                        elements.push(Element::GroupOpen);
                    }
                    "RightOp" => {
                        let repetition = match token.lexeme().chars().nth(1) {
                            Some('?') => Some(Repetition::Optional),
                            Some('+') => Some(Repetition::OneOrMore),
                            Some('*') => Some(Repetition::ZeroOrMore),
                            _ => None,
                        };
                        builder.close_group(repetition)?;
                        elements.push(Element::GroupClose(repetition));
                    }
                    "Or" => {
                        builder.alternate()?;
                        elements.push(Element::Alternation);
                    }
                    "Name" => {
                        let reference = token.lexeme();
                        let label = if let Some(id) = self.grammar.id(reference) {
                            RuleLabel::Terminal(id)
                        } else if let Some(&id) = name_map.get(reference) {
                            RuleLabel::Rule(id)
                        } else {
                            return Err(
                                ConstructionError::UnknownReference(reference.to_string()).into()
                            );
                        };
                        builder.symbol(Label::Symbol(label));
                        elements.push(Element::Reference(reference.into()));
                    }
                    "String" => {
                        let lexeme = token.lexeme();
                        let literal: Rc<str> = lexeme[1..lexeme.len() - 1].into();
                        builder.symbol(Label::Symbol(RuleLabel::Literal(literal.clone())));
                        elements.push(Element::Literal(literal));
                    }
                    _ => {
                        return Err(ConstructionError::UnexpectedToken {
                            expected: "a rule element".to_string(),
                            found: token.lexeme().to_string(),
                        }
                        .into())
                    }
                }
            }
            let nfa_root = builder.finish(rule_id)?;
            let dfa = determinize(&nfa, nfa_root)?;
            rules.push(Rule::new(name, elements, nfa, nfa_root, dfa));
        }
        Ok(RuleSet::new(rules, name_map))
    }
}
