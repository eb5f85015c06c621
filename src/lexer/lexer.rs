use super::grammar::{Grammar, TerminalId};
use crate::error::{LexError, Result};
use crate::location::Location;
use crate::stream::{Char, StringStream};
use std::fmt;
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lexer::GrammarBuilder;
    use std::path::Path;

    fn quoted() -> Lexer {
        Lexer::new(
            GrammarBuilder::new()
                .with_terminal("Num", "[0-9]+")
                .with_terminal("Str", r"'(\\['rnt]|[^'])*'")
                .with_ignored("Blank", "[ \t\r\n]+")
                .build()
                .unwrap(),
        )
    }

    fn stream(input: &str) -> StringStream {
        StringStream::new(Path::new("<input>"), input)
    }

    fn names_and_lexemes(lexer: &Lexer, input: &str) -> Vec<(String, String)> {
        lexer
            .lex(stream(input))
            .map(|token| {
                let token = token.unwrap();
                (token.name().to_string(), token.lexeme().to_string())
            })
            .collect()
    }

    #[test]
    fn strings_and_numbers() {
        let lexer = quoted();
        assert_eq!(
            names_and_lexemes(&lexer, "'asdf' 1345"),
            [
                ("Str".to_string(), "'asdf'".to_string()),
                ("Num".to_string(), "1345".to_string()),
            ]
        );
        assert_eq!(
            names_and_lexemes(&lexer, r"'it\'s' 12 '\n'"),
            [
                ("Str".to_string(), r"'it\'s'".to_string()),
                ("Num".to_string(), "12".to_string()),
                ("Str".to_string(), r"'\n'".to_string()),
            ]
        );
    }

    #[test]
    fn locations() {
        let lexer = quoted();
        let tokens: Result<Vec<_>> = lexer.lex(stream("12\n'a'")).collect();
        let tokens = tokens.unwrap();
        assert_eq!(tokens[0].location().start(), (0, 0));
        assert_eq!(tokens[0].location().end(), (0, 2));
        assert_eq!(tokens[1].location().start(), (1, 0));
        assert_eq!(tokens[1].location().end(), (1, 3));
    }

    #[test]
    fn bad_escape() {
        // The backslash commits to the escape branch, so `\a` is not
        // rescued by the any-character alternative.
        let lexer = quoted();
        let mut lexed = lexer.lex(stream(r"'\asdf'"));
        assert_eq!(
            lexed.next(),
            Some(Err(Error::Lex(LexError::UnexpectedChar {
                line: 0,
                column: 2,
                symbol: 'a',
            })))
        );
        // Scanning does not resynchronize after an error.
        assert_eq!(lexed.next(), None);
    }

    #[test]
    fn unterminated_string() {
        let lexer = quoted();
        let mut lexed = lexer.lex(stream("'as"));
        assert_eq!(
            lexed.next(),
            Some(Err(Error::Lex(LexError::UnexpectedEOF {
                line: 0,
                column: 3,
            })))
        );
        assert_eq!(lexed.next(), None);
    }

    #[test]
    fn empty_input() {
        let lexer = quoted();
        assert_eq!(lexer.lex(stream("")).next(), None);
    }

    #[test]
    fn trailing_ignored() {
        let lexer = quoted();
        assert_eq!(
            names_and_lexemes(&lexer, "123  \n"),
            [("Num".to_string(), "123".to_string())]
        );
    }

    #[test]
    fn maximal_munch() {
        let lexer = quoted();
        // One Num of three digits, not three of one.
        assert_eq!(
            names_and_lexemes(&lexer, "123"),
            [("Num".to_string(), "123".to_string())]
        );
    }

    #[test]
    fn identifiers_and_punctuation() {
        let lexer = Lexer::new(
            GrammarBuilder::new()
                .with_terminal("Name", "[a-zA-Z_][a-zA-Z_0-9]*")
                .with_terminal("Op", r"[{}()\[\]+\-*/:]")
                .with_terminal("Newline", "\n")
                .with_ignored("Blank", "[ \t]+")
                .build()
                .unwrap(),
        );
        let names: Vec<_> = lexer
            .lex(stream("struct MyStruct {\n    x: u32\n}"))
            .map(|token| token.unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "Name", "Name", "Op", "Newline", "Name", "Op", "Name", "Newline", "Op",
            ]
        );
    }

    #[test]
    fn definition_order_is_immaterial() {
        // Tokens that never race for the same text may be declared in
        // any order without changing the tokenization.
        let forward = Lexer::new(
            GrammarBuilder::new()
                .with_terminal("Num", "[0-9]+")
                .with_terminal("Word", "[a-z]+")
                .with_ignored("Blank", "( )+")
                .build()
                .unwrap(),
        );
        let backward = Lexer::new(
            GrammarBuilder::new()
                .with_terminal("Word", "[a-z]+")
                .with_terminal("Num", "[0-9]+")
                .with_ignored("Blank", "( )+")
                .build()
                .unwrap(),
        );
        for input in ["abc 123", "1 a 22 bb"] {
            assert_eq!(
                names_and_lexemes(&forward, input),
                names_and_lexemes(&backward, input)
            );
        }
    }

    #[test]
    fn scanning_is_deterministic() {
        let lexer = quoted();
        let first = names_and_lexemes(&lexer, "'a' 1 'b' 2");
        let second = names_and_lexemes(&lexer, "'a' 1 'b' 2");
        assert_eq!(first, second);
    }
}

/// # Summary
///
/// `Token` contains information about a token, thus it contains
///  - `name`: the identifier of the token definition that matched;
///  - `id`: the [`TerminalId`] of that definition;
///  - `lexeme`: the matched substring;
///  - `location`: the location of the substring that generated this token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    name: Rc<str>,
    id: TerminalId,
    lexeme: String,
    location: Location,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.name)
    }
}

impl Token {
    /// Return the `name` of the token.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the id of the definition that produced the token.
    pub fn id(&self) -> TerminalId {
        self.id
    }

    /// Return the matched text.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Return the `location` of the token.
    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// # Summary
///
/// The scanning engine: holds a compiled [`Grammar`] and turns
/// [`StringStream`]s into token streams. A single lexer can be reused
/// across any number of inputs.
#[derive(Debug)]
pub struct Lexer {
    grammar: Grammar,
}

impl Lexer {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Start scanning `stream`. Tokens are produced lazily by the
    /// returned iterator.
    pub fn lex(&self, stream: StringStream) -> LexedStream<'_> {
        LexedStream {
            lexer: self,
            stream,
            failed: false,
        }
    }
}

/// # Summary
///
/// The iterator over the tokens of one input. Matching is greedy: the
/// automaton is fed characters until it gets stuck, at which point its
/// state must be an accept state, whose definition names the token. A
/// failure ends the stream; after the first `Err`, `next` returns `None`.
#[derive(Debug)]
pub struct LexedStream<'lexer> {
    lexer: &'lexer Lexer,
    stream: StringStream,
    failed: bool,
}

impl LexedStream<'_> {
    fn token(&self, id: TerminalId, start: usize, end: usize) -> Token {
        Token {
            name: self.lexer.grammar().shared_name(id),
            id,
            lexeme: self.stream.slice(start, end).to_string(),
            location: self.stream.location(start, end),
        }
    }
}

impl Iterator for LexedStream<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let grammar = self.lexer.grammar();
        let dfa = grammar.dfa();
        let mut state = dfa.start();
        let mut start = self.stream.pos();
        loop {
            let pos = self.stream.pos();
            match self.stream.get() {
                Char::Char(chr) => match dfa.step(state, &chr) {
                    Some(next) => {
                        state = next;
                        self.stream.incr_pos();
                    }
                    // Stuck. The characters consumed so far must form a
                    // token; the stuck character is retried from the
                    // start state on the next round.
                    None => match dfa.payload(state) {
                        Some(&id) => {
                            let token = self.token(id, start, pos);
                            state = dfa.start();
                            start = pos;
                            if !grammar.ignored(id) {
                                return Some(Ok(token));
                            }
                        }
                        None => {
                            self.failed = true;
                            let (line, column) = self.stream.loc_at(pos);
                            return Some(Err(LexError::UnexpectedChar {
                                line,
                                column,
                                symbol: chr,
                            }
                            .into()));
                        }
                    },
                },
                Char::EOF => {
                    if start == pos {
                        return None;
                    }
                    match dfa.payload(state) {
                        Some(&id) => {
                            let token = self.token(id, start, pos);
                            state = dfa.start();
                            start = pos;
                            if !grammar.ignored(id) {
                                return Some(Ok(token));
                            }
                        }
                        None => {
                            self.failed = true;
                            let (line, column) = self.stream.loc_at(pos);
                            return Some(Err(LexError::UnexpectedEOF { line, column }.into()));
                        }
                    }
                }
            }
        }
    }
}
