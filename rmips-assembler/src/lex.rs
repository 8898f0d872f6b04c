//! The tokenizer: splits source text into directives, labels, and
//! statements, tracking the line each token starts on.

use crate::AssembleError;

/// A source token and the line it begins on.
#[derive(Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: usize,
}

/// The three token shapes, tried in this order at every position; the first
/// match wins.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `.name`
    Directive(&'a str),
    /// `name:`
    Label(&'a str),
    /// Anything else, up to the next comment or end of line
    Statement(&'a str),
}

/// Split the whole source into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, AssembleError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token() {
        tokens.push(token?);
    }

    Ok(tokens)
}

fn is_label_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Move forward, counting the newlines that go by.
    fn advance(&mut self, count: usize) {
        for byte in self.source[self.pos..self.pos + count].bytes() {
            if byte == b'\n' {
                self.line += 1;
            }
        }
        self.pos += count;
    }

    /// Consume whitespace and `#` comments.
    fn eat_whitespace(&mut self) {
        loop {
            let rest = self.rest();
            self.advance(rest.len() - rest.trim_start().len());

            if !self.rest().starts_with('#') {
                break;
            }

            let rest = self.rest();
            self.advance(rest.find('\n').unwrap_or_else(|| rest.len()));
        }
    }

    fn next_token(&mut self) -> Option<Result<Token<'a>, AssembleError>> {
        self.eat_whitespace();

        if self.rest().is_empty() {
            return None;
        }

        let line = self.line;
        let rest = self.rest();
        let bytes = rest.as_bytes();

        // A directive: '.' followed by lowercase letters.
        if bytes[0] == b'.' {
            let length = bytes[1..]
                .iter()
                .take_while(|byte| byte.is_ascii_lowercase())
                .count();

            if length > 0 {
                let name = &rest[1..1 + length];
                self.advance(1 + length);
                return Some(Ok(Token {
                    kind: TokenKind::Directive(name),
                    line,
                }));
            }
        }

        // A label: a run of label characters immediately followed by ':'.
        let length = bytes.iter().take_while(|byte| is_label_char(**byte)).count();

        if length > 0 && bytes.get(length) == Some(&b':') {
            let name = &rest[..length];
            self.advance(length + 1);
            return Some(Ok(Token {
                kind: TokenKind::Label(name),
                line,
            }));
        }

        // A statement: everything up to the next comment or newline.
        let end = bytes
            .iter()
            .position(|byte| *byte == b'#' || *byte == b'\n')
            .unwrap_or_else(|| rest.len());
        let statement = rest[..end].trim_end();

        if statement.is_empty() {
            // Unreachable while the statement pattern stays a catch-all, but
            // the grammar's contract is a fatal error here.
            return Some(Err(AssembleError::BadInput {
                line,
                text: rest.trim_end().to_string(),
            }));
        }

        self.advance(statement.len());
        Some(Ok(Token {
            kind: TokenKind::Statement(statement),
            line,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let source = "# leading comment\n\n  add $t0, $t1, $t2 # trailing\n# end\n";
        assert_eq!(
            kinds(source),
            vec![TokenKind::Statement("add $t0, $t1, $t2")],
        );
    }

    #[test]
    fn directives_labels_and_statements() {
        let source = "\
.data
greeting: .asciiz \"hi\"
.text
main:
    li $v0, 10
    syscall
";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Directive("data"),
                TokenKind::Label("greeting"),
                TokenKind::Directive("asciiz"),
                TokenKind::Statement("\"hi\""),
                TokenKind::Directive("text"),
                TokenKind::Label("main"),
                TokenKind::Statement("li $v0, 10"),
                TokenKind::Statement("syscall"),
            ],
        );
    }

    #[test]
    fn lines_are_tracked() {
        let source = "# one\n.text\nmain:\n  nop\n";
        let tokens = tokenize(source).unwrap();
        let lines: Vec<usize> = tokens.iter().map(|token| token.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn labels_may_use_digits_underscores_and_dollars() {
        assert_eq!(kinds("loop_2$:"), vec![TokenKind::Label("loop_2$")]);
    }

    #[test]
    fn a_lone_dot_is_a_statement_not_a_directive() {
        assert_eq!(kinds(".5x"), vec![TokenKind::Statement(".5x")]);
    }

    #[test]
    fn comment_at_end_of_input_without_newline() {
        assert_eq!(kinds("nop # done"), vec![TokenKind::Statement("nop")]);
    }
}
