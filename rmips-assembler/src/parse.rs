//! Assembler pass one: walk the token stream with a current segment, a
//! pending data directive, and a pending label, and classify every
//! statement into a data entry, a raw instruction, or a global symbol.

use crate::lex::{Token, TokenKind};
use crate::AssembleError;
use log::warn;

/// Everything pass one collects from the token stream.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SourceProgram {
    pub globals: Vec<Global>,
    pub data: Vec<DataEntry>,
    pub instructions: Vec<RawInstruction>,
}

/// A symbol declared with `.globl`. Recorded, not otherwise enforced.
#[derive(Debug, PartialEq, Eq)]
pub struct Global {
    pub symbol: String,
    pub line: usize,
}

/// One data directive entry, in declaration order. The label (if any) will
/// be bound to the entry's start offset during layout.
#[derive(Debug, PartialEq, Eq)]
pub struct DataEntry {
    pub values: DataValues,
    pub label: Option<String>,
    pub line: usize,
}

/// The raw values of a data entry. String contents are kept as written;
/// escape expansion happens during layout.
#[derive(Debug, PartialEq, Eq)]
pub enum DataValues {
    Byte(Vec<i64>),
    Half(Vec<i64>),
    Word(Vec<i64>),
    Ascii(String),
    Asciiz(String),
    Space(u32),
}

/// An instruction statement, split on commas and whitespace.
#[derive(Debug, PartialEq, Eq)]
pub struct RawInstruction {
    pub parts: Vec<String>,
    pub label: Option<String>,
    pub line: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text,
    Data,
}

/// A directive waiting for its statement: `.globl` or one of the six data
/// directives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pending {
    Globl,
    Byte,
    Half,
    Word,
    Ascii,
    Asciiz,
    Space,
}

impl Pending {
    fn name(self) -> &'static str {
        match self {
            Pending::Globl => "globl",
            Pending::Byte => "byte",
            Pending::Half => "half",
            Pending::Word => "word",
            Pending::Ascii => "ascii",
            Pending::Asciiz => "asciiz",
            Pending::Space => "space",
        }
    }
}

/// Classify the token stream. The segment defaults to text; `.text` and
/// `.data` clear the pending directive but leave a pending label in place,
/// so `name: .word 1` still binds the label to the data entry.
pub fn classify(tokens: &[Token]) -> Result<SourceProgram, AssembleError> {
    let mut program = SourceProgram::default();
    let mut segment = Segment::Text;
    let mut pending = None;
    let mut label: Option<&str> = None;

    for token in tokens {
        match &token.kind {
            TokenKind::Directive(name) => match *name {
                "text" => {
                    segment = Segment::Text;
                    pending = None;
                }
                "data" => {
                    segment = Segment::Data;
                    pending = None;
                }
                "globl" => pending = Some(Pending::Globl),
                "byte" => pending = Some(Pending::Byte),
                "half" => pending = Some(Pending::Half),
                "word" => pending = Some(Pending::Word),
                "ascii" => pending = Some(Pending::Ascii),
                "asciiz" => pending = Some(Pending::Asciiz),
                "space" => pending = Some(Pending::Space),
                _ => {
                    return Err(AssembleError::UnknownDirective {
                        line: token.line,
                        name: name.to_string(),
                    })
                }
            },
            TokenKind::Label(name) => {
                if let Some(previous) = label {
                    // Two labels with no statement between them: only the
                    // most recent survives.
                    warn!(
                        "line {}: label '{}' is replaced by '{}' before it is used",
                        token.line, previous, name
                    );
                }
                label = Some(*name);
            }
            TokenKind::Statement(statement) => {
                classify_statement(
                    &mut program,
                    segment,
                    pending,
                    label.take(),
                    statement,
                    token.line,
                )?;
                pending = None;
            }
        }
    }

    Ok(program)
}

fn classify_statement(
    program: &mut SourceProgram,
    segment: Segment,
    pending: Option<Pending>,
    label: Option<&str>,
    statement: &str,
    line: usize,
) -> Result<(), AssembleError> {
    let label = label.map(str::to_string);

    match segment {
        Segment::Data => {
            let values = match pending {
                Some(Pending::Byte) => DataValues::Byte(integer_list(statement, "byte", line)?),
                Some(Pending::Half) => DataValues::Half(integer_list(statement, "half", line)?),
                Some(Pending::Word) => DataValues::Word(integer_list(statement, "word", line)?),
                Some(Pending::Ascii) => {
                    DataValues::Ascii(string_argument(statement, "ascii", line)?)
                }
                Some(Pending::Asciiz) => {
                    DataValues::Asciiz(string_argument(statement, "asciiz", line)?)
                }
                Some(Pending::Space) => {
                    let count = statement
                        .parse()
                        .map_err(|_| AssembleError::SpaceArgument { line })?;
                    DataValues::Space(count)
                }
                Some(Pending::Globl) => {
                    return Err(AssembleError::GloblInData {
                        line,
                        symbol: statement.to_string(),
                    })
                }
                None => {
                    return Err(AssembleError::Unrecognized {
                        line,
                        text: statement.to_string(),
                    })
                }
            };

            program.data.push(DataEntry { values, label, line });
        }
        Segment::Text => match pending {
            Some(Pending::Globl) => program.globals.push(Global {
                symbol: statement.to_string(),
                line,
            }),
            Some(directive) => {
                return Err(AssembleError::DataDirectiveInText {
                    line,
                    directive: directive.name(),
                })
            }
            None => program.instructions.push(RawInstruction {
                parts: split_statement(statement),
                label,
                line,
            }),
        },
    }

    Ok(())
}

/// Split a statement on commas and whitespace, discarding empty pieces.
fn split_statement(statement: &str) -> Vec<String> {
    statement
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn integer_list(
    statement: &str,
    directive: &'static str,
    line: usize,
) -> Result<Vec<i64>, AssembleError> {
    statement
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse()
                .map_err(|_| AssembleError::IntegerArgument { line, directive })
        })
        .collect()
}

/// An `ascii`/`asciiz` statement must be exactly one double-quoted string.
fn string_argument(
    statement: &str,
    directive: &'static str,
    line: usize,
) -> Result<String, AssembleError> {
    statement
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or(AssembleError::StringArgument { line, directive })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;

    fn classify_source(source: &str) -> Result<SourceProgram, AssembleError> {
        classify(&tokenize(source).unwrap())
    }

    #[test]
    fn instructions_default_to_the_text_segment() {
        let program = classify_source("add $t0, $t1, $t2\n").unwrap();
        assert_eq!(program.instructions.len(), 1);
        assert_eq!(
            program.instructions[0].parts,
            vec!["add", "$t0", "$t1", "$t2"],
        );
    }

    #[test]
    fn labels_attach_to_the_following_statement() {
        let program = classify_source(".data\nvalues: .word 1, 2\n.text\nmain: nop\n").unwrap();
        assert_eq!(program.data[0].label.as_deref(), Some("values"));
        assert_eq!(program.data[0].values, DataValues::Word(vec![1, 2]));
        assert_eq!(program.instructions[0].label.as_deref(), Some("main"));
    }

    #[test]
    fn globals_are_recorded_in_the_text_segment() {
        let program = classify_source(".text\n.globl main\nmain: nop\n").unwrap();
        assert_eq!(program.globals[0].symbol, "main");
    }

    #[test]
    fn globl_in_the_data_segment_is_fatal() {
        let error = classify_source(".data\n.globl main\nmain\n").unwrap_err();
        assert_eq!(
            error,
            AssembleError::GloblInData {
                line: 3,
                symbol: "main".to_string(),
            },
        );
    }

    #[test]
    fn data_directives_reject_non_integers() {
        let error = classify_source(".data\n.word 1, two\n").unwrap_err();
        assert_eq!(
            error,
            AssembleError::IntegerArgument {
                line: 2,
                directive: "word",
            },
        );
    }

    #[test]
    fn ascii_requires_a_quoted_string() {
        let error = classify_source(".data\n.ascii hello\n").unwrap_err();
        assert_eq!(
            error,
            AssembleError::StringArgument {
                line: 2,
                directive: "ascii",
            },
        );
    }

    #[test]
    fn space_requires_a_byte_count() {
        let error = classify_source(".data\n.space lots\n").unwrap_err();
        assert_eq!(error, AssembleError::SpaceArgument { line: 2 });

        let program = classify_source(".data\n.space 16\n").unwrap();
        assert_eq!(program.data[0].values, DataValues::Space(16));
    }

    #[test]
    fn unknown_directives_are_fatal() {
        let error = classify_source(".align 2\n").unwrap_err();
        assert_eq!(
            error,
            AssembleError::UnknownDirective {
                line: 1,
                name: "align".to_string(),
            },
        );
    }

    #[test]
    fn data_statement_without_a_directive_is_fatal() {
        let error = classify_source(".data\n1, 2, 3\n").unwrap_err();
        assert_eq!(
            error,
            AssembleError::Unrecognized {
                line: 2,
                text: "1, 2, 3".to_string(),
            },
        );
    }

    #[test]
    fn data_directive_in_the_text_segment_is_fatal() {
        let error = classify_source(".text\n.byte\n5\n").unwrap_err();
        assert_eq!(
            error,
            AssembleError::DataDirectiveInText {
                line: 3,
                directive: "byte",
            },
        );
    }

    #[test]
    fn segment_switches_clear_the_pending_directive() {
        // Without the switch this would read "5" as .byte data.
        let program = classify_source(".data\n.byte\n.data\n.word 5\n").unwrap();
        assert_eq!(program.data[0].values, DataValues::Word(vec![5]));
    }
}
