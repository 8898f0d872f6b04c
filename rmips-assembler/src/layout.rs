//! Assembler pass two: lay out the data segment, assign instruction
//! indices, resolve labels, and validate every instruction against the
//! instruction table.

use crate::parse::{DataEntry, DataValues, RawInstruction, SourceProgram};
use crate::string_unescape::unescape;
use crate::AssembleError;
use log::debug;
use rmips_types::constants::DATA_ALIGNMENT;
use rmips_types::instruction::{Instruction, Mnemonic, OperandError, OperandToken};
use rmips_types::program::Program;
use std::collections::HashMap;
use std::iter;

/// Build the final program from the pass-one collection.
pub fn build(source: SourceProgram) -> Result<Program, AssembleError> {
    let mut labels = HashMap::new();

    let data = lay_out_data(&source.data, &mut labels)?;
    index_instructions(&source.instructions, &mut labels)?;
    debug!("Labels: {:?}", labels);

    if !source.globals.is_empty() {
        let symbols: Vec<&str> = source
            .globals
            .iter()
            .map(|global| global.symbol.as_str())
            .collect();
        debug!("Globals: {:?}", symbols);
    }

    let instructions = source
        .instructions
        .iter()
        .map(|raw| validate_instruction(raw, &labels))
        .collect::<Result<_, _>>()?;

    Ok(Program { instructions, data })
}

/// Record a label's resolved value. Labels share one namespace across data
/// and text; a second definition is fatal, citing the second line.
fn define_label(
    labels: &mut HashMap<String, u32>,
    label: &Option<String>,
    value: u32,
    line: usize,
) -> Result<(), AssembleError> {
    if let Some(name) = label {
        if labels.contains_key(name) {
            return Err(AssembleError::DuplicateLabel {
                line,
                label: name.clone(),
            });
        }

        labels.insert(name.clone(), value);
    }

    Ok(())
}

/// Walk the data entries in declaration order, packing values little-endian.
/// Halfword and word entries are naturally aligned first; a label lands on
/// the aligned offset. Finally the segment is padded to its boundary.
fn lay_out_data(
    entries: &[DataEntry],
    labels: &mut HashMap<String, u32>,
) -> Result<Vec<u8>, AssembleError> {
    let mut data = Vec::new();

    for entry in entries {
        match &entry.values {
            DataValues::Half(_) => align(&mut data, 2),
            DataValues::Word(_) => align(&mut data, 4),
            _ => {}
        }

        define_label(labels, &entry.label, data.len() as u32, entry.line)?;

        match &entry.values {
            DataValues::Byte(values) => data.extend(values.iter().map(|value| *value as u8)),
            DataValues::Half(values) => {
                for value in values {
                    data.extend_from_slice(&(*value as u16).to_le_bytes());
                }
            }
            DataValues::Word(values) => {
                for value in values {
                    data.extend_from_slice(&(*value as u32).to_le_bytes());
                }
            }
            DataValues::Ascii(string) => data.extend(unescape_literal(string, entry.line)?),
            DataValues::Asciiz(string) => {
                data.extend(unescape_literal(string, entry.line)?);
                data.push(0);
            }
            DataValues::Space(count) => data.extend(iter::repeat(0).take(*count as usize)),
        }
    }

    align(&mut data, DATA_ALIGNMENT);

    Ok(data)
}

/// Pad with zero bytes up to the next multiple of `boundary` (none when
/// already aligned).
fn align(data: &mut Vec<u8>, boundary: usize) {
    while data.len() % boundary != 0 {
        data.push(0);
    }
}

fn unescape_literal(string: &str, line: usize) -> Result<Vec<u8>, AssembleError> {
    unescape(string).map_err(|reason| AssembleError::BadStringLiteral {
        line,
        reason: reason.to_string(),
    })
}

/// Assign each instruction its 0-based index and record labeled ones.
fn index_instructions(
    instructions: &[RawInstruction],
    labels: &mut HashMap<String, u32>,
) -> Result<(), AssembleError> {
    for (index, instruction) in instructions.iter().enumerate() {
        define_label(labels, &instruction.label, index as u32, instruction.line)?;
    }

    Ok(())
}

/// Substitute a resolved label into the final operand slot (for the
/// label-consuming mnemonics), then validate and normalize the operands.
fn validate_instruction(
    raw: &RawInstruction,
    labels: &HashMap<String, u32>,
) -> Result<Instruction, AssembleError> {
    let (name, operands) = match raw.parts.split_first() {
        Some(parts) => parts,
        None => {
            return Err(AssembleError::UnknownInstruction {
                line: raw.line,
                name: String::new(),
            })
        }
    };

    let mnemonic: Mnemonic = name.parse().map_err(|()| AssembleError::UnknownInstruction {
        line: raw.line,
        name: name.clone(),
    })?;

    let mut tokens: Vec<OperandToken> = operands
        .iter()
        .map(|part| OperandToken::Word(part.as_str()))
        .collect();

    if mnemonic.resolves_labels() {
        if let Some(value) = operands.last().and_then(|last| labels.get(last.as_str())) {
            if let Some(slot) = tokens.last_mut() {
                *slot = OperandToken::Resolved(*value);
            }
        }
    }

    let operands = mnemonic
        .validate(&tokens)
        .map_err(|error| match error {
            OperandError::Shape => AssembleError::MalformedInstruction {
                line: raw.line,
                name: mnemonic.name().to_string(),
            },
            OperandError::UnresolvedLabel(label) => {
                AssembleError::UnresolvedLabel { line: raw.line, label }
            }
        })?;

    Ok(Instruction { mnemonic, operands })
}
