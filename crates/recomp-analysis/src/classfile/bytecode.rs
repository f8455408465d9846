//! Method bodies: constants pushed by instructions rather than loaded from
//! the constant pool.
//!
//! `javac` inlines small `static final` values as `iconst_*`, `bipush` and
//! `sipush` (and the `lconst`/`fconst`/`dconst` families), so a class that
//! embeds such a value has neither a pool entry for it nor a reference to
//! the declaring class.

use std::collections::BTreeSet;

use recomp_core::errors::AnalysisError;

use super::reader::ClassReader;

pub(crate) const CODE_ATTRIBUTE: &str = "Code";

const ICONST_M1: u8 = 0x02;
const ICONST_5: u8 = 0x08;
const LCONST_0: u8 = 0x09;
const LCONST_1: u8 = 0x0a;
const FCONST_0: u8 = 0x0b;
const FCONST_2: u8 = 0x0d;
const DCONST_0: u8 = 0x0e;
const DCONST_1: u8 = 0x0f;
const BIPUSH: u8 = 0x10;
const SIPUSH: u8 = 0x11;
const IINC: u8 = 0x84;
const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;

/// Fold a 64-bit value to 32 bits the way `Long.hashCode` does.
pub(crate) fn fold64(value: u64) -> i32 {
    (value ^ (value >> 32)) as u32 as i32
}

/// Read the body of a `Code` attribute and collect the constants its
/// instructions push.
pub(crate) fn read_code_attribute(
    body: &[u8],
    constants: &mut BTreeSet<i32>,
) -> Result<(), AnalysisError> {
    let mut r = ClassReader::new(body);
    r.skip(4)?; // max_stack, max_locals
    let code_length = r.u4()? as usize;
    // the exception table and nested attributes carry no constants
    collect_constants(r.take(code_length)?, constants)
}

/// Walk one method's instructions.
pub(crate) fn collect_constants(
    code: &[u8],
    constants: &mut BTreeSet<i32>,
) -> Result<(), AnalysisError> {
    let mut r = ClassReader::new(code);
    while r.position() < code.len() {
        let pc = r.position();
        let opcode = r.u1()?;
        match opcode {
            ICONST_M1..=ICONST_5 => {
                constants.insert(i32::from(opcode) - i32::from(ICONST_M1) - 1);
            }
            LCONST_0 | LCONST_1 => {
                constants.insert(fold64(u64::from(opcode - LCONST_0)));
            }
            FCONST_0..=FCONST_2 => {
                constants.insert(f32::from(opcode - FCONST_0).to_bits() as i32);
            }
            DCONST_0 | DCONST_1 => {
                constants.insert(fold64(f64::from(opcode - DCONST_0).to_bits()));
            }
            BIPUSH => {
                constants.insert(i32::from(r.u1()? as i8));
            }
            SIPUSH => {
                constants.insert(i32::from(r.u2()? as i16));
            }
            TABLESWITCH => {
                skip_padding(&mut r, pc)?;
                r.skip(4)?; // default
                let low = r.u4()? as i32;
                let high = r.u4()? as i32;
                let targets = i64::from(high) - i64::from(low) + 1;
                if targets < 0 {
                    return Err(AnalysisError::class_format(format!(
                        "tableswitch at {pc} has low {low} above high {high}"
                    )));
                }
                r.skip(targets as usize * 4)?;
            }
            LOOKUPSWITCH => {
                skip_padding(&mut r, pc)?;
                r.skip(4)?; // default
                let pairs = r.u4()? as usize;
                r.skip(pairs.saturating_mul(8))?;
            }
            WIDE => {
                let widened = r.u1()?;
                r.skip(if widened == IINC { 4 } else { 2 })?;
            }
            _ => r.skip(operand_length(opcode, pc)?)?,
        }
    }
    Ok(())
}

/// Switch operands start at the next multiple of four from the start of
/// the method's code.
fn skip_padding(r: &mut ClassReader<'_>, pc: usize) -> Result<(), AnalysisError> {
    r.skip((4 - (pc + 1) % 4) % 4)
}

/// Operand bytes of every fixed-length instruction.
fn operand_length(opcode: u8, pc: usize) -> Result<usize, AnalysisError> {
    let len = match opcode {
        0x00..=0x0f => 0,
        0x12 => 1, // ldc
        0x13 | 0x14 => 2, // ldc_w, ldc2_w
        0x15..=0x19 => 1, // loads
        0x1a..=0x35 => 0,
        0x36..=0x3a => 1, // stores
        0x3b..=0x83 => 0,
        IINC => 2,
        0x85..=0x98 => 0,
        0x99..=0xa8 => 2, // branches, goto, jsr
        0xa9 => 1, // ret
        0xac..=0xb1 => 0, // returns
        0xb2..=0xb8 => 2, // field access, invokes
        0xb9 | 0xba => 4, // invokeinterface, invokedynamic
        0xbb => 2, // new
        0xbc => 1, // newarray
        0xbd => 2, // anewarray
        0xbe | 0xbf => 0,
        0xc0 | 0xc1 => 2, // checkcast, instanceof
        0xc2 | 0xc3 => 0,
        0xc5 => 3, // multianewarray
        0xc6 | 0xc7 => 2, // ifnull, ifnonnull
        0xc8 | 0xc9 => 4, // goto_w, jsr_w
        other => {
            return Err(AnalysisError::class_format(format!(
                "unknown opcode {other:#04x} at code offset {pc}"
            )))
        }
    };
    Ok(len)
}
