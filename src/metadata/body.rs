//! Placeholder CIL method bodies and their ECMA-335 encoding.
//!
//! Bodies built here are structural stubs: a handful of instructions that make a method loadable
//! and inspectable before real decompiled code replaces them. Each [`MethodBody`] keeps its
//! instructions in symbolic form, with type operands held as [`TypeSig`]; the token of a type
//! operand is only known to the (external) image writer, which supplies it when encoding.
//!
//! # Encoding
//!
//! - Tiny header (one byte) when the code is shorter than 64 bytes, the stack never exceeds 8
//!   and there are no locals
//! - Fat header (12 bytes) otherwise, carrying `max_stack`, code size, local signature token and
//!   the `InitLocals` flag
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 25.4 - Method Header Format
//! - ECMA-335 6th Edition, Partition III - CIL Instruction Set

use bitflags::bitflags;

use crate::{
    metadata::{token::Token, typesig::TypeSig},
    Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method header flags, §II.25.4.4
    pub struct MethodBodyFlags: u16 {
        /// Tiny method header
        const TINY_FORMAT = 0x2;
        /// Fat method header
        const FAT_FORMAT = 0x3;
        /// More sections follow the code
        const MORE_SECTS = 0x8;
        /// Call default constructor on all local variables
        const INIT_LOCALS = 0x10;
    }
}

/// Largest code size a tiny header can describe
pub const TINY_MAX_CODE_SIZE: usize = 63;
/// Largest stack depth a tiny header implies
pub const TINY_MAX_STACK: u16 = 8;
/// Size of a fat header, in 4-byte units
const FAT_HEADER_DWORDS: u16 = 3;

/// The opcodes used by stub bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum CilOpCode {
    /// Return from method, possibly with a value
    #[strum(serialize = "ret")]
    Ret,
    /// Push a null reference on the stack
    #[strum(serialize = "ldnull")]
    Ldnull,
    /// Load local variable 0 onto stack
    #[strum(serialize = "ldloc.0")]
    Ldloc0,
    /// Load address of local variable, short form
    #[strum(serialize = "ldloca.s")]
    LdlocaS,
    /// Initialize the value at an address
    #[strum(serialize = "initobj")]
    Initobj,
}

impl CilOpCode {
    /// The opcode bytes
    #[must_use]
    pub fn bytes(&self) -> &'static [u8] {
        match self {
            CilOpCode::Ret => &[0x2A],
            CilOpCode::Ldnull => &[0x14],
            CilOpCode::Ldloc0 => &[0x06],
            CilOpCode::LdlocaS => &[0x12],
            CilOpCode::Initobj => &[0xFE, 0x15],
        }
    }

    /// Net stack change, given the depth before the instruction
    fn stack_delta(&self, depth: i32) -> i32 {
        match self {
            CilOpCode::Ldnull | CilOpCode::Ldloc0 | CilOpCode::LdlocaS => 1,
            CilOpCode::Initobj => -1,
            CilOpCode::Ret => -depth,
        }
    }
}

/// Operand of an [`Instruction`]
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// A local variable index (short form)
    Local(u8),
    /// A type token, kept symbolic until encoding
    Type(TypeSig),
}

impl Operand {
    fn size(&self) -> usize {
        match self {
            Operand::None => 0,
            Operand::Local(_) => 1,
            Operand::Type(_) => 4,
        }
    }
}

/// One instruction of a stub body
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The opcode
    pub opcode: CilOpCode,
    /// The operand
    pub operand: Operand,
}

impl Instruction {
    /// An instruction without operand
    #[must_use]
    pub fn simple(opcode: CilOpCode) -> Self {
        Instruction {
            opcode,
            operand: Operand::None,
        }
    }

    /// Encoded size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.opcode.bytes().len() + self.operand.size()
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            Operand::Local(index) => write!(f, "{} {index}", self.opcode),
            Operand::Type(sig) => write!(f, "{} {sig}", self.opcode),
        }
    }
}

/// A method body, in symbolic form
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    /// Maximum number of items on the operand stack
    pub max_stack: u16,
    /// Flag, indicating to zero-initialize all local variables
    pub init_locals: bool,
    /// Types of the local variables, in slot order
    pub locals: Vec<TypeSig>,
    /// The instruction stream
    pub instructions: Vec<Instruction>,
}

impl MethodBody {
    /// Create a body; `max_stack` is computed from the instructions' stack effects.
    #[must_use]
    pub fn new(locals: Vec<TypeSig>, init_locals: bool, instructions: Vec<Instruction>) -> Self {
        let mut depth = 0i32;
        let mut max = 0i32;
        for instruction in &instructions {
            depth += instruction.opcode.stack_delta(depth);
            max = max.max(depth);
        }

        MethodBody {
            max_stack: u16::try_from(max).unwrap_or(u16::MAX),
            init_locals,
            locals,
            instructions,
        }
    }

    /// Length of all instructions, not counting the header
    #[must_use]
    pub fn code_size(&self) -> usize {
        self.instructions.iter().map(Instruction::size).sum()
    }

    /// Returns true if this body fits into a tiny header
    #[must_use]
    pub fn is_tiny(&self) -> bool {
        self.code_size() <= TINY_MAX_CODE_SIZE
            && self.max_stack <= TINY_MAX_STACK
            && self.locals.is_empty()
    }

    /// Encode header and code to bytes.
    ///
    /// # Arguments
    /// * `local_sig` - Token of the `StandAloneSig` describing the locals (ignored without locals)
    /// * `type_token` - Maps a type operand to the token the writer assigned to it
    ///
    /// # Errors
    /// Propagates failures of `type_token`; returns [`crate::Error::MalformedDescriptor`] if the
    /// body has locals but `local_sig` is null.
    pub fn encode<F>(&self, local_sig: Token, mut type_token: F) -> Result<Vec<u8>>
    where
        F: FnMut(&TypeSig) -> Result<Token>,
    {
        let code_size = self.code_size();
        let mut out = Vec::with_capacity(code_size + 12);

        if self.is_tiny() {
            #[allow(clippy::cast_possible_truncation)]
            out.push(((code_size as u8) << 2) | MethodBodyFlags::TINY_FORMAT.bits() as u8);
        } else {
            if !self.locals.is_empty() && local_sig.is_null() {
                return Err(malformed_error!(
                    "Body with {} locals requires a local signature token",
                    self.locals.len()
                ));
            }

            let mut flags = MethodBodyFlags::FAT_FORMAT;
            if self.init_locals {
                flags |= MethodBodyFlags::INIT_LOCALS;
            }
            let code_size = u32::try_from(code_size)
                .map_err(|_| malformed_error!("Code size {} exceeds u32", code_size))?;
            let local_sig = if self.locals.is_empty() {
                0
            } else {
                local_sig.value()
            };

            out.extend_from_slice(&((FAT_HEADER_DWORDS << 12) | flags.bits()).to_le_bytes());
            out.extend_from_slice(&self.max_stack.to_le_bytes());
            out.extend_from_slice(&code_size.to_le_bytes());
            out.extend_from_slice(&local_sig.to_le_bytes());
        }

        for instruction in &self.instructions {
            out.extend_from_slice(instruction.opcode.bytes());
            match &instruction.operand {
                Operand::None => {}
                Operand::Local(index) => out.push(*index),
                Operand::Type(sig) => out.extend_from_slice(&type_token(sig)?.value().to_le_bytes()),
            }
        }

        Ok(out)
    }
}

impl std::fmt::Display for MethodBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, instruction) in self.instructions.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}
