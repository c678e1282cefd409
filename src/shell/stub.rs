//! Placeholder bodies for methods that expect managed code.
//!
//! The body depends only on the return type:
//!
//! | Return type | Body                                     |
//! |-------------|------------------------------------------|
//! | `void`      | `ret`                                    |
//! | value type  | `ldloca.s 0; initobj T; ldloc.0; ret`    |
//! | otherwise   | `ldnull; ret`                            |
//!
//! Generic parameters count as value types unless they carry the reference type constraint,
//! since `initobj` is valid for any `T`.

use crate::metadata::{
    body::{CilOpCode, Instruction, MethodBody, Operand},
    flags::GenericParamAttributes,
    typesig::TypeSig,
};

/// Return category of a stub body
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StubKind {
    /// Returns nothing
    Void,
    /// Returns a default-initialized local
    ValueType,
    /// Returns null
    Reference,
}

impl StubKind {
    /// Classify `return_type`
    #[must_use]
    pub fn classify(return_type: &TypeSig) -> Self {
        if return_type.is_void() {
            return StubKind::Void;
        }

        if let Some(param) = return_type.generic_param() {
            return if param
                .flags
                .contains(GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT)
            {
                StubKind::Reference
            } else {
                StubKind::ValueType
            };
        }

        if return_type.is_value_type() {
            StubKind::ValueType
        } else {
            StubKind::Reference
        }
    }
}

/// Build the placeholder body for a method returning `return_type`
#[must_use]
pub fn synthesize(return_type: &TypeSig) -> MethodBody {
    match StubKind::classify(return_type) {
        StubKind::Void => MethodBody::new(vec![], false, vec![Instruction::simple(CilOpCode::Ret)]),
        StubKind::ValueType => MethodBody::new(
            vec![return_type.clone()],
            true,
            vec![
                Instruction {
                    opcode: CilOpCode::LdlocaS,
                    operand: Operand::Local(0),
                },
                Instruction {
                    opcode: CilOpCode::Initobj,
                    operand: Operand::Type(return_type.clone()),
                },
                Instruction::simple(CilOpCode::Ldloc0),
                Instruction::simple(CilOpCode::Ret),
            ],
        ),
        StubKind::Reference => MethodBody::new(
            vec![],
            false,
            vec![
                Instruction::simple(CilOpCode::Ldnull),
                Instruction::simple(CilOpCode::Ret),
            ],
        ),
    }
}
