// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Trap cause classification.
//!
//! The hardware reports a trap through a signed cause register. A negative
//! value is an asynchronous interrupt whose code sits in the low 31 bits.
//! A non-negative value is a synchronous exception.
//!
//! | cause | meaning | aux | backtrace | resumable |
//! |-------|---------|-----|-----------|-----------|
//! | 1 | instruction access fault | - | yes | no |
//! | 2 | illegal instruction | opcode | yes | no |
//! | 3 | breakpoint | - | no | yes |
//! | 5 | load access fault | address | yes | no |
//! | 7 | store access fault | address | yes | no |
//! | 8 | environment call from U mode | - | no | no |
//! | 11 | environment call from M mode | - | no | no |
//! | other | unknown exception | - | no | no |
//! | < 0 | interrupt | - | no | no |

/// Mask extracting the interrupt code from a negative cause.
pub const INTERRUPT_CODE_MASK: u64 = 0x7FFF_FFFF;

/// Exception code: instruction access fault.
pub const CAUSE_INSTRUCTION_ACCESS_FAULT: i64 = 1;
/// Exception code: illegal instruction.
pub const CAUSE_ILLEGAL_INSTRUCTION: i64 = 2;
/// Exception code: breakpoint.
pub const CAUSE_BREAKPOINT: i64 = 3;
/// Exception code: load access fault.
pub const CAUSE_LOAD_ACCESS_FAULT: i64 = 5;
/// Exception code: store access fault.
pub const CAUSE_STORE_ACCESS_FAULT: i64 = 7;
/// Exception code: environment call from user mode.
pub const CAUSE_USER_ENV_CALL: i64 = 8;
/// Exception code: environment call from machine mode.
pub const CAUSE_MACHINE_ENV_CALL: i64 = 11;

/// Meaning of the auxiliary trap value, for causes that report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxKind {
    /// The faulting instruction word.
    Opcode,
    /// The faulting data address.
    Address,
}

/// Classified trap cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapCause {
    /// Instruction fetch from an inaccessible address.
    InstructionAccessFault,
    /// Undecodable instruction.
    IllegalInstruction,
    /// Breakpoint instruction. The only cause that resumes.
    Breakpoint,
    /// Load from an inaccessible address.
    LoadAccessFault,
    /// Store to an inaccessible address.
    StoreAccessFault,
    /// Environment call from user mode.
    UserEnvCall,
    /// Environment call from machine mode.
    MachineEnvCall,
    /// Exception code without a dedicated handler.
    UnknownException(u64),
    /// Asynchronous interrupt with its code.
    ///
    /// Never resumed: the interrupt line is most likely still asserted and
    /// would fire again immediately.
    Interrupt(u64),
}

impl TrapCause {
    /// Classifies a raw, sign-extended cause register value.
    #[must_use]
    pub const fn from_raw(cause: i64) -> Self {
        if cause < 0 {
            return Self::Interrupt(cause as u64 & INTERRUPT_CODE_MASK);
        }
        match cause {
            CAUSE_INSTRUCTION_ACCESS_FAULT => Self::InstructionAccessFault,
            CAUSE_ILLEGAL_INSTRUCTION => Self::IllegalInstruction,
            CAUSE_BREAKPOINT => Self::Breakpoint,
            CAUSE_LOAD_ACCESS_FAULT => Self::LoadAccessFault,
            CAUSE_STORE_ACCESS_FAULT => Self::StoreAccessFault,
            CAUSE_USER_ENV_CALL => Self::UserEnvCall,
            CAUSE_MACHINE_ENV_CALL => Self::MachineEnvCall,
            code => Self::UnknownException(code as u64),
        }
    }

    /// Returns true for asynchronous interrupts.
    #[inline]
    #[must_use]
    pub const fn is_interrupt(self) -> bool {
        matches!(self, Self::Interrupt(_))
    }

    /// Returns the exception or interrupt code.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::InstructionAccessFault => CAUSE_INSTRUCTION_ACCESS_FAULT as u64,
            Self::IllegalInstruction => CAUSE_ILLEGAL_INSTRUCTION as u64,
            Self::Breakpoint => CAUSE_BREAKPOINT as u64,
            Self::LoadAccessFault => CAUSE_LOAD_ACCESS_FAULT as u64,
            Self::StoreAccessFault => CAUSE_STORE_ACCESS_FAULT as u64,
            Self::UserEnvCall => CAUSE_USER_ENV_CALL as u64,
            Self::MachineEnvCall => CAUSE_MACHINE_ENV_CALL as u64,
            Self::UnknownException(code) | Self::Interrupt(code) => code,
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InstructionAccessFault => "instruction access fault",
            Self::IllegalInstruction => "illegal instruction",
            Self::Breakpoint => "breakpoint",
            Self::LoadAccessFault => "load access fault",
            Self::StoreAccessFault => "store access fault",
            Self::UserEnvCall => "environment call from U mode",
            Self::MachineEnvCall => "environment call from M mode",
            Self::UnknownException(_) => "unknown exception code",
            Self::Interrupt(_) => "interrupt",
        }
    }

    /// Returns what the auxiliary trap value means, if it is reported.
    #[must_use]
    pub const fn aux_kind(self) -> Option<AuxKind> {
        match self {
            Self::IllegalInstruction => Some(AuxKind::Opcode),
            Self::LoadAccessFault | Self::StoreAccessFault => Some(AuxKind::Address),
            _ => None,
        }
    }

    /// Returns true if the call stack should be printed.
    #[must_use]
    pub const fn wants_backtrace(self) -> bool {
        matches!(
            self,
            Self::InstructionAccessFault
                | Self::IllegalInstruction
                | Self::LoadAccessFault
                | Self::StoreAccessFault
        )
    }

    /// Returns true if the trapped program may continue.
    #[must_use]
    pub const fn is_resumable(self) -> bool {
        matches!(self, Self::Breakpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_exceptions_classify() {
        assert_eq!(TrapCause::from_raw(1), TrapCause::InstructionAccessFault);
        assert_eq!(TrapCause::from_raw(2), TrapCause::IllegalInstruction);
        assert_eq!(TrapCause::from_raw(3), TrapCause::Breakpoint);
        assert_eq!(TrapCause::from_raw(5), TrapCause::LoadAccessFault);
        assert_eq!(TrapCause::from_raw(7), TrapCause::StoreAccessFault);
        assert_eq!(TrapCause::from_raw(8), TrapCause::UserEnvCall);
        assert_eq!(TrapCause::from_raw(11), TrapCause::MachineEnvCall);
    }

    #[test]
    fn unlisted_exceptions_are_unknown() {
        assert_eq!(TrapCause::from_raw(0), TrapCause::UnknownException(0));
        assert_eq!(TrapCause::from_raw(4), TrapCause::UnknownException(4));
        assert_eq!(TrapCause::from_raw(13), TrapCause::UnknownException(13));
    }

    #[test]
    fn negative_cause_is_interrupt_with_low_bits() {
        assert_eq!(TrapCause::from_raw(-5), TrapCause::Interrupt(0x7FFF_FFFB));
        // 32-bit mcause for machine timer interrupt, sign-extended
        let timer = i64::from(0x8000_0007_u32 as i32);
        assert_eq!(TrapCause::from_raw(timer), TrapCause::Interrupt(7));
        // 64-bit mcause for machine external interrupt
        let external = (0x8000_0000_0000_000B_u64) as i64;
        assert_eq!(TrapCause::from_raw(external), TrapCause::Interrupt(11));
    }

    #[test]
    fn only_breakpoint_resumes() {
        for raw in -16..16 {
            let cause = TrapCause::from_raw(raw);
            assert_eq!(cause.is_resumable(), raw == 3, "cause {raw}");
        }
    }

    #[test]
    fn backtrace_causes() {
        assert!(TrapCause::InstructionAccessFault.wants_backtrace());
        assert!(TrapCause::IllegalInstruction.wants_backtrace());
        assert!(TrapCause::LoadAccessFault.wants_backtrace());
        assert!(TrapCause::StoreAccessFault.wants_backtrace());
        assert!(!TrapCause::Breakpoint.wants_backtrace());
        assert!(!TrapCause::UserEnvCall.wants_backtrace());
        assert!(!TrapCause::UnknownException(9).wants_backtrace());
        assert!(!TrapCause::Interrupt(5).wants_backtrace());
    }

    #[test]
    fn aux_reporting() {
        assert_eq!(TrapCause::IllegalInstruction.aux_kind(), Some(AuxKind::Opcode));
        assert_eq!(TrapCause::LoadAccessFault.aux_kind(), Some(AuxKind::Address));
        assert_eq!(TrapCause::StoreAccessFault.aux_kind(), Some(AuxKind::Address));
        assert_eq!(TrapCause::InstructionAccessFault.aux_kind(), None);
        assert_eq!(TrapCause::Interrupt(3).aux_kind(), None);
    }

    #[test]
    fn code_round_trips_for_exceptions() {
        for raw in 0..16 {
            assert_eq!(TrapCause::from_raw(raw).code(), raw as u64);
        }
    }
}
