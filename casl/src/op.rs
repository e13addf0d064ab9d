use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

/// CASL II mnemonics, assembler directives included.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    IntoPrimitive,
    TryFromPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
pub enum OpKind {
    // Load / store
    LD,
    ST,
    LAD,
    // Arithmetic
    ADDA,
    SUBA,
    ADDL,
    SUBL,
    // Logic
    AND,
    OR,
    XOR,
    // Compare
    CPA,
    CPL,
    // Shift
    SLA,
    SRA,
    SLL,
    SRL,
    // Jump
    JPL,
    JMI,
    JNZ,
    JZE,
    JOV,
    JUMP,
    // Stack
    PUSH,
    POP,
    // Call / return
    CALL,
    RET,
    // System
    SVC,
    NOP,
    // Macro
    IN,
    OUT,
    RPUSH,
    RPOP,
    // Assembler directives
    START,
    END,
    DS,
    DC,
}

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn is_jump(&self) -> bool {
        use OpKind::*;
        matches!(self, JPL | JMI | JNZ | JZE | JOV | JUMP)
    }

    /// Mnemonics that terminate straight-line control flow. An instruction
    /// carrying one of these (or any label) ends a basic block.
    pub fn is_divider(&self) -> bool {
        use OpKind::*;
        self.is_jump() || matches!(self, RPUSH | RPOP | CALL | RET | SVC)
    }
}
