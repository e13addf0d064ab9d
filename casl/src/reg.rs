use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

/// COMET II general registers. GR8 doubles as the stack-top register.
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
pub enum Reg {
    GR0,
    GR1,
    GR2,
    GR3,
    GR4,
    GR5,
    GR6,
    GR7,
    GR8,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    /// Register-shaped operand text, case-insensitive.
    pub fn try_parse(s: &str) -> Option<Self> {
        s.to_ascii_uppercase().parse::<Self>().ok()
    }
}

#[test]
fn test() {
    assert_eq!(Reg::try_parse("gr3"), Some(Reg::GR3));
    assert_eq!(Reg::try_parse("GR8"), Some(Reg::GR8));
    assert_eq!(Reg::try_parse("GR9"), None);
    assert_eq!(Reg::try_parse("L1"), None);
    assert_eq!(Reg::GR5.to_string(), "GR5");
}
