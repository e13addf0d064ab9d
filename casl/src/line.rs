use crate::op::OpKind;
use crate::reg::Reg;
use std::fmt;

// ----------------------------------------------------------------------------
// Operation

/// A mnemonic plus its comma-separated operand texts. Operands stay textual:
/// the assembler downstream resolves labels and literals, not us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    pub operands: Vec<String>,
}

impl Op {
    pub fn new(kind: OpKind, operands: &[&str]) -> Self {
        Self {
            kind,
            operands: operands.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn operand(&self, n: usize) -> Option<&str> {
        self.operands.get(n).map(|s| s.as_str())
    }

    /// Whole-operand register reference, first three operands only.
    pub fn uses_register(&self, reg: Reg) -> bool {
        let name = reg.to_string();
        self.operands
            .iter()
            .take(3)
            .any(|o| o.eq_ignore_ascii_case(&name))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.operands.is_empty() {
            write!(f, "\t{}", self.operands.join(", "))?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Line

/// One line of a CASL II assembly artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub label: Option<String>,
    pub op: Option<Op>,
    pub comment: Option<String>,
}

impl Line {
    pub fn inst(kind: OpKind, operands: &[&str]) -> Self {
        Self {
            label: None,
            op: Some(Op::new(kind, operands)),
            comment: None,
        }
    }

    pub fn labeled(label: impl Into<String>, kind: OpKind, operands: &[&str]) -> Self {
        Self {
            label: Some(label.into()),
            op: Some(Op::new(kind, operands)),
            comment: None,
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            label: None,
            op: None,
            comment: Some(text.into()),
        }
    }

    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }

    pub fn kind(&self) -> Option<OpKind> {
        self.op.as_ref().map(|op| op.kind)
    }

    pub fn operand(&self, n: usize) -> Option<&str> {
        self.op.as_ref().and_then(|op| op.operand(n))
    }

    /// Basic-block divider: a labeled line, or a control-transfer mnemonic.
    pub fn is_block_divider(&self) -> bool {
        self.has_label() || self.kind().is_some_and(|k| k.is_divider())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label, &self.op) {
            (None, None) => {}
            (Some(label), None) => write!(f, "{label}")?,
            (None, Some(op)) => write!(f, "\t{op}")?,
            (Some(label), Some(op)) => write!(f, "{label}\t{op}")?,
        }
        if let Some(comment) = &self.comment {
            if self.op.is_none() && self.label.is_none() {
                write!(f, ";{comment}")?;
            } else {
                write!(f, " ;{comment}")?;
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Parse

impl Line {
    /// Structural parse of one artifact line. Strips the `;` comment, takes
    /// the label from column zero, and splits operands on commas outside
    /// quoted constants.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (code, comment) = match s.find(';') {
            Some(pos) => (
                s[..pos].trim_end().to_string(),
                Some(s[pos + 1..].to_string()),
            ),
            None => (s.to_string(), None),
        };

        if code.trim().is_empty() {
            return Ok(Self {
                label: None,
                op: None,
                comment,
            });
        }

        let label = if code.starts_with(|c: char| !c.is_whitespace()) {
            code.split_whitespace().next().map(|s| s.to_string())
        } else {
            None
        };

        let mut words = code.split_whitespace();
        if label.is_some() {
            words.next();
        }
        let op = match words.next() {
            Some(mnemonic) => {
                let kind = OpKind::parse(mnemonic)?;
                let rest = words.collect::<Vec<_>>().join(" ");
                let operands = if rest.is_empty() {
                    Vec::new()
                } else {
                    split_operands(&rest)
                };
                Some(Op { kind, operands })
            }
            None => None,
        };

        Ok(Self { label, op, comment })
    }
}

/// Comma split that leaves `'...'` constants intact.
fn split_operands(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut quoted = false;
    for c in s.chars() {
        match c {
            '\'' => {
                quoted = !quoted;
                buf.push(c);
            }
            ',' if !quoted => {
                out.push(buf.trim().to_string());
                buf.clear();
            }
            _ => buf.push(c),
        }
    }
    out.push(buf.trim().to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cases = [
            Line::inst(OpKind::LAD, &["GR1", "0", "GR5"]),
            Line::labeled("L3", OpKind::NOP, &[]),
            Line::labeled("MAIN", OpKind::START, &["BEGIN"]),
            Line::inst(OpKind::RET, &[]),
        ];
        for line in cases {
            let text = line.to_string();
            assert_eq!(Line::parse(&text), Ok(line), "{text}");
        }
    }

    #[test]
    fn parse_quoted_operand() {
        let line = Line::parse("STR1\tDC\t'a, b'").unwrap();
        assert_eq!(line.label.as_deref(), Some("STR1"));
        assert_eq!(line.kind(), Some(OpKind::DC));
        assert_eq!(line.operand(0), Some("'a, b'"));
    }

    #[test]
    fn parse_comment_line() {
        let line = Line::parse(";generated").unwrap();
        assert_eq!(line.kind(), None);
        assert_eq!(line.comment.as_deref(), Some("generated"));
    }

    #[test]
    fn register_use() {
        let op = Op::new(OpKind::LAD, &["GR1", "3", "GR4"]);
        assert!(op.uses_register(Reg::GR1));
        assert!(op.uses_register(Reg::GR4));
        assert!(!op.uses_register(Reg::GR3));
        // "=3" or "0" never read as registers
        assert!(!Op::new(OpKind::PUSH, &["0", "GR2"]).uses_register(Reg::GR0));
    }

    #[test]
    fn divider_lines() {
        assert!(Line::labeled("L1", OpKind::NOP, &[]).is_block_divider());
        assert!(Line::inst(OpKind::JUMP, &["L1"]).is_block_divider());
        assert!(!Line::inst(OpKind::PUSH, &["0", "GR1"]).is_block_divider());
    }
}
