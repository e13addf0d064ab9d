use casl::{Line, OpKind};

/// Instruction buffer with two final streams. Emission goes to a temporary
/// list first; `flush` moves it to the main or the subroutine stream per the
/// current flush mode. Subroutine code is appended after the main body and
/// before the data tail.
#[derive(Debug, Default)]
pub struct CodeGen {
    main: Vec<Line>,
    sub: Vec<Line>,
    temp: Vec<Line>,
    to_main: bool,
}

impl CodeGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inst(&mut self, kind: OpKind, operands: &[&str]) {
        self.temp.push(Line::inst(kind, operands));
    }

    pub fn labeled(&mut self, label: impl Into<String>, kind: OpKind, operands: &[&str]) {
        self.temp.push(Line::labeled(label, kind, operands));
    }

    pub fn comment(&mut self, text: &str) {
        self.temp.push(Line::comment(text));
    }

    pub fn set_flush(&mut self, to_main: bool) {
        self.to_main = to_main;
    }

    pub fn flush(&mut self) {
        let to_main = self.to_main;
        self.flush_to(to_main);
    }

    pub fn flush_to(&mut self, to_main: bool) {
        if to_main {
            self.main.append(&mut self.temp);
        } else {
            self.sub.append(&mut self.temp);
        }
    }

    /// Appends the subroutine stream to the main stream.
    pub fn append_sub(&mut self) {
        let mut sub = std::mem::take(&mut self.sub);
        self.main.append(&mut sub);
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.main
    }
}
