use crate::types::{Ty, TypeData};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Two-scope symbol table fused with machine-level addressing: global `VARn`
/// labels, deduplicated `STRn` string constants, `SUBn` subroutine labels,
/// per-subroutine frame slots, and the `Ln` control-flow label counter.
///
/// All addressing is assigned once per compilation, except frame slots which
/// are scoped to one subroutine and reset by `leave_subroutine`.
#[derive(Debug, Default)]
pub struct SymTab {
    global: HashMap<String, TypeData>,
    local: HashMap<String, TypeData>,

    var_labels: Vec<String>,
    str_labels: IndexSet<String>,
    sub_labels: HashMap<String, String>,

    // Frame slots of the subroutine currently being compiled. Arrays pad
    // their slot list with `None` so later names land past the array.
    local_slots: Vec<Option<String>>,
    param_slots: Vec<String>,

    n_label: u32,
    n_sub: u32,
}

impl SymTab {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Declaration

    /// Registers a global identifier; `false` on re-declaration. Variables
    /// also get the next `VARn` label in declaration order.
    pub fn add_global(&mut self, name: &str, data: TypeData) -> bool {
        if self.global.contains_key(name) {
            return false;
        }
        if data.ty != Ty::Subroutine {
            self.var_labels.push(name.to_string());
        }
        self.global.insert(name.to_string(), data);
        true
    }

    /// Registers a procedure and assigns its `SUBn` label.
    pub fn add_subroutine(&mut self, name: &str, params: Vec<Ty>) -> bool {
        if !self.add_global(name, TypeData::subroutine(params)) {
            return false;
        }
        self.n_sub += 1;
        self.sub_labels
            .insert(name.to_string(), format!("SUB{}", self.n_sub));
        true
    }

    /// Registers a local identifier; parameters get a parameter slot, other
    /// locals a frame slot (arrays occupy `size` consecutive slots).
    pub fn add_local(&mut self, name: &str, data: TypeData, is_param: bool) -> bool {
        if self.local.contains_key(name) {
            return false;
        }
        if is_param {
            self.param_slots.push(name.to_string());
        } else {
            self.local_slots.push(Some(name.to_string()));
            for _ in 1..data.size() {
                self.local_slots.push(None);
            }
        }
        self.local.insert(name.to_string(), data);
        true
    }

    /// Drops the local scope and its frame slots together.
    pub fn leave_subroutine(&mut self) {
        self.local.clear();
        self.local_slots.clear();
        self.param_slots.clear();
    }

    // ------------------------------------------------------------------
    // Lookup

    /// Local scope first, then global.
    pub fn lookup(&self, name: &str) -> Option<&TypeData> {
        self.local.get(name).or_else(|| self.global.get(name))
    }

    pub fn lookup_global(&self, name: &str) -> Option<&TypeData> {
        self.global.get(name)
    }

    // ------------------------------------------------------------------
    // Addressing

    /// Fresh `Ln` label for if/while branch targets.
    pub fn gen_label(&mut self) -> String {
        self.n_label += 1;
        format!("L{}", self.n_label)
    }

    /// 1-based `VARn` number of a global variable.
    pub fn var_label(&self, name: &str) -> Option<usize> {
        self.var_labels.iter().position(|v| v == name).map(|i| i + 1)
    }

    /// Frame-slot offset of a local, addressed from the local frame base.
    pub fn local_slot(&self, name: &str) -> Option<usize> {
        self.local_slots
            .iter()
            .position(|v| v.as_deref() == Some(name))
    }

    /// Offset of a parameter, addressed from the parameter frame base.
    /// Arguments are pushed left to right, so the first parameter sits
    /// deepest in the frame.
    pub fn param_slot(&self, name: &str) -> Option<usize> {
        self.param_slots
            .iter()
            .position(|v| v == name)
            .map(|i| self.param_slots.len() - i - 1)
    }

    /// `SUBn` label of a declared procedure.
    pub fn sub_label(&self, name: &str) -> Option<&str> {
        self.sub_labels.get(name).map(|s| s.as_str())
    }

    /// 1-based `STRn` number of a string constant, interned by content.
    pub fn intern_string(&mut self, lexeme: &str) -> usize {
        let (index, _) = self.str_labels.insert_full(lexeme.to_string());
        index + 1
    }

    pub fn local_size(&self) -> usize {
        self.local_slots.len()
    }

    pub fn param_count(&self) -> usize {
        self.param_slots.len()
    }

    // ------------------------------------------------------------------
    // Data-section emission

    /// Global variables in declaration order, paired with their sizes.
    pub fn var_data(&self) -> impl Iterator<Item = (usize, &str, i32)> {
        self.var_labels.iter().enumerate().map(|(i, name)| {
            let size = self.global.get(name).map(|d| d.size()).unwrap_or(0);
            (i + 1, name.as_str(), size)
        })
    }

    /// Interned string constants in first-use order.
    pub fn str_data(&self) -> impl Iterator<Item = (usize, &str)> {
        self.str_labels
            .iter()
            .enumerate()
            .map(|(i, s)| (i + 1, s.as_str()))
    }
}
