use crate::symtab::SymTab;
use crate::types::{Ty, TypeData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    None,
    Plus,
    Minus,
}

/// Static-check state threaded through the grammar driver: the type stack,
/// the pending-identifier list of the declaration being parsed, and scratch
/// fields for signs, constants and array bounds. Owns the symbol table.
#[derive(Debug)]
pub struct TypeCheck {
    pub tab: SymTab,

    stack: Vec<Ty>,
    idents: Vec<String>,
    sub_name: Option<String>,
    arg_types: Option<Vec<Ty>>,

    index_min: i32,
    index_max: i32,
    sign: Sign,
    constant: u32,

    last_var: Option<String>,
}

impl TypeCheck {
    pub fn new() -> Self {
        Self {
            tab: SymTab::new(),
            stack: Vec::new(),
            idents: Vec::new(),
            sub_name: None,
            arg_types: None,
            index_min: 0,
            index_max: 0,
            sign: Sign::None,
            constant: 0,
            last_var: None,
        }
    }

    // ------------------------------------------------------------------
    // Pending identifiers

    pub fn add_ident(&mut self, name: &str) {
        self.idents.push(name.to_string());
    }

    pub fn clear_idents(&mut self) {
        self.idents.clear();
    }

    pub fn set_sub_name(&mut self, name: &str) {
        self.sub_name = Some(name.to_string());
    }

    // ------------------------------------------------------------------
    // Type stack

    pub fn push_type(&mut self, ty: Ty) {
        self.stack.push(ty);
    }

    pub fn pop_type(&mut self) -> Ty {
        self.stack.pop().unwrap_or(Ty::None)
    }

    pub fn peek_type(&self) -> Ty {
        self.stack.last().copied().unwrap_or(Ty::None)
    }

    /// Compares the two topmost entries; on a match the right operand is
    /// discarded, and the left one too when `no_left` is set.
    pub fn check_type(&mut self, no_left: bool) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        let right = self.pop_type();
        if right == self.peek_type() {
            if no_left {
                self.pop_type();
            }
            true
        } else {
            self.push_type(right);
            false
        }
    }

    /// Declaration parse finished an `array [..] of` clause: the scalar on
    /// top becomes its array counterpart.
    pub fn scalar_to_array(&mut self) -> bool {
        match self.peek_type().to_array() {
            Some(ty) => {
                self.pop_type();
                self.push_type(ty);
                true
            }
            None => false,
        }
    }

    /// Indexed-variable parse finished: the array on top becomes its element.
    pub fn array_to_scalar(&mut self) -> bool {
        match self.peek_type().element() {
            Some(ty) => {
                self.pop_type();
                self.push_type(ty);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Declaration registration

    fn declared_data(&self, ty: Ty) -> TypeData {
        if ty.is_array() {
            TypeData::array(ty, self.index_min, self.index_max)
        } else {
            TypeData::scalar(ty)
        }
    }

    /// Registers every pending identifier with the type on top of the stack.
    pub fn add_global_idents(&mut self) -> bool {
        let ty = self.peek_type();
        if !ty.is_scalar() && !ty.is_array() {
            return false;
        }
        for i in 0..self.idents.len() {
            let name = self.idents[i].clone();
            let data = self.declared_data(ty);
            if !self.tab.add_global(&name, data) {
                return false;
            }
        }
        self.pop_type();
        true
    }

    pub fn add_local_idents(&mut self, is_param: bool) -> bool {
        let ty = self.peek_type();
        if !ty.is_scalar() && !ty.is_array() {
            return false;
        }
        for i in 0..self.idents.len() {
            let name = self.idents[i].clone();
            let data = self.declared_data(ty);
            if !self.tab.add_local(&name, data, is_param) {
                return false;
            }
        }
        self.pop_type();
        true
    }

    /// Registers the procedure named by the last routine-name parse, with
    /// the parameter kinds collected so far.
    pub fn add_subroutine(&mut self) -> bool {
        let Some(name) = self.sub_name.clone() else {
            return false;
        };
        let params = self.arg_types.clone().unwrap_or_default();
        self.tab.add_subroutine(&name, params)
    }

    /// Appends the scalar on top of the stack once per pending parameter
    /// name. The type itself stays on the stack for slot registration.
    pub fn add_arg_types(&mut self) {
        let ty = self.peek_type();
        let args = self.arg_types.get_or_insert_with(Vec::new);
        for _ in 0..self.idents.len() {
            args.push(ty);
        }
    }

    pub fn clear_arg_types(&mut self) {
        self.arg_types = None;
    }

    pub fn leave_subroutine(&mut self) {
        self.tab.leave_subroutine();
    }

    // ------------------------------------------------------------------
    // Variable and call resolution

    /// Resolves the last pending identifier as a variable and pushes its
    /// type; rolls back (returns false) for unknown names and non-variables.
    pub fn push_variable_type(&mut self) -> bool {
        let Some(name) = self.idents.last().cloned() else {
            return false;
        };
        let Some(data) = self.tab.lookup(&name) else {
            return false;
        };
        let ty = data.ty;
        if !ty.is_scalar() && !ty.is_array() {
            return false;
        }
        self.push_type(ty);
        self.idents.pop();
        self.last_var = Some(name);
        true
    }

    /// Resolves the last routine name as a declared procedure; pushes the
    /// subroutine marker and then the expected argument kinds so the first
    /// argument's type lands against the first parameter.
    pub fn push_subroutine_args(&mut self) -> bool {
        let Some(name) = self.sub_name.as_deref() else {
            return false;
        };
        let Some(data) = self.tab.lookup_global(name) else {
            return false;
        };
        if data.ty != Ty::Subroutine {
            return false;
        }
        let params = data.params.clone();
        self.push_type(Ty::Subroutine);
        for ty in params.into_iter().rev() {
            self.push_type(ty);
        }
        true
    }

    // ------------------------------------------------------------------
    // Signed constants and array bounds

    pub fn set_sign(&mut self, sign: Sign) {
        self.sign = sign;
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// Unsigned 16-bit constant; anything outside [0, 65535] is rejected.
    pub fn set_constant(&mut self, lexeme: &str) -> bool {
        match lexeme.parse::<u32>() {
            Ok(value) if value < 65536 => {
                self.constant = value;
                true
            }
            _ => false,
        }
    }

    fn signed_index(&self) -> Option<i32> {
        match self.sign {
            Sign::Minus if self.constant <= 32768 => Some(-(self.constant as i32)),
            Sign::Plus | Sign::None if self.constant <= 32767 => Some(self.constant as i32),
            _ => None,
        }
    }

    pub fn set_index_min(&mut self) -> bool {
        match self.signed_index() {
            Some(value) => {
                self.index_min = value;
                true
            }
            None => false,
        }
    }

    pub fn set_index_max(&mut self) -> bool {
        match self.signed_index() {
            Some(value) => {
                self.index_max = value;
                true
            }
            None => false,
        }
    }

    pub fn check_index(&self) -> bool {
        self.index_min <= self.index_max
    }

    // ------------------------------------------------------------------
    // Addressing of the last resolved names

    fn last_var_data(&self) -> Option<&TypeData> {
        self.tab.lookup(self.last_var.as_deref()?)
    }

    pub fn last_index_min(&self) -> i32 {
        self.last_var_data().map(|d| d.index_min).unwrap_or(0)
    }

    pub fn last_array_size(&self) -> i32 {
        self.last_var_data().map(|d| d.size()).unwrap_or(0)
    }

    pub fn last_param_slot(&self) -> Option<usize> {
        self.tab.param_slot(self.last_var.as_deref()?)
    }

    pub fn last_local_slot(&self) -> Option<usize> {
        self.tab.local_slot(self.last_var.as_deref()?)
    }

    pub fn last_global_label(&self) -> Option<usize> {
        self.tab.var_label(self.last_var.as_deref()?)
    }

    pub fn last_sub_label(&self) -> Option<String> {
        self.tab
            .sub_label(self.sub_name.as_deref()?)
            .map(|s| s.to_string())
    }

    pub fn last_sub_param_count(&self) -> usize {
        self.sub_name
            .as_deref()
            .and_then(|name| self.tab.lookup_global(name))
            .filter(|data| data.ty == Ty::Subroutine)
            .map(|data| data.params.len())
            .unwrap_or(0)
    }
}

impl Default for TypeCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_type_discards() {
        let mut check = TypeCheck::new();
        check.push_type(Ty::Integer);
        check.push_type(Ty::Integer);
        assert!(check.check_type(false));
        assert_eq!(check.peek_type(), Ty::Integer);
        check.push_type(Ty::Boolean);
        assert!(!check.check_type(false));
        assert_eq!(check.peek_type(), Ty::Boolean);
    }

    #[test]
    fn index_bounds() {
        let mut check = TypeCheck::new();
        assert!(check.set_constant("32768"));
        check.set_sign(Sign::Minus);
        assert!(check.set_index_min());
        check.set_sign(Sign::None);
        assert!(!check.set_index_max());
        assert!(check.set_constant("32767"));
        assert!(check.set_index_max());
        assert!(check.check_index());
    }

    #[test]
    fn constant_range() {
        let mut check = TypeCheck::new();
        assert!(check.set_constant("0"));
        assert!(check.set_constant("65535"));
        assert!(!check.set_constant("65536"));
        assert!(!check.set_constant("12x"));
    }

    #[test]
    fn subroutine_args_order() {
        let mut check = TypeCheck::new();
        check.set_sub_name("p");
        check.push_type(Ty::Integer);
        check.add_ident("a");
        check.add_ident("b");
        check.add_arg_types();
        check.pop_type();
        assert!(check.add_subroutine());
        check.clear_arg_types();

        assert!(check.push_subroutine_args());
        // first parameter on top, subroutine marker at the bottom
        assert_eq!(check.pop_type(), Ty::Integer);
        assert_eq!(check.pop_type(), Ty::Integer);
        assert_eq!(check.pop_type(), Ty::Subroutine);
    }
}
