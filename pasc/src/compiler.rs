use crate::check::{Sign, TypeCheck};
use crate::codegen::CodeGen;
use crate::error::Error;
use crate::token::{Token, TokenKind};
use crate::types::Ty;
use casl::{Line, OpKind};

use OpKind::*;
use TokenKind::*;

/// Compiles a token sequence into the CASL II assembly artifact, or reports
/// the first syntax/semantic error.
pub fn compile(tokens: Vec<Token>) -> Result<Vec<Line>, Error> {
    let mut compiler = Compiler::new(tokens);
    compiler.parse_program()?;
    if compiler.index != compiler.tokens.len() {
        return Err(Error::ExtraData);
    }
    Ok(compiler.code.into_lines())
}

/// Recursive-descent driver fusing parsing, type checking and emission.
/// Every nonterminal is one method taking an "optional" flag; mandatory
/// mismatches raise a syntax error, optional ones roll the token index back.
struct Compiler {
    tokens: Vec<Token>,
    index: usize,
    check: TypeCheck,
    code: CodeGen,
}

// ----------------------------------------------------------------------------
// Token cursor

impl Compiler {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            check: TypeCheck::new(),
            code: CodeGen::new(),
        }
    }

    fn kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.index).map(|t| t.kind)
    }

    fn lexeme(&self) -> &str {
        self.tokens
            .get(self.index)
            .map(|t| t.lexeme.as_str())
            .unwrap_or("")
    }

    /// Line of the token under inspection; past the end, the last token's.
    fn line(&self) -> usize {
        self.tokens
            .get(self.index)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.kind() == Some(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), Error> {
        if self.accept(kind) {
            Ok(())
        } else {
            self.syntax_error()
        }
    }

    fn syntax_error<T>(&self) -> Result<T, Error> {
        Err(Error::Syntax { line: self.line() })
    }

    fn semantic_error<T>(&self) -> Result<T, Error> {
        Err(Error::Semantic { line: self.line() })
    }
}

// ----------------------------------------------------------------------------
// Program structure

impl Compiler {
    fn parse_program(&mut self) -> Result<(), Error> {
        self.expect(SPROGRAM)?;
        self.parse_program_name()?;
        self.expect(SLPAREN)?;
        self.parse_name_list()?;
        self.expect(SRPAREN)?;
        self.expect(SSEMICOLON)?;

        self.code.labeled("MAIN", START, &["BEGIN"]);
        self.code.labeled("BEGIN", LAD, &["GR6", "0"]);
        self.code.inst(LAD, &["GR7", "LIBBUF"]);
        self.code.flush_to(true);

        self.code.set_flush(false);
        self.parse_block()?;

        self.code.set_flush(true);
        self.parse_compound(false)?;

        self.code.inst(RET, &[]);
        self.code.flush_to(true);

        self.code.append_sub();

        self.code.labeled("LIBBUF", DS, &["256"]);
        self.code.flush_to(true);
        self.emit_data_sections();

        self.expect(SDOT)?;

        self.code.inst(END, &[]);
        self.code.flush_to(true);
        Ok(())
    }

    fn parse_program_name(&mut self) -> Result<(), Error> {
        self.expect(SIDENTIFIER)
    }

    fn parse_name_list(&mut self) -> Result<(), Error> {
        self.expect(SIDENTIFIER)?;
        while self.accept(SCOMMA) {
            self.expect(SIDENTIFIER)?;
        }
        Ok(())
    }

    /// `VARn DS size` and `STRn DC 'lit'` in declaration/first-use order.
    fn emit_data_sections(&mut self) {
        let vars: Vec<(usize, i32)> = self
            .check
            .tab
            .var_data()
            .map(|(n, _, size)| (n, size))
            .collect();
        for (n, size) in vars {
            if size > 0 {
                let label = format!("VAR{n}");
                let size = size.to_string();
                self.code.labeled(label, DS, &[&size]);
            }
        }

        let strs: Vec<(usize, String)> = self
            .check
            .tab
            .str_data()
            .map(|(n, s)| (n, s.to_string()))
            .collect();
        for (n, lexeme) in strs {
            let label = format!("STR{n}");
            self.code.labeled(label, DC, &[&lexeme]);
        }

        self.code.flush_to(true);
    }

    fn parse_block(&mut self) -> Result<(), Error> {
        self.parse_var_decl(true)?;
        self.parse_subprogram_decls()
    }
}

// ----------------------------------------------------------------------------
// Declarations

impl Compiler {
    fn parse_var_decl(&mut self, is_global: bool) -> Result<(), Error> {
        if self.accept(SVAR) {
            self.parse_var_decl_list(is_global)?;
        }
        Ok(())
    }

    fn parse_var_decl_list(&mut self, is_global: bool) -> Result<(), Error> {
        self.parse_var_name_list(false)?;
        self.expect(SCOLON)?;
        self.parse_type()?;
        self.register_decl(is_global)?;
        self.expect(SSEMICOLON)?;

        while self.parse_var_name_list(true)? {
            self.expect(SCOLON)?;
            self.parse_type()?;
            self.register_decl(is_global)?;
            self.expect(SSEMICOLON)?;
        }
        Ok(())
    }

    /// The whole pending name list gets the type on top of the stack.
    fn register_decl(&mut self, is_global: bool) -> Result<(), Error> {
        let ok = if is_global {
            self.check.add_global_idents()
        } else {
            self.check.add_local_idents(false)
        };
        if !ok {
            return self.semantic_error();
        }
        self.check.clear_idents();
        Ok(())
    }

    fn parse_var_name_list(&mut self, optional: bool) -> Result<bool, Error> {
        if !self.parse_var_name(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        while self.accept(SCOMMA) {
            self.parse_var_name(false)?;
        }
        Ok(true)
    }

    fn parse_var_name(&mut self, optional: bool) -> Result<bool, Error> {
        if self.kind() != Some(SIDENTIFIER) {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        let name = self.lexeme().to_string();
        self.check.add_ident(&name);
        self.advance();
        Ok(true)
    }

    fn parse_type(&mut self) -> Result<(), Error> {
        if self.parse_scalar_type(true)? {
            Ok(())
        } else if self.parse_array_type(true)? {
            Ok(())
        } else {
            self.syntax_error()
        }
    }

    fn parse_scalar_type(&mut self, optional: bool) -> Result<bool, Error> {
        let ty = match self.kind() {
            Some(SINTEGER) => Ty::Integer,
            Some(SCHAR) => Ty::Char,
            Some(SBOOLEAN) => Ty::Boolean,
            _ => {
                if optional {
                    return Ok(false);
                }
                return self.syntax_error();
            }
        };
        self.check.push_type(ty);
        self.advance();
        Ok(true)
    }

    fn parse_array_type(&mut self, optional: bool) -> Result<bool, Error> {
        if self.kind() != Some(SARRAY) {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        self.advance();

        self.expect(SLBRACKET)?;
        self.parse_index_min()?;
        self.expect(SRANGE)?;
        self.parse_index_max()?;
        if !self.check.check_index() {
            return self.semantic_error();
        }
        self.expect(SRBRACKET)?;
        self.expect(SOF)?;
        self.parse_scalar_type(false)?;
        self.check.scalar_to_array();
        Ok(true)
    }

    fn parse_index_min(&mut self) -> Result<(), Error> {
        self.parse_integer()?;
        if !self.check.set_index_min() {
            return self.semantic_error();
        }
        Ok(())
    }

    fn parse_index_max(&mut self) -> Result<(), Error> {
        self.parse_integer()?;
        if !self.check.set_index_max() {
            return self.semantic_error();
        }
        Ok(())
    }

    fn parse_integer(&mut self) -> Result<(), Error> {
        self.parse_sign(true)?;
        if self.kind() != Some(SCONSTANT) {
            return self.syntax_error();
        }
        let lexeme = self.lexeme().to_string();
        if !self.check.set_constant(&lexeme) {
            return self.semantic_error();
        }
        self.advance();
        Ok(())
    }

    fn parse_sign(&mut self, optional: bool) -> Result<bool, Error> {
        match self.kind() {
            Some(SPLUS) => {
                self.check.set_sign(Sign::Plus);
                self.advance();
                Ok(true)
            }
            Some(SMINUS) => {
                self.check.set_sign(Sign::Minus);
                self.advance();
                Ok(true)
            }
            _ => {
                if optional {
                    self.check.set_sign(Sign::None);
                    Ok(false)
                } else {
                    self.syntax_error()
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Subprograms

impl Compiler {
    fn parse_subprogram_decls(&mut self) -> Result<(), Error> {
        while self.parse_subprogram_decl(true)? {
            self.expect(SSEMICOLON)?;
        }
        Ok(())
    }

    fn parse_subprogram_decl(&mut self, optional: bool) -> Result<bool, Error> {
        if !self.parse_subprogram_header(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }

        self.parse_var_decl(false)?;

        let sub_label = self.check.last_sub_label().unwrap_or_default();
        self.code.labeled(sub_label, NOP, &[]);
        if self.check.tab.param_count() > 0 {
            self.code.inst(LAD, &["GR4", "1", "GR8"]);
        }
        let local_size = self.check.tab.local_size();
        if local_size > 0 {
            let imm = format!("={local_size}");
            self.code.inst(SUBL, &["GR8", &imm]);
            self.code.inst(LAD, &["GR5", "0", "GR8"]);
        }
        self.code.flush();

        self.parse_compound(false)?;

        if local_size > 0 {
            let imm = format!("={local_size}");
            self.code.inst(ADDL, &["GR8", &imm]);
        }
        self.code.inst(RET, &[]);
        self.code.flush();

        self.check.leave_subroutine();
        Ok(true)
    }

    fn parse_subprogram_header(&mut self, optional: bool) -> Result<bool, Error> {
        if self.kind() != Some(SPROCEDURE) {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        self.advance();

        self.parse_routine_name(false)?;
        self.parse_params()?;

        if !self.check.add_subroutine() {
            return self.semantic_error();
        }
        self.check.clear_arg_types();

        self.expect(SSEMICOLON)?;
        Ok(true)
    }

    fn parse_routine_name(&mut self, optional: bool) -> Result<bool, Error> {
        if self.kind() != Some(SIDENTIFIER) {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        let name = self.lexeme().to_string();
        self.check.set_sub_name(&name);
        self.advance();
        Ok(true)
    }

    fn parse_params(&mut self) -> Result<(), Error> {
        if self.accept(SLPAREN) {
            self.parse_param_list()?;
            self.expect(SRPAREN)?;
        }
        Ok(())
    }

    fn parse_param_list(&mut self) -> Result<(), Error> {
        self.parse_param_group()?;
        while self.accept(SSEMICOLON) {
            self.parse_param_group()?;
        }
        Ok(())
    }

    /// `name {, name} : scalarType` — parameters are scalar only.
    fn parse_param_group(&mut self) -> Result<(), Error> {
        self.parse_param_name()?;
        while self.accept(SCOMMA) {
            self.parse_param_name()?;
        }
        self.expect(SCOLON)?;
        self.parse_scalar_type(false)?;

        self.check.add_arg_types();
        if !self.check.add_local_idents(true) {
            return self.semantic_error();
        }
        self.check.clear_idents();
        Ok(())
    }

    fn parse_param_name(&mut self) -> Result<(), Error> {
        if self.kind() != Some(SIDENTIFIER) {
            return self.syntax_error();
        }
        let name = self.lexeme().to_string();
        self.check.add_ident(&name);
        self.advance();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Statements

impl Compiler {
    fn parse_compound(&mut self, optional: bool) -> Result<bool, Error> {
        if self.kind() != Some(SBEGIN) {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        self.advance();

        self.parse_statement_list()?;

        self.expect(SEND)?;
        Ok(true)
    }

    fn parse_statement_list(&mut self) -> Result<(), Error> {
        self.parse_statement()?;
        while self.accept(SSEMICOLON) {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<(), Error> {
        if self.accept(SIF) {
            self.parse_if_statement()
        } else if self.accept(SWHILE) {
            self.parse_while_statement()
        } else if self.parse_basic_statement(true)? {
            Ok(())
        } else {
            self.syntax_error()
        }
    }

    fn parse_condition(&mut self) -> Result<(), Error> {
        self.check.push_type(Ty::Boolean);
        self.parse_expression()?;
        if !self.check.check_type(true) {
            return self.semantic_error();
        }
        self.code.inst(POP, &["GR3"]);
        self.code.inst(CPL, &["GR3", "=#0001"]);
        self.code.flush();
        Ok(())
    }

    fn parse_if_statement(&mut self) -> Result<(), Error> {
        self.parse_condition()?;

        self.expect(STHEN)?;

        let label1 = self.check.tab.gen_label();
        self.code.inst(JNZ, &[&label1]);
        self.code.flush();

        self.parse_compound(false)?;

        if self.accept(SELSE) {
            let label2 = self.check.tab.gen_label();
            self.code.inst(JUMP, &[&label2]);
            self.code.labeled(label1, NOP, &[]);
            self.code.flush();

            self.parse_compound(false)?;

            self.code.labeled(label2, NOP, &[]);
            self.code.flush();
        } else {
            self.code.labeled(label1, NOP, &[]);
            self.code.flush();
        }
        Ok(())
    }

    fn parse_while_statement(&mut self) -> Result<(), Error> {
        let label1 = self.check.tab.gen_label();
        self.code.labeled(label1.clone(), NOP, &[]);
        self.code.flush();

        self.parse_condition()?;

        self.expect(SDO)?;

        let label2 = self.check.tab.gen_label();
        self.code.inst(JNZ, &[&label2]);
        self.code.flush();

        self.parse_statement()?;

        self.code.inst(JUMP, &[&label1]);
        self.code.labeled(label2, NOP, &[]);
        self.code.flush();
        Ok(())
    }

    fn parse_basic_statement(&mut self, optional: bool) -> Result<bool, Error> {
        if self.kind() == Some(SIDENTIFIER) {
            // Assignment and call both start with an identifier; an
            // identifier that resolves as neither is a semantic error.
            if self.parse_assign_statement(true)? {
            } else if self.parse_call_statement(true)? {
            } else {
                return self.semantic_error();
            }
        } else if self.parse_io_statement(true)? {
        } else if self.parse_compound(true)? {
        } else {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        Ok(true)
    }

    fn parse_assign_statement(&mut self, optional: bool) -> Result<bool, Error> {
        if !self.parse_lhs(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }

        self.expect(SASSIGN)?;

        if !self.check.peek_type().is_scalar() {
            return self.semantic_error();
        }

        self.parse_expression()?;
        if !self.check.check_type(true) {
            return self.semantic_error();
        }

        self.code.inst(POP, &["GR2"]);
        self.code.inst(POP, &["GR1"]);
        self.code.inst(ST, &["GR2", "0", "GR1"]);
        self.code.flush();
        Ok(true)
    }

    fn parse_lhs(&mut self, optional: bool) -> Result<bool, Error> {
        if !self.parse_variable(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        Ok(true)
    }

    fn parse_call_statement(&mut self, optional: bool) -> Result<bool, Error> {
        let old_index = self.index;

        if !self.parse_routine_name(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }

        if !self.check.push_subroutine_args() {
            self.index = old_index;
            return self.semantic_error();
        }

        let sub_label = self.check.last_sub_label().unwrap_or_default();
        let param_count = self.check.last_sub_param_count();

        // caller saves the frame bases around the call
        self.code.inst(PUSH, &["0", "GR4"]);
        self.code.inst(PUSH, &["0", "GR5"]);
        self.code.flush();

        if self.accept(SLPAREN) {
            self.parse_expression_list(false)?;
            self.expect(SRPAREN)?;
        }

        self.code.inst(CALL, &[&sub_label]);
        if param_count > 0 {
            let imm = format!("={param_count}");
            self.code.inst(ADDL, &["GR8", &imm]);
        }
        self.code.inst(POP, &["GR5"]);
        self.code.inst(POP, &["GR4"]);
        self.code.flush();

        // a wrong argument count leaves expected kinds above the marker
        if self.check.pop_type() != Ty::Subroutine {
            return self.semantic_error();
        }
        Ok(true)
    }
}

// ----------------------------------------------------------------------------
// Variables

impl Compiler {
    fn parse_variable(&mut self, optional: bool) -> Result<bool, Error> {
        if self.parse_indexed_variable(true)? {
        } else if self.parse_plain_variable(true)? {
        } else {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        Ok(true)
    }

    fn parse_plain_variable(&mut self, optional: bool) -> Result<bool, Error> {
        let old_index = self.index;

        if !self.parse_var_name(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }

        if !self.check.push_variable_type() {
            self.index = old_index;
            if optional {
                self.check.clear_idents();
                return Ok(false);
            }
            return self.semantic_error();
        }

        if let Some(slot) = self.check.last_param_slot() {
            let off = slot.to_string();
            self.code.inst(LAD, &["GR1", &off, "GR4"]);
        } else if let Some(slot) = self.check.last_local_slot() {
            let off = slot.to_string();
            self.code.inst(LAD, &["GR1", &off, "GR5"]);
        } else if let Some(n) = self.check.last_global_label() {
            let var = format!("VAR{n}");
            self.code.inst(LAD, &["GR1", &var]);
        } else {
            self.code.comment("ERROR: variable addressing failed");
        }
        if self.check.peek_type().is_array() {
            let size = format!("={}", self.check.last_array_size());
            self.code.inst(LD, &["GR0", &size]);
        }
        self.code.inst(PUSH, &["0", "GR1"]);
        self.code.flush();
        Ok(true)
    }

    fn parse_indexed_variable(&mut self, optional: bool) -> Result<bool, Error> {
        let old_index = self.index;

        if !self.parse_var_name(true)? {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }

        if !self.check.push_variable_type() {
            self.index = old_index;
            if optional {
                self.check.clear_idents();
                return Ok(false);
            }
            return self.semantic_error();
        }
        if !self.check.peek_type().is_array() {
            self.index = old_index;
            if optional {
                self.check.pop_type();
                return Ok(false);
            }
            return self.semantic_error();
        }

        if self.kind() != Some(SLBRACKET) {
            if optional {
                self.index = old_index;
                self.check.pop_type();
                return Ok(false);
            }
            return self.syntax_error();
        }
        self.advance();

        // base address; parameters are never arrays
        if let Some(slot) = self.check.last_local_slot() {
            let off = slot.to_string();
            self.code.inst(LAD, &["GR1", &off, "GR5"]);
        } else if let Some(n) = self.check.last_global_label() {
            let var = format!("VAR{n}");
            self.code.inst(LAD, &["GR1", &var]);
        } else {
            self.code.comment("ERROR: variable addressing failed");
        }
        let min = format!("={}", self.check.last_index_min());
        self.code.inst(SUBL, &["GR1", &min]);
        self.code.inst(PUSH, &["0", "GR1"]);
        self.code.flush();

        self.parse_index()?;

        self.expect(SRBRACKET)?;

        if !self.check.array_to_scalar() {
            return self.semantic_error();
        }

        self.code.inst(POP, &["GR2"]);
        self.code.inst(POP, &["GR1"]);
        self.code.inst(ADDL, &["GR1", "GR2"]);
        self.code.inst(PUSH, &["0", "GR1"]);
        self.code.flush();
        Ok(true)
    }

    fn parse_index(&mut self) -> Result<(), Error> {
        self.check.push_type(Ty::Integer);
        self.parse_expression()?;
        if !self.check.check_type(true) {
            return self.semantic_error();
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Expressions

impl Compiler {
    /// Expression list of a call (`is_io` false, types checked against the
    /// expected parameter kinds) or of `writeln` (`is_io` true, each operand
    /// dispatched to the output routine of its static type).
    fn parse_expression_list(&mut self, is_io: bool) -> Result<(), Error> {
        loop {
            self.parse_expression()?;
            if !is_io {
                if !self.check.check_type(true) {
                    return self.semantic_error();
                }
            } else {
                self.code.inst(POP, &["GR2"]);
                match self.check.peek_type() {
                    Ty::Integer => self.code.inst(CALL, &["WRTINT"]),
                    Ty::Char => self.code.inst(CALL, &["WRTCH"]),
                    Ty::ArrayChar => {
                        self.code.inst(LD, &["GR1", "GR0"]);
                        self.code.inst(CALL, &["WRTSTR"]);
                    }
                    _ => return self.semantic_error(),
                }
                self.code.flush();
                self.check.pop_type();
            }

            if !self.accept(SCOMMA) {
                break;
            }
        }
        Ok(())
    }

    fn parse_expression(&mut self) -> Result<(), Error> {
        self.parse_simple_expression()?;

        if let Some(op) = self.parse_rel_op(true)? {
            self.parse_simple_expression()?;
            if !self.check.peek_type().is_scalar() {
                return self.semantic_error();
            }
            if !self.check.check_type(true) {
                return self.semantic_error();
            }
            self.check.push_type(Ty::Boolean);

            self.code.inst(POP, &["GR2"]);
            self.code.inst(POP, &["GR1"]);
            self.code.inst(CPA, &["GR1", "GR2"]);
            let label1 = self.check.tab.gen_label();
            let label2 = self.check.tab.gen_label();
            let mut reverse = false;
            match op {
                SEQUAL => self.code.inst(JZE, &[&label1]),
                SNOTEQUAL => self.code.inst(JNZ, &[&label1]),
                SLESS => self.code.inst(JMI, &[&label1]),
                SLESSEQUAL => {
                    self.code.inst(JPL, &[&label1]);
                    reverse = true;
                }
                SGREAT => self.code.inst(JPL, &[&label1]),
                SGREATEQUAL => {
                    self.code.inst(JMI, &[&label1]);
                    reverse = true;
                }
                _ => self.code.comment("UNREACHABLE: bad relational operator"),
            }
            let (fall, taken) = if reverse {
                ("=#0001", "=#0000")
            } else {
                ("=#0000", "=#0001")
            };
            self.code.inst(LD, &["GR3", fall]);
            self.code.inst(JUMP, &[&label2]);
            self.code.labeled(label1, LD, &["GR3", taken]);
            self.code.labeled(label2, PUSH, &["0", "GR3"]);
            self.code.flush();
        }
        Ok(())
    }

    fn parse_simple_expression(&mut self) -> Result<(), Error> {
        self.parse_sign(true)?;

        self.parse_term()?;
        let sign = self.check.sign();
        if sign != Sign::None {
            if self.check.peek_type() != Ty::Integer {
                return self.semantic_error();
            }
            if sign == Sign::Minus {
                self.code.inst(POP, &["GR2"]);
                self.code.inst(LD, &["GR1", "=0"]);
                self.code.inst(SUBA, &["GR1", "GR2"]);
                self.code.inst(PUSH, &["0", "GR1"]);
                self.code.flush();
            }
        }

        while let Some(op) = self.parse_add_op(true)? {
            self.parse_term()?;

            if !self.check.check_type(false) {
                return self.semantic_error();
            }

            self.code.inst(POP, &["GR2"]);
            self.code.inst(POP, &["GR1"]);
            match op {
                SPLUS => self.code.inst(ADDA, &["GR1", "GR2"]),
                SMINUS => self.code.inst(SUBA, &["GR1", "GR2"]),
                SOR => self.code.inst(OR, &["GR1", "GR2"]),
                _ => self.code.comment("UNREACHABLE: bad additive operator"),
            }
            self.code.inst(PUSH, &["0", "GR1"]);
            self.code.flush();
        }
        Ok(())
    }

    fn parse_term(&mut self) -> Result<(), Error> {
        self.parse_factor()?;

        while let Some(op) = self.parse_mul_op(true)? {
            self.parse_factor()?;

            if !self.check.check_type(false) {
                return self.semantic_error();
            }

            self.code.inst(POP, &["GR2"]);
            self.code.inst(POP, &["GR1"]);
            // MULT leaves the product in GR2; DIV the quotient in GR2 and
            // the remainder in GR1.
            let result_in_gr2 = match op {
                SSTAR => {
                    self.code.inst(CALL, &["MULT"]);
                    true
                }
                SDIVD => {
                    self.code.inst(CALL, &["DIV"]);
                    true
                }
                SMOD => {
                    self.code.inst(CALL, &["DIV"]);
                    false
                }
                SAND => {
                    self.code.inst(AND, &["GR1", "GR2"]);
                    false
                }
                _ => {
                    self.code.comment("UNREACHABLE: bad multiplicative operator");
                    false
                }
            };
            if result_in_gr2 {
                self.code.inst(PUSH, &["0", "GR2"]);
            } else {
                self.code.inst(PUSH, &["0", "GR1"]);
            }
            self.code.flush();
        }
        Ok(())
    }

    fn parse_factor(&mut self) -> Result<(), Error> {
        if self.kind() == Some(SIDENTIFIER) {
            self.parse_variable(false)?;

            // scalar factors load the value behind the pushed address
            if self.check.peek_type().is_scalar() {
                self.code.inst(POP, &["GR1"]);
                self.code.inst(LD, &["GR1", "0", "GR1"]);
                self.code.inst(PUSH, &["0", "GR1"]);
                self.code.flush();
            }
        } else if self.parse_constant(true)? {
        } else if self.accept(SLPAREN) {
            self.parse_expression()?;
            self.expect(SRPAREN)?;
        } else if self.accept(SNOT) {
            self.parse_factor()?;
            if self.check.peek_type() != Ty::Boolean {
                return self.semantic_error();
            }

            self.code.inst(POP, &["GR1"]);
            self.code.inst(XOR, &["GR1", "=#0001"]);
            self.code.inst(PUSH, &["0", "GR1"]);
            self.code.flush();
        } else {
            return self.syntax_error();
        }
        Ok(())
    }

    fn parse_rel_op(&mut self, optional: bool) -> Result<Option<TokenKind>, Error> {
        match self.kind() {
            Some(op @ (SEQUAL | SNOTEQUAL | SLESS | SLESSEQUAL | SGREAT | SGREATEQUAL)) => {
                self.advance();
                Ok(Some(op))
            }
            _ => {
                if optional {
                    Ok(None)
                } else {
                    self.syntax_error()
                }
            }
        }
    }

    /// The left operand's type gates the operator before it is consumed.
    fn parse_add_op(&mut self, optional: bool) -> Result<Option<TokenKind>, Error> {
        match self.kind() {
            Some(op @ (SPLUS | SMINUS)) => {
                if self.check.peek_type() != Ty::Integer {
                    return self.semantic_error();
                }
                self.advance();
                Ok(Some(op))
            }
            Some(op @ SOR) => {
                if self.check.peek_type() != Ty::Boolean {
                    return self.semantic_error();
                }
                self.advance();
                Ok(Some(op))
            }
            _ => {
                if optional {
                    Ok(None)
                } else {
                    self.syntax_error()
                }
            }
        }
    }

    fn parse_mul_op(&mut self, optional: bool) -> Result<Option<TokenKind>, Error> {
        match self.kind() {
            Some(op @ (SSTAR | SDIVD | SMOD)) => {
                if self.check.peek_type() != Ty::Integer {
                    return self.semantic_error();
                }
                self.advance();
                Ok(Some(op))
            }
            Some(op @ SAND) => {
                if self.check.peek_type() != Ty::Boolean {
                    return self.semantic_error();
                }
                self.advance();
                Ok(Some(op))
            }
            _ => {
                if optional {
                    Ok(None)
                } else {
                    self.syntax_error()
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// I/O statements and constants

impl Compiler {
    fn parse_io_statement(&mut self, optional: bool) -> Result<bool, Error> {
        if self.accept(SREADLN) {
            if self.accept(SLPAREN) {
                self.parse_read_variables()?;
                self.expect(SRPAREN)?;
            } else {
                self.code.inst(CALL, &["RDLN"]);
                self.code.flush();
            }
        } else if self.accept(SWRITELN) {
            if self.accept(SLPAREN) {
                self.parse_expression_list(true)?;
                self.expect(SRPAREN)?;
            }

            self.code.inst(CALL, &["WRTLN"]);
            self.code.flush();
        } else {
            if optional {
                return Ok(false);
            }
            return self.syntax_error();
        }
        Ok(true)
    }

    fn parse_read_variables(&mut self) -> Result<(), Error> {
        loop {
            self.parse_variable(false)?;

            self.code.inst(POP, &["GR2"]);
            match self.check.peek_type() {
                Ty::Integer => self.code.inst(CALL, &["RDINT"]),
                Ty::Char => self.code.inst(CALL, &["RDCH"]),
                Ty::ArrayChar => {
                    self.code.inst(LD, &["GR1", "GR0"]);
                    self.code.inst(CALL, &["RDSTR"]);
                }
                _ => return self.semantic_error(),
            }
            self.code.flush();

            self.check.pop_type();

            if !self.accept(SCOMMA) {
                break;
            }
        }
        Ok(())
    }

    fn parse_constant(&mut self, optional: bool) -> Result<bool, Error> {
        match self.kind() {
            Some(SCONSTANT) => {
                self.check.push_type(Ty::Integer);
                let lexeme = self.lexeme().to_string();
                if !self.check.set_constant(&lexeme) {
                    return self.semantic_error();
                }

                self.code.inst(PUSH, &[&lexeme]);
                self.code.flush();

                self.advance();
            }
            Some(SSTRING) => {
                let lexeme = self.lexeme().to_string();
                if let (3, Some(c)) = (lexeme.chars().count(), lexeme.chars().nth(1)) {
                    // one interior character: a Char constant
                    self.check.push_type(Ty::Char);

                    let code = (c as u32).to_string();
                    self.code.inst(PUSH, &[&code]);
                    self.code.flush();
                } else {
                    self.check.push_type(Ty::ArrayChar);

                    let n = self.check.tab.intern_string(&lexeme);
                    let label = format!("STR{n}");
                    let len = format!("={}", lexeme.chars().count() - 2);
                    self.code.inst(PUSH, &[&label]);
                    self.code.inst(LD, &["GR0", &len]);
                    self.code.flush();
                }
                self.advance();
            }
            Some(SFALSE) => {
                self.check.push_type(Ty::Boolean);

                self.code.inst(PUSH, &["#0000"]);
                self.code.flush();

                self.advance();
            }
            Some(STRUE) => {
                self.check.push_type(Ty::Boolean);

                self.code.inst(PUSH, &["#0001"]);
                self.code.flush();

                self.advance();
            }
            _ => {
                if optional {
                    return Ok(false);
                }
                return self.syntax_error();
            }
        }
        Ok(true)
    }
}
