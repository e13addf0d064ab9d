use pasc::{compiler, Error, Lexer};

fn compile(source: &str) -> Result<Vec<String>, Error> {
    let tokens = Lexer::new(source).tokenize()?;
    let lines = compiler::compile(tokens)?;
    Ok(lines.iter().map(|l| l.to_string()).collect())
}

fn case(source: &str, expects: &[&str]) {
    let lines = compile(source).unwrap();
    for line in &lines {
        println!("{line}");
    }
    assert_eq!(lines, expects);
}

fn contains(source: &str, needles: &[&str]) {
    let lines = compile(source).unwrap();
    for line in &lines {
        println!("{line}");
    }
    for needle in needles {
        assert!(
            lines.iter().any(|l| l == needle),
            "missing line: {needle:?}"
        );
    }
}

fn fails(source: &str) -> Error {
    compile(source).unwrap_err()
}

#[test]
fn minimal_program() {
    case(
        "program sample(input, output);\nbegin\n  writeln\nend.",
        &[
            "MAIN\tSTART\tBEGIN",
            "BEGIN\tLAD\tGR6, 0",
            "\tLAD\tGR7, LIBBUF",
            "\tCALL\tWRTLN",
            "\tRET",
            "LIBBUF\tDS\t256",
            "\tEND",
        ],
    );
}

#[test]
fn assignment_and_output() {
    case(
        "program sample(input, output);\n\
         var x : integer;\n\
         begin\n\
           x := 1 + 2;\n\
           writeln(x)\n\
         end.",
        &[
            "MAIN\tSTART\tBEGIN",
            "BEGIN\tLAD\tGR6, 0",
            "\tLAD\tGR7, LIBBUF",
            "\tLAD\tGR1, VAR1",
            "\tPUSH\t0, GR1",
            "\tPUSH\t1",
            "\tPUSH\t2",
            "\tPOP\tGR2",
            "\tPOP\tGR1",
            "\tADDA\tGR1, GR2",
            "\tPUSH\t0, GR1",
            "\tPOP\tGR2",
            "\tPOP\tGR1",
            "\tST\tGR2, 0, GR1",
            "\tLAD\tGR1, VAR1",
            "\tPUSH\t0, GR1",
            "\tPOP\tGR1",
            "\tLD\tGR1, 0, GR1",
            "\tPUSH\t0, GR1",
            "\tPOP\tGR2",
            "\tCALL\tWRTINT",
            "\tCALL\tWRTLN",
            "\tRET",
            "LIBBUF\tDS\t256",
            "VAR1\tDS\t1",
            "\tEND",
        ],
    );
}

#[test]
fn procedure_call_frames() {
    contains(
        "program sample(input, output);\n\
         var x : integer;\n\
         procedure p(a : integer);\n\
         begin\n\
           x := a\n\
         end;\n\
         begin\n\
           p(5);\n\
           writeln(x)\n\
         end.",
        &[
            // caller side
            "\tPUSH\t0, GR4",
            "\tPUSH\t0, GR5",
            "\tPUSH\t5",
            "\tCALL\tSUB1",
            "\tADDL\tGR8, =1",
            "\tPOP\tGR5",
            "\tPOP\tGR4",
            // callee side, appended after the main RET
            "SUB1\tNOP",
            "\tLAD\tGR4, 1, GR8",
            "\tLAD\tGR1, 0, GR4",
        ],
    );
}

#[test]
fn locals_get_a_stack_frame() {
    contains(
        "program sample(input, output);\n\
         procedure p;\n\
         var t : integer;\n\
         begin\n\
           t := 1\n\
         end;\n\
         begin\n\
           p\n\
         end.",
        &[
            "SUB1\tNOP",
            "\tSUBL\tGR8, =1",
            "\tLAD\tGR5, 0, GR8",
            "\tLAD\tGR1, 0, GR5",
            "\tADDL\tGR8, =1",
        ],
    );
}

#[test]
fn while_loop_shape() {
    contains(
        "program sample(input, output);\n\
         var i : integer;\n\
         begin\n\
           i := 0;\n\
           while i < 3 do\n\
             i := i + 1\n\
         end.",
        &[
            "L1\tNOP",
            "\tCPA\tGR1, GR2",
            "\tJMI\tL2",
            "L2\tLD\tGR3, =#0001",
            "L3\tPUSH\t0, GR3",
            "\tCPL\tGR3, =#0001",
            "\tJNZ\tL4",
            "\tJUMP\tL1",
            "L4\tNOP",
        ],
    );
}

#[test]
fn if_else_shape() {
    contains(
        "program sample(input, output);\n\
         begin\n\
           if true then\n\
           begin\n\
             writeln\n\
           end\n\
           else\n\
           begin\n\
             writeln\n\
           end\n\
         end.",
        &[
            "\tPUSH\t#0001",
            "\tPOP\tGR3",
            "\tCPL\tGR3, =#0001",
            "\tJNZ\tL1",
            "\tJUMP\tL2",
            "L1\tNOP",
            "L2\tNOP",
        ],
    );
}

#[test]
fn char_and_string_constants() {
    contains(
        "program sample(input, output);\n\
         begin\n\
           writeln('a', 'hello')\n\
         end.",
        &[
            "\tPUSH\t97",
            "\tCALL\tWRTCH",
            "\tPUSH\tSTR1",
            "\tLD\tGR0, =5",
            "\tCALL\tWRTSTR",
            "STR1\tDC\t'hello'",
        ],
    );
}

#[test]
fn indexed_array_access() {
    contains(
        "program sample(input, output);\n\
         var a : array [ 1 .. 10 ] of integer;\n\
         begin\n\
           a[2] := 7;\n\
           writeln(a[2])\n\
         end.",
        &[
            "\tSUBL\tGR1, =1",
            "\tPUSH\t2",
            "\tADDL\tGR1, GR2",
            "VAR1\tDS\t10",
        ],
    );
}

#[test]
fn single_cell_array_is_legal() {
    contains(
        "program sample(input, output);\n\
         var a : array [ 0 .. 0 ] of integer;\n\
         begin\n\
           a[0] := 1\n\
         end.",
        &["VAR1\tDS\t1"],
    );
}

#[test]
fn read_dispatches_on_type() {
    contains(
        "program sample(input, output);\n\
         var c : char;\n\
         begin\n\
           readln(c)\n\
         end.",
        &["\tCALL\tRDCH"],
    );
}

#[test]
fn division_and_modulo_pick_their_register() {
    contains(
        "program sample(input, output);\n\
         var x : integer;\n\
         begin\n\
           x := 7 div 2;\n\
           x := 7 mod 2\n\
         end.",
        &["\tCALL\tDIV", "\tPUSH\t0, GR2", "\tPUSH\t0, GR1"],
    );
}

#[test]
fn unary_minus_negates() {
    contains(
        "program sample(input, output);\n\
         var x : integer;\n\
         begin\n\
           x := -5\n\
         end.",
        &["\tLD\tGR1, =0", "\tSUBA\tGR1, GR2"],
    );
}

// ----------------------------------------------------------------------------
// Rejections

#[test]
fn missing_semicolon_is_a_syntax_error() {
    assert_eq!(
        fails("program sample(input, output)\nbegin\n  writeln\nend."),
        Error::Syntax { line: 2 }
    );
}

#[test]
fn syntax_error_message_names_the_line() {
    assert_eq!(
        fails("program sample(input, output)\nbegin\n  writeln\nend.").to_string(),
        "Syntax error: line 2"
    );
}

#[test]
fn duplicate_declaration_is_a_semantic_error() {
    assert_eq!(
        fails(
            "program sample(input, output);\n\
             var x : integer;\n\
                 x : char;\n\
             begin\n\
               writeln\n\
             end."
        ),
        Error::Semantic { line: 3 }
    );
}

#[test]
fn condition_must_be_boolean() {
    assert_eq!(
        fails(
            "program sample(input, output);\n\
             begin\n\
               if 1 then\n\
               begin\n\
                 writeln\n\
               end\n\
             end."
        ),
        Error::Semantic { line: 3 }
    );
}

#[test]
fn descending_array_bounds_are_rejected() {
    assert!(matches!(
        fails(
            "program sample(input, output);\n\
             var a : array [ 5 .. 3 ] of integer;\n\
             begin\n\
               writeln\n\
             end."
        ),
        Error::Semantic { line: 2 }
    ));
}

#[test]
fn constants_must_fit_sixteen_bits() {
    assert!(matches!(
        fails(
            "program sample(input, output);\n\
             var x : integer;\n\
             begin\n\
               x := 65536\n\
             end."
        ),
        Error::Semantic { .. }
    ));
}

#[test]
fn mixed_operand_types_are_rejected() {
    assert!(matches!(
        fails(
            "program sample(input, output);\n\
             var x : integer;\n\
             begin\n\
               x := 1 + true\n\
             end."
        ),
        Error::Semantic { .. }
    ));
}

#[test]
fn undeclared_identifier_is_a_semantic_error() {
    assert!(matches!(
        fails(
            "program sample(input, output);\n\
             begin\n\
               y := 1\n\
             end."
        ),
        Error::Semantic { .. }
    ));
}

#[test]
fn wrong_argument_count_is_a_semantic_error() {
    assert!(matches!(
        fails(
            "program sample(input, output);\n\
             procedure p(a : integer);\n\
             begin\n\
               writeln\n\
             end;\n\
             begin\n\
               p(1, 2)\n\
             end."
        ),
        Error::Semantic { .. }
    ));
}

#[test]
fn text_after_the_final_dot_is_extra_data() {
    assert_eq!(
        fails("program sample(input, output);\nbegin\n  writeln\nend.writeln"),
        Error::ExtraData
    );
    assert_eq!(Error::ExtraData.to_string(), "Invalid extra data");
}
