use pasc::{compiler, optimizer, Lexer};

fn compile_optimized(source: &str) -> Vec<String> {
    let tokens = Lexer::new(source).tokenize().unwrap();
    let lines = optimizer::optimize(compiler::compile(tokens).unwrap());
    lines.iter().map(|l| l.to_string()).collect()
}

#[test]
fn constant_store_collapses_to_two_loads() {
    let lines = compile_optimized(
        "program sample(input, output);\n\
         var x : integer;\n\
         begin\n\
           x := 1\n\
         end.",
    );
    for line in &lines {
        println!("{line}");
    }
    assert_eq!(
        lines,
        vec![
            "MAIN\tSTART\tBEGIN",
            "BEGIN\tLAD\tGR6, 0",
            "\tLAD\tGR7, LIBBUF",
            "\tLAD\tGR1, VAR1",
            "\tLAD\tGR2, 1",
            "\tST\tGR2, 0, GR1",
            "\tRET",
            "LIBBUF\tDS\t256",
            "VAR1\tDS\t1",
            "\tEND",
        ]
    );
}

#[test]
fn optimizer_reaches_a_fixed_point() {
    let source = "program sample(input, output);\n\
                  var i : integer;\n\
                  begin\n\
                    i := 0;\n\
                    while i < 3 do\n\
                      i := i + 1;\n\
                    writeln(i)\n\
                  end.";
    let tokens = Lexer::new(source).tokenize().unwrap();
    let once = optimizer::optimize(compiler::compile(tokens).unwrap());
    let twice = optimizer::optimize(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn jump_targets_survive_optimization() {
    let lines = compile_optimized(
        "program sample(input, output);\n\
         var i : integer;\n\
         begin\n\
           i := 0;\n\
           while i < 3 do\n\
             i := i + 1\n\
         end.",
    );
    for line in &lines {
        println!("{line}");
    }
    // every jump target still labels some line
    for line in &lines {
        for target in ["L1", "L2", "L3", "L4"] {
            if line.contains(&format!("\tJNZ\t{target}"))
                || line.contains(&format!("\tJMI\t{target}"))
                || line.contains(&format!("\tJUMP\t{target}"))
            {
                assert!(
                    lines.iter().any(|l| l.starts_with(target)),
                    "dangling target {target}"
                );
            }
        }
    }
}

#[test]
fn call_frames_are_not_folded_across_the_call() {
    let lines = compile_optimized(
        "program sample(input, output);\n\
         var x : integer;\n\
         procedure p(a : integer);\n\
         begin\n\
           x := a\n\
         end;\n\
         begin\n\
           p(5)\n\
         end.",
    );
    for line in &lines {
        println!("{line}");
    }
    // GR4/GR5 must still be saved and restored around the CALL
    let call = lines.iter().position(|l| l == "\tCALL\tSUB1").unwrap();
    assert!(lines[..call].iter().any(|l| l == "\tPUSH\t0, GR4"));
    assert!(lines[..call].iter().any(|l| l == "\tPUSH\t0, GR5"));
    assert!(lines[call..].iter().any(|l| l == "\tPOP\tGR5"));
    assert!(lines[call..].iter().any(|l| l == "\tPOP\tGR4"));
}
