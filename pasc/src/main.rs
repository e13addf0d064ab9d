use clap::Parser;
use color_print::cformat;
use pasc::lexer::Lexer;
use pasc::{compiler, optimizer, ts};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[clap(author, version, about = "Pascal-subset compiler targeting CASL II")]
struct Args {
    /// Input source file
    input: PathBuf,

    /// Output assembly file
    #[clap(short = 'o', long = "output", default_value = "out.cas")]
    output: PathBuf,

    /// Also write the token stream artifact to this path
    #[clap(long)]
    tokens: Option<PathBuf>,

    /// Skip the peephole optimizer
    #[clap(long)]
    no_opt: bool,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{}", cformat!("<red,bold>{}</>", e));
        std::process::exit(1);
    }
    println!("OK");
}

fn run(args: &Args) -> Result<(), pasc::Error> {
    // Assembly input goes straight through the optimizer
    if args.input.extension().is_some_and(|e| e == "cas") {
        return optimizer::optimize_file(&args.input, &args.output);
    }

    // 1. Read the source
    let source = fs::read_to_string(&args.input)?;

    // 2. Tokenize
    let tokens = Lexer::new(&source).tokenize()?;
    if args.verbose {
        println!("1. Tokenize: {} tokens", tokens.len());
        for token in &tokens {
            println!("  {}\t{:?}\t{}", token.line, token.kind, token.lexeme);
        }
    }
    if let Some(path) = &args.tokens {
        fs::write(path, ts::write(&tokens))?;
    }

    // 3. Compile
    let lines = compiler::compile(tokens)?;
    if args.verbose {
        println!("2. Compile: {} lines", lines.len());
        for line in &lines {
            println!("  {line}");
        }
    }

    // 4. Optimize
    let lines = if args.no_opt {
        lines
    } else {
        let lines = optimizer::optimize(lines);
        if args.verbose {
            println!("3. Optimize: {} lines", lines.len());
        }
        lines
    };

    // 5. Write the assembly artifact
    let mut out = String::new();
    for line in &lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    fs::write(&args.output, out)?;
    Ok(())
}
