use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use json::{stringify_pretty, JsonValue};

use mithra::{
    parse_program, parse_program_strict, read_program, read_source, write_program,
    Error, Interpreter, Program,
};

#[derive(Parser)]
struct Cli {
    /// Program text to run
    #[arg(short = 'c', conflicts_with = "path")]
    code: Option<String>,

    /// Report lines that don't parse instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Print the parsed program instead of running it
    #[arg(long)]
    ast: bool,

    /// Treat PATH as a compiled program
    #[arg(long, requires = "path")]
    compiled: bool,

    /// Write the parsed program to OUT instead of running it
    #[arg(long, value_name = "OUT")]
    compile: Option<PathBuf>,

    path: Option<PathBuf>,
}

fn fail(error: Error) -> ! {
    match error.rendered() {
        Some(e) => eprintln!("{}", e),
        None => eprintln!("Error: {:?}", error),
    }
    exit(1);
}

fn parse(code: &str, strict: bool) -> Program {
    if strict {
        parse_program_strict(code).unwrap_or_else(|err| fail(Error::from(err).render(Some(code))))
    } else {
        parse_program(code)
    }
}

fn main() {
    let args = Cli::parse();

    let (program, code) = match (&args.path, &args.code) {
        (Some(path), _) if args.compiled => (read_program(path).unwrap_or_else(|e| fail(e)), None),
        (Some(path), _) => {
            let code = read_source(path).unwrap_or_else(|e| fail(e));
            (parse(&code, args.strict), Some(code))
        }
        (None, Some(code)) => (parse(code, args.strict), Some(code.clone())),
        (None, None) => {
            eprintln!("Error: no code or path to file given");
            exit(1);
        }
    };

    if let Some(out) = &args.compile {
        write_program(&program, out).unwrap_or_else(|e| fail(e));
        return;
    }

    if args.ast {
        match JsonValue::try_from(&program) {
            Ok(val) => println!("{}", stringify_pretty(val, 4)),
            Err(e) => fail(e.render(code.as_deref())),
        }
        return;
    }

    let mut interpreter = Interpreter::new();
    if let Err(e) = interpreter.run(&program) {
        fail(e.render(code.as_deref()));
    }

    match JsonValue::try_from(interpreter.memory()) {
        Ok(val) => println!("{}", stringify_pretty(val, 4)),
        Err(e) => fail(e.render(code.as_deref())),
    }
}
