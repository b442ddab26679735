#[macro_use]
extern crate lazy_static;

mod ast;
mod builtins;
mod cursor;
mod error;
pub mod eval;
mod object;
mod parsing;

#[cfg(test)]
mod tests;

use std::fs::{read, read_to_string, write};
use std::path::Path;

pub use ast::{Expr, IdAble, Program, ToArgs, ToAst};
pub use cursor::{Cursor, MAX_NESTING};
pub use error::{
    Action, BinOp, Error, FileSystem, Internal, Position, Reason, Span, Syntax, SyntaxElement,
    SyntaxError, Tagged, TypeMismatch, Value,
};
pub use eval::{Environment, Interpreter};
pub use object::{IntVariant, Key, Object, Type};
pub use parsing::{parse_line, parse_program, parse_program_strict};


/// Parse and run a program, returning the interpreter with its final
/// environment. Lines that don't parse are skipped.
pub fn eval_raw(input: &str) -> Result<Interpreter, Error> {
    let program = parse_program(input);
    let mut interpreter = Interpreter::new();
    interpreter.run(&program).map_err(|err| err.render(Some(input)))?;
    Ok(interpreter)
}


/// Read, parse and run a program from a file.
pub fn eval_file(input: &Path) -> Result<Interpreter, Error> {
    let contents = read_source(input)?;
    eval_raw(&contents)
}


/// Read program source code from a file.
pub fn read_source(input: &Path) -> Result<String, Error> {
    read_to_string(input).map_err(|_| Error::new(FileSystem::Read(input.to_owned())).render(None))
}


/// Read a program previously written by [`write_program`].
pub fn read_program(input: &Path) -> Result<Program, Error> {
    let data = read(input).map_err(|_| Error::new(FileSystem::Read(input.to_owned())).render(None))?;
    Program::deserialize(&data)
        .ok_or_else(|| Error::new(FileSystem::Decode(input.to_owned())).render(None))
}


/// Write a parsed program to a file, so that it can be run without parsing.
pub fn write_program(program: &Program, output: &Path) -> Result<(), Error> {
    let data = program.serialize()
        .ok_or_else(|| Error::new(FileSystem::Write(output.to_owned())).render(None))?;
    write(output, data).map_err(|_| Error::new(FileSystem::Write(output.to_owned())).render(None))
}
