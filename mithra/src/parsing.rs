use num_bigint::BigInt;

use crate::ast::{Expr, Program};
use crate::cursor::Cursor;
use crate::error::{Span, Syntax, SyntaxElement, SyntaxError, Tagged};
use crate::object::{IntVariant, Key};


pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// A grammar rule that can take part in ordered choice.
pub(crate) type Rule<T> = fn(&mut Cursor) -> PResult<T>;

/// Anything that consumes characters from a cursor and produces a value, or
/// fails.
pub(crate) trait Parser<T> {
    fn parse(&mut self, cursor: &mut Cursor) -> PResult<T>;
}

impl<T, F> Parser<T> for F where F: FnMut(&mut Cursor) -> PResult<T> {
    fn parse(&mut self, cursor: &mut Cursor) -> PResult<T> {
        self(cursor)
    }
}


// Combinator core
// ------------------------------------------------------------------------------------------------

/// Reset the cursor to where it was before the parser ran, if it fails.
///
/// Every exported parser goes through this, so that a failed alternative in
/// an ordered choice never leaves partial consumption behind for the next.
pub(crate) fn atomic<T>(mut parser: impl Parser<T>) -> impl Parser<T> {
    move |cursor: &mut Cursor| -> PResult<T> {
        let before = cursor.pointer();
        parser.parse(cursor).map_err(|err| {
            cursor.reset(before);
            err
        })
    }
}

/// Give back one character after the parser succeeds.
///
/// For token parsers that read the first character after the token to know
/// where it ends. Should be wrapped in [`atomic`], not the other way around.
pub(crate) fn step_back<T>(mut parser: impl Parser<T>) -> impl Parser<T> {
    move |cursor: &mut Cursor| -> PResult<T> {
        let retval = parser.parse(cursor)?;
        cursor.step_back();
        Ok(retval)
    }
}

/// Ordered choice: return the result of the first rule that succeeds.
///
/// If all rules fail, the error that got furthest into the input wins. When
/// none of them got past the starting point, the failure is reported as the
/// given element instead.
pub(crate) fn alt<T, const N: usize>(
    rules: [Rule<T>; N],
    element: SyntaxElement,
) -> impl Parser<T> {
    atomic(move |cursor: &mut Cursor| -> PResult<T> {
        let start = cursor.position();
        let mut furthest: Option<SyntaxError> = None;

        for rule in rules.iter() {
            match rule(cursor) {
                Ok(retval) => return Ok(retval),
                Err(err) => {
                    furthest = match furthest {
                        Some(prev) if prev.position().offset() >= err.position().offset() => Some(prev),
                        _ => Some(err),
                    };
                }
            }
        }

        match furthest {
            Some(err) if err.position().offset() > start.offset() => Err(err),
            _ => Err(cursor.error(element)),
        }
    })
}

/// Create a parser that matches a fixed piece of text exactly.
pub(crate) fn literal(text: &'static str) -> impl Parser<&'static str> {
    atomic(move |cursor: &mut Cursor| -> PResult<&'static str> {
        for expected in text.chars() {
            let position = cursor.position();
            match cursor.next() {
                Some(c) if c == expected => {}
                Some(_) => return Err(SyntaxError::new(
                    position,
                    Some(Syntax::from(SyntaxElement::Literal(text))),
                )),
                None => return Err(SyntaxError::new(position, Some(Syntax::UnexpectedEof))),
            }
        }
        Ok(text)
    })
}

/// One or more items separated by separators.
///
/// Once the first item has matched this never fails. A separator that is not
/// followed by an item stays consumed: the caller sees the items so far and
/// the cursor after the dangling separator.
pub(crate) fn sep_by<T, S>(
    mut item: impl Parser<T>,
    mut separator: impl Parser<S>,
) -> impl Parser<Vec<T>> {
    atomic(move |cursor: &mut Cursor| -> PResult<Vec<T>> {
        let mut items = vec![item.parse(cursor)?];
        while separator.parse(cursor).is_ok() {
            match item.parse(cursor) {
                Ok(it) => items.push(it),
                Err(_) => break,
            }
        }
        Ok(items)
    })
}


// Primitive parsers
// ------------------------------------------------------------------------------------------------

/// Consume characters while the predicate holds, including the first one that
/// doesn't. Fails if nothing matched.
fn take_while1(
    cursor: &mut Cursor,
    predicate: impl Fn(char) -> bool,
    element: SyntaxElement,
) -> PResult<String> {
    let start = cursor.position();
    let mut retval = String::new();
    while let Some(c) = cursor.next() {
        if !predicate(c) {
            break;
        }
        retval.push(c);
    }
    if retval.is_empty() {
        Err(SyntaxError::new(start, Some(Syntax::from(element))))
    } else {
        Ok(retval)
    }
}

fn digits(cursor: &mut Cursor) -> PResult<IntVariant> {
    let start = cursor.position();
    let text = take_while1(cursor, |c| c.is_ascii_digit(), SyntaxElement::Integer)?;
    text.parse::<i64>()
        .map(IntVariant::Small)
        .or_else(|_| text.parse::<BigInt>().map(IntVariant::from))
        .map_err(|_| SyntaxError::new(start, Some(Syntax::from(SyntaxElement::Integer))))
}

fn quoted(cursor: &mut Cursor) -> PResult<String> {
    let start = cursor.position();
    if cursor.next() != Some('"') {
        return Err(SyntaxError::new(start, Some(Syntax::from(SyntaxElement::String))));
    }
    let mut retval = String::new();
    while let Some(c) = cursor.next() {
        if c == '"' {
            break;
        }
        retval.push(c);
    }
    Ok(retval)
}

fn letters(cursor: &mut Cursor) -> PResult<Key> {
    let text = take_while1(cursor, char::is_alphabetic, SyntaxElement::Identifier)?;
    Ok(Key::new(text))
}

/// Parse a sequence of ASCII digits as a non-negative integer of any size.
pub(crate) fn integer(cursor: &mut Cursor) -> PResult<IntVariant> {
    atomic(step_back(digits)).parse(cursor)
}

/// Parse a double-quoted string, returning what is between the quotes
/// verbatim. There are no escape sequences. A missing closing quote is
/// accepted and the string runs to the end of input.
pub(crate) fn string(cursor: &mut Cursor) -> PResult<String> {
    atomic(quoted).parse(cursor)
}

/// Parse a sequence of alphabetic characters.
pub(crate) fn word(cursor: &mut Cursor) -> PResult<Key> {
    atomic(step_back(letters)).parse(cursor)
}


// Grammar
// ------------------------------------------------------------------------------------------------

fn integer_literal(cursor: &mut Cursor) -> PResult<Expr> {
    integer(cursor).map(Expr::integer)
}

fn string_literal(cursor: &mut Cursor) -> PResult<Expr> {
    string(cursor).map(Expr::string)
}

/// Parse a bare identifier as a variable reference.
pub(crate) fn variable(cursor: &mut Cursor) -> PResult<Expr> {
    word(cursor).map(Expr::Variable)
}

/// Parse 'name(expr, expr, ...)'. At least one argument is required.
pub(crate) fn function_call(cursor: &mut Cursor) -> PResult<Expr> {
    atomic(|cursor: &mut Cursor| -> PResult<Expr> {
        let name = word(cursor)?;
        literal("(").parse(cursor)?;

        cursor.descend()?;
        let args = sep_by(expression, literal(", ")).parse(cursor);
        cursor.ascend();
        let args = args?;

        literal(")").parse(cursor).map_err(|err| match err.reason() {
            Some(Syntax::ExpectedOne(_)) => cursor.error((
                SyntaxElement::Literal(", "),
                SyntaxElement::Literal(")"),
            )),
            _ => err,
        })?;

        Ok(Expr::FunctionCall { name, args })
    }).parse(cursor)
}

/// Parse any expression.
///
/// Function calls must be tried before variables, since every function name
/// is also a valid variable name.
pub(crate) fn expression(cursor: &mut Cursor) -> PResult<Expr> {
    alt(
        [integer_literal, string_literal, function_call, variable],
        SyntaxElement::Expression,
    ).parse(cursor)
}

/// Parse 'name = expr'.
pub(crate) fn assignment(cursor: &mut Cursor) -> PResult<Expr> {
    atomic(|cursor: &mut Cursor| -> PResult<Expr> {
        let name = word(cursor)?;
        literal(" = ").parse(cursor)?;
        let expr = expression(cursor)?;
        Ok(Expr::Assignment { name, expr: Box::new(expr) })
    }).parse(cursor)
}

/// Parse an assignment and tag it with the text it was parsed from.
///
/// A statement in which function calls were nested too deeply is rejected as
/// a whole, even if some alternative reading of it matched.
fn statement(cursor: &mut Cursor) -> PResult<Tagged<Expr>> {
    let start = cursor.position();
    let expr = assignment(cursor);
    if let Some(err) = cursor.overflow() {
        return Err(err);
    }
    let expr = expr?;
    let span: Span = start.with_length(cursor.position().offset() - start.offset());
    Ok(Tagged::new(span, expr))
}

/// Split a program into lines, along with their line numbers and character
/// offsets.
fn lines(code: &str) -> impl Iterator<Item = (&str, u32, usize)> {
    code.split('\n')
        .scan(0usize, |offset, line| {
            let start = *offset;
            *offset += line.chars().count() + 1;
            Some((line.strip_suffix('\r').unwrap_or(line), start))
        })
        .enumerate()
        .map(|(index, (line, offset))| (line, index as u32, offset))
}


/// Parse a single line as an assignment.
///
/// Text after the assignment is ignored.
pub fn parse_line(line: &str) -> Result<Tagged<Expr>, SyntaxError> {
    statement(&mut Cursor::new(line))
}

/// Parse a program, one assignment per line.
///
/// Lines that don't parse, including blank lines, are silently dropped.
pub fn parse_program(code: &str) -> Program {
    Program::new(
        lines(code)
            .filter_map(|(line, index, offset)| {
                statement(&mut Cursor::on_line(line, index, offset)).ok()
            })
            .collect()
    )
}

/// Parse a program, one assignment per line, rejecting anything that isn't.
///
/// Blank lines are skipped. Any other line must consist of exactly one
/// assignment, otherwise the first offending line is reported.
pub fn parse_program_strict(code: &str) -> Result<Program, SyntaxError> {
    let mut statements = Vec::new();
    for (line, index, offset) in lines(code) {
        if line.trim().is_empty() {
            continue;
        }
        let mut cursor = Cursor::on_line(line, index, offset);
        statements.push(statement(&mut cursor)?);
        if !cursor.at_end() {
            return Err(cursor.error(SyntaxElement::EndOfInput));
        }
    }
    Ok(Program::new(statements))
}
