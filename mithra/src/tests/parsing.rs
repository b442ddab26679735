use crate::ast::{Expr, IdAble};
use crate::cursor::{Cursor, MAX_NESTING};
use crate::error::{Position, Syntax, SyntaxElement, SyntaxError, Tagged};
use num_bigint::BigInt;

use crate::object::{IntVariant, Key};
use crate::parsing::*;


const PROGRAM: &str = "x = 5
y = add(mul(x, 2), add(1, sub(3, 4)))
z = div(y, 5)
";


/// Run a parser on some input, returning the result and the final pointer.
fn run<T>(mut parser: impl Parser<T>, input: &str) -> (PResult<T>, usize) {
    let mut cursor = Cursor::new(input);
    let result = parser.parse(&mut cursor);
    (result, cursor.pointer())
}


/// Check that the parser leaves no trace when it fails, from every starting
/// point in the input.
fn assert_atomic<T>(mut parser: impl Parser<T>, input: &str) {
    for k in 0..=input.chars().count() {
        let mut cursor = Cursor::new(input);
        for _ in 0..k {
            cursor.next();
        }
        if parser.parse(&mut cursor).is_err() {
            assert_eq!(cursor.pointer(), k, "{:?} from {}", input, k);
        }
    }
}


fn int(x: i64) -> IntVariant {
    IntVariant::from(x)
}


fn syntax(column: u32, reason: Syntax) -> SyntaxError {
    SyntaxError::new(Position::new(column as usize, 0, column), Some(reason))
}


#[test]
fn integers() {
    assert_eq!(run(integer, "0"), (Ok(int(0)), 1));
    assert_eq!(run(integer, "1234"), (Ok(int(1234)), 4));
    assert_eq!(run(integer, "1234 "), (Ok(int(1234)), 4));
    assert_eq!(run(integer, "12ab"), (Ok(int(12)), 2));
    assert_eq!(run(integer, "9223372036854775807"), (Ok(IntVariant::Small(i64::MAX)), 19));

    assert_eq!(run(integer, ""), (Err(syntax(0, Syntax::from(SyntaxElement::Integer))), 0));
    assert_eq!(run(integer, "a1"), (Err(syntax(0, Syntax::from(SyntaxElement::Integer))), 0));
    assert_eq!(run(integer, "-1"), (Err(syntax(0, Syntax::from(SyntaxElement::Integer))), 0));
}


#[test]
fn big_integers() {
    let (result, pointer) = run(integer, "9223372036854775808");
    assert_eq!(pointer, 19);
    assert_eq!(result, Ok(IntVariant::from(BigInt::from(i64::MAX) + 1)));
    assert!(matches!(result, Ok(IntVariant::Big(_))));

    let (result, pointer) = run(integer, "99999999999999999999, 1");
    assert_eq!(pointer, 20);
    assert_eq!(result.map(|x| x.to_string()), Ok("99999999999999999999".to_string()));

    let program = parse_program("x = 99999999999999999999
y = add(x, 1)");
    assert_eq!(program.len(), 2);
    assert_eq!(
        program.iter().next().map(|stmt| stmt.clone().unwrap()),
        Some(Expr::assign("x", Expr::integer("99999999999999999999".parse::<BigInt>().unwrap()))),
    );
}


#[test]
fn strings() {
    assert_eq!(run(string, "\"\""), (Ok("".to_string()), 2));
    assert_eq!(run(string, "\"dingbob\""), (Ok("dingbob".to_string()), 9));
    assert_eq!(run(string, "\"ding bob\", 1"), (Ok("ding bob".to_string()), 10));
    assert_eq!(run(string, "\"1 = 2\""), (Ok("1 = 2".to_string()), 7));

    // No escapes: a backslash is just a character
    assert_eq!(run(string, "\"a\\\""), (Ok("a\\".to_string()), 4));

    // Unterminated strings run to the end
    assert_eq!(run(string, "\"abc"), (Ok("abc".to_string()), 5));

    assert_eq!(run(string, "dingbob"), (Err(syntax(0, Syntax::from(SyntaxElement::String))), 0));
    assert_eq!(run(string, ""), (Err(syntax(0, Syntax::from(SyntaxElement::String))), 0));
}


#[test]
fn words() {
    assert_eq!(run(word, "foo"), (Ok(Key::new("foo")), 3));
    assert_eq!(run(word, "foo(1)"), (Ok(Key::new("foo")), 3));
    assert_eq!(run(word, "foo = 1"), (Ok(Key::new("foo")), 3));
    assert_eq!(run(word, "ab1"), (Ok(Key::new("ab")), 2));
    assert_eq!(run(word, "æøå"), (Ok(Key::new("æøå")), 3));

    assert_eq!(run(word, "1ab"), (Err(syntax(0, Syntax::from(SyntaxElement::Identifier))), 0));
    assert_eq!(run(word, "_ab"), (Err(syntax(0, Syntax::from(SyntaxElement::Identifier))), 0));
    assert_eq!(run(word, ""), (Err(syntax(0, Syntax::from(SyntaxElement::Identifier))), 0));
}


#[test]
fn literals() {
    assert_eq!(run(literal(" = "), " = 5"), (Ok(" = "), 3));
    assert_eq!(run(literal("("), "("), (Ok("("), 1));

    assert_eq!(
        run(literal(" = "), " + 5"),
        (Err(syntax(1, Syntax::from(SyntaxElement::Literal(" = ")))), 0),
    );
    assert_eq!(run(literal(" = "), " ="), (Err(syntax(2, Syntax::UnexpectedEof)), 0));
    assert_eq!(run(literal(")"), ""), (Err(syntax(0, Syntax::UnexpectedEof)), 0));
}


#[test]
fn atomicity() {
    let inputs = [
        "x = add(1, 2)",
        "y = add(mul(x, 2), add(1, sub(3, 4)))",
        "add(1, ",
        "f()",
        "\"abc",
        "12 = x",
        "x = ",
        "",
    ];

    for input in inputs {
        assert_atomic(integer, input);
        assert_atomic(string, input);
        assert_atomic(word, input);
        assert_atomic(variable, input);
        assert_atomic(function_call, input);
        assert_atomic(expression, input);
        assert_atomic(assignment, input);
        assert_atomic(literal(", "), input);
        assert_atomic(literal(" = "), input);
        assert_atomic(sep_by(expression, literal(", ")), input);
    }
}


#[test]
fn step_back_wrapper() {
    let parser = step_back(|cursor: &mut Cursor| -> PResult<()> {
        cursor.next();
        cursor.next();
        Ok(())
    });
    assert_eq!(run(parser, "abc"), (Ok(()), 1));

    let parser = step_back(|cursor: &mut Cursor| -> PResult<()> {
        cursor.next();
        Err(cursor.error(SyntaxElement::Expression))
    });
    assert_eq!(run(parser, "abc").1, 1);
}


#[test]
fn atomic_wrapper() {
    let parser = atomic(|cursor: &mut Cursor| -> PResult<()> {
        cursor.next();
        cursor.next();
        Err(cursor.error(SyntaxElement::Expression))
    });
    assert_eq!(run(parser, "abc"), (Err(syntax(2, Syntax::from(SyntaxElement::Expression))), 0));

    let parser = atomic(|cursor: &mut Cursor| -> PResult<()> {
        cursor.next();
        Ok(())
    });
    assert_eq!(run(parser, "abc"), (Ok(()), 1));
}


#[test]
fn separated() {
    assert_eq!(run(sep_by(integer, literal(", ")), "1"), (Ok(vec![int(1)]), 1));
    assert_eq!(run(sep_by(integer, literal(", ")), "1, 2, 3)"), (Ok(vec![int(1), int(2), int(3)]), 7));
    assert_eq!(run(sep_by(integer, literal(", ")), "1,2"), (Ok(vec![int(1)]), 1));

    // A dangling separator stays consumed
    assert_eq!(run(sep_by(integer, literal(", ")), "1, 2, x"), (Ok(vec![int(1), int(2)]), 6));

    assert_eq!(
        run(sep_by(integer, literal(", ")), "x, 1"),
        (Err(syntax(0, Syntax::from(SyntaxElement::Integer))), 0),
    );
}


#[test]
fn variables() {
    assert_eq!(run(variable, "dingbob"), (Ok("dingbob".var()), 7));
    assert_eq!(run(expression, "dingbob"), (Ok("dingbob".var()), 7));
}


#[test]
fn function_calls() {
    assert_eq!(run(function_call, "f(1)"), (Ok(Expr::call("f", (1,))), 4));
    assert_eq!(
        run(function_call, "foo(1, \"a\", x)"),
        (Ok(Expr::call("foo", (1, "a", "x".var()))), 14),
    );

    // Zero arguments are not supported
    assert_eq!(run(function_call, "f()").1, 0);

    // The separator must be exactly ', '
    assert_eq!(run(function_call, "f(1,2)").1, 0);
    assert_eq!(run(function_call, "f( 1)").1, 0);
    assert_eq!(run(function_call, "f (1)").1, 0);

    // Unclosed call
    assert_eq!(run(function_call, "f(1, 2"), (Err(syntax(6, Syntax::UnexpectedEof)), 0));
    assert_eq!(
        run(function_call, "f(1 2)"),
        (Err(syntax(3, Syntax::ExpectedTwo(SyntaxElement::Literal(", "), SyntaxElement::Literal(")")))), 0),
    );

    // A dangling separator swallows the missing argument
    assert_eq!(run(function_call, "f(1, )"), (Ok(Expr::call("f", (1,))), 6));
}


#[test]
fn ordered_choice() {
    assert_eq!(run(expression, "foo(1, 2)"), (Ok(Expr::call("foo", (1, 2))), 9));
    assert_eq!(run(expression, "1"), (Ok(Expr::integer(1)), 1));
    assert_eq!(run(expression, "\"foo(1)\""), (Ok(Expr::string("foo(1)")), 8));

    // When the call fails, the name is still a variable
    assert_eq!(run(expression, "f()"), (Ok("f".var()), 1));
    assert_eq!(run(expression, "f (1)"), (Ok("f".var()), 1));

    assert_eq!(run(expression, ""), (Err(syntax(0, Syntax::from(SyntaxElement::Expression))), 0));
    assert_eq!(run(expression, "(1)"), (Err(syntax(0, Syntax::from(SyntaxElement::Expression))), 0));
}


#[test]
fn nesting() {
    let (result, pointer) = run(expression, "add(mul(x, 2), add(1, sub(3, 4)))");
    let expected = Expr::call("add", (
        Expr::call("mul", ("x".var(), 2)),
        Expr::call("add", (
            1,
            Expr::call("sub", (3, 4)),
        )),
    ));

    assert_eq!(pointer, 33);
    assert_eq!(result.as_ref().map(Expr::nesting), Ok(3));
    assert_eq!(result, Ok(expected));
}


#[test]
fn assignments() {
    assert_eq!(run(assignment, "x = 5"), (Ok(Expr::assign("x", 5)), 5));
    assert_eq!(run(assignment, "s = \"dingbob\""), (Ok(Expr::assign("s", "dingbob")), 13));
    assert_eq!(run(assignment, "x = y"), (Ok(Expr::assign("x", "y".var())), 5));

    // Trailing text is left alone
    assert_eq!(run(assignment, "x = 5 6"), (Ok(Expr::assign("x", 5)), 5));

    assert_eq!(run(assignment, "x=5").1, 0);
    assert_eq!(run(assignment, "x  = 5").1, 0);
    assert_eq!(run(assignment, "5 = x").1, 0);
    assert_eq!(
        run(assignment, "x = "),
        (Err(syntax(4, Syntax::from(SyntaxElement::Expression))), 0),
    );
}


#[test]
fn lines() {
    assert_eq!(
        parse_line("y = add(mul(x, 2), add(1, sub(3, 4)))").map(Tagged::unwrap),
        Ok(Expr::assign("y", Expr::call("add", (
            Expr::call("mul", ("x".var(), 2)),
            Expr::call("add", (1, Expr::call("sub", (3, 4)))),
        )))),
    );

    let stmt = parse_line("x = 5");
    assert_eq!(stmt.as_ref().map(Tagged::span), Ok(Position::new(0, 0, 0).with_length(5)));

    assert_eq!(
        parse_line("x = "),
        Err(syntax(4, Syntax::from(SyntaxElement::Expression))),
    );
}


#[test]
fn programs() {
    let program = parse_program(PROGRAM);
    let statements: Vec<Expr> = program.iter().map(|stmt| stmt.clone().unwrap()).collect();

    assert_eq!(statements, vec![
        Expr::assign("x", 5),
        Expr::assign("y", Expr::call("add", (
            Expr::call("mul", ("x".var(), 2)),
            Expr::call("add", (1, Expr::call("sub", (3, 4)))),
        ))),
        Expr::assign("z", Expr::call("div", ("y".var(), 5))),
    ]);

    let spans: Vec<_> = program.iter().map(Tagged::span).collect();
    assert_eq!(spans, vec![
        Position::new(0, 0, 0).with_length(5),
        Position::new(6, 1, 0).with_length(37),
        Position::new(44, 2, 0).with_length(13),
    ]);
}


#[test]
fn reparse() {
    assert_eq!(parse_program(PROGRAM), parse_program(PROGRAM));
    assert_eq!(parse_line("y = add(1, x)"), parse_line("y = add(1, x)"));
}


#[test]
fn dropped_lines() {
    let program = parse_program("x = 5\n\nthis is not valid\n= 2\r\ny = x\r\n");
    let statements: Vec<Expr> = program.iter().map(|stmt| stmt.clone().unwrap()).collect();
    assert_eq!(statements, vec![Expr::assign("x", 5), Expr::assign("y", "x".var())]);

    let lines: Vec<u32> = program.iter().map(|stmt| stmt.span().line()).collect();
    assert_eq!(lines, vec![0, 4]);

    assert!(parse_program("").is_empty());
}


#[test]
fn strict() {
    assert_eq!(parse_program_strict(PROGRAM), Ok(parse_program(PROGRAM)));

    assert_eq!(
        parse_program_strict("x = 5\ny = add(1, 2"),
        Err(SyntaxError::new(Position::new(13, 1, 7), Some(Syntax::from(SyntaxElement::EndOfInput)))),
    );

    assert_eq!(
        parse_program_strict("x = 5\ny = "),
        Err(SyntaxError::new(Position::new(10, 1, 4), Some(Syntax::from(SyntaxElement::Expression)))),
    );
}


#[test]
fn too_deep() {
    let nested = |depth: usize| {
        format!("x = {}1{}", "f(".repeat(depth), ")".repeat(depth))
    };

    let stmt = parse_line(&nested(MAX_NESTING));
    assert_eq!(stmt.map(|stmt| stmt.nesting()), Ok(MAX_NESTING));

    let stmt = parse_line(&nested(MAX_NESTING + 1));
    assert_eq!(stmt.map_err(|err| err.reason()), Err(Some(Syntax::TooDeep)));

    assert!(parse_program(&nested(MAX_NESTING + 50)).is_empty());
}
