use std::cmp::min;
use std::fmt::{Debug, Display, Write};
use std::ops::Deref;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::object::{Key, Type};

/// Marks a position in a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    offset: usize,
    line: u32,
    column: u32,
}

impl Position {
    /// Construct a new position from offset, line and column (all 0-indexed).
    pub fn new(offset: usize, line: u32, column: u32) -> Position {
        Position {
            offset,
            line,
            column,
        }
    }

    /// Return the zero-indexed offset into the buffer, counted in characters.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Return the zero-indexed line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Return the zero-indexed column number.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Return a new span starting at this position with a certain length.
    pub fn with_length(&self, length: usize) -> Span {
        Span {
            start: *self,
            length,
        }
    }
}

/// Mark an interval of text in a buffer starting at a `Position` with a length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    start: Position,
    length: usize,
}

impl Span {
    /// The offset of the start of the span into the buffer.
    pub fn offset(&self) -> usize {
        self.start.offset
    }

    /// The zero-indexed line number of the start of the span.
    pub fn line(&self) -> u32 {
        self.start.line
    }

    /// The zero-indexed column number of the start of the span.
    pub fn column(&self) -> u32 {
        self.start.column
    }

    /// The length of the span.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl<T> From<&Tagged<T>> for Span {
    fn from(value: &Tagged<T>) -> Self {
        value.span()
    }
}

/// A wrapper for marking any object with a text span pointing to its origin in
/// a source file.
///
/// Top-level statements are tagged, so that evaluation errors can point back
/// at the line they came from.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged<T> {
    span: Span,
    contents: T,
}

impl<T> Tagged<T> {
    /// Construct a new Tagged wrapper.
    pub fn new(location: Span, contents: T) -> Tagged<T> {
        Tagged::<T> {
            span: location,
            contents,
        }
    }

    /// Return the text span.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Destroy the wrapper and return its contents.
    pub fn unwrap(self) -> T {
        self.contents
    }
}

impl<T: Debug> Debug for Tagged<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.contents.fmt(f)?;
        let span = self.span;
        f.write_fmt(format_args!(
            ".tag({}:{}, {}..{})",
            span.line() + 1,
            span.column() + 1,
            span.offset(),
            span.offset() + span.length()
        ))
    }
}

impl<T> Deref for Tagged<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.contents
    }
}

/// Failure value of every parser.
///
/// A failed parse is not an error by itself: ordered choice uses it to move on
/// to the next alternative. Only the top-level driver decides whether it is
/// reported or the line is dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntaxError {
    position: Position,
    reason: Option<Syntax>,
}

impl SyntaxError {
    /// Create a new syntax error.
    pub fn new(position: Position, reason: Option<Syntax>) -> SyntaxError {
        SyntaxError { position, reason }
    }

    /// The position at which the parser gave up.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The reason the parser gave up, if known.
    pub fn reason(&self) -> Option<Syntax> {
        self.reason
    }

    /// Convert to the general error type.
    pub fn to_error(self) -> Error {
        let SyntaxError { position, reason } = self;
        Error {
            locations: Some(vec![(position.with_length(1), Action::Parse)]),
            reason: reason.map(Reason::Syntax),
            rendered: None,
        }
    }
}

/// A complete enumeration of all grammatical elements in the language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntaxElement {
    /// End of input stream
    EndOfInput,

    /// An expression
    Expression,

    /// An identifier (variable or function name)
    Identifier,

    /// An integer literal
    Integer,

    /// A double-quoted string literal
    String,

    /// A fixed piece of text, such as '(' or ' = '
    Literal(&'static str),
}

/// Enumerates all the possible reasons for a syntax error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Syntax {
    /// Input ended too soon
    UnexpectedEof,

    /// Expected a grammatical element but found another
    ExpectedOne(SyntaxElement),

    /// Expected one of two grammatical elements but found another
    ExpectedTwo(SyntaxElement, SyntaxElement),

    /// Function calls nested beyond the parser's limit
    TooDeep,
}

impl From<SyntaxElement> for Syntax {
    fn from(value: SyntaxElement) -> Self {
        Self::ExpectedOne(value)
    }
}

impl From<(SyntaxElement, SyntaxElement)> for Syntax {
    fn from((x, y): (SyntaxElement, SyntaxElement)) -> Self {
        Self::ExpectedTwo(x, y)
    }
}

/// Enumerates different internal errors that should never happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Internal {
    /// An AST node that the evaluator has no rule for.
    UnsupportedNode,
}

impl Internal {
    fn error_code(&self) -> usize {
        match self {
            Self::UnsupportedNode => 1,
        }
    }
}

/// Operators implemented by the numeric built-in functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Enumerates different type mismatch reasons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeMismatch {
    /// Wrong number of arguments to a function.
    ArgCount {
        /// Lower bound on number of arguments.
        low: usize,

        /// Upper bound on number of arguments.
        high: usize,

        /// Number of arguments received.
        received: usize,
    },

    /// Unsupported operand types for a numeric operation.
    BinOp(Type, Type, BinOp),
}

/// Enumerates different value-based error reasons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Divisor was zero.
    DivideByZero,

    /// Integer too large for the requested format (e.g. JSON).
    TooLarge,

    /// Value can't be represented in the requested format (e.g. NaN in JSON).
    OutOfRange,
}

/// Enumerates different file system error reasons.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSystem {
    /// Unable to read from file.
    Read(PathBuf),

    /// Unable to write to file.
    Write(PathBuf),

    /// File contents are not a compiled program.
    Decode(PathBuf),
}

/// Grand enumeration of all possible error reasons.
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    /// Syntax error.
    Syntax(Syntax),

    /// A variable was read before anything was assigned to it.
    Unbound(Key),

    /// A call to a function which is not a built-in.
    UnknownFunction(Key),

    /// Internal error - should never happen.
    Internal(Internal),

    /// Type mismatch errors.
    TypeMismatch(TypeMismatch),

    /// Value-based errors (type was correct).
    Value(Value),

    /// File system errors.
    FileSystem(FileSystem),
}

impl From<Syntax> for Reason {
    fn from(value: Syntax) -> Self {
        Self::Syntax(value)
    }
}

impl From<Internal> for Reason {
    fn from(value: Internal) -> Self {
        Self::Internal(value)
    }
}

impl From<TypeMismatch> for Reason {
    fn from(value: TypeMismatch) -> Self {
        Self::TypeMismatch(value)
    }
}

impl From<Value> for Reason {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<FileSystem> for Reason {
    fn from(value: FileSystem) -> Self {
        Self::FileSystem(value)
    }
}

/// Enumerates all different 'actions' - things that might go wrong.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Parsing phase.
    Parse,

    /// Evaluating a statement.
    Evaluate,
}

/// The fatal error type. Anything which is not a silently dropped parse
/// failure ends up here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Error {
    /// Stack of locations where the error happened.
    locations: Option<Vec<(Span, Action)>>,

    /// Reason for the error.
    reason: Option<Reason>,

    /// Human friendly string representation.
    rendered: Option<String>,
}

impl Error {
    /// Construct a new error with an empty stack.
    pub(crate) fn new<T>(reason: T) -> Self
    where
        Reason: From<T>,
    {
        Self {
            locations: None,
            reason: Some(Reason::from(reason)),
            rendered: None,
        }
    }

    /// Append a location to the stack. Takes ownership and returns the same
    /// object, for ease of use with `Result::map_err`.
    pub(crate) fn tag<T>(mut self, loc: T, action: Action) -> Self
    where
        Span: From<T>,
    {
        match &mut self.locations {
            None => {
                self.locations = Some(vec![(Span::from(loc), action)]);
            }
            Some(vec) => {
                vec.push((Span::from(loc), action));
            }
        }
        self
    }

    /// Get the reason
    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    /// Get the stack of locations
    pub fn locations(&self) -> &[(Span, Action)] {
        self.locations.as_deref().unwrap_or(&[])
    }

    /// Get the human-friendly text
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    /// Remove the human-friendly string representation.
    pub fn unrender(mut self) -> Self {
        self.rendered = None;
        self
    }

    /// Add a human-friendly string representation.
    pub fn render(mut self, code: Option<&str>) -> Self {
        if self.rendered.is_none() {
            self.rendered = Some(format!("{}", ErrorRenderer(&self, code)));
        }
        self
    }
}

impl From<SyntaxError> for Error {
    fn from(value: SyntaxError) -> Self {
        value.to_error()
    }
}

impl Display for SyntaxElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfInput => f.write_str("end of input"),
            Self::Expression => f.write_str("expression"),
            Self::Identifier => f.write_str("identifier"),
            Self::Integer => f.write_str("integer"),
            Self::String => f.write_str("string"),
            Self::Literal(text) => f.write_fmt(format_args!("'{}'", text)),
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => f.write_str("+"),
            Self::Subtract => f.write_str("-"),
            Self::Multiply => f.write_str("*"),
            Self::Divide => f.write_str("/"),
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(Syntax::UnexpectedEof) => f.write_str("unexpected end of input"),
            Self::Syntax(Syntax::ExpectedOne(x)) => f.write_fmt(format_args!("expected {}", x)),
            Self::Syntax(Syntax::ExpectedTwo(x, y)) => {
                f.write_fmt(format_args!("expected {} or {}", x, y))
            }
            Self::Syntax(Syntax::TooDeep) => f.write_str("function calls nested too deeply"),

            Self::Unbound(key) => f.write_fmt(format_args!("unbound name '{}'", key)),

            Self::UnknownFunction(key) => f.write_fmt(format_args!("unknown function '{}'", key)),

            Self::Internal(reason) => f.write_fmt(format_args!(
                "internal error {:03} - this should not happen, please file a bug report",
                reason.error_code()
            )),

            Self::TypeMismatch(TypeMismatch::ArgCount {
                low,
                high,
                received,
            }) => {
                if low == high && *high == 1 {
                    f.write_fmt(format_args!("expected 1 argument, got {}", received))
                } else if low == high {
                    f.write_fmt(format_args!("expected {} arguments, got {}", low, received))
                } else {
                    f.write_fmt(format_args!(
                        "expected {} to {} arguments, got {}",
                        low, high, received
                    ))
                }
            }
            Self::TypeMismatch(TypeMismatch::BinOp(l, r, op)) => f.write_fmt(format_args!(
                "unsuitable types for '{}': {} and {}",
                op, l, r
            )),

            Self::Value(Value::DivideByZero) => f.write_str("division by zero"),
            Self::Value(Value::TooLarge) => f.write_str("value too large"),
            Self::Value(Value::OutOfRange) => f.write_str("value out of range"),

            Self::FileSystem(FileSystem::Read(p)) => {
                f.write_fmt(format_args!("couldn't read file: {}", p.display()))
            }
            Self::FileSystem(FileSystem::Write(p)) => {
                f.write_fmt(format_args!("couldn't write file: {}", p.display()))
            }
            Self::FileSystem(FileSystem::Decode(p)) => {
                f.write_fmt(format_args!("not a compiled program: {}", p.display()))
            }
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evaluate => f.write_str("evaluating"),
            Self::Parse => f.write_str("parsing"),
        }
    }
}

/// Utility struct for facilitating error rendering.
///
/// Has access to both the error and the code, so that it can just implement the
/// Display trait.
struct ErrorRenderer<'a>(&'a Error, Option<&'a str>);

impl<'a> Display for ErrorRenderer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ErrorRenderer(err, code) = self;

        match err.reason.as_ref() {
            Some(reason) => f.write_fmt(format_args!("Error: {}", reason))?,
            None => f.write_str("Error: unknown reason")?,
        }

        for (loc, act) in err.locations() {
            let line = code.and_then(|code| code.split('\n').nth(loc.line() as usize));
            if let Some(line) = line {
                let line = line.strip_suffix('\r').unwrap_or(line);
                let width = line.chars().count();
                let column = min(loc.column() as usize, width);
                let carets = min(loc.length(), width - column).max(1);

                f.write_char('\n')?;
                f.write_str(line)?;
                f.write_char('\n')?;
                for _ in 0..column {
                    f.write_char(' ')?;
                }
                for _ in 0..carets {
                    f.write_char('^')?;
                }
            }
            f.write_fmt(format_args!(
                "\nwhile {} at {}:{}",
                act,
                loc.line() + 1,
                loc.column() + 1
            ))?;
        }

        Ok(())
    }
}
