use json::JsonValue;
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Tagged};
use crate::object::{IntVariant, Key, Object};

/// Version tag of the compiled program format. Bump whenever [`Expr`] changes
/// shape.
const SERIALIZE_VERSION: i32 = 1;

/// A node in the abstract syntax tree.
///
/// Nodes are immutable after construction. Evaluating an [`Expr::Assignment`]
/// binds a name in the interpreter's environment, but never changes the tree
/// itself, so the same tree can be evaluated any number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A self-evaluating primitive. The grammar produces integer and string
    /// literals; floats and booleans may be constructed directly.
    Literal(Object),

    /// A reference to a variable, resolved at evaluation time.
    Variable(Key),

    /// A call to a built-in function. Arguments are evaluated in order.
    FunctionCall {
        name: Key,
        args: Vec<Expr>,
    },

    /// A 'name = expr' statement.
    Assignment {
        name: Key,
        expr: Box<Expr>,
    },

    /// A user-defined function. The grammar never produces this node, and the
    /// evaluator rejects it.
    Function {
        name: Key,
        params: Vec<Key>,
        body: Vec<Expr>,
    },
}

impl Expr {
    pub fn integer<T>(value: T) -> Expr where IntVariant: From<T> { Expr::Literal(Object::int(value)) }
    pub fn float(value: f64) -> Expr { Expr::Literal(Object::float(value)) }
    pub fn boolean(value: bool) -> Expr { Expr::Literal(Object::bool(value)) }
    pub fn string(value: impl AsRef<str>) -> Expr { Expr::Literal(Object::str(value)) }

    pub fn var(name: impl AsRef<str>) -> Expr { Expr::Variable(Key::new(name)) }

    pub fn call<T>(name: impl AsRef<str>, args: T) -> Expr where T: ToArgs {
        Expr::FunctionCall {
            name: Key::new(name),
            args: args.to_args(),
        }
    }

    pub fn assign<T>(name: impl AsRef<str>, expr: T) -> Expr where T: ToAst {
        Expr::Assignment {
            name: Key::new(name),
            expr: Box::new(expr.to_ast()),
        }
    }

    /// Depth of nested function calls in this tree. Literals and variables
    /// have depth zero.
    pub fn nesting(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => 0,
            Expr::FunctionCall { args, .. } => {
                1 + args.iter().map(Expr::nesting).max().unwrap_or(0)
            }
            Expr::Assignment { expr, .. } => expr.nesting(),
            Expr::Function { body, .. } => body.iter().map(Expr::nesting).max().unwrap_or(0),
        }
    }
}

impl TryFrom<&Expr> for JsonValue {
    type Error = Error;

    fn try_from(value: &Expr) -> Result<Self, Self::Error> {
        let mut retval = JsonValue::new_object();
        match value {
            Expr::Literal(obj) => {
                retval["literal"] = JsonValue::try_from(obj)?;
            }
            Expr::Variable(name) => {
                retval["variable"] = JsonValue::from(name.as_str());
            }
            Expr::FunctionCall { name, args } => {
                retval["call"] = JsonValue::from(name.as_str());
                retval["args"] = JsonValue::Array(
                    args.iter().map(JsonValue::try_from).collect::<Result<_, _>>()?
                );
            }
            Expr::Assignment { name, expr } => {
                retval["assign"] = JsonValue::from(name.as_str());
                retval["expr"] = JsonValue::try_from(&**expr)?;
            }
            Expr::Function { name, params, body } => {
                retval["function"] = JsonValue::from(name.as_str());
                retval["params"] = JsonValue::Array(
                    params.iter().map(|param| JsonValue::from(param.as_str())).collect()
                );
                retval["body"] = JsonValue::Array(
                    body.iter().map(JsonValue::try_from).collect::<Result<_, _>>()?
                );
            }
        }
        Ok(retval)
    }
}


/// A parsed program: one tagged statement per source line that parsed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    statements: Vec<Tagged<Expr>>,
}

impl Program {
    pub fn new(statements: Vec<Tagged<Expr>>) -> Program {
        Program { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tagged<Expr>> {
        self.statements.iter()
    }

    /// Serialize this program to a byte vector, so that it can be run later
    /// without parsing.
    pub fn serialize(&self) -> Option<Vec<u8>> {
        encode::to_vec(&(SERIALIZE_VERSION, self)).ok()
    }

    /// Deserialize a program from a byte vector. Data written by an older
    /// format version is rejected.
    pub fn deserialize(data: &[u8]) -> Option<Program> {
        let (version, retval) = decode::from_slice::<(i32, Program)>(data).ok()?;
        if version < SERIALIZE_VERSION {
            None
        } else {
            Some(retval)
        }
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Tagged<Expr>;
    type IntoIter = std::slice::Iter<'a, Tagged<Expr>>;
    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl TryFrom<&Program> for JsonValue {
    type Error = Error;

    fn try_from(value: &Program) -> Result<Self, Self::Error> {
        Ok(JsonValue::Array(
            value.iter().map(|stmt| JsonValue::try_from(&**stmt)).collect::<Result<_, _>>()?
        ))
    }
}


// Builders
// ------------------------------------------------------------------------------------------------

/// Conversion of plain Rust values to AST nodes, for building trees by hand.
pub trait ToAst {
    fn to_ast(self) -> Expr;
}

impl ToAst for Expr {
    fn to_ast(self) -> Expr { self }
}

impl ToAst for i64 {
    fn to_ast(self) -> Expr { Expr::integer(self) }
}

impl ToAst for i32 {
    fn to_ast(self) -> Expr { Expr::integer(self as i64) }
}

impl ToAst for f64 {
    fn to_ast(self) -> Expr { Expr::float(self) }
}

impl ToAst for bool {
    fn to_ast(self) -> Expr { Expr::boolean(self) }
}

impl ToAst for &str {
    fn to_ast(self) -> Expr { Expr::string(self) }
}

/// Argument lists for [`Expr::call`]: tuples of anything convertible to AST
/// nodes, or a ready-made vector.
pub trait ToArgs {
    fn to_args(self) -> Vec<Expr>;
}

impl ToArgs for Vec<Expr> {
    fn to_args(self) -> Vec<Expr> { self }
}

impl<A> ToArgs for (A,) where A: ToAst {
    fn to_args(self) -> Vec<Expr> {
        vec![self.0.to_ast()]
    }
}

impl<A, B> ToArgs for (A, B) where A: ToAst, B: ToAst {
    fn to_args(self) -> Vec<Expr> {
        vec![self.0.to_ast(), self.1.to_ast()]
    }
}

impl<A, B, C> ToArgs for (A, B, C) where A: ToAst, B: ToAst, C: ToAst {
    fn to_args(self) -> Vec<Expr> {
        vec![self.0.to_ast(), self.1.to_ast(), self.2.to_ast()]
    }
}

/// Provides the `var` method for turning names into variable references.
pub trait IdAble {
    fn var(self) -> Expr;
}

impl<T> IdAble for T where T: AsRef<str> {
    fn var(self) -> Expr { Expr::var(self) }
}
