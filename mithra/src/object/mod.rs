use std::fmt::Display;
use std::rc::Rc;

use json::JsonValue;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use symbol_table::GlobalSymbol;

use crate::error::{BinOp, Error, TypeMismatch, Value};

mod integer;

pub use integer::IntVariant;

/// Interned name of a variable or a function.
pub type Key = GlobalSymbol;

/// Evaluated function arguments.
pub type List = Vec<Object>;

fn escape(s: &str) -> String {
    let mut r = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => {
                r.push_str("\\\"");
            }
            '\\' => {
                r.push_str("\\\\");
            }
            _ => {
                r.push(c);
            }
        }
    }
    r
}

/// Runtime type tag of an object, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Integer,
    Float,
    Boolean,
    String,
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("bool"),
            Self::String => f.write_str("str"),
        }
    }
}

/// A primitive value. Every expression evaluates to one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Object {
    Integer(IntVariant),
    Float(f64),
    Boolean(bool),
    String(Rc<str>),
}

/// Intermediate numeric view of an object, after promotion rules have been
/// applied to a pair of operands.
enum Numeric<'a> {
    Integers(&'a IntVariant, &'a IntVariant),
    Floats(f64, f64),
}

impl Object {
    pub fn int<T>(x: T) -> Object where IntVariant: From<T> {
        Object::Integer(IntVariant::from(x))
    }

    pub fn float(x: f64) -> Object {
        Object::Float(x)
    }

    pub fn bool(x: bool) -> Object {
        Object::Boolean(x)
    }

    pub fn str(x: impl AsRef<str>) -> Object {
        Object::String(Rc::from(x.as_ref()))
    }

    /// Return the type tag of this object.
    pub fn type_of(&self) -> Type {
        match self {
            Self::Integer(_) => Type::Integer,
            Self::Float(_) => Type::Float,
            Self::Boolean(_) => Type::Boolean,
            Self::String(_) => Type::String,
        }
    }

    /// Return the numeric value of this object as a float, if numeric.
    pub fn get_float(&self) -> Option<f64> {
        match self {
            Self::Integer(x) => Some(x.to_f64()),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Apply the promotion rules: two integers stay integers, anything mixed
    /// with a float becomes float. Non-numbers are rejected.
    fn promote<'a>(&'a self, other: &'a Self, op: BinOp) -> Result<Numeric<'a>, Error> {
        match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => Ok(Numeric::Integers(x, y)),
            _ => match (self.get_float(), other.get_float()) {
                (Some(x), Some(y)) => Ok(Numeric::Floats(x, y)),
                _ => Err(Error::new(TypeMismatch::BinOp(
                    self.type_of(),
                    other.type_of(),
                    op,
                ))),
            },
        }
    }

    fn arithmetic(
        &self,
        other: &Self,
        ixi: impl Fn(&IntVariant, &IntVariant) -> IntVariant,
        fxf: impl Fn(f64, f64) -> f64,
        op: BinOp,
    ) -> Result<Self, Error> {
        match self.promote(other, op)? {
            Numeric::Integers(x, y) => Ok(Object::Integer(ixi(x, y))),
            Numeric::Floats(x, y) => Ok(Object::Float(fxf(x, y))),
        }
    }

    // Mathematical operators
    // ------------------------------------------------------------------------------------------------

    /// Mathematical addition.
    pub fn add(&self, other: &Self) -> Result<Self, Error> {
        self.arithmetic(other, IntVariant::add, |x, y| x + y, BinOp::Add)
    }

    /// Mathematical subtraction.
    pub fn sub(&self, other: &Self) -> Result<Self, Error> {
        self.arithmetic(other, IntVariant::sub, |x, y| x - y, BinOp::Subtract)
    }

    /// Mathematical multiplication.
    pub fn mul(&self, other: &Self) -> Result<Self, Error> {
        self.arithmetic(other, IntVariant::mul, |x, y| x * y, BinOp::Multiply)
    }

    /// Mathematical true division. The result is always a float, also for two
    /// integer operands.
    pub fn div(&self, other: &Self) -> Result<Self, Error> {
        match self.promote(other, BinOp::Divide)? {
            Numeric::Integers(_, y) if y.is_zero() => Err(Error::new(Value::DivideByZero)),
            Numeric::Integers(x, y) => Ok(Object::Float(x.div(y))),
            Numeric::Floats(_, y) if y == 0.0 => Err(Error::new(Value::DivideByZero)),
            Numeric::Floats(x, y) => Ok(Object::Float(x / y)),
        }
    }
}

impl PartialEq<Object> for Object {
    fn eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => x == y,
            (Self::Integer(x), Self::Float(y)) => x.eq_float(*y),
            (Self::Float(x), Self::Integer(y)) => y.eq_float(*x),
            (Self::Float(x), Self::Float(y)) => x == y,
            (Self::Boolean(x), Self::Boolean(y)) => x == y,
            (Self::String(x), Self::String(y)) => x == y,
            _ => false,
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(x) => f.write_fmt(format_args!("{}", x)),
            Self::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    f.write_fmt(format_args!("{:.0}", x))
                } else {
                    f.write_fmt(format_args!("{}", x))
                }
            }
            Self::Boolean(true) => f.write_str("true"),
            Self::Boolean(false) => f.write_str("false"),
            Self::String(x) => f.write_fmt(format_args!("\"{}\"", escape(x))),
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::bool(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::int(value)
    }
}

impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Object::int(value as i64)
    }
}

impl From<BigInt> for Object {
    fn from(value: BigInt) -> Self {
        Object::int(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::float(value)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::str(value)
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::str(value)
    }
}

impl TryFrom<Object> for JsonValue {
    type Error = Error;

    fn try_from(value: Object) -> Result<Self, Self::Error> {
        JsonValue::try_from(&value)
    }
}

impl TryFrom<&Object> for JsonValue {
    type Error = Error;

    fn try_from(value: &Object) -> Result<Self, Self::Error> {
        match value {
            Object::Integer(IntVariant::Small(x)) => Ok(JsonValue::from(*x)),
            Object::Integer(IntVariant::Big(_)) => Err(Error::new(Value::TooLarge)),
            Object::Float(x) if x.is_finite() => Ok(JsonValue::from(*x)),
            Object::Float(_) => Err(Error::new(Value::OutOfRange)),
            Object::Boolean(x) => Ok(JsonValue::from(*x)),
            Object::String(x) => Ok(JsonValue::from(x.as_ref())),
        }
    }
}
