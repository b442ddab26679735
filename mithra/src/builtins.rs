use std::collections::HashMap;

use crate::error::{Error, TypeMismatch};
use crate::object::{List, Object};


/// Signature of a built-in function.
pub type RFunc = fn(&List) -> Result<Object, Error>;


macro_rules! builtin {
    ($m: ident, $e: ident) => {
        $m.insert(stringify!($e), $e as RFunc)
    };
}


lazy_static! {
    pub static ref BUILTINS: HashMap<&'static str, RFunc> = {
        let mut m = HashMap::new();
        builtin!(m, add);
        builtin!(m, sub);
        builtin!(m, mul);
        builtin!(m, div);
        m
    };
}


/// Unpack exactly two arguments.
fn binary(args: &List) -> Result<(&Object, &Object), Error> {
    match &args[..] {
        [x, y] => Ok((x, y)),
        _ => Err(Error::new(TypeMismatch::ArgCount { low: 2, high: 2, received: args.len() })),
    }
}


pub fn add(args: &List) -> Result<Object, Error> {
    let (x, y) = binary(args)?;
    x.add(y)
}


pub fn sub(args: &List) -> Result<Object, Error> {
    let (x, y) = binary(args)?;
    x.sub(y)
}


pub fn mul(args: &List) -> Result<Object, Error> {
    let (x, y) = binary(args)?;
    x.mul(y)
}


pub fn div(args: &List) -> Result<Object, Error> {
    let (x, y) = binary(args)?;
    x.div(y)
}
