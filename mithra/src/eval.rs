use indexmap::{map::Iter, IndexMap};
use json::JsonValue;

use crate::ast::Expr;
use crate::builtins::BUILTINS;
use crate::error::{Action, Error, Internal, Reason, Tagged};
use crate::object::{Key, List, Object};


/// Mapping from variable names to the last value assigned to them.
///
/// There is a single flat namespace. Names iterate in the order they were
/// first assigned, and rebinding a name keeps its place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment(IndexMap<Key, Object>);

impl Environment {
    pub fn new() -> Environment {
        Environment(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &Key) -> Option<&Object> {
        self.0.get(name)
    }

    /// Bind a name, returning the value it was bound to before, if any.
    pub fn bind(&mut self, name: Key, value: Object) -> Option<Object> {
        self.0.insert(name, value)
    }

    pub fn iter(&self) -> Iter<'_, Key, Object> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a Key, &'a Object);
    type IntoIter = Iter<'a, Key, Object>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


/// Tree-walking evaluator with its own environment.
///
/// Separate interpreters don't share any state, so independent programs can
/// be run side by side.
pub struct Interpreter {
    memory: Environment,
}

impl Interpreter {
    /// Construct an interpreter with an empty environment.
    pub fn new() -> Interpreter {
        Interpreter { memory: Environment::new() }
    }

    /// Return the current environment.
    pub fn memory(&self) -> &Environment {
        &self.memory
    }

    /// Look up the current value of a variable.
    pub fn get(&self, name: &str) -> Option<&Object> {
        self.memory.get(&Key::new(name))
    }

    /// Reduce an expression to a primitive value.
    ///
    /// Assignments bind their value in the environment as a side effect. An
    /// error leaves any bindings made before it in place.
    pub fn eval(&mut self, expr: &Expr) -> Result<Object, Error> {
        match expr {
            Expr::Literal(obj) => Ok(obj.clone()),

            Expr::Assignment { name, expr } => {
                let value = self.eval(expr)?;
                self.memory.bind(*name, value.clone());
                Ok(value)
            }

            Expr::Variable(name) => self.memory.get(name)
                .cloned()
                .ok_or_else(|| Error::new(Reason::Unbound(*name))),

            Expr::FunctionCall { name, args } => {
                let values = args.iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<List, _>>()?;
                let func = BUILTINS.get(name.as_str())
                    .ok_or_else(|| Error::new(Reason::UnknownFunction(*name)))?;
                func(&values)
            }

            Expr::Function { .. } => Err(Error::new(Internal::UnsupportedNode)),
        }
    }

    /// Evaluate statements in order and return the value of the last one, or
    /// `None` if there were no statements.
    ///
    /// The first error aborts the run, tagged with the location of the
    /// statement that caused it.
    pub fn run<'a>(
        &mut self,
        statements: impl IntoIterator<Item = &'a Tagged<Expr>>,
    ) -> Result<Option<Object>, Error> {
        let mut retval = None;
        for statement in statements {
            let value = self.eval(statement).map_err(|err| err.tag(statement, Action::Evaluate))?;
            retval = Some(value);
        }
        Ok(retval)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl TryFrom<&Environment> for JsonValue {
    type Error = Error;

    fn try_from(value: &Environment) -> Result<Self, Self::Error> {
        let mut retval = JsonValue::new_object();
        for (key, element) in value {
            retval[key.as_str()] = JsonValue::try_from(element)?;
        }
        Ok(retval)
    }
}
