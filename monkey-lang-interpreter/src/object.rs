use std::fmt::Display;
use std::rc::Rc;

use crate::environment::Environment;
use monkey_lang_core::ast;

use thiserror::Error;

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Function(Function),
    BuiltinFunction(BuiltinFunction),
}

// `true`, `false` and `null` exist exactly once; `==` on anything that is not
// an integer or a string compares by identity against these.
thread_local! {
    static NULL: Rc<Object> = Rc::new(Object::Null);
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
}

impl Object {
    pub fn null() -> Rc<Object> {
        NULL.with(|x| x.clone())
    }
    pub fn boolean(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(|x| x.clone())
        } else {
            FALSE.with(|x| x.clone())
        }
    }
    pub fn integer(value: i64) -> Rc<Object> {
        Rc::new(Object::Integer(value))
    }
    pub fn string(value: String) -> Rc<Object> {
        Rc::new(Object::String(value))
    }
    pub fn function(
        parameters: Vec<ast::Identifier>,
        body: Rc<ast::BlockStatement>,
        environment: Environment,
    ) -> Rc<Object> {
        Rc::new(Object::Function(Function {
            parameters,
            body,
            environment,
        }))
    }
    pub fn builtin_function(func: BuiltinFunction) -> Rc<Object> {
        Rc::new(Object::BuiltinFunction(func))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Null => "NULL",
            Object::Function(_) => "FUNCTION",
            Object::BuiltinFunction(_) => "BUILTIN",
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Function(function) => write!(f, "{}", function),
            Object::BuiltinFunction(_) => write!(f, "builtin function"),
        }
    }
}

/// A closure: the literal's parameters and body plus the environment it was
/// defined in, shared rather than copied.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<ast::Identifier>,
    pub body: Rc<ast::BlockStatement>,
    pub environment: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && Rc::ptr_eq(&self.body, &other.body)
            && self.environment.ptr_eq(&other.environment)
    }
}

// The environment may hold this very function, so it is left out.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("ptr", &Rc::as_ptr(&self.body))
            .finish()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.name.as_ref())
            .collect::<Vec<&str>>()
            .join(", ");
        write!(f, "fn({}) {}", parameters, self.body)
    }
}

#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: fn(Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError>,
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Why evaluation of a statement stopped early.
#[derive(Debug, PartialEq)]
pub enum QuickReturn {
    /// A `return` that has not yet reached its function call boundary.
    Return(Rc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for QuickReturn {
    fn from(value: EvaluationError) -> Self {
        QuickReturn::Error(value)
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(Rc<str>),
    #[error("unknown operator: {operation}{}", .right.type_name())]
    UnknownPrefixOperator {
        operation: ast::PrefixOperationKind,
        right: Rc<Object>,
    },
    #[error("unknown operator: {} {operation} {}", .left.type_name(), .right.type_name())]
    UnknownInfixOperator {
        operation: ast::InfixOperationKind,
        left: Rc<Object>,
        right: Rc<Object>,
    },
    #[error("type mismatch: {} {operation} {}", .left.type_name(), .right.type_name())]
    TypeMismatch {
        operation: ast::InfixOperationKind,
        left: Rc<Object>,
        right: Rc<Object>,
    },
    #[error("not a function: {}", .0.type_name())]
    NotAFunction(Rc<Object>),
    #[error("division by zero: {0} / 0")]
    DivisionByZero(i64),
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },
    #[error("argument to `{function}` not supported, got {}", .got.type_name())]
    UnsupportedArgument {
        function: &'static str,
        got: Rc<Object>,
    },
}
