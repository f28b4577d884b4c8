use std::rc::Rc;

use crate::object::{BuiltinFunction, EvaluationError, Object};

fn check_argument_count(args: &[Rc<Object>], want: usize) -> Result<(), EvaluationError> {
    if args.len() != want {
        return Err(EvaluationError::WrongArgumentCount {
            got: args.len(),
            want,
        });
    }
    Ok(())
}

fn builtin_len(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        _ => Err(EvaluationError::UnsupportedArgument {
            function: "len",
            got: args[0].clone(),
        }),
    }
}

fn builtin_puts(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    for arg in &args {
        println!("{}", arg);
    }
    Ok(Object::null())
}

fn builtin_to_string(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_argument_count(&args, 1)?;
    Ok(Object::string(args[0].to_string()))
}

type BuiltinFn = fn(Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError>;

const BUILTINS: [(&str, BuiltinFn); 3] = [
    ("len", builtin_len),
    ("puts", builtin_puts),
    ("to_string", builtin_to_string),
];

// Built once per thread so every lookup of a name yields the same value,
// which keeps `len == len` true under identity comparison.
thread_local! {
    static TABLE: Vec<Rc<Object>> = BUILTINS
        .iter()
        .map(|&(name, func)| Object::builtin_function(BuiltinFunction { name, func }))
        .collect();
}

/// Host functions, consulted only after a name is missing from every scope.
pub fn lookup(name: &str) -> Option<Rc<Object>> {
    let index = BUILTINS.iter().position(|(builtin, _)| *builtin == name)?;
    TABLE.with(|table| table.get(index).cloned())
}
