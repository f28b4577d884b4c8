use std::io::Write;
use std::path::{Path, PathBuf};

use monkey_lang_core::parser::{self, ParseError};
use monkey_lang_interpreter::environment::Environment;
use monkey_lang_interpreter::evaluator;
use monkey_lang_interpreter::object::EvaluationError;
use rustyline::error::ReadlineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parser errors:\n{}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),
    #[error("ERROR: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Output(#[from] std::io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

pub fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|error| format!("\t{}\n", error))
        .collect()
}

/// Parses and evaluates `source` once, writing the resulting value to `out`.
pub fn execute(source: &str, print_ast: bool, out: &mut impl Write) -> Result<(), RunnerError> {
    let program = parser::parse(source).map_err(RunnerError::Parse)?;
    if print_ast {
        write!(out, "{}", program)?;
    }
    let mut env = Environment::new();
    let evaluated = evaluator::eval_program(&program, &mut env)?;
    writeln!(out, "{}", evaluated)?;
    Ok(())
}

pub fn execute_file(path: &Path, print_ast: bool) -> Result<(), RunnerError> {
    let source = std::fs::read_to_string(path).map_err(|source| RunnerError::Read {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "running file");
    execute(&source, print_ast, &mut std::io::stdout().lock())
}
