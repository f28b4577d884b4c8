mod printer;
mod reader;

use std::io::Write;
use std::rc::Rc;

use monkey_lang_core::ast::Program;
use monkey_lang_interpreter::environment::Environment;
use monkey_lang_interpreter::evaluator;
use monkey_lang_interpreter::object::{EvaluationError, Object};
use rustyline::DefaultEditor;

use printer::Printer;
use reader::{ReadOutput, Reader};

use crate::runner::RunnerError;

/// Evaluates successive programs against one environment, so bindings made
/// on one line are visible on the next.
#[derive(Default)]
struct Session {
    environment: Environment,
}

impl Session {
    fn evaluate(&mut self, program: &Program) -> Result<Rc<Object>, EvaluationError> {
        evaluator::eval_program(program, &mut self.environment)
    }
}

struct Repl<W: Write> {
    reader: Reader,
    session: Session,
    printer: Printer<W>,
    print_ast: bool,
}

impl<W: Write> Repl<W> {
    fn run(mut self) -> Result<(), RunnerError> {
        loop {
            match self.reader.read()? {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Errors(errors) => self.printer.print_parse_errors(&errors)?,
                ReadOutput::Value(program) => {
                    if self.print_ast {
                        self.printer.print_ast(&program)?;
                    }
                    let result = self.session.evaluate(&program);
                    self.printer.print(result)?;
                }
            }
        }
        Ok(())
    }
}

pub fn start(print_ast: bool) -> Result<(), RunnerError> {
    let rl = DefaultEditor::new()?;
    tracing::debug!("starting repl");

    Repl {
        reader: Reader::new(rl),
        session: Session::default(),
        printer: Printer::new(std::io::stdout()),
        print_ast,
    }
    .run()
}
