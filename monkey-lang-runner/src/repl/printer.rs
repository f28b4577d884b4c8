use std::io::{self, Write};
use std::rc::Rc;

use monkey_lang_core::ast::Program;
use monkey_lang_core::parser::ParseError;
use monkey_lang_interpreter::object::{EvaluationError, Object};

use crate::runner::format_parse_errors;

const MONKEY_FACE: &str = r#"
                                   __
                                  /  |
_____  ____    ______   _______   $$ |   __   ______   __    __
/     \/    \  /      \ /       \ $$ |  /  | /      \ /  |  /  |
$$$$$$ $$$$  |/$$$$$$  |$$$$$$$  |$$ |_/$$/ /$$$$$$  |$$ |  $$ |
$$ | $$ | $$ |$$ |  $$ |$$ |  $$ |$$   $$<  $$    $$ |$$ |  $$ |
$$ | $$ | $$ |$$ \__$$ |$$ |  $$ |$$$$$$  \ $$$$$$$$/ $$ \__$$ |
$$ | $$ | $$ |$$    $$/ $$ |  $$ |$$ | $$  |$$       |$$    $$ |
$$/  $$/  $$/  $$$$$$/  $$/   $$/ $$/   $$/  $$$$$$$/  $$$$$$$ |
                                                      /  \__$$ |
                                                      $$    $$/
                                                       $$$$$$/
"#;
const MONKEY_BUSINESS: &str = "Woops! We ran into some monkey business here!";

pub struct Printer<W: Write> {
    out: W,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print(&mut self, result: Result<Rc<Object>, EvaluationError>) -> io::Result<()> {
        match result {
            Ok(object) => writeln!(self.out, "{}", object),
            Err(err) => writeln!(self.out, "ERROR: {}", err),
        }
    }

    pub fn print_ast(&mut self, program: &Program) -> io::Result<()> {
        write!(self.out, "{}", program)
    }

    pub fn print_parse_errors(&mut self, errors: &[ParseError]) -> io::Result<()> {
        writeln!(self.out, "{}", MONKEY_FACE)?;
        writeln!(self.out, "{}", MONKEY_BUSINESS)?;
        writeln!(self.out, " parser errors:")?;
        write!(self.out, "{}", format_parse_errors(errors))
    }
}
