use monkey_lang_core::ast::Program;
use monkey_lang_core::parser::{self, ParseError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    Exit,
    Clear,
    Errors(Vec<ParseError>),
    Value(Program),
}

pub struct Reader {
    rl: DefaultEditor,
}

impl Reader {
    pub fn new(rl: DefaultEditor) -> Self {
        Self { rl }
    }

    pub fn read(&mut self) -> Result<ReadOutput, ReadlineError> {
        let line = match self.rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                return Ok(ReadOutput::Clear);
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                return Ok(ReadOutput::Exit);
            }
            Err(err) => return Err(err),
            Ok(line) => line,
        };

        if line.trim().is_empty() {
            return Ok(ReadOutput::Clear);
        }
        if let Err(err) = self.rl.add_history_entry(line.as_str()) {
            tracing::warn!(%err, "could not record history entry");
        }

        Ok(match parser::parse(&line) {
            Ok(program) if program.statements.is_empty() => ReadOutput::Clear,
            Ok(program) => ReadOutput::Value(program),
            Err(errors) => ReadOutput::Errors(errors),
        })
    }
}
