//! A read-eval-print loop for the Monkey programming language.

use crate::{ast, evaluator, lexer::Lexer, object::Environment, parser::Parser};

use std::io::{self, BufRead, Write};

use log::info;

/// The prompt printed before reading each line.
pub const PROMPT: &str = ">> ";

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// Reads lines of Monkey source from `input` until it is exhausted, evaluating
/// each in one environment shared by the whole session and writing results
/// and errors to `output`.
pub fn start<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<()> {
    let env = Environment::new();

    write!(output, "{}", PROMPT)?;
    output.flush()?;

    for line in input.lines() {
        eval_line(&line?, &env, &mut output)?;

        write!(output, "{}", PROMPT)?;
        output.flush()?;
    }

    info!("input exhausted, leaving REPL");
    writeln!(output)
}

// Parses and evaluates a single line within `env`.
fn eval_line<W: Write>(line: &str, env: &Environment, output: &mut W) -> io::Result<()> {
    let mut parser = Parser::new(Lexer::new(line));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        write!(output, "{}", MONKEY_FACE)?;
        writeln!(output, "Woops! We ran into some monkey business here!")?;
        writeln!(output, "   parser errors:")?;
        for err in parser.errors() {
            writeln!(output, "\t* {}", err)?;
        }

        return Ok(());
    }

    // A trailing let statement binds a name but has nothing to show.
    let silent = matches!(program.statements.last(), Some(ast::Statement::Let(_)));

    match evaluator::eval(ast::Node::Program(program), env) {
        Ok(obj) if !silent => writeln!(output, "{}", obj),
        Ok(_) => Ok(()),
        Err(err) => {
            write!(output, "{}", MONKEY_FACE)?;
            writeln!(output, "Woops! We ran into some monkey business here!")?;
            writeln!(output, "   eval error: {}", err)
        }
    }
}
