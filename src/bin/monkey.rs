extern crate getopts;
extern crate monkey_lang;

use monkey_lang::ast;
use monkey_lang::evaluator;
use monkey_lang::lexer::Lexer;
use monkey_lang::object::Environment;
use monkey_lang::parser::Parser;
use monkey_lang::repl;
use monkey_lang::token::Token;

use getopts::Options;
use std::env;
use std::io;

fn main() -> Result<(), String> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    opts.optflag("l", "lex", "display tokens produced by the lexer");
    opts.optflag("p", "parse", "display statements produced by the parser");

    let matches = opts.parse(&args[1..]).map_err(|err| err.to_string())?;

    if matches.opt_present("h") {
        let brief = format!("Usage: {} [options] ['let five = 5; five * 2']", program);
        print!("{}", opts.usage(&brief));
        return Ok(());
    }

    // With no program to run, read programs line by line from stdin.
    if matches.free.is_empty() {
        println!("This is the Monkey programming language!");
        println!("Feel free to type in commands");

        let stdin = io::stdin();
        return repl::start(stdin.lock(), io::stdout()).map_err(|err| err.to_string());
    }

    // Pass all free arguments to the lexer, parser, and evaluator.
    let program = matches.free.join(" ");

    if matches.opt_present("l") {
        lex(&program)?;
    }

    let prog = parse(&program)?;

    if matches.opt_present("p") {
        println!("parser:");
        for s in &prog.statements {
            println!("  - {}", s);
        }
        println!();
    }

    let obj = evaluator::eval(ast::Node::Program(prog), &Environment::new())
        .map_err(|err| err.to_string())?;
    println!("{}", obj);

    Ok(())
}

fn lex(input: &str) -> Result<(), String> {
    println!("lexer:");

    for t in Lexer::new(input).lex() {
        match t {
            Token::Eof => {
                break;
            }
            Token::Illegal(ill) => {
                return Err(format!("illegal token: {}", ill));
            }
            _ => {
                println!("  - {}", t);
            }
        };
    }

    println!();
    Ok(())
}

fn parse(input: &str) -> Result<ast::Program, String> {
    Parser::new(Lexer::new(input))
        .parse()
        .map_err(|err| err.to_string())
}
