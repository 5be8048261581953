use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::common::{self, Failure};
use ember_interpreter::{InterpreterConfig, PrintHandler, Program};
use ember_lexer::Lexer;
use ember_syntax::ast::Item;
use ember_syntax::token::TokenKind;

pub fn start_repl(config: InterpreterConfig, quiet: bool) {
    if !quiet {
        println!("{}", "Ember REPL. Type :help for help, :quit to exit.".bold().green());
    }

    let mut program = Program::with_config(config, PrintHandler::Stdout);

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "ember> " } else { "...  > " };
        print!("{}", prompt.cyan());
        let _ = io::stdout().flush();

        let mut line = String::new();
        let n = match io::stdin().read_line(&mut line) {
            Ok(n) => n,
            Err(_) => {
                println!("<input error>");
                break;
            }
        };
        if n == 0 {
            // EOF
            println!("\nGoodbye.");
            break;
        }
        let trimmed = line.trim();

        if buffer.is_empty() {
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with(':') {
                match trimmed {
                    ":quit" | ":q" | ":exit" => {
                        println!("Goodbye.");
                        break;
                    }
                    ":help" | ":h" => print_help(),
                    ":vars" => print_vars(&program),
                    ":funcs" => print_funcs(&program),
                    ":reset" => {
                        program.reset();
                        println!("{}", "State reset.".yellow());
                    }
                    _ => println!("{}", "Unknown command. Type :help.".red()),
                }
                continue;
            }
        }

        buffer.push_str(&line);
        if !is_complete(&buffer) {
            continue;
        }

        eval_input(&mut program, &buffer);
        buffer.clear();
    }
}

/// Run every item of one complete input. A failing item is reported and
/// skipped; the items after it still run.
fn eval_input(program: &mut Program, input: &str) {
    let script = match common::parse_source(input) {
        Ok(script) => script,
        Err(failure) => {
            common::render_failure(input, &failure);
            return;
        }
    };
    for item in &script.items {
        match program.run_item(item) {
            Ok(value) => {
                if matches!(item, Item::Expr(_)) && !value.is_unit() {
                    println!("{}", value.to_string().bright_blue());
                }
            }
            Err(e) => common::render_failure(input, &Failure::Runtime(e)),
        }
    }
}

fn print_help() {
    println!(
        "{}\n  {}  {}\n  {}  {}\n  {}  {}\n  {}  {}\n  {}  {}",
        "Commands:".bold(),
        ":help ".yellow(),
        "Show this help",
        ":quit ".yellow(),
        "Exit the REPL",
        ":vars ".yellow(),
        "List global variables with their types",
        ":funcs".yellow(),
        "List defined functions",
        ":reset".yellow(),
        "Forget all variables and functions",
    );
    println!("Type code to evaluate. Unfinished input (open brackets, 'while' without 'end') continues on the next line.");
}

fn print_vars(program: &Program) {
    let vars = program.globals();
    if vars.is_empty() {
        println!("{}", "<no vars>".dimmed());
        return;
    }
    for (name, binding) in vars {
        println!(
            "{}: {} = {}",
            name.yellow(),
            binding.ty,
            binding.value.to_string().bright_blue()
        );
    }
}

fn print_funcs(program: &Program) {
    let functions = program.functions().functions();
    if functions.is_empty() {
        println!("{}", "<no functions>".dimmed());
        return;
    }
    for f in functions {
        println!("{}", f.signature().yellow());
    }
}

/// Whether `input` can be parsed as it stands, or the user is still typing.
fn is_complete(input: &str) -> bool {
    let tokens = match Lexer::new(input).tokenize() {
        Ok(t) => t,
        // let the parser report everything except a string still being typed
        Err(e) => return !e.msg.contains("Unterminated string"),
    };
    let mut depth = 0i32;
    let mut loops = 0i32;
    for tk in &tokens {
        match tk.kind {
            TokenKind::LParen | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBrace => depth -= 1,
            TokenKind::While => loops += 1,
            TokenKind::End => loops -= 1,
            _ => {}
        }
    }
    let dangling = tokens
        .iter()
        .rev()
        .find(|t| t.kind != TokenKind::Eof)
        .map(|t| {
            matches!(
                t.kind,
                TokenKind::Then
                    | TokenKind::Else
                    | TokenKind::Do
                    | TokenKind::Equal
                    | TokenKind::Arrow
                    | TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Star
                    | TokenKind::Slash
                    | TokenKind::Caret
                    | TokenKind::EqEq
                    | TokenKind::NotEq
                    | TokenKind::Less
                    | TokenKind::Greater
                    | TokenKind::Not
                    | TokenKind::Print
            )
        })
        .unwrap_or(false);
    depth <= 0 && loops <= 0 && !dangling
}
