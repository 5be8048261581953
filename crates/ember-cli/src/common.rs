use owo_colors::OwoColorize;

use ember_interpreter::InterpreterError;
use ember_lexer::Lexer;
use ember_parser::Parser;
use ember_syntax::ast::Script;
use ember_syntax::error::SyntaxError;

/// Anything that can stop a piece of source from running.
#[derive(Debug)]
pub enum Failure {
    Lex(SyntaxError),
    Parse(SyntaxError),
    Runtime(InterpreterError),
}

impl From<InterpreterError> for Failure {
    fn from(err: InterpreterError) -> Self {
        Failure::Runtime(err)
    }
}

/// Lex and parse a whole source text.
pub fn parse_source(src: &str) -> Result<Script, Failure> {
    let tokens = Lexer::new(src).tokenize().map_err(Failure::Lex)?;
    Parser::new(tokens).parse_program().map_err(Failure::Parse)
}

pub fn render_failure(source: &str, failure: &Failure) {
    match failure {
        Failure::Lex(err) => render_syntax_error("Lex error", source, err),
        Failure::Parse(err) => render_syntax_error("Parse error", source, err),
        Failure::Runtime(err) => render_runtime_error(err),
    }
}

fn render_syntax_error(kind: &str, source: &str, err: &SyntaxError) {
    eprintln!("{}: {}", kind.red().bold(), err.msg.red());
    if let (Some(line), Some(col)) = (err.line, err.col) {
        eprintln!("  --> line {}, column {}", line, col);
        if let Some(src_line) = source.lines().nth(line.saturating_sub(1)) {
            let line_num_str = format!("{:3} | ", line);
            eprintln!("     |");
            eprintln!("{}{}", line_num_str.bright_black(), src_line);

            let mut marker = " ".repeat(line_num_str.len() + col.saturating_sub(1));
            marker.push('^');
            eprintln!("{}{}", marker.red(), " error here".red());
            eprintln!("     |");
        }
    }
    provide_syntax_suggestions(&err.msg);
}

fn render_runtime_error(err: &InterpreterError) {
    eprintln!(
        "{} [{}]: {}",
        "Runtime error".red().bold(),
        err.kind(),
        err.to_string().red()
    );
    provide_error_suggestions(err);
}

fn help(msg: &str, example: &str) {
    eprintln!("{}", format!("Help: {}", msg).yellow());
    if !example.is_empty() {
        eprintln!("    {}", example.bright_black());
    }
}

pub fn provide_error_suggestions(err: &InterpreterError) {
    match err {
        InterpreterError::Redeclaration { .. } => help(
            "A name can be declared once per scope. Assign to it instead, or open a block to shadow it.",
            "int x = 1; x = 2; { int x = 3 }",
        ),
        InterpreterError::UndefinedName { .. } => help(
            "Declare the variable with its type before using it. Functions only see globals and their parameters.",
            "int count = 0",
        ),
        InterpreterError::UndefinedFunction { .. } => help(
            "Check the spelling, and define the function before the call runs.",
            "def square int n -> int = n * n",
        ),
        InterpreterError::TypeMismatch { .. } => help(
            "The value must have exactly the declared type. Use a conversion if needed.",
            "float f = tofloat 1",
        ),
        InterpreterError::TypeError { .. } => help(
            "Conditions and 'not' take bool values; only numbers can be negated.",
            "if n > 0 then 1 else 0",
        ),
        InterpreterError::UnsupportedOperand { .. } => help(
            "Operators work on numbers; '+' also joins strings and '*' repeats a string.",
            "tostr 1 + \"x\"",
        ),
        InterpreterError::Conversion { .. } => help(
            "The value can't be represented in the target type.",
            "toint \"42\", tobool \"True\"",
        ),
        InterpreterError::Arity { .. } | InterpreterError::ArgumentType { .. } => help(
            "Pass one argument per parameter; ints are widened to float parameters, nothing else is converted.",
            "",
        ),
        InterpreterError::DuplicateFunction { .. } => {
            help("Functions can't be redefined. Pick another name.", "")
        }
        InterpreterError::Arithmetic { .. } => help(
            "Check for division by zero and integer overflow; use float operands for fractional powers.",
            "2.0 ^ -1",
        ),
        InterpreterError::RecursionLimit { .. } => help(
            "Make sure the recursion has a base case, or raise the limit with --max-depth.",
            "",
        ),
    }
}

fn provide_syntax_suggestions(msg: &str) {
    if msg.contains("Unterminated string") {
        help("String is missing its closing quote.", "\"hello\"");
    } else if msg.contains("Invalid number") {
        help("Integers must fit in 64 bits.", "");
    } else if msg.contains("'end'") {
        help("Every 'while ... do' needs a matching 'end'.", "while i < 3 do i = i + 1 end");
    } else if msg.contains("'then'") {
        help("An 'if' needs 'then' before its first branch.", "if x > 1 then x else 1");
    } else if msg.contains("Expected type name") {
        help("Types are int, float, str and bool.", "def f int n -> float = n / 2");
    }
}
