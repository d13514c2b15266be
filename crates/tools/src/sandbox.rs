//! Sandboxed code execution: a tiny interpreted language with a deadline.
//!
//! The language is deliberately small: assignments, arithmetic, strings,
//! comparisons, `and`/`or`/`not`, `if`/`else`, `while` and a whitelist of
//! pure builtins. There are no filesystem, process or network symbols, so
//! a payload can only compute and print.
//!
//! ```text
//! x = 3; y = x * 2
//! if y > 5 { result = "big" } else { result = "small" }
//! ```
//!
//! Statements are separated by newlines or `;`. Blocks use braces. The
//! value bound to `result` when the program ends is the reply.
//!
//! Each run happens on a blocking worker joined with a wall-clock
//! deadline. When the deadline passes the caller stops waiting and raises
//! a cancellation flag that the interpreter checks before every statement
//! and loop iteration; the worker itself is never killed.

use forgecore_core::error::ToolError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Reply when a program finishes without binding `result`.
pub const NO_RESULT: &str = "Code executed successfully.";

const MAX_STRING_LEN: usize = 1 << 20;
const MAX_OUTPUT_LINES: usize = 1000;
const MAX_SOURCE_LEN: usize = 64 * 1024;
/// Bound on syntax tree depth, counting blocks, brackets, unary operators
/// and operator chains. Parsing, evaluation and drop all recurse on it.
const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SandboxError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{0}")]
    Runtime(String),

    #[error("execution cancelled")]
    Cancelled,
}

/// Runs payloads on a blocking worker under a deadline.
#[derive(Debug, Clone)]
pub struct Sandbox {
    timeout: Duration,
}

impl Sandbox {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute `code` and return its reply text.
    pub async fn run(&self, code: &str) -> Result<String, ToolError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let code = code.to_owned();

        let worker = tokio::task::spawn_blocking(move || interpret(&code, &flag));

        match tokio::time::timeout(self.timeout, worker).await {
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms, "Sandboxed code hit its deadline");
                Err(ToolError::Timeout { timeout_ms })
            }
            Ok(Err(join)) => Err(ToolError::Sandbox(format!("worker failed: {join}"))),
            Ok(Ok(Err(e))) => Err(ToolError::Sandbox(e.to_string())),
            Ok(Ok(Ok(execution))) => {
                for line in &execution.output {
                    debug!(output = %line, "sandbox print");
                }
                Ok(execution.reply())
            }
        }
    }
}

// ── Values ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
    Bool(bool),
    None,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::None => "NoneType",
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Num(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::None => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integers print without a trailing ".0".
            Value::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::None => f.write_str("None"),
        }
    }
}

/// What a finished program left behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub result: Option<Value>,
    pub output: Vec<String>,
}

impl Execution {
    pub fn reply(&self) -> String {
        match &self.result {
            Some(v) => v.to_string(),
            None => NO_RESULT.to_string(),
        }
    }
}

/// Parse and run `code` synchronously, honouring `cancel`.
pub fn interpret(code: &str, cancel: &AtomicBool) -> Result<Execution, SandboxError> {
    if code.len() > MAX_SOURCE_LEN {
        return Err(SandboxError::Syntax(format!(
            "program longer than {MAX_SOURCE_LEN} bytes"
        )));
    }
    let tokens = tokenize(code)?;
    let program = Parser::new(&tokens).parse_program()?;

    let mut machine = Machine {
        vars: HashMap::new(),
        output: Vec::new(),
        cancel,
    };
    machine.exec_block(&program)?;

    Ok(Execution {
        result: machine.vars.remove("result"),
        output: machine.output,
    })
}

// ── Lexer ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    If,
    Else,
    While,
    And,
    Or,
    Not,
    True,
    False,
    NoneLit,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// Newline or `;`.
    Sep,
}

fn tokenize(input: &str) -> Result<Vec<Token>, SandboxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    // Two-character operator at `i`, if `chars[i + 1] == next`.
    let followed_by = |i: usize, next: char| chars.get(i + 1) == Some(&next);

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\r' => i += 1,
            '\n' | ';' => { tokens.push(Token::Sep); i += 1; }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            '{' => { tokens.push(Token::LBrace); i += 1; }
            '}' => { tokens.push(Token::RBrace); i += 1; }
            ',' => { tokens.push(Token::Comma); i += 1; }
            '%' => { tokens.push(Token::Percent); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '+' if followed_by(i, '=') => { tokens.push(Token::PlusAssign); i += 2; }
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' if followed_by(i, '=') => { tokens.push(Token::MinusAssign); i += 2; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' if followed_by(i, '=') => { tokens.push(Token::StarAssign); i += 2; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '=' if followed_by(i, '=') => { tokens.push(Token::EqEq); i += 2; }
            '=' => { tokens.push(Token::Assign); i += 1; }
            '!' if followed_by(i, '=') => { tokens.push(Token::NotEq); i += 2; }
            '<' if followed_by(i, '=') => { tokens.push(Token::Le); i += 2; }
            '<' => { tokens.push(Token::Lt); i += 1; }
            '>' if followed_by(i, '=') => { tokens.push(Token::Ge); i += 2; }
            '>' => { tokens.push(Token::Gt); i += 1; }
            quote @ ('\'' | '"') => {
                i += 1;
                let mut s = String::new();
                loop {
                    match chars.get(i) {
                        None => return Err(SandboxError::Syntax("unterminated string".into())),
                        Some(&c) if c == quote => { i += 1; break; }
                        Some('\\') => {
                            let escaped = match chars.get(i + 1) {
                                Some('n') => '\n',
                                Some('t') => '\t',
                                Some(&c) => c,
                                None => return Err(SandboxError::Syntax("unterminated string".into())),
                            };
                            s.push(escaped);
                            i += 2;
                        }
                        Some(&c) => { s.push(c); i += 1; }
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| SandboxError::Syntax(format!("invalid number: {num_str}")))?;
                tokens.push(Token::Number(num));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "if" => Token::If,
                    "else" => Token::Else,
                    "while" => Token::While,
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "True" => Token::True,
                    "False" => Token::False,
                    "None" => Token::NoneLit,
                    _ => Token::Ident(word),
                });
            }
            c => return Err(SandboxError::Syntax(format!("unexpected character '{c}'"))),
        }
    }

    Ok(tokens)
}

// ── Syntax tree ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Var(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Stmt {
    Assign(String, Expr),
    Expr(Expr),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    While(Expr, Vec<Stmt>),
}

// ── Parser ────────────────────────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // A failed parse is abandoned, so `depth` is only unwound on success.
    fn enter(&mut self) -> Result<(), SandboxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(SandboxError::Syntax("expression nested too deeply".into()));
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: Token, what: &str) -> Result<(), SandboxError> {
        match self.consume() {
            Some(t) if *t == want => Ok(()),
            Some(t) => Err(SandboxError::Syntax(format!("expected {what}, found {t:?}"))),
            None => Err(SandboxError::Syntax(format!("expected {what}, found end of input"))),
        }
    }

    fn skip_separators(&mut self) {
        while let Some(Token::Sep) = self.peek() {
            self.pos += 1;
        }
    }

    // program = statements EOF
    fn parse_program(&mut self) -> Result<Vec<Stmt>, SandboxError> {
        let stmts = self.parse_statements()?;
        match self.peek() {
            None => Ok(stmts),
            Some(t) => Err(SandboxError::Syntax(format!("unexpected token {t:?}"))),
        }
    }

    // statements = (stmt (SEP | after-block))*, stopping at '}' or EOF
    fn parse_statements(&mut self) -> Result<Vec<Stmt>, SandboxError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None | Some(Token::RBrace) => return Ok(stmts),
                _ => {}
            }

            let stmt = self.parse_statement()?;
            let is_block = matches!(stmt, Stmt::If(..) | Stmt::While(..));
            stmts.push(stmt);

            match self.peek() {
                None | Some(Token::Sep) | Some(Token::RBrace) => {}
                Some(_) if is_block => {}
                Some(t) => {
                    return Err(SandboxError::Syntax(format!(
                        "expected end of statement, found {t:?}"
                    )));
                }
            }
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, SandboxError> {
        self.expect(Token::LBrace, "'{'")?;
        self.enter()?;
        let body = self.parse_statements()?;
        self.leave(1);
        self.expect(Token::RBrace, "'}'")?;
        Ok(body)
    }

    fn parse_statement(&mut self) -> Result<Stmt, SandboxError> {
        match self.peek() {
            Some(Token::If) => {
                self.consume();
                self.parse_if_rest()
            }
            Some(Token::While) => {
                self.consume();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Stmt::While(cond, body))
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                let op = match self.peek_at(1) {
                    Some(Token::Assign) => None,
                    Some(Token::PlusAssign) => Some(BinOp::Add),
                    Some(Token::MinusAssign) => Some(BinOp::Sub),
                    Some(Token::StarAssign) => Some(BinOp::Mul),
                    _ => return Ok(Stmt::Expr(self.parse_expr()?)),
                };
                self.pos += 2;
                let value = self.parse_expr()?;
                let value = match op {
                    None => value,
                    Some(op) => Expr::Binary(op, Box::new(Expr::Var(name.clone())), Box::new(value)),
                };
                Ok(Stmt::Assign(name, value))
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    // if-rest = expr block ('else' (if-rest | block))?
    fn parse_if_rest(&mut self) -> Result<Stmt, SandboxError> {
        let cond = self.parse_expr()?;
        let then = self.parse_block()?;

        // `else` may sit on the next line.
        let mut look = self.pos;
        while let Some(Token::Sep) = self.tokens.get(look) {
            look += 1;
        }
        if self.tokens.get(look) != Some(&Token::Else) {
            return Ok(Stmt::If(cond, then, Vec::new()));
        }
        self.pos = look + 1;

        let otherwise = if let Some(Token::If) = self.peek() {
            self.consume();
            self.enter()?;
            let nested = self.parse_if_rest()?;
            self.leave(1);
            vec![nested]
        } else {
            self.parse_block()?
        };
        Ok(Stmt::If(cond, then, otherwise))
    }

    fn parse_expr(&mut self) -> Result<Expr, SandboxError> {
        self.enter()?;
        let expr = self.parse_or()?;
        self.leave(1);
        Ok(expr)
    }

    // or = and ('or' and)*
    fn parse_or(&mut self) -> Result<Expr, SandboxError> {
        let mut left = self.parse_and()?;
        let mut links = 0;
        while let Some(Token::Or) = self.peek() {
            self.consume();
            self.enter()?;
            links += 1;
            let right = self.parse_and()?;
            left = Expr::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        self.leave(links);
        Ok(left)
    }

    // and = not ('and' not)*
    fn parse_and(&mut self) -> Result<Expr, SandboxError> {
        let mut left = self.parse_not()?;
        let mut links = 0;
        while let Some(Token::And) = self.peek() {
            self.consume();
            self.enter()?;
            links += 1;
            let right = self.parse_not()?;
            left = Expr::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        self.leave(links);
        Ok(left)
    }

    // not = 'not' not | comparison
    fn parse_not(&mut self) -> Result<Expr, SandboxError> {
        if let Some(Token::Not) = self.peek() {
            self.consume();
            self.enter()?;
            let inner = self.parse_not()?;
            self.leave(1);
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    // comparison = additive (cmp-op additive)?
    fn parse_comparison(&mut self) -> Result<Expr, SandboxError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinOp::Eq,
            Some(Token::NotEq) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.consume();
        self.enter()?;
        let right = self.parse_additive()?;
        self.leave(1);
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    // additive = term (('+' | '-') term)*
    fn parse_additive(&mut self) -> Result<Expr, SandboxError> {
        let mut left = self.parse_term()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.consume();
            self.enter()?;
            links += 1;
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.leave(links);
        Ok(left)
    }

    // term = unary (('*' | '/' | '%') unary)*
    fn parse_term(&mut self) -> Result<Expr, SandboxError> {
        let mut left = self.parse_unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.consume();
            self.enter()?;
            links += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.leave(links);
        Ok(left)
    }

    // unary = '-' unary | primary
    fn parse_unary(&mut self) -> Result<Expr, SandboxError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            self.enter()?;
            let inner = self.parse_unary()?;
            self.leave(1);
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    // primary = NUMBER | STRING | True | False | None | IDENT | IDENT '(' args ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, SandboxError> {
        let tok = self
            .consume()
            .cloned()
            .ok_or_else(|| SandboxError::Syntax("unexpected end of input".into()))?;

        match tok {
            Token::Number(n) => Ok(Expr::Literal(Value::Num(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::NoneLit => Ok(Expr::Literal(Value::None)),
            Token::Ident(name) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let args = self.parse_args()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "closing parenthesis")?;
                Ok(inner)
            }
            other => Err(SandboxError::Syntax(format!("unexpected token {other:?}"))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SandboxError> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.consume();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.consume() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => return Err(SandboxError::Syntax("expected ',' or ')' in call".into())),
            }
        }
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────

struct Machine<'c> {
    vars: HashMap<String, Value>,
    output: Vec<String>,
    cancel: &'c AtomicBool,
}

fn runtime(msg: impl Into<String>) -> SandboxError {
    SandboxError::Runtime(msg.into())
}

impl Machine<'_> {
    fn check_cancelled(&self) -> Result<(), SandboxError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(SandboxError::Cancelled);
        }
        Ok(())
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<(), SandboxError> {
        for stmt in stmts {
            self.check_cancelled()?;
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), SandboxError> {
        match stmt {
            Stmt::Assign(name, expr) => {
                let value = self.eval(expr)?;
                self.vars.insert(name.clone(), value);
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::If(cond, then, otherwise) => {
                if self.eval(cond)?.truthy() {
                    self.exec_block(then)?;
                } else {
                    self.exec_block(otherwise)?;
                }
            }
            Stmt::While(cond, body) => loop {
                self.check_cancelled()?;
                if !self.eval(cond)?.truthy() {
                    break;
                }
                self.exec_block(body)?;
            },
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, SandboxError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Var(name) => self
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| runtime(format!("name '{name}' is not defined"))),
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Num(n) => Ok(Value::Num(-n)),
                v => Err(runtime(format!("bad operand type for unary -: '{}'", v.type_name()))),
            },
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.truthy())),
            Expr::Binary(BinOp::And, l, r) => {
                let left = self.eval(l)?.truthy();
                Ok(Value::Bool(left && self.eval(r)?.truthy()))
            }
            Expr::Binary(BinOp::Or, l, r) => {
                let left = self.eval(l)?.truthy();
                Ok(Value::Bool(left || self.eval(r)?.truthy()))
            }
            Expr::Binary(op, l, r) => {
                let left = self.eval(l)?;
                let right = self.eval(r)?;
                binary(*op, left, right)
            }
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, values)
            }
        }
    }

    fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, SandboxError> {
        match name {
            "print" => {
                let line = args
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                if self.output.len() < MAX_OUTPUT_LINES {
                    self.output.push(line);
                }
                Ok(Value::None)
            }
            "len" => match one_arg(name, args)? {
                Value::Str(s) => Ok(Value::Num(s.chars().count() as f64)),
                v => Err(runtime(format!("object of type '{}' has no len()", v.type_name()))),
            },
            "str" => Ok(Value::Str(one_arg(name, args)?.to_string())),
            "int" => match one_arg(name, args)? {
                Value::Num(n) => Ok(Value::Num(n.trunc())),
                Value::Bool(b) => Ok(Value::Num(if b { 1.0 } else { 0.0 })),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(|n| Value::Num(n as f64))
                    .map_err(|_| runtime(format!("invalid literal for int(): '{s}'"))),
                Value::None => Err(runtime("int() argument must be a string or a number")),
            },
            "float" => match one_arg(name, args)? {
                Value::Num(n) => Ok(Value::Num(n)),
                Value::Bool(b) => Ok(Value::Num(if b { 1.0 } else { 0.0 })),
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Num)
                    .map_err(|_| runtime(format!("could not convert string to float: '{s}'"))),
                Value::None => Err(runtime("float() argument must be a string or a number")),
            },
            "abs" => Ok(Value::Num(number(name, &one_arg(name, args)?)?.abs())),
            "round" => match args.as_slice() {
                [v] => Ok(Value::Num(number(name, v)?.round())),
                [v, digits] => {
                    let scale = 10f64.powi(number(name, digits)? as i32);
                    Ok(Value::Num((number(name, v)? * scale).round() / scale))
                }
                _ => Err(runtime(format!("round() takes 1 or 2 arguments ({} given)", args.len()))),
            },
            "min" | "max" => {
                if args.is_empty() {
                    return Err(runtime(format!("{name}() expected at least 1 argument")));
                }
                let nums = args
                    .iter()
                    .map(|v| number(name, v))
                    .collect::<Result<Vec<_>, _>>()?;
                let pick: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
                let first = nums[0];
                Ok(Value::Num(nums.into_iter().fold(first, pick)))
            }
            "upper" | "lower" => match one_arg(name, args)? {
                Value::Str(s) if name == "upper" => Ok(Value::Str(s.to_uppercase())),
                Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
                v => Err(runtime(format!("{name}() expects a str, got '{}'", v.type_name()))),
            },
            _ => Err(runtime(format!("name '{name}' is not defined"))),
        }
    }
}

fn one_arg(name: &str, args: Vec<Value>) -> Result<Value, SandboxError> {
    let given = args.len();
    let mut iter = args.into_iter();
    match (iter.next(), iter.next()) {
        (Some(v), None) => Ok(v),
        _ => Err(runtime(format!("{name}() takes exactly one argument ({given} given)"))),
    }
}

fn number(name: &str, v: &Value) -> Result<f64, SandboxError> {
    match v {
        Value::Num(n) => Ok(*n),
        other => Err(runtime(format!("{name}() expects a number, got '{}'", other.type_name()))),
    }
}

fn binary(op: BinOp, left: Value, right: Value) -> Result<Value, SandboxError> {
    use Value::{Bool, Num, Str};

    match (op, left, right) {
        (BinOp::Eq, l, r) => Ok(Bool(l == r)),
        (BinOp::Ne, l, r) => Ok(Bool(l != r)),

        (BinOp::Add, Num(a), Num(b)) => Ok(Num(a + b)),
        (BinOp::Add, Str(a), Str(b)) => {
            if a.len() + b.len() > MAX_STRING_LEN {
                return Err(runtime("string too long"));
            }
            Ok(Str(a + &b))
        }
        (BinOp::Sub, Num(a), Num(b)) => Ok(Num(a - b)),
        (BinOp::Mul, Num(a), Num(b)) => Ok(Num(a * b)),
        (BinOp::Div, Num(_), Num(b)) if b == 0.0 => Err(runtime("division by zero")),
        (BinOp::Div, Num(a), Num(b)) => Ok(Num(a / b)),
        (BinOp::Mod, Num(_), Num(b)) if b == 0.0 => Err(runtime("modulo by zero")),
        (BinOp::Mod, Num(a), Num(b)) => Ok(Num(((a % b) + b) % b)),

        (BinOp::Lt, Num(a), Num(b)) => Ok(Bool(a < b)),
        (BinOp::Le, Num(a), Num(b)) => Ok(Bool(a <= b)),
        (BinOp::Gt, Num(a), Num(b)) => Ok(Bool(a > b)),
        (BinOp::Ge, Num(a), Num(b)) => Ok(Bool(a >= b)),
        (BinOp::Lt, Str(a), Str(b)) => Ok(Bool(a < b)),
        (BinOp::Le, Str(a), Str(b)) => Ok(Bool(a <= b)),
        (BinOp::Gt, Str(a), Str(b)) => Ok(Bool(a > b)),
        (BinOp::Ge, Str(a), Str(b)) => Ok(Bool(a >= b)),

        (op, l, r) => Err(runtime(format!(
            "unsupported operand types for {}: '{}' and '{}'",
            op.symbol(),
            l.type_name(),
            r.type_name()
        ))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> Result<Execution, SandboxError> {
        interpret(code, &AtomicBool::new(false))
    }

    fn reply(code: &str) -> String {
        run(code).unwrap().reply()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(reply("result = 2 + 3 * 4"), "14");
        assert_eq!(reply("result = (2 + 3) * 4"), "20");
        assert_eq!(reply("result = 10 / 4"), "2.5");
        assert_eq!(reply("result = -7 % 3"), "2");
    }

    #[test]
    fn no_result_binding() {
        assert_eq!(reply("x = 1"), NO_RESULT);
        assert_eq!(reply(""), NO_RESULT);
    }

    #[test]
    fn strings_and_builtins() {
        assert_eq!(reply("name = 'cube'; result = upper(name) + str(len(name))"), "CUBE4");
        assert_eq!(reply(r#"result = lower("MiXeD")"#), "mixed");
        assert_eq!(reply("result = round(3.14159, 2)"), "3.14");
        assert_eq!(reply("result = max(1, 9, 4) - min(3, 2)"), "7");
        assert_eq!(reply("result = int('42') + abs(-1)"), "43");
    }

    #[test]
    fn if_else_chain() {
        let code = "x = 7\nif x > 10 { result = 'big' } else if x > 5 { result = 'mid' }\nelse { result = 'small' }";
        assert_eq!(reply(code), "mid");
    }

    #[test]
    fn while_loop_with_compound_assignment() {
        let code = "total = 0; i = 1\nwhile i <= 10 {\n  total += i\n  i += 1\n}\nresult = total";
        assert_eq!(reply(code), "55");
    }

    #[test]
    fn boolean_logic() {
        assert_eq!(reply("result = not (1 > 2) and (True or False)"), "True");
        assert_eq!(reply("result = 1 == 1.0"), "True");
    }

    #[test]
    fn print_is_captured() {
        let exec = run("print('hello', 1 + 1); print(None)").unwrap();
        assert_eq!(exec.output, vec!["hello 2".to_string(), "None".to_string()]);
        assert_eq!(exec.result, None);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = run("open('/etc/passwd')").unwrap_err();
        assert_eq!(err.to_string(), "name 'open' is not defined");
        assert!(run("result = missing + 1").is_err());
        assert!(run("import os").is_err());
    }

    #[test]
    fn runtime_faults() {
        assert_eq!(run("result = 1 / 0").unwrap_err().to_string(), "division by zero");
        assert!(run("result = 'a' + 1").is_err());
        assert!(run("result = len(5)").is_err());
    }

    #[test]
    fn syntax_faults() {
        assert!(matches!(run("result = (1 + 2"), Err(SandboxError::Syntax(_))));
        assert!(matches!(run("x = 'open"), Err(SandboxError::Syntax(_))));
        assert!(matches!(run("x = 1 y = 2"), Err(SandboxError::Syntax(_))));
    }

    fn nested_too_deeply(code: &str) -> bool {
        matches!(
            run(code),
            Err(SandboxError::Syntax(msg)) if msg == "expression nested too deeply"
        )
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let parens = format!("result = {}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(nested_too_deeply(&parens));
        assert!(nested_too_deeply(&format!("result = {}1", "-".repeat(10_000))));
        assert!(nested_too_deeply(&format!("result = {}True", "not ".repeat(10_000))));
        assert!(nested_too_deeply(&format!("result = {}", "abs(".repeat(5_000))));
        assert!(nested_too_deeply(&format!("result = 1{}", " + 1".repeat(10_000))));
        assert!(nested_too_deeply(&format!("{}x = 1", "if True { ".repeat(5_000))));
    }

    #[test]
    fn moderate_nesting_still_runs() {
        let code = format!("result = {}2{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(reply(&code), "2");
        assert_eq!(reply(&format!("result = 0{}", " + 1".repeat(50))), "50");
        assert_eq!(reply("result = --3"), "3");
    }

    #[test]
    fn oversized_program_is_rejected() {
        let code = format!("x = 1\n{}", "# padding\n".repeat(10_000));
        assert!(matches!(run(&code), Err(SandboxError::Syntax(_))));
    }

    #[test]
    fn runaway_string_growth_is_stopped() {
        let code = "s = 'ab'\nwhile True { s = s + s }";
        assert_eq!(run(code).unwrap_err().to_string(), "string too long");
    }

    #[test]
    fn cancelled_flag_stops_execution() {
        let flag = AtomicBool::new(true);
        assert_eq!(interpret("x = 1", &flag).unwrap_err(), SandboxError::Cancelled);
    }

    #[tokio::test]
    async fn sandbox_returns_result() {
        let sandbox = Sandbox::new(Duration::from_secs(3));
        assert_eq!(sandbox.run("result = 6 * 7").await.unwrap(), "42");
    }

    #[tokio::test]
    async fn sandbox_reports_faults() {
        let sandbox = Sandbox::new(Duration::from_secs(3));
        let err = sandbox.run("result = 1 / 0").await.unwrap_err();
        assert_eq!(err.to_string(), "Error executing code: division by zero");
    }

    #[tokio::test]
    async fn deeply_nested_payload_returns_an_error() {
        let sandbox = Sandbox::new(Duration::from_secs(3));
        let code = format!("result = {}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let err = sandbox.run(&code).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error executing code: syntax error: expression nested too deeply"
        );
    }

    #[tokio::test]
    async fn infinite_loop_times_out() {
        let sandbox = Sandbox::new(Duration::from_millis(50));
        let err = sandbox.run("x = 0\nwhile True { x += 1 }").await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout { timeout_ms: 50 }));
        assert_eq!(err.to_string(), "Error: Code execution timed out.");
    }
}
