use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast_printer::Ast;
use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::LoxError;
use crate::expr::{Expr, ExprId};
use crate::function::{clock_native, LoxFunction};
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non-local control flow during evaluation.
///
/// `return` and runtime errors both unwind through statement execution;
/// `Return` is caught at the nearest active call, `Error` at the top-level
/// run.
#[derive(Debug)]
pub enum Unwind {
    Return(Value),
    Error(LoxError),
}

impl From<LoxError> for Unwind {
    fn from(e: LoxError) -> Self {
        Unwind::Error(e)
    }
}

type Exec<T> = std::result::Result<T, Unwind>;

/// Shared output sink: stdout/stderr in the binary, byte buffers in tests.
pub type SharedWriter = Rc<RefCell<dyn Write>>;

/// The tree-walking evaluator and pipeline driver.
///
/// One instance owns the globals frame, the resolution table, and the
/// output writers.  Reusing an instance across `run` calls preserves
/// globals, which is what gives the REPL its session semantics.
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    out: SharedWriter,
    err_out: SharedWriter,
    repl: bool,
    had_compile_error: bool,
    had_runtime_error: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_writers(
            Rc::new(RefCell::new(io::stdout())),
            Rc::new(RefCell::new(io::stderr())),
        )
    }

    /// Builds an interpreter with explicit program-output and diagnostic
    /// writers.
    pub fn with_writers(out: SharedWriter, err_out: SharedWriter) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
            err_out,
            repl: false,
            had_compile_error: false,
            had_runtime_error: false,
        }
    }

    /// In REPL mode a line holding a single expression statement echoes
    /// the expression's value to the output writer.
    pub fn set_repl(&mut self, repl: bool) {
        self.repl = repl;
    }

    pub fn had_compile_error(&self) -> bool {
        self.had_compile_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Runs one source text through the whole pipeline.
    ///
    /// Diagnostics go to the error writer; the caller inspects the error
    /// flags afterwards.  Globals persist from one call to the next.
    pub fn run(&mut self, source: &str) {
        self.had_compile_error = false;
        self.had_runtime_error = false;

        let Some(statements) = self.compile(source) else {
            return;
        };

        if self.repl {
            if let [Stmt::Expression(expr)] = &statements[..] {
                match self.evaluate(expr) {
                    Ok(value) => {
                        let _ = writeln!(self.out.borrow_mut(), "{}", value);
                    }
                    Err(Unwind::Error(e)) => self.report_runtime(&e),
                    Err(Unwind::Return(_)) => {}
                }
                return;
            }
        }

        self.interpret(&statements);
    }

    /// Scans and parses only, dumping each statement's tree form.
    pub fn run_parse_only(&mut self, source: &str) {
        self.had_compile_error = false;
        self.had_runtime_error = false;

        let Some(statements) = self.scan_and_parse(source) else {
            return;
        };

        let printer = Ast;
        for statement in &statements {
            let _ = writeln!(self.out.borrow_mut(), "{}", printer.print_stmt(statement));
        }
    }

    fn scan_and_parse(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let scanner = Scanner::new(source);

        let mut tokens: Vec<Token> = Vec::new();
        for item in scanner {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => self.report_compile(&e),
            }
        }

        // a broken token stream is not worth parsing
        if self.had_compile_error {
            return None;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        for e in parser.errors() {
            let _ = writeln!(self.err_out.borrow_mut(), "{}", e);
        }
        if parser.had_error() {
            self.had_compile_error = true;
            return None;
        }

        Some(statements)
    }

    fn compile(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let statements = self.scan_and_parse(source)?;

        let mut resolver = Resolver::new(self);
        resolver.resolve(&statements);
        let errors = resolver.finish();

        for e in &errors {
            self.report_compile(e);
        }
        if self.had_compile_error {
            return None;
        }

        Some(statements)
    }

    fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}

                Err(Unwind::Error(e)) => {
                    self.report_runtime(&e);
                    return;
                }

                // the resolver rejects top-level returns
                Err(Unwind::Return(_)) => return,
            }
        }
    }

    fn report_compile(&mut self, e: &LoxError) {
        let _ = writeln!(self.err_out.borrow_mut(), "{}", e);
        self.had_compile_error = true;
    }

    fn report_runtime(&mut self, e: &LoxError) {
        let _ = writeln!(self.err_out.borrow_mut(), "{}", e);
        self.had_runtime_error = true;
    }

    /// Resolver callback: notes that this expression refers to a local
    /// `depth` frames up from wherever it executes.
    pub(crate) fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.out.borrow_mut(), "{}", value).map_err(LoxError::from)?;

                Ok(())
            }

            Stmt::Var(name, initializer) => {
                let value: Value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, environment)
            }

            Stmt::If(condition, then_branch, else_branch) => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While(condition, body) => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Return(_, value) => {
                let value: Value = if let Some(expr) = value {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                Err(Unwind::Return(value))
            }

            Stmt::Function(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Class(name, superclass, methods) => {
                let superclass_class: Option<Rc<LoxClass>> = match superclass {
                    Some(expr) => {
                        let value = self.evaluate(expr)?;

                        match value {
                            Value::Class(class) => Some(class),

                            _ => {
                                let token = match expr {
                                    Expr::Variable { name, .. } => name,
                                    _ => name,
                                };

                                return Err(LoxError::runtime(
                                    token,
                                    "Superclass must be a class.",
                                )
                                .into());
                            }
                        }
                    }

                    None => None,
                };

                // the name is bound before the methods are built so they
                // can refer to the class itself
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let method_closure = if let Some(ref superclass_class) = superclass_class {
                    let mut environment =
                        Environment::with_enclosing(Rc::clone(&self.environment));
                    environment.define("super", Value::Class(Rc::clone(superclass_class)));
                    Rc::new(RefCell::new(environment))
                } else {
                    Rc::clone(&self.environment)
                };

                let mut method_table: HashMap<String, LoxFunction> = HashMap::new();
                for method in methods {
                    let is_initializer = method.name.lexeme == "init";
                    let function = LoxFunction::new(
                        Rc::clone(method),
                        Rc::clone(&method_closure),
                        is_initializer,
                    );
                    method_table.insert(method.name.lexeme.clone(), function);
                }

                let class = LoxClass::new(name.lexeme.clone(), superclass_class, method_table);

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;

                Ok(())
            }
        }
    }

    /// Runs `statements` in `environment`, restoring the previous frame on
    /// every exit path, unwinds included.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Exec<()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result: Exec<()> = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    fn evaluate(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Literal { value } => self.evaluate_literal(value),

            Expr::Grouping { expression } => self.evaluate(expression),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => Environment::assign_at(
                        &self.environment,
                        *distance,
                        name,
                        value.clone(),
                    )?,

                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut argument_values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    argument_values.push(self.evaluate(argument)?);
                }

                self.call_value(callee, argument_values, paren)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let field = instance.borrow().get_field(&name.lexeme);
                        if let Some(value) = field {
                            return Ok(value);
                        }

                        let class = Rc::clone(&instance.borrow().class);
                        match class.find_method(&name.lexeme) {
                            Some(method) => Ok(Value::Function(Rc::new(
                                method.bind(Value::Instance(Rc::clone(&instance))),
                            ))),

                            None => Err(LoxError::runtime(
                                name,
                                format!("Undefined field or method '{}'.", name.lexeme),
                            )
                            .into()),
                        }
                    }

                    _ => Err(
                        LoxError::runtime(name, "Only class instances have fields.").into(),
                    ),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;

                        instance
                            .borrow_mut()
                            .set_field(&name.lexeme, value.clone());

                        Ok(value)
                    }

                    _ => Err(
                        LoxError::runtime(name, "Only class instances have fields.").into(),
                    ),
                }
            }

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Super {
                id,
                keyword,
                method,
            } => {
                let distance = match self.locals.get(id) {
                    Some(distance) => *distance,
                    None => {
                        return Err(LoxError::runtime(
                            keyword,
                            "Undefined variable 'super'.",
                        )
                        .into())
                    }
                };

                let superclass = match Environment::get_at(&self.environment, distance, "super")
                {
                    Some(Value::Class(class)) => class,
                    _ => {
                        return Err(LoxError::runtime(
                            keyword,
                            "Undefined variable 'super'.",
                        )
                        .into())
                    }
                };

                // the instance lives one frame inside the 'super' frame
                let object = match Environment::get_at(
                    &self.environment,
                    distance.saturating_sub(1),
                    "this",
                ) {
                    Some(instance @ Value::Instance(_)) => instance,
                    _ => {
                        return Err(LoxError::runtime(
                            keyword,
                            "Undefined variable 'this'.",
                        )
                        .into())
                    }
                };

                match superclass.find_method(&method.lexeme) {
                    Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),

                    None => Err(LoxError::runtime(
                        method,
                        format!("Undefined method '{}'.", method.lexeme),
                    )
                    .into()),
                }
            }
        }
    }

    fn evaluate_literal(&self, token: &Token) -> Exec<Value> {
        match &token.token_type {
            TokenType::NUMBER(n) => Ok(Value::Number(*n)),

            TokenType::STRING(s) => Ok(Value::String(s.clone())),

            TokenType::TRUE => Ok(Value::Bool(true)),

            TokenType::FALSE => Ok(Value::Bool(false)),

            TokenType::NIL => Ok(Value::Nil),

            _ => Err(LoxError::runtime(token, "Invalid literal.").into()),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Exec<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(LoxError::runtime(operator, "Operand must be a number.").into()),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.").into()),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Exec<Value> {
        let left_value: Value = self.evaluate(left)?;

        // the deciding operand is returned unchanged, not coerced to bool
        match operator.token_type {
            TokenType::OR => {
                if is_truthy(&left_value) {
                    return Ok(left_value);
                }
            }

            _ => {
                if !is_truthy(&left_value) {
                    return Ok(left_value);
                }
            }
        }

        self.evaluate(right)
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Exec<Value> {
        let left_value: Value = self.evaluate(left)?;
        let right_value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                // one string operand is enough: the other side is
                // stringified and concatenated
                (a, b)
                    if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) =>
                {
                    Ok(Value::String(format!("{}{}", a, b)))
                }

                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or at least one string.",
                )
                .into()),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left_value, &right_value)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_value == right_value)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_value != right_value)),

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.").into()),
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Exec<Value> {
        match self.locals.get(&id) {
            Some(distance) => Environment::get_at(&self.environment, *distance, &name.lexeme)
                .ok_or_else(|| {
                    Unwind::Error(LoxError::runtime(
                        name,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ))
                }),

            None => self.globals.borrow().get(name).map_err(Unwind::from),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Calls
    // ─────────────────────────────────────────────────────────────────────

    fn call_value(&mut self, callee: Value, arguments: Vec<Value>, paren: &Token) -> Exec<Value> {
        match callee {
            Value::NativeFunction { arity, func, .. } => {
                check_arity(arity, arguments.len(), paren)?;

                func(&arguments).map_err(Unwind::from)
            }

            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;

                self.call_function(&function, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;

                self.instantiate(&class, arguments)
            }

            _ => Err(LoxError::runtime(paren, "Can only call functions and classes.").into()),
        }
    }

    /// Invokes a user function: fresh frame on the captured closure,
    /// parameters bound in order, `return` caught here.  Initializers
    /// always yield their bound `this`, whatever the body did.
    pub(crate) fn call_function(
        &mut self,
        function: &LoxFunction,
        arguments: Vec<Value>,
    ) -> Exec<Value> {
        debug!("Calling '{}'", function.name());

        let mut environment = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }
        let environment = Rc::new(RefCell::new(environment));

        match self.execute_block(&function.declaration.body, environment) {
            Err(Unwind::Return(value)) => {
                if function.is_initializer {
                    self.bound_this(function)
                } else {
                    Ok(value)
                }
            }

            Err(e) => Err(e),

            Ok(()) => {
                if function.is_initializer {
                    self.bound_this(function)
                } else {
                    Ok(Value::Nil)
                }
            }
        }
    }

    fn bound_this(&self, function: &LoxFunction) -> Exec<Value> {
        Environment::get_at(&function.closure, 0, "this").ok_or_else(|| {
            Unwind::Error(LoxError::runtime(
                &function.declaration.name,
                "Undefined variable 'this'.",
            ))
        })
    }

    fn instantiate(&mut self, class: &Rc<LoxClass>, arguments: Vec<Value>) -> Exec<Value> {
        info!("Instantiating class '{}'", class.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

        if let Some(initializer) = class.find_method("init") {
            let bound = initializer.bind(Value::Instance(Rc::clone(&instance)));
            self.call_function(&bound, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// nil and false are falsey; everything else, zero and empty string
/// included, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Exec<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),

        _ => Err(LoxError::runtime(operator, "Operand must be a number.").into()),
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Exec<()> {
    if expected != got {
        return Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        )
        .into());
    }

    Ok(())
}
