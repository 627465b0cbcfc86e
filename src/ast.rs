//! Abstract Syntax Tree types
//!
//! Identifiers and static member names carry an interned `PropertyKey`, so
//! the hash used by every scope and property lookup is computed once, by the
//! parser. Function bodies are shared behind `Rc` and carry the names the
//! evaluator hoists before running them.

use std::rc::Rc;

use crate::lexer::Span;
use crate::value::{JsString, PropertyKey};

/// A complete program
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Rc<[Statement]>,
    pub declarations: Declarations,
}

/// Names hoisted to the top of a program, function or eval body.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    /// `var` names in declaration order, without duplicates
    pub vars: Vec<PropertyKey>,
    /// Function declarations, instantiated before any statement runs
    pub functions: Vec<Rc<FunctionCode>>,
}

impl Declarations {
    pub(crate) fn declare_var(&mut self, name: &PropertyKey) {
        if !self.vars.contains(name) {
            self.vars.push(name.clone());
        }
    }
}

/// The shared, immutable code of a function declaration or expression.
#[derive(Debug)]
pub struct FunctionCode {
    pub name: Option<PropertyKey>,
    pub params: Vec<PropertyKey>,
    pub body: Vec<Statement>,
    pub declarations: Declarations,
    pub span: Span,
}

// ============ STATEMENTS ============

#[derive(Debug, Clone)]
pub enum Statement {
    VariableDeclaration(VariableDeclaration),
    /// Hoisted; executing the statement itself does nothing.
    FunctionDeclaration(Rc<FunctionCode>),

    // Control Flow
    Block(BlockStatement),
    If(IfStatement),
    Switch(SwitchStatement),
    For(ForStatement),
    ForIn(ForInStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    With(WithStatement),
    Try(TryStatement),

    // Jump
    Return(ReturnStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Throw(ThrowStatement),

    // Other
    Expression(ExpressionStatement),
    Empty(Span),
    Labeled(LabeledStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDeclaration(v) => v.span,
            Statement::FunctionDeclaration(f) => f.span,
            Statement::Block(b) => b.span,
            Statement::If(i) => i.span,
            Statement::Switch(s) => s.span,
            Statement::For(f) => f.span,
            Statement::ForIn(f) => f.span,
            Statement::While(w) => w.span,
            Statement::DoWhile(d) => d.span,
            Statement::With(w) => w.span,
            Statement::Try(t) => t.span,
            Statement::Return(r) => r.span,
            Statement::Break(b) => b.span,
            Statement::Continue(c) => c.span,
            Statement::Throw(t) => t.span,
            Statement::Expression(e) => e.span,
            Statement::Empty(s) => *s,
            Statement::Labeled(l) => l.span,
        }
    }

    /// Originating source line, used for error frames.
    pub fn line(&self) -> u32 {
        self.span().line
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: PropertyKey,
    pub init: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone)]
pub struct ForInStatement {
    pub left: ForInLeft,
    pub right: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ForInLeft {
    /// `for (var x in o)`, optionally with an initializer
    Variable(VariableDeclarator),
    /// `for (lhs in o)`
    Target(Expression),
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DoWhileStatement {
    pub body: Box<Statement>,
    pub test: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WithStatement {
    pub object: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryStatement {
    pub block: BlockStatement,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStatement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: PropertyKey,
    pub body: BlockStatement,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStatement {
    pub label: Option<PropertyKey>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStatement {
    pub label: Option<PropertyKey>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ThrowStatement {
    pub argument: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LabeledStatement {
    pub label: PropertyKey,
    pub body: Box<Statement>,
    pub span: Span,
}

// ============ EXPRESSIONS ============

#[derive(Debug, Clone)]
pub enum Expression {
    // Literals
    Literal(Literal),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(FunctionExpression),

    // Identifiers
    Identifier(Identifier),
    This(Span),

    // Operations
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Conditional(ConditionalExpression),
    Assignment(AssignmentExpression),
    Update(UpdateExpression),
    Sequence(SequenceExpression),

    // Access
    Member(MemberExpression),
    Call(CallExpression),
    New(NewExpression),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(l) => l.span,
            Expression::Array(a) => a.span,
            Expression::Object(o) => o.span,
            Expression::Function(f) => f.span,
            Expression::Identifier(i) => i.span,
            Expression::This(s) => *s,
            Expression::Unary(u) => u.span,
            Expression::Binary(b) => b.span,
            Expression::Logical(l) => l.span,
            Expression::Conditional(c) => c.span,
            Expression::Assignment(a) => a.span,
            Expression::Update(u) => u.span,
            Expression::Sequence(s) => s.span,
            Expression::Member(m) => m.span,
            Expression::Call(c) => c.span,
            Expression::New(n) => n.span,
        }
    }

    pub fn line(&self) -> u32 {
        self.span().line
    }
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: PropertyKey,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayExpression {
    /// `None` marks an elision (`[1,,3]`)
    pub elements: Vec<Option<Expression>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectExpression {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionExpression {
    pub code: Rc<FunctionCode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub operator: UnaryOp,
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof, // typeof
    Void,   // void
    Delete, // delete
}

#[derive(Debug, Clone)]
pub struct BinaryExpression {
    pub operator: BinaryOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %

    // Comparison
    Eq,       // ==
    NotEq,    // !=
    StrictEq, // ===
    StrictNotEq, // !==
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=

    // Bitwise
    BitAnd, // &
    BitOr,  // |
    BitXor, // ^
    LShift, // <<
    RShift, // >>
    URShift, // >>>

    // Other
    In,         // in
    Instanceof, // instanceof
}

#[derive(Debug, Clone)]
pub struct LogicalExpression {
    pub operator: LogicalOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And, // &&
    Or,  // ||
}

#[derive(Debug, Clone)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpression {
    pub operator: AssignmentOp,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,       // =
    AddAssign,    // +=
    SubAssign,    // -=
    MulAssign,    // *=
    DivAssign,    // /=
    ModAssign,    // %=
    LShiftAssign, // <<=
    RShiftAssign, // >>=
    URShiftAssign, // >>>=
    BitAndAssign, // &=
    BitOrAssign,  // |=
    BitXorAssign, // ^=
}

impl AssignmentOp {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary_op(self) -> Option<BinaryOp> {
        Some(match self {
            AssignmentOp::Assign => return None,
            AssignmentOp::AddAssign => BinaryOp::Add,
            AssignmentOp::SubAssign => BinaryOp::Sub,
            AssignmentOp::MulAssign => BinaryOp::Mul,
            AssignmentOp::DivAssign => BinaryOp::Div,
            AssignmentOp::ModAssign => BinaryOp::Mod,
            AssignmentOp::LShiftAssign => BinaryOp::LShift,
            AssignmentOp::RShiftAssign => BinaryOp::RShift,
            AssignmentOp::URShiftAssign => BinaryOp::URShift,
            AssignmentOp::BitAndAssign => BinaryOp::BitAnd,
            AssignmentOp::BitOrAssign => BinaryOp::BitOr,
            AssignmentOp::BitXorAssign => BinaryOp::BitXor,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateExpression {
    pub operator: UpdateOp,
    pub prefix: bool,
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment, // ++
    Decrement, // --
}

#[derive(Debug, Clone)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: MemberProperty,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum MemberProperty {
    /// `.name`, resolved at parse time
    Identifier(PropertyKey),
    /// `[expr]`
    Expression(Box<Expression>),
}

#[derive(Debug, Clone)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}
