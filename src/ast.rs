use std::rc::Rc;

use crate::location::Location;

/// A function parameter. `splat` marks the single parameter (at most one
/// per functor, enforced by the parser) that captures any remaining
/// positional arguments as a `List`.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Rc<str>,
    pub splat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl std::fmt::Display for RelOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqOp {
    Eq,
    NotEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

/// A single flat node tree rather than a `Stmt`/`Expr` split: every
/// construct in the language, from a literal to a function call, is a
/// `Node`, and `Evaluator::eval_node` dispatches on `NodeKind` with one
/// big `match` rather than a visitor hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub loc: Location,
}

impl Node {
    pub fn new(kind: NodeKind, loc: Location) -> Rc<Node> {
        Rc::new(Node { kind, loc })
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(Rc<str>),
    /// A string literal containing one or more `<expr>` interpolation
    /// segments. A plain `StringLiteral` is just the degenerate one-part
    /// case and is produced directly by the parser instead of wrapping it
    /// here, so the common case never pays for a `Vec` of one.
    InterpolatedStringLiteral(Vec<Rc<Node>>),
    SymbolLiteral(Rc<str>),
    BooleanLiteral(bool),
    NilLiteral,

    ListLiteral(Vec<Rc<Node>>),
    MapLiteral(Vec<(Rc<Node>, Rc<Node>)>),

    VariableReference(Rc<str>),
    ConstReference(Rc<str>),

    /// `<expr>` used as an expression (string interpolation component) or
    /// as a pattern (see the pattern kinds below, which reuse this node
    /// when `<expr>` appears where a pattern is expected).
    InterpolationExpression(Rc<Node>),

    SimpleAssignment {
        name: Rc<str>,
        value: Rc<Node>,
    },
    /// `=:` destructuring match-assignment. `pattern` is built from the
    /// dedicated pattern node kinds below plus literals/`ConstReference`/
    /// `InterpolationExpression`, which double as patterns; see
    /// `matcher.rs`.
    MatchAssign {
        pattern: Rc<Node>,
        value: Rc<Node>,
    },

    /// A bare identifier used as a pattern target — binds the matched
    /// value. A leading underscore carries no special evaluator behavior
    /// (§4.4: "same as identifier"); it is purely a human convention the
    /// parser does not need to special-case.
    BindingPattern(Rc<str>),
    /// `*name` inside a list pattern — captures the middle slice.
    SplatPattern(Rc<str>),
    ListPattern(Vec<Rc<Node>>),
    MapPattern(Vec<(Rc<Node>, Rc<Node>)>),
    /// A bare `Const` name used as a pattern (§4.4): resolved the same
    /// way `ConstReference` is, then branched on whether the resolved
    /// value is itself a `Type` (type check) or an ordinary value
    /// (literal match).
    ConstPattern(Rc<str>),

    LogicalExpression {
        op: LogicOp,
        left: Rc<Node>,
        right: Rc<Node>,
    },
    EqualityExpression {
        op: EqOp,
        left: Rc<Node>,
        right: Rc<Node>,
    },
    RelationalExpression {
        op: RelOp,
        left: Rc<Node>,
        right: Rc<Node>,
    },
    BinaryExpression {
        op: ArithOp,
        left: Rc<Node>,
        right: Rc<Node>,
    },
    UnaryExpression {
        op: UnaryOp,
        operand: Rc<Node>,
    },

    FunctionDefinition {
        name: Rc<str>,
        params: Vec<Param>,
        body: Rc<Node>,
    },
    /// The callee is always a bare identifier (§4.3): resolved against the
    /// function table, never against an arbitrary expression.
    FunctionCall {
        name: Rc<str>,
        args: Vec<Rc<Node>>,
    },

    Block(Vec<Rc<Node>>),
    /// A parenthesized sequence of two or more statements (`(a; b; c)`),
    /// distinct from `Block` in that it occurs in expression position
    /// rather than delimiting a function body or program. Evaluates the
    /// same way `Block` does: children run in order, all but the last
    /// result are discarded.
    ExpressionList(Vec<Rc<Node>>),
}

impl NodeKind {
    /// A short, cheap tag for the node kind, used by `eval.rs`'s per-node
    /// trace logging so the hot dispatch path never pays for formatting a
    /// whole (potentially deep) `NodeKind` just to log which arm ran.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::IntegerLiteral(_) => "IntegerLiteral",
            NodeKind::FloatLiteral(_) => "FloatLiteral",
            NodeKind::StringLiteral(_) => "StringLiteral",
            NodeKind::InterpolatedStringLiteral(_) => "InterpolatedStringLiteral",
            NodeKind::SymbolLiteral(_) => "SymbolLiteral",
            NodeKind::BooleanLiteral(_) => "BooleanLiteral",
            NodeKind::NilLiteral => "NilLiteral",
            NodeKind::ListLiteral(_) => "ListLiteral",
            NodeKind::MapLiteral(_) => "MapLiteral",
            NodeKind::VariableReference(_) => "VariableReference",
            NodeKind::ConstReference(_) => "ConstReference",
            NodeKind::InterpolationExpression(_) => "InterpolationExpression",
            NodeKind::SimpleAssignment { .. } => "SimpleAssignment",
            NodeKind::MatchAssign { .. } => "MatchAssign",
            NodeKind::BindingPattern(_) => "BindingPattern",
            NodeKind::SplatPattern(_) => "SplatPattern",
            NodeKind::ListPattern(_) => "ListPattern",
            NodeKind::MapPattern(_) => "MapPattern",
            NodeKind::ConstPattern(_) => "ConstPattern",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::EqualityExpression { .. } => "EqualityExpression",
            NodeKind::RelationalExpression { .. } => "RelationalExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::FunctionDefinition { .. } => "FunctionDefinition",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::Block(_) => "Block",
            NodeKind::ExpressionList(_) => "ExpressionList",
        }
    }
}
