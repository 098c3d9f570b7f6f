// AST (Abstract Syntax Tree) definitions for the restricted expression language

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Binary operators, in the order of the precedence table (low to high)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Additive
    Add,
    Sub,
    // Multiplicative
    Mul,
    Div,
    // Membership
    In,
    // Range
    Range,
    // Exponent (right-associative)
    Pow,
}

impl BinOp {
    /// The operator as written in R source.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::In => "%in%",
            BinOp::Range => ":",
            BinOp::Pow => "^",
        }
    }
}

/// Whether a numeric literal carried the `L` integer suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Double,
}

/// Quote character a string literal was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            _ => None,
        }
    }
}

/// A function-call argument, optionally named (`name = value`)
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: AstNode,
}

impl Argument {
    pub fn positional(value: AstNode) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: AstNode) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// AST nodes of a single expression or formula
///
/// Nodes are built once by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// `A$B$C.D`, one entry per `$`-separated identifier
    Symbol {
        segments: Vec<String>,
        location: SourceLocation,
    },
    /// Raw literal text, sign and `L` suffix included
    NumberLiteral {
        text: String,
        kind: NumberKind,
        location: SourceLocation,
    },
    /// Literal body without its surrounding quotes
    StringLiteral {
        text: String,
        quote: Quote,
        location: SourceLocation,
    },
    /// `base[...]`; `None` marks an open slot ("all along that dimension").
    /// Holds 0, 1 or 2 slots.
    Subset {
        base: Box<AstNode>,
        indices: Vec<Option<AstNode>>,
        location: SourceLocation,
    },
    Formula {
        lhs: Option<Box<AstNode>>,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionCall {
        name: String,
        args: Vec<Argument>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    /// Parenthesized expression; only formulas and native ranges keep the parentheses
    Group {
        inner: Box<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> &SourceLocation {
        match self {
            AstNode::Symbol { location, .. } => location,
            AstNode::NumberLiteral { location, .. } => location,
            AstNode::StringLiteral { location, .. } => location,
            AstNode::Subset { location, .. } => location,
            AstNode::Formula { location, .. } => location,
            AstNode::FunctionCall { location, .. } => location,
            AstNode::BinaryOp { location, .. } => location,
            AstNode::Group { location, .. } => location,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, AstNode::Formula { .. })
    }
}
