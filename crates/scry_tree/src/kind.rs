//! The closed set of ESTree node kinds.
//!
//! Kinds are compared by the matcher (only same-kind nodes pair up) and
//! decide how the labeler names a node. Adding a kind means adding it here;
//! every `match` on `NodeKind` then has to handle it.

/// How a node of a given kind gets its label.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Name of the identifier, preferably as written in the original source.
    Identifier,
    /// Raw source text of the literal.
    Raw,
    /// No label; only kind and children matter.
    Unlabeled,
}

macro_rules! node_kinds {
    ($($kind:ident),* $(,)?) => {
        /// ESTree node type.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum NodeKind {
            $($kind,)*
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$kind,)*];

            /// The ESTree `type` string.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind),)*
                }
            }

            /// Parse an ESTree `type` string.
            pub fn from_estree_type(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($kind) => Some(NodeKind::$kind),)*
                    _ => None,
                }
            }
        }
    };
}

node_kinds! {
    Program,

    // Leaves
    Identifier,
    PrivateIdentifier,
    Literal,
    ThisExpression,
    Super,
    TemplateElement,

    // Statements
    ExpressionStatement,
    BlockStatement,
    StaticBlock,
    EmptyStatement,
    DebuggerStatement,
    WithStatement,
    ReturnStatement,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    IfStatement,
    SwitchStatement,
    SwitchCase,
    ThrowStatement,
    TryStatement,
    CatchClause,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,

    // Declarations
    FunctionDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    ClassDeclaration,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,

    // Expressions
    ArrayExpression,
    ObjectExpression,
    Property,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassExpression,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    AssignmentExpression,
    LogicalExpression,
    MemberExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    SequenceExpression,
    YieldExpression,
    AwaitExpression,
    TemplateLiteral,
    TaggedTemplateExpression,
    SpreadElement,
    ChainExpression,
    ImportExpression,
    MetaProperty,
    ParenthesizedExpression,

    // Patterns
    ObjectPattern,
    ArrayPattern,
    RestElement,
    AssignmentPattern,

    // Modules
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ImportAttribute,
    ExportNamedDeclaration,
    ExportSpecifier,
    ExportDefaultDeclaration,
    ExportAllDeclaration,
}

impl NodeKind {
    pub const fn label_policy(self) -> LabelPolicy {
        match self {
            NodeKind::Identifier | NodeKind::PrivateIdentifier => LabelPolicy::Identifier,
            NodeKind::Literal | NodeKind::TemplateElement => LabelPolicy::Raw,
            _ => LabelPolicy::Unlabeled,
        }
    }

    /// Statement-level kinds, the ones statement sets are anchored on.
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::ExpressionStatement
                | NodeKind::BlockStatement
                | NodeKind::EmptyStatement
                | NodeKind::DebuggerStatement
                | NodeKind::WithStatement
                | NodeKind::ReturnStatement
                | NodeKind::LabeledStatement
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::IfStatement
                | NodeKind::SwitchStatement
                | NodeKind::ThrowStatement
                | NodeKind::TryStatement
                | NodeKind::WhileStatement
                | NodeKind::DoWhileStatement
                | NodeKind::ForStatement
                | NodeKind::ForInStatement
                | NodeKind::ForOfStatement
                | NodeKind::FunctionDeclaration
                | NodeKind::VariableDeclaration
                | NodeKind::ClassDeclaration
        )
    }
}
