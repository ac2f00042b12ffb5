//! Resolved syntax tree model
//!
//! A [`SyntaxTree`] is the ephemeral input to the engine: one parsed,
//! semantically-resolved source file. Nodes live in an arena and are
//! addressed by [`NodeId`], which is what the traversal driver uses as
//! the identity for its SourceNode -> GraphNode map.
//!
//! Trees are produced by an external parser and can be interchanged as
//! JSON (every type here derives serde).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

macro_rules! node_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Concrete kind of a syntax tree node.
        ///
        /// This is a closed set: the schema mapper matches exhaustively
        /// over it, so adding a kind without extending the dispatch
        /// tables is a compile error rather than a silent no-op.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum NodeKind {
            $($kind,)*
        }

        impl NodeKind {
            /// The kind's name, used as the default primary label
            pub fn name(&self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind),)*
                }
            }

            /// All node kinds
            pub fn all() -> &'static [NodeKind] {
                &[$(NodeKind::$kind,)*]
            }
        }
    };
}

node_kinds! {
    AnnotationTypeDeclaration,
    AnnotationTypeMemberDeclaration,
    AnonymousClassDeclaration,
    ArrayAccess,
    ArrayCreation,
    ArrayInitializer,
    ArrayType,
    AssertStatement,
    Assignment,
    Block,
    BlockComment,
    BooleanLiteral,
    BreakStatement,
    CastExpression,
    CatchClause,
    CharacterLiteral,
    ClassInstanceCreation,
    CompilationUnit,
    ConditionalExpression,
    ConstructorInvocation,
    ContinueStatement,
    CreationReference,
    Dimension,
    DoStatement,
    EmptyStatement,
    EnhancedForStatement,
    EnumConstantDeclaration,
    EnumDeclaration,
    ExpressionMethodReference,
    ExpressionStatement,
    FieldAccess,
    FieldDeclaration,
    ForStatement,
    IfStatement,
    ImportDeclaration,
    InfixExpression,
    Initializer,
    InstanceofExpression,
    IntersectionType,
    Javadoc,
    LabeledStatement,
    LambdaExpression,
    LineComment,
    MarkerAnnotation,
    MemberRef,
    MemberValuePair,
    MethodDeclaration,
    MethodInvocation,
    MethodRef,
    MethodRefParameter,
    Modifier,
    NameQualifiedType,
    NormalAnnotation,
    NullLiteral,
    NumberLiteral,
    PackageDeclaration,
    ParameterizedType,
    ParenthesizedExpression,
    PostfixExpression,
    PrefixExpression,
    PrimitiveType,
    QualifiedName,
    QualifiedType,
    ReturnStatement,
    SimpleName,
    SimpleType,
    SingleMemberAnnotation,
    SingleVariableDeclaration,
    StringLiteral,
    SuperConstructorInvocation,
    SuperFieldAccess,
    SuperMethodInvocation,
    SwitchCase,
    SwitchStatement,
    SynchronizedStatement,
    TagElement,
    TextElement,
    ThisExpression,
    ThrowStatement,
    TryStatement,
    TypeDeclaration,
    TypeDeclarationStatement,
    TypeLiteral,
    TypeMethodReference,
    TypeParameter,
    UnionType,
    VariableDeclarationExpression,
    VariableDeclarationFragment,
    VariableDeclarationStatement,
    WhileStatement,
    WildcardType,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Typed name of a child edge.
///
/// One relation may repeat under a parent (statement lists, argument
/// lists); repeated edges form an ordered sequence, recoverable through
/// the sequence number the sink persists per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelName {
    Annotations,
    AnonymousClassDeclaration,
    Arguments,
    Array,
    Body,
    BodyDeclarations,
    Bound,
    CatchClauses,
    Comments,
    Declaration,
    Default,
    Dimensions,
    ElementType,
    ElseExpression,
    ElseStatement,
    EnumConstants,
    Exception,
    Expression,
    Expressions,
    ExtendedOperands,
    Finally,
    Fragments,
    Imports,
    Index,
    Initializer,
    Initializers,
    Javadoc,
    Label,
    LeftHandSide,
    LeftOperand,
    Message,
    Modifiers,
    Name,
    Operand,
    Package,
    Parameter,
    Parameters,
    Qualifier,
    Resources,
    ReturnType,
    RightHandSide,
    RightOperand,
    Statements,
    SuperclassType,
    SuperInterfaceTypes,
    Tags,
    ThenExpression,
    ThenStatement,
    Type,
    TypeArguments,
    TypeBounds,
    TypeName,
    TypeParameters,
    Types,
    Updaters,
    Value,
    Values,
}

impl RelName {
    /// The wire name of the relation (kebab-case)
    pub fn as_str(&self) -> &'static str {
        match self {
            RelName::Annotations => "annotations",
            RelName::AnonymousClassDeclaration => "anonymous-class-declaration",
            RelName::Arguments => "arguments",
            RelName::Array => "array",
            RelName::Body => "body",
            RelName::BodyDeclarations => "body-declarations",
            RelName::Bound => "bound",
            RelName::CatchClauses => "catch-clauses",
            RelName::Comments => "comments",
            RelName::Declaration => "declaration",
            RelName::Default => "default",
            RelName::Dimensions => "dimensions",
            RelName::ElementType => "element-type",
            RelName::ElseExpression => "else-expression",
            RelName::ElseStatement => "else-statement",
            RelName::EnumConstants => "enum-constants",
            RelName::Exception => "exception",
            RelName::Expression => "expression",
            RelName::Expressions => "expressions",
            RelName::ExtendedOperands => "extended-operands",
            RelName::Finally => "finally",
            RelName::Fragments => "fragments",
            RelName::Imports => "imports",
            RelName::Index => "index",
            RelName::Initializer => "initializer",
            RelName::Initializers => "initializers",
            RelName::Javadoc => "javadoc",
            RelName::Label => "label",
            RelName::LeftHandSide => "left-hand-side",
            RelName::LeftOperand => "left-operand",
            RelName::Message => "message",
            RelName::Modifiers => "modifiers",
            RelName::Name => "name",
            RelName::Operand => "operand",
            RelName::Package => "package",
            RelName::Parameter => "parameter",
            RelName::Parameters => "parameters",
            RelName::Qualifier => "qualifier",
            RelName::Resources => "resources",
            RelName::ReturnType => "return-type",
            RelName::RightHandSide => "right-hand-side",
            RelName::RightOperand => "right-operand",
            RelName::Statements => "statements",
            RelName::SuperclassType => "superclass-type",
            RelName::SuperInterfaceTypes => "super-interface-types",
            RelName::Tags => "tags",
            RelName::ThenExpression => "then-expression",
            RelName::ThenStatement => "then-statement",
            RelName::Type => "type",
            RelName::TypeArguments => "type-arguments",
            RelName::TypeBounds => "type-bounds",
            RelName::TypeName => "type-name",
            RelName::TypeParameters => "type-parameters",
            RelName::Types => "types",
            RelName::Updaters => "updaters",
            RelName::Value => "value",
            RelName::Values => "values",
        }
    }

    /// All relation names
    pub fn all() -> &'static [RelName] {
        use RelName::*;
        &[
            Annotations, AnonymousClassDeclaration, Arguments, Array, Body, BodyDeclarations,
            Bound, CatchClauses, Comments, Declaration, Default, Dimensions, ElementType,
            ElseExpression, ElseStatement, EnumConstants, Exception, Expression, Expressions,
            ExtendedOperands, Finally, Fragments, Imports, Index, Initializer, Initializers,
            Javadoc, Label, LeftHandSide, LeftOperand, Message, Modifiers, Name, Operand, Package,
            Parameter, Parameters, Qualifier, Resources, ReturnType, RightHandSide, RightOperand,
            Statements, SuperclassType, SuperInterfaceTypes, Tags, ThenExpression, ThenStatement,
            Type, TypeArguments, TypeBounds, TypeName, TypeParameters, Types, Updaters, Value,
            Values,
        ]
    }
}

impl FromStr for RelName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RelName::all()
            .iter()
            .find(|rel| rel.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownRelName(s.to_string()))
    }
}

impl fmt::Display for RelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a resolved semantic binding.
///
/// Exactly three kinds exist; a parser reporting anything else has hit
/// a hole in the schema mapping, which is fatal for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Type,
    Method,
    Variable,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Type => "type",
            BindingKind::Method => "method",
            BindingKind::Variable => "variable",
        }
    }
}

impl FromStr for BindingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "type" => Ok(BindingKind::Type),
            "method" => Ok(BindingKind::Method),
            "variable" => Ok(BindingKind::Variable),
            _ => Err(Error::UnknownBindingKind(s.to_string())),
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The resolved identity of a symbol a tree node refers to.
///
/// The key is stable across the whole project, independent of which
/// file or occurrence produced it; it is what the binding registry
/// deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub key: String,
    pub kind: BindingKind,
    pub name: String,
}

impl Binding {
    pub fn new(kind: BindingKind, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            name: name.into(),
        }
    }

    /// Ubiquitous built-in types with no cross-reference value.
    ///
    /// These never reach the binding registry: no shared node is
    /// created for a primitive type or for `String`.
    pub fn is_trivial(&self) -> bool {
        if self.kind != BindingKind::Type {
            return false;
        }
        matches!(
            self.name.as_str(),
            "boolean" | "byte" | "char" | "double" | "float" | "int" | "long" | "short"
                | "void" | "String"
        )
    }
}

/// An ordered child link from a parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub rel: RelName,
    pub target: NodeId,
}

/// One node of a resolved syntax tree.
///
/// Scalar payloads are optional; the schema mapper omits absent values
/// entirely (a property is never stored as a sentinel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive_type_code: Option<String>,
    /// Modifier bitmask of the owning declaration (public=1, static=8, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier_flags: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_demand: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varargs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildLink>,
}

impl SourceNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            operator: None,
            identifier: None,
            token: None,
            primitive_type_code: None,
            modifier_flags: None,
            is_static: None,
            on_demand: None,
            varargs: None,
            constructor: None,
            interface: None,
            binding: None,
            children: Vec::new(),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_primitive_type_code(mut self, code: impl Into<String>) -> Self {
        self.primitive_type_code = Some(code.into());
        self
    }

    pub fn with_modifier_flags(mut self, flags: i64) -> Self {
        self.modifier_flags = Some(flags);
        self
    }

    pub fn with_is_static(mut self, value: bool) -> Self {
        self.is_static = Some(value);
        self
    }

    pub fn with_on_demand(mut self, value: bool) -> Self {
        self.on_demand = Some(value);
        self
    }

    pub fn with_varargs(mut self, value: bool) -> Self {
        self.varargs = Some(value);
        self
    }

    pub fn with_constructor(mut self, value: bool) -> Self {
        self.constructor = Some(value);
        self
    }

    pub fn with_interface(mut self, value: bool) -> Self {
        self.interface = Some(value);
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// All children under the given relation, in source order
    pub fn children_of(&self, rel: RelName) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .filter(move |link| link.rel == rel)
            .map(|link| link.target)
    }
}

/// A resolved syntax tree for one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// Name of the originating source file
    pub filename: String,
    /// Arena of nodes; `NodeId` indexes into it
    nodes: Vec<SourceNode>,
    /// Root node of the tree
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SourceNode {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate arena consistency after deserialization: every child
    /// link must point inside the arena, and the root must exist.
    pub fn validate(&self) -> Result<()> {
        if self.root.0 as usize >= self.nodes.len() {
            return Err(Error::Tree(format!(
                "root {} out of range in '{}'",
                self.root, self.filename
            )));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            for link in &node.children {
                if link.target.0 as usize >= self.nodes.len() {
                    return Err(Error::Tree(format!(
                        "node n{} links to {} outside tree '{}'",
                        idx, link.target, self.filename
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builder for constructing syntax trees programmatically.
///
/// Used by tests and by parser front ends that hand trees over
/// in-process instead of as JSON.
#[derive(Debug)]
pub struct TreeBuilder {
    filename: String,
    nodes: Vec<SourceNode>,
}

impl TreeBuilder {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            nodes: Vec::new(),
        }
    }

    /// Add a node to the arena, returning its id
    pub fn add(&mut self, node: SourceNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Link a child to its parent under a typed relation.
    ///
    /// Links are kept in insertion order, which is the source order the
    /// traversal driver preserves when emitting edges.
    pub fn link(&mut self, parent: NodeId, rel: RelName, child: NodeId) {
        self.nodes[parent.0 as usize]
            .children
            .push(ChildLink { rel, target: child });
    }

    /// Finish the tree with the given root node
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            filename: self.filename,
            nodes: self.nodes,
            root,
        }
    }
}
