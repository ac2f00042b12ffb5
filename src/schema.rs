//! Schema mapper - the node-kind dispatch table
//!
//! For every concrete [`NodeKind`] this module decides:
//! - the primary label (a few kinds are renamed for readability:
//!   `TypeDeclaration` becomes `Class`, and so on)
//! - the structural capability labels (statement, expression, type, ...)
//! - the scalar properties extracted from the node, with absent values
//!   omitted entirely
//! - the ordered child-edge spec
//! - whether the node is materialize-then-delete (comments, doc nodes,
//!   modifier tokens)
//!
//! Everything here is pure data and pure functions over the closed
//! `NodeKind` enum; every match is exhaustive, so an unmapped kind is a
//! compile error, not a silent no-op.

use crate::ast::{BindingKind, NodeId, NodeKind, RelName, SourceNode, SyntaxTree};
use crate::sink::PropValue;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Labels assignable to graph nodes beyond the per-kind primary label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    // binding labels
    Binding,
    TypeBinding,
    MethodBinding,
    VariableBinding,

    // structural capability labels
    BodyDeclaration,
    AbstractTypeDeclaration,
    Comment,
    Expression,
    Annotation,
    Name,
    Statement,
    Type,
    VariableDeclaration,

    // project root
    Project,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Binding => "Binding",
            NodeLabel::TypeBinding => "TypeBinding",
            NodeLabel::MethodBinding => "MethodBinding",
            NodeLabel::VariableBinding => "VariableBinding",
            NodeLabel::BodyDeclaration => "BodyDeclaration",
            NodeLabel::AbstractTypeDeclaration => "AbstractTypeDeclaration",
            NodeLabel::Comment => "Comment",
            NodeLabel::Expression => "Expression",
            NodeLabel::Annotation => "Annotation",
            NodeLabel::Name => "Name",
            NodeLabel::Statement => "Statement",
            NodeLabel::Type => "Type",
            NodeLabel::VariableDeclaration => "VariableDeclaration",
            NodeLabel::Project => "Project",
        }
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind-specific subtype label for a binding node
pub fn binding_label(kind: BindingKind) -> NodeLabel {
    match kind {
        BindingKind::Type => NodeLabel::TypeBinding,
        BindingKind::Method => NodeLabel::MethodBinding,
        BindingKind::Variable => NodeLabel::VariableBinding,
    }
}

/// Labels produced for one node kind
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    /// Primary label; the kind's name unless renamed for readability
    pub primary: &'static str,
    /// Structural capability labels; membership-based, so a node can
    /// carry several at once
    pub capabilities: &'static [NodeLabel],
}

/// Classify a node kind into its primary and capability labels
pub fn classify(kind: NodeKind) -> Classification {
    Classification {
        primary: primary_label(kind),
        capabilities: capabilities(kind),
    }
}

fn primary_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::TypeDeclaration => "Class",
        NodeKind::MethodDeclaration => "Method",
        NodeKind::FieldDeclaration => "Field",
        other => other.name(),
    }
}

fn capabilities(kind: NodeKind) -> &'static [NodeLabel] {
    use NodeKind::*;
    use NodeLabel::*;
    match kind {
        SimpleName | QualifiedName => &[Expression, Name],

        MarkerAnnotation | NormalAnnotation | SingleMemberAnnotation => &[Expression, Annotation],

        ArrayAccess | ArrayCreation | ArrayInitializer | Assignment | BooleanLiteral
        | CastExpression | CharacterLiteral | ClassInstanceCreation | ConditionalExpression
        | CreationReference | ExpressionMethodReference | FieldAccess | InfixExpression
        | InstanceofExpression | LambdaExpression | MethodInvocation | NullLiteral
        | NumberLiteral | ParenthesizedExpression | PostfixExpression | PrefixExpression
        | StringLiteral | SuperFieldAccess | SuperMethodInvocation | ThisExpression
        | TypeLiteral | TypeMethodReference | VariableDeclarationExpression => &[Expression],

        AssertStatement | Block | BreakStatement | ConstructorInvocation | ContinueStatement
        | DoStatement | EmptyStatement | EnhancedForStatement | ExpressionStatement
        | ForStatement | IfStatement | LabeledStatement | ReturnStatement
        | SuperConstructorInvocation | SwitchCase | SwitchStatement | SynchronizedStatement
        | ThrowStatement | TryStatement | TypeDeclarationStatement
        | VariableDeclarationStatement | WhileStatement => &[Statement],

        ArrayType | IntersectionType | NameQualifiedType | ParameterizedType | PrimitiveType
        | QualifiedType | SimpleType | UnionType | WildcardType => &[Type],

        TypeDeclaration | EnumDeclaration | AnnotationTypeDeclaration => {
            &[BodyDeclaration, AbstractTypeDeclaration]
        }

        AnnotationTypeMemberDeclaration | EnumConstantDeclaration | FieldDeclaration
        | Initializer | MethodDeclaration => &[BodyDeclaration],

        LineComment | BlockComment | Javadoc => &[Comment],

        SingleVariableDeclaration | VariableDeclarationFragment => &[VariableDeclaration],

        AnonymousClassDeclaration | CatchClause | CompilationUnit | Dimension
        | ImportDeclaration | MemberRef | MemberValuePair | MethodRef | MethodRefParameter
        | Modifier | PackageDeclaration | TagElement | TextElement | TypeParameter => &[],
    }
}

/// Whether a node kind is materialize-then-delete.
///
/// Comment, documentation and modifier nodes are created for traversal
/// uniformity and deleted at Exit, before any edge could reference
/// them. Modifier information survives as the `MODIFIERS` bitmask on
/// the owning declaration instead.
pub fn is_discard(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::LineComment
            | NodeKind::BlockComment
            | NodeKind::Javadoc
            | NodeKind::TagElement
            | NodeKind::TextElement
            | NodeKind::Modifier
    )
}

fn push_text(props: &mut Vec<(&'static str, PropValue)>, name: &'static str, v: &Option<String>) {
    if let Some(v) = v {
        props.push((name, PropValue::Text(v.clone())));
    }
}

fn push_bool(props: &mut Vec<(&'static str, PropValue)>, name: &'static str, v: Option<bool>) {
    if let Some(v) = v {
        props.push((name, PropValue::Bool(v)));
    }
}

fn push_int(props: &mut Vec<(&'static str, PropValue)>, name: &'static str, v: Option<i64>) {
    if let Some(v) = v {
        props.push((name, PropValue::Int(v)));
    }
}

/// Extract the scalar properties of a node.
///
/// Per-kind vocabularies are fixed; payloads outside a kind's
/// vocabulary are ignored, and absent payloads produce no property at
/// all (never a sentinel value).
pub fn properties(node: &SourceNode) -> Vec<(&'static str, PropValue)> {
    use NodeKind::*;
    let mut props = Vec::new();
    match node.kind {
        Assignment | InfixExpression | PostfixExpression => {
            push_text(&mut props, "OPERATOR", &node.operator);
        }
        ImportDeclaration => {
            push_bool(&mut props, "STATIC", node.is_static);
            push_bool(&mut props, "ON_DEMAND", node.on_demand);
        }
        TypeDeclaration => {
            push_bool(&mut props, "INTERFACE", node.interface);
            push_int(&mut props, "MODIFIERS", node.modifier_flags);
        }
        MethodDeclaration => {
            push_bool(&mut props, "CONSTRUCTOR", node.constructor);
            push_int(&mut props, "MODIFIERS", node.modifier_flags);
        }
        SingleVariableDeclaration => {
            push_bool(&mut props, "VARARGS", node.varargs);
            push_int(&mut props, "MODIFIERS", node.modifier_flags);
        }
        AnnotationTypeDeclaration | AnnotationTypeMemberDeclaration | EnumConstantDeclaration
        | EnumDeclaration | FieldDeclaration | Initializer | VariableDeclarationExpression
        | VariableDeclarationStatement => {
            push_int(&mut props, "MODIFIERS", node.modifier_flags);
        }
        NumberLiteral => {
            push_text(&mut props, "TOKEN", &node.token);
        }
        SimpleName => {
            push_text(&mut props, "IDENTIFIER", &node.identifier);
        }
        PrimitiveType => {
            push_text(&mut props, "PRIMITIVE_TYPE_CODE", &node.primitive_type_code);
        }
        _ => {}
    }
    props
}

/// Ordered child-edge spec for a node kind.
///
/// The order is canonical per kind (a method's type parameters come
/// before its return type, its name, its parameters, then its body);
/// within one relation, children keep source order. Kinds with no
/// structural children, and discard kinds, have an empty spec.
pub fn relations(kind: NodeKind) -> &'static [RelName] {
    use NodeKind as K;
    use RelName::*;
    match kind {
        K::AnnotationTypeDeclaration => &[RelName::Javadoc, Modifiers, Name, BodyDeclarations],
        K::AnnotationTypeMemberDeclaration => &[RelName::Javadoc, Modifiers, Type, Name, Default],
        K::AnonymousClassDeclaration => &[BodyDeclarations],
        K::ArrayAccess => &[Array, Index],
        K::ArrayCreation => &[Type, Dimensions, Initializer],
        K::ArrayInitializer => &[Expressions],
        K::ArrayType => &[ElementType, Dimensions],
        K::AssertStatement => &[Expression, Message],
        K::Assignment => &[LeftHandSide, RightHandSide],
        K::Block => &[Statements],
        K::BreakStatement => &[Label],
        K::CastExpression => &[Type, Expression],
        K::CatchClause => &[Exception, Body],
        K::ClassInstanceCreation => &[
            Expression,
            TypeArguments,
            Type,
            Arguments,
            RelName::AnonymousClassDeclaration,
        ],
        K::CompilationUnit => &[Package, Imports, Types, Comments],
        K::ConditionalExpression => &[Expression, ThenExpression, ElseExpression],
        K::ConstructorInvocation => &[TypeArguments, Arguments],
        K::ContinueStatement => &[Label],
        K::CreationReference => &[Type, TypeArguments],
        K::Dimension => &[Annotations],
        K::DoStatement => &[Body, Expression],
        K::EnhancedForStatement => &[Parameter, Expression, Body],
        K::EnumConstantDeclaration => &[
            RelName::Javadoc,
            Modifiers,
            Name,
            Arguments,
            RelName::AnonymousClassDeclaration,
        ],
        K::EnumDeclaration => &[
            RelName::Javadoc,
            Modifiers,
            Name,
            SuperInterfaceTypes,
            EnumConstants,
            BodyDeclarations,
        ],
        K::ExpressionMethodReference => &[Expression, TypeArguments, Name],
        K::ExpressionStatement => &[Expression],
        K::FieldAccess => &[Expression, Name],
        K::FieldDeclaration => &[RelName::Javadoc, Modifiers, Type, Fragments],
        K::ForStatement => &[Initializers, Expression, Updaters, Body],
        K::IfStatement => &[Expression, ThenStatement, ElseStatement],
        K::ImportDeclaration => &[Name],
        K::InfixExpression => &[LeftOperand, RightOperand, ExtendedOperands],
        K::Initializer => &[RelName::Javadoc, Modifiers, Body],
        K::InstanceofExpression => &[LeftOperand, RightOperand],
        K::IntersectionType => &[Types],
        K::LabeledStatement => &[Label, Body],
        K::LambdaExpression => &[Parameters, Body],
        K::MarkerAnnotation => &[TypeName],
        K::MemberRef => &[Qualifier, Name],
        K::MemberValuePair => &[Name, Value],
        K::MethodDeclaration => &[
            RelName::Javadoc,
            Modifiers,
            TypeParameters,
            ReturnType,
            Name,
            Parameters,
            Body,
        ],
        K::MethodInvocation => &[Expression, TypeArguments, Name, Arguments],
        K::MethodRef => &[Qualifier, Name, Parameters],
        K::MethodRefParameter => &[Type, Name],
        K::NameQualifiedType => &[Qualifier, Name],
        K::NormalAnnotation => &[TypeName, Values],
        K::PackageDeclaration => &[Annotations, Name],
        K::ParameterizedType => &[Type, TypeArguments],
        K::ParenthesizedExpression => &[Expression],
        K::PostfixExpression => &[Operand],
        K::PrefixExpression => &[Operand],
        K::QualifiedName => &[Qualifier, Name],
        K::QualifiedType => &[Qualifier, Name],
        K::ReturnStatement => &[Expression],
        K::SimpleType => &[Name],
        K::SingleMemberAnnotation => &[TypeName, Value],
        K::SingleVariableDeclaration => &[Modifiers, Type, Name, Initializer],
        K::SuperConstructorInvocation => &[Expression, TypeArguments, Arguments],
        K::SuperFieldAccess => &[Qualifier, Name],
        K::SuperMethodInvocation => &[Qualifier, TypeArguments, Name, Arguments],
        K::SwitchCase => &[Expression],
        K::SwitchStatement => &[Expression, Statements],
        K::SynchronizedStatement => &[Expression, Body],
        K::ThisExpression => &[Qualifier],
        K::ThrowStatement => &[Expression],
        K::TryStatement => &[Resources, Body, CatchClauses, Finally],
        K::TypeDeclaration => &[
            RelName::Javadoc,
            Modifiers,
            Name,
            TypeParameters,
            SuperclassType,
            SuperInterfaceTypes,
            BodyDeclarations,
        ],
        K::TypeDeclarationStatement => &[Declaration],
        K::TypeLiteral => &[Type],
        K::TypeMethodReference => &[Type, TypeArguments, Name],
        K::TypeParameter => &[Name, TypeBounds],
        K::UnionType => &[Types],
        K::VariableDeclarationExpression => &[Modifiers, Type, Fragments],
        K::VariableDeclarationFragment => &[Name, Initializer],
        K::VariableDeclarationStatement => &[Modifiers, Type, Fragments],
        K::WhileStatement => &[Expression, Body],
        K::WildcardType => &[Bound],

        // leaves
        K::BooleanLiteral | K::CharacterLiteral | K::EmptyStatement | K::NullLiteral
        | K::NumberLiteral | K::PrimitiveType | K::SimpleName | K::StringLiteral => &[],

        // materialize-then-delete; never emit edges
        K::BlockComment | K::Javadoc | K::LineComment | K::Modifier | K::TagElement | K::TextElement => &[],
    }
}

/// The child edges a node produces, in emission order.
///
/// Relations are walked in the kind's canonical order; within one
/// relation, children keep the tree's source order. Children of a
/// discard kind produce no edge (they are deleted before the parent's
/// edge-emission phase), and discard parents produce none at all.
/// A child link under a relation the kind's spec does not allow is a
/// hole in the dispatch table and fails the run.
pub fn child_edges(tree: &SyntaxTree, id: NodeId) -> Result<Vec<(RelName, NodeId)>> {
    let node = tree.node(id);
    if is_discard(node.kind) {
        return Ok(Vec::new());
    }

    let spec = relations(node.kind);
    for link in &node.children {
        if !spec.contains(&link.rel) {
            return Err(Error::Tree(format!(
                "{} node carries relation '{}' outside its schema",
                node.kind, link.rel
            )));
        }
    }

    let mut edges = Vec::new();
    for rel in spec {
        for child in node.children_of(*rel) {
            if !is_discard(tree.node(child).kind) {
                edges.push((*rel, child));
            }
        }
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{SourceNode, TreeBuilder};

    #[test]
    fn test_primary_label_renames() {
        assert_eq!(classify(NodeKind::TypeDeclaration).primary, "Class");
        assert_eq!(classify(NodeKind::MethodDeclaration).primary, "Method");
        assert_eq!(classify(NodeKind::FieldDeclaration).primary, "Field");
        assert_eq!(classify(NodeKind::IfStatement).primary, "IfStatement");
    }

    #[test]
    fn test_capability_labels_stack() {
        let class = classify(NodeKind::TypeDeclaration);
        assert!(class.capabilities.contains(&NodeLabel::BodyDeclaration));
        assert!(class.capabilities.contains(&NodeLabel::AbstractTypeDeclaration));

        let name = classify(NodeKind::SimpleName);
        assert!(name.capabilities.contains(&NodeLabel::Expression));
        assert!(name.capabilities.contains(&NodeLabel::Name));

        let annotation = classify(NodeKind::MarkerAnnotation);
        assert!(annotation.capabilities.contains(&NodeLabel::Expression));
        assert!(annotation.capabilities.contains(&NodeLabel::Annotation));
    }

    #[test]
    fn test_discard_kinds() {
        for kind in [
            NodeKind::LineComment,
            NodeKind::BlockComment,
            NodeKind::Javadoc,
            NodeKind::TagElement,
            NodeKind::TextElement,
            NodeKind::Modifier,
        ] {
            assert!(is_discard(kind), "{kind} must be discard");
            assert!(relations(kind).is_empty());
        }
        assert!(!is_discard(NodeKind::Block));
    }

    #[test]
    fn test_absent_payloads_produce_no_properties() {
        let bare = SourceNode::new(NodeKind::Assignment);
        assert!(properties(&bare).is_empty());

        let with_op = SourceNode::new(NodeKind::Assignment).with_operator("=");
        let props = properties(&with_op);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].0, "OPERATOR");
    }

    #[test]
    fn test_payload_outside_vocabulary_is_ignored() {
        // a while statement has no scalar vocabulary at all
        let node = SourceNode::new(NodeKind::WhileStatement).with_identifier("bogus");
        assert!(properties(&node).is_empty());
    }

    #[test]
    fn test_method_properties() {
        let method = SourceNode::new(NodeKind::MethodDeclaration)
            .with_constructor(false)
            .with_modifier_flags(1);
        let props = properties(&method);
        assert!(props.contains(&("CONSTRUCTOR", PropValue::Bool(false))));
        assert!(props.contains(&("MODIFIERS", PropValue::Int(1))));
    }

    #[test]
    fn test_child_edges_follow_canonical_order() {
        // build a method with children linked out of canonical order
        let mut b = TreeBuilder::new("A.java");
        let method = b.add(SourceNode::new(NodeKind::MethodDeclaration));
        let body = b.add(SourceNode::new(NodeKind::Block));
        let name = b.add(SourceNode::new(NodeKind::SimpleName).with_identifier("m"));
        let ret = b.add(SourceNode::new(NodeKind::PrimitiveType).with_primitive_type_code("void"));
        b.link(method, RelName::Body, body);
        b.link(method, RelName::Name, name);
        b.link(method, RelName::ReturnType, ret);
        let tree = b.finish(method);

        let edges = child_edges(&tree, method).unwrap();
        let rels: Vec<RelName> = edges.iter().map(|(rel, _)| *rel).collect();
        assert_eq!(rels, vec![RelName::ReturnType, RelName::Name, RelName::Body]);
    }

    #[test]
    fn test_child_edges_skip_discard_children() {
        let mut b = TreeBuilder::new("A.java");
        let field = b.add(SourceNode::new(NodeKind::FieldDeclaration).with_modifier_flags(2));
        let ty = b.add(SourceNode::new(NodeKind::PrimitiveType).with_primitive_type_code("int"));
        let frag = b.add(SourceNode::new(NodeKind::VariableDeclarationFragment));
        let modifier = b.add(SourceNode::new(NodeKind::Modifier));
        b.link(field, RelName::Modifiers, modifier);
        b.link(field, RelName::Type, ty);
        b.link(field, RelName::Fragments, frag);
        let tree = b.finish(field);

        // the modifier token is legal in the spec but never becomes an edge
        let edges = child_edges(&tree, field).unwrap();
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|(_, child)| *child != modifier));
    }

    #[test]
    fn test_unspecced_relation_is_fatal() {
        let mut b = TreeBuilder::new("A.java");
        let ret = b.add(SourceNode::new(NodeKind::ReturnStatement));
        let stray = b.add(SourceNode::new(NodeKind::SimpleName));
        // a return statement has no "index" child in the schema
        b.link(ret, RelName::Index, stray);
        let tree = b.finish(ret);

        assert!(child_edges(&tree, ret).is_err());
    }

    #[test]
    fn test_every_kind_has_a_classification() {
        // the matches are exhaustive by construction; this pins the
        // renames down and exercises every arm once
        for kind in NodeKind::all() {
            let c = classify(*kind);
            assert!(!c.primary.is_empty());
            let _ = relations(*kind);
        }
    }
}
