//! Identities of the C# grammar rules.

use serde::Serialize;
use std::fmt;

macro_rules! grammar_rules {
    ($($variant:ident => $name:literal,)+) => {
        /// A named node type of the C# concrete syntax tree.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum CSharpRule {
            $($variant,)+
        }

        impl CSharpRule {
            /// Every rule, in declaration order.
            pub const ALL: &'static [CSharpRule] = &[$(CSharpRule::$variant,)+];

            /// Stable snake_case name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(CSharpRule::$variant => $name,)+
                }
            }
        }
    };
}

grammar_rules! {
    CompilationUnit => "compilation_unit",
    ExternAliasDirective => "extern_alias_directive",
    UsingDirective => "using_directive",
    UsingAliasDirective => "using_alias_directive",
    UsingNamespaceDirective => "using_namespace_directive",
    NamespaceMemberDeclaration => "namespace_member_declaration",
    NamespaceDeclaration => "namespace_declaration",
    QualifiedIdentifier => "qualified_identifier",
    NamespaceBody => "namespace_body",
    TypeDeclaration => "type_declaration",

    NamespaceOrTypeName => "namespace_or_type_name",
    QualifiedAliasMember => "qualified_alias_member",
    Type => "type",
    NonArrayType => "non_array_type",
    PredefinedType => "predefined_type",
    RankSpecifier => "rank_specifier",
    TypeArgumentList => "type_argument_list",
    TypeParameterList => "type_parameter_list",
    TypeParameter => "type_parameter",
    TypeParameterConstraintsClause => "type_parameter_constraints_clause",
    TypeParameterConstraint => "type_parameter_constraint",

    GlobalAttributeSection => "global_attribute_section",
    Attributes => "attributes",
    AttributeSection => "attribute_section",
    AttributeTarget => "attribute_target",
    AttributeList => "attribute_list",
    Attribute => "attribute",
    AttributeArguments => "attribute_arguments",
    AttributeArgument => "attribute_argument",
    Modifier => "modifier",
    Modifiers => "modifiers",

    ClassDeclaration => "class_declaration",
    ClassBase => "class_base",
    ClassBody => "class_body",
    ClassMemberDeclaration => "class_member_declaration",
    ConstantDeclaration => "constant_declaration",
    ConstantDeclarator => "constant_declarator",
    FieldDeclaration => "field_declaration",
    FixedSizeBufferDeclaration => "fixed_size_buffer_declaration",
    FixedSizeBufferDeclarator => "fixed_size_buffer_declarator",
    VariableDeclarators => "variable_declarators",
    VariableDeclarator => "variable_declarator",
    VariableInitializer => "variable_initializer",
    ArrayInitializer => "array_initializer",
    MethodDeclaration => "method_declaration",
    MemberName => "member_name",
    FormalParameterList => "formal_parameter_list",
    FormalParameter => "formal_parameter",
    FixedParameter => "fixed_parameter",
    ParameterArray => "parameter_array",
    ParameterModifier => "parameter_modifier",
    PropertyDeclaration => "property_declaration",
    AccessorDeclarations => "accessor_declarations",
    GetAccessorDeclaration => "get_accessor_declaration",
    SetAccessorDeclaration => "set_accessor_declaration",
    AccessorModifier => "accessor_modifier",
    EventDeclaration => "event_declaration",
    EventAccessorDeclarations => "event_accessor_declarations",
    AddAccessorDeclaration => "add_accessor_declaration",
    RemoveAccessorDeclaration => "remove_accessor_declaration",
    IndexerDeclaration => "indexer_declaration",
    OperatorDeclaration => "operator_declaration",
    OperatorDeclarator => "operator_declarator",
    ConversionOperatorDeclarator => "conversion_operator_declarator",
    OverloadableOperator => "overloadable_operator",
    ConstructorDeclaration => "constructor_declaration",
    ConstructorInitializer => "constructor_initializer",
    StaticConstructorDeclaration => "static_constructor_declaration",
    DestructorDeclaration => "destructor_declaration",
    MethodBody => "method_body",
    AccessorBody => "accessor_body",
    OperatorBody => "operator_body",
    ConstructorBody => "constructor_body",
    DestructorBody => "destructor_body",
    StaticConstructorBody => "static_constructor_body",

    StructDeclaration => "struct_declaration",
    StructBody => "struct_body",
    StructMemberDeclaration => "struct_member_declaration",
    InterfaceDeclaration => "interface_declaration",
    InterfaceBody => "interface_body",
    InterfaceMemberDeclaration => "interface_member_declaration",
    InterfaceMethodDeclaration => "interface_method_declaration",
    InterfacePropertyDeclaration => "interface_property_declaration",
    InterfaceEventDeclaration => "interface_event_declaration",
    InterfaceIndexerDeclaration => "interface_indexer_declaration",
    InterfaceAccessors => "interface_accessors",
    InterfaceGetAccessor => "interface_get_accessor",
    InterfaceSetAccessor => "interface_set_accessor",
    EnumDeclaration => "enum_declaration",
    EnumBase => "enum_base",
    EnumBody => "enum_body",
    EnumMemberDeclaration => "enum_member_declaration",
    DelegateDeclaration => "delegate_declaration",

    Statement => "statement",
    EmbeddedStatement => "embedded_statement",
    Block => "block",
    StatementList => "statement_list",
    EmptyStatement => "empty_statement",
    LabeledStatement => "labeled_statement",
    DeclarationStatement => "declaration_statement",
    LocalVariableDeclaration => "local_variable_declaration",
    LocalConstantDeclaration => "local_constant_declaration",
    ExpressionStatement => "expression_statement",
    SelectionStatement => "selection_statement",
    IfStatement => "if_statement",
    SwitchStatement => "switch_statement",
    SwitchBlock => "switch_block",
    SwitchSection => "switch_section",
    SwitchLabel => "switch_label",
    IterationStatement => "iteration_statement",
    WhileStatement => "while_statement",
    DoStatement => "do_statement",
    ForStatement => "for_statement",
    ForInitializer => "for_initializer",
    ForCondition => "for_condition",
    ForIterator => "for_iterator",
    ForeachStatement => "foreach_statement",
    StatementExpressionList => "statement_expression_list",
    JumpStatement => "jump_statement",
    BreakStatement => "break_statement",
    ContinueStatement => "continue_statement",
    GotoStatement => "goto_statement",
    ReturnStatement => "return_statement",
    ThrowStatement => "throw_statement",
    TryStatement => "try_statement",
    CatchClause => "catch_clause",
    FinallyClause => "finally_clause",
    CheckedStatement => "checked_statement",
    UncheckedStatement => "unchecked_statement",
    LockStatement => "lock_statement",
    UsingStatement => "using_statement",
    ResourceAcquisition => "resource_acquisition",
    YieldStatement => "yield_statement",
    UnsafeStatement => "unsafe_statement",
    FixedStatement => "fixed_statement",

    Expression => "expression",
    Assignment => "assignment",
    AssignmentOperator => "assignment_operator",
    ConditionalExpression => "conditional_expression",
    NullCoalescingExpression => "null_coalescing_expression",
    ConditionalOrExpression => "conditional_or_expression",
    ConditionalAndExpression => "conditional_and_expression",
    InclusiveOrExpression => "inclusive_or_expression",
    ExclusiveOrExpression => "exclusive_or_expression",
    AndExpression => "and_expression",
    EqualityExpression => "equality_expression",
    RelationalExpression => "relational_expression",
    ShiftExpression => "shift_expression",
    RightShift => "right_shift",
    AdditiveExpression => "additive_expression",
    MultiplicativeExpression => "multiplicative_expression",
    UnaryExpression => "unary_expression",
    CastExpression => "cast_expression",
    AwaitExpression => "await_expression",
    PrimaryExpression => "primary_expression",
    MemberAccess => "member_access",
    Invocation => "invocation",
    ElementAccess => "element_access",
    PostIncrementExpression => "post_increment_expression",
    PostDecrementExpression => "post_decrement_expression",
    PointerMemberAccess => "pointer_member_access",
    Literal => "literal",
    ParenthesizedExpression => "parenthesized_expression",
    SimpleName => "simple_name",
    ThisAccess => "this_access",
    BaseAccess => "base_access",
    ObjectCreationExpression => "object_creation_expression",
    ArrayCreationExpression => "array_creation_expression",
    AnonymousObjectCreationExpression => "anonymous_object_creation_expression",
    ObjectOrCollectionInitializer => "object_or_collection_initializer",
    ObjectInitializer => "object_initializer",
    MemberInitializer => "member_initializer",
    CollectionInitializer => "collection_initializer",
    ElementInitializer => "element_initializer",
    MemberDeclarator => "member_declarator",
    TypeofExpression => "typeof_expression",
    SizeofExpression => "sizeof_expression",
    CheckedExpression => "checked_expression",
    UncheckedExpression => "unchecked_expression",
    DefaultValueExpression => "default_value_expression",
    AnonymousMethodExpression => "anonymous_method_expression",
    StackallocInitializer => "stackalloc_initializer",
    ArgumentList => "argument_list",
    Argument => "argument",
    ExpressionList => "expression_list",
    LambdaExpression => "lambda_expression",
    AnonymousFunctionSignature => "anonymous_function_signature",
    ExplicitAnonymousFunctionParameter => "explicit_anonymous_function_parameter",
    AnonymousFunctionBody => "anonymous_function_body",

    QueryExpression => "query_expression",
    FromClause => "from_clause",
    QueryBody => "query_body",
    QueryBodyClause => "query_body_clause",
    LetClause => "let_clause",
    WhereClause => "where_clause",
    JoinClause => "join_clause",
    OrderbyClause => "orderby_clause",
    Ordering => "ordering",
    SelectOrGroupClause => "select_or_group_clause",
    QueryContinuation => "query_continuation",
}

impl CSharpRule {
    /// Position of the rule in [`CSharpRule::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Spelling accepted by a mocked rule: the name in SCREAMING_SNAKE case.
    pub fn mock_name(&self) -> String {
        self.name().to_ascii_uppercase()
    }

    pub fn parse(name: &str) -> Option<CSharpRule> {
        CSharpRule::ALL.iter().copied().find(|r| r.name() == name)
    }

    /// Body kinds whose presence adds one to cyclomatic complexity.
    pub fn is_member_body(&self) -> bool {
        matches!(
            self,
            CSharpRule::MethodBody
                | CSharpRule::AccessorBody
                | CSharpRule::OperatorBody
                | CSharpRule::ConstructorBody
                | CSharpRule::DestructorBody
                | CSharpRule::StaticConstructorBody
        )
    }
}

impl fmt::Display for CSharpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = CSharpRule::ALL.iter().map(|r| r.name()).collect();
        assert_eq!(names.len(), CSharpRule::ALL.len());
    }

    #[test]
    fn test_index_matches_position() {
        for (i, rule) in CSharpRule::ALL.iter().enumerate() {
            assert_eq!(rule.index(), i);
        }
    }

    #[test]
    fn test_mock_name_and_parse() {
        assert_eq!(CSharpRule::ClassBody.mock_name(), "CLASS_BODY");
        assert_eq!(CSharpRule::parse("if_statement"), Some(CSharpRule::IfStatement));
        assert_eq!(CSharpRule::parse("nope"), None);
    }
}
