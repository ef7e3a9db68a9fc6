//! Rule definitions of the C# grammar.
//!
//! Choice order is significant: alternatives are tried top to bottom and
//! the first match wins, so more specific forms come first (casts before
//! parenthesized expressions, declarations before expression statements).

use super::expr::{next, not, one_of, one_or_more, opt, zero_or_more, Expr};
use super::rules::CSharpRule::*;
use super::Grammar;
use crate::lexer::TokenKind;
use crate::{choice, seq};

const IDENT: TokenKind = TokenKind::Identifier;

pub(super) fn define(g: &mut Grammar) {
    compilation_unit(g);
    types(g);
    attributes(g);
    classes(g);
    other_types(g);
    statements(g);
    expressions(g);
    queries(g);
}

/// Tokens that may follow a type argument list inside an expression.
/// Anything else means `<` was a less-than operator.
fn generic_follow() -> Expr {
    one_of(&[
        "(", ")", "]", "}", ":", ";", ",", ".", "?", "==", "!=", "|", "^", "&&", "||", "&", "[",
    ])
}

/// Nullable `?` after a type, unless it opens the branches of a
/// conditional, as in `x is int ? 1 : 2`.
fn nullable_mark() -> Expr {
    seq!("?", not(seq!(Expression, ":")))
}

fn compilation_unit(g: &mut Grammar) {
    g.define(
        CompilationUnit,
        seq!(
            zero_or_more(ExternAliasDirective),
            zero_or_more(UsingDirective),
            zero_or_more(GlobalAttributeSection),
            zero_or_more(NamespaceMemberDeclaration)
        ),
    );
    g.define(ExternAliasDirective, seq!("extern", "alias", IDENT, ";"));
    g.define_skippable(
        UsingDirective,
        choice!(UsingAliasDirective, UsingNamespaceDirective),
    );
    g.define(
        UsingAliasDirective,
        seq!("using", IDENT, "=", NamespaceOrTypeName, ";"),
    );
    g.define(
        UsingNamespaceDirective,
        seq!("using", opt("static"), NamespaceOrTypeName, ";"),
    );
    g.define_skippable(
        NamespaceMemberDeclaration,
        choice!(NamespaceDeclaration, TypeDeclaration),
    );
    g.define(
        NamespaceDeclaration,
        seq!("namespace", QualifiedIdentifier, NamespaceBody, opt(";")),
    );
    g.define(QualifiedIdentifier, seq!(IDENT, zero_or_more(seq!(".", IDENT))));
    g.define(
        NamespaceBody,
        seq!(
            "{",
            zero_or_more(ExternAliasDirective),
            zero_or_more(UsingDirective),
            zero_or_more(NamespaceMemberDeclaration),
            "}"
        ),
    );
    g.define_skippable(
        TypeDeclaration,
        choice!(
            ClassDeclaration,
            StructDeclaration,
            InterfaceDeclaration,
            EnumDeclaration,
            DelegateDeclaration
        ),
    );
}

fn types(g: &mut Grammar) {
    g.define(
        NamespaceOrTypeName,
        seq!(
            choice!(QualifiedAliasMember, seq!(IDENT, opt(TypeArgumentList))),
            zero_or_more(seq!(".", IDENT, opt(TypeArgumentList)))
        ),
    );
    g.define(
        QualifiedAliasMember,
        seq!(IDENT, "::", IDENT, opt(TypeArgumentList)),
    );
    g.define(
        Type,
        seq!(
            choice!(PredefinedType, NamespaceOrTypeName),
            zero_or_more(choice!(nullable_mark(), RankSpecifier, "*"))
        ),
    );
    g.define(
        NonArrayType,
        seq!(
            choice!(PredefinedType, NamespaceOrTypeName),
            zero_or_more(one_of(&["?", "*"]))
        ),
    );
    g.define(
        PredefinedType,
        one_of(&[
            "bool", "byte", "char", "decimal", "double", "float", "int", "long", "object", "sbyte",
            "short", "string", "uint", "ulong", "ushort", "void",
        ]),
    );
    g.define(RankSpecifier, seq!("[", zero_or_more(","), "]"));
    g.define(
        TypeArgumentList,
        seq!(
            "<",
            // An empty list covers unbound generics such as `typeof(Dictionary<,>)`.
            choice!(seq!(Type, zero_or_more(seq!(",", Type))), zero_or_more(",")),
            ">"
        ),
    );
    g.define(
        TypeParameterList,
        seq!("<", TypeParameter, zero_or_more(seq!(",", TypeParameter)), ">"),
    );
    g.define(
        TypeParameter,
        seq!(opt(Attributes), opt(one_of(&["in", "out"])), IDENT),
    );
    g.define(
        TypeParameterConstraintsClause,
        seq!(
            "where",
            IDENT,
            ":",
            TypeParameterConstraint,
            zero_or_more(seq!(",", TypeParameterConstraint))
        ),
    );
    g.define(
        TypeParameterConstraint,
        choice!("class", "struct", seq!("new", "(", ")"), Type),
    );
}

fn attributes(g: &mut Grammar) {
    g.define(
        GlobalAttributeSection,
        seq!(
            "[",
            one_of(&["assembly", "module"]),
            ":",
            AttributeList,
            opt(","),
            "]"
        ),
    );
    g.define(Attributes, one_or_more(AttributeSection));
    g.define(
        AttributeSection,
        seq!(
            "[",
            opt(seq!(AttributeTarget, ":")),
            AttributeList,
            opt(","),
            "]"
        ),
    );
    g.define(
        AttributeTarget,
        one_of(&[
            "field", "event", "method", "param", "property", "return", "type",
        ]),
    );
    g.define(AttributeList, seq!(Attribute, zero_or_more(seq!(",", Attribute))));
    g.define(Attribute, seq!(NamespaceOrTypeName, opt(AttributeArguments)));
    g.define(
        AttributeArguments,
        seq!(
            "(",
            opt(seq!(
                AttributeArgument,
                zero_or_more(seq!(",", AttributeArgument))
            )),
            ")"
        ),
    );
    g.define(
        AttributeArgument,
        seq!(opt(seq!(IDENT, one_of(&["=", ":"]))), Expression),
    );
    g.define(
        Modifier,
        one_of(&[
            "new", "public", "protected", "internal", "private", "abstract", "sealed", "static",
            "readonly", "volatile", "virtual", "override", "extern", "unsafe", "partial", "async",
        ]),
    );
    g.define(Modifiers, zero_or_more(Modifier));
}

fn classes(g: &mut Grammar) {
    g.define(
        ClassDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "class",
            IDENT,
            opt(TypeParameterList),
            opt(ClassBase),
            zero_or_more(TypeParameterConstraintsClause),
            ClassBody,
            opt(";")
        ),
    );
    g.define(ClassBase, seq!(":", Type, zero_or_more(seq!(",", Type))));
    g.define(ClassBody, seq!("{", zero_or_more(ClassMemberDeclaration), "}"));
    g.define_skippable(
        ClassMemberDeclaration,
        choice!(
            TypeDeclaration,
            ConstantDeclaration,
            EventDeclaration,
            OperatorDeclaration,
            StaticConstructorDeclaration,
            ConstructorDeclaration,
            DestructorDeclaration,
            MethodDeclaration,
            PropertyDeclaration,
            IndexerDeclaration,
            FixedSizeBufferDeclaration,
            FieldDeclaration
        ),
    );
    g.define(
        ConstantDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "const",
            Type,
            ConstantDeclarator,
            zero_or_more(seq!(",", ConstantDeclarator)),
            ";"
        ),
    );
    g.define(ConstantDeclarator, seq!(IDENT, "=", Expression));
    g.define(
        FieldDeclaration,
        seq!(opt(Attributes), Modifiers, Type, VariableDeclarators, ";"),
    );
    g.define(
        FixedSizeBufferDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "fixed",
            Type,
            FixedSizeBufferDeclarator,
            zero_or_more(seq!(",", FixedSizeBufferDeclarator)),
            ";"
        ),
    );
    g.define(FixedSizeBufferDeclarator, seq!(IDENT, "[", Expression, "]"));
    g.define(
        VariableDeclarators,
        seq!(VariableDeclarator, zero_or_more(seq!(",", VariableDeclarator))),
    );
    g.define(
        VariableDeclarator,
        seq!(IDENT, opt(seq!("=", VariableInitializer))),
    );
    g.define(
        VariableInitializer,
        choice!(ArrayInitializer, StackallocInitializer, Expression),
    );
    g.define(
        ArrayInitializer,
        seq!(
            "{",
            opt(seq!(
                VariableInitializer,
                zero_or_more(seq!(",", VariableInitializer)),
                opt(",")
            )),
            "}"
        ),
    );
    g.define(
        MethodDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            Type,
            MemberName,
            opt(TypeParameterList),
            "(",
            opt(FormalParameterList),
            ")",
            zero_or_more(TypeParameterConstraintsClause),
            MethodBody
        ),
    );
    // Explicit interface implementations: `IList<T>.Add`.
    g.define(
        MemberName,
        seq!(zero_or_more(seq!(IDENT, opt(TypeArgumentList), ".")), IDENT),
    );
    g.define(
        FormalParameterList,
        seq!(FormalParameter, zero_or_more(seq!(",", FormalParameter))),
    );
    g.define_skippable(FormalParameter, choice!(ParameterArray, FixedParameter));
    g.define(
        FixedParameter,
        seq!(
            opt(Attributes),
            opt(ParameterModifier),
            Type,
            IDENT,
            opt(seq!("=", Expression))
        ),
    );
    g.define(ParameterArray, seq!(opt(Attributes), "params", Type, IDENT));
    g.define(ParameterModifier, one_of(&["ref", "out", "this"]));
    g.define(
        PropertyDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            Type,
            MemberName,
            "{",
            AccessorDeclarations,
            "}",
            opt(seq!("=", VariableInitializer, ";"))
        ),
    );
    g.define(
        AccessorDeclarations,
        choice!(
            seq!(GetAccessorDeclaration, opt(SetAccessorDeclaration)),
            seq!(SetAccessorDeclaration, opt(GetAccessorDeclaration))
        ),
    );
    g.define(
        GetAccessorDeclaration,
        seq!(opt(Attributes), opt(AccessorModifier), "get", AccessorBody),
    );
    g.define(
        SetAccessorDeclaration,
        seq!(opt(Attributes), opt(AccessorModifier), "set", AccessorBody),
    );
    g.define(
        AccessorModifier,
        choice!(
            seq!("protected", "internal"),
            seq!("internal", "protected"),
            "protected",
            "internal",
            "private"
        ),
    );
    g.define(
        EventDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "event",
            Type,
            choice!(
                seq!(MemberName, "{", EventAccessorDeclarations, "}"),
                seq!(VariableDeclarators, ";")
            )
        ),
    );
    g.define(
        EventAccessorDeclarations,
        choice!(
            seq!(AddAccessorDeclaration, RemoveAccessorDeclaration),
            seq!(RemoveAccessorDeclaration, AddAccessorDeclaration)
        ),
    );
    g.define(
        AddAccessorDeclaration,
        seq!(opt(Attributes), "add", AccessorBody),
    );
    g.define(
        RemoveAccessorDeclaration,
        seq!(opt(Attributes), "remove", AccessorBody),
    );
    g.define(
        IndexerDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            Type,
            opt(seq!(NamespaceOrTypeName, ".")),
            "this",
            "[",
            FormalParameterList,
            "]",
            "{",
            AccessorDeclarations,
            "}"
        ),
    );
    g.define(
        OperatorDeclaration,
        seq!(opt(Attributes), Modifiers, OperatorDeclarator, OperatorBody),
    );
    g.define(
        OperatorDeclarator,
        choice!(
            ConversionOperatorDeclarator,
            seq!(
                Type,
                "operator",
                OverloadableOperator,
                "(",
                FormalParameterList,
                ")"
            )
        ),
    );
    g.define(
        ConversionOperatorDeclarator,
        seq!(
            one_of(&["implicit", "explicit"]),
            "operator",
            Type,
            "(",
            FormalParameterList,
            ")"
        ),
    );
    g.define(
        OverloadableOperator,
        choice!(
            RightShift,
            one_of(&[
                "+", "-", "!", "~", "++", "--", "true", "false", "*", "/", "%", "&", "|", "^",
                "<<", "==", "!=", ">=", "<=", ">", "<",
            ])
        ),
    );
    g.define(
        ConstructorDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            IDENT,
            "(",
            opt(FormalParameterList),
            ")",
            opt(ConstructorInitializer),
            ConstructorBody
        ),
    );
    g.define(
        ConstructorInitializer,
        seq!(":", one_of(&["base", "this"]), "(", opt(ArgumentList), ")"),
    );
    g.define(
        StaticConstructorDeclaration,
        seq!(
            opt(Attributes),
            opt(one_of(&["extern", "unsafe"])),
            "static",
            opt(one_of(&["extern", "unsafe"])),
            IDENT,
            "(",
            ")",
            StaticConstructorBody
        ),
    );
    g.define(
        DestructorDeclaration,
        seq!(
            opt(Attributes),
            opt(one_of(&["extern", "unsafe"])),
            "~",
            IDENT,
            "(",
            ")",
            DestructorBody
        ),
    );
    for body in [
        MethodBody,
        AccessorBody,
        OperatorBody,
        ConstructorBody,
        DestructorBody,
        StaticConstructorBody,
    ] {
        g.define(body, choice!(Block, ";"));
    }
}

fn other_types(g: &mut Grammar) {
    g.define(
        StructDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "struct",
            IDENT,
            opt(TypeParameterList),
            opt(ClassBase),
            zero_or_more(TypeParameterConstraintsClause),
            StructBody,
            opt(";")
        ),
    );
    g.define(StructBody, seq!("{", zero_or_more(StructMemberDeclaration), "}"));
    g.define_skippable(
        StructMemberDeclaration,
        choice!(
            TypeDeclaration,
            ConstantDeclaration,
            EventDeclaration,
            OperatorDeclaration,
            StaticConstructorDeclaration,
            ConstructorDeclaration,
            MethodDeclaration,
            PropertyDeclaration,
            IndexerDeclaration,
            FixedSizeBufferDeclaration,
            FieldDeclaration
        ),
    );

    g.define(
        InterfaceDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "interface",
            IDENT,
            opt(TypeParameterList),
            opt(ClassBase),
            zero_or_more(TypeParameterConstraintsClause),
            InterfaceBody,
            opt(";")
        ),
    );
    g.define(
        InterfaceBody,
        seq!("{", zero_or_more(InterfaceMemberDeclaration), "}"),
    );
    g.define_skippable(
        InterfaceMemberDeclaration,
        choice!(
            InterfaceEventDeclaration,
            InterfaceIndexerDeclaration,
            InterfaceMethodDeclaration,
            InterfacePropertyDeclaration
        ),
    );
    g.define(
        InterfaceMethodDeclaration,
        seq!(
            opt(Attributes),
            opt("new"),
            Type,
            IDENT,
            opt(TypeParameterList),
            "(",
            opt(FormalParameterList),
            ")",
            zero_or_more(TypeParameterConstraintsClause),
            ";"
        ),
    );
    g.define(
        InterfacePropertyDeclaration,
        seq!(
            opt(Attributes),
            opt("new"),
            Type,
            IDENT,
            "{",
            InterfaceAccessors,
            "}"
        ),
    );
    g.define(
        InterfaceEventDeclaration,
        seq!(opt(Attributes), opt("new"), "event", Type, IDENT, ";"),
    );
    g.define(
        InterfaceIndexerDeclaration,
        seq!(
            opt(Attributes),
            opt("new"),
            Type,
            "this",
            "[",
            FormalParameterList,
            "]",
            "{",
            InterfaceAccessors,
            "}"
        ),
    );
    g.define(
        InterfaceAccessors,
        choice!(
            seq!(InterfaceGetAccessor, opt(InterfaceSetAccessor)),
            seq!(InterfaceSetAccessor, opt(InterfaceGetAccessor))
        ),
    );
    g.define(InterfaceGetAccessor, seq!(opt(Attributes), "get", ";"));
    g.define(InterfaceSetAccessor, seq!(opt(Attributes), "set", ";"));

    g.define(
        EnumDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "enum",
            IDENT,
            opt(EnumBase),
            EnumBody,
            opt(";")
        ),
    );
    g.define(EnumBase, seq!(":", Type));
    g.define(
        EnumBody,
        seq!(
            "{",
            opt(seq!(
                EnumMemberDeclaration,
                zero_or_more(seq!(",", EnumMemberDeclaration)),
                opt(",")
            )),
            "}"
        ),
    );
    g.define(
        EnumMemberDeclaration,
        seq!(opt(Attributes), IDENT, opt(seq!("=", Expression))),
    );

    g.define(
        DelegateDeclaration,
        seq!(
            opt(Attributes),
            Modifiers,
            "delegate",
            Type,
            IDENT,
            opt(TypeParameterList),
            "(",
            opt(FormalParameterList),
            ")",
            zero_or_more(TypeParameterConstraintsClause),
            ";"
        ),
    );
}

fn statements(g: &mut Grammar) {
    g.define(
        Statement,
        choice!(LabeledStatement, DeclarationStatement, EmbeddedStatement),
    );
    g.define(
        EmbeddedStatement,
        choice!(
            Block,
            EmptyStatement,
            SelectionStatement,
            IterationStatement,
            JumpStatement,
            TryStatement,
            CheckedStatement,
            UncheckedStatement,
            LockStatement,
            UsingStatement,
            YieldStatement,
            UnsafeStatement,
            FixedStatement,
            ExpressionStatement
        ),
    );
    g.define(Block, seq!("{", opt(StatementList), "}"));
    g.define(StatementList, one_or_more(Statement));
    g.define(EmptyStatement, ";");
    g.define(LabeledStatement, seq!(IDENT, ":", Statement));
    g.define(
        DeclarationStatement,
        seq!(
            choice!(LocalVariableDeclaration, LocalConstantDeclaration),
            ";"
        ),
    );
    g.define(LocalVariableDeclaration, seq!(Type, VariableDeclarators));
    g.define(
        LocalConstantDeclaration,
        seq!(
            "const",
            Type,
            ConstantDeclarator,
            zero_or_more(seq!(",", ConstantDeclarator))
        ),
    );
    g.define(ExpressionStatement, seq!(Expression, ";"));

    g.define(SelectionStatement, choice!(IfStatement, SwitchStatement));
    g.define(
        IfStatement,
        seq!(
            "if",
            "(",
            Expression,
            ")",
            EmbeddedStatement,
            opt(seq!("else", EmbeddedStatement))
        ),
    );
    g.define(
        SwitchStatement,
        seq!("switch", "(", Expression, ")", SwitchBlock),
    );
    g.define(SwitchBlock, seq!("{", zero_or_more(SwitchSection), "}"));
    g.define(SwitchSection, seq!(one_or_more(SwitchLabel), StatementList));
    g.define(
        SwitchLabel,
        choice!(seq!("case", Expression, ":"), seq!("default", ":")),
    );

    g.define(
        IterationStatement,
        choice!(WhileStatement, DoStatement, ForStatement, ForeachStatement),
    );
    g.define(
        WhileStatement,
        seq!("while", "(", Expression, ")", EmbeddedStatement),
    );
    g.define(
        DoStatement,
        seq!(
            "do",
            EmbeddedStatement,
            "while",
            "(",
            Expression,
            ")",
            ";"
        ),
    );
    g.define(
        ForStatement,
        seq!(
            "for",
            "(",
            opt(ForInitializer),
            ";",
            opt(ForCondition),
            ";",
            opt(ForIterator),
            ")",
            EmbeddedStatement
        ),
    );
    g.define(
        ForInitializer,
        choice!(LocalVariableDeclaration, StatementExpressionList),
    );
    g.define(ForCondition, Expression);
    g.define(ForIterator, StatementExpressionList);
    g.define(
        StatementExpressionList,
        seq!(Expression, zero_or_more(seq!(",", Expression))),
    );
    g.define(
        ForeachStatement,
        seq!(
            "foreach",
            "(",
            Type,
            IDENT,
            "in",
            Expression,
            ")",
            EmbeddedStatement
        ),
    );

    g.define(
        JumpStatement,
        choice!(
            BreakStatement,
            ContinueStatement,
            GotoStatement,
            ReturnStatement,
            ThrowStatement
        ),
    );
    g.define(BreakStatement, seq!("break", ";"));
    g.define(ContinueStatement, seq!("continue", ";"));
    g.define(
        GotoStatement,
        seq!(
            "goto",
            choice!(seq!("case", Expression), "default", IDENT),
            ";"
        ),
    );
    g.define(ReturnStatement, seq!("return", opt(Expression), ";"));
    g.define(ThrowStatement, seq!("throw", opt(Expression), ";"));

    g.define(
        TryStatement,
        seq!(
            "try",
            Block,
            choice!(
                seq!(one_or_more(CatchClause), opt(FinallyClause)),
                FinallyClause
            )
        ),
    );
    g.define(
        CatchClause,
        seq!("catch", opt(seq!("(", Type, opt(IDENT), ")")), Block),
    );
    g.define(FinallyClause, seq!("finally", Block));
    g.define(CheckedStatement, seq!("checked", Block));
    g.define(UncheckedStatement, seq!("unchecked", Block));
    g.define(
        LockStatement,
        seq!("lock", "(", Expression, ")", EmbeddedStatement),
    );
    g.define(
        UsingStatement,
        seq!("using", "(", ResourceAcquisition, ")", EmbeddedStatement),
    );
    g.define(
        ResourceAcquisition,
        choice!(LocalVariableDeclaration, Expression),
    );
    g.define(
        YieldStatement,
        seq!("yield", choice!(seq!("return", Expression), "break"), ";"),
    );
    g.define(UnsafeStatement, seq!("unsafe", Block));
    g.define(
        FixedStatement,
        seq!("fixed", "(", Type, VariableDeclarators, ")", EmbeddedStatement),
    );
}

fn expressions(g: &mut Grammar) {
    g.define_skippable(
        Expression,
        choice!(
            LambdaExpression,
            QueryExpression,
            Assignment,
            ConditionalExpression
        ),
    );
    g.define(
        Assignment,
        seq!(UnaryExpression, AssignmentOperator, Expression),
    );
    g.define(
        AssignmentOperator,
        choice!(
            "=",
            "+=",
            "-=",
            "*=",
            "/=",
            "%=",
            "&=",
            "|=",
            "^=",
            "<<=",
            seq!(">", ">=")
        ),
    );
    g.define_skippable(
        ConditionalExpression,
        seq!(
            NullCoalescingExpression,
            opt(seq!("?", Expression, ":", Expression))
        ),
    );
    g.define_skippable(
        NullCoalescingExpression,
        seq!(
            ConditionalOrExpression,
            opt(seq!("??", NullCoalescingExpression))
        ),
    );
    g.define_skippable(
        ConditionalOrExpression,
        seq!(
            ConditionalAndExpression,
            zero_or_more(seq!("||", ConditionalAndExpression))
        ),
    );
    g.define_skippable(
        ConditionalAndExpression,
        seq!(
            InclusiveOrExpression,
            zero_or_more(seq!("&&", InclusiveOrExpression))
        ),
    );
    g.define_skippable(
        InclusiveOrExpression,
        seq!(
            ExclusiveOrExpression,
            zero_or_more(seq!("|", ExclusiveOrExpression))
        ),
    );
    g.define_skippable(
        ExclusiveOrExpression,
        seq!(AndExpression, zero_or_more(seq!("^", AndExpression))),
    );
    g.define_skippable(
        AndExpression,
        seq!(EqualityExpression, zero_or_more(seq!("&", EqualityExpression))),
    );
    g.define_skippable(
        EqualityExpression,
        seq!(
            RelationalExpression,
            zero_or_more(seq!(one_of(&["==", "!="]), RelationalExpression))
        ),
    );
    g.define_skippable(
        RelationalExpression,
        seq!(
            ShiftExpression,
            zero_or_more(choice!(
                seq!(one_of(&["<", ">", "<=", ">="]), ShiftExpression),
                seq!(one_of(&["is", "as"]), Type)
            ))
        ),
    );
    g.define_skippable(
        ShiftExpression,
        seq!(
            AdditiveExpression,
            zero_or_more(seq!(choice!("<<", RightShift), AdditiveExpression))
        ),
    );
    // The lexer never emits `>>`, so nested type argument lists can close.
    g.define(RightShift, seq!(">", ">"));
    g.define_skippable(
        AdditiveExpression,
        seq!(
            MultiplicativeExpression,
            zero_or_more(seq!(one_of(&["+", "-"]), MultiplicativeExpression))
        ),
    );
    g.define_skippable(
        MultiplicativeExpression,
        seq!(
            UnaryExpression,
            zero_or_more(seq!(one_of(&["*", "/", "%"]), UnaryExpression))
        ),
    );
    g.define_skippable(
        UnaryExpression,
        choice!(
            CastExpression,
            AwaitExpression,
            seq!(
                one_of(&["+", "-", "!", "~", "++", "--", "*", "&"]),
                UnaryExpression
            ),
            PrimaryExpression
        ),
    );
    g.define(
        CastExpression,
        choice!(
            seq!("(", next(PredefinedType), Type, ")", UnaryExpression),
            seq!(
                "(",
                Type,
                ")",
                not(one_of(&["+", "-", "*", "&", "++", "--"])),
                UnaryExpression
            )
        ),
    );
    g.define(AwaitExpression, seq!("await", UnaryExpression));
    g.define_skippable(
        PrimaryExpression,
        seq!(
            choice!(
                Literal,
                ParenthesizedExpression,
                AnonymousObjectCreationExpression,
                ArrayCreationExpression,
                ObjectCreationExpression,
                ThisAccess,
                BaseAccess,
                TypeofExpression,
                SizeofExpression,
                CheckedExpression,
                UncheckedExpression,
                DefaultValueExpression,
                AnonymousMethodExpression,
                StackallocInitializer,
                PredefinedType,
                QualifiedAliasMember,
                SimpleName
            ),
            zero_or_more(choice!(
                MemberAccess,
                Invocation,
                ElementAccess,
                PostIncrementExpression,
                PostDecrementExpression,
                PointerMemberAccess
            ))
        ),
    );
    g.define(
        MemberAccess,
        seq!(".", IDENT, opt(seq!(TypeArgumentList, next(generic_follow())))),
    );
    g.define(Invocation, seq!("(", opt(ArgumentList), ")"));
    g.define(ElementAccess, seq!("[", ArgumentList, "]"));
    g.define(PostIncrementExpression, "++");
    g.define(PostDecrementExpression, "--");
    g.define(PointerMemberAccess, seq!("->", IDENT));
    g.define(
        Literal,
        choice!(
            TokenKind::IntegerLiteral,
            TokenKind::RealLiteral,
            TokenKind::CharacterLiteral,
            TokenKind::StringLiteral,
            "true",
            "false",
            "null"
        ),
    );
    g.define(ParenthesizedExpression, seq!("(", Expression, ")"));
    g.define(
        SimpleName,
        seq!(IDENT, opt(seq!(TypeArgumentList, next(generic_follow())))),
    );
    g.define(ThisAccess, "this");
    g.define(
        BaseAccess,
        seq!(
            "base",
            choice!(
                seq!(
                    ".",
                    IDENT,
                    opt(seq!(TypeArgumentList, next(generic_follow())))
                ),
                seq!("[", ArgumentList, "]")
            )
        ),
    );
    g.define(
        ObjectCreationExpression,
        seq!(
            "new",
            Type,
            choice!(
                seq!(
                    "(",
                    opt(ArgumentList),
                    ")",
                    opt(ObjectOrCollectionInitializer)
                ),
                ObjectOrCollectionInitializer
            )
        ),
    );
    g.define(
        ArrayCreationExpression,
        seq!(
            "new",
            choice!(
                seq!(
                    NonArrayType,
                    "[",
                    ExpressionList,
                    "]",
                    zero_or_more(RankSpecifier),
                    opt(ArrayInitializer)
                ),
                seq!(NonArrayType, one_or_more(RankSpecifier), ArrayInitializer),
                seq!(RankSpecifier, ArrayInitializer)
            )
        ),
    );
    g.define(
        AnonymousObjectCreationExpression,
        seq!(
            "new",
            "{",
            opt(seq!(
                MemberDeclarator,
                zero_or_more(seq!(",", MemberDeclarator)),
                opt(",")
            )),
            "}"
        ),
    );
    g.define(
        MemberDeclarator,
        choice!(seq!(IDENT, "=", Expression), Expression),
    );
    g.define_skippable(
        ObjectOrCollectionInitializer,
        choice!(ObjectInitializer, CollectionInitializer),
    );
    g.define(
        ObjectInitializer,
        seq!(
            "{",
            opt(seq!(
                MemberInitializer,
                zero_or_more(seq!(",", MemberInitializer)),
                opt(",")
            )),
            "}"
        ),
    );
    g.define(
        MemberInitializer,
        seq!(
            IDENT,
            "=",
            choice!(ObjectOrCollectionInitializer, Expression)
        ),
    );
    g.define(
        CollectionInitializer,
        seq!(
            "{",
            ElementInitializer,
            zero_or_more(seq!(",", ElementInitializer)),
            opt(","),
            "}"
        ),
    );
    g.define(
        ElementInitializer,
        choice!(seq!("{", ExpressionList, "}"), Expression),
    );
    g.define(TypeofExpression, seq!("typeof", "(", Type, ")"));
    g.define(SizeofExpression, seq!("sizeof", "(", Type, ")"));
    g.define(CheckedExpression, seq!("checked", "(", Expression, ")"));
    g.define(UncheckedExpression, seq!("unchecked", "(", Expression, ")"));
    g.define(DefaultValueExpression, seq!("default", "(", Type, ")"));
    g.define(
        AnonymousMethodExpression,
        seq!(
            opt("async"),
            "delegate",
            opt(seq!("(", opt(FormalParameterList), ")")),
            Block
        ),
    );
    g.define(
        StackallocInitializer,
        seq!("stackalloc", NonArrayType, "[", Expression, "]"),
    );
    g.define(ArgumentList, seq!(Argument, zero_or_more(seq!(",", Argument))));
    g.define(
        Argument,
        seq!(
            opt(seq!(IDENT, ":")),
            opt(one_of(&["ref", "out"])),
            Expression
        ),
    );
    g.define(ExpressionList, seq!(Expression, zero_or_more(seq!(",", Expression))));
    g.define(
        LambdaExpression,
        seq!(
            opt("async"),
            AnonymousFunctionSignature,
            "=>",
            AnonymousFunctionBody
        ),
    );
    g.define(
        AnonymousFunctionSignature,
        choice!(
            IDENT,
            seq!(
                "(",
                opt(choice!(
                    seq!(
                        ExplicitAnonymousFunctionParameter,
                        zero_or_more(seq!(",", ExplicitAnonymousFunctionParameter))
                    ),
                    seq!(IDENT, zero_or_more(seq!(",", IDENT)))
                )),
                ")"
            )
        ),
    );
    g.define(
        ExplicitAnonymousFunctionParameter,
        seq!(opt(one_of(&["ref", "out"])), Type, IDENT),
    );
    g.define(AnonymousFunctionBody, choice!(Block, Expression));
}

fn queries(g: &mut Grammar) {
    g.define(QueryExpression, seq!(FromClause, QueryBody));
    g.define(
        FromClause,
        seq!(
            "from",
            choice!(seq!(Type, IDENT), IDENT),
            "in",
            Expression
        ),
    );
    g.define(
        QueryBody,
        seq!(
            zero_or_more(QueryBodyClause),
            SelectOrGroupClause,
            opt(QueryContinuation)
        ),
    );
    g.define_skippable(
        QueryBodyClause,
        choice!(FromClause, LetClause, WhereClause, JoinClause, OrderbyClause),
    );
    g.define(LetClause, seq!("let", IDENT, "=", Expression));
    g.define(WhereClause, seq!("where", Expression));
    g.define(
        JoinClause,
        seq!(
            "join",
            choice!(seq!(Type, IDENT), IDENT),
            "in",
            Expression,
            "on",
            Expression,
            "equals",
            Expression,
            opt(seq!("into", IDENT))
        ),
    );
    g.define(
        OrderbyClause,
        seq!("orderby", Ordering, zero_or_more(seq!(",", Ordering))),
    );
    g.define(
        Ordering,
        seq!(Expression, opt(one_of(&["ascending", "descending"]))),
    );
    g.define(
        SelectOrGroupClause,
        choice!(
            seq!("select", Expression),
            seq!("group", Expression, "by", Expression)
        ),
    );
    g.define(QueryContinuation, seq!("into", IDENT, QueryBody));
}
