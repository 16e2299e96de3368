//! Syntax tree produced by the parser, before type resolution.

use miette::SourceSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExprKind {
    /// `Name` or `Name<Args>`
    Named { name: String, args: Vec<TypeExpr> },
    /// `"literal"`, only meaningful as a wrapper argument
    StringLiteral(String),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `A | B`
    Union(Vec<TypeExpr>),
    /// `(a: A) => R`
    Function {
        params: Vec<Param>,
        ret: Box<TypeExpr>,
    },
    /// `{ ... }` or a numeric literal; rejected by the analyzer
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberName {
    Ident(String),
    /// `[Symbol.iterator]`
    Computed { object: String, property: String },
}

impl MemberName {
    /// Flattened name; computed keys become `Symbol_iterator`.
    pub fn flatten(&self) -> String {
        match self {
            MemberName::Ident(name) => name.clone(),
            MemberName::Computed { object, property } => format!("{}_{}", object, property),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property {
        name: MemberName,
        ty: TypeExpr,
        readonly: bool,
        optional: bool,
        span: SourceSpan,
    },
    Method {
        name: MemberName,
        params: Vec<Param>,
        ret: TypeExpr,
        span: SourceSpan,
    },
    /// `[key: string]: T`
    Index {
        key: TypeExpr,
        ty: TypeExpr,
        readonly: bool,
        span: SourceSpan,
    },
    /// `new(...): T`
    Construct {
        params: Vec<Param>,
        ret: TypeExpr,
        span: SourceSpan,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub decorators: Vec<String>,
    pub heritage: Vec<String>,
    pub members: Vec<Member>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Interface(InterfaceDecl),
    /// `declare const name: Type;`
    Const {
        name: String,
        ty: TypeExpr,
        span: SourceSpan,
    },
}
