//! Recursive descent parser for the declaration subset the generator accepts.

use miette::SourceSpan;

use crate::{
    error::{Result, SourceContext},
    lexer::{Token, TokenKind, tokenize},
    syntax::{InterfaceDecl, Item, Member, MemberName, Param, TypeExpr, TypeExprKind},
};

/// Parse a whole declaration file.
pub fn parse(ctx: &SourceContext) -> Result<Vec<Item>> {
    let tokens = tokenize(ctx)?;
    Parser {
        ctx,
        tokens,
        pos: 0,
    }
    .parse_module()
}

fn join(start: SourceSpan, end: SourceSpan) -> SourceSpan {
    let from = start.offset();
    let to = end.offset() + end.len();
    (from, to.saturating_sub(from)).into()
}

struct Parser<'a> {
    ctx: &'a SourceContext,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn previous_span(&self) -> SourceSpan {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek().is_punct(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<Token> {
        if self.peek().is_punct(c) {
            return Ok(self.advance());
        }
        let found = self.peek();
        Err(self.ctx.syntax_error(
            format!("expected '{}', found {}", c, found.describe()),
            found.span,
        ))
    }

    fn expect_ident(&mut self) -> Result<(String, SourceSpan)> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok((name, token.span)),
            _ => Err(self.ctx.syntax_error(
                format!("expected identifier, found {}", token.describe()),
                token.span,
            )),
        }
    }

    fn parse_module(mut self) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut decorators = Vec::new();

        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Punct(';') => {
                    self.advance();
                }
                TokenKind::Punct('@') => decorators.push(self.parse_decorator()?),
                TokenKind::Ident(word) => match word.as_str() {
                    "export" | "declare" => {
                        self.advance();
                    }
                    "interface" => {
                        let decl = self.parse_interface(std::mem::take(&mut decorators))?;
                        items.push(Item::Interface(decl));
                    }
                    "const" | "let" | "var" => items.push(self.parse_const()?),
                    "import" | "type" => self.skip_statement(),
                    _ => {
                        return Err(self.ctx.syntax_error(
                            format!("expected a declaration, found {}", token.describe()),
                            token.span,
                        ));
                    }
                },
                _ => {
                    return Err(self.ctx.syntax_error(
                        format!("expected a declaration, found {}", token.describe()),
                        token.span,
                    ));
                }
            }
        }

        Ok(items)
    }

    /// Skip to the next top-level `;`.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::Punct('{' | '(' | '[') => depth += 1,
                TokenKind::Punct('}' | ')' | ']') => depth = depth.saturating_sub(1),
                TokenKind::Punct(';') if depth == 0 => return,
                _ => {}
            }
        }
    }

    /// Skip a balanced `open ... close` group starting at the current token.
    fn skip_group(&mut self, open: char, close: char) -> Result<()> {
        let start = self.expect_punct(open)?.span;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.advance();
            match token.kind {
                TokenKind::Eof => {
                    return Err(self
                        .ctx
                        .syntax_error(format!("unclosed '{}'", open), start));
                }
                TokenKind::Punct(c) if c == open => depth += 1,
                TokenKind::Punct(c) if c == close => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_decorator(&mut self) -> Result<String> {
        self.expect_punct('@')?;
        let (name, _) = self.expect_ident()?;
        if self.peek().is_punct('(') {
            self.skip_group('(', ')')?;
        }
        Ok(name)
    }

    fn parse_interface(&mut self, decorators: Vec<String>) -> Result<InterfaceDecl> {
        let start = self.advance().span;
        let (name, _) = self.expect_ident()?;
        if self.peek().is_punct('<') {
            self.skip_group('<', '>')?;
        }

        let mut heritage = Vec::new();
        if self.peek().is_ident("extends") {
            self.advance();
            loop {
                let (parent, _) = self.expect_ident()?;
                if self.peek().is_punct('<') {
                    self.skip_group('<', '>')?;
                }
                heritage.push(parent);
                if !self.eat_punct(',') {
                    break;
                }
            }
        }

        self.expect_punct('{')?;
        let mut members = Vec::new();
        while !self.peek().is_punct('}') {
            if self.peek().kind == TokenKind::Eof {
                return Err(self
                    .ctx
                    .syntax_error(format!("unclosed interface '{}'", name), start));
            }
            members.push(self.parse_member()?);
        }
        let end = self.advance().span;

        Ok(InterfaceDecl {
            name,
            decorators,
            heritage,
            members,
            span: join(start, end),
        })
    }

    fn parse_member(&mut self) -> Result<Member> {
        let start = self.peek().span;

        let mut readonly = false;
        if self.peek().is_ident("readonly")
            && matches!(
                self.peek_at(1).kind,
                TokenKind::Ident(_) | TokenKind::Str(_) | TokenKind::Punct('[')
            )
        {
            self.advance();
            readonly = true;
        }

        if self.peek().is_punct('[') {
            let is_index = matches!(self.peek_at(1).kind, TokenKind::Ident(_))
                && self.peek_at(2).is_punct(':');
            if is_index {
                return self.parse_index_signature(start, readonly);
            }
        }

        if self.peek().is_ident("new") && self.peek_at(1).is_punct('(') {
            self.advance();
            let params = self.parse_params()?;
            self.expect_punct(':')?;
            let ret = self.parse_type()?;
            self.finish_member();
            return Ok(Member::Construct {
                params,
                ret,
                span: join(start, self.previous_span()),
            });
        }

        let name = self.parse_member_name()?;
        let optional = self.eat_punct('?');

        if self.peek().is_punct('<') {
            self.skip_group('<', '>')?;
        }

        if self.peek().is_punct('(') {
            let params = self.parse_params()?;
            let ret = if self.eat_punct(':') {
                self.parse_type()?
            } else {
                TypeExpr {
                    kind: TypeExprKind::Named {
                        name: "void".to_string(),
                        args: Vec::new(),
                    },
                    span: self.previous_span(),
                }
            };
            self.finish_member();
            return Ok(Member::Method {
                name,
                params,
                ret,
                span: join(start, self.previous_span()),
            });
        }

        self.expect_punct(':')?;
        let ty = self.parse_type()?;
        self.finish_member();
        Ok(Member::Property {
            name,
            ty,
            readonly,
            optional,
            span: join(start, self.previous_span()),
        })
    }

    fn finish_member(&mut self) {
        if !self.eat_punct(';') {
            self.eat_punct(',');
        }
    }

    fn parse_member_name(&mut self) -> Result<MemberName> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) | TokenKind::Str(name) | TokenKind::Number(name) => {
                Ok(MemberName::Ident(name))
            }
            TokenKind::Punct('[') => {
                let (object, _) = self.expect_ident()?;
                self.expect_punct('.')?;
                let (property, _) = self.expect_ident()?;
                self.expect_punct(']')?;
                Ok(MemberName::Computed { object, property })
            }
            _ => Err(self.ctx.syntax_error(
                format!("expected a member name, found {}", token.describe()),
                token.span,
            )),
        }
    }

    fn parse_index_signature(&mut self, start: SourceSpan, readonly: bool) -> Result<Member> {
        self.expect_punct('[')?;
        self.expect_ident()?;
        self.expect_punct(':')?;
        let key = self.parse_type()?;
        self.expect_punct(']')?;
        self.expect_punct(':')?;
        let ty = self.parse_type()?;
        self.finish_member();
        Ok(Member::Index {
            key,
            ty,
            readonly,
            span: join(start, self.previous_span()),
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.expect_punct('(')?;
        let mut params = Vec::new();
        while !self.peek().is_punct(')') {
            let variadic = if self.peek().kind == TokenKind::Ellipsis {
                self.advance();
                true
            } else {
                false
            };
            let (name, name_span) = self.expect_ident()?;
            let optional = self.eat_punct('?');
            if !self.eat_punct(':') {
                return Err(self.ctx.syntax_error(
                    format!("parameter '{}' needs a type annotation", name),
                    name_span,
                ));
            }
            let ty = self.parse_type()?;
            params.push(Param {
                name,
                ty,
                optional,
                variadic,
            });
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(')')?;
        Ok(params)
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        self.eat_punct('|');
        let first = self.parse_postfix_type()?;
        if !self.peek().is_punct('|') {
            return Ok(first);
        }

        let start = first.span;
        let mut alternatives = vec![first];
        while self.eat_punct('|') {
            alternatives.push(self.parse_postfix_type()?);
        }
        Ok(TypeExpr {
            kind: TypeExprKind::Union(alternatives),
            span: join(start, self.previous_span()),
        })
    }

    fn parse_postfix_type(&mut self) -> Result<TypeExpr> {
        let mut ty = self.parse_primary_type()?;
        while self.peek().is_punct('[') && self.peek_at(1).is_punct(']') {
            self.advance();
            let end = self.advance().span;
            let span = join(ty.span, end);
            ty = TypeExpr {
                kind: TypeExprKind::Array(Box::new(ty)),
                span,
            };
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeExpr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Punct('(') if self.is_function_type() => {
                let params = self.parse_params()?;
                let arrow = self.advance();
                if arrow.kind != TokenKind::Arrow {
                    return Err(self.ctx.syntax_error(
                        format!("expected '=>', found {}", arrow.describe()),
                        arrow.span,
                    ));
                }
                let ret = self.parse_type()?;
                Ok(TypeExpr {
                    kind: TypeExprKind::Function {
                        params,
                        ret: Box::new(ret),
                    },
                    span: join(token.span, self.previous_span()),
                })
            }
            TokenKind::Punct('(') => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            TokenKind::Punct('{') => {
                self.skip_group('{', '}')?;
                Ok(TypeExpr {
                    kind: TypeExprKind::Unsupported("object literal type".to_string()),
                    span: join(token.span, self.previous_span()),
                })
            }
            TokenKind::Ident(mut name) => {
                self.advance();
                while self.peek().is_punct('.') {
                    self.advance();
                    let (segment, _) = self.expect_ident()?;
                    name.push('.');
                    name.push_str(&segment);
                }
                let mut args = Vec::new();
                if self.eat_punct('<') {
                    loop {
                        args.push(self.parse_type()?);
                        if !self.eat_punct(',') {
                            break;
                        }
                    }
                    self.expect_punct('>')?;
                }
                Ok(TypeExpr {
                    kind: TypeExprKind::Named { name, args },
                    span: join(token.span, self.previous_span()),
                })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(TypeExpr {
                    kind: TypeExprKind::StringLiteral(value),
                    span: token.span,
                })
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(TypeExpr {
                    kind: TypeExprKind::Unsupported(format!("numeric literal type {}", value)),
                    span: token.span,
                })
            }
            _ => Err(self.ctx.syntax_error(
                format!("expected a type, found {}", token.describe()),
                token.span,
            )),
        }
    }

    /// Whether the `(` at the cursor opens `(params) => R` rather than a
    /// parenthesized type.
    fn is_function_type(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            let token = self.peek_at(n);
            match token.kind {
                TokenKind::Eof => return false,
                TokenKind::Punct('(') => depth += 1,
                TokenKind::Punct(')') => {
                    depth -= 1;
                    if depth == 0 {
                        return self.peek_at(n + 1).kind == TokenKind::Arrow;
                    }
                }
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_const(&mut self) -> Result<Item> {
        let start = self.advance().span;
        let (name, name_span) = self.expect_ident()?;
        if !self.eat_punct(':') {
            return Err(self.ctx.syntax_error(
                format!("'{}' needs a type annotation", name),
                name_span,
            ));
        }
        let ty = self.parse_type()?;
        self.eat_punct(';');
        Ok(Item::Const {
            name,
            ty,
            span: join(start, self.previous_span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(src: &str) -> Vec<Item> {
        parse(&SourceContext::new(src, "test.d.ts")).unwrap()
    }

    fn only_interface(src: &str) -> InterfaceDecl {
        match parse_str(src).remove(0) {
            Item::Interface(decl) => decl,
            other => panic!("expected interface, got {:?}", other),
        }
    }

    #[test]
    fn test_interface_with_heritage_and_decorator() {
        let decl = only_interface(
            "@Dictionary()\nexport interface MouseEventInit extends EventInit, SomeMixin { clientX?: number; }",
        );
        assert_eq!(decl.name, "MouseEventInit");
        assert_eq!(decl.decorators, vec!["Dictionary"]);
        assert_eq!(decl.heritage, vec!["EventInit", "SomeMixin"]);
        assert_eq!(decl.members.len(), 1);
    }

    #[test]
    fn test_member_forms() {
        let decl = only_interface(
            r#"interface Node {
                readonly nodeType: int32;
                readonly: boolean;
                onclick: (event: Event) => void;
                appendChild(child: Node): Node;
                [Symbol.iterator](): object;
                [key: string]: any;
                new(): void;
            }"#,
        );
        assert!(matches!(
            &decl.members[0],
            Member::Property { readonly: true, .. }
        ));
        assert!(matches!(
            &decl.members[1],
            Member::Property { name: MemberName::Ident(n), readonly: false, .. } if n == "readonly"
        ));
        assert!(matches!(
            &decl.members[2],
            Member::Property { ty: TypeExpr { kind: TypeExprKind::Function { .. }, .. }, .. }
        ));
        assert!(matches!(&decl.members[3], Member::Method { .. }));
        assert!(matches!(
            &decl.members[4],
            Member::Method { name: MemberName::Computed { .. }, .. }
        ));
        assert!(matches!(&decl.members[5], Member::Index { .. }));
        assert!(matches!(&decl.members[6], Member::Construct { .. }));
    }

    #[test]
    fn test_union_and_array_types() {
        let decl = only_interface("interface A { value: | (string | number)[] | null; }");
        let Member::Property { ty, .. } = &decl.members[0] else {
            panic!("expected property");
        };
        let TypeExprKind::Union(alternatives) = &ty.kind else {
            panic!("expected union, got {:?}", ty.kind);
        };
        assert_eq!(alternatives.len(), 2);
        assert!(matches!(alternatives[0].kind, TypeExprKind::Array(_)));
    }

    #[test]
    fn test_variadic_and_optional_params() {
        let decl = only_interface("interface A { log(level?: string, ...args: any[]): void; }");
        let Member::Method { params, .. } = &decl.members[0] else {
            panic!("expected method");
        };
        assert!(params[0].optional);
        assert!(params[1].variadic);
    }

    #[test]
    fn test_generic_wrapper_arguments() {
        let decl =
            only_interface("interface A { click(): ImplementedAs<DartImpl<void>, \"click_impl\">; }");
        let Member::Method { ret, .. } = &decl.members[0] else {
            panic!("expected method");
        };
        let TypeExprKind::Named { name, args } = &ret.kind else {
            panic!("expected named type");
        };
        assert_eq!(name, "ImplementedAs");
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].kind, TypeExprKind::StringLiteral("click_impl".into()));
    }

    #[test]
    fn test_declare_const_function() {
        let items = parse_str("declare const setTimeout: (handler: Function, timeout?: number) => int32;");
        assert!(matches!(&items[0], Item::Const { name, .. } if name == "setTimeout"));
    }

    #[test]
    fn test_imports_are_skipped() {
        let items = parse_str("import { Node } from './node';\ninterface A { new(): void; }");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_missing_colon_is_an_error() {
        let result = parse(&SourceContext::new("interface A { name string; }", "a.d.ts"));
        assert!(result.is_err());
    }
}
