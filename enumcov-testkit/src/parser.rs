use crate::ParseError;
use crate::lexer::{Tok, Token, lex};
use enumcov_types::snapshot::{
    AttributeNode, ConstantValue, DeclarationNode, DocumentSnapshot, Expr, ExprNode, HostInfo,
    Ident, InitializerList, MemberSymbol, SourceSnapshot, SymbolIdentity, TypeKind, TypeRef,
    TypeSymbol, VariableNode,
};
use enumcov_types::span::Span;
use std::collections::{BTreeMap, BTreeSet};

/// Module of every type and attribute declared in the parsed documents.
pub const LOCAL_MODULE: &str = "App";

const GENERIC_MODULE: &str = "System.Collections.Generic";
const MARKER_MODULE: &str = "ExhaustiveDictionary";
const MARKER_NAME: &str = "ExhaustiveDictionary.ExhaustiveAttribute";

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "readonly",
    "const",
    "sealed",
    "partial",
    "abstract",
    "virtual",
    "override",
    "required",
    "volatile",
];

const TYPE_KEYWORDS: &[&str] = &["class", "struct", "record", "interface"];

#[derive(Debug, Default)]
struct Symbols {
    enums: BTreeMap<String, Vec<(String, i64)>>,
    classes: BTreeSet<String>,
    types: BTreeMap<String, TypeSymbol>,
}

impl Symbols {
    fn register_enums(&mut self) {
        for (name, members) in &self.enums {
            self.types.insert(
                name.clone(),
                TypeSymbol {
                    id: name.clone(),
                    kind: TypeKind::Enum,
                    definition: SymbolIdentity::new(LOCAL_MODULE, name.clone()),
                    type_arguments: vec![],
                    members: members
                        .iter()
                        .map(|(m, v)| MemberSymbol {
                            name: m.clone(),
                            constant: Some(ConstantValue::Int(*v)),
                        })
                        .collect(),
                },
            );
        }
    }

    fn resolve_type(&mut self, name: &str, args: &[TypeRef]) -> Option<String> {
        let simple = name.rsplit('.').next().unwrap_or(name);
        let arg_ids: Vec<String> = args
            .iter()
            .map(|a| a.symbol.clone().unwrap_or_else(|| a.text.clone()))
            .collect();

        let (kind, definition) = if args.is_empty() && self.enums.contains_key(simple) {
            (TypeKind::Enum, SymbolIdentity::new(LOCAL_MODULE, simple))
        } else if self.classes.contains(simple) {
            (TypeKind::Class, SymbolIdentity::new(LOCAL_MODULE, simple))
        } else if matches!(
            (simple, args.len()),
            ("Dictionary", 2) | ("List", 1) | ("HashSet", 1)
        ) {
            (
                TypeKind::Class,
                SymbolIdentity::new(GENERIC_MODULE, format!("{GENERIC_MODULE}.{simple}")),
            )
        } else if let Some(system) = primitive(simple) {
            (TypeKind::Primitive, SymbolIdentity::new("System", system))
        } else {
            return None;
        };

        let id = if arg_ids.is_empty() {
            definition.qualified_name.clone()
        } else {
            format!("{}<{}>", definition.qualified_name, arg_ids.join(","))
        };
        self.types
            .entry(id.clone())
            .or_insert_with(|| TypeSymbol {
                id: id.clone(),
                kind,
                definition,
                type_arguments: arg_ids,
                members: vec![],
            });
        Some(id)
    }

    fn resolve_attribute(&self, path: &str, usings: &BTreeSet<String>) -> Option<SymbolIdentity> {
        let (qualifier, last) = match path.rsplit_once('.') {
            Some((q, l)) => (q, l),
            None => ("", path),
        };
        let simple = last.strip_suffix("Attribute").unwrap_or(last);
        let class_name = format!("{simple}Attribute");

        if qualifier.is_empty() && self.classes.contains(&class_name) {
            return Some(SymbolIdentity::new(LOCAL_MODULE, class_name));
        }
        let in_scope =
            qualifier == MARKER_MODULE || (qualifier.is_empty() && usings.contains(MARKER_MODULE));
        if simple == "Exhaustive" && in_scope {
            return Some(SymbolIdentity::new(MARKER_MODULE, MARKER_NAME));
        }
        None
    }

    fn fold_member(&self, path: &str) -> Option<ConstantValue> {
        let (owner, member) = path.rsplit_once('.')?;
        let owner = owner.rsplit('.').next().unwrap_or(owner);
        self.enums
            .get(owner)?
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, v)| ConstantValue::Int(*v))
    }
}

fn primitive(name: &str) -> Option<&'static str> {
    Some(match name {
        "string" | "String" => "System.String",
        "int" | "Int32" => "System.Int32",
        "long" | "Int64" => "System.Int64",
        "bool" | "Boolean" => "System.Boolean",
        "double" | "Double" => "System.Double",
        "object" | "Object" => "System.Object",
        _ => return None,
    })
}

pub(crate) fn build_snapshot(
    host: HostInfo,
    documents: &[(String, String)],
) -> Result<SourceSnapshot, ParseError> {
    let mut symbols = Symbols::default();
    let mut lexed = Vec::with_capacity(documents.len());
    for (path, text) in documents {
        let tokens = lex(path, text)?;
        prescan(path, &tokens, &mut symbols)?;
        lexed.push(tokens);
    }
    symbols.register_enums();

    let mut snapshot = SourceSnapshot::new(host);
    for ((path, text), tokens) in documents.iter().zip(lexed) {
        let mut parser = Parser {
            path,
            text,
            tokens,
            pos: 0,
            usings: BTreeSet::new(),
            symbols: &mut symbols,
            nodes: Vec::new(),
        };
        parser.parse_items(false)?;
        let nodes = parser.nodes;
        snapshot.documents.push(DocumentSnapshot {
            path: path.clone(),
            text: text.clone(),
            nodes,
        });
    }
    snapshot.types = symbols.types.into_values().collect();
    Ok(snapshot)
}

/// Collect enum and class names up front so declarations may refer to types declared later.
fn prescan(path: &str, tokens: &[Token], symbols: &mut Symbols) -> Result<(), ParseError> {
    let mut i = 0;
    while i + 1 < tokens.len() {
        if tokens[i].is_ident("enum")
            && let Some(name) = tokens[i + 1].ident()
        {
            let (members, next) = scan_enum_members(path, tokens, i + 2)?;
            symbols.enums.insert(name.to_string(), members);
            i = next;
            continue;
        }
        if TYPE_KEYWORDS.iter().any(|k| tokens[i].is_ident(k))
            && let Some(name) = tokens[i + 1].ident()
        {
            symbols.classes.insert(name.to_string());
        }
        i += 1;
    }
    Ok(())
}

fn scan_enum_members(
    path: &str,
    tokens: &[Token],
    mut i: usize,
) -> Result<(Vec<(String, i64)>, usize), ParseError> {
    while i < tokens.len() && !tokens[i].is_punct('{') {
        i += 1;
    }
    i += 1;

    let mut members: Vec<(String, i64)> = Vec::new();
    let mut next_value = 0i64;
    while i < tokens.len() && !tokens[i].is_punct('}') {
        let Some(name) = tokens[i].ident() else {
            return Err(ParseError::new(
                path,
                tokens[i].span.start,
                "expected enum member name",
            ));
        };
        i += 1;

        let mut value = next_value;
        if tokens.get(i).is_some_and(|t| t.is_punct('=')) {
            i += 1;
            let negative = tokens.get(i).is_some_and(|t| t.is_punct('-'));
            if negative {
                i += 1;
            }
            value = match tokens.get(i).map(|t| &t.tok) {
                Some(Tok::Number(n)) if negative => -*n,
                Some(Tok::Number(n)) => *n,
                Some(Tok::Ident(other)) => members
                    .iter()
                    .find(|(m, _)| m == other)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| {
                        ParseError::new(path, tokens[i].span.start, "unknown enum member")
                    })?,
                _ => {
                    let at = tokens.get(i).map_or(0, |t| t.span.start);
                    return Err(ParseError::new(path, at, "expected enum member value"));
                }
            };
            i += 1;
        }
        members.push((name.to_string(), value));
        next_value = value.wrapping_add(1);

        if tokens.get(i).is_some_and(|t| t.is_punct(',')) {
            i += 1;
        }
    }
    Ok((members, i + 1))
}

struct Parser<'a> {
    path: &'a str,
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    usings: BTreeSet<String>,
    symbols: &'a mut Symbols,
    nodes: Vec<DeclarationNode>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_punct(c))
    }

    fn at_ident(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(word))
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.text.len(), |t| t.span.start)
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.path, self.offset(), message)
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let tok = self
            .peek()
            .cloned()
            .ok_or_else(|| self.err("unexpected end of input"))?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect_punct(&mut self, c: char) -> Result<Span, ParseError> {
        if !self.at_punct(c) {
            return Err(self.err(format!("expected '{c}'")));
        }
        self.bump().map(|t| t.span)
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let tok = self.peek().cloned().ok_or_else(|| self.err("expected identifier"))?;
        let Tok::Ident(text) = tok.tok else {
            return Err(self.err("expected identifier"));
        };
        self.pos += 1;
        Ok(Ident {
            text,
            span: tok.span,
        })
    }

    /// `A.B.C`
    fn dotted(&mut self) -> Result<(String, Span), ParseError> {
        let first = self.expect_ident()?;
        let mut path = first.text;
        while self.at_punct('.') && self.peek_at(1).is_some_and(|t| t.ident().is_some()) {
            self.pos += 1;
            let next = self.expect_ident()?;
            path.push('.');
            path.push_str(&next.text);
        }
        Ok((path, Span::new(first.span.start, self.prev_end())))
    }

    /// Skip from an opening delimiter to its matching close, inclusive.
    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), ParseError> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let tok = self.bump()?;
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn skip_past(&mut self, c: char) -> Result<(), ParseError> {
        while !self.bump()?.is_punct(c) {}
        Ok(())
    }

    fn skip_body(&mut self) -> Result<(), ParseError> {
        if self.at_punct('{') {
            self.skip_balanced('{', '}')
        } else if self.peek().is_some_and(|t| t.tok == Tok::Arrow) {
            self.skip_past(';')
        } else {
            self.expect_punct(';').map(|_| ())
        }
    }

    fn parse_items(&mut self, in_braces: bool) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                None if in_braces => return Err(self.err("expected '}'")),
                None => return Ok(()),
                Some(t) if in_braces && t.is_punct('}') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.parse_item()?,
            }
        }
    }

    fn parse_item(&mut self) -> Result<(), ParseError> {
        let start = self.offset();
        let attributes = self.parse_attributes()?;
        while self
            .peek()
            .is_some_and(|t| MODIFIERS.iter().any(|m| t.is_ident(m)))
        {
            self.pos += 1;
        }

        if self.eat_punct(';') {
            return Ok(());
        }
        if self.at_ident("using") {
            self.pos += 1;
            let (name, _) = self.dotted()?;
            if self.at_punct('=') {
                self.skip_past(';')?;
            } else {
                self.expect_punct(';')?;
                self.usings.insert(name);
            }
            return Ok(());
        }
        if self.at_ident("namespace") {
            self.pos += 1;
            self.dotted()?;
            if self.eat_punct('{') {
                return self.parse_items(true);
            }
            self.expect_punct(';')?;
            return Ok(());
        }
        if self.at_ident("enum") {
            while !self.at_punct('{') {
                self.bump()?;
            }
            self.skip_balanced('{', '}')?;
            return Ok(());
        }
        if TYPE_KEYWORDS.iter().any(|k| self.at_ident(k)) {
            self.pos += 1;
            self.expect_ident()?;
            while !self.at_punct('{') {
                if self.bump()?.is_punct(';') {
                    return Ok(());
                }
            }
            self.pos += 1;
            return self.parse_items(true);
        }

        self.parse_member(start, attributes)
    }

    fn parse_attributes(&mut self) -> Result<Vec<AttributeNode>, ParseError> {
        let mut attributes = Vec::new();
        while self.eat_punct('[') {
            loop {
                let (name, name_span) = self.dotted()?;
                if self.at_punct('(') {
                    self.skip_balanced('(', ')')?;
                }
                let symbol = self.symbols.resolve_attribute(&name, &self.usings);
                attributes.push(AttributeNode {
                    span: Span::new(name_span.start, self.prev_end()),
                    name,
                    symbol,
                });
                if !self.eat_punct(',') {
                    break;
                }
            }
            self.expect_punct(']')?;
        }
        Ok(attributes)
    }

    fn parse_member(
        &mut self,
        start: usize,
        attributes: Vec<AttributeNode>,
    ) -> Result<(), ParseError> {
        let type_ref = self.parse_type_ref()?;
        if self.at_punct('(') {
            // Constructor.
            self.skip_balanced('(', ')')?;
            return self.skip_body();
        }

        let name = self.expect_ident()?;
        if self.at_punct('<') {
            self.skip_balanced('<', '>')?;
        }
        if self.at_punct('(') {
            // Method.
            self.skip_balanced('(', ')')?;
            return self.skip_body();
        }
        if self.peek().is_some_and(|t| t.tok == Tok::Arrow) {
            // Expression-bodied property: nothing to initialize.
            return self.skip_past(';');
        }

        if self.at_punct('{') {
            self.skip_balanced('{', '}')?;
            let initializer = if self.eat_punct('=') {
                let expr = self.parse_expr()?;
                self.expect_punct(';')?;
                Some(expr)
            } else {
                None
            };
            self.nodes.push(DeclarationNode::Property {
                span: Span::new(start, self.prev_end()),
                attributes,
                type_ref,
                name,
                initializer,
            });
            return Ok(());
        }

        let mut variables = Vec::new();
        let mut name = name;
        loop {
            let initializer = if self.eat_punct('=') {
                Some(self.parse_expr()?)
            } else {
                None
            };
            variables.push(VariableNode { name, initializer });
            if !self.eat_punct(',') {
                break;
            }
            name = self.expect_ident()?;
        }
        self.expect_punct(';')?;
        self.nodes.push(DeclarationNode::Field {
            span: Span::new(start, self.prev_end()),
            attributes,
            type_ref,
            variables,
        });
        Ok(())
    }

    fn parse_type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.offset();
        let (name, _) = self.dotted()?;
        let mut args = Vec::new();
        if self.eat_punct('<') {
            loop {
                args.push(self.parse_type_ref()?);
                if !self.eat_punct(',') {
                    break;
                }
            }
            self.expect_punct('>')?;
        }
        self.eat_punct('?');
        let mut array = false;
        while self.at_punct('[') && self.peek_at(1).is_some_and(|t| t.is_punct(']')) {
            self.pos += 2;
            array = true;
        }

        let span = Span::new(start, self.prev_end());
        let text = span.slice(self.text).unwrap_or(&name).to_string();
        let symbol = if array {
            None
        } else {
            self.symbols.resolve_type(&name, &args)
        };
        Ok(TypeRef { span, text, symbol })
    }

    fn expr(&self, start: usize, constant: Option<ConstantValue>, node: ExprNode) -> Expr {
        Expr {
            span: Span::new(start, self.prev_end()),
            constant,
            node,
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        let tok = self
            .peek()
            .cloned()
            .ok_or_else(|| self.err("expected expression"))?;

        match tok.tok {
            Tok::Punct('[') => {
                let elements = self.parse_delimited('[', ']')?;
                Ok(self.expr(start, None, ExprNode::CollectionLiteral { elements }))
            }
            Tok::Punct('{') => {
                let elements = self.parse_delimited('{', '}')?;
                Ok(self.expr(start, None, ExprNode::ComplexElement { elements }))
            }
            Tok::Punct('(') => self.parse_paren_or_cast(),
            Tok::Punct('-') => {
                self.pos += 1;
                let operand = self.parse_expr()?;
                let constant = match operand.constant {
                    Some(ConstantValue::Int(v)) => Some(ConstantValue::Int(-v)),
                    _ => None,
                };
                let text = self.slice_from(start);
                Ok(self.expr(start, constant, ExprNode::Literal { text }))
            }
            Tok::Number(n) => {
                self.pos += 1;
                let text = self.slice_from(start);
                Ok(self.expr(start, Some(ConstantValue::Int(n)), ExprNode::Literal { text }))
            }
            Tok::Str(s) => {
                self.pos += 1;
                let text = self.slice_from(start);
                Ok(self.expr(start, Some(ConstantValue::Str(s)), ExprNode::Literal { text }))
            }
            Tok::Ident(word) if word == "new" => self.parse_new(),
            Tok::Ident(word) if word == "true" || word == "false" => {
                self.pos += 1;
                Ok(self.expr(
                    start,
                    Some(ConstantValue::Bool(word == "true")),
                    ExprNode::Literal { text: word },
                ))
            }
            Tok::Ident(word) if word == "null" => {
                self.pos += 1;
                Ok(self.expr(start, None, ExprNode::Literal { text: word }))
            }
            Tok::Ident(_) => self.parse_access(start),
            _ => Err(self.err("expected expression")),
        }
    }

    fn slice_from(&self, start: usize) -> String {
        self.text
            .get(start..self.prev_end())
            .unwrap_or_default()
            .to_string()
    }

    /// `A.B`, `A.B(args)`, `A.B(args).C(args)`
    fn parse_access(&mut self, start: usize) -> Result<Expr, ParseError> {
        let (path, _) = self.dotted()?;
        if !self.at_punct('(') {
            let constant = self.symbols.fold_member(&path);
            return Ok(self.expr(start, constant, ExprNode::MemberAccess { text: path }));
        }

        let mut arguments = self.parse_delimited('(', ')')?;
        while self.at_punct('.') {
            self.pos += 1;
            self.expect_ident()?;
            if self.at_punct('(') {
                arguments = self.parse_delimited('(', ')')?;
            }
        }
        let callee = self.slice_from(start);
        let callee = callee
            .rsplit_once('(')
            .map_or(callee.as_str(), |(c, _)| c)
            .to_string();
        Ok(self.expr(start, None, ExprNode::Invocation { callee, arguments }))
    }

    fn parse_paren_or_cast(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        let save = self.pos;
        self.expect_punct('(')?;

        if self.peek().and_then(Token::ident).is_some() {
            let (type_text, _) = self.dotted()?;
            let operand_follows = self.peek_at(1).is_some_and(|t| {
                matches!(
                    t.tok,
                    Tok::Ident(_) | Tok::Number(_) | Tok::Str(_) | Tok::Punct('(') | Tok::Punct('-')
                )
            });
            if self.at_punct(')') && operand_follows {
                self.pos += 1;
                let operand = self.parse_expr()?;
                let constant = match &operand.constant {
                    Some(ConstantValue::Int(v)) => Some(ConstantValue::Int(*v)),
                    _ => None,
                };
                return Ok(self.expr(
                    start,
                    constant,
                    ExprNode::Cast {
                        type_text,
                        operand: Box::new(operand),
                    },
                ));
            }
        }

        self.pos = save + 1;
        let inner = self.parse_expr()?;
        self.expect_punct(')')?;
        Ok(inner)
    }

    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        self.pos += 1;
        if self.at_punct('(') {
            self.skip_balanced('(', ')')?;
        } else {
            self.parse_type_ref()?;
            if self.at_punct('(') {
                self.skip_balanced('(', ')')?;
            }
        }
        let initializer = if self.at_punct('{') {
            Some(self.parse_initializer_list()?)
        } else {
            None
        };
        Ok(self.expr(start, None, ExprNode::ObjectCreation { initializer }))
    }

    fn parse_initializer_list(&mut self) -> Result<InitializerList, ParseError> {
        let open = self.expect_punct('{')?;
        let mut entries = Vec::new();
        while !self.at_punct('}') {
            entries.push(self.parse_entry()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        let close = self.expect_punct('}')?;
        Ok(InitializerList {
            span: Span::new(open.start, close.end),
            entries,
        })
    }

    fn parse_entry(&mut self) -> Result<Expr, ParseError> {
        let start = self.offset();
        let left = if self.at_punct('[') {
            let arguments = self.parse_delimited('[', ']')?;
            self.expr(start, None, ExprNode::ImplicitElementAccess { arguments })
        } else {
            self.parse_expr()?
        };
        if !self.eat_punct('=') {
            return Ok(left);
        }
        let right = self.parse_expr()?;
        Ok(self.expr(
            start,
            None,
            ExprNode::Assignment {
                left: Box::new(left),
                right: Box::new(right),
            },
        ))
    }

    /// Comma-separated expressions between `open` and `close`; a trailing comma is allowed.
    fn parse_delimited(&mut self, open: char, close: char) -> Result<Vec<Expr>, ParseError> {
        self.expect_punct(open)?;
        let mut items = Vec::new();
        while !self.at_punct(close) {
            items.push(self.parse_expr()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(close)?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ToyHost, color_program, snapshot};
    use pretty_assertions::assert_eq;

    fn only_node(s: &SourceSnapshot) -> &DeclarationNode {
        assert_eq!(s.documents[0].nodes.len(), 1);
        &s.documents[0].nodes[0]
    }

    fn initializer(node: &DeclarationNode) -> Option<&Expr> {
        match node {
            DeclarationNode::Field { variables, .. } => variables[0].initializer.as_ref(),
            DeclarationNode::Property { initializer, .. } => initializer.as_ref(),
            DeclarationNode::Other => None,
        }
    }

    #[test]
    fn enum_members_and_dictionary_types_are_resolved() {
        let text = color_program("Dictionary<Color, string> ColorToHex;");
        let s = snapshot("P.cs", &text).expect("parse");

        let color = s.types.iter().find(|t| t.id == "Color").expect("Color");
        assert_eq!(color.kind, TypeKind::Enum);
        let members: Vec<_> = color.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(members, vec!["Red", "Green", "Blue"]);

        let DeclarationNode::Field {
            attributes,
            type_ref,
            variables,
            ..
        } = only_node(&s)
        else {
            panic!("expected field");
        };
        assert_eq!(
            attributes[0].symbol,
            Some(SymbolIdentity::new(MARKER_MODULE, MARKER_NAME))
        );
        assert_eq!(type_ref.text, "Dictionary<Color, string>");
        assert_eq!(
            type_ref.symbol.as_deref(),
            Some("System.Collections.Generic.Dictionary<Color,System.String>")
        );
        assert_eq!(variables[0].name.text, "ColorToHex");
        assert_eq!(
            type_ref.span.slice(&text),
            Some("Dictionary<Color, string>")
        );
    }

    #[test]
    fn both_entry_forms_are_parsed_with_folded_keys() {
        let text = color_program(
            r##"Dictionary<Color, string> ColorToHex { get; } = new()
    {
        { Color.Red, "#FF0000" },
        [Color.Green] = "#00FF00",
    };"##,
        );
        let s = snapshot("P.cs", &text).expect("parse");
        let node = only_node(&s);
        assert!(matches!(node, DeclarationNode::Property { .. }));

        let Some(Expr {
            node: ExprNode::ObjectCreation {
                initializer: Some(list),
            },
            ..
        }) = initializer(node)
        else {
            panic!("expected object creation");
        };
        assert!(list.span.slice(&text).is_some_and(|t| t.starts_with('{') && t.ends_with('}')));
        assert_eq!(list.entries.len(), 2);

        let ExprNode::ComplexElement { elements } = &list.entries[0].node else {
            panic!("expected pair");
        };
        assert_eq!(elements[0].constant, Some(ConstantValue::Int(0)));

        let ExprNode::Assignment { left, right } = &list.entries[1].node else {
            panic!("expected indexer");
        };
        let ExprNode::ImplicitElementAccess { arguments } = &left.node else {
            panic!("expected element access");
        };
        assert_eq!(arguments[0].constant, Some(ConstantValue::Int(1)));
        assert_eq!(right.constant, Some(ConstantValue::Str("#00FF00".to_string())));
    }

    #[test]
    fn casts_and_empty_literals() {
        let text = color_program("Dictionary<Color, int> A = new() { { (Color)7, 1 } }, B = [];");
        let s = snapshot("P.cs", &text).expect("parse");
        let DeclarationNode::Field { variables, .. } = only_node(&s) else {
            panic!("expected field");
        };
        assert_eq!(variables.len(), 2);
        let Some(ExprNode::ObjectCreation {
            initializer: Some(list),
        }) = variables[0].initializer.as_ref().map(|e| &e.node)
        else {
            panic!("expected object creation");
        };
        let ExprNode::ComplexElement { elements } = &list.entries[0].node else {
            panic!("expected pair");
        };
        assert_eq!(elements[0].constant, Some(ConstantValue::Int(7)));
        assert!(matches!(
            variables[1].initializer.as_ref().map(|e| &e.node),
            Some(ExprNode::CollectionLiteral { elements }) if elements.is_empty()
        ));
    }

    #[test]
    fn local_marker_class_shadows_the_real_marker() {
        let text = "class ExhaustiveAttribute : System.Attribute { }\nclass P { [Exhaustive] Dictionary<int, int> M; }";
        let s = snapshot("P.cs", text).expect("parse");
        let DeclarationNode::Field { attributes, .. } = only_node(&s) else {
            panic!("expected field");
        };
        assert_eq!(
            attributes[0].symbol,
            Some(SymbolIdentity::new(LOCAL_MODULE, "ExhaustiveAttribute"))
        );
    }

    #[test]
    fn marker_needs_using_or_qualification() {
        let text = "class P { [Exhaustive] int A; [ExhaustiveDictionary.Exhaustive] int B; }";
        let s = snapshot("P.cs", text).expect("parse");
        let symbols: Vec<_> = s.documents[0]
            .nodes
            .iter()
            .map(|n| match n {
                DeclarationNode::Field { attributes, .. } => attributes[0].symbol.is_some(),
                _ => false,
            })
            .collect();
        assert_eq!(symbols, vec![false, true]);
    }

    #[test]
    fn methods_and_constructors_are_skipped() {
        let text = r#"
namespace Demo
{
    class P
    {
        public P() { Init(); }
        static void Main(string[] args) { var x = new P(); }
        int Count => 3;
        private readonly List<int> Items = Build().ToList();
    }
}
"#;
        let s = snapshot("P.cs", text).expect("parse");
        let DeclarationNode::Field { variables, .. } = only_node(&s) else {
            panic!("expected field");
        };
        assert!(matches!(
            variables[0].initializer.as_ref().map(|e| &e.node),
            Some(ExprNode::Invocation { .. })
        ));
    }

    #[test]
    fn enums_declared_in_other_documents_fold() {
        let s = ToyHost::new()
            .with_document("Color.cs", "enum Color { Red = 1, Green = Red, Blue = -4 }")
            .with_document("P.cs", "class P { int X = Color.Blue; }")
            .snapshot()
            .expect("parse");
        let node = &s.documents[1].nodes[0];
        assert_eq!(
            initializer(node).and_then(|e| e.constant.clone()),
            Some(ConstantValue::Int(-4))
        );
    }

    #[test]
    fn unknown_types_stay_unresolved() {
        let s = snapshot("P.cs", "class P { Widget<int> W; }").expect("parse");
        let DeclarationNode::Field { type_ref, .. } = only_node(&s) else {
            panic!("expected field");
        };
        assert_eq!(type_ref.symbol, None);
    }

    #[test]
    fn parse_errors_carry_offsets() {
        let err = snapshot("P.cs", "class P { int X = ; }").unwrap_err();
        assert_eq!(err.path, "P.cs");
        assert_eq!(err.offset, 18);
    }
}
