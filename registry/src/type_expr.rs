//! Type expressions for declarative definitions.
//!
//! Definitions spell field types as text: `int`, `Optional[float]`,
//! `List[List[Optional[int]]]`, `Dict[str, str]` or the name of another
//! schema. [`TypeExpr::parse`] turns that text into a tree, and
//! [`TypeExpr::resolve`] turns the tree into a core
//! [`TypeDescriptor`], looking schema names up as it goes.

use std::fmt;
use std::sync::Arc;

use record_schema_core::{Kind, Schema, TypeDescriptor};

use crate::error::{RegistryError, Result};

/// Deepest nesting of bracketed arguments a type expression may use.
const MAX_DEPTH: usize = 32;

/// Parsed field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `int`, `float`, `str`, `bool`, `dict`, `list` or `datetime`.
    Primitive(Kind),
    /// `Optional[T]`.
    Optional(Box<TypeExpr>),
    /// `List` or `List[T]`.
    List(Option<Box<TypeExpr>>),
    /// `Dict` or `Dict[K, V]`.
    Dict(Option<(Box<TypeExpr>, Box<TypeExpr>)>),
    /// Reference to another schema by name.
    Named(String),
}

impl TypeExpr {
    /// Parses a type expression.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidTypeExpr`] with the byte offset of the first
    /// problem, including type arguments nested more than 32 levels deep.
    ///
    /// # Examples
    ///
    /// ```
    /// use record_schema_registry::TypeExpr;
    ///
    /// let expr = TypeExpr::parse("Optional[ List[Car] ]").unwrap();
    /// assert_eq!(expr.to_string(), "Optional[List[Car]]");
    /// assert_eq!(expr.references(), vec!["Car"]);
    ///
    /// assert!(TypeExpr::parse("Optional[int, str]").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        parser.skip_whitespace();
        if parser.pos < input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Names of all schemas referenced anywhere in the expression.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Primitive(_) | TypeExpr::List(None) | TypeExpr::Dict(None) => {}
            TypeExpr::Optional(inner) | TypeExpr::List(Some(inner)) => {
                inner.collect_references(names)
            }
            TypeExpr::Dict(Some((key, value))) => {
                key.collect_references(names);
                value.collect_references(names);
            }
            TypeExpr::Named(name) => names.push(name),
        }
    }

    /// Converts to a [`TypeDescriptor`], resolving schema names via `lookup`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownSchema`] if `lookup` does not know a name.
    pub fn resolve<F>(&self, lookup: &F) -> Result<TypeDescriptor>
    where
        F: Fn(&str) -> Option<Arc<Schema>>,
    {
        let descriptor = match self {
            TypeExpr::Primitive(kind) => TypeDescriptor::Primitive(*kind),
            TypeExpr::Optional(inner) => TypeDescriptor::optional(inner.resolve(lookup)?),
            TypeExpr::List(None) => TypeDescriptor::Sequence(None),
            TypeExpr::List(Some(elem)) => TypeDescriptor::list_of(elem.resolve(lookup)?),
            TypeExpr::Dict(None) => TypeDescriptor::Mapping {
                key: None,
                value: None,
            },
            TypeExpr::Dict(Some((key, value))) => {
                TypeDescriptor::dict_of(key.resolve(lookup)?, value.resolve(lookup)?)
            }
            TypeExpr::Named(name) => {
                let schema =
                    lookup(name).ok_or_else(|| RegistryError::UnknownSchema(name.clone()))?;
                TypeDescriptor::Nested(schema)
            }
        };
        Ok(descriptor)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(kind) => write!(f, "{kind}"),
            TypeExpr::Optional(inner) => write!(f, "Optional[{inner}]"),
            TypeExpr::List(None) => f.write_str("List"),
            TypeExpr::List(Some(elem)) => write!(f, "List[{elem}]"),
            TypeExpr::Dict(None) => f.write_str("Dict"),
            TypeExpr::Dict(Some((key, value))) => write!(f, "Dict[{key}, {value}]"),
            TypeExpr::Named(name) => f.write_str(name),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> Result<TypeExpr> {
        self.skip_whitespace();
        let start = self.pos;
        let name = self.ident()?;
        let args = if self.eat('[') {
            if self.depth == MAX_DEPTH {
                return Err(self.error("type arguments nested too deeply"));
            }
            self.depth += 1;
            let args = self.args()?;
            self.depth -= 1;
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            Some(args)
        } else {
            None
        };

        let arity_error = |expected: &str| RegistryError::InvalidTypeExpr {
            expr: self.input.to_string(),
            offset: start,
            message: format!("{name} takes {expected}"),
        };

        let expr = match (name, args) {
            ("Optional", Some(mut args)) if args.len() == 1 => {
                TypeExpr::Optional(Box::new(args.remove(0)))
            }
            ("Optional", _) => return Err(arity_error("exactly one type argument")),
            ("List", None) => TypeExpr::List(None),
            ("List", Some(mut args)) if args.len() == 1 => {
                TypeExpr::List(Some(Box::new(args.remove(0))))
            }
            ("List", _) => return Err(arity_error("zero or one type argument")),
            ("Dict", None) => TypeExpr::Dict(None),
            ("Dict", Some(args)) if args.len() == 2 => {
                let mut args = args.into_iter();
                match (args.next(), args.next()) {
                    (Some(key), Some(value)) => {
                        TypeExpr::Dict(Some((Box::new(key), Box::new(value))))
                    }
                    _ => return Err(arity_error("zero or two type arguments")),
                }
            }
            ("Dict", _) => return Err(arity_error("zero or two type arguments")),
            (name, None) => match Kind::parse(name) {
                Some(kind) => TypeExpr::Primitive(kind),
                None => TypeExpr::Named(name.to_string()),
            },
            (_, Some(_)) => return Err(arity_error("no type arguments")),
        };
        Ok(expr)
    }

    fn args(&mut self) -> Result<Vec<TypeExpr>> {
        let mut args = vec![self.expr()?];
        while self.eat(',') {
            args.push(self.expr()?);
        }
        Ok(args)
    }

    fn ident(&mut self) -> Result<&'a str> {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(i, c)| !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&input[start..self.pos])
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.input[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: &str) -> RegistryError {
        RegistryError::InvalidTypeExpr {
            expr: self.input.to_string(),
            offset: self.pos,
            message: message.to_string(),
        }
    }
}
