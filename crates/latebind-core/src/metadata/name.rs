//! Type-name parser.
//!
//! Grammar:
//!
//! ```text
//! type   = base suffix*
//! base   = "!" digits | name ("<" type ("," type)* ">")?
//! suffix = "[]" | "&"
//! ```
//!
//! `name` is a full type name (`System.Func`2`) that must already be defined
//! in the universe. `!n` is the n-th parameter of the declaring definition.

use super::error::UniverseError;
use super::types::TypeRef;
use super::universe::TypeUniverse;

pub(crate) fn parse_type_name(input: &str, universe: &TypeUniverse) -> Result<TypeRef, UniverseError> {
    let mut parser = NameParser {
        input,
        pos: 0,
        universe,
    };
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos != input.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(ty)
}

struct NameParser<'a> {
    input: &'a str,
    pos: usize,
    universe: &'a TypeUniverse,
}

impl<'a> NameParser<'a> {
    fn parse_type(&mut self) -> Result<TypeRef, UniverseError> {
        self.skip_ws();
        let mut ty = if self.eat("!") {
            self.parse_var()?
        } else {
            self.parse_named()?
        };

        loop {
            self.skip_ws();
            if self.eat("[]") {
                ty = TypeRef::array_of(ty);
            } else if self.eat("&") {
                ty = TypeRef::by_ref(ty);
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_var(&mut self) -> Result<TypeRef, UniverseError> {
        let digits = self.take_while(|c| c.is_ascii_digit());
        digits
            .parse::<u16>()
            .map(TypeRef::Var)
            .map_err(|_| self.error("expected a parameter index after `!`"))
    }

    fn parse_named(&mut self) -> Result<TypeRef, UniverseError> {
        let name = self.take_while(is_name_char);
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        let id = self
            .universe
            .find(name)
            .ok_or_else(|| UniverseError::UnknownType(name.to_owned()))?;

        self.skip_ws();
        if !self.eat("<") {
            return Ok(TypeRef::Def(id));
        }

        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            self.skip_ws();
            if self.eat(",") {
                continue;
            }
            if self.eat(">") {
                break;
            }
            return Err(self.error("expected `,` or `>`"));
        }

        let expected = self.universe.get(id).arity();
        if args.len() != expected {
            return Err(UniverseError::ArityMismatch {
                name: name.to_owned(),
                expected,
                found: args.len(),
            });
        }
        Ok(TypeRef::Generic { def: id, args })
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let input: &'a str = self.input;
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !pred(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
        &input[start..self.pos]
    }

    fn error(&self, reason: &'static str) -> UniverseError {
        UniverseError::MalformedTypeName {
            name: self.input.to_owned(),
            offset: self.pos,
            reason,
        }
    }
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '<' | '>' | ',' | '[' | ']' | '&' | '!')
}
