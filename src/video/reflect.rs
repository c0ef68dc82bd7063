//! A small reflection pass over GLSL sources.
//!
//! It understands just enough of the language to list the uniforms a program
//! declares, with structs and arrays flattened to leaf names the same way an
//! OpenGL implementation reports active uniforms, e.g. `gPointLights[2].Atten.Exp`.

use crate::utils::prelude::FastHashMap;

use super::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Number(&'a str),
    Punct(char),
}

#[derive(Debug, Clone)]
struct Member {
    ty: String,
    name: String,
    len: Option<usize>,
}

#[derive(Default)]
struct Declarations {
    consts: FastHashMap<String, usize>,
    structs: FastHashMap<String, Vec<Member>>,
    uniforms: Vec<Member>,
}

/// Returns the fully qualified names of all the leaf uniforms declared in `source`,
/// in declaration order.
pub fn declared_uniforms(source: &str) -> Result<Vec<String>> {
    let stripped = strip(source);
    let tokens = tokenize(&stripped)?;
    let decls = parse(&tokens)?;

    let mut names = Vec::new();
    for v in &decls.uniforms {
        flatten(&decls, &v.ty, &v.name, v.len, &mut names, 0)?;
    }

    Ok(names)
}

/// Removes comments and preprocessor lines.
fn strip(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut line_start = true;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    if n == '\n' {
                        out.push('\n');
                    }
                    prev = n;
                }
                out.push(' ');
            }
            '#' if line_start => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => {
                if c == '\n' {
                    line_start = true;
                } else if !c.is_whitespace() {
                    line_start = false;
                }
                out.push(c);
            }
        }
    }

    out
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
            {
                i += 1;
            }
            tokens.push(Token::Ident(&source[start..i]));
        } else if c.is_ascii_digit() || (c == '.' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit()) {
            let start = i;
            while i < bytes.len() && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'.')
            {
                i += 1;
            }
            tokens.push(Token::Number(&source[start..i]));
        } else if c.is_ascii() {
            tokens.push(Token::Punct(c));
            i += 1;
        } else {
            return Err(Error::Reflection(format!(
                "unexpected character '{}'.",
                source[i..].chars().next().unwrap_or('?')
            )));
        }
    }

    Ok(tokens)
}

struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token<'a>> {
        let v = self.tokens.get(self.pos);
        self.pos += 1;
        v
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&Token::Punct(c))
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        match self.next() {
            Some(Token::Punct(v)) if *v == c => Ok(()),
            other => Err(Error::Reflection(format!(
                "expected '{}', found {:?}.",
                c, other
            ))),
        }
    }

    fn expect_ident(&mut self) -> Result<&'a str> {
        match self.next() {
            Some(Token::Ident(v)) => Ok(*v),
            other => Err(Error::Reflection(format!(
                "expected identifier, found {:?}.",
                other
            ))),
        }
    }

    /// Skips a statement or a function definition at the current nesting level.
    fn skip_statement(&mut self) -> Result<()> {
        let mut depth = 0usize;
        while let Some(token) = self.next() {
            match *token {
                Token::Punct('{') => depth += 1,
                Token::Punct('}') => {
                    if depth == 0 {
                        return Err(Error::Reflection("unbalanced '}'.".into()));
                    }

                    depth -= 1;
                    if depth == 0 {
                        // A function body ends the definition, a struct or an
                        // initializer list is followed by ';'.
                        if self.is_punct(';') {
                            self.pos += 1;
                        }
                        return Ok(());
                    }
                }
                Token::Punct(';') if depth == 0 => return Ok(()),
                _ => {}
            }
        }

        if depth > 0 {
            Err(Error::Reflection("unbalanced '{'.".into()))
        } else {
            Ok(())
        }
    }
}

fn is_qualifier(v: &str) -> bool {
    match v {
        "lowp" | "mediump" | "highp" | "flat" | "smooth" | "noperspective" => true,
        _ => false,
    }
}

fn parse(tokens: &[Token]) -> Result<Declarations> {
    let mut decls = Declarations::default();
    let mut cursor = Cursor { tokens, pos: 0 };

    while let Some(token) = cursor.peek() {
        match *token {
            Token::Ident("struct") => {
                cursor.next();
                parse_struct(&mut cursor, &mut decls)?;
            }
            Token::Ident("uniform") => {
                cursor.next();
                let members = parse_members(&mut cursor, &decls)?;
                decls.uniforms.extend(members);
            }
            Token::Ident("const") => {
                let checkpoint = cursor.pos;
                cursor.next();
                if !parse_const(&mut cursor, &mut decls) {
                    cursor.pos = checkpoint;
                    cursor.skip_statement()?;
                }
            }
            _ => cursor.skip_statement()?,
        }
    }

    Ok(decls)
}

/// Parses `const int NAME = N;`, other constants are left to the caller.
fn parse_const(cursor: &mut Cursor, decls: &mut Declarations) -> bool {
    match (cursor.next(), cursor.next(), cursor.next(), cursor.next(), cursor.next()) {
        (
            Some(Token::Ident(ty)),
            Some(Token::Ident(name)),
            Some(Token::Punct('=')),
            Some(Token::Number(value)),
            Some(Token::Punct(';')),
        ) if *ty == "int" || *ty == "uint" => match value.trim_end_matches('u').parse::<usize>() {
            Ok(v) => {
                decls.consts.insert((*name).to_owned(), v);
                true
            }
            Err(_) => false,
        },
        _ => false,
    }
}

fn parse_struct(cursor: &mut Cursor, decls: &mut Declarations) -> Result<()> {
    let name = cursor.expect_ident()?;
    cursor.expect_punct('{')?;

    let mut members = Vec::new();
    while !cursor.is_punct('}') {
        if cursor.peek().is_none() {
            return Err(Error::Reflection(format!("struct {} is not closed.", name)));
        }

        members.extend(parse_members(cursor, decls)?);
    }

    cursor.expect_punct('}')?;

    // `struct A { .. } a;` declares a variable as well, which is not a uniform.
    if !cursor.is_punct(';') {
        cursor.skip_statement()?;
    } else {
        cursor.next();
    }

    decls.structs.insert(name.to_owned(), members);
    Ok(())
}

/// Parses `type a[N], b;` after any leading storage keyword has been consumed.
fn parse_members(cursor: &mut Cursor, decls: &Declarations) -> Result<Vec<Member>> {
    let mut ty = cursor.expect_ident()?;
    while is_qualifier(ty) {
        ty = cursor.expect_ident()?;
    }

    let mut members = Vec::new();
    loop {
        let name = cursor.expect_ident()?;
        let len = if cursor.is_punct('[') {
            cursor.next();
            let len = match cursor.next() {
                Some(Token::Number(v)) => v
                    .trim_end_matches('u')
                    .parse::<usize>()
                    .map_err(|_| Error::Reflection(format!("invalid array size {}.", v)))?,
                Some(Token::Ident(v)) => *decls
                    .consts
                    .get(*v)
                    .ok_or_else(|| Error::Reflection(format!("unknown array size {}.", v)))?,
                other => {
                    return Err(Error::Reflection(format!(
                        "invalid array size {:?}.",
                        other
                    )));
                }
            };
            cursor.expect_punct(']')?;
            Some(len)
        } else {
            None
        };

        members.push(Member {
            ty: ty.to_owned(),
            name: name.to_owned(),
            len,
        });

        match cursor.next() {
            Some(Token::Punct(',')) => continue,
            Some(Token::Punct(';')) => break,
            other => {
                return Err(Error::Reflection(format!(
                    "expected ';' after {}, found {:?}.",
                    name, other
                )));
            }
        }
    }

    Ok(members)
}

const MAX_STRUCT_DEPTH: usize = 8;

fn flatten(
    decls: &Declarations,
    ty: &str,
    prefix: &str,
    len: Option<usize>,
    out: &mut Vec<String>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_STRUCT_DEPTH {
        return Err(Error::Reflection(format!("struct {} nests too deep.", ty)));
    }

    let prefixes: Vec<String> = match len {
        Some(n) => (0..n).map(|i| format!("{}[{}]", prefix, i)).collect(),
        None => vec![prefix.to_owned()],
    };

    match decls.structs.get(ty) {
        Some(members) => {
            for p in &prefixes {
                for m in members {
                    let path = format!("{}.{}", p, m.name);
                    flatten(decls, &m.ty, &path, m.len, out, depth + 1)?;
                }
            }
        }
        None => out.extend(prefixes),
    }

    Ok(())
}
