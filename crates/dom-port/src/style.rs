use cssparser::{Delimiter, ParseError, Parser, ParserInput};

/// Inline `style` declarations in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Tokenizes with `cssparser`, so `;` inside strings, `url()` and other
    /// blocks stays part of the value. Malformed declarations are dropped.
    pub(crate) fn parse(raw: &str) -> Self {
        let mut input = ParserInput::new(raw);
        let mut parser = Parser::new(&mut input);
        let mut declarations = Vec::new();
        while !parser.is_exhausted() {
            let parsed: Result<(String, String), ParseError<'_, ()>> =
                parser.parse_until_after(Delimiter::Semicolon, |decl| {
                    let name = decl.expect_ident()?.to_ascii_lowercase();
                    decl.expect_colon()?;
                    let start = decl.position();
                    while decl.next().is_ok() {}
                    Ok((name, decl.slice_from(start).trim().to_string()))
                });
            if let Ok(declaration) = parsed {
                declarations.push(declaration);
            }
        }
        Self { declarations }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        // later declarations win
        self.declarations
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn set(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        self.declarations.retain(|(key, _)| key != &name);
        self.declarations.push((name, value.trim().to_string()));
    }

    pub(crate) fn serialize(&self) -> String {
        self.declarations
            .iter()
            .map(|(key, value)| format!("{key}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
