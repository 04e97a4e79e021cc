use crate::entities::decode_entities;
use ds_dom::is_raw_text_element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
    Comment(String),
    Doctype(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// Tokenizes `source`, joining adjacent runs of text into one token.
pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    for token in Tokenizer::new(source) {
        if let (Token::Text(text), Some(Token::Text(previous))) = (&token, out.last_mut()) {
            previous.push_str(text);
            continue;
        }
        out.push(token);
    }
    out
}

/// What a `<` at the cursor turned out to open.
enum Markup {
    Token(Token),
    /// Consumed but produces nothing, such as a non-doctype `<!...>`.
    Skipped,
    /// Opens nothing; the `<` is text.
    Literal,
}

struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    raw_text_of: Option<String>,
    pending: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            raw_text_of: None,
            pending: None,
        }
    }

    fn rest(&self) -> &'a str {
        let source = self.source;
        &source[self.pos..]
    }

    /// Moves the cursor to where `rest`, a suffix of the source, begins.
    fn resume_at(&mut self, rest: &str) {
        self.pos = self.source.len() - rest.len();
    }

    fn text_run(&mut self, skip: usize) -> Token {
        let rest = self.rest();
        let end = rest[skip..].find('<').map_or(rest.len(), |at| at + skip);
        self.pos += end;
        Token::Text(rest[..end].to_owned())
    }

    fn markup(&mut self) -> Markup {
        let rest = self.rest();
        if let Some(body) = rest.strip_prefix("<!--") {
            let (comment, tail) = body.split_once("-->").unwrap_or((body, ""));
            self.resume_at(tail);
            Markup::Token(Token::Comment(comment.to_owned()))
        } else if let Some(body) = rest.strip_prefix("</") {
            self.end_tag(body)
        } else if let Some(body) = rest.strip_prefix("<!") {
            let (declaration, tail) = body.split_once('>').unwrap_or((body, ""));
            self.resume_at(tail);
            doctype_name(declaration).map_or(Markup::Skipped, |name| {
                Markup::Token(Token::Doctype(name))
            })
        } else if let Some(body) = rest.strip_prefix("<?") {
            let (instruction, tail) = match body.find('>') {
                Some(gt) => (body[..gt].strip_suffix('?').unwrap_or(&body[..gt]), &body[gt + 1..]),
                None => (body, ""),
            };
            self.resume_at(tail);
            Markup::Token(processing_instruction(instruction))
        } else {
            self.start_tag(&rest[1..])
        }
    }

    fn end_tag(&mut self, body: &'a str) -> Markup {
        let (name, after) = split_name(body.trim_ascii_start());
        let Some(gt) = after.find('>').filter(|_| !name.is_empty()) else {
            return Markup::Literal;
        };
        self.resume_at(&after[gt + 1..]);
        Markup::Token(Token::End {
            name: name.to_ascii_lowercase(),
        })
    }

    fn start_tag(&mut self, body: &'a str) -> Markup {
        if !body.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            return Markup::Literal;
        }
        let (name, mut rest) = split_name(body);
        let name = name.to_ascii_lowercase();
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            rest = rest.trim_ascii_start();
            if let Some(tail) = rest.strip_prefix('>') {
                rest = tail;
                break;
            }
            if let Some(tail) = rest.strip_prefix('/') {
                self_closing = true;
                rest = tail.trim_ascii_start();
                if let Some(tail) = rest.strip_prefix('>') {
                    rest = tail;
                    break;
                }
                continue;
            }
            if rest.is_empty() {
                return Markup::Literal;
            }

            let (attr_name, after_name) = split_name(rest);
            if attr_name.is_empty() {
                // Garbage inside the tag ends it at the next `>`.
                rest = rest.split_once('>').map_or("", |(_, tail)| tail);
                break;
            }

            rest = after_name.trim_ascii_start();
            let mut value = "";
            if let Some(tail) = rest.strip_prefix('=') {
                (value, rest) = attribute_value(tail.trim_ascii_start());
            }

            // Duplicate names keep their first value.
            let attr_name = attr_name.to_ascii_lowercase();
            if !attrs.iter().any(|(existing, _)| *existing == attr_name) {
                attrs.push((attr_name, decode_entities(value).into_owned()));
            }
        }

        self.resume_at(rest);
        if !self_closing && is_raw_text_element(&name) {
            self.raw_text_of = Some(name.clone());
        }
        Markup::Token(Token::Start {
            name,
            attrs,
            self_closing,
        })
    }

    /// Consumes an element body up to its matching end tag, queueing that tag.
    fn raw_text(&mut self, tag: String) -> Option<Token> {
        let rest = self.rest();
        let (body, tail) = match find_raw_text_close(rest, &tag) {
            Some((at, tail)) => {
                self.pending = Some(Token::End { name: tag });
                (&rest[..at], tail)
            }
            None => (rest, ""),
        };
        self.resume_at(tail);
        (!body.is_empty()).then(|| Token::Text(body.to_owned()))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(tag) = self.raw_text_of.take() {
            if let Some(text) = self.raw_text(tag) {
                return Some(text);
            }
        }
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }
            if !rest.starts_with('<') {
                return Some(self.text_run(0));
            }
            match self.markup() {
                Markup::Token(token) => return Some(token),
                Markup::Skipped => continue,
                Markup::Literal => return Some(self.text_run(1)),
            }
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':')
}

fn split_name(input: &str) -> (&str, &str) {
    input.split_at(input.find(|ch: char| !is_name_char(ch)).unwrap_or(input.len()))
}

fn attribute_value(input: &str) -> (&str, &str) {
    match input.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let quoted = &input[1..];
            quoted.split_once(quote).unwrap_or((quoted, ""))
        }
        _ => input.split_at(
            input
                .find(|ch: char| ch.is_ascii_whitespace() || matches!(ch, '>' | '/'))
                .unwrap_or(input.len()),
        ),
    }
}

fn doctype_name(declaration: &str) -> Option<String> {
    let mut words = declaration.split_ascii_whitespace();
    if !words.next()?.eq_ignore_ascii_case("doctype") {
        return None;
    }
    Some(words.next().unwrap_or("html").to_ascii_lowercase())
}

fn processing_instruction(body: &str) -> Token {
    let body = body.trim();
    let (target, data) = body
        .split_once(|ch: char| ch.is_ascii_whitespace())
        .unwrap_or((body, ""));
    Token::ProcessingInstruction {
        target: target.to_owned(),
        data: data.trim().to_owned(),
    }
}

/// Finds `</tag\s*>` ignoring case; yields its offset and the input after it.
fn find_raw_text_close<'a>(input: &'a str, tag: &str) -> Option<(usize, &'a str)> {
    let mut from = 0;
    while let Some(found) = input[from..].find("</") {
        let at = from + found;
        let after = &input[at + 2..];
        let closes = after
            .get(..tag.len())
            .is_some_and(|name| name.eq_ignore_ascii_case(tag));
        if closes {
            if let Some(tail) = after[tag.len()..].trim_ascii_start().strip_prefix('>') {
                return Some((at, tail));
            }
        }
        from = at + 2;
    }
    None
}
