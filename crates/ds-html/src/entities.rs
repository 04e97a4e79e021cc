use std::borrow::Cow;

const NAMED_REFERENCES: [(&str, char); 15] = [
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
    ("hellip", '\u{2026}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("laquo", '\u{ab}'),
    ("raquo", '\u{bb}'),
    ("middot", '\u{b7}'),
];

/// Replaces `&name;`, `&#N;` and `&#xH;` references.
///
/// Unknown or unterminated references stay as written.
pub(crate) fn decode_entities(input: &str) -> Cow<'_, str> {
    let Some(first) = input.find('&') else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len());
    let (plain, mut rest) = input.split_at(first);
    out.push_str(plain);

    while let Some(after_amp) = rest.strip_prefix('&') {
        let resolved = after_amp
            .split_once(';')
            .and_then(|(name, tail)| Some((resolve_reference(name)?, tail)));
        rest = match resolved {
            Some((ch, tail)) => {
                out.push(ch);
                tail
            }
            None => {
                out.push('&');
                after_amp
            }
        };

        let (plain, tail) = rest.split_at(rest.find('&').unwrap_or(rest.len()));
        out.push_str(plain);
        rest = tail;
    }

    Cow::Owned(out)
}

fn resolve_reference(name: &str) -> Option<char> {
    let Some(numeric) = name.strip_prefix('#') else {
        return NAMED_REFERENCES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, ch)| *ch);
    };
    let code = match numeric.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => numeric.parse().ok()?,
    };
    char::from_u32(code)
}
