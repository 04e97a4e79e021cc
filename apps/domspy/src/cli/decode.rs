use encoding_rs::Encoding;
use encoding_rs::UTF_8;

const CHARSET_SNIFF_BYTES: usize = 8192;
const CHARSET_KEY: &[u8] = b"charset=";

/// Decodes an HTML file: byte order mark first, then a `charset=` declaration
/// in the first 8 KiB, then UTF-8.
pub(super) fn decode_html(body: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        let (decoded, _) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return decoded.into_owned();
    }

    let encoding = sniff_meta_encoding(body).unwrap_or(UTF_8);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// First `charset=` declaration whose label names a known encoding.
pub(super) fn sniff_meta_encoding(body: &[u8]) -> Option<&'static Encoding> {
    let prefix = &body[..body.len().min(CHARSET_SNIFF_BYTES)];
    prefix
        .windows(CHARSET_KEY.len())
        .enumerate()
        .filter(|(_, window)| window.eq_ignore_ascii_case(CHARSET_KEY))
        .find_map(|(at, _)| {
            charset_label(&prefix[at + CHARSET_KEY.len()..]).and_then(Encoding::for_label)
        })
}

fn charset_label(rest: &[u8]) -> Option<&[u8]> {
    let rest = rest.trim_ascii_start();
    let (quote, rest) = match rest.split_first() {
        Some((&quote @ (b'"' | b'\''), tail)) => (Some(quote), tail),
        _ => (None, rest),
    };
    let end = rest
        .iter()
        .position(|&byte| match quote {
            Some(quote) => byte == quote,
            None => {
                byte.is_ascii_whitespace() || matches!(byte, b'"' | b'\'' | b';' | b'>' | b'/')
            }
        })
        .unwrap_or(rest.len());
    let label = rest[..end].trim_ascii();
    (!label.is_empty()).then_some(label)
}
