//! `application/x-www-form-urlencoded` decoding

use bytes::Bytes;

use super::FormField;

/// Decode an urlencoded body into fields, in body order
///
/// Pairs are separated by `&` or `;`. Blank values are kept and a name
/// without `=` gets an empty value.
pub(super) fn parse(body: &[u8]) -> Vec<FormField> {
    body.split(|&b| b == b'&' || b == b';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = match pair.iter().position(|&b| b == b'=') {
                Some(eq) => (&pair[..eq], &pair[eq + 1..]),
                None => (pair, &[][..]),
            };
            FormField {
                name: String::from_utf8_lossy(&decode(name)).into_owned(),
                value: Bytes::from(decode(value)),
                filename: None,
            }
        })
        .collect()
}

fn decode(component: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = component
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    urlencoding::decode_binary(&spaced).into_owned()
}
