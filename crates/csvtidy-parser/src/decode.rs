use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::errors::{EncodingError, ParserError};

pub(crate) struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
}

pub(crate) fn decode<'a>(
    bytes: &'a [u8],
    declared: Option<&str>,
) -> Result<Decoded<'a>, ParserError> {
    let declared = match declared.map(str::trim).filter(|label| !label.is_empty()) {
        Some(label) => Some(Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            EncodingError::UnknownLabel {
                label: label.to_string(),
            }
        })?),
        None => None,
    };

    let (encoding, body_start) = match (Encoding::for_bom(bytes), declared) {
        (Some((detected, _)), Some(declared)) if detected != declared => {
            return Err(ParserError::InconsistentEncoding {
                declared: declared.name(),
                detected: detected.name(),
            });
        }
        (Some((detected, bom_len)), _) => (detected, bom_len),
        (None, Some(declared)) => (declared, 0),
        (None, None) => (UTF_8, 0),
    };

    let body = &bytes[body_start..];
    let text = if encoding == UTF_8 {
        let text = std::str::from_utf8(body).map_err(|err| EncodingError::Undecodable {
            encoding: UTF_8.name(),
            offset: Some(body_start + err.valid_up_to()),
        })?;
        Cow::Borrowed(text)
    } else {
        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or(EncodingError::Undecodable {
                encoding: encoding.name(),
                offset: None,
            })?
    };

    Ok(Decoded { text, encoding })
}
