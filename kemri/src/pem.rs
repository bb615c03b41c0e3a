use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

const PEM_HEADER_START: &str = "-----BEGIN";
const PEM_HEADER_END: &str = "-----END";
const PEM_DASHES_BOUNDARIES: &str = "-----";

/// Label used when writing an envelope ContentInfo as PEM.
pub const ENVELOPE_PEM_LABEL: &str = "CMS";
pub const CERTIFICATE_PEM_LABEL: &str = "CERTIFICATE";
pub const PRIVATE_KEY_PEM_LABEL: &str = "PRIVATE KEY";
pub const PUBLIC_KEY_PEM_LABEL: &str = "PUBLIC KEY";

#[derive(Debug, Clone, Error)]
pub enum PemError {
    /// pem header not found
    #[error("pem header not found")]
    HeaderNotFound,

    /// invalid pem header
    #[error("invalid pem header")]
    InvalidHeader,

    /// pem footer not found
    #[error("pem footer not found")]
    FooterNotFound,

    /// couldn't decode base64
    #[error("couldn't decode base64: {source}")]
    Base64Decoding { source: base64::DecodeError },
}

// https://tools.ietf.org/html/rfc7468
#[derive(Debug, Clone, PartialEq)]
pub struct Pem<'a> {
    label: String,
    data: Cow<'a, [u8]>,
}

impl<'a> Pem<'a> {
    pub fn new<S: Into<String>, D: Into<Cow<'a, [u8]>>>(label: S, data: D) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Cow<'a, [u8]> {
        self.data
    }
}

impl FromStr for Pem<'static> {
    type Err = PemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pem(s.as_bytes())
    }
}

impl fmt::Display for Pem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}-----", PEM_HEADER_START, self.label)?;

        let encoded = BASE64.encode(&self.data);
        let bytes = encoded.as_bytes();
        for chunk in bytes.chunks(64) {
            let chunk = std::str::from_utf8(chunk).map_err(|_| fmt::Error)?;
            writeln!(f, "{}", chunk)?;
        }

        write!(f, "{} {}-----", PEM_HEADER_END, self.label)?;

        Ok(())
    }
}

/// Read a PEM-encoded structure
///
/// If the input contains line ending characters (`\r`, `\n`), a copy of input
/// is allocated striping these. If you can strip these with minimal data copy
/// you should do it beforehand.
pub fn parse_pem<T: ?Sized + AsRef<[u8]>>(input: &T) -> Result<Pem<'static>, PemError> {
    parse_pem_impl(input.as_ref())
}

fn parse_pem_impl(input: &[u8]) -> Result<Pem<'static>, PemError> {
    let header_start_idx = find(input, PEM_HEADER_START.as_bytes()).ok_or(PemError::HeaderNotFound)?;

    let label_start_idx = header_start_idx + PEM_HEADER_START.len();
    let label_end_idx = find(&input[label_start_idx..], b"-").ok_or(PemError::InvalidHeader)? + label_start_idx;
    let label = String::from_utf8_lossy(&input[label_start_idx..label_end_idx])
        .trim()
        .to_owned();

    let header_end_idx = find(&input[label_end_idx..], PEM_DASHES_BOUNDARIES.as_bytes())
        .ok_or(PemError::InvalidHeader)?
        + label_end_idx
        + PEM_DASHES_BOUNDARIES.len();

    let footer_start_idx =
        find(&input[header_end_idx..], PEM_HEADER_END.as_bytes()).ok_or(PemError::FooterNotFound)? + header_end_idx;

    let raw_data = &input[header_end_idx..footer_start_idx];

    let data = if find(raw_data, b"\n").is_some() {
        // line endings have to be stripped, which means a copy
        let stripped_raw_data: Vec<u8> = raw_data
            .iter()
            .copied()
            .filter(|byte| *byte != b'\r' && *byte != b'\n')
            .collect();
        BASE64
            .decode(&stripped_raw_data)
            .map_err(|source| PemError::Base64Decoding { source })?
    } else {
        BASE64
            .decode(raw_data)
            .map_err(|source| PemError::Base64Decoding { source })?
    };

    Ok(Pem {
        label,
        data: Cow::Owned(data),
    })
}

fn find(buffer: &[u8], value: &[u8]) -> Option<usize> {
    buffer.windows(value.len()).position(|window| window == value)
}

/// Build a PEM-encoded structure into a String.
pub fn to_pem<S, T>(label: S, data: &T) -> String
where
    S: Into<String>,
    T: ?Sized + AsRef<[u8]>,
{
    Pem::new(label, data.as_ref()).to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FLATTENED_PEM: &str = "-----BEGIN GARBAGE-----R0FSQkFHRQ==-----END GARBAGE-----";

    #[test]
    fn pem_round_trip() {
        let pem = to_pem(ENVELOPE_PEM_LABEL, &[1u8, 2, 3, 4, 5]);
        assert!(pem.starts_with("-----BEGIN CMS-----"));
        assert!(pem.ends_with("-----END CMS-----"));

        let parsed = pem.parse::<Pem>().unwrap();
        assert_eq!(parsed.label(), "CMS");
        assert_eq!(parsed.data(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn lines_are_wrapped_at_64_columns() {
        let pem = to_pem(ENVELOPE_PEM_LABEL, &vec![0u8; 96]);
        for line in pem.lines() {
            assert!(line.len() <= 64 || line.starts_with(PEM_HEADER_START) || line.starts_with(PEM_HEADER_END));
        }
    }

    #[test]
    fn flattened_pem_is_accepted() {
        let pem = FLATTENED_PEM.parse::<Pem>().unwrap();
        assert_eq!(pem.label(), "GARBAGE");
        assert_eq!(pem.data(), b"GARBAGE");
    }

    #[test]
    fn missing_footer_is_rejected() {
        let err = "-----BEGIN CMS-----AAAA".parse::<Pem>().unwrap_err();
        assert!(matches!(err, PemError::FooterNotFound));
    }
}
