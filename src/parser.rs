//! Deserialize data from the bytecode protocol.
use bytes::Bytes;
use nom::{
    IResult,
    bytes::complete::take,
    multi::many_m_n,
    number::complete::{be_i16, be_i32, be_u16},
};
use nombytes::NomBytes;

use crate::constants::MAX_PROTOCOL_ARRAY_SIZE;

/// Convert bytes to a validated UTF-8 string.
/// Returns an error if the bytes are not valid UTF-8.
pub fn bytes_to_string(bytes: &Bytes) -> Result<String, nom::Err<nom::error::Error<NomBytes>>> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| {
            nom::Err::Failure(nom::error::Error::new(
                NomBytes::from(bytes.as_ref()),
                nom::error::ErrorKind::Verify,
            ))
        })
}

/// Convert optional bytes to a validated UTF-8 string.
/// Returns None for None input, error for invalid UTF-8.
pub fn bytes_to_string_opt(
    bytes: Option<Bytes>,
) -> Result<Option<String>, nom::Err<nom::error::Error<NomBytes>>> {
    match bytes {
        Some(b) => bytes_to_string(&b).map(Some),
        None => Ok(None),
    }
}

pub fn parse_string(s: NomBytes) -> IResult<NomBytes, Bytes> {
    let (s, length) = be_u16(s)?;
    let (s, string) = take(length)(s)?;
    Ok((s, string.into_bytes()))
}

pub fn parse_array<O, E, F>(f: F) -> impl FnMut(NomBytes) -> IResult<NomBytes, Vec<O>, E>
where
    F: nom::Parser<NomBytes, O, E> + Copy,
    E: nom::error::ParseError<NomBytes>,
{
    move |input: NomBytes| {
        let i = input.clone();
        let (i, length) = be_i32(i)?;

        // Null array
        if length == -1 {
            return Ok((i, vec![]));
        }

        // Validate array size bounds
        if !(0..=MAX_PROTOCOL_ARRAY_SIZE).contains(&length) {
            return Err(nom::Err::Failure(E::from_error_kind(
                i,
                nom::error::ErrorKind::TooLarge,
            )));
        }

        many_m_n(length as usize, length as usize, f)(i)
    }
}

pub fn parse_nullable_string(s: NomBytes) -> IResult<NomBytes, Option<Bytes>> {
    let (s, length) = be_i16(s)?;

    // Null string
    if length == -1 {
        return Ok((s, None));
    }

    // Validate string length bounds (only check lower bound since MAX_STRING_SIZE is i16::MAX)
    if length < 0 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            s,
            nom::error::ErrorKind::TooLarge,
        )));
    }

    let (s, string) = take(length as u16)(s)?;
    Ok((s, Some(string.into_bytes())))
}

/// Parse a nullable BYTES value: i32 length prefix, -1 for null.
pub fn parse_nullable_bytes(s: NomBytes) -> IResult<NomBytes, Option<Bytes>> {
    let (s, length) = be_i32(s)?;

    if length == -1 {
        return Ok((s, None));
    }

    if length < 0 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            s,
            nom::error::ErrorKind::TooLarge,
        )));
    }

    let (s, bytes) = take(length as u32)(s)?;
    Ok((s, Some(bytes.into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::number::complete::be_i32;

    #[test]
    fn test_bytes_to_string_valid_utf8() {
        let bytes = Bytes::from("hello");
        let result = bytes_to_string(&bytes);
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn test_bytes_to_string_invalid_utf8() {
        let bytes = Bytes::from(vec![0xff, 0xfe]);
        let result = bytes_to_string(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_bytes_to_string_opt_some() {
        let bytes = Some(Bytes::from("test"));
        let result = bytes_to_string_opt(bytes);
        assert_eq!(result.unwrap(), Some("test".to_string()));
    }

    #[test]
    fn test_bytes_to_string_opt_none() {
        let result = bytes_to_string_opt(None);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_parse_string() {
        // String format: u16 length + bytes
        let mut data = Vec::new();
        data.extend_from_slice(&5u16.to_be_bytes()); // length = 5
        data.extend_from_slice(b"hello");
        data.extend_from_slice(b"extra"); // extra bytes after

        let input = NomBytes::new(Bytes::from(data));
        let (remaining, parsed) = parse_string(input).unwrap();

        assert_eq!(parsed, Bytes::from("hello"));
        assert_eq!(remaining.into_bytes(), Bytes::from("extra"));
    }

    #[test]
    fn test_parse_nullable_string_some() {
        // Nullable string format: i16 length + bytes
        let mut data = Vec::new();
        data.extend_from_slice(&4i16.to_be_bytes()); // length = 4
        data.extend_from_slice(b"test");

        let input = NomBytes::new(Bytes::from(data));
        let (_, parsed) = parse_nullable_string(input).unwrap();

        assert_eq!(parsed, Some(Bytes::from("test")));
    }

    #[test]
    fn test_parse_nullable_string_null() {
        // Null string indicated by length = -1
        let data = (-1i16).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));
        let (_, parsed) = parse_nullable_string(input).unwrap();

        assert_eq!(parsed, None);
    }

    #[test]
    fn test_parse_nullable_string_invalid_length() {
        // Invalid negative length (not -1)
        let data = (-2i16).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));
        let result = parse_nullable_string(input);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_nullable_bytes_some() {
        let mut data = Vec::new();
        data.extend_from_slice(&3i32.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3]);

        let input = NomBytes::new(Bytes::from(data));
        let (_, parsed) = parse_nullable_bytes(input).unwrap();

        assert_eq!(parsed, Some(Bytes::from(vec![1, 2, 3])));
    }

    #[test]
    fn test_parse_nullable_bytes_null() {
        let data = (-1i32).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));
        let (_, parsed) = parse_nullable_bytes(input).unwrap();

        assert_eq!(parsed, None);
    }

    #[test]
    fn test_parse_nullable_bytes_invalid_length() {
        let data = (-7i32).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));
        let result = parse_nullable_bytes(input);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_array_empty() {
        // Empty array (length = 0)
        let data = 0i32.to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));

        let mut parser = parse_array(be_i32::<_, nom::error::Error<NomBytes>>);
        let (_, parsed): (_, Vec<i32>) = parser(input).unwrap();

        assert!(parsed.is_empty());
    }

    #[test]
    fn test_parse_array_null() {
        // Null array (length = -1)
        let data = (-1i32).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));

        let mut parser = parse_array(be_i32::<_, nom::error::Error<NomBytes>>);
        let (_, parsed): (_, Vec<i32>) = parser(input).unwrap();

        assert!(parsed.is_empty());
    }

    #[test]
    fn test_parse_array_with_elements() {
        // Array with 3 i32 elements
        let mut data = Vec::new();
        data.extend_from_slice(&3i32.to_be_bytes()); // length = 3
        data.extend_from_slice(&10i32.to_be_bytes());
        data.extend_from_slice(&20i32.to_be_bytes());
        data.extend_from_slice(&30i32.to_be_bytes());

        let input = NomBytes::new(Bytes::from(data));

        let mut parser = parse_array(be_i32::<_, nom::error::Error<NomBytes>>);
        let (_, parsed): (_, Vec<i32>) = parser(input).unwrap();

        assert_eq!(parsed, vec![10, 20, 30]);
    }

    #[test]
    fn test_parse_array_too_large() {
        // Array size exceeds MAX_PROTOCOL_ARRAY_SIZE
        let data = (MAX_PROTOCOL_ARRAY_SIZE + 1).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));

        let mut parser = parse_array(be_i32::<_, nom::error::Error<NomBytes>>);
        let result: IResult<_, Vec<i32>, nom::error::Error<NomBytes>> = parser(input);

        assert!(result.is_err());
    }
}
