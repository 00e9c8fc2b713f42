//! # Packed String Arrays
//!
//! The registry returns metadata URLs as one concatenated byte blob plus a
//! parallel array of byte lengths.

use super::errors::DiscoveryError;

/// Split `packed` into strings of the given byte lengths.
///
/// # Errors
/// `MalformedUrls` if a length runs past the blob, bytes are left over, or
/// a piece is not UTF-8.
pub fn unpack_strings(lengths: &[u64], packed: &[u8]) -> Result<Vec<String>, DiscoveryError> {
    let mut strings = Vec::with_capacity(lengths.len());
    let mut offset = 0usize;

    for (index, &length) in lengths.iter().enumerate() {
        let end = usize::try_from(length)
            .ok()
            .and_then(|len| offset.checked_add(len))
            .filter(|&end| end <= packed.len())
            .ok_or_else(|| {
                DiscoveryError::MalformedUrls(format!(
                    "string {index} (length {length}) exceeds blob of {} bytes",
                    packed.len()
                ))
            })?;

        let piece = std::str::from_utf8(&packed[offset..end]).map_err(|_| {
            DiscoveryError::MalformedUrls(format!("string {index} is not valid UTF-8"))
        })?;
        strings.push(piece.to_string());
        offset = end;
    }

    if offset != packed.len() {
        return Err(DiscoveryError::MalformedUrls(format!(
            "{} trailing bytes after {} strings",
            packed.len() - offset,
            lengths.len()
        )));
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unpack_two() {
        let urls = unpack_strings(&[5, 3], b"helloabc").unwrap();
        assert_eq!(urls, vec!["hello".to_string(), "abc".to_string()]);
    }

    #[test]
    fn test_empty_pieces_allowed() {
        let urls = unpack_strings(&[0, 2, 0], b"ab").unwrap();
        assert_eq!(urls, vec!["", "ab", ""]);
    }

    #[test]
    fn test_overrun_rejected() {
        assert!(matches!(
            unpack_strings(&[5, 4], b"helloabc"),
            Err(DiscoveryError::MalformedUrls(_))
        ));
        assert!(unpack_strings(&[u64::MAX], b"x").is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert!(unpack_strings(&[2], b"abc").is_err());
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        assert!(unpack_strings(&[2], &[0xC3, 0x28]).is_err());
    }

    proptest! {
        #[test]
        fn prop_unpack_inverts_concatenation(pieces in prop::collection::vec("[a-z:/.]{0,24}", 0..8)) {
            let lengths: Vec<u64> = pieces.iter().map(|p| p.len() as u64).collect();
            let packed: Vec<u8> = pieces.concat().into_bytes();
            prop_assert_eq!(unpack_strings(&lengths, &packed).unwrap(), pieces);
        }
    }
}
