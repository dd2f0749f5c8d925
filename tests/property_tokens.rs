// tests/property_tokens.rs

use proptest::prelude::*;

use cachebust::hash::{checksum_reader, encode_token, Crc32, TOKEN_LEN};

fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

proptest! {
    #[test]
    fn tokens_are_fixed_length_and_url_safe(checksum in any::<u32>()) {
        let token = encode_token(checksum);
        prop_assert_eq!(token.len(), TOKEN_LEN);
        prop_assert!(token.chars().all(is_url_safe));
        prop_assert!(token.ends_with('2'));
    }

    #[test]
    fn distinct_checksums_never_share_a_token(a in any::<u32>(), b in any::<u32>()) {
        prop_assume!(a != b);
        prop_assert_ne!(encode_token(a), encode_token(b));
    }

    #[test]
    fn checksum_agrees_with_reference_crc32(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(Crc32::checksum(&data), crc32fast::hash(&data));
    }

    #[test]
    fn chunking_does_not_change_checksum(
        data in proptest::collection::vec(any::<u8>(), 1..4096),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(data.len());
        let mut crc = Crc32::new();
        crc.update(&data[..at]);
        crc.update(&data[at..]);
        prop_assert_eq!(crc.finalize(), Crc32::checksum(&data));
        prop_assert_eq!(checksum_reader(&data[..]).unwrap(), Crc32::checksum(&data));
    }
}
