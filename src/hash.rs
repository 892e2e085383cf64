use sha2::{Digest, Sha256};

/// SHA-256 of `input`, rendered as lowercase hex.
pub fn apply_sha256(input: &str) -> String {
    sha256_hex(input.as_bytes())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

/// Raw 32-byte SHA-256 digest, used as the ECDSA message.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// Count of leading `'0'` hex characters.
pub fn leading_zeroes(hash: &str) -> usize {
    hash.chars().take_while(|c| *c == '0').count()
}

pub fn meets_difficulty(hash: &str, zeroes: u32) -> bool {
    leading_zeroes(hash) >= zeroes as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            apply_sha256("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn difficulty_counts_hex_zeroes() {
        assert!(meets_difficulty("00ab", 2));
        assert!(meets_difficulty("00ab", 0));
        assert!(!meets_difficulty("0a0b", 2));
        assert_eq!(leading_zeroes("000"), 3);
    }
}
