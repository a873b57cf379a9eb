pub fn fingerprint(bytes: &[u8]) -> [u8; 32] {
    blake3::hash(bytes).into()
}
