/// Host keyboard layout, row by row, for CHIP-8 keys 0x0..=0xF.
///
/// ```text
/// 1 2 3 4
/// q w e r
/// a s d f
/// z x c v
/// ```
pub const KEY_MAP: [char; 16] = [
    '1', '2', '3', '4', //
    'q', 'w', 'e', 'r', //
    'a', 's', 'd', 'f', //
    'z', 'x', 'c', 'v', //
];

pub fn key2btn(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    KEY_MAP.iter().position(|k| *k == key).map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key2btn() {
        assert_eq!(key2btn('1'), Some(0x0));
        assert_eq!(key2btn('r'), Some(0x7));
        assert_eq!(key2btn('A'), Some(0x8));
        assert_eq!(key2btn('v'), Some(0xF));
        assert_eq!(key2btn('p'), None);
    }
}
