//! Chunk type tags

/// Creates a chunk type tag from its four ASCII characters
macro_rules! chunk_type {
    ($const_name:ident, $a:literal, $b:literal, $c:literal, $d:literal) => {
        /// MIDI chunk type tag
        pub const $const_name: [u8; 4] = [$a as u8, $b as u8, $c as u8, $d as u8];
    };
}

chunk_type!(HEADER_CHUNK, 'M', 'T', 'h', 'd');
chunk_type!(TRACK_DATA_CHUNK, 'M', 'T', 'r', 'k');

/// Renders a tag for error messages, escaping anything that is not printable ASCII
pub fn display_tag(tag: &[u8; 4]) -> String {
    tag.iter().flat_map(|byte| byte.escape_ascii()).map(char::from).collect()
}
