// tests/strip_chunks.rs

use devboard::status::{LogBuffer, strip_all};
use proptest::prelude::*;

// Text mixing printable runs with SGR colours, cursor moves and OSC titles.
fn formatted_output() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-zA-Z0-9 .:/]{1,12}",
        Just("\n".to_string()),
        Just("✓ done".to_string()),
        Just("\x1b[0m".to_string()),
        Just("\x1b[1;32m".to_string()),
        Just("\x1b[38;5;208m".to_string()),
        Just("\x1b[2K".to_string()),
        Just("\x1b[10A".to_string()),
        Just("\x1b]0;title\x07".to_string()),
    ];
    proptest::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn incremental_stripping_equals_one_pass(
        text in formatted_output(),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let bytes = text.as_bytes();
        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        points.sort_unstable();

        let mut log = LogBuffer::new();
        let mut start = 0;
        for point in points {
            log.append(&bytes[start..point]);
            start = point;
        }
        log.append(&bytes[start..]);

        prop_assert_eq!(log.raw(), text.as_str());
        prop_assert_eq!(log.plain(), strip_all(&text));
    }
}
