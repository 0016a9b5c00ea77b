#![no_main]

use libfuzzer_sys::fuzz_target;
use spacemesh_tool::parse_node;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    if let Ok(p) = parse_node(text) {
        // Anything accepted must survive a format/parse round trip
        assert_eq!(parse_node(&p.to_string()), Ok(p));
        let _ = p.children();
        let _ = p.parent();
        assert!(p.is_ancestor_of(p));
    }
});
