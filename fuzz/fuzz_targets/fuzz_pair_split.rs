#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(declaration) = std::str::from_utf8(data) {
        // Splitting never panics and never yields an empty half
        if let Ok((source, dest)) = ecs_template::domain::split_declaration(declaration) {
            assert!(!source.is_empty());
            assert!(!dest.is_empty());
            assert_eq!(source, source.trim());
            assert_eq!(dest, dest.trim());
        }
    }
});
