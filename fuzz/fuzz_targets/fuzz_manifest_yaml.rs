#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Manifest parsing - this should never panic
    let _ = ecs_template::Manifest::from_yaml("fuzz.yml", data);
});
