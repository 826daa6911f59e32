#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use sdrf_openms::openms::{ConvertOptions, ModificationSpec, OpenMs};
use sdrf_openms::sdrf::SdrfTable;

fuzz_target!(|data: &[u8]| {
    // Any cell must parse or fail, never panic
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            let _ = ModificationSpec::parse(line);
        }
    }

    // Tables that load must convert or fail gracefully in every layout
    if let Ok(table) = SdrfTable::from_reader(Cursor::new(data)) {
        for options in [
            ConvertOptions::new(),
            ConvertOptions::new().with_one_table(true).with_legacy(true),
        ] {
            let _ = OpenMs::new().convert(&table, &options);
        }
    }
});
