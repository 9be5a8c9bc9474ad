mod common;
use common::*;

#[test]
fn test_zero_k_is_invalid_usage() {
    let (stdout, stderr, exit_code) = run_topids_with_input(&["-k", "0"], "a_1\n");
    assert_eq!(exit_code, 2);
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("topids: Error: k must be a positive integer, got 0"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_negative_k_is_invalid_usage() {
    let (stdout, stderr, exit_code) = run_topids_with_input(&["-k", "-1"], "a_1\n");
    assert_eq!(exit_code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("got -1"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_k_does_not_open_input() {
    let (_stdout, stderr, exit_code) =
        run_topids_with_args(&["-k", "0", "/definitely/not/here.txt"]);
    assert_eq!(exit_code, 2, "K must be rejected before the file is opened");
    assert!(!stderr.contains("Failed to open"));
}

#[test]
fn test_non_numeric_k_is_rejected_by_argument_parser() {
    let (_stdout, _stderr, exit_code) = run_topids_with_input(&["-k", "three"], "a_1\n");
    assert_eq!(exit_code, 2);
}

#[test]
fn test_missing_file_is_general_error() {
    let (stdout, stderr, exit_code) =
        run_topids_with_args(&["-k", "3", "/definitely/not/here.txt"]);
    assert_eq!(exit_code, 1);
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("Failed to open input file '/definitely/not/here.txt'"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_malformed_lines_are_warned_and_skipped() {
    let input = "a_10\nno-separator\nb_x\nc_1_2\nd_30\n";
    let (stdout, stderr, exit_code) = run_topids_with_input(&["-k", "5"], input);

    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&stdout), vec!["a", "d"]);

    let warnings = warning_lines(&stderr);
    assert_eq!(
        warnings,
        vec![
            "topids: warning: line 2: malformed record: no-separator",
            "topids: warning: line 3: non-integer value: b_x",
            "topids: warning: line 4: malformed record: c_1_2",
        ]
    );
}

#[test]
fn test_malformed_lines_do_not_change_result() {
    let clean = "a_10\nb_20\nc_30\n";
    let noisy = "a_10\n_5\nb_20\nx_\n\nc_30\ny_1.5\n";

    let (clean_out, _, _) = run_topids_with_input(&["-k", "2", "--on-discard", "off"], clean);
    let (noisy_out, noisy_err, exit_code) =
        run_topids_with_input(&["-k", "2", "--on-discard", "off"], noisy);

    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&clean_out), sorted_lines(&noisy_out));
    assert!(noisy_err.is_empty(), "off must stay silent: {}", noisy_err);
}

#[test]
fn test_unterminated_bad_trailing_line_is_reported() {
    let (stdout, stderr, exit_code) = run_topids_with_input(&["-k", "1"], "a_10\nbroken");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "a\n");
    assert_eq!(
        warning_lines(&stderr),
        vec!["topids: warning: line 2 (unterminated): malformed record: broken"]
    );
}

#[test]
fn test_invalid_utf8_is_a_decode_discard() {
    let mut input = b"a_10\n".to_vec();
    input.extend_from_slice(b"\xff\xfe_3\n");
    input.extend_from_slice(b"b_20\n");

    let (stdout, stderr, exit_code) = run_topids_with_bytes(&["-k", "5"], &input);
    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&stdout), vec!["a", "b"]);
    let warnings = warning_lines(&stderr);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("topids: warning: line 2: decode error:"));
}

#[test]
fn test_discard_summary() {
    let input = "a_1\nbad\nworse\nb_q\nc_3\n";
    let (stdout, stderr, exit_code) =
        run_topids_with_input(&["-k", "2", "--on-discard", "summary"], input);

    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&stdout), vec!["a", "c"]);
    assert!(warning_lines(&stderr).is_empty());
    assert!(stderr.starts_with("topids: 3 lines discarded\n"), "stderr: {}", stderr);

    let json_start = stderr.find('{').unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stderr[json_start..]).unwrap();
    assert_eq!(summary["malformed record"]["count"], 2);
    assert_eq!(summary["non-integer value"]["count"], 1);
    assert_eq!(
        summary["malformed record"]["examples"][0],
        "line 2: malformed record: bad"
    );
}

#[test]
fn test_quiet_suppresses_discard_reporting() {
    let (stdout, stderr, exit_code) =
        run_topids_with_input(&["-k", "1", "-q", "--on-discard", "summary"], "bad\na_1\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "a\n");
    assert!(stderr.is_empty(), "stderr: {}", stderr);
}

#[test]
fn test_quiet_still_reports_errors() {
    let (_stdout, stderr, exit_code) =
        run_topids_with_args(&["-q", "-k", "1", "/definitely/not/here.txt"]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("topids: Error:"));
}

#[test]
fn test_zip_archives_are_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let zip = dir.path().join("records.zip");
    std::fs::write(&zip, b"PK\x03\x04").unwrap();

    let (_stdout, stderr, exit_code) = run_topids_with_args(&["-k", "1", zip.to_str().unwrap()]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("ZIP archives are not supported"), "stderr: {}", stderr);
}
