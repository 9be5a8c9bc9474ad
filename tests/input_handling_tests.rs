mod common;
use common::*;

use flate2::write::GzEncoder;
use std::io::Write;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_gzip_stdin_is_decompressed() {
    let compressed = gzip(b"a_10\nb_99\nc_50\n");
    let (stdout, stderr, exit_code) = run_topids_with_bytes(&["-k", "2"], &compressed);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(sorted_lines(&stdout), vec!["b", "c"]);
}

#[test]
fn test_gzip_file_is_decompressed() {
    let compressed = gzip(b"a_10\nb_20");
    let (stdout, _stderr, exit_code) = run_topids_with_file(&["-k", "1"], &compressed);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "b\n");
}

#[test]
fn test_zstd_file_is_decompressed() {
    let compressed = zstd::encode_all(&b"x_3\ny_1\nz_2\n"[..], 3).unwrap();
    let (stdout, _stderr, exit_code) = run_topids_with_file(&["-k", "2"], &compressed);
    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&stdout), vec!["x", "z"]);
}

#[test]
fn test_tiny_chunks_reassemble_lines() {
    let input = "alpha_100\nbeta_300\ngamma_200\ndelta_50\n";
    for chunk_size in ["1", "2", "3", "7", "64"] {
        let (stdout, _stderr, exit_code) =
            run_topids_with_input(&["-k", "2", "--chunk-size", chunk_size], input);
        assert_eq!(exit_code, 0);
        assert_eq!(
            sorted_lines(&stdout),
            vec!["beta", "gamma"],
            "chunk size {}",
            chunk_size
        );
    }
}

#[test]
fn test_zero_chunk_size_is_rejected() {
    let (_stdout, stderr, exit_code) =
        run_topids_with_input(&["-k", "2", "--chunk-size", "0"], "a_1\n");
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("chunk size must be at least 1 byte"));
}

#[test]
fn test_crlf_line_endings() {
    let (stdout, stderr, exit_code) =
        run_topids_with_input(&["-k", "2"], "a_10\r\nb_30\r\nc_20\r\n");
    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&stdout), vec!["b", "c"]);
    assert!(stderr.is_empty(), "CRLF must not cause discards: {}", stderr);
}

#[test]
fn test_surrounding_whitespace_is_trimmed() {
    let (stdout, _stderr, exit_code) =
        run_topids_with_input(&["-k", "1"], "   a_10   \n\tb_20\t\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "b\n");
}

#[test]
fn test_blank_lines_are_not_discards() {
    let (stdout, stderr, exit_code) = run_topids_with_input(&["-k", "3"], "\n\na_1\n   \nb_2\n\n");
    assert_eq!(exit_code, 0);
    assert_eq!(sorted_lines(&stdout), vec!["a", "b"]);
    assert!(stderr.is_empty());
}

#[test]
fn test_custom_separator() {
    let (stdout, stderr, exit_code) =
        run_topids_with_input(&["-k", "1", "--separator", ":"], "user_a:5\nuser_b:9\nbad_7\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "user_b\n");
    assert_eq!(
        warning_lines(&stderr),
        vec!["topids: warning: line 3: malformed record: bad_7"]
    );
}

#[test]
fn test_large_input_across_default_chunks() {
    // Spans several 1 MiB chunks
    let mut input = String::new();
    for i in 0..200_000u64 {
        input.push_str(&format!("id{:07}_{}\n", i, (i * 2_654_435_761) % 1_000_003));
    }
    input.push_str("winner_9999999\n");

    let (stdout, _stderr, exit_code) =
        run_topids_with_input(&["-k", "1", "--on-discard", "off"], &input);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "winner\n");
}
