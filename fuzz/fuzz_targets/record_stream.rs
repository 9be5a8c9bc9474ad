#![no_main]

use libfuzzer_sys::fuzz_target;
use topids::{compute_top_k_chunks, ParseResult, TopKRequest};
use topids::parsers::IdValueParser;
use topids::pipeline::RecordStream;

const MAX_CHUNK: usize = 64;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let chunk_size = (data[0] as usize % MAX_CHUNK) + 1;
    let k = (data[1] % 16) as i64 + 1;
    let input = &data[2..];

    let chunks = |size: usize| {
        input
            .chunks(size)
            .map(|c| Ok::<_, std::io::Error>(c.to_vec()))
            .collect::<Vec<_>>()
    };

    // Chunking must never change what is parsed
    let parsed: Vec<ParseResult> = RecordStream::new(chunks(chunk_size).into_iter(), IdValueParser::new())
        .map(|r| r.unwrap())
        .collect();
    let whole: Vec<ParseResult> = RecordStream::new(chunks(input.len().max(1)).into_iter(), IdValueParser::new())
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(parsed, whole);

    let valid = parsed.iter().filter(|r| r.is_valid()).count();
    let ids = compute_top_k_chunks(chunks(chunk_size), k).unwrap();
    assert_eq!(ids.len(), valid.min(k as usize));

    let sorted = TopKRequest::new(k)
        .chunk_size(chunk_size)
        .sorted(true)
        .run_reader(input, &mut topids::IgnoreDiscards)
        .unwrap();
    assert!(sorted
        .records()
        .windows(2)
        .all(|pair| pair[0].value >= pair[1].value));
});
