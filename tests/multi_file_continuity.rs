mod common;

use std::fs;

use tempfile::tempdir;

use strata::{JsonlSource, SamplerConfig, StratifiedSampler};

use common::{interleaved_corpus, read_lines, write_jsonl};

fn sampler(seed: u64) -> StratifiedSampler {
    let config = SamplerConfig::with_populations([("alpha", 60), ("beta", 30), ("gamma", 10)])
        .with_target(20)
        .with_seed(seed);
    StratifiedSampler::new(config).unwrap()
}

#[test]
fn split_inputs_sample_like_one_concatenated_file() {
    let temp = tempdir().unwrap();
    let corpus = interleaved_corpus(&[("alpha", 300), ("beta", 150), ("gamma", 40)]);
    let (head, tail) = corpus.split_at(217);

    let first = temp.path().join("part-a.jsonl");
    let second = temp.path().join("part-b.jsonl");
    let whole = temp.path().join("whole.jsonl");
    write_jsonl(&first, head);
    write_jsonl(&second, tail);
    write_jsonl(&whole, &corpus);

    let split_out = temp.path().join("split.jsonl");
    let whole_out = temp.path().join("whole-out.jsonl");
    let split_report = sampler(2024)
        .run(&JsonlSource::new([&first, &second]), &split_out)
        .unwrap();
    let whole_report = sampler(2024)
        .run(&JsonlSource::new([&whole]), &whole_out)
        .unwrap();

    assert_eq!(split_report.files, 2);
    assert_eq!(whole_report.files, 1);
    assert_eq!(split_report.buckets, whole_report.buckets);
    assert_eq!(
        fs::read(&split_out).unwrap(),
        fs::read(&whole_out).unwrap()
    );
    assert_eq!(read_lines(&split_out).len(), 20);
}

#[test]
fn bucket_counters_carry_across_files() {
    let temp = tempdir().unwrap();
    let first = temp.path().join("01.jsonl");
    let second = temp.path().join("02.jsonl");
    write_jsonl(&first, &interleaved_corpus(&[("alpha", 50), ("beta", 5)]));
    write_jsonl(&second, &interleaved_corpus(&[("alpha", 70), ("gamma", 9)]));

    let (_, report) = sampler(1)
        .sample(&JsonlSource::new([&first, &second]))
        .unwrap();
    assert_eq!(report.buckets["alpha"].seen, 120);
    assert_eq!(report.buckets["beta"].seen, 5);
    assert_eq!(report.buckets["gamma"].seen, 9);
}

#[test]
fn directory_input_matches_its_sorted_file_list() {
    let temp = tempdir().unwrap();
    let shards = temp.path().join("shards");
    fs::create_dir_all(&shards).unwrap();
    let corpus = interleaved_corpus(&[("alpha", 120), ("beta", 60), ("gamma", 20)]);
    let (head, tail) = corpus.split_at(90);
    // Written out of order; the directory expands in path order.
    write_jsonl(&shards.join("b.jsonl"), tail);
    write_jsonl(&shards.join("a.jsonl"), head);

    let (from_dir, _) = sampler(77).sample(&JsonlSource::new([&shards])).unwrap();
    let (from_files, _) = sampler(77)
        .sample(&JsonlSource::new([
            shards.join("a.jsonl"),
            shards.join("b.jsonl"),
        ]))
        .unwrap();
    let from_dir: Vec<&str> = from_dir.lines().map(|line| line.as_ref()).collect();
    let from_files: Vec<&str> = from_files.lines().map(|line| line.as_ref()).collect();
    assert_eq!(from_dir, from_files);
}
