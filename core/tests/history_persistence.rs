// core/tests/history_persistence.rs
//
// Merge policies and persistence adapters for emotion history tables.
//
// Tests cover:
// - OVERWRITE idempotence
// - FILL_MISSING leaves stored days untouched
// - CSV and redb round trips, including a single-day table
// - rejection of partially populated days on read
// - failed writes and failed merges leave the stored file as it was
// - the score -> merge -> persist pipeline against real files

use chrono::NaiveDate;
use moodgraph_core::{
    buckets, merge, CsvStore, DayBucket, DayTable, EmotionPipeline, EmotionVector, HistoryStore,
    Lexicon, MemoryStore, MergeMode, MoodError, RedbStore, Scorer, ScoringConfig, EMOTION_INDEX,
};
use std::cell::Cell;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 7, d).unwrap()
}

fn lexicon() -> Lexicon {
    Lexicon::parse_str("calm trust 1\ncalm positive 1\npanic fear 1\npanic negative 1\n").unwrap()
}

fn scored(texts: &[(u32, &str)]) -> Vec<(NaiveDate, EmotionVector)> {
    let lx = lexicon();
    let cfg = ScoringConfig::default();
    let scorer = Scorer::new(&lx, &cfg);
    texts
        .iter()
        .map(|(d, t)| scorer.score(&DayBucket::new(day(*d), vec![*t])))
        .collect()
}

#[test]
fn overwrite_twice_equals_once() {
    let base = merge(scored(&[(1, "calm")]), DayTable::new(), MergeMode::Overwrite).unwrap();
    let new_days = scored(&[(1, "panic"), (2, "calm panic")]);

    let once = merge(new_days.clone(), base.clone(), MergeMode::Overwrite).unwrap();
    let twice = merge(new_days.clone(), once.clone(), MergeMode::Overwrite).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.value(day(1), "fear"), Some(1.0));
    assert_eq!(once.value(day(1), "trust"), Some(0.0));
}

#[test]
fn fill_missing_never_touches_stored_days() {
    let base = merge(scored(&[(1, "calm calm")]), DayTable::new(), MergeMode::Overwrite).unwrap();
    let stored = base.column(day(1)).unwrap().clone();

    let result = merge(
        scored(&[(1, "panic panic panic"), (3, "panic")]),
        base,
        MergeMode::FillMissing,
    )
    .unwrap();
    assert_eq!(result.column(day(1)), Some(&stored));
    assert_eq!(result.value(day(3), "fear"), Some(1.0));
    assert_eq!(result.days().collect::<Vec<_>>(), vec![day(1), day(3)]);
    for (_, column) in result.columns() {
        assert_eq!(column.len(), 10);
    }
}

#[test]
fn csv_round_trip_single_day() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("index.csv"), EMOTION_INDEX);
    let table = merge(scored(&[(4, "calm panic calm")]), DayTable::new(), MergeMode::Overwrite).unwrap();

    store.write(&table).unwrap();
    let back = store.read().unwrap();
    assert_eq!(back, table);
    assert_eq!(back.rows().len(), 10);

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("emotion,2021-07-04\n"));
}

#[test]
fn csv_round_trip_fractional_values() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("index.csv"), EMOTION_INDEX);
    let mut table = DayTable::new();
    table
        .insert_column(day(1), [("joy".to_string(), 0.1 + 0.2), ("fear".to_string(), 1e-9)].into())
        .unwrap();
    table
        .insert_column(day(2), [("joy".to_string(), 12345.678), ("fear".to_string(), 0.0)].into())
        .unwrap();
    store.write(&table).unwrap();
    assert_eq!(store.read().unwrap(), table);
}

#[test]
fn missing_csv_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("absent.csv"), EMOTION_INDEX);
    assert!(store.read().unwrap().is_empty());
}

#[test]
fn partial_day_is_rejected_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.csv");
    std::fs::write(&path, "emotion,2021-07-01,2021-07-02\njoy,1,2\nfear,0,\n").unwrap();
    let err = CsvStore::new(&path, EMOTION_INDEX).read().unwrap_err();
    assert!(matches!(err, MoodError::PersistenceRead { .. }), "{err}");
}

#[test]
fn redb_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = RedbStore::open(dir.path().join("history.redb")).unwrap();
    assert!(store.read().unwrap().is_empty());

    let table = merge(
        scored(&[(1, "calm"), (2, "panic")]),
        DayTable::new(),
        MergeMode::Overwrite,
    )
    .unwrap();
    store.write(&table).unwrap();
    assert_eq!(store.read().unwrap(), table);

    // a smaller table replaces the old one entirely
    let smaller = merge(scored(&[(5, "calm")]), DayTable::new(), MergeMode::Overwrite).unwrap();
    store.write(&smaller).unwrap();
    assert_eq!(store.read().unwrap(), smaller);
}

#[test]
fn pipeline_with_files() {
    let dir = tempfile::tempdir().unwrap();
    let lexicon_path = dir.path().join("lexicon.txt");
    std::fs::write(&lexicon_path, "calm\ttrust\t1\npanic\tfear\t1\n").unwrap();
    let buckets_path = dir.path().join("twitter_data.csv");
    buckets::save(
        &buckets_path,
        &[
            DayBucket::new(day(1), vec!["Calm, calm!", "panic?"]),
            DayBucket::new(day(2), Vec::<String>::new()),
        ],
    )
    .unwrap();

    let pipeline = EmotionPipeline::new(Lexicon::load(&lexicon_path).unwrap(), ScoringConfig::default()).unwrap();
    let store = CsvStore::new(dir.path().join("tweet_emotional_index.csv"), EMOTION_INDEX);
    let days = buckets::load(&buckets_path).unwrap();
    pipeline.run(&days, MergeMode::FillMissing, &store).unwrap();

    let table = store.read().unwrap();
    assert_eq!(table.len(), 2);
    // "Calm" misses the exact lookup and stays below the threshold against "calm"
    assert_eq!(table.value(day(1), "trust"), Some(1.0));
    assert_eq!(table.value(day(1), "fear"), Some(1.0));
    assert_eq!(table.value(day(2), "trust"), Some(0.0));
}

#[test]
fn fill_missing_skips_scoring_of_stored_days() {
    let calls = Cell::new(0usize);
    let counting = |a: &str, b: &str| {
        calls.set(calls.get() + 1);
        if a == b { 1.0 } else { 0.0 }
    };
    let pipeline =
        EmotionPipeline::with_similarity(lexicon(), ScoringConfig::default(), counting).unwrap();
    let store = MemoryStore::new();

    pipeline
        .run(&[DayBucket::new(day(1), vec!["unknown words"])], MergeMode::Overwrite, &store)
        .unwrap();
    let after_first = calls.get();
    assert!(after_first > 0);

    pipeline
        .run(&[DayBucket::new(day(1), vec!["other unknown words"])], MergeMode::FillMissing, &store)
        .unwrap();
    assert_eq!(calls.get(), after_first);
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("index.csv");
    let store = CsvStore::new(&path, EMOTION_INDEX);
    let table = merge(scored(&[(1, "calm")]), DayTable::new(), MergeMode::Overwrite).unwrap();

    let err = store.write(&table).unwrap_err();
    assert!(matches!(err, MoodError::PersistenceWrite { .. }), "{err}");
    assert!(!path.exists());
}

#[test]
fn failed_merge_keeps_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.csv");
    let store = CsvStore::new(&path, EMOTION_INDEX);
    let mut narrow = DayTable::new();
    narrow
        .insert_column(day(1), [("joy".to_string(), 2.0), ("fear".to_string(), 1.0)].into())
        .unwrap();
    store.write(&narrow).unwrap();
    let before = std::fs::read(&path).unwrap();

    // the configured ten emotions do not fit a two-row history
    let pipeline = EmotionPipeline::new(lexicon(), ScoringConfig::default()).unwrap();
    let err = pipeline
        .run(&[DayBucket::new(day(2), vec!["calm"])], MergeMode::Overwrite, &store)
        .unwrap_err();
    assert!(matches!(err, MoodError::SchemaMismatch { .. }), "{err}");
    assert_eq!(std::fs::read(&path).unwrap(), before);
}
