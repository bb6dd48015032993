//! Integration tests for the lyricsync engine
//!
//! Drives the public API end to end with the "Rolling in the Deep" song data.

use std::cell::RefCell;
use std::rc::Rc;

use lyricsync::playback::{ManualTimeSource, SyncEngine};
use lyricsync::text::{layouts_from_measured, slice_chars, TimedText};
use lyricsync::timing::{synthesize_translation_timings, ActivePositionResolver, LineWordIndex};
use lyricsync::{
    load_song, word_progress, EngineConfig, MeasuredLine, Song, WritingDirection, NO_ACTIVE_INDEX,
};
use pretty_assertions::assert_eq;

const ROLLING: &str = include_str!("fixtures/rolling_in_the_deep.json");

fn song() -> Song {
    load_song(ROLLING).unwrap()
}

fn engine() -> (SyncEngine<ManualTimeSource>, ManualTimeSource) {
    let time = ManualTimeSource::new(0);
    (SyncEngine::new(song(), EngineConfig::default(), time.clone()), time)
}

#[test]
fn test_fixture_loads_and_validates() {
    let song = song();
    assert_eq!(song.title.as_deref(), Some("Rolling in The Deep"));
    assert_eq!(song.artist.as_deref(), Some("Adele"));
    assert_eq!(song.language.as_deref(), Some("en"));
    assert_eq!(song.lines.len(), 4);
    assert_eq!(song.words.len(), 37);
    assert!(song.has_word_timing());
    // Last word (24019) ends after the last line (19250 + 4500)
    assert_eq!(song.total_duration_ms(), 24_019);
}

#[test]
fn test_segmentation_follows_end_of_line_markers() {
    let song = song();
    let index = LineWordIndex::build(&song.lines, &song.words);
    let counts: Vec<usize> = song.lines.iter().map(|l| index.words_for(&l.id).len()).collect();
    assert_eq!(counts, vec![7, 11, 7, 12]);
}

#[test]
fn test_every_line_aligns_to_its_punctuated_words() {
    let song = song();
    let index = LineWordIndex::build(&song.lines, &song.words);

    for line in &song.lines {
        let words = index.words_for(&line.id);
        let text = TimedText::new(&line.text, words.to_vec(), WritingDirection::Ltr);
        let sliced: Vec<&str> = text
            .mappings()
            .iter()
            .map(|m| slice_chars(text.text(), m.start_char, m.end_char))
            .collect();
        let expected: Vec<&str> = words.iter().map(|w| w.display_text()).collect();
        assert_eq!(sliced, expected, "line {:?}", line.text);
    }
}

#[test]
fn test_word_progress_scenario() {
    let (mut engine, _time) = engine();
    let there = engine.song().words[0].clone();

    assert_eq!(word_progress(&there, 6759), 0.0);
    assert_eq!(word_progress(&there, 7019), 0.5);
    assert_eq!(word_progress(&there, 7279), 1.0);

    engine.seek(7019);
    assert_eq!(engine.active_line(), 0);
    assert_eq!(engine.active_word(), 0);
    assert_eq!(engine.active_word_progresses()[0], 0.5);
}

#[test]
fn test_gap_between_lines_holds_first_line() {
    let (mut engine, _time) = engine();
    engine.seek(10_980);
    assert_eq!(engine.active_line(), 0);
    engine.seek(11_300);
    assert_eq!(engine.active_line(), 1);
}

#[test]
fn test_gap_attribution_for_all_adjacent_lines() {
    let song = song();
    let index = LineWordIndex::build(&song.lines, &song.words);
    let resolver = ActivePositionResolver::new(&index.timings(&song.lines), true);

    for (i, pair) in song.lines.windows(2).enumerate() {
        let last_end = index.words_for(&pair[0].id).last().map(|w| w.end_ms).unwrap();
        let next_start = index.words_for(&pair[1].id).first().map(|w| w.start_ms).unwrap();
        for t in last_end..next_start {
            assert_eq!(resolver.resolve_line(t), i as i64, "t = {}", t);
        }
    }
}

#[test]
fn test_gaps_release_when_configured() {
    let config = EngineConfig::from_yaml("hold-through-gaps: false").unwrap();
    let mut engine = SyncEngine::new(song(), config, ManualTimeSource::new(0));
    engine.seek(11_000);
    assert_eq!(engine.active_line(), NO_ACTIVE_INDEX);
}

#[test]
fn test_seek_clamps_to_song_bounds() {
    let (mut engine, _time) = engine();
    let ended = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&ended);
    engine.playback_ended().subscribe(move |_| *counter.borrow_mut() += 1);

    engine.seek(-500);
    assert_eq!(engine.elapsed_ms(), 0);

    engine.play();
    let total = engine.total_ms();
    engine.seek(total as i64 + 10_000);

    assert_eq!(engine.elapsed_ms(), total);
    assert!(!engine.is_playing());
    assert_eq!(*ended.borrow(), 1);
}

#[test]
fn test_elapsed_monotonic_while_playing_and_constant_while_paused() {
    let (mut engine, time) = engine();
    let mut last = engine.elapsed_ms();

    for round in 0..6 {
        engine.play();
        for _ in 0..25 {
            time.advance(16 + round);
            engine.on_frame();
            let now = engine.elapsed_ms();
            assert!(now >= last, "elapsed went backwards: {} < {}", now, last);
            last = now;
        }

        engine.pause();
        let frozen = engine.elapsed_ms();
        time.advance(1_000);
        engine.on_frame();
        assert_eq!(engine.elapsed_ms(), frozen);
        last = frozen;
    }
}

#[test]
fn test_tap_beyond_last_line_seeks_to_last_word() {
    let (mut engine, _time) = engine();
    let mut text = engine.timed_text(3).unwrap();
    text.set_layouts(layouts_from_measured(&[
        MeasuredLine {
            text: "Go 'head and sell me out ".to_string(),
            x: 0.0,
            y: 0.0,
            width: 240.0,
            height: 40.0,
        },
        MeasuredLine {
            text: "and I'll lay your **** bare".to_string(),
            x: 0.0,
            y: 40.0,
            width: 260.0,
            height: 40.0,
        },
    ]));
    assert!(text.is_interactive());

    engine.seek_to_tap(&text, 1_000.0, 1_000.0);
    assert_eq!(engine.elapsed_ms(), 23_799);
    assert_eq!(engine.active_line(), 3);

    // Top-left of the first wrapped line
    engine.seek_to_tap(&text, 0.0, 0.0);
    assert_eq!(engine.elapsed_ms(), 19_891);
}

#[test]
fn test_translation_timing_is_proportional_estimate() {
    let song = song();
    let index = LineWordIndex::build(&song.lines, &song.words);
    let line = &song.lines[0];
    let translation = line.translation("he").unwrap();
    let words = synthesize_translation_timings(translation, index.words_for(&line.id));

    let starts: Vec<u64> = words.iter().map(|w| w.start_ms).collect();
    assert_eq!(starts, vec![6759, 7299, 7960, 9719, 9979]);
    assert!(words.iter().all(|w| w.is_estimated));
    assert!(words.last().unwrap().is_end_of_line);
}

#[test]
fn test_translation_text_is_rtl() {
    let (engine, _time) = engine();
    let text = engine.translation_text(1, "he").unwrap();
    assert_eq!(text.direction(), WritingDirection::Rtl);
    assert_eq!(text.text(), "היא מגיעה לשיא ומוציאה אותי מהחושך");
    assert_eq!(text.words().len(), 6);
}

#[test]
fn test_full_playthrough_emits_each_line_once() {
    let (mut engine, time) = engine();
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    engine.active_line_changed().subscribe(move |i: &i64| sink.borrow_mut().push(*i));

    engine.play();
    while engine.is_playing() {
        time.advance(16);
        engine.on_frame();
    }

    assert_eq!(*lines.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(engine.elapsed_ms(), engine.total_ms());
    assert!(!engine.clock().is_ticker_armed());
}
