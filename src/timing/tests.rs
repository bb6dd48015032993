use super::*;
use crate::config::{EngineConfig, ANDROID_COMPLETION_THRESHOLD};
use crate::types::{CharRange, Line, LineLayout, TimedWord, NO_ACTIVE_INDEX};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fixture_lines() -> Vec<Line> {
    vec![
        Line::new("l0", "There's a fire starting in my heart", 6090, 4410),
        Line::new("l1", "Reaching a fever pitch and it's bringing me out the dark", 10500, 3970),
        Line::new("l2", "Finally I can see you crystal clear", 14770, 4320),
    ]
}

fn fixture_words() -> Vec<TimedWord> {
    vec![
        TimedWord::new("there's", 6759, 7279).with_punctuation("There's"),
        TimedWord::new("a", 7299, 7859),
        TimedWord::new("heart", 10479, 10980).end_of_line(),
        TimedWord::new("reaching", 11300, 12219).with_punctuation("Reaching"),
        TimedWord::new("dark", 14720, 15220).end_of_line(),
        TimedWord::new("finally", 15859, 17399).with_punctuation("Finally"),
        TimedWord::new("clear", 19339, 19891).estimated().end_of_line(),
    ]
}

// ============================================================================
// Word / line progress
// ============================================================================

#[test]
fn test_word_progress_scenario() {
    let word = TimedWord::new("There's", 6759, 7279);
    assert_eq!(word_progress(&word, 6000), 0.0);
    assert_eq!(word_progress(&word, 6759), 0.0);
    assert_eq!(word_progress(&word, 7019), 0.5);
    assert_eq!(word_progress(&word, 7279), 1.0);
    assert_eq!(word_progress(&word, 9000), 1.0);
}

#[test]
fn test_word_progress_zero_duration() {
    let word = TimedWord::new("", 500, 500);
    assert_eq!(word_progress(&word, 499), 0.0);
    assert_eq!(word_progress(&word, 500), 1.0);
}

#[test]
fn test_line_progress() {
    let line = Line::new("a", "x", 1000, 2000);
    assert_eq!(line_progress(&line, 0), 0.0);
    assert_eq!(line_progress(&line, 1500), 0.25);
    assert_eq!(line_progress(&line, 3000), 1.0);

    let empty = Line::new("b", "y", 1000, 0);
    assert_eq!(line_progress(&empty, 999), 0.0);
    assert_eq!(line_progress(&empty, 1000), 1.0);
}

#[test]
fn test_completion_threshold_snaps_to_one() {
    let config = EngineConfig {
        completion_threshold: ANDROID_COMPLETION_THRESHOLD,
        ..EngineConfig::default()
    };
    let calc = ProgressCalculator::new(&config);
    let word = TimedWord::new("x", 0, 1000);

    assert_eq!(calc.word_progress(&word, 500), 0.5);
    assert_eq!(calc.word_progress(&word, 985), 1.0);
    // Raw function is unaffected
    assert!(word_progress(&word, 985) < 1.0);

    let default_calc = ProgressCalculator::default();
    assert!(default_calc.word_progress(&word, 985) < 1.0);
}

#[test]
fn test_instant_group_completes_when_next_word_starts() {
    let words = vec![
        TimedWord::new("a", 1000, 1500),
        TimedWord::new("", 1600, 1600),
        TimedWord::new("", 1600, 1601),
        TimedWord::new("d", 2000, 2500),
    ];

    assert_eq!(word_progresses(&words, 1700), vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(word_progresses(&words, 1999), vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(word_progresses(&words, 2000), vec![1.0, 1.0, 1.0, 0.0]);
    assert_eq!(word_progresses(&words, 2250), vec![1.0, 1.0, 1.0, 0.5]);
}

#[test]
fn test_trailing_instant_group() {
    let words = vec![TimedWord::new("a", 0, 100), TimedWord::new("", 200, 200)];
    assert_eq!(word_progresses(&words, 150), vec![1.0, 0.0]);
    assert_eq!(word_progresses(&words, 200), vec![1.0, 1.0]);
}

#[test]
fn test_instant_limit_is_configurable() {
    let config = EngineConfig {
        instant_word_max_ms: 20,
        ..EngineConfig::default()
    };
    let calc = ProgressCalculator::new(&config);
    let words = vec![TimedWord::new("uh", 100, 110), TimedWord::new("b", 300, 400)];

    assert!(calc.is_instant(&words[0]));
    assert_eq!(calc.word_progresses(&words, 105), vec![0.0, 0.0]);
    // Default limit treats the 10 ms word as a normal one
    assert_eq!(word_progresses(&words, 105), vec![0.5, 0.0]);
}

// ============================================================================
// Character-level highlight
// ============================================================================

fn hello_world() -> (Vec<CharRange>, Vec<TimedWord>) {
    let mappings = vec![
        CharRange { word_index: 0, start_char: 0, end_char: 5 },
        CharRange { word_index: 1, start_char: 6, end_char: 11 },
    ];
    let words = vec![TimedWord::new("hello", 100, 400), TimedWord::new("world", 500, 900)];
    (mappings, words)
}

#[test]
fn test_highlight_char_position() {
    let (mappings, words) = hello_world();
    assert_eq!(highlight_char_position(&mappings, &words, 50, 11), 0.0);
    assert_eq!(highlight_char_position(&mappings, &words, 250, 11), 2.5);
    // Between words the highlight rests at the next word's start
    assert_eq!(highlight_char_position(&mappings, &words, 450, 11), 6.0);
    assert_eq!(highlight_char_position(&mappings, &words, 700, 11), 8.5);
    assert_eq!(highlight_char_position(&mappings, &words, 900, 11), 11.0);
}

#[test]
fn test_highlight_instant_group_is_atomic() {
    let mappings = vec![
        CharRange { word_index: 0, start_char: 0, end_char: 1 },
        CharRange { word_index: 1, start_char: 2, end_char: 6 },
        CharRange { word_index: 2, start_char: 7, end_char: 8 },
    ];
    let words = vec![
        TimedWord::new("a", 0, 100),
        TimedWord::new("****", 100, 100),
        TimedWord::new("c", 300, 400),
    ];

    assert_eq!(highlight_char_position(&mappings, &words, 150, 8), 2.0);
    assert_eq!(highlight_char_position(&mappings, &words, 299, 8), 2.0);
    assert_eq!(highlight_char_position(&mappings, &words, 300, 8), 7.0);
    assert_eq!(highlight_char_position(&mappings, &words, 350, 8), 7.5);
}

#[test]
fn test_line_fill_fraction() {
    let layout = LineLayout {
        line_index: 1,
        start_char: 10,
        end_char: 20,
        x: 0.0,
        y: 40.0,
        width: 200.0,
        height: 40.0,
    };
    assert_eq!(line_fill_fraction(&layout, 4.0), 0.0);
    assert_eq!(line_fill_fraction(&layout, 10.0), 0.0);
    assert_eq!(line_fill_fraction(&layout, 15.0), 0.5);
    assert_eq!(line_fill_fraction(&layout, 20.0), 1.0);
    assert_eq!(line_fill_fraction(&layout, 35.0), 1.0);
}

// ============================================================================
// Translation timing
// ============================================================================

#[test]
fn test_translation_timings_proportional() {
    let source: Vec<TimedWord> = (0..7)
        .map(|i| TimedWord::new(format!("w{}", i), i * 100, i * 100 + 90))
        .collect();
    let words = synthesize_translation_timings("יש אש בלב", &source);

    let starts: Vec<u64> = words.iter().map(|w| w.start_ms).collect();
    // floor(0*7/3)=0, floor(1*7/3)=2, floor(2*7/3)=4
    assert_eq!(starts, vec![0, 200, 400]);
    assert!(words.iter().all(|w| w.is_estimated));
    assert_eq!(
        words.iter().map(|w| w.is_end_of_line).collect::<Vec<_>>(),
        vec![false, false, true]
    );
    assert_eq!(words[1].text, "אש");
}

#[test]
fn test_translation_timings_empty_inputs() {
    assert!(synthesize_translation_timings("   ", &fixture_words()).is_empty());
    assert!(synthesize_translation_timings("hola", &[]).is_empty());
}

#[test]
fn test_translation_more_tokens_than_source_words() {
    let source = vec![TimedWord::new("a", 0, 100), TimedWord::new("b", 100, 200)];
    let words = synthesize_translation_timings("uno dos tres cuatro cinco", &source);
    let starts: Vec<u64> = words.iter().map(|w| w.start_ms).collect();
    assert_eq!(starts, vec![0, 0, 0, 100, 100]);
}

// ============================================================================
// Line progress animation
// ============================================================================

#[test]
fn test_animation_resumes_from_current_fraction() {
    let line = Line::new("a", "x", 1000, 1000);
    let mut anim = LineProgressAnimation::new();

    anim.restart(Some(&line), 1500, true, 0);
    assert!(anim.is_running());
    assert_eq!(anim.sample(0), 0.5);
    assert_eq!(anim.sample(250), 0.75);
    assert_eq!(anim.sample(600), 1.0);
}

#[test]
fn test_animation_holds_while_paused() {
    let line = Line::new("a", "x", 1000, 1000);
    let mut anim = LineProgressAnimation::new();

    anim.restart(Some(&line), 1250, false, 0);
    assert!(!anim.is_running());
    assert_eq!(anim.sample(10_000), 0.25);
}

#[test]
fn test_animation_without_active_line() {
    let line = Line::new("a", "x", 1000, 1000);
    let mut anim = LineProgressAnimation::new();

    anim.restart(Some(&line), 1500, true, 0);
    anim.restart(None, 1500, true, 100);
    assert_eq!(anim.sample(200), 0.0);

    // Outside the line's interval
    anim.restart(Some(&line), 2500, true, 0);
    assert_eq!(anim.sample(100), 0.0);
}

// ============================================================================
// Segmenter
// ============================================================================

#[test]
fn test_segment_by_end_of_line_markers() {
    let lines = fixture_lines();
    let index = LineWordIndex::build(&lines, &fixture_words());

    assert_eq!(index.len(), 3);
    let texts: Vec<&str> = index.words_for("l1").iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["reaching", "dark"]);
    assert_eq!(index.group("l1").map(|g| g.first_word_index), Some(3));
    assert_eq!(index.group("l2").and_then(|g| g.end_ms()), Some(19891));
}

#[test]
fn test_segment_leftover_lines_get_no_group() {
    let lines = fixture_lines();
    let words = vec![TimedWord::new("there's", 6759, 7279).end_of_line()];
    let index = LineWordIndex::build(&lines, &words);

    assert_eq!(index.len(), 1);
    assert!(index.words_for("l1").is_empty());

    let timings = index.timings(&lines);
    assert!(matches!(timings[0], Timing::WordAware(_, w) if w.len() == 1));
    assert!(matches!(timings[1], Timing::LineOnly(_)));
    assert_eq!(timings[1].effective_interval(), (10500, 14470));
}

#[test]
fn test_segment_trailing_partial_group_attaches_to_next_line() {
    let lines = fixture_lines();
    let words = vec![
        TimedWord::new("heart", 10479, 10980).end_of_line(),
        TimedWord::new("reaching", 11300, 12219),
        TimedWord::new("a", 12239, 12399),
    ];
    let index = LineWordIndex::build(&lines, &words);

    assert_eq!(index.words_for("l1").len(), 2);
    assert!(index.group("l2").is_none());
}

#[test]
fn test_segment_words_beyond_last_line_are_dropped() {
    let lines = vec![Line::new("only", "a", 0, 1000)];
    let words = vec![
        TimedWord::new("a", 0, 100).end_of_line(),
        TimedWord::new("b", 200, 300).end_of_line(),
    ];
    let index = LineWordIndex::build(&lines, &words);
    assert_eq!(index.len(), 1);
    assert_eq!(index.words_for("only").len(), 1);
}

#[test]
fn test_segment_without_markers_buckets_by_time() {
    let lines = fixture_lines();
    let words = vec![
        TimedWord::new("early", 5000, 5100),
        TimedWord::new("there's", 6759, 7279),
        TimedWord::new("reaching", 11300, 12219),
        TimedWord::new("finally", 15859, 17399),
    ];
    let index = LineWordIndex::build(&lines, &words);

    assert_eq!(index.words_for("l0").len(), 2);
    assert_eq!(index.words_for("l1").len(), 1);
    assert_eq!(index.group("l2").map(|g| g.first_word_index), Some(3));
}

#[test]
fn test_segment_empty_inputs() {
    assert!(LineWordIndex::build(&fixture_lines(), &[]).is_empty());
    assert!(LineWordIndex::build(&[], &fixture_words()).is_empty());
}

// ============================================================================
// Resolver
// ============================================================================

#[test]
fn test_line_only_resolution() {
    let lines = fixture_lines();
    let index = LineWordIndex::default();
    let resolver = ActivePositionResolver::new(&index.timings(&lines), true);

    assert_eq!(resolver.resolve_line(0), NO_ACTIVE_INDEX);
    assert_eq!(resolver.resolve_line(6089), NO_ACTIVE_INDEX);
    assert_eq!(resolver.resolve_line(6090), 0);
    assert_eq!(resolver.resolve_line(10499), 0);
    assert_eq!(resolver.resolve_line(10500), 1);
    // After the last line ends, it stays active
    assert_eq!(resolver.resolve_line(60_000), 2);
}

#[test]
fn test_word_aware_gap_attribution() {
    let lines = fixture_lines();
    let index = LineWordIndex::build(&lines, &fixture_words());
    let resolver = ActivePositionResolver::new(&index.timings(&lines), true);

    // Effective interval is tighter than the nominal line
    assert_eq!(resolver.resolve_line(6500), NO_ACTIVE_INDEX);
    assert_eq!(resolver.resolve_line(6759), 0);
    // Between line 0's last word end and line 1's first word start
    for t in 10980..11300 {
        assert_eq!(resolver.resolve_line(t), 0);
    }
    assert_eq!(resolver.resolve_line(11300), 1);
    assert_eq!(resolver.effective_interval(1), Some((11300, 15220)));
}

#[test]
fn test_gaps_without_hold() {
    let lines = fixture_lines();
    let index = LineWordIndex::build(&lines, &fixture_words());
    let resolver = ActivePositionResolver::new(&index.timings(&lines), false);

    assert_eq!(resolver.resolve_line(10979), 0);
    assert_eq!(resolver.resolve_line(10980), NO_ACTIVE_INDEX);
    assert_eq!(resolver.resolve_line(11300), 1);
}

#[test]
fn test_resolution_is_idempotent() {
    let lines = fixture_lines();
    let index = LineWordIndex::build(&lines, &fixture_words());
    let resolver = ActivePositionResolver::new(&index.timings(&lines), true);

    for t in [0, 6759, 10980, 14000, 19000, 50_000] {
        assert_eq!(resolver.resolve_line(t), resolver.resolve_line(t));
    }
}

#[test]
fn test_empty_resolver() {
    let resolver = ActivePositionResolver::new(&[], true);
    assert_eq!(resolver.resolve_line(1000), NO_ACTIVE_INDEX);
    assert_eq!(resolver.line_count(), 0);
}

#[test]
fn test_find_word_index() {
    let words = fixture_words();
    assert_eq!(find_word_index(&words, 0), NO_ACTIVE_INDEX);
    assert_eq!(find_word_index(&words, 6759), 0);
    // Held through the gap between "there's" and "a"
    assert_eq!(find_word_index(&words, 7290), 0);
    assert_eq!(find_word_index(&words, 7299), 1);
    assert_eq!(find_word_index(&words, 99_999), 6);
    assert_eq!(find_word_index(&[], 100), NO_ACTIVE_INDEX);
}

// ============================================================================
// Throttled tracker
// ============================================================================

#[test]
fn test_tracker_only_resolves_on_bucket_change() {
    let mut tracker = ActiveIndexTracker::new(50);
    let mut calls = 0;

    assert_eq!(tracker.update(10, |_| { calls += 1; 0 }), Some(0));
    assert_eq!(tracker.update(40, |_| { calls += 1; 1 }), None);
    assert_eq!(calls, 1);
    assert_eq!(tracker.current(), 0);
}

#[test]
fn test_tracker_publishes_only_changes() {
    let mut tracker = ActiveIndexTracker::new(50);
    assert_eq!(tracker.update(0, |_| NO_ACTIVE_INDEX), None);
    assert_eq!(tracker.update(50, |_| 2), Some(2));
    assert_eq!(tracker.update(100, |_| 2), None);
    assert_eq!(tracker.update(150, |_| 3), Some(3));
}

#[test]
fn test_tracker_force_ignores_bucket() {
    let mut tracker = ActiveIndexTracker::new(1000);
    tracker.update(100, |_| 0);
    assert_eq!(tracker.update(200, |_| 4), None);
    assert_eq!(tracker.force(200, |_| 4), Some(4));

    tracker.clear();
    assert_eq!(tracker.current(), NO_ACTIVE_INDEX);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_word_progress_strictly_increasing(
        start in 0u64..100_000,
        len in 2u64..10_000,
        a in 0u64..10_000,
        b in 0u64..10_000,
    ) {
        let word = TimedWord::new("w", start, start + len);
        let (lo, hi) = ((a % len).min(b % len), (a % len).max(b % len));
        prop_assume!(lo < hi);
        prop_assert!(word_progress(&word, start + lo) < word_progress(&word, start + hi));
    }

    #[test]
    fn prop_progress_is_clamped(start in 0u64..100_000, len in 0u64..10_000, t in 0u64..200_000) {
        let word = TimedWord::new("w", start, start + len);
        let p = word_progress(&word, t);
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
