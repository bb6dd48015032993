use wasm_bindgen::prelude::*;
use serde::Serialize;

use lyricsync::text::{layouts_from_measured, TimedText};
use lyricsync::timing::{
    find_word_index, synthesize_translation_timings, ActivePositionResolver, LineWordIndex,
};
use lyricsync::{Line, LyricsError, MeasuredLine, Song, TimedWord, WritingDirection};

#[derive(Serialize)]
struct BindingError {
    message: String,
    line: Option<usize>,
    word: Option<usize>,
}

#[derive(Serialize)]
struct Diagnostic {
    message: String,
    line: Option<usize>,
    word: Option<usize>,
    severity: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveState {
    line: i64,
    word: i64,
    line_progress: f64,
    word_progresses: Vec<f64>,
}

fn error_to_binding_error(e: LyricsError) -> BindingError {
    match e {
        LyricsError::InvalidLine { index, message } => BindingError {
            message,
            line: Some(index),
            word: None,
        },
        LyricsError::InvalidWord { index, message } => BindingError {
            message,
            line: None,
            word: Some(index),
        },
        other => BindingError {
            message: other.to_string(),
            line: None,
            word: None,
        },
    }
}

fn error_to_diagnostic(e: LyricsError) -> Diagnostic {
    let BindingError { message, line, word } = error_to_binding_error(e);
    Diagnostic {
        message,
        line,
        word,
        severity: "error".to_string(),
    }
}

fn to_js_error(e: LyricsError) -> JsValue {
    let error = error_to_binding_error(e);
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

fn decode_error(what: &str, e: serde_json::Error) -> JsValue {
    to_js_error(LyricsError::SongData(format!("{}: {}", what, e)))
}

fn encode<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_song(song_json: &str) -> Result<Song, JsValue> {
    Song::from_json(song_json).map_err(to_js_error)
}

fn parse_words(words_json: &str) -> Result<Vec<TimedWord>, JsValue> {
    serde_json::from_str(words_json).map_err(|e| decode_error("words", e))
}

fn direction(rtl: bool) -> WritingDirection {
    if rtl {
        WritingDirection::Rtl
    } else {
        WritingDirection::Ltr
    }
}

// JS numbers are f64; negative or NaN times clamp to the song start
fn to_ms(t: f64) -> u64 {
    if t.is_finite() && t > 0.0 {
        t as u64
    } else {
        0
    }
}

/// Load song JSON and check its timing invariants
#[wasm_bindgen]
pub fn validate(song_json: &str) -> Result<(), JsValue> {
    lyricsync::load_song(song_json).map(|_| ()).map_err(to_js_error)
}

/// Total song duration in milliseconds
#[wasm_bindgen]
pub fn total_duration(song_json: &str) -> Result<f64, JsValue> {
    parse_song(song_json).map(|song| song.total_duration_ms() as f64)
}

/// Index of the line active at `t`, or -1
#[wasm_bindgen]
pub fn resolve_active_line(
    song_json: &str,
    t: f64,
    hold_through_gaps: bool,
) -> Result<i32, JsValue> {
    let song = parse_song(song_json)?;
    let index = LineWordIndex::build(&song.lines, &song.words);
    let resolver = ActivePositionResolver::new(&index.timings(&song.lines), hold_through_gaps);
    Ok(resolver.resolve_line(to_ms(t)) as i32)
}

/// Active line, the active word within that line and their progress at `t`, as a
/// JSON object
#[wasm_bindgen]
pub fn active_state(song_json: &str, t: f64) -> Result<String, JsValue> {
    let song = parse_song(song_json)?;
    let t = to_ms(t);
    let index = LineWordIndex::build(&song.lines, &song.words);
    let resolver = ActivePositionResolver::new(&index.timings(&song.lines), true);

    let line = resolver.resolve_line(t);
    let current = usize::try_from(line).ok().and_then(|i| song.lines.get(i));
    let line_words = current.map(|l| index.words_for(&l.id)).unwrap_or(&[]);

    encode(&ActiveState {
        line,
        word: find_word_index(line_words, t),
        line_progress: current.map(|l| lyricsync::line_progress(l, t)).unwrap_or(0.0),
        word_progresses: lyricsync::timing::word_progresses(line_words, t),
    })
}

/// Progress of one word (`TimedWord` JSON) at `t`
#[wasm_bindgen]
pub fn word_progress(word_json: &str, t: f64) -> Result<f64, JsValue> {
    let word: TimedWord = serde_json::from_str(word_json).map_err(|e| decode_error("word", e))?;
    Ok(lyricsync::word_progress(&word, to_ms(t)))
}

/// Progress of one line (`Line` JSON) at `t`
#[wasm_bindgen]
pub fn line_progress(line_json: &str, t: f64) -> Result<f64, JsValue> {
    let line: Line = serde_json::from_str(line_json).map_err(|e| decode_error("line", e))?;
    Ok(lyricsync::line_progress(&line, to_ms(t)))
}

/// Per-word progress for a word list at `t`, as a JS array
#[wasm_bindgen]
pub fn word_progresses(words_json: &str, t: f64) -> Result<JsValue, JsValue> {
    let words = parse_words(words_json)?;
    let progresses = lyricsync::timing::word_progresses(&words, to_ms(t));
    serde_wasm_bindgen::to_value(&progresses).map_err(JsValue::from)
}

/// Character ranges of each word within `text` as a JSON array
#[wasm_bindgen]
pub fn align_words(text: &str, words_json: &str) -> Result<String, JsValue> {
    let words = parse_words(words_json)?;
    encode(&lyricsync::text::align_words(text, &words))
}

/// Seek time for a tap at (x, y) on rendered text
///
/// `measured_lines_json` is the host's line measurement for `text`.
#[wasm_bindgen]
pub fn hit_test(
    x: f64,
    y: f64,
    text: &str,
    words_json: &str,
    measured_lines_json: &str,
    rtl: bool,
) -> Result<f64, JsValue> {
    let words = parse_words(words_json)?;
    let measured: Vec<MeasuredLine> =
        serde_json::from_str(measured_lines_json).map_err(|e| decode_error("measured lines", e))?;

    let mut timed = TimedText::new(text, words, direction(rtl));
    timed.set_layouts(layouts_from_measured(&measured));
    Ok(timed.tap(x, y) as f64)
}

/// Estimated word timings for a translation of a timed line
#[wasm_bindgen]
pub fn translation_timings(text: &str, source_words_json: &str) -> Result<String, JsValue> {
    let source = parse_words(source_words_json)?;
    encode(&synthesize_translation_timings(text, &source))
}

/// Check song JSON and return diagnostics as a JSON array
#[wasm_bindgen]
pub fn lint(song_json: &str) -> String {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    match Song::from_json(song_json) {
        Ok(song) => {
            if let Err(e) = lyricsync::validate_song(&song) {
                diagnostics.push(error_to_diagnostic(e));
            }
        }
        Err(e) => diagnostics.push(error_to_diagnostic(e)),
    }

    serde_json::to_string(&diagnostics).unwrap_or_else(|_| "[]".to_string())
}
