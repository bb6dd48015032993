use std::env;
use std::process;

use lyricsync::playback::{format_time, ManualTimeSource, SyncEngine, TimeSource};
use lyricsync::timing::{find_word_index, word_progress};
use lyricsync::{EngineConfig, Song, NO_ACTIVE_INDEX};

const USAGE: &str =
    "Usage: lyricsync <song.json> [--config engine.yaml] [--at <ms>] [--simulate <step_ms>]";

struct Args {
    song_path: String,
    config_path: Option<String>,
    at: Option<u64>,
    simulate: Option<u64>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut song_path = None;
    let mut config_path = None;
    let mut at = None;
    let mut simulate = None;

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--config" | "--at" | "--simulate" => {
                let value = args.get(i + 1).ok_or_else(|| format!("{} needs a value", arg))?;
                match arg {
                    "--config" => config_path = Some(value.clone()),
                    "--at" => at = Some(parse_ms(arg, value)?),
                    _ => simulate = Some(parse_ms(arg, value)?.max(1)),
                }
                i += 2;
            }
            _ if arg.starts_with("--") => return Err(format!("unknown option {}", arg)),
            _ => {
                if song_path.replace(arg.to_string()).is_some() {
                    return Err("only one song file may be given".to_string());
                }
                i += 1;
            }
        }
    }

    Ok(Args {
        song_path: song_path.ok_or_else(|| USAGE.to_string())?,
        config_path,
        at,
        simulate,
    })
}

fn parse_ms(flag: &str, value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("{} expects milliseconds, got '{}'", flag, value))
}

fn print_summary(song: &Song) {
    println!("Title:    {}", song.title.as_deref().unwrap_or("(untitled)"));
    println!("Artist:   {}", song.artist.as_deref().unwrap_or("(unknown)"));
    println!("Lines:    {}", song.lines.len());
    println!(
        "Words:    {}{}",
        song.words.len(),
        if song.has_word_timing() { "" } else { " (line timing only)" }
    );
    println!("Duration: {}", format_time(song.total_duration_ms()));
}

fn line_label(song: &Song, index: i64) -> String {
    match usize::try_from(index).ok().and_then(|i| song.lines.get(i)) {
        Some(line) => format!("[{}] {}", index, line.text),
        None => "(none)".to_string(),
    }
}

fn resolve_at(engine: &mut SyncEngine<ManualTimeSource>, t: u64) {
    engine.seek(t as i64);
    let song = engine.song();
    let elapsed = engine.elapsed_ms();

    println!();
    println!("At {} ({} ms):", format_time(elapsed), elapsed);
    println!("  line: {}", line_label(song, engine.active_line()));

    let word_index = find_word_index(&song.words, elapsed);
    match usize::try_from(word_index).ok().and_then(|i| song.words.get(i)) {
        Some(word) => println!(
            "  word: [{}] {} ({:.0}%)",
            word_index,
            word.display_text(),
            word_progress(word, elapsed) * 100.0
        ),
        None if word_index == NO_ACTIVE_INDEX && song.has_word_timing() => {
            println!("  word: (none)")
        }
        None => {}
    }
    println!("  line progress: {:.0}%", engine.active_line_progress() * 100.0);
}

fn simulate(engine: &mut SyncEngine<ManualTimeSource>, time: &ManualTimeSource, step_ms: u64) {
    let lines: Vec<String> = engine.song().lines.iter().map(|l| l.text.clone()).collect();
    let now = {
        let time = time.clone();
        move || time.now_ms()
    };
    let start = now();
    engine.active_line_changed().subscribe(move |index: &i64| {
        let elapsed = now().saturating_sub(start);
        let text = usize::try_from(*index)
            .ok()
            .and_then(|i| lines.get(i))
            .map(String::as_str)
            .unwrap_or("(none)");
        println!("{:>6}  [{}] {}", format_time(elapsed), index, text);
    });

    println!();
    engine.play();
    while engine.is_playing() {
        time.advance(step_ms);
        engine.on_frame();
    }
    println!("{:>6}  end", format_time(engine.elapsed_ms()));
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let song = match lyricsync::load_song_file(&args.song_path) {
        Ok(song) => song,
        Err(e) => {
            eprintln!("Error loading '{}': {}", args.song_path, e);
            process::exit(1);
        }
    };

    let config = match &args.config_path {
        Some(path) => match lyricsync::load_config_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    if let Err(e) = lyricsync::validate_song(&song) {
        log::warn!("{}", e);
    }

    print_summary(&song);

    let time = ManualTimeSource::new(0);
    let mut engine = SyncEngine::new(song, config, time.clone());

    if let Some(t) = args.at {
        resolve_at(&mut engine, t);
    }
    if let Some(step) = args.simulate {
        engine.seek(0);
        simulate(&mut engine, &time, step);
    }
}
