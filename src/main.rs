use musical_linguistics::score::{NoteHandle, NotePair, RenderedNote, SystemLayout};
use musical_linguistics::sync::{AudioEngine, Generation, PlaybackSink};
use musical_linguistics::{
    Instrument, LinguisticsError, NotationEngine, Session, Settings, VirtualPlayer,
};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Usage: musical-linguistics [--config FILE] [--interval ID] [--instrument ID]
                           [--octave N] [--tempo N] [--rest] [--play]
                           <input.txt> [output.mid]";

#[derive(Default)]
struct Options {
    config: Option<String>,
    interval: Option<String>,
    instrument: Option<String>,
    octave: Option<String>,
    tempo: Option<String>,
    rest: bool,
    play: bool,
    input: String,
    output: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let flag = arg.as_str();
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match flag {
            "--config" => options.config = Some(value()?),
            "--interval" => options.interval = Some(value()?),
            "--instrument" => options.instrument = Some(value()?),
            "--octave" => options.octave = Some(value()?),
            "--tempo" => options.tempo = Some(value()?),
            "--rest" => options.rest = true,
            "--play" => options.play = true,
            _ if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    options.input = positional.next().ok_or("Missing input file")?;
    options.output = positional.next();
    if positional.next().is_some() {
        return Err("Too many arguments".to_string());
    }
    Ok(options)
}

fn load_settings(options: &Options) -> Result<Settings, LinguisticsError> {
    let mut settings = match &options.config {
        Some(path) => Settings::from_yaml(&fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    if let Some(id) = &options.interval {
        settings.set_interval(id)?;
    }
    if let Some(id) = &options.instrument {
        settings.set_instrument(id)?;
    }
    if let Some(text) = &options.octave {
        settings.set_octave(text);
    }
    if let Some(text) = &options.tempo {
        settings.set_tempo(text);
    }
    if options.rest {
        settings.rest_on_spaces = true;
    }
    Ok(settings)
}

/// Instruments are "loaded" instantly; the completion is delivered by `main`
#[derive(Default)]
struct ConsoleAudio {
    loaded: Option<(Instrument, Generation)>,
}

impl AudioEngine for ConsoleAudio {
    fn load(&mut self, instrument: Instrument, generation: Generation) {
        self.loaded = Some((instrument, generation));
    }
}

/// Prints what a display would highlight
#[derive(Default)]
struct ConsoleSink {
    text: Vec<char>,
}

impl PlaybackSink for ConsoleSink {
    fn highlight_score_note(&mut self, pair: &NotePair) {
        let handle = |h: Option<NoteHandle>| {
            h.map(|h| h.0.to_string())
                .unwrap_or_else(|| "-".into())
        };
        print!("\nbeat {} [{} | {}]", pair.beat + 1, handle(pair.treble), handle(pair.bass));
    }

    fn highlight_letter(&mut self, position: usize) {
        if let Some(ch) = self.text.get(position) {
            print!("  '{}'", ch);
        }
    }

    fn move_playhead(&mut self, fraction: f64) {
        print!("  {:>3.0}%", fraction * 100.0);
    }

    fn trigger_audio(&mut self, note: &str, duration_secs: f64) {
        print!("  {} for {:.3}s", note, duration_secs);
    }

    fn clear_highlights(&mut self) {
        println!("\nStopped");
    }
}

/// Hands out one note handle per token, treble stave before bass
#[derive(Default)]
struct TextNotation {
    systems: Vec<SystemLayout>,
}

impl NotationEngine for TextNotation {
    fn clear(&mut self) {
        self.systems.clear();
    }

    fn add_system(&mut self, system: &SystemLayout) -> Result<(), LinguisticsError> {
        self.systems.push(system.clone());
        Ok(())
    }

    fn draw(&mut self) -> Result<Vec<RenderedNote>, LinguisticsError> {
        let mut notes = Vec::new();
        for system in &self.systems {
            for stave in [&system.treble, &system.bass] {
                for _ in &stave.tokens {
                    notes.push(RenderedNote {
                        handle: NoteHandle(notes.len()),
                        register: stave.register,
                    });
                }
            }
        }
        Ok(notes)
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let settings = match load_settings(&options) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Read input file
    let source = match fs::read_to_string(&options.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", options.input, e);
            process::exit(1);
        }
    };

    let mut session = Session::new(
        settings,
        ConsoleAudio::default(),
        VirtualPlayer::new(),
        ConsoleSink::default(),
        TextNotation::default(),
    );

    let composition = match session.convert(&source) {
        Ok(composition) => composition.clone(),
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            process::exit(1);
        }
    };

    println!("Text:       {}", composition.text.as_string());
    println!(
        "Settings:   {} / {} / octave {} / {} bpm{}",
        settings.interval.label(),
        settings.instrument.label(),
        settings.octave,
        settings.tempo,
        if settings.rest_on_spaces { " / rests" } else { "" }
    );
    let words: Vec<String> = composition
        .transcript
        .words
        .iter()
        .map(|word| word.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" "))
        .collect();
    println!("Transcript: {}", words.join(" | "));
    for (i, system) in session.layout().systems.iter().enumerate() {
        println!(
            "Measure {:>3}: {:<32} {}",
            i + 1,
            system.treble.tokens.join(" "),
            system.bass.tokens.join(" ")
        );
    }
    println!("Length:     {}", composition.song_time());

    // Output
    if let Some(path) = &options.output {
        if let Err(e) = fs::write(path, &composition.artifact) {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        }
        eprintln!("Wrote MIDI to {}", path);
    }

    if options.play {
        let text = composition.text.glyphs.iter().map(|g| g.ch).collect();
        session.synchronizer_mut().sink_mut().text = text;
        session.run_until_idle();
        if let Some((_, generation)) = session.audio().loaded {
            session.instrument_loaded(generation);
        }
        if let Err(warning) = session.play() {
            eprintln!("Cannot play: {}", warning);
            process::exit(1);
        }
        session.run_until_idle();
    }
}
