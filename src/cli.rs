use pitchmix::analysis::{note_name, write_melody_json, MelodyArtifact};
use pitchmix::{MixParams, ProgressUpdate};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        print_usage();
        std::process::exit(1);
    }

    let reference_path = &args[1];
    let voice_path = &args[2];
    let output_path = &args[3];

    // Parse remaining arguments
    let mut reference_volume: Option<f32> = None;
    let mut voice_volume: Option<f32> = None;
    let mut export_melody: Option<String> = None;
    let mut verbose = false;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--reference-volume" | "-r" => {
                i += 1;
                reference_volume = Some(parse_f32(&args, i, "reference-volume"));
            }
            "--voice-volume" => {
                i += 1;
                voice_volume = Some(parse_f32(&args, i, "voice-volume"));
            }
            "--export-melody" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("ERROR: --export-melody requires a path");
                    std::process::exit(1);
                }
                export_melody = Some(args[i].clone());
            }
            "--verbose" | "-v" => verbose = true,
            other => {
                eprintln!("ERROR: Unknown option '{}'", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // Read inputs
    let reference = match pitchmix::io::wav::read_wav_file(Path::new(reference_path)) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", reference_path, e);
            std::process::exit(1);
        }
    };
    let voice = match pitchmix::io::wav::read_wav_file(Path::new(voice_path)) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", voice_path, e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "Reference: {} frames, {} Hz, {} ch, {:.2}s",
        reference.num_frames(),
        reference.sample_rate,
        reference.num_channels(),
        reference.duration_secs()
    );
    eprintln!(
        "Voice: {} frames, {} Hz, {} ch, {:.2}s",
        voice.num_frames(),
        voice.sample_rate,
        voice.num_channels(),
        voice.duration_secs()
    );

    // Configure params
    let mut params = MixParams::default();
    if let Some(volume) = reference_volume {
        params = params.with_reference_volume(volume);
    }
    if let Some(volume) = voice_volume {
        params = params.with_voice_volume(volume);
    }

    if verbose {
        eprintln!(
            "Volumes: reference {:.2}, voice {:.2}",
            params.reference_volume, params.voice_volume
        );
    }

    let start = std::time::Instant::now();

    let mut sink = |update: ProgressUpdate| {
        if verbose {
            eprintln!("{:>3}% {}", update.percent, update.step);
        }
    };
    let output = match pitchmix::render(&reference, &voice, &params, &mut sink) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ERROR: Transform failed: {}", e);
            std::process::exit(1);
        }
    };

    let elapsed = start.elapsed();

    eprintln!(
        "Output: {} frames, {} ch, {:.2}s",
        output.num_frames(),
        output.num_channels(),
        output.duration_secs()
    );

    if verbose {
        let reference_duration = reference.duration_secs();
        let processing_secs = elapsed.as_secs_f64();
        let realtime_factor = if processing_secs > 0.0 {
            reference_duration / processing_secs
        } else {
            f64::INFINITY
        };
        eprintln!(
            "Processing time: {:.3}s ({:.1}x realtime)",
            processing_secs, realtime_factor
        );
    }

    if let Err(e) = pitchmix::io::wav::write_wav_file_16bit(Path::new(output_path), &output) {
        eprintln!("ERROR: Failed to write {}: {}", output_path, e);
        std::process::exit(1);
    }

    eprintln!("Written to {}", output_path);

    // Export the tracked melody after a successful transform
    if let Some(melody_path) = export_melody {
        let melody_params = pitchmix::mix::reference_melody_params();
        let points = pitchmix::extract_melody_buffer(&reference, &melody_params);
        let artifact = MelodyArtifact::new(reference.sample_rate, &melody_params, points);

        if let Err(e) = write_melody_json(Path::new(&melody_path), &artifact) {
            eprintln!("ERROR: Failed to write {}: {}", melody_path, e);
            std::process::exit(1);
        }
        eprintln!(
            "Melody: {} points, median {:.1} Hz ({}), written to {}",
            artifact.points.len(),
            artifact.median_pitch,
            note_name(artifact.median_pitch),
            melody_path
        );
    }
}

fn print_usage() {
    eprintln!("Usage: pitchmix-cli <reference.wav> <voice.wav> <output.wav> [options]");
    eprintln!();
    eprintln!("Pitch-shifts the voice to follow the reference melody and mixes both");
    eprintln!("into <output.wav> (16-bit PCM at the reference's sample rate).");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --reference-volume <f>, -r <f>  Reference gain, 0.0-1.0 (default: 0.3)");
    eprintln!("  --voice-volume <f>              Voice gain, 0.0-1.0 (default: 1.0)");
    eprintln!("  --export-melody <path>          Write the tracked melody as JSON");
    eprintln!("  --verbose, -v                   Show progress and timing");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  pitchmix-cli song.wav voice.wav mixed.wav");
    eprintln!("  pitchmix-cli song.wav voice.wav mixed.wav -r 0.2 --voice-volume 0.9");
    eprintln!("  pitchmix-cli song.wav voice.wav mixed.wav --export-melody melody.json -v");
}

fn parse_f32(args: &[String], idx: usize, name: &str) -> f32 {
    if idx >= args.len() {
        eprintln!("ERROR: --{} requires a value", name);
        std::process::exit(1);
    }
    match args[idx].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    }
}
