//! Overlay preview generator: HTML page in, standalone preview page out.
//!
//! Usage:
//!   cloud-preview [OPTIONS] <input.html | ->
//!
//! Runs the cloud pipeline over the input document and writes a complete
//! HTML page embedding the overlay (or the JSON payload with `--json`).

use std::io::{Read, Write};

use page_cloud::{CloudOptions, MatchPolicy, WordCloud};
use page_cloud_overlay::{render_preview_document, CloudPayload, OverlayConfig};

struct PreviewConfig {
    input: String,
    out_path: String,
    title: Option<String>,
    json: bool,
    min_word_chars: usize,
    policy: MatchPolicy,
    min_size_px: f32,
    max_size_px: f32,
    min_opacity: f32,
    max_opacity: f32,
    strict: bool,
}

fn usage() -> &'static str {
    "Usage: cloud-preview [OPTIONS] <input.html | ->\n\
     \n\
     Options:\n\
       --out PATH         output path, or - for stdout (default cloud-preview.html)\n\
       --title TEXT       overlay heading\n\
       --json             write the JSON payload instead of HTML\n\
       --min-len N        minimum word length in characters (default 4)\n\
       --policy P         word match policy: exact | substring (default exact)\n\
       --min-size PX      font size for count 1 (default 10)\n\
       --max-size PX      font size for the maximum count (default 36)\n\
       --min-opacity O    opacity for count 1 (default 0.5)\n\
       --max-opacity O    opacity for the maximum count (default 1.0)\n\
       --strict           fail on malformed markup instead of stopping early\n\
       --help             print this help"
}

fn parse_args(args: &[String]) -> Result<PreviewConfig, String> {
    let mut cfg = PreviewConfig {
        input: String::new(),
        out_path: "cloud-preview.html".to_string(),
        title: None,
        json: false,
        min_word_chars: 4,
        policy: MatchPolicy::Exact,
        min_size_px: 10.0,
        max_size_px: 36.0,
        min_opacity: 0.5,
        max_opacity: 1.0,
        strict: false,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Err(usage().to_string()),
            "--out" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--out requires a value".to_string())?;
                cfg.out_path = v.clone();
                i += 2;
            }
            "--title" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--title requires a value".to_string())?;
                cfg.title = Some(v.clone());
                i += 2;
            }
            "--json" => {
                cfg.json = true;
                i += 1;
            }
            "--min-len" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--min-len requires a value".to_string())?;
                cfg.min_word_chars = v
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --min-len value '{}'", v))?;
                i += 2;
            }
            "--policy" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--policy requires a value".to_string())?;
                cfg.policy = match v.trim().to_ascii_lowercase().as_str() {
                    "exact" => MatchPolicy::Exact,
                    "substring" => MatchPolicy::Substring,
                    other => return Err(format!("unknown --policy value '{}'", other)),
                };
                i += 2;
            }
            "--min-size" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--min-size requires a value".to_string())?;
                cfg.min_size_px = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --min-size value '{}'", v))?;
                i += 2;
            }
            "--max-size" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--max-size requires a value".to_string())?;
                cfg.max_size_px = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --max-size value '{}'", v))?;
                i += 2;
            }
            "--min-opacity" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--min-opacity requires a value".to_string())?;
                cfg.min_opacity = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --min-opacity value '{}'", v))?;
                i += 2;
            }
            "--max-opacity" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--max-opacity requires a value".to_string())?;
                cfg.max_opacity = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --max-opacity value '{}'", v))?;
                i += 2;
            }
            "--strict" => {
                cfg.strict = true;
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{}'\n\n{}", other, usage()));
            }
            positional => {
                if !cfg.input.is_empty() {
                    return Err(format!("unexpected extra argument '{}'", positional));
                }
                cfg.input = positional.to_string();
                i += 1;
            }
        }
    }

    if cfg.input.is_empty() {
        return Err(usage().to_string());
    }
    Ok(cfg)
}

fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == "-" {
        let mut bytes = Vec::with_capacity(64 * 1024);
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        return Ok(bytes);
    }
    std::fs::read(path).map_err(|e| format!("failed to read '{}': {}", path, e))
}

fn write_output(path: &str, payload: &str) -> Result<(), String> {
    if path == "-" {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(payload.as_bytes())
            .map_err(|e| format!("failed to write stdout: {}", e))?;
        return Ok(());
    }
    std::fs::write(path, payload).map_err(|e| format!("failed to write '{}': {}", path, e))
}

fn run(args: &[String]) -> Result<(), String> {
    let cfg = parse_args(args)?;
    let html = read_input(&cfg.input)?;

    let mut options = CloudOptions::default();
    options.tokenizer.min_word_chars = cfg.min_word_chars;
    options.match_policy = cfg.policy;
    options.style.min_size_px = cfg.min_size_px;
    options.style.max_size_px = cfg.max_size_px;
    options.style.min_opacity = cfg.min_opacity;
    options.style.max_opacity = cfg.max_opacity;
    options.lenient_html = !cfg.strict;

    let cloud = WordCloud::from_html_bytes(&html, options).map_err(|e| e.to_string())?;

    let payload = if cfg.json {
        CloudPayload::from_cloud(&cloud)
            .to_json()
            .map_err(|e| e.to_string())?
    } else {
        let mut overlay_config = OverlayConfig::default();
        if let Some(title) = cfg.title {
            overlay_config.title = title;
        }
        render_preview_document(&cloud, &overlay_config)
    };

    write_output(&cfg.out_path, &payload)?;
    if cfg.out_path != "-" {
        eprintln!(
            "wrote {} ({} distinct words, max frequency {})",
            cfg.out_path,
            cloud.len(),
            cloud.max_frequency()
        );
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(message) = run(&args) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
