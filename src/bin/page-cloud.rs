//! Word-cloud CLI: HTML in, styled frequency table out.
//!
//! Usage:
//!   page-cloud [OPTIONS] <input.html | ->
//!
//! Reads an HTML document from a file (or stdin with `-`), runs the
//! extraction/tokenize/aggregate pipeline, and prints one row per distinct
//! word with its count and interpolated style.

use std::io::Read;

use page_cloud::{CloudOptions, MatchPolicy, WordCloud};

struct CliConfig {
    input: String,
    min_word_chars: usize,
    policy: MatchPolicy,
    min_size_px: f32,
    max_size_px: f32,
    min_opacity: f32,
    max_opacity: f32,
    top: Option<usize>,
    strict: bool,
}

fn usage() -> &'static str {
    "Usage: page-cloud [OPTIONS] <input.html | ->\n\
     \n\
     Options:\n\
       --min-len N        minimum word length in characters (default 4)\n\
       --policy P         word match policy: exact | substring (default exact)\n\
       --min-size PX      font size for count 1 (default 10)\n\
       --max-size PX      font size for the maximum count (default 36)\n\
       --min-opacity O    opacity for count 1 (default 0.5)\n\
       --max-opacity O    opacity for the maximum count (default 1.0)\n\
       --top N            print only the N most frequent words\n\
       --strict           fail on malformed markup instead of stopping early\n\
       --help             print this help"
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let mut cfg = CliConfig {
        input: String::new(),
        min_word_chars: 4,
        policy: MatchPolicy::Exact,
        min_size_px: 10.0,
        max_size_px: 36.0,
        min_opacity: 0.5,
        max_opacity: 1.0,
        top: None,
        strict: false,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Err(usage().to_string()),
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
            "--top" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--top requires a value".to_string())?;
                cfg.top = Some(
                    v.parse::<usize>()
                        .map_err(|_| format!("invalid --top value '{}'", v))?,
                );
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

    let mut rows: Vec<(&str, u32)> = cloud.table().iter().collect();
    if let Some(top) = cfg.top {
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows.truncate(top);
    }

    println!("{:<28} {:>6} {:>9} {:>8}", "word", "count", "size(px)", "opacity");
    for (word, count) in rows {
        let style = cloud.style_for(count);
        println!(
            "{:<28} {:>6} {:>9.1} {:>8.2}",
            word, count, style.font_size_px, style.opacity
        );
    }
    println!(
        "\n{} distinct words, max frequency {}",
        cloud.len(),
        cloud.max_frequency()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(message) = run(&args) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
