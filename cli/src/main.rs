use clap::{Parser, Subcommand};
use glyph_specimen::{
    CompiledCharMap, Compiler, DEFAULT_CHARLIST_PATH, DEFAULT_CHARMAP_PATH, LoadedFont, LogSink,
    NameDatabase, Specimen, build_index, codepoint_label, feature_caption,
};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "glyph-specimen")]
#[command(about = "Compile charlists and check them against fonts", long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a charlist text file into the JSON segment map
    Compile {
        /// Charlist source
        #[arg(short, long, default_value = DEFAULT_CHARLIST_PATH)]
        input: PathBuf,

        /// Where to write the compiled map
        #[arg(short, long, default_value = DEFAULT_CHARMAP_PATH)]
        output: PathBuf,

        /// Write the map on a single line instead of indented
        #[arg(long)]
        compact: bool,
    },
    /// List the glyphs a font provides for each segment
    Index {
        /// Font file (TTF/OTF/TTC)
        #[arg(value_name = "FONT")]
        font: PathBuf,

        /// Compiled segment map
        #[arg(short, long, default_value = DEFAULT_CHARMAP_PATH)]
        charmap: PathBuf,

        /// Face index within a font collection
        #[arg(long, default_value_t = 0)]
        face: u32,
    },
    /// Show specimen details for one code point
    Inspect {
        /// Font file (TTF/OTF/TTC)
        #[arg(value_name = "FONT")]
        font: PathBuf,

        /// Code point in hexadecimal, e.g. 51 or U+0051
        #[arg(value_name = "HEX", value_parser = parse_code_point)]
        code: u32,

        /// Compiled segment map
        #[arg(short, long, default_value = DEFAULT_CHARMAP_PATH)]
        charmap: PathBuf,

        /// Name database in UnicodeData.txt format
        #[arg(short, long)]
        names: Option<PathBuf>,

        /// Face index within a font collection
        #[arg(long, default_value_t = 0)]
        face: u32,
    },
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let result = match args.command {
        Command::Compile {
            input,
            output,
            compact,
        } => compile(input, output, compact),
        Command::Index {
            font,
            charmap,
            face,
        } => index(&font, &charmap, face),
        Command::Inspect {
            font,
            code,
            charmap,
            names,
            face,
        } => inspect(&font, code, &charmap, names.as_deref(), face),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn parse_code_point(s: &str) -> Result<u32, String> {
    let hex = s.trim_start_matches("U+").trim_start_matches("u+");
    u32::from_str_radix(hex, 16).map_err(|_| format!("not a hexadecimal code point: {}", s))
}

fn compile(input: PathBuf, output: PathBuf, compact: bool) -> CliResult {
    let compiler = Compiler::builder()
        .input(input)
        .output(output)
        .pretty(!compact)
        .build();
    let map = compiler.run()?;
    println!(
        "Compiled {} segments from {} into {}",
        map.len(),
        compiler.input().display(),
        compiler.output().display()
    );
    Ok(())
}

fn load_font(path: &Path, face: u32) -> Result<LoadedFont, glyph_specimen::Error> {
    let data = std::fs::read(path)?;
    LoadedFont::from_bytes(&data, face)
}

fn index(font: &Path, charmap: &Path, face: u32) -> CliResult {
    let map = CompiledCharMap::load(charmap)?;
    let font = load_font(font, face)?;
    let index = build_index(&map, &font);

    for (segment, entries) in index.iter() {
        let total = map.get(segment).map(|e| e.len()).unwrap_or_default();
        println!("{} ({}/{}):", segment, entries.len(), total);
        for entry in entries {
            let caption = feature_caption(entry.features());
            println!(
                "  {} {} {}{}",
                codepoint_label(entry.code),
                entry.char().unwrap_or(char::REPLACEMENT_CHARACTER),
                entry.glyph.name.as_deref().unwrap_or("-"),
                if caption.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", caption)
                }
            );
        }
    }

    let expected: usize = map.sections().iter().map(|s| s.entries.len()).sum();
    println!(
        "\n{} of {} entries resolved in {}",
        index.glyph_count(),
        expected,
        font.family_name().unwrap_or("font")
    );
    Ok(())
}

fn inspect(
    font: &Path,
    code: u32,
    charmap: &Path,
    names: Option<&Path>,
    face: u32,
) -> CliResult {
    let map = CompiledCharMap::load(charmap)?;
    let font = load_font(font, face)?;
    let names = names.map(NameDatabase::load).transpose()?;

    let mut specimen = Specimen::builder().analytics(LogSink).build(&map);
    specimen.set_font(&font);
    if let Some(names) = names.as_ref() {
        specimen.set_names(names);
    }

    if !map.names().any(|segment| specimen.select_code(segment, code)) {
        return Err(format!("{} is not in the glyph index", codepoint_label(code)).into());
    }

    let details = specimen.details();
    println!("{}", details.name.as_deref().unwrap_or("(unnamed)"));
    if !details.features.is_empty() {
        println!("{}", details.features);
    }
    println!("{}", details.codepoint);
    if let Some(c) = details.character {
        println!("{}", c);
    }
    for line in &details.anatomy {
        println!("  {:<24}{:>6}", line.label, line.value);
    }
    Ok(())
}
