use clap::Parser;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use yuepu_core::Length;
use yuepu_lang as yl;
use yuepu_typeset::{PathResolver, Typesetter, TypesetterOptions};

fn main() {
    env_logger::init();
    if let Err(err) = Cli::parse().run() {
        if !err.is_empty() {
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}

/// Yuepu: tools for CJK and music markup documents.
///
/// Set RUST_LOG=debug to trace font loading and parsing.
#[derive(Debug, Parser)]
#[command(name = "yuepu", version = "0.1", about, long_about, max_term_width(100))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn run(self) -> Result<(), String> {
        match self.command {
            Command::Lex(lex) => lex.run(),
            Command::Parse(parse) => parse.run(),
            Command::Metrics(metrics) => metrics.run(),
            Command::Typeset(typeset) => typeset.run(),
        }
    }
}

#[derive(Clone, Debug, clap::Subcommand)]
enum Command {
    /// Print the tokens of a markup file.
    Lex(Lex),

    /// Parse a layout script and print its syntax tree.
    Parse(Parse),

    /// Print the metrics Yuepu reads from a font file.
    ///
    /// Pass characters to also print their glyph ids and advance widths:
    ///
    ///     $ yuepu metrics path/to/font.otf Ag字
    Metrics(Metrics),

    /// Typeset a markup file and print the horizontal list of each paragraph.
    ///
    /// Font names are file paths.
    /// For font collections append `#N` to select face N:
    ///
    ///     $ yuepu typeset doc.txt --cjk-font NotoSerifCJK.ttc#2 --western-font lmroman10.otf
    Typeset(Typeset),
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!["failed to read file {path:?}: {err}"])
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut s = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        s.push_str(&format![": {err}"]);
        source = err.source();
    }
    s
}

fn print_lex_warnings(path: &Path, source: &str, warnings: &[yl::Warning]) -> Result<(), String> {
    let path = path.to_string_lossy();
    let cache: (&str, _) = (&path, ariadne::Source::from(source));
    for warning in warnings {
        warning
            .ariadne_report(&path)
            .eprint(cache.clone())
            .map_err(|err| err.to_string())?;
    }
    Ok(())
}

#[derive(Clone, Debug, Parser)]
struct Lex {
    /// Path to the markup file.
    path: PathBuf,
}

impl Lex {
    fn run(self) -> Result<(), String> {
        let source = read_source(&self.path)?;
        let (tokens, warnings) = yl::lex(&source);
        for token in &tokens {
            println!("{token:?}");
        }
        print_lex_warnings(&self.path, &source, &warnings)
    }
}

#[derive(Clone, Debug, Parser)]
struct Parse {
    /// Path to the layout script.
    path: PathBuf,
}

impl Parse {
    fn run(self) -> Result<(), String> {
        let source = read_source(&self.path)?;
        match yl::parse(&source) {
            Ok((tree, warnings)) => {
                print!("{tree}");
                print_lex_warnings(&self.path, &source, &warnings)
            }
            Err(err) => {
                let path = self.path.to_string_lossy();
                let cache: (&str, _) = (&path, ariadne::Source::from(source.as_str()));
                err.ariadne_report(&path)
                    .eprint(cache)
                    .map_err(|err| err.to_string())?;
                Err("".into())
            }
        }
    }
}

#[derive(Clone, Debug, Parser)]
struct Metrics {
    /// Path to the font file.
    path: PathBuf,

    /// Face to read if the file is a font collection.
    #[arg(short, long, default_value_t = 0)]
    face: u32,

    /// Characters to look up.
    chars: Option<String>,
}

impl Metrics {
    fn run(self) -> Result<(), String> {
        let file = fs::File::open(&self.path)
            .map_err(|err| format!["failed to open font file {:?}: {err}", self.path])?;
        let (font, warnings) = sfnt::Font::open(BufReader::new(file), self.face, true)
            .map_err(|err| format!["failed to read font file {:?}: {}", self.path, error_chain(&err)])?;
        for warning in &warnings {
            eprintln!("warning: {warning}");
        }
        println!("units per em: {}", font.units_per_em());
        println!("ascent:       {}", font.ascent());
        println!("cap height:   {}", font.caps_height());
        println!("CID-keyed:    {}", font.is_cid_keyed());
        let cmap = match font.cmap() {
            sfnt::Cmap::Format4(_) => "format 4",
            sfnt::Cmap::Format12(_) => "format 12",
        };
        println!("cmap:         {cmap}");
        for c in self.chars.iter().flat_map(|s| s.chars()) {
            let glyph_id = font.glyph_id(c);
            let (width, warning) = font.advance_width(glyph_id);
            println!("{c:?} U+{:04X}: glyph {glyph_id}, width {width:.4}em", c as u32);
            if let Some(warning) = warning {
                eprintln!("warning: {warning}");
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Parser)]
struct Typeset {
    /// Path to the markup file.
    path: PathBuf,

    /// CJK font.
    #[arg(long)]
    cjk_font: String,

    /// Western font.
    #[arg(long)]
    western_font: String,

    /// Initial CJK font size, like 10.5pt, 5号, 14Q or 4mm.
    #[arg(short, long, default_value = "10.5pt")]
    size: Length,

    /// Output the horizontal lists as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Typeset {
    fn run(self) -> Result<(), String> {
        let source = read_source(&self.path)?;
        let (tokens, lex_warnings) = yl::lex(&source);
        print_lex_warnings(&self.path, &source, &lex_warnings)?;
        let options = TypesetterOptions {
            cjk_font: self.cjk_font,
            western_font: self.western_font,
            cjk_size: self.size,
        };
        let mut typesetter =
            Typesetter::new(PathResolver, options).map_err(|err| error_chain(&err))?;
        let paragraphs = typesetter.typeset(tokens);
        log::debug!(
            "typeset {} paragraphs using {} fonts",
            paragraphs.len(),
            typesetter.catalog().len()
        );
        for warning in typesetter.warnings() {
            eprintln!("warning: {warning}");
        }
        if self.json {
            let s = serde_json::to_string_pretty(&paragraphs).map_err(|err| err.to_string())?;
            println!("{s}");
            return Ok(());
        }
        for (i, paragraph) in paragraphs.iter().enumerate() {
            println!("# paragraph {}", i + 1);
            for node in paragraph {
                println!("{node}");
            }
        }
        Ok(())
    }
}
