//! Marktree - a streaming CommonMark/GFM document engine.
//!
//! This binary provides the CLI interface to the marktree crates: it
//! streams input from files or stdin through a parse session and renders
//! the resulting document as HTML or CommonMark.

mod cli;
mod config;

use clap::Parser as ClapParser;
use cli::Cli;
use config::Config;
use log::{debug, error, info, LevelFilter};
use marktree_core::{ParseOptions, RenderOptions, Result};
use marktree_parser::{ReadSource, Session};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

fn main() {
    let cli = <Cli as ClapParser>::parse();

    setup_logging(&cli.log_level);
    info!("Marktree v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Set up logging based on the log level argument.
fn setup_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Main application logic.
fn run(cli: &Cli) -> Result<()> {
    let (parse_options, render_options) = load_options(cli)?;
    debug!(
        "options: parse={:?} render={:?} dialect={:?} width={:?}",
        parse_options,
        render_options,
        cli.dialect(),
        cli.render_width()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.should_read_stdin() {
        let stdin = io::stdin();
        let mut source = ReadSource::new(stdin.lock());
        process(cli, parse_options, &render_options, &mut source, &mut out)?;
    } else {
        for path in &cli.files {
            debug!("processing {}", path.display());
            let file = File::open(path)?;
            let mut source = ReadSource::new(BufReader::new(file));
            process(cli, parse_options, &render_options, &mut source, &mut out)?;
        }
    }
    Ok(())
}

/// Stream one input through a parse session and render it.
fn process<S: marktree_parser::ChunkSource, W: Write>(
    cli: &Cli,
    parse_options: ParseOptions,
    render_options: &RenderOptions,
    source: &mut S,
    out: &mut W,
) -> Result<()> {
    let mut session = Session::new(parse_options);
    session.read_from(source)?;
    let tree = session.finish()?;
    debug!("document has {} nodes", tree.len());
    let rendered = marktree_render::render(&tree, cli.dialect(), render_options, cli.render_width())?;
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Resolve options: config file or inline TOML first, CLI flags on top.
fn load_options(cli: &Cli) -> Result<(ParseOptions, RenderOptions)> {
    let mut config = Config::default();
    if let Some(ref config_arg) = cli.config {
        if Path::new(config_arg).exists() {
            config = Config::load_from(Path::new(config_arg))?;
            debug!("loaded config from file: {}", config_arg);
        } else {
            match Config::parse_inline(config_arg) {
                Ok(inline) => {
                    config = inline;
                    debug!("loaded inline config");
                }
                Err(e) => {
                    error!("failed to parse config: {}", e);
                }
            }
        }
    }
    let mut parse = config.parse;
    let mut render = config.render;
    cli.apply(&mut parse, &mut render);
    Ok((parse, render))
}
