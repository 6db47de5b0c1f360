use anyhow::Context;
use ecoji::{Alphabet, Encoding};
use std::fs;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

fn load_alphabet(path: &Path) -> anyhow::Result<Alphabet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("unable to read alphabet file {}", path.display()))?;
    let alphabet = text
        .parse::<Alphabet>()
        .with_context(|| format!("invalid alphabet file {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded alphabet");

    Ok(alphabet)
}

fn open_input(args: &clap::ArgMatches) -> anyhow::Result<Box<dyn Read>> {
    if let Some(path) = args.get_one::<PathBuf>("file") {
        let file = fs::File::open(path)
            .with_context(|| format!("unable to open input file {}", path.display()))?;
        return Ok(Box::new(BufReader::new(file)));
    }

    match args.get_one::<String>("input") {
        Some(input) if input != "-" => Ok(Box::new(Cursor::new(input.clone().into_bytes()))),
        _ => Ok(Box::new(BufReader::new(std::io::stdin()))),
    }
}

/// Inserts a newline every `width` symbols.
fn wrap(encoded: &str, width: usize) -> String {
    let mut output = String::with_capacity(encoded.len() + encoded.len() / width);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % width == 0 {
            output.push('\n');
        }
        output.push(c);
    }
    output
}

fn run(args: &clap::ArgMatches) -> anyhow::Result<()> {
    let alphabet_path = args
        .get_one::<PathBuf>("alphabet")
        .context("no alphabet file given")?;
    let alphabet = load_alphabet(alphabet_path)?;

    let lenient = args.get_one::<bool>("lenient").copied().unwrap_or_default();
    let encoding = Encoding::builder(alphabet).strict(!lenient).build();

    let should_decode = args.get_one::<bool>("decode").copied().unwrap_or(false);
    let width = args.get_one::<usize>("wrap").copied().unwrap_or_default();

    let mut reader = open_input(args)?;
    let mut writer = BufWriter::new(std::io::stdout());

    if should_decode {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;
        let input = String::from_utf8(input).context("input is not valid UTF-8")?;

        let decoded = encoding
            .decode_chars(input.chars().filter(|c| !c.is_ascii_whitespace()))
            .map_err(Into::<anyhow::Error>::into)
            .context("unable to decode input")?;

        tracing::info!(symbols = input.chars().count(), bytes = decoded.len(), "decoded");
        writer.write_all(&decoded)?;
    } else if width > 0 {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;

        let encoded = encoding.encode(&input);
        tracing::info!(bytes = input.len(), "encoded");

        writer.write_all(wrap(&encoded, width).as_bytes())?;
        writer.write_all(b"\n")?;
    } else {
        let symbols = encoding
            .encode_stream(&mut reader, &mut writer)
            .context("unable to encode input")?;
        tracing::info!(symbols, "encoded");

        writer.write_all(b"\n")?;
    }

    writer.flush()?;

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let root_command = clap::Command::new("ecoji")
        .version(clap::crate_version!())
        .about("Encode or decode data as emoji (base-1024)")
        .arg(
            clap::Arg::new("input")
                .help("The input text to encode or decode, - for stdin")
                .action(clap::ArgAction::Set)
                .default_value("-")
                .value_name("INPUT"),
        )
        .arg(
            clap::Arg::new("file")
                .help("Read the input from a file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .conflicts_with("input"),
        )
        .arg(
            clap::Arg::new("alphabet")
                .help("Emoji list to use, one hexadecimal codepoint per line")
                .short('a')
                .long("alphabet")
                .env("ECOJI_ALPHABET")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            clap::Arg::new("decode")
                .help("Decode the input instead of encoding")
                .short('d')
                .long("decode")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("lenient")
                .help("When decoding, ignore non-zero bits in the last group")
                .long("lenient")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("wrap")
                .help("Wrap encoded output after this many symbols, 0 to disable")
                .short('w')
                .long("wrap")
                .value_name("COLS")
                .value_parser(clap::value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            clap::Arg::new("verbose")
                .help("Log more, can be repeated")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count),
        );

    let matches = root_command.get_matches();

    init_tracing(matches.get_count("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("unable to run, got err {:#}", err);
        std::process::exit(1);
    }

    Ok(())
}
