extern crate basil_asm;
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

use clap::{Arg, ArgMatches, App, ErrorKind};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use basil_asm::assembler::error::AssemblyError;
use basil_asm::assembler::lexer::SourceLines;
use basil_asm::assembler::packer::PackedBytes;
use basil_asm::assembler::parser::{Parser, Statement};

/// What one invocation was asked to do.
#[derive(Debug, PartialEq, Eq)]
struct Job {
    input: PathBuf,
    output: PathBuf,
    listing: bool,
}

fn main() {
    let args = match process_arguments(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    initialize_logging(args.occurrences_of("verbose"));

    let job = match job_from(&args) {
        Ok(job) => job,
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    debug!("Arguments:\n\tVerbosity: {}\n\tListing: {}\n\tOutfile: {}\n\tInfile: {}",
        verbosity(args.occurrences_of("verbose")),
        job.listing,
        job.output.display(),
        job.input.display()
    );

    if let Err(err) = run(&job) {
        match err {
            AssemblyError::InvalidExpression { .. } => {
                error!("fatal: {}: {}", job.input.display(), err)
            }
            _ => error!("fatal: {}", err),
        }
        std::process::exit(1);
    }
}

fn run(job: &Job) -> Result<(), AssemblyError> {
    let source = File::open(&job.input).map_err(|source| AssemblyError::File {
        path: job.input.clone(),
        source,
    })?;

    let mut count: usize = 0;
    let mut listing: Vec<Statement> = Vec::new();
    let object = {
        let statements = Parser::new(SourceLines::new(BufReader::new(source)))
            .inspect(|stmt| {
                if let Ok(stmt) = stmt {
                    count += 1;
                    if job.listing {
                        listing.push(*stmt);
                    }
                }
            })
            .map(|stmt| stmt.map(|s| s.instruction));
        PackedBytes::new(statements)
            .collect::<Result<Vec<u8>, AssemblyError>>()
            .map_err(|err| err.at_path(&job.input))?
    };

    info!("Assembled {} instruction(s) into {} byte(s).", count, object.len());

    if job.listing {
        print_listing(&listing);
    }

    write_object(&job.output, &object)
}

/// Writes the finished object. A partially written file is removed
/// so a failed run never leaves a truncated object behind.
fn write_object(path: &Path, object: &[u8]) -> Result<(), AssemblyError> {
    let mut file = File::create(path).map_err(|source| AssemblyError::File {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(source) = file.write_all(object).and_then(|_| file.flush()) {
        drop(file);
        if let Err(err) = fs::remove_file(path) {
            warn!("unable to remove partial output file `{}`: {}", path.display(), err);
        }
        return Err(AssemblyError::File { path: path.to_path_buf(), source });
    }

    info!("Wrote `{}`.", path.display());
    Ok(())
}

/// Replaces a trailing `.asm` with `.o`, or appends `.o` otherwise.
fn derive_output_path(input: &Path) -> PathBuf {
    if let Some(stem) = input.to_str().and_then(|s| s.strip_suffix(".asm")) {
        return PathBuf::from(format!("{}.o", stem));
    }
    let mut name = input.as_os_str().to_os_string();
    name.push(".o");
    PathBuf::from(name)
}

fn job_from(args: &ArgMatches) -> Result<Job, AssemblyError> {
    let input = args
        .value_of_os("INPUT")
        .map(PathBuf::from)
        .ok_or_else(|| AssemblyError::Usage("no SOURCE file given".to_owned()))?;
    if input.as_os_str().is_empty() {
        return Err(AssemblyError::Usage("SOURCE may not be empty".to_owned()));
    }

    let output = match args.value_of_os("output") {
        Some(filename) => PathBuf::from(filename),
        None => derive_output_path(&input),
    };

    Ok(Job { input, output, listing: args.is_present("listing") })
}

fn print_listing(statements: &[Statement]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for stmt in statements {
        let nibbles: Vec<String> = stmt.instruction
            .nibbles()
            .iter()
            .map(|n| format!("{:X}", n))
            .collect();
        grid.add(Cell::from(format!("{:04}:", stmt.line)));
        grid.add(Cell::from(format!("{}", stmt.instruction)));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(nibbles.join(" ")));
    }

    println!("{}", grid.fit_into_columns(4));
}

fn process_arguments<I, T>(itr: I) -> Result<ArgMatches<'static>, AssemblyError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = App::new("assemble")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the BASIL source file to assemble")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .value_name("OBJECT")
            .help("write output to OBJECT instead of SOURCE with a .o extension"))
        .arg(Arg::with_name("listing")
            .short("d")
            .long("listing")
            .takes_value(false)
            .help("prints an assembly listing alongside the assembly to STDOUT"))
        .get_matches_from_safe(itr);

    match matches {
        Ok(matches) => Ok(matches),
        Err(err) => match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
            _ => Err(AssemblyError::Usage(err.message)),
        },
    }
}

fn verbosity(occurrences: u64) -> log::LevelFilter {
    match occurrences {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn initialize_logging(occurrences: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity(occurrences))
        .chain(std::io::stderr())
        .apply().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(args: &[&str]) -> Result<Job, AssemblyError> {
        let matches = process_arguments(std::iter::once("assemble").chain(args.iter().cloned()))?;
        job_from(&matches)
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(derive_output_path(Path::new("prog.asm")), PathBuf::from("prog.o"));
        assert_eq!(derive_output_path(Path::new("dir/prog.asm")), PathBuf::from("dir/prog.o"));
        assert_eq!(derive_output_path(Path::new("prog")), PathBuf::from("prog.o"));
        assert_eq!(derive_output_path(Path::new("prog.s")), PathBuf::from("prog.s.o"));
        assert_eq!(derive_output_path(Path::new("prog.ASM")), PathBuf::from("prog.ASM.o"));
        assert_eq!(derive_output_path(Path::new("prog.asm.txt")), PathBuf::from("prog.asm.txt.o"));
    }

    #[test]
    fn test_job_from_arguments() {
        assert_eq!(job(&["prog.asm"]).unwrap(), Job {
            input: PathBuf::from("prog.asm"),
            output: PathBuf::from("prog.o"),
            listing: false,
        });
        assert_eq!(job(&["prog.asm", "-o", "out.bin"]).unwrap(), Job {
            input: PathBuf::from("prog.asm"),
            output: PathBuf::from("out.bin"),
            listing: false,
        });
        assert_eq!(job(&["-o", "out.bin", "prog.asm", "-d"]).unwrap(), Job {
            input: PathBuf::from("prog.asm"),
            output: PathBuf::from("out.bin"),
            listing: true,
        });
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(job(&[]), Err(AssemblyError::Usage(_))));
        assert!(matches!(job(&["a.asm", "b.asm"]), Err(AssemblyError::Usage(_))));
        assert!(matches!(job(&["a.asm", "-o"]), Err(AssemblyError::Usage(_))));
        assert!(matches!(job(&[""]), Err(AssemblyError::Usage(_))));
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(verbosity(0), log::LevelFilter::Error);
        assert_eq!(verbosity(2), log::LevelFilter::Info);
        assert_eq!(verbosity(9), log::LevelFilter::Trace);
    }
}
