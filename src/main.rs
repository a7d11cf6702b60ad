use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use clap::{builder::BoolishValueParser, Parser, Subcommand};
use colored::Colorize;
use hotwatch::notify::Event;
use hotwatch::{
    blocking::{Flow, Hotwatch},
    EventKind,
};
use miette::{bail, IntoDiagnostic, Result};

use hasm::{Assembly, Source, SymbolKind};

/// hasm translates Hack assembly into Hack machine code.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to assemble next to its source
    path: Option<PathBuf>,

    /// Hide status lines; diagnostics are still printed
    #[arg(short, long, global = true, env = "HASM_QUIET", value_parser = BoolishValueParser::new())]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a `.asm` file into a `.hack` file
    Compile {
        /// `.asm` file to assemble
        name: PathBuf,
        /// Destination for the `.hack` file
        dest: Option<PathBuf>,
    },
    /// Check a `.asm` file without writing any output
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print the labels and variables of a `.asm` file with their addresses
    Symbols {
        /// File to inspect
        name: PathBuf,
    },
    /// Place a watch on a `.asm` file to receive constant assembler updates
    Watch {
        /// `.asm` file to watch
        name: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    let status = Status { quiet: args.quiet };

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(hasm::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    let command = match (args.command, args.path) {
        (Some(command), _) => command,
        (None, Some(name)) => Command::Compile { name, dest: None },
        (None, None) => {
            println!("\n~ hasm v{VERSION} ~");
            println!("{SHORT_INFO}");
            std::process::exit(0);
        }
    };

    match command {
        Command::Compile { name, dest } => {
            status.file(Green, "Assembling", &name);
            let asm = assemble(&name)?;

            let out_file_name = dest.unwrap_or_else(|| name.with_extension("hack"));
            let mut out = String::with_capacity(asm.words.len() * 17);
            for word in &asm.words {
                out.push_str(&word.to_string());
                out.push('\n');
            }
            // Only written once every instruction has been encoded
            fs::write(&out_file_name, out).into_diagnostic()?;

            let summary = format!("{} words", asm.words.len());
            status.message(Green, "Finished", summary.as_str());
            status.file(Green, "Saved", &out_file_name);
            Ok(())
        }
        Command::Check { name } => {
            status.file(Green, "Checking", &name);
            let _ = assemble(&name)?;
            status.message(Green, "Success", "no errors found!");
            Ok(())
        }
        Command::Symbols { name } => {
            status.file(Green, "Assembling", &name);
            let asm = assemble(&name)?;
            for (sym, entry) in asm.symbols.user_defined() {
                let kind = match entry.kind {
                    SymbolKind::Label => "label".green(),
                    SymbolKind::Variable => "variable".cyan(),
                    SymbolKind::Register | SymbolKind::Pointer | SymbolKind::Io => continue,
                };
                println!("{:>5} {kind:<8} {sym}", entry.addr);
            }
            Ok(())
        }
        Command::Watch { name } => {
            if !name.exists() {
                bail!("File does not exist. Exiting...")
            }
            // Vim breaks if watching a single file
            let folder_path = match name.parent() {
                Some(pth) if pth.is_dir() => pth.to_path_buf(),
                _ => Path::new(".").to_path_buf(),
            };

            // Clear screen and move cursor to top left
            print!("\x1B[2J\x1B[2;1H");
            status.file(Green, "Watching", &name);
            status.message(Cyan, "Help", "press CTRL+C to exit");

            let mut watcher =
                Hotwatch::new_with_custom_delay(Duration::from_millis(500)).into_diagnostic()?;

            watcher
                .watch(folder_path, move |event: Event| match event.kind {
                    // Watch remove for vim changes
                    EventKind::Modify(_) | EventKind::Remove(_) => {
                        print!("\x1B[2J\x1B[2;1H");
                        status.file(Green, "Watching", &name);
                        status.message(Green, "Re-checking", "file change detected");
                        status.message(Cyan, "Help", "press CTRL+C to exit");

                        // Give the editor time to finish writing
                        sleep(Duration::from_millis(50));

                        match assemble(&name) {
                            Ok(_) => status.message(Green, "Success", "no errors found!"),
                            Err(e) => {
                                status.message(Red, "Failed", "see diagnostic below");
                                println!("\n{:?}", e);
                            }
                        }
                        Flow::Continue
                    }
                    _ => Flow::Continue,
                })
                .into_diagnostic()?;
            watcher.run();
            Ok(())
        }
    }
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

/// Prints right-aligned status lines unless running quietly
#[derive(Clone, Copy)]
struct Status {
    quiet: bool,
}

impl Status {
    fn file(&self, color: MsgColor, left: &str, right: &Path) {
        let right = format!("target {}", right.display());
        self.message(color, left, right.as_str());
    }

    fn message<S>(&self, color: MsgColor, left: S, right: S)
    where
        S: Colorize + std::fmt::Display,
    {
        if self.quiet {
            return;
        }
        let left = match color {
            MsgColor::Green => left.green(),
            MsgColor::Cyan => left.cyan(),
            MsgColor::Red => left.red(),
        };
        println!("{left:>12} {right}");
    }
}

/// Read and assemble a `.asm` file, with a fresh symbol table for every call
fn assemble(name: &Path) -> Result<Assembly> {
    match name.extension().and_then(|ext| ext.to_str()) {
        Some("asm") => {}
        Some(_) => bail!("File has unknown extension, expected `.asm`. Exiting..."),
        None => bail!("File has no extension, expected `.asm`. Exiting..."),
    }
    let contents = fs::read_to_string(name).into_diagnostic()?;
    let src = Source::new(name.display().to_string(), contents);
    hasm::assemble_full(&src)
}

const SHORT_INFO: &str = r"
Welcome to hasm, an assembler for the Hack 16-bit instruction set.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
