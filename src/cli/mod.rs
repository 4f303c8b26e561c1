//! Command line interface

use crate::analysis::Analysis;
use crate::asm::Disassembly;
use crate::memory::Rom;
use crate::project::Project;
use clap::{crate_version, App, Arg};
use std::io;
use std::io::Write;

/// Parse arguments, analyze the given image and print the listing.
pub fn main() -> io::Result<()> {
    let matches = App::new("sfcflow")
        .version(crate_version!())
        .about("Static tracing disassembler for SNES/65C816 program images")
        .arg(
            Arg::with_name("image")
                .value_name("rom")
                .required(true)
                .help("The program image file to analyze"),
        )
        .arg(
            Arg::with_name("project")
                .long("project")
                .value_name("sfcflow.json")
                .takes_value(true)
                .help("Project file holding user annotations"),
        )
        .get_matches();

    let image = matches.value_of("image").expect("image argument is required");
    let rom = Rom::from_file(image)?;

    let mut analysis = Analysis::new(rom);

    if let Some(project_path) = matches.value_of("project") {
        match Project::read(project_path) {
            Ok(project) => project.apply(&mut analysis),
            Err(e) => eprintln!("Cannot open project file, got error {}", e),
        }
    }

    analysis.run();

    let stdout = io::stdout();
    let mut handle = io::BufWriter::new(stdout.lock());
    Disassembly::new(&analysis).write(&mut handle)?;
    handle.flush()
}
