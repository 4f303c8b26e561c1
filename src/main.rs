mod analysis;
mod arch;
mod asm;
mod cli;
mod maths;
mod memory;
mod project;

use std::io;

fn main() -> io::Result<()> {
    cli::main()
}
