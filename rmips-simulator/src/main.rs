use log::info;
use rmips_simulator::console::StdConsole;
use rmips_simulator::Processor;
use rmips_types::program::Program;
use std::error::Error;
use std::fs;
use std::io;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Execute an assembled program image
#[derive(StructOpt)]
struct CliArgs {
    /// The program image to run
    #[structopt(parse(from_os_str))]
    file_path: PathBuf,
}

fn main() {
    env_logger::init();
    let args = CliArgs::from_args();

    if let Err(error) = run(&args) {
        // Anything the program printed before the fault should come out first
        io::stdout().flush().ok();
        eprintln!("rmips: error: {}", error);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn Error>> {
    let file_data = fs::read(&args.file_path)?;
    let program = Program::parse(&mut Cursor::new(file_data))?;
    info!(
        "Loaded image: {} instructions, {} data bytes",
        program.instructions.len(),
        program.data.len()
    );

    let mut processor = Processor::new(program, StdConsole::new());
    processor.run()?;
    process::exit(processor.return_code);
}
