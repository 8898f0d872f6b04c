use log::info;
use rmips_assembler::assemble;
use rmips_simulator::console::StdConsole;
use rmips_simulator::Processor;
use std::error::Error;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Assemble a source file into a program image, or run it in one step
#[derive(StructOpt)]
struct CliArgs {
    /// Assemble and execute immediately, writing no image
    #[structopt(long)]
    run: bool,

    /// Where to write the assembled image
    #[structopt(short, long, default_value = "a.mips", parse(from_os_str))]
    output: PathBuf,

    /// The assembly source file
    #[structopt(parse(from_os_str))]
    file_path: PathBuf,
}

fn main() {
    env_logger::init();
    let args = CliArgs::from_args();

    if let Err(error) = run(&args) {
        io::stdout().flush().ok();
        eprintln!("rmips: error: {}", error);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(&args.file_path)?;
    let program = assemble(&source)?;
    info!(
        "Assembled {} instructions, {} data bytes",
        program.instructions.len(),
        program.data.len()
    );

    if args.run {
        let mut processor = Processor::new(program, StdConsole::new());
        processor.run()?;
        process::exit(processor.return_code);
    }

    let mut output = File::create(&args.output)?;
    program.write(&mut output)?;
    Ok(())
}
