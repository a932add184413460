use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::exit;

use bf_vm::disasm;
use bf_vm::io::Terminal;
use bf_vm::{compile, Vm, VmConfig};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bf-vm")]
#[command(about = "Compile and run a Brainfuck program")]
struct Cli {
    /// Source file to run
    file: Option<PathBuf>,

    /// On interrupt, print the final VM state instead of aborting
    #[arg(short, long)]
    debug: bool,

    /// Print the compiled program instead of running it
    #[arg(long)]
    disasm: bool,

    /// Number of tape cells
    #[arg(long, default_value_t = bf_vm::vm::DEFAULT_TAPE_LEN)]
    tape_len: usize,

    /// Cell values wrap modulo this
    #[arg(long, default_value_t = bf_vm::vm::DEFAULT_CELL_SIZE)]
    cell_size: u32,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bf_vm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let path = match cli.file {
        Some(ref path) => path,
        None => return,
    };

    let code = match fs::read_to_string(path) {
        Ok(code) => code,
        Err(e) => {
            error!("cannot read {}: {}", path.display(), e);
            exit(1);
        }
    };

    let program = match compile(&code) {
        Ok(program) => program,
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    };

    if cli.disasm {
        print!("{}", disasm::disassemble_all(&program));
        return;
    }

    let config = VmConfig {
        tape_len: cli.tape_len,
        cell_size: cli.cell_size,
    };
    let mut vm = match Vm::new(config) {
        Ok(vm) => vm,
        Err(e) => {
            error!("{}", e);
            exit(2);
        }
    };

    let result = vm.run(&program, &mut Terminal::new(), &mut io::stdout());
    let err = match result {
        Ok(()) => return,
        Err(err) => err,
    };

    if err.is_interrupt() {
        if !cli.debug {
            error!("{}", err);
            exit(130);
        }
        info!("{}", err);
        println!();
        print!("{}", disasm::dump_state(&vm, &program));
        return;
    }

    error!("{}", err);
    if cli.debug {
        println!();
        print!("{}", disasm::dump_state(&vm, &program));
    }
    exit(1);
}
