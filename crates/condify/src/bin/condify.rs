use std::process::ExitCode;

use condify::main as condify_main;

fn main() -> ExitCode {
    condify_main(std::env::args_os())
}
