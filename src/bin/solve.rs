use std::io::{self, BufWriter, Read, Write};

use permseq::commands::{run, Program};
use permseq::TreapSeq;

fn main() {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read input: {e}");
        std::process::exit(1);
    }
    let program = match Program::parse(&input) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("bad command stream: {e}");
            std::process::exit(1);
        }
    };
    let output = match run::<TreapSeq>(&program) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("bad command stream: {e}");
            std::process::exit(1);
        }
    };
    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());
    if let Err(e) = output.write_to(&mut w).and_then(|()| w.flush()) {
        eprintln!("failed to write output: {e}");
        std::process::exit(1);
    }
}
