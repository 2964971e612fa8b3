use bimatch::error::Result;
use bimatch::matcher::BipartiteMatcher;
use std::env;

const DEFAULT_INPUT: &str = "program3data.txt";

fn run(path: &str) -> Result<()> {
    let matcher = BipartiteMatcher::from_file(path)?;
    let solution = matcher.solve()?;
    println!("{solution}");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_INPUT.to_string());
    if let Err(err) = run(&path) {
        eprintln!("ERROR: {err}");
        eprintln!("Program failed");
    }
}
