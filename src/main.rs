use anyhow::Context;
use clap::Parser;

use rzsynth::{epsilon_from_digits, synthesize, Ast, Real};

/// Approximate a z-rotation by a Clifford+T gate sequence.
#[derive(Parser)]
#[command(name = "rzsynth", version, about)]
struct Args {
    /// Z-rotation angle: an expression over digits, `pi`, `+ - * /` and
    /// parentheses, e.g. `1.5*pi`, `-pi/128`, `0.56`.
    theta: String,

    /// Precision in decimal digits (epsilon = 10^-digits).
    #[arg(short, long, default_value_t = 10)]
    digits: u32,
}

fn parse_theta(s: &str) -> anyhow::Result<Real> {
    let ast = Ast::parse(s).with_context(|| {
        format!("failed to parse z-rotation angle `{s}` (examples: 1.5*pi, -pi/128, 0.56)")
    })?;
    Ok(ast.value())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let theta = parse_theta(&args.theta)?;
    let epsilon = epsilon_from_digits(args.digits);
    let gate = synthesize(&theta, &epsilon);
    println!("{gate}");
    Ok(())
}
