use clap::Parser;
use color_eyre::eyre::{bail, eyre};

use fastcex::expr::ExprManager;
use fastcex::reference::ExprRef;
use fastcex::solver::{FastCexSolver, IncompleteSolver, Query};
use fastcex::types::INT8;

/// One comparison `x[index] <op> value`.
#[derive(Debug, Clone)]
struct Constraint {
    op: String,
    index: u64,
    value: u8,
}

fn parse_constraint(s: &str) -> Result<Constraint, String> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let [op, index, value] = parts[..] else {
        return Err(format!("expected \"<op> <index> <value>\", got {:?}", s));
    };
    if !["eq", "ne", "ult", "ule", "ugt", "uge"].contains(&op) {
        return Err(format!("unknown operator {:?}", op));
    }
    Ok(Constraint {
        op: op.to_string(),
        index: index.parse().map_err(|e| format!("bad index {:?}: {}", index, e))?,
        value: value.parse().map_err(|e| format!("bad value {:?}: {}", value, e))?,
    })
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Size of the symbolic object (in bytes).
    #[clap(long, value_name = "INT", default_value = "1")]
    size: u64,

    /// Constraint on one byte, e.g. "ult 0 10".
    #[clap(short = 'c', long = "constraint", value_name = "OP INDEX VALUE", value_parser = parse_constraint)]
    constraints: Vec<Constraint>,

    /// Log level.
    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);

    let time_total = std::time::Instant::now();

    let em = ExprManager::default();
    let x = em.mk_array("x", args.size);

    let mut constraints: Vec<ExprRef> = vec![];
    for c in args.constraints.iter() {
        if c.index >= args.size {
            return Err(eyre!("byte {} is out of an object of {} bytes", c.index, args.size));
        }
        let byte = em.mk_read_byte(x, c.index);
        let value = em.mk_constant(c.value as u64, INT8);
        let e = match c.op.as_str() {
            "eq" => em.mk_eq(byte, value),
            "ne" => em.mk_ne(byte, value),
            "ult" => em.mk_ult(byte, value),
            "ule" => em.mk_ule(byte, value),
            "ugt" => em.mk_ugt(byte, value),
            "uge" => em.mk_uge(byte, value),
            op => bail!("unknown operator {:?}", op),
        };
        println!("constraint: {}", em.display(e));
        constraints.push(e);
    }

    let solver = FastCexSolver::new(&em);
    let query = Query::with_false(&em, constraints);
    match solver.compute_initial_values(&query, &[x]) {
        Some(values) => println!("x = {:?}", values[0]),
        None => println!("abstain"),
    }

    println!("em = {:?}", em);
    println!("\nAll done in {:.2} s", time_total.elapsed().as_secs_f64());

    Ok(())
}
