use clap::{CommandFactory, Parser};

use lith::env::Env;
use lith::interp::Interp;
use lith::repl;
use lith::value::{Value, list_with_tail};

/// The prelude loaded into the global frame before any user code runs.
const PRELUDE: &str = "lib.lith";

/// A small lisp-like language interpreter.
#[derive(Parser)]
#[command(name = "lith")]
#[command(version, disable_version_flag = true)]
#[command(about = "lith: a small lisp-like language interpreter")]
struct Cli {
    /// Print version information.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version, value_parser = clap::value_parser!(bool))]
    version: Option<bool>,

    /// Run an interactive prompt.
    #[arg(short, long, conflicts_with_all = ["evaluate", "file_args"])]
    interactive: bool,

    /// Evaluate each expression string in order; stop at the first error.
    #[arg(
        short = 'e',
        long = "evaluate",
        value_name = "EXPR",
        num_args = 1..,
        conflicts_with = "file_args"
    )]
    evaluate: Option<Vec<String>>,

    /// Script to run; anything after it is exposed to the script as the
    /// list `arguments`.
    #[arg(value_name = "FILE [ARGS]")]
    file_args: Vec<String>,
}

fn main() {
    env_logger::init();
    std::process::exit(run());
}

fn run() -> i32 {
    if std::env::args().len() < 2 {
        let _ = Cli::command().print_help();
        return 2;
    }
    let cli = Cli::parse();

    let mut interp = Interp::new();
    let global = interp.global.clone();
    if let Err(e) = interp.run_file(&global, PRELUDE) {
        interp.report(&e);
        return 1;
    }
    // User code runs below the prelude's frame; redefining a prelude
    // name shadows it.
    let session = Env::child(&interp.global);

    if cli.interactive {
        repl::run(&mut interp, &session);
        return 0;
    }

    if let Some(exprs) = &cli.evaluate {
        interp.filename = "<<string>>".to_string();
        for expr in exprs {
            let env = Env::child(&session);
            if let Err(e) = interp.run_string(&env, expr, true) {
                interp.report(&e);
                return 1;
            }
        }
        return 0;
    }

    if let Some((file, rest)) = cli.file_args.split_first() {
        let env = Env::child(&session);
        let arguments = list_with_tail(
            rest.iter().map(|arg| Value::string(arg.clone().into_bytes())),
            Value::nil(),
        );
        let sym = interp.intern("arguments");
        env.borrow_mut().define(sym, arguments);
        if let Err(e) = interp.run_file(&env, file) {
            interp.report(&e);
            return 1;
        }
        return 0;
    }

    let _ = Cli::command().print_help();
    2
}
