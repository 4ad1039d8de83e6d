use clap::Parser;
use std::path::PathBuf;

/// Compiles lambda calculus terms into braided track diagrams
#[derive(Parser)]
#[clap(author, version, about)]
enum Cli {
    /// Linearize a term, printing its timeline to stdout
    Timeline {
        /// Path to the term to linearize
        #[clap(long = "term", name = "TERM_FILE", display_order = 0)]
        term_file: PathOrStdin,
        /// Declare a free variable the term may reference
        #[clap(long = "input", name = "NAME")]
        inputs: Vec<String>,
    },
    /// Enumerate layouts for a term, printing the cheapest one
    Plan {
        /// Path to the term to plan
        #[clap(long = "term", name = "TERM_FILE", display_order = 0)]
        term_file: PathOrStdin,
        /// Declare a free variable the term may reference
        #[clap(long = "input", name = "NAME")]
        inputs: Vec<String>,
    },
    /// Print the first candidate layouts with their costs
    Candidates {
        /// Path to the term to plan
        #[clap(long = "term", name = "TERM_FILE", display_order = 0)]
        term_file: PathOrStdin,
        /// Declare a free variable the term may reference
        #[clap(long = "input", name = "NAME")]
        inputs: Vec<String>,
        /// How many candidates to print
        #[clap(long = "limit", name = "N", default_value = "8")]
        limit: usize,
    },
}

#[derive(Clone, Debug)]
enum PathOrStdin {
    StdIn,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(src: &str) -> Result<PathOrStdin, std::convert::Infallible> {
        match src {
            "-" => Ok(PathOrStdin::StdIn),
            _ => Ok(PathOrStdin::Path(PathBuf::from(src))),
        }
    }
}

fn load_file_or_exit(driver: &mut plait::Driver, file: PathOrStdin) -> plait::files::FileId {
    let file_id = match file {
        PathOrStdin::StdIn => driver.load_source("<stdin>".to_owned(), std::io::stdin()),
        PathOrStdin::Path(path) => driver.load_source_path(&path),
    };
    file_id.unwrap_or_else(|| std::process::exit(plait::Status::Error.exit_code()))
}

const MAX_PRETTY_WIDTH: usize = 80;

fn get_pretty_width() -> usize {
    let term_width = termsize::get().map_or(usize::MAX, |size| usize::from(size.cols));
    std::cmp::min(term_width, MAX_PRETTY_WIDTH)
}

fn make_driver(inputs: &[String]) -> plait::Driver {
    let mut driver = plait::Driver::new();
    driver.set_emit_width(get_pretty_width());
    for input in inputs {
        driver.declare_input(input);
    }
    driver
}

fn main() -> ! {
    match Cli::parse() {
        Cli::Timeline { term_file, inputs } => {
            let mut driver = make_driver(&inputs);
            let file_id = load_file_or_exit(&mut driver, term_file);
            let status = driver.timeline_and_emit_term(file_id);

            std::process::exit(status.exit_code());
        }
        Cli::Plan { term_file, inputs } => {
            let mut driver = make_driver(&inputs);
            let file_id = load_file_or_exit(&mut driver, term_file);
            let status = driver.plan_and_emit_term(file_id);

            std::process::exit(status.exit_code());
        }
        Cli::Candidates {
            term_file,
            inputs,
            limit,
        } => {
            let mut driver = make_driver(&inputs);
            let file_id = load_file_or_exit(&mut driver, term_file);
            let status = driver.candidates_and_emit_term(file_id, limit);

            std::process::exit(status.exit_code());
        }
    }
}
