use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "typeshape",
    version,
    about = "Compile Rust type declarations into JSON Schema definitions",
    long_about = "Indexes structs and enums from Rust source files and emits one schema \
                  definition per concrete type reachable from the given roots."
)]
pub struct Cli {
    /// Directory scanned recursively for `.rs` files
    #[arg(long, value_name = "DIR", required_unless_present = "file")]
    pub dir: Option<PathBuf>,

    /// Rust source file to index (repeatable)
    #[arg(long, value_name = "FILE")]
    pub file: Vec<PathBuf>,

    /// Root type in Rust syntax, e.g. `Page<User>` (repeatable)
    #[arg(long = "root", value_name = "TYPE", required = true)]
    pub roots: Vec<String>,

    /// TOML configuration with build options and overrides
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit an OpenAPI document instead of the bare definitions
    #[arg(long)]
    pub openapi: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_repeated_roots_and_files() {
        let cli = Cli::try_parse_from([
            "typeshape",
            "--file",
            "a.rs",
            "--file",
            "b.rs",
            "--root",
            "User",
            "--root",
            "Page<User>",
            "--openapi",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.file, vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
        assert_eq!(cli.roots, vec!["User", "Page<User>"]);
        assert!(cli.dir.is_none());
        assert!(cli.openapi);
        assert!(cli.verbose);
    }

    #[rstest]
    #[case::no_source(&["typeshape", "--root", "User"])]
    #[case::no_root(&["typeshape", "--dir", "src"])]
    #[case::unknown_flag(&["typeshape", "--dir", "src", "--root", "User", "--yaml"])]
    fn rejects_incomplete_invocations(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args.iter().copied()).is_err());
    }
}
