//! The compiler driver: takes a source file and prints one of a few
//! intermediate artifacts (tokens, the symbol table, the three-address
//! program, or the semantic-error stream).
//!
//! run with `--help` for more info.

use cflat_codegen::front::{self, lex::Lexer};

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input source file
    file: String,
    /// which artifact to print
    #[arg(value_enum, short, long, default_value_t = Emit::Tac)]
    emit: Emit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
enum Emit {
    /// the token stream
    Tokens,
    /// the symbol table, as it stands after the whole program has been walked
    Symbols,
    /// the three-address program buffer
    Tac,
    /// the semantic-error stream
    Errors,
}

fn main() {
    let args = Args::parse();

    let input = String::from_utf8(std::fs::read(&args.file).expect("file should be readable"))
        .expect("input characters should be utf8");

    match args.emit {
        Emit::Tokens => {
            let mut lexer = Lexer::new(&input);
            while let Some(token) = lexer.next() {
                println!("{token}");
            }
        }
        Emit::Symbols => {
            let codegen = front::parse(&input).expect("source should parse");
            for symbol in codegen.symtab().get_scope_symbols(0) {
                println!("{symbol:?}");
            }
        }
        Emit::Tac => {
            let codegen = front::parse(&input).expect("source should parse");
            print!("{}", codegen.outcome().program);
        }
        Emit::Errors => {
            let codegen = front::parse(&input).expect("source should parse");
            println!("{}", codegen.outcome().errors);
        }
    }
}
