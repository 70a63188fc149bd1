use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ll1_core::{
    drive, parse_token_stream, Analysis, Grammar, Ll1Table, Resolver, SymbolTable, Token,
    TreeParser,
};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// LL(1) front-end toolchain.
#[derive(Parser)]
#[command(name = "ll1", version, about = "LL(1) front-end toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the LL(1) decision table and print it as CSV
    Table {
        /// Path to the grammar file (one `LHS -> RHS` production per line)
        grammar: PathBuf,
        /// Write the non-terminal set (one name per line) to this file
        #[arg(long)]
        nonterminals_out: Option<PathBuf>,
        /// Also run conflict detection; exits 1 when a cell was claimed
        /// by more than one production
        #[arg(long)]
        check: bool,
    },

    /// Run the table-driven parser and print the step-by-step trace
    Trace {
        /// Path to the grammar file
        grammar: PathBuf,
        /// Path to the token stream file (`TYPE:value` items)
        tokens: PathBuf,
    },

    /// Build a concrete syntax tree with the backtracking parser
    Tree {
        /// Path to the grammar file
        grammar: PathBuf,
        /// Path to the token stream file
        tokens: PathBuf,
        /// Path to the declared non-terminal set (one name per line);
        /// defaults to the grammar's own non-terminals
        #[arg(long)]
        nonterminals: Option<PathBuf>,
        /// Require the parse to consume the whole token stream
        #[arg(long)]
        strict: bool,
    },

    /// Parse a tree and print the resolved symbol table
    Symbols {
        /// Path to the grammar file
        grammar: PathBuf,
        /// Path to the token stream file
        tokens: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Table {
            grammar,
            nonterminals_out,
            check,
        } => cmd_table(&grammar, nonterminals_out.as_deref(), check, cli.output),
        Commands::Trace { grammar, tokens } => cmd_trace(&grammar, &tokens, cli.output),
        Commands::Tree {
            grammar,
            tokens,
            nonterminals,
            strict,
        } => cmd_tree(&grammar, &tokens, nonterminals.as_deref(), strict, cli.output),
        Commands::Symbols { grammar, tokens } => cmd_symbols(&grammar, &tokens, cli.output),
    };

    if let Err(message) = result {
        match cli.output {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "error": message }));
            }
            OutputFormat::Text => eprintln!("error: {message}"),
        }
        process::exit(1);
    }
}

fn load_grammar(path: &Path) -> Result<Grammar, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read grammar file {}: {e}", path.display()))?;
    Grammar::parse(&text).map_err(|e| e.to_string())
}

fn load_tokens(path: &Path) -> Result<Vec<Token>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read token file {}: {e}", path.display()))?;
    parse_token_stream(&text).map_err(|e| e.to_string())
}

fn cmd_table(
    grammar_path: &Path,
    nonterminals_out: Option<&Path>,
    check: bool,
    output: OutputFormat,
) -> Result<(), String> {
    let grammar = load_grammar(grammar_path)?;
    let analysis = Analysis::compute(&grammar);
    let table = Ll1Table::build(&grammar, &analysis);

    if let Some(out) = nonterminals_out {
        let mut text = grammar.nonterminals().join("\n");
        text.push('\n');
        fs::write(out, text)
            .map_err(|e| format!("cannot write {}: {e}", out.display()))?;
    }

    let conflicts = if check { table.conflicts() } else { Vec::new() };
    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "rows": table.rows(),
                "conflicts": conflicts,
            });
            println!("{}", serde_json::to_string_pretty(&value).expect("table is serializable"));
        }
        OutputFormat::Text => {
            println!("{}", to_csv(&table.rows()));
            for conflict in &conflicts {
                eprintln!(
                    "conflict at ({}, {}): {}",
                    conflict.nonterminal,
                    conflict.lookahead,
                    conflict.productions.join(" | ")
                );
            }
        }
    }
    if check && !conflicts.is_empty() {
        return Err(format!("{} LL(1) conflict(s) detected", conflicts.len()));
    }
    Ok(())
}

fn cmd_trace(grammar_path: &Path, tokens_path: &Path, output: OutputFormat) -> Result<(), String> {
    let grammar = load_grammar(grammar_path)?;
    let tokens = load_tokens(tokens_path)?;
    let analysis = Analysis::compute(&grammar);
    let table = Ll1Table::build(&grammar, &analysis);
    let outcome = drive(&grammar, &table, &tokens);

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).expect("trace is serializable")
            );
        }
        OutputFormat::Text => {
            let mut rows = vec![vec![
                "Stack".to_owned(),
                "Input".to_owned(),
                "Rule".to_owned(),
            ]];
            rows.extend(
                outcome
                    .rows
                    .iter()
                    .map(|r| vec![r.stack.clone(), r.input.clone(), r.rule.clone()]),
            );
            println!("{}", to_csv(&rows));
            println!("{}", if outcome.accepted { "Accept" } else { "Reject" });
        }
    }
    if !outcome.accepted {
        return Err(match outcome.failure {
            Some(failure) => failure.to_string(),
            None => "input rejected".to_owned(),
        });
    }
    Ok(())
}

fn cmd_tree(
    grammar_path: &Path,
    tokens_path: &Path,
    nonterminals_path: Option<&Path>,
    strict: bool,
    output: OutputFormat,
) -> Result<(), String> {
    let grammar = load_grammar(grammar_path)?;
    let tokens = load_tokens(tokens_path)?;
    let nonterminals = declared_nonterminals(&grammar, nonterminals_path)?;

    let mut tree = TreeParser::new(&grammar)
        .require_full_input(strict)
        .parse(&tokens)
        .map_err(|e| e.to_string())?;
    tree.decorate_epsilon_leaves(&nonterminals);

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&tree).expect("tree is serializable")
            );
        }
        OutputFormat::Text => print!("{}", tree.render()),
    }
    Ok(())
}

fn cmd_symbols(grammar_path: &Path, tokens_path: &Path, output: OutputFormat) -> Result<(), String> {
    let grammar = load_grammar(grammar_path)?;
    let tokens = load_tokens(tokens_path)?;
    let tree = TreeParser::new(&grammar)
        .parse(&tokens)
        .map_err(|e| e.to_string())?;

    let mut table = SymbolTable::new();
    Resolver::new()
        .resolve(&tree, &mut table)
        .map_err(|e| e.to_string())?;

    match output {
        OutputFormat::Json => {
            let symbols: Vec<_> = table.iter().collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&symbols).expect("symbols are serializable")
            );
        }
        OutputFormat::Text => print!("{}", table.listing()),
    }
    Ok(())
}

/// The declared non-terminal set used for epsilon-leaf decoration. When
/// a file is given it must equal exactly the grammar's own keys.
fn declared_nonterminals(
    grammar: &Grammar,
    path: Option<&Path>,
) -> Result<HashSet<String>, String> {
    let from_grammar: HashSet<String> = grammar.nonterminals().iter().cloned().collect();
    let Some(path) = path else {
        return Ok(from_grammar);
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read non-terminal file {}: {e}", path.display()))?;
    let declared: HashSet<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect();
    if declared != from_grammar {
        return Err(format!(
            "declared non-terminal set does not match the grammar (declared {}, grammar {})",
            declared.len(),
            from_grammar.len()
        ));
    }
    Ok(declared)
}

fn to_csv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| csv_escape(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escaping_quotes_only_when_needed() {
        assert_eq!(csv_escape("S -> A B"), "S -> A B");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
