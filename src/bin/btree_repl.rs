//! Interactive front end for a table file.
//!
//! Usage:
//!   btree_repl <db_path>
//!
//! Reads one command per line from stdin:
//!   insert <id> <username> <email>
//!   select [id]
//!   .btree | .constants | .json | .stats | .exit
//!
//! Logs go to stderr; set `RUST_LOG=btree_table=debug` to trace splits.

use btree_table::statement::{parse_meta_command, prepare_statement, MetaCommand, Statement};
use btree_table::{Config, Db, ExecuteResult};
use std::env;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process::exit;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btree_table=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Must supply a database filename.");
        exit(1);
    }

    if let Err(e) = run(&args[1]) {
        eprintln!("ERROR: {}", e);
        exit(1);
    }
}

fn run(db_path: &str) -> Result<(), Box<dyn Error>> {
    let db = Db::open(Config::new(db_path))?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("db > ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            // End of input closes the table like `.exit`
            None => break,
        };
        let input = line.trim();

        if input.starts_with('.') {
            match parse_meta_command(input) {
                Ok(MetaCommand::Exit) => break,
                Ok(command) => run_meta_command(&db, command)?,
                Err(e) => println!("{}", e),
            }
            continue;
        }

        match prepare_statement(input) {
            Ok(statement) => execute_statement(&db, statement)?,
            Err(e) => println!("{}", e),
        }
    }

    db.close()?;
    Ok(())
}

fn run_meta_command(db: &Db, command: MetaCommand) -> Result<(), Box<dyn Error>> {
    match command {
        MetaCommand::Btree => {
            println!("Tree:");
            print!("{}", db.print_tree()?);
        }
        MetaCommand::Constants => {
            println!("Constants:");
            print!("{}", db.describe_constants());
        }
        MetaCommand::Json => {
            println!("{}", serde_json::to_string_pretty(&db.export_tree()?)?);
        }
        MetaCommand::Stats => {
            println!("{}", serde_json::to_string_pretty(&db.stats()?)?);
        }
        // Handled by the caller
        MetaCommand::Exit => {}
    }
    Ok(())
}

fn execute_statement(db: &Db, statement: Statement) -> Result<(), Box<dyn Error>> {
    match statement {
        Statement::Insert(row) => match db.insert(&row)? {
            ExecuteResult::Success => println!("Executed."),
            ExecuteResult::DuplicateKey => println!("Error: Duplicate key."),
            ExecuteResult::TableFull => println!("Error: Table full."),
        },
        Statement::Select => {
            for row in db.select_all()? {
                println!("{}", row);
            }
            println!("Executed.");
        }
        Statement::SelectOne(id) => {
            if let Some(row) = db.get(id)? {
                println!("{}", row);
            }
            println!("Executed.");
        }
    }
    Ok(())
}
