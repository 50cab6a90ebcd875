//! # CLI - storage core interactive shell
//!
//! A REPL-style command-line interface for the embedded storage core.
//! Reads commands from stdin, executes them against an [`engine::Engine`],
//! and prints results to stdout.
//!
//! ## Commands
//!
//! ```text
//! INSERT key value   Insert or update a key-value pair
//! GET key            Look up a key (prints value or "(nil)")
//! REMOVE key         Delete a key (writes a tombstone)
//! STATS              Print engine debug info
//! EXIT / QUIT        Flush and shut down
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables; see
//! [`config::EngineConfig::from_env`].
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! storage core ready (sst_dir=data/sst, cache_capacity=10000)
//! > INSERT name Alice
//! OK
//! > GET name
//! Alice
//! > EXIT
//! bye
//! ```
use anyhow::Result;
use config::EngineConfig;
use engine::Engine;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let config = EngineConfig::from_env();
    let mut engine = Engine::open(&config, None::<&std::path::Path>)?;

    println!(
        "storage core ready (sst_dir={}, cache_capacity={})",
        config.sst_dir.display(),
        config.cache_capacity
    );
    println!("Commands: INSERT key value | GET key | REMOVE key | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "INSERT" => {
                    if let Some(k) = parts.next() {
                        let v: String = parts.collect::<Vec<&str>>().join(" ");
                        if v.is_empty() {
                            println!("ERR usage: INSERT key value");
                        } else {
                            match engine.insert(k.as_bytes().to_vec(), v.as_bytes().to_vec()) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR insert failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: INSERT key value");
                    }
                }
                "GET" => {
                    if let Some(k) = parts.next() {
                        match engine.get(k.as_bytes()) {
                            Ok(Some(v)) => println!("{}", String::from_utf8_lossy(&v)),
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR read failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "REMOVE" => {
                    if let Some(k) = parts.next() {
                        match engine.remove(k.as_bytes().to_vec()) {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR remove failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: REMOVE key");
                    }
                }
                "STATS" => {
                    println!("{:?}", engine);
                }
                "EXIT" | "QUIT" => {
                    if let Err(e) = engine.shutdown() {
                        println!("ERR shutdown failed: {}", e);
                    }
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
