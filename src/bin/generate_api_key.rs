//! CLI tool to generate API keys for the records file.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --id alice --name "Alice" --role staff --expires-in 365d

use std::env;

use media_fileserver_lib::models::{User, UserRole};
use media_fileserver_lib::services::api_key;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut id: Option<String> = None;
    let mut name: Option<String> = None;
    let mut role = "member".to_string();
    let mut expires_in: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--id" | "-i" => {
                i += 1;
                if i < args.len() {
                    id = Some(args[i].clone());
                }
            }
            "--name" | "-n" => {
                i += 1;
                if i < args.len() {
                    name = Some(args[i].clone());
                }
            }
            "--role" | "-r" => {
                i += 1;
                if i < args.len() {
                    role = args[i].clone();
                }
            }
            "--expires-in" | "-e" => {
                i += 1;
                if i < args.len() {
                    expires_in = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let id = match id {
        Some(id) => id,
        None => {
            eprintln!("Error: --id is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let Some(role) = UserRole::parse(&role) else {
        eprintln!("Error: Invalid role '{}'. Must be: staff, member", role);
        std::process::exit(1);
    };

    let expires_at = match expires_in.as_deref() {
        Some(lifetime) => match api_key::expires_after(lifetime) {
            Some(at) => Some(at),
            None => {
                eprintln!("Error: Invalid expiration '{}'. Use e.g. 30d, 12w, 6m, 1y", lifetime);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let (full_key, key_hash) = api_key::generate_key();

    let user = User {
        name: name.unwrap_or_else(|| id.clone()),
        id,
        role,
        key_hash,
        expires_at,
    };

    let entry = match serde_json::to_string_pretty(&user) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing user entry: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Generated");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  User:    {} ({})", user.id, user.name);
    println!("  Role:    {}", user.role);
    if let Some(expires) = user.expires_at {
        println!("  Expires: {}", expires.to_rfc3339());
    } else {
        println!("  Expires: Never");
    }
    println!();
    println!("  Key:     {}", full_key);
    println!();
    println!("  Add this entry to the \"users\" list of the records file:");
    println!();
    for line in entry.lines() {
        println!("  {}", line);
    }
    println!();
    println!("  ⚠️  Save this key! Only its hash is stored.");
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!(
        "Usage: generate-api-key --id <id> [--name <name>] [--role <role>] [--expires-in <duration>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --id, -i          User id referenced by record owners (required)");
    eprintln!("  --name, -n        Display name (default: the id)");
    eprintln!("  --role, -r        Role: staff, member (default: member)");
    eprintln!("  --expires-in, -e  Expiration: 30d, 12w, 6m, 1y (default: never)");
    eprintln!("  --help, -h        Show this help");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  generate-api-key --id alice --name \"Alice\" --role staff");
    eprintln!("  generate-api-key --id kiosk --expires-in 90d");
    eprintln!();
}
