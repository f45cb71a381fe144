//! Print a bcrypt hash for `ADMIN_PASSWORD_HASH`.
//!
//! Usage: `cargo run --bin hash-password <PASSWORD>`; honours `BCRYPT_COST`.
use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let password = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin hash-password <PASSWORD>");
        std::process::exit(1);
    });

    if password.chars().count() < portfolio_api::services::validation::MIN_PASSWORD_LEN {
        eprintln!(
            "Password must be at least {} characters",
            portfolio_api::services::validation::MIN_PASSWORD_LEN
        );
        std::process::exit(1);
    }

    let cost = match env::var("BCRYPT_COST") {
        Ok(raw) => match raw.parse::<u32>() {
            Ok(cost) => cost,
            Err(_) => {
                eprintln!("BCRYPT_COST must be an integer, got {raw:?}");
                std::process::exit(1);
            }
        },
        Err(_) => DEFAULT_COST,
    };

    match hash(&password, cost) {
        Ok(hashed) => {
            println!("\nCost : {}", cost);
            println!("Hash : {}\n", hashed);
            println!("# Paste this into your .env:");
            println!("ADMIN_PASSWORD_HASH={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
