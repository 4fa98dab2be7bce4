use log::error;
use std::env;

use student_portal_backend::auth::hash_password;

/// Prints an Argon2 hash for seeding `teachers.password_hash` or
/// `student.password_hash` by hand.
fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        error!("Usage: {} <password>", args[0]);
        std::process::exit(1);
    }

    match hash_password(&args[1]) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            error!("Failed to hash password: {}", e);
            std::process::exit(1);
        }
    }
}
