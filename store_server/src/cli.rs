use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // STORE_JWT_SECRET and STORE_BUS_WEBHOOK_TOKEN are deliberately left off this list
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "STORE_HOST",
        "STORE_PORT",
        "STORE_DATABASE_URL",
        "STORE_DB_MAX_CONNECTIONS",
        "STORE_TOKEN_TTL_HOURS",
        "STORE_EVENT_BUFFER_SIZE",
        "STORE_ROUTER_CONCURRENCY",
        "STORE_INBOUND_QUEUE_SIZE",
        "STORE_SEED_SAMPLE_DATA",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
