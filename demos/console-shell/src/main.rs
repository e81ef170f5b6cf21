//! Line-oriented driver for a `Console` against a live auth API.
//!
//! ```text
//! STOCKLINE_API_URL=http://localhost:8080/api cargo run -p console-shell
//! > login dana@example.com hunter2 distributor
//! > goto /admin/dashboard
//! redirect to /distributor/dashboard
//! ```

use stockline::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  login <email> <password> [role]   sign in (role: admin, management, superstockist, distributor, salesman)
  logout                            sign out
  whoami                            show the signed-in user
  goto <path>                       ask where a path leads
  refresh                           re-fetch the profile
  quit                              exit";

type LiveConsole = Console<stockline::transport::HttpBackend, stockline::session::FileTokenStore>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    stockline::logging::init();

    let config = ConsoleConfig::from_env()?;
    eprintln!(
        "stockline console against {} (token file {})",
        config.api_base_url,
        config.token_file.display()
    );
    let console = Console::builder().config(config).build()?;

    let snapshot = console.initialize().await;
    print_identity(snapshot.identity.as_ref());
    eprintln!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit" | "exit"] => break,
            ["help"] => println!("{HELP}"),
            ["login", email, password, rest @ ..] => login(&console, email, password, rest).await,
            ["logout"] => match console.logout().await {
                LogoutOutcome::Notified => println!("signed out"),
                LogoutOutcome::NotificationFailed(e) => {
                    println!("signed out (server was not notified: {e})")
                }
                LogoutOutcome::AlreadySignedOut => println!("not signed in"),
            },
            ["whoami"] => print_identity(console.identity().await.as_ref()),
            ["goto", path] => println!("{}", console.navigate(path).await),
            ["refresh"] => match console.refresh_profile().await {
                Ok(user) => print_identity(Some(&user)),
                Err(e) => println!("{e}"),
            },
            _ => println!("unrecognized command, type `help`"),
        }
    }

    Ok(())
}

async fn login(console: &LiveConsole, email: &str, password: &str, rest: &[&str]) {
    let role = match rest {
        [] => None,
        [name] => match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                println!("{e}");
                return;
            }
        },
        _ => {
            println!("usage: login <email> <password> [role]");
            return;
        }
    };

    let credentials = Credentials {
        email: email.to_string(),
        password: password.to_string(),
        role,
    };
    match console.login(credentials).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "shell sign-in");
            print_identity(Some(&user));
            if let Some(role) = user.role() {
                let home = stockline::router::default_area_for(role).landing_path();
                println!("home: {home}");
            }
        }
        Err(e) => println!("{e}"),
    }
}

fn print_identity(identity: Option<&Identity>) {
    match identity {
        Some(user) => {
            let territory = user.territory.as_deref().unwrap_or("-");
            println!("{} <{}> role={} territory={territory}", user.name, user.email, user.role);
        }
        None => println!("signed out"),
    }
}
