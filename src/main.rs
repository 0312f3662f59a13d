use std::env;
use std::sync::Arc;

use tasksync::{Client, Config, FileStore, LogNavigator};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let store = Arc::new(FileStore::new(config.token_file.clone()));
    let client = Client::new(&config, store, Arc::new(LogNavigator));

    if !client.session.is_authenticated() {
        let email = env::var("TASKSYNC_EMAIL").expect("TASKSYNC_EMAIL must be set");
        let password = env::var("TASKSYNC_PASSWORD").expect("TASKSYNC_PASSWORD must be set");
        if let Err(err) = client.session.login(&email, &password).await {
            eprintln!("login failed: {}", err);
            std::process::exit(1);
        }
    } else if let Err(err) = client.session.fetch_user().await {
        eprintln!("stored session rejected: {}", err);
        std::process::exit(1);
    }

    match client.tasks.fetch_all().await {
        Ok(tasks) => {
            println!("{} task(s)", tasks.len());
            for task in tasks {
                let mark = if task.is_completed { "x" } else { " " };
                println!("[{}] #{} {}", mark, task.id, task.title);
            }
        }
        Err(err) => {
            eprintln!("failed to load tasks: {}", err);
            std::process::exit(1);
        }
    }
}
