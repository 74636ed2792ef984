use std::env;
use std::net::SocketAddr;

use arise_api::{serve, Documents};
use arise_core::quest::{apply_task_progress, quest_completed};
use arise_core::stats::apply_stat_update;
use contracts::StatPatch;
use tracing_subscriber::{fmt, EnvFilter};

fn print_usage() {
    println!("arise <command>");
    println!("commands:");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
    println!("  profile <email>");
    println!("    prints the user document (default for first-time users)");
    println!("  complete <email> <quest_id> <task_id> <progress>");
    println!("    applies task progress against the local store");
    println!("store path comes from ARISE_SQLITE_PATH (default arise_users.sqlite)");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn default_sqlite_path() -> String {
    env::var("ARISE_SQLITE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "arise_users.sqlite".to_string())
}

fn open_documents() -> Documents {
    Documents::open(default_sqlite_path())
}

fn run_complete(args: &[String]) -> Result<(), String> {
    let email = args
        .get(2)
        .cloned()
        .ok_or_else(|| "missing email".to_string())?;
    let quest_id = args
        .get(3)
        .cloned()
        .ok_or_else(|| "missing quest_id".to_string())?;
    let task_id = args
        .get(4)
        .cloned()
        .ok_or_else(|| "missing task_id".to_string())?;
    let progress = args
        .get(5)
        .ok_or_else(|| "missing progress".to_string())?
        .parse::<f64>()
        .map_err(|_| format!("invalid progress: {}", args[5]))?;
    if !progress.is_finite() || progress < 0.0 {
        return Err(format!("invalid progress: {progress}"));
    }

    let documents = open_documents();
    let document = documents
        .load(&email)
        .map_err(|err| format!("store error: {err}"))?
        .ok_or_else(|| format!("no document for {email}"))?;

    let was_completed = document
        .quests
        .iter()
        .find(|quest| quest.id == quest_id)
        .map(quest_completed)
        .unwrap_or(false);

    let quests = apply_task_progress(&document.quests, &quest_id, &task_id, progress);
    let now_completed = quests
        .iter()
        .find(|quest| quest.id == quest_id)
        .map(|quest| quest.is_completed)
        .unwrap_or(false);

    let written = if now_completed && !was_completed {
        let stats = apply_stat_update(&document.stats, &StatPatch::default());
        documents.update_progress(&email, &quests, &stats)
    } else {
        documents.update_quests(&email, &quests)
    };

    if !written {
        return Err(format!("write for {email} failed"));
    }

    println!(
        "updated quest={} task={} progress={} completed={}",
        quest_id, task_id, progress, now_completed
    );
    Ok(())
}

fn run_profile(args: &[String]) -> Result<(), String> {
    let email = args
        .get(2)
        .cloned()
        .ok_or_else(|| "missing email".to_string())?;

    let document = open_documents().get_document(&email);
    let rendered = serde_json::to_string_pretty(&document)
        .map_err(|err| format!("failed to render document: {err}"))?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                let documents = open_documents();
                println!("serving api on http://{addr}");
                if let Err(err) = serve(addr, documents).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("profile") => {
            if let Err(err) = run_profile(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        Some("complete") => {
            if let Err(err) = run_complete(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        _ => {
            print_usage();
        }
    }
}
