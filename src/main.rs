use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use tavern_wheel::{default_prizes, PrizeStore, Wheel, WheelCommand, WheelConfig};

/// Lucky-draw prize wheel for the midnight tavern community site.
///
/// Click the wheel to spin. Lines on stdin are accepted as commands too:
/// "spin" starts a round, "save" persists the prize set to the backend.
#[derive(Parser, Debug)]
#[command(name = "tavern-wheel", version, about)]
struct Args {
    /// Base URL of the community-site backend.
    #[arg(long, default_value = "http://localhost:8080")]
    server_url: String,

    /// Session cookie for the logged-in user; without it the wheel runs on
    /// the default prize set and cannot save.
    #[arg(long)]
    session_cookie: Option<String>,

    /// Skip the backend entirely and use the built-in prize set.
    #[arg(long)]
    offline: bool,

    /// Window title.
    #[arg(long, default_value = "深夜小酒馆 · 幸运大转盘")]
    title: String,

    /// Path to a TTF/OTF font for segment labels (needs CJK coverage).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Spin animation duration in seconds.
    #[arg(long, default_value_t = 3.6)]
    spin_duration: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let font_data = match &args.font {
        Some(path) => Some(
            std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?,
        ),
        None => None,
    };

    let (store, prizes) = if args.offline {
        info!("offline mode, using the default prize set");
        (None, default_prizes())
    } else {
        let store = PrizeStore::new(&args.server_url, args.session_cookie.clone());
        match store.check_auth() {
            Ok(auth) => info!(
                "session: user {}, admin {}",
                auth.username.as_deref().unwrap_or("(anonymous)"),
                auth.is_admin
            ),
            Err(err) => warn!("auth check failed: {err}"),
        }
        let prizes = store.load();
        (Some(store), prizes)
    };

    let config = WheelConfig::builder()
        .title(args.title)
        .spin_duration_secs(args.spin_duration)
        .maybe_font_data(font_data)
        .build();

    let mut wheel = Wheel::new(config, prizes);
    if let Some(store) = store {
        wheel = wheel.with_store(store);
    }

    // Bridge stdin lines into wheel commands, like piping values into a
    // gauge. The thread ends when the window closes and the channel drops.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(|line| line.ok()) {
            let command = match line.trim() {
                "spin" => WheelCommand::Spin,
                "save" => WheelCommand::Save,
                "" => continue,
                other => {
                    warn!("unknown command: {other}");
                    continue;
                }
            };
            if sender.send(command).is_err() {
                break;
            }
        }
    });

    wheel.show_with_commands(receiver)?;
    Ok(())
}
