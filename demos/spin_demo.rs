use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tavern_wheel::{Prize, Wheel, WheelCommand, WheelConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A small fixed prize set; 0.15 of the circle stays as the no-win slice.
    let prizes = vec![
        Prize::new("点歌券", 0.25),
        Prize::new("表情包", 0.30),
        Prize::new("晚安语音", 0.30),
    ];

    let config = WheelConfig::builder()
        .title("spin demo".to_string())
        .spin_duration_secs(3.0)
        .build();
    let mut wheel = Wheel::new(config, prizes);

    // Kick off a spin every few seconds; requests that arrive while the
    // wheel is still turning are rejected, which this demo exercises too.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || loop {
        if sender.send(WheelCommand::Spin).is_err() {
            break;
        }
        thread::sleep(Duration::from_secs(5));
    });

    println!("Spinning every 5 seconds; click the window to spin manually.");
    println!("Press Ctrl+C to exit");

    wheel.show_with_commands(receiver)?;
    Ok(())
}
