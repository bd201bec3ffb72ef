use clap::Args;
use indoc::indoc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};
use zumbazombie_core::background::{InProcessRegistrar, UnavailableRegistrar};
use zumbazombie_core::error::Result as CoreResult;
use zumbazombie_core::{
    Command, Config, Controller, Event, LogNotifier, Notification, Notifier, PermissionStatus,
    Runtime, TimerSetting, Update,
};

const HELP: &str = indoc! {"
    commands: start | stop | move | set <5|10|15|20|25|30> | change | done
              camera | background | foreground | status | quit"};

#[derive(Args)]
pub struct RunArgs {
    /// Inactivity threshold in minutes (defaults to timer.minutes)
    #[arg(long)]
    minutes: Option<TimerSetting>,
    /// Seed for reproducible activity picks
    #[arg(long)]
    seed: Option<u64>,
    /// Skip background check registration
    #[arg(long)]
    no_background: bool,
}

/// Logs alerts like [`LogNotifier`] and also prints them, optionally with a bell.
struct TerminalNotifier {
    inner: LogNotifier,
    bell: bool,
}

impl Notifier for TerminalNotifier {
    fn request_permission(&mut self) -> PermissionStatus {
        self.inner.request_permission()
    }

    fn notify(&mut self, notification: &Notification) -> CoreResult<()> {
        self.inner.notify(notification)?;
        let bell = if self.bell { "\x07" } else { "" };
        println!("{bell}[{}] {}", notification.title, notification.body);
        Ok(())
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let result = rt.block_on(session(args));
    // A stdin read may still be parked on the blocking pool.
    rt.shutdown_background();
    result
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let setting = args.minutes.unwrap_or_else(|| config.timer_setting());

    let notifier = TerminalNotifier {
        inner: LogNotifier::new(config.notifications.enabled),
        bell: config.notifications.bell,
    };
    let mut controller = Controller::new(setting, Box::new(notifier), 0);
    if let Some(seed) = args.seed.or(config.activities.seed) {
        controller = controller.with_seed(seed);
    }

    let mut runtime = Runtime::new(controller);
    println!("{}", runtime.screen().render());

    let options = config.background.options();
    let permission = if config.background.enabled && !args.no_background {
        runtime.setup(&mut InProcessRegistrar::new(), &options)
    } else {
        runtime.setup(&mut UnavailableRegistrar, &options)
    };
    if permission != PermissionStatus::Granted {
        println!("{}", runtime.screen().render());
        return Err("notification permission denied".into());
    }

    println!("{HELP}\n");
    println!("{}", runtime.screen().render());

    let (tx, rx) = mpsc::channel(16);
    let input = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if tx.send(command).await.is_err() || command == Command::Quit {
                        break;
                    }
                }
                Err(e) => {
                    debug!(%line, "rejected input");
                    eprintln!("{e}\n{HELP}");
                }
            }
        }
    };

    let (controller, ()) = tokio::join!(runtime.run(rx, print_update), input);
    info!(points = controller.engine().points(), "session ended");
    println!("Zompoints earned this session: {}", controller.engine().points());
    Ok(())
}

fn print_update(update: Update) {
    let redraw = update.events.is_empty()
        || update.events.iter().any(|e| {
            !matches!(
                e,
                Event::NotificationSent { .. } | Event::PointsAnimationHidden { .. }
            )
        });
    if redraw {
        println!("\n{}", update.screen.render());
    }
}
