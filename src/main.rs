use anyhow::{Context, Result};
use camcorder::platform::{AuthorizationStatus, InterruptionReason, SessionNotification};
use camcorder::session::EventReceiver;
use camcorder::{
    create_router, AppState, CaptureSessionController, Config, SimulatedConfig, SimulatedPlatform,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "camcorder")]
#[command(about = "Capture session controller running on a simulated camera platform")]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/camcorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a scripted scenario and print the resulting controller state
    Run {
        #[arg(value_enum, default_value = "record")]
        scenario: Scenario,

        /// How long the record scenario keeps recording, in milliseconds
        #[arg(short, long, default_value = "500")]
        duration_ms: u64,
    },
    /// Serve the HTTP control API
    Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    Record,
    Switch,
    Interrupt,
    Deny,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config).context("Failed to load config")?;

    info!("Loaded config: {}", cfg.service.name);

    match args.command {
        Command::Run { scenario, duration_ms } => run_scenario(&cfg, scenario, duration_ms).await,
        Command::Serve => serve(&cfg).await,
    }
}

/// Log every event queued so far, after the session queue drained
async fn settle(controller: &CaptureSessionController, events: &mut EventReceiver) {
    if let Err(e) = controller.snapshot().await {
        warn!("Controller unavailable: {}", e);
    }
    while let Ok(event) = events.try_recv() {
        info!("UI event: {:?}", event);
    }
}

async fn run_scenario(cfg: &Config, scenario: Scenario, duration_ms: u64) -> Result<()> {
    let mut sim = SimulatedConfig::phone(cfg.library_path());
    if let Scenario::Deny = scenario {
        sim.authorization = AuthorizationStatus::NotDetermined;
        sim.grant_access = false;
    }

    let (platform, probe) = SimulatedPlatform::new(sim);
    let (controller, mut events) = CaptureSessionController::spawn(platform, cfg.controller_config());

    controller.check_authorization();
    controller.start_session();
    settle(&controller, &mut events).await;

    match scenario {
        Scenario::Record => {
            controller.toggle_recording();
            settle(&controller, &mut events).await;
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            controller.toggle_recording();
            settle(&controller, &mut events).await;
            info!("Saved assets: {:?}", probe.saved_assets());
        }
        Scenario::Switch => {
            controller.switch_camera();
            settle(&controller, &mut events).await;
            controller.switch_camera();
            settle(&controller, &mut events).await;
            info!("Bound video inputs: {:?}", probe.video_inputs());
        }
        Scenario::Interrupt => {
            probe.post(SessionNotification::Interrupted {
                reason: InterruptionReason::VideoDeviceInUseByAnotherClient,
            });
            settle(&controller, &mut events).await;
            probe.post(SessionNotification::InterruptionEnded);
            settle(&controller, &mut events).await;
        }
        Scenario::Deny => {}
    }

    match controller.snapshot().await {
        Ok(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        Err(e) => warn!("No snapshot: {}", e),
    }

    controller.stop_session();
    if let Err(e) = controller.shutdown().await {
        warn!("Controller stopped: {}", e);
    }

    Ok(())
}

async fn serve(cfg: &Config) -> Result<()> {
    let (platform, _probe) = SimulatedPlatform::new(SimulatedConfig::phone(cfg.library_path()));
    let (controller, events) = CaptureSessionController::spawn(platform, cfg.controller_config());
    controller.check_authorization();

    let app = create_router(AppState::new(controller.clone(), events));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    controller.stop_session();
    controller.shutdown().await?;
    Ok(())
}
