//! Bomb Catcher entry point
//!
//! Headless runner: plays one round under autopilot and prints the final
//! snapshot as JSON. Rendering and audio live in the host frontends.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::Parser;

    use bomb_catcher::consts::SIM_DT;
    use bomb_catcher::sim::{Bomb, EndReason, RoundPhase};
    use bomb_catcher::{FeedbackError, FeedbackListener, Game, RulesPreset, Settings};

    /// Plays one headless round under autopilot and prints the final snapshot.
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Options {
        /// Run seed. Defaults to the current time.
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
        /// JSON settings file; missing fields keep their defaults.
        #[arg(long = "settings", value_name = "PATH")]
        settings_path: Option<PathBuf>,
        /// Rules preset applied over the settings (classic or health).
        #[arg(long, value_name = "NAME", value_parser = parse_preset)]
        preset: Option<RulesPreset>,
        /// Pace frames against the wall clock instead of running flat out.
        #[arg(long)]
        realtime: bool,
    }

    fn parse_preset(name: &str) -> Result<RulesPreset, String> {
        RulesPreset::from_str(name)
            .ok_or_else(|| format!("unknown preset `{}` (expected classic or health)", name))
    }

    /// Logs cues in place of sound effects
    struct LogCues;

    impl FeedbackListener for LogCues {
        fn on_catch(&mut self, bomb: &Bomb) -> Result<(), FeedbackError> {
            log::info!("Caught bomb {} at x={:.1}", bomb.id, bomb.x());
            Ok(())
        }

        fn on_miss(&mut self, bomb: &Bomb) -> Result<(), FeedbackError> {
            log::info!("Missed bomb {} at x={:.1}", bomb.id, bomb.x());
            Ok(())
        }

        fn on_round_over(&mut self, reason: EndReason, score: u64) -> Result<(), FeedbackError> {
            log::info!("Game over ({:?}) - final score {}", reason, score);
            Ok(())
        }
    }

    fn time_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let options = Options::parse();
        let mut settings = match &options.settings_path {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(preset) = options.preset {
            settings.apply_preset(preset);
            log::info!("Using {} rules", preset.as_str());
        }
        settings.validate()?;

        let seed = options.seed.unwrap_or_else(time_seed);
        log::info!("Bomb Catcher (headless) starting with seed: {}", seed);

        let mut game = Game::new(seed, settings).with_listener(Box::new(LogCues));
        game.set_autopilot(true);
        game.start();

        let frame = Duration::from_secs_f32(SIM_DT);
        let mut last = Instant::now();
        while game.phase() == RoundPhase::Playing {
            let dt = if options.realtime {
                std::thread::sleep(frame.saturating_sub(last.elapsed()));
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;
                dt
            } else {
                SIM_DT
            };
            game.frame(dt);
        }

        let snapshot = serde_json::to_string_pretty(&game.snapshot())?;
        println!("{}", snapshot);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
