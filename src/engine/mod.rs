pub mod clock;
pub mod core;
pub mod platform;
pub mod renderer;
pub mod resources;
pub mod scheduler;

use anyhow::Result;
use self::clock::SystemClock;
use self::core::EngineConfig;
use self::platform::PlatformLayer;
use self::resources::ResourceManager;
use self::scheduler::FixedStepScheduler;

use crate::game::{Game, MovementGame, PLAYER_TEXTURE, STATS_FONT};

pub struct EngineApp {
    config: EngineConfig,
    resources: ResourceManager,
    game: MovementGame,
}

impl EngineApp {
    pub fn new(config: EngineConfig) -> Self {
        let mut resources = ResourceManager::default();
        resources.register_texture(PLAYER_TEXTURE, &config.texture_path);
        resources.register_font(STATS_FONT, &config.font_path);

        Self {
            game: MovementGame::new(&config),
            resources,
            config,
        }
    }

    pub fn run(self) -> Result<()> {
        let Self {
            config,
            resources,
            mut game,
        } = self;

        tracing::info!(
            target: "engine",
            app = %config.app_name,
            game = %game.name(),
            tick_rate = config.tick_rate,
            textures = resources.texture_count(),
            fonts = resources.font_count(),
            "Engine starting"
        );

        let window = PlatformLayer::new(&config, resources)?;
        let mut scheduler = FixedStepScheduler::new(window, SystemClock, config.fixed_step());
        let frames = scheduler.run(&mut game);

        tracing::info!(
            target: "engine",
            frames,
            position = ?game.player.position,
            "Engine shutdown complete"
        );
        Ok(())
    }
}
