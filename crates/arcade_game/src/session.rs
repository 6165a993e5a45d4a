//! Builds and starts scenes: preload, resolve assets, create.

use anyhow::{Context, Result};
use arcade_core::assets::AssetCatalog;
use arcade_core::scene::{Scene, SceneKey};

use crate::assets::load_assets;
use crate::config::GameConfig;
use crate::dungeon::DungeonScene;
use crate::platformer::PlatformerScene;

/// A created scene together with the assets it was created from. The host
/// uploads the catalog's images as textures.
pub struct ActiveScene {
    pub scene: Box<dyn Scene>,
    pub assets: AssetCatalog,
}

impl ActiveScene {
    pub fn key(&self) -> SceneKey {
        self.scene.key()
    }
}

pub fn build_scene(key: SceneKey, config: &GameConfig) -> Box<dyn Scene> {
    match key {
        SceneKey::Platformer => Box::new(PlatformerScene::new(config.platformer.clone())),
        SceneKey::Dungeon => Box::new(DungeonScene::new(config.dungeon.clone())),
    }
}

pub fn start_scene(key: SceneKey, config: &GameConfig) -> Result<ActiveScene> {
    let mut scene = build_scene(key, config);
    let requests = scene.preload();
    let assets = load_assets(&requests)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("failed to load assets for scene '{key}'"))?;
    scene
        .create(&assets)
        .with_context(|| format!("failed to create scene '{key}'"))?;
    log::info!(
        "Scene '{key}' started ({} assets, {} placeholders)",
        requests.len(),
        assets.placeholder_count()
    );
    Ok(ActiveScene { scene, assets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::input::InputState;
    use arcade_core::render::RenderList;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "arcade_session_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn config_without_art() -> GameConfig {
        let mut config = GameConfig::default();
        config.platformer.player_sprite = temp_file_path("no_player").display().to_string();
        config.dungeon.tile_sprite = temp_file_path("no_tile").display().to_string();
        config.dungeon.player_sprite = temp_file_path("no_hero").display().to_string();
        config
    }

    #[test]
    fn platformer_starts_on_placeholders_alone() {
        let active = start_scene(SceneKey::Platformer, &config_without_art())
            .expect("platformer needs no files");
        assert_eq!(active.key(), SceneKey::Platformer);
        assert_eq!(active.assets.placeholder_count(), 3);
    }

    #[test]
    fn dungeon_starts_from_map_file() {
        let map_path = temp_file_path("map");
        fs::write(&map_path, "□□□□\n□S □\n□□□□\n").expect("write temp map");
        let mut config = config_without_art();
        config.dungeon.map_path = map_path.display().to_string();

        let mut active = start_scene(SceneKey::Dungeon, &config).expect("dungeon should start");
        active.scene.tick(1.0 / 60.0, &InputState::new());
        let mut list = RenderList::new();
        active.scene.render(&mut list);
        // 10 walls + 2 floors + player.
        assert_eq!(list.sprites.len(), 13);
        let _ = fs::remove_file(map_path);
    }

    #[test]
    fn dungeon_without_map_reports_context() {
        let mut config = config_without_art();
        config.dungeon.map_path = temp_file_path("absent_map").display().to_string();
        let err = start_scene(SceneKey::Dungeon, &config)
            .err()
            .expect("missing map must fail");
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to load assets for scene 'dungeon'"));
        assert!(chain.contains("dungeon_map"));
    }

    #[test]
    fn dungeon_without_spawn_reports_map_error() {
        let map_path = temp_file_path("nospawn");
        fs::write(&map_path, "□□□\n□ □\n□□□\n").expect("write temp map");
        let mut config = config_without_art();
        config.dungeon.map_path = map_path.display().to_string();

        let err = start_scene(SceneKey::Dungeon, &config)
            .err()
            .expect("map without spawn must fail");
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to create scene 'dungeon'"));
        assert!(chain.contains("is invalid"));
        let _ = fs::remove_file(map_path);
    }
}
