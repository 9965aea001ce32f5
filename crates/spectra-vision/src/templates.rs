//! Reference images shared by every frame of a match.
//!
//! On-disk layout under the template directory:
//!
//! ```text
//! replay_icon.png        replay banner crop
//! avatars/<hero>.png     transparent hero icons
//! ult_charge/<0-9>.png   ultimate charge digits
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use image::{RgbImage, RgbaImage};
use spectra_types::{game_type::GameTypeProfile, Result, SpectraError};
use tracing::{debug, info};

pub const ULT_CHARGE_DIGITS: usize = 10;

#[derive(Debug, Clone)]
pub struct ReferenceTemplates {
    replay_icon: RgbImage,
    avatars: BTreeMap<String, RgbaImage>,
    ult_charge_digits: Vec<RgbImage>,
}

impl ReferenceTemplates {
    pub fn new(
        replay_icon: RgbImage,
        avatars: BTreeMap<String, RgbaImage>,
        ult_charge_digits: Vec<RgbImage>,
    ) -> Self {
        Self {
            replay_icon,
            avatars,
            ult_charge_digits,
        }
    }

    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let replay_icon = open_image(&dir.join("replay_icon.png"))?.to_rgb8();

        let avatar_dir = dir.join("avatars");
        let mut avatars = BTreeMap::new();
        for path in png_files(&avatar_dir)? {
            let Some(hero) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            debug!("Loaded avatar template {}", hero);
            avatars.insert(hero.to_string(), open_image(&path)?.to_rgba8());
        }

        let digit_dir = dir.join("ult_charge");
        let ult_charge_digits = (0..ULT_CHARGE_DIGITS)
            .map(|digit| open_image(&digit_dir.join(format!("{digit}.png"))).map(|img| img.to_rgb8()))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Reference templates ready from {:?}: {} avatars",
            dir,
            avatars.len()
        );
        Ok(Self::new(replay_icon, avatars, ult_charge_digits))
    }

    /// Check the templates against the layout of one game type.
    pub fn validate(&self, profile: &GameTypeProfile) -> Result<()> {
        let replay_size = profile.replay.icon_region.size();
        if self.replay_icon.dimensions() != (replay_size.width, replay_size.height) {
            return Err(SpectraError::Configuration(format!(
                "replay icon is {:?}, {:?} layout expects {}x{}",
                self.replay_icon.dimensions(),
                profile.game_type,
                replay_size.width,
                replay_size.height
            )));
        }
        if self.avatars.is_empty() {
            return Err(SpectraError::Configuration(
                "no hero avatar templates found".into(),
            ));
        }
        let avatar_size = (profile.avatar_size.width, profile.avatar_size.height);
        if let Some((hero, icon)) = self
            .avatars
            .iter()
            .find(|(_, icon)| icon.dimensions() != avatar_size)
        {
            return Err(SpectraError::Configuration(format!(
                "avatar template {hero} is {:?}, expected {:?}",
                icon.dimensions(),
                avatar_size
            )));
        }
        if self.ult_charge_digits.len() != ULT_CHARGE_DIGITS {
            return Err(SpectraError::Configuration(format!(
                "expected {ULT_CHARGE_DIGITS} ult charge digit templates, got {}",
                self.ult_charge_digits.len()
            )));
        }
        Ok(())
    }

    pub fn replay_icon(&self) -> &RgbImage {
        &self.replay_icon
    }

    pub fn avatars(&self) -> &BTreeMap<String, RgbaImage> {
        &self.avatars
    }

    pub fn ult_charge_digits(&self) -> &[RgbImage] {
        &self.ult_charge_digits
    }
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).map_err(|err| {
        SpectraError::Configuration(format!(
            "missing or unreadable template {}: {err}",
            path.display()
        ))
    })
}

fn png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| {
        SpectraError::Configuration(format!(
            "unable to read template directory {}: {err}",
            dir.display()
        ))
    })?;
    let mut files = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("png"))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}
