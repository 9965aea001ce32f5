//! Hero avatar templates fused against each team's color.
//!
//! The scoreboard draws hero icons over a solid team-colored tile, so
//! matching works best against reference icons composited the same way.
//! The fused set is built from the first valid frame and then reused for
//! the whole match.

use std::{collections::BTreeMap, sync::Arc};

use image::{Rgb, RgbImage};
use spectra_types::{
    game_type::GameTypeProfile,
    team::{TeamPair, TeamSide},
    Result,
};
use spectra_vision::{overlay, pixel_at, resize, solid_fill, ReferenceTemplates};
use tracing::debug;

use crate::context::MatchContext;

pub type AvatarMap = BTreeMap<String, RgbImage>;

/// Full and reduced resolution avatars for both teams, keyed by hero.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarTemplates {
    team_colors: TeamPair<Rgb<u8>>,
    normal: TeamPair<AvatarMap>,
    small: TeamPair<AvatarMap>,
}

impl AvatarTemplates {
    /// Read team colors from `frame` and fuse every reference icon.
    pub fn synthesize(
        frame: &RgbImage,
        profile: &GameTypeProfile,
        references: &ReferenceTemplates,
    ) -> Result<Self> {
        let team_colors = read_team_colors(frame, profile)?;
        Self::from_team_colors(team_colors, profile, references)
    }

    pub fn from_team_colors(
        team_colors: TeamPair<Rgb<u8>>,
        profile: &GameTypeProfile,
        references: &ReferenceTemplates,
    ) -> Result<Self> {
        let (left, left_small) = fuse_side(team_colors.left, profile, references)?;
        let (right, right_small) = fuse_side(team_colors.right, profile, references)?;
        debug!(
            "Fused {} hero avatars for both teams",
            references.avatars().len()
        );
        Ok(Self {
            team_colors,
            normal: TeamPair::new(left, right),
            small: TeamPair::new(left_small, right_small),
        })
    }

    pub fn team_colors(&self) -> TeamPair<Rgb<u8>> {
        self.team_colors
    }

    pub fn normal(&self, side: TeamSide) -> &AvatarMap {
        self.normal.get(side)
    }

    pub fn small(&self, side: TeamSide) -> &AvatarMap {
        self.small.get(side)
    }

    pub fn hero_count(&self) -> usize {
        self.normal.left.len()
    }
}

fn fuse_side(
    color: Rgb<u8>,
    profile: &GameTypeProfile,
    references: &ReferenceTemplates,
) -> Result<(AvatarMap, AvatarMap)> {
    let background = solid_fill(color, profile.avatar_size);
    let mut normal = AvatarMap::new();
    let mut small = AvatarMap::new();
    for (hero, icon) in references.avatars() {
        let fused = overlay(&background, icon)?;
        small.insert(hero.clone(), resize(&fused, profile.avatar_small_size));
        normal.insert(hero.clone(), fused);
    }
    Ok((normal, small))
}

pub fn read_team_colors(frame: &RgbImage, profile: &GameTypeProfile) -> Result<TeamPair<Rgb<u8>>> {
    Ok(TeamPair::new(
        pixel_at(frame, profile.team_color_pick.left)?,
        pixel_at(frame, profile.team_color_pick.right)?,
    ))
}

/// The avatar view handed to one player slot.
#[derive(Debug, Clone)]
pub struct SlotAvatars {
    templates: Arc<AvatarTemplates>,
    side: TeamSide,
}

impl SlotAvatars {
    pub fn new(templates: Arc<AvatarTemplates>, side: TeamSide) -> Self {
        Self { templates, side }
    }

    pub fn side(&self) -> TeamSide {
        self.side
    }

    pub fn normal(&self) -> &AvatarMap {
        self.templates.normal(self.side)
    }

    pub fn small(&self) -> &AvatarMap {
        self.templates.small(self.side)
    }

    pub fn templates(&self) -> &Arc<AvatarTemplates> {
        &self.templates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSource {
    /// Locked into the match context by an earlier valid frame.
    Cached,
    /// Built from the current frame; not yet part of the match context.
    Provisional,
}

#[derive(Debug, Clone)]
pub struct ResolvedAvatars {
    pub templates: Arc<AvatarTemplates>,
    pub source: AvatarSource,
}

/// Avatar templates for analysing `frame`.
///
/// Returns the match's cached set without any work when present; otherwise
/// fuses a provisional set from this frame's team colors.
pub fn resolve(ctx: &MatchContext, frame: &RgbImage) -> Result<ResolvedAvatars> {
    if let Some(templates) = ctx.avatar_templates() {
        return Ok(ResolvedAvatars {
            templates,
            source: AvatarSource::Cached,
        });
    }
    let templates = AvatarTemplates::synthesize(frame, ctx.profile(), ctx.references())?;
    Ok(ResolvedAvatars {
        templates: Arc::new(templates),
        source: AvatarSource::Provisional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{live_frame, match_context, LEFT_COLOR, RIGHT_COLOR};

    #[test]
    fn synthesizes_both_resolutions_per_team() {
        let ctx = match_context();
        let frame = live_frame();
        let templates =
            AvatarTemplates::synthesize(&frame, ctx.profile(), ctx.references()).expect("fuse");

        assert_eq!(templates.team_colors(), TeamPair::new(LEFT_COLOR, RIGHT_COLOR));
        assert_eq!(templates.hero_count(), ctx.references().avatars().len());
        let profile = ctx.profile();
        for side in [TeamSide::Left, TeamSide::Right] {
            let normal = &templates.normal(side)["ana"];
            let small = &templates.small(side)["ana"];
            assert_eq!(
                normal.dimensions(),
                (profile.avatar_size.width, profile.avatar_size.height)
            );
            assert_eq!(
                small.dimensions(),
                (profile.avatar_small_size.width, profile.avatar_small_size.height)
            );
        }
        // Fully transparent icon pixels show the team color.
        assert_eq!(*templates.normal(TeamSide::Left)["ana"].get_pixel(0, 0), LEFT_COLOR);
        assert_eq!(*templates.normal(TeamSide::Right)["ana"].get_pixel(0, 0), RIGHT_COLOR);
    }

    #[test]
    fn resolve_reuses_locked_templates() {
        let ctx = match_context();
        let frame = live_frame();

        let first = resolve(&ctx, &frame).expect("provisional");
        assert_eq!(first.source, AvatarSource::Provisional);
        assert!(ctx.avatar_templates().is_none());

        ctx.lock_appearance(Arc::clone(&first.templates));
        let second = resolve(&ctx, &frame).expect("cached");
        let third = resolve(&ctx, &frame).expect("cached");
        assert_eq!(second.source, AvatarSource::Cached);
        assert!(Arc::ptr_eq(&second.templates, &first.templates));
        assert!(Arc::ptr_eq(&third.templates, &second.templates));
        assert_eq!(*third.templates, *first.templates);
    }

    #[test]
    fn slot_view_selects_team() {
        let ctx = match_context();
        let templates = Arc::new(
            AvatarTemplates::synthesize(&live_frame(), ctx.profile(), ctx.references())
                .expect("fuse"),
        );
        let right = SlotAvatars::new(Arc::clone(&templates), TeamSide::of_slot(7));
        assert_eq!(right.side(), TeamSide::Right);
        assert_eq!(right.normal(), templates.normal(TeamSide::Right));
        assert_eq!(right.small(), templates.small(TeamSide::Right));
    }
}
