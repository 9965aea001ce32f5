//! Match-scoped state shared by every frame of one recording.

use std::sync::Arc;

use image::Rgb;
use once_cell::sync::OnceCell;
use spectra_types::{
    game_type::{GameType, GameTypeProfile},
    team::{MatchSetup, TeamPair},
    Result,
};
use spectra_vision::ReferenceTemplates;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{avatars::AvatarTemplates, snapshot::FrameSnapshot};

/// Team colors and the avatar set fused against them, learned from the first
/// valid frame.
#[derive(Debug)]
struct MatchAppearance {
    team_colors: TeamPair<Rgb<u8>>,
    avatars: Arc<AvatarTemplates>,
}

pub struct MatchContext {
    id: Uuid,
    profile: GameTypeProfile,
    setup: MatchSetup,
    references: Arc<ReferenceTemplates>,
    appearance: OnceCell<MatchAppearance>,
    frames: Vec<FrameSnapshot>,
}

impl MatchContext {
    pub fn new(
        game_type: GameType,
        setup: MatchSetup,
        references: ReferenceTemplates,
    ) -> Result<Self> {
        Self::with_profile(game_type.profile(), setup, references)
    }

    /// Build a context around an explicit layout profile.
    pub fn with_profile(
        profile: GameTypeProfile,
        setup: MatchSetup,
        references: ReferenceTemplates,
    ) -> Result<Self> {
        profile.validate()?;
        setup.validate()?;
        references.validate(&profile)?;
        let id = Uuid::new_v4();
        info!(
            "Match {} ready: {} vs {} ({:?})",
            id,
            setup.team_names.left,
            setup.team_names.right,
            profile.game_type
        );
        Ok(Self {
            id,
            profile,
            setup,
            references: Arc::new(references),
            appearance: OnceCell::new(),
            frames: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn game_type(&self) -> GameType {
        self.profile.game_type
    }

    pub fn profile(&self) -> &GameTypeProfile {
        &self.profile
    }

    pub fn setup(&self) -> &MatchSetup {
        &self.setup
    }

    pub fn references(&self) -> &Arc<ReferenceTemplates> {
        &self.references
    }

    pub fn team_colors(&self) -> Option<TeamPair<Rgb<u8>>> {
        self.appearance.get().map(|appearance| appearance.team_colors)
    }

    pub fn avatar_templates(&self) -> Option<Arc<AvatarTemplates>> {
        self.appearance
            .get()
            .map(|appearance| Arc::clone(&appearance.avatars))
    }

    /// Install team colors and avatars for the rest of the match.
    ///
    /// Only the first call writes; later calls return the installed set.
    pub fn lock_appearance(&self, avatars: Arc<AvatarTemplates>) -> Arc<AvatarTemplates> {
        let appearance = self.appearance.get_or_init(|| {
            let team_colors = avatars.team_colors();
            info!(
                "Match {} team colors locked: left {:?}, right {:?}",
                self.id, team_colors.left.0, team_colors.right.0
            );
            MatchAppearance {
                team_colors,
                avatars,
            }
        });
        Arc::clone(&appearance.avatars)
    }

    pub fn frames(&self) -> &[FrameSnapshot] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.frames.last()
    }

    /// Append an analysed frame to the match history.
    pub fn record_frame(&mut self, snapshot: FrameSnapshot) -> &FrameSnapshot {
        if let Some(last) = self.frames.last() {
            if snapshot.timestamp() < last.timestamp() {
                warn!(
                    "Frame at {}s recorded after {}s; history is no longer chronological",
                    snapshot.timestamp(),
                    last.timestamp()
                );
            }
        }
        self.frames.push(snapshot);
        &self.frames[self.frames.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{match_context, references, setup, test_profile};
    use spectra_types::SpectraError;

    #[test]
    fn appearance_is_locked_once() {
        let ctx = match_context();
        assert!(ctx.team_colors().is_none());
        assert!(ctx.avatar_templates().is_none());

        let first = Arc::new(
            AvatarTemplates::from_team_colors(
                TeamPair::new(Rgb([200, 0, 0]), Rgb([0, 0, 200])),
                ctx.profile(),
                ctx.references(),
            )
            .expect("synthesize"),
        );
        let second = Arc::new(
            AvatarTemplates::from_team_colors(
                TeamPair::new(Rgb([0, 200, 0]), Rgb([0, 200, 200])),
                ctx.profile(),
                ctx.references(),
            )
            .expect("synthesize"),
        );

        let locked = ctx.lock_appearance(Arc::clone(&first));
        assert!(Arc::ptr_eq(&locked, &first));
        let again = ctx.lock_appearance(second);
        assert!(Arc::ptr_eq(&again, &first));
        assert_eq!(
            ctx.team_colors(),
            Some(TeamPair::new(Rgb([200, 0, 0]), Rgb([0, 0, 200])))
        );
    }

    #[test]
    fn mismatched_references_are_rejected_at_construction() {
        let mut profile = test_profile();
        profile.avatar_size = spectra_types::geometry::Size::new(9, 9);
        let err = MatchContext::with_profile(profile, setup(), references())
            .err()
            .expect("avatar size mismatch");
        assert!(matches!(err, SpectraError::Configuration(_)));
    }
}
