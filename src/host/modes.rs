/// Display metadata for a selectable game mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDefinition {
    /// e.g. "normal", "team", "speedrun"
    pub id: &'static str,
    pub display_name: &'static str,
    /// Client feature flags (timer or ranking variants and the like).
    pub client_flags: Option<&'static [(&'static str, bool)]>,
}

impl ModeDefinition {
    /// Names of the client flags switched on for this mode.
    pub fn enabled_flags(&self) -> impl Iterator<Item = &'static str> {
        self.client_flags
            .unwrap_or_default()
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| *name)
    }
}

pub const NORMAL_MODE: &str = "normal";

static MODES: &[ModeDefinition] = &[ModeDefinition {
    id: NORMAL_MODE,
    display_name: "일반 모드",
    client_flags: None,
}];

pub fn get(id: &str) -> Option<&'static ModeDefinition> {
    MODES.iter().find(|mode| mode.id == id)
}

/// Every registered mode, in registration order.
pub fn all() -> &'static [ModeDefinition] {
    MODES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_normal_mode_is_registered() {
        assert_eq!(all().len(), 1);
        let normal = get(NORMAL_MODE).unwrap();
        assert_eq!(normal.display_name, "일반 모드");
        assert_eq!(normal.enabled_flags().count(), 0);
        assert!(get("team").is_none());
    }

    #[test]
    fn lists_only_enabled_flags() {
        let mode = ModeDefinition {
            id: "speedrun",
            display_name: "스피드런",
            client_flags: Some(&[("timer", true), ("ranking", false), ("hints", true)]),
        };
        assert_eq!(mode.enabled_flags().collect::<Vec<_>>(), vec!["timer", "hints"]);
    }
}
