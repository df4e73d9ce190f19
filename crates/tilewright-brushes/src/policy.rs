use serde::{Deserialize, Serialize};

/// Which of several same-group border sets keeps a contested slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrecedence {
    /// The set tied to the brush that started the recompute wins, then
    /// registration order.
    #[default]
    InitiatingBrush,
    /// Registration order alone.
    FirstRegistered,
}

/// Who `hate_friends` silences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HateFriendsScope {
    /// Only the center tile's own flag counts.
    #[default]
    DeclaringCenter,
    /// A flag on either side breaks the friendship.
    Mutual,
}

/// The optional `[engine]` table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub group_precedence: GroupPrecedence,
    pub hate_friends: HateFriendsScope,
}
