/// Snake front-end phases.
///
///   Menu ──Play──▶ Naming ──NameEntered──▶ Playing ──GameEnded──▶ GameOver
///    │ ▲             │                                 ▲             │
///    │ └────Quit─────┘                                 └─PlayAgain───┤
///    │ ▲                                                             │
///    │ └──────────────────────Acknowledge────────────────────────────┘
///    └─ShowScores──▶ Scoreboard ──Acknowledge──▶ Menu
///
/// Menu + Quit leaves the program.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GamePhase {
    Menu,
    Naming,
    Playing,
    GameOver,
    Scoreboard,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhaseEvent {
    Play,
    ShowScores,
    Quit,
    NameEntered,
    GameEnded,
    PlayAgain,
    Acknowledge,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    To(GamePhase),
    Exit,
}

impl GamePhase {
    /// Next phase for `event`, or `None` if the event means nothing here.
    pub fn on(self, event: PhaseEvent) -> Option<Transition> {
        use GamePhase::*;
        use PhaseEvent::*;
        let next = match (self, event) {
            (Menu, Play) => Transition::To(Naming),
            (Menu, ShowScores) => Transition::To(Scoreboard),
            (Menu, Quit) => Transition::Exit,
            (Naming, NameEntered) => Transition::To(Playing),
            (Naming, Quit) => Transition::To(Menu),
            (Playing, GameEnded) | (Playing, Quit) => Transition::To(GameOver),
            (GameOver, PlayAgain) => Transition::To(Playing),
            (GameOver, Acknowledge) | (GameOver, Quit) => Transition::To(Menu),
            (Scoreboard, Acknowledge) | (Scoreboard, Quit) => Transition::To(Menu),
            _ => return None,
        };
        Some(next)
    }
}

/// What the game-over screen reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub player: String,
    pub score: u32,
    /// 1-based place on the board, if the score made it.
    pub rank: Option<usize>,
    pub new_high: bool,
}

impl GameSummary {
    /// A positive score that now tops the board counts as a new high score.
    pub fn new(player: &str, score: u32, rank: Option<usize>, top_score: u32) -> Self {
        GameSummary {
            player: player.to_string(),
            score,
            rank,
            new_high: score > 0 && score == top_score,
        }
    }
}
