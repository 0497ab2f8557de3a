use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::error::ScoringError;

pub const BALLS_PER_OVER: i32 = 6;
pub const MAX_WICKETS: i32 = 10;

/// In-memory mirror of one innings of a live match. All transition rules
/// live here, free of any I/O; the service layer loads this from the
/// database, applies one transition, and persists the effects atomically.
///
/// `batting_runs`/`batting_wickets` are the *current* innings totals; they
/// reset on the innings switch. `total_balls_bowled` is the match-wide ball
/// counter and doubles as the duplicate-submission sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveState {
    pub innings_number: i32,
    pub current_over: i32,
    pub current_ball: i32,
    pub batsman1: Option<Uuid>,
    pub batsman2: Option<Uuid>,
    pub current_striker: Option<Uuid>,
    pub current_bowler: Option<Uuid>,
    pub batting_runs: i32,
    pub batting_wickets: i32,
    pub total_balls_bowled: i64,
    pub target_runs: Option<i32>,
    pub overs_per_match: i32,
}

/// Effects of one scored ball, for the caller to persist: striker and bowler
/// stat deltas plus the ledger entry coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BallApplied {
    pub runs: i32,
    pub striker: Uuid,
    pub non_striker: Uuid,
    pub bowler: Uuid,
    pub innings_number: i32,
    pub over_number: i32,
    /// 1-based position of this ball within its over.
    pub ball_number: i32,
    pub over_completed: bool,
    /// Match-wide sequence of this ball (post-application counter value).
    pub sequence: i64,
}

/// Effects of one wicket. The dismissed batsman is always the striker; the
/// incoming batsman takes the vacated slot at the non-striker's end.
#[derive(Debug, Clone, PartialEq)]
pub struct WicketApplied {
    pub dismissed: Uuid,
    pub surviving: Uuid,
    pub incoming: Option<Uuid>,
    pub bowler: Uuid,
    pub all_out: bool,
    pub innings_number: i32,
    pub over_number: i32,
    pub ball_number: i32,
    pub over_completed: bool,
    pub sequence: i64,
}

impl LiveState {
    /// Fresh state for a newly started match.
    pub fn new(overs_per_match: i32) -> Self {
        Self {
            innings_number: 1,
            current_over: 0,
            current_ball: 0,
            batsman1: None,
            batsman2: None,
            current_striker: None,
            current_bowler: None,
            batting_runs: 0,
            batting_wickets: 0,
            total_balls_bowled: 0,
            target_runs: None,
            overs_per_match,
        }
    }

    /// Assign both batsmen and the striker. Replacing an existing assignment
    /// is allowed (correcting a selection before the first ball); dismissed
    /// players may not return.
    pub fn set_batsmen(
        &mut self,
        batsman1: Uuid,
        batsman2: Uuid,
        striker: Uuid,
        batting_roster: &HashSet<Uuid>,
        dismissed: &HashSet<Uuid>,
    ) -> Result<(), ScoringError> {
        if batting_roster.is_empty() {
            return Err(ScoringError::EmptyRoster(
                "batting team has no active players on its roster".to_string(),
            ));
        }
        if self.batting_wickets >= MAX_WICKETS {
            return Err(ScoringError::AllOut);
        }
        if batsman1 == batsman2 {
            return Err(ScoringError::InvalidBatsman(
                "batsmen must be two different players".to_string(),
            ));
        }
        for id in [batsman1, batsman2] {
            if !batting_roster.contains(&id) {
                return Err(ScoringError::InvalidBatsman(format!(
                    "player {} is not on the batting team's roster",
                    id
                )));
            }
            if dismissed.contains(&id) {
                return Err(ScoringError::InvalidBatsman(format!(
                    "player {} was already dismissed this innings",
                    id
                )));
            }
        }
        if striker != batsman1 && striker != batsman2 {
            return Err(ScoringError::InvalidBatsman(
                "striker must be one of the two batsmen".to_string(),
            ));
        }
        self.batsman1 = Some(batsman1);
        self.batsman2 = Some(batsman2);
        self.current_striker = Some(striker);
        Ok(())
    }

    /// Assign the bowler for the upcoming over. The slot is cleared at every
    /// over boundary, so this must be called again before each over.
    pub fn set_bowler(
        &mut self,
        bowler: Uuid,
        bowling_roster: &HashSet<Uuid>,
    ) -> Result<(), ScoringError> {
        if bowling_roster.is_empty() {
            return Err(ScoringError::EmptyRoster(
                "bowling team has no active players on its roster".to_string(),
            ));
        }
        if !bowling_roster.contains(&bowler) {
            return Err(ScoringError::InvalidBowler(format!(
                "player {} is not on the bowling team's roster",
                bowler
            )));
        }
        self.current_bowler = Some(bowler);
        Ok(())
    }

    /// Score one legal delivery. Strike rotation: swap mid-over on odd runs,
    /// and swap unconditionally at the end of a completed over. The two
    /// cancel out when an odd-run ball is also the last of the over.
    pub fn add_score(
        &mut self,
        runs: i32,
        expected_sequence: Option<i64>,
    ) -> Result<BallApplied, ScoringError> {
        if !(0..=6).contains(&runs) {
            return Err(ScoringError::InvalidRuns(runs));
        }
        self.check_sequence(expected_sequence)?;
        if self.batting_wickets >= MAX_WICKETS {
            return Err(ScoringError::AllOut);
        }
        if self.current_over >= self.overs_per_match {
            return Err(ScoringError::OversExhausted);
        }
        let (striker, non_striker) = self.batting_pair()?;
        let bowler = self.current_bowler.ok_or(ScoringError::BowlerNotSet)?;

        let innings_number = self.innings_number;
        let over_number = self.current_over;
        let ball_number = self.current_ball + 1;

        self.batting_runs += runs;
        let over_completed = self.advance_ball();

        let mut swap = runs % 2 == 1;
        if over_completed {
            swap = !swap;
        }
        if swap {
            self.swap_strike();
        }

        Ok(BallApplied {
            runs,
            striker,
            non_striker,
            bowler,
            innings_number,
            over_number,
            ball_number,
            over_completed,
            sequence: self.total_balls_bowled,
        })
    }

    /// Take a wicket. The dismissed batsman is the current striker; the
    /// incoming batsman fills the vacated slot at the non-striker's end, so
    /// the surviving batsman takes strike. Consumes a ball exactly like
    /// `add_score(0)`. On the tenth wicket no incoming batsman is needed and
    /// both slots clear; scoring is blocked until the innings is switched or
    /// the match completed.
    pub fn add_wicket(
        &mut self,
        next_batsman: Option<Uuid>,
        batting_roster: &HashSet<Uuid>,
        dismissed: &HashSet<Uuid>,
        expected_sequence: Option<i64>,
    ) -> Result<WicketApplied, ScoringError> {
        self.check_sequence(expected_sequence)?;
        if self.batting_wickets >= MAX_WICKETS {
            return Err(ScoringError::AllOut);
        }
        if self.current_over >= self.overs_per_match {
            return Err(ScoringError::OversExhausted);
        }
        let (striker, non_striker) = self.batting_pair()?;
        let bowler = self.current_bowler.ok_or(ScoringError::BowlerNotSet)?;

        let incoming = if self.batting_wickets + 1 >= MAX_WICKETS {
            None
        } else {
            let incoming = next_batsman.ok_or_else(|| {
                ScoringError::InvalidBatsman(
                    "next_batsman_id is required until the side is all out".to_string(),
                )
            })?;
            if !batting_roster.contains(&incoming) {
                return Err(ScoringError::InvalidBatsman(format!(
                    "player {} is not on the batting team's roster",
                    incoming
                )));
            }
            if dismissed.contains(&incoming) || incoming == striker {
                return Err(ScoringError::InvalidBatsman(format!(
                    "player {} was already dismissed this innings",
                    incoming
                )));
            }
            if incoming == non_striker {
                return Err(ScoringError::InvalidBatsman(format!(
                    "player {} is already batting",
                    incoming
                )));
            }
            Some(incoming)
        };

        let innings_number = self.innings_number;
        let over_number = self.current_over;
        let ball_number = self.current_ball + 1;

        self.batting_wickets += 1;
        let all_out = self.batting_wickets >= MAX_WICKETS;

        if let Some(incoming) = incoming {
            // Replace the dismissed slot; the survivor takes strike.
            if self.batsman1 == Some(striker) {
                self.batsman1 = Some(incoming);
            } else {
                self.batsman2 = Some(incoming);
            }
            self.current_striker = Some(non_striker);
        } else {
            self.batsman1 = None;
            self.batsman2 = None;
            self.current_striker = None;
        }

        let over_completed = self.advance_ball();
        if over_completed && !all_out {
            self.swap_strike();
        }

        Ok(WicketApplied {
            dismissed: striker,
            surviving: non_striker,
            incoming,
            bowler,
            all_out,
            innings_number,
            over_number,
            ball_number,
            over_completed,
            sequence: self.total_balls_bowled,
        })
    }

    /// Move to the second innings. Whether the first innings is actually
    /// over (overs exhausted or all out) is the operator's call; the state
    /// machine only refuses a second switch. Returns the first innings total,
    /// retained as the chase target.
    pub fn switch_innings(&mut self) -> Result<i32, ScoringError> {
        if self.innings_number != 1 {
            return Err(ScoringError::InvalidStateTransition(
                "innings can only be switched once, at the end of the first innings".to_string(),
            ));
        }
        let target = self.batting_runs;
        self.innings_number = 2;
        self.current_over = 0;
        self.current_ball = 0;
        self.batsman1 = None;
        self.batsman2 = None;
        self.current_striker = None;
        self.current_bowler = None;
        self.batting_runs = 0;
        self.batting_wickets = 0;
        self.target_runs = Some(target);
        Ok(target)
    }

    /// Completion requires the second innings to be underway or concluded.
    pub fn ensure_completable(&self) -> Result<(), ScoringError> {
        if self.innings_number != 2 {
            return Err(ScoringError::InvalidStateTransition(
                "match can only be completed during or after the second innings".to_string(),
            ));
        }
        Ok(())
    }

    fn batting_pair(&self) -> Result<(Uuid, Uuid), ScoringError> {
        let striker = self.current_striker.ok_or(ScoringError::BatsmenNotSet)?;
        let b1 = self.batsman1.ok_or(ScoringError::BatsmenNotSet)?;
        let b2 = self.batsman2.ok_or(ScoringError::BatsmenNotSet)?;
        let non_striker = if striker == b1 { b2 } else { b1 };
        Ok((striker, non_striker))
    }

    fn advance_ball(&mut self) -> bool {
        self.current_ball += 1;
        self.total_balls_bowled += 1;
        if self.current_ball >= BALLS_PER_OVER {
            self.current_ball = 0;
            self.current_over += 1;
            // A new over always needs an explicit bowler assignment.
            self.current_bowler = None;
            true
        } else {
            false
        }
    }

    fn swap_strike(&mut self) {
        if let (Some(b1), Some(b2), Some(striker)) =
            (self.batsman1, self.batsman2, self.current_striker)
        {
            self.current_striker = Some(if striker == b1 { b2 } else { b1 });
        }
    }

    fn check_sequence(&self, expected: Option<i64>) -> Result<(), ScoringError> {
        match expected {
            Some(client) if client != self.total_balls_bowled => {
                Err(ScoringError::StaleSequence {
                    server: self.total_balls_bowled,
                    client,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Winner of a completed match by final totals; `None` means a tie.
pub fn decide_winner(
    team1_id: Uuid,
    team2_id: Uuid,
    team1_runs: i32,
    team2_runs: i32,
) -> Option<Uuid> {
    if team1_runs > team2_runs {
        Some(team1_id)
    } else if team2_runs > team1_runs {
        Some(team2_id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    struct Fixture {
        state: LiveState,
        batters: Vec<Uuid>,
        bowlers: Vec<Uuid>,
        batting_roster: HashSet<Uuid>,
        bowling_roster: HashSet<Uuid>,
        dismissed: HashSet<Uuid>,
    }

    impl Fixture {
        fn new(overs: i32) -> Self {
            let batters = ids(11);
            let bowlers = ids(11);
            let mut state = LiveState::new(overs);
            let batting_roster: HashSet<Uuid> = batters.iter().copied().collect();
            let bowling_roster: HashSet<Uuid> = bowlers.iter().copied().collect();
            let dismissed = HashSet::new();
            state
                .set_batsmen(batters[0], batters[1], batters[0], &batting_roster, &dismissed)
                .unwrap();
            state.set_bowler(bowlers[0], &bowling_roster).unwrap();
            Fixture { state, batters, bowlers, batting_roster, bowling_roster, dismissed }
        }

        fn bowl_over(&mut self, runs: [i32; 6]) {
            for r in runs {
                self.state.add_score(r, None).unwrap();
            }
            // Over boundary cleared the bowler; bring one back on.
            self.state.set_bowler(self.bowlers[1], &self.bowling_roster).unwrap();
        }
    }

    #[test]
    fn scoring_requires_batsmen_and_bowler() {
        let mut state = LiveState::new(20);
        assert!(matches!(state.add_score(1, None), Err(ScoringError::BatsmenNotSet)));

        let batters = ids(2);
        let roster: HashSet<Uuid> = batters.iter().copied().collect();
        state
            .set_batsmen(batters[0], batters[1], batters[0], &roster, &HashSet::new())
            .unwrap();
        assert!(matches!(state.add_score(1, None), Err(ScoringError::BowlerNotSet)));
    }

    #[test]
    fn set_batsmen_rejects_bad_selections() {
        let mut state = LiveState::new(20);
        let batters = ids(3);
        let roster: HashSet<Uuid> = batters.iter().copied().collect();
        let outsider = Uuid::new_v4();

        assert!(matches!(
            state.set_batsmen(batters[0], batters[0], batters[0], &roster, &HashSet::new()),
            Err(ScoringError::InvalidBatsman(_))
        ));
        assert!(matches!(
            state.set_batsmen(batters[0], outsider, batters[0], &roster, &HashSet::new()),
            Err(ScoringError::InvalidBatsman(_))
        ));
        assert!(matches!(
            state.set_batsmen(batters[0], batters[1], batters[2], &roster, &HashSet::new()),
            Err(ScoringError::InvalidBatsman(_))
        ));
        let mut dismissed = HashSet::new();
        dismissed.insert(batters[1]);
        assert!(matches!(
            state.set_batsmen(batters[0], batters[1], batters[0], &roster, &dismissed),
            Err(ScoringError::InvalidBatsman(_))
        ));
        assert!(matches!(
            state.set_batsmen(batters[0], batters[1], batters[0], &HashSet::new(), &HashSet::new()),
            Err(ScoringError::EmptyRoster(_))
        ));
    }

    #[test]
    fn ball_counter_stays_in_range_and_rolls_over() {
        let mut fx = Fixture::new(20);
        for i in 0..5 {
            fx.state.add_score(0, None).unwrap();
            assert_eq!(fx.state.current_ball, i + 1);
            assert_eq!(fx.state.current_over, 0);
        }
        let applied = fx.state.add_score(0, None).unwrap();
        assert!(applied.over_completed);
        assert_eq!(applied.ball_number, 6);
        assert_eq!(fx.state.current_ball, 0);
        assert_eq!(fx.state.current_over, 1);
        assert!((0..=5).contains(&fx.state.current_ball));
    }

    #[test]
    fn over_boundary_clears_bowler() {
        let mut fx = Fixture::new(20);
        for _ in 0..6 {
            fx.state.add_score(0, None).unwrap();
        }
        assert_eq!(fx.state.current_bowler, None);
        assert!(matches!(fx.state.add_score(0, None), Err(ScoringError::BowlerNotSet)));
    }

    #[test]
    fn odd_runs_swap_strike_mid_over() {
        let mut fx = Fixture::new(20);
        let initial = fx.state.current_striker.unwrap();
        fx.state.add_score(1, None).unwrap();
        assert_ne!(fx.state.current_striker.unwrap(), initial);
        fx.state.add_score(3, None).unwrap();
        assert_eq!(fx.state.current_striker.unwrap(), initial);
        fx.state.add_score(4, None).unwrap();
        assert_eq!(fx.state.current_striker.unwrap(), initial);
    }

    #[test]
    fn all_singles_over_leaves_striker_swapped() {
        // Five mid-over swaps; the sixth ball's odd swap cancels against the
        // unconditional end-of-over swap.
        let mut fx = Fixture::new(20);
        let initial = fx.state.current_striker.unwrap();
        fx.bowl_over([1, 1, 1, 1, 1, 1]);
        assert_ne!(fx.state.current_striker.unwrap(), initial);
    }

    #[test]
    fn all_twos_over_swaps_strike_exactly_once() {
        let mut fx = Fixture::new(20);
        let initial = fx.state.current_striker.unwrap();
        fx.bowl_over([2, 2, 2, 2, 2, 2]);
        assert_ne!(fx.state.current_striker.unwrap(), initial);
        fx.bowl_over([2, 2, 2, 2, 2, 2]);
        assert_eq!(fx.state.current_striker.unwrap(), initial);
    }

    #[test]
    fn odd_ball_ending_an_over_has_no_net_swap() {
        let mut fx = Fixture::new(20);
        for _ in 0..5 {
            fx.state.add_score(0, None).unwrap();
        }
        let striker_before = fx.state.current_striker.unwrap();
        fx.state.add_score(1, None).unwrap();
        assert_eq!(fx.state.current_striker.unwrap(), striker_before);
    }

    #[test]
    fn team_total_matches_sum_of_striker_runs() {
        use std::collections::HashMap;
        let mut fx = Fixture::new(20);
        let mut per_player: HashMap<Uuid, i32> = HashMap::new();
        let sequence = [1, 4, 0, 2, 6, 3, 0, 1, 1, 2, 4, 6];
        for (i, runs) in sequence.into_iter().enumerate() {
            if i > 0 && i % 6 == 0 {
                fx.state.set_bowler(fx.bowlers[2], &fx.bowling_roster).unwrap();
            }
            let applied = fx.state.add_score(runs, None).unwrap();
            *per_player.entry(applied.striker).or_default() += runs;
        }
        assert_eq!(per_player.values().sum::<i32>(), fx.state.batting_runs);
        assert_eq!(fx.state.batting_runs, 30);
    }

    #[test]
    fn sequence_guard_rejects_stale_submissions() {
        let mut fx = Fixture::new(20);
        let applied = fx.state.add_score(4, None).unwrap();
        assert_eq!(applied.sequence, 1);
        let before = fx.state.clone();
        // A duplicate retry carries the pre-application sequence.
        let err = fx.state.add_score(4, Some(0)).unwrap_err();
        assert!(matches!(err, ScoringError::StaleSequence { server: 1, client: 0 }));
        assert_eq!(fx.state, before);
        // The correct sequence is accepted.
        let applied = fx.state.add_score(4, Some(1)).unwrap();
        assert_eq!(applied.sequence, 2);
    }

    #[test]
    fn wicket_puts_incoming_batsman_at_non_strikers_end() {
        let mut fx = Fixture::new(20);
        let striker = fx.state.current_striker.unwrap();
        let non_striker = fx.batters[1];
        let incoming = fx.batters[2];

        let applied = fx.state.add_wicket(Some(incoming), &fx.batting_roster, &fx.dismissed, None).unwrap();
        assert_eq!(applied.dismissed, striker);
        assert_eq!(applied.incoming, Some(incoming));
        assert!(!applied.all_out);
        // Survivor takes strike, incoming waits at the other end.
        assert_eq!(fx.state.current_striker, Some(non_striker));
        assert_eq!(fx.state.batsman1, Some(incoming));
        assert_eq!(fx.state.batsman2, Some(non_striker));
        assert_eq!(fx.state.batting_wickets, 1);
        // A wicket consumes a ball.
        assert_eq!(fx.state.current_ball, 1);
        assert_eq!(fx.state.total_balls_bowled, 1);
    }

    #[test]
    fn wicket_validates_incoming_batsman() {
        let mut fx = Fixture::new(20);
        let outsider = Uuid::new_v4();
        assert!(matches!(
            fx.state.add_wicket(Some(outsider), &fx.batting_roster, &fx.dismissed, None),
            Err(ScoringError::InvalidBatsman(_))
        ));
        // The not-out batsman cannot come in again.
        assert!(matches!(
            fx.state.add_wicket(Some(fx.batters[1]), &fx.batting_roster, &fx.dismissed, None),
            Err(ScoringError::InvalidBatsman(_))
        ));
        // Required until all out.
        assert!(matches!(
            fx.state.add_wicket(None, &fx.batting_roster, &fx.dismissed, None),
            Err(ScoringError::InvalidBatsman(_))
        ));
    }

    #[test]
    fn tenth_wicket_clears_the_crease_and_blocks_scoring() {
        let mut fx = Fixture::new(50);
        let mut dismissed = HashSet::new();
        // Nine wickets fall, each bringing in a fresh batsman.
        for i in 0..9 {
            let out = fx.state.current_striker.unwrap();
            let incoming = fx.batters[i + 2];
            fx.state.add_wicket(Some(incoming), &fx.batting_roster, &dismissed, None).unwrap();
            dismissed.insert(out);
            if fx.state.current_bowler.is_none() {
                fx.state.set_bowler(fx.bowlers[1], &fx.bowling_roster).unwrap();
            }
        }
        assert_eq!(fx.state.batting_wickets, 9);
        // Tenth wicket needs no replacement.
        let applied = fx.state.add_wicket(None, &fx.batting_roster, &dismissed, None).unwrap();
        assert!(applied.all_out);
        assert_eq!(applied.incoming, None);
        assert_eq!(fx.state.batting_wickets, MAX_WICKETS);
        assert_eq!(fx.state.current_striker, None);
        assert_eq!(fx.state.batsman1, None);
        assert!(matches!(fx.state.add_score(1, None), Err(ScoringError::AllOut)));
    }

    #[test]
    fn wicket_at_ten_is_rejected_without_state_change() {
        let mut fx = Fixture::new(50);
        fx.state.batting_wickets = MAX_WICKETS;
        let before = fx.state.clone();
        let err = fx
            .state
            .add_wicket(Some(fx.batters[3]), &fx.batting_roster, &fx.dismissed, None)
            .unwrap_err();
        assert!(matches!(err, ScoringError::AllOut));
        assert_eq!(fx.state, before);
    }

    #[test]
    fn overs_exhausted_blocks_further_scoring() {
        let mut fx = Fixture::new(1);
        fx.bowl_over([0, 0, 0, 0, 0, 0]);
        assert!(matches!(fx.state.add_score(1, None), Err(ScoringError::OversExhausted)));
        assert!(matches!(
            fx.state.add_wicket(Some(fx.batters[2]), &fx.batting_roster, &fx.dismissed, None),
            Err(ScoringError::OversExhausted)
        ));
    }

    #[test]
    fn switch_innings_resets_counters_and_records_target() {
        let mut fx = Fixture::new(20);
        fx.bowl_over([4, 6, 0, 1, 2, 0]);
        assert_eq!(fx.state.batting_runs, 13);

        let target = fx.state.switch_innings().unwrap();
        assert_eq!(target, 13);
        assert_eq!(fx.state.innings_number, 2);
        assert_eq!(fx.state.current_over, 0);
        assert_eq!(fx.state.current_ball, 0);
        assert_eq!(fx.state.batting_runs, 0);
        assert_eq!(fx.state.batting_wickets, 0);
        assert_eq!(fx.state.batsman1, None);
        assert_eq!(fx.state.current_bowler, None);
        assert_eq!(fx.state.target_runs, Some(13));

        // Only one switch per match.
        assert!(matches!(
            fx.state.switch_innings(),
            Err(ScoringError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn completion_requires_second_innings() {
        let fx = Fixture::new(20);
        assert!(matches!(
            fx.state.ensure_completable(),
            Err(ScoringError::InvalidStateTransition(_))
        ));
        let mut fx = Fixture::new(20);
        fx.state.switch_innings().unwrap();
        assert!(fx.state.ensure_completable().is_ok());
    }

    #[test]
    fn winner_is_higher_total_and_equal_is_tie() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(decide_winner(a, b, 151, 150), Some(a));
        assert_eq!(decide_winner(a, b, 150, 151), Some(b));
        assert_eq!(decide_winner(a, b, 150, 150), None);
    }
}
